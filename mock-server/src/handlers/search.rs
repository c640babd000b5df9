use std::time::Instant;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Map, Value};

use crate::model::{overlap, timestamp, Artifact, HistoryEntry};
use crate::{detail, ApiResult, Db};

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    #[serde(default = "default_threshold")]
    pub threshold: f64,
    pub category_filter: Option<Vec<String>>,
    pub metadata_filter: Option<Map<String, Value>>,
}

fn default_top_k() -> usize {
    5
}

fn default_threshold() -> f64 {
    0.7
}

#[derive(Deserialize)]
pub struct HistoryParams {
    #[serde(default = "default_limit")]
    limit: usize,
}

fn default_limit() -> usize {
    10
}

fn metadata_matches(artifact: &Artifact, filter: &Map<String, Value>) -> bool {
    let Some(Value::Object(metadata)) = &artifact.metadata else {
        return filter.is_empty();
    };
    filter.iter().all(|(k, v)| metadata.get(k) == Some(v))
}

pub async fn retrieve(State(db): State<Db>, Json(request): Json<SearchRequest>) -> ApiResult<Json<Value>> {
    if request.query.trim().is_empty() {
        return Err(detail(StatusCode::UNPROCESSABLE_ENTITY, "query must not be empty"));
    }
    if request.top_k == 0 || request.top_k > 100 || !(0.0..=1.0).contains(&request.threshold) {
        return Err(detail(
            StatusCode::UNPROCESSABLE_ENTITY,
            "top_k must be in 1..=100 and threshold in 0..=1",
        ));
    }
    let started = Instant::now();
    let mut backend = db.write().await;

    let mut hits: Vec<Artifact> = backend
        .artifacts
        .values()
        .filter(|a| a.is_active)
        .filter(|a| {
            request.category_filter.as_ref().map_or(true, |cats| {
                a.category.as_ref().is_some_and(|c| cats.contains(c))
            })
        })
        .filter(|a| request.metadata_filter.as_ref().map_or(true, |f| metadata_matches(a, f)))
        .filter_map(|a| {
            let score = overlap(&request.query, &format!("{} {}", a.title, a.content));
            (score > 0.0 && score >= request.threshold).then(|| Artifact {
                similarity: Some(score),
                ..a.clone()
            })
        })
        .collect();
    hits.sort_by(|a, b| b.similarity.partial_cmp(&a.similarity).unwrap_or(std::cmp::Ordering::Equal));
    hits.truncate(request.top_k);

    let response_time = started.elapsed().as_secs_f64();
    let id = backend.next_history_id;
    backend.next_history_id += 1;
    backend.search_count += 1;
    backend.history.push(HistoryEntry {
        id,
        query: request.query.clone(),
        artifact_count: hits.len() as i64,
        response_time,
        created_at: timestamp(),
    });

    Ok(Json(json!({
        "data": {
            "query": request.query,
            "total_count": hits.len(),
            "artifacts": hits,
            "response_time": response_time
        }
    })))
}

pub async fn history(State(db): State<Db>, Query(params): Query<HistoryParams>) -> Json<Value> {
    let backend = db.read().await;
    let recent: Vec<&HistoryEntry> = backend.history.iter().rev().take(params.limit).collect();
    Json(json!({ "history": recent }))
}

pub async fn delete_history(State(db): State<Db>, Path(id): Path<i64>) -> ApiResult<Json<Value>> {
    let mut backend = db.write().await;
    let before = backend.history.len();
    backend.history.retain(|h| h.id != id);
    if backend.history.len() == before {
        return Err(detail(StatusCode::NOT_FOUND, "history entry not found"));
    }
    Ok(Json(json!({ "success": true, "message": "history entry deleted" })))
}
