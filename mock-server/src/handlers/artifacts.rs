use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::model::{timestamp, Artifact, CreateArtifact, UpdateArtifact};
use crate::{detail, ApiResult, Db};

#[derive(Deserialize)]
pub struct ListParams {
    #[serde(default = "first_page")]
    page: usize,
    #[serde(default = "default_size")]
    size: usize,
    keyword: Option<String>,
    category: Option<String>,
}

fn first_page() -> usize {
    1
}

fn default_size() -> usize {
    10
}

fn validate(input: &CreateArtifact) -> Result<(), String> {
    if input.title.trim().is_empty() {
        return Err("title must not be empty".to_string());
    }
    if input.content.trim().is_empty() {
        return Err("content must not be empty".to_string());
    }
    Ok(())
}

pub async fn list(State(db): State<Db>, Query(params): Query<ListParams>) -> ApiResult<Json<Value>> {
    if params.page == 0 || params.size == 0 || params.size > 100 {
        return Err(detail(StatusCode::UNPROCESSABLE_ENTITY, "page must be >= 1 and size in 1..=100"));
    }
    let backend = db.read().await;
    let keyword = params.keyword.as_deref().map(str::to_lowercase);
    let mut matching: Vec<&Artifact> = backend
        .artifacts
        .values()
        .filter(|a| a.is_active)
        .filter(|a| params.category.as_ref().map_or(true, |c| a.category.as_ref() == Some(c)))
        .filter(|a| {
            keyword.as_ref().map_or(true, |k| {
                a.title.to_lowercase().contains(k.as_str()) || a.content.to_lowercase().contains(k.as_str())
            })
        })
        .collect();
    matching.reverse();

    let total = matching.len();
    let page: Vec<&Artifact> = matching
        .into_iter()
        .skip((params.page - 1).saturating_mul(params.size))
        .take(params.size)
        .collect();
    Ok(Json(json!({
        "artifacts": page,
        "total_count": total,
        "page": params.page,
        "size": params.size
    })))
}

pub async fn create(State(db): State<Db>, Json(input): Json<CreateArtifact>) -> ApiResult<Json<Artifact>> {
    validate(&input).map_err(|e| detail(StatusCode::UNPROCESSABLE_ENTITY, e))?;
    let artifact = db.write().await.insert_artifact(input);
    Ok(Json(artifact))
}

pub async fn get_one(State(db): State<Db>, Path(id): Path<i64>) -> ApiResult<Json<Artifact>> {
    let backend = db.read().await;
    backend
        .artifacts
        .get(&id)
        .cloned()
        .map(Json)
        .ok_or_else(|| detail(StatusCode::NOT_FOUND, "artifact not found"))
}

pub async fn update(
    State(db): State<Db>,
    Path(id): Path<i64>,
    Json(input): Json<UpdateArtifact>,
) -> ApiResult<Json<Artifact>> {
    let mut backend = db.write().await;
    let artifact = backend
        .artifacts
        .get_mut(&id)
        .ok_or_else(|| detail(StatusCode::NOT_FOUND, "artifact not found"))?;
    if let Some(title) = input.title {
        artifact.title = title;
    }
    if let Some(content) = input.content {
        artifact.content = content;
    }
    if input.category.is_some() {
        artifact.category = input.category;
    }
    if input.tags.is_some() {
        artifact.tags = input.tags;
    }
    if input.metadata.is_some() {
        artifact.metadata = input.metadata;
    }
    if let Some(active) = input.is_active {
        artifact.is_active = active;
    }
    artifact.updated_at = timestamp();
    let updated = artifact.clone();
    backend.log_server(format!("artifact {id} updated"));
    Ok(Json(updated))
}

pub async fn remove(State(db): State<Db>, Path(id): Path<i64>) -> ApiResult<Json<Value>> {
    let mut backend = db.write().await;
    backend
        .artifacts
        .remove(&id)
        .ok_or_else(|| detail(StatusCode::NOT_FOUND, "artifact not found"))?;
    backend.log_server(format!("artifact {id} deleted"));
    Ok(Json(json!({ "success": true, "message": "artifact deleted" })))
}

/// Import each element on its own; bad elements are reported, not fatal.
pub async fn batch(State(db): State<Db>, Json(items): Json<Vec<Value>>) -> Json<Value> {
    let mut backend = db.write().await;
    let mut errors = Vec::new();
    let mut successful = 0;
    for (index, item) in items.iter().enumerate() {
        let parsed = serde_json::from_value::<CreateArtifact>(item.clone())
            .map_err(|e| e.to_string())
            .and_then(|input| validate(&input).map(|_| input));
        match parsed {
            Ok(input) => {
                backend.insert_artifact(input);
                successful += 1;
            }
            Err(e) => errors.push(format!("item {index}: {e}")),
        }
    }
    Json(json!({
        "total_files": items.len(),
        "successful": successful,
        "failed": errors.len(),
        "errors": errors,
        "processing_time": 0.0
    }))
}
