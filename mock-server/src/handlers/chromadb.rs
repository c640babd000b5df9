use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Map, Value};

use super::Paging;
use crate::model::{embed, overlap, Document, COLLECTION_NAME, EMBEDDING_DIMENSION};
use crate::{detail, ApiResult, Db};

#[derive(Debug, Deserialize)]
pub struct DocumentSearch {
    query: String,
    #[serde(default = "default_top_k")]
    top_k: usize,
    #[serde(default)]
    threshold: f64,
}

fn default_top_k() -> usize {
    10
}

#[derive(Debug, Deserialize)]
pub struct NewDocument {
    id: Option<String>,
    document: Option<String>,
    embedding: Option<Vec<f32>>,
    metadata: Option<Map<String, Value>>,
}

#[derive(Debug, Deserialize)]
pub struct DocumentUpdate {
    document: Option<String>,
    embedding: Option<Vec<f32>>,
    metadata: Option<Map<String, Value>>,
}

fn missing_content() -> crate::ApiError {
    detail(StatusCode::BAD_REQUEST, "either document or embedding is required")
}

pub async fn list(State(db): State<Db>, Query(paging): Query<Paging>) -> Json<Value> {
    let backend = db.read().await;
    let summaries: Vec<Value> = backend
        .documents
        .values()
        .map(|d| {
            json!({
                "id": d.id,
                "document": d.document,
                "metadata": d.metadata,
                "has_embedding": d.embedding.is_some()
            })
        })
        .collect();
    let total = summaries.len();
    Json(json!({
        "data": {
            "records": paging.window(summaries),
            "total": total,
            "page": paging.page,
            "size": paging.size
        }
    }))
}

pub async fn get_one(State(db): State<Db>, Path(id): Path<String>) -> ApiResult<Json<Value>> {
    let backend = db.read().await;
    let document = backend
        .documents
        .get(&id)
        .ok_or_else(|| detail(StatusCode::NOT_FOUND, "document not found"))?;
    Ok(Json(json!({ "data": document })))
}

/// Similarity is `1 / (1 + distance)`, with word overlap standing in for
/// vector distance.
pub async fn search(State(db): State<Db>, Json(request): Json<DocumentSearch>) -> ApiResult<Json<Value>> {
    if request.query.trim().is_empty() {
        return Err(detail(StatusCode::BAD_REQUEST, "query must not be empty"));
    }
    let backend = db.read().await;
    let mut matches: Vec<(f64, &Document)> = backend
        .documents
        .values()
        .map(|d| (1.0 - overlap(&request.query, &d.document), d))
        .collect();
    matches.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));

    let records: Vec<Value> = matches
        .into_iter()
        .take(request.top_k)
        .map(|(distance, d)| (1.0 / (1.0 + distance), distance, d))
        .filter(|(similarity, _, _)| *similarity >= request.threshold)
        .map(|(similarity, distance, d)| {
            json!({
                "id": d.id,
                "document": d.document,
                "metadata": d.metadata,
                "similarity": similarity,
                "distance": distance
            })
        })
        .collect();
    Ok(Json(json!({ "data": { "total": records.len(), "records": records } })))
}

pub async fn exists(State(db): State<Db>, Path(id): Path<String>) -> Json<Value> {
    Json(json!({ "exists": db.read().await.documents.contains_key(&id) }))
}

pub async fn create(State(db): State<Db>, Json(input): Json<NewDocument>) -> ApiResult<Json<Value>> {
    let mut backend = db.write().await;
    let id = input
        .id
        .unwrap_or_else(|| format!("doc_{}", uuid::Uuid::new_v4().simple()));
    if backend.documents.contains_key(&id) {
        return Err(detail(StatusCode::BAD_REQUEST, "document id already exists"));
    }
    let document = input.document.unwrap_or_default();
    let embedding = match input.embedding {
        Some(embedding) => embedding,
        None if !document.is_empty() => embed(&document),
        None => return Err(missing_content()),
    };
    backend.documents.insert(
        id.clone(),
        Document {
            id: id.clone(),
            document,
            embedding: Some(embedding),
            metadata: input.metadata.unwrap_or_default(),
        },
    );
    backend.log_database(format!("chromadb: document {id} created"));
    Ok(Json(json!({ "success": true, "message": "document created", "document_id": id })))
}

pub async fn update(
    State(db): State<Db>,
    Path(id): Path<String>,
    Json(input): Json<DocumentUpdate>,
) -> ApiResult<Json<Value>> {
    if input.document.is_none() && input.embedding.is_none() {
        return Err(missing_content());
    }
    let mut backend = db.write().await;
    let document = backend
        .documents
        .get_mut(&id)
        .ok_or_else(|| detail(StatusCode::NOT_FOUND, "document not found"))?;
    if let Some(text) = input.document {
        document.document = text;
    }
    if let Some(embedding) = input.embedding {
        document.embedding = Some(embedding);
    }
    if let Some(metadata) = input.metadata {
        document.metadata = metadata;
    }
    backend.log_database(format!("chromadb: document {id} updated"));
    Ok(Json(json!({ "success": true, "message": "document updated" })))
}

/// Deleting an unknown id succeeds, as it does in ChromaDB.
pub async fn remove(State(db): State<Db>, Path(id): Path<String>) -> Json<Value> {
    let mut backend = db.write().await;
    backend.documents.remove(&id);
    backend.log_database(format!("chromadb: document {id} deleted"));
    Json(json!({ "success": true, "message": "document deleted" }))
}

pub async fn init(State(db): State<Db>) -> Json<Value> {
    db.write().await.log_database("chromadb initialized");
    Json(json!({ "success": true, "message": "database initialized" }))
}

pub async fn info(State(db): State<Db>) -> Json<Value> {
    let count = db.read().await.documents.len();
    Json(json!({
        "data": { "name": COLLECTION_NAME, "count": count, "dimension": EMBEDDING_DIMENSION }
    }))
}

pub async fn collections(State(db): State<Db>) -> Json<Value> {
    let count = db.read().await.documents.len();
    Json(json!({ "data": { "collections": [{ "name": COLLECTION_NAME, "count": count }] } }))
}

pub async fn recreate(State(db): State<Db>) -> Json<Value> {
    let mut backend = db.write().await;
    backend.documents.clear();
    backend.log_database("chromadb: collection recreated");
    Json(json!({ "success": true, "message": "collection recreated" }))
}
