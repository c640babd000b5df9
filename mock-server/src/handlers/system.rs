use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::model::timestamp;
use crate::{detail, ApiResult, Db};

#[derive(Deserialize)]
pub struct Lines {
    #[serde(default = "default_lines")]
    lines: usize,
}

fn default_lines() -> usize {
    100
}

fn tail(lines: &[String], n: usize) -> Vec<String> {
    lines[lines.len().saturating_sub(n)..].to_vec()
}

pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": timestamp(),
        "services": { "sqlite": "healthy", "chromadb": "healthy" }
    }))
}

pub async fn metrics(State(db): State<Db>) -> Json<Value> {
    let backend = db.read().await;
    Json(json!({
        "uptime": backend.started.elapsed().as_secs_f64(),
        "artifact_count": backend.artifacts.len(),
        "chunk_count": backend.documents.len(),
        "search_count": backend.search_count,
        "avg_response_time": 0.0
    }))
}

pub async fn info() -> Json<Value> {
    Json(json!({
        "app_name": "kb-mock-server",
        "version": env!("CARGO_PKG_VERSION"),
        "environment": "mock",
        "dependencies": { "axum": "0.8", "tokio": "1" }
    }))
}

pub async fn reindex(State(db): State<Db>) -> Json<Value> {
    let mut backend = db.write().await;
    let count = backend.artifacts.values().filter(|a| a.is_active).count();
    backend.log_database(format!("reindexed {count} artifacts"));
    Json(json!({
        "success": true,
        "message": format!("reindexed {count} artifacts"),
        "reindexed_count": count
    }))
}

pub async fn all_logs(State(db): State<Db>, Query(params): Query<Lines>) -> Json<Value> {
    let backend = db.read().await;
    Json(json!({
        "database_logs": tail(&backend.database_logs, params.lines),
        "server_logs": tail(&backend.server_logs, params.lines)
    }))
}

pub async fn logs(
    State(db): State<Db>,
    Path(kind): Path<String>,
    Query(params): Query<Lines>,
) -> ApiResult<Json<Value>> {
    let backend = db.read().await;
    let lines = match kind.as_str() {
        "database" => &backend.database_logs,
        "server" => &backend.server_logs,
        _ => return Err(detail(StatusCode::NOT_FOUND, "Not Found")),
    };
    Ok(Json(json!({ "logs": tail(lines, params.lines) })))
}

pub async fn clear_logs(State(db): State<Db>, Path(kind): Path<String>) -> ApiResult<Json<Value>> {
    let mut backend = db.write().await;
    match kind.as_str() {
        "database" => backend.database_logs.clear(),
        "server" => backend.server_logs.clear(),
        _ => return Err(detail(StatusCode::NOT_FOUND, "Not Found")),
    }
    Ok(Json(json!({ "message": format!("{kind} log cleared") })))
}

pub async fn restart(State(db): State<Db>) -> Json<Value> {
    let mut backend = db.write().await;
    backend.restart_requests += 1;
    backend.log_server("restart requested");
    Json(json!({ "success": true, "message": "server restarting" }))
}

pub async fn shutdown(State(db): State<Db>) -> Json<Value> {
    let mut backend = db.write().await;
    backend.shutdown_requested = true;
    backend.log_server("shutdown requested");
    Json(json!({ "success": true, "message": "server shutting down" }))
}
