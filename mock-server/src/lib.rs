//! In-memory stand-in for the knowledge-base backend.
//!
//! Serves every `/api/v1` route the client knows about from a single
//! `Backend` behind an `RwLock`. Retrieval is keyword overlap rather than
//! vector similarity and embeddings are synthesized from the text, which is
//! enough to exercise the wire contract end to end.

use std::sync::Arc;

use axum::{
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};

mod handlers;
pub mod model;

pub use model::{Artifact, Backend, Document};

pub type Db = Arc<RwLock<Backend>>;

/// FastAPI-style error: a status plus `{"detail": …}`.
pub type ApiError = (StatusCode, Json<Value>);
pub type ApiResult<T> = Result<T, ApiError>;

pub(crate) fn detail(status: StatusCode, message: impl Into<String>) -> ApiError {
    (status, Json(json!({ "detail": message.into() })))
}

pub fn app() -> Router {
    app_with(Backend::default())
}

pub fn app_with(backend: Backend) -> Router {
    use handlers::{artifacts, chromadb, config, search, sqlite, system};

    let db: Db = Arc::new(RwLock::new(backend));
    let api = Router::new()
        .route("/health", get(system::health))
        .route("/metrics", get(system::metrics))
        .route("/info", get(system::info))
        .route("/reindex", post(system::reindex))
        .route("/logs", get(system::all_logs))
        .route("/logs/{kind}", get(system::logs).delete(system::clear_logs))
        .route("/server/restart", post(system::restart))
        .route("/server/shutdown", post(system::shutdown))
        .route("/artifacts", get(artifacts::list).post(artifacts::create))
        .route("/artifacts/batch", post(artifacts::batch))
        .route(
            "/artifacts/{id}",
            get(artifacts::get_one).put(artifacts::update).delete(artifacts::remove),
        )
        .route("/search/retrieve", post(search::retrieve))
        .route("/search/history", get(search::history))
        .route("/search/history/{id}", delete(search::delete_history))
        .route("/config", get(config::get_config).post(config::update_config))
        .route("/config/test-llm", post(config::test_llm))
        .route("/config/test-embedding", post(config::test_embedding))
        .route("/sqlite/tables", get(sqlite::tables))
        .route("/sqlite/tables/{table}", get(sqlite::rows).post(sqlite::create_record))
        .route(
            "/sqlite/tables/{table}/{record_id}",
            axum::routing::put(sqlite::update_record).delete(sqlite::delete_record),
        )
        .route("/sqlite/init", post(sqlite::init))
        .route("/chromadb/documents", get(chromadb::list).post(chromadb::create))
        .route("/chromadb/documents/search", post(chromadb::search))
        .route(
            "/chromadb/documents/{id}",
            get(chromadb::get_one).put(chromadb::update).delete(chromadb::remove),
        )
        .route("/chromadb/documents/{id}/exists", get(chromadb::exists))
        .route("/chromadb/init", post(chromadb::init))
        .route("/chromadb/info", get(chromadb::info))
        .route("/chromadb/collections", get(chromadb::collections))
        .route("/chromadb/collections/recreate", post(chromadb::recreate))
        .with_state(db);

    Router::new().nest("/api/v1", api)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}
