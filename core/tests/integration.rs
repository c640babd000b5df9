//! End-to-end tests against the live mock server.
//!
//! # Design
//! Each test starts its own mock backend on a random port and drives it
//! through `ApiClient` with the production `ReqwestTransport`, so request
//! building, the envelope handling and the DTOs are checked against real
//! HTTP responses.

use std::collections::BTreeMap;
use std::time::Duration;

use kb_client::{
    ApiClient, ApiError, ArtifactQuery, ArtifactUpdate, ClientConfig, DocumentSearch, LogSource,
    LogTarget, NewArtifact, NewDocument, PageQuery, SearchRequest, ServiceProbe,
};
use serde_json::json;

async fn start_server() -> ApiClient {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(kb_mock_server::run(listener));

    let config = ClientConfig::new(&format!("http://{addr}")).with_timeout(Duration::from_secs(5));
    ApiClient::new(config).unwrap()
}

fn artifact(title: &str, content: &str) -> NewArtifact {
    NewArtifact {
        title: title.to_string(),
        content: content.to_string(),
        ..Default::default()
    }
}

#[tokio::test]
async fn system_namespace() {
    let client = start_server().await;

    let health = client.system().health().await.unwrap();
    assert_eq!(health.status, "healthy");
    assert_eq!(health.services.get("sqlite").map(String::as_str), Some("healthy"));

    let info = client.system().info().await.unwrap();
    assert_eq!(info.app_name, "kb-mock-server");

    client.artifacts().create(&artifact("a", "b")).await.unwrap();
    let metrics = client.system().metrics().await.unwrap();
    assert_eq!(metrics.artifact_count, 1);

    let reindexed = client.system().reindex_vectors().await.unwrap();
    assert_eq!(reindexed.reindexed_count, Some(1));

    let logs = client.system().log_data(LogSource::All, None).await.unwrap();
    assert_eq!(logs.server_logs.len(), 1);
    assert_eq!(logs.database_logs.len(), 1);

    let server = client.system().log_data(LogSource::from_name("server"), Some(5)).await.unwrap();
    assert_eq!(server.logs.len(), 1);

    client.system().clear_log(LogTarget::Server).await.unwrap();
    let server = client.system().log_data(LogSource::Server, None).await.unwrap();
    assert!(server.logs.is_empty());

    let cleared = client.system().clear_log(LogTarget::Database).await.unwrap();
    assert!(cleared.message.contains("database"));
    let database = client.system().log_data(LogSource::Database, None).await.unwrap();
    assert!(database.logs.is_empty());

    assert_eq!(client.system().restart_server().await.unwrap().success, Some(true));
    assert_eq!(client.system().shutdown_server().await.unwrap().success, Some(true));
}

#[tokio::test]
async fn artifact_lifecycle() {
    let client = start_server().await;
    let artifacts = client.artifacts();

    let created = artifacts
        .create(&NewArtifact {
            category: Some("lang".to_string()),
            ..artifact("Rust", "ownership and borrowing")
        })
        .await
        .unwrap();
    assert_eq!(created.title, "Rust");

    let fetched = artifacts.get(created.id).await.unwrap();
    assert_eq!(fetched, created);

    let update = ArtifactUpdate {
        title: Some("Rust 2021".to_string()),
        ..Default::default()
    };
    let updated = artifacts.update(created.id, &update).await.unwrap();
    assert_eq!(updated.title, "Rust 2021");
    assert_eq!(updated.content, "ownership and borrowing");

    let page = artifacts
        .list(&ArtifactQuery {
            category: Some("lang".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(page.total_count, 1);
    assert_eq!(page.page, 1);

    let ack = artifacts.delete(created.id).await.unwrap();
    assert_eq!(ack.success, Some(true));

    let err = artifacts.get(created.id).await.unwrap_err();
    assert_eq!(err.status(), Some(404));
    assert_eq!(err.detail().as_deref(), Some("artifact not found"));
}

#[tokio::test]
async fn batch_import_counts_failures() {
    let client = start_server().await;
    let items = vec![json!({"title": "a", "content": "b"}), json!({"title": "no content"})];
    let result = client.artifacts().batch_import(&items).await.unwrap();
    assert_eq!(result.total_files, 2);
    assert_eq!(result.successful, 1);
    assert_eq!(result.failed, 1);
    assert_eq!(result.errors.len(), 1);
}

#[tokio::test]
async fn search_and_history() {
    let client = start_server().await;
    client
        .artifacts()
        .create(&artifact("Vector index", "hnsw graph"))
        .await
        .unwrap();

    let hits = client
        .search()
        .retrieve(&SearchRequest::new("vector graph"))
        .await
        .unwrap();
    assert_eq!(hits.total_count, 1);
    assert_eq!(hits.artifacts[0].similarity, Some(1.0));

    let history = client.search().history(None).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].query, "vector graph");

    let id = history[0].id.unwrap();
    client.search().delete_history(id).await.unwrap();
    assert!(client.search().history(Some(5)).await.unwrap().is_empty());

    let err = client.search().retrieve(&SearchRequest::new("")).await.unwrap_err();
    assert_eq!(err.status(), Some(422));
}

#[tokio::test]
async fn config_namespace() {
    let client = start_server().await;

    let config = client.config().get().await.unwrap();
    assert_eq!(config["search"]["top_k"], 5);

    let changed = client
        .config()
        .update(&json!({"search": {"top_k": 8, "threshold": 0.5}}))
        .await
        .unwrap();
    assert_eq!(changed.changed_keys, vec!["search"]);
    assert!(!changed.needs_restart);

    let probe = ServiceProbe {
        service_type: "openai-compatible".to_string(),
        base_url: "http://localhost:8080/v1".to_string(),
        model: "embed-small".to_string(),
        dimensions: Some(384),
        ..Default::default()
    };
    let result = client.config().test_embedding(&probe).await.unwrap();
    assert!(result.connected);
    assert_eq!(result.dimensions, Some(384));

    let result = client.config().test_llm(&probe).await.unwrap();
    assert_eq!(result.model, "embed-small");

    let err = client
        .config()
        .test_llm(&ServiceProbe::default())
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(400));
}

#[tokio::test]
async fn sqlite_namespace() {
    let client = start_server().await;
    let sqlite = client.sqlite();

    let err = sqlite.rows("users", &PageQuery::default()).await.unwrap_err();
    assert_eq!(err.detail().as_deref(), Some("invalid table name"));

    sqlite.init().await.unwrap();
    let tables = sqlite.tables().await.unwrap();
    assert_eq!(tables.len(), 3);

    let mut fields = BTreeMap::new();
    fields.insert("name", "x");
    let created = sqlite.create_record("chunks", &fields).await.unwrap();
    let record_id = created.record_id.unwrap();
    assert_eq!(record_id, json!(1));

    sqlite.update_record("chunks", 1, &json!({"name": "y"})).await.unwrap();
    let page = sqlite.rows("chunks", &PageQuery::new(1, 10)).await.unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.records[0]["name"], "y");
    assert!(page.columns.iter().any(|c| c.prop == "name"));

    sqlite.delete_record("chunks", 1).await.unwrap();
    let err = sqlite.delete_record("chunks", 1).await.unwrap_err();
    assert_eq!(err.status(), Some(404));
}

#[tokio::test]
async fn chromadb_namespace() {
    let client = start_server().await;
    let chroma = client.chromadb();

    chroma.init().await.unwrap();
    let created = chroma
        .create(&NewDocument {
            id: Some("doc-1".to_string()),
            document: Some("rust borrow checker".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(created.document_id, "doc-1");

    let generated = chroma
        .create(&NewDocument {
            embedding: Some(vec![0.5; 8]),
            ..Default::default()
        })
        .await
        .unwrap();
    assert!(generated.document_id.starts_with("doc_"));

    assert!(chroma.exists("doc-1").await.unwrap());
    assert!(!chroma.exists("missing").await.unwrap());

    let document = chroma.document("doc-1").await.unwrap();
    assert_eq!(document.embedding.map(|e| e.len()), Some(8));

    let page = chroma.documents(&PageQuery::default()).await.unwrap();
    assert_eq!(page.total, 2);
    assert!(page.records.iter().all(|d| d.has_embedding));

    let matches = chroma.search(&DocumentSearch::new("borrow checker")).await.unwrap();
    assert_eq!(matches.records[0].id, "doc-1");
    assert_eq!(matches.records[0].similarity, 1.0);

    chroma
        .update("doc-1", &json!({"document": "rust lifetimes"}))
        .await
        .unwrap();
    assert_eq!(chroma.document("doc-1").await.unwrap().document, "rust lifetimes");

    let info = chroma.info().await.unwrap();
    assert_eq!(info.count, 2);
    assert_eq!(info.dimension, Some(8));
    let collections = chroma.collections().await.unwrap();
    assert_eq!(collections[0].name, "artifact_embeddings");

    chroma.delete("doc-1").await.unwrap();
    chroma.recreate_collection().await.unwrap();
    assert_eq!(chroma.info().await.unwrap().count, 0);
}

#[tokio::test]
async fn concurrent_calls_fail_independently() {
    let client = start_server().await;
    let created = client.artifacts().create(&artifact("a", "b")).await.unwrap();

    let artifacts = client.artifacts();
    let (missing, found) = tokio::join!(artifacts.get(9999), artifacts.get(created.id));
    assert!(matches!(missing, Err(ApiError::Status { status: 404, .. })));
    assert_eq!(found.unwrap().id, created.id);
}

#[tokio::test]
async fn unreachable_backend_is_a_transport_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = ApiClient::new(ClientConfig::new(&format!("http://{addr}"))).unwrap();
    let err = client.system().health().await.unwrap_err();
    assert!(matches!(err, ApiError::Transport(_)));
}
