//! Verify every operation against JSON test vectors stored in `test-vectors/`.
//!
//! Each case names an operation and its arguments, the request it must
//! produce, a simulated response and the expected payload or error. A
//! recording transport stands in for the network. Bodies and payloads are
//! compared as parsed JSON and query pairs as sorted lists, so field order
//! never matters.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use kb_client::{
    ApiClient, ApiError, ClientConfig, DocumentSearch, HttpMethod, HttpRequest, HttpResponse,
    LogSource, LogTarget, NewDocument, SearchRequest, Transport,
};
use serde::Serialize;
use serde_json::Value;

const BASE_URL: &str = "http://localhost:8000";

/// Records each request and answers with one canned response.
struct Recorder {
    seen: Mutex<Vec<HttpRequest>>,
    response: HttpResponse,
}

#[async_trait]
impl Transport for Recorder {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        self.seen.lock().unwrap().push(request);
        Ok(self.response.clone())
    }
}

/// Parse the method string from test vectors into `HttpMethod`.
fn parse_method(s: &str) -> HttpMethod {
    match s {
        "GET" => HttpMethod::Get,
        "POST" => HttpMethod::Post,
        "PUT" => HttpMethod::Put,
        "DELETE" => HttpMethod::Delete,
        other => panic!("unknown method: {other}"),
    }
}

fn value<T: Serialize>(payload: T) -> Value {
    serde_json::to_value(payload).unwrap()
}

/// Identifiers arrive as JSON numbers or strings.
fn id(args: &Value, key: &str) -> String {
    match &args[key] {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn text<'a>(args: &'a Value, key: &str) -> &'a str {
    args[key].as_str().unwrap()
}

fn limit(args: &Value, key: &str) -> Option<u32> {
    args[key].as_u64().map(|n| n as u32)
}

async fn run(client: &ApiClient, op: &str, args: &Value) -> Result<Value, ApiError> {
    let result = match op {
        "system.health" => value(client.system().health().await?),
        "system.metrics" => value(client.system().metrics().await?),
        "system.info" => value(client.system().info().await?),
        "system.reindex_vectors" => value(client.system().reindex_vectors().await?),
        "system.log_data" => {
            let source = LogSource::from_name(text(args, "source"));
            value(client.system().log_data(source, limit(args, "lines")).await?)
        }
        "system.clear_log" => {
            let target: LogTarget = text(args, "target").parse()?;
            value(client.system().clear_log(target).await?)
        }
        "system.restart_server" => value(client.system().restart_server().await?),
        "system.shutdown_server" => value(client.system().shutdown_server().await?),

        "artifacts.list" => value(client.artifacts().list(&args["query"]).await?),
        "artifacts.get" => value(client.artifacts().get(id(args, "id")).await?),
        "artifacts.create" => value(client.artifacts().create(&args["body"]).await?),
        "artifacts.update" => value(client.artifacts().update(id(args, "id"), &args["body"]).await?),
        "artifacts.delete" => value(client.artifacts().delete(id(args, "id")).await?),
        "artifacts.batch_import" => {
            let items = args["items"].as_array().unwrap();
            value(client.artifacts().batch_import(items).await?)
        }

        "search.retrieve" => {
            let request: SearchRequest = serde_json::from_value(args["request"].clone()).unwrap();
            value(client.search().retrieve(&request).await?)
        }
        "search.history" => value(client.search().history(limit(args, "limit")).await?),
        "search.delete_history" => value(client.search().delete_history(id(args, "id")).await?),

        "config.get" => client.config().get().await?,
        "config.update" => value(client.config().update(&args["body"]).await?),
        "config.test_llm" => value(client.config().test_llm(&args["body"]).await?),
        "config.test_embedding" => value(client.config().test_embedding(&args["body"]).await?),

        "sqlite.tables" => value(client.sqlite().tables().await?),
        "sqlite.rows" => value(client.sqlite().rows(text(args, "table"), &args["query"]).await?),
        "sqlite.create_record" => {
            value(client.sqlite().create_record(text(args, "table"), &args["body"]).await?)
        }
        "sqlite.update_record" => value(
            client
                .sqlite()
                .update_record(text(args, "table"), id(args, "record_id"), &args["body"])
                .await?,
        ),
        "sqlite.delete_record" => {
            value(client.sqlite().delete_record(text(args, "table"), id(args, "record_id")).await?)
        }
        "sqlite.init" => value(client.sqlite().init().await?),

        "chromadb.documents" => value(client.chromadb().documents(&args["query"]).await?),
        "chromadb.search" => {
            let request: DocumentSearch = serde_json::from_value(args["request"].clone()).unwrap();
            value(client.chromadb().search(&request).await?)
        }
        "chromadb.create" => {
            let document: NewDocument = serde_json::from_value(args["document"].clone()).unwrap();
            value(client.chromadb().create(&document).await?)
        }
        "chromadb.update" => value(client.chromadb().update(id(args, "id"), &args["body"]).await?),
        "chromadb.delete" => value(client.chromadb().delete(id(args, "id")).await?),
        "chromadb.exists" => value(client.chromadb().exists(id(args, "id")).await?),
        "chromadb.document" => value(client.chromadb().document(id(args, "id")).await?),
        "chromadb.init" => value(client.chromadb().init().await?),
        "chromadb.info" => value(client.chromadb().info().await?),
        "chromadb.collections" => value(client.chromadb().collections().await?),
        "chromadb.recreate_collection" => value(client.chromadb().recreate_collection().await?),

        other => panic!("unknown operation: {other}"),
    };
    Ok(result)
}

fn simulated(case: &Value) -> HttpResponse {
    let sim = &case["simulated_response"];
    let body = match &sim["body"] {
        Value::Null => String::new(),
        Value::String(raw) => raw.clone(),
        other => other.to_string(),
    };
    HttpResponse {
        status: sim["status"].as_u64().unwrap_or(200) as u16,
        headers: Vec::new(),
        body,
    }
}

fn sorted(mut pairs: Vec<(String, String)>) -> Vec<(String, String)> {
    pairs.sort();
    pairs
}

fn check_request(name: &str, expected: &Value, seen: &[HttpRequest]) {
    if expected.is_null() {
        assert!(seen.is_empty(), "{name}: no request should be sent");
        return;
    }
    assert_eq!(seen.len(), 1, "{name}: exactly one request");
    let req = &seen[0];

    assert_eq!(req.method, parse_method(expected["method"].as_str().unwrap()), "{name}: method");
    assert_eq!(req.path, format!("{BASE_URL}{}", expected["path"].as_str().unwrap()), "{name}: path");

    let expected_query: Vec<(String, String)> = expected["query"]
        .as_array()
        .map(|pairs| {
            pairs
                .iter()
                .map(|p| (p[0].as_str().unwrap().to_string(), p[1].as_str().unwrap().to_string()))
                .collect()
        })
        .unwrap_or_default();
    assert_eq!(sorted(req.query.clone()), sorted(expected_query), "{name}: query");

    match expected.get("body") {
        Some(body) => {
            let sent: Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
            assert_eq!(&sent, body, "{name}: body");
            assert_eq!(req.header("content-type"), Some("application/json"), "{name}: content type");
        }
        None => assert!(req.body.is_none(), "{name}: body should be None"),
    }
}

fn check_error(name: &str, expected: &Value, err: &ApiError) {
    if let Some(status) = expected.get("status") {
        assert_eq!(err.status().map(u64::from), status.as_u64(), "{name}: status");
    }
    if let Some(detail) = expected.get("detail") {
        assert_eq!(err.detail().as_deref(), detail.as_str(), "{name}: detail");
    }
    match expected.get("kind").and_then(Value::as_str) {
        Some("UnknownLogTarget") => assert!(matches!(err, ApiError::UnknownLogTarget(_)), "{name}: {err}"),
        Some("Deserialization") => assert!(matches!(err, ApiError::Deserialization(_)), "{name}: {err}"),
        Some(other) => panic!("{name}: unknown expected error kind: {other}"),
        None => {}
    }
}

async fn check_vectors(raw: &str) {
    let vectors: Value = serde_json::from_str(raw).unwrap();
    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let recorder = Arc::new(Recorder {
            seen: Mutex::new(Vec::new()),
            response: simulated(case),
        });
        let client = ApiClient::builder(ClientConfig::new(BASE_URL))
            .transport(recorder.clone())
            .build()
            .unwrap();

        let result = run(&client, case["op"].as_str().unwrap(), &case["args"]).await;
        check_request(name, &case["expected_request"], &recorder.seen.lock().unwrap());

        match (case.get("expected_error"), result) {
            (Some(expected), Err(err)) => check_error(name, expected, &err),
            (Some(_), Ok(payload)) => panic!("{name}: expected an error, got {payload}"),
            (None, Err(err)) => panic!("{name}: unexpected error: {err}"),
            (None, Ok(payload)) => {
                if let Some(expected) = case.get("expected_result") {
                    assert_eq!(&payload, expected, "{name}: payload");
                }
            }
        }
    }
}

#[tokio::test]
async fn system_test_vectors() {
    check_vectors(include_str!("../../test-vectors/system.json")).await;
}

#[tokio::test]
async fn artifacts_test_vectors() {
    check_vectors(include_str!("../../test-vectors/artifacts.json")).await;
}

#[tokio::test]
async fn search_test_vectors() {
    check_vectors(include_str!("../../test-vectors/search.json")).await;
}

#[tokio::test]
async fn config_test_vectors() {
    check_vectors(include_str!("../../test-vectors/config.json")).await;
}

#[tokio::test]
async fn sqlite_test_vectors() {
    check_vectors(include_str!("../../test-vectors/sqlite.json")).await;
}

#[tokio::test]
async fn chromadb_test_vectors() {
    check_vectors(include_str!("../../test-vectors/chromadb.json")).await;
}
