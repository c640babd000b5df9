//! The default response stage logs each failed call exactly once.
//!
//! A counting `tracing_subscriber` layer is installed as the thread's
//! default subscriber; `#[tokio::test]` runs on the current thread, so every
//! event emitted while the futures are polled reaches it.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use kb_client::{ApiClient, ApiError, ClientConfig, HttpRequest, HttpResponse, Transport};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

#[derive(Clone, Default)]
struct ErrorCount(Arc<AtomicUsize>);

impl ErrorCount {
    fn get(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

impl<S: Subscriber> Layer<S> for ErrorCount {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        if *event.metadata().level() == Level::ERROR {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }
}

/// Fails every `/artifacts/...` call with a 404 and answers anything else.
struct Backend;

#[async_trait]
impl Transport for Backend {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        let (status, body) = if request.path.contains("/artifacts/") {
            (404, r#"{"detail":"artifact not found"}"#)
        } else {
            (200, r#"{"status":"healthy"}"#)
        };
        Ok(HttpResponse {
            status,
            headers: Vec::new(),
            body: body.to_string(),
        })
    }
}

fn client() -> ApiClient {
    ApiClient::builder(ClientConfig::new("http://kb.test"))
        .transport(Backend)
        .build()
        .unwrap()
}

#[tokio::test]
async fn failed_call_logs_once_and_still_fails() {
    let errors = ErrorCount::default();
    let _guard = tracing::subscriber::set_default(tracing_subscriber::registry().with(errors.clone()));

    let err = client().artifacts().get(42).await.unwrap_err();
    assert_eq!(err.status(), Some(404));
    assert_eq!(errors.get(), 1);
}

#[tokio::test]
async fn successful_call_logs_nothing() {
    let errors = ErrorCount::default();
    let _guard = tracing::subscriber::set_default(tracing_subscriber::registry().with(errors.clone()));

    let health = client().system().health().await.unwrap();
    assert_eq!(health.status, "healthy");
    assert_eq!(errors.get(), 0);
}

#[tokio::test]
async fn concurrent_failure_does_not_affect_sibling() {
    let errors = ErrorCount::default();
    let _guard = tracing::subscriber::set_default(tracing_subscriber::registry().with(errors.clone()));

    let client = client();
    let artifacts = client.artifacts();
    let system = client.system();
    let (missing, health) = tokio::join!(artifacts.get(7), system.health());

    assert!(missing.is_err());
    assert_eq!(health.unwrap().status, "healthy");
    assert_eq!(errors.get(), 1);
}
