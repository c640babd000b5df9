//! Async client for the knowledge-base backend.
//!
//! # Overview
//! Wraps the backend's REST API (`/api/v1`) in six namespaces: `system`,
//! `artifacts`, `search`, `config`, `sqlite` and `chromadb`. Every
//! operation is one HTTP round-trip that resolves to the decoded payload.
//!
//! # Design
//! - `ApiClient` holds immutable configuration and an injected `Transport`;
//!   `ReqwestTransport` is the production one.
//! - A `RequestInterceptor` sees every request before it is sent; the
//!   response stage (`unwrap_payload` plus `ResponseInterceptor`) strips the
//!   envelope and reports each failure once.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.
//!
//! ```no_run
//! # async fn demo() -> Result<(), kb_client::ApiError> {
//! use kb_client::{ApiClient, ClientConfig, SearchRequest};
//!
//! let client = ApiClient::new(ClientConfig::from_env()?)?;
//! let hits = client.search().retrieve(&SearchRequest::new("vector index")).await?;
//! println!("{} hits", hits.total_count);
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod interceptor;
pub mod transport;
pub mod types;

pub use api::{LogSource, LogTarget};
pub use client::{ApiClient, ApiClientBuilder};
pub use config::ClientConfig;
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use interceptor::{
    unwrap_payload, ApiKeyHeader, LogFailures, Passthrough, RequestContext, RequestInterceptor,
    ResponseInterceptor,
};
pub use transport::{ReqwestTransport, Transport};
pub use types::*;
