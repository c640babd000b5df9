//! Error types for the knowledge-base API client.
//!
//! # Design
//! The client does not interpret status codes: every non-2xx response lands
//! in `Status` with the raw code and body, and callers decide what a 404 or
//! a 422 means to them. `detail()` only digs the backend's human-readable
//! message out of the body for display.

use serde::Deserialize;

/// Errors returned by `ApiClient` and every namespace operation.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// No response was received.
    #[error("transport error: {0}")]
    Transport(String),

    /// The shared request timeout elapsed.
    #[error("request timed out")]
    Timeout,

    /// The server answered with a non-2xx status.
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The request body or query could not be encoded.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// The response body could not be decoded into the expected payload.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// A request interceptor refused to let the request through.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("unknown log target `{0}` (expected `database` or `server`)")]
    UnknownLogTarget(String),

    #[error("invalid client configuration: {0}")]
    Config(String),
}

#[derive(Deserialize)]
struct ErrorBody {
    detail: serde_json::Value,
}

impl ApiError {
    /// Status code of a `Status` error.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// The backend's `detail` message, when the error body carries one.
    pub fn detail(&self) -> Option<String> {
        let ApiError::Status { body, .. } = self else {
            return None;
        };
        let parsed: ErrorBody = serde_json::from_str(body).ok()?;
        match parsed.detail {
            serde_json::Value::String(s) => Some(s),
            other => Some(other.to_string()),
        }
    }
}
