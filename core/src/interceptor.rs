//! Request and response stages wrapped around every transport call.
//!
//! # Design
//! - `RequestInterceptor` sees each outgoing request once, after the URL is
//!   resolved and before the transport runs. It may add to the request or
//!   reject it, never change its shape.
//! - `unwrap_payload` is the single place that turns a response envelope
//!   into the caller's payload. It is not pluggable.
//! - `ResponseInterceptor::on_failure` is the single place failures are
//!   reported. The client calls it once per failed call and then returns
//!   the same error.

use serde::de::DeserializeOwned;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

pub const API_KEY_HEADER: &str = "X-API-Key";

/// Hook invoked before every request.
pub trait RequestInterceptor: Send + Sync {
    fn intercept(&self, request: HttpRequest) -> Result<HttpRequest, ApiError>;
}

/// Lets every request through untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct Passthrough;

impl RequestInterceptor for Passthrough {
    fn intercept(&self, request: HttpRequest) -> Result<HttpRequest, ApiError> {
        Ok(request)
    }
}

/// Adds the backend API key to every request.
#[derive(Debug, Clone)]
pub struct ApiKeyHeader {
    key: String,
}

impl ApiKeyHeader {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }
}

impl RequestInterceptor for ApiKeyHeader {
    fn intercept(&self, request: HttpRequest) -> Result<HttpRequest, ApiError> {
        if request.header(API_KEY_HEADER).is_some() {
            return Ok(request);
        }
        Ok(request.with_header(API_KEY_HEADER, self.key.clone()))
    }
}

/// Identifies the call a failure belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    pub method: HttpMethod,
    pub url: String,
}

/// Hook invoked once for every failed call.
pub trait ResponseInterceptor: Send + Sync {
    fn on_failure(&self, context: &RequestContext, error: &ApiError);
}

/// Emits one `error` event per failed call.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogFailures;

impl ResponseInterceptor for LogFailures {
    fn on_failure(&self, context: &RequestContext, error: &ApiError) {
        tracing::error!(
            method = %context.method,
            url = %context.url,
            status = ?error.status(),
            error = %error,
            "API request failed"
        );
    }
}

/// Reduce a response envelope to its payload.
///
/// Non-2xx statuses become `ApiError::Status`. An empty body is read as JSON
/// `null`, so `()` and `Option<_>` payloads accept `204 No Content`.
pub fn unwrap_payload<T: DeserializeOwned>(response: HttpResponse) -> Result<T, ApiError> {
    if !response.is_success() {
        return Err(ApiError::Status {
            status: response.status,
            body: response.body,
        });
    }
    let body = if response.body.trim().is_empty() {
        "null"
    } else {
        response.body.as_str()
    };
    serde_json::from_str(body).map_err(|e| ApiError::Deserialization(e.to_string()))
}
