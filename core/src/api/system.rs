//! Health, metrics, logs and server lifecycle.

use std::fmt;
use std::str::FromStr;

use crate::client::ApiClient;
use crate::error::ApiError;
use crate::http::HttpRequest;
use crate::types::{Ack, HealthStatus, LogData, ReindexResult, SystemInfo, SystemMetrics};

pub const DEFAULT_LOG_LINES: u32 = 100;

/// Which log to read.
///
/// Built from a name with `LogSource::from_name`: `database` and `server`
/// select one file, any other name reads both.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogSource {
    #[default]
    All,
    Database,
    Server,
}

impl LogSource {
    pub fn from_name(name: &str) -> Self {
        match name {
            "database" => LogSource::Database,
            "server" => LogSource::Server,
            _ => LogSource::All,
        }
    }

    fn path(&self) -> &'static str {
        match self {
            LogSource::All => "/logs",
            LogSource::Database => "/logs/database",
            LogSource::Server => "/logs/server",
        }
    }
}

/// Which log to clear. There is no "all" target, so unknown names are an
/// error rather than a silent no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTarget {
    Database,
    Server,
}

impl LogTarget {
    fn path(&self) -> &'static str {
        match self {
            LogTarget::Database => "/logs/database",
            LogTarget::Server => "/logs/server",
        }
    }
}

impl FromStr for LogTarget {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "database" => Ok(LogTarget::Database),
            "server" => Ok(LogTarget::Server),
            other => Err(ApiError::UnknownLogTarget(other.to_string())),
        }
    }
}

impl fmt::Display for LogTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogTarget::Database => f.write_str("database"),
            LogTarget::Server => f.write_str("server"),
        }
    }
}

#[derive(serde::Serialize)]
struct Lines {
    lines: u32,
}

/// The `system` namespace.
#[derive(Debug, Clone, Copy)]
pub struct SystemApi<'a> {
    client: &'a ApiClient,
}

impl<'a> SystemApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn health(&self) -> Result<HealthStatus, ApiError> {
        self.client.send(HttpRequest::get("/health")).await
    }

    pub async fn metrics(&self) -> Result<SystemMetrics, ApiError> {
        self.client.send(HttpRequest::get("/metrics")).await
    }

    pub async fn info(&self) -> Result<SystemInfo, ApiError> {
        self.client.send(HttpRequest::get("/info")).await
    }

    /// Rebuild the vector index from every active artifact.
    pub async fn reindex_vectors(&self) -> Result<ReindexResult, ApiError> {
        self.client.send(HttpRequest::post("/reindex")).await
    }

    /// The last `lines` lines (100 when `None`) of the selected log.
    pub async fn log_data(&self, source: LogSource, lines: Option<u32>) -> Result<LogData, ApiError> {
        let request = HttpRequest::get(source.path()).with_query(&Lines {
            lines: lines.unwrap_or(DEFAULT_LOG_LINES),
        })?;
        self.client.send(request).await
    }

    pub async fn clear_log(&self, target: LogTarget) -> Result<Ack, ApiError> {
        self.client.send(HttpRequest::delete(target.path())).await
    }

    pub async fn restart_server(&self) -> Result<Ack, ApiError> {
        self.client.send(HttpRequest::post("/server/restart")).await
    }

    pub async fn shutdown_server(&self) -> Result<Ack, ApiError> {
        self.client.send(HttpRequest::post("/server/shutdown")).await
    }
}
