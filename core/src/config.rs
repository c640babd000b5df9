//! Client configuration.
//!
//! Fixed at construction; there is no API to change it afterwards.

use std::time::Duration;

use serde::Deserialize;

use crate::error::ApiError;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";
pub const DEFAULT_API_PREFIX: &str = "/api/v1";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(10_000);

pub const ENV_BASE_URL: &str = "KB_API_URL";
pub const ENV_API_PREFIX: &str = "KB_API_PREFIX";
pub const ENV_TIMEOUT_MS: &str = "KB_API_TIMEOUT_MS";
pub const ENV_API_KEY: &str = "KB_API_KEY";

/// Where the backend lives and how long a single call may take.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Scheme, host and port of the backend.
    pub base_url: String,
    /// Root path prepended to every operation path.
    pub api_prefix: String,
    #[serde(rename = "timeout_ms", deserialize_with = "millis")]
    pub timeout: Duration,
    /// Sent as `X-API-Key` when present.
    pub api_key: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_prefix: DEFAULT_API_PREFIX.to_string(),
            timeout: DEFAULT_TIMEOUT,
            api_key: None,
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
            ..Self::default()
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Defaults overlaid with `KB_API_URL`, `KB_API_PREFIX`,
    /// `KB_API_TIMEOUT_MS` and `KB_API_KEY`.
    pub fn from_env() -> Result<Self, ApiError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ApiError> {
        let mut config = Self::default();
        if let Some(url) = lookup(ENV_BASE_URL) {
            config.base_url = url;
        }
        if let Some(prefix) = lookup(ENV_API_PREFIX) {
            config.api_prefix = prefix;
        }
        if let Some(raw) = lookup(ENV_TIMEOUT_MS) {
            let ms: u64 = raw
                .trim()
                .parse()
                .map_err(|_| ApiError::Config(format!("{ENV_TIMEOUT_MS} must be milliseconds, got `{raw}`")))?;
            config.timeout = Duration::from_millis(ms);
        }
        config.api_key = lookup(ENV_API_KEY).filter(|k| !k.is_empty());
        Ok(config)
    }

    /// Origin plus prefix, without a trailing slash.
    pub fn root(&self) -> String {
        let base = self.base_url.trim_end_matches('/');
        let prefix = self.api_prefix.trim_matches('/');
        if prefix.is_empty() {
            base.to_string()
        } else {
            format!("{base}/{prefix}")
        }
    }
}

fn millis<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: serde::Deserializer<'de>,
{
    u64::deserialize(deserializer).map(Duration::from_millis)
}
