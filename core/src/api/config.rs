//! Backend configuration and connectivity probes.

use serde::Serialize;
use serde_json::Value;

use crate::client::ApiClient;
use crate::error::ApiError;
use crate::http::HttpRequest;
use crate::types::{ConfigUpdateResult, Data, ServiceProbeResult};

/// The `config` namespace.
#[derive(Debug, Clone, Copy)]
pub struct ConfigApi<'a> {
    client: &'a ApiClient,
}

impl<'a> ConfigApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// The backend's full configuration tree.
    pub async fn get(&self) -> Result<Value, ApiError> {
        let wrapped: Data<Value> = self.client.send(HttpRequest::get("/config")).await?;
        Ok(wrapped.data)
    }

    pub async fn update<B: Serialize + ?Sized>(&self, fields: &B) -> Result<ConfigUpdateResult, ApiError> {
        self.client.send(HttpRequest::post("/config").with_json(fields)?).await
    }

    /// Try a chat round-trip against candidate LLM settings.
    pub async fn test_llm<B: Serialize + ?Sized>(&self, candidate: &B) -> Result<ServiceProbeResult, ApiError> {
        self.probe("/config/test-llm", candidate).await
    }

    /// Try embedding a sample text with candidate embedding settings.
    pub async fn test_embedding<B: Serialize + ?Sized>(
        &self,
        candidate: &B,
    ) -> Result<ServiceProbeResult, ApiError> {
        self.probe("/config/test-embedding", candidate).await
    }

    async fn probe<B: Serialize + ?Sized>(&self, path: &str, candidate: &B) -> Result<ServiceProbeResult, ApiError> {
        let wrapped: Data<ServiceProbeResult> =
            self.client.send(HttpRequest::post(path).with_json(candidate)?).await?;
        Ok(wrapped.data)
    }
}
