//! The shared API client.
//!
//! # Design
//! `ApiClient` is an `Arc` around immutable state: the configuration, the
//! transport and the two interceptor stages. Cloning is cheap and clones
//! share one connection pool. Namespaces are short-lived borrowed views
//! (`client.artifacts().get(42)`), so there is no global client and tests
//! inject a fake `Transport` through `ApiClientBuilder`.

use std::fmt;
use std::sync::Arc;

use serde::de::DeserializeOwned;

use crate::api::{ArtifactApi, ChromaApi, ConfigApi, SearchApi, SqliteApi, SystemApi};
use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::http::{HttpRequest, APPLICATION_JSON, CONTENT_TYPE};
use crate::interceptor::{
    unwrap_payload, ApiKeyHeader, LogFailures, Passthrough, RequestContext, RequestInterceptor,
    ResponseInterceptor,
};
use crate::transport::{ReqwestTransport, Transport};

/// Async client for the knowledge-base backend.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<Inner>,
}

struct Inner {
    config: ClientConfig,
    root: String,
    transport: Arc<dyn Transport>,
    request_stage: Arc<dyn RequestInterceptor>,
    response_stage: Arc<dyn ResponseInterceptor>,
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("root", &self.inner.root)
            .field("timeout", &self.inner.config.timeout)
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Client with the production transport and default stages.
    pub fn new(config: ClientConfig) -> Result<Self, ApiError> {
        Self::builder(config).build()
    }

    pub fn builder(config: ClientConfig) -> ApiClientBuilder {
        ApiClientBuilder {
            config,
            transport: None,
            request_stage: None,
            response_stage: None,
        }
    }

    pub fn client_config(&self) -> &ClientConfig {
        &self.inner.config
    }

    /// Absolute URL for an operation path.
    pub fn resolve(&self, path: &str) -> String {
        format!("{}{}", self.inner.root, path)
    }

    pub fn system(&self) -> SystemApi<'_> {
        SystemApi::new(self)
    }

    pub fn artifacts(&self) -> ArtifactApi<'_> {
        ArtifactApi::new(self)
    }

    pub fn search(&self) -> SearchApi<'_> {
        SearchApi::new(self)
    }

    pub fn config(&self) -> ConfigApi<'_> {
        ConfigApi::new(self)
    }

    pub fn sqlite(&self) -> SqliteApi<'_> {
        SqliteApi::new(self)
    }

    pub fn chromadb(&self) -> ChromaApi<'_> {
        ChromaApi::new(self)
    }

    /// Send `request` through both stages and return the decoded payload.
    ///
    /// `request.path` is relative to the API root. Every failure, whatever
    /// its origin, is reported to the response stage exactly once before it
    /// is returned.
    pub async fn send<T: DeserializeOwned>(&self, request: HttpRequest) -> Result<T, ApiError> {
        let context = RequestContext {
            method: request.method,
            url: self.resolve(&request.path),
        };
        let result = self.round_trip(&context, request).await;
        if let Err(err) = &result {
            self.inner.response_stage.on_failure(&context, err);
        }
        result
    }

    async fn round_trip<T: DeserializeOwned>(
        &self,
        context: &RequestContext,
        mut request: HttpRequest,
    ) -> Result<T, ApiError> {
        request.path = context.url.clone();
        if request.body.is_some() && request.header(CONTENT_TYPE).is_none() {
            request.headers.push((CONTENT_TYPE.to_string(), APPLICATION_JSON.to_string()));
        }

        let request = self.inner.request_stage.intercept(request)?;
        tracing::debug!(method = %request.method, url = %request.path, "sending API request");

        let response = self.inner.transport.execute(request).await?;
        unwrap_payload(response)
    }
}

/// Assembles an `ApiClient`; anything left unset gets the production default.
pub struct ApiClientBuilder {
    config: ClientConfig,
    transport: Option<Arc<dyn Transport>>,
    request_stage: Option<Arc<dyn RequestInterceptor>>,
    response_stage: Option<Arc<dyn ResponseInterceptor>>,
}

impl ApiClientBuilder {
    pub fn transport(mut self, transport: impl Transport + 'static) -> Self {
        self.transport = Some(Arc::new(transport));
        self
    }

    /// Replaces the default stage, including the API-key header.
    pub fn request_interceptor(mut self, stage: impl RequestInterceptor + 'static) -> Self {
        self.request_stage = Some(Arc::new(stage));
        self
    }

    pub fn response_interceptor(mut self, stage: impl ResponseInterceptor + 'static) -> Self {
        self.response_stage = Some(Arc::new(stage));
        self
    }

    pub fn build(self) -> Result<ApiClient, ApiError> {
        let transport: Arc<dyn Transport> = match self.transport {
            Some(transport) => transport,
            None => Arc::new(ReqwestTransport::new(&self.config)?),
        };
        let request_stage: Arc<dyn RequestInterceptor> = match (self.request_stage, &self.config.api_key) {
            (Some(stage), _) => stage,
            (None, Some(key)) => Arc::new(ApiKeyHeader::new(key.clone())),
            (None, None) => Arc::new(Passthrough),
        };
        let response_stage = self.response_stage.unwrap_or_else(|| Arc::new(LogFailures));

        Ok(ApiClient {
            inner: Arc::new(Inner {
                root: self.config.root(),
                config: self.config,
                transport,
                request_stage,
                response_stage,
            }),
        })
    }
}
