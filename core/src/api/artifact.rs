//! Artifact CRUD and batch import.

use std::fmt::Display;

use serde::Serialize;

use crate::client::ApiClient;
use crate::error::ApiError;
use crate::http::HttpRequest;
use crate::types::{Ack, Artifact, ArtifactList, ImportResult};

/// The `artifact` namespace.
#[derive(Debug, Clone, Copy)]
pub struct ArtifactApi<'a> {
    client: &'a ApiClient,
}

impl<'a> ArtifactApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// One page of artifacts. `filters` is any flat object, typically an
    /// `ArtifactQuery`.
    pub async fn list<Q: Serialize + ?Sized>(&self, filters: &Q) -> Result<ArtifactList, ApiError> {
        self.client.send(HttpRequest::get("/artifacts").with_query(filters)?).await
    }

    pub async fn get(&self, id: impl Display) -> Result<Artifact, ApiError> {
        self.client.send(HttpRequest::get(format!("/artifacts/{id}"))).await
    }

    pub async fn create<B: Serialize + ?Sized>(&self, fields: &B) -> Result<Artifact, ApiError> {
        self.client.send(HttpRequest::post("/artifacts").with_json(fields)?).await
    }

    pub async fn update<B: Serialize + ?Sized>(&self, id: impl Display, fields: &B) -> Result<Artifact, ApiError> {
        self.client
            .send(HttpRequest::put(format!("/artifacts/{id}")).with_json(fields)?)
            .await
    }

    pub async fn delete(&self, id: impl Display) -> Result<Ack, ApiError> {
        self.client.send(HttpRequest::delete(format!("/artifacts/{id}"))).await
    }

    /// Create many artifacts in one call; the body is a JSON array.
    pub async fn batch_import<B: Serialize>(&self, items: &[B]) -> Result<ImportResult, ApiError> {
        self.client.send(HttpRequest::post("/artifacts/batch").with_json(items)?).await
    }
}
