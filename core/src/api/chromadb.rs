//! Direct access to the ChromaDB vector collection.

use std::fmt::Display;

use serde::Serialize;

use crate::client::ApiClient;
use crate::error::ApiError;
use crate::http::HttpRequest;
use crate::types::{
    Ack, CollectionInfo, CollectionSummary, Collections, Data, Document, DocumentCreated, DocumentMatches,
    DocumentPage, DocumentSearch, Exists, NewDocument,
};

/// The `chromadb` namespace.
#[derive(Debug, Clone, Copy)]
pub struct ChromaApi<'a> {
    client: &'a ApiClient,
}

impl<'a> ChromaApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// One page of documents. Vectors are reduced to `has_embedding`.
    pub async fn documents<Q: Serialize + ?Sized>(&self, query: &Q) -> Result<DocumentPage, ApiError> {
        let request = HttpRequest::get("/chromadb/documents").with_query(query)?;
        let wrapped: Data<DocumentPage> = self.client.send(request).await?;
        Ok(wrapped.data)
    }

    pub async fn search(&self, request: &DocumentSearch) -> Result<DocumentMatches, ApiError> {
        let wrapped: Data<DocumentMatches> = self
            .client
            .send(HttpRequest::post("/chromadb/documents/search").with_json(request)?)
            .await?;
        Ok(wrapped.data)
    }

    pub async fn create(&self, document: &NewDocument) -> Result<DocumentCreated, ApiError> {
        self.client
            .send(HttpRequest::post("/chromadb/documents").with_json(document)?)
            .await
    }

    pub async fn update<B: Serialize + ?Sized>(&self, id: impl Display, fields: &B) -> Result<Ack, ApiError> {
        self.client
            .send(HttpRequest::put(format!("/chromadb/documents/{id}")).with_json(fields)?)
            .await
    }

    pub async fn delete(&self, id: impl Display) -> Result<Ack, ApiError> {
        self.client.send(HttpRequest::delete(format!("/chromadb/documents/{id}"))).await
    }

    pub async fn exists(&self, id: impl Display) -> Result<bool, ApiError> {
        let answer: Exists = self
            .client
            .send(HttpRequest::get(format!("/chromadb/documents/{id}/exists")))
            .await?;
        Ok(answer.exists)
    }

    /// The full document, embedding included.
    pub async fn document(&self, id: impl Display) -> Result<Document, ApiError> {
        let wrapped: Data<Document> = self
            .client
            .send(HttpRequest::get(format!("/chromadb/documents/{id}")))
            .await?;
        Ok(wrapped.data)
    }

    pub async fn init(&self) -> Result<Ack, ApiError> {
        self.client.send(HttpRequest::post("/chromadb/init")).await
    }

    pub async fn info(&self) -> Result<CollectionInfo, ApiError> {
        let wrapped: Data<CollectionInfo> = self.client.send(HttpRequest::get("/chromadb/info")).await?;
        Ok(wrapped.data)
    }

    pub async fn collections(&self) -> Result<Vec<CollectionSummary>, ApiError> {
        let wrapped: Data<Collections> = self.client.send(HttpRequest::get("/chromadb/collections")).await?;
        Ok(wrapped.data.collections)
    }

    /// Drop the artifact collection and create it again, empty.
    pub async fn recreate_collection(&self) -> Result<Ack, ApiError> {
        self.client.send(HttpRequest::post("/chromadb/collections/recreate")).await
    }
}
