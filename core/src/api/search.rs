//! Semantic retrieval and search history.

use std::fmt::Display;

use crate::client::ApiClient;
use crate::error::ApiError;
use crate::http::HttpRequest;
use crate::types::{Ack, Data, History, SearchHistoryEntry, SearchRequest, SearchResponse};

pub const DEFAULT_HISTORY_LIMIT: u32 = 10;

#[derive(serde::Serialize)]
struct Limit {
    limit: u32,
}

/// The `search` namespace.
#[derive(Debug, Clone, Copy)]
pub struct SearchApi<'a> {
    client: &'a ApiClient,
}

impl<'a> SearchApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn retrieve(&self, request: &SearchRequest) -> Result<SearchResponse, ApiError> {
        let wrapped: Data<SearchResponse> = self
            .client
            .send(HttpRequest::post("/search/retrieve").with_json(request)?)
            .await?;
        Ok(wrapped.data)
    }

    /// Most recent queries first; `limit` defaults to 10.
    pub async fn history(&self, limit: Option<u32>) -> Result<Vec<SearchHistoryEntry>, ApiError> {
        let request = HttpRequest::get("/search/history").with_query(&Limit {
            limit: limit.unwrap_or(DEFAULT_HISTORY_LIMIT),
        })?;
        let wrapped: History = self.client.send(request).await?;
        Ok(wrapped.history)
    }

    pub async fn delete_history(&self, id: impl Display) -> Result<Ack, ApiError> {
        self.client.send(HttpRequest::delete(format!("/search/history/{id}"))).await
    }
}
