//! Raw access to the backend's SQLite tables.

use std::fmt::Display;

use serde::Serialize;

use crate::client::ApiClient;
use crate::error::ApiError;
use crate::http::HttpRequest;
use crate::types::{Ack, Data, RecordCreated, TablePage, TableSummary, Tables};

/// The `sqlite` namespace.
#[derive(Debug, Clone, Copy)]
pub struct SqliteApi<'a> {
    client: &'a ApiClient,
}

impl<'a> SqliteApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// User tables with their row counts.
    pub async fn tables(&self) -> Result<Vec<TableSummary>, ApiError> {
        let wrapped: Data<Tables> = self.client.send(HttpRequest::get("/sqlite/tables")).await?;
        Ok(wrapped.data.tables)
    }

    pub async fn rows<Q: Serialize + ?Sized>(&self, table: &str, query: &Q) -> Result<TablePage, ApiError> {
        let request = HttpRequest::get(format!("/sqlite/tables/{table}")).with_query(query)?;
        let wrapped: Data<TablePage> = self.client.send(request).await?;
        Ok(wrapped.data)
    }

    pub async fn create_record<B: Serialize + ?Sized>(&self, table: &str, fields: &B) -> Result<RecordCreated, ApiError> {
        self.client
            .send(HttpRequest::post(format!("/sqlite/tables/{table}")).with_json(fields)?)
            .await
    }

    pub async fn update_record<B: Serialize + ?Sized>(
        &self,
        table: &str,
        record_id: impl Display,
        fields: &B,
    ) -> Result<Ack, ApiError> {
        self.client
            .send(HttpRequest::put(format!("/sqlite/tables/{table}/{record_id}")).with_json(fields)?)
            .await
    }

    pub async fn delete_record(&self, table: &str, record_id: impl Display) -> Result<Ack, ApiError> {
        self.client
            .send(HttpRequest::delete(format!("/sqlite/tables/{table}/{record_id}")))
            .await
    }

    /// Create any missing tables.
    pub async fn init(&self) -> Result<Ack, ApiError> {
        self.client.send(HttpRequest::post("/sqlite/init")).await
    }
}
