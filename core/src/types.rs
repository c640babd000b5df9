//! Wire DTOs for the knowledge-base API.
//!
//! # Design
//! These types mirror the backend's JSON but are defined independently of
//! the mock server; the integration tests catch schema drift. Response types
//! tolerate unknown fields and default every optional one, since the backend
//! adds fields freely. Request types skip unset optionals so partial updates
//! only send what the caller set.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A JSON object, used where the backend's shape is table- or user-defined.
pub type Record = Map<String, Value>;

// ---------------------------------------------------------------------------
// Unwrapping helpers
// ---------------------------------------------------------------------------

/// `{"data": T}`, the backend's usual wrapper.
#[derive(Debug, Deserialize)]
pub(crate) struct Data<T> {
    pub data: T,
}

// ---------------------------------------------------------------------------
// System
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub services: HashMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SystemMetrics {
    #[serde(default)]
    pub uptime: f64,
    #[serde(default)]
    pub artifact_count: u64,
    #[serde(default)]
    pub chunk_count: u64,
    #[serde(default)]
    pub search_count: u64,
    #[serde(default)]
    pub avg_response_time: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SystemInfo {
    pub app_name: String,
    pub version: String,
    #[serde(default)]
    pub environment: Option<String>,
    #[serde(default)]
    pub dependencies: HashMap<String, String>,
}

/// Generic `{"success": …, "message": …}` acknowledgement. Some routes
/// only send `message`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Ack {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReindexResult {
    #[serde(flatten)]
    pub ack: Ack,
    #[serde(default)]
    pub reindexed_count: Option<u64>,
}

/// Log lines. A single-source read fills `logs`; the combined read fills
/// `database_logs` and `server_logs`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct LogData {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub logs: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub database_logs: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub server_logs: Vec<String>,
}

// ---------------------------------------------------------------------------
// Artifacts
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChunkInfo {
    pub chunk_id: i64,
    pub content: String,
    #[serde(default)]
    pub similarity: Option<f64>,
    pub chunk_index: i64,
}

/// A stored artifact as returned by the backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Artifact {
    pub id: i64,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub metadata: Option<Value>,
    #[serde(default)]
    pub source_type: Option<String>,
    #[serde(default)]
    pub source_path: Option<String>,
    #[serde(default)]
    pub similarity: Option<f64>,
    #[serde(default)]
    pub chunks: Option<Vec<ChunkInfo>>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default = "active")]
    pub is_active: bool,
}

fn active() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ArtifactList {
    pub artifacts: Vec<Artifact>,
    pub total_count: u64,
    pub page: u32,
    pub size: u32,
}

/// Filters for `ArtifactApi::list`. The backend pages with `page` (from 1)
/// and `size` (1..=100).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ArtifactQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keyword: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct NewArtifact {
    pub title: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_path: Option<String>,
}

/// Only the fields that are set are sent.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ArtifactUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ImportResult {
    #[serde(default)]
    pub total_files: u64,
    #[serde(default)]
    pub successful: u64,
    #[serde(default)]
    pub failed: u64,
    #[serde(default)]
    pub errors: Vec<String>,
    #[serde(default)]
    pub processing_time: f64,
}

// ---------------------------------------------------------------------------
// Search
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchRequest {
    pub query: String,
    #[serde(default = "default_top_k")]
    pub top_k: u32,
    #[serde(default = "default_threshold")]
    pub threshold: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_filter: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata_filter: Option<Record>,
}

fn default_top_k() -> u32 {
    5
}

fn default_threshold() -> f64 {
    0.7
}

impl SearchRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            top_k: default_top_k(),
            threshold: default_threshold(),
            category_filter: None,
            metadata_filter: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchResponse {
    pub query: String,
    pub artifacts: Vec<Artifact>,
    pub total_count: u64,
    #[serde(default)]
    pub response_time: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchHistoryEntry {
    #[serde(default)]
    pub id: Option<i64>,
    pub query: String,
    #[serde(default)]
    pub artifact_count: i64,
    #[serde(default)]
    pub response_time: f64,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct History {
    pub history: Vec<SearchHistoryEntry>,
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConfigUpdateResult {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub changed_keys: Vec<String>,
    #[serde(default)]
    pub needs_restart: bool,
}

/// Candidate LLM or embedding service settings to test before saving.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ServiceProbe {
    pub service_type: String,
    pub base_url: String,
    #[serde(default)]
    pub api_key: String,
    pub model: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ServiceProbeResult {
    pub connected: bool,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub service_type: String,
    #[serde(default)]
    pub response_preview: Option<String>,
    #[serde(default)]
    pub dimensions: Option<u32>,
}

// ---------------------------------------------------------------------------
// SQLite
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TableSummary {
    pub name: String,
    #[serde(default)]
    pub count: u64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Tables {
    pub tables: Vec<TableSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TableColumn {
    pub prop: String,
    pub label: String,
    #[serde(rename = "type", default)]
    pub kind: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TablePage {
    pub records: Vec<Record>,
    #[serde(default)]
    pub columns: Vec<TableColumn>,
    pub total: u64,
    pub page: u32,
    pub size: u32,
}

/// `page` (from 1) and `size` paging for table and document listings.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PageQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u32>,
}

impl PageQuery {
    pub fn new(page: u32, size: u32) -> Self {
        Self {
            page: Some(page),
            size: Some(size),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecordCreated {
    #[serde(flatten)]
    pub ack: Ack,
    #[serde(default)]
    pub record_id: Option<Value>,
}

// ---------------------------------------------------------------------------
// ChromaDB
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DocumentSummary {
    pub id: String,
    #[serde(default)]
    pub document: String,
    #[serde(default)]
    pub metadata: Record,
    #[serde(default)]
    pub has_embedding: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DocumentPage {
    pub records: Vec<DocumentSummary>,
    pub total: u64,
    pub page: u32,
    pub size: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DocumentSearch {
    pub query: String,
    #[serde(default = "default_document_top_k")]
    pub top_k: u32,
    #[serde(default)]
    pub threshold: f64,
}

fn default_document_top_k() -> u32 {
    10
}

impl DocumentSearch {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            top_k: default_document_top_k(),
            threshold: 0.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DocumentMatch {
    pub id: String,
    #[serde(default)]
    pub document: String,
    #[serde(default)]
    pub metadata: Record,
    pub similarity: f64,
    pub distance: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DocumentMatches {
    pub records: Vec<DocumentMatch>,
    pub total: u64,
}

/// A document to add. The backend generates an id when none is given and
/// computes the embedding from `document` when no vector is supplied; one
/// of `document` or `embedding` is required.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct NewDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Record>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DocumentUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Record>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DocumentCreated {
    #[serde(flatten)]
    pub ack: Ack,
    pub document_id: String,
}

/// A full document, vector included.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Document {
    pub id: String,
    #[serde(default)]
    pub document: String,
    #[serde(default)]
    pub embedding: Option<Vec<f32>>,
    #[serde(default)]
    pub metadata: Record,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Exists {
    pub exists: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CollectionInfo {
    pub name: String,
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub dimension: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CollectionSummary {
    pub name: String,
    #[serde(default)]
    pub count: u64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Collections {
    pub collections: Vec<CollectionSummary>,
}
