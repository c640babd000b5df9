use std::collections::BTreeMap;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

pub const COLLECTION_NAME: &str = "artifact_embeddings";
pub const EMBEDDING_DIMENSION: usize = 8;
pub const DEFAULT_TABLES: [&str; 3] = ["artifacts", "chunks", "search_history"];

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Artifact {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub category: Option<String>,
    pub tags: Option<Vec<String>>,
    pub metadata: Option<Value>,
    pub source_type: Option<String>,
    pub source_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub similarity: Option<f64>,
    pub created_at: String,
    pub updated_at: String,
    pub is_active: bool,
}

#[derive(Clone, Debug, Deserialize)]
pub struct CreateArtifact {
    pub title: String,
    pub content: String,
    pub category: Option<String>,
    pub tags: Option<Vec<String>>,
    pub metadata: Option<Value>,
    pub source_type: Option<String>,
    pub source_path: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct UpdateArtifact {
    pub title: Option<String>,
    pub content: Option<String>,
    pub category: Option<String>,
    pub tags: Option<Vec<String>>,
    pub metadata: Option<Value>,
    pub is_active: Option<bool>,
}

#[derive(Clone, Debug, Serialize)]
pub struct HistoryEntry {
    pub id: i64,
    pub query: String,
    pub artifact_count: i64,
    pub response_time: f64,
    pub created_at: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub document: String,
    pub embedding: Option<Vec<f32>>,
    pub metadata: Map<String, Value>,
}

/// A loosely typed table: rows are JSON objects keyed by an integer `id`.
#[derive(Clone, Debug, Default)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: BTreeMap<i64, Map<String, Value>>,
    pub next_id: i64,
}

impl Table {
    pub fn with_columns(columns: &[&str]) -> Self {
        Self {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows: BTreeMap::new(),
            next_id: 1,
        }
    }
}

/// Everything the mock backend remembers.
#[derive(Debug)]
pub struct Backend {
    pub started: Instant,
    pub artifacts: BTreeMap<i64, Artifact>,
    pub next_artifact_id: i64,
    pub history: Vec<HistoryEntry>,
    pub next_history_id: i64,
    pub search_count: u64,
    pub config: Value,
    pub tables: BTreeMap<String, Table>,
    pub documents: BTreeMap<String, Document>,
    pub database_logs: Vec<String>,
    pub server_logs: Vec<String>,
    pub restart_requests: u32,
    pub shutdown_requested: bool,
}

impl Default for Backend {
    fn default() -> Self {
        Self {
            started: Instant::now(),
            artifacts: BTreeMap::new(),
            next_artifact_id: 1,
            history: Vec::new(),
            next_history_id: 1,
            search_count: 0,
            config: default_config(),
            tables: BTreeMap::new(),
            documents: BTreeMap::new(),
            database_logs: Vec::new(),
            server_logs: Vec::new(),
            restart_requests: 0,
            shutdown_requested: false,
        }
    }
}

impl Backend {
    pub fn log_server(&mut self, line: impl Into<String>) {
        let line = format!("{} INFO {}", timestamp(), line.into());
        tracing::debug!("{line}");
        self.server_logs.push(line);
    }

    pub fn log_database(&mut self, line: impl Into<String>) {
        let line = format!("{} INFO {}", timestamp(), line.into());
        tracing::debug!("{line}");
        self.database_logs.push(line);
    }

    pub fn insert_artifact(&mut self, input: CreateArtifact) -> Artifact {
        let now = timestamp();
        let artifact = Artifact {
            id: self.next_artifact_id,
            title: input.title,
            content: input.content,
            category: input.category,
            tags: input.tags,
            metadata: input.metadata,
            source_type: input.source_type,
            source_path: input.source_path,
            similarity: None,
            created_at: now.clone(),
            updated_at: now,
            is_active: true,
        };
        self.next_artifact_id += 1;
        self.artifacts.insert(artifact.id, artifact.clone());
        self.log_server(format!("artifact {} created", artifact.id));
        artifact
    }

    /// Create any default table that does not exist yet.
    pub fn ensure_default_tables(&mut self) {
        for name in DEFAULT_TABLES {
            self.tables
                .entry(name.to_string())
                .or_insert_with(|| Table::with_columns(&["id", "name", "created_at"]));
        }
    }
}

fn default_config() -> Value {
    json!({
        "server": { "host": "127.0.0.1", "port": 8000 },
        "llm": {
            "service_type": "openai-compatible",
            "base_url": "http://localhost:11434/v1",
            "model": "qwen2:7b"
        },
        "embedding": {
            "service_type": "openai-compatible",
            "base_url": "http://localhost:8080/v1",
            "model": "Qwen3-Embedding-4B",
            "dimensions": 1024,
            "timeout": 300
        },
        "search": { "top_k": 5, "threshold": 0.7 }
    })
}

/// Seconds since the epoch, rendered as a string.
pub fn timestamp() -> String {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
        .to_string()
}

/// Deterministic stand-in for an embedding model.
pub fn embed(text: &str) -> Vec<f32> {
    let mut vector = vec![0.0f32; EMBEDDING_DIMENSION];
    for (i, byte) in text.bytes().enumerate() {
        vector[i % EMBEDDING_DIMENSION] += f32::from(byte) / 255.0;
    }
    vector
}

/// Fraction of the query's words that occur in `text`, case-insensitively.
pub fn overlap(query: &str, text: &str) -> f64 {
    let text = text.to_lowercase();
    let words: Vec<String> = query.split_whitespace().map(str::to_lowercase).collect();
    if words.is_empty() {
        return 0.0;
    }
    let hits = words.iter().filter(|w| text.contains(w.as_str())).count();
    hits as f64 / words.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_artifact_requires_title_and_content() {
        let result: Result<CreateArtifact, _> = serde_json::from_str(r#"{"title":"t"}"#);
        assert!(result.is_err());
        let input: CreateArtifact = serde_json::from_str(r#"{"title":"t","content":"c"}"#).unwrap();
        assert!(input.category.is_none());
    }

    #[test]
    fn update_artifact_all_fields_optional() {
        let input: UpdateArtifact = serde_json::from_str("{}").unwrap();
        assert!(input.title.is_none());
        assert!(input.is_active.is_none());
    }

    #[test]
    fn insert_assigns_sequential_ids() {
        let mut backend = Backend::default();
        let input = CreateArtifact {
            title: "a".to_string(),
            content: "b".to_string(),
            category: None,
            tags: None,
            metadata: None,
            source_type: None,
            source_path: None,
        };
        assert_eq!(backend.insert_artifact(input.clone()).id, 1);
        assert_eq!(backend.insert_artifact(input).id, 2);
        assert_eq!(backend.server_logs.len(), 2);
    }

    #[test]
    fn embed_is_deterministic_and_sized() {
        assert_eq!(embed("hello"), embed("hello"));
        assert_eq!(embed("hello").len(), EMBEDDING_DIMENSION);
        assert_ne!(embed("hello"), embed("world"));
    }

    #[test]
    fn overlap_counts_matching_words() {
        assert_eq!(overlap("Vector index", "the vector store"), 0.5);
        assert_eq!(overlap("RUST", "rust in production"), 1.0);
        assert_eq!(overlap("   ", "anything"), 0.0);
    }

    #[test]
    fn ensure_default_tables_is_idempotent() {
        let mut backend = Backend::default();
        backend.ensure_default_tables();
        backend.tables.get_mut("artifacts").unwrap().next_id = 9;
        backend.ensure_default_tables();
        assert_eq!(backend.tables.len(), DEFAULT_TABLES.len());
        assert_eq!(backend.tables["artifacts"].next_id, 9);
    }
}
