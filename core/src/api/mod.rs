//! Endpoint namespaces.
//!
//! Each namespace is a borrowed view over an `ApiClient` mapping operation
//! names to one HTTP method and path. Paths here are relative to the API
//! root; identifiers are substituted verbatim.

pub mod artifact;
pub mod chromadb;
pub mod config;
pub mod search;
pub mod sqlite;
pub mod system;

pub use artifact::ArtifactApi;
pub use chromadb::ChromaApi;
pub use config::ConfigApi;
pub use search::SearchApi;
pub use sqlite::SqliteApi;
pub use system::{LogSource, LogTarget, SystemApi};
