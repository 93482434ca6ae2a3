//! Host backend abstraction
//!
//! Defines the SchemaBackend trait through which the explorer reaches the host's
//! schema and object stores, and the implementations shipped with the crate:
//! - MemoryBackend: in-process store (tests, embedding)
//! - FileSystemBackend: a directory of JSON schema and record files

use crate::models::{Record, SchemaDefinition};

/// Error type for backend operations
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("IO error: {0}")]
    IoError(String),
    #[error("Serialization error: {0}")]
    SerializationError(String),
    #[error("Permission denied: {0}")]
    PermissionDenied(String),
    #[error("Storage backend error: {0}")]
    BackendError(String),
}

/// Trait for host backends
///
/// All calls are blocking. The explorer makes exactly one `fetch_records`
/// call per run and never streams or paginates.
pub trait SchemaBackend: Send + Sync {
    /// Resolve a schema by id
    fn resolve_schema(&self, schema_id: &str) -> Result<SchemaDefinition, StorageError>;

    /// Fetch every stored record declared against a schema
    fn fetch_records(&self, schema_id: &str) -> Result<Vec<Record>, StorageError>;

    /// Persist an updated schema
    fn save_schema(&self, schema: &SchemaDefinition) -> Result<(), StorageError>;

    /// Ask the host to rebuild facet/search configuration derived from a schema
    fn regenerate_facets(&self, schema: &SchemaDefinition) -> Result<(), StorageError>;
}

pub mod filesystem;
pub mod memory;

pub use filesystem::FileSystemBackend;
pub use memory::MemoryBackend;
