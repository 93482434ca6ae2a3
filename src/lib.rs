//! Schema Explorer - property discovery and drift analysis for soft-schema record stores
//!
//! Provides:
//! - Host data types (schemas, property definitions, records)
//! - A backend trait for reaching the host's schema and record stores
//! - Per-property type, format and constraint inference
//! - New-property suggestions and drift findings, ranked by confidence
//! - Applying approved definitions back into a schema

pub mod explore;
pub mod models;
pub mod storage;

// Re-export commonly used types
pub use explore::{
    ExplorationReport, ExploreError, ExplorerConfig, PropertySuggestion, SchemaExplorer,
};
pub use models::{PropertyDefinition, Record, SchemaDefinition, TypeDeclaration};
pub use storage::{FileSystemBackend, MemoryBackend, SchemaBackend, StorageError};
