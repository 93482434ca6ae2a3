//! Error types for schema exploration

use thiserror::Error;

use crate::storage::StorageError;

/// Errors that can occur during exploration or when applying suggestions
#[derive(Error, Debug)]
pub enum ExploreError {
    /// The schema id could not be resolved
    #[error("Schema not found: {schema_id}")]
    SchemaNotFound { schema_id: String },

    /// Schema resolution failed for a reason other than absence
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// A single record could not be interpreted; logged and skipped
    #[error("Record {record} could not be analyzed: {reason}")]
    Analysis { record: String, reason: String },

    /// Persisting approved suggestions failed
    #[error("Failed to apply suggestions to schema {schema_id}: {source}")]
    Apply {
        schema_id: String,
        #[source]
        source: StorageError,
    },
}

impl ExploreError {
    /// Map a schema resolution failure, keeping not-found distinct
    pub(crate) fn from_resolve(schema_id: &str, error: StorageError) -> Self {
        match error {
            StorageError::NotFound(_) => ExploreError::SchemaNotFound {
                schema_id: schema_id.to_string(),
            },
            other => ExploreError::Storage(other),
        }
    }
}
