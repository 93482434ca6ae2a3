//! In-memory backend
//!
//! Keeps schemas and records in process. Facet regeneration requests are
//! counted so callers can observe that the apply path signalled the host.

use std::collections::HashMap;
use std::sync::RwLock;

use super::{SchemaBackend, StorageError};
use crate::models::{Record, SchemaDefinition};

/// In-memory schema and record store
#[derive(Debug, Default)]
pub struct MemoryBackend {
    schemas: RwLock<HashMap<String, SchemaDefinition>>,
    records: RwLock<HashMap<String, Vec<Record>>>,
    facet_regenerations: RwLock<HashMap<String, usize>>,
    fail_saves: bool,
}

impl MemoryBackend {
    /// Create an empty backend
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a backend whose `save_schema` always fails
    pub fn read_only() -> Self {
        Self {
            fail_saves: true,
            ..Self::default()
        }
    }

    /// Register a schema
    pub fn insert_schema(&self, schema: SchemaDefinition) {
        if let Ok(mut schemas) = self.schemas.write() {
            schemas.insert(schema.id.clone(), schema);
        }
    }

    /// Register records for a schema, appending to any already stored
    pub fn insert_records(&self, schema_id: &str, records: impl IntoIterator<Item = Record>) {
        if let Ok(mut store) = self.records.write() {
            store
                .entry(schema_id.to_string())
                .or_default()
                .extend(records);
        }
    }

    /// Current stored version of a schema
    pub fn schema(&self, schema_id: &str) -> Option<SchemaDefinition> {
        self.schemas
            .read()
            .ok()
            .and_then(|schemas| schemas.get(schema_id).cloned())
    }

    /// Number of facet regeneration requests received for a schema
    pub fn facet_regenerations(&self, schema_id: &str) -> usize {
        self.facet_regenerations
            .read()
            .ok()
            .and_then(|counts| counts.get(schema_id).copied())
            .unwrap_or(0)
    }
}

fn poisoned(what: &str) -> StorageError {
    StorageError::BackendError(format!("{} lock poisoned", what))
}

impl SchemaBackend for MemoryBackend {
    fn resolve_schema(&self, schema_id: &str) -> Result<SchemaDefinition, StorageError> {
        self.schemas
            .read()
            .map_err(|_| poisoned("schema"))?
            .get(schema_id)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(format!("schema {}", schema_id)))
    }

    fn fetch_records(&self, schema_id: &str) -> Result<Vec<Record>, StorageError> {
        Ok(self
            .records
            .read()
            .map_err(|_| poisoned("record"))?
            .get(schema_id)
            .cloned()
            .unwrap_or_default())
    }

    fn save_schema(&self, schema: &SchemaDefinition) -> Result<(), StorageError> {
        if self.fail_saves {
            return Err(StorageError::PermissionDenied(format!(
                "schema {} is read-only",
                schema.id
            )));
        }
        self.schemas
            .write()
            .map_err(|_| poisoned("schema"))?
            .insert(schema.id.clone(), schema.clone());
        Ok(())
    }

    fn regenerate_facets(&self, schema: &SchemaDefinition) -> Result<(), StorageError> {
        *self
            .facet_regenerations
            .write()
            .map_err(|_| poisoned("facet"))?
            .entry(schema.id.clone())
            .or_insert(0) += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_unknown_schema_is_not_found() {
        let backend = MemoryBackend::new();
        assert!(matches!(
            backend.resolve_schema("missing"),
            Err(StorageError::NotFound(_))
        ));
    }

    #[test]
    fn test_records_default_to_empty() {
        let backend = MemoryBackend::new();
        backend.insert_schema(SchemaDefinition::new("s"));
        assert!(backend.fetch_records("s").unwrap().is_empty());

        backend.insert_records("s", vec![Record::new(json!({"a": 1}))]);
        assert_eq!(backend.fetch_records("s").unwrap().len(), 1);
    }

    #[test]
    fn test_read_only_rejects_saves() {
        let backend = MemoryBackend::read_only();
        let result = backend.save_schema(&SchemaDefinition::new("s"));
        assert!(matches!(result, Err(StorageError::PermissionDenied(_))));
    }
}
