//! File system backend
//!
//! Implements SchemaBackend over a plain directory:
//!
//! ```text
//! <base>/schemas/<schema_id>.json      schema definition
//! <base>/records/<schema_id>.jsonl     one record per line, and/or
//! <base>/records/<schema_id>/*.json    one record per file
//! <base>/facets/<schema_id>.json       written by regenerate_facets
//! ```
//!
//! ## Security
//!
//! Schema ids and all resolved paths are validated to prevent path traversal.
//! Paths containing ".." are rejected, and resolved paths must stay within the
//! base directory.

use std::fs;
use std::path::{Component, Path, PathBuf};

use serde_json::{Map, Value, json};
use tracing::{debug, info, warn};

use super::{SchemaBackend, StorageError};
use crate::models::{Record, SchemaDefinition};

/// File system backend
pub struct FileSystemBackend {
    base_path: PathBuf,
}

impl FileSystemBackend {
    /// Create a new file system backend rooted at `base_path`
    ///
    /// # Example
    ///
    /// ```rust
    /// use schema_explorer::storage::FileSystemBackend;
    ///
    /// let backend = FileSystemBackend::new("/var/lib/registers");
    /// ```
    pub fn new(base_path: impl AsRef<Path>) -> Self {
        Self {
            base_path: base_path.as_ref().to_path_buf(),
        }
    }

    /// Resolve a path relative to the base path with security checks.
    fn resolve_path(&self, path: &str) -> Result<PathBuf, StorageError> {
        let normalized = path.trim_start_matches('/');

        if normalized.contains("..") {
            return Err(StorageError::PermissionDenied(
                "Path traversal (..) not allowed".to_string(),
            ));
        }

        let full = self.base_path.join(normalized);

        for component in full.components() {
            if matches!(component, Component::ParentDir) {
                return Err(StorageError::PermissionDenied(
                    "Path traversal not allowed".to_string(),
                ));
            }
        }

        if full.exists() {
            let canonical = full
                .canonicalize()
                .map_err(|e| StorageError::IoError(format!("Failed to resolve path: {}", e)))?;

            let base_canonical = self
                .base_path
                .canonicalize()
                .unwrap_or_else(|_| self.base_path.clone());

            if !canonical.starts_with(&base_canonical) {
                return Err(StorageError::PermissionDenied(
                    "Path escapes base directory".to_string(),
                ));
            }

            return Ok(canonical);
        }

        Ok(full)
    }

    /// Schema ids become file names, so they must be a single plain segment
    fn check_schema_id(schema_id: &str) -> Result<(), StorageError> {
        if schema_id.is_empty()
            || schema_id.contains('/')
            || schema_id.contains('\\')
            || schema_id.contains("..")
        {
            return Err(StorageError::PermissionDenied(format!(
                "Invalid schema id: {:?}",
                schema_id
            )));
        }
        Ok(())
    }

    fn read_json(&self, path: &Path, label: &str) -> Result<Value, StorageError> {
        let content = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                StorageError::NotFound(label.to_string())
            } else {
                StorageError::IoError(format!("Failed to read {}: {}", label, e))
            }
        })?;
        serde_json::from_str(&content)
            .map_err(|e| StorageError::SerializationError(format!("{}: {}", label, e)))
    }

    fn write_json(&self, path: &Path, value: &Value, label: &str) -> Result<(), StorageError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                StorageError::IoError(format!("Failed to create directory for {}: {}", label, e))
            })?;
        }
        let content = serde_json::to_string_pretty(value)
            .map_err(|e| StorageError::SerializationError(e.to_string()))?;
        fs::write(path, content)
            .map_err(|e| StorageError::IoError(format!("Failed to write {}: {}", label, e)))
    }

    fn read_jsonl(&self, path: &Path, records: &mut Vec<Record>) -> Result<(), StorageError> {
        let content = fs::read_to_string(path).map_err(|e| {
            StorageError::IoError(format!("Failed to read {}: {}", path.display(), e))
        })?;

        for (line_no, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<Value>(line) {
                Ok(value) => records.push(Record::from_object(value)),
                Err(e) => warn!(
                    "Skipping unparsable record at {}:{}: {}",
                    path.display(),
                    line_no + 1,
                    e
                ),
            }
        }
        Ok(())
    }

    fn read_record_dir(&self, dir: &Path, records: &mut Vec<Record>) -> Result<(), StorageError> {
        let read_dir = fs::read_dir(dir).map_err(|e| {
            StorageError::IoError(format!("Failed to read directory {}: {}", dir.display(), e))
        })?;

        let mut files: Vec<PathBuf> = read_dir
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == "json"))
            .collect();
        files.sort();

        for file in files {
            let label = file.display().to_string();
            match self.read_json(&file, &label) {
                Ok(value) => records.push(Record::from_object(value)),
                Err(e) => warn!("Skipping unreadable record {}: {}", label, e),
            }
        }
        Ok(())
    }
}

/// Facet configuration derived from a schema: enum and boolean properties
/// become term facets, dates become histograms, numbers become ranges.
fn derive_facets(schema: &SchemaDefinition) -> Value {
    let mut facets = Map::new();
    for (name, property) in &schema.properties {
        let facet = if property.enum_values.is_some() || property.declared_type() == Some("boolean")
        {
            Some("terms")
        } else if matches!(property.format.as_deref(), Some("date") | Some("date-time")) {
            Some("date_histogram")
        } else if matches!(property.declared_type(), Some("integer") | Some("number")) {
            Some("range")
        } else {
            None
        };
        if let Some(kind) = facet {
            facets.insert(name.clone(), json!({ "type": kind }));
        }
    }
    json!({ "schema": schema.id, "facets": facets })
}

impl SchemaBackend for FileSystemBackend {
    fn resolve_schema(&self, schema_id: &str) -> Result<SchemaDefinition, StorageError> {
        Self::check_schema_id(schema_id)?;
        let path = self.resolve_path(&format!("schemas/{}.json", schema_id))?;
        let value = self.read_json(&path, &format!("schema {}", schema_id))?;

        let mut schema: SchemaDefinition = serde_json::from_value(value)
            .map_err(|e| StorageError::SerializationError(format!("schema {}: {}", schema_id, e)))?;
        if schema.id.is_empty() {
            schema.id = schema_id.to_string();
        }
        Ok(schema)
    }

    fn fetch_records(&self, schema_id: &str) -> Result<Vec<Record>, StorageError> {
        Self::check_schema_id(schema_id)?;
        let mut records = Vec::new();

        let jsonl = self.resolve_path(&format!("records/{}.jsonl", schema_id))?;
        if jsonl.is_file() {
            self.read_jsonl(&jsonl, &mut records)?;
        }

        let dir = self.resolve_path(&format!("records/{}", schema_id))?;
        if dir.is_dir() {
            self.read_record_dir(&dir, &mut records)?;
        }

        debug!("Read {} records for schema {}", records.len(), schema_id);
        Ok(records)
    }

    fn save_schema(&self, schema: &SchemaDefinition) -> Result<(), StorageError> {
        Self::check_schema_id(&schema.id)?;
        let path = self.resolve_path(&format!("schemas/{}.json", schema.id))?;
        let value = serde_json::to_value(schema)
            .map_err(|e| StorageError::SerializationError(e.to_string()))?;
        self.write_json(&path, &value, &format!("schema {}", schema.id))?;
        info!("Saved schema '{}' to {}", schema.id, path.display());
        Ok(())
    }

    fn regenerate_facets(&self, schema: &SchemaDefinition) -> Result<(), StorageError> {
        Self::check_schema_id(&schema.id)?;
        let path = self.resolve_path(&format!("facets/{}.json", schema.id))?;
        self.write_json(&path, &derive_facets(schema), &format!("facets {}", schema.id))?;
        info!("Regenerated facets for schema '{}'", schema.id);
        Ok(())
    }
}
