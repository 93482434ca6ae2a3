//! Exploration orchestrator
//!
//! Drives one exploration run against a backend: resolve the schema, fetch
//! the population, fold every property value into aggregates, and turn them
//! into a ranked report. Also applies operator-approved definitions back to
//! the schema.

use std::collections::BTreeMap;

#[cfg(feature = "parallel")]
use rayon::prelude::*;
use serde_json::Value;
use tracing::{debug, info, warn};

use super::aggregate::{Aggregate, AnalysisMerger};
use super::analyzer::{Observation, PropertyValueAnalyzer};
use super::config::ExplorerConfig;
use super::drift::DriftAnalyzer;
use super::error::ExploreError;
use super::generator::SuggestionGenerator;
use super::report::ExplorationReport;
use super::suggestion::sort_suggestions;
use crate::models::{PropertyDefinition, Record, SchemaDefinition};
use crate::storage::SchemaBackend;

/// Observations extracted from one record
type Extracted = Result<Vec<(String, Observation)>, ExploreError>;

/// Schema explorer bound to a backend
pub struct SchemaExplorer<B: SchemaBackend> {
    backend: B,
    config: ExplorerConfig,
}

impl<B: SchemaBackend> SchemaExplorer<B> {
    /// Create an explorer with default configuration
    pub fn new(backend: B) -> Self {
        Self::with_config(backend, ExplorerConfig::default())
    }

    /// Create an explorer with custom configuration
    pub fn with_config(backend: B, config: ExplorerConfig) -> Self {
        Self { backend, config }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn config(&self) -> &ExplorerConfig {
        &self.config
    }

    /// Explore the records stored under a schema
    ///
    /// Only an unresolvable schema is an error. A failed record fetch is
    /// logged and treated as an empty population, and records that cannot be
    /// analyzed are skipped.
    pub fn explore(&self, schema_id: &str) -> Result<ExplorationReport, ExploreError> {
        info!("Exploring schema '{}'", schema_id);

        let schema = self
            .backend
            .resolve_schema(schema_id)
            .map_err(|e| ExploreError::from_resolve(schema_id, e))?;

        let records = match self.backend.fetch_records(schema_id) {
            Ok(records) => records,
            Err(e) => {
                warn!(
                    "Failed to fetch records for schema '{}', treating as empty: {}",
                    schema_id, e
                );
                Vec::new()
            }
        };
        let fingerprint = Record::population_fingerprint(&records);

        if records.is_empty() {
            info!("Schema '{}' has no records", schema_id);
            return Ok(ExplorationReport::empty(&schema, fingerprint));
        }

        let (aggregates, skipped) = self.collect_aggregates(&records);
        let report = self.build_report(&schema, records.len(), aggregates, skipped, fingerprint);

        info!(
            "Explored schema '{}': {} records, {} properties, {} new, {} drift",
            schema_id,
            report.total_records,
            report.discovered_properties.len(),
            report.summary.new_count,
            report.summary.drift_count
        );
        Ok(report)
    }

    /// Merge approved property definitions into a schema and persist it
    ///
    /// Later entries override earlier ones and any declared property with the
    /// same name. Failures propagate; nothing is retried.
    pub fn apply_approved_suggestions(
        &self,
        schema_id: &str,
        updates: impl IntoIterator<Item = (String, PropertyDefinition)>,
    ) -> Result<SchemaDefinition, ExploreError> {
        let mut schema = self
            .backend
            .resolve_schema(schema_id)
            .map_err(|e| ExploreError::from_resolve(schema_id, e))?;

        let mut applied = 0;
        for (name, definition) in updates {
            debug!("Applying definition for property '{}'", name);
            schema.properties.insert(name, definition);
            applied += 1;
        }

        self.backend
            .save_schema(&schema)
            .map_err(|source| ExploreError::Apply {
                schema_id: schema_id.to_string(),
                source,
            })?;
        self.backend
            .regenerate_facets(&schema)
            .map_err(|source| ExploreError::Apply {
                schema_id: schema_id.to_string(),
                source,
            })?;

        info!(
            "Applied {} property definition(s) to schema '{}'",
            applied, schema_id
        );
        Ok(schema)
    }

    /// Analyze every value of one record, leaving out the metadata envelope
    fn extract(&self, index: usize, record: &Record) -> Extracted {
        let properties = record.properties().ok_or_else(|| ExploreError::Analysis {
            record: record.label(index),
            reason: format!("expected an object, found {}", json_type_name(&record.object)),
        })?;

        let analyzer = PropertyValueAnalyzer::new(&self.config);
        Ok(properties
            .iter()
            .filter(|(name, _)| **name != self.config.metadata_key)
            .map(|(name, value)| (name.clone(), analyzer.analyze(value)))
            .collect())
    }

    #[cfg(feature = "parallel")]
    fn extract_all(&self, records: &[Record]) -> Vec<Extracted> {
        records
            .par_iter()
            .enumerate()
            .map(|(index, record)| self.extract(index, record))
            .collect()
    }

    #[cfg(not(feature = "parallel"))]
    fn extract_all(&self, records: &[Record]) -> Vec<Extracted> {
        records
            .iter()
            .enumerate()
            .map(|(index, record)| self.extract(index, record))
            .collect()
    }

    fn collect_aggregates(&self, records: &[Record]) -> (BTreeMap<String, Aggregate>, usize) {
        self.fold(records.len(), self.extract_all(records))
    }

    /// Fold extracted observations into per-property aggregates, in record order
    fn fold(
        &self,
        total_records: usize,
        extracted: Vec<Extracted>,
    ) -> (BTreeMap<String, Aggregate>, usize) {
        let merger = AnalysisMerger::new(&self.config);
        let mut aggregates: BTreeMap<String, Aggregate> = BTreeMap::new();
        let mut skipped = 0;

        for extracted in extracted {
            match extracted {
                Ok(observations) => {
                    for (name, observation) in observations {
                        merger.merge(aggregates.entry(name).or_default(), observation);
                    }
                }
                Err(e) => {
                    warn!("Skipping record: {}", e);
                    skipped += 1;
                }
            }
        }

        for aggregate in aggregates.values_mut() {
            merger.compact(aggregate);
        }
        debug!(
            "Folded {} records into {} aggregates ({} skipped)",
            total_records,
            aggregates.len(),
            skipped
        );
        (aggregates, skipped)
    }

    fn build_report(
        &self,
        schema: &SchemaDefinition,
        total_records: usize,
        aggregates: BTreeMap<String, Aggregate>,
        skipped: usize,
        fingerprint: String,
    ) -> ExplorationReport {
        let mut suggestions =
            SuggestionGenerator::new(&self.config).generate(&aggregates, schema, total_records);
        suggestions.extend(DriftAnalyzer::new(&self.config).analyze(
            &aggregates,
            schema,
            total_records,
        ));
        sort_suggestions(&mut suggestions);

        ExplorationReport::build(
            schema,
            total_records,
            aggregates,
            suggestions,
            skipped,
            fingerprint,
        )
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
