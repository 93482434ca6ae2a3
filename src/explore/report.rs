//! Exploration report

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::aggregate::Aggregate;
use super::recommend::{SchemaType, recommend_type};
use super::suggestion::{PropertySuggestion, SuggestionKind};
use crate::models::{PropertyDefinition, SchemaDefinition};

/// A property as discovered in the data
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiscoveredProperty {
    #[serde(flatten)]
    pub aggregate: Aggregate,
    pub usage_percentage: f64,
    pub recommended_type: SchemaType,
}

/// Usage of one property across the population
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PropertyUsage {
    pub count: usize,
    pub percentage: f64,
}

/// Summary counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReportSummary {
    pub new_count: usize,
    pub drift_count: usize,
    pub total: usize,
    /// Records that were not objects and could not be analyzed
    pub records_skipped: usize,
}

impl ReportSummary {
    pub fn from_suggestions(suggestions: &[PropertySuggestion], records_skipped: usize) -> Self {
        let new_count = suggestions
            .iter()
            .filter(|s| s.kind == SuggestionKind::New)
            .count();
        Self {
            new_count,
            drift_count: suggestions.len() - new_count,
            total: suggestions.len(),
            records_skipped,
        }
    }
}

/// Result of one exploration run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExplorationReport {
    pub schema_id: String,
    pub schema_title: String,
    pub total_records: usize,
    pub discovered_properties: BTreeMap<String, DiscoveredProperty>,
    pub existing_properties: BTreeMap<String, PropertyDefinition>,
    pub usage_stats: BTreeMap<String, PropertyUsage>,
    pub suggestions: Vec<PropertySuggestion>,
    pub analysis_date: DateTime<Utc>,
    pub summary: ReportSummary,
    /// Hosts key report caches on schema id plus this value
    pub population_fingerprint: String,
}

impl ExplorationReport {
    /// Report for a schema with no records
    pub fn empty(schema: &SchemaDefinition, population_fingerprint: String) -> Self {
        Self {
            schema_id: schema.id.clone(),
            schema_title: schema.display_title().to_string(),
            total_records: 0,
            discovered_properties: BTreeMap::new(),
            existing_properties: schema.properties.clone(),
            usage_stats: BTreeMap::new(),
            suggestions: Vec::new(),
            analysis_date: Utc::now(),
            summary: ReportSummary::default(),
            population_fingerprint,
        }
    }

    /// Assemble a report from folded aggregates and sorted suggestions
    pub fn build(
        schema: &SchemaDefinition,
        total_records: usize,
        aggregates: BTreeMap<String, Aggregate>,
        suggestions: Vec<PropertySuggestion>,
        records_skipped: usize,
        population_fingerprint: String,
    ) -> Self {
        let usage_stats = aggregates
            .iter()
            .map(|(name, aggregate)| {
                (
                    name.clone(),
                    PropertyUsage {
                        count: aggregate.usage_count,
                        percentage: aggregate.usage_percentage(total_records),
                    },
                )
            })
            .collect();

        let discovered_properties = aggregates
            .into_iter()
            .map(|(name, aggregate)| {
                let usage_percentage = aggregate.usage_percentage(total_records);
                let recommended_type = recommend_type(&aggregate);
                (
                    name,
                    DiscoveredProperty {
                        aggregate,
                        usage_percentage,
                        recommended_type,
                    },
                )
            })
            .collect();

        Self {
            schema_id: schema.id.clone(),
            schema_title: schema.display_title().to_string(),
            total_records,
            discovered_properties,
            existing_properties: schema.properties.clone(),
            usage_stats,
            summary: ReportSummary::from_suggestions(&suggestions, records_skipped),
            suggestions,
            analysis_date: Utc::now(),
            population_fingerprint,
        }
    }

    /// Suggestions for undeclared properties
    pub fn new_properties(&self) -> impl Iterator<Item = &PropertySuggestion> {
        self.suggestions
            .iter()
            .filter(|s| s.kind == SuggestionKind::New)
    }

    /// Drift findings on declared properties
    pub fn drift(&self) -> impl Iterator<Item = &PropertySuggestion> {
        self.suggestions
            .iter()
            .filter(|s| s.kind == SuggestionKind::Existing)
    }

    /// Look up a suggestion by property name
    pub fn suggestion(&self, property_name: &str) -> Option<&PropertySuggestion> {
        self.suggestions
            .iter()
            .find(|s| s.property_name == property_name)
    }
}
