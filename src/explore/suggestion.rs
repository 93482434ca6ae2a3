//! Suggestion types shared by the new-property and drift paths

use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::aggregate::Aggregate;
use super::analyzer::NumericRange;
use super::config::ExplorerConfig;
use super::formats::Format;
use super::patterns::StringPattern;
use super::recommend::SchemaType;
use super::value::PrimitiveKind;
use crate::models::PropertyDefinition;

/// Confidence tier of a suggestion, derived from usage percentage only
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

impl Confidence {
    pub fn from_usage(usage_percentage: f64, config: &ExplorerConfig) -> Self {
        if usage_percentage >= config.high_confidence_threshold {
            Confidence::High
        } else if usage_percentage >= config.medium_confidence_threshold {
            Confidence::Medium
        } else {
            Confidence::Low
        }
    }

    /// Sort weight (low=1, medium=2, high=3)
    pub fn weight(&self) -> u8 {
        match self {
            Confidence::Low => 1,
            Confidence::Medium => 2,
            Confidence::High => 3,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Confidence::Low => "low",
            Confidence::Medium => "medium",
            Confidence::High => "high",
        }
    }
}

impl std::fmt::Display for Confidence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Whether a suggestion adds a property or revises a declared one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionKind {
    New,
    Existing,
}

/// Aspect of a definition a rationale entry is about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RationaleKind {
    Type,
    Constraint,
    Format,
    Pattern,
    Nullable,
    Required,
    Enum,
}

/// One proposed change with its justification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rationale {
    pub kind: RationaleKind,
    /// Definition field the change applies to (`type`, `maxLength`, ...)
    pub field: String,
    pub current: Option<Value>,
    pub recommended: Option<Value>,
    pub description: String,
}

impl Rationale {
    pub fn new(
        kind: RationaleKind,
        field: impl Into<String>,
        current: Option<Value>,
        recommended: Option<Value>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            field: field.into(),
            current,
            recommended,
            description: description.into(),
        }
    }
}

/// A suggested new property or a drift finding on a declared one
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertySuggestion {
    pub property_name: String,
    #[serde(rename = "type")]
    pub kind: SuggestionKind,
    pub confidence: Confidence,
    pub usage_percentage: f64,
    pub usage_count: usize,
    pub recommended_type: SchemaType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_type: Option<String>,
    pub examples: Vec<Value>,
    pub max_length: Option<usize>,
    pub min_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<Value>>,
    pub nullable: bool,
    pub detected_format: Option<Format>,
    pub string_patterns: Vec<StringPattern>,
    pub numeric_range: Option<NumericRange>,
    /// Observed kinds with counts, present only when more than one was seen
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_variations: Option<BTreeMap<PrimitiveKind, usize>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub issues: Vec<String>,
    pub rationale: Vec<Rationale>,
    /// Proposed definition, ready to pass to `apply_approved_suggestions`
    pub definition: PropertyDefinition,
}

impl PropertySuggestion {
    /// Suggestion skeleton carrying the evidence common to both paths
    pub(crate) fn from_aggregate(
        name: &str,
        kind: SuggestionKind,
        aggregate: &Aggregate,
        recommended_type: SchemaType,
        total_records: usize,
        config: &ExplorerConfig,
    ) -> Self {
        let usage_percentage = aggregate.usage_percentage(total_records);
        let type_variations = if aggregate.kinds.len() > 1 {
            Some(aggregate.kinds.clone())
        } else {
            None
        };

        Self {
            property_name: name.to_string(),
            kind,
            confidence: Confidence::from_usage(usage_percentage, config),
            usage_percentage,
            usage_count: aggregate.usage_count,
            recommended_type,
            current_type: None,
            examples: aggregate
                .examples
                .iter()
                .take(config.suggestion_examples)
                .cloned()
                .collect(),
            max_length: aggregate.max_length,
            min_length: aggregate.min_length,
            enum_values: None,
            nullable: true,
            detected_format: aggregate.format,
            string_patterns: aggregate.patterns.iter().copied().collect(),
            numeric_range: aggregate.numeric_range,
            type_variations,
            issues: Vec::new(),
            rationale: Vec::new(),
            definition: PropertyDefinition::default(),
        }
    }
}

/// Order suggestions by ascending confidence weight, then by descending usage
pub fn sort_suggestions(suggestions: &mut [PropertySuggestion]) {
    suggestions.sort_by(|a, b| {
        a.confidence
            .weight()
            .cmp(&b.confidence.weight())
            .then_with(|| {
                b.usage_percentage
                    .partial_cmp(&a.usage_percentage)
                    .unwrap_or(Ordering::Equal)
            })
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn suggestion(name: &str, usage: f64) -> PropertySuggestion {
        let config = ExplorerConfig::default();
        let mut s = PropertySuggestion::from_aggregate(
            name,
            SuggestionKind::New,
            &Aggregate::default(),
            SchemaType::String,
            0,
            &config,
        );
        s.usage_percentage = usage;
        s.confidence = Confidence::from_usage(usage, &config);
        s
    }

    #[test]
    fn test_confidence_tiers() {
        let config = ExplorerConfig::default();
        assert_eq!(Confidence::from_usage(80.0, &config), Confidence::High);
        assert_eq!(Confidence::from_usage(79.99, &config), Confidence::Medium);
        assert_eq!(Confidence::from_usage(50.0, &config), Confidence::Medium);
        assert_eq!(Confidence::from_usage(49.99, &config), Confidence::Low);
    }

    #[test]
    fn test_confidence_display_matches_serialized_name() {
        for confidence in [Confidence::Low, Confidence::Medium, Confidence::High] {
            assert_eq!(
                serde_json::to_value(confidence).unwrap(),
                serde_json::Value::String(confidence.to_string())
            );
        }
    }

    #[test]
    fn test_sort_order() {
        let mut suggestions = vec![
            suggestion("high", 95.0),
            suggestion("low_a", 10.0),
            suggestion("medium", 60.0),
            suggestion("low_b", 30.0),
        ];
        sort_suggestions(&mut suggestions);
        let names: Vec<_> = suggestions.iter().map(|s| s.property_name.as_str()).collect();
        assert_eq!(names, vec!["low_b", "low_a", "medium", "high"]);
    }
}
