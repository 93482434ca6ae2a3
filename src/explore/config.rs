//! Configuration for schema exploration

use serde::{Deserialize, Serialize};

use crate::models::METADATA_ENVELOPE_KEY;

/// Property names that are host bookkeeping and never suggested as new
/// properties. Compared case-insensitively.
pub const DEFAULT_INTERNAL_PROPERTIES: &[&str] = &[
    "id",
    "uuid",
    "_id",
    "_uuid",
    "created",
    "updated",
    "created_at",
    "updated_at",
    "deleted",
    "deleted_at",
    METADATA_ENVELOPE_KEY,
    "$schema",
    "$id",
];

/// Configuration for schema exploration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExplorerConfig {
    /// Usage percentage at or above which a suggestion is high confidence
    pub high_confidence_threshold: f64,

    /// Usage percentage at or above which a suggestion is medium confidence
    pub medium_confidence_threshold: f64,

    /// Examples kept per property after compaction
    pub max_examples: usize,

    /// Examples collected per property before compaction kicks in
    pub example_soft_cap: usize,

    /// Examples carried on each suggestion
    pub suggestion_examples: usize,

    /// Minimum string observations before a property can be enum-like
    pub enum_min_examples: usize,

    /// Maximum ratio of distinct to total string values for enum-like properties
    pub enum_max_unique_ratio: f64,

    /// Distinct string values tracked per property before enum tracking gives up
    pub enum_tracking_limit: usize,

    /// Maximum enum size proposed on a declared property
    pub drift_enum_max_values: usize,

    /// Suggested maxLength is observed max times this factor
    pub max_length_multiplier: usize,

    /// Upper bound for suggested maxLength
    pub max_length_cap: usize,

    /// Key of the metadata envelope stripped from every record
    pub metadata_key: String,

    /// Internal property names (case-insensitive)
    pub internal_properties: Vec<String>,

    /// Enable format detection (date, uuid, email, etc.)
    pub detect_formats: bool,

    /// Enable string pattern detection (integer-like, snake_case, etc.)
    pub detect_patterns: bool,
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        Self {
            high_confidence_threshold: 80.0,
            medium_confidence_threshold: 50.0,
            max_examples: 5,
            example_soft_cap: 10,
            suggestion_examples: 3,
            enum_min_examples: 3,
            enum_max_unique_ratio: 0.5,
            enum_tracking_limit: 50,
            drift_enum_max_values: 20,
            max_length_multiplier: 2,
            max_length_cap: 1000,
            metadata_key: METADATA_ENVELOPE_KEY.to_string(),
            internal_properties: DEFAULT_INTERNAL_PROPERTIES
                .iter()
                .map(|s| s.to_string())
                .collect(),
            detect_formats: true,
            detect_patterns: true,
        }
    }
}

impl ExplorerConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a builder for custom configuration
    pub fn builder() -> ExplorerConfigBuilder {
        ExplorerConfigBuilder::default()
    }

    /// Whether a property name is host bookkeeping
    pub fn is_internal(&self, name: &str) -> bool {
        name.eq_ignore_ascii_case(&self.metadata_key)
            || self
                .internal_properties
                .iter()
                .any(|internal| internal.eq_ignore_ascii_case(name))
    }

    /// maxLength to propose for an observed maximum string length
    pub fn suggested_max_length(&self, observed_max: usize) -> usize {
        observed_max
            .saturating_mul(self.max_length_multiplier)
            .min(self.max_length_cap)
    }
}

/// Builder for ExplorerConfig
#[derive(Debug, Default)]
pub struct ExplorerConfigBuilder {
    config: ExplorerConfig,
}

impl ExplorerConfigBuilder {
    /// Set both confidence thresholds (percentages, clamped to 0-100)
    pub fn confidence_thresholds(mut self, high: f64, medium: f64) -> Self {
        let high = high.clamp(0.0, 100.0);
        self.config.high_confidence_threshold = high;
        self.config.medium_confidence_threshold = medium.clamp(0.0, high);
        self
    }

    /// Set the number of examples kept per property
    pub fn max_examples(mut self, max: usize) -> Self {
        self.config.max_examples = max;
        self.config.example_soft_cap = self.config.example_soft_cap.max(max);
        self
    }

    /// Set the number of examples carried on each suggestion
    pub fn suggestion_examples(mut self, count: usize) -> Self {
        self.config.suggestion_examples = count;
        self
    }

    /// Set the minimum observations for enum detection
    pub fn enum_min_examples(mut self, min: usize) -> Self {
        self.config.enum_min_examples = min;
        self
    }

    /// Set the maximum distinct/total ratio for enum detection
    pub fn enum_max_unique_ratio(mut self, ratio: f64) -> Self {
        self.config.enum_max_unique_ratio = ratio.clamp(0.0, 1.0);
        self
    }

    /// Set the maximum enum size proposed on declared properties
    pub fn drift_enum_max_values(mut self, max: usize) -> Self {
        self.config.drift_enum_max_values = max;
        self
    }

    /// Set the suggested maxLength cap
    pub fn max_length_cap(mut self, cap: usize) -> Self {
        self.config.max_length_cap = cap;
        self
    }

    /// Add an internal property name
    pub fn internal_property(mut self, name: impl Into<String>) -> Self {
        self.config.internal_properties.push(name.into());
        self
    }

    /// Enable or disable format detection
    pub fn detect_formats(mut self, detect: bool) -> Self {
        self.config.detect_formats = detect;
        self
    }

    /// Enable or disable pattern detection
    pub fn detect_patterns(mut self, detect: bool) -> Self {
        self.config.detect_patterns = detect;
        self
    }

    /// Build the configuration
    pub fn build(self) -> ExplorerConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ExplorerConfig::default();
        assert_eq!(config.high_confidence_threshold, 80.0);
        assert_eq!(config.medium_confidence_threshold, 50.0);
        assert_eq!(config.max_examples, 5);
        assert_eq!(config.max_length_cap, 1000);
        assert!(config.detect_formats);
    }

    #[test]
    fn test_internal_names_case_insensitive() {
        let config = ExplorerConfig::default();
        assert!(config.is_internal("ID"));
        assert!(config.is_internal("Created_At"));
        assert!(config.is_internal("@self"));
        assert!(config.is_internal("$schema"));
        assert!(!config.is_internal("identifier"));
    }

    #[test]
    fn test_threshold_clamping() {
        let config = ExplorerConfig::builder()
            .confidence_thresholds(150.0, 120.0)
            .enum_max_unique_ratio(2.0)
            .build();

        assert_eq!(config.high_confidence_threshold, 100.0);
        assert_eq!(config.medium_confidence_threshold, 100.0);
        assert_eq!(config.enum_max_unique_ratio, 1.0);
    }

    #[test]
    fn test_suggested_max_length_is_capped() {
        let config = ExplorerConfig::default();
        assert_eq!(config.suggested_max_length(12), 24);
        assert_eq!(config.suggested_max_length(900), 1000);
    }

    #[test]
    fn test_partial_config_deserializes_with_defaults() {
        let config: ExplorerConfig =
            serde_json::from_str(r#"{"maxLengthCap": 255, "detectPatterns": false}"#).unwrap();
        assert_eq!(config.max_length_cap, 255);
        assert!(!config.detect_patterns);
        assert_eq!(config.max_examples, 5);
    }
}
