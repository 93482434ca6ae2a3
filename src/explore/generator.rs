//! New-property suggestions
//!
//! Every aggregated property that the schema does not declare, and that is
//! not host bookkeeping, becomes one suggestion with a ready-to-apply
//! definition. Nested objects and arrays are described one level deep only.

use std::collections::BTreeMap;

use serde_json::Value;
use tracing::debug;

use super::aggregate::Aggregate;
use super::analyzer::ArrayStructure;
use super::config::ExplorerConfig;
use super::recommend::{SchemaType, recommend_type};
use super::suggestion::{PropertySuggestion, Rationale, RationaleKind, SuggestionKind};
use crate::models::{PropertyDefinition, SchemaDefinition, TypeDeclaration};

/// Description given to keys of a discovered nested object
pub const NESTED_PROPERTY_DESCRIPTION: &str = "Nested property discovered during schema exploration";

/// Builds suggestions for undeclared properties
#[derive(Debug, Clone, Copy)]
pub struct SuggestionGenerator<'a> {
    config: &'a ExplorerConfig,
}

impl<'a> SuggestionGenerator<'a> {
    pub fn new(config: &'a ExplorerConfig) -> Self {
        Self { config }
    }

    /// Suggestions for every undeclared, non-internal property
    pub fn generate(
        &self,
        aggregates: &BTreeMap<String, Aggregate>,
        schema: &SchemaDefinition,
        total_records: usize,
    ) -> Vec<PropertySuggestion> {
        aggregates
            .iter()
            .filter(|(name, _)| !schema.properties.contains_key(name.as_str()))
            .filter(|(name, _)| {
                let internal = self.config.is_internal(name);
                if internal {
                    debug!("Skipping internal property '{}'", name);
                }
                !internal
            })
            .map(|(name, aggregate)| self.suggest(name, aggregate, total_records))
            .collect()
    }

    fn suggest(&self, name: &str, aggregate: &Aggregate, total_records: usize) -> PropertySuggestion {
        let mut recommended = recommend_type(aggregate);
        let enum_values = aggregate.enum_candidates(self.config);
        if enum_values.is_some() {
            recommended = SchemaType::String;
        }

        let mut suggestion = PropertySuggestion::from_aggregate(
            name,
            SuggestionKind::New,
            aggregate,
            recommended,
            total_records,
            self.config,
        );

        suggestion.rationale.push(Rationale::new(
            RationaleKind::Type,
            "type",
            None,
            Some(Value::String(recommended.to_string())),
            format!(
                "Observed in {} of {} records ({}%)",
                aggregate.usage_count, total_records, suggestion.usage_percentage
            ),
        ));
        if let Some(values) = &enum_values {
            suggestion.rationale.push(Rationale::new(
                RationaleKind::Enum,
                "enum",
                None,
                Some(Value::Array(values.clone())),
                format!("Only {} distinct values observed", values.len()),
            ));
        }
        if let Some(format) = aggregate.format {
            suggestion.rationale.push(Rationale::new(
                RationaleKind::Format,
                "format",
                None,
                Some(Value::String(format.to_string())),
                format!("Values look like {}", format),
            ));
        }

        suggestion.definition = self.definition(aggregate, recommended, enum_values.clone());
        suggestion.enum_values = enum_values;
        suggestion
    }

    fn definition(
        &self,
        aggregate: &Aggregate,
        recommended: SchemaType,
        enum_values: Option<Vec<Value>>,
    ) -> PropertyDefinition {
        let mut definition = PropertyDefinition {
            property_type: Some(TypeDeclaration::Single(recommended.to_string())),
            examples: aggregate
                .examples
                .iter()
                .take(self.config.suggestion_examples)
                .cloned()
                .collect(),
            ..Default::default()
        };

        match recommended {
            SchemaType::String => {
                definition.format = aggregate.format.map(|f| f.to_string());
                definition.max_length = aggregate
                    .max_length
                    .map(|max| self.config.suggested_max_length(max).max(max));
                definition.enum_values = enum_values;
            }
            SchemaType::Integer | SchemaType::Number => {
                if let Some(range) = aggregate.numeric_range.filter(|r| r.is_real()) {
                    definition.minimum = Some(range.bound_value(range.min));
                    definition.maximum = Some(range.bound_value(range.max));
                }
            }
            SchemaType::Object => {
                definition.properties = aggregate.object_keys.as_ref().map(|keys| {
                    keys.iter()
                        .map(|key| {
                            (
                                key.clone(),
                                PropertyDefinition::of_type("string")
                                    .with_description(NESTED_PROPERTY_DESCRIPTION),
                            )
                        })
                        .collect()
                });
            }
            SchemaType::Array => {
                let item_type = aggregate
                    .array_structure
                    .as_ref()
                    .and_then(ArrayStructure::dominant_item_kind)
                    .map(SchemaType::from_kind)
                    .unwrap_or(SchemaType::String);
                definition.items = Some(Box::new(PropertyDefinition::of_type(item_type.as_str())));
            }
            SchemaType::Boolean | SchemaType::Null => {}
        }

        definition
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::explore::aggregate::AnalysisMerger;
    use crate::explore::analyzer::PropertyValueAnalyzer;
    use crate::explore::suggestion::Confidence;
    use serde_json::json;

    fn aggregates(records: &[Value]) -> BTreeMap<String, Aggregate> {
        let config = ExplorerConfig::default();
        let analyzer = PropertyValueAnalyzer::new(&config);
        let merger = AnalysisMerger::new(&config);
        let mut map: BTreeMap<String, Aggregate> = BTreeMap::new();
        for record in records {
            for (name, value) in record.as_object().unwrap() {
                merger.merge(map.entry(name.clone()).or_default(), analyzer.analyze(value));
            }
        }
        for aggregate in map.values_mut() {
            merger.compact(aggregate);
        }
        map
    }

    fn generate(records: &[Value], schema: &SchemaDefinition) -> Vec<PropertySuggestion> {
        let config = ExplorerConfig::default();
        SuggestionGenerator::new(&config).generate(&aggregates(records), schema, records.len())
    }

    #[test]
    fn test_declared_and_internal_properties_are_skipped() {
        let schema = SchemaDefinition::new("s")
            .with_property("name", PropertyDefinition::of_type("string"));
        let records = vec![json!({"name": "a", "ID": 1, "created_at": "2024-01-01", "color": "#aabbcc"})];
        let suggestions = generate(&records, &schema);
        assert_eq!(suggestions.len(), 1);
        assert_eq!(suggestions[0].property_name, "color");
        assert_eq!(suggestions[0].definition.format.as_deref(), Some("color"));
    }

    #[test]
    fn test_string_definition() {
        let records = vec![json!({"title": "Hello"}), json!({"title": "Hi"})];
        let suggestion = &generate(&records, &SchemaDefinition::new("s"))[0];
        assert_eq!(suggestion.recommended_type, SchemaType::String);
        assert_eq!(suggestion.confidence, Confidence::High);
        assert!(suggestion.nullable);
        assert!(suggestion.type_variations.is_none());
        assert_eq!(suggestion.definition.max_length, Some(10));
        assert_eq!(suggestion.max_length, Some(5));
        assert_eq!(suggestion.min_length, Some(2));
    }

    #[test]
    fn test_numeric_definition_uses_real_ranges_only() {
        let records = vec![json!({"n": 3, "k": 7}), json!({"n": 9, "k": 7})];
        let suggestions = generate(&records, &SchemaDefinition::new("s"));
        let k = suggestions.iter().find(|s| s.property_name == "k").unwrap();
        let n = suggestions.iter().find(|s| s.property_name == "n").unwrap();
        assert!(k.definition.minimum.is_none());
        assert_eq!(n.definition.minimum, Some(json!(3)));
        assert_eq!(n.definition.maximum, Some(json!(9)));
    }

    #[test]
    fn test_nested_object_is_shallow() {
        let records = vec![json!({"address": {"street": "Main", "geo": {"lat": 1.0}}})];
        let suggestion = &generate(&records, &SchemaDefinition::new("s"))[0];
        assert_eq!(suggestion.recommended_type, SchemaType::Object);
        let properties = suggestion.definition.properties.as_ref().unwrap();
        assert_eq!(properties.len(), 2);
        let geo = &properties["geo"];
        assert_eq!(geo.declared_type(), Some("string"));
        assert_eq!(geo.description.as_deref(), Some(NESTED_PROPERTY_DESCRIPTION));
    }

    #[test]
    fn test_array_items() {
        let records = vec![json!({"tags": ["a", "b"], "empty": []})];
        let suggestions = generate(&records, &SchemaDefinition::new("s"));
        let tags = suggestions.iter().find(|s| s.property_name == "tags").unwrap();
        let empty = suggestions.iter().find(|s| s.property_name == "empty").unwrap();
        assert_eq!(tags.definition.items.as_ref().unwrap().declared_type(), Some("string"));
        assert_eq!(empty.definition.items.as_ref().unwrap().declared_type(), Some("string"));

        let records = vec![json!({"scores": [1, 2, 3]})];
        let scores = &generate(&records, &SchemaDefinition::new("s"))[0];
        assert_eq!(scores.definition.items.as_ref().unwrap().declared_type(), Some("integer"));
    }

    #[test]
    fn test_type_variations_only_for_mixed_kinds() {
        let records = vec![json!({"v": 1}), json!({"v": "x"})];
        let suggestion = &generate(&records, &SchemaDefinition::new("s"))[0];
        let variations = suggestion.type_variations.as_ref().unwrap();
        assert_eq!(variations.len(), 2);
    }

    #[test]
    fn test_enum_override() {
        let records: Vec<Value> = ["1", "2", "1", "1", "2", "1"]
            .iter()
            .map(|v| json!({"level": v}))
            .collect();
        let suggestion = &generate(&records, &SchemaDefinition::new("s"))[0];
        assert_eq!(suggestion.recommended_type, SchemaType::String);
        assert_eq!(suggestion.enum_values, Some(vec![json!("1"), json!("2")]));
        assert_eq!(suggestion.definition.enum_values, suggestion.enum_values);
    }
}
