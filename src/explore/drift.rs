//! Drift analysis for declared properties
//!
//! Compares each declared property with the evidence gathered for it. Checks
//! are independent; their findings are collected into one suggestion per
//! property whose `definition` is the declared definition with every proposed
//! change applied.

use std::collections::{BTreeMap, BTreeSet};

use serde_json::{Value, json};
use tracing::debug;

use super::aggregate::Aggregate;
use super::config::ExplorerConfig;
use super::recommend::{SchemaType, recommend_type};
use super::suggestion::{PropertySuggestion, Rationale, RationaleKind, SuggestionKind};
use crate::models::{PropertyDefinition, SchemaDefinition, TypeDeclaration};

/// Findings of the individual checks for one property
#[derive(Debug, Default)]
struct Findings {
    issues: Vec<String>,
    rationale: Vec<Rationale>,
}

impl Findings {
    fn issue(&mut self, issue: String) {
        self.issues.push(issue);
    }

    fn note(&mut self, rationale: Rationale) {
        self.rationale.push(rationale);
    }

    fn is_empty(&self) -> bool {
        self.issues.is_empty() && self.rationale.is_empty()
    }
}

/// Compares declared properties with observed data
#[derive(Debug, Clone, Copy)]
pub struct DriftAnalyzer<'a> {
    config: &'a ExplorerConfig,
}

impl<'a> DriftAnalyzer<'a> {
    pub fn new(config: &'a ExplorerConfig) -> Self {
        Self { config }
    }

    /// One suggestion for every declared property whose data disagrees with
    /// its declaration
    pub fn analyze(
        &self,
        aggregates: &BTreeMap<String, Aggregate>,
        schema: &SchemaDefinition,
        total_records: usize,
    ) -> Vec<PropertySuggestion> {
        schema
            .properties
            .iter()
            .filter_map(|(name, declared)| {
                let aggregate = aggregates.get(name)?;
                self.check_property(name, declared, aggregate, schema.is_required(name), total_records)
            })
            .collect()
    }

    fn check_property(
        &self,
        name: &str,
        declared: &PropertyDefinition,
        aggregate: &Aggregate,
        required: bool,
        total_records: usize,
    ) -> Option<PropertySuggestion> {
        let recommended = recommend_type(aggregate);
        let mut definition = declared.clone();
        let mut findings = Findings::default();

        self.check_type(declared, recommended, &mut definition, &mut findings);
        if recommended == SchemaType::String {
            self.check_string(declared, aggregate, &mut definition, &mut findings);
        }
        if recommended.is_numeric() {
            self.check_numeric(declared, aggregate, &mut definition, &mut findings);
        }
        let enum_values = self.check_enum(declared, aggregate, &mut definition, &mut findings);
        // Last, so the widened type includes any type change above
        self.check_nullable(declared, aggregate, required, &mut definition, &mut findings);

        if findings.is_empty() {
            return None;
        }
        debug!(
            "Property '{}' drifts from its declaration: {} issue(s)",
            name,
            findings.issues.len()
        );

        let mut suggestion = PropertySuggestion::from_aggregate(
            name,
            SuggestionKind::Existing,
            aggregate,
            recommended,
            total_records,
            self.config,
        );
        suggestion.current_type = declared.property_type.as_ref().map(|t| t.to_string());
        suggestion.nullable = declared.accepts_null() || aggregate.nullable;
        suggestion.enum_values = enum_values;
        suggestion.issues = findings.issues;
        suggestion.rationale = findings.rationale;
        suggestion.definition = definition;
        Some(suggestion)
    }

    fn check_type(
        &self,
        declared: &PropertyDefinition,
        recommended: SchemaType,
        definition: &mut PropertyDefinition,
        findings: &mut Findings,
    ) {
        // Only nulls observed: no evidence either way
        if recommended == SchemaType::Null {
            return;
        }
        let proposed = TypeDeclaration::Single(recommended.to_string());

        match declared.declared_type() {
            None => {
                findings.note(Rationale::new(
                    RationaleKind::Type,
                    "type",
                    None,
                    Some(json!(recommended.as_str())),
                    format!("No type declared; observed values are {}", recommended),
                ));
                definition.property_type = Some(proposed);
            }
            Some(current) if !recommended.satisfies(current) => {
                findings.issue(format!(
                    "type mismatch: declared {}, observed {}",
                    current, recommended
                ));
                findings.note(Rationale::new(
                    RationaleKind::Type,
                    "type",
                    Some(json!(current)),
                    Some(json!(recommended.as_str())),
                    format!("Declared as {} but observed values are {}", current, recommended),
                ));
                definition.property_type = Some(if declared.accepts_null() {
                    proposed.with_null()
                } else {
                    proposed
                });
            }
            Some(_) => {}
        }
    }

    fn check_string(
        &self,
        declared: &PropertyDefinition,
        aggregate: &Aggregate,
        definition: &mut PropertyDefinition,
        findings: &mut Findings,
    ) {
        if let Some(observed_max) = aggregate.max_length {
            let suggested = self.config.suggested_max_length(observed_max).max(observed_max);
            match declared.max_length {
                None => {
                    findings.note(Rationale::new(
                        RationaleKind::Constraint,
                        "maxLength",
                        None,
                        Some(json!(suggested)),
                        format!("Longest observed value has {} characters", observed_max),
                    ));
                    definition.max_length = Some(suggested);
                }
                Some(max) if max < observed_max => {
                    findings.issue(format!(
                        "maxLength too small: declared {}, observed {}",
                        max, observed_max
                    ));
                    findings.note(Rationale::new(
                        RationaleKind::Constraint,
                        "maxLength",
                        Some(json!(max)),
                        Some(json!(suggested)),
                        format!("Values up to {} characters were observed", observed_max),
                    ));
                    definition.max_length = Some(suggested);
                }
                Some(_) => {}
            }
        }

        if let (Some(min), Some(observed_min)) = (declared.min_length, aggregate.min_length) {
            if min > observed_min {
                findings.issue(format!(
                    "minLength too large: declared {}, observed {}",
                    min, observed_min
                ));
                findings.note(Rationale::new(
                    RationaleKind::Constraint,
                    "minLength",
                    Some(json!(min)),
                    Some(json!(observed_min)),
                    format!("Values as short as {} characters were observed", observed_min),
                ));
                definition.min_length = Some(observed_min);
            }
        }

        if let (None, Some(format)) = (&declared.format, aggregate.format) {
            findings.note(Rationale::new(
                RationaleKind::Format,
                "format",
                None,
                Some(json!(format.as_str())),
                format!("Values look like {}", format),
            ));
            definition.format = Some(format.to_string());
        }

        // A pattern is only proposed when every value agreed on one
        if declared.pattern.is_none() && aggregate.patterns.len() == 1 {
            if let Some(pattern) = aggregate.patterns.iter().next() {
                findings.note(Rationale::new(
                    RationaleKind::Pattern,
                    "pattern",
                    None,
                    Some(json!(pattern.regex())),
                    format!("Values follow the {} pattern", pattern),
                ));
                definition.pattern = Some(pattern.regex().to_string());
            }
        }
    }

    fn check_numeric(
        &self,
        declared: &PropertyDefinition,
        aggregate: &Aggregate,
        definition: &mut PropertyDefinition,
        findings: &mut Findings,
    ) {
        let Some(range) = aggregate.numeric_range.filter(|r| r.is_real()) else {
            return;
        };

        let declared_min = declared.minimum.as_ref().and_then(Value::as_f64);
        if declared_min.is_none_or(|min| min > range.min) {
            let observed = range.bound_value(range.min);
            findings.issue(match declared_min {
                None => format!("minimum missing: observed {}", observed),
                Some(min) => format!("minimum too tight: declared {}, observed {}", min, observed),
            });
            findings.note(Rationale::new(
                RationaleKind::Constraint,
                "minimum",
                declared.minimum.clone(),
                Some(observed.clone()),
                format!("Smallest observed value is {}", observed),
            ));
            definition.minimum = Some(observed);
        }

        let declared_max = declared.maximum.as_ref().and_then(Value::as_f64);
        if declared_max.is_none_or(|max| max < range.max) {
            let observed = range.bound_value(range.max);
            findings.issue(match declared_max {
                None => format!("maximum missing: observed {}", observed),
                Some(max) => format!("maximum too tight: declared {}, observed {}", max, observed),
            });
            findings.note(Rationale::new(
                RationaleKind::Constraint,
                "maximum",
                declared.maximum.clone(),
                Some(observed.clone()),
                format!("Largest observed value is {}", observed),
            ));
            definition.maximum = Some(observed);
        }
    }

    fn check_nullable(
        &self,
        declared: &PropertyDefinition,
        aggregate: &Aggregate,
        required: bool,
        definition: &mut PropertyDefinition,
        findings: &mut Findings,
    ) {
        if !aggregate.nullable || !required {
            return;
        }

        findings.issue("required property has null values".to_string());
        findings.note(Rationale::new(
            RationaleKind::Required,
            "required",
            Some(json!(true)),
            Some(json!(false)),
            "Null values were observed for a required property",
        ));
        if declared.required == Some(true) {
            definition.required = Some(false);
        }

        if !declared.accepts_null() {
            let widened = definition.property_type.as_ref().map(TypeDeclaration::with_null);
            findings.note(Rationale::new(
                RationaleKind::Nullable,
                "type",
                declared.property_type.as_ref().map(|t| json!(t)),
                widened.as_ref().map(|t| json!(t)),
                "Allow null in the declared type",
            ));
            if widened.is_some() {
                definition.property_type = widened;
            }
        }
    }

    fn check_enum(
        &self,
        declared: &PropertyDefinition,
        aggregate: &Aggregate,
        definition: &mut PropertyDefinition,
        findings: &mut Findings,
    ) -> Option<Vec<Value>> {
        let candidates = aggregate
            .enum_candidates(self.config)
            .filter(|values| values.len() <= self.config.drift_enum_max_values)?;

        let observed: BTreeSet<String> = candidates.iter().map(Value::to_string).collect();
        match &declared.enum_values {
            Some(current) => {
                let current_set: BTreeSet<String> = current.iter().map(Value::to_string).collect();
                if current_set == observed {
                    return None;
                }
                findings.issue(format!(
                    "enum differs: declared {} value(s), observed {}",
                    current.len(),
                    candidates.len()
                ));
                findings.note(Rationale::new(
                    RationaleKind::Enum,
                    "enum",
                    Some(Value::Array(current.clone())),
                    Some(Value::Array(candidates.clone())),
                    "Observed values do not match the declared enum",
                ));
            }
            None => {
                findings.issue(format!(
                    "enum missing: {} distinct values observed",
                    candidates.len()
                ));
                findings.note(Rationale::new(
                    RationaleKind::Enum,
                    "enum",
                    None,
                    Some(Value::Array(candidates.clone())),
                    "Values are drawn from a small fixed set",
                ));
            }
        }
        definition.enum_values = Some(candidates.clone());
        Some(candidates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::explore::aggregate::AnalysisMerger;
    use crate::explore::analyzer::PropertyValueAnalyzer;

    fn aggregate(values: &[Value]) -> Aggregate {
        let config = ExplorerConfig::default();
        let analyzer = PropertyValueAnalyzer::new(&config);
        let merger = AnalysisMerger::new(&config);
        let mut aggregate = Aggregate::default();
        for value in values {
            merger.merge(&mut aggregate, analyzer.analyze(value));
        }
        aggregate
    }

    fn drift(
        schema: &SchemaDefinition,
        name: &str,
        values: &[Value],
    ) -> Option<PropertySuggestion> {
        let config = ExplorerConfig::default();
        let mut aggregates = BTreeMap::new();
        aggregates.insert(name.to_string(), aggregate(values));
        DriftAnalyzer::new(&config)
            .analyze(&aggregates, schema, values.len())
            .into_iter()
            .next()
    }

    #[test]
    fn test_type_mismatch_with_numeric_bounds() {
        let schema = SchemaDefinition::new("people")
            .with_property("age", PropertyDefinition::of_type("string"));
        let values: Vec<Value> = [18, 30, 65, 42].iter().map(|v| json!(v)).collect();

        let suggestion = drift(&schema, "age", &values).unwrap();
        assert_eq!(suggestion.kind, SuggestionKind::Existing);
        assert_eq!(suggestion.current_type.as_deref(), Some("string"));
        assert_eq!(suggestion.recommended_type, SchemaType::Integer);
        assert!(suggestion.issues[0].starts_with("type mismatch"));
        assert_eq!(suggestion.definition.minimum, Some(json!(18)));
        assert_eq!(suggestion.definition.maximum, Some(json!(65)));
        assert_eq!(suggestion.definition.declared_type(), Some("integer"));
    }

    #[test]
    fn test_matching_declaration_has_no_findings() {
        let mut age = PropertyDefinition::of_type("integer");
        age.minimum = Some(json!(0));
        age.maximum = Some(json!(120));
        let schema = SchemaDefinition::new("people").with_property("age", age);
        assert!(drift(&schema, "age", &[json!(18), json!(65)]).is_none());
    }

    #[test]
    fn test_number_accepts_integers() {
        let schema =
            SchemaDefinition::new("s").with_property("score", PropertyDefinition::of_type("number"));
        assert!(drift(&schema, "score", &[json!(3), json!(3)]).is_none());
    }

    #[test]
    fn test_declared_integer_with_a_stray_float() {
        let schema =
            SchemaDefinition::new("s").with_property("n", PropertyDefinition::of_type("integer"));
        let mut values: Vec<Value> = (0..9).map(|i| json!(i)).collect();
        values.push(json!(2.5));

        let suggestion = drift(&schema, "n", &values).unwrap();
        assert_eq!(suggestion.recommended_type, SchemaType::Integer);
        assert!(!suggestion.issues.iter().any(|i| i.starts_with("type mismatch")));
        assert_eq!(suggestion.definition.declared_type(), Some("integer"));
    }

    #[test]
    fn test_numeric_checks_need_a_real_range() {
        let schema =
            SchemaDefinition::new("s").with_property("n", PropertyDefinition::of_type("integer"));
        assert!(drift(&schema, "n", &[json!(5), json!(5)]).is_none());
    }

    #[test]
    fn test_too_tight_bounds() {
        let mut n = PropertyDefinition::of_type("integer");
        n.minimum = Some(json!(10));
        n.maximum = Some(json!(20));
        let schema = SchemaDefinition::new("s").with_property("n", n);
        let suggestion = drift(&schema, "n", &[json!(5), json!(25)]).unwrap();
        assert_eq!(suggestion.issues.len(), 2);
        assert!(suggestion.issues[0].starts_with("minimum too tight"));
        assert_eq!(suggestion.definition.minimum, Some(json!(5)));
        assert_eq!(suggestion.definition.maximum, Some(json!(25)));
    }

    #[test]
    fn test_string_constraints() {
        let mut code = PropertyDefinition::of_type("string");
        code.max_length = Some(3);
        code.min_length = Some(4);
        let schema = SchemaDefinition::new("s").with_property("code", code);
        let suggestion = drift(&schema, "code", &[json!("abcdef"), json!("ab")]).unwrap();
        assert!(suggestion.issues.iter().any(|i| i.starts_with("maxLength too small")));
        assert!(suggestion.issues.iter().any(|i| i.starts_with("minLength too large")));
        assert_eq!(suggestion.definition.max_length, Some(12));
        assert_eq!(suggestion.definition.min_length, Some(2));
    }

    #[test]
    fn test_missing_max_length_and_format_are_suggestions_not_issues() {
        let schema = SchemaDefinition::new("s")
            .with_property("email", PropertyDefinition::of_type("string"));
        let suggestion =
            drift(&schema, "email", &[json!("a@example.com"), json!("bb@example.org")]).unwrap();
        assert!(suggestion.issues.is_empty());
        assert_eq!(suggestion.definition.format.as_deref(), Some("email"));
        assert_eq!(suggestion.definition.max_length, Some(28));
    }

    #[test]
    fn test_required_with_nulls() {
        let mut name = PropertyDefinition::of_type("string");
        name.max_length = Some(50);
        let schema = SchemaDefinition::new("s")
            .with_property("name", name)
            .with_required("name");
        let suggestion = drift(&schema, "name", &[json!("Ann"), Value::Null]).unwrap();
        assert_eq!(suggestion.issues, vec!["required property has null values".to_string()]);
        let kinds: Vec<_> = suggestion.rationale.iter().map(|r| r.kind).collect();
        assert!(kinds.contains(&RationaleKind::Required));
        assert!(kinds.contains(&RationaleKind::Nullable));
        assert!(suggestion.definition.accepts_null());
    }

    #[test]
    fn test_enum_drift() {
        let mut status = PropertyDefinition::of_type("string");
        status.max_length = Some(20);
        status.enum_values = Some(vec![json!("open")]);
        let schema = SchemaDefinition::new("s").with_property("status", status);
        let values = vec![json!("open"), json!("closed"), json!("open"), json!("open")];

        let suggestion = drift(&schema, "status", &values).unwrap();
        assert!(suggestion.issues[0].starts_with("enum differs"));
        assert_eq!(
            suggestion.definition.enum_values,
            Some(vec![json!("closed"), json!("open")])
        );
    }

    #[test]
    fn test_missing_type_is_informational() {
        let schema = SchemaDefinition::new("s").with_property("flag", PropertyDefinition::default());
        let suggestion = drift(&schema, "flag", &[json!(true)]).unwrap();
        assert!(suggestion.issues.is_empty());
        assert_eq!(suggestion.rationale[0].kind, RationaleKind::Type);
        assert_eq!(suggestion.definition.declared_type(), Some("boolean"));
    }
}
