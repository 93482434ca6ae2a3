//! Type recommendation
//!
//! Reconciles an aggregate into a single declared type. Formats win over
//! everything because every detected format is a string format; after that
//! string patterns that imply another type (`"42"`, `"3.5"`, `"yes"`) win
//! over the raw kind.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::aggregate::Aggregate;
use super::patterns::StringPattern;
use super::value::PrimitiveKind;

/// A declared schema type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaType {
    String,
    Integer,
    Number,
    Boolean,
    Array,
    Object,
    Null,
}

impl SchemaType {
    /// Type name as written into a property definition
    pub fn as_str(&self) -> &'static str {
        match self {
            SchemaType::String => "string",
            SchemaType::Integer => "integer",
            SchemaType::Number => "number",
            SchemaType::Boolean => "boolean",
            SchemaType::Array => "array",
            SchemaType::Object => "object",
            SchemaType::Null => "null",
        }
    }

    /// Normalized schema type of a primitive kind
    pub fn from_kind(kind: PrimitiveKind) -> Self {
        match kind {
            PrimitiveKind::String => SchemaType::String,
            PrimitiveKind::Integer => SchemaType::Integer,
            PrimitiveKind::Float => SchemaType::Number,
            PrimitiveKind::Boolean => SchemaType::Boolean,
            PrimitiveKind::List => SchemaType::Array,
            PrimitiveKind::Map => SchemaType::Object,
            PrimitiveKind::Null => SchemaType::Null,
        }
    }

    /// Whether a declared type name accepts values of this type.
    /// Integers are numbers, so `number` accepts `integer`.
    pub fn satisfies(&self, declared: &str) -> bool {
        declared == self.as_str() || (declared == "number" && *self == SchemaType::Integer)
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, SchemaType::Integer | SchemaType::Number)
    }
}

impl std::fmt::Display for SchemaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Non-string type implied by string patterns, if any
fn implied_by_patterns(patterns: &BTreeSet<StringPattern>) -> Option<SchemaType> {
    let integer = patterns.contains(&StringPattern::IntegerString);
    let float = patterns.contains(&StringPattern::FloatString);
    if integer && float {
        Some(SchemaType::Number)
    } else if integer {
        Some(SchemaType::Integer)
    } else if float {
        Some(SchemaType::Number)
    } else if patterns.contains(&StringPattern::BooleanString) {
        Some(SchemaType::Boolean)
    } else {
        None
    }
}

/// Recommend a declared type for an aggregate
pub fn recommend_type(aggregate: &Aggregate) -> SchemaType {
    if aggregate.format.is_some() {
        return SchemaType::String;
    }

    let implied = implied_by_patterns(&aggregate.patterns);

    match aggregate.kinds.len() {
        0 => implied.unwrap_or(SchemaType::Null),
        1 => {
            if let Some(implied) = implied {
                return implied;
            }
            aggregate
                .kinds
                .keys()
                .next()
                .map(|kind| SchemaType::from_kind(*kind))
                .unwrap_or(SchemaType::Null)
        }
        _ => match aggregate.dominant_kind() {
            Some(PrimitiveKind::String) => implied.unwrap_or(SchemaType::String),
            Some(kind) => SchemaType::from_kind(kind),
            None => SchemaType::Null,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::explore::aggregate::AnalysisMerger;
    use crate::explore::analyzer::PropertyValueAnalyzer;
    use crate::explore::config::ExplorerConfig;
    use serde_json::{Value, json};

    fn recommend(values: &[Value]) -> SchemaType {
        let config = ExplorerConfig::default();
        let analyzer = PropertyValueAnalyzer::new(&config);
        let merger = AnalysisMerger::new(&config);
        let mut aggregate = Aggregate::default();
        for value in values {
            merger.merge(&mut aggregate, analyzer.analyze(value));
        }
        recommend_type(&aggregate)
    }

    #[test]
    fn test_single_kinds() {
        assert_eq!(recommend(&[json!(1), json!(2)]), SchemaType::Integer);
        assert_eq!(recommend(&[json!(1.5)]), SchemaType::Number);
        assert_eq!(recommend(&[json!(true)]), SchemaType::Boolean);
        assert_eq!(recommend(&[json!(["a"])]), SchemaType::Array);
        assert_eq!(recommend(&[json!({"a": 1})]), SchemaType::Object);
        assert_eq!(recommend(&[json!("plain text")]), SchemaType::String);
        assert_eq!(recommend(&[Value::Null]), SchemaType::Null);
    }

    #[test]
    fn test_format_forces_string() {
        assert_eq!(recommend(&[json!("2024-01-15")]), SchemaType::String);
    }

    #[test]
    fn test_patterns_imply_types() {
        assert_eq!(recommend(&[json!("123")]), SchemaType::Integer);
        assert_eq!(recommend(&[json!("1.25")]), SchemaType::Number);
        assert_eq!(recommend(&[json!("12"), json!("1.5")]), SchemaType::Number);
        assert_eq!(recommend(&[json!("yes"), json!("no")]), SchemaType::Boolean);
    }

    #[test]
    fn test_mixed_numbers_follow_majority() {
        let mut values: Vec<Value> = (0..9).map(|i| json!(i)).collect();
        values.push(json!(2.5));
        assert_eq!(recommend(&values), SchemaType::Integer);

        let mut values: Vec<Value> = (0..9).map(|i| json!(i as f64 + 0.5)).collect();
        values.push(json!(3));
        assert_eq!(recommend(&values), SchemaType::Number);

        // Ties go to the lower kind
        assert_eq!(recommend(&[json!(1), json!(2.5)]), SchemaType::Integer);
    }

    #[test]
    fn test_mixed_kinds() {
        assert_eq!(
            recommend(&[json!("a"), json!("b"), json!(true)]),
            SchemaType::String
        );
        assert_eq!(
            recommend(&[json!(true), json!(false), json!("x")]),
            SchemaType::Boolean
        );
        // Dominant string with integer-like values
        assert_eq!(
            recommend(&[json!("1"), json!("2"), json!(true)]),
            SchemaType::Integer
        );
    }

    #[test]
    fn test_declared_number_accepts_integer() {
        assert!(SchemaType::Integer.satisfies("number"));
        assert!(SchemaType::Integer.satisfies("integer"));
        assert!(!SchemaType::Number.satisfies("integer"));
        assert!(!SchemaType::Integer.satisfies("string"));
    }
}
