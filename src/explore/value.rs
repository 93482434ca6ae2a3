//! Closed view of observed JSON values

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Primitive kind of an observed value
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrimitiveKind {
    String,
    Integer,
    Float,
    Boolean,
    List,
    Map,
    Null,
}

impl std::fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PrimitiveKind::String => write!(f, "string"),
            PrimitiveKind::Integer => write!(f, "integer"),
            PrimitiveKind::Float => write!(f, "float"),
            PrimitiveKind::Boolean => write!(f, "boolean"),
            PrimitiveKind::List => write!(f, "list"),
            PrimitiveKind::Map => write!(f, "map"),
            PrimitiveKind::Null => write!(f, "null"),
        }
    }
}

/// A decoded value, borrowed from the record it came from
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ObservedValue<'a> {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(&'a str),
    List(&'a [Value]),
    Map(&'a Map<String, Value>),
}

impl<'a> From<&'a Value> for ObservedValue<'a> {
    fn from(value: &'a Value) -> Self {
        match value {
            Value::Null => ObservedValue::Null,
            Value::Bool(b) => ObservedValue::Bool(*b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => ObservedValue::Int(i),
                // u64 beyond i64 range and real floats both land here
                None => ObservedValue::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            Value::String(s) => ObservedValue::Str(s.as_str()),
            Value::Array(items) => ObservedValue::List(items.as_slice()),
            Value::Object(map) => ObservedValue::Map(map),
        }
    }
}

impl ObservedValue<'_> {
    /// Primitive kind of this value
    pub fn kind(&self) -> PrimitiveKind {
        match self {
            ObservedValue::Null => PrimitiveKind::Null,
            ObservedValue::Bool(_) => PrimitiveKind::Boolean,
            ObservedValue::Int(_) => PrimitiveKind::Integer,
            ObservedValue::Float(_) => PrimitiveKind::Float,
            ObservedValue::Str(_) => PrimitiveKind::String,
            ObservedValue::List(_) => PrimitiveKind::List,
            ObservedValue::Map(_) => PrimitiveKind::Map,
        }
    }
}

/// Primitive kind of a raw JSON value
pub fn kind_of(value: &Value) -> PrimitiveKind {
    ObservedValue::from(value).kind()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_numbers_split_into_int_and_float() {
        assert_eq!(kind_of(&json!(42)), PrimitiveKind::Integer);
        assert_eq!(kind_of(&json!(-7)), PrimitiveKind::Integer);
        assert_eq!(kind_of(&json!(4.5)), PrimitiveKind::Float);
        assert_eq!(kind_of(&json!(u64::MAX)), PrimitiveKind::Float);
    }

    #[test]
    fn test_containers() {
        let list = json!([1, 2]);
        assert!(matches!(ObservedValue::from(&list), ObservedValue::List(items) if items.len() == 2));
        assert_eq!(kind_of(&json!({"a": 1})), PrimitiveKind::Map);
        assert_eq!(kind_of(&Value::Null), PrimitiveKind::Null);
    }
}
