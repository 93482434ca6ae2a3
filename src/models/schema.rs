//! Schema definition model
//!
//! A soft, JSON-Schema flavoured description of the records stored under one
//! schema. Unknown keys are kept in `extra` so a definition read from the host
//! can be written back without loss.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Declared `type` of a property: either a single name or a list of names
/// (e.g. `["string", "null"]`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TypeDeclaration {
    Single(String),
    Multiple(Vec<String>),
}

impl TypeDeclaration {
    /// The first declared type that is not `null`
    pub fn primary(&self) -> Option<&str> {
        match self {
            TypeDeclaration::Single(t) => Some(t.as_str()),
            TypeDeclaration::Multiple(types) => types
                .iter()
                .map(String::as_str)
                .find(|t| *t != "null")
                .or_else(|| types.first().map(String::as_str)),
        }
    }

    /// Whether `null` is among the declared types
    pub fn includes_null(&self) -> bool {
        match self {
            TypeDeclaration::Single(t) => t == "null",
            TypeDeclaration::Multiple(types) => types.iter().any(|t| t == "null"),
        }
    }

    /// Widen this declaration so that it also accepts `null`
    pub fn with_null(&self) -> TypeDeclaration {
        if self.includes_null() {
            return self.clone();
        }
        match self {
            TypeDeclaration::Single(t) => {
                TypeDeclaration::Multiple(vec![t.clone(), "null".to_string()])
            }
            TypeDeclaration::Multiple(types) => {
                let mut types = types.clone();
                types.push("null".to_string());
                TypeDeclaration::Multiple(types)
            }
        }
    }
}

impl std::fmt::Display for TypeDeclaration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TypeDeclaration::Single(t) => write!(f, "{}", t),
            TypeDeclaration::Multiple(types) => write!(f, "{}", types.join("|")),
        }
    }
}

impl From<&str> for TypeDeclaration {
    fn from(value: &str) -> Self {
        TypeDeclaration::Single(value.to_string())
    }
}

/// Definition of a single property within a schema
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyDefinition {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub property_type: Option<TypeDeclaration>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum: Option<Value>,
    #[serde(rename = "enum", default, skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<PropertyDefinition>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<BTreeMap<String, PropertyDefinition>>,
    /// Property-level required flag (in addition to the schema `required` list)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub examples: Vec<Value>,
    /// Any keys not modelled above
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl PropertyDefinition {
    /// Create a definition with just a type
    pub fn of_type(property_type: impl Into<String>) -> Self {
        Self {
            property_type: Some(TypeDeclaration::Single(property_type.into())),
            ..Default::default()
        }
    }

    /// Set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Primary declared type, if any
    pub fn declared_type(&self) -> Option<&str> {
        self.property_type.as_ref().and_then(|t| t.primary())
    }

    /// Whether the declaration already accepts `null`
    pub fn accepts_null(&self) -> bool {
        self.property_type
            .as_ref()
            .map(|t| t.includes_null())
            .unwrap_or(false)
    }
}

/// A schema definition as supplied by the host
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaDefinition {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub properties: BTreeMap<String, PropertyDefinition>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl SchemaDefinition {
    /// Create an empty schema
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    /// Set the title
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Add a declared property
    pub fn with_property(mut self, name: impl Into<String>, property: PropertyDefinition) -> Self {
        self.properties.insert(name.into(), property);
        self
    }

    /// Mark a property as required at schema level
    pub fn with_required(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        if !self.required.contains(&name) {
            self.required.push(name);
        }
        self
    }

    /// Whether a property is required, either via the schema-level list or
    /// the property's own flag
    pub fn is_required(&self, name: &str) -> bool {
        self.required.iter().any(|r| r == name)
            || self
                .properties
                .get(name)
                .and_then(|p| p.required)
                .unwrap_or(false)
    }

    /// Title for display, falling back to the id
    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.id)
    }
}
