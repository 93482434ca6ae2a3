//! Per-value analysis
//!
//! Turns one observed property value into a fingerprint: its primitive kind
//! plus whatever format, pattern, range or structure evidence it carries.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use super::config::ExplorerConfig;
use super::formats::{Format, detect_format};
use super::patterns::{StringPattern, detect_patterns};
use super::value::{ObservedValue, PrimitiveKind, kind_of};

/// Numeric kind of a range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NumericKind {
    Integer,
    Number,
}

/// Observed numeric range
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NumericRange {
    pub min: f64,
    pub max: f64,
    pub kind: NumericKind,
}

impl NumericRange {
    /// Degenerate range around one value
    pub fn point(value: f64, kind: NumericKind) -> Self {
        Self {
            min: value,
            max: value,
            kind,
        }
    }

    /// Widen to cover another range; any float promotes the range to number
    pub fn merge(&mut self, other: &NumericRange) {
        self.min = self.min.min(other.min);
        self.max = self.max.max(other.max);
        if other.kind == NumericKind::Number {
            self.kind = NumericKind::Number;
        }
    }

    /// Whether more than one distinct value was seen
    pub fn is_real(&self) -> bool {
        self.min != self.max
    }

    /// A bound as a JSON value, integral for integer ranges
    pub fn bound_value(&self, bound: f64) -> Value {
        match self.kind {
            NumericKind::Integer => json!(bound as i64),
            NumericKind::Number => json!(bound),
        }
    }
}

/// Shape of an observed array
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ArrayStructure {
    Empty,
    List {
        length: usize,
        item_kinds: BTreeMap<PrimitiveKind, usize>,
        sample: Option<Value>,
    },
}

impl ArrayStructure {
    /// Most frequent item kind, ties resolved towards the lower kind
    pub fn dominant_item_kind(&self) -> Option<PrimitiveKind> {
        match self {
            ArrayStructure::Empty => None,
            ArrayStructure::List { item_kinds, .. } => dominant_kind(item_kinds),
        }
    }
}

/// Most frequent kind in a histogram, ties resolved towards the lower kind
pub fn dominant_kind(histogram: &BTreeMap<PrimitiveKind, usize>) -> Option<PrimitiveKind> {
    histogram
        .iter()
        .max_by(|(ka, ca), (kb, cb)| ca.cmp(cb).then(kb.cmp(ka)))
        .map(|(kind, _)| *kind)
}

/// Evidence extracted from a single non-blank value
#[derive(Debug, Clone, PartialEq)]
pub struct Fingerprint {
    pub kind: PrimitiveKind,
    /// Scalar example; containers carry none
    pub example: Option<Value>,
    /// Character length of a string value
    pub length: Option<usize>,
    pub format: Option<Format>,
    pub patterns: BTreeSet<StringPattern>,
    pub numeric_range: Option<NumericRange>,
    pub object_keys: Option<BTreeSet<String>>,
    pub array_structure: Option<ArrayStructure>,
}

impl Fingerprint {
    fn of_kind(kind: PrimitiveKind) -> Self {
        Self {
            kind,
            example: None,
            length: None,
            format: None,
            patterns: BTreeSet::new(),
            numeric_range: None,
            object_keys: None,
            array_structure: None,
        }
    }
}

/// Result of analyzing one value
#[derive(Debug, Clone, PartialEq)]
pub enum Observation {
    /// Explicit null: counts toward usage and marks the property nullable
    Null,
    /// Empty string: counts toward usage only
    Blank,
    Present(Fingerprint),
}

/// Analyzes single property values
#[derive(Debug, Clone, Copy)]
pub struct PropertyValueAnalyzer<'a> {
    config: &'a ExplorerConfig,
}

impl<'a> PropertyValueAnalyzer<'a> {
    pub fn new(config: &'a ExplorerConfig) -> Self {
        Self { config }
    }

    /// Classify one observed value
    pub fn analyze(&self, value: &Value) -> Observation {
        match ObservedValue::from(value) {
            ObservedValue::Null => Observation::Null,
            ObservedValue::Str("") => Observation::Blank,
            ObservedValue::Str(s) => Observation::Present(self.analyze_string(s)),
            ObservedValue::Bool(b) => {
                let mut fp = Fingerprint::of_kind(PrimitiveKind::Boolean);
                fp.example = Some(Value::Bool(b));
                Observation::Present(fp)
            }
            ObservedValue::Int(i) => {
                let mut fp = Fingerprint::of_kind(PrimitiveKind::Integer);
                fp.example = Some(json!(i));
                fp.numeric_range = Some(NumericRange::point(i as f64, NumericKind::Integer));
                Observation::Present(fp)
            }
            ObservedValue::Float(f) => {
                let mut fp = Fingerprint::of_kind(PrimitiveKind::Float);
                fp.example = Some(value.clone());
                fp.numeric_range = Some(NumericRange::point(f, NumericKind::Number));
                Observation::Present(fp)
            }
            ObservedValue::List(items) => {
                let mut fp = Fingerprint::of_kind(PrimitiveKind::List);
                fp.array_structure = Some(if items.is_empty() {
                    ArrayStructure::Empty
                } else {
                    let mut item_kinds = BTreeMap::new();
                    for item in items {
                        *item_kinds.entry(kind_of(item)).or_insert(0) += 1;
                    }
                    ArrayStructure::List {
                        length: items.len(),
                        item_kinds,
                        sample: items.first().cloned(),
                    }
                });
                Observation::Present(fp)
            }
            ObservedValue::Map(map) => {
                let mut fp = Fingerprint::of_kind(PrimitiveKind::Map);
                fp.object_keys = Some(map.keys().cloned().collect());
                Observation::Present(fp)
            }
        }
    }

    fn analyze_string(&self, s: &str) -> Fingerprint {
        let mut fp = Fingerprint::of_kind(PrimitiveKind::String);
        fp.example = Some(Value::String(s.to_string()));
        fp.length = Some(s.chars().count());
        if self.config.detect_formats {
            fp.format = detect_format(s);
        }
        if self.config.detect_patterns {
            fp.patterns = detect_patterns(s);
        }
        fp
    }
}
