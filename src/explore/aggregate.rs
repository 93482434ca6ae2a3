//! Per-property aggregates and the merger that builds them
//!
//! An aggregate is created the first time a property name is seen in a run
//! and is discarded when the run ends. Merging is order-insensitive for every
//! field except `examples` (first seen wins), `array_structure` (first array
//! wins) and a format tie between ipv4 and ipv6 (first seen wins).

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use serde_json::Value;

use super::analyzer::{ArrayStructure, NumericRange, Observation, dominant_kind};
use super::config::ExplorerConfig;
use super::formats::Format;
use super::patterns::StringPattern;
use super::value::PrimitiveKind;

/// Accumulated evidence for one property across a population
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Aggregate {
    /// Occurrences per primitive kind (nulls and blanks excluded)
    pub kinds: BTreeMap<PrimitiveKind, usize>,
    pub examples: Vec<Value>,
    pub nullable: bool,
    /// Occurrences per distinct string value
    #[serde(skip)]
    pub value_counts: BTreeMap<String, usize>,
    /// Set once more distinct strings were seen than are tracked
    #[serde(skip)]
    pub value_overflow: bool,
    pub max_length: Option<usize>,
    pub min_length: Option<usize>,
    pub format: Option<Format>,
    pub patterns: BTreeSet<StringPattern>,
    pub numeric_range: Option<NumericRange>,
    pub object_keys: Option<BTreeSet<String>>,
    pub array_structure: Option<ArrayStructure>,
    pub usage_count: usize,
}

impl Aggregate {
    /// Usage as a percentage of the population, rounded to 2 decimals
    pub fn usage_percentage(&self, total_records: usize) -> f64 {
        if total_records == 0 {
            return 0.0;
        }
        let pct = self.usage_count as f64 / total_records as f64 * 100.0;
        (pct * 100.0).round() / 100.0
    }

    /// Number of non-null, non-blank observations
    pub fn observed_count(&self) -> usize {
        self.kinds.values().sum()
    }

    /// Most frequently observed kind
    pub fn dominant_kind(&self) -> Option<PrimitiveKind> {
        dominant_kind(&self.kinds)
    }

    /// Number of distinct nested object keys
    pub fn object_key_count(&self) -> usize {
        self.object_keys.as_ref().map_or(0, BTreeSet::len)
    }

    /// Distinct string values when the property looks like an enumeration:
    /// enough string observations, few distinct values relative to them, and
    /// string as the dominant kind.
    pub fn enum_candidates(&self, config: &ExplorerConfig) -> Option<Vec<Value>> {
        if self.value_overflow || self.dominant_kind() != Some(PrimitiveKind::String) {
            return None;
        }
        let total = self.kinds.get(&PrimitiveKind::String).copied().unwrap_or(0);
        if total < config.enum_min_examples || self.value_counts.is_empty() {
            return None;
        }
        let ratio = self.value_counts.len() as f64 / total as f64;
        if ratio > config.enum_max_unique_ratio {
            return None;
        }
        Some(
            self.value_counts
                .keys()
                .map(|v| Value::String(v.clone()))
                .collect(),
        )
    }
}

/// Folds observations and partial aggregates into aggregates
#[derive(Debug, Clone, Copy)]
pub struct AnalysisMerger<'a> {
    config: &'a ExplorerConfig,
}

impl<'a> AnalysisMerger<'a> {
    pub fn new(config: &'a ExplorerConfig) -> Self {
        Self { config }
    }

    /// Fold one observation into an aggregate
    pub fn merge(&self, aggregate: &mut Aggregate, observation: Observation) {
        aggregate.usage_count += 1;

        let fp = match observation {
            Observation::Null => {
                aggregate.nullable = true;
                return;
            }
            Observation::Blank => return,
            Observation::Present(fp) => fp,
        };

        *aggregate.kinds.entry(fp.kind).or_insert(0) += 1;

        if let Some(example) = fp.example {
            if let Value::String(s) = &example {
                self.count_value(aggregate, s.clone(), 1);
            }
            self.push_example(aggregate, example);
        }

        if let Some(length) = fp.length {
            self.merge_lengths(aggregate, Some(length), Some(length));
        }
        if let Some(format) = fp.format {
            Self::merge_format(aggregate, format);
        }
        aggregate.patterns.extend(fp.patterns);
        if let Some(range) = fp.numeric_range {
            Self::merge_range(aggregate, &range);
        }
        if let Some(keys) = fp.object_keys {
            aggregate.object_keys.get_or_insert_with(BTreeSet::new).extend(keys);
        }
        if aggregate.array_structure.is_none() {
            aggregate.array_structure = fp.array_structure;
        }
    }

    /// Fold one aggregate into another
    pub fn merge_aggregates(&self, into: &mut Aggregate, other: Aggregate) {
        into.usage_count += other.usage_count;
        into.nullable |= other.nullable;

        for (kind, count) in other.kinds {
            *into.kinds.entry(kind).or_insert(0) += count;
        }

        if other.value_overflow {
            into.value_overflow = true;
            into.value_counts.clear();
        } else {
            for (value, count) in other.value_counts {
                self.count_value(into, value, count);
            }
        }

        for example in other.examples {
            self.push_example(into, example);
        }

        self.merge_lengths(into, other.max_length, other.min_length);
        if let Some(format) = other.format {
            Self::merge_format(into, format);
        }
        into.patterns.extend(other.patterns);
        if let Some(range) = other.numeric_range {
            Self::merge_range(into, &range);
        }
        if let Some(keys) = other.object_keys {
            into.object_keys.get_or_insert_with(BTreeSet::new).extend(keys);
        }
        if into.array_structure.is_none() {
            into.array_structure = other.array_structure;
        }
    }

    /// Trim the example list once folding is complete
    pub fn compact(&self, aggregate: &mut Aggregate) {
        aggregate.examples.truncate(self.config.max_examples);
    }

    fn push_example(&self, aggregate: &mut Aggregate, example: Value) {
        if aggregate.examples.len() >= self.config.example_soft_cap
            || aggregate.examples.contains(&example)
        {
            return;
        }
        aggregate.examples.push(example);
    }

    fn count_value(&self, aggregate: &mut Aggregate, value: String, count: usize) {
        if aggregate.value_overflow {
            return;
        }
        *aggregate.value_counts.entry(value).or_insert(0) += count;
        if aggregate.value_counts.len() > self.config.enum_tracking_limit {
            aggregate.value_overflow = true;
            aggregate.value_counts.clear();
        }
    }

    fn merge_lengths(&self, aggregate: &mut Aggregate, max: Option<usize>, min: Option<usize>) {
        if let Some(max) = max {
            aggregate.max_length = Some(aggregate.max_length.map_or(max, |m| m.max(max)));
        }
        if let Some(min) = min {
            aggregate.min_length = Some(aggregate.min_length.map_or(min, |m| m.min(min)));
        }
    }

    fn merge_format(aggregate: &mut Aggregate, format: Format) {
        match aggregate.format {
            Some(current) if format.priority() <= current.priority() => {}
            _ => aggregate.format = Some(format),
        }
    }

    fn merge_range(aggregate: &mut Aggregate, range: &NumericRange) {
        match aggregate.numeric_range.as_mut() {
            Some(current) => current.merge(range),
            None => aggregate.numeric_range = Some(*range),
        }
    }
}
