//! Property discovery and drift analysis
//!
//! This module inspects the records stored under a soft schema and reports
//! what the data actually looks like.
//!
//! ## Features
//!
//! - **Property discovery** - Find properties the schema does not declare
//! - **Type inference** - Recommend a type from kinds, formats and string patterns
//! - **Format detection** - Recognize date, date-time, uuid, email, url and more
//! - **Drift analysis** - Compare declared constraints with observed values
//! - **Apply** - Merge approved definitions back into the schema
//!
//! ## Example
//!
//! ```rust
//! use schema_explorer::explore::SchemaExplorer;
//! use schema_explorer::models::{Record, SchemaDefinition};
//! use schema_explorer::storage::MemoryBackend;
//! use serde_json::json;
//!
//! let backend = MemoryBackend::new();
//! backend.insert_schema(SchemaDefinition::new("people"));
//! backend.insert_records("people", vec![
//!     Record::new(json!({"name": "Alice", "age": 30})),
//!     Record::new(json!({"name": "Bob", "age": 25})),
//! ]);
//!
//! let explorer = SchemaExplorer::new(backend);
//! let report = explorer.explore("people")?;
//! assert_eq!(report.summary.new_count, 2);
//! # Ok::<(), schema_explorer::explore::ExploreError>(())
//! ```

mod aggregate;
mod analyzer;
mod config;
mod drift;
mod error;
mod explorer;
mod formats;
mod generator;
mod patterns;
mod recommend;
mod report;
mod suggestion;
mod value;

pub use aggregate::{Aggregate, AnalysisMerger};
pub use analyzer::{
    ArrayStructure, Fingerprint, NumericKind, NumericRange, Observation, PropertyValueAnalyzer,
};
pub use config::{DEFAULT_INTERNAL_PROPERTIES, ExplorerConfig, ExplorerConfigBuilder};
pub use drift::DriftAnalyzer;
pub use error::ExploreError;
pub use explorer::SchemaExplorer;
pub use formats::{Format, detect_format};
pub use generator::{NESTED_PROPERTY_DESCRIPTION, SuggestionGenerator};
pub use patterns::{StringPattern, detect_patterns};
pub use recommend::{SchemaType, recommend_type};
pub use report::{DiscoveredProperty, ExplorationReport, PropertyUsage, ReportSummary};
pub use suggestion::{
    Confidence, PropertySuggestion, Rationale, RationaleKind, SuggestionKind, sort_suggestions,
};
pub use value::{ObservedValue, PrimitiveKind, kind_of};
