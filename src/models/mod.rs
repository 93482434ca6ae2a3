//! Models module
//!
//! Data structures exchanged with the host: schema definitions and the
//! records stored under them.

pub mod record;
pub mod schema;

pub use record::{METADATA_ENVELOPE_KEY, Record};
pub use schema::{PropertyDefinition, SchemaDefinition, TypeDeclaration};
