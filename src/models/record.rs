//! Record model
//!
//! A stored object as handed over by the host. The body is kept as raw JSON;
//! only `properties()` gives the analyzer a typed view of it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

/// Key of the metadata envelope that hosts embed in stored objects
pub const METADATA_ENVELOPE_KEY: &str = "@self";

/// A single stored record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Host identifier of the record, if known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Raw record body
    pub object: Value,
    /// Last modification time, used for population fingerprints
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated: Option<DateTime<Utc>>,
}

impl Record {
    /// Wrap a raw body
    pub fn new(object: Value) -> Self {
        Self {
            id: None,
            object,
            updated: None,
        }
    }

    /// Build a record from a stored object, lifting `id` and `updated` out of
    /// the metadata envelope when present
    pub fn from_object(object: Value) -> Self {
        let envelope = object.get(METADATA_ENVELOPE_KEY);
        let id = envelope
            .and_then(|e| e.get("id"))
            .or_else(|| object.get("id"))
            .and_then(|v| match v {
                Value::String(s) => Some(s.clone()),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            });
        let updated = envelope
            .and_then(|e| e.get("updated"))
            .and_then(Value::as_str)
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|dt| dt.with_timezone(&Utc));

        Self {
            id,
            object,
            updated,
        }
    }

    /// Set the record id
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Set the last modification time
    pub fn with_updated(mut self, updated: DateTime<Utc>) -> Self {
        self.updated = Some(updated);
        self
    }

    /// Property bag of the record, or `None` when the body is not an object
    pub fn properties(&self) -> Option<&Map<String, Value>> {
        self.object.as_object()
    }

    /// Label used in diagnostics
    pub fn label(&self, index: usize) -> String {
        match &self.id {
            Some(id) => id.clone(),
            None => format!("#{}", index),
        }
    }

    /// Fingerprint of a population: sha256 over the record count and the most
    /// recent modification time. Hosts key report caches on schema id plus
    /// this value.
    pub fn population_fingerprint(records: &[Record]) -> String {
        let latest = records
            .iter()
            .filter_map(|r| r.updated)
            .max()
            .map(|dt| dt.to_rfc3339())
            .unwrap_or_else(|| "-".to_string());

        let mut hasher = Sha256::new();
        hasher.update(records.len().to_string().as_bytes());
        hasher.update(b":");
        hasher.update(latest.as_bytes());
        format!("{:x}", hasher.finalize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn test_from_object_reads_envelope() {
        let record = Record::from_object(json!({
            "name": "Alice",
            "@self": {"id": "rec-1", "updated": "2024-03-01T10:00:00+00:00"}
        }));
        assert_eq!(record.id.as_deref(), Some("rec-1"));
        assert_eq!(
            record.updated,
            Some(Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_properties_requires_object() {
        assert!(Record::new(json!({"a": 1})).properties().is_some());
        assert!(Record::new(json!([1, 2])).properties().is_none());
    }

    #[test]
    fn test_population_fingerprint_tracks_count_and_latest_update() {
        let t1 = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let t2 = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let a = vec![Record::new(json!({})).with_updated(t1)];
        let b = vec![Record::new(json!({})).with_updated(t2)];
        let c = vec![
            Record::new(json!({})).with_updated(t1),
            Record::new(json!({})).with_updated(t1),
        ];

        let fa = Record::population_fingerprint(&a);
        assert_eq!(fa.len(), 64);
        assert_eq!(fa, Record::population_fingerprint(&a.clone()));
        assert_ne!(fa, Record::population_fingerprint(&b));
        assert_ne!(fa, Record::population_fingerprint(&c));
    }
}
