//! Record store contract: direct reads against the key-value tables
//!
//! The validator never writes through this seam. It performs exact-key
//! point lookups plus one bounded partition query used only as a
//! diagnostic fallback when a designed key turns up empty.

use crate::error::ValidatorError;
use crate::keys::RecordKey;
use async_trait::async_trait;
use serde_json::{Map, Value};

/// Upper bound for the diagnostic fallback query
pub const FALLBACK_QUERY_LIMIT: u32 = 20;

/// A record read back from storage, as a flat attribute map
#[derive(Debug, Clone, Default)]
pub struct StoredRecord {
    attributes: Map<String, Value>,
}

impl StoredRecord {
    /// Wrap a raw attribute map
    #[inline]
    #[must_use]
    pub fn new(attributes: Map<String, Value>) -> Self {
        Self { attributes }
    }

    /// String attribute by name
    #[inline]
    #[must_use]
    pub fn str_field(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).and_then(Value::as_str)
    }

    /// Observed primary key
    #[inline]
    #[must_use]
    pub fn pk(&self) -> Option<&str> {
        self.str_field("pk")
    }

    /// Observed sort key
    #[inline]
    #[must_use]
    pub fn sk(&self) -> Option<&str> {
        self.str_field("sk")
    }

    /// Observed composite key, when both halves are present
    #[inline]
    #[must_use]
    pub fn key(&self) -> Option<RecordKey> {
        Some(RecordKey {
            pk: self.pk()?.to_string(),
            sk: self.sk()?.to_string(),
        })
    }
}

/// Read-only access to the key-value tables
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Point lookup by exact composite key
    async fn get(
        &self,
        table: &str,
        key: &RecordKey,
    ) -> Result<Option<StoredRecord>, ValidatorError>;

    /// Partition query by primary key equality, bounded by `limit`
    ///
    /// Diagnostic use only; results must never be treated as proof that a
    /// designed key exists.
    async fn query_partition(
        &self,
        table: &str,
        pk: &str,
        limit: u32,
    ) -> Result<Vec<StoredRecord>, ValidatorError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(pairs: Value) -> StoredRecord {
        match pairs {
            Value::Object(map) => StoredRecord::new(map),
            _ => unreachable!("test records are objects"),
        }
    }

    #[test]
    fn accessors_read_string_attributes() {
        let rec = record(json!({
            "pk": "PROJECT#p-1",
            "sk": "METADATA",
            "project_id": "p-1",
            "mod_total": 100000,
        }));
        assert_eq!(rec.pk(), Some("PROJECT#p-1"));
        assert_eq!(rec.sk(), Some("METADATA"));
        assert_eq!(rec.str_field("project_id"), Some("p-1"));
        // Non-string attributes are not strings
        assert_eq!(rec.str_field("mod_total"), None);
    }

    #[test]
    fn key_requires_both_halves() {
        let full = record(json!({"pk": "PROJECT#p-1", "sk": "METADATA"}));
        assert_eq!(
            full.key(),
            Some(RecordKey {
                pk: "PROJECT#p-1".to_string(),
                sk: "METADATA".to_string()
            })
        );

        let partial = record(json!({"pk": "PROJECT#p-1"}));
        assert_eq!(partial.key(), None);
    }
}
