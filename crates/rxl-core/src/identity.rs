//! # Domain Identity Newtypes
//!
//! Batches and parties live in different namespaces: a batch id is a ledger
//! key, a party id is whatever the membership service reports for a caller
//! (or whatever a transferring caller names as the new owner).
//!
//! Flags share the ledger key space with batches, so batch ids may not start
//! with [`FLAG_KEY_PREFIX`].

use serde::{Deserialize, Serialize};

use crate::error::RxlError;

/// Key prefix reserved for flag records in the shared ledger key space.
pub const FLAG_KEY_PREFIX: &str = "FLAG_";

/// Ledger key of a pharmaceutical batch.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BatchId(String);

impl BatchId {
    /// Validate and wrap a batch id.
    ///
    /// Rejects empty ids, ids with surrounding whitespace or control
    /// characters, and ids inside the reserved flag key space.
    pub fn new(id: impl Into<String>) -> Result<Self, RxlError> {
        let id = id.into();
        let reject = |reason: &str| RxlError::InvalidIdentifier {
            value: id.clone(),
            reason: reason.to_string(),
        };
        if id.is_empty() {
            return Err(reject("batch id must not be empty"));
        }
        if id.trim() != id {
            return Err(reject("batch id must not have leading or trailing whitespace"));
        }
        if id.chars().any(char::is_control) {
            return Err(reject("batch id must not contain control characters"));
        }
        if id.starts_with(FLAG_KEY_PREFIX) {
            return Err(reject("batch id uses the reserved flag key prefix"));
        }
        Ok(Self(id))
    }

    /// The id as a ledger key.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for BatchId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identity of a custody party (manufacturer, distributor, pharmacy, or
/// any organization named as a new owner).
///
/// Opaque by design of the membership service; only equality is meaningful.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PartyId(String);

impl PartyId {
    /// Wrap a party identity string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Access the inner identity string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PartyId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_id_accepts_plain_key() {
        let id = BatchId::new("batch1").unwrap();
        assert_eq!(id.as_str(), "batch1");
        assert_eq!(id.to_string(), "batch1");
    }

    #[test]
    fn test_batch_id_rejects_empty() {
        assert!(BatchId::new("").is_err());
    }

    #[test]
    fn test_batch_id_rejects_flag_prefix() {
        let err = BatchId::new("FLAG_batch1_2026").unwrap_err();
        match err {
            RxlError::InvalidIdentifier { value, .. } => assert_eq!(value, "FLAG_batch1_2026"),
            other => panic!("Expected InvalidIdentifier, got: {other:?}"),
        }
    }

    #[test]
    fn test_batch_id_rejects_whitespace_and_control() {
        assert!(BatchId::new(" batch1").is_err());
        assert!(BatchId::new("batch\n1").is_err());
    }

    #[test]
    fn test_ids_serialize_as_bare_strings() {
        let id = BatchId::new("B-001").unwrap();
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"B-001\"");
        let party = PartyId::new("x509::CN=manufacturer1");
        let parsed: PartyId =
            serde_json::from_str(&serde_json::to_string(&party).unwrap()).unwrap();
        assert_eq!(parsed, party);
    }
}
