//! # Custody Ledger
//!
//! The chain of custody owned by each batch: one record at creation, then
//! exactly one per successful transfer. Records are never edited, removed,
//! or reordered, and each record is no earlier than the one before it.
//!
//! A ledger is never empty. Construction goes through
//! [`CustodyLedger::record_creation`], and decoding an empty array fails.

use rxl_core::{PartyId, Timestamp};
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use crate::batch::{Batch, BatchStatus};

/// Errors appending to the custody chain.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CustodyError {
    /// The new record would predate the current head of the chain.
    #[error("custody record at {attempted} would precede the latest record at {latest}")]
    OutOfOrder {
        /// Timestamp of the current head.
        latest: Timestamp,
        /// Timestamp of the rejected record.
        attempted: Timestamp,
    },
}

/// One entry in the chain of custody.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustodyRecord {
    /// Holder of the batch from this point on.
    pub owner: PartyId,
    /// When custody changed.
    pub timestamp: Timestamp,
    /// Batch status at this point.
    pub status: BatchStatus,
    /// Location reported with the change. Empty at creation.
    pub location: String,
}

/// Append-only custody chain.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct CustodyLedger(Vec<CustodyRecord>);

impl CustodyLedger {
    /// Start a chain with the creation record: the creator holds the batch
    /// as `Manufactured` at no location.
    pub fn record_creation(creator: PartyId, at: Timestamp) -> Self {
        Self(vec![CustodyRecord {
            owner: creator,
            timestamp: at,
            status: BatchStatus::Manufactured,
            location: String::new(),
        }])
    }

    /// Append the record of a successful transfer.
    pub fn record_transfer(
        &mut self,
        owner: PartyId,
        status: BatchStatus,
        location: String,
        at: Timestamp,
    ) -> Result<&CustodyRecord, CustodyError> {
        let latest = self.latest().timestamp;
        if at < latest {
            return Err(CustodyError::OutOfOrder {
                latest,
                attempted: at,
            });
        }
        self.0.push(CustodyRecord {
            owner,
            timestamp: at,
            status,
            location,
        });
        Ok(self.latest())
    }

    /// All records, oldest first.
    pub fn records(&self) -> &[CustodyRecord] {
        &self.0
    }

    /// The creation record.
    pub fn creation(&self) -> &CustodyRecord {
        // Non-empty by construction and by decoding.
        &self.0[0]
    }

    /// The most recently appended record.
    pub fn latest(&self) -> &CustodyRecord {
        &self.0[self.0.len() - 1]
    }

    /// Number of records, including the creation record.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false; present for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate the records oldest first.
    pub fn iter(&self) -> std::slice::Iter<'_, CustodyRecord> {
        self.0.iter()
    }
}

impl<'de> Deserialize<'de> for CustodyLedger {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let records = Vec::<CustodyRecord>::deserialize(deserializer)?;
        if records.is_empty() {
            return Err(serde::de::Error::custom(
                "custody history must contain the creation record",
            ));
        }
        Ok(Self(records))
    }
}

impl<'a> IntoIterator for &'a CustodyLedger {
    type Item = &'a CustodyRecord;
    type IntoIter = std::slice::Iter<'a, CustodyRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Version-level audit trail: for each persisted version of a batch, the
/// custody record that was the head of the chain in that version.
///
/// Callers pass versions oldest first with deleted versions already removed.
pub fn latest_record_per_version<'a>(
    versions: impl IntoIterator<Item = &'a Batch>,
) -> Vec<CustodyRecord> {
    versions
        .into_iter()
        .map(|batch| batch.history().latest().clone())
        .collect()
}
