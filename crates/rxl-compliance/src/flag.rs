//! # Regulator Flags
//!
//! A flag records a regulator's concern about a batch. Flags are written
//! once and never changed. They reference their batch by id only and live
//! beside it in the ledger key space, under [`FLAG_KEY_PREFIX`].
//!
//! ## Keys
//!
//! `FLAG_<batchId>_<flaggedAt>` where `flaggedAt` is the microsecond
//! RFC 3339 rendering. When two flags for the same batch land on the same
//! instant, later ones take the next free `_<n>` suffix; see
//! [`Flag::key_candidates`].

use rxl_core::{BatchId, OrgRole, Timestamp, FLAG_KEY_PREFIX};
use serde::{Deserialize, Serialize};

use crate::config::ComplianceError;

/// Highest `_<n>` suffix tried for flags raised on one batch at one instant.
pub const MAX_FLAG_KEY_SUFFIX: u32 = u16::MAX as u32;

/// How serious a flag is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    /// Noted for follow-up.
    Low,
    /// Needs investigation.
    Medium,
    /// Quarantine the batch.
    High,
}

impl Severity {
    /// Wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
        }
    }

    /// Parse an exact wire name.
    pub fn parse(s: &str) -> Result<Self, ComplianceError> {
        match s {
            "LOW" => Ok(Self::Low),
            "MEDIUM" => Ok(Self::Medium),
            "HIGH" => Ok(Self::High),
            other => Err(ComplianceError::UnknownSeverity(other.to_string())),
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A regulator flag on a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Flag {
    /// Ledger key of this flag.
    pub id: String,
    /// The flagged batch.
    pub batch_id: BatchId,
    /// Free-text reason supplied by the regulator.
    pub reason: String,
    /// Severity.
    pub severity: Severity,
    /// Role of the flagging party.
    pub flagged_by: OrgRole,
    /// When the flag was raised.
    pub flagged_at: Timestamp,
}

impl Flag {
    /// Build a flag with the given key.
    pub fn new(
        id: String,
        batch_id: BatchId,
        reason: String,
        severity: Severity,
        flagged_by: OrgRole,
        flagged_at: Timestamp,
    ) -> Self {
        Self {
            id,
            batch_id,
            reason,
            severity,
            flagged_by,
            flagged_at,
        }
    }

    /// The preferred key for a flag on `batch_id` raised at `at`.
    pub fn base_key(batch_id: &BatchId, at: &Timestamp) -> String {
        format!("{FLAG_KEY_PREFIX}{batch_id}_{}", at.to_rfc3339())
    }

    /// Candidate keys in preference order: the base key, then `_1`, `_2`,
    /// up to `_`[`MAX_FLAG_KEY_SUFFIX`].
    ///
    /// Callers take the first candidate absent from the ledger.
    pub fn key_candidates(batch_id: &BatchId, at: &Timestamp) -> impl Iterator<Item = String> {
        let base = Self::base_key(batch_id, at);
        std::iter::once(base.clone())
            .chain((1..=MAX_FLAG_KEY_SUFFIX).map(move |n| format!("{base}_{n}")))
    }
}
