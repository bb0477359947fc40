//! # Batch Lifecycle
//!
//! A pharmaceutical batch, its status machine, and transfer application.
//!
//! ## States
//!
//! ```text
//! Manufactured ──▶ InTransit ──▶ Delivered ──▶ Sold (terminal)
//!                      ▲             │
//!                      └─────────────┘  (re-routing)
//! ```
//!
//! `Flagged` overlays any status when a regulator records a high-severity
//! flag. `Expired` is a designated terminal status that no transfer enters;
//! expiry is derived from `expiryDate` by [`Batch::is_expired_at`].
//!
//! ## Invariants
//!
//! - `history` is never empty; its first record is the creation record.
//! - `temperatureReadings.len() == history.len() - 1`: every transfer adds
//!   one reading and one custody record, creation and flagging add neither.
//! - All checks run before any field is written, so a rejected transfer
//!   leaves the batch untouched.

use rxl_core::{BatchId, CallerRole, PartyId, Timestamp};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::authorization::{AuthorizationError, AuthorizationGuard};
use crate::custody::{CustodyError, CustodyLedger, CustodyRecord};

// ─── Batch Status ────────────────────────────────────────────────────

/// Lifecycle status of a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BatchStatus {
    /// Created by the manufacturer, not yet shipped.
    Manufactured,
    /// Moving between custody parties.
    InTransit,
    /// Delivered to a distribution point.
    Delivered,
    /// Sold to the end customer (terminal).
    Sold,
    /// Quarantined by a regulator (terminal).
    Flagged,
    /// Past its expiry date (terminal).
    Expired,
}

impl BatchStatus {
    /// Every status, in declaration order.
    pub const ALL: [BatchStatus; 6] = [
        Self::Manufactured,
        Self::InTransit,
        Self::Delivered,
        Self::Sold,
        Self::Flagged,
        Self::Expired,
    ];

    /// Returns the wire name of the status.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Manufactured => "Manufactured",
            Self::InTransit => "InTransit",
            Self::Delivered => "Delivered",
            Self::Sold => "Sold",
            Self::Flagged => "Flagged",
            Self::Expired => "Expired",
        }
    }

    /// Parse an exact wire name.
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|status| status.name() == s)
    }

    /// Whether no transfer can leave this status.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Sold | Self::Flagged | Self::Expired)
    }
}

impl std::fmt::Display for BatchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

// ─── Errors ──────────────────────────────────────────────────────────

/// Reasons a transfer is rejected. The batch is unchanged in every case.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransferError {
    /// The caller's role may not make this status move.
    #[error(transparent)]
    Unauthorized(#[from] AuthorizationError),

    /// The temperature reading is NaN or infinite.
    #[error("temperature reading must be a finite number, got {0}")]
    NonFiniteReading(f64),

    /// The custody record would break chronological order.
    #[error(transparent)]
    Custody(#[from] CustodyError),
}

// ─── Inputs ──────────────────────────────────────────────────────────

/// Descriptive fields of a batch being created.
#[derive(Debug, Clone, PartialEq)]
pub struct NewBatch {
    /// Ledger key.
    pub id: BatchId,
    /// Product name.
    pub name: String,
    /// Manufacturer's batch number.
    pub batch_number: String,
    /// When the batch was produced.
    pub manufacture_date: Timestamp,
    /// When the batch expires.
    pub expiry_date: Timestamp,
}

/// A requested custody transfer.
#[derive(Debug, Clone, PartialEq)]
pub struct Transfer {
    /// Party receiving custody.
    pub new_owner: PartyId,
    /// Requested status after the transfer.
    pub new_status: BatchStatus,
    /// Location reported with the transfer.
    pub location: String,
    /// Temperature observed at handover, in degrees Celsius.
    pub temperature: f64,
}

// ─── Batch ───────────────────────────────────────────────────────────

/// A pharmaceutical batch as stored on the ledger.
///
/// Descriptive fields are public. Custody state (owner, status, location,
/// readings, history) only changes through [`Batch::apply_transfer`] and
/// [`Batch::mark_flagged`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Batch {
    /// Ledger key.
    pub id: BatchId,
    /// Product name.
    pub name: String,
    /// Identity of the creating manufacturer.
    pub manufacturer: PartyId,
    /// Manufacturer's batch number.
    pub batch_number: String,
    /// When the batch was produced.
    pub manufacture_date: Timestamp,
    /// When the batch expires.
    pub expiry_date: Timestamp,
    current_owner: PartyId,
    status: BatchStatus,
    #[serde(alias = "temperature")]
    temperature_readings: Vec<f64>,
    location: String,
    history: CustodyLedger,
}

impl Batch {
    /// Create a batch held by its manufacturer in `Manufactured` status.
    pub fn create(new: NewBatch, creator: PartyId, at: Timestamp) -> Self {
        Self {
            id: new.id,
            name: new.name,
            manufacturer: creator.clone(),
            batch_number: new.batch_number,
            manufacture_date: new.manufacture_date,
            expiry_date: new.expiry_date,
            current_owner: creator.clone(),
            status: BatchStatus::Manufactured,
            temperature_readings: Vec::new(),
            location: String::new(),
            history: CustodyLedger::record_creation(creator, at),
        }
    }

    /// Apply an authorized transfer.
    ///
    /// On success overwrites owner, status, and location, appends the
    /// reading, and appends one custody record. Returns the new record.
    pub fn apply_transfer(
        &mut self,
        guard: &AuthorizationGuard,
        caller: &CallerRole,
        transfer: Transfer,
        at: Timestamp,
    ) -> Result<&CustodyRecord, TransferError> {
        guard.check_transition(caller, self.status, transfer.new_status)?;
        if !transfer.temperature.is_finite() {
            return Err(TransferError::NonFiniteReading(transfer.temperature));
        }

        // The custody append is the only step that can still fail, so it
        // runs first.
        self.history.record_transfer(
            transfer.new_owner.clone(),
            transfer.new_status,
            transfer.location.clone(),
            at,
        )?;
        self.current_owner = transfer.new_owner;
        self.status = transfer.new_status;
        self.location = transfer.location;
        self.temperature_readings.push(transfer.temperature);
        Ok(self.history.latest())
    }

    /// Quarantine the batch. Returns the status it held before.
    ///
    /// Does not touch custody history or readings.
    pub fn mark_flagged(&mut self) -> BatchStatus {
        std::mem::replace(&mut self.status, BatchStatus::Flagged)
    }

    /// Whether the batch is past its expiry date at `now`.
    pub fn is_expired_at(&self, now: &Timestamp) -> bool {
        self.status == BatchStatus::Expired || self.expiry_date <= *now
    }

    /// Current custodian.
    pub fn current_owner(&self) -> &PartyId {
        &self.current_owner
    }

    /// Current status.
    pub fn status(&self) -> BatchStatus {
        self.status
    }

    /// Last known location.
    pub fn location(&self) -> &str {
        &self.location
    }

    /// Handover readings, oldest first.
    pub fn temperature_readings(&self) -> &[f64] {
        &self.temperature_readings
    }

    /// The chain of custody.
    pub fn history(&self) -> &CustodyLedger {
        &self.history
    }
}

// ─── Tests ───────────────────────────────────────────────────────────
