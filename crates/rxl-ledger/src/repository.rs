//! # Ledger Store Contract
//!
//! The consumed interface to the durable key-value substrate. The core
//! treats every call as synchronous and atomic.
//!
//! ## Versioning
//!
//! Every point read returns the record's version. Every write carries a
//! [`Precondition`]. A store applies a write set only if every
//! precondition holds, and otherwise rejects the whole set with
//! [`StoreError::VersionConflict`]. Two invocations that read the same
//! version of a batch therefore cannot both commit an update to it.

use std::sync::Arc;

use rxl_core::Timestamp;
use thiserror::Error;

use crate::selector::Selector;

/// Monotonic per-key version number assigned by the store.
pub type Version = u64;

/// Errors raised by a ledger store. Passed through to callers unchanged.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// A write precondition did not hold; nothing in the write set was applied.
    #[error("version conflict on key {key:?}: expected {expected}, found {found}")]
    VersionConflict {
        /// Key whose precondition failed.
        key: String,
        /// The precondition as written.
        expected: Precondition,
        /// The current version, or `None` if the key is absent.
        found: VersionState,
    },

    /// The write set is malformed (for example, the same key twice).
    #[error("invalid write set: {0}")]
    InvalidWriteSet(String),

    /// The backing store failed.
    #[error("ledger backend error: {0}")]
    Backend(String),
}

/// Current state of a key as seen by a failed precondition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionState {
    /// No live value under the key.
    Absent,
    /// A live value at this version.
    At(Version),
}

impl std::fmt::Display for VersionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Absent => f.write_str("absent"),
            Self::At(v) => write!(f, "version {v}"),
        }
    }
}

/// A stored value with its version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionedValue {
    /// Serialized record.
    pub bytes: Vec<u8>,
    /// Version the store assigned on the write that produced `bytes`.
    pub version: Version,
}

/// Condition a key must satisfy for a write to apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Precondition {
    /// The key must have no live value.
    Absent,
    /// The key must hold a live value at exactly this version.
    AtVersion(Version),
    /// No condition.
    Unconditional,
}

impl std::fmt::Display for Precondition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Absent => f.write_str("absent"),
            Self::AtVersion(v) => write!(f, "version {v}"),
            Self::Unconditional => f.write_str("any"),
        }
    }
}

/// One conditional write in a write set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Write {
    /// Target key.
    pub key: String,
    /// New serialized value.
    pub bytes: Vec<u8>,
    /// Condition on the key's current state.
    pub precondition: Precondition,
}

impl Write {
    /// Write a new key that must not exist yet.
    pub fn create(key: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            key: key.into(),
            bytes,
            precondition: Precondition::Absent,
        }
    }

    /// Overwrite a key read at `version`.
    pub fn update(key: impl Into<String>, bytes: Vec<u8>, version: Version) -> Self {
        Self {
            key: key.into(),
            bytes,
            precondition: Precondition::AtVersion(version),
        }
    }

    /// Write without a precondition.
    pub fn unconditional(key: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            key: key.into(),
            bytes,
            precondition: Precondition::Unconditional,
        }
    }
}

/// One entry of a key's modification history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    /// The value written. Empty when `is_deleted`.
    pub bytes: Vec<u8>,
    /// Whether this modification deleted the key.
    pub is_deleted: bool,
    /// When the modification was committed.
    pub timestamp: Timestamp,
}

/// The ledger state store.
///
/// `scan_all` and `query` return `(key, bytes)` pairs in ascending key
/// order. `history_of` returns modifications oldest first.
pub trait BatchRepository: Send + Sync {
    /// Point lookup of the live value under `key`.
    fn get(&self, key: &str) -> Result<Option<VersionedValue>, StoreError>;

    /// Apply a write set atomically: all writes or none.
    fn commit(&self, writes: &[Write]) -> Result<(), StoreError>;

    /// Every live key-value pair.
    fn scan_all(&self) -> Result<Vec<(String, Vec<u8>)>, StoreError>;

    /// Live pairs whose JSON value matches `selector`.
    fn query(&self, selector: &Selector) -> Result<Vec<(String, Vec<u8>)>, StoreError>;

    /// Modification history of `key`, including deletions.
    fn history_of(&self, key: &str) -> Result<Vec<HistoryEntry>, StoreError>;

    /// Single unconditional write.
    fn put(&self, key: &str, bytes: Vec<u8>) -> Result<(), StoreError> {
        self.commit(&[Write::unconditional(key, bytes)])
    }
}

impl<R: BatchRepository + ?Sized> BatchRepository for Arc<R> {
    fn get(&self, key: &str) -> Result<Option<VersionedValue>, StoreError> {
        (**self).get(key)
    }

    fn commit(&self, writes: &[Write]) -> Result<(), StoreError> {
        (**self).commit(writes)
    }

    fn scan_all(&self) -> Result<Vec<(String, Vec<u8>)>, StoreError> {
        (**self).scan_all()
    }

    fn query(&self, selector: &Selector) -> Result<Vec<(String, Vec<u8>)>, StoreError> {
        (**self).query(selector)
    }

    fn history_of(&self, key: &str) -> Result<Vec<HistoryEntry>, StoreError> {
        (**self).history_of(key)
    }

    fn put(&self, key: &str, bytes: Vec<u8>) -> Result<(), StoreError> {
        (**self).put(key, bytes)
    }
}
