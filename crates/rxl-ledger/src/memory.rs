//! # In-Memory Ledger
//!
//! Reference [`BatchRepository`] backed by a `BTreeMap` behind one
//! `parking_lot::RwLock`. It keeps every version of every key so the
//! per-key history contract can be exercised without a real ledger.
//!
//! A write set is validated and applied under a single write guard, so
//! concurrent commits serialize and version preconditions are exact.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use parking_lot::RwLock;
use rxl_core::{Clock, SystemClock};

use crate::repository::{
    BatchRepository, HistoryEntry, Precondition, StoreError, Version, VersionState,
    VersionedValue, Write,
};
use crate::selector::Selector;

#[derive(Debug, Default)]
struct Slot {
    version: Version,
    live: Option<Vec<u8>>,
    history: Vec<HistoryEntry>,
}

impl Slot {
    fn state(&self) -> VersionState {
        match self.live {
            Some(_) => VersionState::At(self.version),
            None => VersionState::Absent,
        }
    }
}

/// Thread-safe, cloneable in-memory ledger. Clones share storage.
pub struct InMemoryLedger {
    slots: Arc<RwLock<BTreeMap<String, Slot>>>,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for InMemoryLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryLedger")
            .field("keys", &self.slots.read().len())
            .finish_non_exhaustive()
    }
}

impl Clone for InMemoryLedger {
    fn clone(&self) -> Self {
        Self {
            slots: Arc::clone(&self.slots),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl InMemoryLedger {
    /// An empty ledger stamping history with wall-clock time.
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }

    /// An empty ledger stamping history from `clock`.
    pub fn with_clock(clock: impl Clock + 'static) -> Self {
        Self {
            slots: Arc::new(RwLock::new(BTreeMap::new())),
            clock: Arc::new(clock),
        }
    }

    /// Delete a key, recording a tombstone in its history.
    ///
    /// Returns whether a live value was removed.
    pub fn delete(&self, key: &str) -> bool {
        let timestamp = self.clock.now();
        let mut slots = self.slots.write();
        let Some(slot) = slots.get_mut(key).filter(|s| s.live.is_some()) else {
            return false;
        };
        slot.version += 1;
        slot.live = None;
        slot.history.push(HistoryEntry {
            bytes: Vec::new(),
            is_deleted: true,
            timestamp,
        });
        tracing::debug!(key, version = slot.version, "ledger key deleted");
        true
    }

    /// Number of live keys.
    pub fn len(&self) -> usize {
        self.slots.read().values().filter(|s| s.live.is_some()).count()
    }

    /// Whether no key holds a live value.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn check(slots: &BTreeMap<String, Slot>, write: &Write) -> Result<(), StoreError> {
        let found = slots
            .get(&write.key)
            .map_or(VersionState::Absent, Slot::state);
        let holds = match write.precondition {
            Precondition::Unconditional => true,
            Precondition::Absent => found == VersionState::Absent,
            Precondition::AtVersion(v) => found == VersionState::At(v),
        };
        if holds {
            Ok(())
        } else {
            Err(StoreError::VersionConflict {
                key: write.key.clone(),
                expected: write.precondition,
                found,
            })
        }
    }
}

impl Default for InMemoryLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl BatchRepository for InMemoryLedger {
    fn get(&self, key: &str) -> Result<Option<VersionedValue>, StoreError> {
        Ok(self.slots.read().get(key).and_then(|slot| {
            slot.live.as_ref().map(|bytes| VersionedValue {
                bytes: bytes.clone(),
                version: slot.version,
            })
        }))
    }

    fn commit(&self, writes: &[Write]) -> Result<(), StoreError> {
        let mut seen = HashSet::with_capacity(writes.len());
        if let Some(dup) = writes.iter().find(|w| !seen.insert(w.key.as_str())) {
            return Err(StoreError::InvalidWriteSet(format!(
                "key {:?} written twice",
                dup.key
            )));
        }

        let timestamp = self.clock.now();
        let mut slots = self.slots.write();
        for write in writes {
            Self::check(&slots, write)?;
        }
        for write in writes {
            let slot = slots.entry(write.key.clone()).or_default();
            slot.version += 1;
            slot.live = Some(write.bytes.clone());
            slot.history.push(HistoryEntry {
                bytes: write.bytes.clone(),
                is_deleted: false,
                timestamp,
            });
        }
        tracing::debug!(writes = writes.len(), "ledger write set committed");
        Ok(())
    }

    fn scan_all(&self) -> Result<Vec<(String, Vec<u8>)>, StoreError> {
        Ok(self
            .slots
            .read()
            .iter()
            .filter_map(|(key, slot)| slot.live.as_ref().map(|b| (key.clone(), b.clone())))
            .collect())
    }

    fn query(&self, selector: &Selector) -> Result<Vec<(String, Vec<u8>)>, StoreError> {
        // Values that are not JSON documents never match a selector.
        Ok(self
            .scan_all()?
            .into_iter()
            .filter(|(_, bytes)| {
                serde_json::from_slice::<serde_json::Value>(bytes)
                    .is_ok_and(|doc| selector.matches(&doc))
            })
            .collect())
    }

    fn history_of(&self, key: &str) -> Result<Vec<HistoryEntry>, StoreError> {
        Ok(self
            .slots
            .read()
            .get(key)
            .map(|slot| slot.history.clone())
            .unwrap_or_default())
    }
}
