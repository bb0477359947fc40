//! # rxl-ledger — Store and Membership Contracts
//!
//! What the core consumes from its host, plus reference implementations.
//!
//! - **Repository** (`repository.rs`): the `BatchRepository` trait. Point
//!   reads are versioned; writes are conditional and committed as atomic
//!   write sets.
//!
//! - **Selector** (`selector.rs`): the JSON predicate language used by
//!   `BatchRepository::query`.
//!
//! - **Criteria** (`criteria.rs`): structured batch search compiled to a
//!   selector.
//!
//! - **Memory** (`memory.rs`): `InMemoryLedger`, a versioned, history-keeping
//!   reference store.
//!
//! - **Identity** (`identity.rs`): the `IdentityProvider` trait and
//!   `StaticIdentity`.
//!
//! The core never retries a failed commit. A `StoreError::VersionConflict`
//! means another invocation won the race and is reported as is.

pub mod criteria;
pub mod identity;
pub mod memory;
pub mod repository;
pub mod selector;

pub use criteria::{DateRange, SearchCriteria};
pub use identity::{IdentityError, IdentityProvider, StaticIdentity};
pub use memory::InMemoryLedger;
pub use repository::{
    BatchRepository, HistoryEntry, Precondition, StoreError, Version, VersionState,
    VersionedValue, Write,
};
pub use selector::{Condition, Selector, SelectorError};
