//! # rxl-core — Foundational Types for the Rx Ledger
//!
//! The leaf crate of the workspace. Every other `rxl-*` crate depends on it;
//! it depends on nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **Newtype wrappers for identifiers.** `BatchId` and `PartyId` are
//!    distinct types. A batch key can never be passed where an owner identity
//!    is expected, and `BatchId` validates its reserved-prefix rule at
//!    construction.
//!
//! 2. **One role vocabulary.** `OrgRole` enumerates the four membership
//!    categories. Anything the membership service reports outside that set
//!    becomes `CallerRole::Unrecognized` and is denied by every gate.
//!
//! 3. **UTC-only timestamps.** `Timestamp` normalizes any RFC 3339 input to
//!    UTC with microsecond precision, so stored records render identically no
//!    matter which offset the caller supplied.
//!
//! 4. **Injectable time.** All "now" reads go through the `Clock` trait so the
//!    custody chain can be tested deterministically.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `rxl-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod error;
pub mod identity;
pub mod role;
pub mod temporal;

pub use error::RxlError;
pub use identity::{BatchId, PartyId, FLAG_KEY_PREFIX};
pub use role::{CallerRole, OrgRole};
pub use temporal::{Clock, SystemClock, Timestamp};
