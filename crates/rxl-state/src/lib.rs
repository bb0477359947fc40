//! # rxl-state — Batch Lifecycle State Machine
//!
//! ## Modules
//!
//! - **Batch** (`batch.rs`): the batch record and its status machine.
//!
//!   ```text
//!   Manufactured ──▶ InTransit ◀──▶ Delivered ──▶ Sold (terminal)
//!
//!   any status ──(HIGH flag)──▶ Flagged (terminal)
//!   Expired (terminal, never entered by a transfer)
//!   ```
//!
//! - **Authorization** (`authorization.rs`): the `(role, from, to)` rule
//!   table gating every transfer, plus the operation-level role checks for
//!   creation, flagging, and reporting.
//!
//! - **Custody** (`custody.rs`): the append-only chain of custody records
//!   owned by each batch, and the per-version audit projection.
//!
//! ## Design
//!
//! Statuses are loaded from the ledger at runtime, so the machine is an enum
//! with validated transitions rather than a typestate. The legal moves live
//! in a single static table; adding a role or a route means adding a row,
//! not touching control flow.

pub mod authorization;
pub mod batch;
pub mod custody;

pub use authorization::{
    require_role, AuthorizationError, AuthorizationGuard, TransitionRule, TRANSFER_RULES,
};
pub use batch::{Batch, BatchStatus, NewBatch, Transfer, TransferError};
pub use custody::{latest_record_per_version, CustodyError, CustodyLedger, CustodyRecord};
