//! # rxl-contract — Batch Custody and Compliance Service
//!
//! `PharmaContract` exposes the operation surface of the Rx ledger over any
//! [`BatchRepository`](rxl_ledger::BatchRepository):
//!
//! | Operation | Role |
//! |---|---|
//! | `create_batch` | Manufacturer |
//! | `transfer_batch` | per transfer table |
//! | `read_batch`, `batch_exists`, `list_all_batches` | any |
//! | `query_batches`, `search_batches`, `get_batch_history` | any |
//! | `flag_batch`, `get_batch_flags` | Regulator |
//! | `generate_compliance_report`, `get_temperature_violations` | Regulator |
//!
//! Errors are reported as [`ContractError`], whose `kind()` is a stable
//! machine-readable code.
//!
//! The crate logs through `tracing` and never installs a subscriber.

pub mod codec;
pub mod contract;
pub mod error;

pub use contract::{CreateBatchRequest, PharmaContract, TransferRequest};
pub use error::ContractError;
