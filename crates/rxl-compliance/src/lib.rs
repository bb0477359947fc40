//! # rxl-compliance — Cold-Chain Compliance Engine
//!
//! Derives compliance from the temperature readings a batch accumulates at
//! each custody handover.
//!
//! - **Config** (`config.rs`): the cold-chain bounds and the severity at
//!   which a flag quarantines a batch. Named constants, YAML-loadable.
//!
//! - **Engine** (`engine.rs`): reading and batch classification, the
//!   flag quarantine decision, and the manufacture-window violation query.
//!
//! - **Flag** (`flag.rs`): regulator flags and their ledger keys.
//!
//! - **Report** (`report.rs`): the on-demand organization compliance report.
//!
//! ## Rule
//!
//! A reading `r` is compliant iff `min <= r <= max` (defaults 2.0 and 8.0
//! degrees Celsius, inclusive). A batch is compliant iff every reading is;
//! a batch with no readings is compliant.
//!
//! Nothing here touches storage. Callers load batches, hand them over, and
//! persist whatever comes back.

pub mod config;
pub mod engine;
pub mod flag;
pub mod report;

pub use config::{
    ComplianceConfig, ComplianceError, COLD_CHAIN_MAX_CELSIUS, COLD_CHAIN_MIN_CELSIUS,
    STATUS_OVERRIDE_SEVERITY,
};
pub use engine::{BatchAssessment, ComplianceEngine, ReadingClass};
pub use flag::{Flag, Severity, MAX_FLAG_KEY_SUFFIX};
pub use report::{ComplianceReport, ReportPeriod, ViolationKind, ViolationSummary};
