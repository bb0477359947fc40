//! # Authorization Guard
//!
//! Decides whether a caller's organizational role may move a batch from its
//! current status to a requested status.
//!
//! ## Transfer Table
//!
//! | Role         | From           | To          |
//! |--------------|----------------|-------------|
//! | Manufacturer | `Manufactured` | `InTransit` |
//! | Distributor  | `InTransit`    | `Delivered` |
//! | Distributor  | `Delivered`    | `InTransit` |
//! | Pharmacy     | `Delivered`    | `Sold`      |
//!
//! Regulators and unrecognized roles have no rows and are always denied.
//! No row has `Flagged`, `Sold`, or `Expired` as its source, which is what
//! makes those statuses terminal for transfers.
//!
//! Operation-level gates (who may create, flag, or report) are separate
//! from the table and go through [`require_role`].

use rxl_core::{CallerRole, OrgRole};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::batch::BatchStatus;

/// One permitted `(role, from, to)` move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransitionRule {
    /// Role allowed to perform the move.
    pub role: OrgRole,
    /// Required current status.
    pub from: BatchStatus,
    /// Requested status.
    pub to: BatchStatus,
}

const fn rule(role: OrgRole, from: BatchStatus, to: BatchStatus) -> TransitionRule {
    TransitionRule { role, from, to }
}

/// The standard custody transfer table.
pub const TRANSFER_RULES: &[TransitionRule] = &[
    rule(OrgRole::Manufacturer, BatchStatus::Manufactured, BatchStatus::InTransit),
    rule(OrgRole::Distributor, BatchStatus::InTransit, BatchStatus::Delivered),
    rule(OrgRole::Distributor, BatchStatus::Delivered, BatchStatus::InTransit),
    rule(OrgRole::Pharmacy, BatchStatus::Delivered, BatchStatus::Sold),
];

/// Authorization failures. Every variant names the role and what it tried.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthorizationError {
    /// No rule lets this role make this status move.
    #[error("role {role} may not move a batch from {from} to {to}")]
    TransitionDenied {
        /// Caller role as reported by membership.
        role: String,
        /// Current batch status.
        from: BatchStatus,
        /// Requested status.
        to: BatchStatus,
    },

    /// The operation is reserved for another role.
    #[error("role {role} may not {operation}; requires {required}")]
    OperationDenied {
        /// Caller role as reported by membership.
        role: String,
        /// The gated operation.
        operation: &'static str,
        /// The role the operation requires.
        required: OrgRole,
    },
}

/// Data-driven transfer authorization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizationGuard {
    rules: Vec<TransitionRule>,
}

impl AuthorizationGuard {
    /// A guard over the standard [`TRANSFER_RULES`].
    pub fn standard() -> Self {
        Self::with_rules(TRANSFER_RULES.to_vec())
    }

    /// A guard over a custom rule set.
    pub fn with_rules(rules: Vec<TransitionRule>) -> Self {
        Self { rules }
    }

    /// The rules this guard enforces.
    pub fn rules(&self) -> &[TransitionRule] {
        &self.rules
    }

    /// Allow or deny a transfer from `from` to `to` by `caller`.
    pub fn check_transition(
        &self,
        caller: &CallerRole,
        from: BatchStatus,
        to: BatchStatus,
    ) -> Result<(), AuthorizationError> {
        let allowed = caller.org().is_some_and(|role| {
            self.rules
                .iter()
                .any(|r| r.role == role && r.from == from && r.to == to)
        });
        if allowed {
            Ok(())
        } else {
            Err(AuthorizationError::TransitionDenied {
                role: caller.to_string(),
                from,
                to,
            })
        }
    }

    /// Statuses `role` may request for a batch currently in `from`.
    pub fn permitted_targets(&self, role: OrgRole, from: BatchStatus) -> Vec<BatchStatus> {
        self.rules
            .iter()
            .filter(|r| r.role == role && r.from == from)
            .map(|r| r.to)
            .collect()
    }
}

impl Default for AuthorizationGuard {
    fn default() -> Self {
        Self::standard()
    }
}

/// Check that the caller holds exactly `required` for `operation`.
pub fn require_role(
    caller: &CallerRole,
    required: OrgRole,
    operation: &'static str,
) -> Result<(), AuthorizationError> {
    if caller.is(required) {
        Ok(())
    } else {
        Err(AuthorizationError::OperationDenied {
            role: caller.to_string(),
            operation,
            required,
        })
    }
}
