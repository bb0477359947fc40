//! # Contract Error Types
//!
//! One taxonomy for every operation. Domain errors from the lower crates
//! convert into it with their context intact; store errors pass through
//! unmodified. Nothing is retried.

use rxl_compliance::ComplianceError;
use rxl_core::RxlError;
use rxl_ledger::{IdentityError, SelectorError, StoreError};
use rxl_state::{AuthorizationError, TransferError};
use thiserror::Error;

/// Failure of a contract operation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ContractError {
    /// The caller's role may not perform the operation or transition.
    #[error("unauthorized: {0}")]
    Authorization(#[from] AuthorizationError),

    /// No batch under the requested id.
    #[error("not found: {0}")]
    NotFound(String),

    /// The operation collides with existing ledger state.
    #[error("conflict: {0}")]
    Conflict(String),

    /// An input failed validation. Names the offending field.
    #[error("validation error: {0}")]
    Validation(String),

    /// The ledger store failed or rejected the write set.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The caller's identity could not be resolved.
    #[error("identity error: {0}")]
    Identity(#[from] IdentityError),

    /// A stored record could not be encoded or decoded.
    #[error("corrupt ledger record {key:?}: {reason}")]
    Serialization {
        /// Ledger key of the record.
        key: String,
        /// Codec diagnostic.
        reason: String,
    },
}

impl ContractError {
    /// Stable machine-readable error code.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Authorization(_) => "AUTHORIZATION",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Conflict(_) => "CONFLICT",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Store(_) => "STORE_ERROR",
            Self::Identity(_) => "IDENTITY_ERROR",
            Self::Serialization { .. } => "SERIALIZATION_ERROR",
        }
    }

    /// Construct a validation error for one input field.
    pub fn invalid(field: &str, reason: impl std::fmt::Display) -> Self {
        Self::Validation(format!("{field}: {reason}"))
    }

    /// Construct a not-found error for a batch id.
    pub fn batch_not_found(id: &str) -> Self {
        Self::NotFound(format!("batch {id} does not exist"))
    }
}

impl From<TransferError> for ContractError {
    fn from(err: TransferError) -> Self {
        match err {
            TransferError::Unauthorized(e) => Self::Authorization(e),
            other @ TransferError::NonFiniteReading(_) => Self::invalid("temperature", other),
            other @ TransferError::Custody(_) => Self::invalid("timestamp", other),
        }
    }
}

impl From<SelectorError> for ContractError {
    fn from(err: SelectorError) -> Self {
        Self::invalid("predicate", err)
    }
}

impl From<ComplianceError> for ContractError {
    fn from(err: ComplianceError) -> Self {
        Self::Validation(err.to_string())
    }
}

impl From<RxlError> for ContractError {
    fn from(err: RxlError) -> Self {
        Self::Validation(err.to_string())
    }
}
