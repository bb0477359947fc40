//! # Error Types
//!
//! Errors raised while constructing core primitives. Higher layers wrap
//! these into their own taxonomies with the offending field name attached.

use thiserror::Error;

/// Error constructing a core value from untrusted input.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RxlError {
    /// Input is not a valid RFC 3339 timestamp.
    #[error("invalid RFC 3339 timestamp {value:?}: {reason}")]
    InvalidTimestamp {
        /// The rejected input.
        value: String,
        /// Parser diagnostic.
        reason: String,
    },

    /// Identifier violates its construction rules.
    #[error("invalid identifier {value:?}: {reason}")]
    InvalidIdentifier {
        /// The rejected input.
        value: String,
        /// Which rule was violated.
        reason: String,
    },
}
