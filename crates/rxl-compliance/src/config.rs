//! # Compliance Configuration
//!
//! Business constants for the cold chain, bundled so deployments can tune
//! them from YAML without code changes:
//!
//! ```yaml
//! min_celsius: 2.0
//! max_celsius: 8.0
//! status_override_severity: HIGH
//! ```
//!
//! Missing keys take the defaults below.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::flag::Severity;

/// Lowest compliant storage temperature, degrees Celsius (inclusive).
pub const COLD_CHAIN_MIN_CELSIUS: f64 = 2.0;

/// Highest compliant storage temperature, degrees Celsius (inclusive).
pub const COLD_CHAIN_MAX_CELSIUS: f64 = 8.0;

/// Minimum flag severity that overwrites a batch's status to `Flagged`.
pub const STATUS_OVERRIDE_SEVERITY: Severity = Severity::High;

/// Errors in compliance configuration or input.
#[derive(Error, Debug)]
pub enum ComplianceError {
    /// Configuration values are inconsistent.
    #[error("invalid compliance config: {0}")]
    InvalidConfig(String),

    /// Configuration text is not valid YAML for this schema.
    #[error("compliance config parse error: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// A severity string outside `LOW`, `MEDIUM`, `HIGH`.
    #[error("unknown flag severity {0:?}; expected LOW, MEDIUM, or HIGH")]
    UnknownSeverity(String),
}

/// Tunable compliance parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ComplianceConfig {
    /// Lower bound of the compliant range, inclusive.
    pub min_celsius: f64,
    /// Upper bound of the compliant range, inclusive.
    pub max_celsius: f64,
    /// Flags at or above this severity quarantine the batch.
    pub status_override_severity: Severity,
}

impl ComplianceConfig {
    /// Parse and validate a YAML document.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ComplianceError> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that the bounds are finite and ordered.
    pub fn validate(&self) -> Result<(), ComplianceError> {
        if !self.min_celsius.is_finite() || !self.max_celsius.is_finite() {
            return Err(ComplianceError::InvalidConfig(format!(
                "bounds must be finite, got [{}, {}]",
                self.min_celsius, self.max_celsius
            )));
        }
        if self.min_celsius > self.max_celsius {
            return Err(ComplianceError::InvalidConfig(format!(
                "min_celsius {} exceeds max_celsius {}",
                self.min_celsius, self.max_celsius
            )));
        }
        Ok(())
    }
}

impl Default for ComplianceConfig {
    fn default() -> Self {
        Self {
            min_celsius: COLD_CHAIN_MIN_CELSIUS,
            max_celsius: COLD_CHAIN_MAX_CELSIUS,
            status_override_severity: STATUS_OVERRIDE_SEVERITY,
        }
    }
}
