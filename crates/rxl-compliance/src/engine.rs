//! # Compliance Engine
//!
//! Pure evaluation over batches already loaded from the ledger.

use rxl_core::Timestamp;
use rxl_state::Batch;
use serde::{Deserialize, Serialize};

use crate::config::ComplianceConfig;
use crate::flag::Severity;
use crate::report::{ComplianceReport, ReportPeriod};

/// Classification of a single reading against the cold-chain range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReadingClass {
    /// Within bounds, inclusive.
    Compliant,
    /// Colder than the minimum.
    BelowRange,
    /// Warmer than the maximum.
    AboveRange,
}

/// Per-batch tally of reading classes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchAssessment {
    /// Readings within bounds.
    pub compliant: usize,
    /// Readings below the minimum.
    pub below_range: usize,
    /// Readings above the maximum.
    pub above_range: usize,
}

impl BatchAssessment {
    /// Compliant iff no reading is out of range (vacuously true when empty).
    pub fn is_compliant(&self) -> bool {
        self.below_range == 0 && self.above_range == 0
    }
}

/// Stateless evaluator parameterized by [`ComplianceConfig`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ComplianceEngine {
    config: ComplianceConfig,
}

impl ComplianceEngine {
    /// An engine over a validated configuration.
    pub fn new(config: ComplianceConfig) -> Self {
        Self { config }
    }

    /// The active configuration.
    pub fn config(&self) -> &ComplianceConfig {
        &self.config
    }

    /// Classify one reading.
    pub fn classify(&self, reading: f64) -> ReadingClass {
        if reading < self.config.min_celsius {
            ReadingClass::BelowRange
        } else if reading > self.config.max_celsius {
            ReadingClass::AboveRange
        } else {
            ReadingClass::Compliant
        }
    }

    /// Whether one reading is within the cold-chain range.
    pub fn is_reading_compliant(&self, reading: f64) -> bool {
        self.classify(reading) == ReadingClass::Compliant
    }

    /// Tally a batch's readings.
    pub fn assess(&self, batch: &Batch) -> BatchAssessment {
        batch
            .temperature_readings()
            .iter()
            .fold(BatchAssessment::default(), |mut acc, r| {
                match self.classify(*r) {
                    ReadingClass::Compliant => acc.compliant += 1,
                    ReadingClass::BelowRange => acc.below_range += 1,
                    ReadingClass::AboveRange => acc.above_range += 1,
                }
                acc
            })
    }

    /// Whether every reading of the batch is within range.
    pub fn is_batch_compliant(&self, batch: &Batch) -> bool {
        batch
            .temperature_readings()
            .iter()
            .all(|r| self.is_reading_compliant(*r))
    }

    /// Whether a flag of this severity overwrites the batch status.
    pub fn flag_quarantines(&self, severity: Severity) -> bool {
        severity >= self.config.status_override_severity
    }

    /// Batches manufactured strictly inside `(start, end)` with at least one
    /// out-of-range reading, in input order.
    pub fn temperature_violations(
        &self,
        batches: Vec<Batch>,
        start: &Timestamp,
        end: &Timestamp,
    ) -> Vec<Batch> {
        batches
            .into_iter()
            .filter(|b| b.manufacture_date.is_strictly_between(start, end))
            .filter(|b| !self.is_batch_compliant(b))
            .collect()
    }

    /// Build the compliance report for an organization's current holdings.
    ///
    /// `batches` must already be filtered to the organization. The period is
    /// recorded as given and does not filter the selection.
    pub fn build_report(
        &self,
        organization_id: &str,
        period: ReportPeriod,
        batches: &[Batch],
        now: &Timestamp,
    ) -> ComplianceReport {
        let assessments: Vec<(BatchAssessment, &Batch)> =
            batches.iter().map(|b| (self.assess(b), b)).collect();
        let report = ComplianceReport::from_assessments(
            organization_id,
            period,
            &assessments,
            &self.config,
            now,
        );
        tracing::debug!(
            organization_id,
            total = report.total_batches,
            violations = report.violation_batches,
            "compliance report built"
        );
        report
    }
}
