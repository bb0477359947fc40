//! # Compliance Report
//!
//! An on-demand, never-persisted view over the batches an organization
//! currently holds.

use rxl_core::Timestamp;
use rxl_state::{Batch, BatchStatus};
use serde::{Deserialize, Serialize};

use crate::config::ComplianceConfig;
use crate::engine::BatchAssessment;

/// The reporting window as supplied by the regulator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportPeriod {
    /// Window start.
    pub start: Timestamp,
    /// Window end.
    pub end: Timestamp,
}

/// Category of a violation summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ViolationKind {
    /// At least one reading under the minimum.
    TemperatureBelowRange,
    /// At least one reading over the maximum.
    TemperatureAboveRange,
    /// Held past the expiry date and not sold.
    ExpiredStock,
}

/// Count of batches exhibiting one kind of violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViolationSummary {
    /// Violation category.
    #[serde(rename = "type")]
    pub kind: ViolationKind,
    /// Number of affected batches.
    pub count: usize,
    /// Human-readable description.
    pub description: String,
}

/// Aggregate compliance of one organization's current holdings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplianceReport {
    /// Organization whose holdings were assessed.
    pub organization_id: String,
    /// Batches currently owned by the organization.
    pub total_batches: usize,
    /// Batches with every reading in range.
    pub compliant_batches: usize,
    /// Batches with at least one reading out of range.
    #[serde(alias = "violationsBatches")]
    pub violation_batches: usize,
    /// Window supplied with the request.
    pub report_period: ReportPeriod,
    /// Non-empty violation categories.
    pub violations: Vec<ViolationSummary>,
}

impl ComplianceReport {
    /// Aggregate pre-computed assessments.
    ///
    /// Only the temperature rule decides compliant vs violating; expired
    /// stock is reported as a summary alongside.
    pub fn from_assessments(
        organization_id: &str,
        period: ReportPeriod,
        assessed: &[(BatchAssessment, &Batch)],
        config: &ComplianceConfig,
        now: &Timestamp,
    ) -> Self {
        let compliant_batches = assessed.iter().filter(|(a, _)| a.is_compliant()).count();
        let below = assessed.iter().filter(|(a, _)| a.below_range > 0).count();
        let above = assessed.iter().filter(|(a, _)| a.above_range > 0).count();
        let expired = assessed
            .iter()
            .filter(|(_, b)| b.status() != BatchStatus::Sold && b.is_expired_at(now))
            .count();

        let candidates = [
            (
                ViolationKind::TemperatureBelowRange,
                below,
                format!("batches with a reading below {} C", config.min_celsius),
            ),
            (
                ViolationKind::TemperatureAboveRange,
                above,
                format!("batches with a reading above {} C", config.max_celsius),
            ),
            (
                ViolationKind::ExpiredStock,
                expired,
                format!("unsold batches past expiry as of {now}"),
            ),
        ];
        let violations = candidates
            .into_iter()
            .filter(|(_, count, _)| *count > 0)
            .map(|(kind, count, description)| ViolationSummary {
                kind,
                count,
                description,
            })
            .collect();

        Self {
            organization_id: organization_id.to_string(),
            total_batches: assessed.len(),
            compliant_batches,
            violation_batches: assessed.len() - compliant_batches,
            report_period: period,
            violations,
        }
    }

    /// Look up the summary for one violation kind.
    pub fn violation(&self, kind: ViolationKind) -> Option<&ViolationSummary> {
        self.violations.iter().find(|v| v.kind == kind)
    }
}
