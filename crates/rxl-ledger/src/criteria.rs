//! Structured batch search, compiled to a [`Selector`].

use rxl_core::Timestamp;
use rxl_state::BatchStatus;
use serde::{Deserialize, Serialize};

use crate::selector::{Condition, Selector};

/// Inclusive manufacture-date window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    /// Earliest manufacture date, inclusive.
    pub start: Timestamp,
    /// Latest manufacture date, inclusive.
    pub end: Timestamp,
}

/// Regulator console search. Unset fields do not constrain the result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchCriteria {
    /// Creating manufacturer identity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manufacturer: Option<String>,
    /// Current status.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<BatchStatus>,
    /// Manufacture date window.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manufactured_between: Option<DateRange>,
    /// Manufacturer's batch number.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batch_number: Option<String>,
}

impl SearchCriteria {
    /// Compile to a selector over the stored batch document.
    ///
    /// Stored timestamps share one fixed-width UTC rendering, so the date
    /// window is a plain string range.
    pub fn to_selector(&self) -> Selector {
        let mut clauses = Vec::new();
        if let Some(manufacturer) = &self.manufacturer {
            clauses.push(Selector::field_eq("manufacturer", manufacturer.as_str()));
        }
        if let Some(status) = self.status {
            clauses.push(Selector::field_eq("status", status.name()));
        }
        if let Some(range) = &self.manufactured_between {
            clauses.push(Selector::field(
                "manufactureDate",
                Condition::Gte(range.start.to_rfc3339().into()),
            ));
            clauses.push(Selector::field(
                "manufactureDate",
                Condition::Lte(range.end.to_rfc3339().into()),
            ));
        }
        if let Some(batch_number) = &self.batch_number {
            clauses.push(Selector::field_eq("batchNumber", batch_number.as_str()));
        }
        Selector::And(clauses)
    }
}
