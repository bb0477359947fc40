//! # Temporal Types — UTC Timestamps and the Ledger Clock
//!
//! `Timestamp` is the only time type stored on the ledger. It accepts any
//! RFC 3339 input (callers may send `+05:30` offsets), normalizes to UTC,
//! and truncates to microseconds so that a value survives a
//! serialize/deserialize cycle bit-for-bit.
//!
//! Wire form: `YYYY-MM-DDTHH:MM:SS.ffffffZ`.
//!
//! Microsecond precision is also what keeps flag ids (derived from the
//! flagging time) distinct under ordinary load; the contract layer still
//! disambiguates exact collisions.

use std::sync::Arc;

use chrono::{DateTime, SecondsFormat, Timelike, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::RxlError;

/// A UTC timestamp with microsecond precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Current wall-clock time. Prefer a [`Clock`] in business logic.
    pub fn now() -> Self {
        Self::from_utc(Utc::now())
    }

    /// Create a timestamp from a `chrono::DateTime<Utc>`, truncating to microseconds.
    pub fn from_utc(dt: DateTime<Utc>) -> Self {
        Self(truncate_to_micros(dt))
    }

    /// Parse an RFC 3339 string with any offset, converting to UTC.
    ///
    /// # Errors
    ///
    /// Returns [`RxlError::InvalidTimestamp`] if the string is not RFC 3339
    /// (date-only strings and bare times are rejected).
    pub fn parse(s: &str) -> Result<Self, RxlError> {
        let dt = DateTime::parse_from_rfc3339(s).map_err(|e| RxlError::InvalidTimestamp {
            value: s.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self::from_utc(dt.with_timezone(&Utc)))
    }

    /// Access the inner `DateTime<Utc>`.
    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Render as RFC 3339 with `Z` suffix and six fractional digits.
    pub fn to_rfc3339(&self) -> String {
        self.0.to_rfc3339_opts(SecondsFormat::Micros, true)
    }

    /// Whether `self` lies strictly inside `(start, end)`.
    pub fn is_strictly_between(&self, start: &Timestamp, end: &Timestamp) -> bool {
        self > start && self < end
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_rfc3339())
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_rfc3339())
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

fn truncate_to_micros(dt: DateTime<Utc>) -> DateTime<Utc> {
    let micros_only = dt.nanosecond() / 1_000 * 1_000;
    dt.with_nanosecond(micros_only).unwrap_or(dt)
}

// ─── Clock ───────────────────────────────────────────────────────────

/// Source of "now" for custody records and flags.
pub trait Clock: Send + Sync {
    /// The current instant.
    fn now(&self) -> Timestamp;
}

/// Wall-clock time from the operating system.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::now()
    }
}

impl<C: Clock + ?Sized> Clock for Arc<C> {
    fn now(&self) -> Timestamp {
        (**self).now()
    }
}
