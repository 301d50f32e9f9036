// crates/shareguard-core/src/core/time.rs
// ============================================================================
// Module: ShareGuard Time Model
// Description: Canonical timestamp representation for records and audit entries.
// Purpose: Provide explicit, comparable time values across ShareGuard records.
// Dependencies: serde, time
// ============================================================================

//! ## Overview
//! ShareGuard stores all times as unix-epoch milliseconds. The core never
//! reads wall-clock time directly; the lifecycle engine obtains the current
//! instant from a [`Clock`](crate::interfaces::Clock) collaborator so tests
//! can replay scenarios deterministically. RFC 3339 text is the wire form
//! for expiry inputs; offset-less inputs are interpreted as UTC.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use time::OffsetDateTime;
use time::PrimitiveDateTime;
use time::format_description::well_known::Rfc3339;

// ============================================================================
// SECTION: Timestamp
// ============================================================================

/// Canonical instant used in ShareGuard records and audit entries.
///
/// # Invariants
/// - Unix epoch milliseconds, UTC.
/// - Ordering follows chronological order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct Timestamp(i64);

/// Format description for offset-less `YYYY-MM-DDTHH:MM:SS` datetimes.
const NAIVE_FORMAT: &[time::format_description::BorrowedFormatItem<'static>] =
    time::macros::format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]");

impl Timestamp {
    /// Creates a timestamp from unix epoch milliseconds.
    #[must_use]
    pub const fn from_unix_millis(millis: i64) -> Self {
        Self(millis)
    }

    /// Returns the timestamp as unix epoch milliseconds.
    #[must_use]
    pub const fn as_unix_millis(self) -> i64 {
        self.0
    }

    /// Returns the instant `minutes` minutes later, saturating on overflow.
    #[must_use]
    pub fn plus_minutes(self, minutes: u64) -> Self {
        let offset = i64::try_from(minutes).unwrap_or(i64::MAX).saturating_mul(60_000);
        Self(self.0.saturating_add(offset))
    }

    /// Parses an RFC 3339 datetime; offset-less inputs are treated as UTC.
    ///
    /// Offset-less inputs must be whole-second `YYYY-MM-DDTHH:MM:SS` values;
    /// fractional seconds are accepted only with an explicit offset.
    ///
    /// # Errors
    /// Returns [`TimestampParseError`] when the input is neither an RFC 3339
    /// datetime nor an offset-less `YYYY-MM-DDTHH:MM:SS` value.
    pub fn parse_rfc3339(input: &str) -> Result<Self, TimestampParseError> {
        let trimmed = input.trim();
        if let Ok(parsed) = OffsetDateTime::parse(trimmed, &Rfc3339) {
            return Ok(Self::from_datetime(parsed));
        }
        PrimitiveDateTime::parse(trimmed, NAIVE_FORMAT)
            .map(|naive| Self::from_datetime(naive.assume_utc()))
            .map_err(|_| TimestampParseError {
                input: trimmed.to_string(),
            })
    }

    /// Formats the timestamp as an RFC 3339 string with millisecond precision.
    #[must_use]
    pub fn to_rfc3339(self) -> String {
        Self::datetime(self.0).format(&Rfc3339).unwrap_or_else(|_| self.0.to_string())
    }

    /// Converts a parsed datetime into epoch milliseconds.
    fn from_datetime(datetime: OffsetDateTime) -> Self {
        let nanos = datetime.unix_timestamp_nanos();
        let millis = nanos / 1_000_000;
        Self(i64::try_from(millis).unwrap_or(i64::MAX))
    }

    /// Converts epoch milliseconds into a datetime, clamping out-of-range values.
    fn datetime(millis: i64) -> OffsetDateTime {
        OffsetDateTime::from_unix_timestamp_nanos(i128::from(millis) * 1_000_000)
            .unwrap_or(OffsetDateTime::UNIX_EPOCH)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_rfc3339())
    }
}

/// Error returned when a datetime string cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid datetime: {input}")]
pub struct TimestampParseError {
    /// The rejected input, trimmed.
    input: String,
}
