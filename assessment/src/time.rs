//! # Time Normalization
//!
//! Converts between what a user typed into a local datetime control ([`LocalWallClock`]) and an
//! absolute [`Instant`], and measures how far an instant lies from "now".
//!
//! ## Offset convention
//!
//! `tz_offset_minutes` is signed and **positive west of UTC**, the value a browser reports from
//! `getTimezoneOffset()`: UTC-5 is `300`, UTC+2 is `-120`. Conversion is a plain signed shift:
//!
//! ```text
//! instant = wall_clock_as_if_utc + tz_offset_minutes
//! wall    = instant             - tz_offset_minutes
//! ```
//!
//! The sign is never discarded; an absolute value would invert every zone east of UTC.
//!
//! "Now" is always an argument. Nothing in this module reads the system clock except
//! [`local_offset_minutes`], which callers use once at startup.

use chrono::{DateTime, NaiveDateTime, TimeDelta, Utc};

use crate::error::{AssessmentError, Result};
use crate::models::{Assignment, Instant, LocalWallClock};

/// Converts a local wall-clock reading into an absolute instant.
///
/// # Arguments
///
/// * `wall` - The timezone-naive reading.
/// * `tz_offset_minutes` - Caller offset, positive west of UTC.
///
/// # Returns
///
/// The instant, or `InvalidDate` if the shift leaves chrono's representable range.
///
/// # Example
///
/// ```
/// use assessment::models::LocalWallClock;
/// use assessment::time::to_instant;
///
/// // 09:00 in UTC+2 is 07:00 UTC.
/// let wall = LocalWallClock::new(2025, 4, 15, 9, 0).unwrap();
/// let instant = to_instant(wall, -120).unwrap();
/// assert_eq!(instant.to_rfc3339(), "2025-04-15T07:00:00+00:00");
/// ```
pub fn to_instant(wall: LocalWallClock, tz_offset_minutes: i32) -> Result<Instant> {
    let naive = wall.to_naive()?;
    naive
        .checked_add_signed(TimeDelta::minutes(i64::from(tz_offset_minutes)))
        .map(|shifted| shifted.and_utc())
        .ok_or_else(|| {
            AssessmentError::InvalidDate(format!(
                "{wall} shifted by {tz_offset_minutes} minutes is out of range"
            ))
        })
}

/// Exact inverse of [`to_instant`]. Seconds below the minute are truncated.
pub fn to_local_wall_clock(instant: Instant, tz_offset_minutes: i32) -> Result<LocalWallClock> {
    instant
        .naive_utc()
        .checked_sub_signed(TimeDelta::minutes(i64::from(tz_offset_minutes)))
        .map(LocalWallClock::from_naive)
        .ok_or_else(|| {
            AssessmentError::InvalidDate(format!(
                "{instant} shifted by {tz_offset_minutes} minutes is out of range"
            ))
        })
}

/// Signed time left until `instant`. Negative once it has passed.
pub fn remaining(instant: Instant, now: Instant) -> TimeDelta {
    instant - now
}

/// `now >= instant`: the deadline is reached at its exact instant.
pub fn is_overdue(instant: Instant, now: Instant) -> bool {
    now >= instant
}

/// Parses an ISO-8601 timestamp from the persistence layer.
///
/// RFC 3339 strings keep their offset and are converted to UTC. Strings without an offset
/// (`2025-04-15T23:59:59`, `2025-04-15 23:59:59`) are taken to be UTC already.
pub fn parse_instant(raw: &str) -> Result<Instant> {
    let raw = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }

    const NAIVE_FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"];
    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
        .ok_or_else(|| AssessmentError::InvalidDate(format!("unparseable timestamp {raw:?}")))
}

/// Parses a `YYYY-MM-DDTHH:MM` value from a local datetime control.
pub fn parse_wall_clock(raw: &str) -> Result<LocalWallClock> {
    raw.parse()
}

/// The host's current offset in the positive-west convention.
///
/// Read it once and pass the value along; do not call this per evaluation.
pub fn local_offset_minutes() -> i32 {
    common::config::host_offset_minutes()
}

impl Assignment {
    /// Time left before the due instant, if one is set.
    pub fn remaining_at(&self, now: Instant) -> Option<TimeDelta> {
        self.due_instant.map(|due| remaining(due, now))
    }

    /// An assignment without a due instant is never overdue.
    pub fn is_overdue_at(&self, now: Instant) -> bool {
        self.due_instant.is_some_and(|due| is_overdue(due, now))
    }
}
