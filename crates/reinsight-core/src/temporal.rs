//! # Temporal Keys — Date Windows and Period Labels
//!
//! Two unrelated-looking string formats share this module because both are
//! keys in the store:
//!
//! - **Date keys** label a capture window: `DD.MM.YYYY` for a single day
//!   or `DD.MM.YYYY-DD.MM.YYYY` for a range. They arrive as snapshot map
//!   keys and are parsed only for diagnostics — a malformed date key never
//!   aborts processing.
//! - **Period keys** label series entries inside decoded results: the
//!   backend ships either a millisecond epoch (converted here, in UTC, to
//!   `YYYY-MM`) or a bare calendar year (passed through as `"YYYY"`).
//!
//! The epoch/year ambiguity is resolved by magnitude: values at or above
//! 10^12 are millisecond epochs (10^12 ms is 2001-09; no calendar year
//! reaches it).

use std::fmt;

use chrono::{DateTime, NaiveDate};
use serde_json::Value;

use crate::error::ReinsightError;

/// Smallest `G0` value treated as a millisecond epoch rather than a year.
pub const MILLISECOND_EPOCH_FLOOR: i64 = 1_000_000_000_000;

/// A parsed snapshot date key: one capture day or an inclusive range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DateKey {
    /// A single capture day.
    Single(NaiveDate),
    /// An inclusive `start-end` capture window.
    Range(NaiveDate, NaiveDate),
}

impl DateKey {
    /// Parse `DD.MM.YYYY` or `DD.MM.YYYY-DD.MM.YYYY`.
    pub fn parse(key: &str) -> Result<Self, ReinsightError> {
        let invalid = |reason: &str| ReinsightError::InvalidDateKey {
            key: key.to_owned(),
            reason: reason.to_owned(),
        };
        match key.split_once('-') {
            None => Ok(Self::Single(parse_day(key).ok_or_else(|| {
                invalid("expected DD.MM.YYYY")
            })?)),
            Some((start, end)) => {
                let start = parse_day(start).ok_or_else(|| invalid("bad range start"))?;
                let end = parse_day(end).ok_or_else(|| invalid("bad range end"))?;
                if end < start {
                    return Err(invalid("range end precedes start"));
                }
                Ok(Self::Range(start, end))
            }
        }
    }

    /// First day of the window.
    pub fn start(&self) -> NaiveDate {
        match self {
            Self::Single(d) => *d,
            Self::Range(start, _) => *start,
        }
    }

    /// Last day of the window.
    pub fn end(&self) -> NaiveDate {
        match self {
            Self::Single(d) => *d,
            Self::Range(_, end) => *end,
        }
    }
}

impl fmt::Display for DateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Single(d) => write!(f, "{}", d.format("%d.%m.%Y")),
            Self::Range(start, end) => {
                write!(f, "{}-{}", start.format("%d.%m.%Y"), end.format("%d.%m.%Y"))
            }
        }
    }
}

fn parse_day(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, "%d.%m.%Y").ok()
}

/// Month key (`YYYY-MM`, UTC) for a series grouping value.
///
/// Returns `None` unless the value is a number at or above
/// [`MILLISECOND_EPOCH_FLOOR`] — rows grouped by something other than a
/// millisecond epoch do not belong in a month-keyed series.
pub fn month_key(grouping: &Value) -> Option<String> {
    let ms = grouping.as_i64().or_else(|| grouping.as_f64().map(|f| f as i64))?;
    if ms < MILLISECOND_EPOCH_FLOOR {
        return None;
    }
    let dt = DateTime::from_timestamp_millis(ms)?;
    Some(dt.format("%Y-%m").to_string())
}

/// Year key for a series grouping value: integers render as `"YYYY"`,
/// strings pass through unchanged.
pub fn year_key(grouping: &Value) -> Option<String> {
    match grouping {
        Value::Number(n) => n
            .as_i64()
            .map(|y| y.to_string())
            .or_else(|| n.as_f64().map(|f| (f as i64).to_string())),
        Value::String(s) => Some(s.clone()),
        _ => None,
    }
}
