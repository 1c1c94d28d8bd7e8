//! Match keys: timestamps coarsened to a day or a month.
//!
//! Keys at one granularity are ordered the same way as the timestamps they
//! come from, which is what lets a timestamp-sorted table be searched by key.

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Precision at which two timestamps are compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Granularity {
    Day,
    Month,
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Granularity::Day => f.write_str("day"),
            Granularity::Month => f.write_str("month"),
        }
    }
}

/// A timestamp coarsened to a granularity.
///
/// Only keys of the same granularity are meaningfully comparable. The derived
/// ordering compares fields in declaration order, so within one variant it
/// matches chronological order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchKey {
    Day(NaiveDate),
    Month { year: i32, month: u32 },
}

impl MatchKey {
    /// Key of a timestamp at the given granularity.
    pub fn of(timestamp: NaiveDateTime, granularity: Granularity) -> Self {
        match granularity {
            Granularity::Day => MatchKey::Day(timestamp.date()),
            Granularity::Month => MatchKey::Month {
                year: timestamp.year(),
                month: timestamp.month(),
            },
        }
    }

    /// Day key.
    pub fn day(date: NaiveDate) -> Self {
        MatchKey::Day(date)
    }

    /// Month key, or `None` if `month` is not in 1..=12.
    pub fn month(year: i32, month: u32) -> Option<Self> {
        (1..=12)
            .contains(&month)
            .then_some(MatchKey::Month { year, month })
    }

    pub fn granularity(&self) -> Granularity {
        match self {
            MatchKey::Day(_) => Granularity::Day,
            MatchKey::Month { .. } => Granularity::Month,
        }
    }

    /// Check if a timestamp falls inside this key's period.
    pub fn contains(&self, timestamp: NaiveDateTime) -> bool {
        MatchKey::of(timestamp, self.granularity()) == *self
    }
}

impl fmt::Display for MatchKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchKey::Day(date) => write!(f, "{}", date.format("%Y-%m-%d")),
            MatchKey::Month { year, month } => write!(f, "{year:04}-{month:02}"),
        }
    }
}

/// Error returned when a period string is neither a day nor a month.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid period '{0}' (expected YYYY-MM-DD or YYYY-MM)")]
pub struct ParseKeyError(pub String);

impl FromStr for MatchKey {
    type Err = ParseKeyError;

    /// Parse `YYYY-MM-DD` as a day key or `YYYY-MM` as a month key.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
            return Ok(MatchKey::Day(date));
        }

        let invalid = || ParseKeyError(s.to_string());
        let (year, month) = s.split_once('-').ok_or_else(invalid)?;
        let digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
        let well_formed =
            year.len() == 4 && (1..=2).contains(&month.len()) && digits(year) && digits(month);
        if !well_formed {
            return Err(invalid());
        }
        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u32 = month.parse().map_err(|_| invalid())?;
        MatchKey::month(year, month).ok_or_else(invalid)
    }
}
