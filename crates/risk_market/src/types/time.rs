//! Valuation dates and year fractions.
//!
//! [`Date`] wraps `chrono::NaiveDate` so market objects, pillars and
//! scenarios share one date type. Year fractions use ACT/365 Fixed, which is
//! the only convention the reference curves need.
//!
//! # Examples
//!
//! ```
//! use risk_market::types::Date;
//!
//! let start = Date::from_ymd(2024, 1, 1).unwrap();
//! let end = start.add_days(365);
//! assert_eq!(end - start, 365);
//! assert!((start.year_fraction_to(end) - 1.0).abs() < 1e-12);
//! ```

use chrono::{Datelike, Days, NaiveDate};
use std::fmt;
use std::ops::Sub;
use std::str::FromStr;

use super::error::DateError;

/// Calendar date used throughout the market model.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Date(NaiveDate);

impl Date {
    /// Creates a date from year, month and day.
    ///
    /// Returns `DateError::InvalidDate` when the components do not form a
    /// calendar date.
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Result<Self, DateError> {
        NaiveDate::from_ymd_opt(year, month, day)
            .map(Date)
            .ok_or(DateError::InvalidDate { year, month, day })
    }

    /// Parses an ISO 8601 (`YYYY-MM-DD`) string.
    pub fn parse(s: &str) -> Result<Self, DateError> {
        NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
            .map(Date)
            .map_err(|e| DateError::ParseError(format!("{}: {}", s, e)))
    }

    /// Returns the wrapped `NaiveDate`.
    #[inline]
    pub fn into_inner(self) -> NaiveDate {
        self.0
    }

    /// Year component.
    #[inline]
    pub fn year(&self) -> i32 {
        self.0.year()
    }

    /// Month component (1-12).
    #[inline]
    pub fn month(&self) -> u32 {
        self.0.month()
    }

    /// Day-of-month component.
    #[inline]
    pub fn day(&self) -> u32 {
        self.0.day()
    }

    /// Shifts the date by a signed number of calendar days.
    ///
    /// Saturates at the representable range instead of panicking.
    pub fn add_days(self, days: i64) -> Self {
        let shifted = if days >= 0 {
            self.0.checked_add_days(Days::new(days.unsigned_abs()))
        } else {
            self.0.checked_sub_days(Days::new(days.unsigned_abs()))
        };
        match shifted {
            Some(d) => Date(d),
            None if days >= 0 => Date(NaiveDate::MAX),
            None => Date(NaiveDate::MIN),
        }
    }

    /// ACT/365 Fixed year fraction from `self` to `end`.
    ///
    /// Negative when `end` is before `self`.
    #[inline]
    pub fn year_fraction_to(self, end: Date) -> f64 {
        (end - self) as f64 / 365.0
    }
}

impl From<NaiveDate> for Date {
    fn from(date: NaiveDate) -> Self {
        Date(date)
    }
}

impl From<Date> for NaiveDate {
    fn from(date: Date) -> Self {
        date.0
    }
}

/// Number of calendar days between two dates.
impl Sub for Date {
    type Output = i64;

    fn sub(self, other: Date) -> i64 {
        (self.0 - other.0).num_days()
    }
}

impl FromStr for Date {
    type Err = DateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Date::parse(s)
    }
}

impl fmt::Display for Date {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}
