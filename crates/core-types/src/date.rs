use crate::error::CoreError;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A calendar day stored as the 8-digit integer `YYYYMMDD`.
///
/// Price histories can run to tens of thousands of rows per instrument and are
/// shared across many tasks, so dates are kept in this compact form and only
/// rendered back to `YYYY-MM-DD` when output rows are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DateKey(u32);

impl DateKey {
    /// Builds a key from its packed integer form, rejecting impossible dates.
    pub fn from_packed(packed: u32) -> Result<Self, CoreError> {
        let year = (packed / 10_000) as i32;
        let month = (packed / 100) % 100;
        let day = packed % 100;
        NaiveDate::from_ymd_opt(year, month, day)
            .map(Self::from_naive)
            .ok_or_else(|| CoreError::InvalidDate(packed.to_string()))
    }

    pub fn from_naive(date: NaiveDate) -> Self {
        Self(date.year() as u32 * 10_000 + date.month() * 100 + date.day())
    }

    pub fn packed(&self) -> u32 {
        self.0
    }

    pub fn year(&self) -> u32 {
        self.0 / 10_000
    }

    pub fn month(&self) -> u32 {
        (self.0 / 100) % 100
    }

    pub fn day(&self) -> u32 {
        self.0 % 100
    }
}

impl FromStr for DateKey {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
            .map(Self::from_naive)
            .map_err(|_| CoreError::InvalidDate(s.to_string()))
    }
}

impl fmt::Display for DateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year(), self.month(), self.day())
    }
}
