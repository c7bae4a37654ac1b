//! Analysis time window
//!
//! A window is inclusive at both ends. A missing end means the window is still
//! open, so only the start bound applies.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{PrevalenceError, Result};

/// Date format accepted for window bounds
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Inclusive date window for counting clinical events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeWindow {
    /// First day included in the window
    pub start: NaiveDate,
    /// Last day included in the window, `None` while the window is open
    pub end: Option<NaiveDate>,
}

impl TimeWindow {
    /// Create a window, checking that `start < end` when an end is given
    pub fn new(start: NaiveDate, end: Option<NaiveDate>) -> Result<Self> {
        let window = Self { start, end };
        window.validate()?;
        Ok(window)
    }

    /// Parse a window from `YYYY-MM-DD` strings
    pub fn parse(start: &str, end: Option<&str>) -> Result<Self> {
        let start = parse_date(start)?;
        let end = end.map(parse_date).transpose()?;
        Self::new(start, end)
    }

    /// Check the `start < end` invariant
    pub fn validate(&self) -> Result<()> {
        match self.end {
            Some(end) if self.start >= end => Err(PrevalenceError::StartAfterEnd {
                start: self.start,
                end,
            }),
            _ => Ok(()),
        }
    }

    /// Whether an event with the given dates falls inside the window
    ///
    /// The event must start inside the window and must not end after it.
    /// Events without an end date are included.
    #[must_use]
    pub fn contains_event(&self, start: NaiveDate, end: Option<NaiveDate>) -> bool {
        if start < self.start {
            return false;
        }
        let Some(window_end) = self.end else {
            return true;
        };
        start <= window_end && end.is_none_or(|end| end <= window_end)
    }
}

impl Default for TimeWindow {
    /// 2016-01-01 to 2024-12-31
    fn default() -> Self {
        Self {
            start: NaiveDate::from_ymd_opt(2016, 1, 1).unwrap_or(NaiveDate::MIN),
            end: NaiveDate::from_ymd_opt(2024, 12, 31),
        }
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.end {
            Some(end) => write!(f, "{} to {end}", self.start),
            None => write!(f, "{} onward", self.start),
        }
    }
}

/// Parse a single `YYYY-MM-DD` date
pub fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT)
        .map_err(|_| PrevalenceError::InvalidDateFormat(value.to_string()))
}
