//! Planning horizon and working-day calendar.
//!
//! Defines the day-granular time model used throughout the crate:
//! every shift and assignment record is keyed by a calendar date.
//!
//! # Working Days
//! A working day is any Monday through Friday. Saturdays and Sundays are
//! never allocated, but read-side series still cover them.

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

/// Whether a date is a working day (Mon–Fri).
#[inline]
pub fn is_working_day(date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// An inclusive date interval [start, end].
///
/// An interval whose end precedes its start is empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    /// First day (inclusive).
    pub start: NaiveDate,
    /// Last day (inclusive).
    pub end: NaiveDate,
}

impl DateRange {
    /// Creates a new date range.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// Whether the range contains no days.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.end < self.start
    }

    /// Whether a date falls within the range.
    #[inline]
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    /// Number of calendar days in the range.
    pub fn len_days(&self) -> usize {
        if self.is_empty() {
            0
        } else {
            ((self.end - self.start).num_days() + 1) as usize
        }
    }

    /// Iterates every calendar day, weekends included.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let start = self.start;
        (0..self.len_days()).map(move |offset| start + Duration::days(offset as i64))
    }

    /// Iterates working days only.
    pub fn working_days(&self) -> impl Iterator<Item = NaiveDate> {
        self.days().filter(|d| is_working_day(*d))
    }

    /// Intersection of two ranges (may be empty).
    pub fn intersect(&self, other: &Self) -> Self {
        Self::new(self.start.max(other.start), self.end.min(other.end))
    }
}

/// The planning horizon: the full set of days considered for allocation.
///
/// Allocation only ever touches the horizon's working days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Horizon {
    /// Covered dates.
    pub range: DateRange,
}

impl Horizon {
    /// Creates a horizon over [start, end].
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            range: DateRange::new(start, end),
        }
    }

    /// Horizon covering one calendar year.
    ///
    /// Returns `None` for years chrono cannot represent.
    pub fn year(year: i32) -> Option<Self> {
        let start = NaiveDate::from_ymd_opt(year, 1, 1)?;
        let end = NaiveDate::from_ymd_opt(year, 12, 31)?;
        Some(Self::new(start, end))
    }

    /// First day.
    pub fn start(&self) -> NaiveDate {
        self.range.start
    }

    /// Last day.
    pub fn end(&self) -> NaiveDate {
        self.range.end
    }

    /// Whether the date is a working day inside the horizon.
    pub fn is_working_day(&self, date: NaiveDate) -> bool {
        self.range.contains(date) && is_working_day(date)
    }

    /// Working days in chronological order.
    pub fn working_days(&self) -> Vec<NaiveDate> {
        self.range.working_days().collect()
    }

    /// Every calendar day, weekends included.
    pub fn all_days(&self) -> Vec<NaiveDate> {
        self.range.days().collect()
    }

    /// Working days of `window` that also fall inside the horizon.
    pub fn working_days_in(&self, window: &DateRange) -> Vec<NaiveDate> {
        self.range.intersect(window).working_days().collect()
    }
}

/// Formats a date the way the store and viewers expect (`YYYY-MM-DD`).
pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}
