//! Core type definitions with validation.

use std::fmt;

use chrono::{DateTime, Duration, FixedOffset};
use serde::Serialize;
use thiserror::Error;

/// Validation errors for core types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The provided value was empty.
    #[error("{field} cannot be empty")]
    Empty { field: &'static str },

    /// The interval ends before it starts.
    #[error("interval ends before it starts ({start} > {end})")]
    InvertedInterval { start: String, end: String },

    /// The UTC offset could not be parsed or is out of range.
    #[error("invalid UTC offset: {value}")]
    InvalidOffset { value: String },

    /// A date could not be parsed.
    #[error("invalid date: {value}")]
    InvalidDate { value: String },

    /// A time of day could not be parsed.
    #[error("invalid time: {value}")]
    InvalidTime { value: String },

    /// A timestamp could not be parsed.
    #[error("invalid timestamp: {value}")]
    InvalidTimestamp { value: String },
}

/// A closed time interval with an attached offset.
///
/// `end >= start` always holds; zero-length intervals are allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Interval {
    start: DateTime<FixedOffset>,
    end: DateTime<FixedOffset>,
}

impl Interval {
    /// Creates a new interval, rejecting one that ends before it starts.
    pub fn new(
        start: DateTime<FixedOffset>,
        end: DateTime<FixedOffset>,
    ) -> Result<Self, ValidationError> {
        if end < start {
            return Err(ValidationError::InvertedInterval {
                start: start.to_rfc3339(),
                end: end.to_rfc3339(),
            });
        }
        Ok(Self { start, end })
    }

    #[must_use]
    pub const fn start(&self) -> DateTime<FixedOffset> {
        self.start
    }

    #[must_use]
    pub const fn end(&self) -> DateTime<FixedOffset> {
        self.end
    }

    #[must_use]
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// Returns true if `other` lies entirely within this interval.
    ///
    /// Both bounds are inclusive, so an interval contains itself.
    #[must_use]
    pub fn contains(&self, other: &Self) -> bool {
        other.start >= self.start && other.end <= self.end
    }

    /// Returns true if `other` shares any time with this half-open window.
    ///
    /// Matches how calendar APIs select events for a `[min, max)` range: an
    /// event ending exactly at `min` or starting exactly at `max` is outside.
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        if other.start == other.end {
            return other.start >= self.start && other.start < self.end;
        }
        other.start < self.end && other.end > self.start
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} to {}", self.start.to_rfc3339(), self.end.to_rfc3339())
    }
}

/// Something that occupies an interval of time.
///
/// Reconciliation only looks at intervals; labels are carried through
/// untouched for reporting.
pub trait Timed {
    /// Returns the interval this record covers.
    fn interval(&self) -> &Interval;
}

/// Where a skipped record came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordSource {
    /// A row of the uploaded timesheet.
    Timesheet,
    /// An event returned by the calendar source.
    Calendar,
}

impl RecordSource {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Timesheet => "timesheet",
            Self::Calendar => "calendar",
        }
    }
}

impl fmt::Display for RecordSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A record dropped during normalization, kept so callers can report it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedRecord {
    pub source: RecordSource,
    /// CSV line number for timesheet rows, 1-based index for calendar events.
    pub position: u64,
    pub reason: String,
}

impl fmt::Display for SkippedRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let unit = match self.source {
            RecordSource::Timesheet => "line",
            RecordSource::Calendar => "event",
        };
        write!(f, "{} {unit} {}: {}", self.source, self.position, self.reason)
    }
}

/// Records that survived normalization, plus the ones that did not.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Normalized<T> {
    pub records: Vec<T>,
    pub skipped: Vec<SkippedRecord>,
}

impl<T> Default for Normalized<T> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            skipped: Vec::new(),
        }
    }
}
