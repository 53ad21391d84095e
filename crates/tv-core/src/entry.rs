//! Timesheet entries and calendar events.

use chrono::NaiveDate;
use serde::Serialize;

use crate::types::{Interval, Timed};

/// Project label used when a timesheet row has none.
pub const NO_PROJECT: &str = "N/A";

/// Summary used when a calendar event has no title.
pub const NO_TITLE: &str = "No Title";

/// A single row of a submitted timesheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimesheetEntry {
    /// The date as written on the timesheet. Informational only.
    pub date: NaiveDate,
    #[serde(flatten)]
    pub interval: Interval,
    pub project: String,
}

impl TimesheetEntry {
    /// Creates an entry, falling back to [`NO_PROJECT`] for a blank label.
    pub fn new(date: NaiveDate, interval: Interval, project: Option<String>) -> Self {
        Self {
            date,
            interval,
            project: label_or(project, NO_PROJECT),
        }
    }
}

impl Timed for TimesheetEntry {
    fn interval(&self) -> &Interval {
        &self.interval
    }
}

/// An event from the external calendar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CalendarEvent {
    #[serde(flatten)]
    pub interval: Interval,
    pub summary: String,
}

impl CalendarEvent {
    /// Creates an event, falling back to [`NO_TITLE`] for a blank summary.
    pub fn new(interval: Interval, summary: Option<String>) -> Self {
        Self {
            interval,
            summary: label_or(summary, NO_TITLE),
        }
    }
}

impl Timed for CalendarEvent {
    fn interval(&self) -> &Interval {
        &self.interval
    }
}

fn label_or(label: Option<String>, fallback: &str) -> String {
    label
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| fallback.to_string())
}
