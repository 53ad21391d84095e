//! Core domain logic for timesheet validation.
//!
//! This crate contains the fundamental types and logic for:
//! - Normalization: pinning timesheet rows and calendar events to one offset
//! - Reconciliation: finding extra timesheet entries and missing calendar events

pub mod calendar;
pub mod entry;
pub mod offset;
mod reconcile;
pub mod timesheet;
pub mod types;

pub use calendar::{RawCalendarEvent, normalize_events, retain_within};
pub use entry::{CalendarEvent, TimesheetEntry};
pub use offset::{default_offset, parse_utc_offset};
pub use reconcile::{DiscrepancyReport, reconcile};
pub use timesheet::{TimesheetError, covering_window, date_range, parse_timesheet};
pub use types::{Interval, Normalized, RecordSource, SkippedRecord, Timed, ValidationError};
