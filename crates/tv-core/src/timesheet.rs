//! Timesheet CSV parsing.
//!
//! A timesheet is a CSV file with a header row and the columns `date`,
//! `start`, `end` and (optionally) `project`:
//!
//! ```text
//! date,start,end,project
//! 2025-03-10,09:00,10:30,Billing
//! ```
//!
//! Times are local times of day on `date`, pinned to the reference offset.
//! Rows that cannot be parsed are skipped and reported, never fatal.

use std::io;

use chrono::{FixedOffset, NaiveDate, NaiveTime};
use csv::StringRecord;
use thiserror::Error;

use crate::entry::TimesheetEntry;
use crate::offset::day_window;
use crate::types::{Interval, Normalized, RecordSource, SkippedRecord, ValidationError};

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMATS: [&str; 2] = ["%H:%M", "%H:%M:%S"];

/// Errors that stop a timesheet from being read at all.
#[derive(Debug, Error)]
pub enum TimesheetError {
    /// The CSV could not be read.
    #[error("failed to read timesheet: {0}")]
    Csv(#[from] csv::Error),

    /// The header row lacks a required column.
    #[error("timesheet is missing required column `{column}`")]
    MissingColumn { column: &'static str },
}

/// Column positions resolved from the header row.
#[derive(Debug, Clone, Copy)]
struct Columns {
    date: usize,
    start: usize,
    end: usize,
    project: Option<usize>,
}

impl Columns {
    fn locate(headers: &StringRecord) -> Result<Self, TimesheetError> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|header| header.eq_ignore_ascii_case(name))
        };
        let require = |name: &'static str| {
            find(name).ok_or(TimesheetError::MissingColumn { column: name })
        };
        Ok(Self {
            date: require("date")?,
            start: require("start")?,
            end: require("end")?,
            project: find("project"),
        })
    }

    fn parse_row(
        &self,
        record: &StringRecord,
        offset: FixedOffset,
    ) -> Result<TimesheetEntry, ValidationError> {
        let cell = |idx: usize, field: &'static str| {
            record
                .get(idx)
                .filter(|value| !value.is_empty())
                .ok_or(ValidationError::Empty { field })
        };

        let date = parse_date(cell(self.date, "date")?)?;
        let start = parse_time(cell(self.start, "start")?)?;
        let end = parse_time(cell(self.end, "end")?)?;
        let project = self
            .project
            .and_then(|idx| record.get(idx))
            .map(str::to_string);

        let interval = Interval::new(pin(date, start, offset)?, pin(date, end, offset)?)?;
        Ok(TimesheetEntry::new(date, interval, project))
    }
}

/// Parses timesheet CSV, pinning every time to `offset`.
///
/// # Errors
///
/// Fails only when the CSV cannot be read or the header lacks a required
/// column. Individual bad rows end up in [`Normalized::skipped`].
pub fn parse_timesheet<R: io::Read>(
    reader: R,
    offset: FixedOffset,
) -> Result<Normalized<TimesheetEntry>, TimesheetError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);
    let columns = Columns::locate(csv_reader.headers()?)?;

    let mut normalized = Normalized::default();
    for (idx, result) in csv_reader.records().enumerate() {
        // Header is line 1
        let fallback_line = idx as u64 + 2;
        let record = match result {
            Ok(record) => record,
            Err(err) if err.is_io_error() => return Err(err.into()),
            Err(err) => {
                let line = err.position().map_or(fallback_line, csv::Position::line);
                skip(&mut normalized, line, err.to_string());
                continue;
            }
        };

        let line = record.position().map_or(fallback_line, csv::Position::line);
        match columns.parse_row(&record, offset) {
            Ok(entry) => normalized.records.push(entry),
            Err(err) => skip(&mut normalized, line, err.to_string()),
        }
    }

    tracing::debug!(
        entries = normalized.records.len(),
        skipped = normalized.skipped.len(),
        "parsed timesheet"
    );
    Ok(normalized)
}

/// Returns the whole-day window spanning every entry's date.
///
/// Used to bound the calendar fetch. `None` for an empty timesheet.
#[must_use]
pub fn covering_window(entries: &[TimesheetEntry], offset: FixedOffset) -> Option<Interval> {
    let (first, last) = date_range(entries)?;
    day_window(first, last, offset)
}

/// Returns the earliest and latest entry dates.
#[must_use]
pub fn date_range(entries: &[TimesheetEntry]) -> Option<(NaiveDate, NaiveDate)> {
    let first = entries.iter().map(|entry| entry.date).min()?;
    let last = entries.iter().map(|entry| entry.date).max()?;
    Some((first, last))
}

fn skip(normalized: &mut Normalized<TimesheetEntry>, line: u64, reason: String) {
    tracing::warn!(line, %reason, "skipping invalid timesheet row");
    normalized.skipped.push(SkippedRecord {
        source: RecordSource::Timesheet,
        position: line,
        reason,
    });
}

fn parse_date(value: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|_| ValidationError::InvalidDate {
        value: value.to_string(),
    })
}

fn parse_time(value: &str) -> Result<NaiveTime, ValidationError> {
    TIME_FORMATS
        .iter()
        .find_map(|format| NaiveTime::parse_from_str(value, format).ok())
        .ok_or_else(|| ValidationError::InvalidTime {
            value: value.to_string(),
        })
}

fn pin(
    date: NaiveDate,
    time: NaiveTime,
    offset: FixedOffset,
) -> Result<chrono::DateTime<FixedOffset>, ValidationError> {
    let naive = date.and_time(time);
    naive
        .and_local_timezone(offset)
        .single()
        .ok_or_else(|| ValidationError::InvalidTimestamp {
            value: naive.to_string(),
        })
}
