//! Shared utilities for CLI commands.

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use chrono::{FixedOffset, NaiveDate, Utc};
use clap::Args;
use tv_calendar::{CalendarError, CalendarSource, Credentials, GoogleCalendar};
use tv_core::offset::day_window;
use tv_core::{CalendarEvent, Interval, Normalized, normalize_events, retain_within};

use crate::Config;

/// Options selecting the calendar and the date range to read from it.
#[derive(Debug, Args)]
pub struct CalendarArgs {
    /// Read events from a JSON calendar export instead of Google Calendar.
    #[arg(long, value_name = "PATH")]
    pub calendar_file: Option<PathBuf>,

    /// First day to fetch events for (YYYY-MM-DD).
    #[arg(long, value_name = "DATE")]
    pub from: Option<NaiveDate>,

    /// Last day to fetch events for, inclusive (YYYY-MM-DD).
    #[arg(long, value_name = "DATE")]
    pub to: Option<NaiveDate>,
}

/// Opens an uploaded timesheet, rejecting missing and empty files.
pub fn open_timesheet(path: &Path) -> Result<File> {
    let metadata = match std::fs::metadata(path) {
        Ok(metadata) => metadata,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            bail!("no timesheet file at {}", path.display())
        }
        Err(err) => {
            return Err(err).with_context(|| format!("failed to read {}", path.display()));
        }
    };
    if !metadata.is_file() {
        bail!("no timesheet file at {}", path.display());
    }
    if metadata.len() == 0 {
        bail!("timesheet {} is empty", path.display());
    }
    File::open(path).with_context(|| format!("failed to open {}", path.display()))
}

/// Resolves the whole-day window to fetch events for.
///
/// Explicit `--from`/`--to` win; otherwise the timesheet's date range is used,
/// and with neither, today at the reference offset.
pub fn resolve_window(
    args: &CalendarArgs,
    entry_dates: Option<(NaiveDate, NaiveDate)>,
    offset: FixedOffset,
) -> Result<Interval> {
    let first = args
        .from
        .or(entry_dates.map(|(first, _)| first))
        .or(args.to)
        .unwrap_or_else(|| Utc::now().with_timezone(&offset).date_naive());
    let last = match args.to {
        Some(to) => to,
        None => entry_dates.map_or(first, |(_, last)| last).max(first),
    };

    day_window(first, last, offset)
        .with_context(|| format!("invalid date range: {first} to {last}"))
}

/// Builds the calendar source from flags and configuration.
pub fn calendar_source(args: &CalendarArgs, config: &Config) -> Result<CalendarSource> {
    if let Some(path) = args.calendar_file.as_ref().or(config.calendar_file.as_ref()) {
        return Ok(CalendarSource::File(path.clone()));
    }

    let credentials = match config
        .access_token
        .as_deref()
        .map(str::trim)
        .filter(|token| !token.is_empty())
    {
        Some(token) => Credentials::from_access_token(token),
        None if config.token_path.exists() => {
            Credentials::from_authorized_user_file(&config.token_path)
                .context("calendar source unavailable")?
        }
        None => return Err(CalendarError::MissingCredentials).context("calendar source unavailable"),
    };

    let calendar = GoogleCalendar::new(credentials, config.calendar_id.clone())
        .context("calendar source unavailable")?
        .with_max_results(config.max_results);
    Ok(CalendarSource::Google(calendar))
}

/// Fetches and normalizes calendar events for `window`.
///
/// Any failure to reach the calendar is an error; an empty calendar is not.
pub fn fetch_calendar(
    source: &CalendarSource,
    window: &Interval,
    offset: FixedOffset,
) -> Result<Normalized<CalendarEvent>> {
    tracing::debug!(source = %source.describe(), %window, "fetching calendar events");
    let runtime = tokio::runtime::Runtime::new().context("failed to initialize tokio runtime")?;
    let raw = runtime
        .block_on(source.fetch(window))
        .with_context(|| format!("calendar source unavailable: {}", source.describe()))?;

    let mut normalized = normalize_events(raw, offset);
    let dropped = retain_within(&mut normalized.records, window);
    if dropped > 0 {
        tracing::debug!(dropped, "ignored calendar events outside the window");
    }
    Ok(normalized)
}
