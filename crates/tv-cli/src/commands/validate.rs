//! Validate command: reconcile a timesheet against the calendar.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use tv_core::{DiscrepancyReport, SkippedRecord, date_range, parse_timesheet, reconcile};

use crate::Config;
use crate::commands::util::{
    CalendarArgs, calendar_source, fetch_calendar, open_timesheet, resolve_window,
};
use crate::render::{write_summary, write_workbook};

#[derive(Debug, Args)]
pub struct ValidateArgs {
    /// Timesheet CSV with columns date,start,end[,project].
    pub timesheet: PathBuf,

    /// Where to write the spreadsheet report (default from config).
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    #[command(flatten)]
    pub calendar: CalendarArgs,

    /// Print the report as JSON instead of a summary.
    #[arg(long)]
    pub json: bool,
}

/// Result of a validation run.
#[derive(Debug, Serialize)]
pub struct ValidationOutcome {
    #[serde(flatten)]
    pub report: DiscrepancyReport,
    /// Timesheet rows and calendar events dropped as malformed.
    pub skipped: Vec<SkippedRecord>,
    pub report_path: PathBuf,
}

pub fn run<W: Write>(writer: &mut W, args: &ValidateArgs, config: &Config) -> Result<ValidationOutcome> {
    let offset = config.offset().context("invalid utc_offset in configuration")?;

    let file = open_timesheet(&args.timesheet)?;
    let timesheet = parse_timesheet(file, offset)
        .with_context(|| format!("failed to parse {}", args.timesheet.display()))?;

    let window = resolve_window(&args.calendar, date_range(&timesheet.records), offset)?;
    let source = calendar_source(&args.calendar, config)?;
    let calendar = fetch_calendar(&source, &window, offset)?;

    let report = reconcile(&timesheet.records, &calendar.records);

    let report_path = args
        .output
        .clone()
        .unwrap_or_else(|| config.report_path.clone());
    write_workbook(&report, &report_path)?;

    let mut skipped = timesheet.skipped;
    skipped.extend(calendar.skipped);
    let outcome = ValidationOutcome {
        report,
        skipped,
        report_path,
    };

    if args.json {
        writeln!(writer, "{}", serde_json::to_string_pretty(&outcome)?)?;
    } else {
        write_summary(writer, &outcome.report, &outcome.skipped)?;
        writeln!(writer, "Report written to {}", outcome.report_path.display())?;
    }
    Ok(outcome)
}
