//! Events command: show the calendar events a validation would use.

use std::io::Write;

use anyhow::{Context, Result};
use clap::Args;

use crate::Config;
use crate::commands::util::{CalendarArgs, calendar_source, fetch_calendar, resolve_window};
use crate::render::write_skipped;

#[derive(Debug, Args)]
pub struct EventsArgs {
    #[command(flatten)]
    pub calendar: CalendarArgs,

    /// Output as JSON.
    #[arg(long)]
    pub json: bool,
}

pub fn run<W: Write>(writer: &mut W, args: &EventsArgs, config: &Config) -> Result<()> {
    let offset = config.offset().context("invalid utc_offset in configuration")?;
    let window = resolve_window(&args.calendar, None, offset)?;
    let source = calendar_source(&args.calendar, config)?;
    let events = fetch_calendar(&source, &window, offset)?;

    if args.json {
        writeln!(writer, "{}", serde_json::to_string_pretty(&events)?)?;
        return Ok(());
    }

    writeln!(writer, "Events from {} ({window}):", source.describe())?;
    if events.records.is_empty() {
        writeln!(writer, "  (none)")?;
    }
    for event in &events.records {
        writeln!(writer, "  - {}: {}", event.interval, event.summary)?;
    }
    write_skipped(writer, &events.skipped)?;
    Ok(())
}
