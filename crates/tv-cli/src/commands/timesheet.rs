//! Timesheet command: show how a timesheet is read.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use tv_core::parse_timesheet;

use crate::Config;
use crate::commands::util::open_timesheet;
use crate::render::write_skipped;

#[derive(Debug, Args)]
pub struct TimesheetArgs {
    /// Timesheet CSV with columns date,start,end[,project].
    pub timesheet: PathBuf,

    /// Output as JSON.
    #[arg(long)]
    pub json: bool,
}

pub fn run<W: Write>(writer: &mut W, args: &TimesheetArgs, config: &Config) -> Result<()> {
    let offset = config.offset().context("invalid utc_offset in configuration")?;
    let file = open_timesheet(&args.timesheet)?;
    let timesheet = parse_timesheet(file, offset)
        .with_context(|| format!("failed to parse {}", args.timesheet.display()))?;

    if args.json {
        writeln!(writer, "{}", serde_json::to_string_pretty(&timesheet)?)?;
        return Ok(());
    }

    if timesheet.records.is_empty() {
        writeln!(writer, "No timesheet entries.")?;
    }
    for entry in &timesheet.records {
        writeln!(
            writer,
            "{}  {}-{}  {}",
            entry.date,
            entry.interval.start().format("%H:%M"),
            entry.interval.end().format("%H:%M"),
            entry.project
        )?;
    }
    write_skipped(writer, &timesheet.skipped)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use insta::assert_snapshot;

    fn run_on(contents: &str, json: bool) -> String {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("timesheet.csv");
        std::fs::write(&path, contents).unwrap();
        let args = TimesheetArgs {
            timesheet: path,
            json,
        };
        let mut output = Vec::new();
        run(&mut output, &args, &Config::default()).unwrap();
        String::from_utf8(output).unwrap()
    }

    #[test]
    fn lists_entries_and_skipped_rows() {
        let output = run_on(
            "date,start,end,project\n2025-03-10,09:00,10:30,Billing\n2025-03-10,25:00,26:00,Bad\n2025-03-11,14:00,15:00,\n",
            false,
        );
        assert_snapshot!(output, @r"
        2025-03-10  09:00-10:30  Billing
        2025-03-11  14:00-15:00  N/A
        Skipped 1 invalid record:
          - timesheet line 3: invalid time: 25:00
        ");
    }

    #[test]
    fn header_only_timesheet() {
        assert_eq!(run_on("date,start,end\n", false), "No timesheet entries.\n");
    }

    #[test]
    fn json_lists_records_and_skipped() {
        let output = run_on("date,start,end\n2025-03-10,09:00,10:00\n", true);
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["records"][0]["project"], "N/A");
        assert_eq!(value["skipped"], serde_json::json!([]));
    }
}
