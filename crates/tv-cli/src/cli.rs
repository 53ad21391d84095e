//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::commands::events::EventsArgs;
use crate::commands::timesheet::TimesheetArgs;
use crate::commands::validate::ValidateArgs;

/// Timesheet validator.
///
/// Compares a timesheet CSV against calendar events and reports entries the
/// calendar does not back up, and events the timesheet does not account for.
#[derive(Debug, Parser)]
#[command(name = "tv", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Reconcile a timesheet against the calendar and write a report.
    Validate(ValidateArgs),

    /// Parse a timesheet and show how it was read.
    Timesheet(TimesheetArgs),

    /// Fetch calendar events and show how they were read.
    Events(EventsArgs),
}

#[cfg(test)]
mod tests {
    use super::*;

    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_validate_with_window() {
        let cli = Cli::try_parse_from([
            "tv",
            "validate",
            "sheet.csv",
            "--from",
            "2025-03-10",
            "--to",
            "2025-03-14",
            "--calendar-file",
            "events.json",
            "--json",
        ])
        .unwrap();
        let Some(Commands::Validate(args)) = cli.command else {
            panic!("expected validate command");
        };
        assert_eq!(args.timesheet, PathBuf::from("sheet.csv"));
        assert_eq!(args.calendar.from.unwrap().to_string(), "2025-03-10");
        assert_eq!(args.calendar.to.unwrap().to_string(), "2025-03-14");
        assert_eq!(args.calendar.calendar_file, Some(PathBuf::from("events.json")));
        assert!(args.json);
    }

    #[test]
    fn rejects_malformed_dates() {
        assert!(Cli::try_parse_from(["tv", "events", "--from", "10/03/2025"]).is_err());
    }
}
