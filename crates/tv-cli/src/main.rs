use std::io;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use tv_cli::commands::{events, timesheet, validate};
use tv_cli::{Cli, Commands, Config};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Use try_init to avoid panic if tracing is already initialized (e.g., in tests)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();

    let Some(command) = &cli.command else {
        // No subcommand, show help
        use clap::CommandFactory;
        Cli::command().print_help()?;
        println!();
        return Ok(());
    };

    let config = Config::load_from(cli.config.as_deref()).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    let mut stdout = io::stdout().lock();
    match command {
        Commands::Validate(args) => {
            let outcome = validate::run(&mut stdout, args, &config)?;
            tracing::info!(
                extra = outcome.report.extra_entries.len(),
                missing = outcome.report.missing_entries.len(),
                skipped = outcome.skipped.len(),
                "validation complete"
            );
        }
        Commands::Timesheet(args) => timesheet::run(&mut stdout, args, &config)?,
        Commands::Events(args) => events::run(&mut stdout, args, &config)?,
    }

    Ok(())
}
