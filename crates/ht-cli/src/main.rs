use std::fs::File;
use std::io;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use ht_cli::commands::{checked, day, stamp};
use ht_cli::{Cli, CliCalendar, Commands, Config};

/// Load config and build the calendar for this invocation.
fn load_calendar(cli: &Cli) -> Result<CliCalendar> {
    let config =
        Config::load_from(cli.config.as_deref()).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    config.calendar(cli.rollover, cli.at.as_deref())
}

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

    let mut stdout = io::stdout().lock();

    match &cli.command {
        Some(Commands::Day { json }) => {
            let calendar = load_calendar(&cli)?;
            day::run(&mut stdout, &calendar, *json)?;
        }
        Some(Commands::Stamp) => {
            let calendar = load_calendar(&cli)?;
            stamp::run(&mut stdout, &calendar)?;
        }
        Some(Commands::Checked(args)) => {
            let calendar = load_calendar(&cli)?;
            match &args.file {
                Some(path) => {
                    let file = File::open(path)
                        .with_context(|| format!("failed to open {}", path.display()))?;
                    checked::run(file, &mut stdout, &calendar, args)?;
                }
                None => checked::run(io::stdin().lock(), &mut stdout, &calendar, args)?,
            }
        }
        None => {
            // No subcommand, show help
            use clap::CommandFactory;
            Cli::command().print_help()?;
            println!();
        }
    }

    Ok(())
}
