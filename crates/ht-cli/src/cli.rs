//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use ht_core::RolloverHour;

use crate::commands::checked::CheckedArgs;

/// Habit tracker day tools.
///
/// Works out which tracking day an instant belongs to when days roll over at
/// a configurable hour, and which habits were checked on that day.
#[derive(Debug, Parser)]
#[command(name = "ht", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Hour (0-23) at which a new day starts. Overrides the configured value.
    #[arg(long, global = true, value_name = "HOUR")]
    pub rollover: Option<RolloverHour>,

    /// Evaluate at this instant instead of now (ISO 8601 or e.g. '2 hours ago').
    #[arg(long, global = true, value_name = "WHEN")]
    pub at: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Show the current logical day and its boundaries.
    Day {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Print the timestamp to store for a check made now.
    Stamp,

    /// List habits and sub-habits checked on the current logical day.
    Checked(CheckedArgs),
}
