//! Habit tracker CLI library.
//!
//! This crate provides the CLI interface over `ht-core`.

mod cli;
pub mod commands;
mod config;

pub use cli::{Cli, Commands};
pub use config::{CliCalendar, Config};
