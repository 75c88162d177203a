//! CLI subcommand implementations.

pub mod checked;
pub mod day;
pub mod stamp;
pub mod util;
