//! Stamp command for timestamping a new check.

use std::io::Write;

use anyhow::Result;
use chrono_tz::Tz;
use ht_core::{Clock, DayCalendar};

/// Prints the timestamp a client stores as a check's `check_date`.
///
/// Before the rollover hour the date moves back one day and the time of day is kept.
pub fn run<W: Write, C: Clock>(writer: &mut W, calendar: &DayCalendar<C, Tz>) -> Result<()> {
    writeln!(writer, "{}", calendar.logical_timestamp())?;
    Ok(())
}
