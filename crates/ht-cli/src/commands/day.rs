//! Day command for showing the current logical day.

use std::io::Write;

use anyhow::Result;
use chrono::DateTime;
use chrono_tz::Tz;
use ht_core::{Clock, DayCalendar, RolloverHour, logical_timestamp, to_timestamp};
use serde::Serialize;

/// Computed logical-day data.
#[derive(Debug, Serialize)]
pub struct DayReport {
    pub date: String,
    pub rollover_hour: RolloverHour,
    pub timezone: String,
    pub now: String,
    pub start: String,
    pub end: String,
    pub logical_timestamp: String,
    #[serde(skip)]
    local_start: String,
    #[serde(skip)]
    local_end: String,
    #[serde(skip)]
    query: String,
}

fn local_format(instant: &DateTime<Tz>) -> String {
    instant.format("%Y-%m-%d %H:%M:%S%.3f %Z").to_string()
}

/// Builds the report, reading the clock once.
pub fn build_report<C: Clock>(calendar: &DayCalendar<C, Tz>) -> DayReport {
    let now = calendar.now();
    let day = calendar.day_of(&now);
    let range = day.range();
    DayReport {
        date: day.label(),
        rollover_hour: calendar.rollover(),
        timezone: calendar.timezone().name().to_string(),
        now: to_timestamp(&now),
        local_start: local_format(day.start()),
        local_end: local_format(&day.end()),
        query: range.to_query(),
        start: range.start_timestamp,
        end: range.end_timestamp,
        logical_timestamp: logical_timestamp(calendar.rollover(), &now),
    }
}

pub fn run<W: Write, C: Clock>(
    writer: &mut W,
    calendar: &DayCalendar<C, Tz>,
    json: bool,
) -> Result<()> {
    let report = build_report(calendar);

    if json {
        writeln!(writer, "{}", serde_json::to_string_pretty(&report)?)?;
        return Ok(());
    }

    writeln!(writer, "Logical date: {}", report.date)?;
    writeln!(
        writer,
        "Rollover: {} {}",
        report.rollover_hour, report.timezone
    )?;
    writeln!(writer, "Start: {} ({})", report.local_start, report.start)?;
    writeln!(writer, "End: {} ({})", report.local_end, report.end)?;
    writeln!(writer, "Check stamp: {}", report.logical_timestamp)?;
    writeln!(writer, "Query: {}", report.query)?;
    Ok(())
}
