//! Logical-day calendar.
//!
//! A logical day runs from the rollover hour on one calendar date to just
//! before the rollover hour on the next, in the local clock of the reference
//! instant. With a 3 AM rollover, 02:15 on June 1st still belongs to May 31st.
//!
//! # Boundary rules
//!
//! - An instant whose local time of day is strictly before the rollover hour
//!   belongs to the previous logical day. Exactly `03:00:00.000` starts the new one.
//! - Moving to the previous day is calendar arithmetic ("same wall-clock time,
//!   one date earlier"), not a fixed 24 hours, so DST transitions keep the
//!   start pinned to the rollover hour.
//! - Day membership compares calendar-date labels, never raw intervals.
//!
//! # Reference instants
//!
//! Every operation takes its reference as a `DateTime<Tz>` and works in that
//! instant's zone. A reference held as a string (a stored check date, a
//! command-line argument) goes through [`parse_timestamp`] first, which pins
//! the zone naive strings are read in. [`is_on_logical_day_str`] does this for
//! the common membership case.

use chrono::{
    DateTime, Days, LocalResult, NaiveDate, NaiveDateTime, Offset, SecondsFormat, TimeDelta,
    TimeZone, Timelike, Utc,
};
use serde::{Deserialize, Serialize};

use crate::types::{RolloverHour, ValidationError};

/// Format of calendar-date labels.
pub const DATE_LABEL_FORMAT: &str = "%Y-%m-%d";

/// Naive formats read as local wall time when no offset is present.
const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Length of a logical day minus one millisecond.
fn day_span() -> TimeDelta {
    TimeDelta::days(1) - TimeDelta::milliseconds(1)
}

/// Inclusive query window for one logical day, as UTC timestamp strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start_timestamp: String,
    pub end_timestamp: String,
}

impl DateRange {
    /// Renders the range as `startDate=...&endDate=...` query parameters.
    pub fn to_query(&self) -> String {
        format!(
            "startDate={}&endDate={}",
            self.start_timestamp, self.end_timestamp
        )
    }
}

/// One logical day in the local clock of `Tz`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogicalDay<Tz: TimeZone> {
    start: DateTime<Tz>,
    rollover: RolloverHour,
}

impl<Tz: TimeZone> LogicalDay<Tz> {
    /// The logical day containing `reference`.
    pub fn containing(rollover: RolloverHour, reference: &DateTime<Tz>) -> Self {
        Self {
            start: logical_day_start(rollover, reference),
            rollover,
        }
    }

    pub const fn rollover(&self) -> RolloverHour {
        self.rollover
    }

    pub const fn start(&self) -> &DateTime<Tz> {
        &self.start
    }

    /// Last millisecond of the day.
    pub fn end(&self) -> DateTime<Tz> {
        self.start.clone() + day_span()
    }

    /// Local calendar date the day is labelled with.
    pub fn date(&self) -> NaiveDate {
        self.start.date_naive()
    }

    pub fn label(&self) -> String {
        self.date().format(DATE_LABEL_FORMAT).to_string()
    }

    pub fn range(&self) -> DateRange {
        DateRange {
            start_timestamp: to_timestamp(&self.start),
            end_timestamp: to_timestamp(&self.end()),
        }
    }

    /// Whether `instant` falls on this logical day.
    pub fn contains(&self, instant: &DateTime<Tz>) -> bool {
        logical_date(self.rollover, instant) == self.date()
    }
}

/// Renders an instant as an RFC 3339 UTC timestamp with millisecond precision.
pub fn to_timestamp<Tz: TimeZone>(instant: &DateTime<Tz>) -> String {
    instant
        .with_timezone(&Utc)
        .to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parses a timestamp into the local clock of `tz`.
///
/// Accepts RFC 3339 with any offset, or a naive date-time which is read as
/// local wall time in `tz`.
pub fn parse_timestamp<Tz: TimeZone>(text: &str, tz: &Tz) -> Result<DateTime<Tz>, ValidationError> {
    let text = text.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Ok(dt.with_timezone(tz));
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
        .map(|naive| resolve_local(tz, naive))
        .ok_or_else(|| ValidationError::InvalidTimestamp {
            value: text.to_string(),
        })
}

/// Maps a local wall-clock time to an instant.
///
/// Ambiguous times take the earlier instant. Times inside a DST gap are read
/// with the offset in effect before the transition.
fn resolve_local<Tz: TimeZone>(tz: &Tz, naive: NaiveDateTime) -> DateTime<Tz> {
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => dt,
        LocalResult::None => {
            let before = tz
                .offset_from_local_datetime(&(naive - TimeDelta::days(1)))
                .earliest()
                .map_or(0, |offset| offset.fix().local_minus_utc());
            let utc = naive - TimeDelta::seconds(i64::from(before));
            tracing::trace!(%naive, %utc, "resolved local time inside DST gap");
            tz.from_utc_datetime(&utc)
        }
    }
}

fn previous_date(date: NaiveDate) -> NaiveDate {
    // Saturates at NaiveDate::MIN.
    date.checked_sub_days(Days::new(1)).unwrap_or(date)
}

fn before_rollover<Tz: TimeZone>(rollover: RolloverHour, instant: &DateTime<Tz>) -> bool {
    instant.hour() < u32::from(rollover.get())
}

/// Start of the logical day containing `reference`.
pub fn logical_day_start<Tz: TimeZone>(
    rollover: RolloverHour,
    reference: &DateTime<Tz>,
) -> DateTime<Tz> {
    let local = reference.naive_local();
    let date = if before_rollover(rollover, reference) {
        previous_date(local.date())
    } else {
        local.date()
    };
    resolve_local(&reference.timezone(), date.and_time(rollover.time()))
}

/// Last millisecond of the logical day containing `reference`.
///
/// Always exactly 24 hours minus 1 ms after [`logical_day_start`].
pub fn logical_day_end<Tz: TimeZone>(
    rollover: RolloverHour,
    reference: &DateTime<Tz>,
) -> DateTime<Tz> {
    logical_day_start(rollover, reference) + day_span()
}

pub fn logical_day_start_timestamp<Tz: TimeZone>(
    rollover: RolloverHour,
    reference: &DateTime<Tz>,
) -> String {
    to_timestamp(&logical_day_start(rollover, reference))
}

pub fn logical_day_end_timestamp<Tz: TimeZone>(
    rollover: RolloverHour,
    reference: &DateTime<Tz>,
) -> String {
    to_timestamp(&logical_day_end(rollover, reference))
}

/// Local calendar date of the logical day containing `reference`.
pub fn logical_date<Tz: TimeZone>(rollover: RolloverHour, reference: &DateTime<Tz>) -> NaiveDate {
    logical_day_start(rollover, reference).date_naive()
}

/// `YYYY-MM-DD` label of the logical day containing `reference`.
pub fn logical_date_label<Tz: TimeZone>(
    rollover: RolloverHour,
    reference: &DateTime<Tz>,
) -> String {
    logical_date(rollover, reference)
        .format(DATE_LABEL_FORMAT)
        .to_string()
}

/// Start and end timestamps of the logical day containing `reference`.
pub fn logical_date_range<Tz: TimeZone>(
    rollover: RolloverHour,
    reference: &DateTime<Tz>,
) -> DateRange {
    LogicalDay::containing(rollover, reference).range()
}

/// `reference` moved back one calendar date if it is before the rollover hour.
///
/// Unlike [`logical_day_start`], the local time of day is kept, so instants
/// stamped this way still sort by when they happened within the day.
pub fn logical_instant<Tz: TimeZone>(
    rollover: RolloverHour,
    reference: &DateTime<Tz>,
) -> DateTime<Tz> {
    if !before_rollover(rollover, reference) {
        return reference.clone();
    }
    let local = reference.naive_local();
    let shifted = previous_date(local.date()).and_time(local.time());
    resolve_local(&reference.timezone(), shifted)
}

/// UTC timestamp of [`logical_instant`].
pub fn logical_timestamp<Tz: TimeZone>(rollover: RolloverHour, reference: &DateTime<Tz>) -> String {
    to_timestamp(&logical_instant(rollover, reference))
}

/// Whether `timestamp` and `base` share a logical day.
pub fn is_on_logical_day<Tz: TimeZone>(
    timestamp: &DateTime<Tz>,
    rollover: RolloverHour,
    base: &DateTime<Tz>,
) -> bool {
    logical_date(rollover, timestamp) == logical_date(rollover, base)
}

/// [`is_on_logical_day`] for a timestamp string, read in the zone of `base`.
pub fn is_on_logical_day_str<Tz: TimeZone>(
    timestamp: &str,
    rollover: RolloverHour,
    base: &DateTime<Tz>,
) -> Result<bool, ValidationError> {
    let timestamp = parse_timestamp(timestamp, &base.timezone())?;
    Ok(is_on_logical_day(&timestamp, rollover, base))
}
