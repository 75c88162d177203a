//! Core domain logic for the habit tracker.
//!
//! This crate contains the fundamental types and logic for:
//! - Logical days: tracking days that roll over at a configurable hour
//!   instead of midnight
//! - Check classification: which habits and sub-habits were completed on a
//!   logical day
//! - Clocks: an injectable source of "now" for callers that need "today"

pub mod calendar;
pub mod checks;
pub mod clock;
mod types;

pub use calendar::{
    DateRange, LogicalDay, is_on_logical_day, is_on_logical_day_str, logical_date,
    logical_date_label, logical_date_range, logical_day_end, logical_day_end_timestamp,
    logical_day_start, logical_day_start_timestamp, logical_instant, logical_timestamp,
    parse_timestamp, to_timestamp,
};
pub use checks::{
    Check, CheckedIdSet, CheckedSummary, checked_habit_ids, checked_sub_habit_ids, checked_summary,
};
pub use clock::{Clock, DayCalendar, FixedClock, SystemClock};
pub use types::{RolloverHour, ValidationError};
