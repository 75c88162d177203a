//! Injectable clock and the "today" convenience wrapper built on it.
//!
//! The calendar functions never read the wall clock. Callers that want
//! "today" go through [`DayCalendar`], which asks its [`Clock`] for the
//! current instant exactly once per call. A simulated date for development
//! is just a [`FixedClock`] owned by the caller.

use chrono::{DateTime, TimeZone, Utc};

use crate::calendar::{DateRange, LogicalDay, is_on_logical_day, logical_timestamp};
use crate::checks::{
    Check, CheckedIdSet, CheckedSummary, checked_habit_ids, checked_sub_habit_ids, checked_summary,
};
use crate::types::RolloverHour;

/// Source of the current instant.
///
/// Clocks are shared across threads along with the calendars built on them.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// The system wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock frozen at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(DateTime<Utc>);

impl FixedClock {
    pub fn new<Tz: TimeZone>(instant: &DateTime<Tz>) -> Self {
        Self(instant.with_timezone(&Utc))
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }
}

impl<C: Clock + ?Sized> Clock for Box<C> {
    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }
}

/// Logical-day queries relative to "now" in a fixed zone.
#[derive(Debug, Clone)]
pub struct DayCalendar<C, Tz> {
    clock: C,
    tz: Tz,
    rollover: RolloverHour,
}

impl<C: Clock, Tz: TimeZone> DayCalendar<C, Tz> {
    pub const fn new(clock: C, tz: Tz, rollover: RolloverHour) -> Self {
        Self {
            clock,
            tz,
            rollover,
        }
    }

    pub const fn rollover(&self) -> RolloverHour {
        self.rollover
    }

    pub const fn timezone(&self) -> &Tz {
        &self.tz
    }

    /// The current instant in the calendar's zone.
    pub fn now(&self) -> DateTime<Tz> {
        self.clock.now().with_timezone(&self.tz)
    }

    /// The logical day containing now.
    pub fn today(&self) -> LogicalDay<Tz> {
        self.day_of(&self.now())
    }

    /// The logical day containing `instant`, with this calendar's rollover.
    pub fn day_of(&self, instant: &DateTime<Tz>) -> LogicalDay<Tz> {
        LogicalDay::containing(self.rollover, instant)
    }

    pub fn date_label(&self) -> String {
        self.today().label()
    }

    pub fn date_range(&self) -> DateRange {
        self.today().range()
    }

    /// Timestamp to persist for a check made now.
    pub fn logical_timestamp(&self) -> String {
        logical_timestamp(self.rollover, &self.now())
    }

    pub fn is_today(&self, instant: &DateTime<Tz>) -> bool {
        is_on_logical_day(instant, self.rollover, &self.now())
    }

    pub fn checked_habit_ids(&self, checks: &[Check]) -> CheckedIdSet {
        checked_habit_ids(checks, self.rollover, &self.now())
    }

    pub fn checked_sub_habit_ids(&self, checks: &[Check], allowed: Option<&[i64]>) -> CheckedIdSet {
        checked_sub_habit_ids(checks, self.rollover, &self.now(), allowed)
    }

    /// Today's label with both id sets, from a single reading of the clock.
    pub fn checked_summary(&self, checks: &[Check], allowed: Option<&[i64]>) -> CheckedSummary {
        checked_summary(checks, self.rollover, &self.now(), allowed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::{FixedOffset, TimeDelta};

    fn calendar_at(text: &str) -> DayCalendar<FixedClock, FixedOffset> {
        let now = DateTime::parse_from_rfc3339(text).unwrap();
        DayCalendar::new(FixedClock::new(&now), *now.offset(), RolloverHour::DEFAULT)
    }

    #[test]
    fn fixed_clock_reports_its_instant() {
        let instant = Utc.with_ymd_and_hms(2024, 6, 1, 2, 15, 0).unwrap();
        let clock = FixedClock::new(&instant);
        assert_eq!(clock.now(), instant);
        assert_eq!((&clock).now(), instant);
        let boxed: Box<dyn Clock> = Box::new(clock);
        assert_eq!(boxed.now(), instant);
    }

    #[test]
    fn system_clock_moves_forward() {
        let before = Utc::now();
        let now = SystemClock.now();
        assert!(now >= before);
    }

    #[test]
    fn calendar_uses_clock_and_zone() {
        let calendar = calendar_at("2024-06-01T02:15:00+02:00");
        assert_eq!(
            calendar.now().naive_local().to_string(),
            "2024-06-01 02:15:00"
        );
        assert_eq!(calendar.date_label(), "2024-05-31");
        assert_eq!(calendar.rollover(), RolloverHour::DEFAULT);
        assert_eq!(calendar.timezone().local_minus_utc(), 7200);
        assert_eq!(
            calendar.date_range(),
            DateRange {
                start_timestamp: "2024-05-31T01:00:00.000Z".to_string(),
                end_timestamp: "2024-06-01T00:59:59.999Z".to_string(),
            }
        );
        assert_eq!(calendar.logical_timestamp(), "2024-05-31T00:15:00.000Z");
    }

    #[test]
    fn calendar_today_membership() {
        let calendar = calendar_at("2024-06-01T10:15:00Z");
        let now = calendar.now();
        assert!(calendar.is_today(&now));
        assert!(calendar.is_today(&(now - TimeDelta::hours(7))));
        assert!(!calendar.is_today(&(now - TimeDelta::hours(8))));
        assert_eq!(calendar.today().label(), "2024-06-01");
    }

    #[test]
    fn calendar_classifies_checks() {
        let calendar = calendar_at("2024-06-01T02:15:00Z");
        let checks = vec![
            Check {
                habit_id: Some(5),
                sub_habit_id: None,
                check_date: "2024-05-31T20:00:00.000Z".to_string(),
            },
            Check {
                habit_id: Some(5),
                sub_habit_id: Some(9),
                check_date: "2024-06-01T01:00:00.000Z".to_string(),
            },
        ];
        assert_eq!(calendar.checked_habit_ids(&checks), CheckedIdSet::from([5]));
        assert_eq!(
            calendar.checked_sub_habit_ids(&checks, None),
            CheckedIdSet::from([9])
        );
        let allowed = calendar.checked_sub_habit_ids(&checks, Some(&[1][..]));
        assert!(allowed.is_empty());

        let summary = calendar.checked_summary(&checks, None);
        assert_eq!(summary.date, "2024-05-31");
        assert_eq!(summary.habit_ids, CheckedIdSet::from([5]));
        assert_eq!(summary.sub_habit_ids, CheckedIdSet::from([9]));
    }

    #[test]
    fn simulated_clock_is_caller_owned() {
        let instant = Utc.with_ymd_and_hms(2030, 1, 1, 12, 0, 0).unwrap();
        let simulated = FixedClock::new(&instant);
        let calendar = DayCalendar::new(&simulated, Utc, RolloverHour::DEFAULT);
        assert_eq!(calendar.date_label(), "2030-01-01");
    }

    #[test]
    fn boxed_calendar_is_shared_across_threads() {
        let instant = Utc.with_ymd_and_hms(2024, 6, 1, 2, 15, 0).unwrap();
        let clock: Box<dyn Clock> = Box::new(FixedClock::new(&instant));
        let calendar = DayCalendar::new(clock, Utc, RolloverHour::DEFAULT);

        let labels: Vec<String> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..4)
                .map(|_| scope.spawn(|| calendar.date_label()))
                .collect();
            handles
                .into_iter()
                .map(|handle| handle.join().unwrap())
                .collect()
        });
        assert_eq!(labels, vec!["2024-05-31"; 4]);
    }

    #[test]
    fn day_of_uses_calendar_rollover() {
        let calendar = calendar_at("2024-06-01T12:00:00Z");
        let early = calendar.now() - TimeDelta::hours(10);
        assert_eq!(calendar.day_of(&early).label(), "2024-05-31");
        assert_eq!(calendar.day_of(&calendar.now()), calendar.today());
    }
}
