//! Classifying habit checks against a logical day.

use std::collections::BTreeSet;

use chrono::{DateTime, NaiveDate, TimeZone};
use serde::{Deserialize, Serialize};

use crate::calendar::{logical_date, logical_date_label, parse_timestamp, to_timestamp};
use crate::types::RolloverHour;

/// Unique habit or sub-habit ids with at least one check on the target day.
pub type CheckedIdSet = BTreeSet<i64>;

/// A completion event for a habit or one of its sub-habits, as delivered by
/// the check store.
///
/// Ids are only meaningful when positive; `0` or a missing id counts as absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Check {
    #[serde(default)]
    pub habit_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_habit_id: Option<i64>,
    /// When the check happened, RFC 3339 or naive local date-time.
    pub check_date: String,
}

impl Check {
    /// A check on the habit itself.
    pub fn habit<Tz: TimeZone>(habit_id: i64, at: &DateTime<Tz>) -> Self {
        Self {
            habit_id: Some(habit_id),
            sub_habit_id: None,
            check_date: to_timestamp(at),
        }
    }

    /// A check on one sub-habit of `habit_id`.
    pub fn sub_habit<Tz: TimeZone>(habit_id: i64, sub_habit_id: i64, at: &DateTime<Tz>) -> Self {
        Self {
            habit_id: Some(habit_id),
            sub_habit_id: Some(sub_habit_id),
            check_date: to_timestamp(at),
        }
    }

    /// The habit id, if valid and this is not a sub-habit check.
    pub fn parent_habit_id(&self) -> Option<i64> {
        if valid_id(self.sub_habit_id).is_some() {
            return None;
        }
        valid_id(self.habit_id)
    }

    /// The sub-habit id, if valid.
    pub fn checked_sub_habit_id(&self) -> Option<i64> {
        valid_id(self.sub_habit_id)
    }

    /// Whether the check lands on logical date `target` in the zone `tz`.
    ///
    /// Unparseable timestamps never land.
    fn lands_on<Tz: TimeZone>(&self, rollover: RolloverHour, tz: &Tz, target: NaiveDate) -> bool {
        match parse_timestamp(&self.check_date, tz) {
            Ok(at) => logical_date(rollover, &at) == target,
            Err(error) => {
                tracing::debug!(
                    check_date = %self.check_date,
                    %error,
                    "skipping check with unparseable timestamp"
                );
                false
            }
        }
    }
}

const fn valid_id(id: Option<i64>) -> Option<i64> {
    match id {
        Some(id) if id > 0 => Some(id),
        _ => None,
    }
}

/// Habits checked on the logical day containing `base`.
///
/// Sub-habit checks never count for their parent habit.
pub fn checked_habit_ids<Tz: TimeZone>(
    checks: &[Check],
    rollover: RolloverHour,
    base: &DateTime<Tz>,
) -> CheckedIdSet {
    let target = logical_date(rollover, base);
    let tz = base.timezone();
    checks
        .iter()
        .filter_map(|check| check.parent_habit_id().map(|id| (id, check)))
        .filter(|(_, check)| check.lands_on(rollover, &tz, target))
        .map(|(id, _)| id)
        .collect()
}

/// Sub-habits checked on the logical day containing `base`.
///
/// When `allowed` is given, ids outside it are dropped.
pub fn checked_sub_habit_ids<Tz: TimeZone>(
    checks: &[Check],
    rollover: RolloverHour,
    base: &DateTime<Tz>,
    allowed: Option<&[i64]>,
) -> CheckedIdSet {
    let target = logical_date(rollover, base);
    let tz = base.timezone();
    checks
        .iter()
        .filter_map(|check| check.checked_sub_habit_id().map(|id| (id, check)))
        .filter(|(id, _)| allowed.is_none_or(|allowed| allowed.contains(id)))
        .filter(|(_, check)| check.lands_on(rollover, &tz, target))
        .map(|(id, _)| id)
        .collect()
}

/// Habits and sub-habits checked on one logical day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckedSummary {
    /// `YYYY-MM-DD` label of the day.
    pub date: String,
    pub habit_ids: CheckedIdSet,
    pub sub_habit_ids: CheckedIdSet,
}

/// Classifies `checks` against the logical day containing `base`.
pub fn checked_summary<Tz: TimeZone>(
    checks: &[Check],
    rollover: RolloverHour,
    base: &DateTime<Tz>,
    allowed: Option<&[i64]>,
) -> CheckedSummary {
    CheckedSummary {
        date: logical_date_label(rollover, base),
        habit_ids: checked_habit_ids(checks, rollover, base),
        sub_habit_ids: checked_sub_habit_ids(checks, rollover, base, allowed),
    }
}
