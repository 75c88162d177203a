//! Core type definitions with validation.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Validation errors for core types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The rollover hour was outside `0..=23`.
    #[error("rollover hour must be between 0 and 23, got {value}")]
    RolloverHourOutOfRange { value: i64 },

    /// The rollover hour was not an integer.
    #[error("invalid rollover hour: {value}")]
    InvalidRolloverHour { value: String },

    /// The timestamp could not be parsed.
    #[error("invalid timestamp: {value}")]
    InvalidTimestamp { value: String },
}

/// The local hour at which a tracking day begins.
///
/// Always in `0..=23`. Construction fails instead of wrapping, since a wrapped
/// hour would attribute checks to the wrong day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct RolloverHour(u8);

impl RolloverHour {
    /// 3 AM, the rollover used when a user has not chosen one.
    pub const DEFAULT: Self = Self(3);

    /// Midnight; logical days coincide with calendar days.
    pub const MIDNIGHT: Self = Self(0);

    /// Creates a rollover hour after validation.
    pub fn new(hour: u8) -> Result<Self, ValidationError> {
        if hour > 23 {
            return Err(ValidationError::RolloverHourOutOfRange {
                value: i64::from(hour),
            });
        }
        Ok(Self(hour))
    }

    /// Returns the hour as an integer.
    #[must_use]
    pub const fn get(self) -> u8 {
        self.0
    }

    /// Local time of day at which the logical day starts.
    #[must_use]
    pub fn time(self) -> NaiveTime {
        NaiveTime::from_hms_opt(u32::from(self.0), 0, 0).unwrap_or_default()
    }
}

impl Default for RolloverHour {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for RolloverHour {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:00", self.0)
    }
}

impl TryFrom<i64> for RolloverHour {
    type Error = ValidationError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        u8::try_from(value)
            .map_err(|_| ValidationError::RolloverHourOutOfRange { value })
            .and_then(Self::new)
    }
}

impl TryFrom<u8> for RolloverHour {
    type Error = ValidationError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<RolloverHour> for u8 {
    fn from(hour: RolloverHour) -> Self {
        hour.0
    }
}

impl FromStr for RolloverHour {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: i64 = s
            .trim()
            .parse()
            .map_err(|_| ValidationError::InvalidRolloverHour {
                value: s.to_string(),
            })?;
        Self::try_from(value)
    }
}
