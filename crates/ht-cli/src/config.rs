//! Configuration loading and management.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use chrono_tz::Tz;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use ht_core::{Clock, DayCalendar, FixedClock, RolloverHour, SystemClock, parse_timestamp};
use serde::{Deserialize, Serialize};

use crate::commands::util::parse_datetime;

/// Calendar as the CLI builds it: a boxed clock over an IANA zone.
pub type CliCalendar = DayCalendar<Box<dyn Clock>, Tz>;

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Local hour at which a new tracking day starts.
    pub day_rollover_hour: RolloverHour,

    /// IANA zone name. Defaults to the system zone.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,

    /// Pretend it is this instant. For development only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub simulated_now: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            day_rollover_hour: RolloverHour::DEFAULT,
            timezone: None,
            simulated_now: None,
        }
    }
}

impl Config {
    /// Loads configuration, optionally from a specific file.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Load from default config location
        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        // Load from specified config file
        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        // Load from environment variables (HT_*)
        figment = figment.merge(Env::prefixed("HT_"));

        figment.extract()
    }

    /// Resolves the zone days are computed in.
    ///
    /// The configured name wins, then the system zone, then UTC.
    pub fn resolve_timezone(&self) -> Result<Tz> {
        if let Some(name) = self.timezone.as_deref() {
            return name
                .parse::<Tz>()
                .map_err(|e| anyhow!("unknown timezone {name}: {e}"));
        }

        match iana_time_zone::get_timezone() {
            Ok(name) => Ok(name.parse::<Tz>().unwrap_or_else(|_| {
                tracing::warn!(%name, "system timezone not recognised, using UTC");
                Tz::UTC
            })),
            Err(error) => {
                tracing::debug!(%error, "system timezone unavailable, using UTC");
                Ok(Tz::UTC)
            }
        }
    }

    /// Builds the clock: `at` if given, else the simulated instant, else the system clock.
    ///
    /// A relative `at` ("2 hours ago") counts back from the simulated instant when one is set.
    pub fn clock(&self, tz: &Tz, at: Option<&str>) -> Result<Box<dyn Clock>> {
        let base: Box<dyn Clock> = match self.simulated_now.as_deref() {
            Some(text) => {
                let instant = parse_timestamp(text, tz)
                    .with_context(|| format!("invalid simulated_now: {text}"))?;
                tracing::debug!(%instant, "using simulated clock");
                Box::new(FixedClock::new(&instant))
            }
            None => Box::new(SystemClock),
        };

        match at {
            Some(text) => {
                let instant = parse_datetime(text, base.now(), tz)?;
                Ok(Box::new(FixedClock::new(&instant)))
            }
            None => Ok(base),
        }
    }

    /// Builds the calendar for this invocation.
    pub fn calendar(
        &self,
        rollover: Option<RolloverHour>,
        at: Option<&str>,
    ) -> Result<CliCalendar> {
        let tz = self.resolve_timezone()?;
        let clock = self.clock(&tz, at)?;
        let rollover = rollover.unwrap_or(self.day_rollover_hour);
        tracing::debug!(timezone = tz.name(), %rollover, "built calendar");
        Ok(DayCalendar::new(clock, tz, rollover))
    }
}

/// Returns the platform-specific config directory for ht.
///
/// On Linux: `~/.config/ht`
pub fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("ht"))
}
