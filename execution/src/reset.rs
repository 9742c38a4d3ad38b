//! Reset scopes and the daily wall-clock schedule.
//!
//! The hourly timer itself lives in the node; this module only decides what a reset clears
//! and when the next daily reset is due.

use chrono::{DateTime, Duration, FixedOffset, NaiveTime, TimeZone, Utc};
use std::{fmt, str::FromStr};
use thiserror::Error as ThisError;

/// What a reset clears.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ResetScope {
    /// Queue, active set, dedupe cache, last-transfer marker and pairing candidate.
    #[default]
    SafetyNet,
    /// Everything in `SafetyNet`, plus the recent-games ring and the current game counter.
    Full,
}

impl ResetScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResetScope::SafetyNet => "safety-net",
            ResetScope::Full => "full",
        }
    }
}

impl FromStr for ResetScope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "safety-net" | "safety_net" | "safetynet" => Ok(ResetScope::SafetyNet),
            "full" => Ok(ResetScope::Full),
            other => Err(format!("unknown reset scope: {other}")),
        }
    }
}

impl fmt::Display for ResetScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, ThisError, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("reset time must be HH:MM, got {0:?}")]
    InvalidTime(String),
    #[error("utc offset out of range: {0} minutes")]
    InvalidOffset(i32),
}

/// A fixed local time of day, repeated every day.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DailySchedule {
    at: NaiveTime,
    offset: FixedOffset,
}

impl DailySchedule {
    pub fn new(at: NaiveTime, offset: FixedOffset) -> Self {
        Self { at, offset }
    }

    /// Parse `HH:MM` at a fixed offset of `offset_minutes` east of UTC.
    pub fn parse(time: &str, offset_minutes: i32) -> Result<Self, ScheduleError> {
        let at = NaiveTime::parse_from_str(time.trim(), "%H:%M")
            .map_err(|_| ScheduleError::InvalidTime(time.to_string()))?;
        let offset = offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .ok_or(ScheduleError::InvalidOffset(offset_minutes))?;
        Ok(Self { at, offset })
    }

    pub fn at(&self) -> NaiveTime {
        self.at
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// The first scheduled instant strictly after `now`.
    pub fn next_after(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let local_date = now.with_timezone(&self.offset).date_naive();
        let today = self.instant_on(local_date.and_time(self.at));
        if today > now {
            today
        } else {
            self.instant_on(local_date.and_time(self.at) + Duration::days(1))
        }
    }

    fn instant_on(&self, local: chrono::NaiveDateTime) -> DateTime<Utc> {
        // A fixed offset has no gaps or folds, so the local time maps to exactly one instant.
        match self.offset.from_local_datetime(&local).single() {
            Some(instant) => instant.with_timezone(&Utc),
            None => Utc.from_utc_datetime(&(local - self.offset)),
        }
    }
}

impl fmt::Display for DailySchedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.at.format("%H:%M"), self.offset)
    }
}
