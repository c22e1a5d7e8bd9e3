//! Log timestamp normalization.
//!
//! Server log lines only carry a wall-clock fragment (`[HH:MM:SS]`). The
//! calendar date comes from the log file name. Both are interpreted in the
//! recording zone and converted to the display zone using the IANA rules
//! table, so daylight-saving transitions land on the right instant.

use std::str::FromStr;

use chrono::{DateTime, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};
use chrono_tz::Tz;
use thiserror::Error;

/// Length of the `HH:MM:SS` clock fragment.
const CLOCK_LEN: usize = 8;

/// File-name prefix of the log still being written by the server.
const LATEST_PREFIX: &str = "latest";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TimestampError {
    #[error("invalid clock fragment: {fragment:?}")]
    InvalidClock { fragment: String },

    #[error("invalid log date: {value:?}")]
    InvalidDate { value: String },

    #[error("{datetime} does not exist in {zone}")]
    NonexistentLocalTime { datetime: NaiveDateTime, zone: Tz },
}

/// Calendar date that the lines of one log file belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogDate {
    /// A rotated log, e.g. `2016-03-28-1.log.gz`.
    Date(NaiveDate),
    /// The still-open log (`latest.log`), dated by the current day.
    Latest,
}

impl LogDate {
    /// Resolves the date, substituting `today` for the still-open log.
    #[must_use]
    pub const fn resolve(self, today: NaiveDate) -> NaiveDate {
        match self {
            Self::Date(date) => date,
            Self::Latest => today,
        }
    }
}

impl FromStr for LogDate {
    type Err = TimestampError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.starts_with(LATEST_PREFIX) {
            return Ok(Self::Latest);
        }
        NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map(Self::Date)
            .map_err(|_| TimestampError::InvalidDate {
                value: s.to_string(),
            })
    }
}

/// Returns the `HH:MM:SS` fragment of a line shaped like `[HH:MM:SS] ...`.
pub fn clock_fragment(line: &str) -> Option<&str> {
    if !line.starts_with('[') {
        return None;
    }
    line.get(1..=CLOCK_LEN)
}

/// Converts log-local wall-clock readings into display-zone instants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimestampNormalizer {
    recording_zone: Tz,
    display_zone: Tz,
}

impl TimestampNormalizer {
    pub const fn new(recording_zone: Tz, display_zone: Tz) -> Self {
        Self {
            recording_zone,
            display_zone,
        }
    }

    /// Combines a date with a `HH:MM:SS` clock reading.
    pub fn normalize(&self, date: NaiveDate, clock: &str) -> Result<DateTime<Tz>, TimestampError> {
        let time = NaiveTime::parse_from_str(clock, "%H:%M:%S").map_err(|_| {
            TimestampError::InvalidClock {
                fragment: clock.to_string(),
            }
        })?;
        self.localize(date.and_time(time))
    }

    /// Normalizes the bracketed clock value at the start of a log line.
    pub fn normalize_line(&self, date: NaiveDate, line: &str) -> Result<DateTime<Tz>, TimestampError> {
        let clock = clock_fragment(line).ok_or_else(|| TimestampError::InvalidClock {
            fragment: line.chars().take(CLOCK_LEN + 2).collect(),
        })?;
        self.normalize(date, clock)
    }

    /// Attaches the recording zone to a naive reading and converts it.
    ///
    /// A reading inside a DST fold resolves to the earlier instant.
    pub fn localize(&self, naive: NaiveDateTime) -> Result<DateTime<Tz>, TimestampError> {
        match self.recording_zone.from_local_datetime(&naive) {
            LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => {
                Ok(dt.with_timezone(&self.display_zone))
            }
            LocalResult::None => Err(TimestampError::NonexistentLocalTime {
                datetime: naive,
                zone: self.recording_zone,
            }),
        }
    }
}
