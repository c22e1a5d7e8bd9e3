//! Classification of raw server log lines.
//!
//! The server log format is rigid:
//!
//! ```text
//! [19:36:55] [Server thread/INFO]: GoodGuyPapa joined the game
//! ```
//!
//! A leading bracketed clock value, then a `": "`-separated message whose
//! first word is the user name for join and leave messages.

use chrono::{DateTime, NaiveDate};
use chrono_tz::Tz;
use thiserror::Error;

use crate::timestamp::{TimestampError, TimestampNormalizer};

const JOINED: &str = "joined the game";
const LEFT: &str = "left the game";
const LOST_CONNECTION: &str = "lost connection";
const STOPPING: &str = "Stopping server";

/// Separator between the log prefix and the message body.
const MESSAGE_SEPARATOR: &str = ": ";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LineError {
    #[error("malformed timestamp: {0}")]
    MalformedTimestamp(#[from] TimestampError),

    #[error("no user name in log line: {line:?}")]
    MalformedLogLine { line: String },
}

/// What a single log line reports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogEvent {
    /// A user joined the server.
    Start { user: String, at: DateTime<Tz> },
    /// A user left or was disconnected.
    End { user: String, at: DateTime<Tz> },
    /// The server began shutting down.
    ServerStop { at: DateTime<Tz> },
    /// Anything else.
    Ignored,
}

/// Recognized message markers, checked in this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Marker {
    Joined,
    Left,
    Stopping,
}

fn marker(line: &str) -> Option<Marker> {
    if line.contains(JOINED) {
        Some(Marker::Joined)
    } else if line.contains(LEFT) || line.contains(LOST_CONNECTION) {
        Some(Marker::Left)
    } else if line.contains(STOPPING) {
        Some(Marker::Stopping)
    } else {
        None
    }
}

/// Returns the first word of the message body.
fn user_name(line: &str) -> Option<&str> {
    let (_, message) = line.split_once(MESSAGE_SEPARATOR)?;
    message.split_whitespace().next()
}

/// Turns log lines into [`LogEvent`]s.
#[derive(Debug, Clone, Copy)]
pub struct LineClassifier {
    normalizer: TimestampNormalizer,
}

impl LineClassifier {
    pub const fn new(normalizer: TimestampNormalizer) -> Self {
        Self { normalizer }
    }

    /// Classifies one line from a log file dated `date`.
    ///
    /// Unrecognized lines are [`LogEvent::Ignored`], never an error. Only a
    /// recognized line with an unusable clock or user name fails.
    pub fn classify(&self, line: &str, date: NaiveDate) -> Result<LogEvent, LineError> {
        let Some(marker) = marker(line) else {
            return Ok(LogEvent::Ignored);
        };

        let event = match marker {
            Marker::Stopping => LogEvent::ServerStop {
                at: self.normalizer.normalize_line(date, line)?,
            },
            Marker::Joined => LogEvent::Start {
                user: required_user_name(line)?,
                at: self.normalizer.normalize_line(date, line)?,
            },
            Marker::Left => LogEvent::End {
                user: required_user_name(line)?,
                at: self.normalizer.normalize_line(date, line)?,
            },
        };
        Ok(event)
    }
}

fn required_user_name(line: &str) -> Result<String, LineError> {
    user_name(line)
        .map(String::from)
        .ok_or_else(|| LineError::MalformedLogLine {
            line: line.to_string(),
        })
}
