//! Reporting window and interval clipping.

use chrono::DateTime;
use chrono_tz::Tz;
use thiserror::Error;

use crate::session::Session;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RangeError {
    #[error("report range starts at {start} after it ends at {end}")]
    Inverted { start: DateTime<Tz>, end: DateTime<Tz> },
}

/// Optional bounds used to clip sessions. An unset bound is open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReportRange {
    start: Option<DateTime<Tz>>,
    end: Option<DateTime<Tz>>,
}

impl ReportRange {
    /// A range with both bounds open.
    pub const fn unbounded() -> Self {
        Self {
            start: None,
            end: None,
        }
    }

    pub fn new(start: Option<DateTime<Tz>>, end: Option<DateTime<Tz>>) -> Result<Self, RangeError> {
        if let (Some(start), Some(end)) = (start, end) {
            if start > end {
                return Err(RangeError::Inverted { start, end });
            }
        }
        Ok(Self { start, end })
    }

    pub const fn start(&self) -> Option<DateTime<Tz>> {
        self.start
    }

    pub const fn end(&self) -> Option<DateTime<Tz>> {
        self.end
    }

    /// Clips `start..=end` to this range.
    ///
    /// Returns `None` when the candidate lies entirely outside the range.
    /// Clipped bounds keep the candidate's time zone.
    pub fn clip(&self, start: DateTime<Tz>, end: DateTime<Tz>) -> Option<Session> {
        if self.start.is_some_and(|lo| end < lo) || self.end.is_some_and(|hi| hi < start) {
            return None;
        }

        let zone = start.timezone();
        let start = self
            .start
            .map_or(start, |lo| start.max(lo.with_timezone(&zone)));
        let end = self.end.map_or(end, |hi| end.min(hi.with_timezone(&zone)));
        Session::new(start, end)
    }
}
