//! Reconstructed presence intervals.

use chrono::{DateTime, TimeDelta};
use chrono_tz::Tz;

/// A contiguous presence interval for one user, bounded by a join and the
/// leave it was matched with.
///
/// Always satisfies `start <= end`. Sessions are only produced by the
/// interval matcher and the range clipper.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Session {
    start: DateTime<Tz>,
    end: DateTime<Tz>,
}

impl Session {
    /// Returns `None` if `end` precedes `start`.
    pub(crate) fn new(start: DateTime<Tz>, end: DateTime<Tz>) -> Option<Self> {
        (start <= end).then_some(Self { start, end })
    }

    pub const fn start(&self) -> DateTime<Tz> {
        self.start
    }

    pub const fn end(&self) -> DateTime<Tz> {
        self.end
    }

    pub fn duration(&self) -> TimeDelta {
        self.end - self.start
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(h: u32, m: u32) -> DateTime<Tz> {
        chrono_tz::UTC.with_ymd_and_hms(2016, 3, 28, h, m, 0).unwrap()
    }

    #[test]
    fn new_rejects_reversed_bounds() {
        assert!(Session::new(at(10, 0), at(9, 0)).is_none());
    }

    #[test]
    fn new_accepts_zero_length() {
        let session = Session::new(at(10, 0), at(10, 0)).unwrap();
        assert_eq!(session.duration(), TimeDelta::zero());
    }

    #[test]
    fn duration_spans_start_to_end() {
        let session = Session::new(at(9, 15), at(10, 45)).unwrap();
        assert_eq!(session.duration(), TimeDelta::minutes(90));
    }
}
