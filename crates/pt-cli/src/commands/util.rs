//! Shared utilities for CLI commands.

use std::sync::LazyLock;

use anyhow::Context;
use chrono::{DateTime, Duration, LocalResult, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use regex::Regex;

/// Pre-compiled regex for relative time parsing.
static RELATIVE_TIME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)\s+(minute|hour|day|week)s?\s+ago$").unwrap());

/// Conservative bounds for relative time parsing (~1000 years in minutes).
const MAX_RELATIVE_MINUTES: i64 = 1000 * 365 * 24 * 60;

/// Parse a report bound as ISO 8601, a calendar date, or relative time.
///
/// Supports:
/// - ISO 8601: "2016-03-18T10:30:00Z"
/// - Date: "2016-03-18" (midnight in `zone`)
/// - Relative: "2 hours ago", "30 minutes ago", "1 day ago", "1 week ago"
pub fn parse_datetime(s: &str, zone: Tz) -> anyhow::Result<DateTime<Tz>> {
    parse_datetime_at(s, zone, Utc::now())
}

/// Like [`parse_datetime`], with relative times measured from `now`.
pub fn parse_datetime_at(s: &str, zone: Tz, now: DateTime<Utc>) -> anyhow::Result<DateTime<Tz>> {
    // Try ISO 8601 first
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&zone));
    }

    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Ok(midnight_in(zone, date));
    }

    // Try relative time: "N hours/minutes/days/weeks ago"
    let Some(caps) = RELATIVE_TIME_RE.captures(s) else {
        anyhow::bail!(
            "Invalid datetime: {s}. Use ISO 8601 (e.g., 2016-03-18T10:30:00Z), a date (e.g., 2016-03-18) or relative (e.g., '2 hours ago')"
        );
    };

    let n: i64 = caps[1]
        .parse()
        .context("failed to parse number in relative time")?;

    let (max_for_unit, minutes_per_unit) = match &caps[2] {
        "minute" => (MAX_RELATIVE_MINUTES, 1),
        "hour" => (MAX_RELATIVE_MINUTES / 60, 60),
        "day" => (MAX_RELATIVE_MINUTES / (60 * 24), 60 * 24),
        "week" => (MAX_RELATIVE_MINUTES / (60 * 24 * 7), 60 * 24 * 7),
        unit => anyhow::bail!("Unknown time unit: {unit}"),
    };

    if n > max_for_unit {
        anyhow::bail!("Relative time value too large: {n} {}", &caps[2]);
    }

    // Safe to create Duration now that we've validated the range
    let duration = Duration::minutes(n * minutes_per_unit);
    Ok((now - duration).with_timezone(&zone))
}

/// Parse an end bound. A bare date covers that whole day, so it resolves
/// to midnight at the start of the following day.
pub fn parse_end_datetime(s: &str, zone: Tz) -> anyhow::Result<DateTime<Tz>> {
    parse_end_datetime_at(s, zone, Utc::now())
}

/// Like [`parse_end_datetime`], with relative times measured from `now`.
pub fn parse_end_datetime_at(s: &str, zone: Tz, now: DateTime<Utc>) -> anyhow::Result<DateTime<Tz>> {
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        let next = date
            .succ_opt()
            .with_context(|| format!("date out of range: {s}"))?;
        return Ok(midnight_in(zone, next));
    }
    parse_datetime_at(s, zone, now)
}

/// Midnight of `date` in `zone`.
/// Handles DST ambiguity by picking the earlier time.
pub fn midnight_in(zone: Tz, date: NaiveDate) -> DateTime<Tz> {
    let midnight = date.and_time(NaiveTime::MIN);
    match zone.from_local_datetime(&midnight) {
        // Single or ambiguous (DST fall-back): use the earlier time
        LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => dt,
        LocalResult::None => {
            // DST spring-forward gap at midnight is rare but possible
            // Use 1am local which is guaranteed to exist
            let one_am = midnight + Duration::hours(1);
            zone.from_local_datetime(&one_am)
                .earliest()
                .unwrap_or_else(|| zone.from_utc_datetime(&midnight))
        }
    }
}

/// Formats milliseconds as duration string.
/// Returns "Xh Ym" if >= 1 hour, "Xm" if < 1 hour.
/// Negative durations are treated as 0m (defensive).
pub fn format_duration(ms: i64) -> String {
    if ms < 0 {
        return "0m".to_string();
    }
    let total_minutes = ms / 60_000;
    let hours = total_minutes / 60;
    let minutes = total_minutes % 60;

    if hours >= 1 {
        format!("{hours}h {minutes}m")
    } else {
        format!("{minutes}m")
    }
}

/// Formats an instant for human-readable output.
///
/// The UTC offset keeps readings inside a DST fold distinct.
pub fn format_instant(dt: &DateTime<Tz>) -> String {
    dt.format("%Y-%m-%d %H:%M:%S %:z").to_string()
}

/// `"1 file"`, `"2 files"`.
pub fn plural(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("{count} {noun}")
    } else {
        format!("{count} {noun}s")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2016, 3, 30, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_parse_rfc3339_converts_to_zone() {
        let dt = parse_datetime_at("2016-03-18T10:30:00Z", chrono_tz::America::New_York, now())
            .unwrap();

        assert_eq!(dt.timezone(), chrono_tz::America::New_York);
        assert_eq!(dt.with_timezone(&Utc), Utc.with_ymd_and_hms(2016, 3, 18, 10, 30, 0).unwrap());
    }

    #[test]
    fn test_parse_date_is_midnight_in_zone() {
        let dt = parse_datetime_at("2016-03-18", chrono_tz::America::New_York, now()).unwrap();

        assert_eq!(
            dt.naive_local(),
            NaiveDate::from_ymd_opt(2016, 3, 18).unwrap().and_time(NaiveTime::MIN)
        );
        assert_eq!(dt.with_timezone(&Utc), Utc.with_ymd_and_hms(2016, 3, 18, 4, 0, 0).unwrap());
    }

    #[test]
    fn test_parse_relative_time() {
        let dt = parse_datetime_at("2 days ago", chrono_tz::UTC, now()).unwrap();
        assert_eq!(dt.with_timezone(&Utc), Utc.with_ymd_and_hms(2016, 3, 28, 12, 0, 0).unwrap());

        let dt = parse_datetime_at("1 hour ago", chrono_tz::UTC, now()).unwrap();
        assert_eq!(dt.with_timezone(&Utc), Utc.with_ymd_and_hms(2016, 3, 30, 11, 0, 0).unwrap());
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_datetime_at("yesterday-ish", chrono_tz::UTC, now()).is_err());
        assert!(parse_datetime_at("", chrono_tz::UTC, now()).is_err());
    }

    #[test]
    fn test_parse_rejects_huge_relative_values() {
        let err = parse_datetime_at("99999999 weeks ago", chrono_tz::UTC, now()).unwrap_err();
        assert!(err.to_string().contains("too large"));
    }

    #[test]
    fn test_parse_end_date_covers_whole_day() {
        let dt = parse_end_datetime_at("2016-03-30", chrono_tz::UTC, now()).unwrap();
        assert_eq!(dt.with_timezone(&Utc), Utc.with_ymd_and_hms(2016, 3, 31, 0, 0, 0).unwrap());

        let dt = parse_end_datetime_at("2016-03-30T10:00:00Z", chrono_tz::UTC, now()).unwrap();
        assert_eq!(dt.with_timezone(&Utc), Utc.with_ymd_and_hms(2016, 3, 30, 10, 0, 0).unwrap());

        let dt = parse_end_datetime_at("1 hour ago", chrono_tz::UTC, now()).unwrap();
        assert_eq!(dt.with_timezone(&Utc), Utc.with_ymd_and_hms(2016, 3, 30, 11, 0, 0).unwrap());
    }

    #[test]
    fn test_format_instant_distinguishes_fold_readings() {
        // 01:30 happened twice in New York on 2016-11-06
        let zone = chrono_tz::America::New_York;
        let first = Utc.with_ymd_and_hms(2016, 11, 6, 5, 30, 0).unwrap().with_timezone(&zone);
        let second = Utc.with_ymd_and_hms(2016, 11, 6, 6, 30, 0).unwrap().with_timezone(&zone);

        assert_eq!(format_instant(&first), "2016-11-06 01:30:00 -04:00");
        assert_eq!(format_instant(&second), "2016-11-06 01:30:00 -05:00");
    }

    #[test]
    fn test_midnight_in_dst_gap_uses_one_am() {
        // Clocks in Havana jumped from 00:00 to 01:00 on 2016-03-13
        let date = NaiveDate::from_ymd_opt(2016, 3, 13).unwrap();
        let dt = midnight_in(chrono_tz::America::Havana, date);

        assert_eq!(dt.naive_local(), date.and_hms_opt(1, 0, 0).unwrap());
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(0), "0m");
        assert_eq!(format_duration(59_999), "0m");
        assert_eq!(format_duration(30 * 60_000), "30m");
        assert_eq!(format_duration(90 * 60_000), "1h 30m");
        assert_eq!(format_duration(-5), "0m");
    }

    #[test]
    fn test_plural() {
        assert_eq!(plural(1, "file"), "1 file");
        assert_eq!(plural(0, "file"), "0 files");
        assert_eq!(plural(3, "line"), "3 lines");
    }
}
