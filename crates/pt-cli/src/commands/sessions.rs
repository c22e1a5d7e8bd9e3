//! Sessions command for listing reconstructed player presence.
//!
//! This module implements `pt sessions` with an optional reporting window
//! (--start, --end) and output formats (human-readable, JSON).

use std::io::Write;

use anyhow::{Context, Result};
use chrono_tz::Tz;
use pt_core::{AnalysisReport, ReportRange, Session, SessionAnalyzer};
use serde::Serialize;

use super::util::{format_duration, format_instant, parse_datetime, parse_end_datetime, plural};
use crate::Config;

/// Builds the reporting window from optional command-line bounds.
pub fn parse_range(start: Option<&str>, end: Option<&str>, zone: Tz) -> Result<ReportRange> {
    let start = start
        .map(|s| parse_datetime(s, zone))
        .transpose()
        .context("invalid --start")?;
    let end = end
        .map(|s| parse_end_datetime(s, zone))
        .transpose()
        .context("invalid --end")?;
    Ok(ReportRange::new(start, end)?)
}

fn total_ms(sessions: &[Session]) -> i64 {
    sessions.iter().map(|s| s.duration().num_milliseconds()).sum()
}

// ========== Human Output ==========

/// Writes the human-readable session listing.
pub fn write_sessions<W: Write>(writer: &mut W, report: &AnalysisReport, zone: Tz) -> Result<()> {
    let header = format!("SESSIONS ({})", zone.name());
    writeln!(writer, "{header}")?;
    writeln!(writer, "{}", "─".repeat(header.chars().count()))?;
    writeln!(writer)?;

    if report.result.is_empty() {
        writeln!(writer, "No sessions found.")?;
        writeln!(writer)?;
    }

    for (user, sessions) in report.result.iter() {
        writeln!(
            writer,
            "{user}  {}  {}",
            plural(sessions.len(), "session"),
            format_duration(total_ms(sessions))
        )?;
        for session in sessions {
            writeln!(
                writer,
                "  {} - {}  ({})",
                format_instant(&session.start()),
                format_instant(&session.end()),
                format_duration(session.duration().num_milliseconds())
            )?;
        }
        writeln!(writer)?;
    }

    writeln!(
        writer,
        "Scanned {}, skipped {}.",
        plural(report.files_scanned, "file"),
        plural(report.skipped_lines, "line")
    )?;
    Ok(())
}

// ========== JSON Output ==========

/// JSON sessions report structure.
#[derive(Debug, Serialize)]
pub struct JsonSessionsReport {
    pub display_zone: String,
    pub range: JsonRange,
    pub users: Vec<JsonUser>,
    pub files_scanned: usize,
    pub skipped_lines: usize,
}

#[derive(Debug, Serialize)]
pub struct JsonRange {
    pub start: Option<String>,
    pub end: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct JsonUser {
    pub user: String,
    pub total_ms: i64,
    pub sessions: Vec<JsonSession>,
}

#[derive(Debug, Serialize)]
pub struct JsonSession {
    pub start: String,
    pub end: String,
    pub duration_ms: i64,
}

/// Formats an analysis report as JSON.
pub fn format_sessions_json(report: &AnalysisReport, range: &ReportRange, zone: Tz) -> Result<String> {
    let users = report
        .result
        .iter()
        .map(|(user, sessions)| JsonUser {
            user: user.to_string(),
            total_ms: total_ms(sessions),
            sessions: sessions
                .iter()
                .map(|s| JsonSession {
                    start: s.start().to_rfc3339(),
                    end: s.end().to_rfc3339(),
                    duration_ms: s.duration().num_milliseconds(),
                })
                .collect(),
        })
        .collect();

    let json = JsonSessionsReport {
        display_zone: zone.name().to_string(),
        range: JsonRange {
            start: range.start().map(|dt| dt.to_rfc3339()),
            end: range.end().map(|dt| dt.to_rfc3339()),
        },
        users,
        files_scanned: report.files_scanned,
        skipped_lines: report.skipped_lines,
    };

    Ok(serde_json::to_string_pretty(&json)?)
}

// ========== Public Interface ==========

/// Runs the sessions command.
pub fn run<W: Write>(
    writer: &mut W,
    config: &Config,
    start: Option<&str>,
    end: Option<&str>,
    json: bool,
) -> Result<()> {
    let zone = config.display_zone;
    let range = parse_range(start, end, zone)?;
    let report = SessionAnalyzer::new(config.analyzer_config())
        .with_range(range)
        .analyze()
        .context("failed to analyze server logs")?;

    if json {
        let output = format_sessions_json(&report, &range, zone)?;
        writeln!(writer, "{output}")?;
    } else {
        write_sessions(writer, &report, zone)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    use insta::assert_snapshot;
    use tempfile::TempDir;

    fn write_fixture(dir: &Path) {
        let lines = [
            "[09:00:00] [Server thread/INFO]: Alice joined the game",
            "[10:00:00] [Server thread/INFO]: Alice left the game",
            "[11:00:00] [Server thread/INFO]: Alice joined the game",
            "[11:30:00] [Server thread/INFO]: Alice lost connection: Timed out",
            "[12:00:00] [Server thread/INFO]: Bob joined the game",
            "[xx:00:00] [Server thread/INFO]: Bob left the game",
            "[23:00:00] [Server thread/INFO]: Stopping server",
        ];
        std::fs::write(dir.join("2016-03-28-1.log"), lines.join("\n")).unwrap();
    }

    fn config(dir: &Path) -> Config {
        Config {
            log_directory: dir.to_path_buf(),
            recording_zone: chrono_tz::UTC,
            display_zone: chrono_tz::UTC,
        }
    }

    fn run_to_string(config: &Config, start: Option<&str>, end: Option<&str>, json: bool) -> String {
        let mut output = Vec::new();
        run(&mut output, config, start, end, json).unwrap();
        String::from_utf8(output).unwrap()
    }

    #[test]
    fn sessions_command_lists_sessions_per_user() {
        let temp = TempDir::new().unwrap();
        write_fixture(temp.path());

        let output = run_to_string(&config(temp.path()), None, None, false);

        assert_snapshot!(output, @r"
        SESSIONS (UTC)
        ──────────────

        Alice  2 sessions  1h 30m
          2016-03-28 09:00:00 +00:00 - 2016-03-28 10:00:00 +00:00  (1h 0m)
          2016-03-28 11:00:00 +00:00 - 2016-03-28 11:30:00 +00:00  (30m)

        Bob  0 sessions  0m

        Scanned 1 file, skipped 1 line.
        ");
    }

    #[test]
    fn sessions_command_reports_empty_directory() {
        let temp = TempDir::new().unwrap();

        let output = run_to_string(&config(temp.path()), None, None, false);

        assert_snapshot!(output, @r"
        SESSIONS (UTC)
        ──────────────

        No sessions found.

        Scanned 0 files, skipped 0 lines.
        ");
    }

    #[test]
    fn sessions_command_clips_to_window() {
        let temp = TempDir::new().unwrap();
        write_fixture(temp.path());

        let output = run_to_string(
            &config(temp.path()),
            Some("2016-03-28T09:30:00Z"),
            Some("2016-03-28T11:15:00Z"),
            true,
        );
        let json: serde_json::Value = serde_json::from_str(&output).unwrap();

        assert_eq!(json["range"]["start"], "2016-03-28T09:30:00+00:00");
        let alice = &json["users"][0];
        assert_eq!(alice["user"], "Alice");
        assert_eq!(alice["sessions"][0]["start"], "2016-03-28T09:30:00+00:00");
        assert_eq!(alice["sessions"][0]["end"], "2016-03-28T10:00:00+00:00");
        assert_eq!(alice["sessions"][1]["end"], "2016-03-28T11:15:00+00:00");
        assert_eq!(alice["total_ms"], 45 * 60_000);
    }

    #[test]
    fn end_date_includes_the_whole_day() {
        let temp = TempDir::new().unwrap();
        write_fixture(temp.path());

        let output = run_to_string(&config(temp.path()), Some("2016-03-28"), Some("2016-03-28"), true);
        let json: serde_json::Value = serde_json::from_str(&output).unwrap();

        assert_eq!(json["range"]["end"], "2016-03-29T00:00:00+00:00");
        let alice = &json["users"][0];
        assert_eq!(alice["sessions"].as_array().unwrap().len(), 2);
        assert_eq!(alice["total_ms"], 90 * 60_000);
    }

    #[test]
    fn sessions_json_includes_scan_counts() {
        let temp = TempDir::new().unwrap();
        write_fixture(temp.path());

        let output = run_to_string(&config(temp.path()), None, None, true);
        let json: serde_json::Value = serde_json::from_str(&output).unwrap();

        assert_eq!(json["display_zone"], "UTC");
        assert_eq!(json["files_scanned"], 1);
        assert_eq!(json["skipped_lines"], 1);
        assert!(json["range"]["start"].is_null());
        assert_eq!(json["users"].as_array().unwrap().len(), 2);
        assert_eq!(json["users"][1]["user"], "Bob");
        assert!(json["users"][1]["sessions"].as_array().unwrap().is_empty());
    }

    #[test]
    fn sessions_command_rejects_inverted_window() {
        let temp = TempDir::new().unwrap();
        let mut output = Vec::new();

        let result = run(
            &mut output,
            &config(temp.path()),
            Some("2016-03-30"),
            Some("2016-03-18"),
            false,
        );

        assert!(result.is_err());
    }

    #[test]
    fn sessions_command_fails_on_missing_directory() {
        let temp = TempDir::new().unwrap();
        let mut output = Vec::new();

        let err = run(&mut output, &config(&temp.path().join("missing")), None, None, false)
            .unwrap_err();

        assert!(format!("{err:#}").contains("failed to read log directory"));
    }
}
