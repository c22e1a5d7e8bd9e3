//! Stops command for listing server shutdowns.

use std::io::Write;

use anyhow::{Context, Result};
use chrono::DateTime;
use chrono_tz::Tz;
use pt_core::SessionAnalyzer;
use serde::Serialize;

use super::util::format_instant;
use crate::Config;

/// JSON stops report structure.
#[derive(Debug, Serialize)]
pub struct JsonStopsReport {
    pub display_zone: String,
    pub stops: Vec<String>,
}

/// Writes the human-readable shutdown listing.
pub fn write_stops<W: Write>(writer: &mut W, stops: &[DateTime<Tz>], zone: Tz) -> Result<()> {
    let header = format!("SERVER STOPS ({})", zone.name());
    writeln!(writer, "{header}")?;
    writeln!(writer, "{}", "─".repeat(header.chars().count()))?;

    if stops.is_empty() {
        writeln!(writer, "No server stops found.")?;
        return Ok(());
    }

    for stop in stops {
        writeln!(writer, "{}", format_instant(stop))?;
    }
    Ok(())
}

/// Formats shutdown instants as JSON.
pub fn format_stops_json(stops: &[DateTime<Tz>], zone: Tz) -> Result<String> {
    let json = JsonStopsReport {
        display_zone: zone.name().to_string(),
        stops: stops.iter().map(DateTime::to_rfc3339).collect(),
    };
    Ok(serde_json::to_string_pretty(&json)?)
}

/// Runs the stops command.
pub fn run<W: Write>(writer: &mut W, config: &Config, json: bool) -> Result<()> {
    let report = SessionAnalyzer::new(config.analyzer_config())
        .analyze()
        .context("failed to analyze server logs")?;

    if json {
        let output = format_stops_json(&report.server_stops, config.display_zone)?;
        writeln!(writer, "{output}")?;
    } else {
        write_stops(writer, &report.server_stops, config.display_zone)?;
    }

    Ok(())
}
