//! Directory-level session analysis.
//!
//! Scans every log file in a directory (gzip-compressed or plain), feeds
//! each line through the classifier, then matches each user's joins and
//! leaves into clipped sessions. A run is a one-shot batch pass; nothing is
//! cached between runs.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use flate2::read::MultiGzDecoder;
use thiserror::Error;

use crate::classify::LineClassifier;
use crate::matcher::match_sessions;
use crate::range::ReportRange;
use crate::session::Session;
use crate::store::EventStore;
use crate::timestamp::{LogDate, TimestampNormalizer};

/// Buffer size for `BufReader` (64KB)
const BUFFER_SIZE: usize = 64 * 1024;

/// Leading file-name characters holding the log date (`YYYY-MM-DD`).
const DATE_PREFIX_LEN: usize = 10;

#[derive(Debug, Error)]
pub enum AnalyzeError {
    #[error("failed to read log directory {}: {source}", path.display())]
    LogDirectoryUnreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to read log file {}: {source}", path.display())]
    LogFileUnreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Configuration for an analysis run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalyzerConfig {
    /// Directory holding the server's log files.
    pub log_directory: PathBuf,

    /// Zone the server writes log timestamps in.
    pub recording_zone: Tz,

    /// Zone sessions are reported in.
    pub display_zone: Tz,
}

impl AnalyzerConfig {
    /// Configuration with both zones set to UTC.
    pub fn new(log_directory: impl Into<PathBuf>) -> Self {
        Self {
            log_directory: log_directory.into(),
            recording_zone: chrono_tz::UTC,
            display_zone: chrono_tz::UTC,
        }
    }
}

/// Sessions per user, ordered by user name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnalysisResult {
    users: BTreeMap<String, Vec<Session>>,
}

impl AnalysisResult {
    pub fn sessions(&self, user: &str) -> Option<&[Session]> {
        self.users.get(user).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Session])> {
        self.users
            .iter()
            .map(|(user, sessions)| (user.as_str(), sessions.as_slice()))
    }

    /// Number of users with at least one recorded join.
    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    pub fn session_count(&self) -> usize {
        self.users.values().map(Vec::len).sum()
    }
}

/// Everything one analysis run produces.
#[derive(Debug, Clone)]
pub struct AnalysisReport {
    pub result: AnalysisResult,

    /// Server shutdown instants, chronological.
    pub server_stops: Vec<DateTime<Tz>>,

    pub files_scanned: usize,

    /// Recognized lines dropped for a bad clock or user name.
    pub skipped_lines: usize,
}

/// Reconstructs per-user sessions from a directory of server logs.
#[derive(Debug, Clone)]
pub struct SessionAnalyzer {
    config: AnalyzerConfig,
    range: ReportRange,
    today: NaiveDate,
}

impl SessionAnalyzer {
    pub fn new(config: AnalyzerConfig) -> Self {
        let today = Utc::now()
            .with_timezone(&config.recording_zone)
            .date_naive();
        Self {
            config,
            range: ReportRange::unbounded(),
            today,
        }
    }

    /// Clips every session to `range`.
    #[must_use]
    pub fn with_range(mut self, range: ReportRange) -> Self {
        self.range = range;
        self
    }

    /// Overrides the date used for the still-open `latest` log.
    #[must_use]
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }

    pub fn analyze(&self) -> Result<AnalysisReport, AnalyzeError> {
        let classifier = LineClassifier::new(TimestampNormalizer::new(
            self.config.recording_zone,
            self.config.display_zone,
        ));
        let mut store = EventStore::new();
        let mut files_scanned = 0;
        let mut skipped_lines = 0;

        for (path, log_date) in self.log_files()? {
            let contents = read_log_file(&path)?;
            let date = log_date.resolve(self.today);
            let skipped = scan_lines(&classifier, &contents, date, &path, &mut store);
            tracing::debug!(path = ?path, %date, skipped, "scanned log file");
            files_scanned += 1;
            skipped_lines += skipped;
        }

        let (users, server_stops) = store.into_parts();
        let users = users
            .into_iter()
            .filter(|(_, events)| events.has_starts())
            .map(|(user, events)| {
                let (starts, ends) = events.into_sorted();
                let sessions = match_sessions(&starts, &ends, &self.range);
                (user, sessions)
            })
            .collect();

        Ok(AnalysisReport {
            result: AnalysisResult { users },
            server_stops,
            files_scanned,
            skipped_lines,
        })
    }

    /// Lists dated log files in file-name order.
    fn log_files(&self) -> Result<Vec<(PathBuf, LogDate)>, AnalyzeError> {
        let dir = &self.config.log_directory;
        let unreadable = |source| AnalyzeError::LogDirectoryUnreadable {
            path: dir.clone(),
            source,
        };

        let mut files = Vec::new();
        for entry in std::fs::read_dir(dir).map_err(unreadable)? {
            let path = entry.map_err(unreadable)?.path();
            if !path.is_file() {
                continue;
            }
            match file_date(&path) {
                Some(log_date) => files.push((path, log_date)),
                None => {
                    tracing::warn!(path = ?path, "skipping file without a log date in its name");
                }
            }
        }

        files.sort_by(|(a, _), (b, _)| a.cmp(b));
        Ok(files)
    }
}

/// Derives the log date from the first characters of a file name.
fn file_date(path: &Path) -> Option<LogDate> {
    let name = path.file_name()?.to_str()?;
    let prefix = name.get(..DATE_PREFIX_LEN).unwrap_or(name);
    prefix.parse().ok()
}

fn is_gzip(path: &Path) -> bool {
    path.extension().is_some_and(|e| e == "gz")
}

/// Reads a whole log file, decompressing `.gz` files.
///
/// Concatenated gzip members are all decoded.
fn read_log_file(path: &Path) -> Result<String, AnalyzeError> {
    let unreadable = |source| AnalyzeError::LogFileUnreadable {
        path: path.to_path_buf(),
        source,
    };

    let file = File::open(path).map_err(unreadable)?;
    let mut reader = BufReader::with_capacity(BUFFER_SIZE, file);
    let mut bytes = Vec::new();
    let read = if is_gzip(path) {
        MultiGzDecoder::new(reader).read_to_end(&mut bytes)
    } else {
        reader.read_to_end(&mut bytes)
    };
    read.map_err(unreadable)?;

    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Classifies every line into `store`, returning the number skipped.
fn scan_lines(
    classifier: &LineClassifier,
    contents: &str,
    date: NaiveDate,
    path: &Path,
    store: &mut EventStore,
) -> usize {
    let mut skipped = 0;
    for (index, line) in contents.lines().enumerate() {
        match classifier.classify(line, date) {
            Ok(event) => store.record(event),
            Err(e) => {
                tracing::warn!(path = ?path, line = index + 1, error = %e, "skipping malformed log line");
                skipped += 1;
            }
        }
    }
    skipped
}
