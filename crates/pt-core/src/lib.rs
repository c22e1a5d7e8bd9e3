//! Core session reconstruction for game server logs.
//!
//! This crate contains the fundamental types and logic for:
//! - Timestamp normalization: log clock readings to display-zone instants
//! - Line classification: join, leave, and server-stop events
//! - Interval matching: pairing joins with leaves into per-user sessions
//! - Range clipping: bounding sessions to a reporting window

pub mod analyzer;
pub mod classify;
mod matcher;
pub mod range;
mod session;
pub mod store;
pub mod timestamp;

pub use analyzer::{
    AnalysisReport, AnalysisResult, AnalyzeError, AnalyzerConfig, SessionAnalyzer,
};
pub use classify::{LineClassifier, LineError, LogEvent};
pub use matcher::match_sessions;
pub use range::{RangeError, ReportRange};
pub use session::Session;
pub use store::{EventStore, UserEvents};
pub use timestamp::{LogDate, TimestampError, TimestampNormalizer};
