//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Player presence reports from game server logs.
///
/// Reconstructs when each player was online from the server's join and
/// leave messages.
#[derive(Debug, Parser)]
#[command(name = "pt", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory holding the server logs (overrides configuration).
    #[arg(long, global = true)]
    pub log_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List reconstructed player sessions.
    Sessions {
        /// Only report presence after this time (ISO 8601, YYYY-MM-DD, or "2 days ago").
        #[arg(long)]
        start: Option<String>,

        /// Only report presence before this time (ISO 8601, YYYY-MM-DD, or "2 days ago").
        /// A bare date includes that whole day.
        #[arg(long)]
        end: Option<String>,

        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// List server shutdowns found in the logs.
    Stops {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },
}
