//! Player presence CLI library.
//!
//! This crate provides the CLI interface for reporting player sessions.

mod cli;
pub mod commands;
mod config;

pub use cli::{Cli, Commands};
pub use config::Config;
