//! Configuration loading and management.

use std::path::{Path, PathBuf};

use chrono_tz::Tz;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use pt_core::AnalyzerConfig;
use serde::{Deserialize, Serialize};

/// Directory the server writes its logs to unless configured otherwise.
const DEFAULT_LOG_DIRECTORY: &str = "/home/minecraft/logs";

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Directory holding the server's log files.
    pub log_directory: PathBuf,

    /// Zone the server writes log timestamps in.
    pub recording_zone: Tz,

    /// Zone sessions are reported in.
    pub display_zone: Tz,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_directory: PathBuf::from(DEFAULT_LOG_DIRECTORY),
            recording_zone: chrono_tz::UTC,
            display_zone: host_zone(),
        }
    }
}

impl Config {
    /// Loads configuration, optionally from a specific file.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Load from default config location
        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        // Load from specified config file
        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        // Load from environment variables (PT_*)
        figment = figment.merge(Env::prefixed("PT_"));

        figment.extract()
    }

    /// Configuration for one analysis run.
    pub fn analyzer_config(&self) -> AnalyzerConfig {
        AnalyzerConfig {
            log_directory: self.log_directory.clone(),
            recording_zone: self.recording_zone,
            display_zone: self.display_zone,
        }
    }
}

/// The host's IANA zone, or UTC if it cannot be determined.
fn host_zone() -> Tz {
    iana_time_zone::get_timezone()
        .ok()
        .and_then(|name| name.parse().ok())
        .unwrap_or(chrono_tz::UTC)
}

/// Returns the platform-specific config directory for pt.
///
/// On Linux: `~/.config/pt`
fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("pt"))
}
