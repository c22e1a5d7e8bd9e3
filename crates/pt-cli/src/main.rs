use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use pt_cli::commands::{sessions, stops};
use pt_cli::{Cli, Commands, Config};

/// Load config and apply command-line overrides.
fn load_config(config_path: Option<&Path>, log_dir: Option<&Path>) -> Result<Config> {
    let mut config = Config::load_from(config_path).context("failed to load configuration")?;
    if let Some(dir) = log_dir {
        config.log_directory = dir.to_path_buf();
    }
    tracing::debug!(?config, "loaded configuration");
    Ok(config)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Logs go to stderr so JSON output stays clean
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    let mut stdout = std::io::stdout().lock();

    match &cli.command {
        Some(Commands::Sessions { start, end, json }) => {
            let config = load_config(cli.config.as_deref(), cli.log_dir.as_deref())?;
            sessions::run(
                &mut stdout,
                &config,
                start.as_deref(),
                end.as_deref(),
                *json,
            )?;
        }
        Some(Commands::Stops { json }) => {
            let config = load_config(cli.config.as_deref(), cli.log_dir.as_deref())?;
            stops::run(&mut stdout, &config, *json)?;
        }
        None => {
            // No subcommand, show help
            use clap::CommandFactory;
            Cli::command().print_help()?;
            println!();
        }
    }

    Ok(())
}
