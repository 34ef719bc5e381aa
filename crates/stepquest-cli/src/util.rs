//! Utility functions for CLI operations.

use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use stepquest_service::{AppState, Config, expand_home};
use time::UtcOffset;
use tracing::debug;

use crate::cli::Cli;
use crate::format::FormatOptions;

/// Load the configuration named on the command line.
///
/// An explicit `--config` file must exist; the default location falls back
/// to built-in defaults when missing. `--database` overrides
/// `storage.path`, with a leading `~` expanded as in the file.
pub fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => {
            if !path.exists() {
                bail!("Config file not found: {}", path.display());
            }
            Config::load(path)
                .with_context(|| format!("Failed to load config from {}", path.display()))?
        }
        None => Config::load_default().context("Failed to load default config")?,
    };

    if let Some(db) = &cli.database {
        config.storage.path = expand_home(db.clone());
    }

    config.validate().context("Invalid configuration")?;
    Ok(config)
}

/// Open the store and wire the configured sources.
pub fn open_state(cli: &Cli, offset: UtcOffset) -> Result<Arc<AppState>> {
    let config = load_config(cli)?;
    debug!("Using database {}", config.storage.path.display());
    AppState::open(config, offset).context("Failed to open step store")
}

/// Formatting options from the global flags.
pub fn format_options(cli: &Cli) -> FormatOptions {
    FormatOptions::new(cli.no_color, cli.style).with_compact(cli.compact)
}

/// Write output to file or stdout.
pub fn write_output(output: Option<&PathBuf>, content: &str) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write to {}", path.display()))?;
        }
        None => {
            print!("{}", content);
            io::stdout().flush()?;
        }
    }
    Ok(())
}
