//! `stepquest`: track daily steps against a yearly goal.
//!
//! Every command opens the configured step store, runs one operation and
//! exits. `watch` is the exception: it runs the background collector in the
//! foreground until interrupted.

mod cli;
mod commands;
mod format;
mod style;
mod util;

use std::io;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use stepquest_core::local_offset;

use crate::cli::{Cli, Commands};
use crate::commands::{
    ExportArgs, ListArgs, cmd_dashboard, cmd_export, cmd_goal, cmd_import, cmd_list, cmd_pace,
    cmd_sync, cmd_today, cmd_watch,
};
use crate::util::{format_options, open_state};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // When quiet mode is enabled, suppress info-level logging
    let filter = if cli.quiet {
        EnvFilter::new("warn")
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_ansi(!cli.no_color)
        .init();

    // Must run before the runtime spawns worker threads
    let offset = local_offset();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;

    runtime.block_on(run(cli, offset))
}

async fn run(cli: Cli, offset: time::UtcOffset) -> Result<()> {
    let state = open_state(&cli, offset)?;
    let opts = format_options(&cli);
    let format = cli.format();

    match cli.command {
        Commands::Sync => cmd_sync(&state, format, &opts, cli.quiet).await,
        Commands::Today => cmd_today(&state, format, &opts).await,
        Commands::Import { file } => cmd_import(&state, &file, format, &opts),
        Commands::Export { output, format: file_format } => cmd_export(
            &state,
            ExportArgs {
                output,
                format: file_format,
                quiet: cli.quiet,
            },
            &opts,
        ),
        Commands::Dashboard => cmd_dashboard(&state, format, &opts).await,
        Commands::Pace => cmd_pace(&state, format, &opts),
        Commands::List { by, limit } => cmd_list(&state, ListArgs { by, limit }, format, &opts),
        Commands::Goal { action } => cmd_goal(&state, action, format, &opts),
        Commands::Watch { count } => cmd_watch(state, count, format, &opts).await,
    }
}
