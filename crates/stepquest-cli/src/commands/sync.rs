//! Sync command - reconcile history and today's total, then show progress.

use std::io::{self, IsTerminal};

use anyhow::{Context, Result};
use stepquest_service::AppState;
use tracing::info;

use crate::cli::OutputFormat;
use crate::format::{FormatOptions, format_refresh_text};
use crate::style;

/// Execute the sync command.
///
/// Unavailable sources are reported in the output, not as a failure.
pub async fn cmd_sync(
    state: &AppState,
    format: OutputFormat,
    opts: &FormatOptions,
    quiet: bool,
) -> Result<()> {
    let today = state.today();
    let window = state.reconciler.history_window(today);
    info!("Syncing {} through {}", window.start, window.end);

    let spinner = (format == OutputFormat::Text && !quiet && io::stderr().is_terminal())
        .then(|| style::operation_spinner("Syncing step data..."));

    let result = state.reconciler.refresh(today).await;
    if let Some(pb) = &spinner {
        pb.finish_and_clear();
    }
    let report = result.context("Sync failed")?;

    let output = match format {
        OutputFormat::Json => opts.as_json(&report)?,
        OutputFormat::Text => format_refresh_text(&report, opts),
    };
    print!("{}", output);
    Ok(())
}
