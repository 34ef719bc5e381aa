//! Dashboard command - progress across every goal window.

use anyhow::Result;
use stepquest_service::AppState;

use crate::cli::OutputFormat;
use crate::format::{FormatOptions, format_snapshot_text};

/// Execute the dashboard command.
///
/// Tries a quiet live refresh first; a missing or failing live source
/// only means the dashboard shows what is already stored.
pub async fn cmd_dashboard(
    state: &AppState,
    format: OutputFormat,
    opts: &FormatOptions,
) -> Result<()> {
    let today = state.today();
    let snapshot = match state.reconciler.auto_refresh_today(today).await {
        Some(snapshot) => snapshot,
        // Surface the underlying error
        None => state.reconciler.metrics().snapshot(today)?,
    };

    let output = match format {
        OutputFormat::Json => opts.as_json(&snapshot)?,
        OutputFormat::Text => format_snapshot_text(&snapshot, opts),
    };
    print!("{}", output);
    Ok(())
}
