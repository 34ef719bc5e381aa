//! Pace command.

use anyhow::Result;
use stepquest_service::AppState;

use crate::cli::OutputFormat;
use crate::format::{FormatOptions, PaceJson, format_pace_text};

/// Execute the pace command.
pub fn cmd_pace(state: &AppState, format: OutputFormat, opts: &FormatOptions) -> Result<()> {
    let snapshot = state.reconciler.metrics().snapshot(state.today())?;
    let output = match format {
        OutputFormat::Json => opts.as_json(&PaceJson::from(&snapshot))?,
        OutputFormat::Text => format_pace_text(&snapshot, opts),
    };
    print!("{}", output);
    Ok(())
}
