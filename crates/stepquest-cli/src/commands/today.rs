//! Today command - refresh only today's running total.

use anyhow::Result;
use serde::Serialize;
use stepquest_core::{DailySteps, MetricsSnapshot, SyncOutcome, group_thousands};
use stepquest_service::AppState;

use crate::cli::OutputFormat;
use crate::format::{FormatOptions, format_outcome_line, format_pace_line};

#[derive(Serialize)]
struct TodayJson {
    live: SyncOutcome<DailySteps>,
    snapshot: MetricsSnapshot,
}

/// Execute the today command.
pub async fn cmd_today(state: &AppState, format: OutputFormat, opts: &FormatOptions) -> Result<()> {
    let today = state.today();
    let live = state.reconciler.sync_today(today).await?;
    let snapshot = state.reconciler.metrics().snapshot(today)?;

    let output = match format {
        OutputFormat::Json => opts.as_json(&TodayJson { live, snapshot })?,
        OutputFormat::Text => {
            let mut out = format_outcome_line(
                "Today",
                &live,
                |r| format!("{} steps", group_thousands(r.steps)),
                opts,
            );
            out.push_str(&format!(
                "{} of {} daily goal ({}%)\n",
                group_thousands(snapshot.today.steps),
                group_thousands(snapshot.today.goal),
                snapshot.today.percent
            ));
            out.push_str(&format_pace_line(&snapshot, opts));
            out
        }
    };
    print!("{}", output);
    Ok(())
}
