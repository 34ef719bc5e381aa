//! Goal command - show or change the yearly target.

use anyhow::{Context, Result};
use stepquest_core::DerivedGoals;
use stepquest_service::AppState;
use stepquest_store::GoalPreferences;

use crate::cli::{GoalAction, OutputFormat};
use crate::format::{FormatOptions, GoalJson, format_goal_text, format_snapshot_text};
use crate::style;

/// Execute a goal subcommand.
///
/// `set` prints a fresh snapshot so the new pace is visible immediately.
pub fn cmd_goal(
    state: &AppState,
    action: GoalAction,
    format: OutputFormat,
    opts: &FormatOptions,
) -> Result<()> {
    let today = state.today();
    let output = match action {
        GoalAction::Show => {
            let yearly = state
                .store
                .yearly_goal()
                .context("Failed to read yearly goal")?;
            let derived = DerivedGoals::derive(yearly, today);
            match format {
                OutputFormat::Json => opts.as_json(&GoalJson { yearly, derived })?,
                OutputFormat::Text => format_goal_text(yearly, &derived, opts),
            }
        }
        GoalAction::Set { steps } => {
            state
                .store
                .set_yearly_goal(steps)
                .context("Failed to save yearly goal")?;

            let snapshot = state.reconciler.metrics().snapshot(today)?;
            match format {
                OutputFormat::Json => opts.as_json(&snapshot)?,
                OutputFormat::Text => {
                    let mut out = style::format_success(
                        &format!("Yearly goal set to {} steps", steps),
                        opts.no_color,
                    );
                    out.push_str("\n\n");
                    out.push_str(&format_snapshot_text(&snapshot, opts));
                    out
                }
            }
        }
    };
    print!("{}", output);
    Ok(())
}
