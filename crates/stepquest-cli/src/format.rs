//! Output formatting for text and JSON output.

use anyhow::Result;
use owo_colors::OwoColorize;
use serde::Serialize;
use tabled::builder::Builder;

use stepquest_core::{
    DaySummary, DerivedGoals, ImportReport, MetricsSnapshot, MonthSummary, RefreshReport,
    SyncOutcome, WeekSummary, YearlyGoal, group_thousands,
};
use stepquest_types::format_date;

use crate::cli::StyleMode;
use crate::style;

/// Formatting options for output.
#[derive(Debug, Clone, Copy)]
pub struct FormatOptions {
    /// Disable colored output.
    pub no_color: bool,
    /// Use compact JSON output (no pretty-printing).
    pub compact: bool,
    /// Visual styling mode.
    pub style: StyleMode,
}

impl FormatOptions {
    pub fn new(no_color: bool, style: StyleMode) -> Self {
        // Plain mode automatically disables colors for pipe-friendliness
        Self {
            no_color: no_color || style == StyleMode::Plain,
            compact: false,
            style,
        }
    }

    /// Create with compact JSON option.
    pub fn with_compact(mut self, compact: bool) -> Self {
        self.compact = compact;
        self
    }

    /// Check if rich styling is enabled.
    pub fn is_rich(&self) -> bool {
        self.style == StyleMode::Rich
    }

    /// Serialize value to JSON string, respecting compact option.
    pub fn as_json<T: Serialize>(&self, value: &T) -> Result<String> {
        let json = if self.compact {
            serde_json::to_string(value)?
        } else {
            serde_json::to_string_pretty(value)?
        };
        Ok(json + "\n")
    }
}

fn steps(n: u64) -> String {
    group_thousands(n)
}

fn finish_table(builder: Builder, opts: &FormatOptions) -> String {
    let mut table = builder.build();
    style::apply_table_style(&mut table, opts.style);
    let mut out = table.to_string();
    out.push('\n');
    out
}

// ============================================================================
// Dashboard
// ============================================================================

/// The five goal windows plus pace.
#[must_use]
pub fn format_snapshot_text(snapshot: &MetricsSnapshot, opts: &FormatOptions) -> String {
    let mut output = style::format_title(
        &format!("Steps on {}", format_date(snapshot.date)),
        opts.no_color,
    );
    output.push_str("\n\n");

    let mut builder = Builder::default();
    builder.push_record(["Window", "Steps", "Goal", "Progress"]);
    for (label, window) in snapshot.windows() {
        let progress = if opts.is_rich() {
            format!(
                "{} {:>3}%",
                style::format_percent_bar(window.display_percent(), opts.style, opts.no_color),
                window.percent
            )
        } else {
            format!("{}%", window.percent)
        };
        builder.push_record([
            label.to_string(),
            steps(window.steps),
            steps(window.goal),
            progress,
        ]);
    }
    output.push_str(&finish_table(builder, opts));
    output.push('\n');
    output.push_str(&format_pace_line(snapshot, opts));
    output
}

/// One line: `Pace: 10000 steps behind (goal 3,000,000/year)`.
#[must_use]
pub fn format_pace_line(snapshot: &MetricsSnapshot, opts: &FormatOptions) -> String {
    format!(
        "Pace: {} (goal {}/year)\n",
        style::format_pace_colored(&snapshot.pace(), opts.no_color),
        steps(snapshot.yearly_goal.get())
    )
}

/// Year-to-date progress against the expected total.
#[must_use]
pub fn format_pace_text(snapshot: &MetricsSnapshot, opts: &FormatOptions) -> String {
    let expected = (snapshot.year.steps as i64).saturating_sub(snapshot.pace_steps);
    let mut output = String::new();
    output.push_str(&format!(
        "Year to date: {} steps\n",
        steps(snapshot.year.steps)
    ));
    output.push_str(&format!(
        "Expected by {}: {} steps\n",
        format_date(snapshot.date),
        steps(expected.max(0) as u64)
    ));
    output.push_str(&format_pace_line(snapshot, opts));
    output
}

/// JSON shape for `pace`.
#[derive(Debug, Serialize)]
pub struct PaceJson {
    pub date: String,
    pub year_to_date: u64,
    pub pace_steps: i64,
    pub status: String,
    pub yearly_goal: u64,
}

impl From<&MetricsSnapshot> for PaceJson {
    fn from(snapshot: &MetricsSnapshot) -> Self {
        Self {
            date: format_date(snapshot.date),
            year_to_date: snapshot.year.steps,
            pace_steps: snapshot.pace_steps,
            status: snapshot.pace().status.to_string(),
            yearly_goal: snapshot.yearly_goal.get(),
        }
    }
}

// ============================================================================
// Sync and import reports
// ============================================================================

/// One status line for a channel outcome.
pub fn format_outcome_line<T>(
    label: &str,
    outcome: &SyncOutcome<T>,
    describe: impl FnOnce(&T) -> String,
    opts: &FormatOptions,
) -> String {
    let line = match outcome {
        SyncOutcome::Synced(value) => {
            style::format_success(&format!("{}: {}", label, describe(value)), opts.no_color)
        }
        SyncOutcome::Empty => {
            style::format_info(&format!("{}: no data reported", label), opts.no_color)
        }
        SyncOutcome::SourceUnavailable(e) => {
            style::format_warning(&format!("{}: {}", label, e), opts.no_color)
        }
    };
    line + "\n"
}

/// Per-channel lines for a refresh, followed by the dashboard.
#[must_use]
pub fn format_refresh_text(report: &RefreshReport, opts: &FormatOptions) -> String {
    let mut output = format_outcome_line(
        "History",
        &report.historical,
        |n| format!("{} days synced", n),
        opts,
    );
    output.push_str(&format_outcome_line(
        "Today",
        &report.live,
        |r| format!("{} steps", steps(r.steps)),
        opts,
    ));
    output.push('\n');
    output.push_str(&format_snapshot_text(&report.snapshot, opts));
    output
}

/// Summary of an import, listing every rejected row.
#[must_use]
pub fn format_import_text(report: &ImportReport, opts: &FormatOptions) -> String {
    let mut output = style::format_success(
        &format!(
            "Imported {} of {} valid rows ({} already recorded)",
            report.imported, report.parsed, report.skipped_existing
        ),
        opts.no_color,
    );
    output.push('\n');

    if !report.rejected.is_empty() {
        output.push_str(&style::format_warning(
            &format!("{} rows rejected:", report.rejected.len()),
            opts.no_color,
        ));
        output.push('\n');
        for row in &report.rejected {
            let line = format!("  line {}: {}", row.line, row.error);
            if opts.no_color {
                output.push_str(&line);
            } else {
                output.push_str(&format!("{}", line.dimmed()));
            }
            output.push('\n');
        }
    }
    output
}

// ============================================================================
// Lists
// ============================================================================

fn truncation_note(shown: usize, total: usize) -> String {
    if shown < total {
        format!("... and {} more (use --limit 0 for all)\n", total - shown)
    } else {
        String::new()
    }
}

fn limited<T>(items: &[T], limit: usize) -> &[T] {
    if limit == 0 {
        items
    } else {
        &items[..limit.min(items.len())]
    }
}

#[must_use]
pub fn format_days_text(days: &[DaySummary], limit: usize, opts: &FormatOptions) -> String {
    let shown = limited(days, limit);
    let mut builder = Builder::default();
    builder.push_record(["Date", "Steps", "Goal", "Met"]);
    for day in shown {
        builder.push_record([
            format_date(day.date),
            steps(day.steps),
            steps(day.goal),
            style::goal_mark(day.goal_met, opts.no_color),
        ]);
    }
    finish_table(builder, opts) + &truncation_note(shown.len(), days.len())
}

#[must_use]
pub fn format_weeks_text(weeks: &[WeekSummary], limit: usize, opts: &FormatOptions) -> String {
    let shown = limited(weeks, limit);
    let mut builder = Builder::default();
    builder.push_record(["Week", "Total", "Goal", "Met"]);
    for week in shown {
        builder.push_record([
            format!("{} .. {}", format_date(week.week_start), format_date(week.week_end)),
            steps(week.total),
            steps(week.goal),
            style::goal_mark(week.goal_met, opts.no_color),
        ]);
    }
    finish_table(builder, opts) + &truncation_note(shown.len(), weeks.len())
}

#[must_use]
pub fn format_months_text(months: &[MonthSummary], limit: usize, opts: &FormatOptions) -> String {
    let shown = limited(months, limit);
    let mut builder = Builder::default();
    builder.push_record(["Month", "Total", "Goal", "Percent", "Met"]);
    for month in shown {
        builder.push_record([
            month.label(),
            steps(month.total),
            steps(month.goal),
            format!("{}%", month.percent),
            style::goal_mark(month.goal_met, opts.no_color),
        ]);
    }
    finish_table(builder, opts) + &truncation_note(shown.len(), months.len())
}

// ============================================================================
// Goal
// ============================================================================

/// JSON shape for `goal show`.
#[derive(Debug, Serialize)]
pub struct GoalJson {
    pub yearly: YearlyGoal,
    pub derived: DerivedGoals,
}

#[must_use]
pub fn format_goal_text(goal: YearlyGoal, derived: &DerivedGoals, opts: &FormatOptions) -> String {
    let mut output = style::format_title("Step goals", opts.no_color);
    output.push_str("\n\n");

    let mut builder = Builder::default();
    builder.push_record(["Period", "Steps"]);
    builder.push_record(["Year".to_string(), steps(goal.get())]);
    builder.push_record(["This month".to_string(), steps(derived.monthly)]);
    builder.push_record(["30 days".to_string(), steps(derived.last30)]);
    builder.push_record(["7 days".to_string(), steps(derived.last7)]);
    builder.push_record(["Day".to_string(), steps(derived.daily)]);
    output.push_str(&finish_table(builder, opts));
    output
}
