//! Visual styling utilities for the CLI.
//!
//! This module provides consistent styling across all CLI output including:
//! - Spinners for network operations
//! - Progress bars for goal windows
//! - Pace colouring
//! - Table formatting

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use stepquest_types::{Pace, PaceStatus};

use crate::cli::StyleMode;

// ============================================================================
// Spinners
// ============================================================================

/// Standard spinner tick characters (Braille dots animation)
const SPINNER_TICK_CHARS: &str = "⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏";

/// Standard spinner tick interval
const SPINNER_TICK_MS: u64 = 80;

fn spinner_style() -> ProgressStyle {
    ProgressStyle::default_spinner()
        .template("{spinner:.cyan} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_chars(SPINNER_TICK_CHARS)
}

/// Create a spinner for a long-running operation.
pub fn operation_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(spinner_style());
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(SPINNER_TICK_MS));
    pb
}

// ============================================================================
// Goal Progress
// ============================================================================

/// Width of a percentage bar in cells.
pub const BAR_WIDTH: usize = 20;

/// Percentage at which a window counts as "nearly there".
const NEAR_GOAL_PERCENT: u64 = 75;

/// Render `percent` (clamped to 100) as a bar.
///
/// Plain mode uses ASCII so the output survives pipes.
pub fn format_percent_bar(percent: u64, style: StyleMode, no_color: bool) -> String {
    let clamped = percent.min(100) as usize;
    let filled = clamped * BAR_WIDTH / 100;
    let empty = BAR_WIDTH - filled;

    let (full, blank) = if style == StyleMode::Plain {
        ("#", ".")
    } else {
        ("█", "░")
    };
    let bar = format!("{}{}", full.repeat(filled), blank.repeat(empty));

    if no_color {
        bar
    } else if percent >= 100 {
        format!("{}", bar.green())
    } else if percent >= NEAR_GOAL_PERCENT {
        format!("{}", bar.yellow())
    } else {
        format!("{}", bar.cyan())
    }
}

/// Pace text coloured by direction, bold once the gap is large.
pub fn format_pace_colored(pace: &Pace, no_color: bool) -> String {
    let text = pace.to_string();
    if no_color {
        return text;
    }

    let strong = pace.intensity() >= 0.5;
    match pace.status {
        PaceStatus::Ahead if strong => format!("{}", text.green().bold()),
        PaceStatus::Ahead => format!("{}", text.green()),
        PaceStatus::Behind if strong => format!("{}", text.red().bold()),
        PaceStatus::Behind => format!("{}", text.yellow()),
        PaceStatus::OnPace => format!("{}", text.cyan()),
    }
}

/// Mark for a met goal in tables.
pub fn goal_mark(met: bool, no_color: bool) -> String {
    match (met, no_color) {
        (true, true) => "yes".to_string(),
        (false, true) => "-".to_string(),
        (true, false) => format!("{}", "✓".green()),
        (false, false) => format!("{}", "·".dimmed()),
    }
}

// ============================================================================
// Messages
// ============================================================================

/// Format a success message.
pub fn format_success(message: &str, no_color: bool) -> String {
    if no_color {
        format!("[OK] {}", message)
    } else {
        format!("{} {}", "[OK]".green(), message)
    }
}

/// Format an info message.
pub fn format_info(message: &str, no_color: bool) -> String {
    if no_color {
        format!("[--] {}", message)
    } else {
        format!("{} {}", "[--]".cyan(), message)
    }
}

/// Format a warning message.
pub fn format_warning(message: &str, no_color: bool) -> String {
    if no_color {
        format!("[!!] {}", message)
    } else {
        format!("{} {}", "[!!]".yellow(), message)
    }
}

/// Format a title header.
pub fn format_title(title: &str, no_color: bool) -> String {
    let rule = "━".repeat(title.chars().count());
    if no_color {
        format!("{}\n{}", title, rule)
    } else {
        format!("{}\n{}", title.bold(), rule.dimmed())
    }
}

/// Apply table style based on StyleMode.
pub fn apply_table_style(table: &mut tabled::Table, style: StyleMode) {
    use tabled::settings::Style;
    match style {
        StyleMode::Rich | StyleMode::Minimal => {
            table.with(Style::rounded());
        }
        StyleMode::Plain => {
            table.with(Style::blank());
        }
    }
}
