//! CLI argument definitions using clap.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use stepquest_types::YearlyGoal;

/// Output format for commands
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// File format for `export`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum ExportFileFormat {
    #[default]
    Csv,
    Json,
}

/// Visual styling mode for output
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum StyleMode {
    /// Standard styling with colors
    Minimal,
    /// Rich styling with tables and progress bars (default)
    #[default]
    Rich,
    /// Plain text with no decorations (for scripting)
    Plain,
}

/// Grouping for `list`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum ListGrouping {
    #[default]
    Day,
    Week,
    Month,
}

#[derive(Parser)]
#[command(name = "stepquest")]
#[command(author, version, about = "Track daily steps against a yearly goal", long_about = None)]
pub struct Cli {
    /// Configuration file (defaults to the platform config directory)
    #[arg(long, global = true, env = "STEPQUEST_CONFIG")]
    pub config: Option<PathBuf>,

    /// Database file (overrides `storage.path` from the config)
    #[arg(long, global = true, env = "STEPQUEST_DB")]
    pub database: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Output compact JSON (no pretty-printing)
    #[arg(long, global = true)]
    pub compact: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,

    /// Visual styling mode (minimal, rich, plain)
    #[arg(
        long,
        global = true,
        value_enum,
        default_value = "rich",
        env = "STEPQUEST_STYLE"
    )]
    pub style: StyleMode,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Output format selected by `--json`.
    pub fn format(&self) -> OutputFormat {
        if self.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Sync history and today's total, then show the dashboard
    Sync,

    /// Sync only today's running total
    Today,

    /// Import `date,steps` CSV without overwriting recorded days
    Import {
        /// CSV file, or `-` for stdin
        file: PathBuf,
    },

    /// Export every recorded day, newest first
    Export {
        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// File format
        #[arg(short, long, value_enum, default_value = "csv")]
        format: ExportFileFormat,
    },

    /// Show progress for today, the last 7 days, the month, the last 30 days and the year
    Dashboard,

    /// Show how far ahead or behind the yearly goal you are
    Pace,

    /// List recorded steps by day, week or month
    List {
        /// Grouping
        #[arg(short, long, value_enum, default_value = "day")]
        by: ListGrouping,

        /// Show at most this many rows (0 for all)
        #[arg(short = 'n', long, default_value = "0")]
        limit: usize,
    },

    /// Show or set the yearly step goal
    Goal {
        #[command(subcommand)]
        action: GoalAction,
    },

    /// Run the background collector in the foreground until Ctrl-C
    Watch {
        /// Number of snapshots to print before exiting (0 for unlimited)
        #[arg(short = 'n', long, default_value = "0")]
        count: u32,
    },
}

/// Goal subcommands
#[derive(Debug, Clone, Subcommand)]
pub enum GoalAction {
    /// Show the yearly goal and the goals derived from it
    Show,

    /// Set the yearly goal
    Set {
        /// Steps per year (underscores and commas allowed)
        #[arg(value_parser = parse_goal)]
        steps: YearlyGoal,
    },
}

fn parse_goal(s: &str) -> Result<YearlyGoal, String> {
    s.parse().map_err(|e| format!("{}", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_goal() {
        assert_eq!(parse_goal("3,650,000").unwrap().get(), 3_650_000);
        assert_eq!(parse_goal("1_000").unwrap().get(), 1000);
        assert!(parse_goal("0").is_err());
        assert!(parse_goal("lots").is_err());
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["stepquest", "list", "--by", "week", "--json", "-q"]).unwrap();
        assert_eq!(cli.format(), OutputFormat::Json);
        assert!(cli.quiet);
        assert!(matches!(
            cli.command,
            Commands::List {
                by: ListGrouping::Week,
                limit: 0
            }
        ));
    }
}
