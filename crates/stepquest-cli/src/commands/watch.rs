//! Watch command - run the collector in the foreground.

use std::sync::Arc;

use anyhow::Result;
use stepquest_core::group_thousands;
use stepquest_service::{AppState, Channel, Collector, SnapshotEvent};
use stepquest_types::format_date;
use time::OffsetDateTime;
use tokio::sync::broadcast::error::RecvError;
use tracing::warn;

use crate::cli::OutputFormat;
use crate::format::FormatOptions;
use crate::style;

/// Execute the watch command.
///
/// Prints one line per snapshot until Ctrl-C, or until `count` snapshots
/// have been printed when `count` is non-zero.
pub async fn cmd_watch(
    state: Arc<AppState>,
    count: u32,
    format: OutputFormat,
    opts: &FormatOptions,
) -> Result<()> {
    if state.config.read().await.source.is_none() {
        eprintln!(
            "{}",
            style::format_warning(
                "No [source] configured; snapshots will not be published",
                opts.no_color
            )
        );
    }

    // Subscribe before starting so the first ticks are not missed
    let mut snapshots = state.snapshots_tx.subscribe();
    let collector = Collector::new(Arc::clone(&state));
    let handle = collector.start().await;

    let mut printed = 0u32;
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                eprintln!("\nShutting down...");
                break;
            }
            event = snapshots.recv() => match event {
                Ok(event) => {
                    let line = match format {
                        OutputFormat::Json => opts.with_compact(true).as_json(&event)?,
                        OutputFormat::Text => format_watch_line(&event, opts),
                    };
                    print!("{}", line);
                    printed += 1;
                    if count > 0 && printed >= count {
                        break;
                    }
                }
                Err(RecvError::Lagged(n)) => warn!("Skipped {} snapshots", n),
                Err(RecvError::Closed) => break,
            }
        }
    }

    let started_at = state.collector.started_at();
    collector.stop();
    handle.join().await;

    if format == OutputFormat::Text {
        if let Some(started) = started_at {
            let elapsed = (OffsetDateTime::now_utc() - started).whole_seconds().max(0) as u64;
            eprintln!(
                "{}",
                style::format_info(
                    &format!("Watched for {}", format_uptime(elapsed)),
                    opts.no_color
                )
            );
        }
        for channel in [Channel::Live, Channel::Refresh] {
            if let Some(stats) = state.collector.stats(channel).await {
                eprintln!(
                    "{}",
                    style::format_info(
                        &format!(
                            "{}: {} passes, {} failed",
                            channel,
                            stats.success_count + stats.failure_count,
                            stats.failure_count
                        ),
                        opts.no_color
                    )
                );
            }
        }
    }
    Ok(())
}

fn format_watch_line(event: &SnapshotEvent, opts: &FormatOptions) -> String {
    let snapshot = &event.snapshot;
    format!(
        "[{}] {:<7} today {} ({}%)  {}\n",
        format_date(snapshot.date),
        event.channel.to_string(),
        group_thousands(snapshot.today.steps),
        snapshot.today.percent,
        style::format_pace_colored(&snapshot.pace(), opts.no_color)
    )
}

/// Format uptime in human-readable form.
fn format_uptime(seconds: u64) -> String {
    if seconds < 60 {
        format!("{}s", seconds)
    } else if seconds < 3600 {
        format!("{}m {}s", seconds / 60, seconds % 60)
    } else {
        format!("{}h {}m", seconds / 3600, (seconds % 3600) / 60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::StyleMode;
    use std::sync::Arc;
    use stepquest_core::MetricsAggregator;
    use stepquest_store::MemoryStore;
    use time::macros::date;

    #[test]
    fn test_format_uptime() {
        assert_eq!(format_uptime(42), "42s");
        assert_eq!(format_uptime(125), "2m 5s");
        assert_eq!(format_uptime(7260), "2h 1m");
    }

    #[test]
    fn test_watch_line() {
        let store = Arc::new(MemoryStore::with_records([stepquest_core::DailySteps::new(
            date!(2024 - 01 - 02),
            4110,
        )]));
        let snapshot = MetricsAggregator::new(store.clone(), store)
            .snapshot(date!(2024 - 01 - 02))
            .unwrap();
        let event = SnapshotEvent {
            channel: Channel::Live,
            snapshot,
        };
        let line = format_watch_line(&event, &FormatOptions::new(true, StyleMode::Plain));
        assert_eq!(
            line,
            "[2024-01-02] live    today 4,110 (50%)  12328 steps behind\n"
        );
    }
}
