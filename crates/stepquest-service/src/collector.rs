//! Background step collector.
//!
//! Two independent loops share one [`AppState`]:
//!
//! - **live**: every `live.poll_interval` seconds, overwrite today with the
//!   live source's running total and publish a snapshot;
//! - **refresh**: every `history.refresh_interval` seconds, run a full
//!   reconcile (history, then live) and publish a snapshot.
//!
//! Overlapping passes are harmless because every write is an idempotent
//! replacement. Both loops exit at their next suspension point once the
//! stop signal is raised.

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};
use tracing::{debug, error, info, warn};

use stepquest_core::{MetricsSnapshot, SourceError, SyncOutcome};

use crate::state::{AppState, Channel, SnapshotEvent};

/// Consecutive failures logged at `warn` before going quiet.
const LOUD_FAILURES: u32 = 3;

/// Background collector driving the live and refresh passes.
pub struct Collector {
    state: Arc<AppState>,
}

impl Collector {
    /// Create a new collector.
    pub fn new(state: Arc<AppState>) -> Self {
        Self { state }
    }

    /// Start both loops.
    ///
    /// Returns immediately; collection happens in spawned tasks until
    /// [`Collector::stop`] is called.
    pub async fn start(&self) -> CollectorHandle {
        let (live_secs, refresh_secs) = {
            let config = self.state.config.read().await;
            (config.live.poll_interval, config.history.refresh_interval)
        };

        self.state.collector.reset_stop();
        self.state
            .collector
            .reset_stats(&[(Channel::Live, live_secs), (Channel::Refresh, refresh_secs)])
            .await;
        self.state.collector.set_running(true);

        info!(
            "Starting collector (live every {}s, refresh every {}s)",
            live_secs, refresh_secs
        );

        let tasks = [(Channel::Live, live_secs), (Channel::Refresh, refresh_secs)]
            .into_iter()
            .map(|(channel, secs)| {
                let state = Arc::clone(&self.state);
                tokio::spawn(async move {
                    collect_channel(state, channel, Duration::from_secs(secs)).await;
                })
            })
            .collect();

        CollectorHandle { tasks }
    }

    /// Signal both loops to stop.
    pub fn stop(&self) {
        info!("Stopping collector");
        self.state.collector.signal_stop();
    }
}

/// Join handle for the collector's tasks.
pub struct CollectorHandle {
    tasks: Vec<JoinHandle<()>>,
}

impl CollectorHandle {
    /// Wait for every task to finish.
    pub async fn join(self) {
        for result in join_all(self.tasks).await {
            if let Err(e) = result {
                error!("Collector task failed: {}", e);
            }
        }
    }
}

async fn collect_channel(state: Arc<AppState>, channel: Channel, period: Duration) {
    let mut stop_rx = state.collector.subscribe_stop();
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            changed = stop_rx.changed() => {
                if changed.is_err() || *stop_rx.borrow() {
                    break;
                }
                continue;
            }
        }
        if *stop_rx.borrow() {
            break;
        }

        let today = state.today();
        match run_pass(&state, channel, today).await {
            Ok(snapshot) => {
                state.collector.record_success(channel).await;
                debug!(
                    "{} pass: today={} pace={}",
                    channel, snapshot.today.steps, snapshot.pace_steps
                );
                let _ = state.snapshots_tx.send(SnapshotEvent { channel, snapshot });
            }
            Err(e) => {
                let failures = state.collector.record_failure(channel, e.to_string()).await;
                if failures <= LOUD_FAILURES {
                    warn!("{} pass failed: {} (attempt {})", channel, e, failures);
                } else if failures == LOUD_FAILURES + 1 {
                    error!(
                        "{} pass failed {} times in a row, continuing silently",
                        channel, failures
                    );
                }
            }
        }
    }

    debug!("{} loop stopped", channel);
}

async fn run_pass(
    state: &AppState,
    channel: Channel,
    today: time::Date,
) -> Result<MetricsSnapshot, CollectorError> {
    let reconciler = &state.reconciler;
    match channel {
        Channel::Live => {
            if let SyncOutcome::SourceUnavailable(e) = reconciler.sync_today(today).await? {
                return Err(CollectorError::Source(e));
            }
            Ok(reconciler.metrics().snapshot(today)?)
        }
        Channel::Refresh => {
            let report = reconciler.refresh(today).await?;
            if let SyncOutcome::SourceUnavailable(e) = report.historical {
                return Err(CollectorError::Source(e));
            }
            Ok(report.snapshot)
        }
    }
}

/// Collector errors.
#[derive(Debug, thiserror::Error)]
pub enum CollectorError {
    #[error("Source unavailable: {0}")]
    Source(SourceError),
    #[error(transparent)]
    Core(#[from] stepquest_core::Error),
}
