//! Application state shared by the collector and its callers.
//!
//! # Broadcast Channel Behavior
//!
//! Every snapshot the collector computes is sent on `snapshots_tx`.
//! Senders never block: a subscriber that falls more than
//! [`SNAPSHOT_BUFFER`] events behind loses the oldest ones and sees a
//! `Lagged` error on its next receive.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use serde::Serialize;
use time::{Date, OffsetDateTime, UtcOffset};
use tokio::sync::{RwLock, broadcast, watch};

use stepquest_core::{HttpStepSource, MetricsSnapshot, Reconciler, today_at};
use stepquest_store::Store;

use crate::config::Config;

/// Snapshot events buffered per subscriber.
pub const SNAPSHOT_BUFFER: usize = 64;

/// Shared application state.
pub struct AppState {
    /// The step store, also the goal preference collaborator.
    pub store: Arc<Store>,
    /// Configuration (RwLock for runtime updates).
    pub config: RwLock<Config>,
    /// Reconciler wired to the configured sources.
    pub reconciler: Reconciler,
    /// Broadcast channel for fresh snapshots.
    pub snapshots_tx: broadcast::Sender<SnapshotEvent>,
    /// Collector control state.
    pub collector: CollectorState,
    offset: UtcOffset,
}

impl AppState {
    /// Create application state from already-built parts.
    pub fn new(
        store: Arc<Store>,
        config: Config,
        reconciler: Reconciler,
        offset: UtcOffset,
    ) -> Arc<Self> {
        let (snapshots_tx, _) = broadcast::channel(SNAPSHOT_BUFFER);
        Arc::new(Self {
            store,
            config: RwLock::new(config),
            reconciler,
            snapshots_tx,
            collector: CollectorState::new(),
            offset,
        })
    }

    /// Open the configured database and wire the configured sources.
    ///
    /// `offset` is the local UTC offset used to decide what "today" is.
    pub fn open(config: Config, offset: UtcOffset) -> stepquest_core::Result<Arc<Self>> {
        let store = Arc::new(Store::open(&config.storage.path)?);
        let reconciler = build_reconciler(Arc::clone(&store), &config)?;
        Ok(Self::new(store, config, reconciler, offset))
    }

    /// Today's date at the configured offset.
    pub fn today(&self) -> Date {
        today_at(self.offset)
    }
}

/// Build a reconciler over `store` using the sources named in `config`.
///
/// Without a `[source]` section both channels report the source as not
/// installed.
pub fn build_reconciler(store: Arc<Store>, config: &Config) -> stepquest_core::Result<Reconciler> {
    let mut reconciler =
        Reconciler::new(store.clone(), store).history_days(config.history.days);

    if let Some(source) = &config.source {
        let http = Arc::new(HttpStepSource::new(&source.url, source.token.clone())?);
        reconciler = reconciler
            .with_historical(http.clone())
            .with_live(http);
    }

    Ok(reconciler)
}

/// The collector's two independent passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    /// Short-interval poll of today's running total.
    Live,
    /// Full reconcile of the historical window.
    Refresh,
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Channel::Live => write!(f, "live"),
            Channel::Refresh => write!(f, "refresh"),
        }
    }
}

/// A snapshot event for subscribers.
#[derive(Debug, Clone, Serialize)]
pub struct SnapshotEvent {
    /// The pass that produced the snapshot.
    pub channel: Channel,
    pub snapshot: MetricsSnapshot,
}

/// State for tracking and controlling the collector.
pub struct CollectorState {
    running: AtomicBool,
    /// Unix timestamp of the last start.
    started_at: AtomicU64,
    stop_tx: watch::Sender<bool>,
    stop_rx: watch::Receiver<bool>,
    /// Per-channel collection stats.
    pub channel_stats: RwLock<Vec<ChannelStats>>,
}

impl CollectorState {
    pub fn new() -> Self {
        let (stop_tx, stop_rx) = watch::channel(false);
        Self {
            running: AtomicBool::new(false),
            started_at: AtomicU64::new(0),
            stop_tx,
            stop_rx,
            channel_stats: RwLock::new(Vec::new()),
        }
    }

    /// Check if the collector is running.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Mark the collector as started or stopped.
    pub fn set_running(&self, running: bool) {
        self.running.store(running, Ordering::SeqCst);
        if running {
            let now = OffsetDateTime::now_utc().unix_timestamp() as u64;
            self.started_at.store(now, Ordering::SeqCst);
        }
    }

    /// Get the collector start time.
    pub fn started_at(&self) -> Option<OffsetDateTime> {
        let ts = self.started_at.load(Ordering::SeqCst);
        if ts == 0 {
            None
        } else {
            OffsetDateTime::from_unix_timestamp(ts as i64).ok()
        }
    }

    /// Get a receiver for the stop signal.
    pub fn subscribe_stop(&self) -> watch::Receiver<bool> {
        self.stop_rx.clone()
    }

    /// Signal all collector tasks to stop.
    pub fn signal_stop(&self) {
        let _ = self.stop_tx.send(true);
        self.running.store(false, Ordering::SeqCst);
    }

    /// Reset the stop signal (for restarting).
    pub fn reset_stop(&self) {
        let _ = self.stop_tx.send(false);
    }

    /// Replace the stats with fresh entries for `channels`.
    pub async fn reset_stats(&self, channels: &[(Channel, u64)]) {
        *self.channel_stats.write().await = channels
            .iter()
            .map(|&(channel, interval)| ChannelStats::new(channel, interval))
            .collect();
    }

    /// Record a successful pass.
    pub async fn record_success(&self, channel: Channel) {
        let mut stats = self.channel_stats.write().await;
        if let Some(s) = stats.iter_mut().find(|s| s.channel == channel) {
            s.last_success_at = Some(OffsetDateTime::now_utc());
            s.success_count += 1;
            s.consecutive_failures = 0;
        }
    }

    /// Record a failed pass; returns the consecutive failure count.
    pub async fn record_failure(&self, channel: Channel, error: String) -> u32 {
        let mut stats = self.channel_stats.write().await;
        match stats.iter_mut().find(|s| s.channel == channel) {
            Some(s) => {
                s.last_error_at = Some(OffsetDateTime::now_utc());
                s.last_error = Some(error);
                s.failure_count += 1;
                s.consecutive_failures += 1;
                s.consecutive_failures
            }
            None => 1,
        }
    }

    /// Stats for one channel.
    pub async fn stats(&self, channel: Channel) -> Option<ChannelStats> {
        self.channel_stats
            .read()
            .await
            .iter()
            .find(|s| s.channel == channel)
            .cloned()
    }
}

impl Default for CollectorState {
    fn default() -> Self {
        Self::new()
    }
}

/// Collection statistics for one channel.
#[derive(Debug, Clone, Serialize)]
pub struct ChannelStats {
    pub channel: Channel,
    /// Seconds between passes.
    pub interval: u64,
    #[serde(with = "time::serde::rfc3339::option")]
    pub last_success_at: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub last_error_at: Option<OffsetDateTime>,
    pub last_error: Option<String>,
    pub success_count: u64,
    pub failure_count: u64,
    pub consecutive_failures: u32,
}

impl ChannelStats {
    fn new(channel: Channel, interval: u64) -> Self {
        Self {
            channel,
            interval,
            last_success_at: None,
            last_error_at: None,
            last_error: None,
            success_count: 0,
            failure_count: 0,
            consecutive_failures: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SourceConfig;
    use stepquest_core::{SourceError, SyncOutcome};
    use stepquest_store::StepStore;
    use time::macros::date;

    fn state(config: Config) -> Arc<AppState> {
        let store = Arc::new(Store::open_in_memory().unwrap());
        let reconciler = build_reconciler(Arc::clone(&store), &config).unwrap();
        AppState::new(store, config, reconciler, UtcOffset::UTC)
    }

    #[tokio::test]
    async fn test_app_state_new() {
        let state = state(Config::default());
        assert_eq!(state.config.read().await.live.poll_interval, 5);
        assert_eq!(state.store.count().unwrap(), 0);
        assert!(!state.collector.is_running());
    }

    #[tokio::test]
    async fn test_app_state_open_creates_database() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.storage.path = dir.path().join("data").join("steps.db");

        let state = AppState::open(config, UtcOffset::UTC).unwrap();
        assert!(dir.path().join("data").join("steps.db").exists());
        let window = state.reconciler.history_window(date!(2024 - 03 - 15));
        assert_eq!(window.start, date!(2024 - 03 - 08));
    }

    #[tokio::test]
    async fn test_reconciler_without_source_reports_not_installed() {
        let state = state(Config::default());
        let outcome = state
            .reconciler
            .sync_today(date!(2024 - 03 - 01))
            .await
            .unwrap();
        assert!(matches!(
            outcome,
            SyncOutcome::SourceUnavailable(SourceError::NotInstalled(_))
        ));
    }

    #[test]
    fn test_build_reconciler_rejects_bad_url() {
        let mut config = Config::default();
        config.source = Some(SourceConfig {
            url: "not-a-url".to_string(),
            token: None,
        });
        let store = Arc::new(Store::open_in_memory().unwrap());
        assert!(build_reconciler(store, &config).is_err());
    }

    #[test]
    fn test_collector_state() {
        let collector = CollectorState::new();
        assert!(!collector.is_running());
        assert!(collector.started_at().is_none());

        collector.set_running(true);
        assert!(collector.is_running());
        assert!(collector.started_at().is_some());

        collector.signal_stop();
        assert!(!collector.is_running());
    }

    #[test]
    fn test_collector_state_stop_and_reset() {
        let collector = CollectorState::new();
        let rx = collector.subscribe_stop();
        assert!(!*rx.borrow());

        collector.signal_stop();
        assert!(*rx.borrow());

        collector.reset_stop();
        assert!(!*rx.borrow());
    }

    #[tokio::test]
    async fn test_channel_stats_tracking() {
        let collector = CollectorState::new();
        collector
            .reset_stats(&[(Channel::Live, 5), (Channel::Refresh, 900)])
            .await;

        assert_eq!(collector.record_failure(Channel::Live, "a".into()).await, 1);
        assert_eq!(collector.record_failure(Channel::Live, "b".into()).await, 2);
        collector.record_success(Channel::Refresh).await;

        let live = collector.stats(Channel::Live).await.unwrap();
        assert_eq!(live.failure_count, 2);
        assert_eq!(live.last_error.as_deref(), Some("b"));
        assert!(live.last_success_at.is_none());

        collector.record_success(Channel::Live).await;
        let live = collector.stats(Channel::Live).await.unwrap();
        assert_eq!(live.consecutive_failures, 0);
        assert_eq!(live.success_count, 1);

        let refresh = collector.stats(Channel::Refresh).await.unwrap();
        assert_eq!(refresh.interval, 900);
        assert_eq!(refresh.success_count, 1);
    }

    #[test]
    fn test_channel_stats_serialization() {
        let stats = ChannelStats::new(Channel::Refresh, 900);
        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["channel"], "refresh");
        assert_eq!(json["interval"], 900);
        assert!(json["last_error"].is_null());
    }

    #[tokio::test]
    async fn test_snapshot_broadcast_multiple_receivers() {
        let state = state(Config::default());
        let mut rx1 = state.snapshots_tx.subscribe();
        let mut rx2 = state.snapshots_tx.subscribe();

        let snapshot = state
            .reconciler
            .metrics()
            .snapshot(date!(2024 - 03 - 01))
            .unwrap();
        state
            .snapshots_tx
            .send(SnapshotEvent {
                channel: Channel::Live,
                snapshot,
            })
            .unwrap();

        assert_eq!(rx1.recv().await.unwrap().snapshot, snapshot);
        assert_eq!(rx2.recv().await.unwrap().channel, Channel::Live);
    }
}
