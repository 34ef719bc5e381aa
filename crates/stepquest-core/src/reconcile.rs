//! Reconciliation of step data from several inbound channels.
//!
//! Three channels feed the store, each with its own merge policy:
//!
//! | Channel | Scope | Policy |
//! |---------|-------|--------|
//! | History sync | `[today - history_days, today]` | overwrite every reported date, zeros included, in one batch |
//! | Live sync | today only | overwrite today's record with the running total |
//! | Import | any date | write only where the date is absent or holds zero |
//!
//! History and live data come from trusted providers and are written as
//! they arrive. Imports are user-supplied and validated row by row. No
//! channel ever deletes a record or adds to an existing value.
//!
//! All writes are idempotent replacements, so overlapping passes (a live
//! poll racing a full refresh) need no coordination.

use std::io::{Read, Write};
use std::sync::Arc;

use serde::Serialize;
use time::{Date, Duration};
use tracing::{debug, info, warn};

use stepquest_store::{CsvRows, GoalPreferences, RejectedRow, StepStore, write_csv, write_json};
use stepquest_types::{DailySteps, DateRange};

use crate::error::{Result, SourceError};
use crate::metrics::{MetricsAggregator, MetricsSnapshot};
use crate::outcome::{Listing, SyncOutcome};
use crate::retry::{RetryConfig, with_retry};
use crate::traits::{HistoricalSource, LiveSource};

/// Days before today covered by a history sync.
pub const DEFAULT_HISTORY_DAYS: u32 = 7;

/// What an import did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    /// Rows that parsed into a valid record.
    pub parsed: usize,
    /// Records actually written.
    pub imported: usize,
    /// Valid records skipped because the date already held steps.
    pub skipped_existing: usize,
    /// Rows that failed to parse.
    pub rejected: Vec<RejectedRow>,
}

/// Per-channel results of a full refresh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RefreshReport {
    /// Records written by the history sync.
    pub historical: SyncOutcome<usize>,
    /// Today's record as written by the live sync.
    pub live: SyncOutcome<DailySteps>,
    /// Metrics after both syncs.
    pub snapshot: MetricsSnapshot,
}

/// Export file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    #[default]
    Csv,
    Json,
}

/// Applies every inbound channel to one store.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use stepquest_core::{MockLiveSource, Reconciler, SyncOutcome};
/// use stepquest_store::MemoryStore;
/// use time::macros::date;
///
/// #[tokio::main]
/// async fn main() {
///     let store = Arc::new(MemoryStore::new());
///     let reconciler = Reconciler::new(store.clone(), store)
///         .with_live(Arc::new(MockLiveSource::new(4200)));
///
///     let outcome = reconciler.sync_today(date!(2024 - 03 - 01)).await.unwrap();
///     assert!(matches!(outcome, SyncOutcome::Synced(r) if r.steps == 4200));
/// }
/// ```
#[derive(Clone)]
pub struct Reconciler {
    store: Arc<dyn StepStore>,
    metrics: MetricsAggregator,
    historical: Option<Arc<dyn HistoricalSource>>,
    live: Option<Arc<dyn LiveSource>>,
    history_days: u32,
    retry: RetryConfig,
    live_retry: RetryConfig,
}

impl Reconciler {
    /// Create a reconciler without any sources.
    pub fn new(store: Arc<dyn StepStore>, prefs: Arc<dyn GoalPreferences>) -> Self {
        Self {
            metrics: MetricsAggregator::new(Arc::clone(&store), prefs),
            store,
            historical: None,
            live: None,
            history_days: DEFAULT_HISTORY_DAYS,
            retry: RetryConfig::default(),
            live_retry: RetryConfig::for_live(),
        }
    }

    /// Attach a multi-day history source.
    #[must_use]
    pub fn with_historical(mut self, source: Arc<dyn HistoricalSource>) -> Self {
        self.historical = Some(source);
        self
    }

    /// Attach a live "today" source.
    #[must_use]
    pub fn with_live(mut self, source: Arc<dyn LiveSource>) -> Self {
        self.live = Some(source);
        self
    }

    /// Number of days before today covered by history sync.
    #[must_use]
    pub fn history_days(mut self, days: u32) -> Self {
        self.history_days = days;
        self
    }

    /// Retry policy for source fetches.
    #[must_use]
    pub fn retry(mut self, config: RetryConfig) -> Self {
        self.retry = config.clone();
        self.live_retry = config;
        self
    }

    /// The aggregator sharing this reconciler's store.
    pub fn metrics(&self) -> &MetricsAggregator {
        &self.metrics
    }

    /// The window a history sync on `today` covers.
    pub fn history_window(&self, today: Date) -> DateRange {
        let start = today.saturating_sub(Duration::days(i64::from(self.history_days)));
        DateRange::new(start, today)
    }

    /// Fetch the recent window from the history source and overwrite it.
    ///
    /// The batch is written atomically. Returns the number of records
    /// written.
    pub async fn sync_historical(&self, today: Date) -> Result<SyncOutcome<usize>> {
        let Some(source) = &self.historical else {
            return Ok(SyncOutcome::SourceUnavailable(SourceError::NotInstalled(
                "history source".to_string(),
            )));
        };

        if let Err(e) = source.check_access().await {
            info!("{} not accessible: {}", source.name(), e);
            return Ok(SyncOutcome::SourceUnavailable(e));
        }

        let range = self.history_window(today);
        let fetched = with_retry(&self.retry, "fetch_days", || source.fetch_days(range)).await;
        let records = match fetched {
            Ok(records) => records,
            Err(e) => {
                warn!("History sync from {} failed: {}", source.name(), e);
                return Ok(SyncOutcome::SourceUnavailable(e));
            }
        };

        if records.is_empty() {
            debug!("{} returned no days for {:?}", source.name(), range);
            return Ok(SyncOutcome::Empty);
        }

        let written = self.store.upsert_many(&records)?;
        info!("Synced {} days from {}", written, source.name());
        Ok(SyncOutcome::Synced(written))
    }

    /// Overwrite today's record with the live source's running total.
    pub async fn sync_today(&self, today: Date) -> Result<SyncOutcome<DailySteps>> {
        let Some(source) = &self.live else {
            return Ok(SyncOutcome::SourceUnavailable(SourceError::NotInstalled(
                "live source".to_string(),
            )));
        };

        if let Err(e) = source.check_access().await {
            debug!("{} not accessible: {}", source.name(), e);
            return Ok(SyncOutcome::SourceUnavailable(e));
        }

        let polled = with_retry(&self.live_retry, "today_total", || source.today_total()).await;
        let total = match polled {
            Ok(total) => total,
            Err(e) => {
                debug!("Live sync from {} failed: {}", source.name(), e);
                return Ok(SyncOutcome::SourceUnavailable(e));
            }
        };

        let record = DailySteps::new(today, total);
        self.store.upsert(record)?;
        debug!("Today ({}) is at {} steps", today, total);
        Ok(SyncOutcome::Synced(record))
    }

    /// Merge parsed rows, writing only where a date is absent or zero.
    ///
    /// Rejected rows are collected, never fatal. A store failure aborts
    /// the import; rows written before it stay written.
    pub fn import<I>(&self, rows: I) -> Result<ImportReport>
    where
        I: IntoIterator<Item = std::result::Result<DailySteps, RejectedRow>>,
    {
        let mut report = ImportReport::default();

        for row in rows {
            match row {
                Ok(record) => {
                    report.parsed += 1;
                    if self.store.upsert_if_vacant(record)? {
                        report.imported += 1;
                    } else {
                        report.skipped_existing += 1;
                    }
                }
                Err(rejected) => {
                    debug!("Skipping line {}: {}", rejected.line, rejected.error);
                    report.rejected.push(rejected);
                }
            }
        }

        info!(
            "Imported {} of {} rows ({} already present, {} rejected)",
            report.imported,
            report.parsed,
            report.skipped_existing,
            report.rejected.len()
        );
        Ok(report)
    }

    /// Import `date,steps` CSV from `reader`.
    pub fn import_csv<R: Read>(&self, reader: R) -> Result<ImportReport> {
        self.import(CsvRows::new(reader))
    }

    /// Write every stored record, newest first.
    ///
    /// Returns `Empty` without writing anything when the store has no
    /// records, otherwise the number of rows written.
    pub fn export<W: Write>(&self, format: ExportFormat, writer: W) -> Result<Listing<usize>> {
        let records = self.store.all()?;
        if records.is_empty() {
            return Ok(Listing::Empty);
        }

        let written = match format {
            ExportFormat::Csv => write_csv(&records, writer)?,
            ExportFormat::Json => write_json(&records, writer)?,
        };
        info!("Exported {} records", written);
        Ok(Listing::Items(written))
    }

    /// History sync, live sync, then a fresh snapshot.
    ///
    /// Unavailable sources are reported per channel. Store failures abort.
    pub async fn refresh(&self, today: Date) -> Result<RefreshReport> {
        let historical = self.sync_historical(today).await?;
        let live = self.sync_today(today).await?;
        let snapshot = self.metrics.snapshot(today)?;
        Ok(RefreshReport {
            historical,
            live,
            snapshot,
        })
    }

    /// Live sync and snapshot for background use.
    ///
    /// Every error is logged at debug level and swallowed. Returns `None`
    /// only when no snapshot could be computed.
    pub async fn auto_refresh_today(&self, today: Date) -> Option<MetricsSnapshot> {
        if let Err(e) = self.sync_today(today).await {
            debug!("Background live sync failed: {}", e);
        }
        match self.metrics.snapshot(today) {
            Ok(snapshot) => Some(snapshot),
            Err(e) => {
                debug!("Background snapshot failed: {}", e);
                None
            }
        }
    }
}
