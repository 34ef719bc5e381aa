//! Mock step sources for testing.
//!
//! [`MockHistoricalSource`] and [`MockLiveSource`] implement the source
//! traits without any platform service, so the reconciler and the
//! collector can be exercised end to end.
//!
//! # Features
//!
//! - **Settable data**: replace the history batch or today's total at any time
//! - **Failure injection**: fail every call, or only the next N calls
//! - **Access denial**: make `check_access` report a missing permission
//! - **Latency simulation**: add artificial delays to every call
//! - **Call counters**: assert how often a source was polled

use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;

use stepquest_types::{DailySteps, DateRange};

use crate::error::SourceError;
use crate::traits::{HistoricalSource, LiveSource};

/// Failure and latency knobs shared by both mocks.
#[derive(Debug, Default)]
struct Faults {
    /// Error returned on every call while set.
    failure: RwLock<Option<SourceError>>,
    /// Error returned by `check_access` while set.
    denied: RwLock<Option<SourceError>>,
    /// Calls left to fail before succeeding (used with `transient`).
    remaining_failures: AtomicU32,
    transient: RwLock<Option<SourceError>>,
    latency_ms: AtomicU64,
}

impl Faults {
    async fn before_call(&self) -> Result<(), SourceError> {
        let latency = self.latency_ms.load(Ordering::Relaxed);
        if latency > 0 {
            tokio::time::sleep(Duration::from_millis(latency)).await;
        }

        if let Some(err) = self.failure.read().await.clone() {
            return Err(err);
        }

        let remaining = self.remaining_failures.load(Ordering::Relaxed);
        if remaining > 0 {
            self.remaining_failures.fetch_sub(1, Ordering::Relaxed);
            if let Some(err) = self.transient.read().await.clone() {
                return Err(err);
            }
        }

        Ok(())
    }

    async fn check_access(&self) -> Result<(), SourceError> {
        match self.denied.read().await.clone() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

/// A mock multi-day history provider.
///
/// # Example
///
/// ```
/// use stepquest_core::{HistoricalSource, MockHistoricalSource};
/// use stepquest_types::{DailySteps, DateRange};
/// use time::macros::date;
///
/// #[tokio::main]
/// async fn main() {
///     let source = MockHistoricalSource::new();
///     source.set_days(vec![DailySteps::new(date!(2024 - 01 - 02), 900)]).await;
///
///     let range = DateRange::new(date!(2024 - 01 - 01), date!(2024 - 01 - 07));
///     let days = source.fetch_days(range).await.unwrap();
///     assert_eq!(days.len(), 1);
/// }
/// ```
#[derive(Debug)]
pub struct MockHistoricalSource {
    name: String,
    days: RwLock<Vec<DailySteps>>,
    faults: Faults,
    fetch_count: AtomicU32,
}

impl Default for MockHistoricalSource {
    fn default() -> Self {
        Self::new()
    }
}

impl MockHistoricalSource {
    /// Create an empty mock.
    pub fn new() -> Self {
        Self {
            name: "mock history".to_string(),
            days: RwLock::new(Vec::new()),
            faults: Faults::default(),
            fetch_count: AtomicU32::new(0),
        }
    }

    /// Create a mock that already knows `days`.
    pub fn with_days(days: Vec<DailySteps>) -> Self {
        Self {
            days: RwLock::new(days),
            ..Self::new()
        }
    }

    /// Replace the data returned by future fetches.
    pub async fn set_days(&self, days: Vec<DailySteps>) {
        *self.days.write().await = days;
    }

    /// Fail every call with `err` (or stop failing with `None`).
    pub async fn set_failure(&self, err: Option<SourceError>) {
        *self.faults.failure.write().await = err;
    }

    /// Make `check_access` fail with `err` (or grant access with `None`).
    pub async fn set_access_denied(&self, err: Option<SourceError>) {
        *self.faults.denied.write().await = err;
    }

    /// Fail the next `count` fetches with `err`, then succeed.
    pub async fn fail_next(&self, count: u32, err: SourceError) {
        *self.faults.transient.write().await = Some(err);
        self.faults
            .remaining_failures
            .store(count, Ordering::Relaxed);
    }

    /// Delay every call by `latency`.
    pub fn set_latency(&self, latency: Duration) {
        self.faults
            .latency_ms
            .store(latency.as_millis() as u64, Ordering::Relaxed);
    }

    /// Number of `fetch_days` calls so far, including failed ones.
    pub fn fetch_count(&self) -> u32 {
        self.fetch_count.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl HistoricalSource for MockHistoricalSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn check_access(&self) -> Result<(), SourceError> {
        self.faults.check_access().await
    }

    async fn fetch_days(&self, range: DateRange) -> Result<Vec<DailySteps>, SourceError> {
        self.fetch_count.fetch_add(1, Ordering::Relaxed);
        self.faults.before_call().await?;

        Ok(self
            .days
            .read()
            .await
            .iter()
            .filter(|d| range.contains(d.date))
            .copied()
            .collect())
    }
}

/// A mock running step counter for today.
#[derive(Debug)]
pub struct MockLiveSource {
    name: String,
    total: AtomicU64,
    faults: Faults,
    poll_count: AtomicU32,
}

impl Default for MockLiveSource {
    fn default() -> Self {
        Self::new(0)
    }
}

impl MockLiveSource {
    /// Create a mock reporting `total` steps.
    pub fn new(total: u64) -> Self {
        Self {
            name: "mock live".to_string(),
            total: AtomicU64::new(total),
            faults: Faults::default(),
            poll_count: AtomicU32::new(0),
        }
    }

    /// Set today's running total.
    pub fn set_total(&self, total: u64) {
        self.total.store(total, Ordering::Relaxed);
    }

    /// Simulate walking `steps` more.
    pub fn walk(&self, steps: u64) {
        self.total.fetch_add(steps, Ordering::Relaxed);
    }

    /// Fail every call with `err` (or stop failing with `None`).
    pub async fn set_failure(&self, err: Option<SourceError>) {
        *self.faults.failure.write().await = err;
    }

    /// Make `check_access` fail with `err` (or grant access with `None`).
    pub async fn set_access_denied(&self, err: Option<SourceError>) {
        *self.faults.denied.write().await = err;
    }

    /// Fail the next `count` polls with `err`, then succeed.
    pub async fn fail_next(&self, count: u32, err: SourceError) {
        *self.faults.transient.write().await = Some(err);
        self.faults
            .remaining_failures
            .store(count, Ordering::Relaxed);
    }

    /// Delay every call by `latency`.
    pub fn set_latency(&self, latency: Duration) {
        self.faults
            .latency_ms
            .store(latency.as_millis() as u64, Ordering::Relaxed);
    }

    /// Number of `today_total` calls so far, including failed ones.
    pub fn poll_count(&self) -> u32 {
        self.poll_count.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl LiveSource for MockLiveSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn check_access(&self) -> Result<(), SourceError> {
        self.faults.check_access().await
    }

    async fn today_total(&self) -> Result<u64, SourceError> {
        self.poll_count.fetch_add(1, Ordering::Relaxed);
        self.faults.before_call().await?;
        Ok(self.total.load(Ordering::Relaxed))
    }
}
