//! Trait abstractions for step data sources.
//!
//! Sources are the inbound channels of the reconciler. Real providers (a
//! platform health service, an HTTP endpoint) and the mocks in
//! [`crate::mock`] implement the same traits, so the reconciler and the
//! background collector never know which one they talk to.

use async_trait::async_trait;

use stepquest_types::{DailySteps, DateRange};

use crate::error::SourceError;

/// A provider of per-day step totals for a recent window.
///
/// Results are a point-in-time batch and are treated as authoritative for
/// every date they contain.
///
/// # Example
///
/// ```ignore
/// use stepquest_core::{HistoricalSource, SourceError};
/// use stepquest_types::DateRange;
///
/// async fn total<S: HistoricalSource>(source: &S, range: DateRange) -> Result<u64, SourceError> {
///     let days = source.fetch_days(range).await?;
///     Ok(days.iter().map(|d| d.steps).sum())
/// }
/// ```
#[async_trait]
pub trait HistoricalSource: Send + Sync {
    /// Human-readable name for logs and error messages.
    fn name(&self) -> &str;

    /// Check that the provider is installed and access was granted.
    ///
    /// The default implementation assumes access.
    async fn check_access(&self) -> Result<(), SourceError> {
        Ok(())
    }

    /// Fetch daily totals for every date in `range` the provider knows.
    async fn fetch_days(&self, range: DateRange) -> Result<Vec<DailySteps>, SourceError>;
}

/// A provider of the running step total for the current day.
#[async_trait]
pub trait LiveSource: Send + Sync {
    /// Human-readable name for logs and error messages.
    fn name(&self) -> &str;

    /// Check that the provider is installed and access was granted.
    async fn check_access(&self) -> Result<(), SourceError> {
        Ok(())
    }

    /// Cumulative steps counted so far today.
    async fn today_total(&self) -> Result<u64, SourceError>;
}
