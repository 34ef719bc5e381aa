//! Step reconciliation and goal metrics engine for StepQuest.
//!
//! This crate merges daily step counts from several sources into one
//! authoritative per-day record and derives goal-tracking metrics from it.
//!
//! # Features
//!
//! - **Historical sync**: overwrite a recent window from a multi-day source
//! - **Live sync**: keep today's record at the live running total
//! - **Import / export**: merge `date,steps` CSV without clobbering real data
//! - **Dashboard metrics**: today, last 7 days, month, last 30 days and year
//!   against goals derived from one yearly target, plus yearly pace
//! - **History summaries**: per-day, per-week and per-month totals
//! - **Retry**: bounded exponential backoff for transient source failures
//!
//! # Sources
//!
//! | Trait | Provides | Implementations |
//! |-------|----------|-----------------|
//! | [`HistoricalSource`] | `(date, steps)` for a date range | [`MockHistoricalSource`], [`HttpStepSource`] |
//! | [`LiveSource`] | today's running total | [`MockLiveSource`], [`HttpStepSource`] |
//!
//! A missing, unauthorised or unreachable source is reported as
//! [`SyncOutcome::SourceUnavailable`], never as zero steps. Store failures
//! travel as [`Error`].
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use stepquest_core::{MockHistoricalSource, MockLiveSource, Reconciler};
//! use stepquest_store::Store;
//! use time::macros::date;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = Arc::new(Store::open_default()?);
//!     let reconciler = Reconciler::new(store.clone(), store)
//!         .with_historical(Arc::new(MockHistoricalSource::new()))
//!         .with_live(Arc::new(MockLiveSource::new(4200)));
//!
//!     let report = reconciler.refresh(date!(2024 - 03 - 15)).await?;
//!     println!("Today: {} steps", report.snapshot.today.steps);
//!     println!("Pace: {}", report.snapshot.pace());
//!     Ok(())
//! }
//! ```

pub mod error;
#[cfg(feature = "http")]
pub mod http;
pub mod metrics;
pub mod mock;
pub mod outcome;
pub mod reconcile;
pub mod retry;
pub mod summary;
pub mod traits;
pub mod util;

// Re-export the shared types so callers need only one dependency
pub use stepquest_types::{
    CalendarWindows, DailySteps, DateRange, DerivedGoals, Pace, PaceStatus, YearlyGoal,
};

pub use error::{Error, Result, SourceError};
#[cfg(feature = "http")]
pub use http::HttpStepSource;
pub use metrics::{MetricsAggregator, MetricsSnapshot, WindowMetrics};
pub use mock::{MockHistoricalSource, MockLiveSource};
pub use outcome::{Listing, SyncOutcome};
pub use reconcile::{DEFAULT_HISTORY_DAYS, ExportFormat, ImportReport, Reconciler, RefreshReport};
pub use retry::{RetryConfig, with_retry};
pub use summary::{DaySummary, MonthSummary, WeekSummary};
pub use traits::{HistoricalSource, LiveSource};
pub use util::{group_thousands, local_offset, today_at};
