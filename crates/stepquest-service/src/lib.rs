//! Configuration and background collector for StepQuest.
//!
//! This crate provides:
//! - TOML configuration with validation that reports every problem at once
//! - Shared [`AppState`] wiring the store, the configured sources and a
//!   [`Reconciler`](stepquest_core::Reconciler)
//! - A [`Collector`] running the live and refresh passes on interval
//!   tickers, broadcasting each fresh snapshot
//!
//! # Configuration
//!
//! The service reads configuration from `~/.config/stepquest/config.toml`:
//!
//! ```toml
//! [storage]
//! path = "~/.local/share/stepquest/steps.db"
//!
//! [history]
//! days = 7                 # historical window: [today - days, today]
//! refresh_interval = 900   # seconds between full reconciles
//!
//! [live]
//! poll_interval = 5        # seconds between live polls
//!
//! [source]
//! url = "http://localhost:9090"
//! token = "optional-bearer-token"
//! ```
//!
//! A leading `~` in `storage.path` is expanded to the home directory.
//! The yearly goal is not part of the file; it is stored with the step
//! data.
//!
//! # Example
//!
//! ```no_run
//! use stepquest_service::{AppState, Collector, Config};
//! use time::UtcOffset;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::load_default()?;
//! config.validate()?;
//!
//! let state = AppState::open(config, UtcOffset::UTC)?;
//! let mut snapshots = state.snapshots_tx.subscribe();
//!
//! let collector = Collector::new(state.clone());
//! let handle = collector.start().await;
//!
//! while let Ok(event) = snapshots.recv().await {
//!     println!("{}: {} steps today", event.channel, event.snapshot.today.steps);
//! }
//! # collector.stop();
//! # handle.join().await;
//! # Ok(())
//! # }
//! ```

pub mod collector;
pub mod config;
pub mod state;

pub use collector::{Collector, CollectorError, CollectorHandle};
pub use config::{
    Config, ConfigError, HistoryConfig, LiveConfig, SourceConfig, StorageConfig, ValidationError,
    default_config_path, expand_home,
};
pub use state::{AppState, Channel, ChannelStats, CollectorState, SnapshotEvent, build_reconciler};
