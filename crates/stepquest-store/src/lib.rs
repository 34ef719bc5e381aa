//! Local data persistence for daily step counts.
//!
//! This crate provides SQLite-based storage for step data plus an
//! in-memory backend with the same contract.
//!
//! # Features
//!
//! - One record per calendar date, replaced wholesale on update
//! - Inclusive date-range sums for the dashboard windows
//! - Atomic batch upserts for history sync
//! - Conditional "only if vacant" writes for imports
//! - Yearly goal preference
//! - CSV import/export
//!
//! # Example
//!
//! ```no_run
//! use stepquest_store::{StepStore, Store};
//! use stepquest_types::DailySteps;
//! use time::macros::date;
//!
//! let store = Store::open_default()?;
//! store.upsert(DailySteps::new(date!(2024 - 01 - 01), 8123))?;
//! let january = store.sum_range(date!(2024 - 01 - 01), date!(2024 - 01 - 31))?;
//! # Ok::<(), stepquest_store::Error>(())
//! ```

mod error;
mod memory;
mod schema;
mod store;
mod tabular;
mod traits;

pub use error::{Error, Result};
pub use memory::MemoryStore;
pub use store::Store;
pub use tabular::{CsvRows, RejectedRow, write_csv, write_json};
pub use traits::{GoalPreferences, StepStore};

/// Default database path following platform conventions.
///
/// - Linux: `~/.local/share/stepquest/steps.db`
/// - macOS: `~/Library/Application Support/stepquest/steps.db`
/// - Windows: `C:\Users\<user>\AppData\Local\stepquest\steps.db`
pub fn default_db_path() -> std::path::PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| std::path::PathBuf::from("."))
        .join("stepquest")
        .join("steps.db")
}
