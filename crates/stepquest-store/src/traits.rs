//! Storage contracts shared by every backend.
//!
//! The reconciliation engine and the metrics aggregator only talk to these
//! traits, so the SQLite [`Store`](crate::Store) and the in-memory
//! [`MemoryStore`](crate::MemoryStore) are interchangeable.
//!
//! Both traits are synchronous. Implementations must be safe to call from
//! several tasks at once: writes to the same date are serialized and the
//! last writer wins.

use stepquest_types::{DailySteps, YearlyGoal};
use time::Date;

use crate::error::Result;

/// Persistent map from calendar date to step count.
pub trait StepStore: Send + Sync {
    /// The record for `date`, if any.
    fn get(&self, date: Date) -> Result<Option<DailySteps>>;

    /// Every record, newest date first.
    fn all(&self) -> Result<Vec<DailySteps>>;

    /// Sum of steps over the closed range `[start, end]`.
    ///
    /// Returns 0 when no record falls in the range or `start > end`.
    fn sum_range(&self, start: Date, end: Date) -> Result<u64>;

    /// Insert `record`, replacing any existing value for its date.
    fn upsert(&self, record: DailySteps) -> Result<()>;

    /// Insert every record atomically: either all are stored or none are.
    ///
    /// Returns the number of records written.
    fn upsert_many(&self, records: &[DailySteps]) -> Result<usize>;

    /// Number of stored dates.
    fn count(&self) -> Result<u64>;

    /// Store `record` only if its date is absent or currently holds zero.
    ///
    /// Returns `true` when the record was written. Backends should override
    /// this with a single conditional write; the default checks then writes
    /// and is only atomic if the backend serializes callers.
    fn upsert_if_vacant(&self, record: DailySteps) -> Result<bool> {
        match self.get(record.date)? {
            Some(existing) if existing.steps != 0 => Ok(false),
            _ => {
                self.upsert(record)?;
                Ok(true)
            }
        }
    }
}

/// Where the user's yearly goal lives.
pub trait GoalPreferences: Send + Sync {
    /// The stored goal, or the default when none was ever set.
    fn yearly_goal(&self) -> Result<YearlyGoal>;

    /// Persist a new goal.
    fn set_yearly_goal(&self, goal: YearlyGoal) -> Result<()>;
}
