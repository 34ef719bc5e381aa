//! In-memory backend.

use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use stepquest_types::{DailySteps, YearlyGoal};
use time::Date;

use crate::error::Result;
use crate::traits::{GoalPreferences, StepStore};

/// A [`StepStore`] and [`GoalPreferences`] kept entirely in memory.
///
/// Useful for tests and for embedding the engine without a database file.
#[derive(Debug, Default)]
pub struct MemoryStore {
    days: RwLock<BTreeMap<Date, u64>>,
    goal: RwLock<Option<YearlyGoal>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-filled with `records`.
    pub fn with_records(records: impl IntoIterator<Item = DailySteps>) -> Self {
        let days = records.into_iter().map(|r| (r.date, r.steps)).collect();
        Self {
            days: RwLock::new(days),
            goal: RwLock::new(None),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, BTreeMap<Date, u64>> {
        self.days.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, BTreeMap<Date, u64>> {
        self.days.write().unwrap_or_else(|e| e.into_inner())
    }
}

impl StepStore for MemoryStore {
    fn get(&self, date: Date) -> Result<Option<DailySteps>> {
        Ok(self.read().get(&date).map(|&steps| DailySteps::new(date, steps)))
    }

    fn all(&self) -> Result<Vec<DailySteps>> {
        Ok(self
            .read()
            .iter()
            .rev()
            .map(|(&date, &steps)| DailySteps::new(date, steps))
            .collect())
    }

    fn sum_range(&self, start: Date, end: Date) -> Result<u64> {
        if start > end {
            return Ok(0);
        }
        Ok(self
            .read()
            .range(start..=end)
            .fold(0u64, |acc, (_, &steps)| acc.saturating_add(steps)))
    }

    fn upsert(&self, record: DailySteps) -> Result<()> {
        self.write().insert(record.date, record.steps);
        Ok(())
    }

    fn upsert_many(&self, records: &[DailySteps]) -> Result<usize> {
        let mut days = self.write();
        for r in records {
            days.insert(r.date, r.steps);
        }
        Ok(records.len())
    }

    fn count(&self) -> Result<u64> {
        Ok(self.read().len() as u64)
    }

    fn upsert_if_vacant(&self, record: DailySteps) -> Result<bool> {
        let mut days = self.write();
        match days.get(&record.date) {
            Some(&existing) if existing != 0 => Ok(false),
            _ => {
                days.insert(record.date, record.steps);
                Ok(true)
            }
        }
    }
}

impl GoalPreferences for MemoryStore {
    fn yearly_goal(&self) -> Result<YearlyGoal> {
        let goal = self.goal.read().unwrap_or_else(|e| e.into_inner());
        Ok(goal.unwrap_or_default())
    }

    fn set_yearly_goal(&self, goal: YearlyGoal) -> Result<()> {
        *self.goal.write().unwrap_or_else(|e| e.into_inner()) = Some(goal);
        Ok(())
    }
}
