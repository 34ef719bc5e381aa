//! Goal metrics over calendar windows.
//!
//! [`MetricsAggregator`] turns raw daily records into a [`MetricsSnapshot`]:
//! five windows (today, last 7 days, this month, last 30 days, this year),
//! each with observed steps, goal and percentage, plus the yearly pace.
//!
//! Nothing is cached. Every snapshot re-reads the store, so two snapshots
//! for the same date and goal over an unchanged store are identical.

use std::sync::Arc;

use serde::Serialize;
use time::Date;
use tracing::debug;

use stepquest_store::{GoalPreferences, StepStore};
use stepquest_types::{
    CalendarWindows, DateRange, DerivedGoals, Pace, YearlyGoal, calculate_percent,
};

use crate::error::Result;
use crate::outcome::Listing;
use crate::summary::{self, DaySummary, MonthSummary, WeekSummary};

/// Progress within one calendar window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WindowMetrics {
    /// Dates covered.
    pub range: DateRange,
    /// Steps observed in the range.
    pub steps: u64,
    /// Goal for the window.
    pub goal: u64,
    /// `steps / goal` as an unclamped whole percentage.
    pub percent: u64,
}

impl WindowMetrics {
    fn new(range: DateRange, steps: u64, goal: u64) -> Self {
        Self {
            range,
            steps,
            goal,
            percent: calculate_percent(steps, goal),
        }
    }

    /// Percentage clamped to 100 for progress bars.
    pub fn display_percent(&self) -> u64 {
        self.percent.min(100)
    }
}

/// Dashboard state for one reference date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    /// The reference date.
    #[serde(with = "stepquest_types::types::iso_date")]
    pub date: Date,
    /// Yearly goal the snapshot was computed against.
    pub yearly_goal: YearlyGoal,
    pub today: WindowMetrics,
    pub last7: WindowMetrics,
    pub month: WindowMetrics,
    pub last30: WindowMetrics,
    pub year: WindowMetrics,
    /// Year-to-date steps minus the steps expected by `date`.
    pub pace_steps: i64,
}

impl MetricsSnapshot {
    /// Pace with its ahead/behind classification.
    pub fn pace(&self) -> Pace {
        Pace::from_steps(self.pace_steps)
    }

    /// Windows in display order with their labels.
    pub fn windows(&self) -> [(&'static str, &WindowMetrics); 5] {
        [
            ("Today", &self.today),
            ("Last 7 days", &self.last7),
            ("This month", &self.month),
            ("Last 30 days", &self.last30),
            ("This year", &self.year),
        ]
    }
}

/// Computes snapshots and history summaries from a store.
#[derive(Clone)]
pub struct MetricsAggregator {
    store: Arc<dyn StepStore>,
    prefs: Arc<dyn GoalPreferences>,
}

impl MetricsAggregator {
    /// Create an aggregator over `store`, reading the goal from `prefs`.
    pub fn new(store: Arc<dyn StepStore>, prefs: Arc<dyn GoalPreferences>) -> Self {
        Self { store, prefs }
    }

    /// Snapshot for `today` using the stored yearly goal.
    pub fn snapshot(&self, today: Date) -> Result<MetricsSnapshot> {
        let goal = self.prefs.yearly_goal()?;
        self.compute_snapshot(today, goal)
    }

    /// Snapshot for `today` against an explicit yearly goal.
    pub fn compute_snapshot(&self, today: Date, goal: YearlyGoal) -> Result<MetricsSnapshot> {
        let windows = CalendarWindows::for_day(today);
        let goals = DerivedGoals::derive(goal, today);

        let sum = |r: DateRange| self.store.sum_range(r.start, r.end);

        let today_m = WindowMetrics::new(windows.today, sum(windows.today)?, goals.daily);
        let last7 = WindowMetrics::new(windows.last7, sum(windows.last7)?, goals.last7);
        let month = WindowMetrics::new(windows.month, sum(windows.month)?, goals.monthly);
        let last30 = WindowMetrics::new(windows.last30, sum(windows.last30)?, goals.last30);
        let year = WindowMetrics::new(windows.year, sum(windows.year)?, goals.yearly);

        let pace = Pace::new(year.steps, goals.expected_by(today));
        debug!(
            "Snapshot for {}: today={} ytd={} pace={}",
            today, today_m.steps, year.steps, pace.steps
        );

        Ok(MetricsSnapshot {
            date: today,
            yearly_goal: goal,
            today: today_m,
            last7,
            month,
            last30,
            year,
            pace_steps: pace.steps,
        })
    }

    /// Every stored day, newest first, against the daily goal.
    pub fn daily_list(&self) -> Result<Listing<Vec<DaySummary>>> {
        let records = self.store.all()?;
        let goal = self.prefs.yearly_goal()?;
        Ok(Listing::from_vec(summary::daily(&records, goal)))
    }

    /// Monday-aligned weekly totals, newest first.
    pub fn weekly_totals(&self) -> Result<Listing<Vec<WeekSummary>>> {
        let records = self.store.all()?;
        let goal = self.prefs.yearly_goal()?;
        Ok(Listing::from_vec(summary::weekly(&records, goal)))
    }

    /// Calendar-month totals, newest first.
    pub fn monthly_totals(&self) -> Result<Listing<Vec<MonthSummary>>> {
        let records = self.store.all()?;
        let goal = self.prefs.yearly_goal()?;
        Ok(Listing::from_vec(summary::monthly(&records, goal)))
    }
}
