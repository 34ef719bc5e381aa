//! Day, week and month summaries of stored history.
//!
//! Pure functions over a slice of records; the store access lives in
//! [`MetricsAggregator`](crate::MetricsAggregator). Every list is newest
//! first regardless of the input order.

use std::collections::BTreeMap;

use serde::Serialize;
use time::{Date, Duration, Month};

use stepquest_types::types::iso_date;
use stepquest_types::{
    DailySteps, YearlyGoal, calculate_percent, days_in_month, derive_goals, month_start,
    week_start,
};

/// Weeks used to split a yearly goal into a weekly one.
pub const WEEKS_PER_GOAL_YEAR: u64 = 52;

/// One stored day against the daily goal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DaySummary {
    #[serde(with = "iso_date")]
    pub date: Date,
    pub steps: u64,
    pub goal: u64,
    pub goal_met: bool,
}

/// Total for one Monday-to-Sunday week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WeekSummary {
    #[serde(with = "iso_date")]
    pub week_start: Date,
    #[serde(with = "iso_date")]
    pub week_end: Date,
    pub total: u64,
    /// `yearly / 52`.
    pub goal: u64,
    pub goal_met: bool,
}

/// Total for one calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MonthSummary {
    pub year: i32,
    pub month: Month,
    pub total: u64,
    /// Daily goal times the number of days in the month.
    pub goal: u64,
    pub percent: u64,
    pub goal_met: bool,
}

impl MonthSummary {
    /// Label such as `March 2024`.
    pub fn label(&self) -> String {
        format!("{} {}", self.month, self.year)
    }
}

/// Each record against the daily goal, newest first.
pub fn daily(records: &[DailySteps], goal: YearlyGoal) -> Vec<DaySummary> {
    let mut days: Vec<DaySummary> = records
        .iter()
        .map(|r| {
            let daily_goal = derive_goals(goal.get(), r.date).daily;
            DaySummary {
                date: r.date,
                steps: r.steps,
                goal: daily_goal,
                goal_met: r.steps >= daily_goal,
            }
        })
        .collect();
    days.sort_by(|a, b| b.date.cmp(&a.date));
    days
}

/// Totals grouped by ISO week, newest first.
pub fn weekly(records: &[DailySteps], goal: YearlyGoal) -> Vec<WeekSummary> {
    let weekly_goal = goal.get() / WEEKS_PER_GOAL_YEAR;

    group_totals(records, week_start)
        .into_iter()
        .rev()
        .map(|(start, total)| WeekSummary {
            week_start: start,
            week_end: start.saturating_add(Duration::days(6)),
            total,
            goal: weekly_goal,
            goal_met: total >= weekly_goal,
        })
        .collect()
}

/// Totals grouped by calendar month, newest first.
pub fn monthly(records: &[DailySteps], goal: YearlyGoal) -> Vec<MonthSummary> {
    group_totals(records, month_start)
        .into_iter()
        .rev()
        .map(|(start, total)| {
            let month_goal =
                derive_goals(goal.get(), start).daily * u64::from(days_in_month(start));
            MonthSummary {
                year: start.year(),
                month: start.month(),
                total,
                goal: month_goal,
                percent: calculate_percent(total, month_goal),
                goal_met: total >= month_goal,
            }
        })
        .collect()
}

fn group_totals(records: &[DailySteps], key: impl Fn(Date) -> Date) -> BTreeMap<Date, u64> {
    let mut groups = BTreeMap::new();
    for r in records {
        let total: &mut u64 = groups.entry(key(r.date)).or_default();
        *total = total.saturating_add(r.steps);
    }
    groups
}
