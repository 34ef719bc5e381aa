//! Goal derivation and progress maths.

use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use time::Date;

use crate::calendar::{day_of_year, days_in_month};
use crate::types::YearlyGoal;

/// Days used to split a yearly goal. Leap years are not special-cased.
pub const DAYS_PER_GOAL_YEAR: u64 = 365;

/// Pace magnitude at which [`Pace::intensity`] saturates.
pub const PACE_INTENSITY_SCALE: f64 = 100_000.0;

/// Per-window goals derived from a yearly target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DerivedGoals {
    /// `yearly / 365`, truncated.
    pub daily: u64,
    /// `daily * 7`.
    pub last7: u64,
    /// `daily * days in the reference month`.
    pub monthly: u64,
    /// `daily * 30`.
    pub last30: u64,
    /// The yearly target itself.
    pub yearly: u64,
}

impl DerivedGoals {
    /// Derive all goals for the month containing `reference`.
    ///
    /// ```
    /// use stepquest_types::{DerivedGoals, YearlyGoal};
    /// use time::macros::date;
    ///
    /// let goals = DerivedGoals::derive(YearlyGoal::default(), date!(2024 - 02 - 10));
    /// assert_eq!(goals.daily, 8219);
    /// assert_eq!(goals.last7, 57533);
    /// assert_eq!(goals.monthly, 8219 * 29);
    /// ```
    #[must_use]
    pub fn derive(goal: YearlyGoal, reference: Date) -> Self {
        derive_goals(goal.get(), reference)
    }

    /// Steps that should have been walked by the end of `reference`.
    #[must_use]
    pub fn expected_by(&self, reference: Date) -> u64 {
        self.daily * u64::from(day_of_year(reference))
    }
}

/// Derive goals from a raw yearly target.
///
/// A target of zero yields all-zero goals, which [`calculate_percent`]
/// reports as 0%.
#[must_use]
pub fn derive_goals(yearly: u64, reference: Date) -> DerivedGoals {
    let daily = yearly / DAYS_PER_GOAL_YEAR;
    DerivedGoals {
        daily,
        last7: daily * 7,
        monthly: daily * u64::from(days_in_month(reference)),
        last30: daily * 30,
        yearly,
    }
}

/// Integer percentage of `goal` reached by `steps`, rounded down.
///
/// Returns 0 when `goal` is 0. Not clamped: 150 means the goal was beaten
/// by half.
///
/// ```
/// use stepquest_types::calculate_percent;
///
/// assert_eq!(calculate_percent(0, 0), 0);
/// assert_eq!(calculate_percent(500, 1000), 50);
/// assert_eq!(calculate_percent(1500, 1000), 150);
/// ```
#[must_use]
pub fn calculate_percent(steps: u64, goal: u64) -> u64 {
    if goal == 0 {
        return 0;
    }
    let pct = u128::from(steps) * 100 / u128::from(goal);
    u64::try_from(pct).unwrap_or(u64::MAX)
}

/// Whether the user is ahead of, behind, or exactly on the yearly pace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum PaceStatus {
    Ahead,
    Behind,
    OnPace,
}

impl fmt::Display for PaceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaceStatus::Ahead => write!(f, "ahead"),
            PaceStatus::Behind => write!(f, "behind"),
            PaceStatus::OnPace => write!(f, "on pace"),
        }
    }
}

/// Signed distance between year-to-date steps and the expected total.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Pace {
    /// Positive when ahead, negative when behind.
    pub steps: i64,
    pub status: PaceStatus,
}

impl Pace {
    /// Compare `year_to_date` with `expected`.
    ///
    /// ```
    /// use stepquest_types::{Pace, PaceStatus};
    ///
    /// let pace = Pace::new(90_000, 100_000);
    /// assert_eq!(pace.steps, -10_000);
    /// assert_eq!(pace.status, PaceStatus::Behind);
    /// ```
    #[must_use]
    pub fn new(year_to_date: u64, expected: u64) -> Self {
        Self::from_steps(saturating_signed(year_to_date) - saturating_signed(expected))
    }

    /// Wrap an already computed pace difference.
    #[must_use]
    pub fn from_steps(steps: i64) -> Self {
        let status = match steps {
            s if s > 0 => PaceStatus::Ahead,
            s if s < 0 => PaceStatus::Behind,
            _ => PaceStatus::OnPace,
        };
        Self { steps, status }
    }

    /// Magnitude scaled into `0.0..=1.0` for colouring.
    #[must_use]
    pub fn intensity(&self) -> f64 {
        (self.steps.unsigned_abs() as f64 / PACE_INTENSITY_SCALE).min(1.0)
    }
}

impl fmt::Display for Pace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            PaceStatus::OnPace => write!(f, "on pace"),
            status => write!(f, "{} steps {}", self.steps.unsigned_abs(), status),
        }
    }
}

fn saturating_signed(v: u64) -> i64 {
    i64::try_from(v).unwrap_or(i64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use time::macros::date;

    #[test]
    fn test_default_goal_derivation() {
        let goals = derive_goals(3_000_000, date!(2024 - 06 - 15));
        assert_eq!(goals.daily, 8219);
        assert_eq!(goals.last7, 57_533);
        assert_eq!(goals.last30, 246_570);
        assert_eq!(goals.monthly, 8219 * 30);
        assert_eq!(goals.yearly, 3_000_000);
    }

    #[test]
    fn test_monthly_goal_follows_month_length() {
        assert_eq!(derive_goals(365_000, date!(2023 - 02 - 01)).monthly, 28_000);
        assert_eq!(derive_goals(365_000, date!(2024 - 02 - 01)).monthly, 29_000);
        assert_eq!(derive_goals(365_000, date!(2024 - 01 - 31)).monthly, 31_000);
    }

    #[test]
    fn test_leap_year_still_divides_by_365() {
        let goals = derive_goals(366_000, date!(2024 - 12 - 31));
        assert_eq!(goals.daily, 1002);
    }

    #[test]
    fn test_zero_target_gives_zero_goals() {
        let goals = derive_goals(0, date!(2024 - 03 - 01));
        assert_eq!(goals.daily, 0);
        assert_eq!(goals.monthly, 0);
        assert_eq!(calculate_percent(1000, goals.daily), 0);
    }

    #[test]
    fn test_calculate_percent() {
        assert_eq!(calculate_percent(0, 0), 0);
        assert_eq!(calculate_percent(500, 0), 0);
        assert_eq!(calculate_percent(500, 1000), 50);
        assert_eq!(calculate_percent(999, 1000), 99);
        assert_eq!(calculate_percent(1500, 1000), 150);
        assert_eq!(calculate_percent(u64::MAX, 1), u64::MAX);
    }

    #[test]
    fn test_pace_behind_scenario() {
        let goals = DerivedGoals::derive(
            YearlyGoal::new(3_650_000).unwrap(),
            date!(2024 - 01 - 10),
        );
        let expected = goals.expected_by(date!(2024 - 01 - 10));
        assert_eq!(expected, 100_000);

        let pace = Pace::new(90_000, expected);
        assert_eq!(pace.steps, -10_000);
        assert_eq!(pace.status, PaceStatus::Behind);
        assert_eq!(pace.to_string(), "10000 steps behind");
    }

    #[test]
    fn test_pace_status() {
        assert_eq!(Pace::from_steps(1).status, PaceStatus::Ahead);
        assert_eq!(Pace::from_steps(0).status, PaceStatus::OnPace);
        assert_eq!(Pace::from_steps(0).to_string(), "on pace");
    }

    #[test]
    fn test_pace_intensity() {
        assert_eq!(Pace::from_steps(0).intensity(), 0.0);
        assert!((Pace::from_steps(-50_000).intensity() - 0.5).abs() < f64::EPSILON);
        assert_eq!(Pace::from_steps(250_000).intensity(), 1.0);
    }

    proptest! {
        #[test]
        fn prop_percent_monotonic_in_steps(a in 0u64..10_000_000, b in 0u64..10_000_000, goal in 1u64..10_000_000) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(calculate_percent(lo, goal) <= calculate_percent(hi, goal));
        }

        #[test]
        fn prop_meeting_goal_is_at_least_100(goal in 1u64..10_000_000, extra in 0u64..10_000_000) {
            prop_assert!(calculate_percent(goal + extra, goal) >= 100);
        }

        #[test]
        fn prop_derived_goals_scale_from_daily(yearly in 0u64..100_000_000) {
            let goals = derive_goals(yearly, date!(2024 - 04 - 15));
            prop_assert_eq!(goals.daily, yearly / 365);
            prop_assert_eq!(goals.last7, goals.daily * 7);
            prop_assert_eq!(goals.last30, goals.daily * 30);
            prop_assert_eq!(goals.monthly, goals.daily * 30);
        }
    }
}
