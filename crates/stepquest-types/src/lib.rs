//! Platform-agnostic types for step-count tracking.
//!
//! This crate provides the shared vocabulary used by the store, the
//! reconciliation engine and every front end. It performs no I/O.
//!
//! # Features
//!
//! - `DailySteps` records keyed by calendar date
//! - `YearlyGoal` and the goals derived from it
//! - Calendar windows (today, ISO week, month, year, rolling 7 and 30 days)
//! - Error types for parsing user-supplied step data
//!
//! # Example
//!
//! ```
//! use stepquest_types::{CalendarWindows, DerivedGoals, YearlyGoal, calculate_percent};
//! use time::macros::date;
//!
//! let today = date!(2024 - 03 - 15);
//! let windows = CalendarWindows::for_day(today);
//! let goals = DerivedGoals::derive(YearlyGoal::default(), today);
//!
//! assert_eq!(windows.month.days(), 15);
//! assert_eq!(calculate_percent(4_110, goals.daily), 50);
//! ```

pub mod calendar;
pub mod error;
pub mod goals;
pub mod types;

pub use calendar::{
    CalendarWindows, DateRange, day_of_year, days_in_month, month_start, week_start, year_start,
};
pub use error::{ParseError, ParseResult};
pub use goals::{DerivedGoals, Pace, PaceStatus, calculate_percent, derive_goals};
pub use types::{DEFAULT_YEARLY_GOAL, DailySteps, YearlyGoal, format_date, parse_date, parse_steps};
