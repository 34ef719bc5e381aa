//! Core types for step data.

use core::fmt;
use core::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use time::Date;
use time::macros::format_description;

use crate::error::{ParseError, ParseResult};

/// Yearly goal applied when the user never set one.
pub const DEFAULT_YEARLY_GOAL: u64 = 3_000_000;

/// Format a date as ISO 8601 `YYYY-MM-DD`.
///
/// This is the storage key format: lexicographic order equals
/// chronological order for four-digit years.
///
/// ```
/// use stepquest_types::format_date;
/// use time::macros::date;
///
/// assert_eq!(format_date(date!(2024 - 02 - 29)), "2024-02-29");
/// ```
#[must_use]
pub fn format_date(date: Date) -> String {
    format!(
        "{:04}-{:02}-{:02}",
        date.year(),
        u8::from(date.month()),
        date.day()
    )
}

/// Parse an ISO 8601 `YYYY-MM-DD` date.
///
/// Surrounding whitespace is ignored. Anything else (other separators,
/// missing zero padding, impossible days such as `2023-02-29`) is rejected.
///
/// ```
/// use stepquest_types::parse_date;
///
/// assert!(parse_date("2024-01-01").is_ok());
/// assert!(parse_date("2023-02-29").is_err());
/// assert!(parse_date("not-a-date").is_err());
/// ```
pub fn parse_date(s: &str) -> ParseResult<Date> {
    let trimmed = s.trim();
    Date::parse(trimmed, format_description!("[year]-[month]-[day]"))
        .map_err(|_| ParseError::InvalidDate(trimmed.to_string()))
}

/// Parse a step count, rejecting non-integers and negative values.
///
/// ```
/// use stepquest_types::{ParseError, parse_steps};
///
/// assert_eq!(parse_steps(" 1200 "), Ok(1200));
/// assert_eq!(parse_steps("-5"), Err(ParseError::NegativeSteps(-5)));
/// ```
pub fn parse_steps(s: &str) -> ParseResult<u64> {
    let trimmed = s.trim();
    let value: i64 = trimmed
        .parse()
        .map_err(|_| ParseError::InvalidSteps(trimmed.to_string()))?;
    u64::try_from(value).map_err(|_| ParseError::NegativeSteps(value))
}

/// Steps attributed to one calendar date.
///
/// The date is the unique key: a store holds at most one `DailySteps` per
/// date, and a newer sample replaces the old value wholesale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DailySteps {
    /// Calendar date (local to the user).
    #[cfg_attr(feature = "serde", serde(with = "iso_date"))]
    pub date: Date,
    /// Steps counted on that date.
    pub steps: u64,
}

impl DailySteps {
    /// Create a record for `date`.
    #[must_use]
    pub fn new(date: Date, steps: u64) -> Self {
        Self { date, steps }
    }
}

impl fmt::Display for DailySteps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} steps", format_date(self.date), self.steps)
    }
}

/// The user's target number of steps for a whole year.
///
/// Always positive. Use [`YearlyGoal::default`] for the 3,000,000 step
/// default.
///
/// ```
/// use stepquest_types::YearlyGoal;
///
/// let goal: YearlyGoal = "3650000".parse().unwrap();
/// assert_eq!(goal.get(), 3_650_000);
/// assert!(YearlyGoal::new(0).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "u64", into = "u64"))]
pub struct YearlyGoal(u64);

impl YearlyGoal {
    /// Create a goal, rejecting zero.
    pub fn new(steps: u64) -> ParseResult<Self> {
        if steps == 0 {
            return Err(ParseError::InvalidGoal(0));
        }
        Ok(Self(steps))
    }

    /// Total steps planned for the year.
    #[must_use]
    pub fn get(self) -> u64 {
        self.0
    }
}

impl Default for YearlyGoal {
    fn default() -> Self {
        Self(DEFAULT_YEARLY_GOAL)
    }
}

impl TryFrom<u64> for YearlyGoal {
    type Error = ParseError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<YearlyGoal> for u64 {
    fn from(goal: YearlyGoal) -> Self {
        goal.0
    }
}

impl FromStr for YearlyGoal {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim().replace(['_', ','], "");
        let value: i64 = trimmed
            .parse()
            .map_err(|_| ParseError::InvalidSteps(s.trim().to_string()))?;
        match u64::try_from(value) {
            Ok(steps) if steps > 0 => Ok(Self(steps)),
            _ => Err(ParseError::InvalidGoal(value)),
        }
    }
}

impl fmt::Display for YearlyGoal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Serde adapter that reads and writes a [`Date`] as `YYYY-MM-DD`.
#[cfg(feature = "serde")]
pub mod iso_date {
    use serde::{Deserialize, Deserializer, Serializer};
    use time::Date;

    /// Serialize a date as `YYYY-MM-DD`.
    pub fn serialize<S: Serializer>(date: &Date, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format_date(*date))
    }

    /// Deserialize a date from `YYYY-MM-DD`.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Date, D::Error> {
        let s = String::deserialize(deserializer)?;
        super::parse_date(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    #[test]
    fn test_format_date_pads_components() {
        assert_eq!(format_date(date!(2024 - 01 - 05)), "2024-01-05");
        assert_eq!(format_date(date!(2023 - 12 - 31)), "2023-12-31");
    }

    #[test]
    fn test_parse_date_valid() {
        assert_eq!(parse_date("2024-02-29").unwrap(), date!(2024 - 02 - 29));
        assert_eq!(parse_date("  2023-12-31 ").unwrap(), date!(2023 - 12 - 31));
    }

    #[test]
    fn test_parse_date_rejects_invalid() {
        assert!(matches!(parse_date("2023-02-29"), Err(ParseError::InvalidDate(_))));
        assert!(parse_date("2024/01/01").is_err());
        assert!(parse_date("date").is_err());
        assert!(parse_date("").is_err());
    }

    #[test]
    fn test_parse_steps() {
        assert_eq!(parse_steps("0"), Ok(0));
        assert_eq!(parse_steps("12345"), Ok(12345));
        assert_eq!(parse_steps("-1"), Err(ParseError::NegativeSteps(-1)));
        assert!(matches!(parse_steps("12.5"), Err(ParseError::InvalidSteps(_))));
        assert!(matches!(parse_steps("abc"), Err(ParseError::InvalidSteps(_))));
    }

    #[test]
    fn test_yearly_goal_default() {
        assert_eq!(YearlyGoal::default().get(), 3_000_000);
    }

    #[test]
    fn test_yearly_goal_from_str() {
        assert_eq!("1_000_000".parse::<YearlyGoal>().unwrap().get(), 1_000_000);
        assert_eq!("2,500,000".parse::<YearlyGoal>().unwrap().get(), 2_500_000);
        assert_eq!("0".parse::<YearlyGoal>(), Err(ParseError::InvalidGoal(0)));
        assert_eq!("-10".parse::<YearlyGoal>(), Err(ParseError::InvalidGoal(-10)));
        assert!(matches!(
            "lots".parse::<YearlyGoal>(),
            Err(ParseError::InvalidSteps(_))
        ));
    }

    #[test]
    fn test_daily_steps_display() {
        let record = DailySteps::new(date!(2024 - 03 - 01), 4200);
        assert_eq!(record.to_string(), "2024-03-01: 4200 steps");
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_daily_steps_json_uses_iso_date() {
        let record = DailySteps::new(date!(2024 - 03 - 01), 4200);
        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(json, r#"{"date":"2024-03-01","steps":4200}"#);

        let back: DailySteps = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_yearly_goal_serde_rejects_zero() {
        assert!(serde_json::from_str::<YearlyGoal>("0").is_err());
        let goal: YearlyGoal = serde_json::from_str("3650000").unwrap();
        assert_eq!(goal.get(), 3_650_000);
    }
}
