//! Calendar window arithmetic.
//!
//! Every range here is closed: both `start` and `end` are included. Week
//! windows follow ISO 8601 and start on Monday, so the week containing
//! January 1st may start in the previous year. Month and year windows never
//! leave their own year.
//!
//! Arithmetic saturates at the limits of [`Date`] instead of panicking, so
//! any valid date is acceptable input.

use time::{Date, Duration, Month};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A closed `[start, end]` range of calendar dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DateRange {
    /// First date in the range.
    #[cfg_attr(feature = "serde", serde(with = "crate::types::iso_date"))]
    pub start: Date,
    /// Last date in the range (inclusive).
    #[cfg_attr(feature = "serde", serde(with = "crate::types::iso_date"))]
    pub end: Date,
}

impl DateRange {
    /// Create a range. `start` and `end` are swapped if given out of order.
    #[must_use]
    pub fn new(start: Date, end: Date) -> Self {
        if start <= end {
            Self { start, end }
        } else {
            Self {
                start: end,
                end: start,
            }
        }
    }

    /// A range covering a single day.
    #[must_use]
    pub fn single(day: Date) -> Self {
        Self {
            start: day,
            end: day,
        }
    }

    /// The `len` days ending on `end` (rolling window).
    ///
    /// `len` of zero is treated as one.
    ///
    /// ```
    /// use stepquest_types::DateRange;
    /// use time::macros::date;
    ///
    /// let week = DateRange::trailing(date!(2024 - 03 - 10), 7);
    /// assert_eq!(week.start, date!(2024 - 03 - 04));
    /// assert_eq!(week.days(), 7);
    /// ```
    #[must_use]
    pub fn trailing(end: Date, len: u32) -> Self {
        let back = i64::from(len.max(1)) - 1;
        Self {
            start: end.saturating_sub(Duration::days(back)),
            end,
        }
    }

    /// Whether `date` falls inside the range.
    #[must_use]
    pub fn contains(&self, date: Date) -> bool {
        self.start <= date && date <= self.end
    }

    /// Number of days in the range, counting both endpoints.
    #[must_use]
    pub fn days(&self) -> i64 {
        (self.end - self.start).whole_days() + 1
    }

    /// Iterate every date in the range, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = Date> + use<> {
        let end = self.end;
        std::iter::successors(Some(self.start), move |d| {
            if *d < end { d.next_day() } else { None }
        })
    }
}

/// First day (Monday) of the ISO week containing `date`.
#[must_use]
pub fn week_start(date: Date) -> Date {
    let offset = i64::from(date.weekday().number_days_from_monday());
    date.saturating_sub(Duration::days(offset))
}

/// First day of the month containing `date`.
#[must_use]
pub fn month_start(date: Date) -> Date {
    date.saturating_sub(Duration::days(i64::from(date.day()) - 1))
}

/// First day of the year containing `date`.
#[must_use]
pub fn year_start(date: Date) -> Date {
    date.saturating_sub(Duration::days(i64::from(date.ordinal()) - 1))
}

/// Number of days in the month containing `date`.
///
/// ```
/// use stepquest_types::days_in_month;
/// use time::macros::date;
///
/// assert_eq!(days_in_month(date!(2024 - 02 - 10)), 29);
/// assert_eq!(days_in_month(date!(2023 - 02 - 10)), 28);
/// ```
#[must_use]
pub fn days_in_month(date: Date) -> u8 {
    match date.month() {
        Month::February => {
            if time::util::is_leap_year(date.year()) {
                29
            } else {
                28
            }
        }
        Month::April | Month::June | Month::September | Month::November => 30,
        _ => 31,
    }
}

/// 1-based position of `date` within its year (January 1st is 1).
#[must_use]
pub fn day_of_year(date: Date) -> u16 {
    date.ordinal()
}

/// The calendar windows used by the dashboard, all ending on `today`.
///
/// ```
/// use stepquest_types::CalendarWindows;
/// use time::macros::date;
///
/// let w = CalendarWindows::for_day(date!(2024 - 03 - 15));
/// assert_eq!(w.last7.start, date!(2024 - 03 - 09));
/// assert_eq!(w.month.start, date!(2024 - 03 - 01));
/// assert_eq!(w.last30.start, date!(2024 - 02 - 15));
/// assert_eq!(w.year.start, date!(2024 - 01 - 01));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarWindows {
    /// The reference day.
    pub today: DateRange,
    /// Monday of this ISO week through today.
    pub week: DateRange,
    /// Rolling seven days (`today - 6` through today).
    pub last7: DateRange,
    /// First of the month through today.
    pub month: DateRange,
    /// Rolling thirty days (`today - 29` through today).
    pub last30: DateRange,
    /// January 1st through today.
    pub year: DateRange,
}

impl CalendarWindows {
    /// Compute every window for `today`.
    #[must_use]
    pub fn for_day(today: Date) -> Self {
        Self {
            today: DateRange::single(today),
            week: DateRange::new(week_start(today), today),
            last7: DateRange::trailing(today, 7),
            month: DateRange::new(month_start(today), today),
            last30: DateRange::trailing(today, 30),
            year: DateRange::new(year_start(today), today),
        }
    }
}
