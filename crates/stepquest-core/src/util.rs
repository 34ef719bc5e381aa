//! Utility functions for stepquest-core.

use time::{Date, OffsetDateTime, UtcOffset};
use tracing::debug;

/// The local UTC offset, or UTC when it cannot be determined.
///
/// On Unix the offset can only be read safely while the process is
/// single-threaded, so call this before starting an async runtime and
/// keep the result.
pub fn local_offset() -> UtcOffset {
    UtcOffset::current_local_offset().unwrap_or_else(|e| {
        debug!("Local offset unavailable ({}), using UTC", e);
        UtcOffset::UTC
    })
}

/// Today's calendar date at `offset`.
pub fn today_at(offset: UtcOffset) -> Date {
    OffsetDateTime::now_utc().to_offset(offset).date()
}

/// Format a step count with thousands separators (`1234567` -> `1,234,567`).
pub fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1000), "1,000");
        assert_eq!(group_thousands(3_000_000), "3,000,000");
        assert_eq!(group_thousands(12_345_678), "12,345,678");
    }

    #[test]
    fn test_today_at_utc_matches_now() {
        let today = today_at(UtcOffset::UTC);
        let now = OffsetDateTime::now_utc().date();
        // Allow for the test straddling midnight
        assert!(today == now || today.next_day() == Some(now));
    }
}
