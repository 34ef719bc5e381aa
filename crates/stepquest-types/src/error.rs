//! Error types for parsing step data in stepquest-types.

use thiserror::Error;

/// Errors that can occur when parsing user-supplied step data.
///
/// These errors describe a single malformed value (one import row, one
/// command-line argument). They are recoverable: importers skip the row
/// and continue with the rest of the batch.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new error variants
/// in future versions without breaking downstream code.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ParseError {
    /// The date is not a valid ISO 8601 calendar date (`YYYY-MM-DD`).
    #[error("Invalid date: '{0}' (expected YYYY-MM-DD)")]
    InvalidDate(String),

    /// The step count is not an integer.
    #[error("Invalid step count: '{0}'")]
    InvalidSteps(String),

    /// The step count is an integer but below zero.
    #[error("Negative step count: {0}")]
    NegativeSteps(i64),

    /// A row had fewer columns than required.
    #[error("Expected at least {expected} columns, found {found}")]
    MissingColumn {
        /// Columns required.
        expected: usize,
        /// Columns present.
        found: usize,
    },

    /// The row could not be decoded (invalid UTF-8 or broken quoting).
    #[error("Malformed row: {0}")]
    Malformed(String),

    /// A yearly goal must be a positive number of steps.
    #[error("Invalid yearly goal: {0} (must be greater than zero)")]
    InvalidGoal(i64),
}

/// Result type alias using stepquest-types' ParseError type.
pub type ParseResult<T> = std::result::Result<T, ParseError>;
