//! Error types for stepquest-core.
//!
//! Two layers of errors exist:
//!
//! - [`SourceError`] describes why a data source (history provider, live
//!   step counter, HTTP endpoint) could not deliver. The reconciler never
//!   propagates these as failures; they surface as
//!   [`SyncOutcome::SourceUnavailable`](crate::SyncOutcome::SourceUnavailable)
//!   so callers can tell "no access" apart from "zero steps".
//! - [`Error`] is for failures that abort an operation, chiefly the store.
//!
//! # Error Classification
//!
//! | Error | Retried by [`crate::with_retry`] |
//! |-------|----------------------------------|
//! | [`SourceError::Unreachable`] | yes |
//! | [`SourceError::Timeout`] | yes |
//! | [`SourceError::NotInstalled`] | no |
//! | [`SourceError::PermissionDenied`] | no |
//! | [`SourceError::InvalidResponse`] | no |

use std::time::Duration;

use thiserror::Error;

/// Why a step data source could not deliver.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new error variants
/// in future versions without breaking downstream code.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum SourceError {
    /// The provider is not installed, not configured, or the endpoint does
    /// not exist.
    #[error("{0} is not available")]
    NotInstalled(String),

    /// The user has not granted access to step data.
    #[error("Permission denied by {0}")]
    PermissionDenied(String),

    /// The provider could not be reached (network down, service stopped).
    #[error("{name} is unreachable: {reason}")]
    Unreachable {
        /// Source name.
        name: String,
        /// Underlying cause.
        reason: String,
    },

    /// The provider answered with data that could not be understood.
    #[error("Invalid response from {name}: {reason}")]
    InvalidResponse {
        /// Source name.
        name: String,
        /// What was wrong with it.
        reason: String,
    },

    /// The provider did not answer in time.
    #[error("Operation '{operation}' timed out after {duration:?}")]
    Timeout {
        /// The operation that timed out.
        operation: String,
        /// The timeout duration.
        duration: Duration,
    },
}

impl SourceError {
    /// Create an unreachable error.
    pub fn unreachable(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Unreachable {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Create an invalid-response error.
    pub fn invalid_response(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidResponse {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Create a timeout error with operation context.
    pub fn timeout(operation: impl Into<String>, duration: Duration) -> Self {
        Self::Timeout {
            operation: operation.into(),
            duration,
        }
    }

    /// Whether retrying the same request may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Unreachable { .. } | Self::Timeout { .. })
    }
}

/// Errors that abort a reconciliation or metrics operation.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The store failed to read or write.
    #[error("Store failure: {0}")]
    Store(#[from] stepquest_store::Error),

    /// A source failed where the caller asked for a hard error.
    #[error("Source unavailable: {0}")]
    SourceUnavailable(#[from] SourceError),

    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// I/O error while reading an import or writing an export.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a configuration error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig(message.into())
    }
}

/// Result type alias using stepquest-core's Error type.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_error_display() {
        let err = SourceError::NotInstalled("Health service".to_string());
        assert_eq!(err.to_string(), "Health service is not available");

        let err = SourceError::unreachable("http", "connection refused");
        assert!(err.to_string().contains("connection refused"));

        let err = SourceError::timeout("fetch_days", Duration::from_secs(10));
        assert!(err.to_string().contains("fetch_days"));
        assert!(err.to_string().contains("10s"));
    }

    #[test]
    fn test_transient_classification() {
        assert!(SourceError::unreachable("x", "y").is_transient());
        assert!(SourceError::timeout("x", Duration::from_secs(1)).is_transient());
        assert!(!SourceError::PermissionDenied("x".into()).is_transient());
        assert!(!SourceError::NotInstalled("x".into()).is_transient());
        assert!(!SourceError::invalid_response("x", "y").is_transient());
    }

    #[test]
    fn test_store_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only");
        let err: Error = stepquest_store::Error::Io(io_err).into();
        assert!(matches!(err, Error::Store(_)));
        assert!(err.to_string().contains("read-only"));
    }
}
