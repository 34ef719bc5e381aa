//! Variant results for sync and list operations.

use serde::Serialize;

use crate::error::SourceError;

/// Result of one sync channel.
///
/// Store failures are not represented here; they travel as
/// [`Error`](crate::Error).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum SyncOutcome<T> {
    /// Data was fetched and written.
    Synced(T),
    /// The source answered but had nothing to report.
    Empty,
    /// The source could not be used.
    SourceUnavailable(#[serde(serialize_with = "serialize_display")] SourceError),
}

impl<T> SyncOutcome<T> {
    /// Whether data was written.
    pub fn is_synced(&self) -> bool {
        matches!(self, Self::Synced(_))
    }

    /// The unavailability reason, if any.
    pub fn unavailable(&self) -> Option<&SourceError> {
        match self {
            Self::SourceUnavailable(e) => Some(e),
            _ => None,
        }
    }

    /// Map the synced value.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> SyncOutcome<U> {
        match self {
            Self::Synced(v) => SyncOutcome::Synced(f(v)),
            Self::Empty => SyncOutcome::Empty,
            Self::SourceUnavailable(e) => SyncOutcome::SourceUnavailable(e),
        }
    }
}

/// Result of a list query: the store being empty is not an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Listing<T> {
    /// At least one item.
    Items(T),
    /// The store holds no records.
    Empty,
}

impl<T> Listing<T> {
    /// Convert to an `Option`.
    pub fn into_option(self) -> Option<T> {
        match self {
            Self::Items(v) => Some(v),
            Self::Empty => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
}

impl<T> Listing<Vec<T>> {
    /// `Empty` for an empty vector, `Items` otherwise.
    pub fn from_vec(items: Vec<T>) -> Self {
        if items.is_empty() {
            Self::Empty
        } else {
            Self::Items(items)
        }
    }
}

fn serialize_display<S: serde::Serializer>(
    err: &SourceError,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_str(err)
}
