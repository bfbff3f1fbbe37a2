//! Error types for culprit.
//!
//! All errors are strongly typed using thiserror. Engine-side usage
//! errors are separated from collaborator errors so callers can pattern
//! match on the condition and decide between retrying a round and
//! abandoning the session.

use thiserror::Error;

use crate::host::{PersistError, ToggleError};

/// Usage errors: an engine operation was invoked in the wrong phase.
///
/// These are programmer errors in the calling sequence. They are never
/// recovered automatically and never mutate session state.
#[derive(Debug, Error)]
pub enum UsageError {
    #[error("cannot start a bisection over an empty candidate set")]
    EmptyCandidateSet,

    #[error("a search is already in progress")]
    SearchInProgress,

    #[error("no search is in progress")]
    NoSearchInProgress,

    #[error("previous result has not been cleared; reset first")]
    ResultNotCleared,

    #[error("persisted session is corrupt: {reason}")]
    CorruptSession { reason: String },
}

/// Top-level error type for culprit.
///
/// Encompasses engine usage errors and both collaborator error classes.
#[derive(Debug, Error)]
pub enum BisectError {
    #[error("usage error: {0}")]
    Usage(#[from] UsageError),

    #[error("toggle error: {0}")]
    Toggle(#[from] ToggleError),

    #[error("persistence error: {0}")]
    Persist(#[from] PersistError),
}

impl BisectError {
    /// Returns true if this is a usage error.
    #[must_use]
    pub const fn is_usage(&self) -> bool {
        matches!(self, Self::Usage(_))
    }

    /// Returns true if this error originated in the toggle collaborator.
    #[must_use]
    pub const fn is_toggle(&self) -> bool {
        matches!(self, Self::Toggle(_))
    }

    /// Returns true if this error originated in the session store.
    #[must_use]
    pub const fn is_persist(&self) -> bool {
        matches!(self, Self::Persist(_))
    }

    /// Returns true if retrying the same round may succeed.
    ///
    /// Usage errors won't change on retry; collaborator failures are
    /// usually transient, except a session record that fails to decode.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Usage(_) => false,
            Self::Toggle(_) => true,
            Self::Persist(e) => !matches!(e, PersistError::Decode(_) | PersistError::Encode(_)),
        }
    }
}

/// Result type alias for culprit operations.
pub type BisectResult<T> = Result<T, BisectError>;
