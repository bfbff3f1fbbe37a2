//! Abstract host contracts.
//!
//! These traits define what the surrounding system must provide for a
//! bisection to run against real candidates. Implementations are thin
//! I/O wrappers; the search logic never leaks into them.

use thiserror::Error;

use crate::candidate::{Candidate, CandidateId};
use crate::engine::Verdict;
use crate::partition::Partition;
use crate::session::Session;

/// Errors raised by the candidate host.
#[derive(Debug, Error)]
pub enum ToggleError {
    /// The host has no entry for this identifier.
    #[error("unknown candidate: {0}")]
    UnknownCandidate(CandidateId),

    /// The underlying system refuses to change this entry's state.
    #[error("candidate {0} may not be toggled")]
    NotToggleable(CandidateId),

    /// Any other host-side failure.
    #[error("host backend error: {0}")]
    Backend(String),
}

/// Errors raised by the session store.
#[derive(Debug, Error)]
pub enum PersistError {
    /// Reading or writing the backing storage failed.
    #[error("session store I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A stored session record failed to decode.
    #[error("stored session failed to decode: {0}")]
    Decode(#[source] serde_json::Error),

    /// A session failed to encode for storage.
    #[error("session failed to encode: {0}")]
    Encode(#[source] serde_json::Error),
}

/// Enumerates the candidates a session may bisect over.
///
/// Implementations must pre-filter: only entries that are currently
/// enabled, actually toggleable, and not the bisection harness itself
/// belong in the returned ordering.
pub trait CandidateSource: Send + Sync {
    /// Lists the toggleable candidates in a stable order.
    fn list_toggleable(&self) -> Result<Vec<Candidate>, ToggleError>;
}

/// Flips the real enabled state of candidates.
pub trait Toggler: Send + Sync {
    /// Sets the enabled state of one candidate.
    fn set_enabled(&self, id: &CandidateId, enabled: bool) -> Result<(), ToggleError>;

    /// Reads the current enabled state of one candidate.
    fn is_enabled(&self, id: &CandidateId) -> Result<bool, ToggleError>;

    /// Reloads the monitored system after a sweep, if it needs one
    /// before the next probe. Default: nothing to do.
    fn refresh(&self) -> Result<(), ToggleError> {
        Ok(())
    }
}

/// Persists sessions between rounds and across process restarts.
pub trait SessionStore: Send + Sync {
    /// Loads the stored session, if any.
    fn load(&self) -> Result<Option<Session>, PersistError>;

    /// Stores the given session, replacing any previous record.
    fn save(&self, session: &Session) -> Result<(), PersistError>;
}

/// Receives progress updates. Purely observational; implementations
/// must not call back into the search.
pub trait ProgressSink: Send + Sync {
    /// A new partition is in effect; roughly `steps_remaining` rounds left.
    fn on_partition(&self, _partition: &Partition, _steps_remaining: u32) {}

    /// The search isolated a candidate.
    fn on_terminal(&self, _verdict: &Verdict) {}

    /// The session was reset and all candidates restored.
    fn on_cleared(&self) {}
}
