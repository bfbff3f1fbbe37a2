//! Session state for a bisection run.
//!
//! A [`Session`] is the complete, serializable state of one in-progress
//! or completed search: the candidate snapshot, the suspect range, and
//! the terminal result. It is a plain value with no behavior beyond
//! derivation and integrity checks; all transitions live in
//! [`BisectEngine`](crate::BisectEngine).

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::candidate::Candidate;
use crate::error::UsageError;
use crate::partition::{Partition, RestoreInstruction};

/// Globally unique session identifier.
///
/// Used to correlate persisted state with log events. A cleared session
/// carries the nil identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(Uuid);

impl SessionId {
    /// Creates a new random session ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a session ID from an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    /// Creates a nil (all zeros) session ID.
    #[must_use]
    pub const fn nil() -> Self {
        Self(Uuid::nil())
    }

    /// Returns true if this is the nil ID.
    #[must_use]
    pub fn is_nil(&self) -> bool {
        self.0.is_nil()
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The complete state of one bisection.
///
/// The suspect range is the half-open interval `[left, right)` over the
/// candidate ordering captured at start; `mid` is always
/// `floor((left + right) / 2)`. Candidates in `[left, mid)` form the
/// disabled half of the current round, candidates in `[mid, right)` the
/// enabled half. Indices are never renumbered after narrowing, so a
/// terminal `result` always refers to the original ordering.
///
/// Sessions round-trip exactly through serde; persisting and restoring
/// one loses nothing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Session identity, nil when cleared.
    pub id: SessionId,

    /// Candidate snapshot, ordering fixed at start.
    pub candidates: Vec<Candidate>,

    /// Lower bound (inclusive) of the suspect range.
    pub left: usize,

    /// Upper bound (exclusive) of the suspect range.
    pub right: usize,

    /// Partition boundary, derived from `left` and `right`.
    pub mid: usize,

    /// Whether a search is active.
    pub in_progress: bool,

    /// Index of the isolated candidate, terminal once set.
    pub result: Option<usize>,

    /// When the session was started.
    pub started_at: DateTime<Utc>,

    /// When the session last transitioned.
    pub updated_at: DateTime<Utc>,
}

impl Session {
    /// Creates an idle session with every field at its zero value.
    #[must_use]
    pub fn idle() -> Self {
        Self {
            id: SessionId::nil(),
            candidates: Vec::new(),
            left: 0,
            right: 0,
            mid: 0,
            in_progress: false,
            result: None,
            started_at: DateTime::UNIX_EPOCH,
            updated_at: DateTime::UNIX_EPOCH,
        }
    }

    /// Creates an active session over the given candidates.
    ///
    /// The range covers the whole set and the boundary sits at the
    /// midpoint. Callers must ensure `candidates` is non-empty.
    #[must_use]
    pub(crate) fn begin(candidates: Vec<Candidate>) -> Self {
        let right = candidates.len();
        let now = Utc::now();
        Self {
            id: SessionId::new(),
            candidates,
            left: 0,
            right,
            mid: right / 2,
            in_progress: true,
            result: None,
            started_at: now,
            updated_at: now,
        }
    }

    /// Number of candidates still under suspicion.
    #[must_use]
    pub fn span(&self) -> usize {
        self.right.saturating_sub(self.left)
    }

    /// Whether a search is active.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.in_progress
    }

    /// Whether the search has isolated a candidate.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        self.result.is_some()
    }

    /// Whether the session is neither active nor terminal.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        !self.in_progress && self.result.is_none()
    }

    /// Rough number of rounds left: `floor(log2(span))`, 0 for spans of
    /// at most one. Informational only.
    #[must_use]
    pub fn steps_remaining(&self) -> u32 {
        let span = self.span();
        if span <= 1 {
            0
        } else {
            span.ilog2()
        }
    }

    /// The current partition, if a search is active.
    #[must_use]
    pub fn partition(&self) -> Option<Partition> {
        if self.in_progress {
            Some(Partition::new(self.left..self.mid, self.mid..self.right))
        } else {
            None
        }
    }

    /// Instruction re-enabling every candidate this session touched.
    ///
    /// Empty for a cleared session.
    #[must_use]
    pub fn restore_instruction(&self) -> RestoreInstruction {
        RestoreInstruction::new(self.candidates.clone())
    }

    /// Checks the structural invariants of a (possibly restored) session.
    ///
    /// # Errors
    ///
    /// Returns [`UsageError::CorruptSession`] when the range does not
    /// describe a state any sequence of transitions can produce.
    pub fn validate(&self) -> Result<(), UsageError> {
        let corrupt = |reason: String| UsageError::CorruptSession { reason };
        let n = self.candidates.len();

        if self.right > n {
            return Err(corrupt(format!(
                "right {} exceeds candidate count {n}",
                self.right
            )));
        }
        if self.left > self.right {
            return Err(corrupt(format!(
                "left {} exceeds right {}",
                self.left, self.right
            )));
        }
        if self.mid != (self.left + self.right) / 2 {
            return Err(corrupt(format!(
                "mid {} is not the midpoint of [{}, {})",
                self.mid, self.left, self.right
            )));
        }

        if self.in_progress {
            if self.result.is_some() {
                return Err(corrupt("result set while search in progress".to_string()));
            }
            if self.left >= self.right {
                return Err(corrupt("active search over an empty range".to_string()));
            }
        } else if let Some(index) = self.result {
            if index >= n {
                return Err(corrupt(format!(
                    "result index {index} exceeds candidate count {n}"
                )));
            }
        } else if n != 0 || self.left != 0 || self.right != 0 {
            return Err(corrupt("idle session retains search state".to_string()));
        }

        Ok(())
    }

    pub(crate) fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::idle()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidates(n: usize) -> Vec<Candidate> {
        (0..n)
            .map(|i| Candidate::new(format!("id-{i}"), format!("Candidate {i}")))
            .collect()
    }

    #[test]
    fn test_session_id_nil() {
        assert!(SessionId::nil().is_nil());
        assert!(!SessionId::new().is_nil());
    }

    #[test]
    fn test_idle_session_zero_values() {
        let s = Session::idle();
        assert!(s.id.is_nil());
        assert!(s.candidates.is_empty());
        assert_eq!((s.left, s.right, s.mid), (0, 0, 0));
        assert!(!s.is_active());
        assert!(!s.is_terminal());
        assert!(s.is_idle());
        s.validate().unwrap();
    }

    #[test]
    fn test_begin_covers_whole_set() {
        let s = Session::begin(candidates(8));
        assert_eq!((s.left, s.right, s.mid), (0, 8, 4));
        assert!(s.is_active());
        assert!(!s.is_terminal());
        s.validate().unwrap();
    }

    #[test]
    fn test_steps_remaining_is_floor_log2() {
        let mut s = Session::begin(candidates(8));
        assert_eq!(s.steps_remaining(), 3);
        s.right = 3;
        s.mid = 1;
        assert_eq!(s.steps_remaining(), 1);
        s.right = 2;
        s.mid = 1;
        assert_eq!(s.steps_remaining(), 1);
        s.right = 1;
        s.mid = 0;
        assert_eq!(s.steps_remaining(), 0);
    }

    #[test]
    fn test_partition_matches_range() {
        let s = Session::begin(candidates(8));
        let p = s.partition().unwrap();
        assert_eq!(p.disabled, 0..4);
        assert_eq!(p.enabled, 4..8);

        assert!(Session::idle().partition().is_none());
    }

    #[test]
    fn test_serde_round_trip_mid_search() {
        let mut s = Session::begin(candidates(8));
        s.left = 4;
        s.right = 8;
        s.mid = 6;

        let json = serde_json::to_string(&s).unwrap();
        let back: Session = serde_json::from_str(&json).unwrap();
        assert_eq!(s, back);
        assert_eq!(back.candidates[5].name, "Candidate 5");
    }

    #[test]
    fn test_validate_rejects_out_of_range_right() {
        let mut s = Session::begin(candidates(4));
        s.right = 9;
        s.mid = 4;
        assert!(matches!(
            s.validate(),
            Err(UsageError::CorruptSession { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_underived_mid() {
        let mut s = Session::begin(candidates(8));
        s.mid = 7;
        assert!(matches!(
            s.validate(),
            Err(UsageError::CorruptSession { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_result_during_search() {
        let mut s = Session::begin(candidates(4));
        s.result = Some(1);
        assert!(s.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_result_out_of_range() {
        let mut s = Session::begin(candidates(4));
        s.in_progress = false;
        s.left = 3;
        s.right = 4;
        s.mid = 3;
        s.result = Some(7);
        assert!(s.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_idle_with_leftover_state() {
        let mut s = Session::begin(candidates(4));
        s.in_progress = false;
        s.result = None;
        assert!(s.validate().is_err());
    }

    #[test]
    fn test_restore_instruction_lists_all_candidates() {
        let s = Session::begin(candidates(3));
        assert_eq!(s.restore_instruction().candidates.len(), 3);
        assert!(Session::idle().restore_instruction().is_empty());
    }
}
