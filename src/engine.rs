//! Bisection engine: pure state transitions over a [`Session`].
//!
//! The engine owns the suspect range, computes the next partition,
//! interprets probe feedback, and detects termination. It performs no
//! I/O and has no suspension points; every operation is a synchronous
//! transition on the session value, so the whole search can be driven,
//! persisted, and replayed from outside.
//!
//! One search assumes exactly one faulty candidate. With two or more,
//! the range still shrinks every round and the search still terminates,
//! but the reported index may name only one of them — or a bystander
//! whose half happened to carry the fault signal. This is a known
//! limitation, not a detected condition.

use std::fmt;

use crate::candidate::Candidate;
use crate::error::UsageError;
use crate::partition::{Partition, RestoreInstruction};
use crate::session::Session;

/// Probe feedback for the current partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feedback {
    /// The problem was not reproduced; the culprit is in the disabled half.
    Good,
    /// The problem was reproduced; the culprit is in the enabled half.
    Bad,
}

/// The isolated candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    /// Position in the original candidate ordering.
    pub index: usize,

    /// The candidate at that position.
    pub candidate: Candidate,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.candidate)
    }
}

/// What a transition produced: another round, or the answer.
#[derive(Debug, Clone, PartialEq)]
pub enum StepOutcome {
    /// Apply this partition, probe, and report back.
    Partition(Partition),

    /// The search is over.
    Terminal(Verdict),
}

impl StepOutcome {
    /// The partition to apply, if the search continues.
    #[must_use]
    pub fn partition(&self) -> Option<&Partition> {
        match self {
            Self::Partition(p) => Some(p),
            Self::Terminal(_) => None,
        }
    }

    /// The verdict, if the search is over.
    #[must_use]
    pub fn verdict(&self) -> Option<&Verdict> {
        match self {
            Self::Partition(_) => None,
            Self::Terminal(v) => Some(v),
        }
    }

    /// Returns true if the search is over.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Terminal(_))
    }
}

/// The bisection state machine.
///
/// Wraps a [`Session`] and exposes the legal transitions. On any usage
/// error the session is left untouched, so a caller can correct its call
/// sequence and continue. The engine can be rebuilt from a persisted
/// session at any point via [`BisectEngine::resume`].
#[derive(Debug, Clone, PartialEq)]
pub struct BisectEngine {
    session: Session,
}

impl BisectEngine {
    /// Creates an engine with no active search.
    #[must_use]
    pub fn new() -> Self {
        Self {
            session: Session::idle(),
        }
    }

    /// Rebuilds an engine from a persisted session.
    ///
    /// # Errors
    ///
    /// Returns [`UsageError::CorruptSession`] when the stored record
    /// violates the range invariants.
    pub fn resume(session: Session) -> Result<Self, UsageError> {
        session.validate()?;
        Ok(Self { session })
    }

    /// The current session state.
    #[must_use]
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Consumes the engine, yielding the session for persistence.
    #[must_use]
    pub fn into_session(self) -> Session {
        self.session
    }

    /// Starts a search over the given candidates.
    ///
    /// The ordering of `candidates` is captured for the whole session;
    /// every later index refers to it. With a single candidate the
    /// search is immediately terminal.
    ///
    /// # Errors
    ///
    /// - [`UsageError::SearchInProgress`] if a search is already active.
    /// - [`UsageError::ResultNotCleared`] if a previous verdict has not
    ///   been reset.
    /// - [`UsageError::EmptyCandidateSet`] for an empty list.
    pub fn start(&mut self, candidates: Vec<Candidate>) -> Result<StepOutcome, UsageError> {
        if self.session.is_active() {
            return Err(UsageError::SearchInProgress);
        }
        if self.session.is_terminal() {
            return Err(UsageError::ResultNotCleared);
        }
        if candidates.is_empty() {
            return Err(UsageError::EmptyCandidateSet);
        }

        self.session = Session::begin(candidates);
        tracing::debug!(
            session = %self.session.id,
            candidates = self.session.right,
            mid = self.session.mid,
            "bisection started"
        );
        Ok(self.conclude_or_partition())
    }

    /// Records a "problem not reproduced" probe.
    ///
    /// The enabled half ran clean, so the culprit is among the disabled
    /// half: the range narrows to `[left, mid)`.
    ///
    /// # Errors
    ///
    /// Returns [`UsageError::NoSearchInProgress`] when no search is
    /// active (including after termination).
    pub fn good(&mut self) -> Result<StepOutcome, UsageError> {
        self.ensure_active()?;
        let s = &mut self.session;
        s.right = s.mid;
        s.mid = (s.left + s.right) / 2;
        s.touch();
        tracing::debug!(
            session = %s.id,
            left = s.left,
            mid = s.mid,
            right = s.right,
            "good: narrowing to disabled half"
        );
        Ok(self.conclude_or_partition())
    }

    /// Records a "problem reproduced" probe.
    ///
    /// The problem showed with the enabled half active, so the culprit
    /// is among it: the range narrows to `[mid, right)`.
    ///
    /// # Errors
    ///
    /// Returns [`UsageError::NoSearchInProgress`] when no search is
    /// active (including after termination).
    pub fn bad(&mut self) -> Result<StepOutcome, UsageError> {
        self.ensure_active()?;
        let s = &mut self.session;
        s.left = s.mid;
        s.mid = (s.left + s.right) / 2;
        s.touch();
        tracing::debug!(
            session = %s.id,
            left = s.left,
            mid = s.mid,
            right = s.right,
            "bad: narrowing to enabled half"
        );
        Ok(self.conclude_or_partition())
    }

    /// Dispatches probe feedback to [`good`](Self::good) or
    /// [`bad`](Self::bad).
    ///
    /// # Errors
    ///
    /// Same as the dispatched transition.
    pub fn report(&mut self, feedback: Feedback) -> Result<StepOutcome, UsageError> {
        match feedback {
            Feedback::Good => self.good(),
            Feedback::Bad => self.bad(),
        }
    }

    /// Abandons the search and clears all state.
    ///
    /// Returns the instruction re-enabling every candidate the session
    /// touched. Always safe to call; on an already-cleared session it is
    /// a no-op yielding an empty instruction.
    pub fn reset(&mut self) -> RestoreInstruction {
        let instruction = self.session.restore_instruction();
        if !instruction.is_empty() {
            tracing::debug!(
                session = %self.session.id,
                candidates = instruction.len(),
                "session reset"
            );
        }
        self.session = Session::idle();
        instruction
    }

    /// Rough number of rounds left. Informational only.
    #[must_use]
    pub fn steps_remaining(&self) -> u32 {
        self.session.steps_remaining()
    }

    /// The partition currently in effect, if a search is active.
    #[must_use]
    pub fn current_partition(&self) -> Option<Partition> {
        self.session.partition()
    }

    /// Instruction re-enabling every candidate of the current session,
    /// without clearing it. Used at termination and for crash recovery.
    #[must_use]
    pub fn restore_instruction(&self) -> RestoreInstruction {
        self.session.restore_instruction()
    }

    /// The terminal verdict, if the search has finished.
    #[must_use]
    pub fn verdict(&self) -> Option<Verdict> {
        let index = self.session.result?;
        let candidate = self.session.candidates.get(index)?.clone();
        Some(Verdict { index, candidate })
    }

    fn ensure_active(&self) -> Result<(), UsageError> {
        if self.session.is_active() {
            Ok(())
        } else {
            Err(UsageError::NoSearchInProgress)
        }
    }

    fn conclude_or_partition(&mut self) -> StepOutcome {
        let s = &mut self.session;
        if s.span() == 1 {
            let index = s.left;
            s.result = Some(index);
            s.in_progress = false;
            s.touch();
            let candidate = s.candidates[index].clone();
            tracing::info!(
                session = %s.id,
                index,
                candidate = %candidate,
                "culprit isolated"
            );
            StepOutcome::Terminal(Verdict { index, candidate })
        } else {
            StepOutcome::Partition(Partition::new(s.left..s.mid, s.mid..s.right))
        }
    }
}

impl Default for BisectEngine {
    fn default() -> Self {
        Self::new()
    }
}
