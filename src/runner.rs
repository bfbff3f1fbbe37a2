//! Reference driver for a bisection against a real host.
//!
//! The engine only computes transitions; somebody still has to apply
//! each partition to the host, persist the session, and bring both back
//! in sync after a crash. `BisectRunner` is that somebody. It owns the
//! ordering guarantees of §"error handling": the session is persisted
//! before the toggle sweep runs, so a crash between the two leaves a
//! consistent record that [`BisectRunner::resume`] can re-apply
//! unconditionally. Reset is the one exception: real candidate state is
//! restored first, and only then is the cleared session persisted.
//!
//! The runner is synchronous and single-owner. Callers must serialize
//! their own calls; two runners over overlapping candidate sets are not
//! supported.

use crate::candidate::Candidate;
use crate::engine::{BisectEngine, Feedback, StepOutcome, Verdict};
use crate::error::BisectResult;
use crate::host::{CandidateSource, ProgressSink, SessionStore, ToggleError, Toggler};
use crate::partition::{Partition, RestoreInstruction};

/// Runner behavior knobs.
#[derive(Debug, Clone, Default)]
pub struct RunnerConfig {
    /// Ask the host to reload the monitored system after every sweep,
    /// so the next probe observes a fresh state.
    pub refresh_after_sweep: bool,
}

/// What [`BisectRunner::resume`] found in the session store.
#[derive(Debug, Clone, PartialEq)]
pub enum Resumed {
    /// No session on record; nothing to do.
    Idle,

    /// A search was mid-flight; its partition has been re-applied.
    Searching(Partition),

    /// The search had already finished; the restore sweep has been
    /// re-applied.
    Finished(Verdict),
}

/// A divergence between the expected and actual state of one candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateMismatch {
    /// Position in the session's candidate ordering.
    pub index: usize,

    /// The affected candidate.
    pub candidate: Candidate,

    /// State the current partition calls for.
    pub expected: bool,

    /// State the host actually reports.
    pub actual: bool,
}

/// Drives one bisection session end to end.
pub struct BisectRunner<H, S> {
    host: H,
    store: S,
    engine: BisectEngine,
    progress: Option<Box<dyn ProgressSink>>,
    config: RunnerConfig,
}

impl<H, S> BisectRunner<H, S>
where
    H: CandidateSource + Toggler,
    S: SessionStore,
{
    /// Creates a runner over the given host and store.
    #[must_use]
    pub fn new(host: H, store: S) -> Self {
        Self {
            host,
            store,
            engine: BisectEngine::new(),
            progress: None,
            config: RunnerConfig::default(),
        }
    }

    /// Attaches a progress sink.
    #[must_use]
    pub fn with_progress(mut self, sink: Box<dyn ProgressSink>) -> Self {
        self.progress = Some(sink);
        self
    }

    /// Overrides the runner configuration.
    #[must_use]
    pub fn with_config(mut self, config: RunnerConfig) -> Self {
        self.config = config;
        self
    }

    /// The engine state.
    #[must_use]
    pub fn engine(&self) -> &BisectEngine {
        &self.engine
    }

    /// The candidate host.
    #[must_use]
    pub fn host(&self) -> &H {
        &self.host
    }

    /// Starts a session over the host's toggleable candidates.
    ///
    /// # Errors
    ///
    /// Usage errors leave the engine untouched; collaborator errors
    /// after the transition leave a persisted, resumable session.
    pub fn start(&mut self) -> BisectResult<StepOutcome> {
        let candidates = self.host.list_toggleable()?;
        let outcome = self.engine.start(candidates)?;
        self.store.save(self.engine.session())?;
        self.apply_outcome(&outcome)?;
        Ok(outcome)
    }

    /// Feeds one probe result into the search.
    ///
    /// # Errors
    ///
    /// Same contract as [`start`](Self::start).
    pub fn report(&mut self, feedback: Feedback) -> BisectResult<StepOutcome> {
        let outcome = self.engine.report(feedback)?;
        self.store.save(self.engine.session())?;
        self.apply_outcome(&outcome)?;
        Ok(outcome)
    }

    /// Abandons the session: restores every candidate, then clears and
    /// persists the emptied record.
    ///
    /// Safe in any phase, including after a crash mid-round.
    ///
    /// # Errors
    ///
    /// A restore failure aborts before any state is cleared, so the
    /// call can simply be retried.
    pub fn reset(&mut self) -> BisectResult<()> {
        let instruction = self.engine.restore_instruction();
        self.apply_restore(&instruction)?;
        self.engine.reset();
        self.store.save(self.engine.session())?;
        if let Some(sink) = &self.progress {
            sink.on_cleared();
        }
        Ok(())
    }

    /// Reconciles with the session store after a process restart.
    ///
    /// A finished session gets its restore sweep re-applied (idempotent)
    /// before the verdict is reported; a mid-flight session gets its
    /// current partition re-applied unconditionally, which also covers a
    /// crash that hit between persisting and toggling.
    ///
    /// # Errors
    ///
    /// A corrupt stored record surfaces as a usage error; the store and
    /// host are left as they were.
    pub fn resume(&mut self) -> BisectResult<Resumed> {
        let Some(session) = self.store.load()? else {
            return Ok(Resumed::Idle);
        };
        self.engine = BisectEngine::resume(session)?;

        if let Some(verdict) = self.engine.verdict() {
            self.apply_restore(&self.engine.restore_instruction())?;
            if let Some(sink) = &self.progress {
                sink.on_terminal(&verdict);
            }
            Ok(Resumed::Finished(verdict))
        } else if let Some(partition) = self.engine.current_partition() {
            self.apply_partition(&partition)?;
            self.notify_partition(&partition);
            Ok(Resumed::Searching(partition))
        } else {
            Ok(Resumed::Idle)
        }
    }

    /// Compares the host's actual candidate states against the current
    /// partition and reports every divergence.
    ///
    /// Returns an empty list when no search is active. Mismatches mean
    /// something flipped a candidate behind the runner's back; the next
    /// sweep will correct them.
    ///
    /// # Errors
    ///
    /// Propagates host read failures.
    pub fn verify_states(&self) -> Result<Vec<StateMismatch>, ToggleError> {
        let Some(partition) = self.engine.current_partition() else {
            return Ok(Vec::new());
        };
        let candidates = &self.engine.session().candidates;

        let mut mismatches = Vec::new();
        for (index, expected) in partition.sweep(candidates.len()) {
            let candidate = &candidates[index];
            let actual = self.host.is_enabled(&candidate.id)?;
            if actual != expected {
                tracing::warn!(
                    candidate = %candidate,
                    expected,
                    actual,
                    "candidate state drifted"
                );
                mismatches.push(StateMismatch {
                    index,
                    candidate: candidate.clone(),
                    expected,
                    actual,
                });
            }
        }
        Ok(mismatches)
    }

    fn apply_outcome(&self, outcome: &StepOutcome) -> Result<(), ToggleError> {
        match outcome {
            StepOutcome::Partition(partition) => {
                self.apply_partition(partition)?;
                self.notify_partition(partition);
            }
            StepOutcome::Terminal(verdict) => {
                self.apply_restore(&self.engine.restore_instruction())?;
                if let Some(sink) = &self.progress {
                    sink.on_terminal(verdict);
                }
            }
        }
        Ok(())
    }

    fn apply_partition(&self, partition: &Partition) -> Result<(), ToggleError> {
        let candidates = &self.engine.session().candidates;
        for (index, enabled) in partition.sweep(candidates.len()) {
            self.host.set_enabled(&candidates[index].id, enabled)?;
        }
        tracing::debug!(
            session = %self.engine.session().id,
            enabled = partition.enabled_len(),
            disabled = candidates.len() - partition.enabled_len(),
            "partition applied"
        );
        self.maybe_refresh()
    }

    fn apply_restore(&self, instruction: &RestoreInstruction) -> Result<(), ToggleError> {
        if instruction.is_empty() {
            return Ok(());
        }
        for candidate in instruction.iter() {
            self.host.set_enabled(&candidate.id, true)?;
        }
        tracing::debug!(candidates = instruction.len(), "all candidates restored");
        self.maybe_refresh()
    }

    fn notify_partition(&self, partition: &Partition) {
        if let Some(sink) = &self.progress {
            sink.on_partition(partition, self.engine.steps_remaining());
        }
    }

    fn maybe_refresh(&self) -> Result<(), ToggleError> {
        if self.config.refresh_after_sweep {
            self.host.refresh()
        } else {
            Ok(())
        }
    }
}
