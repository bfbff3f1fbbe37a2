//! # culprit - Binary-partition fault isolation
//!
//! culprit isolates a single faulty item inside a set of independently
//! toggleable candidates (extensions, plugins, feature flags) by
//! bisection: disable half, ask "is the problem still there?", narrow,
//! repeat. N candidates take at most ceil(log2(N)) rounds instead of N.
//!
//! ## Core Concepts
//!
//! - **Candidate**: one toggleable item under suspicion
//! - **Session**: the complete, serializable state of one search
//! - **BisectEngine**: the pure state machine computing each partition
//! - **BisectRunner**: the driver that applies partitions to a host and
//!   keeps the session persisted between rounds
//!
//! ## Usage
//!
//! ```rust
//! use culprit::{BisectEngine, Candidate, Feedback, StepOutcome};
//!
//! let candidates: Vec<Candidate> = (0..8)
//!     .map(|i| Candidate::new(format!("ext-{i}"), format!("Extension {i}")))
//!     .collect();
//!
//! let mut engine = BisectEngine::new();
//! let mut outcome = engine.start(candidates)?;
//!
//! // Apply each partition to the real host, probe, and report.
//! while let StepOutcome::Partition(partition) = &outcome {
//!     let problem_still_there = partition.is_enabled(5); // hidden culprit
//!     outcome = engine.report(if problem_still_there {
//!         Feedback::Bad
//!     } else {
//!         Feedback::Good
//!     })?;
//! }
//!
//! assert_eq!(outcome.verdict().unwrap().index, 5);
//! # Ok::<(), culprit::UsageError>(())
//! ```
//!
//! The engine assumes exactly one faulty candidate. With several, the
//! search still terminates but may implicate only one of them.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod candidate;
pub mod engine;
pub mod error;
pub mod host;
pub mod partition;
pub mod runner;
pub mod session;

// Re-export primary types at crate root for convenience
pub use candidate::{Candidate, CandidateId};
pub use engine::{BisectEngine, Feedback, StepOutcome, Verdict};
pub use error::{BisectError, BisectResult, UsageError};
pub use host::{
    CandidateSource, InMemoryHost, InMemorySessionStore, JsonSessionStore, PersistError,
    ProgressSink, SessionStore, ToggleError, Toggler,
};
pub use partition::{Partition, RestoreInstruction};
pub use runner::{BisectRunner, Resumed, RunnerConfig, StateMismatch};
pub use session::{Session, SessionId};
