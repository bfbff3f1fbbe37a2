//! Host collaborator contracts and reference implementations.
//!
//! The engine performs no I/O; everything that touches the real world —
//! enumerating candidates, flipping their enabled state, persisting the
//! session — goes through the traits defined here. The in-memory host is
//! intended for tests and embedded use; the JSON store is a minimal
//! durable backend.

mod json_store;
mod memory;
mod traits;

pub use json_store::JsonSessionStore;
pub use memory::{InMemoryHost, InMemorySessionStore};
pub use traits::{
    CandidateSource, PersistError, ProgressSink, SessionStore, ToggleError, Toggler,
};
