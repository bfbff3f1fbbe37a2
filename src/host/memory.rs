//! In-memory host backend.
//!
//! Thread-safe reference implementations of the host traits, intended
//! for tests and embedded use. `InMemoryHost` models a candidate host
//! where every entry has a real enabled flag and some entries refuse to
//! be toggled, which is enough to exercise every contract the runner
//! relies on.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::RwLock;

use crate::candidate::{Candidate, CandidateId};
use crate::host::traits::{
    CandidateSource, PersistError, SessionStore, ToggleError, Toggler,
};
use crate::session::Session;

fn lock_err(context: &'static str) -> ToggleError {
    ToggleError::Backend(format!("poisoned lock: {context}"))
}

#[derive(Debug, Clone)]
struct HostEntry {
    candidate: Candidate,
    enabled: bool,
    may_disable: bool,
}

/// An in-memory candidate host.
///
/// Entries keep their installation order, which becomes the candidate
/// ordering a session bisects over.
#[derive(Debug, Default)]
pub struct InMemoryHost {
    entries: RwLock<Vec<HostEntry>>,
    refreshes: AtomicUsize,
}

impl InMemoryHost {
    /// Creates an empty host.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs a candidate with the given initial state.
    pub fn install(&self, candidate: Candidate, enabled: bool, may_disable: bool) {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.push(HostEntry {
            candidate,
            enabled,
            may_disable,
        });
    }

    /// Installs an enabled, toggleable candidate.
    pub fn install_enabled(&self, candidate: Candidate) {
        self.install(candidate, true, true);
    }

    /// Forces an entry's enabled state, bypassing the toggleable check.
    ///
    /// Simulates state drifting behind the runner's back (a user flipping
    /// a switch manually mid-session).
    ///
    /// # Errors
    ///
    /// Returns `ToggleError::UnknownCandidate` for an unknown ID.
    pub fn override_enabled(&self, id: &CandidateId, enabled: bool) -> Result<(), ToggleError> {
        let mut entries = self.entries.write().map_err(|_| lock_err("override"))?;
        let entry = entries
            .iter_mut()
            .find(|e| &e.candidate.id == id)
            .ok_or_else(|| ToggleError::UnknownCandidate(id.clone()))?;
        entry.enabled = enabled;
        Ok(())
    }

    /// Number of times [`Toggler::refresh`] has been called.
    #[must_use]
    pub fn refresh_count(&self) -> usize {
        self.refreshes.load(Ordering::Relaxed)
    }
}

impl CandidateSource for InMemoryHost {
    fn list_toggleable(&self) -> Result<Vec<Candidate>, ToggleError> {
        let entries = self.entries.read().map_err(|_| lock_err("list"))?;
        Ok(entries
            .iter()
            .filter(|e| e.enabled && e.may_disable)
            .map(|e| e.candidate.clone())
            .collect())
    }
}

impl Toggler for InMemoryHost {
    fn set_enabled(&self, id: &CandidateId, enabled: bool) -> Result<(), ToggleError> {
        let mut entries = self.entries.write().map_err(|_| lock_err("set_enabled"))?;
        let entry = entries
            .iter_mut()
            .find(|e| &e.candidate.id == id)
            .ok_or_else(|| ToggleError::UnknownCandidate(id.clone()))?;
        if !entry.may_disable {
            return Err(ToggleError::NotToggleable(id.clone()));
        }
        entry.enabled = enabled;
        Ok(())
    }

    fn is_enabled(&self, id: &CandidateId) -> Result<bool, ToggleError> {
        let entries = self.entries.read().map_err(|_| lock_err("is_enabled"))?;
        entries
            .iter()
            .find(|e| &e.candidate.id == id)
            .map(|e| e.enabled)
            .ok_or_else(|| ToggleError::UnknownCandidate(id.clone()))
    }

    fn refresh(&self) -> Result<(), ToggleError> {
        self.refreshes.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}

/// A session store that keeps the record in memory.
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    slot: RwLock<Option<Session>>,
}

impl InMemorySessionStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for InMemorySessionStore {
    fn load(&self) -> Result<Option<Session>, PersistError> {
        let slot = self.slot.read().unwrap_or_else(|e| e.into_inner());
        Ok(slot.clone())
    }

    fn save(&self, session: &Session) -> Result<(), PersistError> {
        let mut slot = self.slot.write().unwrap_or_else(|e| e.into_inner());
        *slot = Some(session.clone());
        Ok(())
    }
}
