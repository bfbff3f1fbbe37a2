//! Candidate types and identity.
//!
//! A candidate is one independently toggleable item under suspicion of
//! causing the observed fault. The host assigns identifiers; the search
//! only ever refers to candidates by their position in the ordering
//! captured when a session starts.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque, host-assigned candidate identifier.
///
/// Identifiers are never interpreted; they are only handed back to the
/// host when toggling. Equality is exact string equality.
///
/// # Examples
///
/// ```
/// use culprit::CandidateId;
///
/// let id = CandidateId::new("ext-abc123");
/// assert_eq!(id.as_str(), "ext-abc123");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CandidateId(String);

impl CandidateId {
    /// Creates a candidate ID from a host identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CandidateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for CandidateId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for CandidateId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// One toggleable item under suspicion.
///
/// Candidates are snapshotted into a [`Session`](crate::Session) at start
/// and never created or destroyed mid-session. The display name and
/// homepage are carried only for reporting the verdict to a human.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    /// Host-assigned identifier, used for toggling.
    pub id: CandidateId,

    /// Human-readable display name.
    pub name: String,

    /// Where to report the issue once this candidate is implicated.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(default)]
    pub homepage_url: Option<String>,
}

impl Candidate {
    /// Creates a candidate with the given identifier and display name.
    #[must_use]
    pub fn new(id: impl Into<CandidateId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            homepage_url: None,
        }
    }

    /// Attaches a homepage URL for verdict reporting.
    #[must_use]
    pub fn with_homepage(mut self, url: impl Into<String>) -> Self {
        self.homepage_url = Some(url.into());
        self
    }
}

impl fmt::Display for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.id)
    }
}
