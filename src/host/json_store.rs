//! File-backed session store.
//!
//! One JSON document per store, replaced atomically on save: the record
//! is written to a sibling temp file and renamed over the target, so a
//! crash mid-save never leaves a half-written session behind.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::host::traits::{PersistError, SessionStore};
use crate::session::Session;

/// Stores the session as a single JSON file.
#[derive(Debug, Clone)]
pub struct JsonSessionStore {
    path: PathBuf,
}

impl JsonSessionStore {
    /// Creates a store backed by the given file path. The file does not
    /// need to exist yet; a missing file reads as "no session".
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The backing file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn tmp_path(&self) -> PathBuf {
        let mut raw = self.path.as_os_str().to_os_string();
        raw.push(".tmp");
        PathBuf::from(raw)
    }
}

impl SessionStore for JsonSessionStore {
    fn load(&self) -> Result<Option<Session>, PersistError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let session = serde_json::from_slice(&bytes).map_err(PersistError::Decode)?;
        tracing::debug!(path = %self.path.display(), "session loaded");
        Ok(Some(session))
    }

    fn save(&self, session: &Session) -> Result<(), PersistError> {
        let bytes = serde_json::to_vec_pretty(session).map_err(PersistError::Encode)?;
        let tmp = self.tmp_path();
        fs::write(&tmp, bytes)?;
        fs::rename(&tmp, &self.path)?;
        tracing::debug!(
            path = %self.path.display(),
            session = %session.id,
            "session saved"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::candidate::Candidate;

    fn store_in(dir: &tempfile::TempDir) -> JsonSessionStore {
        JsonSessionStore::new(dir.path().join("session.json"))
    }

    fn sample_session() -> Session {
        let candidates = (0..4)
            .map(|i| Candidate::new(format!("id-{i}"), format!("Candidate {i}")))
            .collect();
        Session::begin(candidates)
    }

    #[test]
    fn test_missing_file_reads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        assert!(store_in(&dir).load().unwrap().is_none());
    }

    #[test]
    fn test_save_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let session = sample_session();

        store.save(&session).unwrap();
        let loaded = store.load().unwrap().unwrap();
        assert_eq!(session, loaded);
    }

    #[test]
    fn test_save_replaces_previous_record() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        let first = sample_session();
        store.save(&first).unwrap();

        let second = sample_session();
        store.save(&second).unwrap();

        let loaded = store.load().unwrap().unwrap();
        assert_eq!(loaded.id, second.id);
        assert!(!dir.path().join("session.json.tmp").exists());
    }

    #[test]
    fn test_garbage_file_is_a_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        fs::write(store.path(), b"not json at all").unwrap();

        let err = store.load().unwrap_err();
        assert!(matches!(err, PersistError::Decode(_)));
    }
}
