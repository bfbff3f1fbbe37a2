//! Round outputs handed to the caller: the current split and the
//! restore-everything instruction.

use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::candidate::Candidate;

/// The split of the suspect range for one round of testing.
///
/// Candidates indexed by `disabled` are cleared of suspicion for the
/// round; candidates indexed by `enabled` stay active and under test.
/// The enabled half is never empty while a search is active; the
/// disabled half may be empty when only two candidates remain.
///
/// Applying a partition means sweeping every index of the original
/// ordering: enabled exactly when inside the `enabled` range, disabled
/// otherwise. Indices below `disabled.start` were ruled out in earlier
/// rounds and stay off until the session ends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Partition {
    /// Indices cleared of suspicion this round: `[left, mid)`.
    pub disabled: Range<usize>,

    /// Indices still active and under test: `[mid, right)`.
    pub enabled: Range<usize>,
}

impl Partition {
    pub(crate) fn new(disabled: Range<usize>, enabled: Range<usize>) -> Self {
        Self { disabled, enabled }
    }

    /// Whether the candidate at `index` should be enabled this round.
    #[must_use]
    pub fn is_enabled(&self, index: usize) -> bool {
        self.enabled.contains(&index)
    }

    /// Number of candidates in the enabled half.
    #[must_use]
    pub fn enabled_len(&self) -> usize {
        self.enabled.len()
    }

    /// Number of candidates in the disabled half.
    #[must_use]
    pub fn disabled_len(&self) -> usize {
        self.disabled.len()
    }

    /// The full toggle sweep for a candidate set of `total` entries:
    /// every index paired with its target enabled state.
    pub fn sweep(&self, total: usize) -> impl Iterator<Item = (usize, bool)> + '_ {
        (0..total).map(move |i| (i, self.is_enabled(i)))
    }
}

/// Instruction to re-enable every candidate a session touched.
///
/// Produced by reset and at termination. Re-applying it is idempotent;
/// an instruction from a cleared session is empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestoreInstruction {
    /// Candidates to re-enable, in the original ordering.
    pub candidates: Vec<Candidate>,
}

impl RestoreInstruction {
    pub(crate) fn new(candidates: Vec<Candidate>) -> Self {
        Self { candidates }
    }

    /// Returns true if there is nothing to restore.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// Number of candidates to re-enable.
    #[must_use]
    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    /// Iterates the candidates to re-enable.
    pub fn iter(&self) -> impl Iterator<Item = &Candidate> {
        self.candidates.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_enabled_respects_bounds() {
        let p = Partition::new(2..4, 4..6);
        assert!(!p.is_enabled(1));
        assert!(!p.is_enabled(2));
        assert!(!p.is_enabled(3));
        assert!(p.is_enabled(4));
        assert!(p.is_enabled(5));
        assert!(!p.is_enabled(6));
    }

    #[test]
    fn test_sweep_covers_every_index() {
        let p = Partition::new(2..4, 4..6);
        let states: Vec<bool> = p.sweep(8).map(|(_, on)| on).collect();
        assert_eq!(
            states,
            vec![false, false, false, false, true, true, false, false]
        );
    }

    #[test]
    fn test_empty_disabled_half() {
        let p = Partition::new(2..2, 2..3);
        assert_eq!(p.disabled_len(), 0);
        assert_eq!(p.enabled_len(), 1);
    }

    #[test]
    fn test_restore_instruction_empty() {
        let r = RestoreInstruction::new(Vec::new());
        assert!(r.is_empty());
        assert_eq!(r.len(), 0);
        assert_eq!(r.iter().count(), 0);
    }

    #[test]
    fn test_partition_serialization() {
        let p = Partition::new(0..4, 4..8);
        let json = serde_json::to_string(&p).unwrap();
        let back: Partition = serde_json::from_str(&json).unwrap();
        assert_eq!(p, back);
    }
}
