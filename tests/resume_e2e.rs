use std::fs;

use culprit::{
    BisectRunner, Candidate, CandidateId, Feedback, InMemoryHost, JsonSessionStore, Resumed,
    Session, SessionId, StepOutcome, Toggler,
};

fn host_with(n: usize, enabled: bool) -> InMemoryHost {
    let host = InMemoryHost::new();
    for i in 0..n {
        host.install(
            Candidate::new(format!("id-{i}"), format!("Candidate {i}")),
            enabled,
            true,
        );
    }
    host
}

fn id(i: usize) -> CandidateId {
    CandidateId::new(format!("id-{i}"))
}

#[test]
fn resume_with_no_record_is_idle() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonSessionStore::new(dir.path().join("session.json"));
    let mut runner = BisectRunner::new(host_with(3, true), store);

    assert_eq!(runner.resume().unwrap(), Resumed::Idle);
}

#[test]
fn resume_mid_search_reapplies_the_partition_and_finishes() {
    const N: usize = 6;
    const CULPRIT: usize = 2;

    let dir = tempfile::tempdir().unwrap();
    let store = JsonSessionStore::new(dir.path().join("session.json"));

    // First process: two rounds, then the process dies.
    let mut first = BisectRunner::new(host_with(N, true), store.clone());
    first.start().unwrap();
    first.report(Feedback::Good).unwrap(); // culprit 2 is in [0, 3)
    let persisted = first.engine().session().clone();
    drop(first);

    // Second process: fresh host state (everything back on), same store.
    let mut second = BisectRunner::new(host_with(N, true), store);
    let resumed = second.resume().unwrap();

    let Resumed::Searching(partition) = resumed else {
        panic!("expected a mid-flight search, got {resumed:?}");
    };
    assert_eq!(second.engine().session(), &persisted);

    // The partition sweep was re-applied to the fresh host.
    for (index, expected) in partition.sweep(N) {
        assert_eq!(second.host().is_enabled(&id(index)).unwrap(), expected);
    }

    // And the search still converges on the right candidate.
    let mut outcome = second.report(probe(&second, CULPRIT)).unwrap();
    while let StepOutcome::Partition(_) = &outcome {
        outcome = second.report(probe(&second, CULPRIT)).unwrap();
    }
    assert_eq!(outcome.verdict().unwrap().index, CULPRIT);
}

fn probe(runner: &BisectRunner<InMemoryHost, JsonSessionStore>, culprit: usize) -> Feedback {
    if runner.host().is_enabled(&id(culprit)).unwrap() {
        Feedback::Bad
    } else {
        Feedback::Good
    }
}

#[test]
fn resume_after_terminal_reapplies_the_restore_sweep() {
    const N: usize = 5;
    const CULPRIT: usize = 4;

    let dir = tempfile::tempdir().unwrap();
    let store = JsonSessionStore::new(dir.path().join("session.json"));

    let mut first = BisectRunner::new(host_with(N, true), store.clone());
    let mut outcome = first.start().unwrap();
    while let StepOutcome::Partition(_) = &outcome {
        outcome = first.report(probe(&first, CULPRIT)).unwrap();
    }
    drop(first);

    // Second process finds everything disabled (say the crash hit before
    // the restore sweep landed on the real host).
    let mut second = BisectRunner::new(host_with(N, false), store);
    let resumed = second.resume().unwrap();

    let Resumed::Finished(verdict) = resumed else {
        panic!("expected a finished session, got {resumed:?}");
    };
    assert_eq!(verdict.index, CULPRIT);
    for i in 0..N {
        assert!(second.host().is_enabled(&id(i)).unwrap());
    }
}

#[test]
fn resume_rejects_an_unreadable_record() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");
    fs::write(&path, b"{{{{").unwrap();

    let mut runner = BisectRunner::new(host_with(2, true), JsonSessionStore::new(path));
    let err = runner.resume().unwrap_err();
    assert!(err.is_persist());
}

#[test]
fn resume_rejects_a_corrupt_session() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");

    // A record no sequence of transitions can produce: mid off the midpoint.
    let session = Session {
        id: SessionId::new(),
        candidates: (0..4)
            .map(|i| Candidate::new(format!("id-{i}"), format!("Candidate {i}")))
            .collect(),
        left: 0,
        right: 4,
        mid: 3,
        in_progress: true,
        result: None,
        started_at: chrono::Utc::now(),
        updated_at: chrono::Utc::now(),
    };
    fs::write(&path, serde_json::to_vec(&session).unwrap()).unwrap();

    let mut runner = BisectRunner::new(host_with(4, true), JsonSessionStore::new(path));
    let err = runner.resume().unwrap_err();
    assert!(err.is_usage());
}
