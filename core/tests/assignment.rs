//! Assignment engine tests.
//!
//! Covers the validation order, all-or-nothing commits, reassignment,
//! and the audit trail written for commits and rejections.

use orgchart_core::{
    engine::{AssignmentEngine, AssignmentRequest},
    record::NewRecord,
    DirectoryError, DirectoryService, Level, PersonnelRecord, RequestContext,
};

fn build() -> DirectoryService {
    DirectoryService::in_memory().expect("in-memory service")
}

fn add(svc: &DirectoryService, id: &str, level: Option<Level>) -> PersonnelRecord {
    svc.provision(
        NewRecord::new(format!("Person {id}"), format!("{id}@example.com"), level).with_id(id),
        &RequestContext::anonymous(),
    )
    .expect("provision record")
}

fn ctx() -> RequestContext {
    RequestContext::for_actor("admin-1")
}

/// A(level4), B(level3), C(level2).
fn build_abc() -> DirectoryService {
    let svc = build();
    add(&svc, "a", Some(Level::Level4));
    add(&svc, "b", Some(Level::Level3));
    add(&svc, "c", Some(Level::Level2));
    svc
}

#[test]
fn assign_to_adjacent_level_succeeds() {
    let svc = build_abc();
    let out = svc.assign_supervisor("a", "b", &ctx()).unwrap();

    assert_eq!(out.source_id, "a");
    assert_eq!(out.target_id, "b");
    assert_eq!(out.label, "Team Leader");
    assert_eq!(out.previous_supervisor_id, None);
    assert_eq!(
        svc.get_record("a").unwrap().supervisor_id.as_deref(),
        Some("b"),
        "supervisor should be committed"
    );
}

#[test]
fn every_adjacent_pair_succeeds_with_its_label() {
    let svc = build();
    for level in Level::ALL {
        add(&svc, level.as_str(), Some(level));
    }
    let expected = [
        (Level::Level2, Level::Level1, "Top Management"),
        (Level::Level3, Level::Level2, "HOD"),
        (Level::Level4, Level::Level3, "Team Leader"),
        (Level::Level5, Level::Level4, "Manager"),
    ];
    for (sub, sup, label) in expected {
        let out = svc
            .assign_supervisor(sub.as_str(), sup.as_str(), &ctx())
            .unwrap_or_else(|e| panic!("{sub} under {sup} should succeed: {e}"));
        assert_eq!(out.label, label);
        assert_eq!(
            svc.get_record(sub.as_str()).unwrap().supervisor_id.as_deref(),
            Some(sup.as_str())
        );
    }
}

#[test]
fn skipping_a_level_is_a_mismatch_and_changes_nothing() {
    let svc = build_abc();
    let before = svc.get_record("a").unwrap();

    let err = svc.assign_supervisor("a", "c", &ctx()).unwrap_err();
    match err {
        DirectoryError::LevelMismatch {
            source_level,
            expected,
            ref actual,
        } => {
            assert_eq!(source_level, Level::Level4);
            assert_eq!(expected, Level::Level3);
            assert_eq!(actual, "level2");
        }
        other => panic!("expected LevelMismatch, got {other:?}"),
    }
    assert_eq!(svc.get_record("a").unwrap(), before, "record must be untouched");
}

#[test]
fn mismatch_for_every_non_adjacent_pair() {
    let svc = build();
    for level in Level::ALL {
        add(&svc, level.as_str(), Some(level));
    }
    for sub in Level::ALL.into_iter().skip(1) {
        for sup in Level::ALL {
            if Some(sup) == sub.above() || sup == sub {
                continue;
            }
            let err = svc
                .assign_supervisor(sub.as_str(), sup.as_str(), &ctx())
                .unwrap_err();
            assert!(
                matches!(err, DirectoryError::LevelMismatch { .. }),
                "{sub} under {sup}: expected LevelMismatch, got {err:?}"
            );
            assert!(svc.get_record(sub.as_str()).unwrap().supervisor_id.is_none());
        }
    }
}

#[test]
fn target_without_level_is_a_mismatch() {
    let svc = build_abc();
    add(&svc, "u", None);
    let err = svc.assign_supervisor("a", "u", &ctx()).unwrap_err();
    assert!(
        matches!(err, DirectoryError::LevelMismatch { ref actual, .. } if actual == "unassigned"),
        "got {err:?}"
    );
}

#[test]
fn self_assignment_always_fails() {
    let svc = build_abc();
    add(&svc, "root", Some(Level::Level1));
    add(&svc, "u", None);
    for id in ["a", "b", "c", "root", "u", "does-not-exist"] {
        let err = svc.assign_supervisor(id, id, &ctx()).unwrap_err();
        assert!(
            matches!(err, DirectoryError::SelfAssignment { .. }),
            "assign({id}, {id}) should be SelfAssignment, got {err:?}"
        );
    }
}

#[test]
fn level1_and_unassigned_sources_have_no_eligible_level() {
    let svc = build_abc();
    add(&svc, "root", Some(Level::Level1));
    add(&svc, "u", None);

    let err = svc.assign_supervisor("root", "c", &ctx()).unwrap_err();
    assert!(matches!(err, DirectoryError::InvalidLevel { .. }), "got {err:?}");

    let err = svc.assign_supervisor("u", "c", &ctx()).unwrap_err();
    assert!(matches!(err, DirectoryError::InvalidLevel { .. }), "got {err:?}");
}

#[test]
fn unknown_ids_are_not_found() {
    let svc = build_abc();
    let err = svc.assign_supervisor("ghost", "b", &ctx()).unwrap_err();
    assert!(matches!(err, DirectoryError::NotFound { ref id } if id == "ghost"));

    let err = svc.assign_supervisor("a", "ghost", &ctx()).unwrap_err();
    assert!(matches!(err, DirectoryError::NotFound { ref id } if id == "ghost"));
    assert!(svc.get_record("a").unwrap().supervisor_id.is_none());
}

#[test]
fn repeated_invalid_request_fails_identically() {
    let svc = build_abc();
    let before = svc.get_record("a").unwrap();

    let first = svc.assign_supervisor("a", "c", &ctx()).unwrap_err();
    let second = svc.assign_supervisor("a", "c", &ctx()).unwrap_err();
    assert_eq!(first.kind(), second.kind());
    assert_eq!(first.to_string(), second.to_string());
    assert_eq!(svc.get_record("a").unwrap(), before);
}

#[test]
fn reverse_assignment_after_success_is_rejected() {
    // A(level4) under B(level3), then B under A must fail on levels.
    let svc = build_abc();
    svc.assign_supervisor("a", "b", &ctx()).unwrap();

    let err = svc.assign_supervisor("b", "a", &ctx()).unwrap_err();
    assert!(matches!(err, DirectoryError::LevelMismatch { .. }), "got {err:?}");
    assert!(svc.get_record("b").unwrap().supervisor_id.is_none());
}

#[test]
fn reassignment_replaces_supervisor() {
    let svc = build_abc();
    add(&svc, "b2", Some(Level::Level3));

    svc.assign_supervisor("a", "b", &ctx()).unwrap();
    let out = svc.assign_supervisor("a", "b2", &ctx()).unwrap();

    assert_eq!(out.previous_supervisor_id.as_deref(), Some("b"));
    let rec = svc.get_record("a").unwrap();
    assert_eq!(rec.supervisor_id.as_deref(), Some("b2"));
    assert_eq!(rec.version, 2, "each commit bumps the version");
}

#[test]
fn unassign_clears_supervisor() {
    let svc = build_abc();
    svc.assign_supervisor("a", "b", &ctx()).unwrap();

    let out = svc.unassign_supervisor("a", &ctx()).unwrap();
    assert_eq!(out.previous_supervisor_id.as_deref(), Some("b"));
    assert!(svc.get_record("a").unwrap().supervisor_id.is_none());

    let again = svc.unassign_supervisor("a", &ctx()).unwrap();
    assert_eq!(again.previous_supervisor_id, None);

    let err = svc.unassign_supervisor("ghost", &ctx()).unwrap_err();
    assert!(matches!(err, DirectoryError::NotFound { .. }));
}

#[test]
fn stale_version_is_rejected_without_mutation() {
    let svc = build_abc();
    add(&svc, "b2", Some(Level::Level3));
    let engine = AssignmentEngine::new(svc.store());

    // Another writer commits between our read and our commit.
    let stale = svc.get_record("a").unwrap();
    svc.assign_supervisor("a", "b2", &ctx()).unwrap();

    let target = svc.get_record("b").unwrap();
    engine.validate(&stale, &target).unwrap();
    let audit = orgchart_core::event::EventLogEntry::new(
        &orgchart_core::event::DirectoryEvent::SupervisorAssigned {
            record_id: "a".into(),
            supervisor_id: "b".into(),
            previous_supervisor_id: None,
            label: "Team Leader".into(),
        },
        None,
    )
    .unwrap();
    let err = svc
        .store()
        .commit_supervisor("a", Some("b"), stale.version, &audit)
        .unwrap_err();
    assert!(matches!(err, DirectoryError::StaleRecord { .. }), "got {err:?}");
    assert_eq!(
        svc.get_record("a").unwrap().supervisor_id.as_deref(),
        Some("b2"),
        "the winning write must survive"
    );
}

#[test]
fn engine_accepts_explicit_request() {
    let svc = build_abc();
    let engine = AssignmentEngine::new(svc.store());
    let req = AssignmentRequest::new("b", "c").in_context(&ctx());
    let out = engine.assign(&req).unwrap();
    assert_eq!(out.label, "HOD");
    assert_eq!(out.record.supervisor_id.as_deref(), Some("c"));
}

#[test]
fn history_records_commits_and_rejections_with_actor() {
    let svc = build_abc();
    svc.assign_supervisor("a", "c", &ctx()).unwrap_err();
    svc.assign_supervisor("a", "b", &ctx()).unwrap();
    svc.unassign_supervisor("a", &RequestContext::anonymous()).unwrap();

    let history = svc.assignment_history("a").unwrap();
    let types: Vec<&str> = history.iter().map(|e| e.event_type.as_str()).collect();
    assert_eq!(
        types,
        vec![
            "record_provisioned",
            "assignment_rejected",
            "supervisor_assigned",
            "supervisor_cleared"
        ]
    );
    assert_eq!(history[1].actor_id.as_deref(), Some("admin-1"));
    assert_eq!(history[2].actor_id.as_deref(), Some("admin-1"));
    assert_eq!(history[3].actor_id, None);

    match history[2].event().unwrap() {
        orgchart_core::event::DirectoryEvent::SupervisorAssigned {
            supervisor_id,
            label,
            ..
        } => {
            assert_eq!(supervisor_id, "b");
            assert_eq!(label, "Team Leader");
        }
        other => panic!("unexpected event {other:?}"),
    }
}
