// SPDX-License-Identifier: MIT
// Copyright (c) 2026 the initd authors

use initd_core::{ChildSpec, EnvPolicy, ProcessKind, TerminalPolicy};

use super::*;

fn spec(name: &str, kind: ProcessKind, before: Vec<&str>, after: Vec<&str>) -> ChildSpec {
    ChildSpec::new(
        name,
        "/bin/true",
        vec![],
        kind,
        vec![],
        65534,
        65534,
        before.into_iter().map(String::from).collect(),
        after.into_iter().map(String::from).collect(),
        TerminalPolicy::Pipe,
        EnvPolicy::default(),
    )
    .unwrap()
}

#[test]
fn independent_children_get_no_preconditions() {
    let specs = vec![spec("a", ProcessKind::Simple, vec![], vec![])];
    let preconditions = resolve_preconditions(&specs).unwrap();
    assert!(preconditions[0].is_empty());
}

#[test]
fn after_adds_a_precondition_on_this_child() {
    let specs =
        vec![spec("db", ProcessKind::OneShot, vec![], vec![]), spec("web", ProcessKind::Simple, vec![], vec!["db"])];
    let preconditions = resolve_preconditions(&specs).unwrap();
    assert!(preconditions[0].is_empty());
    assert_eq!(preconditions[1].len(), 1);
    assert_eq!(preconditions[1][0].other, ChildId::new(0));
    assert_eq!(preconditions[1][0].required, RequiredState::Done);
}

#[test]
fn before_adds_a_precondition_on_the_referenced_child() {
    let specs = vec![
        spec("migrate", ProcessKind::OneShot, vec!["web"], vec![]),
        spec("web", ProcessKind::Simple, vec![], vec![]),
    ];
    let preconditions = resolve_preconditions(&specs).unwrap();
    assert!(preconditions[0].is_empty());
    assert_eq!(preconditions[1].len(), 1);
    assert_eq!(preconditions[1][0].other, ChildId::new(0));
    assert_eq!(preconditions[1][0].required, RequiredState::Done);
}

#[test]
fn an_after_reference_to_an_unknown_name_stays_permanently_blocked() {
    // §3 invariant 5 / §7: unknown-name references are logged as a defect,
    // not setup-fatal. The precondition resolves to a dangling id that no
    // child ever occupies, so `refresh` can never be satisfied.
    let specs = vec![spec("web", ProcessKind::Simple, vec![], vec!["ghost"])];
    let preconditions = resolve_preconditions(&specs).unwrap();
    assert_eq!(preconditions[0].len(), 1);
    assert!(preconditions[0][0].other.index() >= specs.len());
}

#[test]
fn a_before_reference_to_an_unknown_name_is_ignored() {
    let specs = vec![spec("migrate", ProcessKind::OneShot, vec!["ghost"], vec![])];
    let preconditions = resolve_preconditions(&specs).unwrap();
    assert!(preconditions[0].is_empty());
}

#[test]
fn duplicate_dependency_on_the_same_name_is_deduplicated() {
    let specs = vec![
        spec("db", ProcessKind::OneShot, vec![], vec![]),
        spec("web", ProcessKind::Simple, vec![], vec!["db"]),
    ];
    let mut web = spec("web", ProcessKind::Simple, vec![], vec!["db"]);
    web.after.push("db".to_string());
    let specs = vec![specs[0].clone(), web];
    let preconditions = resolve_preconditions(&specs).unwrap();
    assert_eq!(preconditions[1].len(), 1);
}

#[test]
fn a_two_cycle_is_rejected() {
    let specs = vec![
        spec("a", ProcessKind::Simple, vec![], vec!["b"]),
        spec("b", ProcessKind::Simple, vec![], vec!["a"]),
    ];
    let err = resolve_preconditions(&specs).unwrap_err();
    assert!(matches!(err, SupervisorError::DependencyCycle(_)));
}

#[test]
fn a_self_cycle_is_rejected() {
    let specs = vec![spec("a", ProcessKind::Simple, vec![], vec!["a"])];
    let err = resolve_preconditions(&specs).unwrap_err();
    assert!(matches!(err, SupervisorError::DependencyCycle(_)));
}
