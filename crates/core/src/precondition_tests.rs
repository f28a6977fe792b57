// SPDX-License-Identifier: MIT
// Copyright (c) 2026 the initd authors

use super::*;
use crate::spec::ProcessKind;

#[test]
fn required_state_follows_dependency_kind() {
    assert_eq!(RequiredState::for_kind(ProcessKind::OneShot), RequiredState::Done);
    assert_eq!(RequiredState::for_kind(ProcessKind::Simple), RequiredState::Running);
}

#[yare::parameterized(
    done_by_done       = { RequiredState::Done, LifecycleState::Done, true },
    done_by_running     = { RequiredState::Done, LifecycleState::Running, false },
    running_by_running = { RequiredState::Running, LifecycleState::Running, true },
    running_by_done     = { RequiredState::Running, LifecycleState::Done, false },
    running_by_crashed  = { RequiredState::Running, LifecycleState::Crashed, false },
)]
fn is_satisfied_by_matches_exact_state(required: RequiredState, actual: LifecycleState, expected: bool) {
    assert_eq!(required.is_satisfied_by(actual), expected);
}

#[test]
fn precondition_holds_other_and_required() {
    let p = Precondition::new(ChildId::new(2), RequiredState::Running);
    assert_eq!(p.other, ChildId::new(2));
    assert_eq!(p.required, RequiredState::Running);
}
