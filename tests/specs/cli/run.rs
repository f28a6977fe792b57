// SPDX-License-Identifier: MIT
// Copyright (c) 2026 the initd authors

//! End-to-end scenarios driving the built `initd` binary against real
//! manifests and real child processes.

use crate::prelude::*;

#[test]
fn a_single_oneshot_program_exits_cleanly() {
    let (uid, gid) = current_identity();
    let manifest = Manifest::single(&format!(
        "programs:\n  - name: hello\n    path: /bin/sh\n    type: oneshot\n    args: [\"-c\", \"echo hello-from-initd\"]\n    uid: {uid}\n    gid: {gid}\n"
    ));

    cli().config(&manifest).passes().stdout_has("hello-from-initd");
}

#[test]
fn a_crashing_simple_program_exits_with_the_crash_code() {
    let (uid, gid) = current_identity();
    let manifest =
        Manifest::single(&format!("programs:\n  - name: bad\n    path: /bin/false\n    uid: {uid}\n    gid: {gid}\n"));

    cli().config(&manifest).fails_with_code(2);
}

#[test]
fn dependency_order_runs_the_precondition_first() {
    let (uid, gid) = current_identity();
    let manifest = Manifest::single(&format!(
        "programs:\n  - name: migrate\n    path: /bin/sh\n    type: oneshot\n    args: [\"-c\", \"echo migrated\"]\n    uid: {uid}\n    gid: {gid}\n  - name: web\n    path: /bin/sh\n    type: oneshot\n    args: [\"-c\", \"echo web-started\"]\n    after: [migrate]\n    uid: {uid}\n    gid: {gid}\n"
    ));

    cli().config(&manifest).passes().stdout_has("migrated").stdout_has("web-started");
}

#[test]
fn an_unknown_dependency_name_leaves_the_program_unstarted() {
    // §3 invariant 5 / §7: an unknown-name reference is a logged defect,
    // not a setup failure. `web` never leaves `Blocked`, nothing is ever
    // `Ready` or `Running`, and the loop exits cleanly once scheduling
    // finds nothing left to do.
    let (uid, gid) = current_identity();
    let manifest = Manifest::single(&format!(
        "programs:\n  - name: web\n    path: /bin/true\n    after: [ghost]\n    uid: {uid}\n    gid: {gid}\n"
    ));

    cli().config(&manifest).passes();
}

#[test]
fn a_dependency_cycle_is_a_setup_failure() {
    let (uid, gid) = current_identity();
    let manifest = Manifest::single(&format!(
        "programs:\n  - name: a\n    path: /bin/true\n    after: [b]\n    uid: {uid}\n    gid: {gid}\n  - name: b\n    path: /bin/true\n    after: [a]\n    uid: {uid}\n    gid: {gid}\n"
    ));

    cli().config(&manifest).fails_with_code(1);
}
