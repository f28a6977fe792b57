// SPDX-License-Identifier: MIT
// Copyright (c) 2026 the initd authors

//! Runtime state for one supervised program (§4.1).
//!
//! A [`ChildInstance`] wraps an immutable [`ChildSpec`] with the mutable
//! bookkeeping the event loop needs: its current lifecycle state, its pid
//! once started, and the preconditions gating its `Blocked -> Ready`
//! transition.

use std::os::fd::OwnedFd;

use initd_core::{ChildId, ChildSpec, ExitStatus, LifecycleState, Precondition};
use nix::unistd::Pid;

/// One supervised program's full runtime state.
pub struct ChildInstance {
    pub id: ChildId,
    pub spec: ChildSpec,
    pub state: LifecycleState,
    pub pid: Option<Pid>,
    pub stdout: Option<OwnedFd>,
    pub stderr: Option<OwnedFd>,
    preconditions: Vec<Precondition>,
}

impl ChildInstance {
    pub fn new(id: ChildId, spec: ChildSpec, preconditions: Vec<Precondition>) -> Self {
        let state =
            if preconditions.is_empty() { LifecycleState::Ready } else { LifecycleState::Blocked };
        Self { id, spec, state, pid: None, stdout: None, stderr: None, preconditions }
    }

    pub fn is_ready(&self) -> bool {
        self.state == LifecycleState::Ready
    }

    /// Re-check a `Blocked` child's preconditions against the current
    /// states of the children they reference, flipping to `Ready` if every
    /// one now holds.
    ///
    /// Checked by current state rather than a one-shot notification: a
    /// `Running`-kind precondition whose target has already moved past
    /// `Running` (to `Done`/`Crashed`) by the time this child is first
    /// refreshed will never be satisfied (design note: a simple-on-simple
    /// precondition does not retroactively unblock once its target exits).
    pub fn refresh(&mut self, state_of: impl Fn(ChildId) -> Option<LifecycleState>) {
        if self.state != LifecycleState::Blocked {
            return;
        }
        let all_satisfied = self.preconditions.iter().all(|precondition| {
            state_of(precondition.other)
                .is_some_and(|actual| precondition.required.is_satisfied_by(actual))
        });
        if all_satisfied {
            self.state = LifecycleState::Ready;
        }
    }

    /// Record the fork succeeding: pid and I/O channels are now live and
    /// the child is `Running`.
    pub fn mark_started(&mut self, pid: Pid, stdout: OwnedFd, stderr: OwnedFd) {
        self.pid = Some(pid);
        self.stdout = Some(stdout);
        self.stderr = Some(stderr);
        self.state = LifecycleState::Running;
    }

    /// Takes ownership of this child's output descriptors, clearing them
    /// from the instance. The caller is responsible for draining any
    /// final buffered data and unregistering them from the multiplexer
    /// *before* dropping the returned handles — see
    /// `Supervisor::close_output`, called from `handle_exit` ahead of
    /// [`ChildInstance::notify_exit`] so the last line a child wrote isn't
    /// lost to reap running before event dispatch (§4.4).
    pub fn take_output(&mut self) -> (Option<OwnedFd>, Option<OwnedFd>) {
        (self.stdout.take(), self.stderr.take())
    }

    /// Apply an exit status reaped by `waitpid`, transitioning to `Done` or
    /// `Crashed` per the process kind (§4.1, via `initd_core::state::exit_transition`).
    ///
    /// Does not touch the output descriptors — call [`Self::take_output`]
    /// first if they need draining and unregistering.
    pub fn notify_exit(&mut self, status: ExitStatus) {
        self.state = initd_core::state::exit_transition(self.spec.kind, status);
        self.pid = None;
    }
}

#[cfg(test)]
#[path = "child_tests.rs"]
mod tests;
