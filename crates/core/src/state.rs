// SPDX-License-Identifier: MIT
// Copyright (c) 2026 the initd authors

//! The child lifecycle state machine.

use crate::simple_display;
use crate::spec::ProcessKind;

/// Lifecycle state of a single child, per the supervisor's state machine.
///
/// Initial state is [`LifecycleState::Blocked`] if the child has any
/// `before`/`after` relation, [`LifecycleState::Ready`] otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    /// Waiting on one or more preconditions to hold.
    Blocked,
    /// Preconditions hold (or there were none); eligible to be forked.
    Ready,
    /// Forked and handed off to exec.
    Running,
    /// Exited; terminal for a one-shot, or a simple that exited 0.
    Done,
    /// A simple-type child exited non-zero.
    Crashed,
    /// Reserved for a future restart policy. Reachable but terminal today:
    /// nothing transitions a child out of Backoff (see design notes).
    Backoff,
}

simple_display! {
    LifecycleState {
        Blocked => "blocked",
        Ready => "ready",
        Running => "running",
        Done => "done",
        Crashed => "crashed",
        Backoff => "backoff",
    }
}

impl LifecycleState {
    /// Whether a child in this state counts against the supervisor's
    /// running-count and is expected to have a live pid.
    pub const fn is_running(self) -> bool {
        matches!(self, LifecycleState::Running)
    }
}

/// The raw exit information of a reaped child, decoupled from any specific
/// OS binding so this crate stays syscall-free.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitStatus {
    /// Process called `exit()` (or returned from `main`) with this code.
    Exited(i32),
    /// Process was terminated by this signal number.
    Signaled(i32),
}

impl ExitStatus {
    /// True exactly for `Exited(0)` — the only status that counts as a
    /// clean exit for invariant-checking purposes.
    pub const fn is_success(self) -> bool {
        matches!(self, ExitStatus::Exited(0))
    }

    /// The code to report to the logging sink (exit code, or negative
    /// signal number, matching common shell convention).
    pub const fn code(self) -> i32 {
        match self {
            ExitStatus::Exited(code) => code,
            ExitStatus::Signaled(sig) => -sig,
        }
    }
}

/// Applies the `Running -> {Done, Crashed}` transition described in the
/// supervisor spec: one-shot children are Done on any exit; simple children
/// are Done only on a clean exit and Crashed otherwise.
pub fn exit_transition(kind: ProcessKind, status: ExitStatus) -> LifecycleState {
    match kind {
        ProcessKind::OneShot => LifecycleState::Done,
        ProcessKind::Simple => {
            if status.is_success() {
                LifecycleState::Done
            } else {
                LifecycleState::Crashed
            }
        }
    }
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
