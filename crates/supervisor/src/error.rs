// SPDX-License-Identifier: MIT
// Copyright (c) 2026 the initd authors

use thiserror::Error;

/// Failures switching a forked child to its configured uid/gid/capabilities,
/// between `fork()` and `exec()`.
#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("capability operation failed: {0}")]
    Caps(#[from] caps::errors::CapsError),

    #[error("syscall failed while switching credentials: {0}")]
    Errno(#[from] nix::errno::Errno),
}

/// Failures wiring up a child's stdout/stderr.
#[derive(Debug, Error)]
pub enum IoPlumbingError {
    #[error("syscall failed while setting up child I/O: {0}")]
    Errno(#[from] nix::errno::Errno),
}

/// Setup-fatal failures: anything that prevents the event loop from
/// starting at all.
#[derive(Debug, Error)]
pub enum SupervisorError {
    #[error("dependency cycle detected among: {0:?}")]
    DependencyCycle(Vec<String>),

    #[error("unexpected multiplexer event on fd {0}")]
    UnexpectedEvent(std::os::fd::RawFd),

    #[error("failed to register signal handling: {0}")]
    SignalSetup(#[source] nix::errno::Errno),

    #[error("failed to create epoll instance: {0}")]
    EpollSetup(#[source] nix::errno::Errno),

    #[error("fork() failed for '{name}': {source}")]
    ForkFailed { name: String, source: nix::errno::Errno },

    #[error(transparent)]
    Io(#[from] IoPlumbingError),
}
