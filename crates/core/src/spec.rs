// SPDX-License-Identifier: MIT
// Copyright (c) 2026 the initd authors

//! The immutable description of a single program, as produced by the
//! configuration loader and consumed by the supervisor.

use thiserror::Error;

use crate::env::EnvPolicy;

/// One-shot programs run to completion and are Done on any exit; simple
/// programs are expected to keep running and are Crashed on a non-zero
/// exit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessKind {
    OneShot,
    Simple,
}

/// Whether a child's stdout/stderr are plain pipes or pseudo-terminals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TerminalPolicy {
    #[default]
    Pipe,
    Pty,
}

/// Errors building a [`ChildSpec`] from already-parsed fields. The YAML
/// schema's "skip with a warning" behaviour for missing `name`/`path` lives
/// in `initd-config`; this type covers invariants the core type itself
/// must uphold regardless of where the spec came from.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChildSpecError {
    #[error("program name must not be empty")]
    EmptyName,
    #[error("program '{0}' has no executable path")]
    EmptyPath(String),
}

/// Immutable description of one program, matching the `programs` entry
/// schema in the supervisor spec.
#[derive(Debug, Clone, PartialEq)]
pub struct ChildSpec {
    pub name: String,
    pub path: String,
    pub args: Vec<String>,
    pub kind: ProcessKind,
    pub capabilities: Vec<String>,
    pub uid: u32,
    pub gid: u32,
    pub before: Vec<String>,
    pub after: Vec<String>,
    pub terminal: TerminalPolicy,
    pub env: EnvPolicy,
}

impl ChildSpec {
    /// Validate and construct a spec. `name` and `path` must be non-empty;
    /// every other field is accepted as given (the environment/capability
    /// names themselves are validated lazily, at credential-stage time,
    /// since an unknown capability name is a per-child warning, not a
    /// setup-fatal error).
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        name: impl Into<String>,
        path: impl Into<String>,
        args: Vec<String>,
        kind: ProcessKind,
        capabilities: Vec<String>,
        uid: u32,
        gid: u32,
        before: Vec<String>,
        after: Vec<String>,
        terminal: TerminalPolicy,
        env: EnvPolicy,
    ) -> Result<Self, ChildSpecError> {
        let name = name.into();
        if name.is_empty() {
            return Err(ChildSpecError::EmptyName);
        }
        let path = path.into();
        if path.is_empty() {
            return Err(ChildSpecError::EmptyPath(name));
        }
        Ok(Self { name, path, args, kind, capabilities, uid, gid, before, after, terminal, env })
    }
}

#[cfg(test)]
#[path = "spec_tests.rs"]
mod tests;
