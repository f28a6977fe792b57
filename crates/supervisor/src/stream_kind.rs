// SPDX-License-Identifier: MIT
// Copyright (c) 2026 the initd authors

/// Which of a child's two output descriptors an event belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamKind {
    Stdout,
    Stderr,
}
