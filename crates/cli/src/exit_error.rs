// SPDX-License-Identifier: MIT
// Copyright (c) 2026 the initd authors

//! Carries a process exit code alongside an error, so `main()` is the only
//! place that calls `std::process::exit()`.

use std::fmt;

/// Config or setup failed before the event loop ever started.
pub const EXIT_SETUP_FAILED: i32 = 1;
/// The event loop shut itself down because a supervised child crashed.
pub const EXIT_CHILD_CRASHED: i32 = 2;

#[derive(Debug)]
pub struct ExitError {
    pub code: i32,
    pub message: String,
}

impl ExitError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self { code, message: message.into() }
    }
}

impl fmt::Display for ExitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ExitError {}
