// SPDX-License-Identifier: MIT
// Copyright (c) 2026 the initd authors

//! The supervisor logs through a small trait rather than calling the
//! `tracing` macros directly, so the CLI can swap in a differently
//! configured sink (or a recording one, in tests) without the supervisor
//! crate depending on how logging is initialized.

/// Receives structured lifecycle events from the supervisor.
///
/// `target` is always a program name, or `"initd"` for supervisor-wide
/// events.
pub trait LogSink {
    fn debug(&self, target: &str, message: &str);
    fn info(&self, target: &str, message: &str);
    fn warn(&self, target: &str, message: &str);
    fn error(&self, target: &str, message: &str);
}

/// Forwards every event to the `tracing` macros at the matching level, with
/// the program name attached as a field.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLogSink;

impl LogSink for TracingLogSink {
    fn debug(&self, target: &str, message: &str) {
        tracing::debug!(program = target, "{message}");
    }

    fn info(&self, target: &str, message: &str) {
        tracing::info!(program = target, "{message}");
    }

    fn warn(&self, target: &str, message: &str) {
        tracing::warn!(program = target, "{message}");
    }

    fn error(&self, target: &str, message: &str) {
        tracing::error!(program = target, "{message}");
    }
}

#[cfg(test)]
#[path = "log_sink_tests.rs"]
mod tests;
