// SPDX-License-Identifier: MIT
// Copyright (c) 2026 the initd authors

//! The environment builder (§4.3): whitelist-filtered inheritance, a
//! defaulted block of common variables, and templated user variables.
//!
//! This module is deliberately syscall-free — it operates on a snapshot of
//! the current environment handed in by the caller (`initd-supervisor`,
//! which owns reading `std::env::vars()` and resolving the target uid to a
//! username via the name service) so it can be exercised with plain unit
//! tests.

use std::collections::BTreeMap;

use tera::{Context, Tera};
use thiserror::Error;

/// The variable names always whitelisted for inheritance, regardless of
/// what a program's manifest entry adds.
pub const DEFAULT_WHITELIST: &[&str] =
    &["HOME", "LANG", "LANGUAGE", "LOGNAME", "PATH", "PWD", "SHELL", "TERM", "USER"];

/// The values applied when `default_env` is true, before inherited
/// whitelisted values are overlaid on top (see design note #4: inherited
/// values win when present, defaults only fill absent slots).
const DEFAULT_BLOCK: &[(&str, &str)] = &[
    ("HOME", "/app"),
    ("LANG", "C"),
    ("LANGUAGE", "en"),
    ("PATH", "/usr/local/bin:/usr/bin:/bin"),
    ("SHELL", "/bin/bash"),
    ("TERM", "screen"),
    ("PWD", "/app"),
];

/// One templated extra variable: `key = template`, where `template` may
/// reference `{{ NAME }}` to substitute another variable's current value in
/// the accumulator built so far.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvVarTemplate {
    pub key: String,
    pub template: String,
}

/// A program's environment policy, as declared in its manifest entry.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EnvPolicy {
    /// Additional names to inherit from the supervisor's environment, on
    /// top of [`DEFAULT_WHITELIST`].
    pub whitelist: Vec<String>,
    /// Whether to apply [`DEFAULT_BLOCK`] for names absent after whitelist
    /// filtering.
    pub default_env: bool,
    /// Extra variables, evaluated in declaration order.
    pub extra: Vec<EnvVarTemplate>,
}

#[derive(Debug, Error)]
pub enum EnvError {
    #[error("failed to render template for '{key}': {source}")]
    Template { key: String, source: tera::Error },
}

/// Build the exec environment for a child, returning an ordered list of
/// `KEY=VALUE` strings.
///
/// Procedure (§4.3, with design note #4's resolution applied):
/// 1. Retain only whitelisted names from `current_env`.
/// 2. If `policy.default_env`, fill in [`DEFAULT_BLOCK`] for any name still
///    absent (inherited values always win over defaults).
/// 3. Force `USER` to `resolved_username` unconditionally.
/// 4. Evaluate `policy.extra` in order against the accumulator so far.
pub fn build_environment(
    current_env: &[(String, String)],
    policy: &EnvPolicy,
    resolved_username: &str,
) -> Result<Vec<String>, EnvError> {
    let mut whitelist: Vec<&str> = DEFAULT_WHITELIST.to_vec();
    whitelist.extend(policy.whitelist.iter().map(String::as_str));

    // BTreeMap for deterministic ordering independent of current_env's order.
    let mut acc: BTreeMap<String, String> = BTreeMap::new();
    for (key, value) in current_env {
        if whitelist.contains(&key.as_str()) {
            acc.insert(key.clone(), value.clone());
        }
    }

    if policy.default_env {
        for (key, value) in DEFAULT_BLOCK {
            acc.entry((*key).to_string()).or_insert_with(|| (*value).to_string());
        }
        // LOGNAME's default depends on the resolved identity, so it can't
        // live in the static DEFAULT_BLOCK table.
        acc.entry("LOGNAME".to_string()).or_insert_with(|| resolved_username.to_string());
    }

    acc.insert("USER".to_string(), resolved_username.to_string());

    for extra in &policy.extra {
        let mut context = Context::new();
        for (key, value) in &acc {
            context.insert(key, value);
        }
        let rendered = Tera::one_off(&extra.template, &context, false).map_err(|source| {
            EnvError::Template { key: extra.key.clone(), source }
        })?;
        acc.insert(extra.key.clone(), rendered);
    }

    Ok(acc.into_iter().map(|(k, v)| format!("{k}={v}")).collect())
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
