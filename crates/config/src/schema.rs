// SPDX-License-Identifier: MIT
// Copyright (c) 2026 the initd authors

//! Raw YAML shapes, matching the schema in the supervisor spec's External
//! Interfaces section. Defaulting and validation happen in [`crate::loader`];
//! this module only mirrors the document structure.

use std::collections::HashMap;

use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct RawManifest {
    #[serde(default)]
    pub programs: Vec<RawProgram>,
}

#[derive(Debug, Deserialize)]
pub struct RawProgram {
    pub name: Option<String>,
    pub path: Option<String>,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default)]
    pub r#type: Option<String>,
    #[serde(default)]
    pub capabilities: Vec<String>,
    pub uid: Option<u32>,
    pub gid: Option<u32>,
    pub user: Option<String>,
    pub group: Option<String>,
    #[serde(default)]
    pub before: Vec<String>,
    #[serde(default)]
    pub after: Vec<String>,
    #[serde(default)]
    pub pty: bool,
    pub default_env: Option<bool>,
    #[serde(default)]
    pub env: Vec<RawEnvEntry>,
}

/// Each scalar entry in `env:` whitelists an inherited name; each
/// single-entry map declares a templated extra variable.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum RawEnvEntry {
    Whitelist(String),
    Extra(HashMap<String, String>),
}

#[cfg(test)]
#[path = "schema_tests.rs"]
mod tests;
