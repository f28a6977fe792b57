// SPDX-License-Identifier: MIT
// Copyright (c) 2026 the initd authors

//! Loads one or more YAML manifests into an ordered, validated
//! `Vec<ChildSpec>`.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use initd_core::{ChildSpec, EnvPolicy, EnvVarTemplate, ProcessKind, TerminalPolicy};

use crate::error::ConfigError;
use crate::resolve::resolve_identity;
use crate::schema::{RawEnvEntry, RawManifest, RawProgram};

/// Load the program manifest at `path`.
///
/// `path` may be a single YAML file or a directory; if it is a directory,
/// every regular file in it is loaded (in filename order) and their
/// `programs` lists are concatenated, matching the `--config` CLI flag's
/// documented behaviour.
pub fn load_from_path(path: &Path) -> Result<Vec<ChildSpec>, ConfigError> {
    let metadata = std::fs::metadata(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let files: Vec<PathBuf> = if metadata.is_file() {
        vec![path.to_path_buf()]
    } else if metadata.is_dir() {
        let mut entries: Vec<PathBuf> = std::fs::read_dir(path)
            .map_err(|source| ConfigError::Io { path: path.to_path_buf(), source })?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|p| p.is_file())
            .collect();
        entries.sort();
        entries
    } else {
        return Err(ConfigError::NotFileOrDirectory(path.to_path_buf()));
    };

    let mut specs = Vec::new();
    let mut seen_names = HashSet::new();
    for file in files {
        let raw_manifests = load_manifest(&file)?;
        for program in raw_manifests.programs {
            let Some(spec) = convert_program(&program) else {
                continue;
            };
            let spec = spec?;
            if !seen_names.insert(spec.name.clone()) {
                return Err(ConfigError::DuplicateName(spec.name));
            }
            specs.push(spec);
        }
    }

    Ok(specs)
}

fn load_manifest(path: &Path) -> Result<RawManifest, ConfigError> {
    let contents = std::fs::read_to_string(path)
        .map_err(|source| ConfigError::Io { path: path.to_path_buf(), source })?;
    serde_yaml::from_str(&contents)
        .map_err(|source| ConfigError::Yaml { path: path.to_path_buf(), source })
}

/// Converts one raw program entry into a [`ChildSpec`].
///
/// Returns `None` (after logging a warning) for entries missing `name` or
/// `path`, per §6: "Entries missing `name` or `path` are skipped with a
/// warning."
fn convert_program(program: &RawProgram) -> Option<Result<ChildSpec, ConfigError>> {
    let name = match &program.name {
        Some(name) if !name.is_empty() => name.clone(),
        _ => {
            tracing::warn!("program entry has no name, skipping");
            return None;
        }
    };
    let path = match &program.path {
        Some(path) if !path.is_empty() => path.clone(),
        _ => {
            tracing::warn!(program = %name, "program has no executable path, skipping");
            return None;
        }
    };

    Some(build_spec(name, path, program))
}

fn build_spec(name: String, path: String, program: &RawProgram) -> Result<ChildSpec, ConfigError> {
    let kind = match program.r#type.as_deref() {
        Some("oneshot") => ProcessKind::OneShot,
        _ => ProcessKind::Simple,
    };

    let identity = resolve_identity(&name, program)?;

    let terminal = if program.pty { TerminalPolicy::Pty } else { TerminalPolicy::Pipe };

    let mut whitelist = Vec::new();
    let mut extra = Vec::new();
    for entry in &program.env {
        match entry {
            RawEnvEntry::Whitelist(var_name) => whitelist.push(var_name.clone()),
            RawEnvEntry::Extra(map) => {
                for (key, template) in map {
                    extra.push(EnvVarTemplate { key: key.clone(), template: template.clone() });
                }
            }
        }
    }
    let env = EnvPolicy { whitelist, default_env: program.default_env.unwrap_or(true), extra };

    let spec = ChildSpec::new(
        name,
        path,
        program.args.clone(),
        kind,
        program.capabilities.clone(),
        identity.uid,
        identity.gid,
        program.before.clone(),
        program.after.clone(),
        terminal,
        env,
    )?;
    Ok(spec)
}

#[cfg(test)]
#[path = "loader_tests.rs"]
mod tests;
