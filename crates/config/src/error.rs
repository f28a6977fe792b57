// SPDX-License-Identifier: MIT
// Copyright (c) 2026 the initd authors

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config path '{path}': {source}")]
    Io { path: PathBuf, source: std::io::Error },

    #[error(transparent)]
    InvalidSpec(#[from] initd_core::ChildSpecError),

    #[error("could not parse '{path}' as YAML: {source}")]
    Yaml { path: PathBuf, source: serde_yaml::Error },

    #[error("config path '{0}' is neither a file nor a directory")]
    NotFileOrDirectory(PathBuf),

    #[error("duplicate program name '{0}'")]
    DuplicateName(String),

    #[error("could not resolve user '{0}': no such user")]
    UnknownUser(String),

    #[error("could not resolve group '{0}': no such group")]
    UnknownGroup(String),

    #[error("name service lookup failed: {0}")]
    NameService(#[from] nix::Error),
}
