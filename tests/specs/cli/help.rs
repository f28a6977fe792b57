// SPDX-License-Identifier: MIT
// Copyright (c) 2026 the initd authors

//! CLI help/usage output specs.

use crate::prelude::*;

#[test]
fn initd_help_shows_usage() {
    cli().args(["--help"]).passes().stdout_has("Usage:");
}

#[test]
fn initd_version_shows_version() {
    cli().args(["--version"]).passes().stdout_has("0.2");
}

#[test]
fn missing_config_file_is_a_setup_failure() {
    cli().args(["--config", "/does/not/exist.yml"]).fails_with_code(1);
}
