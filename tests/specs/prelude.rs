// SPDX-License-Identifier: MIT
// Copyright (c) 2026 the initd authors

//! Shared test helpers: a fluent wrapper around the built `initd` binary,
//! and a scratch directory for throwaway manifests.

use std::fs;
use std::path::PathBuf;

use assert_cmd::Command;
use assert_cmd::assert::Assert;
use predicates::str::contains;
use tempfile::TempDir;

/// The uid/gid the current test process runs as — used in manifests so
/// tests don't need root to switch identity.
pub fn current_identity() -> (u32, u32) {
    (nix::unistd::getuid().as_raw(), nix::unistd::getgid().as_raw())
}

/// A scratch directory holding one or more manifest files.
pub struct Manifest {
    dir: TempDir,
}

impl Manifest {
    /// Write a single `config.yml` with `body` as its contents.
    pub fn single(body: &str) -> Self {
        let dir = TempDir::new().expect("create temp dir");
        fs::write(dir.path().join("config.yml"), body).expect("write config.yml");
        Self { dir }
    }

    pub fn path(&self) -> PathBuf {
        self.dir.path().join("config.yml")
    }
}

/// Fluent wrapper so specs read as `cli().args(...).passes().stdout_has(...)`.
pub struct Invocation {
    command: Command,
}

pub fn cli() -> Invocation {
    Invocation { command: Command::cargo_bin("initd").expect("built initd binary") }
}

impl Invocation {
    pub fn args<I: IntoIterator<Item = S>, S: AsRef<std::ffi::OsStr>>(mut self, args: I) -> Self {
        self.command.args(args);
        self
    }

    pub fn config(self, manifest: &Manifest) -> Self {
        self.args(["--config", manifest.path().to_str().expect("utf8 path")])
    }

    pub fn passes(mut self) -> AssertedOutput {
        AssertedOutput { assert: self.command.assert().success() }
    }

    pub fn fails_with_code(mut self, code: i32) -> AssertedOutput {
        AssertedOutput { assert: self.command.assert().failure().code(code) }
    }
}

pub struct AssertedOutput {
    assert: Assert,
}

impl AssertedOutput {
    pub fn stdout_has(self, needle: &str) -> Self {
        let assert = self.assert.stdout(contains(needle.to_string()));
        Self { assert }
    }
}
