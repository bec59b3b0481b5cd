// SPDX-License-Identifier: AGPL-3.0-only
// Copyright (C) 2025 Griddle Contributors

//! CLI command helpers for testing the griddle binary.

use assert_cmd::Command;
use std::path::Path;

/// Get a Command for the griddle binary.
///
/// # Example
/// ```ignore
/// use griddle_test_utils::griddle;
///
/// griddle().arg("--help").assert().success();
/// ```
#[allow(deprecated)] // cargo_bin is deprecated but still works for our use case
pub fn griddle() -> Command {
    Command::cargo_bin("griddle").expect("griddle binary not found")
}

/// Fluent wrapper around a griddle invocation.
pub struct GriddleCommand {
    cmd: Command,
}

impl GriddleCommand {
    pub fn new() -> Self {
        Self { cmd: griddle() }
    }

    /// Use the given config file.
    pub fn with_config(mut self, config: &Path) -> Self {
        self.cmd.arg("--config").arg(config);
        self
    }

    pub fn env(mut self, key: &str, value: impl AsRef<std::ffi::OsStr>) -> Self {
        self.cmd.env(key, value);
        self
    }

    pub fn arg(mut self, arg: impl AsRef<std::ffi::OsStr>) -> Self {
        self.cmd.arg(arg);
        self
    }

    pub fn args(mut self, args: &[&str]) -> Self {
        self.cmd.args(args);
        self
    }

    /// Feed stdin (used by `griddle ipc`).
    pub fn stdin(mut self, input: impl Into<Vec<u8>>) -> Self {
        self.cmd.write_stdin(input);
        self
    }

    pub fn run_success(mut self) -> assert_cmd::assert::Assert {
        self.cmd.assert().success()
    }

    pub fn run_failure(mut self) -> assert_cmd::assert::Assert {
        self.cmd.assert().failure()
    }

    pub fn into_inner(self) -> Command {
        self.cmd
    }
}

impl Default for GriddleCommand {
    fn default() -> Self {
        Self::new()
    }
}
