//! Common test utilities for hive integration tests.
//!
//! Provides `TestEnv` for isolated test environments that don't pick up
//! the user's `~/.config/hivecfg/catalog.kdl`.

#![allow(dead_code)]

use assert_cmd::Command;
use std::path::Path;
pub use tempfile::TempDir;

/// A test environment with isolated working and config directories.
///
/// Each `TestEnv` creates two temporary directories:
/// - `work_dir`: Acts as the current working directory
/// - `config_dir`: Stands in for the user config root (via `XDG_CONFIG_HOME`)
///
/// The `hive()` method returns a `Command` that sets `XDG_CONFIG_HOME`
/// per-invocation, making tests parallel-safe.
pub struct TestEnv {
    pub work_dir: TempDir,
    pub config_dir: TempDir,
}

impl TestEnv {
    /// Create a new test environment with isolated directories.
    pub fn new() -> Self {
        Self {
            work_dir: TempDir::new().unwrap(),
            config_dir: TempDir::new().unwrap(),
        }
    }

    /// Get a Command for the hive binary with an isolated config root.
    pub fn hive(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_hive"));
        cmd.current_dir(self.work_dir.path());
        cmd.env("XDG_CONFIG_HOME", self.config_dir.path());
        cmd.env_remove("HIVE_CATALOG");
        cmd
    }

    /// Get the path to the working directory.
    pub fn path(&self) -> &Path {
        self.work_dir.path()
    }

    /// Write a file into the working directory and return its path.
    pub fn write_file(&self, name: &str, content: &str) -> std::path::PathBuf {
        let path = self.work_dir.path().join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&path, content).unwrap();
        path
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}
