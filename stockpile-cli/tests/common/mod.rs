//! Common test utilities for CLI integration tests.
//!
//! This module provides shared helpers for CLI testing, including:
//! - Test environment setup with temporary directories
//! - Command builder helpers for common patterns
//! - Item fixtures

use assert_cmd::Command;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Test environment with isolated data directory.
pub struct TestEnv {
    /// Temporary directory (kept alive for the duration of the test)
    #[allow(dead_code)]
    temp_dir: TempDir,
    /// Path to the temporary directory
    pub temp_path: PathBuf,
    /// Path to the stockpile data directory
    pub data_dir: PathBuf,
}

#[allow(dead_code)]
impl TestEnv {
    /// Create a new test environment.
    ///
    /// The data directory path is not created; stockpile creates it.
    pub fn new() -> Self {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let temp_path = temp_dir.path().to_path_buf();
        let data_dir = temp_path.join("stockpile-data");

        Self {
            temp_dir,
            temp_path,
            data_dir,
        }
    }

    /// Get a bare command builder without pre-configured flags.
    pub fn command_bare(&self) -> Command {
        let mut cmd = Command::cargo_bin("stockpile").expect("Failed to find stockpile binary");
        // Keep the caller's environment out of the test.
        for var in [
            "STOCKPILE_DATA_DIR",
            "STOCKPILE_BUSY_TIMEOUT",
            "STOCKPILE_DISABLE_AUTOINIT",
            "STOCKPILE_OUTPUT_FORMAT",
            "STOCKPILE_LOG_MODE",
            "STOCKPILE_MAX_DURATION_MS",
            "STOCKPILE_RECOVER_ON_START",
            "STOCKPILE_MAXIMUM_LOCK_WAIT_SECONDS",
            "STOCKPILE_EXPIRY_RETRY_ATTEMPTS",
            "STOCKPILE_EXPIRY_INITIAL_BACKOFF_MS",
            "STOCKPILE_EXPIRY_MAX_BACKOFF_MS",
        ] {
            cmd.env_remove(var);
        }
        cmd
    }

    /// Get a command builder with `--data-dir` set to this environment.
    pub fn command(&self) -> Command {
        let mut cmd = self.command_bare();
        cmd.arg("--data-dir").arg(&self.data_dir);
        cmd
    }

    /// Get the temp path.
    pub fn path(&self) -> &Path {
        &self.temp_path
    }

    /// Path of the database file.
    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join("stockpile.db")
    }

    /// Add an item with the given stock.
    pub fn add_item(&self, id: &str, quantity: u32) {
        self.command()
            .args(["add", id, "--name", &format!("Widget {id}")])
            .args(["--quantity", &quantity.to_string()])
            .args(["--location", "Aisle 4", "--price", "2.5"])
            .assert()
            .success();
    }

    /// Reserve stock of an item.
    pub fn reserve(&self, id: &str, quantity: u32, duration_ms: u64) {
        self.command()
            .args(["reserve", id])
            .args(["--quantity", &quantity.to_string()])
            .args(["--duration-ms", &duration_ms.to_string()])
            .assert()
            .success();
    }

    /// Run `status --format json` and parse the single item.
    pub fn status_json(&self, id: &str) -> serde_json::Value {
        let output = self
            .command()
            .args(["status", id, "--format", "json"])
            .output()
            .expect("Failed to run status command");

        assert!(
            output.status.success(),
            "Status failed: {}",
            String::from_utf8_lossy(&output.stderr)
        );

        let mut parsed: Vec<serde_json::Value> =
            serde_json::from_slice(&output.stdout).expect("Invalid JSON from status");
        assert_eq!(parsed.len(), 1);
        parsed.remove(0)
    }

    /// List items as JSON.
    pub fn list_json(&self) -> Vec<serde_json::Value> {
        let output = self
            .command()
            .args(["list", "--format", "json"])
            .output()
            .expect("Failed to run list command");

        assert!(
            output.status.success(),
            "List failed: {}",
            String::from_utf8_lossy(&output.stderr)
        );

        serde_json::from_slice(&output.stdout).expect("Invalid JSON from list")
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}
