//! Common test utilities for gitlab-env-mgr integration tests.
//!
//! Provides `TestEnv` for isolated test environments: every command runs in
//! its own temporary working directory with the GitLab environment variables
//! cleared, so a developer's `gitlab.env` or shell exports never leak in.

#![allow(dead_code)]

use assert_cmd::Command;
use std::fs;
use std::path::{Path, PathBuf};
pub use tempfile::TempDir;

/// Token used by tests that talk to a mock server.
pub const TEST_TOKEN: &str = "glpat-integration-test";

/// A test environment with an isolated working directory.
pub struct TestEnv {
    pub work_dir: TempDir,
}

impl TestEnv {
    /// Create a new test environment.
    pub fn new() -> Self {
        Self {
            work_dir: TempDir::new().unwrap(),
        }
    }

    /// Get a Command for the gitlab-env-mgr binary inside the work directory.
    pub fn gem(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_gitlab-env-mgr"));
        cmd.current_dir(self.work_dir.path());
        cmd.env_remove("GITLAB_URL");
        cmd.env_remove("GITLAB_TOKEN");
        cmd.env_remove("GITLAB_PROJECT_ID");
        cmd.env_remove("RUST_LOG");
        cmd
    }

    /// Command preconfigured to talk to `url` for project 42.
    pub fn gem_for(&self, url: &str) -> Command {
        let mut cmd = self.gem();
        cmd.args(["-p", "42", "-u", url, "-t", TEST_TOKEN]);
        cmd
    }

    /// Get the path to the work directory.
    pub fn path(&self) -> &Path {
        self.work_dir.path()
    }

    /// Absolute path of a file in the work directory.
    pub fn file(&self, name: &str) -> PathBuf {
        self.work_dir.path().join(name)
    }

    /// Write a file into the work directory and return its path.
    pub fn write(&self, name: &str, content: &str) -> PathBuf {
        let path = self.file(name);
        fs::write(&path, content).expect("Failed to write test file");
        path
    }

    /// Read and parse a JSON file from the work directory.
    pub fn read_json(&self, name: &str) -> serde_json::Value {
        let content = fs::read_to_string(self.file(name)).expect("Failed to read test file");
        serde_json::from_str(&content).expect("Test file is not valid JSON")
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse the JSON result printed on stdout.
pub fn parse_stdout(output: &std::process::Output) -> serde_json::Value {
    serde_json::from_slice(&output.stdout).expect("stdout is not valid JSON")
}
