//! Common test utilities for artup integration tests

// Allow dead code because these utilities are used across different test files
// and not all utilities are used in every test file
#![allow(dead_code)]
#![allow(deprecated)]

use anyhow::Result;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Isolated working area with its own configuration file.
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl TestWorkspace {
    pub fn new() -> Result<Self> {
        Ok(Self {
            temp_dir: TempDir::new()?,
        })
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn config_path(&self) -> PathBuf {
        self.path().join("config.toml")
    }

    pub fn write_config(&self, content: &str) -> Result<()> {
        std::fs::write(self.config_path(), content)?;
        Ok(())
    }

    /// `artup` command isolated from the user's configuration and environment.
    pub fn artup(&self) -> assert_cmd::Command {
        let mut cmd = assert_cmd::Command::cargo_bin("artup").unwrap();
        cmd.env("ARTUP_CONFIG_PATH", self.config_path())
            .env("NO_COLOR", "1")
            .env_remove("RUST_LOG")
            .current_dir(self.path());
        cmd
    }
}
