//! Global configuration for artup.
//!
//! The configuration file holds the `[upgrade]` settings plus named
//! artifacts and programs, so that `artup upgrade <name>` and
//! `artup check <name>` do not need every detail on the command line.
//!
//! # Location
//!
//! - `$ARTUP_CONFIG_PATH` when set
//! - **Unix/macOS**: `~/.artup/config.toml`
//! - **Windows**: `%LOCALAPPDATA%\artup\config.toml`
//!
//! A missing file is not an error; every setting has a default.
//!
//! # File Format
//!
//! ```toml
//! [upgrade]
//! check_interval = 600
//!
//! [artifacts.thing]
//! path = "~/server/plugins/thing.jar"
//! url = "https://example.org/downloads/thing.jar"
//!
//! [programs.thing]
//! version = "1.0"
//! build = "5"
//! channel = "stable"
//! check_url = "https://example.org/check"
//! ```

use crate::constants::CONFIG_PATH_ENV;
use crate::upgrade::config::UpgradeConfig;
use crate::version::Channel;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::fs;

/// An artifact that `artup upgrade` can update by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactEntry {
    /// Artifact location; `~` and environment variables are expanded.
    pub path: String,

    /// Download URL of the newest artifact.
    pub url: String,

    /// Logical name used for the backup file; defaults to the table key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Known-good digest of the installed artifact. When set it replaces
    /// the archive walk as the integrity check.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha256: Option<String>,
}

impl ArtifactEntry {
    /// The artifact path with `~` and `$VARS` expanded.
    pub fn expanded_path(&self) -> Result<PathBuf> {
        let expanded = shellexpand::full(&self.path)
            .with_context(|| format!("Failed to expand artifact path '{}'", self.path))?;
        Ok(PathBuf::from(expanded.as_ref()))
    }
}

/// A program that `artup check` can query by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgramEntry {
    pub version: String,
    pub build: String,

    #[serde(default = "default_channel")]
    pub channel: String,

    pub check_url: String,
}

fn default_channel() -> String {
    "stable".to_string()
}

impl ProgramEntry {
    pub fn channel(&self) -> Result<Channel> {
        self.channel
            .parse::<Channel>()
            .with_context(|| format!("Invalid channel in program entry: '{}'", self.channel))
    }
}

/// Contents of the global configuration file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GlobalConfig {
    #[serde(default)]
    pub upgrade: UpgradeConfig,

    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub artifacts: HashMap<String, ArtifactEntry>,

    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub programs: HashMap<String, ProgramEntry>,
}

impl GlobalConfig {
    /// Load from the default location, falling back to defaults when absent.
    pub async fn load() -> Result<Self> {
        Self::load_with_optional(None).await
    }

    /// Load from `path` when given, otherwise from the default location.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub async fn load_with_optional(path: Option<PathBuf>) -> Result<Self> {
        let path = match path {
            Some(path) => path,
            None => Self::default_path()?,
        };
        if path.exists() {
            Self::load_from(&path).await
        } else {
            Ok(Self::default())
        }
    }

    pub async fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read global config from {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse global config from {}", path.display()))
    }

    /// Default configuration file path, honouring `$ARTUP_CONFIG_PATH`.
    pub fn default_path() -> Result<PathBuf> {
        if let Some(path) = std::env::var_os(CONFIG_PATH_ENV).filter(|path| !path.is_empty()) {
            return Ok(PathBuf::from(path));
        }

        let config_dir = if cfg!(target_os = "windows") {
            dirs::data_local_dir()
                .ok_or_else(|| anyhow::anyhow!("Unable to determine local data directory"))?
                .join("artup")
        } else {
            dirs::home_dir()
                .ok_or_else(|| anyhow::anyhow!("Unable to determine home directory"))?
                .join(".artup")
        };

        Ok(config_dir.join("config.toml"))
    }

    /// Look up a named artifact.
    pub fn artifact(&self, name: &str) -> Result<&ArtifactEntry> {
        self.artifacts.get(name).ok_or_else(|| {
            anyhow::anyhow!(
                "No artifact named '{name}' in the configuration (known: {})",
                known_names(self.artifacts.keys())
            )
        })
    }

    /// Look up a named program.
    pub fn program(&self, name: &str) -> Result<&ProgramEntry> {
        self.programs.get(name).ok_or_else(|| {
            anyhow::anyhow!(
                "No program named '{name}' in the configuration (known: {})",
                known_names(self.programs.keys())
            )
        })
    }
}

fn known_names<'a>(names: impl Iterator<Item = &'a String>) -> String {
    let mut names: Vec<&str> = names.map(String::as_str).collect();
    if names.is_empty() {
        return "none".to_string();
    }
    names.sort_unstable();
    names.join(", ")
}
