//! Command-line interface for artup.
//!
//! # Available Commands
//!
//! - `upgrade` - replace an artifact with the newest download, rolling back on failure
//! - `rollback` - restore an artifact from the backup left by a failed update
//! - `check` - ask a version-check endpoint whether a program is current
//!
//! # Global Options
//!
//! - `--verbose` - enable debug logging
//! - `--quiet` - only log errors
//! - `--config` - path to a custom config file
//!
//! `RUST_LOG`, when set, takes precedence over both verbosity flags.
//!
//! # Example
//!
//! ```bash
//! artup --verbose upgrade thing
//! artup check thing --json
//! artup rollback --artifact ~/plugins/thing.jar
//! ```

mod check;
mod rollback;
mod upgrade;

use crate::config::GlobalConfig;
use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

pub use check::CheckCommand;
pub use rollback::RollbackCommand;
pub use upgrade::UpgradeCommand;

/// Runtime configuration derived from the global flags.
///
/// Kept separate from [`Cli`] so tests can drive commands without touching
/// process-wide state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliConfig {
    /// Log filter used when `RUST_LOG` is unset.
    pub log_level: String,

    /// Explicit configuration file, overriding the default location.
    pub config_path: Option<PathBuf>,
}

impl CliConfig {
    /// Install the global tracing subscriber, writing to stderr.
    pub fn init_logging(&self) {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.log_level));

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init();
    }
}

/// Self-update artifacts and check programs for new releases.
#[derive(Parser, Debug)]
#[command(
    name = "artup",
    about = "Self-update deployed artifacts and check release channels for new versions",
    version,
    author
)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug output.
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only print errors.
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Path to a custom configuration file (default: ~/.artup/config.toml).
    #[arg(short, long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Replace an artifact with the newest download
    Upgrade(UpgradeCommand),

    /// Restore an artifact from its backup
    Rollback(RollbackCommand),

    /// Check whether a program is on its newest release
    Check(CheckCommand),
}

impl Cli {
    /// Parse-independent entry point used by `main`.
    pub async fn execute(self) -> Result<()> {
        let config = self.build_config();
        config.init_logging();
        self.execute_with_config(config).await
    }

    /// Translate the global flags into a [`CliConfig`].
    #[must_use]
    pub fn build_config(&self) -> CliConfig {
        let log_level = if self.verbose {
            "debug"
        } else if self.quiet {
            "error"
        } else {
            "warn"
        };

        CliConfig {
            log_level: log_level.to_string(),
            config_path: self.config.clone(),
        }
    }

    /// Run the selected command with an explicit configuration.
    pub async fn execute_with_config(self, config: CliConfig) -> Result<()> {
        let global = GlobalConfig::load_with_optional(config.config_path).await?;

        match self.command {
            Commands::Upgrade(cmd) => cmd.execute(&global).await,
            Commands::Rollback(cmd) => cmd.execute(&global).await,
            Commands::Check(cmd) => cmd.execute(&global).await,
        }
    }
}
