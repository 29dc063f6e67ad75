use crate::config::GlobalConfig;
use crate::upgrade::backup::BackupManager;
use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;

/// Put an artifact's backup back in place.
///
/// This is the manual recovery path after an update whose download and
/// automatic restore both failed. The backup is removed once restored.
#[derive(Args, Debug)]
pub struct RollbackCommand {
    /// Name of an artifact in the configuration file.
    #[arg(value_name = "NAME", required_unless_present = "artifact", conflicts_with = "artifact")]
    target: Option<String>,

    /// Path of the artifact to restore.
    #[arg(long, value_name = "PATH")]
    artifact: Option<PathBuf>,

    /// Logical name the backup was created under.
    #[arg(long, value_name = "NAME")]
    name: Option<String>,
}

impl RollbackCommand {
    pub(crate) fn backup_manager(&self, config: &GlobalConfig) -> Result<BackupManager> {
        let (path, name) = match (&self.target, &self.artifact) {
            (Some(key), _) => {
                let entry = config.artifact(key)?;
                (entry.expanded_path()?, Some(entry.name.clone().unwrap_or_else(|| key.clone())))
            }
            (None, Some(path)) => (path.clone(), None),
            (None, None) => anyhow::bail!("Specify an artifact name or --artifact"),
        };

        Ok(match self.name.as_deref().or(name.as_deref()) {
            Some(name) => BackupManager::with_name(path, name),
            None => BackupManager::new(path),
        })
    }

    pub async fn execute(self, config: &GlobalConfig) -> Result<()> {
        let manager = self.backup_manager(config)?;

        println!(
            "{}",
            format!(
                "Restoring {} from {}...",
                manager.artifact_path().display(),
                manager.backup_path().display()
            )
            .yellow()
        );

        manager.restore_backup().await.context("Failed to roll back")?;
        manager.cleanup_backup().await.context("Restored, but failed to remove the backup")?;

        println!("{}", "Successfully restored from backup".green());
        Ok(())
    }
}
