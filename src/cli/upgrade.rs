use crate::config::GlobalConfig;
use crate::upgrade::{ChecksumVerifier, SelfUpdater};
use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;
use tracing::debug;

/// Replace an artifact with the newest download.
///
/// The artifact is named either by a key from the `[artifacts]` table of the
/// configuration file or directly with `--artifact` and `--url`.
///
/// # Examples
///
/// ```bash
/// artup upgrade thing
/// artup upgrade --artifact ~/plugins/thing.jar --url https://example.org/thing.jar
/// artup upgrade thing --sha256 sha256:9f86d0...
/// ```
#[derive(Args, Debug)]
pub struct UpgradeCommand {
    /// Name of an artifact in the configuration file.
    #[arg(
        value_name = "NAME",
        required_unless_present = "artifact",
        conflicts_with_all = ["artifact", "url"]
    )]
    target: Option<String>,

    /// Path of the artifact to replace.
    #[arg(long, value_name = "PATH", requires = "url")]
    artifact: Option<PathBuf>,

    /// Where to download the new artifact from.
    #[arg(long, value_name = "URL", requires = "artifact")]
    url: Option<String>,

    /// Logical name of the artifact, used for the backup file.
    #[arg(long, value_name = "NAME")]
    name: Option<String>,

    /// Verify the installed artifact against this digest instead of walking the archive.
    #[arg(long, value_name = "DIGEST")]
    sha256: Option<String>,
}

/// Fully resolved description of what to update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct UpgradeTarget {
    pub path: PathBuf,
    pub url: String,
    pub name: Option<String>,
    pub sha256: Option<String>,
}

impl UpgradeCommand {
    pub(crate) fn resolve(&self, config: &GlobalConfig) -> Result<UpgradeTarget> {
        let mut target = match (&self.target, &self.artifact, &self.url) {
            (Some(key), _, _) => {
                let entry = config.artifact(key)?;
                UpgradeTarget {
                    path: entry.expanded_path()?,
                    url: entry.url.clone(),
                    name: Some(entry.name.clone().unwrap_or_else(|| key.clone())),
                    sha256: entry.sha256.clone(),
                }
            }
            (None, Some(path), Some(url)) => UpgradeTarget {
                path: path.clone(),
                url: url.clone(),
                name: None,
                sha256: None,
            },
            _ => anyhow::bail!("Specify an artifact name or both --artifact and --url"),
        };

        if let Some(name) = &self.name {
            target.name = Some(name.clone());
        }
        if let Some(digest) = &self.sha256 {
            target.sha256 = Some(digest.clone());
        }
        Ok(target)
    }

    pub async fn execute(self, config: &GlobalConfig) -> Result<()> {
        let target = self.resolve(config)?;
        debug!("Resolved upgrade target: {:?}", target);

        let mut builder = SelfUpdater::builder(&target.path, &target.url)
            .extension(&config.upgrade.artifact_extension)
            .timeouts(config.upgrade.timeouts());
        if let Some(name) = &target.name {
            builder = builder.name(name);
        }
        if let Some(digest) = &target.sha256 {
            builder = builder.verifier(ChecksumVerifier::new(digest));
        }
        let mut updater = builder.build().context("Failed to set up the HTTP client")?;
        let name = updater.name().to_string();

        println!("{}", format!("Updating '{}' from {}...", name, target.url).cyan());

        let outcome = updater
            .perform_update()
            .await
            .with_context(|| format!("Failed to update '{name}'"))?;

        println!(
            "{}",
            format!(
                "Updated '{}' ({} bytes written to {})",
                name,
                outcome.bytes_written,
                outcome.artifact.display()
            )
            .green()
        );
        Ok(())
    }
}
