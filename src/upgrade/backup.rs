use crate::constants::BACKUP_SUFFIX;
use crate::core::BackupError;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, warn};

/// Manages the backup copy of an artifact during an update attempt.
///
/// `BackupManager` takes a byte-exact copy of the artifact before it is
/// overwritten and puts it back if the update fails. The backup lives next to
/// the artifact, named after the artifact's logical name with a `.bak`
/// suffix, so it shares the artifact's file system and permissions context.
///
/// # Backup Lifecycle
///
/// 1. [`create_backup()`](Self::create_backup) right before the artifact is mutated
/// 2. [`restore_backup()`](Self::restore_backup) if anything downstream fails
/// 3. [`cleanup_backup()`](Self::cleanup_backup) once the attempt is settled
///
/// A backup is only left behind when restoring it failed, so that an operator
/// can recover the artifact by hand.
///
/// # Examples
///
/// ```rust,no_run
/// use artup_cli::upgrade::backup::BackupManager;
/// use std::path::PathBuf;
///
/// # async fn example() -> anyhow::Result<()> {
/// let manager = BackupManager::with_name(PathBuf::from("/opt/app/plugins/thing-1.4.jar"), "Thing");
/// assert_eq!(manager.backup_path(), PathBuf::from("/opt/app/plugins/Thing.bak"));
///
/// manager.create_backup().await?;
/// // ... replace the artifact ...
/// let replaced = true;
/// if replaced {
///     manager.cleanup_backup().await?;
/// } else {
///     manager.restore_backup().await?;
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct BackupManager {
    /// Path to the artifact being protected.
    original_path: PathBuf,
    /// Path where the backup is stored.
    backup_path: PathBuf,
}

impl BackupManager {
    /// Create a manager whose logical name is the artifact's file stem.
    ///
    /// `/opt/app/thing.jar` is backed up to `/opt/app/thing.bak`.
    pub fn new(artifact_path: PathBuf) -> Self {
        let name = artifact_path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self::with_name(artifact_path, &name)
    }

    /// Create a manager with an explicit logical artifact name.
    pub fn with_name(artifact_path: PathBuf, name: &str) -> Self {
        let mut backup_path = artifact_path.clone();
        backup_path.set_file_name(format!("{name}{BACKUP_SUFFIX}"));

        Self {
            original_path: artifact_path,
            backup_path,
        }
    }

    /// Copy the artifact to the backup location.
    ///
    /// Any backup left over from an earlier attempt is replaced. On Unix the
    /// artifact's permissions are carried over. If the copy cannot be
    /// completed, no partial backup is left behind.
    ///
    /// # Errors
    ///
    /// - [`BackupError::MissingOriginal`] if the artifact does not exist
    /// - [`BackupError::CollidesWithArtifact`] if the backup would overwrite the artifact
    /// - [`BackupError::Io`] if the old backup cannot be removed or the copy fails
    pub async fn create_backup(&self) -> Result<(), BackupError> {
        self.ensure_distinct()?;

        if !self.original_path.exists() {
            return Err(BackupError::MissingOriginal {
                path: self.original_path.clone(),
            });
        }

        if self.backup_path.exists() {
            debug!("Removing old backup at {:?}", self.backup_path);
            fs::remove_file(&self.backup_path)
                .await
                .map_err(BackupError::io("remove old backup", &self.backup_path))?;
        }

        info!("Creating backup at {:?}", self.backup_path);
        fs::copy(&self.original_path, &self.backup_path)
            .await
            .map_err(BackupError::io("create backup", &self.backup_path))?;

        #[cfg(unix)]
        {
            if let Err(e) = copy_permissions(&self.original_path, &self.backup_path).await {
                if let Err(cleanup) = fs::remove_file(&self.backup_path).await {
                    debug!("Failed to remove incomplete backup {:?}: {}", self.backup_path, cleanup);
                }
                return Err(e);
            }
        }

        Ok(())
    }

    fn ensure_distinct(&self) -> Result<(), BackupError> {
        if self.backup_path == self.original_path {
            return Err(BackupError::CollidesWithArtifact {
                path: self.backup_path.clone(),
            });
        }
        Ok(())
    }

    /// Overwrite the artifact with the backup copy.
    ///
    /// The backup itself is left in place; call
    /// [`cleanup_backup()`](Self::cleanup_backup) once the restore is confirmed.
    ///
    /// # Errors
    ///
    /// - [`BackupError::MissingBackup`] if there is no backup to restore
    /// - [`BackupError::CollidesWithArtifact`] if the backup path is the artifact itself
    /// - [`BackupError::Io`] if the copy or the permission update fails
    pub async fn restore_backup(&self) -> Result<(), BackupError> {
        self.ensure_distinct()?;

        if !self.backup_path.exists() {
            return Err(BackupError::MissingBackup {
                path: self.backup_path.clone(),
            });
        }

        warn!("Restoring {:?} from backup at {:?}", self.original_path, self.backup_path);

        fs::copy(&self.backup_path, &self.original_path)
            .await
            .map_err(BackupError::io("restore backup", &self.original_path))?;

        #[cfg(unix)]
        {
            copy_permissions(&self.backup_path, &self.original_path).await?;
        }

        info!("Successfully restored from backup");
        Ok(())
    }

    /// Remove the backup file.
    ///
    /// Succeeds silently when no backup exists, so it is safe to call
    /// unconditionally once an attempt is settled.
    pub async fn cleanup_backup(&self) -> Result<(), BackupError> {
        if self.backup_path.exists() {
            debug!("Cleaning up backup at {:?}", self.backup_path);
            fs::remove_file(&self.backup_path)
                .await
                .map_err(BackupError::io("remove backup", &self.backup_path))?;
        }
        Ok(())
    }

    /// Whether a backup file currently exists.
    pub fn backup_exists(&self) -> bool {
        self.backup_path.exists()
    }

    /// Path where the backup file is stored.
    pub fn backup_path(&self) -> &Path {
        &self.backup_path
    }

    /// Path of the artifact this manager protects.
    pub fn artifact_path(&self) -> &Path {
        &self.original_path
    }
}

#[cfg(unix)]
async fn copy_permissions(from: &Path, to: &Path) -> Result<(), BackupError> {
    let metadata = fs::metadata(from).await.map_err(BackupError::io("read metadata", from))?;
    fs::set_permissions(to, metadata.permissions())
        .await
        .map_err(BackupError::io("set permissions", to))
}
