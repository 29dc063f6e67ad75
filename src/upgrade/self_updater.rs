use crate::constants::DEFAULT_ARTIFACT_EXTENSION;
use crate::core::{FetchError, IntegrityError, UpdateError};
use crate::upgrade::backup::BackupManager;
use crate::upgrade::download::ArtifactFetcher;
use crate::upgrade::http::{Timeouts, UserAgent};
use crate::upgrade::verification::{ArchiveVerifier, IntegrityVerifier};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Progress of a [`SelfUpdater`] through one update attempt.
///
/// ```text
/// Idle -> BackedUp -> Verified -> Downloaded -> Swapped
///                                     \
///                                      -> RolledBack -> Failed
/// ```
///
/// Any attempt that stops early ends in `Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateState {
    Idle,
    BackedUp,
    Verified,
    Downloaded,
    Swapped,
    RolledBack,
    Failed,
}

/// Result of a successful update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateOutcome {
    /// Path of the artifact that now holds the new payload.
    pub artifact: PathBuf,
    /// Number of bytes downloaded into it.
    pub bytes_written: u64,
}

/// Replaces a deployed artifact with a fresh download, rolling back on failure.
///
/// `SelfUpdater` sequences the [`BackupManager`], an [`IntegrityVerifier`] and
/// the [`ArtifactFetcher`] into one protocol:
///
/// 1. the artifact must carry the required extension and exist on disk
/// 2. a backup copy is taken
/// 3. the *installed* artifact is verified, so a rollback target is known to be sound
/// 4. the new artifact is downloaded straight over the old one
/// 5. the backup is removed, or restored when the download failed
///
/// # Examples
///
/// ```rust,no_run
/// use artup_cli::upgrade::SelfUpdater;
///
/// # async fn example() -> anyhow::Result<()> {
/// let mut updater = SelfUpdater::builder("/opt/app/plugins/thing.jar", "https://example.org/thing.jar")
///     .name("Thing")
///     .build()?;
///
/// match updater.perform_update().await {
///     Ok(outcome) => println!("wrote {} bytes", outcome.bytes_written),
///     Err(e) => eprintln!("update failed ({}): {e}", e.reason()),
/// }
/// # Ok(())
/// # }
/// ```
pub struct SelfUpdater {
    artifact: PathBuf,
    name: String,
    url: String,
    extension: String,
    verifier: Arc<dyn IntegrityVerifier>,
    fetcher: ArtifactFetcher,
    state: UpdateState,
}

impl SelfUpdater {
    /// Start configuring an updater for `artifact`, downloading from `url`.
    pub fn builder(artifact: impl Into<PathBuf>, url: impl Into<String>) -> SelfUpdaterBuilder {
        SelfUpdaterBuilder {
            artifact: artifact.into(),
            url: url.into(),
            name: None,
            extension: DEFAULT_ARTIFACT_EXTENSION.to_string(),
            verifier: None,
            timeouts: Timeouts::default(),
            product: None,
        }
    }

    /// Current position in the update state machine.
    pub fn state(&self) -> UpdateState {
        self.state
    }

    pub fn artifact_path(&self) -> &Path {
        &self.artifact
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Where the backup lives while an attempt is in flight.
    pub fn backup_path(&self) -> PathBuf {
        self.backup_manager().backup_path().to_path_buf()
    }

    fn backup_manager(&self) -> BackupManager {
        BackupManager::with_name(self.artifact.clone(), &self.name)
    }

    fn transition(&mut self, next: UpdateState) {
        debug!("Update of '{}': {:?} -> {:?}", self.name, self.state, next);
        self.state = next;
    }

    /// Run one complete update attempt.
    ///
    /// # Errors
    ///
    /// Each failure is reported as an [`UpdateError`] whose
    /// [`kind()`](UpdateError::kind) says how far the attempt got and what
    /// happened to the artifact.
    pub async fn perform_update(&mut self) -> Result<UpdateOutcome, UpdateError> {
        self.transition(UpdateState::Idle);

        let result = self.run().await;
        if let Err(e) = &result {
            warn!("Update of '{}' failed: {}", self.name, e);
            self.transition(UpdateState::Failed);
        }
        result
    }

    async fn run(&mut self) -> Result<UpdateOutcome, UpdateError> {
        if !has_extension(&self.artifact, &self.extension) {
            return Err(UpdateError::InvalidExtension {
                path: self.artifact.clone(),
                extension: self.extension.clone(),
            });
        }

        if !self.artifact.exists() {
            return Err(UpdateError::ArtifactNotFound {
                path: self.artifact.clone(),
            });
        }

        let backup = self.backup_manager();
        backup.create_backup().await.map_err(|source| UpdateError::BackupFailed {
            path: self.artifact.clone(),
            source,
        })?;
        self.transition(UpdateState::BackedUp);

        if let Err(source) = self.verify_installed().await {
            if let Err(e) = backup.cleanup_backup().await {
                warn!("Failed to remove backup after integrity failure: {}", e);
            }
            return Err(UpdateError::IntegrityCheckFailed {
                path: self.artifact.clone(),
                source,
            });
        }
        self.transition(UpdateState::Verified);

        info!("Downloading '{}' from {}", self.name, self.url);
        match self.fetcher.fetch(&self.url, &self.artifact).await {
            Ok(bytes_written) => {
                self.transition(UpdateState::Downloaded);
                if let Err(e) = backup.cleanup_backup().await {
                    warn!("Update succeeded but the backup could not be removed: {}", e);
                }
                self.transition(UpdateState::Swapped);
                info!("Updated '{}' ({} bytes)", self.name, bytes_written);

                Ok(UpdateOutcome {
                    artifact: self.artifact.clone(),
                    bytes_written,
                })
            }
            Err(source) => self.roll_back(&backup, source).await,
        }
    }

    async fn verify_installed(&self) -> Result<(), IntegrityError> {
        let verifier = Arc::clone(&self.verifier);
        let path = self.artifact.clone();

        tokio::task::spawn_blocking(move || verifier.verify(&path)).await.unwrap_or_else(
            |join_error| {
                Err(IntegrityError::Unexpected {
                    message: join_error.to_string(),
                })
            },
        )
    }

    async fn roll_back(
        &mut self,
        backup: &BackupManager,
        source: FetchError,
    ) -> Result<UpdateOutcome, UpdateError> {
        warn!("Download of '{}' failed, restoring backup: {}", self.name, source);

        match backup.restore_backup().await {
            Ok(()) => {
                self.transition(UpdateState::RolledBack);
                if let Err(e) = backup.cleanup_backup().await {
                    warn!("Restored artifact but could not remove the backup: {}", e);
                }
                Err(UpdateError::DownloadFailed {
                    url: self.url.clone(),
                    source,
                })
            }
            Err(restore_error) => Err(UpdateError::DownloadFailedAndRestoreFailed {
                url: self.url.clone(),
                backup: backup.backup_path().to_path_buf(),
                source,
                restore_error,
            }),
        }
    }
}

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension().and_then(|ext| ext.to_str()) == Some(extension)
}

/// Builder for [`SelfUpdater`].
pub struct SelfUpdaterBuilder {
    artifact: PathBuf,
    url: String,
    name: Option<String>,
    extension: String,
    verifier: Option<Arc<dyn IntegrityVerifier>>,
    timeouts: Timeouts,
    product: Option<(String, String)>,
}

impl SelfUpdaterBuilder {
    /// Logical artifact name; defaults to the file stem.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Required artifact extension, with or without the leading dot.
    pub fn extension(mut self, extension: impl AsRef<str>) -> Self {
        self.extension = extension.as_ref().trim_start_matches('.').to_string();
        self
    }

    /// Verifier for the installed artifact; defaults to [`ArchiveVerifier::default()`].
    pub fn verifier(mut self, verifier: impl IntegrityVerifier + 'static) -> Self {
        self.verifier = Some(Arc::new(verifier));
        self
    }

    pub fn timeouts(mut self, timeouts: Timeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    /// Product token closing the `User-Agent` header.
    pub fn product(mut self, product: impl Into<String>, version: impl Into<String>) -> Self {
        self.product = Some((product.into(), version.into()));
        self
    }

    /// # Errors
    ///
    /// Fails only if the HTTP client cannot be constructed.
    pub fn build(self) -> Result<SelfUpdater, FetchError> {
        let name = self.name.unwrap_or_else(|| {
            self.artifact
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_default()
        });

        let mut user_agent = UserAgent::for_updater(&name);
        if let Some((product, version)) = self.product {
            user_agent = user_agent.with_product(product, version);
        }

        Ok(SelfUpdater {
            fetcher: ArtifactFetcher::new(&user_agent, self.timeouts)?,
            verifier: self.verifier.unwrap_or_else(|| Arc::new(ArchiveVerifier::default())),
            artifact: self.artifact,
            name,
            url: self.url,
            extension: self.extension,
            state: UpdateState::Idle,
        })
    }
}
