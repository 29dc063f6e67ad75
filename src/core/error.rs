//! Error handling for artup
//!
//! This module provides the typed errors of the update and version-check paths
//! together with user-friendly error reporting for the CLI. The error system is
//! built around two principles:
//! 1. **Strongly-typed errors** so callers can branch on the failure kind
//! 2. **User-friendly messages** with actionable suggestions for CLI users
//!
//! # Architecture
//!
//! - [`UpdateError`] - the failure of one `perform_update` attempt; carries a
//!   machine-readable [`UpdateErrorKind`] and [`reason`](UpdateError::reason)
//! - [`BackupError`] - backup creation, restoration and cleanup failures
//! - [`IntegrityError`] - the verdict of an [`IntegrityVerifier`](crate::upgrade::verification::IntegrityVerifier)
//! - [`FetchError`] - transport failures shared by downloads and version checks
//! - [`VersionCheckError`] - invalid version-checker construction
//! - [`ErrorContext`] - wrapper adding details and suggestions for display
//!
//! Use [`user_friendly_error`] to convert any `anyhow::Error` bubbling out of
//! the CLI into an [`ErrorContext`].
//!
//! # Examples
//!
//! ```rust,no_run
//! use artup_cli::core::{UpdateError, UpdateErrorKind};
//!
//! fn describe(err: &UpdateError) -> &'static str {
//!     match err.kind() {
//!         UpdateErrorKind::DownloadFailedAndRestoreFailed => "restore the backup by hand",
//!         _ => err.reason(),
//!     }
//! }
//! ```

use colored::Colorize;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Machine-readable kind of an [`UpdateError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UpdateErrorKind {
    /// The artifact path lacks the required extension.
    InvalidExtension,
    /// The artifact does not exist on disk.
    ArtifactNotFound,
    /// Copying the artifact to its backup location failed.
    BackupFailed,
    /// The current artifact did not pass the integrity smoke test.
    IntegrityCheckFailed,
    /// The download failed and the previous artifact was restored.
    DownloadFailed,
    /// The download failed and restoring the backup failed too.
    DownloadFailedAndRestoreFailed,
}

impl UpdateErrorKind {
    /// Short, stable reason string suitable for logs and scripts.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InvalidExtension => "invalid_extension",
            Self::ArtifactNotFound => "artifact_not_found",
            Self::BackupFailed => "backup_failed",
            Self::IntegrityCheckFailed => "integrity_check_failed",
            Self::DownloadFailed => "download_failed",
            Self::DownloadFailedAndRestoreFailed => "download_failed_and_restore_failed",
        }
    }
}

impl fmt::Display for UpdateErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure of a single self-update attempt.
///
/// Every variant maps onto exactly one [`UpdateErrorKind`]. The variants that
/// occur after the backup was taken document what happened to the artifact:
/// [`DownloadFailed`](Self::DownloadFailed) means it was rolled back, while
/// [`DownloadFailedAndRestoreFailed`](Self::DownloadFailedAndRestoreFailed)
/// means the backup at `backup` is the only intact copy.
#[derive(Error, Debug)]
pub enum UpdateError {
    #[error("Artifact path must end with .{extension}: {}", .path.display())]
    InvalidExtension {
        path: PathBuf,
        extension: String,
    },

    #[error("Artifact not found: {}", .path.display())]
    ArtifactNotFound {
        path: PathBuf,
    },

    #[error("Failed to back up artifact {}", .path.display())]
    BackupFailed {
        path: PathBuf,
        #[source]
        source: BackupError,
    },

    #[error("Integrity check failed for {}", .path.display())]
    IntegrityCheckFailed {
        path: PathBuf,
        #[source]
        source: IntegrityError,
    },

    #[error("Failed to download {url}; the previous artifact was restored")]
    DownloadFailed {
        url: String,
        #[source]
        source: FetchError,
    },

    #[error(
        "Failed to download {url} and could not restore the previous artifact; backup kept at {}",
        .backup.display()
    )]
    DownloadFailedAndRestoreFailed {
        url: String,
        backup: PathBuf,
        #[source]
        source: FetchError,
        restore_error: BackupError,
    },
}

impl UpdateError {
    /// The kind of this failure.
    #[must_use]
    pub const fn kind(&self) -> UpdateErrorKind {
        match self {
            Self::InvalidExtension { .. } => UpdateErrorKind::InvalidExtension,
            Self::ArtifactNotFound { .. } => UpdateErrorKind::ArtifactNotFound,
            Self::BackupFailed { .. } => UpdateErrorKind::BackupFailed,
            Self::IntegrityCheckFailed { .. } => UpdateErrorKind::IntegrityCheckFailed,
            Self::DownloadFailed { .. } => UpdateErrorKind::DownloadFailed,
            Self::DownloadFailedAndRestoreFailed { .. } => {
                UpdateErrorKind::DownloadFailedAndRestoreFailed
            }
        }
    }

    /// Short machine-readable reason, e.g. `"download_failed"`.
    #[must_use]
    pub const fn reason(&self) -> &'static str {
        self.kind().as_str()
    }
}

/// Backup creation, restoration and cleanup failures.
#[derive(Error, Debug)]
pub enum BackupError {
    #[error("Original file does not exist: {}", .path.display())]
    MissingOriginal {
        path: PathBuf,
    },

    #[error("No backup found at {}", .path.display())]
    MissingBackup {
        path: PathBuf,
    },

    #[error("Backup location is the artifact itself: {}", .path.display())]
    CollidesWithArtifact {
        path: PathBuf,
    },

    #[error("Failed to {operation}: {}", .path.display())]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl BackupError {
    pub(crate) fn io(
        operation: &'static str,
        path: impl Into<PathBuf>,
    ) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| Self::Io {
            operation,
            path,
            source,
        }
    }
}

/// Verdict of an integrity verifier that rejected an artifact.
#[derive(Error, Debug)]
pub enum IntegrityError {
    #[error("Could not read artifact archive {}: {reason}", .path.display())]
    ArchiveIo {
        path: PathBuf,
        reason: String,
    },

    #[error("Unit '{unit}' could not be resolved: {reason}")]
    UnitNotFound {
        unit: String,
        reason: String,
    },

    #[error("Unexpected failure while verifying artifact: {message}")]
    Unexpected {
        message: String,
    },

    #[error("Checksum mismatch: expected {expected}, got {actual}")]
    ChecksumMismatch {
        expected: String,
        actual: String,
    },
}

/// Transport failures of the HTTP layer.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl {
        url: String,
        reason: String,
    },

    #[error("Failed to build HTTP client")]
    Client(#[source] reqwest::Error),

    #[error("Request to {url} failed")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Request to {url} returned HTTP {status}")]
    Status {
        url: String,
        status: u16,
    },

    #[error("Failed to write {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Invalid arguments handed to a version checker.
#[derive(Error, Debug)]
pub enum VersionCheckError {
    #[error("{field} must not be empty")]
    EmptyArgument {
        field: &'static str,
    },

    #[error("Invalid {field} '{value}'")]
    InvalidNumber {
        field: &'static str,
        value: String,
    },

    #[error("Unknown release channel '{0}'")]
    UnknownChannel(String),

    #[error(transparent)]
    Transport(#[from] FetchError),
}

/// Error wrapper with user-facing details and a suggested fix.
#[derive(Debug)]
pub struct ErrorContext {
    /// The message describing what failed
    pub message: String,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            suggestion: None,
            details: None,
        }
    }

    #[must_use]
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    #[must_use]
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Print the error to stderr with colored labels.
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.message);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Convert any error into an [`ErrorContext`] with a helpful suggestion.
///
/// Typed errors from this crate are recognised anywhere in the `anyhow`
/// chain; the root cause is reported as details.
#[must_use]
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    let message = format!("{error:#}");

    if let Some(update_error) = error.chain().find_map(|e| e.downcast_ref::<UpdateError>()) {
        return update_error_context(update_error, message);
    }

    if let Some(backup_error) = error.chain().find_map(|e| e.downcast_ref::<BackupError>()) {
        return match backup_error {
            BackupError::MissingBackup { .. } => ErrorContext::new(message)
                .with_suggestion("No backup exists; there is nothing to roll back to"),
            BackupError::MissingOriginal { .. } => ErrorContext::new(message)
                .with_suggestion("Check that the artifact path is correct"),
            BackupError::CollidesWithArtifact { .. } => ErrorContext::new(message)
                .with_suggestion("Rename the artifact or give it a logical name that differs from its file name"),
            BackupError::Io { .. } => ErrorContext::new(message)
                .with_suggestion("Check permissions on the artifact's directory"),
        };
    }

    if let Some(check_error) = error.chain().find_map(|e| e.downcast_ref::<VersionCheckError>()) {
        return match check_error {
            VersionCheckError::UnknownChannel(_) => ErrorContext::new(message)
                .with_suggestion("Use one of: stable, release-candidate, beta, alpha"),
            _ => ErrorContext::new(message)
                .with_suggestion("Check the program name, version, build and check URL"),
        };
    }

    if let Some(io_error) = error.chain().find_map(|e| e.downcast_ref::<std::io::Error>()) {
        match io_error.kind() {
            std::io::ErrorKind::PermissionDenied => {
                return ErrorContext::new(message)
                    .with_suggestion("Check file ownership or run with elevated permissions")
                    .with_details("artup could not read or write a required file");
            }
            std::io::ErrorKind::NotFound => {
                return ErrorContext::new(message)
                    .with_suggestion("Check that the file or directory exists and the path is correct");
            }
            _ => {}
        }
    }

    ErrorContext::new(message)
}

fn update_error_context(error: &UpdateError, message: String) -> ErrorContext {
    let context = ErrorContext::new(message).with_details(format!("reason: {}", error.reason()));
    match error {
        UpdateError::InvalidExtension { extension, .. } => context
            .with_suggestion(format!("Point --artifact at a file ending in .{extension}")),
        UpdateError::ArtifactNotFound { .. } => {
            context.with_suggestion("Check that the artifact path is correct and the file exists")
        }
        UpdateError::BackupFailed { .. } => {
            context.with_suggestion("Make sure the artifact's directory is writable")
        }
        UpdateError::IntegrityCheckFailed { .. } => context.with_suggestion(
            "The installed artifact looks corrupt; reinstall it manually before updating",
        ),
        UpdateError::DownloadFailed { .. } => {
            context.with_suggestion("Check the download URL and your network connection")
        }
        UpdateError::DownloadFailedAndRestoreFailed { backup, .. } => context.with_suggestion(
            format!("Restore manually with `artup rollback` or copy {} into place", backup.display()),
        ),
    }
}
