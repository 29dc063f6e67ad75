//! Self-update of deployed artifacts and remote version checks.
//!
//! This module holds both halves of artup. They do not call each other and
//! only share the HTTP conventions in [`http`].
//!
//! # Architecture Overview
//!
//! ## Self-update
//!
//! - **[`SelfUpdater`]**: runs one update attempt end to end
//! - **[`backup::BackupManager`]**: byte-exact backup and restore of the artifact
//! - **[`verification::IntegrityVerifier`]**: smoke test run against the installed artifact
//! - **[`download::ArtifactFetcher`]**: streams the new artifact over the old one
//!
//! ```text
//! 1. Validate    extension present, artifact exists
//! 2. Back up     <dir>/<name>.bak
//! 3. Verify      installed artifact resolves cleanly
//! 4. Download    GET <url> straight onto the artifact path
//! 5. Settle      success: drop the backup
//!                failure: restore the backup, then drop it
//! ```
//!
//! ## Version checks
//!
//! - **[`VersionChecker`]**: throttled "am I on the newest release?" query
//! - **[`remote::RemoteVersionClient`]**: one `POST program=<name>` exchange
//! - [`crate::version::VersionComparator`]: reduces the reported channels to one answer
//!
//! # Error Handling
//!
//! Update failures come back as [`UpdateError`](crate::core::UpdateError),
//! whose kind also tells what became of the artifact:
//!
//! ```rust,no_run
//! use artup_cli::core::UpdateErrorKind;
//! use artup_cli::upgrade::SelfUpdater;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let mut updater = SelfUpdater::builder("/opt/app/thing.jar", "https://example.org/thing.jar").build()?;
//! match updater.perform_update().await {
//!     Ok(outcome) => println!("Updated {}", outcome.artifact.display()),
//!     Err(e) if e.kind() == UpdateErrorKind::DownloadFailedAndRestoreFailed => {
//!         eprintln!("Manual recovery needed: {e}")
//!     }
//!     Err(e) => eprintln!("Update failed: {e}"),
//! }
//! # Ok(())
//! # }
//! ```
//!
//! Version checks never fail outright; see [`CheckOutcome`].

/// Backup and restore of an artifact during an update attempt.
pub mod backup;
/// `[upgrade]` configuration table.
pub mod config;
/// Streaming artifact download.
pub mod download;
/// `User-Agent` composition and the shared HTTP client.
pub mod http;
/// Version-check endpoint client.
pub mod remote;
/// The update protocol.
pub mod self_updater;
/// Integrity verification strategies.
pub mod verification;
/// Throttled version checking.
pub mod version_check;


pub use self_updater::{SelfUpdater, SelfUpdaterBuilder, UpdateOutcome, UpdateState};
pub use verification::{ArchiveVerifier, ChecksumVerifier, IntegrityVerifier};
pub use version_check::{CheckOutcome, CheckerOptions, RemoteError, VersionChecker};
