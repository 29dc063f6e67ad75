//! artup - self-updating artifacts and multi-channel version checks
//!
//! artup lets a deployed piece of software replace its own artifact with a
//! newer download, and separately ask a remote endpoint whether a newer
//! release exists on any of its release channels.
//!
//! # Architecture Overview
//!
//! ## Self-update
//!
//! An update attempt backs the artifact up, smoke-tests the installed copy,
//! downloads the replacement straight over it and settles by either
//! discarding the backup or restoring it:
//!
//! ```text
//! Idle -> BackedUp -> Verified -> Downloaded -> Swapped
//!                                     \
//!                                      -> RolledBack -> Failed
//! ```
//!
//! ## Version checks
//!
//! A check endpoint reports the newest (version, build) of each channel:
//!
//! ```text
//! STABLE:version=1.0:build=5,BETA:version=1.1:build=2
//! ```
//!
//! The caller's own release is compared against Stable and, when unstable
//! channels are enabled, against Alpha, Beta and Release Candidate in turn.
//! Answers are cached for a throttle window.
//!
//! # Core Modules
//!
//! - [`upgrade`] - the update protocol, integrity verification and version checking
//! - [`version`] - channels, version/build pairs and the channel reduction
//! - [`core`] - error types and user-facing error reporting
//! - [`config`] - the global `~/.artup/config.toml`
//! - [`cli`] - the `artup` command-line interface
//! - [`constants`] - timeouts, protocol tokens and naming conventions
//!
//! # Example
//!
//! ```rust,no_run
//! use artup_cli::upgrade::{CheckOutcome, SelfUpdater, VersionChecker};
//! use artup_cli::version::Channel;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let mut checker =
//!     VersionChecker::new("Thing", "1.0", "5", Channel::Stable, "https://example.org/check")?;
//!
//! if checker.is_latest().await == CheckOutcome::UpdateAvailable {
//!     let mut updater =
//!         SelfUpdater::builder("/opt/app/plugins/thing.jar", "https://example.org/thing.jar")
//!             .name("Thing")
//!             .build()?;
//!     updater.perform_update().await?;
//! }
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod constants;
pub mod core;
pub mod upgrade;
pub mod version;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
