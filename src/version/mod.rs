//! Release channel model and version reconciliation.
//!
//! A release is identified by a numeric version, an integer build that breaks
//! ties within a version, and the [`Channel`] it was published on. A remote
//! check endpoint reports the newest release of every channel in a compact
//! comma-separated format; [`comparison`] turns that report, together with the
//! caller's own release, into one authoritative answer.
//!
//! # Module Organization
//!
//! - [`channel`] - the [`Channel`] enum and its wire tokens
//! - [`comparison`] - response parsing and the ordered channel reduction
//!
//! # Examples
//!
//! ```rust
//! use artup_cli::version::{Channel, VersionBuild};
//!
//! let installed = VersionBuild::new(1.0, 5, Channel::Stable);
//! let published = VersionBuild::new(1.0, 6, Channel::Stable);
//!
//! assert!(published.supersedes(&installed));
//! assert_eq!(installed.newest(published).to_string(), "1.0.6");
//! ```

pub mod channel;
pub mod comparison;

pub use channel::Channel;
pub use comparison::{ChannelReport, VersionComparator};

use std::fmt;

/// A (version, build) pair observed on a channel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VersionBuild {
    pub version: f32,
    pub build: u64,
    pub channel: Channel,
}

impl VersionBuild {
    #[must_use]
    pub const fn new(version: f32, build: u64, channel: Channel) -> Self {
        Self {
            version,
            build,
            channel,
        }
    }

    /// Placeholder for a channel with nothing published, always dominated.
    #[must_use]
    pub const fn unpublished(channel: Channel) -> Self {
        Self::new(0.0, 0, channel)
    }

    /// Whether `self` is strictly newer than `other`.
    ///
    /// A higher version wins; an equal version wins only with a strictly
    /// higher build. Channels are not considered.
    #[must_use]
    pub fn supersedes(&self, other: &Self) -> bool {
        self.version > other.version
            || (self.version == other.version && self.build > other.build)
    }

    /// Keep `self` unless `candidate` supersedes it.
    #[must_use]
    pub fn newest(self, candidate: Self) -> Self {
        if candidate.supersedes(&self) {
            candidate
        } else {
            self
        }
    }
}

impl fmt::Display for VersionBuild {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", format_version(self.version), self.build)?;
        if !self.channel.is_stable() {
            write!(f, " {}", self.channel)?;
        }
        Ok(())
    }
}

/// Render a version number with at least one fractional digit (`1.0`, `2.25`).
#[must_use]
pub fn format_version(version: f32) -> String {
    if version.fract() == 0.0 {
        format!("{version:.1}")
    } else {
        version.to_string()
    }
}
