//! Parsing of version-check responses and the channel reduction.
//!
//! A check endpoint answers with one entry per channel:
//!
//! ```text
//! STABLE:version=1.0:build=5,BETA:version=1.1:build=2
//! ```
//!
//! Entries may come in any order and any channel may be omitted. The parser
//! favours availability: a malformed entry degrades that channel to
//! version 0, build 0 instead of failing the whole response.
//!
//! # Reduction order
//!
//! The authoritative release is found by a chain of pairwise comparisons, not
//! by a global maximum. The caller's own release is compared against Stable
//! first; only when unstable channels are enabled does the winner then face
//! Alpha, Beta and Release Candidate, in that order. A tie never displaces
//! the incumbent, so the order decides which channel is reported when two
//! channels publish the same version and build.
//!
//! ```rust
//! use artup_cli::version::{Channel, ChannelReport, VersionBuild, VersionComparator};
//!
//! let installed = VersionBuild::new(1.0, 5, Channel::Stable);
//! let report = ChannelReport::parse("STABLE:version=1.0:build=5,ALPHA:version=2.0:build=1");
//!
//! let stable_only = VersionComparator::reduce(installed, &report, false);
//! assert_eq!(stable_only, installed);
//!
//! let with_unstable = VersionComparator::reduce(installed, &report, true);
//! assert_eq!(with_unstable.channel, Channel::Alpha);
//! ```

use super::{Channel, VersionBuild};
use std::collections::HashMap;
use tracing::{debug, warn};

/// Unstable channels, in the order they challenge the Stable winner.
pub const UNSTABLE_REDUCTION_ORDER: [Channel; 3] =
    [Channel::Alpha, Channel::Beta, Channel::ReleaseCandidate];

/// Newest release per channel as reported by a check endpoint.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChannelReport {
    releases: HashMap<Channel, VersionBuild>,
}

impl ChannelReport {
    /// Parse a comma-separated channel report.
    ///
    /// Unrecognised channel tokens are skipped. A repeated channel keeps its
    /// last entry.
    #[must_use]
    pub fn parse(input: &str) -> Self {
        let mut releases = HashMap::new();

        for entry in input.split(',').map(str::trim).filter(|entry| !entry.is_empty()) {
            let mut fields = entry.split(':');
            let Some(channel) = fields.next().map(str::trim).and_then(Channel::from_wire_token)
            else {
                debug!("Ignoring unrecognized channel entry '{}'", entry);
                continue;
            };

            let release = match parse_version_build(fields) {
                Some((version, build)) => VersionBuild::new(version, build, channel),
                None => {
                    warn!("Malformed {} entry '{}', treating it as unpublished", channel, entry);
                    VersionBuild::unpublished(channel)
                }
            };
            releases.insert(channel, release);
        }

        Self {
            releases,
        }
    }

    /// Newest release on `channel`, or the unpublished placeholder.
    #[must_use]
    pub fn release(&self, channel: Channel) -> VersionBuild {
        self.releases
            .get(&channel)
            .copied()
            .unwrap_or_else(|| VersionBuild::unpublished(channel))
    }

    /// Whether at least one recognised channel entry was present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.releases.is_empty()
    }
}

fn parse_version_build<'a>(mut fields: impl Iterator<Item = &'a str>) -> Option<(f32, u64)> {
    let version = field_value(fields.next()?, "version")?
        .parse::<f32>()
        .ok()
        .filter(|version| version.is_finite() && *version >= 0.0)?;
    let build = field_value(fields.next()?, "build")?.parse::<u64>().ok()?;
    Some((version, build))
}

fn field_value<'a>(field: &'a str, key: &str) -> Option<&'a str> {
    let (name, value) = field.split_once('=')?;
    (name.trim() == key).then_some(value.trim())
}

/// Reduces a [`ChannelReport`] to the authoritative latest release.
pub struct VersionComparator;

impl VersionComparator {
    /// Run the ordered reduction starting from the caller's own release.
    ///
    /// The result equals `current` exactly when nothing newer was found on
    /// the channels that were allowed to compete.
    #[must_use]
    pub fn reduce(
        current: VersionBuild,
        report: &ChannelReport,
        check_unstable: bool,
    ) -> VersionBuild {
        let mut latest = current.newest(report.release(Channel::Stable));

        if check_unstable {
            for channel in UNSTABLE_REDUCTION_ORDER {
                latest = latest.newest(report.release(channel));
            }
        }

        latest
    }

    /// Whether `current` is the authoritative release.
    ///
    /// Version, build and channel must all match.
    #[must_use]
    pub fn is_latest(current: &VersionBuild, latest: &VersionBuild) -> bool {
        current == latest
    }
}
