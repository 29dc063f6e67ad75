//! Release channels and their wire tokens.

use crate::core::VersionCheckError;
use std::fmt;
use std::str::FromStr;

/// A release stability tier.
///
/// Channels are deliberately not ordered: whether a less stable channel may
/// outrank [`Channel::Stable`] is decided by the reduction in
/// [`VersionComparator`](super::comparison::VersionComparator), not by the
/// channel itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    Stable,
    ReleaseCandidate,
    Beta,
    Alpha,
}

impl Channel {
    /// Every channel, in wire-grammar order.
    pub const ALL: [Self; 4] = [Self::Stable, Self::ReleaseCandidate, Self::Beta, Self::Alpha];

    /// Token identifying this channel in a version-check response.
    ///
    /// The release-candidate token keeps the historical `CANIDATE` spelling
    /// that deployed check endpoints emit.
    #[must_use]
    pub const fn wire_token(self) -> &'static str {
        match self {
            Self::Stable => "STABLE",
            Self::ReleaseCandidate => "RELEASE_CANIDATE",
            Self::Beta => "BETA",
            Self::Alpha => "ALPHA",
        }
    }

    /// Look up a channel by its exact wire token.
    #[must_use]
    pub fn from_wire_token(token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|channel| channel.wire_token() == token)
    }

    #[must_use]
    pub const fn is_stable(self) -> bool {
        matches!(self, Self::Stable)
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Stable => "STABLE",
            Self::ReleaseCandidate => "RELEASE_CANDIDATE",
            Self::Beta => "BETA",
            Self::Alpha => "ALPHA",
        })
    }
}

impl FromStr for Channel {
    type Err = VersionCheckError;

    /// Parse a user-supplied channel name.
    ///
    /// Accepts any case, `-` or `_` separators, the `rc` shorthand and the
    /// wire spelling `RELEASE_CANIDATE`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        match normalized.as_str() {
            "stable" => Ok(Self::Stable),
            "release_candidate" | "release_canidate" | "rc" => Ok(Self::ReleaseCandidate),
            "beta" => Ok(Self::Beta),
            "alpha" => Ok(Self::Alpha),
            _ => Err(VersionCheckError::UnknownChannel(s.to_string())),
        }
    }
}
