use crate::constants::{
    CONNECT_TIMEOUT, DEFAULT_ARTIFACT_EXTENSION, DEFAULT_CHECK_INTERVAL, READ_TIMEOUT,
};
use crate::upgrade::http::Timeouts;
use crate::upgrade::version_check::CheckerOptions;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Settings shared by `artup upgrade` and `artup check`.
///
/// Every field has a default, so an empty `[upgrade]` table or a missing one
/// yields the same behaviour as no configuration at all.
///
/// # TOML Example
///
/// ```toml
/// [upgrade]
/// artifact_extension = "jar"
/// connect_timeout_ms = 2000
/// read_timeout_ms = 2000
/// check_interval = 600
/// check_unstable = false
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpgradeConfig {
    /// Extension every artifact path must carry, without the dot.
    #[serde(default = "default_artifact_extension")]
    pub artifact_extension: String,

    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,

    /// Applies to each read, not to a whole transfer.
    #[serde(default = "default_read_timeout_ms")]
    pub read_timeout_ms: u64,

    /// Throttle window between two live version checks, in seconds.
    #[serde(default = "default_check_interval")]
    pub check_interval: u64,

    /// Whether Alpha, Beta and Release Candidate releases count as updates.
    #[serde(default)]
    pub check_unstable: bool,
}

impl Default for UpgradeConfig {
    fn default() -> Self {
        Self {
            artifact_extension: default_artifact_extension(),
            connect_timeout_ms: default_connect_timeout_ms(),
            read_timeout_ms: default_read_timeout_ms(),
            check_interval: default_check_interval(),
            check_unstable: false,
        }
    }
}

fn default_artifact_extension() -> String {
    DEFAULT_ARTIFACT_EXTENSION.to_string()
}

fn default_connect_timeout_ms() -> u64 {
    CONNECT_TIMEOUT.as_millis() as u64
}

fn default_read_timeout_ms() -> u64 {
    READ_TIMEOUT.as_millis() as u64
}

fn default_check_interval() -> u64 {
    DEFAULT_CHECK_INTERVAL.as_secs()
}

impl UpgradeConfig {
    pub fn timeouts(&self) -> Timeouts {
        Timeouts {
            connect: Duration::from_millis(self.connect_timeout_ms),
            read: Duration::from_millis(self.read_timeout_ms),
        }
    }

    /// Version-checker options, with `check_unstable` forced on when `unstable` is set.
    pub fn checker_options(&self, unstable: bool) -> CheckerOptions {
        CheckerOptions {
            check_unstable: self.check_unstable || unstable,
            check_interval: Duration::from_secs(self.check_interval),
            timeouts: self.timeouts(),
        }
    }
}
