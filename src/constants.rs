//! Global constants used throughout the artup codebase.
//!
//! This module contains network timeouts, protocol version tokens, and file
//! naming conventions that are shared by the self-update and version-check
//! halves of the crate. Defining them centrally keeps the two mechanisms on
//! the same wire conventions.

use std::time::Duration;

/// Connect timeout for every outgoing request (2 seconds).
pub const CONNECT_TIMEOUT: Duration = Duration::from_millis(2000);

/// Read timeout for every outgoing request (2 seconds).
///
/// Applies per read, not to the whole transfer, so a slow but steady
/// download is not cut off.
pub const READ_TIMEOUT: Duration = Duration::from_millis(2000);

/// Maximum number of redirects followed before a request is failed.
pub const MAX_REDIRECTS: usize = 10;

/// Minimum time between two live remote version checks (10 minutes).
///
/// Checks issued inside this window reuse the cached answer.
pub const DEFAULT_CHECK_INTERVAL: Duration = Duration::from_secs(600);

/// Version token sent by the updater in its `User-Agent` header.
pub const UPDATER_VERSION: &str = "1.0";

/// Version token sent by the version checker in its `User-Agent` header.
pub const CHECKER_VERSION: &str = "1.2";

/// Extension an artifact path must carry, without the leading dot.
pub const DEFAULT_ARTIFACT_EXTENSION: &str = "jar";

/// Suffix appended to the artifact's logical name to form the backup file.
pub const BACKUP_SUFFIX: &str = ".bak";

/// Suffix of archive entries treated as independently loadable units.
pub const DEFAULT_UNIT_SUFFIX: &str = ".class";

/// Marker identifying nested units, which are skipped during verification.
pub const INNER_UNIT_MARKER: char = '$';

/// Magic header every default loadable unit starts with.
pub const DEFAULT_UNIT_MAGIC: [u8; 4] = [0xCA, 0xFE, 0xBA, 0xBE];

/// Environment variable overriding the configuration file location.
pub const CONFIG_PATH_ENV: &str = "ARTUP_CONFIG_PATH";
