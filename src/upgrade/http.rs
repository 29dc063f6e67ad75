//! Shared HTTP conventions for downloads and version checks.
//!
//! Both halves of the crate identify themselves with the same `User-Agent`
//! layout and use the same timeout and redirect settings:
//!
//! ```text
//! <runtime>/<runtime-version> (<os>; <component>; <tool>/<tool-version>) <product>/<product-version>
//! ```
//!
//! The updater puts the artifact name in the component slot, the version
//! checker puts `<program>/<program-version>` there.

use crate::constants::{
    CHECKER_VERSION, CONNECT_TIMEOUT, MAX_REDIRECTS, READ_TIMEOUT, UPDATER_VERSION,
};
use crate::core::FetchError;
use std::fmt;
use std::time::Duration;

/// Connect and read timeouts applied to every request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub connect: Duration,
    pub read: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            connect: CONNECT_TIMEOUT,
            read: READ_TIMEOUT,
        }
    }
}

/// A composed `User-Agent` header value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserAgent {
    runtime: String,
    runtime_version: String,
    os: String,
    component: String,
    tool: String,
    tool_version: String,
    product: String,
    product_version: String,
}

impl UserAgent {
    fn base(component: String, tool: &str, tool_version: &str) -> Self {
        Self {
            runtime: "Rust".to_string(),
            runtime_version: env!("CARGO_PKG_RUST_VERSION").to_string(),
            os: std::env::consts::OS.to_string(),
            component,
            tool: tool.to_string(),
            tool_version: tool_version.to_string(),
            product: env!("CARGO_PKG_NAME").to_string(),
            product_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// Header sent when downloading `artifact_name`.
    #[must_use]
    pub fn for_updater(artifact_name: &str) -> Self {
        Self::base(artifact_name.to_string(), "Updater", UPDATER_VERSION)
    }

    /// Header sent when checking `program` at `program_version` for updates.
    #[must_use]
    pub fn for_version_checker(program: &str, program_version: &str) -> Self {
        Self::base(format!("{program}/{program_version}"), "VersionChecker", CHECKER_VERSION)
    }

    /// Replace the trailing product token, which defaults to this crate.
    #[must_use]
    pub fn with_product(mut self, product: impl Into<String>, version: impl Into<String>) -> Self {
        self.product = product.into();
        self.product_version = version.into();
        self
    }
}

impl fmt::Display for UserAgent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{} ({}; {}; {}/{}) {}/{}",
            self.runtime,
            self.runtime_version,
            self.os,
            self.component,
            self.tool,
            self.tool_version,
            self.product,
            self.product_version
        )
    }
}

/// Build a client carrying `user_agent`, the given timeouts and redirect following.
pub fn build_client(
    user_agent: &UserAgent,
    timeouts: Timeouts,
) -> Result<reqwest::Client, FetchError> {
    reqwest::Client::builder()
        .user_agent(user_agent.to_string())
        .connect_timeout(timeouts.connect)
        .read_timeout(timeouts.read)
        .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
        .build()
        .map_err(FetchError::Client)
}

/// Parse `url`, rejecting anything that is not http(s).
pub fn parse_url(url: &str) -> Result<reqwest::Url, FetchError> {
    let parsed = reqwest::Url::parse(url).map_err(|e| FetchError::InvalidUrl {
        url: url.to_string(),
        reason: e.to_string(),
    })?;

    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        scheme => Err(FetchError::InvalidUrl {
            url: url.to_string(),
            reason: format!("unsupported scheme '{scheme}'"),
        }),
    }
}
