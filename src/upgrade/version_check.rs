use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::constants::DEFAULT_CHECK_INTERVAL;
use crate::core::VersionCheckError;
use crate::upgrade::http::{Timeouts, UserAgent};
use crate::upgrade::remote::RemoteVersionClient;
use crate::version::{Channel, ChannelReport, VersionBuild, VersionComparator, format_version};

/// Why a remote exchange produced no usable channel report.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RemoteError {
    /// No response at all: transport failure, timeout, error status or empty body.
    #[error("External script could not be reached")]
    Unreachable,

    /// The endpoint answered `ERROR: 404`.
    #[error("Program not found")]
    ProgramNotFound,

    /// The endpoint answered `ERROR: 400`.
    #[error("External script error")]
    ExternalScriptError,

    /// The endpoint answered with a line starting with `Fatal`.
    #[error("{0}")]
    Fatal(String),

    /// Any other error line, or a body without a single channel entry.
    #[error("Unknown error: input- {0}")]
    Unknown(String),
}

impl RemoteError {
    /// Turn a raw response into a channel report or an error classification.
    ///
    /// `None` stands for an exchange that produced no response.
    pub fn classify(response: Option<&str>) -> Result<ChannelReport, Self> {
        let raw = match response.map(str::trim) {
            Some(raw) if !raw.is_empty() => raw,
            _ => return Err(Self::Unreachable),
        };

        match raw {
            "ERROR: 404" => return Err(Self::ProgramNotFound),
            "ERROR: 400" => return Err(Self::ExternalScriptError),
            _ if raw.starts_with("Fatal") => return Err(Self::Fatal(raw.to_string())),
            _ if raw.starts_with("ERROR") => return Err(Self::Unknown(raw.to_string())),
            _ => {}
        }

        let report = ChannelReport::parse(raw);
        if report.is_empty() {
            return Err(Self::Unknown(raw.to_string()));
        }
        Ok(report)
    }
}

/// Tri-state answer of [`VersionChecker::is_latest`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckOutcome {
    Latest,
    UpdateAvailable,
    /// The remote exchange failed; see [`VersionChecker::error_message`].
    Indeterminate,
}

impl CheckOutcome {
    fn from_latest(latest: bool) -> Self {
        if latest {
            Self::Latest
        } else {
            Self::UpdateAvailable
        }
    }

    /// `Some(true)` when up to date, `Some(false)` when outdated, `None` when unknown.
    #[must_use]
    pub const fn as_option(self) -> Option<bool> {
        match self {
            Self::Latest => Some(true),
            Self::UpdateAvailable => Some(false),
            Self::Indeterminate => None,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Latest => "latest",
            Self::UpdateAvailable => "update_available",
            Self::Indeterminate => "indeterminate",
        }
    }
}

/// Tuning knobs for a [`VersionChecker`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckerOptions {
    /// Let unstable channels compete with Stable.
    pub check_unstable: bool,
    /// Throttle window between two live exchanges.
    pub check_interval: Duration,
    pub timeouts: Timeouts,
}

impl Default for CheckerOptions {
    fn default() -> Self {
        Self {
            check_unstable: false,
            check_interval: DEFAULT_CHECK_INTERVAL,
            timeouts: Timeouts::default(),
        }
    }
}

/// Mutable state carried between checks.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckState {
    last_checked: Option<DateTime<Utc>>,
    latest: bool,
    last_error: Option<RemoteError>,
    current_version: String,
    latest_release: Option<VersionBuild>,
}

impl CheckState {
    fn new(installed: &VersionBuild) -> Self {
        Self {
            last_checked: None,
            latest: true,
            last_error: None,
            current_version: installed.to_string(),
            latest_release: None,
        }
    }

    /// Time of the last check that produced a definite answer.
    pub fn last_checked(&self) -> Option<DateTime<Utc>> {
        self.last_checked
    }

    /// Cached answer of the last definite check, `true` before any.
    pub fn is_latest(&self) -> bool {
        self.latest
    }

    pub fn last_error(&self) -> Option<&RemoteError> {
        self.last_error.as_ref()
    }

    pub fn current_version(&self) -> &str {
        &self.current_version
    }

    pub fn latest_release(&self) -> Option<VersionBuild> {
        self.latest_release
    }

    fn is_fresh(&self, window: Duration) -> bool {
        let Some(checked_at) = self.last_checked else {
            return false;
        };
        // A clock that went backwards counts as stale.
        (Utc::now() - checked_at).to_std().is_ok_and(|age| age < window)
    }
}

/// Asks a remote endpoint whether a program is on its newest release.
///
/// Answers are cached for the throttle window (ten minutes by default):
/// a check inside the window returns the cached answer without touching the
/// network. Failed exchanges are never cached, so the next call retries.
///
/// `is_latest()` never fails. A remote problem yields
/// [`CheckOutcome::Indeterminate`] and is described by
/// [`error_message()`](Self::error_message).
///
/// # Examples
///
/// ```rust,no_run
/// use artup_cli::upgrade::{CheckOutcome, VersionChecker};
/// use artup_cli::version::Channel;
///
/// # async fn example() -> anyhow::Result<()> {
/// let mut checker =
///     VersionChecker::new("Thing", "1.0", "5", Channel::Stable, "https://example.org/check")?;
///
/// match checker.is_latest().await {
///     CheckOutcome::Latest => println!("up to date"),
///     CheckOutcome::UpdateAvailable => println!("newest is {}", checker.current_version()),
///     CheckOutcome::Indeterminate => println!("{}", checker.error_message()),
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct VersionChecker {
    program: String,
    installed: VersionBuild,
    options: CheckerOptions,
    client: RemoteVersionClient,
    state: CheckState,
}

impl VersionChecker {
    /// Create a checker with default options.
    ///
    /// # Errors
    ///
    /// Fails when an argument is empty, `version` is not a non-negative
    /// number or `build` is not a non-negative integer.
    pub fn new(
        program: &str,
        version: &str,
        build: &str,
        channel: Channel,
        check_url: &str,
    ) -> Result<Self, VersionCheckError> {
        Self::with_options(program, version, build, channel, check_url, CheckerOptions::default())
    }

    pub fn with_options(
        program: &str,
        version: &str,
        build: &str,
        channel: Channel,
        check_url: &str,
        options: CheckerOptions,
    ) -> Result<Self, VersionCheckError> {
        let program = required("program", program)?;
        let version = required("version", version)?;
        let build = required("build", build)?;
        let check_url = required("check_url", check_url)?;

        let version = version
            .parse::<f32>()
            .ok()
            .filter(|v| v.is_finite() && *v >= 0.0)
            .ok_or_else(|| VersionCheckError::InvalidNumber {
                field: "version",
                value: version.to_string(),
            })?;
        let build = build.parse::<u64>().map_err(|_| VersionCheckError::InvalidNumber {
            field: "build",
            value: build.to_string(),
        })?;

        let installed = VersionBuild::new(version, build, channel);
        let user_agent = UserAgent::for_version_checker(program, &format_version(version));
        let client = RemoteVersionClient::new(check_url, &user_agent, options.timeouts)?;

        Ok(Self {
            program: program.to_string(),
            state: CheckState::new(&installed),
            installed,
            options,
            client,
        })
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// The caller's own release.
    pub fn installed(&self) -> VersionBuild {
        self.installed
    }

    pub fn state(&self) -> &CheckState {
        &self.state
    }

    pub fn check_unstable(&self) -> bool {
        self.options.check_unstable
    }

    pub fn set_check_unstable(&mut self, check_unstable: bool) {
        self.options.check_unstable = check_unstable;
    }

    /// Whether the installed release is the newest one.
    ///
    /// Contacts the endpoint unless a definite answer was obtained within
    /// the throttle window.
    pub async fn is_latest(&mut self) -> CheckOutcome {
        if self.state.is_fresh(self.options.check_interval) {
            debug!("Using cached version check result for '{}'", self.program);
            return CheckOutcome::from_latest(self.state.latest);
        }

        let response = match self.client.fetch_report(&self.program).await {
            Ok(body) => Some(body),
            Err(e) => {
                debug!("Version check exchange for '{}' failed: {}", self.program, e);
                None
            }
        };

        match RemoteError::classify(response.as_deref()) {
            Ok(report) => {
                let latest =
                    VersionComparator::reduce(self.installed, &report, self.options.check_unstable);
                let is_latest = VersionComparator::is_latest(&self.installed, &latest);

                self.state = CheckState {
                    last_checked: Some(Utc::now()),
                    latest: is_latest,
                    last_error: None,
                    current_version: latest.to_string(),
                    latest_release: Some(latest),
                };

                info!("Checked '{}': installed {}, latest {}", self.program, self.installed, latest);
                CheckOutcome::from_latest(is_latest)
            }
            Err(error) => {
                warn!("Unable to check '{}' for updates: {}", self.program, error);
                self.state.last_error = Some(error);
                CheckOutcome::Indeterminate
            }
        }
    }

    /// Version reported by the last definite check.
    ///
    /// This is the authoritative latest release, e.g. `1.0.6` or
    /// `2.0.1 ALPHA`. Before any check it is the installed release.
    pub fn current_version(&self) -> &str {
        &self.state.current_version
    }

    pub fn last_error(&self) -> Option<&RemoteError> {
        self.state.last_error.as_ref()
    }

    /// Description of the last remote error, or `"No errors present"`.
    pub fn error_message(&self) -> String {
        self.state
            .last_error
            .as_ref()
            .map_or_else(|| "No errors present".to_string(), ToString::to_string)
    }

    /// Run a check and describe its result in one sentence.
    pub async fn update_available_message(&mut self) -> String {
        let outcome = self.is_latest().await;
        self.describe(outcome)
    }

    /// One-sentence description of `outcome` for this program.
    pub fn describe(&self, outcome: CheckOutcome) -> String {
        match outcome {
            CheckOutcome::UpdateAvailable => format!(
                "An update is available for: '{}' - v{}",
                self.program,
                self.current_version()
            ),
            CheckOutcome::Latest => {
                format!("Current version of: '{}' is installed", self.program)
            }
            CheckOutcome::Indeterminate => format!(
                "Unable to check for updates of '{}': {}",
                self.program,
                self.error_message()
            ),
        }
    }
}

fn required<'a>(field: &'static str, value: &'a str) -> Result<&'a str, VersionCheckError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(VersionCheckError::EmptyArgument {
            field,
        });
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;

    fn checker(url: &str) -> VersionChecker {
        VersionChecker::new("Thing", "1.0", "5", Channel::Stable, url).unwrap()
    }

    #[test]
    fn test_freshness_window() {
        let window = Duration::from_secs(600);
        let mut state = CheckState::new(&VersionBuild::new(1.0, 5, Channel::Stable));
        assert!(!state.is_fresh(window));

        state.last_checked = Some(Utc::now() - chrono::Duration::seconds(30));
        assert!(state.is_fresh(window));

        state.last_checked = Some(Utc::now() - chrono::Duration::seconds(601));
        assert!(!state.is_fresh(window));

        // Timestamp from before a backwards clock jump.
        state.last_checked = Some(Utc::now() + chrono::Duration::hours(3));
        assert!(!state.is_fresh(window));
    }

    #[tokio::test]
    async fn test_future_timestamp_does_not_throttle() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/check")
            .with_status(200)
            .with_body("STABLE:version=1.0:build=6")
            .expect(1)
            .create_async()
            .await;

        let mut checker = checker(&format!("{}/check", server.url()));
        checker.state.last_checked = Some(Utc::now() + chrono::Duration::hours(3));

        assert_eq!(checker.is_latest().await, CheckOutcome::UpdateAvailable);
        mock.assert_async().await;
    }

    #[test]
    fn test_classify_sentinels() {
        assert_eq!(RemoteError::classify(None), Err(RemoteError::Unreachable));
        assert_eq!(RemoteError::classify(Some("  ")), Err(RemoteError::Unreachable));
        assert_eq!(RemoteError::classify(Some("ERROR: 404")), Err(RemoteError::ProgramNotFound));
        assert_eq!(RemoteError::classify(Some("ERROR: 400")), Err(RemoteError::ExternalScriptError));
        assert_eq!(
            RemoteError::classify(Some("Fatal: database offline")),
            Err(RemoteError::Fatal("Fatal: database offline".to_string()))
        );
        assert_eq!(
            RemoteError::classify(Some("ERROR: 500")),
            Err(RemoteError::Unknown("ERROR: 500".to_string()))
        );
        assert_eq!(
            RemoteError::classify(Some("<html></html>")),
            Err(RemoteError::Unknown("<html></html>".to_string()))
        );
        assert!(RemoteError::classify(Some("STABLE:version=1.0:build=5")).is_ok());
    }

    #[test]
    fn test_remote_error_messages() {
        assert_eq!(RemoteError::Unreachable.to_string(), "External script could not be reached");
        assert_eq!(RemoteError::ProgramNotFound.to_string(), "Program not found");
        assert_eq!(
            RemoteError::Unknown("garbage".to_string()).to_string(),
            "Unknown error: input- garbage"
        );
    }

    #[test]
    fn test_constructor_validation() {
        let url = "http://localhost/check";
        assert!(matches!(
            VersionChecker::new("", "1.0", "5", Channel::Stable, url),
            Err(VersionCheckError::EmptyArgument { field: "program" })
        ));
        assert!(matches!(
            VersionChecker::new("Thing", "one", "5", Channel::Stable, url),
            Err(VersionCheckError::InvalidNumber { field: "version", .. })
        ));
        assert!(matches!(
            VersionChecker::new("Thing", "1.0", "-5", Channel::Stable, url),
            Err(VersionCheckError::InvalidNumber { field: "build", .. })
        ));
        assert!(matches!(
            VersionChecker::new("Thing", "1.0", "5", Channel::Stable, " "),
            Err(VersionCheckError::EmptyArgument { field: "check_url" })
        ));
    }

    #[test]
    fn test_initial_state() {
        let checker =
            VersionChecker::new("Thing", "2", "1", Channel::Beta, "http://localhost/check").unwrap();
        assert_eq!(checker.current_version(), "2.0.1 BETA");
        assert_eq!(checker.error_message(), "No errors present");
        assert!(checker.state().is_latest());
        assert!(checker.state().last_checked().is_none());
    }

    #[tokio::test]
    async fn test_outdated_reports_newest_version() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/check")
            .with_status(200)
            .with_body("STABLE:version=1.0:build=6")
            .create_async()
            .await;

        let mut checker = checker(&format!("{}/check", server.url()));
        assert_eq!(checker.is_latest().await, CheckOutcome::UpdateAvailable);
        assert_eq!(checker.current_version(), "1.0.6");
        assert_eq!(checker.state().latest_release(), Some(VersionBuild::new(1.0, 6, Channel::Stable)));
    }

    #[tokio::test]
    async fn test_error_sentinel_is_indeterminate_and_not_cached() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/check")
            .with_status(200)
            .with_body("ERROR: 404")
            .expect(2)
            .create_async()
            .await;

        let mut checker = checker(&format!("{}/check", server.url()));
        assert_eq!(checker.is_latest().await, CheckOutcome::Indeterminate);
        assert!(checker.error_message().contains("not found"));
        assert_eq!(checker.is_latest().await, CheckOutcome::Indeterminate);

        mock.assert_async().await;
        assert!(checker.state().last_checked().is_none());
    }

    #[tokio::test]
    async fn test_success_clears_previous_error() {
        let mut server = Server::new_async().await;
        let failing = server
            .mock("POST", "/check")
            .with_status(503)
            .expect(1)
            .create_async()
            .await;

        let mut checker = checker(&format!("{}/check", server.url()));
        assert_eq!(checker.is_latest().await, CheckOutcome::Indeterminate);
        assert_eq!(checker.last_error(), Some(&RemoteError::Unreachable));
        failing.assert_async().await;
        failing.remove_async().await;

        let _ok = server
            .mock("POST", "/check")
            .with_status(200)
            .with_body("STABLE:version=1.0:build=5")
            .create_async()
            .await;

        assert_eq!(checker.is_latest().await, CheckOutcome::Latest);
        assert!(checker.last_error().is_none());
    }

    #[tokio::test]
    async fn test_update_available_message() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/check")
            .with_status(200)
            .with_body("STABLE:version=1.0:build=5,ALPHA:version=2.0:build=1")
            .create_async()
            .await;

        let mut checker = checker(&format!("{}/check", server.url()));
        assert_eq!(
            checker.update_available_message().await,
            "Current version of: 'Thing' is installed"
        );

        let mut checker = checker_with_unstable(&format!("{}/check", server.url()));
        assert_eq!(
            checker.update_available_message().await,
            "An update is available for: 'Thing' - v2.0.1 ALPHA"
        );
    }

    #[tokio::test]
    async fn test_unreachable_message() {
        let mut checker = checker("http://127.0.0.1:1/check");
        assert_eq!(
            checker.update_available_message().await,
            "Unable to check for updates of 'Thing': External script could not be reached"
        );
    }

    fn checker_with_unstable(url: &str) -> VersionChecker {
        let mut checker = checker(url);
        checker.set_check_unstable(true);
        checker
    }

    #[test]
    fn test_outcome_as_option() {
        assert_eq!(CheckOutcome::Latest.as_option(), Some(true));
        assert_eq!(CheckOutcome::UpdateAvailable.as_option(), Some(false));
        assert_eq!(CheckOutcome::Indeterminate.as_option(), None);
        assert_eq!(CheckOutcome::UpdateAvailable.as_str(), "update_available");
    }
}
