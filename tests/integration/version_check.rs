use anyhow::Result;
use artup_cli::upgrade::{CheckOutcome, CheckerOptions, VersionChecker};
use artup_cli::version::{Channel, VersionBuild};
use mockito::{Matcher, Server};
use std::time::Duration;

const REPORT: &str = "STABLE:version=1.0:build=6,RELEASE_CANIDATE:version=1.1:build=1,BETA:version=1.1:build=1,ALPHA:version=1.1:build=1";

/// A full report is reduced Stable first, then Alpha, Beta and Release Candidate.
#[tokio::test]
async fn test_full_report_reduction() -> Result<()> {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/check")
        .match_body("program=Thing")
        .with_status(200)
        .with_body(REPORT)
        .expect(2)
        .create_async()
        .await;
    let url = format!("{}/check", server.url());

    let mut stable_only = VersionChecker::new("Thing", "1.0", "5", Channel::Stable, &url)?;
    assert_eq!(stable_only.is_latest().await, CheckOutcome::UpdateAvailable);
    assert_eq!(stable_only.current_version(), "1.0.6");

    // Alpha, Beta and Release Candidate tie; Alpha is consulted first and keeps the lead.
    let mut unstable = VersionChecker::with_options(
        "Thing",
        "1.0",
        "5",
        Channel::Stable,
        &url,
        CheckerOptions {
            check_unstable: true,
            ..CheckerOptions::default()
        },
    )?;
    assert_eq!(unstable.is_latest().await, CheckOutcome::UpdateAvailable);
    assert_eq!(unstable.state().latest_release(), Some(VersionBuild::new(1.1, 1, Channel::Alpha)));

    mock.assert_async().await;
    Ok(())
}

/// A caller already on the winning unstable release is up to date.
#[tokio::test]
async fn test_caller_on_unstable_channel() -> Result<()> {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", "/check")
        .with_status(200)
        .with_body("STABLE:version=1.0:build=5,BETA:version=1.2:build=3")
        .create_async()
        .await;

    let mut checker = VersionChecker::with_options(
        "Thing",
        "1.2",
        "3",
        Channel::Beta,
        &format!("{}/check", server.url()),
        CheckerOptions {
            check_unstable: true,
            ..CheckerOptions::default()
        },
    )?;

    assert_eq!(checker.is_latest().await, CheckOutcome::Latest);
    assert_eq!(checker.current_version(), "1.2.3 BETA");
    Ok(())
}

/// Requests carry the version-checker User-Agent.
#[tokio::test]
async fn test_user_agent_header() -> Result<()> {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/check")
        .match_header(
            "user-agent",
            Matcher::Regex(r"^Rust/\S+ \(\S+; Thing/1\.0; VersionChecker/1\.2\) artup-cli/\S+$".to_string()),
        )
        .with_status(200)
        .with_body("STABLE:version=1.0:build=5")
        .create_async()
        .await;

    let mut checker =
        VersionChecker::new("Thing", "1.0", "5", Channel::Stable, &format!("{}/check", server.url()))?;
    assert_eq!(checker.is_latest().await, CheckOutcome::Latest);

    mock.assert_async().await;
    Ok(())
}

/// Throttled checks reuse the cached answer until the window passes.
#[tokio::test]
async fn test_throttle_window() -> Result<()> {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/check")
        .with_status(200)
        .with_body("STABLE:version=1.0:build=5")
        .expect(2)
        .create_async()
        .await;

    let mut checker = VersionChecker::with_options(
        "Thing",
        "1.0",
        "5",
        Channel::Stable,
        &format!("{}/check", server.url()),
        CheckerOptions {
            check_interval: Duration::from_millis(200),
            ..CheckerOptions::default()
        },
    )?;

    for _ in 0..3 {
        assert_eq!(checker.is_latest().await, CheckOutcome::Latest);
    }
    tokio::time::sleep(Duration::from_millis(300)).await;
    assert_eq!(checker.is_latest().await, CheckOutcome::Latest);

    mock.assert_async().await;
    Ok(())
}

/// Remote error sentinels never read as "outdated".
#[tokio::test]
async fn test_error_sentinels() -> Result<()> {
    let cases = [
        ("ERROR: 404", "Program not found"),
        ("ERROR: 400", "External script error"),
        ("Fatal: endpoint down", "Fatal: endpoint down"),
        ("ERROR: teapot", "Unknown error: input- ERROR: teapot"),
    ];

    for (body, expected) in cases {
        let mut server = Server::new_async().await;
        let _mock = server.mock("POST", "/check").with_status(200).with_body(body).create_async().await;

        let mut checker =
            VersionChecker::new("Thing", "1.0", "5", Channel::Stable, &format!("{}/check", server.url()))?;
        assert_eq!(checker.is_latest().await, CheckOutcome::Indeterminate, "body: {body}");
        assert_eq!(checker.error_message(), expected);
    }

    Ok(())
}
