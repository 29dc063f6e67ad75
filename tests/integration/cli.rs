#![allow(deprecated)]

use crate::common::TestWorkspace;
use anyhow::Result;
use artup_cli::test_utils::ArchiveFixture;
use predicates::prelude::*;

/// `artup upgrade --artifact --url` replaces the artifact.
#[test]
fn test_upgrade_explicit_artifact() -> Result<()> {
    let workspace = TestWorkspace::new()?;
    let artifact = ArchiveFixture::new()
        .unit("org/example/Plugin.class")
        .write_to(&workspace.path().join("thing.jar"));

    let mut server = mockito::Server::new();
    let mock = server.mock("GET", "/thing.jar").with_status(200).with_body("new jar").create();

    workspace
        .artup()
        .args(["upgrade", "--artifact"])
        .arg(&artifact)
        .args(["--url", &format!("{}/thing.jar", server.url())])
        .assert()
        .success()
        .stdout(predicate::str::contains("Updated 'thing' (7 bytes"));

    mock.assert();
    assert_eq!(std::fs::read(&artifact)?, b"new jar");
    assert!(!workspace.path().join("thing.bak").exists());
    Ok(())
}

/// A failing download exits non-zero, explains the reason and keeps the artifact intact.
#[test]
fn test_upgrade_download_failure() -> Result<()> {
    let workspace = TestWorkspace::new()?;
    let artifact = ArchiveFixture::new()
        .unit("org/example/Plugin.class")
        .write_to(&workspace.path().join("thing.jar"));
    let before = std::fs::read(&artifact)?;

    let mut server = mockito::Server::new();
    let _mock = server.mock("GET", "/thing.jar").with_status(404).create();

    workspace
        .artup()
        .args(["upgrade", "--artifact"])
        .arg(&artifact)
        .args(["--url", &format!("{}/thing.jar", server.url())])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("error"))
        .stderr(predicate::str::contains("reason: download_failed"));

    assert_eq!(std::fs::read(&artifact)?, before);
    assert!(!workspace.path().join("thing.bak").exists());
    Ok(())
}

/// The extension check happens before anything else.
#[test]
fn test_upgrade_rejects_wrong_extension() -> Result<()> {
    let workspace = TestWorkspace::new()?;
    let artifact = workspace.path().join("thing.zip");
    std::fs::write(&artifact, b"zip")?;

    workspace
        .artup()
        .args(["upgrade", "--artifact"])
        .arg(&artifact)
        .args(["--url", "http://127.0.0.1:1/thing.zip"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("reason: invalid_extension"));

    assert_eq!(std::fs::read(&artifact)?, b"zip");
    Ok(())
}

/// Named artifacts come from the configuration file, including a custom extension.
#[test]
fn test_upgrade_named_artifact() -> Result<()> {
    let workspace = TestWorkspace::new()?;
    let artifact = ArchiveFixture::new()
        .unit("org/example/Plugin.class")
        .write_to(&workspace.path().join("thing.mod"));

    let mut server = mockito::Server::new();
    let mock = server.mock("GET", "/thing.mod").with_status(200).with_body("v2").create();

    workspace.write_config(&format!(
        r#"
[upgrade]
artifact_extension = "mod"

[artifacts.thing]
path = "{}"
url = "{}/thing.mod"
name = "Thing"
"#,
        artifact.display(),
        server.url()
    ))?;

    workspace.artup().args(["upgrade", "thing"]).assert().success();

    mock.assert();
    assert_eq!(std::fs::read(&artifact)?, b"v2");
    Ok(())
}

/// Rollback restores the artifact from an existing backup and removes it.
#[test]
fn test_rollback_restores_backup() -> Result<()> {
    let workspace = TestWorkspace::new()?;
    let artifact = workspace.path().join("thing.jar");
    std::fs::write(&artifact, b"broken")?;
    std::fs::write(workspace.path().join("thing.bak"), b"known good")?;

    workspace
        .artup()
        .args(["rollback", "--artifact"])
        .arg(&artifact)
        .assert()
        .success()
        .stdout(predicate::str::contains("Successfully restored from backup"));

    assert_eq!(std::fs::read(&artifact)?, b"known good");
    assert!(!workspace.path().join("thing.bak").exists());
    Ok(())
}

/// Rollback without a backup fails with a suggestion.
#[test]
fn test_rollback_without_backup() -> Result<()> {
    let workspace = TestWorkspace::new()?;
    let artifact = workspace.path().join("thing.jar");
    std::fs::write(&artifact, b"current")?;

    workspace
        .artup()
        .args(["rollback", "--artifact"])
        .arg(&artifact)
        .assert()
        .failure()
        .stderr(predicate::str::contains("No backup found"))
        .stderr(predicate::str::contains("nothing to roll back to"));

    assert_eq!(std::fs::read(&artifact)?, b"current");
    Ok(())
}

/// `artup check` prints the update message.
#[test]
fn test_check_reports_update() -> Result<()> {
    let workspace = TestWorkspace::new()?;

    let mut server = mockito::Server::new();
    let _mock = server
        .mock("POST", "/check")
        .match_body("program=Thing")
        .with_status(200)
        .with_body("STABLE:version=1.0:build=6")
        .create();

    workspace
        .artup()
        .args(["check", "--program", "Thing", "--version", "1.0", "--build", "5"])
        .args(["--url", &format!("{}/check", server.url())])
        .assert()
        .success()
        .stdout(predicate::str::contains("An update is available for: 'Thing' - v1.0.6"));
    Ok(())
}

/// `--json` output for a named program with unstable channels enabled.
#[test]
fn test_check_json_named_program() -> Result<()> {
    let workspace = TestWorkspace::new()?;

    let mut server = mockito::Server::new();
    let _mock = server
        .mock("POST", "/check")
        .with_status(200)
        .with_body("STABLE:version=1.0:build=5,ALPHA:version=2.0:build=1")
        .create();

    workspace.write_config(&format!(
        r#"
[programs.Thing]
version = "1.0"
build = "5"
check_url = "{}/check"
"#,
        server.url()
    ))?;

    let output = workspace.artup().args(["check", "Thing", "--unstable", "--json"]).output()?;
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(report["program"], "Thing");
    assert_eq!(report["outcome"], "update_available");
    assert_eq!(report["current_version"], "2.0.1 ALPHA");
    assert!(report["error"].is_null());
    Ok(())
}

/// An error sentinel is reported as an inconclusive check, not as an update.
#[test]
fn test_check_program_not_found() -> Result<()> {
    let workspace = TestWorkspace::new()?;

    let mut server = mockito::Server::new();
    let _mock = server.mock("POST", "/check").with_status(200).with_body("ERROR: 404").create();

    workspace
        .artup()
        .args(["check", "--program", "Ghost", "--version", "1.0", "--build", "1"])
        .args(["--url", &format!("{}/check", server.url())])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Unable to check for updates of 'Ghost': Program not found",
        ));
    Ok(())
}

/// Invalid numbers are rejected before any request is made.
#[test]
fn test_check_invalid_build() -> Result<()> {
    let workspace = TestWorkspace::new()?;

    workspace
        .artup()
        .args(["check", "--program", "Thing", "--version", "1.0", "--build", "five"])
        .args(["--url", "http://127.0.0.1:1/check"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid build 'five'"));
    Ok(())
}

/// Help lists every command.
#[test]
fn test_help() {
    let workspace = TestWorkspace::new().unwrap();
    workspace
        .artup()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("upgrade"))
        .stdout(predicate::str::contains("rollback"))
        .stdout(predicate::str::contains("check"));
}
