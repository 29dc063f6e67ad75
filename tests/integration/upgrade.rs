use anyhow::Result;
use artup_cli::core::{UpdateErrorKind, user_friendly_error};
use artup_cli::test_utils::ArchiveFixture;
use artup_cli::upgrade::backup::BackupManager;
use artup_cli::upgrade::{SelfUpdater, UpdateState};
use mockito::Server;
use tempfile::TempDir;
use tokio::fs;

/// A successful update swaps in the payload and leaves no backup behind.
#[tokio::test]
async fn test_update_swaps_payload() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let artifact = ArchiveFixture::new()
        .unit("org/example/Plugin.class")
        .entry("plugin.yml", b"name: Thing\nversion: 1.0")
        .write_to(&temp_dir.path().join("Thing.jar"));

    let payload = ArchiveFixture::new()
        .unit("org/example/Plugin.class")
        .entry("plugin.yml", b"name: Thing\nversion: 1.1")
        .to_bytes();

    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/download/Thing.jar")
        .with_status(200)
        .with_body(payload.clone())
        .create_async()
        .await;

    let mut updater =
        SelfUpdater::builder(&artifact, format!("{}/download/Thing.jar", server.url())).build()?;
    let outcome = updater.perform_update().await?;

    mock.assert_async().await;
    assert_eq!(outcome.bytes_written, payload.len() as u64);
    assert_eq!(fs::read(&artifact).await?, payload);
    assert!(!temp_dir.path().join("Thing.bak").exists());
    assert_eq!(updater.state(), UpdateState::Swapped);

    Ok(())
}

/// A failed download leaves the artifact exactly as it was and removes the backup.
#[tokio::test]
async fn test_failed_download_restores_artifact() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let artifact = ArchiveFixture::new()
        .unit("org/example/Plugin.class")
        .write_to(&temp_dir.path().join("Thing.jar"));
    let before = fs::read(&artifact).await?;

    let mut server = Server::new_async().await;
    let _mock = server.mock("GET", "/download/Thing.jar").with_status(503).create_async().await;

    let mut updater =
        SelfUpdater::builder(&artifact, format!("{}/download/Thing.jar", server.url())).build()?;
    let err = updater.perform_update().await.unwrap_err();

    assert_eq!(err.kind(), UpdateErrorKind::DownloadFailed);
    assert_eq!(fs::read(&artifact).await?, before);
    assert!(!temp_dir.path().join("Thing.bak").exists());

    let context = user_friendly_error(err.into());
    assert_eq!(context.details.as_deref(), Some("reason: download_failed"));
    assert!(context.suggestion.is_some());

    Ok(())
}

/// Updating a second time after a rollback starts from a clean slate.
#[tokio::test]
async fn test_retry_after_failure() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let artifact = ArchiveFixture::new()
        .unit("org/example/Plugin.class")
        .write_to(&temp_dir.path().join("Thing.jar"));

    let mut server = Server::new_async().await;
    let failing = server
        .mock("GET", "/download/Thing.jar")
        .with_status(500)
        .expect(1)
        .create_async()
        .await;

    let mut updater =
        SelfUpdater::builder(&artifact, format!("{}/download/Thing.jar", server.url())).build()?;
    assert!(updater.perform_update().await.is_err());
    assert_eq!(updater.state(), UpdateState::Failed);
    failing.assert_async().await;
    failing.remove_async().await;

    let _ok = server
        .mock("GET", "/download/Thing.jar")
        .with_status(200)
        .with_body("fresh")
        .create_async()
        .await;

    updater.perform_update().await?;
    assert_eq!(fs::read(&artifact).await?, b"fresh");
    assert_eq!(updater.state(), UpdateState::Swapped);

    Ok(())
}

/// The backup manager restores byte-for-byte and cleans up after itself.
#[tokio::test]
async fn test_backup_create_and_restore() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let artifact = temp_dir.path().join("Thing.jar");
    fs::write(&artifact, b"original artifact").await?;

    let manager = BackupManager::new(artifact.clone());
    manager.create_backup().await?;
    assert_eq!(fs::read(temp_dir.path().join("Thing.bak")).await?, b"original artifact");

    fs::write(&artifact, b"half-written").await?;
    manager.restore_backup().await?;
    assert_eq!(fs::read(&artifact).await?, b"original artifact");

    manager.cleanup_backup().await?;
    assert!(!manager.backup_exists());

    Ok(())
}
