//! Test utilities for artup
//!
//! Helpers shared by unit tests and the integration suite: test logging
//! and a builder for zip-packaged artifact fixtures.
//!
//! # Example
//!
//! ```rust,no_run
//! use artup_cli::test_utils::ArchiveFixture;
//!
//! let dir = tempfile::TempDir::new().unwrap();
//! let jar = ArchiveFixture::new()
//!     .unit("com/example/Main.class")
//!     .entry("plugin.yml", b"name: thing")
//!     .write_to(&dir.path().join("thing.jar"));
//! assert!(jar.exists());
//! ```

use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use std::sync::Once;
use tracing::Level;
use tracing_subscriber::EnvFilter;
use zip::write::SimpleFileOptions;

/// Global flag to ensure logging is only initialized once in tests
static INIT_LOGGING: Once = Once::new();

/// Magic header of a class-file unit.
pub const CLASS_MAGIC: [u8; 4] = [0xCA, 0xFE, 0xBA, 0xBE];

/// Initialize logging for tests.
///
/// Only the first call has any effect. With `level` set that level is used,
/// otherwise `RUST_LOG` is honoured and nothing is logged when it is unset.
///
/// ```bash
/// RUST_LOG=debug cargo test
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer() // Important: uses test-compatible writer
            .with_target(true)
            .with_thread_ids(false)
            .try_init();
    });
}

/// Builder for an in-memory zip archive used as an artifact.
#[derive(Debug, Clone, Default)]
pub struct ArchiveFixture {
    entries: Vec<(String, Vec<u8>)>,
}

impl ArchiveFixture {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a well-formed class unit at `name`.
    pub fn unit(self, name: &str) -> Self {
        let mut contents = CLASS_MAGIC.to_vec();
        contents.extend_from_slice(name.as_bytes());
        self.entry(name, &contents)
    }

    /// Add an entry with arbitrary contents.
    pub fn entry(mut self, name: &str, contents: &[u8]) -> Self {
        self.entries.push((name.to_string(), contents.to_vec()));
        self
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default();
        for (name, contents) in &self.entries {
            writer.start_file(name.as_str(), options).unwrap();
            writer.write_all(contents).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    /// Write the archive to `path` and return the path.
    pub fn write_to(&self, path: &Path) -> PathBuf {
        std::fs::write(path, self.to_bytes()).unwrap();
        path.to_path_buf()
    }
}
