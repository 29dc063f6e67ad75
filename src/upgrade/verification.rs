use crate::constants::{DEFAULT_UNIT_MAGIC, DEFAULT_UNIT_SUFFIX, INNER_UNIT_MARKER};
use crate::core::IntegrityError;
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::{debug, info};

/// Capability to decide whether an artifact is structurally sound.
///
/// The updater runs a verifier against the installed artifact before it
/// overwrites anything, so a rollback always has a healthy copy to return
/// to. Implementations are synchronous and are driven from the blocking
/// thread pool.
///
/// # Provided Strategies
///
/// - [`ArchiveVerifier`] - walks a zip-packaged artifact and resolves every loadable unit
/// - [`ChecksumVerifier`] - compares the file's SHA-256 digest with a known-good value
pub trait IntegrityVerifier: Send + Sync {
    /// Verify the artifact at `path`, failing fast on the first problem.
    fn verify(&self, path: &Path) -> Result<(), IntegrityError>;
}

/// One loadable unit found inside an artifact archive.
#[derive(Debug)]
pub struct LoadableUnit<'a> {
    /// Dotted logical name, e.g. `com.example.Main`.
    pub name: &'a str,
    /// Entry path inside the archive, e.g. `com/example/Main.class`.
    pub entry: &'a str,
    /// Decompressed contents of the entry.
    pub bytes: &'a [u8],
}

/// Resolves a single unit the way the host would load it.
pub trait UnitResolver: Send + Sync {
    /// Return a human-readable reason when `unit` cannot be loaded.
    fn resolve(&self, unit: &LoadableUnit<'_>) -> Result<(), String>;
}

/// Accepts units whose contents begin with a fixed magic header.
///
/// Reaching the resolver already means the unit decompressed cleanly and
/// passed the archive's CRC check. An empty magic accepts every such unit.
#[derive(Debug, Clone)]
pub struct MagicHeaderResolver {
    magic: Vec<u8>,
}

impl MagicHeaderResolver {
    pub fn new(magic: impl Into<Vec<u8>>) -> Self {
        Self {
            magic: magic.into(),
        }
    }

    /// Resolver that only requires the unit to be readable.
    pub fn any() -> Self {
        Self::new(Vec::new())
    }
}

impl UnitResolver for MagicHeaderResolver {
    fn resolve(&self, unit: &LoadableUnit<'_>) -> Result<(), String> {
        if unit.bytes.starts_with(&self.magic) {
            Ok(())
        } else {
            Err(format!("{} does not start with the expected header", unit.entry))
        }
    }
}

/// Verifies a zip-packaged artifact by resolving every loadable unit in it.
///
/// An entry counts as a unit when its name ends with the unit suffix
/// (`.class` by default) and does not contain the inner-unit marker `$`.
/// Directory entries are skipped. The entry path is turned into a dotted
/// logical name before it is handed to the [`UnitResolver`]:
/// `com/example/Main.class` becomes `com.example.Main`.
///
/// # Failure Kinds
///
/// - [`IntegrityError::ArchiveIo`] - the file cannot be opened or is not a readable archive
/// - [`IntegrityError::UnitNotFound`] - a unit failed to decompress or resolve
/// - [`IntegrityError::Unexpected`] - anything else that goes wrong during the walk
///
/// # Examples
///
/// ```rust,no_run
/// use artup_cli::upgrade::verification::{ArchiveVerifier, IntegrityVerifier, MagicHeaderResolver};
/// use std::path::Path;
///
/// let verifier = ArchiveVerifier::new(".mod").with_resolver(MagicHeaderResolver::new(*b"MOD1"));
/// verifier.verify(Path::new("/opt/app/plugins/thing.jar"))?;
/// # Ok::<(), artup_cli::core::IntegrityError>(())
/// ```
pub struct ArchiveVerifier {
    unit_suffix: String,
    inner_marker: char,
    resolver: Box<dyn UnitResolver>,
}

impl Default for ArchiveVerifier {
    /// Class-file units checked for the `CA FE BA BE` header.
    fn default() -> Self {
        Self::new(DEFAULT_UNIT_SUFFIX).with_resolver(MagicHeaderResolver::new(DEFAULT_UNIT_MAGIC))
    }
}

impl ArchiveVerifier {
    /// Verifier for units ending in `unit_suffix` that only requires them to be readable.
    pub fn new(unit_suffix: impl Into<String>) -> Self {
        Self {
            unit_suffix: unit_suffix.into(),
            inner_marker: INNER_UNIT_MARKER,
            resolver: Box::new(MagicHeaderResolver::any()),
        }
    }

    pub fn with_resolver(mut self, resolver: impl UnitResolver + 'static) -> Self {
        self.resolver = Box::new(resolver);
        self
    }

    /// Logical unit name for an archive entry, or `None` if it is not a unit.
    pub fn unit_name(&self, entry_name: &str) -> Option<String> {
        if entry_name.contains(self.inner_marker) {
            return None;
        }
        let stem = entry_name.strip_suffix(&self.unit_suffix)?;
        if stem.is_empty() || stem.ends_with('/') {
            return None;
        }
        Some(stem.replace('/', "."))
    }
}

impl IntegrityVerifier for ArchiveVerifier {
    fn verify(&self, path: &Path) -> Result<(), IntegrityError> {
        debug!("Walking artifact archive {:?}", path);

        let archive_io = |reason: String| IntegrityError::ArchiveIo {
            path: path.to_path_buf(),
            reason,
        };

        let file = File::open(path).map_err(|e| archive_io(e.to_string()))?;
        let mut archive =
            zip::ZipArchive::new(BufReader::new(file)).map_err(|e| archive_io(e.to_string()))?;

        let mut resolved = 0usize;
        for index in 0..archive.len() {
            let mut entry = archive.by_index(index).map_err(|e| match e {
                zip::result::ZipError::Io(io) => archive_io(io.to_string()),
                other => IntegrityError::Unexpected {
                    message: format!("archive entry #{index}: {other}"),
                },
            })?;

            if entry.is_dir() {
                continue;
            }
            let entry_name = entry.name().to_string();
            let Some(unit) = self.unit_name(&entry_name) else {
                continue;
            };

            let mut bytes = Vec::new();
            if let Err(e) = entry.read_to_end(&mut bytes) {
                return Err(IntegrityError::UnitNotFound {
                    unit,
                    reason: e.to_string(),
                });
            }

            let loadable = LoadableUnit {
                name: &unit,
                entry: &entry_name,
                bytes: &bytes,
            };
            if let Err(reason) = self.resolver.resolve(&loadable) {
                return Err(IntegrityError::UnitNotFound {
                    unit,
                    reason,
                });
            }
            resolved += 1;
        }

        debug!("Resolved {} loadable units in {:?}", resolved, path);
        Ok(())
    }
}

/// Verifies an artifact against a known SHA-256 digest.
///
/// Digests are written as `sha256:<hex>`; the prefix is optional in the
/// expected value and comparison ignores case.
#[derive(Debug, Clone)]
pub struct ChecksumVerifier {
    expected: String,
}

impl ChecksumVerifier {
    pub fn new(expected: impl Into<String>) -> Self {
        Self {
            expected: expected.into(),
        }
    }

    /// Compute the `sha256:<hex>` digest of a file.
    pub fn compute_sha256(file_path: &Path) -> std::io::Result<String> {
        debug!("Computing SHA256 checksum for: {:?}", file_path);

        let mut reader = BufReader::new(File::open(file_path)?);
        let mut hasher = Sha256::new();
        let mut buffer = [0u8; 8192];
        loop {
            let read = reader.read(&mut buffer)?;
            if read == 0 {
                break;
            }
            hasher.update(&buffer[..read]);
        }

        Ok(format!("sha256:{}", hex::encode(hasher.finalize())))
    }
}

fn normalize_digest(digest: &str) -> String {
    let digest = digest.trim().to_lowercase();
    digest.strip_prefix("sha256:").map(str::to_string).unwrap_or(digest)
}

impl IntegrityVerifier for ChecksumVerifier {
    fn verify(&self, path: &Path) -> Result<(), IntegrityError> {
        info!("Verifying checksum for: {:?}", path);

        let actual = Self::compute_sha256(path).map_err(|e| IntegrityError::ArchiveIo {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        if normalize_digest(&actual) != normalize_digest(&self.expected) {
            return Err(IntegrityError::ChecksumMismatch {
                expected: self.expected.clone(),
                actual,
            });
        }

        info!("Checksum verification successful");
        Ok(())
    }
}
