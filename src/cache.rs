//! Content-addressed image cache for incremental builds.
//!
//! Re-encoding every article image on every build is the slow part of the
//! pipeline. This module lets the exporter skip that work whenever the
//! output for the current bytes of a source image already exists.
//!
//! # Design
//!
//! The filesystem *is* the cache. There is no manifest and no in-memory
//! index: an optimized image is written to a path that embeds the SHA-256 of
//! its source bytes (`<name>-<hash>.jpg`), so the presence of that path is
//! proof that the current content has been encoded.
//!
//! - **Idempotent**: same bytes → same path → one existence check, no decode.
//! - **Content-based, not mtime-based**: survives `git checkout`, which
//!   resets modification times.
//! - **Self-invalidating**: edited bytes hash to a new path; reverting the
//!   edit hashes back to the original path, which is still on disk.
//!
//! ## Concurrent writers
//!
//! The existence check and the encode are not one atomic step, so two
//! builders can both miss on the same destination. [`write_atomic`] makes
//! that harmless: each writer encodes into its own temp file in the
//! destination directory and renames it into place. Renames are atomic, the
//! bytes are identical, and no reader ever sees a half-written image.
//!
//! ## Bypassing the cache
//!
//! Pass `--no-cache` to `build` to re-encode everything. Existing outputs
//! are overwritten through the same atomic rename.

use sha2::{Digest, Sha256};
use std::fmt;
use std::io;
use std::path::Path;

/// SHA-256 of a byte slice, returned as a lowercase hex string.
pub fn hash_bytes(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

/// SHA-256 hash of a file's contents, returned as a hex string.
pub fn hash_file(path: &Path) -> io::Result<String> {
    let bytes = std::fs::read(path)?;
    Ok(hash_bytes(&bytes))
}

/// Whether a destination artifact is already materialized.
///
/// Unlike `Path::exists`, permission and I/O failures are reported instead
/// of being read as "missing".
pub fn exists(path: &Path) -> io::Result<bool> {
    path.try_exists()
}

/// Mode of every published file on unix: world-readable, owner-writable.
///
/// Temp files are created owner-only, so the mode is set explicitly before
/// the rename. The web server usually runs as a different user.
pub const PUBLIC_FILE_MODE: u32 = 0o644;

/// Produce `dest` through a temp file in the same directory.
///
/// `write` receives the temp path, which keeps the destination's extension
/// so encoders that dispatch on extension still work. The parent directory
/// is created if needed. On error the temp file is removed and `dest` is
/// left untouched. On unix the result has mode [`PUBLIC_FILE_MODE`].
pub fn write_atomic<E, F>(dest: &Path, write: F) -> Result<(), E>
where
    F: FnOnce(&Path) -> Result<(), E>,
    E: From<io::Error>,
{
    let dir = dest.parent().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("destination has no parent directory: {}", dest.display()),
        )
    })?;
    std::fs::create_dir_all(dir)?;

    let suffix = dest
        .extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default();
    let tmp = tempfile::Builder::new()
        .prefix(".partial-")
        .suffix(&suffix)
        .tempfile_in(dir)?;

    write(tmp.path())?;
    publish_permissions(tmp.path())?;
    tmp.persist(dest).map_err(|e| e.error)?;
    Ok(())
}

#[cfg(unix)]
fn publish_permissions(path: &Path) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(PUBLIC_FILE_MODE))
}

#[cfg(not(unix))]
fn publish_permissions(_path: &Path) -> io::Result<()> {
    Ok(())
}

/// Summary of cache performance for a build run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u32,
    pub misses: u32,
}

impl CacheStats {
    pub fn hit(&mut self) {
        self.hits += 1;
    }

    pub fn miss(&mut self) {
        self.misses += 1;
    }

    pub fn total(&self) -> u32 {
        self.hits + self.misses
    }

    /// Fold another run's counters into this one.
    pub fn merge(&mut self, other: &CacheStats) {
        self.hits += other.hits;
        self.misses += other.misses;
    }
}

impl fmt::Display for CacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.hits > 0 {
            write!(
                f,
                "{} cached, {} encoded ({} total)",
                self.hits,
                self.misses,
                self.total()
            )
        } else {
            write!(f, "{} encoded", self.misses)
        }
    }
}
