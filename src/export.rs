//! Content-addressed export of article images and cover thumbnails.
//!
//! Article images live next to their markdown under the articles root and
//! are referenced by relative `src` attributes. Export turns each one into a
//! public asset whose filename carries the SHA-256 of the source bytes:
//!
//! ```text
//! data/articles/my-post/photos/beach.png
//!   → public/article/my-post/photos/beach-<sha256>.jpg   (optimized)
//!   → public/article/my-post/photos/beach-<sha256>.thumb.jpg  (cover only)
//! ```
//!
//! The returned paths are root-relative URLs (`/article/my-post/...`) ready
//! to be written back into the HTML.
//!
//! ## Caching contract
//!
//! [`ImageExporter::export_image`] hashes the source, derives the
//! destination and returns immediately when that file already exists; no
//! decode or encode happens on a hit. Thumbnails are keyed by the cover
//! image *path* only. In a normal build the cover path is itself the
//! hashed export, so the thumbnail follows content changes anyway.
//!
//! The output is always JPEG, whatever the source format.

use crate::cache::{self, CacheStats};
use crate::imaging::{self, BackendError, ImageBackend, OptimizeConfig, ThumbnailConfig};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use thiserror::Error;

/// URL prefix under which every article and its assets are published.
pub const ARTICLE_BASE: &str = "/article";

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("IO error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Source image not found: {0}")]
    SourceNotFound(PathBuf),
    #[error("Image processing failed: {0}")]
    Imaging(#[from] BackendError),
    #[error("image path escapes article directory: {0}")]
    PathEscapesArticle(String),
}

impl ExportError {
    fn io(path: &Path, source: io::Error) -> Self {
        if source.kind() == io::ErrorKind::NotFound {
            return ExportError::SourceNotFound(path.to_path_buf());
        }
        ExportError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Whether an export reused an existing file or encoded a new one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportStatus {
    Cached,
    Encoded,
}

/// Outcome of a single export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedImage {
    /// The path as referenced by the author (or the cover path for thumbnails).
    pub source: String,
    /// Root-relative public URL of the exported file.
    pub path: String,
    pub status: ExportStatus,
}

/// Exports images for every article in a run.
///
/// One exporter is shared by all concurrently building articles; cache
/// counters are kept behind a mutex.
pub struct ImageExporter<'a, B: ImageBackend> {
    backend: &'a B,
    articles_root: PathBuf,
    public_root: PathBuf,
    optimize: OptimizeConfig,
    thumbnail: ThumbnailConfig,
    force: bool,
    stats: Mutex<CacheStats>,
}

impl<'a, B: ImageBackend> ImageExporter<'a, B> {
    pub fn new(backend: &'a B, articles_root: &Path, public_root: &Path) -> Self {
        Self {
            backend,
            articles_root: articles_root.to_path_buf(),
            public_root: public_root.to_path_buf(),
            optimize: OptimizeConfig::default(),
            thumbnail: ThumbnailConfig::default(),
            force: false,
            stats: Mutex::new(CacheStats::default()),
        }
    }

    pub fn with_optimize(mut self, config: OptimizeConfig) -> Self {
        self.optimize = config;
        self
    }

    pub fn with_thumbnail(mut self, config: ThumbnailConfig) -> Self {
        self.thumbnail = config;
        self
    }

    /// Re-encode even when the destination already exists.
    pub fn force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    pub fn public_root(&self) -> &Path {
        &self.public_root
    }

    /// Counters accumulated since the exporter was created.
    pub fn stats(&self) -> CacheStats {
        *self.stats.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Export one article image referenced as `src` from the article `slug`.
    ///
    /// `src` is relative to the article directory (`img.png`,
    /// `./photos/a.jpg`). The destination is
    /// `<public>/article/<slug>/<dir>/<name>-<hash>.jpg`.
    pub fn export_image(&self, src: &str, slug: &str) -> Result<ExportedImage, ExportError> {
        let segments = normalize_segments(src)?;
        let (name, dirs) = split_file(&segments, src)?;

        let mut source_path = self.articles_root.join(slug);
        source_path.extend(segments.iter());

        let hash = cache::hash_file(&source_path).map_err(|e| ExportError::io(&source_path, e))?;

        let file_name = format!("{}-{}.jpg", file_stem(name), hash);
        let mut url_segments = vec![ARTICLE_BASE.trim_start_matches('/'), slug];
        url_segments.extend(dirs);
        url_segments.push(&file_name);
        let url_path = format!("/{}", url_segments.join("/"));

        let dest = self.public_path(&url_path);
        let status = self.materialize(&dest, |tmp| {
            imaging::optimize(self.backend, &source_path, tmp, &self.optimize)
        })?;

        tracing::debug!(slug, src, path = %url_path, ?status, "exported image");
        Ok(ExportedImage {
            source: src.to_string(),
            path: url_path,
            status,
        })
    }

    /// Export the thumbnail for a cover image already published at `cover_path`.
    ///
    /// The thumbnail sits next to the cover as `<name>.thumb.jpg`; an existing
    /// file is returned as-is.
    pub fn export_thumbnail(&self, cover_path: &str) -> Result<ExportedImage, ExportError> {
        let segments = normalize_segments(cover_path)?;
        let (name, dirs) = split_file(&segments, cover_path)?;

        let file_name = format!("{}.thumb.jpg", file_stem(name));
        let mut url_segments: Vec<&str> = dirs.to_vec();
        url_segments.push(&file_name);
        let prefix = if cover_path.starts_with('/') { "/" } else { "" };
        let url_path = format!("{}{}", prefix, url_segments.join("/"));

        let mut source = self.public_root.clone();
        source.extend(segments.iter());
        let dest = self.public_path(&url_path);
        let status = self.materialize(&dest, |tmp| {
            imaging::thumbnail(self.backend, &source, tmp, &self.thumbnail)
        })?;

        tracing::debug!(cover = cover_path, path = %url_path, ?status, "exported thumbnail");
        Ok(ExportedImage {
            source: cover_path.to_string(),
            path: url_path,
            status,
        })
    }

    /// Absolute filesystem location of a root-relative public URL path.
    fn public_path(&self, url_path: &str) -> PathBuf {
        let mut path = self.public_root.clone();
        path.extend(url_path.split('/').filter(|s| !s.is_empty()));
        path
    }

    /// Skip on an existing destination, otherwise encode through a temp file.
    fn materialize<F>(&self, dest: &Path, encode: F) -> Result<ExportStatus, ExportError>
    where
        F: FnOnce(&Path) -> Result<(), BackendError>,
    {
        if !self.force && cache::exists(dest).map_err(|e| ExportError::io(dest, e))? {
            self.record(ExportStatus::Cached);
            return Ok(ExportStatus::Cached);
        }
        cache::write_atomic(dest, |tmp| encode(tmp).map_err(WriteFailure::Encode)).map_err(
            |e| match e {
                WriteFailure::Io(source) => ExportError::Io {
                    path: dest.to_path_buf(),
                    source,
                },
                WriteFailure::Encode(e) => ExportError::Imaging(e),
            },
        )?;
        self.record(ExportStatus::Encoded);
        Ok(ExportStatus::Encoded)
    }

    fn record(&self, status: ExportStatus) {
        let mut stats = self.stats.lock().unwrap_or_else(|e| e.into_inner());
        match status {
            ExportStatus::Cached => stats.hit(),
            ExportStatus::Encoded => stats.miss(),
        }
    }
}

/// Where a materialize failed: creating or renaming the destination file,
/// or inside the encoder (which may fail reading its source).
enum WriteFailure {
    Io(io::Error),
    Encode(BackendError),
}

impl From<io::Error> for WriteFailure {
    fn from(e: io::Error) -> Self {
        WriteFailure::Io(e)
    }
}

/// Resolve `.` and `..` segments of a slash-separated relative path.
///
/// A leading `/` is treated as the root of the same tree. Climbing above
/// that root is rejected rather than silently clamped.
fn normalize_segments(path: &str) -> Result<Vec<&str>, ExportError> {
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                if segments.pop().is_none() {
                    return Err(ExportError::PathEscapesArticle(path.to_string()));
                }
            }
            other => segments.push(other),
        }
    }
    Ok(segments)
}

/// Split normalized segments into the file name and its directories.
fn split_file<'s>(
    segments: &'s [&'s str],
    original: &str,
) -> Result<(&'s str, &'s [&'s str]), ExportError> {
    segments
        .split_last()
        .map(|(name, dirs)| (*name, dirs))
        .ok_or_else(|| ExportError::PathEscapesArticle(original.to_string()))
}

/// File name without its final extension (`photo.final.png` → `photo.final`).
fn file_stem(name: &str) -> &str {
    match name.rfind('.') {
        Some(0) | None => name,
        Some(idx) => &name[..idx],
    }
}
