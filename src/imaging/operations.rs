//! High-level image operations.
//!
//! These functions combine calculations with backend execution.
//! They take configuration, compute parameters, and call the backend.
//! None of them consult the cache: callers decide whether the destination
//! needs to be produced at all (see [`crate::export`]).

use super::backend::{BackendError, ImageBackend};
use super::calculations::{TargetSize, optimized_size, thumbnail_size};
use super::params::{Quality, ResizeParams};
use std::path::Path;

/// Result type for image operations.
pub type Result<T> = std::result::Result<T, BackendError>;

/// Get image dimensions using the backend.
pub fn get_dimensions(backend: &impl ImageBackend, path: &Path) -> Result<(u32, u32)> {
    let dims = backend.identify(path)?;
    Ok((dims.width, dims.height))
}

/// Settings for optimized article images.
#[derive(Debug, Clone, Copy)]
pub struct OptimizeConfig {
    pub max_width: u32,
    pub quality: Quality,
}

impl Default for OptimizeConfig {
    fn default() -> Self {
        Self {
            max_width: 1536,
            quality: Quality::new(50),
        }
    }
}

/// Settings for cover thumbnails.
#[derive(Debug, Clone, Copy)]
pub struct ThumbnailConfig {
    pub width: u32,
    pub quality: Quality,
}

impl Default for ThumbnailConfig {
    fn default() -> Self {
        Self {
            width: 300,
            quality: Quality::new(60),
        }
    }
}

/// Plan the optimize operation without executing it.
pub fn plan_optimize(
    source: &Path,
    dest: &Path,
    original: (u32, u32),
    config: &OptimizeConfig,
) -> ResizeParams {
    let TargetSize {
        width,
        height,
        resized,
    } = optimized_size(original, config.max_width);
    tracing::debug!(source = %source.display(), width, height, resized, "planned optimize");
    ResizeParams {
        source: source.to_path_buf(),
        output: dest.to_path_buf(),
        width,
        height,
        quality: config.quality,
    }
}

/// Plan a thumbnail operation without executing it.
pub fn plan_thumbnail(
    source: &Path,
    dest: &Path,
    original: (u32, u32),
    config: &ThumbnailConfig,
) -> ResizeParams {
    let TargetSize {
        width,
        height,
        resized,
    } = thumbnail_size(original, config.width);
    tracing::debug!(source = %source.display(), width, height, resized, "planned thumbnail");
    ResizeParams {
        source: source.to_path_buf(),
        output: dest.to_path_buf(),
        width,
        height,
        quality: config.quality,
    }
}

/// Re-encode `source` into `dest`, downscaling when wider than the limit.
pub fn optimize(
    backend: &impl ImageBackend,
    source: &Path,
    dest: &Path,
    config: &OptimizeConfig,
) -> Result<()> {
    let original = get_dimensions(backend, source)?;
    backend.resize(&plan_optimize(source, dest, original, config))
}

/// Produce a fixed-width thumbnail of `source` at `dest`.
pub fn thumbnail(
    backend: &impl ImageBackend,
    source: &Path,
    dest: &Path,
    config: &ThumbnailConfig,
) -> Result<()> {
    let original = get_dimensions(backend, source)?;
    backend.resize(&plan_thumbnail(source, dest, original, config))
}
