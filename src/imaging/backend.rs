//! Image processing backend trait and shared types.
//!
//! The [`ImageBackend`] trait defines the two operations every backend must
//! support: identify and resize. Everything the exporter needs (optimized
//! copies and thumbnails) is expressed as a [`ResizeParams`].
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend): pure Rust, statically
//! linked, no system codecs.

use super::params::ResizeParams;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Processing failed: {0}")]
    ProcessingFailed(String),
}

/// Result of an identify operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// Trait for image processing backends.
///
/// Backends are shared across the rayon pool while articles build
/// concurrently, hence the `Sync` bound.
pub trait ImageBackend: Sync {
    /// Get image dimensions without a full decode where the format allows it.
    fn identify(&self, path: &Path) -> Result<Dimensions, BackendError>;

    /// Decode `source`, resize to the requested dimensions and encode to `output`.
    fn resize(&self, params: &ResizeParams) -> Result<(), BackendError>;
}
