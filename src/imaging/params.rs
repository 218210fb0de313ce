//! Plain-data descriptions of encode jobs.
//!
//! [`operations`](super::operations) works out the target size and quality
//! from configuration and hands a [`ResizeParams`] to the
//! [`backend`](super::backend), which only moves pixels. Tests assert on the
//! recorded params instead of decoding output.

use std::path::PathBuf;

/// Quality setting for lossy JPEG encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(pub u32);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(50)
    }
}

/// Parameters for a decode → resize → encode operation.
///
/// When `width`/`height` equal the source dimensions the backend skips
/// resampling and only re-encodes.
#[derive(Debug, Clone, PartialEq)]
pub struct ResizeParams {
    pub source: PathBuf,
    pub output: PathBuf,
    pub width: u32,
    pub height: u32,
    pub quality: Quality,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quality_clamps_to_valid_range() {
        assert_eq!(Quality::new(0).value(), 1);
        assert_eq!(Quality::new(60).value(), 60);
        assert_eq!(Quality::new(150).value(), 100);
    }

    #[test]
    fn quality_default_is_50() {
        assert_eq!(Quality::default().value(), 50);
    }
}
