//! Shared test utilities for the pressroom test suite.
//!
//! Builds article fixtures on disk: a directory per slug with `article.md`,
//! `metadata.json` and any images the markdown references.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = TempDir::new().unwrap();
//! let articles = tmp.path().join("articles");
//! write_article(&articles, "hello", MINIMAL_ARTICLE, &valid_metadata());
//! write_image_bytes(&articles.join("hello/img.jpg"), b"fake");
//! ```

use std::fs;
use std::path::Path;

/// Title, lede, one captioned image: the smallest article that builds.
pub const MINIMAL_ARTICLE: &str = "# Title\n\n**Lede.**\n\n![alt](img.jpg)\n\n*Caption*\n";

/// A descriptor with every required field.
pub fn valid_metadata() -> String {
    r#"{
  "category": "engineering",
  "author": "Ada",
  "publishedAt": "March 01, 2021 9:00 AM",
  "timestamp": 1614589200000,
  "keywords": ["rust", "images"]
}"#
    .to_string()
}

/// Create `<articles_root>/<slug>/` with the given markdown and descriptor.
pub fn write_article(articles_root: &Path, slug: &str, markdown: &str, metadata_json: &str) {
    let dir = articles_root.join(slug);
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("article.md"), markdown).unwrap();
    fs::write(dir.join("metadata.json"), metadata_json).unwrap();
}

/// Write arbitrary bytes where an image is expected. Enough for the mock
/// backend, which never decodes.
pub fn write_image_bytes(path: &Path, bytes: &[u8]) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, bytes).unwrap();
}

/// Write a real, decodable image with a deterministic gradient.
///
/// The format follows the extension. `seed` varies the pixels so two
/// images of the same size hash differently.
pub fn write_test_image(path: &Path, width: u32, height: u32, seed: u8) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    let img = image::RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([
            (x % 256) as u8,
            (y % 256) as u8,
            seed.wrapping_mul(37).wrapping_add((x + y) as u8),
        ])
    });
    img.save(path).unwrap();
}
