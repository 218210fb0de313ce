//! The record handed to downstream consumers.
//!
//! [`ArticleRecord`] is the only thing the build produces besides image
//! files. It is serialized as camelCase JSON, the shape the rendering and
//! storage layers read.

use serde::{Deserialize, Serialize};

/// A fully built article. Assembled once per build and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleRecord {
    /// Directory name under the articles root.
    pub slug: String,
    /// Root-relative canonical URL, `/article/<slug>`.
    pub url: String,
    /// `url` prefixed with the site origin.
    pub absolute_url: String,
    /// Transformed body markup (inner HTML of `<body>`).
    pub html: String,
    pub title: String,
    /// The lede: text of the bold paragraph under the title.
    pub description: String,
    /// e.g. `"4 min read"`.
    pub reading_time: String,
    /// Absolute URL of the exported cover image.
    pub cover_image_url: String,
    pub cover_image_alt: String,
    /// Root-relative path of the cover thumbnail.
    pub thumbnail: String,
    pub category: String,
    pub author: String,
    pub published_at: String,
    pub timestamp: serde_json::Number,
    pub keywords: Vec<String>,
}
