//! Article descriptor loading.
//!
//! Every article directory carries a `metadata.json` next to its markdown:
//!
//! ```json
//! {
//!   "category": "engineering",
//!   "author": "Ada",
//!   "publishedAt": "March 01, 2021 9:00 AM",
//!   "timestamp": 1614589200000,
//!   "keywords": ["rust", "images"]
//! }
//! ```
//!
//! All five fields are required; there are no defaults. The descriptor is
//! copied verbatim into the article record, so `publishedAt` stays a
//! display string and `timestamp` keeps its JSON number form.
//!
//! `keywords` may also be a single comma-separated string
//! (`"rust, images"`); it is normalized to a list either way.

use serde::{Deserialize, Deserializer, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const METADATA_FILE: &str = "metadata.json";

#[derive(Error, Debug)]
pub enum MetadataError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid descriptor {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleMetadata {
    pub category: String,
    pub author: String,
    pub published_at: String,
    pub timestamp: serde_json::Number,
    #[serde(deserialize_with = "keyword_list")]
    pub keywords: Vec<String>,
}

/// Load `<article_dir>/metadata.json`.
pub fn load_metadata(article_dir: &Path) -> Result<ArticleMetadata, MetadataError> {
    let path = article_dir.join(METADATA_FILE);
    let content = std::fs::read_to_string(&path).map_err(|source| MetadataError::Io {
        path: path.clone(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| MetadataError::Json { path, source })
}

fn keyword_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Keywords {
        List(Vec<String>),
        Joined(String),
    }

    let keywords = match Keywords::deserialize(deserializer)? {
        Keywords::List(list) => list,
        Keywords::Joined(joined) => joined.split(',').map(str::to_string).collect(),
    };
    Ok(keywords
        .into_iter()
        .map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty())
        .collect())
}
