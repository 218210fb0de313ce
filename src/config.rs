//! Site configuration module.
//!
//! Handles loading and validating `config.toml`. User values are merged on
//! top of the stock defaults, so a config file only needs the keys it wants
//! to change.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! origin = "http://localhost:3000"  # Site origin for absolute URLs
//! articles_dir = "data/articles"    # One directory per article slug
//! public_dir = "public"             # Where exported images are written
//!
//! [images]
//! max_width = 1536          # Wider images are downscaled to this width
//! quality = 50              # JPEG quality (1-100)
//!
//! [thumbnails]
//! width = 300               # Cover thumbnail width
//! quality = 60              # JPEG quality (1-100)
//!
//! [reading]
//! words_per_minute = 200
//!
//! [casing]
//! tags = ["h1", "h2", "h3", "h4", "h5", "h6"]  # Elements to title-case
//!
//! [validation]
//! figures = false           # Require alt text and captions on every image
//!
//! [processing]
//! max_processes = 4         # Max parallel workers (omit for auto = CPU cores)
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::imaging::{OptimizeConfig, Quality, ThumbnailConfig};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    TomlSer(#[from] toml::ser::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Site configuration loaded from `config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Scheme and host of the published site, without a trailing slash.
    pub origin: String,
    /// Directory holding one sub-directory per article.
    pub articles_dir: String,
    /// Public web root that receives exported images.
    pub public_dir: String,
    pub images: ImagesConfig,
    pub thumbnails: ThumbnailsConfig,
    pub reading: ReadingConfig,
    pub casing: CasingConfig,
    pub validation: ValidationConfig,
    pub processing: ProcessingConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            origin: "http://localhost:3000".to_string(),
            articles_dir: "data/articles".to_string(),
            public_dir: "public".to_string(),
            images: ImagesConfig::default(),
            thumbnails: ThumbnailsConfig::default(),
            reading: ReadingConfig::default(),
            casing: CasingConfig::default(),
            validation: ValidationConfig::default(),
            processing: ProcessingConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let origin = url::Url::parse(&self.origin)
            .map_err(|e| ConfigError::Validation(format!("origin is not a URL: {e}")))?;
        if !matches!(origin.scheme(), "http" | "https") {
            return Err(ConfigError::Validation(
                "origin must be an http or https URL".into(),
            ));
        }
        if origin.path() != "/" || origin.query().is_some() {
            return Err(ConfigError::Validation(
                "origin must not contain a path or query".into(),
            ));
        }
        check_quality("images.quality", self.images.quality)?;
        check_quality("thumbnails.quality", self.thumbnails.quality)?;
        if self.images.max_width == 0 {
            return Err(ConfigError::Validation(
                "images.max_width must be non-zero".into(),
            ));
        }
        if self.thumbnails.width == 0 {
            return Err(ConfigError::Validation(
                "thumbnails.width must be non-zero".into(),
            ));
        }
        if self.reading.words_per_minute == 0 {
            return Err(ConfigError::Validation(
                "reading.words_per_minute must be non-zero".into(),
            ));
        }
        Ok(())
    }

    pub fn articles_root(&self) -> PathBuf {
        PathBuf::from(&self.articles_dir)
    }

    pub fn public_root(&self) -> PathBuf {
        PathBuf::from(&self.public_dir)
    }

    pub fn optimize_config(&self) -> OptimizeConfig {
        OptimizeConfig {
            max_width: self.images.max_width,
            quality: Quality::new(self.images.quality),
        }
    }

    pub fn thumbnail_config(&self) -> ThumbnailConfig {
        ThumbnailConfig {
            width: self.thumbnails.width,
            quality: Quality::new(self.thumbnails.quality),
        }
    }
}

fn check_quality(key: &str, quality: u32) -> Result<(), ConfigError> {
    if !(1..=100).contains(&quality) {
        return Err(ConfigError::Validation(format!("{key} must be 1-100")));
    }
    Ok(())
}

/// Optimized article image settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ImagesConfig {
    /// Images wider than this are downscaled; narrower ones keep their size.
    pub max_width: u32,
    /// JPEG quality (1-100).
    pub quality: u32,
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self {
            max_width: 1536,
            quality: 50,
        }
    }
}

/// Cover thumbnail settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ThumbnailsConfig {
    pub width: u32,
    pub quality: u32,
}

impl Default for ThumbnailsConfig {
    fn default() -> Self {
        Self {
            width: 300,
            quality: 60,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReadingConfig {
    pub words_per_minute: u32,
}

impl Default for ReadingConfig {
    fn default() -> Self {
        Self {
            words_per_minute: crate::reading::DEFAULT_WORDS_PER_MINUTE,
        }
    }
}

/// Which elements get title-cased. An empty list disables the pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CasingConfig {
    pub tags: Vec<String>,
}

impl Default for CasingConfig {
    fn default() -> Self {
        Self {
            tags: ["h1", "h2", "h3", "h4", "h5", "h6"]
                .iter()
                .map(|t| t.to_string())
                .collect(),
        }
    }
}

/// Optional strictness gates on top of the default pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ValidationConfig {
    /// Require alt text on every image and turn `<em>` captions into
    /// `<figure>`/`<figcaption>`.
    pub figures: bool,
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of articles built in parallel.
    /// When absent or null, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config
        .max_processes
        .map(|n| n.clamp(1, cores))
        .unwrap_or(cores)
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    Ok(toml::Value::try_from(SiteConfig::default())?)
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Merge an optional overlay onto the stock defaults, then deserialize,
/// normalize and validate.
pub fn resolve_config(overlay: Option<toml::Value>) -> Result<SiteConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let mut config: SiteConfig = merged.try_into()?;
    config.origin = config.origin.trim_end_matches('/').to_string();
    config.validate()?;
    Ok(config)
}

/// Load the config file at `path`.
///
/// A missing file yields the stock defaults; a present file is merged on
/// top of them, rejecting unknown keys.
pub fn load_config(path: &Path) -> Result<SiteConfig, ConfigError> {
    let overlay = if path.exists() {
        let content = fs::read_to_string(path)?;
        Some(toml::from_str::<toml::Value>(&content)?)
    } else {
        None
    };
    resolve_config(overlay)
}

/// Returns a fully-commented stock `config.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Pressroom Configuration
# =======================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys will cause an error.

# Scheme and host of the published site. Used to build absolute article and
# cover-image URLs, and to reject absolute links that point back at the site.
origin = "http://localhost:3000"

# One sub-directory per article: <articles_dir>/<slug>/article.md,
# metadata.json and the images the article references.
articles_dir = "data/articles"

# Public web root. Exported images land in <public_dir>/article/<slug>/.
public_dir = "public"

# ---------------------------------------------------------------------------
# Article images
# ---------------------------------------------------------------------------
[images]
# Images wider than this are downscaled; narrower ones keep their size.
max_width = 1536

# JPEG encoding quality (1 = worst, 100 = best).
quality = 50

# ---------------------------------------------------------------------------
# Cover thumbnails
# ---------------------------------------------------------------------------
[thumbnails]
width = 300
quality = 60

# ---------------------------------------------------------------------------
# Reading time
# ---------------------------------------------------------------------------
[reading]
words_per_minute = 200

# ---------------------------------------------------------------------------
# Title casing
# ---------------------------------------------------------------------------
[casing]
# Elements whose text is title-cased. An empty list disables casing.
tags = ["h1", "h2", "h3", "h4", "h5", "h6"]

# ---------------------------------------------------------------------------
# Validation
# ---------------------------------------------------------------------------
[validation]
# Require alt text on every image and an *emphasis* caption right after it;
# captioned images are wrapped in <figure>/<figcaption>.
figures = false

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum articles built in parallel.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_processes = 4
"##
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config_values() {
        let config = SiteConfig::default();
        assert_eq!(config.origin, "http://localhost:3000");
        assert_eq!(config.articles_dir, "data/articles");
        assert_eq!(config.images.max_width, 1536);
        assert_eq!(config.images.quality, 50);
        assert_eq!(config.thumbnails.width, 300);
        assert_eq!(config.thumbnails.quality, 60);
        assert_eq!(config.reading.words_per_minute, 200);
        assert_eq!(config.casing.tags.len(), 6);
        assert!(!config.validation.figures);
    }

    #[test]
    fn parse_partial_config() {
        let toml = r##"
origin = "https://example.com"

[images]
quality = 70
"##;
        let config: SiteConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.origin, "https://example.com");
        assert_eq!(config.images.quality, 70);
        // Unspecified defaults preserved
        assert_eq!(config.images.max_width, 1536);
        assert_eq!(config.thumbnails.width, 300);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let toml = r##"
[images]
sizes = [800]
"##;
        assert!(toml::from_str::<SiteConfig>(toml).is_err());
    }

    #[test]
    fn imaging_configs_follow_settings() {
        let mut config = SiteConfig::default();
        config.images.max_width = 1024;
        config.thumbnails.quality = 75;
        assert_eq!(config.optimize_config().max_width, 1024);
        assert_eq!(config.thumbnail_config().quality.value(), 75);
    }

    // =========================================================================
    // Validation
    // =========================================================================

    #[test]
    fn default_config_is_valid() {
        assert!(SiteConfig::default().validate().is_ok());
    }

    #[test]
    fn origin_must_be_http_url() {
        for origin in ["example.com", "ftp://example.com", "https://example.com/blog"] {
            let config = SiteConfig {
                origin: origin.to_string(),
                ..SiteConfig::default()
            };
            assert!(
                matches!(config.validate(), Err(ConfigError::Validation(_))),
                "{origin} should be rejected"
            );
        }
    }

    #[test]
    fn quality_out_of_range_is_rejected() {
        let mut config = SiteConfig::default();
        config.images.quality = 0;
        assert!(config.validate().is_err());

        let mut config = SiteConfig::default();
        config.thumbnails.quality = 101;
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_sizes_are_rejected() {
        let mut config = SiteConfig::default();
        config.thumbnails.width = 0;
        assert!(config.validate().is_err());

        let mut config = SiteConfig::default();
        config.reading.words_per_minute = 0;
        assert!(config.validate().is_err());
    }

    // =========================================================================
    // load_config
    // =========================================================================

    #[test]
    fn load_config_returns_default_when_no_file() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(&tmp.path().join("config.toml")).unwrap();
        assert_eq!(config.origin, "http://localhost:3000");
    }

    #[test]
    fn load_config_reads_file_and_trims_origin() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        fs::write(
            &path,
            r##"
origin = "https://example.com/"

[validation]
figures = true
"##,
        )
        .unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.origin, "https://example.com");
        assert!(config.validation.figures);
        assert_eq!(config.images.quality, 50);
    }

    #[test]
    fn load_config_invalid_toml_is_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        fs::write(&path, "this is not valid toml [[[").unwrap();
        assert!(matches!(load_config(&path), Err(ConfigError::Toml(_))));
    }

    #[test]
    fn load_config_validates() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        fs::write(&path, "[images]\nquality = 500\n").unwrap();
        assert!(matches!(load_config(&path), Err(ConfigError::Validation(_))));
    }

    // =========================================================================
    // merge_toml
    // =========================================================================

    #[test]
    fn merge_toml_overrides_nested_keys_only() {
        let base: toml::Value = toml::from_str("[a]\nx = 1\ny = 2\n").unwrap();
        let overlay: toml::Value = toml::from_str("[a]\ny = 3\n").unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(merged["a"]["x"].as_integer(), Some(1));
        assert_eq!(merged["a"]["y"].as_integer(), Some(3));
    }

    #[test]
    fn stock_defaults_value_has_all_sections() {
        let val = stock_defaults_value().unwrap();
        for section in [
            "images",
            "thumbnails",
            "reading",
            "casing",
            "validation",
            "processing",
        ] {
            assert!(val.get(section).is_some(), "missing {section}");
        }
    }

    // =========================================================================
    // stock_config_toml
    // =========================================================================

    #[test]
    fn stock_config_toml_roundtrips_to_defaults() {
        let config: SiteConfig = toml::from_str(stock_config_toml()).unwrap();
        let defaults = SiteConfig::default();
        assert_eq!(config.origin, defaults.origin);
        assert_eq!(config.images.max_width, defaults.images.max_width);
        assert_eq!(config.thumbnails.quality, defaults.thumbnails.quality);
        assert_eq!(config.casing.tags, defaults.casing.tags);
        assert!(config.processing.max_processes.is_none());
    }

    // =========================================================================
    // effective_threads
    // =========================================================================

    #[test]
    fn effective_threads_clamps_to_cores() {
        let cores = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        let config = ProcessingConfig {
            max_processes: Some(usize::MAX),
        };
        assert_eq!(effective_threads(&config), cores);
        assert_eq!(effective_threads(&ProcessingConfig::default()), cores);
        assert_eq!(
            effective_threads(&ProcessingConfig {
                max_processes: Some(1)
            }),
            1
        );
    }
}
