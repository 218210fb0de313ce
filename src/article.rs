//! Article assembly: from a source directory to an [`ArticleRecord`].
//!
//! ## Per-article flow
//!
//! ```text
//! <articles>/<slug>/metadata.json ──► ArticleMetadata
//! <articles>/<slug>/article.md ──► markdown ──► HtmlDocument
//!     ──► export images ──► title case ──► external links [──► alt text ──► figures]
//!     ──► title, lede, plain text ──► reading time
//!     ──► cover image ──► absolute cover URL + thumbnail
//!     ──► ArticleRecord
//! ```
//!
//! The bracketed passes run only with `validation.figures = true`.
//!
//! ## Whole-site builds
//!
//! [`ArticleBuilder::build_all`] lists every non-hidden directory under the
//! articles root and builds them in parallel on the rayon pool, one task
//! per slug. Articles never touch each other's files, so the only shared
//! state is the exporter's cache counters.
//!
//! A failing article does not stop the others: every failure, whatever its
//! kind, is collected in the [`BuildReport`] next to the successful records.
//! Only a failure to list the articles root aborts the run.

use crate::cache::CacheStats;
use crate::config::SiteConfig;
use crate::export::{ARTICLE_BASE, ExportError, ExportedImage, ImageExporter};
use crate::html::{
    EnforceAltText, ExportImages, ExternalLinks, Figures, HtmlDocument, Pipeline, TitleCase,
    TransformError, ValidationError,
};
use crate::imaging::ImageBackend;
use crate::markdown;
use crate::metadata::{MetadataError, load_metadata};
use crate::reading;
use crate::select::{select_cover_image, select_description, select_plain_text, select_title};
use crate::types::ArticleRecord;
use rayon::prelude::*;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use thiserror::Error;

pub const ARTICLE_FILE: &str = "article.md";

#[derive(Error, Debug)]
pub enum ArticleError {
    #[error(transparent)]
    Metadata(#[from] MetadataError),
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error(transparent)]
    Transform(#[from] TransformError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("thumbnail export failed: {0}")]
    Thumbnail(#[from] ExportError),
    #[error("cannot resolve {path} against {origin}: {source}")]
    Url {
        path: String,
        origin: String,
        #[source]
        source: url::ParseError,
    },
    #[error("failed to serialize article HTML: {0}")]
    Render(#[source] io::Error),
}

/// Run-level failures. Per-article problems never end up here.
#[derive(Error, Debug)]
pub enum BuildError {
    #[error("cannot list articles in {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// One article that did not build, and why.
#[derive(Debug)]
pub struct ArticleFailure {
    pub slug: String,
    pub error: ArticleError,
}

/// Everything a whole-site build produced.
#[derive(Debug, Default)]
pub struct BuildReport {
    /// Successful records, sorted by slug.
    pub articles: Vec<ArticleRecord>,
    /// Failed slugs, sorted by slug.
    pub failures: Vec<ArticleFailure>,
    pub cache_stats: CacheStats,
}

impl BuildReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// A built record plus the image work done for it.
#[derive(Debug)]
pub struct BuiltArticle {
    pub record: ArticleRecord,
    /// Body images in document order.
    pub images: Vec<ExportedImage>,
    pub thumbnail: ExportedImage,
}

/// Progress notifications emitted while [`ArticleBuilder::build_all`] runs.
///
/// Events arrive in completion order, not slug order.
#[derive(Debug, Clone)]
pub enum BuildEvent {
    ArticleBuilt {
        slug: String,
        title: String,
        images: Vec<ExportedImage>,
        thumbnail: ExportedImage,
    },
    ArticleFailed {
        slug: String,
        error: String,
    },
}

/// Builds articles from one articles root with one shared exporter.
pub struct ArticleBuilder<'a, B: ImageBackend> {
    exporter: ImageExporter<'a, B>,
    articles_root: PathBuf,
    origin: String,
    casing: TitleCase,
    links: ExternalLinks,
    figures: bool,
    words_per_minute: u32,
}

impl<'a, B: ImageBackend> ArticleBuilder<'a, B> {
    pub fn new(backend: &'a B, config: &SiteConfig) -> Self {
        let articles_root = config.articles_root();
        let exporter = ImageExporter::new(backend, &articles_root, &config.public_root())
            .with_optimize(config.optimize_config())
            .with_thumbnail(config.thumbnail_config());
        Self {
            exporter,
            articles_root,
            origin: config.origin.clone(),
            casing: TitleCase::new(config.casing.tags.clone()),
            links: ExternalLinks::new(&config.origin),
            figures: config.validation.figures,
            words_per_minute: config.reading.words_per_minute,
        }
    }

    /// Re-encode every image even when its export already exists.
    pub fn force(mut self, force: bool) -> Self {
        self.exporter = self.exporter.force(force);
        self
    }

    pub fn exporter(&self) -> &ImageExporter<'a, B> {
        &self.exporter
    }

    /// Build the article in `<articles_root>/<slug>`.
    pub fn build_article(&self, slug: &str) -> Result<ArticleRecord, ArticleError> {
        self.assemble(slug).map(|built| built.record)
    }

    /// Build one article and report the images exported for it.
    pub fn assemble(&self, slug: &str) -> Result<BuiltArticle, ArticleError> {
        let _span = tracing::info_span!("article", slug).entered();
        let dir = self.articles_root.join(slug);

        let metadata = load_metadata(&dir)?;
        let markdown_path = dir.join(ARTICLE_FILE);
        let source = fs::read_to_string(&markdown_path).map_err(|source| ArticleError::Io {
            path: markdown_path.clone(),
            source,
        })?;
        let doc = HtmlDocument::parse(&markdown::to_html(&source));

        let export = ExportImages::new(&self.exporter, slug);
        let mut pipeline = Pipeline::new()
            .then(&export)
            .then(&self.casing)
            .then(&self.links);
        if self.figures {
            pipeline = pipeline.then(&EnforceAltText).then(&Figures);
        }
        tracing::debug!(passes = ?pipeline.names(), "running transforms");
        let doc = pipeline.run(doc)?;
        let images = export.take_exported();

        let title = select_title(&doc)?;
        let description = select_description(&doc)?;
        let reading_time = reading::reading_time(&select_plain_text(&doc), self.words_per_minute);
        let cover = select_cover_image(&doc)?;
        let cover_image_url = self.absolute(&cover.src)?;
        let thumbnail = self.exporter.export_thumbnail(&cover.src)?;
        let html = doc.body_html().map_err(ArticleError::Render)?;

        let url = format!("{}/{}", ARTICLE_BASE, slug);
        let record = ArticleRecord {
            slug: slug.to_string(),
            absolute_url: format!("{}{}", self.origin, url),
            url,
            html,
            title,
            description,
            reading_time,
            cover_image_url,
            cover_image_alt: cover.alt,
            thumbnail: thumbnail.path.clone(),
            category: metadata.category,
            author: metadata.author,
            published_at: metadata.published_at,
            timestamp: metadata.timestamp,
            keywords: metadata.keywords,
        };
        tracing::info!(images = images.len(), "article built");
        Ok(BuiltArticle {
            record,
            images,
            thumbnail,
        })
    }

    /// Resolve a root-relative path against the site origin.
    fn absolute(&self, path: &str) -> Result<String, ArticleError> {
        url::Url::parse(&self.origin)
            .and_then(|base| base.join(path))
            .map(|u| u.to_string())
            .map_err(|source| ArticleError::Url {
                path: path.to_string(),
                origin: self.origin.clone(),
                source,
            })
    }

    /// Slugs of every article directory, sorted.
    pub fn list_slugs(&self) -> Result<Vec<String>, BuildError> {
        list_slugs(&self.articles_root)
    }

    /// Build every article in parallel.
    ///
    /// When `events` is given, one [`BuildEvent`] is sent per article as it
    /// finishes.
    pub fn build_all(&self, events: Option<Sender<BuildEvent>>) -> Result<BuildReport, BuildError> {
        let slugs = self.list_slugs()?;
        tracing::info!(count = slugs.len(), root = %self.articles_root.display(), "building articles");

        let outcomes: Vec<(String, Result<BuiltArticle, ArticleError>)> = slugs
            .into_par_iter()
            .map_with(events, |events, slug| {
                let outcome = self.assemble(&slug);
                if let Err(e) = &outcome {
                    tracing::warn!(slug = %slug, error = %e, "article failed");
                }
                if let Some(tx) = events {
                    tx.send(BuildEvent::from_outcome(&slug, &outcome)).ok();
                }
                (slug, outcome)
            })
            .collect();

        let mut report = BuildReport::default();
        for (slug, outcome) in outcomes {
            match outcome {
                Ok(built) => report.articles.push(built.record),
                Err(error) => report.failures.push(ArticleFailure { slug, error }),
            }
        }
        report.cache_stats = self.exporter.stats();
        Ok(report)
    }
}

impl BuildEvent {
    fn from_outcome(slug: &str, outcome: &Result<BuiltArticle, ArticleError>) -> Self {
        match outcome {
            Ok(built) => BuildEvent::ArticleBuilt {
                slug: slug.to_string(),
                title: built.record.title.clone(),
                images: built.images.clone(),
                thumbnail: built.thumbnail.clone(),
            },
            Err(e) => BuildEvent::ArticleFailed {
                slug: slug.to_string(),
                error: e.to_string(),
            },
        }
    }
}

/// Non-hidden directories directly under `root`, sorted by name.
pub fn list_slugs(root: &Path) -> Result<Vec<String>, BuildError> {
    let mut slugs = Vec::new();
    for entry in walkdir::WalkDir::new(root)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|e| BuildError::Io {
            path: root.to_path_buf(),
            source: e.into(),
        })?;
        if !entry.file_type().is_dir() {
            continue;
        }
        let name = entry.file_name().to_string_lossy();
        if name.starts_with('.') {
            continue;
        }
        slugs.push(name.into_owned());
    }
    Ok(slugs)
}
