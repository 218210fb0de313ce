//! Ordered HTML transform and validation passes.
//!
//! Rendered markdown is parsed once into an [`HtmlDocument`] and threaded
//! through a [`Pipeline`]. Each pass takes ownership of the document and
//! hands it back (possibly mutated) or stops the pipeline with an error.
//! Later passes observe the mutations of earlier ones, so order matters:
//!
//! | Pass | Effect |
//! |---|---|
//! | [`ExportImages`] | validate `<img src>`, export each image, rewrite `src` |
//! | [`TitleCase`] | title-case heading text |
//! | [`ExternalLinks`] | validate `<a href>`, open external links in a new tab |
//! | [`EnforceAltText`] | require non-empty `alt` on every image (opt-in) |
//! | [`Figures`] | wrap captioned images in `<figure>` (opt-in) |
//!
//! Passes never touch the filesystem themselves; [`ExportImages`] delegates
//! to an [`ImageExporter`](crate::export::ImageExporter).

pub mod casing;
pub mod dom;
pub mod figures;
pub mod images;
pub mod links;

pub use casing::TitleCase;
pub use dom::HtmlDocument;
pub use figures::{EnforceAltText, Figures};
pub use images::ExportImages;
pub use links::ExternalLinks;

use crate::export::ExportError;
use thiserror::Error;

/// A content rule the article markup violates.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("missing image URL")]
    MissingImageUrl,
    #[error("absolute image URL: {0}")]
    AbsoluteImageUrl(String),
    #[error("empty link (text: {0:?})")]
    EmptyLink(String),
    #[error("internal link marked absolute: {0}")]
    InternalLinkMarkedAbsolute(String),
    #[error("missing alt text on image {0}")]
    MissingAltText(String),
    #[error("missing caption on image {0}")]
    MissingCaption(String),
    #[error("missing title")]
    MissingTitle,
    #[error("missing description")]
    MissingDescription,
    #[error("missing cover image")]
    MissingCoverImage,
    #[error("missing cover alt text on image {0}")]
    MissingCoverAlt(String),
}

#[derive(Error, Debug)]
pub enum TransformError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Export(#[from] ExportError),
}

/// One step of the HTML pipeline.
pub trait Transform {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    fn apply(&self, doc: HtmlDocument) -> Result<HtmlDocument, TransformError>;
}

/// An ordered list of passes applied left to right.
///
/// Passes are borrowed so the caller can inspect a pass after the run
/// (e.g. the images [`ExportImages`] exported).
#[derive(Default)]
pub struct Pipeline<'a> {
    passes: Vec<&'a dyn Transform>,
}

impl<'a> Pipeline<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a pass.
    pub fn then(mut self, pass: &'a dyn Transform) -> Self {
        self.passes.push(pass);
        self
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.passes.iter().map(|p| p.name()).collect()
    }

    /// Run every pass in order, stopping at the first error.
    pub fn run(&self, mut doc: HtmlDocument) -> Result<HtmlDocument, TransformError> {
        for pass in &self.passes {
            tracing::trace!(pass = pass.name(), "applying transform");
            doc = pass.apply(doc)?;
        }
        Ok(doc)
    }
}

/// `http://`, `https://` (any case) or protocol-relative `//`.
pub fn is_absolute_url(url: &str) -> bool {
    let scheme = url.get(..8).unwrap_or(url).to_ascii_lowercase();
    scheme.starts_with("http://") || scheme.starts_with("https://") || url.starts_with("//")
}
