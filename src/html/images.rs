//! Image export pass.

use super::dom::{self, HtmlDocument};
use super::{Transform, TransformError, ValidationError, is_absolute_url};
use crate::export::{ExportedImage, ImageExporter};
use crate::imaging::ImageBackend;
use std::cell::RefCell;

/// Validate every `<img src>`, export it and point `src` at the export.
///
/// All sources are validated before anything is exported, so an invalid
/// image anywhere in the article leaves the public tree untouched.
pub struct ExportImages<'a, B: ImageBackend> {
    exporter: &'a ImageExporter<'a, B>,
    slug: &'a str,
    exported: RefCell<Vec<ExportedImage>>,
}

impl<'a, B: ImageBackend> ExportImages<'a, B> {
    pub fn new(exporter: &'a ImageExporter<'a, B>, slug: &'a str) -> Self {
        Self {
            exporter,
            slug,
            exported: RefCell::new(Vec::new()),
        }
    }

    /// Images exported by the last successful run, in document order.
    pub fn take_exported(&self) -> Vec<ExportedImage> {
        self.exported.take()
    }
}

impl<B: ImageBackend> Transform for ExportImages<'_, B> {
    fn name(&self) -> &'static str {
        "export-images"
    }

    fn apply(&self, doc: HtmlDocument) -> Result<HtmlDocument, TransformError> {
        let images = doc.elements("img");

        let mut sources = Vec::with_capacity(images.len());
        for img in &images {
            let src = dom::get_attr(img, "src")
                .filter(|s| !s.is_empty())
                .ok_or(ValidationError::MissingImageUrl)?;
            if is_absolute_url(&src) {
                return Err(ValidationError::AbsoluteImageUrl(src).into());
            }
            sources.push(src);
        }

        let mut exported = Vec::with_capacity(sources.len());
        for src in &sources {
            exported.push(self.exporter.export_image(src, self.slug)?);
        }

        for (img, image) in images.iter().zip(&exported) {
            dom::set_attr(img, "src", &image.path);
        }
        *self.exported.borrow_mut() = exported;
        Ok(doc)
    }
}
