//! Field selectors over the final article tree.
//!
//! Articles follow a fixed opening structure:
//!
//! ```html
//! <h1>Title</h1>
//! <p><strong>One-paragraph lede.</strong></p>
//! ...
//! ```
//!
//! The title must be the very first element of the body and the lede the
//! element right after it. The first image anywhere in the article is its
//! cover. Anything else is a validation failure for that article.

use crate::html::dom::{self, HtmlDocument};
use crate::html::ValidationError;

/// The image used for social cards and listings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverImage {
    pub src: String,
    pub alt: String,
}

fn title_element(doc: &HtmlDocument) -> Option<markup5ever_rcdom::Handle> {
    let body = doc.body()?;
    dom::element_children(&body)
        .into_iter()
        .next()
        .filter(|first| dom::is_element(first, "h1"))
}

/// Text of the `<h1>` that opens the body.
pub fn select_title(doc: &HtmlDocument) -> Result<String, ValidationError> {
    title_element(doc)
        .map(|h1| dom::text_content(&h1))
        .ok_or(ValidationError::MissingTitle)
}

/// Text of the lede: a `<p>` directly after the title whose only content
/// is a single `<strong>`.
pub fn select_description(doc: &HtmlDocument) -> Result<String, ValidationError> {
    let paragraph = title_element(doc)
        .and_then(|h1| dom::next_element_sibling(&h1))
        .filter(|p| dom::is_element(p, "p"))
        .ok_or(ValidationError::MissingDescription)?;

    let children = dom::element_children(&paragraph);
    let stray_text = paragraph
        .children
        .borrow()
        .iter()
        .any(|c| dom::is_meaningful_text(c));
    match children.as_slice() {
        [strong] if dom::is_element(strong, "strong") && !stray_text => {
            Ok(dom::text_content(strong))
        }
        _ => Err(ValidationError::MissingDescription),
    }
}

/// The first image of the article.
pub fn select_cover_image(doc: &HtmlDocument) -> Result<CoverImage, ValidationError> {
    let img = doc
        .elements("img")
        .into_iter()
        .next()
        .ok_or(ValidationError::MissingCoverImage)?;
    let src = dom::get_attr(&img, "src")
        .filter(|s| !s.is_empty())
        .ok_or(ValidationError::MissingCoverImage)?;
    let alt = dom::get_attr(&img, "alt")
        .filter(|a| !a.is_empty())
        .ok_or_else(|| ValidationError::MissingCoverAlt(src.clone()))?;
    Ok(CoverImage { src, alt })
}

/// All text of the body, markup stripped.
pub fn select_plain_text(doc: &HtmlDocument) -> String {
    doc.body()
        .map(|body| dom::text_content(&body))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(html: &str) -> HtmlDocument {
        HtmlDocument::parse(html)
    }

    // =========================================================================
    // Title
    // =========================================================================

    #[test]
    fn title_from_leading_h1() {
        let d = doc("<h1>Hello <em>World</em></h1>\n<p>x</p>");
        assert_eq!(select_title(&d).unwrap(), "Hello World");
    }

    #[test]
    fn title_must_be_first_element() {
        let d = doc("<p>intro</p><h1>Late</h1>");
        assert_eq!(select_title(&d).unwrap_err(), ValidationError::MissingTitle);
    }

    #[test]
    fn h2_is_not_a_title() {
        assert_eq!(
            select_title(&doc("<h2>Sub</h2>")).unwrap_err(),
            ValidationError::MissingTitle
        );
    }

    #[test]
    fn empty_document_has_no_title() {
        assert_eq!(select_title(&doc("")).unwrap_err(), ValidationError::MissingTitle);
    }

    // =========================================================================
    // Description
    // =========================================================================

    #[test]
    fn description_from_strong_lede() {
        let d = doc("<h1>T</h1>\n<p><strong>Lede.</strong></p>\n<p>Body</p>");
        assert_eq!(select_description(&d).unwrap(), "Lede.");
    }

    #[test]
    fn lede_with_extra_text_is_rejected() {
        let d = doc("<h1>T</h1><p><strong>Lede.</strong> and more</p>");
        assert_eq!(
            select_description(&d).unwrap_err(),
            ValidationError::MissingDescription
        );
    }

    #[test]
    fn lede_must_follow_title_directly() {
        let d = doc("<h1>T</h1><p>plain</p><p><strong>Lede.</strong></p>");
        assert_eq!(
            select_description(&d).unwrap_err(),
            ValidationError::MissingDescription
        );
    }

    #[test]
    fn lede_with_two_strongs_is_rejected() {
        let d = doc("<h1>T</h1><p><strong>a</strong><strong>b</strong></p>");
        assert!(select_description(&d).is_err());
    }

    #[test]
    fn description_requires_title() {
        let d = doc("<p><strong>Lede.</strong></p>");
        assert_eq!(
            select_description(&d).unwrap_err(),
            ValidationError::MissingDescription
        );
    }

    // =========================================================================
    // Cover image
    // =========================================================================

    #[test]
    fn cover_is_first_image() {
        let d = doc(r#"<p><img src="/a.jpg" alt="A"></p><p><img src="/b.jpg" alt="B"></p>"#);
        assert_eq!(
            select_cover_image(&d).unwrap(),
            CoverImage {
                src: "/a.jpg".into(),
                alt: "A".into()
            }
        );
    }

    #[test]
    fn no_image_is_missing_cover() {
        assert_eq!(
            select_cover_image(&doc("<p>text</p>")).unwrap_err(),
            ValidationError::MissingCoverImage
        );
    }

    #[test]
    fn cover_without_alt_is_rejected() {
        assert_eq!(
            select_cover_image(&doc(r#"<img src="/a.jpg">"#)).unwrap_err(),
            ValidationError::MissingCoverAlt("/a.jpg".into())
        );
    }

    // =========================================================================
    // Plain text
    // =========================================================================

    #[test]
    fn plain_text_strips_markup() {
        let d = doc("<h1>T</h1><p>one <a href=\"/x\">two</a></p>");
        assert_eq!(select_plain_text(&d), "Tone two");
    }
}
