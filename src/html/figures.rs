//! Accessibility and caption passes for images.
//!
//! Markdown has no figure syntax, so a caption is written as emphasis right
//! after the image:
//!
//! ```markdown
//! ![A quiet beach](beach.png)
//! *Low tide at dawn.*
//! ```
//!
//! which renders to `<p><img ...>\n<em>Low tide at dawn.</em></p>` and is
//! rewritten to `<figure><img ...><figcaption>Low tide at dawn.</figcaption></figure>`.

use super::dom::{self, HtmlDocument};
use super::{Transform, TransformError, ValidationError};
use markup5ever_rcdom::Handle;
use std::rc::Rc;

/// Require a non-blank `alt` on every image.
pub struct EnforceAltText;

impl Transform for EnforceAltText {
    fn name(&self) -> &'static str {
        "enforce-alt-text"
    }

    fn apply(&self, doc: HtmlDocument) -> Result<HtmlDocument, TransformError> {
        for img in doc.elements("img") {
            let alt = dom::get_attr(&img, "alt").unwrap_or_default();
            if alt.trim().is_empty() {
                return Err(ValidationError::MissingAltText(src_of(&img)).into());
            }
        }
        Ok(doc)
    }
}

/// Wrap each image and its `<em>` caption in `<figure>`/`<figcaption>`.
///
/// Every image must be followed by a caption. A figure cannot live inside a
/// paragraph, so the paragraph is split at the image: what came before
/// stays in the original `<p>`, what followed the caption moves to a new
/// `<p>` after the figure, and halves holding only whitespace are dropped.
pub struct Figures;

impl Transform for Figures {
    fn name(&self) -> &'static str {
        "figures"
    }

    fn apply(&self, doc: HtmlDocument) -> Result<HtmlDocument, TransformError> {
        for img in doc.elements("img") {
            let caption = dom::next_element_sibling(&img)
                .filter(|n| dom::is_element(n, "em"))
                .ok_or_else(|| ValidationError::MissingCaption(src_of(&img)))?;

            let figure = dom::create_element("figure");
            let paragraph = dom::parent(&img).filter(|p| dom::is_element(p, "p"));
            match &paragraph {
                Some(paragraph) => split_paragraph(paragraph, &img, &caption, &figure),
                None => dom::replace_with(&img, &figure),
            }
            dom::append_child(&figure, &img);

            let figcaption = dom::create_element("figcaption");
            let children: Vec<Handle> = caption.children.borrow().clone();
            for child in &children {
                dom::append_child(&figcaption, child);
            }
            dom::append_child(&figure, &figcaption);
            dom::detach(&caption);

            if let Some(paragraph) = paragraph {
                drop_if_empty(&paragraph);
            }
        }
        Ok(doc)
    }
}

/// Place `figure` after `paragraph` and move everything following `img`
/// (except the caption) into a new paragraph after the figure.
///
/// `img` and `caption` stay where they are; the caller moves them.
fn split_paragraph(paragraph: &Handle, img: &Handle, caption: &Handle, figure: &Handle) {
    let children: Vec<Handle> = paragraph.children.borrow().clone();
    let Some(at) = children.iter().position(|c| Rc::ptr_eq(c, img)) else {
        return;
    };

    let tail = dom::create_element("p");
    for node in children[at + 1..].iter().filter(|c| !Rc::ptr_eq(c, caption)) {
        dom::append_child(&tail, node);
    }
    dom::insert_after(paragraph, figure);
    dom::insert_after(figure, &tail);
    drop_if_empty(&tail);
}

fn drop_if_empty(paragraph: &Handle) {
    if paragraph.children.borrow().iter().all(|c| !is_content(c)) {
        dom::detach(paragraph);
    }
}

fn is_content(node: &Handle) -> bool {
    dom::tag_name(node).is_some() || dom::is_meaningful_text(node)
}

fn src_of(img: &Handle) -> String {
    dom::get_attr(img, "src").unwrap_or_default()
}
