//! # Pressroom
//!
//! A build pipeline for markdown articles. Each article directory (markdown,
//! a JSON descriptor and the images it references) becomes one immutable
//! [`ArticleRecord`](types::ArticleRecord) plus a set of content-addressed
//! JPEG files under the public web root.
//!
//! # Architecture: One Pass Per Article
//!
//! ```text
//! metadata.json ─┐
//! article.md ────┴─► markdown → HtmlDocument → transform passes → selectors → ArticleRecord
//!                                                   │
//!                                                   └─► image export (hash-named JPEGs)
//! ```
//!
//! Articles are independent, so a full build is one rayon task per slug.
//! A failing article is reported with its slug and never stops the others.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`article`] | Per-slug assembly and the parallel whole-site build |
//! | [`html`] | Owned HTML tree and the ordered transform/validation passes |
//! | [`export`] | Content-addressed export of article images and cover thumbnails |
//! | [`cache`] | SHA-256 hashing, existence checks, atomic writes, cache counters |
//! | [`imaging`] | Pure-Rust decode, resize and JPEG encode behind a backend trait |
//! | [`metadata`] | `metadata.json` descriptor loading |
//! | [`markdown`] | Markdown to HTML conversion |
//! | [`select`] | Title, lede, cover image and plain text from the final tree |
//! | [`reading`] | Reading-time estimate |
//! | [`config`] | `config.toml` loading, defaults and validation |
//! | [`types`] | The serializable `ArticleRecord` |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## The Filesystem Is the Cache
//!
//! Optimized images are named after the SHA-256 of their source bytes. A
//! destination that exists is, by construction, the encoding of the current
//! bytes, so a rebuild costs one hash and one `stat` per image. See
//! [`cache`] for the concurrency argument.
//!
//! ## Validation Gates Fail the Article
//!
//! Structural rules (title first, bold lede, relative image paths, no
//! absolute self-links, and optionally alt text and captions) are hard
//! errors, not warnings. Content that breaks them would render wrongly
//! downstream, so it never reaches the record set.
//!
//! ## One Tree, Many Passes
//!
//! Markdown output is parsed once with html5ever. Passes take the
//! [`HtmlDocument`](html::HtmlDocument) by value and hand it back, so the
//! order of mutations is explicit in the pipeline and no pass re-parses
//! serialized HTML.

pub mod article;
pub mod cache;
pub mod config;
pub mod export;
pub mod html;
pub mod imaging;
pub mod markdown;
pub mod metadata;
pub mod output;
pub mod reading;
pub mod select;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
