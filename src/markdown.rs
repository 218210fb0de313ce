//! Markdown to HTML conversion.

use pulldown_cmark::{Options, Parser, html};

/// Render markdown to an HTML fragment.
///
/// Surrounding whitespace is trimmed first so a leading blank line cannot
/// push the title heading off the first line. Tables and strikethrough are
/// enabled; raw HTML in the source is passed through.
pub fn to_html(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);

    let parser = Parser::new_ext(markdown.trim(), options);
    let mut out = String::new();
    html::push_html(&mut out, parser);
    out
}
