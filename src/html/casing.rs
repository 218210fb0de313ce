//! Title-casing of heading text.
//!
//! Rules, applied per whitespace-separated word across all text nodes of a
//! heading (markup inside the heading is preserved):
//!
//! - Minor words (articles, short conjunctions and prepositions) are
//!   lowercased unless they are the first or last word, or follow a colon.
//! - Every other word gets an uppercase first letter; hyphenated parts are
//!   capitalized independently (`well-known` → `Well-Known`).
//! - Words the author already cased deliberately (`iPhone`, `API`), and
//!   tokens that look like identifiers or addresses (`v1.2`, `a/b`,
//!   `user@host`) are left alone.
//! - Text inside `<code>`, `<kbd>` and `<samp>` is never touched.

use super::dom::{self, HtmlDocument};
use super::{Transform, TransformError};
use html5ever::tendril::StrTendril;
use markup5ever_rcdom::{Handle, NodeData};

const MINOR_WORDS: &[&str] = &[
    "a", "an", "and", "as", "at", "but", "by", "en", "for", "if", "in", "nor", "of", "on", "or",
    "per", "the", "to", "v", "vs", "via",
];

const VERBATIM_TAGS: &[&str] = &["code", "kbd", "samp"];

/// Title-case the text of the configured heading tags.
pub struct TitleCase {
    tags: Vec<String>,
}

impl TitleCase {
    pub fn new(tags: Vec<String>) -> Self {
        Self { tags }
    }
}

impl Default for TitleCase {
    fn default() -> Self {
        Self::new(
            ["h1", "h2", "h3", "h4", "h5", "h6"]
                .iter()
                .map(|t| t.to_string())
                .collect(),
        )
    }
}

impl Transform for TitleCase {
    fn name(&self) -> &'static str {
        "title-case"
    }

    fn apply(&self, doc: HtmlDocument) -> Result<HtmlDocument, TransformError> {
        for heading in doc.elements_where(|name| self.tags.iter().any(|t| t == name)) {
            title_case_element(&heading);
        }
        Ok(doc)
    }
}

fn title_case_element(element: &Handle) {
    let mut texts = Vec::new();
    collect_text_nodes(element, &mut texts);

    let contents: Vec<String> = texts.iter().map(text_of).collect();
    let total = contents.iter().map(|c| c.split_whitespace().count()).sum();

    let mut state = WordState { index: 0, total, after_colon: false };
    for (node, text) in texts.iter().zip(&contents) {
        let cased = state.case_text(text);
        if &cased != text {
            if let NodeData::Text { contents } = &node.data {
                contents.replace(StrTendril::from(cased));
            }
        }
    }
}

/// Text nodes under `node`, skipping verbatim subtrees.
fn collect_text_nodes(node: &Handle, out: &mut Vec<Handle>) {
    for child in node.children.borrow().iter() {
        match &child.data {
            NodeData::Text { .. } => out.push(child.clone()),
            NodeData::Element { .. } => {
                let verbatim = dom::tag_name(child).is_some_and(|t| VERBATIM_TAGS.contains(&t));
                if !verbatim {
                    collect_text_nodes(child, out);
                }
            }
            _ => {}
        }
    }
}

fn text_of(node: &Handle) -> String {
    match &node.data {
        NodeData::Text { contents } => contents.borrow().to_string(),
        _ => String::new(),
    }
}

/// Position in the heading's word sequence, carried across text nodes.
struct WordState {
    index: usize,
    total: usize,
    after_colon: bool,
}

impl WordState {
    fn case_text(&mut self, text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        for piece in text.split_inclusive(char::is_whitespace) {
            let word = piece.trim_end();
            if word.is_empty() {
                out.push_str(piece);
                continue;
            }
            let edge = self.index == 0 || self.index + 1 == self.total || self.after_colon;
            out.push_str(&case_word(word, edge));
            out.push_str(&piece[word.len()..]);
            self.after_colon = word.ends_with(':');
            self.index += 1;
        }
        out
    }
}

/// Title-case one word. `edge` marks first/last position, where minor
/// words are capitalized too.
pub fn case_word(word: &str, edge: bool) -> String {
    if is_verbatim(word) {
        return word.to_string();
    }
    let bare = word
        .trim_matches(|c: char| !c.is_alphanumeric())
        .to_lowercase();
    if !edge && MINOR_WORDS.contains(&bare.as_str()) {
        return word.to_lowercase();
    }
    word.split('-').map(capitalize).collect::<Vec<_>>().join("-")
}

/// Deliberately cased or identifier-like tokens.
fn is_verbatim(word: &str) -> bool {
    let mut letters = word.chars().filter(|c| c.is_alphabetic());
    letters.next();
    if letters.any(char::is_uppercase) {
        return true;
    }
    word.trim_end_matches(['.', ',', ':', ';', '!', '?'])
        .contains(['.', '/', '@'])
}

fn capitalize(part: &str) -> String {
    match part.char_indices().find(|(_, c)| c.is_alphabetic()) {
        Some((i, c)) => {
            let mut out = String::with_capacity(part.len());
            out.push_str(&part[..i]);
            out.extend(c.to_uppercase());
            out.push_str(&part[i + c.len_utf8()..]);
            out
        }
        None => part.to_string(),
    }
}
