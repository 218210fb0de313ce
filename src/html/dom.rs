//! Owned, mutable HTML tree and the node operations the passes need.
//!
//! [`HtmlDocument`] wraps an html5ever [`RcDom`]. Markdown output is a body
//! fragment; parsing it as a document wraps it in `<html><head></head><body>`
//! exactly as a browser would, so selectors can anchor on `<body>`.
//!
//! Node helpers are free functions over [`Handle`]. Element children are
//! what CSS sees: whitespace-only text nodes between elements are ignored by
//! the sibling and child queries.

use html5ever::serialize::{SerializeOpts, TraversalScope, serialize};
use html5ever::tendril::{StrTendril, TendrilSink};
use html5ever::{Attribute, LocalName, Namespace, QualName, parse_document};
use markup5ever_rcdom::{Handle, Node, NodeData, RcDom, SerializableHandle};
use std::cell::RefCell;
use std::io;
use std::rc::{Rc, Weak};

const HTML_NAMESPACE: &str = "http://www.w3.org/1999/xhtml";

/// A parsed HTML document owned by one pipeline run.
pub struct HtmlDocument {
    dom: RcDom,
}

impl HtmlDocument {
    /// Parse markup into a full document tree. Never fails: html5ever
    /// recovers from malformed input the way browsers do.
    pub fn parse(html: &str) -> Self {
        let dom = parse_document(RcDom::default(), Default::default()).one(html);
        Self { dom }
    }

    /// The `<body>` element. Always present for documents built by [`parse`](Self::parse).
    pub fn body(&self) -> Option<Handle> {
        let html = element_children(&self.dom.document)
            .into_iter()
            .find(|n| is_element(n, "html"))?;
        element_children(&html)
            .into_iter()
            .find(|n| is_element(n, "body"))
    }

    /// Every element named `tag`, in document order.
    pub fn elements(&self, tag: &str) -> Vec<Handle> {
        self.elements_where(|name| name == tag)
    }

    /// Every element whose tag name satisfies `matches`, in document order.
    pub fn elements_where(&self, matches: impl Fn(&str) -> bool) -> Vec<Handle> {
        let mut found = Vec::new();
        collect_elements(&self.dom.document, &matches, &mut found);
        found
    }

    /// Serialized inner markup of `<body>`.
    pub fn body_html(&self) -> io::Result<String> {
        match self.body() {
            Some(body) => inner_html(&body),
            None => Ok(String::new()),
        }
    }
}

impl std::fmt::Debug for HtmlDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HtmlDocument")
            .field("body", &self.body_html().unwrap_or_default())
            .finish()
    }
}

fn collect_elements(node: &Handle, matches: &impl Fn(&str) -> bool, found: &mut Vec<Handle>) {
    for child in node.children.borrow().iter() {
        if let Some(name) = tag_name(child) {
            if matches(name) {
                found.push(child.clone());
            }
        }
        collect_elements(child, matches, found);
    }
}

/// Local tag name of an element node.
pub fn tag_name(node: &Node) -> Option<&str> {
    match &node.data {
        NodeData::Element { name, .. } => Some(&*name.local),
        _ => None,
    }
}

pub fn is_element(node: &Node, tag: &str) -> bool {
    tag_name(node) == Some(tag)
}

/// Attribute value, or `None` when the attribute is absent.
pub fn get_attr(node: &Node, name: &str) -> Option<String> {
    match &node.data {
        NodeData::Element { attrs, .. } => attrs
            .borrow()
            .iter()
            .find(|a| &*a.name.local == name)
            .map(|a| a.value.to_string()),
        _ => None,
    }
}

/// Set (or add) an attribute on an element. No-op on non-elements.
pub fn set_attr(node: &Node, name: &str, value: &str) {
    if let NodeData::Element { attrs, .. } = &node.data {
        let mut attrs = attrs.borrow_mut();
        match attrs.iter_mut().find(|a| &*a.name.local == name) {
            Some(attr) => attr.value = StrTendril::from(value),
            None => attrs.push(Attribute {
                name: QualName::new(None, Namespace::from(""), LocalName::from(name)),
                value: StrTendril::from(value),
            }),
        }
    }
}

/// A new, detached HTML element with no attributes.
pub fn create_element(tag: &str) -> Handle {
    Node::new(NodeData::Element {
        name: QualName::new(None, Namespace::from(HTML_NAMESPACE), LocalName::from(tag)),
        attrs: RefCell::new(Vec::new()),
        template_contents: RefCell::new(None),
        mathml_annotation_xml_integration_point: false,
    })
}

pub fn parent(node: &Handle) -> Option<Handle> {
    let weak = node.parent.take();
    let parent = weak.as_ref().and_then(Weak::upgrade);
    node.parent.set(weak);
    parent
}

pub fn element_children(node: &Handle) -> Vec<Handle> {
    node.children
        .borrow()
        .iter()
        .filter(|c| tag_name(c).is_some())
        .cloned()
        .collect()
}

/// The next sibling that is an element, skipping text and comments.
pub fn next_element_sibling(node: &Handle) -> Option<Handle> {
    let parent = parent(node)?;
    let siblings = parent.children.borrow();
    let index = siblings.iter().position(|c| Rc::ptr_eq(c, node))?;
    siblings[index + 1..]
        .iter()
        .find(|c| tag_name(c).is_some())
        .cloned()
}

/// True when the node holds text that is not just whitespace.
pub fn is_meaningful_text(node: &Node) -> bool {
    match &node.data {
        NodeData::Text { contents } => !contents.borrow().trim().is_empty(),
        _ => false,
    }
}

/// Concatenated text of all descendant text nodes.
pub fn text_content(node: &Handle) -> String {
    let mut text = String::new();
    push_text(node, &mut text);
    text
}

fn push_text(node: &Handle, text: &mut String) {
    if let NodeData::Text { contents } = &node.data {
        text.push_str(&contents.borrow());
    }
    for child in node.children.borrow().iter() {
        push_text(child, text);
    }
}

/// Serialized markup of the node's children.
pub fn inner_html(node: &Handle) -> io::Result<String> {
    let mut buf = Vec::new();
    let handle: SerializableHandle = node.clone().into();
    serialize(
        &mut buf,
        &handle,
        SerializeOpts {
            traversal_scope: TraversalScope::ChildrenOnly(None),
            ..Default::default()
        },
    )?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Remove a node from its parent. The node keeps its own subtree.
pub fn detach(node: &Handle) {
    if let Some(parent) = parent(node) {
        parent
            .children
            .borrow_mut()
            .retain(|c| !Rc::ptr_eq(c, node));
    }
    node.parent.set(None);
}

/// Move `child` to the end of `parent`'s children.
pub fn append_child(parent: &Handle, child: &Handle) {
    detach(child);
    child.parent.set(Some(Rc::downgrade(parent)));
    parent.children.borrow_mut().push(child.clone());
}

/// Move `node` so it sits immediately before `reference`.
pub fn insert_before(reference: &Handle, node: &Handle) {
    detach(node);
    let Some(parent) = parent(reference) else {
        return;
    };
    let mut siblings = parent.children.borrow_mut();
    if let Some(index) = siblings.iter().position(|c| Rc::ptr_eq(c, reference)) {
        siblings.insert(index, node.clone());
        node.parent.set(Some(Rc::downgrade(&parent)));
    }
}

/// Move `node` so it sits immediately after `reference`.
pub fn insert_after(reference: &Handle, node: &Handle) {
    detach(node);
    let Some(parent) = parent(reference) else {
        return;
    };
    let mut siblings = parent.children.borrow_mut();
    if let Some(index) = siblings.iter().position(|c| Rc::ptr_eq(c, reference)) {
        siblings.insert(index + 1, node.clone());
        node.parent.set(Some(Rc::downgrade(&parent)));
    }
}

/// Put `replacement` where `old` was and detach `old`.
pub fn replace_with(old: &Handle, replacement: &Handle) {
    insert_before(old, replacement);
    detach(old);
}
