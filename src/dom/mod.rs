//! # Document Model
//!
//! An owned, structurally comparable tree of elements. The router never holds
//! live references into a platform DOM: fetched markup is parsed (through
//! `scraper`) into these values, diffed, and swapped into the [`Window`].
//!
//! ```text
//! Document
//! ├── head: Element      // <head>, reconciled by head::merge_head
//! └── body: Element      // <body>, swapped by body::replace_body
//! ```
//!
//! Equality is structural: two independently parsed `<meta charset="utf-8">`
//! nodes compare equal. Attributes live in a `BTreeMap`, so their source
//! order never matters.
//!
//! ## Modules
//!
//! - [`head`]: head partitioning and merging
//! - [`body`]: body replacement and script activation
//! - [`window`]: the environment the router mutates

pub mod body;
pub mod head;
pub mod window;

use std::collections::BTreeMap;
use std::fmt;

use scraper::{ElementRef, Html};

pub use window::{ScrollPosition, Window};

/// Elements serialized without a closing tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param",
    "source", "track", "wbr",
];

/// Elements whose text children are emitted verbatim.
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
    Comment(String),
}

impl Node {
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(el) => Some(el),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub name: String,
    pub attrs: BTreeMap<String, String>,
    pub children: Vec<Node>,
}

/// Child-index path from a root element down to one of its descendants.
///
/// Indices count every child node (text and comments included), so a path is
/// only meaningful against the tree it was produced from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct NodePath(Vec<usize>);

impl NodePath {
    pub fn root() -> Self {
        Self(Vec::new())
    }

    pub fn child(&self, index: usize) -> Self {
        let mut steps = self.0.clone();
        steps.push(index);
        Self(steps)
    }

    pub fn parent(&self) -> Option<Self> {
        let (_, rest) = self.0.split_last()?;
        Some(Self(rest.to_vec()))
    }

    pub fn steps(&self) -> &[usize] {
        &self.0
    }
}

impl From<Vec<usize>> for NodePath {
    fn from(steps: Vec<usize>) -> Self {
        Self(steps)
    }
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into().to_ascii_lowercase(),
            attrs: BTreeMap::new(),
            children: Vec::new(),
        }
    }

    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attr(name, value);
        self
    }

    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(Node::Element(child));
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.children.push(Node::Text(text.into()));
        self
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attrs.contains_key(name)
    }

    pub fn set_attr(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.attrs.insert(name.into(), value.into());
    }

    pub fn is(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }

    /// Direct element children, skipping text and comments.
    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(Node::as_element)
    }

    /// Concatenated text of every descendant text node.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        collect_text(self, &mut out);
        out
    }

    /// First element in preorder (self included) matching `pred`.
    pub fn find(&self, pred: &dyn Fn(&Element) -> bool) -> Option<&Element> {
        if pred(self) {
            return Some(self);
        }
        self.child_elements().find_map(|child| child.find(pred))
    }

    pub fn find_mut(&mut self, pred: &dyn Fn(&Element) -> bool) -> Option<&mut Element> {
        if pred(self) {
            return Some(self);
        }
        for child in &mut self.children {
            if let Node::Element(el) = child
                && let Some(found) = el.find_mut(pred)
            {
                return Some(found);
            }
        }
        None
    }

    /// Every element in preorder (self included) matching `pred`.
    pub fn find_all(&self, pred: &dyn Fn(&Element) -> bool) -> Vec<&Element> {
        let mut found = Vec::new();
        self.walk(&mut |el| {
            if pred(el) {
                found.push(el);
            }
        });
        found
    }

    pub fn walk<'a>(&'a self, visit: &mut dyn FnMut(&'a Element)) {
        visit(self);
        for child in self.child_elements() {
            child.walk(visit);
        }
    }

    /// Preorder mutable visit. Children are visited after `visit` returns, so a
    /// visitor that replaces the element sees the replacement's children.
    pub fn walk_mut(&mut self, visit: &mut dyn FnMut(&mut Element)) {
        visit(self);
        for child in &mut self.children {
            if let Node::Element(el) = child {
                el.walk_mut(visit);
            }
        }
    }

    /// Path to the first element in preorder matching `pred`.
    pub fn locate(&self, pred: &dyn Fn(&Element) -> bool) -> Option<NodePath> {
        if pred(self) {
            return Some(NodePath::root());
        }
        self.children.iter().enumerate().find_map(|(index, child)| {
            let el = child.as_element()?;
            let inner = el.locate(pred)?;
            let mut steps = vec![index];
            steps.extend_from_slice(inner.steps());
            Some(NodePath(steps))
        })
    }

    pub fn at_path(&self, path: &NodePath) -> Option<&Element> {
        path.steps()
            .iter()
            .try_fold(self, |el, &index| el.children.get(index)?.as_element())
    }

    pub fn at_path_mut(&mut self, path: &NodePath) -> Option<&mut Element> {
        let mut current = self;
        for &index in path.steps() {
            current = match current.children.get_mut(index)? {
                Node::Element(el) => el,
                _ => return None,
            };
        }
        Some(current)
    }

    /// The element at `path` followed by each of its ancestors up to (and
    /// including) `self`, innermost first.
    pub fn ancestry(&self, path: &NodePath) -> Vec<(NodePath, &Element)> {
        let mut chain = Vec::new();
        let mut cursor = Some(path.clone());
        while let Some(at) = cursor {
            if let Some(el) = self.at_path(&at) {
                chain.push((at.clone(), el));
            }
            cursor = at.parent();
        }
        chain
    }

    pub fn to_html(&self) -> String {
        let mut out = String::new();
        write_element(self, &mut out);
        out
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_html())
    }
}

fn collect_text(el: &Element, out: &mut String) {
    for child in &el.children {
        match child {
            Node::Text(text) => out.push_str(text),
            Node::Element(inner) => collect_text(inner, out),
            Node::Comment(_) => {}
        }
    }
}

fn write_element(el: &Element, out: &mut String) {
    out.push('<');
    out.push_str(&el.name);
    for (name, value) in &el.attrs {
        out.push(' ');
        out.push_str(name);
        out.push_str("=\"");
        out.push_str(&escape(value, true));
        out.push('"');
    }
    out.push('>');
    if VOID_ELEMENTS.contains(&el.name.as_str()) {
        return;
    }
    let raw = RAW_TEXT_ELEMENTS.contains(&el.name.as_str());
    for child in &el.children {
        match child {
            Node::Element(inner) => write_element(inner, out),
            Node::Text(text) if raw => out.push_str(text),
            Node::Text(text) => out.push_str(&escape(text, false)),
            Node::Comment(comment) => {
                out.push_str("<!--");
                out.push_str(comment);
                out.push_str("-->");
            }
        }
    }
    out.push_str("</");
    out.push_str(&el.name);
    out.push('>');
}

fn escape(text: &str, attribute: bool) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' if !attribute => out.push_str("&lt;"),
            '>' if !attribute => out.push_str("&gt;"),
            '"' if attribute => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

// ============================================================================
// Documents
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub head: Element,
    pub body: Element,
}

impl Document {
    pub fn new(head: Element, body: Element) -> Self {
        Self { head, body }
    }

    /// Parses an HTML string into a document.
    ///
    /// The parser recovers from malformed markup the way browsers do; the only
    /// failure is a document without a head or body (a frameset page).
    pub fn parse(html: &str) -> Result<Self, DocumentError> {
        let parsed = Html::parse_document(html);
        let root = parsed.root_element();

        let mut head = None;
        let mut body = None;
        for child in root.children().filter_map(ElementRef::wrap) {
            match child.value().name() {
                "head" => head = Some(convert(child)),
                "body" => body = Some(convert(child)),
                _ => {}
            }
        }

        Ok(Self {
            head: head.ok_or(DocumentError::MissingSection("head"))?,
            body: body.ok_or(DocumentError::MissingSection("body"))?,
        })
    }

    pub fn title(&self) -> Option<String> {
        self.head
            .child_elements()
            .find(|el| el.is("title"))
            .map(|el| el.text_content().trim().to_string())
    }

    /// Element anywhere in the document whose `id` matches `#id` or `id`.
    pub fn element_by_id(&self, selector: &str) -> Option<&Element> {
        let id = selector.strip_prefix('#').unwrap_or(selector);
        let matches = |el: &Element| el.attr("id") == Some(id);
        self.head.find(&matches).or_else(|| self.body.find(&matches))
    }

    pub fn to_html(&self) -> String {
        format!("<!DOCTYPE html><html>{}{}</html>", self.head, self.body)
    }
}

fn convert(el: ElementRef<'_>) -> Element {
    let value = el.value();
    let attrs = value
        .attrs()
        .map(|(name, val)| (name.to_string(), val.to_string()))
        .collect();
    let children = el
        .children()
        .filter_map(|child| match child.value() {
            scraper::Node::Element(_) => ElementRef::wrap(child).map(|e| Node::Element(convert(e))),
            scraper::Node::Text(text) => Some(Node::Text(text.to_string())),
            scraper::Node::Comment(comment) => Some(Node::Comment(comment.to_string())),
            _ => None,
        })
        .collect();

    Element {
        name: value.name().to_string(),
        attrs,
        children,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentError {
    /// The parsed markup has no `<head>` or `<body>` section.
    MissingSection(&'static str),
}

impl fmt::Display for DocumentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentError::MissingSection(name) => {
                write!(f, "document has no <{name}> section")
            }
        }
    }
}

impl std::error::Error for DocumentError {}
