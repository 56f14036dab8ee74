//! Generic XML tree parsing (content.xml, styles.xml)
//!
//! OpenDocument members are plain namespaced XML. This module turns them into
//! an immutable [`Node`] tree that keeps qualified names split into prefix and
//! local part, attributes in document order, and mixed element/text children.
//!
//! Prefixes are kept as written. OpenDocument producers use the conventional
//! `office:`, `style:`, `text:`, `table:`, `draw:` ... prefixes, and the
//! renderer dispatches on those.

use std::fmt;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::config::DEFAULT_MAX_DEPTH;
use crate::error::{OdfError, Result};

/// A namespace-qualified XML name such as `text:p`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QName {
    /// Namespace prefix (`text` in `text:p`)
    pub prefix: Option<String>,
    /// Local part (`p` in `text:p`)
    pub local: String,
}

impl QName {
    /// Split a raw qualified name at its first colon
    pub fn parse(raw: &str) -> Self {
        match raw.split_once(':') {
            Some((prefix, local)) => Self {
                prefix: Some(prefix.to_string()),
                local: local.to_string(),
            },
            None => Self {
                prefix: None,
                local: raw.to_string(),
            },
        }
    }

    /// Compare against a qualified name written as `prefix:local`
    pub fn is(&self, qualified: &str) -> bool {
        match qualified.split_once(':') {
            Some((prefix, local)) => self.prefix.as_deref() == Some(prefix) && self.local == local,
            None => self.prefix.is_none() && self.local == qualified,
        }
    }
}

impl fmt::Display for QName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.prefix {
            Some(prefix) => write!(f, "{}:{}", prefix, self.local),
            None => f.write_str(&self.local),
        }
    }
}

/// A child of an element: either a nested element or a literal text run
#[derive(Debug, Clone, PartialEq)]
pub enum Content {
    /// Nested element
    Element(Node),
    /// Literal (already unescaped) text
    Text(String),
}

/// A parsed XML element
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    /// Qualified tag name
    pub name: QName,
    /// Attributes in document order, keyed by qualified name
    attributes: Vec<(QName, String)>,
    /// Ordered children
    pub children: Vec<Content>,
}

impl Node {
    /// Create an element without attributes or children
    pub fn new(name: &str) -> Self {
        Self {
            name: QName::parse(name),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Builder: add an attribute
    pub fn with_attr(mut self, name: &str, value: impl Into<String>) -> Self {
        self.attributes.push((QName::parse(name), value.into()));
        self
    }

    /// Builder: append a child element
    pub fn with_child(mut self, child: Node) -> Self {
        self.children.push(Content::Element(child));
        self
    }

    /// Builder: append a text run
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.push_text(text.into());
        self
    }

    /// Whether this element has the given qualified name
    pub fn is(&self, qualified: &str) -> bool {
        self.name.is(qualified)
    }

    /// Look up an attribute by qualified name
    pub fn attr(&self, qualified: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(name, _)| name.is(qualified))
            .map(|(_, value)| value.as_str())
    }

    /// All attributes in document order
    pub fn attrs(&self) -> impl Iterator<Item = (&QName, &str)> {
        self.attributes.iter().map(|(name, value)| (name, value.as_str()))
    }

    /// Child elements, skipping text runs
    pub fn elements(&self) -> impl Iterator<Item = &Node> {
        self.children.iter().filter_map(|c| match c {
            Content::Element(node) => Some(node),
            Content::Text(_) => None,
        })
    }

    /// First child element with the given qualified name
    pub fn child(&self, qualified: &str) -> Option<&Node> {
        self.elements().find(|n| n.is(qualified))
    }

    /// Depth-first search (self included) for the first matching element
    pub fn find<F>(&self, predicate: F) -> Option<&Node>
    where
        F: Fn(&Node) -> bool + Copy,
    {
        if predicate(self) {
            return Some(self);
        }
        self.elements().find_map(|child| child.find(predicate))
    }

    /// Concatenated text of this subtree
    pub fn text(&self) -> String {
        let mut out = String::new();
        collect_text(self, &mut out);
        out
    }

    fn push_text(&mut self, text: String) {
        if text.is_empty() {
            return;
        }
        if let Some(Content::Text(last)) = self.children.last_mut() {
            last.push_str(&text);
        } else {
            self.children.push(Content::Text(text));
        }
    }
}

fn collect_text(node: &Node, out: &mut String) {
    for child in &node.children {
        match child {
            Content::Text(text) => out.push_str(text),
            Content::Element(el) => collect_text(el, out),
        }
    }
}

/// Parse an XML document into its root element
///
/// Whitespace is preserved: text runs inside OpenDocument paragraphs are
/// significant. Content after the first root element is ignored.
pub fn parse(xml: &str) -> Result<Node> {
    parse_with_limit(xml, DEFAULT_MAX_DEPTH)
}

/// [`parse`] rejecting documents nested deeper than `max_depth` elements
///
/// Every consumer of the tree recurses over it, so the bound is enforced
/// while the tree is still a flat stack.
pub fn parse_with_limit(xml: &str, max_depth: usize) -> Result<Node> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(false);

    let mut stack: Vec<Node> = Vec::new();
    let mut root: Option<Node> = None;

    loop {
        match reader.read_event()? {
            Event::Start(ref e) => {
                check_depth(&stack, max_depth)?;
                stack.push(start_node(e)?);
            }
            Event::Empty(ref e) => {
                check_depth(&stack, max_depth)?;
                let node = start_node(e)?;
                attach(&mut stack, &mut root, node);
            }
            Event::End(_) => {
                let node = stack
                    .pop()
                    .ok_or_else(|| OdfError::Malformed("unexpected closing tag".to_string()))?;
                attach(&mut stack, &mut root, node);
            }
            Event::Text(ref e) => {
                if let Some(parent) = stack.last_mut() {
                    let text = e.unescape()?;
                    parent.push_text(text.into_owned());
                }
            }
            Event::CData(e) => {
                if let Some(parent) = stack.last_mut() {
                    let text = String::from_utf8_lossy(&e.into_inner()).into_owned();
                    parent.push_text(text);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(OdfError::Malformed(format!("unclosed element <{}>", open.name)));
    }
    root.ok_or_else(|| OdfError::Malformed("no root element".to_string()))
}

fn check_depth(stack: &[Node], max_depth: usize) -> Result<()> {
    if stack.len() >= max_depth {
        return Err(OdfError::Malformed(format!(
            "elements nested deeper than {} levels",
            max_depth
        )));
    }
    Ok(())
}

fn start_node(e: &BytesStart) -> Result<Node> {
    let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
    let mut node = Node::new(&name);
    for attr in e.attributes() {
        let attr = attr?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr.unescape_value()?.into_owned();
        node.attributes.push((QName::parse(&key), value));
    }
    Ok(node)
}

fn attach(stack: &mut [Node], root: &mut Option<Node>, node: Node) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(Content::Element(node)),
        None => {
            if root.is_none() {
                *root = Some(node);
            }
        }
    }
}
