//! HTML rendering of OpenDocument element trees
//!
//! [`render`] walks a [`Node`] depth-first and emits one HTML fragment for the
//! whole subtree. Every element maps to its local name by default
//! (`text:span` → `<span>`); a fixed set of OpenDocument elements is
//! translated to their HTML counterparts. Styles are referenced by class name
//! only; the CSS itself is emitted once by [`crate::extract`].
//!
//! Rendering never fails. A missing style drops the `class` attribute, a
//! missing archive entry drops the `src` attribute.

use quick_xml::escape::{escape, partial_escape};
use tracing::debug;

use crate::archive::ArchiveAccess;
use crate::config::DEFAULT_MAX_REPEAT;
use crate::properties::sanitize_value;
use crate::styles::{PageLayout, ResolvedStyleTable};
use crate::xml::{Content, Node};

/// Inline style forced on every paragraph so floating frames anchor to it
pub const PARAGRAPH_STYLE: &str = "position:relative; margin:0; padding:0; min-height:1em;";

/// Class of the block wrapping table cell content
pub const CELL_CLASS: &str = "__cell";

/// HTML elements written without a closing tag
const VOID_TAGS: &[&str] = &["img", "col", "br"];

/// Local names that HTML treats as raw text, active content or document
/// structure; unknown elements with these names are written as `span`
const UNSAFE_TAGS: &[&str] = &[
    "script", "style", "iframe", "frame", "frameset", "object", "embed", "applet", "template",
    "noscript", "noembed", "noframes", "textarea", "title", "xmp", "plaintext", "listing", "svg",
    "math", "base", "link", "meta", "form", "input", "button", "select", "option", "html", "head",
    "body",
];

/// URL schemes never forwarded into `href`
const UNSAFE_SCHEMES: &[&str] = &["javascript:", "vbscript:", "data:"];

/// Read-only state shared by the whole traversal
#[derive(Clone, Copy)]
pub struct RenderContext<'a> {
    /// Resolved class table
    pub styles: &'a ResolvedStyleTable,
    /// Page geometry, when the document declares one
    pub layout: Option<&'a PageLayout>,
    /// Access to binary package members
    pub archive: &'a dyn ArchiveAccess,
    /// Upper bound for repeated rows, columns, cells and spaces
    pub max_repeat: usize,
}

impl<'a> RenderContext<'a> {
    /// Create a context without page geometry
    pub fn new(styles: &'a ResolvedStyleTable, archive: &'a dyn ArchiveAccess) -> Self {
        Self {
            styles,
            layout: None,
            archive,
            max_repeat: DEFAULT_MAX_REPEAT,
        }
    }

    /// Attach page geometry
    pub fn with_layout(mut self, layout: Option<&'a PageLayout>) -> Self {
        self.layout = layout;
        self
    }

    /// Set the repeat bound (at least 1)
    pub fn with_max_repeat(mut self, max_repeat: usize) -> Self {
        self.max_repeat = max_repeat.max(1);
        self
    }

    /// Interpret a repeat attribute: absent, zero or invalid means once
    fn repeat_count(&self, raw: Option<&str>) -> usize {
        let count = raw
            .and_then(|raw| raw.trim().parse::<usize>().ok())
            .unwrap_or(1)
            .max(1);
        if count > self.max_repeat {
            debug!(count, max = self.max_repeat, "repeat count clamped");
            return self.max_repeat;
        }
        count
    }
}

/// Render a node and its subtree to an HTML fragment
pub fn render(node: &Node, ctx: &RenderContext<'_>) -> String {
    let mut out = String::new();
    render_into(node, ctx, &mut out);
    out
}

/// Render an element or text child, appending to `out`
///
/// Text runs are HTML-escaped.
pub fn render_content(content: &Content, ctx: &RenderContext<'_>, out: &mut String) {
    match content {
        Content::Text(text) => out.push_str(&partial_escape(text.as_str())),
        Content::Element(node) => render_into(node, ctx, out),
    }
}

/// Render a node and its subtree, appending to `out`
pub fn render_into(node: &Node, ctx: &RenderContext<'_>, out: &mut String) {
    let element = match map_node(node, ctx) {
        Output::Nothing => return,
        Output::Literal(text) => {
            out.push_str(&text);
            return;
        }
        Output::Element(element) => element,
    };

    let start = out.len();
    write_open(&element, out);
    if !VOID_TAGS.contains(&element.tag) {
        if element.cell {
            out.push_str("<div class=\"");
            out.push_str(CELL_CLASS);
            out.push_str("\">");
        }
        for child in &node.children {
            render_content(child, ctx, out);
        }
        if element.cell {
            out.push_str("</div>");
        }
        out.push_str("</");
        out.push_str(element.tag);
        out.push('>');
    }

    if element.repeat > 1 {
        let fragment = out[start..].to_string();
        for _ in 1..element.repeat {
            out.push_str(&fragment);
        }
    }
}

// =============================================================================
// Element mapping
// =============================================================================

enum Output<'n> {
    /// Node and subtree produce nothing
    Nothing,
    /// Fixed markup replacing the node
    Literal(String),
    /// Regular element
    Element(Element<'n>),
}

/// The HTML element emitted for one node
struct Element<'n> {
    tag: &'n str,
    class: Option<&'n str>,
    style: String,
    attributes: Vec<(&'static str, String)>,
    repeat: usize,
    cell: bool,
}

fn map_node<'n>(node: &'n Node, ctx: &RenderContext<'_>) -> Output<'n> {
    let mut element = Element {
        tag: node.name.local.as_str(),
        class: style_name(node).filter(|name| ctx.styles.contains(name)),
        style: String::new(),
        attributes: Vec::new(),
        repeat: 1,
        cell: false,
    };

    match (node.name.prefix.as_deref(), node.name.local.as_str()) {
        (Some("office"), "forms")
        | (Some("text"), "sequence-decls")
        | (Some("table"), "covered-table-cell") => return Output::Nothing,

        // Spreadsheet metadata stored beside the sheets
        (Some("table"), "calculation-settings")
        | (Some("table"), "named-expressions")
        | (Some("table"), "database-ranges")
        | (Some("table"), "content-validations") => return Output::Nothing,

        (Some("text"), "s") => {
            let count = ctx.repeat_count(node.attr("text:c"));
            return Output::Literal("&nbsp;".repeat(count));
        }
        (Some("text"), "tab") => return Output::Literal("&emsp;".to_string()),
        (Some("text"), "line-break") => element.tag = "br",

        (Some("text"), "h") => element.tag = "h1",
        (Some("text"), "list") => element.tag = "ul",
        (Some("text"), "list-item") => element.tag = "li",
        (Some("text"), "p") => {
            element.tag = "p";
            element.style.push_str(PARAGRAPH_STYLE);
        }
        (Some("text"), "a") => {
            element.tag = "a";
            match node.attr("xlink:href") {
                Some(href) if is_safe_href(href) => {
                    element.attributes.push(("href", href.to_string()));
                }
                Some(href) => debug!(href, "link target dropped"),
                None => {}
            }
        }

        (Some("table"), "table-columns") | (Some("table"), "table-header-columns") => {
            element.tag = "colgroup";
        }
        (Some("table"), "table-header-rows") => element.tag = "thead",
        (Some("table"), "table-rows") => element.tag = "tbody",
        (Some("table"), "table-column") => {
            element.tag = "col";
            element.repeat = ctx.repeat_count(node.attr("table:number-columns-repeated"));
        }
        (Some("table"), "table-row") => {
            element.tag = "tr";
            element.repeat = ctx.repeat_count(node.attr("table:number-rows-repeated"));
        }
        (Some("table"), "table-cell") => {
            element.tag = "td";
            element.repeat = ctx.repeat_count(node.attr("table:number-columns-repeated"));
            element.cell = true;
            element.attributes.push((
                "rowspan",
                span(node.attr("table:number-rows-spanned")).to_string(),
            ));
            element.attributes.push((
                "colspan",
                span(node.attr("table:number-columns-spanned")).to_string(),
            ));
        }

        (Some("draw"), "image") => {
            let Some(mime) = node
                .attr("draw:mime-type")
                .or_else(|| node.attr("loext:mime-type"))
            else {
                debug!("image without MIME type skipped");
                return Output::Nothing;
            };
            element.tag = "img";
            match node.attr("xlink:href") {
                Some(href) => match ctx.archive.extract_base64(href) {
                    Ok(data) => element
                        .attributes
                        .push(("src", format!("data:{};base64,{}", mime, data))),
                    Err(err) => debug!(href, error = %err, "image data unavailable"),
                },
                None => debug!("image without xlink:href"),
            }
            element.style.push_str("max-width:100%;");
        }
        (Some("draw"), "frame") => {
            element.tag = "div";
            element.style = frame_style(node);
        }

        _ => {
            if UNSAFE_TAGS
                .iter()
                .any(|tag| element.tag.eq_ignore_ascii_case(tag))
            {
                debug!(element = %node.name, "unsafe element name written as span");
                element.tag = "span";
            }
        }
    }

    Output::Element(element)
}

/// The node's own style reference: the `style-name` attribute in the
/// element's namespace, else any `*:style-name`
fn style_name(node: &Node) -> Option<&str> {
    let mut fallback = None;
    for (name, value) in node.attrs() {
        if name.local != "style-name" {
            continue;
        }
        if name.prefix == node.name.prefix {
            return Some(value);
        }
        fallback.get_or_insert(value);
    }
    fallback
}

/// Browsers ignore ASCII whitespace and control characters inside a scheme
fn is_safe_href(href: &str) -> bool {
    let scheme: String = href
        .chars()
        .filter(|c| !c.is_ascii_whitespace() && !c.is_ascii_control())
        .take(16)
        .collect::<String>()
        .to_ascii_lowercase();
    !UNSAFE_SCHEMES.iter().any(|unsafe_scheme| scheme.starts_with(unsafe_scheme))
}

fn span(raw: Option<&str>) -> usize {
    raw.and_then(|raw| raw.trim().parse::<usize>().ok())
        .filter(|&n| n > 0)
        .unwrap_or(1)
}

/// Absolute placement of a frame; coordinates are already unit-suffixed
fn frame_style(node: &Node) -> String {
    let x = node.attr("svg:x").map(sanitize_value);
    let y = node.attr("svg:y").map(sanitize_value);
    let mut style = format!(
        "position:absolute;left:{};top:{};",
        x.as_deref().unwrap_or("0"),
        y.as_deref().unwrap_or("0")
    );
    for (attr, property) in [
        ("svg:width", "width"),
        ("svg:height", "height"),
        ("draw:z-index", "z-index"),
    ] {
        if let Some(value) = node.attr(attr) {
            style.push_str(property);
            style.push(':');
            style.push_str(&sanitize_value(value));
            style.push(';');
        }
    }
    style
}

fn write_open(element: &Element<'_>, out: &mut String) {
    out.push('<');
    out.push_str(element.tag);
    if let Some(class) = element.class {
        push_attr(out, "class", class);
    }
    if !element.style.is_empty() {
        push_attr(out, "style", &element.style);
    }
    for (name, value) in &element.attributes {
        push_attr(out, name, value);
    }
    out.push('>');
}

fn push_attr(out: &mut String, name: &str, value: &str) {
    out.push(' ');
    out.push_str(name);
    out.push_str("=\"");
    out.push_str(&escape(value));
    out.push('"');
}
