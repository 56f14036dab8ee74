//! Document kinds and their body selectors
//!
//! Each OpenDocument kind keeps its content under a different element of
//! `office:body`. A [`BodySelector`] finds that element and drives the
//! renderer over it.

use std::fmt;
use std::str::FromStr;

use crate::archive::OdfArchive;
use crate::error::{OdfError, Result};
use crate::render::{render_content, RenderContext};
use crate::xml::Node;

/// Class of the container wrapping each presentation slide
pub const PAGE_CLASS: &str = "__page";

/// Locates the semantic body of a parsed document and renders it
///
/// Implemented by [`DocumentKind`] and by any closure with the same shape.
pub trait BodySelector {
    /// Render the body of `content` (the parsed `content.xml`)
    ///
    /// `styles` is the parsed `styles.xml`, for selectors that need master
    /// pages or other shared definitions.
    fn render_body(&self, content: &Node, styles: &Node, ctx: &RenderContext<'_>) -> Result<String>;
}

impl<F> BodySelector for F
where
    F: Fn(&Node, &Node, &RenderContext<'_>) -> Result<String>,
{
    fn render_body(&self, content: &Node, styles: &Node, ctx: &RenderContext<'_>) -> Result<String> {
        self(content, styles, ctx)
    }
}

/// The three supported document kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentKind {
    /// Word processing (`.odt`)
    Text,
    /// Presentation (`.odp`)
    Presentation,
    /// Spreadsheet (`.ods`)
    Spreadsheet,
}

impl DocumentKind {
    /// Kind declared by a package media type, templates included
    pub fn from_mimetype(mimetype: &str) -> Option<Self> {
        let subtype = mimetype
            .trim()
            .strip_prefix("application/vnd.oasis.opendocument.")?;
        match subtype {
            "text" | "text-template" => Some(Self::Text),
            "presentation" | "presentation-template" => Some(Self::Presentation),
            "spreadsheet" | "spreadsheet-template" => Some(Self::Spreadsheet),
            _ => None,
        }
    }

    /// Kind implied by a file extension (case-insensitive, without the dot)
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_ascii_lowercase().as_str() {
            "odt" | "ott" => Some(Self::Text),
            "odp" | "otp" => Some(Self::Presentation),
            "ods" | "ots" => Some(Self::Spreadsheet),
            _ => None,
        }
    }

    /// Kind declared by the package's `mimetype` member
    pub fn detect(archive: &OdfArchive) -> Option<Self> {
        archive.mimetype().as_deref().and_then(Self::from_mimetype)
    }

    /// Local name of the body element under `office:body`
    pub fn body_element(self) -> &'static str {
        match self {
            Self::Text => "office:text",
            Self::Presentation => "office:presentation",
            Self::Spreadsheet => "office:spreadsheet",
        }
    }

    /// Short lowercase name
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Presentation => "presentation",
            Self::Spreadsheet => "spreadsheet",
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocumentKind {
    type Err = OdfError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "text" => Ok(Self::Text),
            "presentation" => Ok(Self::Presentation),
            "spreadsheet" => Ok(Self::Spreadsheet),
            other => Self::from_extension(other)
                .ok_or_else(|| OdfError::Malformed(format!("unknown document kind: {}", other))),
        }
    }
}

impl BodySelector for DocumentKind {
    fn render_body(&self, content: &Node, _styles: &Node, ctx: &RenderContext<'_>) -> Result<String> {
        let root = body_root(content, self.body_element())?;
        let mut out = String::new();

        match self {
            Self::Text | Self::Spreadsheet => {
                for child in &root.children {
                    render_content(child, ctx, &mut out);
                }
            }
            Self::Presentation => {
                for page in root.elements().filter(|n| n.is("draw:page")) {
                    out.push_str("<div class=\"");
                    out.push_str(PAGE_CLASS);
                    out.push_str("\">");
                    for child in &page.children {
                        render_content(child, ctx, &mut out);
                    }
                    out.push_str("</div>");
                }
            }
        }

        Ok(out)
    }
}

/// `office:body/<body_element>`, or a structural error
pub fn body_root<'a>(content: &'a Node, body_element: &str) -> Result<&'a Node> {
    content
        .child("office:body")
        .and_then(|body| body.child(body_element))
        .ok_or_else(|| OdfError::MissingNode(format!("office:body/{}", body_element)))
}
