//! Package → HTML extraction pipeline
//!
//! [`extract_document`] is the single entry point that never fails: the
//! package is opened, `content.xml` and `styles.xml` are parsed, styles are
//! resolved, and the body selector renders the markup. Any error along the
//! way is logged and replaced by the package thumbnail.
//!
//! # Example
//!
//! ```no_run
//! use odfview_core::{extract_document, DocumentKind};
//!
//! let bytes = std::fs::read("slides.odp")?;
//! let html = extract_document(&bytes, &DocumentKind::Presentation);
//! println!("{}", html);
//! # Ok::<(), std::io::Error>(())
//! ```

use tracing::{debug, warn};

use crate::archive::{ArchiveAccess, OdfArchive};
use crate::body::{BodySelector, PAGE_CLASS};
use crate::config::ConvertOptions;
use crate::error::Result;
use crate::render::{RenderContext, CELL_CLASS};
use crate::styles::{resolve_styles, PageLayout, ResolvedStyleTable};
use crate::xml::{self, Node};

/// Rules emitted ahead of the per-style classes
pub const BASELINE_CSS: &str = "table{width:100%;border-collapse:collapse;table-layout:fixed}\
td{border:1px solid black;vertical-align:top;padding:0}\
img{max-width:100%;max-height:100%;object-fit:contain}";

/// The two parsed structural trees of a package
#[derive(Debug, Clone)]
pub struct DocumentTrees {
    /// Parsed `content.xml`
    pub content: Node,
    /// Parsed `styles.xml`
    pub styles: Node,
}

/// Extract and parse the content and styles members
pub fn load_trees(archive: &dyn ArchiveAccess, options: &ConvertOptions) -> Result<DocumentTrees> {
    let content = xml::parse_with_limit(
        &archive.extract_text(&options.content_entry)?,
        options.max_depth,
    )?;
    let styles = xml::parse_with_limit(
        &archive.extract_text(&options.styles_entry)?,
        options.max_depth,
    )?;
    Ok(DocumentTrees { content, styles })
}

/// Convert a package to `<style>…</style>` + markup, falling back to the
/// thumbnail on any failure
pub fn extract_document<S>(bytes: &[u8], selector: &S) -> String
where
    S: BodySelector + ?Sized,
{
    extract_document_with(bytes, selector, &ConvertOptions::default())
}

/// [`extract_document`] with explicit options
pub fn extract_document_with<S>(bytes: &[u8], selector: &S, options: &ConvertOptions) -> String
where
    S: BodySelector + ?Sized,
{
    match OdfArchive::from_bytes(bytes) {
        Ok(archive) => extract_archive(&archive, selector, options),
        Err(err) => {
            warn!(error = %err, kind = ?err.kind(), "cannot open package, nothing to render");
            String::new()
        }
    }
}

/// Convert an already opened package, falling back to the thumbnail on any
/// failure
pub fn extract_archive<S>(archive: &dyn ArchiveAccess, selector: &S, options: &ConvertOptions) -> String
where
    S: BodySelector + ?Sized,
{
    match render_archive(archive, selector, options) {
        Ok(html) => html,
        Err(err) => {
            warn!(error = %err, kind = ?err.kind(), "failed to render document, using thumbnail instead");
            if options.fallback {
                fallback_markup(archive, options)
            } else {
                String::new()
            }
        }
    }
}

/// Fallible conversion without the thumbnail fallback
pub fn try_extract_document<S>(bytes: &[u8], selector: &S, options: &ConvertOptions) -> Result<String>
where
    S: BodySelector + ?Sized,
{
    let archive = OdfArchive::from_bytes(bytes)?;
    render_archive(&archive, selector, options)
}

/// Full structural conversion of an opened package
pub fn render_archive<S>(archive: &dyn ArchiveAccess, selector: &S, options: &ConvertOptions) -> Result<String>
where
    S: BodySelector + ?Sized,
{
    let trees = load_trees(archive, options)?;
    let (table, layout) = resolve_styles(&trees.styles, &trees.content);
    debug!(styles = table.len(), has_layout = layout.is_some(), "styles resolved");

    let ctx = RenderContext::new(&table, archive)
        .with_layout(layout.as_ref())
        .with_max_repeat(options.max_repeat);
    let body = selector.render_body(&trees.content, &trees.styles, &ctx)?;

    let mut html = build_stylesheet(&table, layout.as_ref());
    html.push_str(&body);
    Ok(html)
}

/// A single full-width image from the package thumbnail, or an empty string
/// when the package has none
pub fn fallback_markup(archive: &dyn ArchiveAccess, options: &ConvertOptions) -> String {
    match archive.extract_base64(&options.thumbnail_entry) {
        Ok(data) => format!(
            r#"<img src="data:image/png;base64,{}" style="width:100%">"#,
            data
        ),
        Err(err) => {
            warn!(error = %err, "no thumbnail available for fallback");
            String::new()
        }
    }
}

// =============================================================================
// Stylesheet
// =============================================================================

/// Build the `<style>` block: baseline rules, the slide container, then one
/// class rule per style with declarations
pub fn build_stylesheet(table: &ResolvedStyleTable, layout: Option<&PageLayout>) -> String {
    let mut css = String::from("<style>");
    css.push_str(BASELINE_CSS);

    css.push('.');
    css.push_str(CELL_CLASS);
    css.push_str("{white-space:pre-wrap;overflow:hidden}");

    css.push('.');
    css.push_str(PAGE_CLASS);
    css.push_str("{position:relative;overflow:hidden;");
    match layout {
        Some(layout) => {
            css.push_str("width:");
            css.push_str(&layout.css_width());
            css.push_str(";height:");
            css.push_str(&layout.css_height());
        }
        None => css.push_str("width:100%;aspect-ratio:16/9"),
    }
    css.push('}');

    for (name, declarations) in table.iter() {
        if declarations.is_empty() {
            continue;
        }
        css.push('.');
        css.push_str(&class_selector(name));
        css.push('{');
        css.push_str(declarations);
        css.push('}');
    }

    css.push_str("</style>");
    css
}

/// Escape a style name for use as a CSS class selector
///
/// OpenDocument names may start with a digit or contain `.`, spaces and
/// other characters that are not valid in an identifier.
pub fn class_selector(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for (i, c) in name.chars().enumerate() {
        let leading_digit = c.is_ascii_digit()
            && (i == 0 || (i == 1 && name.starts_with('-')));
        if leading_digit {
            out.push_str(&format!("\\3{} ", c));
        } else if c.is_ascii_alphanumeric() || c == '-' || c == '_' || !c.is_ascii() {
            out.push(c);
        } else {
            out.push('\\');
            out.push(c);
        }
    }
    out
}
