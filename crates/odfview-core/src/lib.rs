//! # odfview-core
//!
//! OpenDocument (ODT, ODP, ODS) to HTML+CSS rendering for odfview.
//!
//! This crate provides functionality to:
//! - Unpack OpenDocument packages and parse their XML members
//! - Resolve the style cascade into CSS classes
//! - Render document bodies to a self-contained HTML fragment
//! - Fall back to the package thumbnail when a document cannot be rendered
//!
//! ## Example: Converting a Document
//!
//! ```no_run
//! use odfview_core::{extract_document, DocumentKind, OdfArchive};
//!
//! let bytes = std::fs::read("report.odt")?;
//! let kind = DocumentKind::detect(&OdfArchive::from_bytes(&bytes)?)
//!     .unwrap_or(DocumentKind::Text);
//! let html = extract_document(&bytes, &kind);
//! println!("{}", html);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod archive;
pub mod body;
pub mod config;
pub mod error;
pub mod extract;
pub mod properties;
pub mod render;
pub mod styles;
pub mod xml;

#[cfg(test)]
pub(crate) mod test_utils;

pub use archive::{ArchiveAccess, OdfArchive};
pub use body::{BodySelector, DocumentKind};
pub use config::ConvertOptions;
pub use error::{ErrorKind, OdfError, Result};
pub use extract::{
    extract_archive, extract_document, extract_document_with, load_trees, render_archive,
    try_extract_document, DocumentTrees,
};
pub use properties::{map_style_to_css, PropertyGroup, StyleRecord};
pub use render::{render, RenderContext};
pub use styles::{resolve_styles, PageLayout, ResolvedStyleTable};
pub use xml::{Content, Node, QName};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
