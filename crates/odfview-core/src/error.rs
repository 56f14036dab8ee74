//! Error types for OpenDocument operations

use thiserror::Error;

/// Errors that can occur while reading or rendering an OpenDocument package
#[derive(Error, Debug)]
pub enum OdfError {
    /// Error reading the ZIP container
    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// Error reading archive members
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error parsing XML content
    #[error("XML parsing error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// Malformed attribute in XML content
    #[error("XML attribute error: {0}")]
    XmlAttr(#[from] quick_xml::events::attributes::AttrError),

    /// Text member is not valid UTF-8
    #[error("Encoding error in {path}: {source}")]
    Encoding {
        /// Archive path of the offending member
        path: String,
        /// Underlying decoding error
        source: std::string::FromUtf8Error,
    },

    /// Referenced archive entry not found
    #[error("Archive entry not found: {0}")]
    MissingEntry(String),

    /// Expected element absent from a parsed tree
    #[error("Missing element: {0}")]
    MissingNode(String),

    /// Structurally invalid markup (no root, unbalanced tags)
    #[error("Malformed document: {0}")]
    Malformed(String),
}

/// Broad failure classes, used for diagnostics at the fallback boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// An expected node or attribute is absent
    Structural,
    /// A referenced archive entry is absent
    Resource,
    /// The container or markup could not be decoded
    Format,
}

impl OdfError {
    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            OdfError::MissingNode(_) => ErrorKind::Structural,
            OdfError::MissingEntry(_) => ErrorKind::Resource,
            OdfError::Archive(_)
            | OdfError::Io(_)
            | OdfError::Xml(_)
            | OdfError::XmlAttr(_)
            | OdfError::Encoding { .. }
            | OdfError::Malformed(_) => ErrorKind::Format,
        }
    }
}

/// Result type for OpenDocument operations
pub type Result<T> = std::result::Result<T, OdfError>;
