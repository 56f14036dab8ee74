//! Archive handling for OpenDocument packages
//!
//! ODT, ODP and ODS files are ZIP archives containing XML members
//! (`content.xml`, `styles.xml`, ...) and binary resources (`Pictures/...`,
//! `Thumbnails/thumbnail.png`).

use std::cell::RefCell;
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::io::{Cursor, Read, Seek};
use std::path::Path;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use tracing::debug;
use zip::read::ZipArchive;
use zip::result::ZipError;

use crate::error::{OdfError, Result};

/// Path of the package media type member
pub const MIMETYPE_PATH: &str = "mimetype";

/// Read access to the members of a document package
///
/// Both methods fail with [`OdfError::MissingEntry`] when the path is absent.
pub trait ArchiveAccess {
    /// Extract a member as UTF-8 text
    fn extract_text(&self, path: &str) -> Result<String>;

    /// Extract a member as standard base64
    fn extract_base64(&self, path: &str) -> Result<String>;
}

/// An OpenDocument package
///
/// Opening reads only the central directory. Members are inflated when
/// requested, so a damaged member fails only the lookups that touch it.
#[derive(Default)]
pub struct OdfArchive {
    /// The package container, when backed by ZIP data
    zip: Option<RefCell<ZipArchive<Cursor<Vec<u8>>>>>,
    /// Members set in memory; these shadow the container
    files: HashMap<String, Vec<u8>>,
}

impl OdfArchive {
    /// Create an empty archive
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a package file
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_vec(std::fs::read(path)?)
    }

    /// Open a package held in memory
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Self::from_vec(bytes.to_vec())
    }

    /// Create from any reader that implements Read + Seek
    pub fn from_reader<R: Read + Seek>(mut reader: R) -> Result<Self> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        Self::from_vec(bytes)
    }

    fn from_vec(bytes: Vec<u8>) -> Result<Self> {
        let zip = ZipArchive::new(Cursor::new(bytes))?;
        debug!(members = zip.len(), "package opened");
        Ok(Self {
            zip: Some(RefCell::new(zip)),
            files: HashMap::new(),
        })
    }

    /// Read a member's contents
    ///
    /// Paths are accepted in the forms used by `xlink:href` (`./Pictures/a.png`,
    /// `/Pictures/a.png`) as well as plain member names. A member that fails
    /// to decompress or fails its checksum is an error for this call only.
    pub fn read(&self, path: &str) -> Result<Vec<u8>> {
        let name = normalize_path(path);
        if let Some(contents) = self.files.get(name) {
            return Ok(contents.clone());
        }
        let missing = || OdfError::MissingEntry(path.to_string());
        if name.is_empty() || name.ends_with('/') {
            return Err(missing());
        }
        let zip = self.zip.as_ref().ok_or_else(missing)?;
        let mut zip = zip.borrow_mut();
        let mut file = match zip.by_name(name) {
            Ok(file) => file,
            Err(ZipError::FileNotFound) => return Err(missing()),
            Err(err) => return Err(err.into()),
        };
        let mut contents = Vec::new();
        file.read_to_end(&mut contents)?;
        Ok(contents)
    }

    /// Check if a member exists in the archive
    pub fn contains(&self, path: &str) -> bool {
        let name = normalize_path(path);
        self.files.contains_key(name)
            || self
                .zip
                .as_ref()
                .is_some_and(|zip| zip.borrow().file_names().any(|member| member == name))
    }

    /// List all members, directories excluded, in sorted order
    pub fn file_list(&self) -> Vec<String> {
        let mut names: BTreeSet<String> = self.files.keys().cloned().collect();
        if let Some(zip) = &self.zip {
            names.extend(
                zip.borrow()
                    .file_names()
                    .filter(|name| !name.ends_with('/'))
                    .map(str::to_string),
            );
        }
        names.into_iter().collect()
    }

    /// The package media type declared in the `mimetype` member
    pub fn mimetype(&self) -> Option<String> {
        let bytes = self.read(MIMETYPE_PATH).ok()?;
        String::from_utf8(bytes)
            .ok()
            .map(|mimetype| mimetype.trim().to_string())
    }

    /// Set or update a file's contents
    pub fn set(&mut self, path: impl Into<String>, contents: Vec<u8>) {
        self.files.insert(path.into(), contents);
    }

    /// Set a file's contents from a string
    pub fn set_string(&mut self, path: impl Into<String>, contents: impl Into<String>) {
        self.files.insert(path.into(), contents.into().into_bytes());
    }
}

impl fmt::Debug for OdfArchive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OdfArchive")
            .field("members", &self.file_list())
            .finish()
    }
}

impl ArchiveAccess for OdfArchive {
    fn extract_text(&self, path: &str) -> Result<String> {
        String::from_utf8(self.read(path)?).map_err(|source| OdfError::Encoding {
            path: path.to_string(),
            source,
        })
    }

    fn extract_base64(&self, path: &str) -> Result<String> {
        Ok(STANDARD.encode(self.read(path)?))
    }
}

fn normalize_path(path: &str) -> &str {
    path.trim_start_matches("./").trim_start_matches('/')
}
