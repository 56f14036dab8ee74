//! Conversion options
//!
//! Options can be built in code or loaded from TOML:
//!
//! ```toml
//! max_repeat = 50
//! max_depth = 128
//! thumbnail_entry = "Thumbnails/thumbnail.png"
//! fallback = true
//! ```

use serde::{Deserialize, Serialize};

/// Default primary content member
pub const CONTENT_ENTRY: &str = "content.xml";
/// Default shared styles member
pub const STYLES_ENTRY: &str = "styles.xml";
/// Default thumbnail member used by the fallback
pub const THUMBNAIL_ENTRY: &str = "Thumbnails/thumbnail.png";
/// Default bound on repeated rows, columns and cells
pub const DEFAULT_MAX_REPEAT: usize = 100;
/// Default bound on element nesting in parsed members
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Options controlling a single conversion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConvertOptions {
    /// Archive path of the content tree
    pub content_entry: String,
    /// Archive path of the styles tree
    pub styles_entry: String,
    /// Archive path of the fallback thumbnail
    pub thumbnail_entry: String,
    /// Upper bound for `number-*-repeated` expansion
    pub max_repeat: usize,
    /// Deepest element nesting accepted in `content.xml` and `styles.xml`
    pub max_depth: usize,
    /// Render the thumbnail when full conversion fails
    pub fallback: bool,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            content_entry: CONTENT_ENTRY.to_string(),
            styles_entry: STYLES_ENTRY.to_string(),
            thumbnail_entry: THUMBNAIL_ENTRY.to_string(),
            max_repeat: DEFAULT_MAX_REPEAT,
            max_depth: DEFAULT_MAX_DEPTH,
            fallback: true,
        }
    }
}

impl ConvertOptions {
    /// Parse options from a TOML string; missing keys keep their defaults
    pub fn from_toml_str(toml_str: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(toml_str)
    }
}
