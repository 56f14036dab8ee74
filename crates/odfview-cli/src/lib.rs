//! odfview CLI - Command-line interface library
//!
//! This library provides the CLI functionality for odfview:
//! - Convert: render an ODT, ODP or ODS file to HTML
//! - Inspect: show the detected kind, page geometry and resolved styles
//!
//! # Binary Usage
//!
//! ```bash
//! # Write an HTML fragment next to the input
//! odfview convert slides.odp --output slides.html
//!
//! # Full page, forcing the spreadsheet body
//! odfview convert export.zip --kind spreadsheet --standalone
//!
//! # Debug logging
//! RUST_LOG=odfview_core=debug odfview inspect report.odt
//! ```

pub mod app;

pub use app::{
    convert_command, convert_file, inspect_command, resolve_kind, run_cli, standalone_page,
    KindArg,
};
