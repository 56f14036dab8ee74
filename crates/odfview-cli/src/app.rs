//! CLI Application logic
//!
//! Contains the command-line interface implementation.

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use quick_xml::escape::escape;
use tracing::{debug, info, warn};

use odfview_core::{
    extract_archive, load_trees, resolve_styles, ConvertOptions, DocumentKind, OdfArchive,
};

/// Configuration files picked up from the working directory when `--config`
/// is not given
const CONFIG_CANDIDATES: &[&str] = &["odfview.toml", ".odfview.toml"];

/// Document kind selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum KindArg {
    /// Use the package mimetype, then the file extension
    #[default]
    Auto,
    /// Word processing document
    Text,
    /// Slides
    Presentation,
    /// Sheets
    Spreadsheet,
}

#[derive(Parser)]
#[command(name = "odfview")]
#[command(author, version, about = "OpenDocument to HTML preview", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert an ODT, ODP or ODS file to an HTML fragment
    Convert {
        /// Input OpenDocument file
        input: PathBuf,

        /// Output HTML file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Document kind
        #[arg(short, long, value_enum, default_value = "auto")]
        kind: KindArg,

        /// Configuration file path
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Wrap the fragment in a complete HTML page
        #[arg(long)]
        standalone: bool,
    },

    /// Show the detected kind, page layout and resolved styles
    Inspect {
        /// Input OpenDocument file
        input: PathBuf,

        /// Configuration file path
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

/// Run the CLI application
///
/// Parses arguments, installs logging and dispatches to the command.
pub fn run_cli() -> Result<()> {
    let cli = Cli::parse();

    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .try_init();

    match cli.command {
        Commands::Convert {
            input,
            output,
            kind,
            config,
            standalone,
        } => {
            convert_command(&input, output.as_deref(), kind, config.as_deref(), standalone)?;
        }
        Commands::Inspect { input, config } => {
            print!("{}", inspect_command(&input, config.as_deref())?);
        }
    }

    Ok(())
}

/// Execute the convert command
pub fn convert_command(
    input: &Path,
    output: Option<&Path>,
    kind: KindArg,
    config: Option<&Path>,
    standalone: bool,
) -> Result<()> {
    let options = load_options(config)?;
    let html = convert_file(input, kind, &options, standalone)?;

    match output {
        Some(path) => {
            fs::write(path, &html)
                .with_context(|| format!("Failed to write output: {}", path.display()))?;
            info!(output = %path.display(), bytes = html.len(), "wrote HTML");
        }
        None => println!("{}", html),
    }

    Ok(())
}

/// Convert one file to HTML
///
/// I/O problems are errors; a document that cannot be rendered still yields
/// the thumbnail (or nothing) per `options.fallback`.
pub fn convert_file(
    input: &Path,
    kind: KindArg,
    options: &ConvertOptions,
    standalone: bool,
) -> Result<String> {
    let archive = open_archive(input)?;
    let kind = resolve_kind(kind, &archive, input);
    info!(input = %input.display(), %kind, "converting");

    let fragment = extract_archive(&archive, &kind, options);
    if fragment.is_empty() {
        info!("nothing could be rendered");
    }

    Ok(if standalone {
        standalone_page(&page_title(input), &fragment)
    } else {
        fragment
    })
}

/// Execute the inspect command, returning the report
pub fn inspect_command(input: &Path, config: Option<&Path>) -> Result<String> {
    let options = load_options(config)?;
    let archive = open_archive(input)?;
    let kind = resolve_kind(KindArg::Auto, &archive, input);

    let trees = load_trees(&archive, &options)
        .with_context(|| format!("Failed to parse document: {}", input.display()))?;
    let (table, layout) = resolve_styles(&trees.styles, &trees.content);

    let mut report = String::new();
    writeln!(report, "odfview v{}", odfview_core::VERSION)?;
    writeln!(report, "File: {}", input.display())?;
    writeln!(report, "Kind: {}", kind)?;
    match layout {
        Some(layout) => writeln!(
            report,
            "Page: {} x {}",
            layout.css_width(),
            layout.css_height()
        )?,
        None => writeln!(report, "Page: none")?,
    }
    writeln!(report, "Styles: {}", table.len())?;
    for (name, css) in table.iter() {
        if css.is_empty() {
            writeln!(report, "  {}", name)?;
        } else {
            writeln!(report, "  {} {{{}}}", name, css)?;
        }
    }

    Ok(report)
}

/// Explicit kind, else the package mimetype, else the extension, else text
pub fn resolve_kind(kind: KindArg, archive: &OdfArchive, input: &Path) -> DocumentKind {
    match kind {
        KindArg::Text => DocumentKind::Text,
        KindArg::Presentation => DocumentKind::Presentation,
        KindArg::Spreadsheet => DocumentKind::Spreadsheet,
        KindArg::Auto => DocumentKind::detect(archive)
            .or_else(|| {
                input
                    .extension()
                    .and_then(|ext| ext.to_str())
                    .and_then(DocumentKind::from_extension)
            })
            .unwrap_or_else(|| {
                debug!(input = %input.display(), "kind not detected, assuming text");
                DocumentKind::Text
            }),
    }
}

/// Wrap a fragment in a minimal page, centred at half width
pub fn standalone_page(title: &str, fragment: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{}</title>\n</head>\n<body>\n<div style=\"width:50%;margin:0 auto\">{}</div>\n</body>\n</html>\n",
        escape(title),
        fragment
    )
}

fn page_title(input: &Path) -> String {
    input
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "odfview".to_string())
}

fn open_archive(input: &Path) -> Result<OdfArchive> {
    if !input.exists() {
        anyhow::bail!("Input file not found: {}", input.display());
    }
    let bytes =
        fs::read(input).with_context(|| format!("Failed to read input: {}", input.display()))?;
    OdfArchive::from_bytes(&bytes)
        .with_context(|| format!("Failed to open OpenDocument package: {}", input.display()))
}

/// Load options from a config file or use defaults
fn load_options(config_path: Option<&Path>) -> Result<ConvertOptions> {
    match config_path {
        Some(path) => {
            if !path.exists() {
                anyhow::bail!("Config file not found: {}", path.display());
            }
            let content = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config: {}", path.display()))?;
            ConvertOptions::from_toml_str(&content)
                .with_context(|| format!("Failed to parse config: {}", path.display()))
        }
        None => discover_options(Path::new(".")),
    }
}

/// First parseable candidate config in `dir`, else defaults
///
/// A candidate that fails to parse is reported and skipped.
fn discover_options(dir: &Path) -> Result<ConvertOptions> {
    for candidate in CONFIG_CANDIDATES {
        let path = dir.join(candidate);
        if !path.exists() {
            continue;
        }
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        match ConvertOptions::from_toml_str(&content) {
            Ok(options) => {
                debug!(config = %path.display(), "using configuration");
                return Ok(options);
            }
            Err(err) => warn!(config = %path.display(), error = %err, "ignoring invalid configuration"),
        }
    }
    Ok(ConvertOptions::default())
}
