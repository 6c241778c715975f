//! deadcss CLI - dead CSS selector detector.
//!
//! Features:
//! - Recursive discovery of stylesheets, HTML documents and source files
//! - DOM matching against every HTML document found
//! - Id/class grepping in every source file found
//! - Rayon-powered parallel analysis of independent stylesheets
//! - Plain text or JSON output, optional JSON export

use anyhow::{anyhow, Result};
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use deadcss_core::{
    collect_files_with_excludes, init_structured_logging, load_config, load_config_file,
    parse_extension_list, print_json, print_plain, Deadcss, DeadcssConfig, EvidencePolicy,
    ExtensionFilter, LogFormat, Report,
};

const CSS_EXTENSIONS: &[&str] = &[".css"];

#[derive(Parser, Debug)]
#[command(author, version, about = "Detect CSS selectors with no evidence of use")]
pub struct Cli {
    /// Stylesheets, HTML documents, source files or directories to scan
    #[arg(default_value = ".")]
    paths: Vec<PathBuf>,

    /// Source file extensions searched for ids and classes (comma separated, empty disables)
    #[arg(short = 'e', long = "srcext", value_name = "EXT")]
    src_extensions: Option<String>,

    /// HTML document extensions used for DOM matching (comma separated)
    #[arg(long = "htmlext", value_name = "EXT")]
    html_extensions: Option<String>,

    /// Additional directory names to skip
    #[arg(long, num_args = 1..)]
    exclude: Vec<String>,

    /// Output results in JSON format
    #[arg(long)]
    json: bool,

    /// Write the JSON report to a file
    #[arg(long, value_name = "FILE")]
    json_export: Option<String>,

    /// Abort on the first unreadable file instead of skipping it
    #[arg(long)]
    fail_fast: bool,

    /// Configuration file (defaults to ./deadcss.toml when present)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log debug details
    #[arg(short, long)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    log_json: bool,
}

/// Effective settings after merging config file and flags.
#[derive(Debug, Clone, PartialEq)]
struct Settings {
    src_extensions: Vec<String>,
    html_extensions: Vec<String>,
    exclude_dirs: Vec<String>,
    policy: EvidencePolicy,
    json: bool,
    json_export: Option<PathBuf>,
}

/// Security: Validates output file paths to prevent path traversal attacks.
///
/// Rejects:
/// - Absolute paths (must be relative to current directory)
/// - Paths containing `..` (parent directory traversal)
/// - Paths with null bytes (injection attacks)
fn validate_output_path(path: &str) -> Result<PathBuf> {
    if path.contains('\0') {
        return Err(anyhow!("Output path contains null bytes"));
    }

    let p = PathBuf::from(path);

    if p.is_absolute() {
        return Err(anyhow!(
            "Output path must be relative, not absolute: {}",
            path
        ));
    }

    if p
        .components()
        .any(|component| matches!(component, std::path::Component::ParentDir))
    {
        return Err(anyhow!(
            "Path traversal (..) not allowed in output paths: {}",
            path
        ));
    }

    Ok(p)
}

/// Flags override the config file, which overrides the defaults.
fn resolve_settings(cli: &Cli, config: &DeadcssConfig) -> Result<Settings> {
    let src_extensions = match &cli.src_extensions {
        Some(list) => parse_extension_list(list)?,
        None => config.src_extensions(),
    };
    let html_extensions = match &cli.html_extensions {
        Some(list) => parse_extension_list(list)?,
        None => config.html_extensions(),
    };

    let mut exclude_dirs = config.exclude_dirs();
    exclude_dirs.extend(cli.exclude.iter().cloned());

    let policy = if cli.fail_fast {
        EvidencePolicy::Abort
    } else {
        config.evidence_policy()
    };

    let json_export = cli
        .json_export
        .as_deref()
        .or(config.json_export())
        .map(validate_output_path)
        .transpose()?;

    Ok(Settings {
        src_extensions,
        html_extensions,
        exclude_dirs,
        policy,
        json: cli.json || config.wants_json(),
        json_export,
    })
}

/// Discover inputs under `roots` and run the analysis.
fn run(roots: &[PathBuf], settings: &Settings) -> Result<Report> {
    let excludes: Vec<&str> = settings.exclude_dirs.iter().map(String::as_str).collect();

    let css_files =
        collect_files_with_excludes(roots, &ExtensionFilter::of(CSS_EXTENSIONS), &excludes)?;
    let html_files = collect_files_with_excludes(
        roots,
        &ExtensionFilter::of(&settings.html_extensions),
        &excludes,
    )?;
    let src_files = collect_files_with_excludes(
        roots,
        &ExtensionFilter::of(&settings.src_extensions),
        &excludes,
    )?;

    info!(count = css_files.len(), "working with CSS files");
    info!(count = html_files.len(), "working with HTML files");
    info!(count = src_files.len(), "working with source files");
    debug!(css = ?css_files, html = ?html_files, src = ?src_files, "collected files");

    let css_files: Vec<PathBuf> = css_files.into_iter().collect();
    let report = Deadcss::new()
        .evidence_policy(settings.policy)
        .with_html_files(html_files)
        .with_src_files(src_files)
        .analyze(&css_files)?;
    Ok(report)
}

fn load_settings(cli: &Cli) -> Result<Settings> {
    let config = match &cli.config {
        Some(path) => load_config_file(path)?,
        None => load_config(Path::new("."))?.unwrap_or_default(),
    };
    resolve_settings(cli, &config)
}

fn main() -> Result<()> {
    std::panic::set_hook(Box::new(|info| {
        eprintln!("[PANIC] deadcss internal error: {}", info);
        eprintln!("[PANIC] The process will exit with code 2.");
    }));

    let cli = Cli::parse();

    let format = if cli.log_json {
        LogFormat::Json
    } else {
        LogFormat::Text
    };
    init_structured_logging(format, if cli.verbose { "debug" } else { "info" });

    let settings = load_settings(&cli)?;
    debug!(settings = ?settings, "effective settings");

    let report = run(&cli.paths, &settings)?;

    if settings.json {
        print_json(&report)?;
    } else {
        print_plain(&report);
    }

    if let Some(path) = &settings.json_export {
        report.write_json(path)?;
        eprintln!("JSON report written to: {}", path.display());
    }

    // Exit code (CI-friendly)
    std::process::exit(if report.has_unused() { 1 } else { 0 });
}
