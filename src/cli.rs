//! Command-line interface for yardcheck.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::config::{self, Config, CONFIG_FILE_NAMES};
use crate::detect::Checker;
use crate::manifest::{self, Runner};
use crate::report::{self, TypeReport};
use crate::types::{self, StyleMode};

/// Exit codes.
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILED: i32 = 1;
pub const EXIT_ERROR: i32 = 2;

const DEFAULT_CONFIG: &str = include_str!("templates/default.yaml");

/// Check YARD type annotations in documentation comments.
///
/// yardcheck reads declaration manifests (`*.decl.yaml`, `*.decl.json`)
/// produced by a source parser and reports malformed type lists,
/// collection style and shape mistakes, and `@param` tags that do not
/// match the documented method's arguments.
#[derive(Parser)]
#[command(name = "yardcheck")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Check declaration manifests
    #[command(visible_alias = "check")]
    Lint(LintArgs),
    /// Parse one type expression and show its canonical form
    Type(TypeArgs),
    /// Write a default configuration file
    Init(InitArgs),
}

/// Arguments for the lint command.
#[derive(Parser)]
pub struct LintArgs {
    /// Manifest file or directory to search for manifests
    pub path: PathBuf,

    /// Path to configuration YAML file (default: auto-discover)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Output format: pretty or json
    #[arg(short, long, default_value = "pretty")]
    pub format: String,

    /// Collection style, overriding the configuration: short or long
    #[arg(short, long)]
    pub style: Option<StyleMode>,
}

/// Arguments for the type command.
#[derive(Parser)]
pub struct TypeArgs {
    /// Type expression, e.g. "Hash<Symbol, String>"
    pub expr: String,

    /// Collection style: short or long
    #[arg(short, long, default_value = "long")]
    pub style: StyleMode,

    /// Output format: pretty or json
    #[arg(short, long, default_value = "pretty")]
    pub format: String,
}

/// Arguments for the init command.
#[derive(Parser)]
pub struct InitArgs {
    /// Output file path
    #[arg(short, long, default_value = "yardcheck.yaml")]
    pub output: PathBuf,
}

fn check_format(format: &str) -> bool {
    if format != "pretty" && format != "json" {
        eprintln!("Error: invalid format {:?}, must be 'pretty' or 'json'", format);
        return false;
    }
    true
}

/// Look for a configuration next to the working directory, then in `path`.
fn discover_config(path: &Path) -> Option<PathBuf> {
    let search_dir = if path.is_dir() {
        path
    } else {
        path.parent().unwrap_or(Path::new("."))
    };
    config::discover(Path::new(".")).or_else(|| config::discover(search_dir))
}

/// Load the configuration; `None` means the defaults were used.
fn load_config(args: &LintArgs) -> anyhow::Result<(Config, Option<PathBuf>)> {
    let path = match &args.config {
        Some(p) => Some(p.clone()),
        None => discover_config(&args.path),
    };
    let config = match &path {
        Some(p) => Config::parse_file(p)
            .map_err(|e| anyhow::anyhow!("error parsing {}: {}", p.display(), e))?,
        None => {
            debug!(
                "no configuration found (looked for {}), using defaults",
                CONFIG_FILE_NAMES.join(", ")
            );
            Config::default()
        }
    };
    config::validate(&config).map_err(|e| anyhow::anyhow!("invalid configuration: {}", e))?;
    Ok((config, path))
}

/// Run the lint command.
pub fn run_lint(args: &LintArgs) -> anyhow::Result<i32> {
    if !check_format(&args.format) {
        return Ok(EXIT_ERROR);
    }

    let (mut config, config_path) = match load_config(args) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("Error: {}", e);
            return Ok(EXIT_ERROR);
        }
    };
    if let Some(style) = args.style {
        config.style = style;
    }

    let abs_path = match args.path.canonicalize() {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Error: cannot access path {:?}: {}", args.path, e);
            return Ok(EXIT_ERROR);
        }
    };

    let excluded = config.exclusion_set()?;
    let manifests = manifest::collect_manifests(&abs_path, &excluded)?;
    if manifests.is_empty() {
        warn!(path = %abs_path.display(), "no manifests found");
        eprintln!("Warning: no manifests to check");
        return Ok(EXIT_SUCCESS);
    }

    let style = config.style;
    let runner = Runner::new(Checker::new(config));
    let result = runner.run(&manifests);

    let config_str = config_path
        .map(|p| p.to_string_lossy().to_string())
        .unwrap_or_else(|| "(defaults)".to_string());
    let path_str = args.path.to_string_lossy().to_string();

    match args.format.as_str() {
        "json" => report::write_json(&path_str, &config_str, style, &result)?,
        _ => report::write_pretty(&path_str, &config_str, style, &result),
    }

    if result.has_errors() {
        Ok(EXIT_FAILED)
    } else {
        Ok(EXIT_SUCCESS)
    }
}

/// Parse `expr` and collect its rendering and shape mismatches.
pub fn type_report(expr: &str, style: StyleMode) -> TypeReport {
    let mut report = TypeReport {
        input: expr.to_string(),
        style,
        rendered: None,
        corrected: None,
        mismatches: Vec::new(),
        error: None,
    };

    match types::parse(expr) {
        Ok(nodes) => {
            report.rendered = Some(types::render_list(&nodes, style));
            report.mismatches = nodes
                .iter()
                .flat_map(types::check_shapes)
                .map(|m| m.kind.message().to_string())
                .collect();
            if !report.mismatches.is_empty() {
                let corrected: Vec<_> = nodes
                    .iter()
                    .map(|n| types::correct_shapes(n).into_owned())
                    .collect();
                report.corrected = Some(types::render_list(&corrected, style));
            }
        }
        Err(e) => report.error = Some(format!("{} (offset {})", e, e.offset)),
    }
    report
}

/// Run the type command.
pub fn run_type(args: &TypeArgs) -> anyhow::Result<i32> {
    if !check_format(&args.format) {
        return Ok(EXIT_ERROR);
    }

    let report = type_report(&args.expr, args.style);
    match args.format.as_str() {
        "json" => report::write_type_json(&report)?,
        _ => report::write_type_pretty(&report),
    }

    if report.is_clean() {
        Ok(EXIT_SUCCESS)
    } else {
        Ok(EXIT_FAILED)
    }
}

/// Run the init command.
pub fn run_init(args: &InitArgs) -> anyhow::Result<i32> {
    if args.output.exists() {
        eprintln!("Error: file already exists: {}", args.output.display());
        eprintln!("Remove it or use --output to specify a different path");
        return Ok(EXIT_ERROR);
    }

    if let Some(parent) = args.output.parent() {
        if !parent.as_os_str().is_empty() && parent != Path::new(".") {
            if let Err(e) = std::fs::create_dir_all(parent) {
                eprintln!("Error: failed to create directory: {}", e);
                return Ok(EXIT_ERROR);
            }
        }
    }

    if let Err(e) = std::fs::write(&args.output, DEFAULT_CONFIG) {
        eprintln!("Error: failed to write configuration: {}", e);
        return Ok(EXIT_ERROR);
    }

    println!("Created {}", args.output.display());
    println!();
    println!("Next steps:");
    println!("  1. Edit {} to choose a style and rule severities", args.output.display());
    println!("  2. Run: yardcheck lint . --config {}", args.output.display());

    Ok(EXIT_SUCCESS)
}
