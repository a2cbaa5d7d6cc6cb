//! Output formatting for yardcheck results.
//!
//! Supports two output formats:
//! - Pretty: colored terminal output for human readability
//! - JSON: structured output for programmatic consumption

use colored::*;
use serde::{Deserialize, Serialize};

use crate::detect::{CheckResult, Finding, Severity};
use crate::types::StyleMode;

// =============================================================================
// JSON Format
// =============================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct JsonReport {
    pub version: String,
    pub path: String,
    pub config: String,
    pub style: StyleMode,
    pub passed: bool,
    pub declarations_scanned: usize,
    pub findings: Vec<JsonFinding>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skipped_manifests: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct JsonFinding {
    pub file: String,
    #[serde(flatten)]
    pub finding: Finding,
}

pub fn build_json_report(
    path: &str,
    config_path: &str,
    style: StyleMode,
    result: &CheckResult,
) -> JsonReport {
    JsonReport {
        version: env!("CARGO_PKG_VERSION").to_string(),
        path: path.to_string(),
        config: config_path.to_string(),
        style,
        passed: !result.has_errors(),
        declarations_scanned: result.scanned,
        findings: result
            .findings()
            .map(|(file, finding)| JsonFinding {
                file: file.to_string(),
                finding: finding.clone(),
            })
            .collect(),
        skipped_manifests: result.skipped.clone(),
    }
}

/// Write results in JSON format.
pub fn write_json(
    path: &str,
    config_path: &str,
    style: StyleMode,
    result: &CheckResult,
) -> anyhow::Result<()> {
    let report = build_json_report(path, config_path, style, result);
    let json = serde_json::to_string_pretty(&report)?;
    println!("{}", json);
    Ok(())
}

// =============================================================================
// Pretty Format
// =============================================================================

/// Write results in pretty (human-readable) format.
pub fn write_pretty(path: &str, config_path: &str, style: StyleMode, result: &CheckResult) {
    println!();
    print!("  ");
    print!("{}", "yardcheck".cyan().bold());
    println!(" v{}", env!("CARGO_PKG_VERSION"));
    println!();

    print!("  {}", "Scanning: ".dimmed());
    println!("{}", path);
    print!("  {}", "Config:   ".dimmed());
    println!("{}", config_path);
    print!("  {}", "Style:    ".dimmed());
    println!("{}", style);
    println!();

    let count = result.finding_count();
    if count > 0 {
        println!("  {} ({}):", "Findings".bold(), count);
        println!();
        for (file, finding) in result.findings() {
            write_finding(file, finding);
        }
    }

    if !result.skipped.is_empty() {
        println!("  {} ({}):", "Skipped manifests".dimmed(), result.skipped.len());
        for path in &result.skipped {
            println!("    {}", path.dimmed());
        }
        println!();
    }

    write_final_status(result);
    println!();
}

fn write_finding(file: &str, finding: &Finding) {
    write_severity_tag(&finding.severity);
    print!("   ");
    print!("{:<24}", finding.rule.as_str().dimmed());
    print!("{}", file.blue());
    print!("{}", format!(":{}", finding.span).dimmed());
    println!();

    println!("            {}", finding.message);
    if let Some(correction) = &finding.correction {
        let replacement = correction.replacement.trim_start_matches('\n');
        let verb = if correction.span.is_empty() {
            "insert"
        } else {
            "replace with"
        };
        println!("            {} {}", format!("{}:", verb).dimmed(), replacement.green());
    }
    println!();
}

fn write_severity_tag(severity: &Severity) {
    match severity {
        Severity::Error => print!("    {} ", "ERROR".red()),
        Severity::Warning => print!("    {} ", "WARN ".yellow()),
        Severity::Info => print!("    {} ", "INFO ".blue()),
    }
}

fn write_final_status(result: &CheckResult) {
    print!(
        "  {}",
        format!("Declarations: {}", result.scanned).dimmed()
    );
    print!("  Findings: {}  ", result.finding_count());
    if result.has_errors() {
        print!("{}", "FAILED".red());
    } else {
        print!("{}", "PASSED".green());
    }
    println!();
}

// =============================================================================
// Type expression report (`yardcheck type`)
// =============================================================================

/// Outcome of checking a single type expression.
#[derive(Debug, Serialize, Deserialize)]
pub struct TypeReport {
    pub input: String,
    pub style: StyleMode,
    /// Canonical rendering of the input as written.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rendered: Option<String>,
    /// Rendering with every shape correction applied.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub corrected: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub mismatches: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TypeReport {
    pub fn is_clean(&self) -> bool {
        self.error.is_none() && self.mismatches.is_empty()
    }
}

pub fn write_type_pretty(report: &TypeReport) {
    if let Some(error) = &report.error {
        println!("{} {}", "SyntaxError".red(), error);
        return;
    }
    if let Some(rendered) = &report.rendered {
        println!("{}", rendered);
    }
    for mismatch in &report.mismatches {
        println!("  {} {}", "WARN ".yellow(), mismatch);
    }
    if let Some(corrected) = &report.corrected {
        println!("  {} {}", "did you mean:".dimmed(), corrected.green());
    }
}

pub fn write_type_json(report: &TypeReport) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(report)?);
    Ok(())
}
