//! yardcheck - YARD type annotation checker.
//!
//! Checks the type lists written in YARD documentation tags
//! (`# @param [Array<String>] names`) and cross-checks `@param` tags
//! against the documented method's arguments.
//!
//! # Architecture
//!
//! - `types`: the type-expression language (parser, renderer, shape checks)
//! - `docstring`: comment lines and tag extraction
//! - `declaration`: declarations and parameters handed over by the host
//! - `detect`: the checks and the `Checker` pipeline that runs them
//! - `config`: YAML configuration
//! - `manifest`: loading declaration manifests from disk
//! - `report`: output formatting (pretty, JSON)
//!
//! The library never reads source files itself. A host parser locates
//! comments and parameter lists and either calls [`Checker`] directly or
//! writes manifests for the CLI.

pub mod cli;
pub mod config;
pub mod declaration;
pub mod detect;
pub mod docstring;
pub mod logging;
pub mod manifest;
pub mod report;
pub mod types;

pub use config::{Config, PrototypeOrdering};
pub use declaration::{
    DeclarationInfo, DeclarationKind, DefaultLiteral, ParameterDescriptor, ParameterKind,
};
pub use detect::{CheckResult, Checker, Correction, Finding, Rule, Severity, Span};
pub use docstring::{extract_tags, CommentBlock, CommentLine, Tag, TagKind};
pub use manifest::{Manifest, ManifestError, Runner};
pub use types::{parse, render, StyleMode, TypeNode, TypeSyntaxError};
