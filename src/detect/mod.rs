//! Checks over documentation tags and the findings they produce.

mod checker;
mod meaningless_tag;
mod mismatch_name;
mod tag_position;
mod tag_types;
mod types;

pub use checker::{Checker, Settings};
pub use meaningless_tag::check_meaningless_tags;
pub use mismatch_name::check_mismatch_name;
pub use tag_position::check_tag_position;
pub use tag_types::check_tag_types;
pub use types::{CheckResult, Correction, FileFindings, Finding, Rule, Severity, Span};
