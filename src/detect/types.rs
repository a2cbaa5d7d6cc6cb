//! Core types for findings.

use serde::{Deserialize, Serialize};

use crate::docstring::{CommentLine, TagText};

/// Severity levels for findings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Info => write!(f, "info"),
        }
    }
}

impl std::str::FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "error" => Ok(Severity::Error),
            "warning" => Ok(Severity::Warning),
            "info" => Ok(Severity::Info),
            _ => Err(format!("unknown severity: {}", s)),
        }
    }
}

/// Rule names for the different finding kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rule {
    /// Collection written in the other style (`<T>` vs `Array<T>`).
    CollectionStyle,
    /// Reserved collection name on the wrong bracket shape.
    CollectionType,
    /// Type list that does not parse.
    TagTypeSyntax,
    /// Bracketed text where the tag grammar expects none.
    TagTypePosition,
    /// `@param` naming no method argument.
    UnknownParamName,
    /// `@param` without a name or without types.
    IncompleteTag,
    /// Method argument with no `@param`.
    UndocumentedArgument,
    /// `@param` on a class, module or constant.
    MeaninglessTag,
}

impl Rule {
    pub const ALL: [Rule; 8] = [
        Rule::CollectionStyle,
        Rule::CollectionType,
        Rule::TagTypeSyntax,
        Rule::TagTypePosition,
        Rule::UnknownParamName,
        Rule::IncompleteTag,
        Rule::UndocumentedArgument,
        Rule::MeaninglessTag,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Rule::CollectionStyle => "collection_style",
            Rule::CollectionType => "collection_type",
            Rule::TagTypeSyntax => "tag_type_syntax",
            Rule::TagTypePosition => "tag_type_position",
            Rule::UnknownParamName => "unknown_param_name",
            Rule::IncompleteTag => "incomplete_tag",
            Rule::UndocumentedArgument => "undocumented_argument",
            Rule::MeaninglessTag => "meaningless_tag",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Rule::ALL.iter().copied().find(|r| r.as_str() == s)
    }

    pub fn default_severity(&self) -> Severity {
        match self {
            Rule::TagTypeSyntax | Rule::UnknownParamName => Severity::Error,
            Rule::CollectionStyle => Severity::Info,
            _ => Severity::Warning,
        }
    }
}

impl std::fmt::Display for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A source range on one line. Columns are 0-based byte offsets, half-open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Span {
    /// 1-based line.
    pub line: usize,
    pub start_column: usize,
    pub end_column: usize,
}

impl Span {
    pub fn new(line: usize, start_column: usize, end_column: usize) -> Self {
        Self {
            line,
            start_column,
            end_column: end_column.max(start_column),
        }
    }

    /// A zero-width span, used for insertions.
    pub fn point(line: usize, column: usize) -> Self {
        Self::new(line, column, column)
    }

    /// The whole comment, marker included.
    pub fn of_comment(line: &CommentLine) -> Self {
        Self::new(line.line, line.column, line.end_column())
    }

    pub fn of_text(text: &TagText) -> Self {
        Self::new(text.line, text.columns.start, text.columns.end)
    }

    pub fn is_empty(&self) -> bool {
        self.start_column == self.end_column
    }
}

impl std::fmt::Display for Span {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.start_column + 1)
    }
}

/// Replace the text in `span` with `replacement`; an empty span inserts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Correction {
    pub span: Span,
    pub replacement: String,
}

/// A single detected issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    pub rule: Rule,
    pub message: String,
    pub span: Span,
    pub severity: Severity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correction: Option<Correction>,
}

impl Finding {
    pub fn new(rule: Rule, message: impl Into<String>, span: Span) -> Self {
        Self {
            rule,
            message: message.into(),
            span,
            severity: rule.default_severity(),
            correction: None,
        }
    }

    /// Suggest replacing the finding's own span.
    pub fn replacing(mut self, replacement: impl Into<String>) -> Self {
        self.correction = Some(Correction {
            span: self.span,
            replacement: replacement.into(),
        });
        self
    }

    pub fn with_correction(mut self, span: Span, replacement: impl Into<String>) -> Self {
        self.correction = Some(Correction {
            span,
            replacement: replacement.into(),
        });
        self
    }
}

/// Findings for one manifest's source file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FileFindings {
    pub file: String,
    pub findings: Vec<Finding>,
}

/// Results of checking a set of manifests.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CheckResult {
    pub files: Vec<FileFindings>,
    /// Number of declarations checked.
    pub scanned: usize,
    /// Manifests that could not be loaded.
    #[serde(default)]
    pub skipped: Vec<String>,
}

impl CheckResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge another result into this one.
    pub fn merge(&mut self, other: CheckResult) {
        self.files.extend(other.files);
        self.scanned += other.scanned;
        self.skipped.extend(other.skipped);
    }

    pub fn findings(&self) -> impl Iterator<Item = (&str, &Finding)> {
        self.files
            .iter()
            .flat_map(|f| f.findings.iter().map(move |finding| (f.file.as_str(), finding)))
    }

    pub fn finding_count(&self) -> usize {
        self.files.iter().map(|f| f.findings.len()).sum()
    }

    /// Check if there are any error-severity findings.
    pub fn has_errors(&self) -> bool {
        self.findings().any(|(_, f)| f.severity == Severity::Error)
    }
}
