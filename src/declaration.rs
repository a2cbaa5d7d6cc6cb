//! Declarations and their formal parameters, as supplied by the host.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::docstring::CommentBlock;

/// What kind of declaration a comment block documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeclarationKind {
    Method,
    Class,
    Module,
    Constant,
}

impl DeclarationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeclarationKind::Method => "method",
            DeclarationKind::Class => "class",
            DeclarationKind::Module => "module",
            DeclarationKind::Constant => "constant",
        }
    }
}

impl std::fmt::Display for DeclarationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How a formal parameter is declared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParameterKind {
    /// `a`
    Required,
    /// `a = 1`
    Optional,
    /// `*rest`
    Rest,
    /// `a:` or `a: 1`
    Keyword,
    /// `**opts`, `**nil`
    KeywordRest,
    /// `&block`
    Block,
    /// `...`
    Forward,
}

/// Kind of literal used as a parameter default.
///
/// Deserialized from the literal's source text (`"{}"`, `"nil"`, `"1..2"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(from = "String")]
pub enum DefaultLiteral {
    Integer,
    Float,
    String,
    Boolean,
    Symbol,
    Array,
    Hash,
    Nil,
    Regexp,
    Range,
    /// Any non-literal expression.
    Other,
}

lazy_static! {
    static ref INTEGER: Regex = Regex::new(
        r"^[+-]?(?:0[xX][0-9a-fA-F_]+|0[bB][01_]+|0[oO][0-7_]+|\d[\d_]*)$"
    ).unwrap();
    static ref FLOAT: Regex = Regex::new(
        r"^[+-]?\d[\d_]*(?:\.\d[\d_]*(?:[eE][+-]?\d+)?|[eE][+-]?\d+)$"
    ).unwrap();
    static ref QUOTED_STRING: Regex = Regex::new(r#"^(?:"[^"]*"|'[^']*')$"#).unwrap();
    static ref RANGE: Regex = Regex::new(
        r"^\(?\s*(?:[^.\s]+(?:\.\d[\d_]*)?\s*)?\.\.\.?\s*(?:[^.\s()]+(?:\.\d[\d_]*)?)?\s*\)?$"
    ).unwrap();
}

impl DefaultLiteral {
    /// Classify the source text of a default value.
    pub fn classify(source: &str) -> Self {
        let src = source.trim();
        match src {
            "nil" => return DefaultLiteral::Nil,
            "true" | "false" => return DefaultLiteral::Boolean,
            _ => {}
        }

        if INTEGER.is_match(src) {
            DefaultLiteral::Integer
        } else if FLOAT.is_match(src) {
            DefaultLiteral::Float
        } else if QUOTED_STRING.is_match(src) {
            DefaultLiteral::String
        } else if (src.starts_with(':') && !src.starts_with("::")) || src.starts_with("%s") {
            DefaultLiteral::Symbol
        } else if src.starts_with('[') || src.starts_with("%w") || src.starts_with("%i") {
            DefaultLiteral::Array
        } else if src.starts_with('{') {
            DefaultLiteral::Hash
        } else if src.starts_with('/') || src.starts_with("%r") {
            DefaultLiteral::Regexp
        } else if src.contains("..") && RANGE.is_match(src) {
            DefaultLiteral::Range
        } else if src.starts_with('"')
            || src.starts_with('\'')
            || src.starts_with("%q")
            || src.starts_with("%Q")
            || src.starts_with("<<")
        {
            DefaultLiteral::String
        } else {
            DefaultLiteral::Other
        }
    }

    /// The YARD type documenting a parameter defaulting to this literal.
    pub fn yard_type(&self) -> &'static str {
        match self {
            DefaultLiteral::Integer => "Integer",
            DefaultLiteral::Float => "Float",
            DefaultLiteral::String => "String",
            DefaultLiteral::Boolean => "Boolean",
            DefaultLiteral::Symbol => "Symbol",
            DefaultLiteral::Array => "Array<Object>",
            DefaultLiteral::Hash => "Hash{Symbol => Object}",
            DefaultLiteral::Nil => "Object, nil",
            DefaultLiteral::Regexp => "Regexp",
            DefaultLiteral::Range => "Range[Object]",
            DefaultLiteral::Other => "Object",
        }
    }
}

impl From<String> for DefaultLiteral {
    fn from(source: String) -> Self {
        DefaultLiteral::classify(&source)
    }
}

impl From<&str> for DefaultLiteral {
    fn from(source: &str) -> Self {
        DefaultLiteral::classify(source)
    }
}

/// One formal parameter. Anonymous forms (`*`, `**`, `&`, `...`) have no name.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ParameterDescriptor {
    #[serde(default)]
    pub name: Option<String>,
    pub kind: ParameterKind,
    #[serde(default)]
    pub default: Option<DefaultLiteral>,
}

impl ParameterDescriptor {
    pub fn new(name: &str, kind: ParameterKind) -> Self {
        Self {
            name: Some(name.to_string()),
            kind,
            default: None,
        }
    }

    pub fn required(name: &str) -> Self {
        Self::new(name, ParameterKind::Required)
    }

    pub fn optional(name: &str, default: &str) -> Self {
        Self::new(name, ParameterKind::Optional).with_default(default)
    }

    pub fn rest(name: &str) -> Self {
        Self::new(name, ParameterKind::Rest)
    }

    pub fn keyword(name: &str) -> Self {
        Self::new(name, ParameterKind::Keyword)
    }

    pub fn keyword_rest(name: &str) -> Self {
        Self::new(name, ParameterKind::KeywordRest)
    }

    pub fn block(name: &str) -> Self {
        Self::new(name, ParameterKind::Block)
    }

    pub fn anonymous(kind: ParameterKind) -> Self {
        Self {
            name: None,
            kind,
            default: None,
        }
    }

    pub fn with_default(mut self, source: &str) -> Self {
        self.default = Some(DefaultLiteral::classify(source));
        self
    }

    /// Whether a `@param` tag is expected for this parameter.
    pub fn needs_documentation(&self) -> bool {
        self.name.is_some() && self.kind != ParameterKind::Block
    }

    /// Type used when generating a `@param` line for this parameter.
    pub fn inferred_type(&self) -> &'static str {
        if let Some(default) = &self.default {
            return default.yard_type();
        }
        match self.kind {
            ParameterKind::Rest => "Array<Object>",
            ParameterKind::KeywordRest => "Hash{Symbol => Object}",
            _ => "Object",
        }
    }
}

/// A documented declaration: its kind, parameters and leading comments.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DeclarationInfo {
    pub kind: DeclarationKind,
    #[serde(default)]
    pub name: String,
    /// 1-based line of the declaration keyword.
    #[serde(default)]
    pub line: usize,
    #[serde(default)]
    pub column: usize,
    #[serde(default)]
    pub parameters: Vec<ParameterDescriptor>,
    #[serde(default)]
    pub comments: CommentBlock,
}

impl DeclarationInfo {
    pub fn new(kind: DeclarationKind, name: &str, comments: CommentBlock) -> Self {
        let line = comments.lines.last().map(|l| l.line + 1).unwrap_or(1);
        let column = comments.lines.last().map(|l| l.column).unwrap_or(0);
        Self {
            kind,
            name: name.to_string(),
            line,
            column,
            parameters: Vec::new(),
            comments,
        }
    }

    pub fn method(name: &str, parameters: Vec<ParameterDescriptor>, comments: CommentBlock) -> Self {
        Self {
            parameters,
            ..Self::new(DeclarationKind::Method, name, comments)
        }
    }

    /// Names of all named parameters, in order.
    pub fn parameter_names(&self) -> Vec<&str> {
        self.parameters
            .iter()
            .filter_map(|p| p.name.as_deref())
            .collect()
    }
}
