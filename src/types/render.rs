//! Canonical text rendering of type trees under a style policy.

use serde::{Deserialize, Serialize};

use super::node::TypeNode;

/// Whether reserved collection names are spelled out or elided.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StyleMode {
    /// `<T>`, `(T)`, `{K => V}`
    Short,
    /// `Array<T>`, `Array(T)`, `Hash{K => V}`
    #[default]
    Long,
}

impl StyleMode {
    /// The style a mismatching annotation is written in.
    pub fn opposite(&self) -> StyleMode {
        match self {
            StyleMode::Short => StyleMode::Long,
            StyleMode::Long => StyleMode::Short,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StyleMode::Short => "short",
            StyleMode::Long => "long",
        }
    }
}

impl std::fmt::Display for StyleMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for StyleMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "short" => Ok(StyleMode::Short),
            "long" => Ok(StyleMode::Long),
            _ => Err(format!("unknown style: {}", s)),
        }
    }
}

/// Render a type tree as text.
///
/// Only a reserved name (or an elided one) is affected by the style;
/// `List<T>` and `Dict{K => V}` keep their names in both modes.
pub fn render(node: &TypeNode, style: StyleMode) -> String {
    match node {
        TypeNode::Simple { name } => name.clone(),
        TypeNode::Generic { args, .. } => {
            format!("{}<{}>", styled_name(node, style), render_list(args, style))
        }
        TypeNode::Tuple { elements, .. } => {
            format!("{}({})", styled_name(node, style), render_list(elements, style))
        }
        TypeNode::Mapping { keys, values, .. } => format!(
            "{}{{{} => {}}}",
            styled_name(node, style),
            render_list(keys, style),
            render_list(values, style)
        ),
    }
}

/// Render top-level alternatives joined by `, `.
pub fn render_list(nodes: &[TypeNode], style: StyleMode) -> String {
    nodes
        .iter()
        .map(|n| render(n, style))
        .collect::<Vec<_>>()
        .join(", ")
}

fn styled_name(node: &TypeNode, style: StyleMode) -> &str {
    let reserved = node.shape().reserved_name();
    match style {
        StyleMode::Long => node.effective_name(),
        StyleMode::Short if reserved == Some(node.effective_name()) => "",
        StyleMode::Short => node.name(),
    }
}

/// Compare two renderings ignoring all whitespace.
pub fn same_ignoring_whitespace(a: &str, b: &str) -> bool {
    a.chars()
        .filter(|c| !c.is_whitespace())
        .eq(b.chars().filter(|c| !c.is_whitespace()))
}
