//! The type tree produced by the type-expression parser.

use serde::{Deserialize, Serialize};

/// Reserved name for angle-bracket and paren collections.
pub const ARRAY: &str = "Array";

/// Reserved name for brace collections.
pub const HASH: &str = "Hash";

/// Bracket shape of a type expression, independent of its name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Shape {
    Simple,
    Generic,
    Tuple,
    Mapping,
}

impl Shape {
    /// The name that may be elided for this shape, if any.
    pub fn reserved_name(&self) -> Option<&'static str> {
        match self {
            Shape::Simple => None,
            Shape::Generic | Shape::Tuple => Some(ARRAY),
            Shape::Mapping => Some(HASH),
        }
    }
}

/// A parsed type expression.
///
/// Collection variants carry an empty `name` when the name was elided in
/// the source (`<T>`, `(T)`, `{K => V}`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "lowercase")]
pub enum TypeNode {
    Simple {
        name: String,
    },
    Generic {
        name: String,
        args: Vec<TypeNode>,
    },
    Tuple {
        name: String,
        elements: Vec<TypeNode>,
    },
    Mapping {
        name: String,
        keys: Vec<TypeNode>,
        values: Vec<TypeNode>,
    },
}

impl TypeNode {
    pub fn simple(name: impl Into<String>) -> Self {
        TypeNode::Simple { name: name.into() }
    }

    pub fn generic(name: impl Into<String>, args: Vec<TypeNode>) -> Self {
        TypeNode::Generic {
            name: name.into(),
            args,
        }
    }

    pub fn tuple(name: impl Into<String>, elements: Vec<TypeNode>) -> Self {
        TypeNode::Tuple {
            name: name.into(),
            elements,
        }
    }

    pub fn mapping(name: impl Into<String>, keys: Vec<TypeNode>, values: Vec<TypeNode>) -> Self {
        TypeNode::Mapping {
            name: name.into(),
            keys,
            values,
        }
    }

    pub fn shape(&self) -> Shape {
        match self {
            TypeNode::Simple { .. } => Shape::Simple,
            TypeNode::Generic { .. } => Shape::Generic,
            TypeNode::Tuple { .. } => Shape::Tuple,
            TypeNode::Mapping { .. } => Shape::Mapping,
        }
    }

    /// The name as written (empty for elided collections).
    pub fn name(&self) -> &str {
        match self {
            TypeNode::Simple { name }
            | TypeNode::Generic { name, .. }
            | TypeNode::Tuple { name, .. }
            | TypeNode::Mapping { name, .. } => name,
        }
    }

    /// The name with elision resolved to the shape's reserved name.
    pub fn effective_name(&self) -> &str {
        match (self.name(), self.shape().reserved_name()) {
            ("", Some(reserved)) => reserved,
            (name, _) => name,
        }
    }

    /// Direct children in source order (mapping keys before values).
    pub fn children(&self) -> Vec<&TypeNode> {
        match self {
            TypeNode::Simple { .. } => Vec::new(),
            TypeNode::Generic { args, .. } => args.iter().collect(),
            TypeNode::Tuple { elements, .. } => elements.iter().collect(),
            TypeNode::Mapping { keys, values, .. } => keys.iter().chain(values.iter()).collect(),
        }
    }

    /// Nesting depth, counting this node as 1.
    pub fn depth(&self) -> usize {
        1 + self
            .children()
            .into_iter()
            .map(TypeNode::depth)
            .max()
            .unwrap_or(0)
    }
}
