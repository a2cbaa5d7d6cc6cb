//! Collection-shape consistency checks.
//!
//! The reserved names only make sense with one bracket shape each:
//! `Hash` with braces, `Array` with angle brackets or parens. A reserved
//! name on the wrong shape is reported and a corrected tree is proposed.
//! Other names (`List`, `Range`, `Dict`) are never reported.

use std::borrow::Cow;

use serde::Serialize;

use super::node::{TypeNode, ARRAY, HASH};

/// A reserved name used with the wrong bracket shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MismatchKind {
    /// `Array{K => V}`
    ArrayWithBraces,
    /// `Hash(K, V)`
    HashWithPairParens,
    /// `Hash(T)`, `Hash(A, B, C)`
    HashWithParens,
    /// `Hash<K, V>`
    HashWithPairAngles,
    /// `Hash<T>`
    HashWithAngles,
}

impl MismatchKind {
    pub fn message(&self) -> &'static str {
        match self {
            MismatchKind::ArrayWithBraces => {
                "`{KeyType => ValueType}` is the Hash collection type syntax."
            }
            MismatchKind::HashWithPairParens => {
                "`Hash(Key, Value)` is likely a miswritten `Hash{Key => Value}`."
            }
            MismatchKind::HashWithParens => "`(Type)` is the fixed collection type syntax.",
            MismatchKind::HashWithPairAngles => {
                "`Hash<Key, Value>` is ambiguous syntax; prefer `Hash{Key => Value}`."
            }
            MismatchKind::HashWithAngles => "`<Type>` is the collection type syntax.",
        }
    }
}

/// One mismatch found in a type tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShapeMismatch {
    pub kind: MismatchKind,
    /// The offending subtree as written.
    pub observed: TypeNode,
    /// The offending subtree with only its own rule applied.
    pub corrected: TypeNode,
}

fn classify(node: &TypeNode) -> Option<MismatchKind> {
    match node {
        TypeNode::Mapping { name, .. } if name == ARRAY => Some(MismatchKind::ArrayWithBraces),
        TypeNode::Tuple { name, elements } if name == HASH => Some(if elements.len() == 2 {
            MismatchKind::HashWithPairParens
        } else {
            MismatchKind::HashWithParens
        }),
        TypeNode::Generic { name, args } if name == HASH => Some(if args.len() == 2 {
            MismatchKind::HashWithPairAngles
        } else {
            MismatchKind::HashWithAngles
        }),
        _ => None,
    }
}

fn rebuild(kind: MismatchKind, node: TypeNode) -> TypeNode {
    match (kind, node) {
        (MismatchKind::ArrayWithBraces, TypeNode::Mapping { keys, values, .. }) => {
            TypeNode::mapping(HASH, keys, values)
        }
        (MismatchKind::HashWithParens, TypeNode::Tuple { elements, .. }) => {
            TypeNode::tuple(ARRAY, elements)
        }
        (MismatchKind::HashWithAngles, TypeNode::Generic { args, .. }) => {
            TypeNode::generic(ARRAY, args)
        }
        (MismatchKind::HashWithPairParens, TypeNode::Tuple { elements: pair, .. })
        | (MismatchKind::HashWithPairAngles, TypeNode::Generic { args: pair, .. }) => {
            let mut pair = pair.into_iter();
            let key: Vec<_> = pair.next().into_iter().collect();
            let value: Vec<_> = pair.next().into_iter().collect();
            TypeNode::mapping(HASH, key, value)
        }
        (_, node) => node,
    }
}

/// Report every mismatch in `node`, outer before inner, left to right.
///
/// Children are visited as written, so a nested mismatch is reported even
/// when an enclosing node is itself rewritten.
pub fn check_shapes(node: &TypeNode) -> Vec<ShapeMismatch> {
    let mut found = Vec::new();
    collect(node, &mut found);
    found
}

fn collect(node: &TypeNode, found: &mut Vec<ShapeMismatch>) {
    if let Some(kind) = classify(node) {
        found.push(ShapeMismatch {
            kind,
            observed: node.clone(),
            corrected: rebuild(kind, node.clone()),
        });
    }
    for child in node.children() {
        collect(child, found);
    }
}

/// Apply every correction in the tree, children first.
///
/// Returns the input by reference when nothing needs to change.
pub fn correct_shapes(node: &TypeNode) -> Cow<'_, TypeNode> {
    let rebuilt = match node {
        TypeNode::Simple { .. } => Cow::Borrowed(node),
        TypeNode::Generic { name, args } => match correct_all(args) {
            Some(args) => Cow::Owned(TypeNode::generic(name.clone(), args)),
            None => Cow::Borrowed(node),
        },
        TypeNode::Tuple { name, elements } => match correct_all(elements) {
            Some(elements) => Cow::Owned(TypeNode::tuple(name.clone(), elements)),
            None => Cow::Borrowed(node),
        },
        TypeNode::Mapping { name, keys, values } => {
            match (correct_all(keys), correct_all(values)) {
                (None, None) => Cow::Borrowed(node),
                (new_keys, new_values) => Cow::Owned(TypeNode::mapping(
                    name.clone(),
                    new_keys.unwrap_or_else(|| keys.clone()),
                    new_values.unwrap_or_else(|| values.clone()),
                )),
            }
        }
    };

    match classify(&rebuilt) {
        Some(kind) => Cow::Owned(rebuild(kind, rebuilt.into_owned())),
        None => rebuilt,
    }
}

fn correct_all(nodes: &[TypeNode]) -> Option<Vec<TypeNode>> {
    let corrected: Vec<Cow<'_, TypeNode>> = nodes.iter().map(correct_shapes).collect();
    if corrected.iter().all(|c| matches!(c, Cow::Borrowed(_))) {
        return None;
    }
    Some(corrected.into_iter().map(Cow::into_owned).collect())
}
