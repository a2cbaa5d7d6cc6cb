//! The YARD type-expression mini-language: tree, parser, renderer and
//! collection-shape checks.

mod node;
mod parser;
mod render;
mod shape;

pub use node::{Shape, TypeNode, ARRAY, HASH};
pub use parser::{
    parse, parse_spanned, SpannedType, SyntaxErrorKind, TypeSyntaxError, MAX_NESTING_DEPTH,
};
pub use render::{render, render_list, same_ignoring_whitespace, StyleMode};
pub use shape::{check_shapes, correct_shapes, MismatchKind, ShapeMismatch};
