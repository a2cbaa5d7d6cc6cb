//! Bracketed type lists written where the tag grammar cannot see them.
//!
//! `@param aaa bbb [Integer]` reads as a parameter `aaa` with no types;
//! the `[Integer]` is almost certainly meant as its type list.

use crate::docstring::{CommentBlock, Tag};

use super::{Finding, Rule, Span};

pub fn check_tag_position(block: &CommentBlock, tags: &[Tag]) -> Vec<Finding> {
    tags.iter()
        .filter_map(|tag| {
            let misplaced = tag.misplaced_types.as_ref()?;
            let line = block.lines.get(tag.line_index)?;
            Some(Finding::new(
                Rule::TagTypePosition,
                format!(
                    "Found `{}` in `@{}`, but not where a type list is expected",
                    misplaced.text, tag.directive
                ),
                Span::of_comment(line),
            ))
        })
        .collect()
}
