//! `@param` and `@option` on declarations that take no arguments.

use crate::declaration::{DeclarationInfo, DeclarationKind};
use crate::docstring::Tag;

use super::{Finding, Rule, Span};

/// Report every `@param`/`@option` tag on a class, module or constant.
pub fn check_meaningless_tags(decl: &DeclarationInfo, tags: &[Tag]) -> Vec<Finding> {
    if decl.kind == DeclarationKind::Method {
        return Vec::new();
    }

    tags.iter()
        .filter(|tag| tag.documents_parameter())
        .filter_map(|tag| {
            let line = decl.comments.lines.get(tag.line_index)?;
            Some(Finding::new(
                Rule::MeaninglessTag,
                format!("`@{}` is meaningless tag on {}", tag.directive, decl.kind),
                Span::of_comment(line),
            ))
        })
        .collect()
}
