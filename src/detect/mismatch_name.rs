//! Cross-check `@param`/`@option` tags against a method's arguments.

use std::collections::HashSet;

use crate::config::PrototypeOrdering;
use crate::declaration::{DeclarationInfo, DeclarationKind};
use crate::docstring::{Tag, TagKind};
use crate::types::parse;

use super::{Finding, Rule, Span};

/// Reconcile a method's parameter tags with its formal parameters.
///
/// Reports tags missing a name or types, tags naming no argument, and
/// arguments no tag documents. Methods without arguments and methods
/// carrying `@overload` are skipped.
pub fn check_mismatch_name(
    decl: &DeclarationInfo,
    tags: &[Tag],
    prototype: PrototypeOrdering,
) -> Vec<Finding> {
    if decl.kind != DeclarationKind::Method
        || decl.parameters.is_empty()
        || tags.iter().any(|t| t.kind == TagKind::Overload)
    {
        return Vec::new();
    }

    let names = decl.parameter_names();
    let mut findings = Vec::new();

    let checked = tags.iter().filter(|t| {
        t.documents_parameter() && t.kind != TagKind::Reference && t.misplaced_types.is_none()
    });
    for tag in checked {
        let Some(line) = decl.comments.lines.get(tag.line_index) else {
            continue;
        };
        let (name, types) = match (&tag.name, &tag.types) {
            (None, _) => {
                findings.push(Finding::new(
                    Rule::IncompleteTag,
                    format!("No tag name is supplied in `@{}`", tag.directive),
                    Span::of_comment(line),
                ));
                continue;
            }
            (Some(_), None) => {
                findings.push(Finding::new(
                    Rule::IncompleteTag,
                    format!("No types are associated with the tag in `@{}`", tag.directive),
                    Span::of_comment(line),
                ));
                continue;
            }
            (Some(name), Some(types)) => (name, types),
        };

        if names.contains(&name.text.as_str()) || parse(&types.text).is_err() {
            continue;
        }
        findings.push(Finding::new(
            Rule::UnknownParamName,
            format!(
                "`{}` is not found in method arguments of [{}]",
                name.text,
                names.join(", ")
            ),
            Span::of_text(name),
        ));
    }

    // Return-only or reference-only docs are not forced into @param docs.
    let has_param_docs = tags
        .iter()
        .any(|t| t.kind == TagKind::Param || t.directive == "option");
    if !has_param_docs {
        return findings;
    }

    let Some(last) = decl.comments.last_leading() else {
        return findings;
    };
    let documented: HashSet<&str> = tags
        .iter()
        .filter(|t| t.documents_parameter())
        .filter_map(|t| t.name.as_ref())
        .map(|n| n.text.as_str())
        .collect();
    let indent = " ".repeat(last.column);

    for param in decl.parameters.iter().filter(|p| p.needs_documentation()) {
        let Some(name) = param.name.as_deref() else {
            continue;
        };
        if documented.contains(name) {
            continue;
        }
        findings.push(
            Finding::new(
                Rule::UndocumentedArgument,
                format!("This method has argument `{}`, But not documented", name),
                Span::of_comment(last),
            )
            .with_correction(
                Span::point(last.line, last.end_column()),
                format!(
                    "\n{}# {}",
                    indent,
                    prototype.format(name, param.inferred_type())
                ),
            ),
        );
    }

    findings
}
