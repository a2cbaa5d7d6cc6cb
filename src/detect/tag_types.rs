//! Type-list checks for a single tag: syntax, collection shape and style.
//!
//! Each top-level alternative of a type list is checked on its own, so
//! `[Hash<Symbol, String>, (Integer)]` can produce one shape finding for
//! the first alternative and one style finding for the second.

use crate::docstring::{Tag, TagText};
use crate::types::{
    check_shapes, correct_shapes, parse_spanned, render, same_ignoring_whitespace, SpannedType,
    StyleMode, TypeSyntaxError,
};

use super::{Finding, Rule, Span};

/// Check the type list of `tag`. Tags without one produce nothing.
pub fn check_tag_types(tag: &Tag, style: StyleMode) -> Vec<Finding> {
    let Some(types) = tag.types.as_ref().filter(|_| tag.kind.is_typed()) else {
        return Vec::new();
    };

    match parse_spanned(&types.text) {
        Ok(alternatives) => alternatives
            .iter()
            .flat_map(|alt| check_alternative(types, alt, style))
            .collect(),
        Err(err) => vec![syntax_finding(types, &err)],
    }
}

fn syntax_finding(types: &TagText, err: &TypeSyntaxError) -> Finding {
    let (line, columns) = types.locate_to_line_end(err.offset);
    Finding::new(
        Rule::TagTypeSyntax,
        format!("(SyntaxError) {}", err),
        Span::new(line, columns.start, columns.end.max(columns.start + 1)),
    )
}

/// Alternatives split over several comment lines are reported from their
/// first character to the end of that line, without a correction.
fn check_alternative(types: &TagText, alt: &SpannedType, style: StyleMode) -> Vec<Finding> {
    let raw = &types.text[alt.span.clone()];
    let located = types.locate(alt.span.clone());
    let (line, columns) = located
        .clone()
        .unwrap_or_else(|| types.locate_to_line_end(alt.span.start));
    let span = Span::new(line, columns.start, columns.end);
    let correctable = located.is_some();
    let attach = |finding: Finding, replacement: &str| {
        if correctable {
            finding.replacing(replacement)
        } else {
            finding
        }
    };

    let mut findings = Vec::new();
    let corrected = correct_shapes(&alt.node);
    let replacement = render(&corrected, style);

    let mismatches = check_shapes(&alt.node);
    findings.extend(mismatches.iter().map(|m| {
        attach(
            Finding::new(Rule::CollectionType, m.kind.message(), span),
            &replacement,
        )
    }));

    if !same_ignoring_whitespace(raw, &render(&alt.node, style)) {
        findings.push(attach(
            Finding::new(
                Rule::CollectionStyle,
                format!("`{}` is using {} style syntax", raw, style.opposite()),
                span,
            ),
            &replacement,
        ));
    }

    findings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::docstring::{extract_tags, CommentBlock};

    fn check(line: &str, style: StyleMode) -> Vec<Finding> {
        let block = CommentBlock::from_lines(1, 0, &[line]);
        extract_tags(&block)
            .iter()
            .flat_map(|tag| check_tag_types(tag, style))
            .collect()
    }

    #[test]
    fn test_clean_type_list() {
        assert!(check("# @param [Array<String>, nil] names", StyleMode::Long).is_empty());
        assert!(check("# @return [<String>]", StyleMode::Short).is_empty());
        assert!(check("# @param name", StyleMode::Long).is_empty());
    }

    #[test]
    fn test_syntax_error_span() {
        let found = check("# @param [Integer String] x", StyleMode::Long);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].rule, Rule::TagTypeSyntax);
        assert!(found[0].message.starts_with("(SyntaxError) "));
        // Type list starts at column 10; "String" at offset 8.
        assert_eq!(found[0].span, Span::new(1, 18, 24));
        assert!(found[0].correction.is_none());
    }

    #[test]
    fn test_syntax_error_at_end_is_one_column_wide() {
        let found = check("# @return [void,]", StyleMode::Long);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].span, Span::new(1, 16, 17));
    }

    #[test]
    fn test_style_long() {
        let found = check("# @param [(Symbol)] x", StyleMode::Long);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].rule, Rule::CollectionStyle);
        assert_eq!(found[0].message, "`(Symbol)` is using short style syntax");
        let correction = found[0].correction.as_ref().unwrap();
        assert_eq!(correction.replacement, "Array(Symbol)");
        assert_eq!(correction.span, Span::new(1, 10, 18));
    }

    #[test]
    fn test_style_short() {
        let found = check("# @param [Hash{Symbol => String}] x", StyleMode::Short);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].message, "`Hash{Symbol => String}` is using long style syntax");
        assert_eq!(
            found[0].correction.as_ref().unwrap().replacement,
            "{Symbol => String}"
        );
    }

    #[test]
    fn test_whitespace_only_difference_is_clean() {
        assert!(check("# @param [Hash{Symbol=>String}] x", StyleMode::Long).is_empty());
    }

    #[test]
    fn test_shape_findings_share_replacement() {
        let found = check(
            "# @param [Hash<Symbol, Array{Symbol => String}>] x",
            StyleMode::Long,
        );
        let shape: Vec<_> = found
            .iter()
            .filter(|f| f.rule == Rule::CollectionType)
            .collect();
        assert_eq!(shape.len(), 2);
        for finding in &shape {
            assert_eq!(
                finding.correction.as_ref().unwrap().replacement,
                "Hash{Symbol => Hash{Symbol => String}}"
            );
        }
    }

    #[test]
    fn test_each_alternative_checked_separately() {
        let found = check("# @param [Hash(Symbol), <Integer>] x", StyleMode::Long);
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].rule, Rule::CollectionType);
        assert_eq!(found[0].correction.as_ref().unwrap().replacement, "Array(Symbol)");
        assert_eq!(found[0].span, Span::new(1, 10, 22));
        assert_eq!(found[1].rule, Rule::CollectionStyle);
        assert_eq!(found[1].correction.as_ref().unwrap().replacement, "Array<Integer>");
        assert_eq!(found[1].span, Span::new(1, 24, 33));
    }

    #[test]
    fn test_option_key_types_are_checked() {
        let found = check("# @option opts [<String>] :names", StyleMode::Long);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].rule, Rule::CollectionStyle);
    }

    #[test]
    fn test_style_replacement_keeps_shape_correction() {
        let found = check("# @param [Hash<Symbol, (Integer)>] x", StyleMode::Long);
        let rules: Vec<_> = found.iter().map(|f| f.rule).collect();
        assert_eq!(rules, vec![Rule::CollectionType, Rule::CollectionStyle]);
        for finding in &found {
            assert_eq!(
                finding.correction.as_ref().unwrap().replacement,
                "Hash{Symbol => Array(Integer)}"
            );
        }
    }

    #[test]
    fn test_type_list_split_over_lines() {
        let block = CommentBlock::from_lines(1, 0, &["# @param [Hash<Symbol,", "#   String>] opts"]);
        let found: Vec<_> = extract_tags(&block)
            .iter()
            .flat_map(|tag| check_tag_types(tag, StyleMode::Long))
            .collect();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].rule, Rule::CollectionType);
        // "# @param [Hash<Symbol," is 22 bytes; the span stops there.
        assert_eq!(found[0].span, Span::new(1, 10, 22));
        assert!(found[0].correction.is_none());
    }

    #[test]
    fn test_alternative_on_continuation_line_is_corrected_in_place() {
        let block = CommentBlock::from_lines(1, 0, &["# @param [String,", "#   (Integer)] x"]);
        let found: Vec<_> = extract_tags(&block)
            .iter()
            .flat_map(|tag| check_tag_types(tag, StyleMode::Long))
            .collect();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].rule, Rule::CollectionStyle);
        let correction = found[0].correction.as_ref().unwrap();
        assert_eq!(correction.span, Span::new(2, 4, 13));
        assert_eq!(correction.replacement, "Array(Integer)");
    }

    #[test]
    fn test_syntax_error_on_continuation_line() {
        let block = CommentBlock::from_lines(1, 0, &["# @param [Array<String>,", "#   Integer Float] x"]);
        let found: Vec<_> = extract_tags(&block)
            .iter()
            .flat_map(|tag| check_tag_types(tag, StyleMode::Long))
            .collect();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].rule, Rule::TagTypeSyntax);
        assert_eq!(found[0].span, Span::new(2, 12, 17));
    }

    #[test]
    fn test_reference_tags_are_skipped() {
        assert!(check("# @param (see #other)", StyleMode::Long).is_empty());
    }
}
