//! Tag extraction from documentation comment blocks.
//!
//! Recognizes YARD tag lines:
//! - `# @param [Type] name` / `# @param name [Type]`
//! - `# @option container [Type] key` / `# @option container key [Type]`
//! - `# @return [Type]`, `# @raise [Type]`, `# @yieldreturn [Type]`
//! - `# @yieldparam [Type] name`
//! - `# @param (see #other)` and `# @param name (see #other)` references
//!
//! Lines indented deeper than a tag line continue that tag.

use std::ops::Range;

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

lazy_static! {
    /// `@directive` at the start of a comment's content.
    static ref TAG_START: Regex = Regex::new(r"^@(!?[A-Za-z_]\w*)").unwrap();

    /// `(see #other)` with an optional leading name.
    static ref REFERENCE: Regex =
        Regex::new(r"\A\s*(?:(\S+)\s+)?\(\s*see\s+\S+\s*\)\s*\z").unwrap();

    /// Any bracketed text, used to spot misplaced type lists.
    static ref BRACKETED: Regex = Regex::new(r"\[.+\]").unwrap();
}

/// One line of a comment block as supplied by the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentLine {
    /// 1-based source line.
    pub line: usize,
    /// 0-based column where `text` starts.
    #[serde(default)]
    pub column: usize,
    /// The comment source including its `#` marker.
    pub text: String,
    /// False for trailing comments that share a line with code.
    #[serde(default = "default_true")]
    pub leading: bool,
}

fn default_true() -> bool {
    true
}

impl CommentLine {
    pub fn new(line: usize, column: usize, text: impl Into<String>) -> Self {
        Self {
            line,
            column,
            text: text.into(),
            leading: true,
        }
    }

    /// A trailing comment (`foo # [inline]`).
    pub fn inline(line: usize, column: usize, text: impl Into<String>) -> Self {
        Self {
            leading: false,
            ..Self::new(line, column, text)
        }
    }

    /// Text after the `#` marker and one optional space, with its byte
    /// offset inside `text`.
    pub fn content(&self) -> (usize, &str) {
        let trimmed = self.text.trim_start();
        let mut offset = self.text.len() - trimmed.len();
        let rest = match trimmed.strip_prefix('#') {
            Some(rest) => {
                offset += 1;
                rest
            }
            None => trimmed,
        };
        match rest.strip_prefix(' ') {
            Some(rest) => (offset + 1, rest),
            None => (offset, rest),
        }
    }

    /// Column just past the last byte of the comment.
    pub fn end_column(&self) -> usize {
        self.column + self.text.len()
    }
}

/// The comment lines immediately preceding a declaration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommentBlock {
    pub lines: Vec<CommentLine>,
}

impl CommentBlock {
    pub fn new(lines: Vec<CommentLine>) -> Self {
        Self { lines }
    }

    /// Build a block from consecutive lines starting at `first_line`.
    pub fn from_lines(first_line: usize, column: usize, lines: &[&str]) -> Self {
        Self::new(
            lines
                .iter()
                .enumerate()
                .map(|(i, text)| CommentLine::new(first_line + i, column, *text))
                .collect(),
        )
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// The last leading comment line, where generated lines are appended.
    pub fn last_leading(&self) -> Option<&CommentLine> {
        self.lines.iter().rev().find(|l| l.leading)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TagKind {
    Param,
    Option,
    Return,
    Raise,
    YieldParam,
    YieldReturn,
    /// `(see #other)`: documented elsewhere, carries no types.
    Reference,
    /// `@overload`: an alternate signature follows.
    Overload,
    Other,
}

impl TagKind {
    fn from_directive(directive: &str) -> Self {
        match directive {
            "param" => TagKind::Param,
            "option" => TagKind::Option,
            "return" => TagKind::Return,
            "raise" => TagKind::Raise,
            "yieldparam" => TagKind::YieldParam,
            "yieldreturn" => TagKind::YieldReturn,
            "overload" => TagKind::Overload,
            _ => TagKind::Other,
        }
    }

    /// Whether tags of this kind carry a type list worth checking.
    pub fn is_typed(&self) -> bool {
        matches!(
            self,
            TagKind::Param
                | TagKind::Option
                | TagKind::Return
                | TagKind::Raise
                | TagKind::YieldParam
                | TagKind::YieldReturn
        )
    }
}

/// A piece of tag text with its location in the source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagText {
    pub text: String,
    /// 1-based source line.
    pub line: usize,
    /// Half-open byte columns on `line`, cut at the first line break.
    pub columns: Range<usize>,
    /// Per-line placement of `text`, one entry per source line it covers.
    #[serde(skip)]
    pieces: Vec<TextPiece>,
}

/// Bytes of a `TagText` that sit on one source line.
#[derive(Debug, Clone, PartialEq, Eq)]
struct TextPiece {
    /// Byte offset inside `TagText::text`.
    offset: usize,
    len: usize,
    line: usize,
    column: usize,
}

impl TagText {
    /// Whether the text continues onto a later comment line.
    pub fn is_multiline(&self) -> bool {
        self.pieces.len() > 1
    }

    fn piece_at(&self, offset: usize) -> Option<&TextPiece> {
        self.pieces.iter().rev().find(|p| p.offset <= offset)
    }

    /// Source line and columns of `range`, a byte range inside `text`.
    ///
    /// `None` when the range crosses a line break.
    pub fn locate(&self, range: Range<usize>) -> Option<(usize, Range<usize>)> {
        let piece = self.piece_at(range.start)?;
        if range.end > piece.offset + piece.len {
            return None;
        }
        Some((
            piece.line,
            piece.column + range.start - piece.offset..piece.column + range.end - piece.offset,
        ))
    }

    /// Source line and columns from `offset` to the end of its line.
    pub fn locate_to_line_end(&self, offset: usize) -> (usize, Range<usize>) {
        match self.piece_at(offset) {
            Some(piece) => {
                let end = piece.column + piece.len;
                let start = piece.column + (offset - piece.offset).min(piece.len);
                (piece.line, start..end)
            }
            None => (self.line, self.columns.clone()),
        }
    }
}

/// One documentation directive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tag {
    pub kind: TagKind,
    /// The directive as written, without `@`.
    pub directive: String,
    /// Index of the tag's first line in the comment block.
    pub line_index: usize,
    /// Parameter name, or the container name for `@option`.
    pub name: Option<TagText>,
    /// Key name for `@option`.
    pub key: Option<TagText>,
    /// Text between `[` and `]`.
    pub types: Option<TagText>,
    /// Bracketed text found where no type list may appear.
    pub misplaced_types: Option<TagText>,
    /// Everything after the directive, continuation lines joined by `\n`.
    pub text: String,
}

impl Tag {
    /// `@param` or `@option`, reference forms included.
    pub fn documents_parameter(&self) -> bool {
        self.directive == "param" || self.directive == "option"
    }
}

/// Where a byte of the joined tag text came from.
#[derive(Debug, Clone)]
struct Segment {
    start: usize,
    len: usize,
    source_line: usize,
    column: usize,
}

/// A tag's text with continuation lines joined, plus a position map.
#[derive(Debug, Default)]
struct TagBody {
    text: String,
    segments: Vec<Segment>,
}

impl TagBody {
    fn push(&mut self, piece: &str, source_line: usize, column: usize) {
        if !self.segments.is_empty() {
            self.text.push('\n');
        }
        self.segments.push(Segment {
            start: self.text.len(),
            len: piece.len(),
            source_line,
            column,
        });
        self.text.push_str(piece);
    }

    fn segment_at(&self, offset: usize) -> &Segment {
        self.segments
            .iter()
            .rev()
            .find(|s| s.start <= offset)
            .unwrap_or(&self.segments[0])
    }

    /// Locate `range`, keeping the placement of each line it covers.
    fn text_at(&self, range: Range<usize>) -> TagText {
        let mut pieces: Vec<TextPiece> = self
            .segments
            .iter()
            .filter(|s| s.start < range.end && range.start < s.start + s.len)
            .map(|s| {
                let from = range.start.max(s.start);
                let to = range.end.min(s.start + s.len);
                TextPiece {
                    offset: from - range.start,
                    len: to - from,
                    line: s.source_line,
                    column: s.column + from - s.start,
                }
            })
            .collect();
        if pieces.is_empty() {
            let seg = self.segment_at(range.start);
            pieces.push(TextPiece {
                offset: 0,
                len: 0,
                line: seg.source_line,
                column: seg.column + range.start.saturating_sub(seg.start).min(seg.len),
            });
        }

        let first = &pieces[0];
        TagText {
            text: self.text[range].to_string(),
            line: first.line,
            columns: first.column..first.column + first.len,
            pieces,
        }
    }
}

/// Extract tags from a comment block in source order.
///
/// Trailing comments are ignored. Prose lines end the current tag.
pub fn extract_tags(block: &CommentBlock) -> Vec<Tag> {
    let mut tags = Vec::new();
    let mut current: Option<(usize, String, usize, TagBody)> = None;

    for (index, line) in block.lines.iter().enumerate() {
        if !line.leading {
            continue;
        }
        let (offset, content) = line.content();
        let indent = content.len() - content.trim_start().len();
        let stripped = &content[indent..];

        if let Some(caps) = TAG_START.captures(stripped) {
            if let Some((line_index, directive, _, body)) = current.take() {
                tags.push(build_tag(line_index, directive, body));
            }
            let directive = caps[1].to_string();
            let body_start = indent + 1 + directive.len();
            let mut body = TagBody::default();
            body.push(
                &content[body_start..],
                line.line,
                line.column + offset + body_start,
            );
            current = Some((index, directive, indent, body));
            continue;
        }

        let continues = matches!(
            &current,
            Some((_, _, tag_indent, _)) if !stripped.is_empty() && indent > *tag_indent
        );
        if continues {
            if let Some((_, _, _, body)) = current.as_mut() {
                body.push(content, line.line, line.column + offset);
            }
        } else if let Some((line_index, directive, _, body)) = current.take() {
            tags.push(build_tag(line_index, directive, body));
        }
    }

    if let Some((line_index, directive, _, body)) = current.take() {
        tags.push(build_tag(line_index, directive, body));
    }
    tags
}

fn build_tag(line_index: usize, directive: String, body: TagBody) -> Tag {
    let mut tag = Tag {
        kind: TagKind::from_directive(&directive),
        directive,
        line_index,
        name: None,
        key: None,
        types: None,
        misplaced_types: None,
        text: body.text.clone(),
    };

    if let Some(caps) = REFERENCE.captures(&body.text) {
        tag.kind = TagKind::Reference;
        tag.name = caps
            .get(1)
            .map(|m| name_text(&body, m.start()..m.end()));
        return tag;
    }

    match tag.kind {
        TagKind::Param | TagKind::YieldParam => {
            let (name, types, misplaced) = types_and_name(&body, 0);
            tag.name = name;
            tag.types = types;
            tag.misplaced_types = misplaced;
        }
        TagKind::Option => match next_word(&body.text, 0) {
            Some(word) if body.text[word.clone()].starts_with('[') => {
                tag.misplaced_types = find_bracketed(&body, 0);
            }
            Some(word) => {
                tag.name = Some(name_text(&body, word.clone()));
                let (key, types, misplaced) = types_and_name(&body, word.end);
                tag.key = key;
                tag.types = types;
                tag.misplaced_types = misplaced;
            }
            None => {}
        },
        TagKind::Return | TagKind::Raise | TagKind::YieldReturn => {
            let split = split_type_list(&body.text, 0);
            match (split.before, split.types) {
                (None, Some(types)) => tag.types = Some(body.text_at(types)),
                _ => tag.misplaced_types = find_bracketed(&body, 0),
            }
        }
        _ => {}
    }

    tag
}

type NameAndTypes = (Option<TagText>, Option<TagText>, Option<TagText>);

/// Read `[Types] name` or `name [Types]` starting at `from`.
fn types_and_name(body: &TagBody, from: usize) -> NameAndTypes {
    let split = split_type_list(&body.text, from);
    match split.types {
        Some(types) => {
            let name = split
                .before
                .or_else(|| next_word(&body.text, split.rest_start))
                .map(|word| name_text(body, word));
            (name, Some(body.text_at(types)), None)
        }
        None => {
            let name = next_word(&body.text, from).map(|word| name_text(body, word));
            (name, None, find_bracketed(body, from))
        }
    }
}

struct TypeListSplit {
    /// A single word preceding the type list.
    before: Option<Range<usize>>,
    /// Inside of the brackets.
    types: Option<Range<usize>>,
    rest_start: usize,
}

/// Find a type list that appears before the second word of `text[from..]`.
fn split_type_list(text: &str, from: usize) -> TypeListSplit {
    let mut before: Option<Range<usize>> = None;
    let mut seen_space = false;

    for (i, c) in text[from..].char_indices() {
        let i = from + i;
        if c == '[' {
            let close = matching_bracket(text, i);
            return TypeListSplit {
                before,
                types: Some(i + 1..close.unwrap_or(text.len())),
                rest_start: close.map(|c| c + 1).unwrap_or(text.len()),
            };
        }
        if c.is_whitespace() {
            seen_space |= before.is_some();
            continue;
        }
        if seen_space {
            break;
        }
        let start = before.as_ref().map(|b| b.start).unwrap_or(i);
        before = Some(start..i + c.len_utf8());
    }

    TypeListSplit {
        before,
        types: None,
        rest_start: from,
    }
}

/// Index of the `]` closing the `[` at `open`; square brackets nest.
fn matching_bracket(text: &str, open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (i, c) in text[open..].char_indices() {
        match c {
            '[' => depth += 1,
            ']' => {
                depth -= 1;
                if depth == 0 {
                    return Some(open + i);
                }
            }
            _ => {}
        }
    }
    None
}

fn next_word(text: &str, from: usize) -> Option<Range<usize>> {
    let rest = &text[from..];
    let start = from + (rest.len() - rest.trim_start().len());
    let len = text[start..]
        .find(char::is_whitespace)
        .unwrap_or(text.len() - start);
    (len > 0).then(|| start..start + len)
}

/// A name with one trailing `,` or `:` dropped (`@param [Hash] context, ...`).
fn name_text(body: &TagBody, word: Range<usize>) -> TagText {
    let trimmed = body.text[word.clone()]
        .strip_suffix([',', ':'])
        .filter(|s| !s.is_empty())
        .map(str::len)
        .unwrap_or(word.len());
    body.text_at(word.start..word.start + trimmed)
}

fn find_bracketed(body: &TagBody, from: usize) -> Option<TagText> {
    BRACKETED
        .find(&body.text[from..])
        .map(|m| body.text_at(from + m.start()..from + m.end()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(lines: &[&str]) -> Vec<Tag> {
        extract_tags(&CommentBlock::from_lines(1, 2, lines))
    }

    fn text(t: &Option<TagText>) -> Option<&str> {
        t.as_ref().map(|t| t.text.as_str())
    }

    #[test]
    fn test_param_type_first() {
        let found = tags(&["# @param [String] name the name"]);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].kind, TagKind::Param);
        assert_eq!(text(&found[0].name), Some("name"));
        assert_eq!(text(&found[0].types), Some("String"));
        // "  # @param [" is 12 bytes wide when the comment starts at column 2.
        assert_eq!(found[0].types.as_ref().unwrap().columns, 12..18);
        assert_eq!(found[0].name.as_ref().unwrap().columns, 20..24);
    }

    #[test]
    fn test_param_name_first() {
        let found = tags(&["# @param text [Array<String>]"]);
        assert_eq!(text(&found[0].name), Some("text"));
        assert_eq!(text(&found[0].types), Some("Array<String>"));
    }

    #[test]
    fn test_param_without_types() {
        let found = tags(&["# @param aaa"]);
        assert_eq!(text(&found[0].name), Some("aaa"));
        assert!(found[0].types.is_none());
        assert!(found[0].misplaced_types.is_none());

        let found = tags(&["# @param"]);
        assert!(found[0].name.is_none());
    }

    #[test]
    fn test_misplaced_type_list() {
        let found = tags(&["# @param aaa bbb [Integer]"]);
        assert_eq!(text(&found[0].name), Some("aaa"));
        assert!(found[0].types.is_none());
        assert_eq!(text(&found[0].misplaced_types), Some("[Integer]"));

        let found = tags(&["# @option [Integer] aaa bbb"]);
        assert!(found[0].name.is_none());
        assert_eq!(text(&found[0].misplaced_types), Some("[Integer]"));
    }

    #[test]
    fn test_option_forms() {
        let found = tags(&[
            "# @option opts [String] :key the key",
            "# @option opt aaa [void]",
            "# @option aaa [Integer] bbb",
        ]);
        assert_eq!(found.len(), 3);
        assert_eq!(text(&found[0].name), Some("opts"));
        assert_eq!(text(&found[0].key), Some(":key"));
        assert_eq!(text(&found[0].types), Some("String"));
        assert_eq!(text(&found[1].name), Some("opt"));
        assert_eq!(text(&found[1].key), Some("aaa"));
        assert_eq!(text(&found[1].types), Some("void"));
        assert_eq!(text(&found[2].key), Some("bbb"));
        assert!(found[2].misplaced_types.is_none());
    }

    #[test]
    fn test_return_and_raise() {
        let found = tags(&["# @return [Array<String>] names", "# @raise [ArgumentError]"]);
        assert_eq!(found[0].kind, TagKind::Return);
        assert_eq!(text(&found[0].types), Some("Array<String>"));
        assert!(found[0].name.is_none());
        assert_eq!(found[1].kind, TagKind::Raise);
        assert_eq!(text(&found[1].types), Some("ArgumentError"));
    }

    #[test]
    fn test_reference_forms() {
        let found = tags(&["# @param (see #other)", "# @param arg1 (see #other)"]);
        assert_eq!(found[0].kind, TagKind::Reference);
        assert!(found[0].name.is_none());
        assert!(found[0].documents_parameter());
        assert_eq!(found[1].kind, TagKind::Reference);
        assert_eq!(text(&found[1].name), Some("arg1"));
        assert!(found[1].types.is_none());
    }

    #[test]
    fn test_continuation_lines_carry_the_name() {
        let found = tags(&["# @param [String]", "#   arg multiline doc", "# prose"]);
        assert_eq!(found.len(), 1);
        assert_eq!(text(&found[0].name), Some("arg"));
        let name = found[0].name.as_ref().unwrap();
        assert_eq!(name.line, 2);
        assert_eq!(name.columns, 6..9);
    }

    #[test]
    fn test_trailing_punctuation_dropped_from_name() {
        let found = tags(&["# @param [Hash] context, Extra text"]);
        assert_eq!(text(&found[0].name), Some("context"));
    }

    #[test]
    fn test_nested_square_brackets_in_type_list() {
        let found = tags(&["# @param [Range[Object]] r"]);
        assert_eq!(text(&found[0].types), Some("Range[Object]"));
        assert_eq!(text(&found[0].name), Some("r"));
    }

    #[test]
    fn test_unclosed_type_list_runs_to_end() {
        let found = tags(&["# @param [Hash<Symbol=>Object config"]);
        assert_eq!(text(&found[0].types), Some("Hash<Symbol=>Object config"));
    }

    #[test]
    fn test_inline_comments_and_prose_are_skipped() {
        let block = CommentBlock::new(vec![
            CommentLine::new(1, 0, "# Does things."),
            CommentLine::inline(2, 10, "# @param [void,]"),
            CommentLine::new(3, 0, "# @overload foo(a)"),
        ]);
        let found = extract_tags(&block);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].kind, TagKind::Overload);
        assert_eq!(found[0].line_index, 2);
    }

    #[test]
    fn test_type_list_across_lines_keeps_line_placement() {
        let found = tags(&["# @param [Hash<Symbol,", "#   String>] opts"]);
        let types = found[0].types.as_ref().unwrap();
        assert_eq!(types.text, "Hash<Symbol,\n  String>");
        assert!(types.is_multiline());
        assert_eq!(types.line, 1);
        assert_eq!(types.columns, 12..24);

        // "String>" starts after the newline and two spaces of indent.
        assert_eq!(types.locate(15..21), Some((2, 6..12)));
        assert_eq!(types.locate(0..4), Some((1, 12..16)));
        assert_eq!(types.locate(0..22), None);
        assert_eq!(types.locate_to_line_end(5), (1, 17..24));
        assert_eq!(text(&found[0].name), Some("opts"));
    }

    #[test]
    fn test_content_strips_marker() {
        let line = CommentLine::new(1, 4, "#  @param x");
        assert_eq!(line.content(), (2, " @param x"));
        assert_eq!(line.end_column(), 15);
    }
}
