//! Recursive-descent parser for YARD type expressions.
//!
//! Grammar:
//!
//! ```text
//! TopLevel := TypeExpr ("," TypeExpr)*
//! TypeExpr := Name? ( "<" TypeList ">" | "(" TypeList ")" | "{" TypeList "=>" TypeList "}" )
//!           | Name
//! Name     := "#" \w+ | ("::"? \w+)+
//! ```
//!
//! `;` is accepted as an alternative separator. Whitespace between tokens
//! is insignificant.

use std::ops::Range;

use thiserror::Error;

use super::node::TypeNode;

/// Nesting ceiling; deeper input fails with [`SyntaxErrorKind::TooDeep`].
pub const MAX_NESTING_DEPTH: usize = 64;

/// What went wrong while parsing a type expression.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyntaxErrorKind {
    #[error("invalid character at {0}")]
    InvalidCharacter(char),
    #[error("expecting END, got name '{0}'")]
    ExpectingEnd(String),
    #[error("expecting name, got {0}")]
    ExpectingName(String),
    #[error("expecting {expected}, got {found}")]
    Unexpected { expected: String, found: String },
    #[error("unclosed '{0}'")]
    Unclosed(char),
    #[error("expecting '=>' in hash collection, got {0}")]
    MissingArrow(String),
    #[error("type nesting exceeds {0} levels")]
    TooDeep(usize),
}

/// A syntax error with the byte offset of the first offending character.
///
/// For errors at end of input the offset equals the input length.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}")]
pub struct TypeSyntaxError {
    pub kind: SyntaxErrorKind,
    pub offset: usize,
}

impl TypeSyntaxError {
    fn new(kind: SyntaxErrorKind, offset: usize) -> Self {
        Self { kind, offset }
    }
}

/// A top-level alternative with its byte range in the parsed input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpannedType {
    pub node: TypeNode,
    pub span: Range<usize>,
}

/// Parse a comma-separated list of type expressions.
///
/// Empty (or whitespace-only) input yields an empty list.
pub fn parse(text: &str) -> Result<Vec<TypeNode>, TypeSyntaxError> {
    Ok(parse_spanned(text)?.into_iter().map(|s| s.node).collect())
}

/// Parse like [`parse`], keeping the source range of every alternative.
pub fn parse_spanned(text: &str) -> Result<Vec<SpannedType>, TypeSyntaxError> {
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }

    let mut parser = Parser::new(text);
    let items = parser.parse_list(0)?;
    let end = parser.next()?;
    match end.kind {
        TokenKind::End => Ok(items),
        TokenKind::Name(name) => Err(TypeSyntaxError::new(
            SyntaxErrorKind::ExpectingEnd(name),
            end.start,
        )),
        other => Err(TypeSyntaxError::new(
            SyntaxErrorKind::Unexpected {
                expected: "end of type".to_string(),
                found: other.to_string(),
            },
            end.start,
        )),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum TokenKind {
    Name(String),
    Lt,
    Gt,
    LParen,
    RParen,
    LBrace,
    RBrace,
    Arrow,
    Comma,
    End,
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenKind::Name(name) => write!(f, "name '{}'", name),
            TokenKind::Lt => write!(f, "'<'"),
            TokenKind::Gt => write!(f, "'>'"),
            TokenKind::LParen => write!(f, "'('"),
            TokenKind::RParen => write!(f, "')'"),
            TokenKind::LBrace => write!(f, "'{{'"),
            TokenKind::RBrace => write!(f, "'}}'"),
            TokenKind::Arrow => write!(f, "'=>'"),
            TokenKind::Comma => write!(f, "','"),
            TokenKind::End => write!(f, "end of input"),
        }
    }
}

#[derive(Debug, Clone)]
struct Token {
    kind: TokenKind,
    start: usize,
    end: usize,
}

/// Opening bracket of a collection and what closes it.
#[derive(Debug, Clone, Copy)]
enum Bracket {
    Angle,
    Paren,
    Brace,
}

impl Bracket {
    fn open_char(&self) -> char {
        match self {
            Bracket::Angle => '<',
            Bracket::Paren => '(',
            Bracket::Brace => '{',
        }
    }

    fn closer(&self) -> TokenKind {
        match self {
            Bracket::Angle => TokenKind::Gt,
            Bracket::Paren => TokenKind::RParen,
            Bracket::Brace => TokenKind::RBrace,
        }
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn word_len(s: &str) -> usize {
    s.char_indices()
        .find(|(_, c)| !is_word_char(*c))
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

/// Length of a `("::"? \w+)+` name at the start of `s`.
fn name_len(s: &str) -> usize {
    let mut len = 0;
    loop {
        let rest = &s[len..];
        let (prefix, body) = match rest.strip_prefix("::") {
            Some(body) => (2, body),
            None => (0, rest),
        };
        let word = word_len(body);
        if word == 0 {
            return len;
        }
        len += prefix + word;
    }
}

struct Lexer<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Lexer<'a> {
    fn next_token(&mut self) -> Result<Token, TypeSyntaxError> {
        let rest = &self.src[self.pos..];
        self.pos += rest.len() - rest.trim_start().len();

        let start = self.pos;
        let rest = &self.src[start..];
        let Some(c) = rest.chars().next() else {
            return Ok(Token {
                kind: TokenKind::End,
                start,
                end: start,
            });
        };

        let (kind, len) = match c {
            '<' => (TokenKind::Lt, 1),
            '>' => (TokenKind::Gt, 1),
            '(' => (TokenKind::LParen, 1),
            ')' => (TokenKind::RParen, 1),
            '{' => (TokenKind::LBrace, 1),
            '}' => (TokenKind::RBrace, 1),
            ',' | ';' => (TokenKind::Comma, 1),
            '=' if rest.starts_with("=>") => (TokenKind::Arrow, 2),
            '#' => {
                let len = 1 + word_len(&rest[1..]);
                if len == 1 {
                    return Err(TypeSyntaxError::new(
                        SyntaxErrorKind::InvalidCharacter(c),
                        start,
                    ));
                }
                (TokenKind::Name(rest[..len].to_string()), len)
            }
            _ => {
                let len = name_len(rest);
                if len == 0 {
                    return Err(TypeSyntaxError::new(
                        SyntaxErrorKind::InvalidCharacter(c),
                        start,
                    ));
                }
                (TokenKind::Name(rest[..len].to_string()), len)
            }
        };

        self.pos = start + len;
        Ok(Token {
            kind,
            start,
            end: start + len,
        })
    }
}

struct Parser<'a> {
    lexer: Lexer<'a>,
    peeked: Option<Token>,
    last_end: usize,
}

impl<'a> Parser<'a> {
    fn new(src: &'a str) -> Self {
        Self {
            lexer: Lexer { src, pos: 0 },
            peeked: None,
            last_end: 0,
        }
    }

    fn peek_kind(&mut self) -> Result<TokenKind, TypeSyntaxError> {
        let token = match self.peeked.take() {
            Some(token) => token,
            None => self.lexer.next_token()?,
        };
        let kind = token.kind.clone();
        self.peeked = Some(token);
        Ok(kind)
    }

    fn next(&mut self) -> Result<Token, TypeSyntaxError> {
        let token = match self.peeked.take() {
            Some(token) => token,
            None => self.lexer.next_token()?,
        };
        if token.kind != TokenKind::End {
            self.last_end = token.end;
        }
        Ok(token)
    }

    fn parse_list(&mut self, depth: usize) -> Result<Vec<SpannedType>, TypeSyntaxError> {
        let mut items = vec![self.parse_type(depth)?];
        while self.peek_kind()? == TokenKind::Comma {
            self.next()?;
            items.push(self.parse_type(depth)?);
        }
        Ok(items)
    }

    fn parse_type(&mut self, depth: usize) -> Result<SpannedType, TypeSyntaxError> {
        let token = self.next()?;
        let start = token.start;

        let (name, bracket) = match token.kind {
            TokenKind::Name(name) => {
                let bracket = match self.peek_kind()? {
                    TokenKind::Lt => Some(Bracket::Angle),
                    TokenKind::LParen => Some(Bracket::Paren),
                    TokenKind::LBrace => Some(Bracket::Brace),
                    _ => None,
                };
                match bracket {
                    Some(bracket) => {
                        self.next()?;
                        (name, bracket)
                    }
                    None => {
                        return Ok(SpannedType {
                            node: TypeNode::Simple { name },
                            span: start..self.last_end,
                        })
                    }
                }
            }
            TokenKind::Lt => (String::new(), Bracket::Angle),
            TokenKind::LParen => (String::new(), Bracket::Paren),
            TokenKind::LBrace => (String::new(), Bracket::Brace),
            other => {
                return Err(TypeSyntaxError::new(
                    SyntaxErrorKind::ExpectingName(other.to_string()),
                    token.start,
                ))
            }
        };

        if depth + 1 > MAX_NESTING_DEPTH {
            return Err(TypeSyntaxError::new(
                SyntaxErrorKind::TooDeep(MAX_NESTING_DEPTH),
                self.last_end - 1,
            ));
        }

        let node = match bracket {
            Bracket::Angle => {
                let args = self.parse_nodes(depth + 1)?;
                self.expect(bracket.closer(), bracket)?;
                TypeNode::Generic { name, args }
            }
            Bracket::Paren => {
                let elements = self.parse_nodes(depth + 1)?;
                self.expect(bracket.closer(), bracket)?;
                TypeNode::Tuple { name, elements }
            }
            Bracket::Brace => {
                let keys = self.parse_nodes(depth + 1)?;
                self.expect(TokenKind::Arrow, bracket)?;
                let values = self.parse_nodes(depth + 1)?;
                self.expect(bracket.closer(), bracket)?;
                TypeNode::Mapping { name, keys, values }
            }
        };

        Ok(SpannedType {
            node,
            span: start..self.last_end,
        })
    }

    fn parse_nodes(&mut self, depth: usize) -> Result<Vec<TypeNode>, TypeSyntaxError> {
        Ok(self
            .parse_list(depth)?
            .into_iter()
            .map(|s| s.node)
            .collect())
    }

    fn expect(&mut self, wanted: TokenKind, open: Bracket) -> Result<(), TypeSyntaxError> {
        let token = self.next()?;
        if token.kind == wanted {
            return Ok(());
        }

        let kind = match token.kind {
            TokenKind::End => SyntaxErrorKind::Unclosed(open.open_char()),
            TokenKind::Name(name) => SyntaxErrorKind::ExpectingEnd(name),
            found if wanted == TokenKind::Arrow => SyntaxErrorKind::MissingArrow(found.to_string()),
            found => SyntaxErrorKind::Unexpected {
                expected: wanted.to_string(),
                found: found.to_string(),
            },
        };
        Err(TypeSyntaxError::new(kind, token.start))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::node::{ARRAY, HASH};

    fn s(name: &str) -> TypeNode {
        TypeNode::simple(name)
    }

    #[test]
    fn test_empty_input_yields_empty_list() {
        assert_eq!(parse("").unwrap(), Vec::<TypeNode>::new());
        assert_eq!(parse("   ").unwrap(), Vec::<TypeNode>::new());
    }

    #[test]
    fn test_union_of_simple_types() {
        assert_eq!(
            parse("Integer, String").unwrap(),
            vec![s("Integer"), s("String")]
        );
        assert_eq!(parse("Integer; nil").unwrap(), vec![s("Integer"), s("nil")]);
    }

    #[test]
    fn test_space_separated_names_fail() {
        let err = parse("Integer String").unwrap_err();
        assert_eq!(err.kind, SyntaxErrorKind::ExpectingEnd("String".to_string()));
        assert_eq!(err.offset, 8);
        assert_eq!(err.to_string(), "expecting END, got name 'String'");
    }

    #[test]
    fn test_collections_named_and_elided() {
        assert_eq!(
            parse("Array<String>").unwrap(),
            vec![TypeNode::generic(ARRAY, vec![s("String")])]
        );
        assert_eq!(
            parse("<String>").unwrap(),
            vec![TypeNode::generic("", vec![s("String")])]
        );
        assert_eq!(
            parse("(String, Integer)").unwrap(),
            vec![TypeNode::tuple("", vec![s("String"), s("Integer")])]
        );
        assert_eq!(
            parse("Hash{Symbol, String => Object}").unwrap(),
            vec![TypeNode::mapping(
                HASH,
                vec![s("Symbol"), s("String")],
                vec![s("Object")]
            )]
        );
        assert_eq!(
            parse("{Symbol=>String}").unwrap(),
            vec![TypeNode::mapping("", vec![s("Symbol")], vec![s("String")])]
        );
    }

    #[test]
    fn test_nested_collections() {
        let parsed = parse("Array<{Symbol => <Integer>, List<Integer>}>").unwrap();
        assert_eq!(
            parsed,
            vec![TypeNode::generic(
                ARRAY,
                vec![TypeNode::mapping(
                    "",
                    vec![s("Symbol")],
                    vec![
                        TypeNode::generic("", vec![s("Integer")]),
                        TypeNode::generic("List", vec![s("Integer")]),
                    ]
                )]
            )]
        );
    }

    #[test]
    fn test_namespaced_and_duck_type_names() {
        assert_eq!(
            parse("::Foo::Bar, #to_s").unwrap(),
            vec![s("::Foo::Bar"), s("#to_s")]
        );
    }

    #[test]
    fn test_spans_cover_each_alternative() {
        let parsed = parse_spanned("String,  Array<Integer> ").unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].span, 0..6);
        assert_eq!(parsed[1].span, 9..23);
    }

    #[test]
    fn test_invalid_character_offset() {
        let err = parse("aaa|bbb").unwrap_err();
        assert_eq!(err.kind, SyntaxErrorKind::InvalidCharacter('|'));
        assert_eq!(err.offset, 3);
        assert_eq!(err.to_string(), "invalid character at |");
    }

    #[test]
    fn test_empty_brackets_fail() {
        let err = parse("Array<>").unwrap_err();
        assert_eq!(err.kind, SyntaxErrorKind::ExpectingName("'>'".to_string()));
        assert_eq!(err.offset, 6);
        assert!(parse("()").is_err());
        assert!(parse("{}").is_err());
    }

    #[test]
    fn test_unclosed_bracket() {
        let err = parse("Array<String").unwrap_err();
        assert_eq!(err.kind, SyntaxErrorKind::Unclosed('<'));
        assert_eq!(err.offset, 12);
    }

    #[test]
    fn test_mapping_without_arrow() {
        let err = parse("Hash{Symbol}").unwrap_err();
        assert_eq!(err.kind, SyntaxErrorKind::MissingArrow("'}'".to_string()));
        assert_eq!(err.offset, 11);
    }

    #[test]
    fn test_arrow_inside_angle_brackets() {
        let err = parse("Hash<Symbol=>Object>").unwrap_err();
        assert_eq!(err.offset, 11);
        assert!(matches!(err.kind, SyntaxErrorKind::Unexpected { .. }));
    }

    #[test]
    fn test_token_after_closing_bracket() {
        let err = parse("Array<String> Foo").unwrap_err();
        assert_eq!(err.kind, SyntaxErrorKind::ExpectingEnd("Foo".to_string()));
        let err = parse("Array<String><Integer>").unwrap_err();
        assert_eq!(err.offset, 13);
    }

    #[test]
    fn test_trailing_separator_fails() {
        let err = parse("String,").unwrap_err();
        assert_eq!(
            err.kind,
            SyntaxErrorKind::ExpectingName("end of input".to_string())
        );
        assert_eq!(err.offset, 7);
    }

    #[test]
    fn test_nesting_ceiling() {
        let deep = format!("{}String{}", "<".repeat(80), ">".repeat(80));
        let err = parse(&deep).unwrap_err();
        assert_eq!(err.kind, SyntaxErrorKind::TooDeep(MAX_NESTING_DEPTH));

        let ok = format!("{}String{}", "<".repeat(10), ">".repeat(10));
        assert!(parse(&ok).is_ok());
    }

    #[test]
    fn test_non_ascii_input_does_not_panic() {
        assert!(parse("Straße<ü>").is_ok());
        assert!(parse("String → Integer").is_err());
    }
}
