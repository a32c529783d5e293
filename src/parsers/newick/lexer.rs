use super::super::ParseError;
use super::super::text::{InputStream, Position, parse_quoted_string};
use std::fmt::Display;

/// Checks if a character ends an unquoted NEWICK symbol.
pub(crate) fn is_symbol_delimiter(character: char) -> bool {
    character.is_whitespace()
        || matches!(character, '(' | ')' | ',' | ':' | ';' | '[' | '{')
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum TokenKind {
    OpenParen,
    CloseParen,
    Comma,
    Colon,
    Semicolon,
    /// Unquoted name or number.
    Symbol(String),
    /// Quoted name, with quotation marks removed and escapes resolved.
    Quoted(String),
    /// Content of a `[...]` comment.
    Comment(String),
    /// Content of a `{...}` tag.
    Tag(String),
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Token {
    pub(crate) kind: TokenKind,
    pub(crate) at: Position,
}

impl Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenKind::OpenParen => write!(f, "'('"),
            TokenKind::CloseParen => write!(f, "')'"),
            TokenKind::Comma => write!(f, "','"),
            TokenKind::Colon => write!(f, "':'"),
            TokenKind::Semicolon => write!(f, "';'"),
            TokenKind::Symbol(symbol) => write!(f, "symbol '{symbol}'"),
            TokenKind::Quoted(name) => write!(f, "quoted name '{name}'"),
            TokenKind::Comment(comment) => write!(f, "comment '[{comment}]'"),
            TokenKind::Tag(tag) => write!(f, "tag '{{{tag}}}'"),
        }
    }
}

/// Splits NEWICK text into tokens, skipping whitespace between them.
#[derive(Debug, Clone)]
pub(crate) struct NewickLexer<'a> {
    source: InputStream<'a>,
}

impl<'a> NewickLexer<'a> {
    pub(crate) fn new(text: &'a str) -> Self {
        Self { source: InputStream::new(text) }
    }

    /// Position of the next unread character.
    pub(crate) fn at(&self) -> Position {
        self.source.at()
    }

    fn read_token(&mut self) -> Result<Option<Token>, ParseError> {
        self.source.skip_whitespace();
        let at = self.source.at();
        let Some(character) = self.source.peek() else {
            return Ok(None);
        };

        let kind = match character {
            '(' | ')' | ',' | ':' | ';' => {
                _ = self.source.advance();
                match character {
                    '(' => TokenKind::OpenParen,
                    ')' => TokenKind::CloseParen,
                    ',' => TokenKind::Comma,
                    ':' => TokenKind::Colon,
                    _ => TokenKind::Semicolon,
                }
            }
            '\'' | '"' => TokenKind::Quoted(parse_quoted_string(
                &mut self.source,
                true,
                false,
            )?),
            '[' => TokenKind::Comment(
                self.read_bracketed('[', ']')
                    .ok_or(ParseError::UnterminatedComment { at })?,
            ),
            '{' => TokenKind::Tag(
                self.read_bracketed('{', '}')
                    .ok_or(ParseError::UnterminatedTag { at })?,
            ),
            ']' | '}' => {
                return Err(ParseError::UnexpectedChar { character, at });
            }
            _ => TokenKind::Symbol(self.read_symbol()),
        };

        Ok(Some(Token { kind, at }))
    }

    /// Reads a bracketed block, allowing nested brackets of the same kind.
    /// Returns `None` if the input ends before the block is closed.
    fn read_bracketed(&mut self, open: char, close: char) -> Option<String> {
        _ = self.source.advance();
        let mut depth: usize = 1;
        let mut content = String::new();
        loop {
            let character = self.source.advance()?;
            if character == open {
                depth += 1;
            } else if character == close {
                depth -= 1;
                if depth == 0 {
                    return Some(content);
                }
            }
            content.push(character);
        }
    }

    fn read_symbol(&mut self) -> String {
        let mut symbol = String::new();
        while let Some(character) = self.source.peek() {
            if is_symbol_delimiter(character) {
                break;
            }
            symbol.push(character);
            _ = self.source.advance();
        }
        symbol
    }
}

impl Iterator for NewickLexer<'_> {
    type Item = Result<Token, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.read_token().transpose()
    }
}
