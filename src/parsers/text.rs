use super::ParseError;
use std::fmt::Display;
use std::iter::Peekable;
use std::str::Chars;

/// 1-based line and column of a character in the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Default for Position {
    fn default() -> Self { Self { line: 1, column: 1 } }
}

impl Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

/// Character stream over a complete text buffer that keeps track of the
/// position of the current character.
#[derive(Debug, Clone)]
pub struct InputStream<'a> {
    chars: Peekable<Chars<'a>>,
    position: Position,
}

impl<'a> InputStream<'a> {
    pub fn new(text: &'a str) -> Self {
        Self { chars: text.chars().peekable(), position: Position::default() }
    }

    /// The current character, without consuming it.
    pub fn peek(&mut self) -> Option<char> {
        self.chars.peek().copied()
    }

    /// Consumes and returns the current character.
    pub fn advance(&mut self) -> Option<char> {
        let character = self.chars.next()?;
        if character == '\n' {
            self.position.line += 1;
            self.position.column = 1;
        } else {
            self.position.column += 1;
        }
        Some(character)
    }

    pub fn is_eof(&mut self) -> bool {
        self.chars.peek().is_none()
    }

    /// Position of the current character.
    pub fn at(&self) -> Position {
        self.position
    }

    pub fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            _ = self.advance();
        }
    }
}

/// Reads a string enclosed in quotation marks.
///
/// The current character of `source` is taken as the opening quotation
/// mark; the string ends at the next occurrence of the same character.
///
/// With `use_escapes`, a backslash escapes the following character: `\r`,
/// `\n` and `\t` become the respective control characters, every other
/// escaped character (including the quotation mark itself) is copied
/// verbatim. With `include_quote_chars`, the quotation marks are part of the
/// returned string.
///
/// Fails with [ParseError::UnterminatedString] if the input ends before the
/// closing quotation mark or directly after an escaping backslash.
pub fn parse_quoted_string(
    source: &mut InputStream<'_>,
    use_escapes: bool,
    include_quote_chars: bool,
) -> Result<String, ParseError> {
    let start = source.at();
    let Some(quote_char) = source.advance() else {
        return Ok(String::new());
    };

    let mut value = String::new();
    if include_quote_chars {
        value.push(quote_char);
    }

    loop {
        let Some(character) = source.advance() else {
            return Err(ParseError::UnterminatedString { at: start });
        };

        if character == quote_char {
            break;
        }

        if character == '\\' && use_escapes {
            let Some(escaped) = source.advance() else {
                return Err(ParseError::UnterminatedString { at: start });
            };
            value.push(match escaped {
                'r' => '\r',
                'n' => '\n',
                't' => '\t',
                other => other,
            });
        } else {
            value.push(character);
        }
    }

    if include_quote_chars {
        value.push(quote_char);
    }
    Ok(value)
}
