//! Strict parsing for the file-enumeration answer.
//!
//! The enumeration prompt demands a bare list of quoted path strings,
//! and models typically comply with either Python-style single quotes
//! or JSON-style double quotes. This module validates the whole answer
//! against exactly that grammar instead of evaluating it as a literal;
//! anything else, including surrounding prose, is rejected.

use std::fmt::{self, Display};

/// The answer text is not a valid list-of-strings literal.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseError {
    message: &'static str,
    position: usize,
}

impl ParseError {
    #[inline]
    fn new(message: &'static str, position: usize) -> Self {
        Self { message, position }
    }

    /// Byte offset in the input at which parsing failed.
    #[inline]
    pub fn position(&self) -> usize {
        self.position
    }
}

impl Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at offset {}", self.message, self.position)
    }
}

impl std::error::Error for ParseError {}

/// Parses a list-of-strings literal like `['a.py', "b.py"]`.
///
/// Surrounding whitespace is ignored and a trailing comma inside the
/// brackets is accepted; everything else must match the grammar.
pub fn parse_path_list(input: &str) -> Result<Vec<String>, ParseError> {
    let mut cursor = Cursor::new(input);
    cursor.skip_whitespace();
    cursor.expect('[', "expected '['")?;

    let mut paths = Vec::new();
    loop {
        cursor.skip_whitespace();
        if cursor.eat(']') {
            break;
        }
        paths.push(cursor.parse_string()?);
        cursor.skip_whitespace();
        if cursor.eat(',') {
            continue;
        }
        cursor.expect(']', "expected ',' or ']'")?;
        break;
    }

    cursor.skip_whitespace();
    if !cursor.at_end() {
        return Err(ParseError::new(
            "trailing characters after list",
            cursor.position,
        ));
    }
    Ok(paths)
}

struct Cursor<'a> {
    input: &'a str,
    position: usize,
}

impl<'a> Cursor<'a> {
    #[inline]
    fn new(input: &'a str) -> Self {
        Self { input, position: 0 }
    }

    #[inline]
    fn peek(&self) -> Option<char> {
        self.input[self.position..].chars().next()
    }

    #[inline]
    fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.position += ch.len_utf8();
        Some(ch)
    }

    #[inline]
    fn at_end(&self) -> bool {
        self.position == self.input.len()
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn expect(
        &mut self,
        expected: char,
        message: &'static str,
    ) -> Result<(), ParseError> {
        if self.eat(expected) {
            Ok(())
        } else {
            Err(ParseError::new(message, self.position))
        }
    }

    fn parse_string(&mut self) -> Result<String, ParseError> {
        let quote = match self.peek() {
            Some(quote @ ('\'' | '"')) => {
                self.bump();
                quote
            }
            _ => {
                return Err(ParseError::new(
                    "expected a quoted string",
                    self.position,
                ));
            }
        };

        let mut value = String::new();
        loop {
            let Some(ch) = self.bump() else {
                return Err(ParseError::new(
                    "unterminated string",
                    self.position,
                ));
            };
            match ch {
                ch if ch == quote => return Ok(value),
                '\\' => {
                    let Some(escaped) = self.bump() else {
                        return Err(ParseError::new(
                            "unterminated string",
                            self.position,
                        ));
                    };
                    let resolved = match escaped {
                        '\\' => '\\',
                        '\'' => '\'',
                        '"' => '"',
                        'n' => '\n',
                        't' => '\t',
                        'r' => '\r',
                        _ => {
                            return Err(ParseError::new(
                                "unsupported escape sequence",
                                self.position,
                            ));
                        }
                    };
                    value.push(resolved);
                }
                ch => value.push(ch),
            }
        }
    }
}
