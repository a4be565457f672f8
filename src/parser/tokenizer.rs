// Copyright 2024 OctoFHIR Team
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Tokenizer for property path expressions
//!
//! Tokens borrow from the input; string literal contents are returned raw and
//! escape sequences are resolved by the parser.

use std::borrow::Cow;
use unicode_xid::UnicodeXID;

use super::error::{ParseError, ParseResult};
use super::span::Spanned;

/// Token with zero-copy string slices
#[derive(Debug, Clone, PartialEq)]
pub enum Token<'input> {
    /// Integer literal (e.g., 42, -7)
    Integer(i64),
    /// Decimal literal as string slice, parsed on demand (e.g., 3.14)
    Decimal(&'input str),
    /// String literal contents without quotes, escapes unresolved
    String(&'input str),
    /// Identifier token
    Identifier(&'input str),
    /// `true`
    True,
    /// `false`
    False,
    /// `null`
    Null,
    /// Dot operator (.) for property access
    Dot,
    /// Comma separator (,)
    Comma,
    /// Variable marker (#)
    Hash,
    /// Left parenthesis (
    LeftParen,
    /// Right parenthesis )
    RightParen,
    /// Left square bracket [
    LeftBracket,
    /// Right square bracket ]
    RightBracket,
}

impl<'input> Token<'input> {
    /// Get keyword from string
    #[inline]
    pub fn from_keyword(s: &str) -> Option<Token<'input>> {
        match s {
            "true" => Some(Token::True),
            "false" => Some(Token::False),
            "null" => Some(Token::Null),
            _ => None,
        }
    }

    /// Keyword text, for contexts where keywords act as plain names
    pub fn keyword_text(&self) -> Option<&'static str> {
        match self {
            Token::True => Some("true"),
            Token::False => Some("false"),
            Token::Null => Some("null"),
            _ => None,
        }
    }

    /// Short rendering used in error messages
    pub fn describe(&self) -> Cow<'static, str> {
        match self {
            Token::Integer(i) => Cow::Owned(i.to_string()),
            Token::Decimal(d) => Cow::Owned((*d).to_string()),
            Token::String(s) => Cow::Owned(format!("'{s}'")),
            Token::Identifier(s) => Cow::Owned((*s).to_string()),
            Token::True => Cow::Borrowed("true"),
            Token::False => Cow::Borrowed("false"),
            Token::Null => Cow::Borrowed("null"),
            Token::Dot => Cow::Borrowed("."),
            Token::Comma => Cow::Borrowed(","),
            Token::Hash => Cow::Borrowed("#"),
            Token::LeftParen => Cow::Borrowed("("),
            Token::RightParen => Cow::Borrowed(")"),
            Token::LeftBracket => Cow::Borrowed("["),
            Token::RightBracket => Cow::Borrowed("]"),
        }
    }
}

#[inline(always)]
fn lookup_single_char_operator(byte: u8) -> Option<Token<'static>> {
    match byte {
        b'.' => Some(Token::Dot),
        b',' => Some(Token::Comma),
        b'#' => Some(Token::Hash),
        b'(' => Some(Token::LeftParen),
        b')' => Some(Token::RightParen),
        b'[' => Some(Token::LeftBracket),
        b']' => Some(Token::RightBracket),
        _ => None,
    }
}

fn is_id_start(ch: char) -> bool {
    ch == '_' || ch == '$' || UnicodeXID::is_xid_start(ch)
}

fn is_id_continue(ch: char) -> bool {
    ch == '$' || UnicodeXID::is_xid_continue(ch)
}

/// Streaming tokenizer
#[derive(Clone)]
pub struct Tokenizer<'input> {
    input: &'input str,
    bytes: &'input [u8],
    pos: usize,
}

impl<'input> Tokenizer<'input> {
    /// Create a tokenizer over `input`
    #[inline]
    pub fn new(input: &'input str) -> Self {
        Self {
            input,
            bytes: input.as_bytes(),
            pos: 0,
        }
    }

    /// Current byte offset
    pub fn position(&self) -> usize {
        self.pos
    }

    #[inline(always)]
    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.peek_char() {
            if ch.is_whitespace() {
                self.pos += ch.len_utf8();
            } else {
                break;
            }
        }
    }

    #[inline(always)]
    fn peek_char(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn parse_identifier(&mut self) -> &'input str {
        let start = self.pos;
        while let Some(ch) = self.peek_char() {
            if is_id_continue(ch) {
                self.pos += ch.len_utf8();
            } else {
                break;
            }
        }
        &self.input[start..self.pos]
    }

    fn parse_number(&mut self) -> ParseResult<Token<'input>> {
        let start = self.pos;
        if self.bytes[self.pos] == b'-' {
            self.pos += 1;
        }
        while self.pos < self.bytes.len() && self.bytes[self.pos].is_ascii_digit() {
            self.pos += 1;
        }

        let is_decimal = self.pos + 1 < self.bytes.len()
            && self.bytes[self.pos] == b'.'
            && self.bytes[self.pos + 1].is_ascii_digit();

        if is_decimal {
            self.pos += 1;
            while self.pos < self.bytes.len() && self.bytes[self.pos].is_ascii_digit() {
                self.pos += 1;
            }
            return Ok(Token::Decimal(&self.input[start..self.pos]));
        }

        let text = &self.input[start..self.pos];
        text.parse::<i64>()
            .map(Token::Integer)
            .map_err(|_| ParseError::InvalidLiteral {
                literal_type: Cow::Borrowed("integer"),
                value: text.to_string(),
                position: start,
            })
    }

    fn parse_string_literal(&mut self) -> ParseResult<&'input str> {
        let start = self.pos;
        let quote = self.bytes[self.pos];
        self.pos += 1;
        let content_start = self.pos;

        while self.pos < self.bytes.len() {
            match self.bytes[self.pos] {
                b'\\' => {
                    self.pos += if self.pos + 1 < self.bytes.len() { 2 } else { 1 };
                }
                b if b == quote => {
                    let content = &self.input[content_start..self.pos];
                    self.pos += 1;
                    return Ok(content);
                }
                _ => self.pos += 1,
            }
        }

        Err(ParseError::UnclosedString { position: start })
    }

    /// Next token with its span, `None` at end of input
    pub fn next_token(&mut self) -> ParseResult<Option<Spanned<Token<'input>>>> {
        self.skip_whitespace();

        if self.pos >= self.bytes.len() {
            return Ok(None);
        }

        let start = self.pos;
        let byte = self.bytes[self.pos];

        if let Some(token) = lookup_single_char_operator(byte) {
            self.pos += 1;
            return Ok(Some(Spanned::new(token, start, self.pos)));
        }

        let token = match byte {
            b'0'..=b'9' => self.parse_number()?,
            b'-' if self
                .bytes
                .get(self.pos + 1)
                .is_some_and(|b| b.is_ascii_digit()) =>
            {
                self.parse_number()?
            }
            b'\'' | b'"' => Token::String(self.parse_string_literal()?),
            _ => match self.peek_char() {
                Some(ch) if is_id_start(ch) => {
                    let ident = self.parse_identifier();
                    Token::from_keyword(ident).unwrap_or(Token::Identifier(ident))
                }
                Some(ch) => {
                    return Err(ParseError::UnexpectedToken {
                        token: Cow::Owned(ch.to_string()),
                        position: start,
                    });
                }
                None => return Ok(None),
            },
        };

        Ok(Some(Spanned::new(token, start, self.pos)))
    }

    /// Tokenize the whole input
    pub fn tokenize_all(&mut self) -> ParseResult<Vec<Spanned<Token<'input>>>> {
        let mut tokens = Vec::with_capacity(16);
        while let Some(token) = self.next_token()? {
            tokens.push(token);
        }
        Ok(tokens)
    }
}
