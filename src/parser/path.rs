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

//! Recursive descent parser for property path expressions
//!
//! Grammar:
//!
//! ```text
//! expression := postfix
//! postfix    := primary ( '.' IDENT args? | '[' expression ']' )*
//! primary    := IDENT args? | '#' IDENT | literal | '(' expression ')'
//! args       := '(' ( expression ( ',' expression )* )? ')'
//! literal    := INTEGER | DECIMAL | STRING | true | false | null
//! ```

use smallvec::SmallVec;
use std::borrow::Cow;

use super::error::{ParseError, ParseResult};
use super::span::Spanned;
use super::tokenizer::{Token, Tokenizer};
use crate::ast::{ExpressionNode, LiteralValue};

/// Parser pulling tokens from a [`Tokenizer`] one at a time
pub struct PathParser<'input> {
    tokenizer: Tokenizer<'input>,
    current_token: Option<Spanned<Token<'input>>>,
}

impl<'input> PathParser<'input> {
    /// Create a parser over `input`
    pub fn new(input: &'input str) -> Self {
        Self {
            tokenizer: Tokenizer::new(input),
            current_token: None,
        }
    }

    #[inline(always)]
    fn advance(&mut self) -> ParseResult<()> {
        self.current_token = self.tokenizer.next_token()?;
        Ok(())
    }

    #[inline(always)]
    fn current(&self) -> Option<&Token<'input>> {
        self.current_token.as_ref().map(|t| &t.value)
    }

    fn position(&self) -> usize {
        self.current_token
            .as_ref()
            .map_or_else(|| self.tokenizer.position(), |t| t.start)
    }

    fn unexpected(&self) -> ParseError {
        match &self.current_token {
            Some(token) => ParseError::UnexpectedToken {
                token: token.value.describe(),
                position: token.start,
            },
            None => ParseError::UnexpectedEndOfInput {
                position: self.tokenizer.position(),
            },
        }
    }

    fn expect(&mut self, expected: Token<'input>) -> ParseResult<()> {
        match self.current() {
            Some(token) if *token == expected => self.advance(),
            Some(_) => Err(ParseError::ExpectedToken {
                expected: Cow::Owned(format!("'{}'", expected.describe())),
                position: self.position(),
            }),
            None => Err(ParseError::UnexpectedEndOfInput {
                position: self.tokenizer.position(),
            }),
        }
    }

    /// Parse the complete input as a single expression
    pub fn parse(&mut self) -> ParseResult<ExpressionNode> {
        self.advance()?;
        if self.current_token.is_none() {
            return Err(ParseError::EmptyExpression);
        }

        let expr = self.parse_expression()?;

        if self.current_token.is_some() {
            return Err(self.unexpected());
        }

        Ok(expr)
    }

    fn parse_expression(&mut self) -> ParseResult<ExpressionNode> {
        let primary = self.parse_primary()?;
        self.parse_postfix(primary)
    }

    fn parse_primary(&mut self) -> ParseResult<ExpressionNode> {
        let Some(token) = self.current().cloned() else {
            return Err(self.unexpected());
        };
        let start = self.position();

        match token {
            Token::Identifier(name) => {
                self.advance()?;
                if let Some(Token::LeftParen) = self.current() {
                    let args = self.parse_arguments()?;
                    Ok(ExpressionNode::function_call(name, args))
                } else {
                    Ok(ExpressionNode::identifier(name))
                }
            }
            Token::Hash => {
                self.advance()?;
                match self.current() {
                    Some(Token::Identifier(name)) => {
                        let name = (*name).to_string();
                        self.advance()?;
                        Ok(ExpressionNode::variable(name))
                    }
                    _ => Err(ParseError::ExpectedToken {
                        expected: Cow::Borrowed("variable name after '#'"),
                        position: self.position(),
                    }),
                }
            }
            Token::Integer(i) => {
                self.advance()?;
                Ok(ExpressionNode::literal(LiteralValue::Integer(i)))
            }
            Token::Decimal(d) => {
                self.advance()?;
                Ok(ExpressionNode::literal(LiteralValue::Decimal(d.to_string())))
            }
            Token::String(raw) => {
                let value = Self::process_string_escapes(raw, start)?;
                self.advance()?;
                Ok(ExpressionNode::literal(LiteralValue::String(value)))
            }
            Token::True => {
                self.advance()?;
                Ok(ExpressionNode::literal(LiteralValue::Boolean(true)))
            }
            Token::False => {
                self.advance()?;
                Ok(ExpressionNode::literal(LiteralValue::Boolean(false)))
            }
            Token::Null => {
                self.advance()?;
                Ok(ExpressionNode::literal(LiteralValue::Null))
            }
            Token::LeftParen => {
                self.advance()?;
                let inner = self.parse_expression()?;
                self.expect(Token::RightParen)?;
                Ok(inner)
            }
            _ => Err(self.unexpected()),
        }
    }

    fn parse_postfix(&mut self, mut left: ExpressionNode) -> ParseResult<ExpressionNode> {
        loop {
            match self.current() {
                Some(Token::Dot) => {
                    self.advance()?;
                    left = self.parse_path_or_method(left)?;
                }
                Some(Token::LeftBracket) => {
                    self.advance()?;
                    let index = self.parse_expression()?;
                    self.expect(Token::RightBracket)?;
                    left = ExpressionNode::index(left, index);
                }
                _ => break,
            }
        }
        Ok(left)
    }

    fn parse_path_or_method(&mut self, base: ExpressionNode) -> ParseResult<ExpressionNode> {
        // Keywords are ordinary names after a dot
        let name = match self.current() {
            Some(Token::Identifier(name)) => (*name).to_string(),
            Some(token) => match token.keyword_text() {
                Some(keyword) => keyword.to_string(),
                None => {
                    return Err(ParseError::ExpectedToken {
                        expected: Cow::Borrowed("property name after '.'"),
                        position: self.position(),
                    });
                }
            },
            None => {
                return Err(ParseError::UnexpectedEndOfInput {
                    position: self.tokenizer.position(),
                });
            }
        };
        self.advance()?;

        if let Some(Token::LeftParen) = self.current() {
            let args = self.parse_arguments()?;
            Ok(ExpressionNode::method_call(base, name, args))
        } else {
            Ok(ExpressionNode::path(base, name))
        }
    }

    fn parse_arguments(&mut self) -> ParseResult<SmallVec<[ExpressionNode; 4]>> {
        self.expect(Token::LeftParen)?;
        let mut args = SmallVec::new();

        if let Some(Token::RightParen) = self.current() {
            self.advance()?;
            return Ok(args);
        }

        loop {
            args.push(self.parse_expression()?);
            match self.current() {
                Some(Token::Comma) => self.advance()?,
                Some(Token::RightParen) => {
                    self.advance()?;
                    return Ok(args);
                }
                Some(_) => {
                    return Err(ParseError::ExpectedToken {
                        expected: Cow::Borrowed("',' or ')'"),
                        position: self.position(),
                    });
                }
                None => return Err(self.unexpected()),
            }
        }
    }

    /// Resolve escape sequences in a string literal, including `\uXXXX`
    fn process_string_escapes(input: &str, position: usize) -> ParseResult<String> {
        let mut result = String::with_capacity(input.len());
        let mut chars = input.chars();

        while let Some(ch) = chars.next() {
            if ch != '\\' {
                result.push(ch);
                continue;
            }
            match chars.next() {
                Some('n') => result.push('\n'),
                Some('t') => result.push('\t'),
                Some('r') => result.push('\r'),
                Some('\\') => result.push('\\'),
                Some('\'') => result.push('\''),
                Some('"') => result.push('"'),
                Some('u') => {
                    let hex: String = chars.by_ref().take(4).collect();
                    let decoded = if hex.len() == 4 {
                        u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32)
                    } else {
                        None
                    };
                    match decoded {
                        Some(c) => result.push(c),
                        None => {
                            return Err(ParseError::InvalidEscape {
                                sequence: Cow::Owned(format!("\\u{hex}")),
                                position,
                            });
                        }
                    }
                }
                Some(other) => {
                    return Err(ParseError::InvalidEscape {
                        sequence: Cow::Owned(format!("\\{other}")),
                        position,
                    });
                }
                None => {
                    return Err(ParseError::InvalidEscape {
                        sequence: Cow::Borrowed("\\"),
                        position,
                    });
                }
            }
        }

        Ok(result)
    }
}

/// Parse an expression string into an AST
pub fn parse_expression(input: &str) -> ParseResult<ExpressionNode> {
    PathParser::new(input).parse()
}
