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

//! Parser and tokenizer for property path expressions
//!
//! Converts expression text into an [`Expression`]: the source text paired
//! with its abstract syntax tree.

pub mod error;
pub mod path;
pub mod span;
pub mod tokenizer;

use std::fmt;

use crate::ast::ExpressionNode;

pub use error::{ParseError, ParseResult};
pub use path::{PathParser, parse_expression};
pub use span::Spanned;
pub use tokenizer::{Token, Tokenizer};

/// A parsed expression
///
/// Immutable once built. Two expressions are the same expression when their
/// source text is identical.
#[derive(Debug, Clone)]
pub struct Expression {
    source: String,
    root: ExpressionNode,
}

impl Expression {
    /// Parse `source` into an expression
    pub fn parse(source: &str) -> ParseResult<Self> {
        let root = parse_expression(source)?;
        Ok(Self {
            source: source.to_string(),
            root,
        })
    }

    /// Original expression text
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Root node of the syntax tree
    pub fn root(&self) -> &ExpressionNode {
        &self.root
    }
}

impl PartialEq for Expression {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl Eq for Expression {}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}
