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

//! Expression AST node definitions

use smallvec::SmallVec;
use std::fmt;

/// AST representation of property path expressions
///
/// Large variants are boxed to keep the enum small.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ExpressionNode {
    /// Literal value
    Literal(LiteralValue),

    /// Property name resolved against the root
    Identifier(String),

    /// Context variable (`#name`)
    Variable(String),

    /// Property navigation (`base.path`)
    Path {
        /// Base expression
        base: Box<ExpressionNode>,
        /// Property name
        path: String,
    },

    /// Index access (`base[index]`)
    Index {
        /// Base expression
        base: Box<ExpressionNode>,
        /// Index expression
        index: Box<ExpressionNode>,
    },

    /// Method invoked on the root (`name(args)`)
    FunctionCall(Box<FunctionCallData>),

    /// Method invoked on an expression (`base.method(args)`)
    MethodCall(Box<MethodCallData>),
}

/// Function call data
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FunctionCallData {
    /// Function name
    pub name: String,
    /// Arguments
    pub args: SmallVec<[ExpressionNode; 4]>,
}

/// Method call data
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MethodCallData {
    /// Receiver expression
    pub base: ExpressionNode,
    /// Method name
    pub method: String,
    /// Arguments
    pub args: SmallVec<[ExpressionNode; 4]>,
}

/// Literal values
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LiteralValue {
    /// `null`
    Null,
    /// `true` / `false`
    Boolean(bool),
    /// Integer literal
    Integer(i64),
    /// Decimal literal (stored as string to preserve precision)
    Decimal(String),
    /// String literal, escapes already resolved
    String(String),
}

impl ExpressionNode {
    /// Create a literal expression
    pub fn literal(value: LiteralValue) -> Self {
        Self::Literal(value)
    }

    /// Create an identifier expression
    pub fn identifier(name: impl Into<String>) -> Self {
        Self::Identifier(name.into())
    }

    /// Create a variable reference
    pub fn variable(name: impl Into<String>) -> Self {
        Self::Variable(name.into())
    }

    /// Create a path navigation expression
    pub fn path(base: ExpressionNode, path: impl Into<String>) -> Self {
        Self::Path {
            base: Box::new(base),
            path: path.into(),
        }
    }

    /// Create an index access expression
    pub fn index(base: ExpressionNode, index: ExpressionNode) -> Self {
        Self::Index {
            base: Box::new(base),
            index: Box::new(index),
        }
    }

    /// Create a function call expression
    pub fn function_call(
        name: impl Into<String>,
        args: impl Into<SmallVec<[ExpressionNode; 4]>>,
    ) -> Self {
        Self::FunctionCall(Box::new(FunctionCallData {
            name: name.into(),
            args: args.into(),
        }))
    }

    /// Create a method call expression
    pub fn method_call(
        base: ExpressionNode,
        method: impl Into<String>,
        args: impl Into<SmallVec<[ExpressionNode; 4]>>,
    ) -> Self {
        Self::MethodCall(Box::new(MethodCallData {
            base,
            method: method.into(),
            args: args.into(),
        }))
    }

    /// Check if this is an identifier
    pub fn is_identifier(&self) -> bool {
        matches!(self, Self::Identifier(_))
    }

    /// Get identifier name if this is an identifier
    pub fn as_identifier(&self) -> Option<&str> {
        match self {
            Self::Identifier(name) => Some(name),
            _ => None,
        }
    }

    /// Get literal if this is a literal
    pub fn as_literal(&self) -> Option<&LiteralValue> {
        match self {
            Self::Literal(lit) => Some(lit),
            _ => None,
        }
    }

    /// Property names of a plain `a.b.c` chain rooted at an identifier
    ///
    /// Returns `None` for anything involving indexing, variables, literals
    /// or method calls.
    pub fn property_chain(&self) -> Option<SmallVec<[&str; 4]>> {
        match self {
            Self::Identifier(name) => {
                let mut chain = SmallVec::new();
                chain.push(name.as_str());
                Some(chain)
            }
            Self::Path { base, path } => {
                let mut chain = base.property_chain()?;
                chain.push(path.as_str());
                Some(chain)
            }
            _ => None,
        }
    }

    /// Whether the expression can be the target of an assignment
    pub fn is_assignable(&self) -> bool {
        matches!(
            self,
            Self::Identifier(_) | Self::Variable(_) | Self::Path { .. } | Self::Index { .. }
        )
    }

    /// Number of nodes in the tree
    pub fn complexity(&self) -> usize {
        match self {
            Self::Literal(_) | Self::Identifier(_) | Self::Variable(_) => 1,
            Self::Path { base, .. } => 1 + base.complexity(),
            Self::Index { base, index } => 1 + base.complexity() + index.complexity(),
            Self::FunctionCall(data) => {
                1 + data.args.iter().map(ExpressionNode::complexity).sum::<usize>()
            }
            Self::MethodCall(data) => {
                1 + data.base.complexity()
                    + data.args.iter().map(ExpressionNode::complexity).sum::<usize>()
            }
        }
    }
}

fn write_args(f: &mut fmt::Formatter<'_>, args: &[ExpressionNode]) -> fmt::Result {
    f.write_str("(")?;
    for (i, arg) in args.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{arg}")?;
    }
    f.write_str(")")
}

impl fmt::Display for ExpressionNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(lit) => write!(f, "{lit}"),
            Self::Identifier(name) => f.write_str(name),
            Self::Variable(name) => write!(f, "#{name}"),
            Self::Path { base, path } => write!(f, "{base}.{path}"),
            Self::Index { base, index } => write!(f, "{base}[{index}]"),
            Self::FunctionCall(data) => {
                f.write_str(&data.name)?;
                write_args(f, &data.args)
            }
            Self::MethodCall(data) => {
                write!(f, "{}.{}", data.base, data.method)?;
                write_args(f, &data.args)
            }
        }
    }
}

impl fmt::Display for LiteralValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Boolean(b) => write!(f, "{b}"),
            Self::Integer(i) => write!(f, "{i}"),
            Self::Decimal(d) => f.write_str(d),
            Self::String(s) => {
                f.write_str("'")?;
                for ch in s.chars() {
                    match ch {
                        '\'' => f.write_str("\\'")?,
                        '\\' => f.write_str("\\\\")?,
                        '\n' => f.write_str("\\n")?,
                        '\t' => f.write_str("\\t")?,
                        c => write!(f, "{c}")?,
                    }
                }
                f.write_str("'")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_property_chain() {
        let expr = ExpressionNode::path(
            ExpressionNode::path(ExpressionNode::identifier("user"), "address"),
            "city",
        );
        assert_eq!(
            expr.property_chain().unwrap().as_slice(),
            ["user", "address", "city"]
        );

        let indexed = ExpressionNode::index(
            ExpressionNode::identifier("items"),
            ExpressionNode::literal(LiteralValue::Integer(0)),
        );
        assert!(indexed.property_chain().is_none());
        assert!(ExpressionNode::variable("root").property_chain().is_none());
    }

    #[test]
    fn test_display_renders_source_form() {
        let expr = ExpressionNode::method_call(
            ExpressionNode::index(
                ExpressionNode::variable("root"),
                ExpressionNode::literal(LiteralValue::String("it's".into())),
            ),
            "get",
            vec![ExpressionNode::literal(LiteralValue::Integer(1))],
        );
        assert_eq!(expr.to_string(), "#root['it\\'s'].get(1)");
        assert_eq!(expr.complexity(), 5);
    }

    #[test]
    fn test_assignable_forms() {
        assert!(ExpressionNode::identifier("a").is_assignable());
        assert!(ExpressionNode::variable("a").is_assignable());
        assert!(!ExpressionNode::literal(LiteralValue::Null).is_assignable());
        assert!(!ExpressionNode::function_call("f", vec![]).is_assignable());
    }
}
