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

//! Stack of objects currently being worked on
//!
//! Lookups search from the top frame down, so the innermost object shadows
//! the ones beneath it.

use super::context::EvaluationContext;
use crate::cache::BeanInfoCache;
use crate::engine::ExpressionEngine;
use crate::model::Value;

/// Keyword addressing the top frame
pub const TOP_KEYWORD: &str = "top";

/// Explicit stack of values
#[derive(Debug, Clone, Default)]
pub struct ValueStack {
    frames: Vec<Value>,
}

impl ValueStack {
    /// Create an empty stack
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a value
    pub fn push(&mut self, value: Value) {
        self.frames.push(value);
    }

    /// Pop the top value
    pub fn pop(&mut self) -> Option<Value> {
        self.frames.pop()
    }

    /// Top value
    pub fn peek(&self) -> Option<&Value> {
        self.frames.last()
    }

    /// Number of frames
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Whether the stack is empty
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Frames from top to bottom
    pub fn iter(&self) -> impl Iterator<Item = &Value> {
        self.frames.iter().rev()
    }

    /// The object an assignment to `property` would land on
    ///
    /// `top` names the top frame; otherwise the first frame, searching from
    /// the top, whose bean declares `property` or whose map holds the key.
    pub fn find_target(&self, property: &str, beans: &BeanInfoCache) -> Option<Value> {
        if property == TOP_KEYWORD {
            return self.peek().cloned();
        }

        self.iter()
            .find(|frame| match frame {
                Value::Object(obj) => beans.for_object(obj).has_property(property),
                Value::Map(entries) => entries.read().contains_key(property),
                _ => false,
            })
            .cloned()
    }

    /// Evaluate `expression` against the stack
    ///
    /// When a frame declares the leading property, the expression is
    /// evaluated on that frame alone. Otherwise the first non-null result
    /// from the top wins, frames where evaluation fails are skipped, and
    /// `null` is returned when no frame yields a value.
    pub fn find_value(
        &self,
        expression: &str,
        engine: &ExpressionEngine,
        ctx: &mut EvaluationContext,
    ) -> Value {
        if expression == TOP_KEYWORD {
            return self.peek().cloned().unwrap_or_default();
        }

        let head = expression
            .split(['.', '[', '('])
            .next()
            .unwrap_or(expression)
            .trim();
        if let Some(target) = self.find_target(head, engine.state().beans()) {
            return engine
                .get_value(expression, ctx, &target)
                .unwrap_or_else(|err| {
                    log::debug!("'{expression}' not resolvable on its target frame: {err}");
                    Value::Null
                });
        }

        for frame in self.iter() {
            match engine.get_value(expression, ctx, frame) {
                Ok(value) if !value.is_null() => return value,
                Ok(_) => {}
                Err(err) => log::debug!("'{expression}' not resolvable on stack frame: {err}"),
            }
        }
        Value::Null
    }
}
