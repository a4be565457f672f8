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

//! Per-validation state: the value stack and the engine used to read fields

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use crate::error::{ValidationError, ValidationResult};
use crate::engine::ExpressionEngine;
use crate::evaluator::{EvaluationContext, ValueStack};
use crate::model::Value;

static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$\{([^}]+)\}").expect("placeholder pattern is valid"));

/// State shared by the validators of one validation run
///
/// Owns the value stack. Objects being validated are pushed with
/// [`enter`](Self::enter) and popped when the returned frame drops.
#[derive(Debug)]
pub struct ValidationSession {
    stack: ValueStack,
    context: EvaluationContext,
    engine: Arc<ExpressionEngine>,
    action_name: String,
}

impl ValidationSession {
    /// Session for the action named `action_name`
    pub fn new(engine: Arc<ExpressionEngine>, action_name: impl Into<String>) -> Self {
        Self {
            stack: ValueStack::new(),
            context: EvaluationContext::new(),
            engine,
            action_name: action_name.into(),
        }
    }

    /// Name of the action being validated
    pub fn action_name(&self) -> &str {
        &self.action_name
    }

    /// Engine used to read fields
    pub fn engine(&self) -> &Arc<ExpressionEngine> {
        &self.engine
    }

    /// Objects currently being validated
    pub fn stack(&self) -> &ValueStack {
        &self.stack
    }

    /// Stack depth
    pub fn depth(&self) -> usize {
        self.stack.depth()
    }

    /// Context used for field reads
    pub fn context_mut(&mut self) -> &mut EvaluationContext {
        &mut self.context
    }

    /// Push `value` until the returned frame drops
    pub fn enter(&mut self, value: Value) -> SessionFrame<'_> {
        self.stack.push(value);
        SessionFrame { session: self }
    }

    /// Read `field` from `object`
    pub fn field_value(&mut self, field: &str, object: &Value) -> ValidationResult<Value> {
        self.engine
            .get_value(field, &mut self.context, object)
            .map_err(|source| ValidationError::FieldValue {
                field: field.to_string(),
                source,
            })
    }

    /// Evaluate `expression` against the stack, top frame first
    pub fn find_value(&mut self, expression: &str) -> Value {
        self.stack
            .find_value(expression, &self.engine, &mut self.context)
    }

    /// Replace every `${expr}` in `message` with its value on the stack
    ///
    /// Unresolvable expressions render as the empty string.
    pub fn translate(&mut self, message: &str) -> String {
        if !message.contains("${") {
            return message.to_string();
        }

        PLACEHOLDER
            .replace_all(message, |caps: &Captures<'_>| {
                match self.find_value(caps[1].trim()) {
                    Value::Null => String::new(),
                    Value::String(s) => s,
                    other => other.to_string(),
                }
            })
            .into_owned()
    }
}

/// Guard popping its value off the session stack on drop
#[derive(Debug)]
pub struct SessionFrame<'a> {
    session: &'a mut ValidationSession,
}

impl Deref for SessionFrame<'_> {
    type Target = ValidationSession;

    fn deref(&self) -> &Self::Target {
        self.session
    }
}

impl DerefMut for SessionFrame<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.session
    }
}

impl Drop for SessionFrame<'_> {
    fn drop(&mut self) {
        self.session.stack.pop();
    }
}
