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

//! Per-call evaluation state

use rustc_hash::FxHashMap;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use crate::model::{TypeConverter, Value};

/// Mutable state an expression is evaluated in
///
/// Holds the current root object, named variables (`#name` in expressions)
/// and an optional type converter used when assigning to typed properties.
#[derive(Debug, Clone, Default)]
pub struct EvaluationContext {
    root: Value,
    variables: FxHashMap<String, Value>,
    converter: Option<Arc<dyn TypeConverter>>,
}

impl EvaluationContext {
    /// Create an empty context with a null root
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a context rooted at `root`
    pub fn with_root(root: Value) -> Self {
        Self {
            root,
            ..Self::default()
        }
    }

    /// Fresh context sharing only the type converter
    pub fn fork(&self) -> Self {
        Self {
            root: Value::Null,
            variables: FxHashMap::default(),
            converter: self.converter.clone(),
        }
    }

    /// Current root object
    pub fn root(&self) -> &Value {
        &self.root
    }

    /// Replace the root, returning the previous one
    pub fn set_root(&mut self, root: Value) -> Value {
        std::mem::replace(&mut self.root, root)
    }

    /// Swap in `root` until the returned guard is dropped
    ///
    /// The previous root is restored on every exit path, including early
    /// returns through `?` and unwinding.
    pub fn scoped_root(&mut self, root: Value) -> RootScope<'_> {
        let previous = self.set_root(root);
        RootScope {
            context: self,
            previous: Some(previous),
        }
    }

    /// Set a variable
    pub fn set_variable(&mut self, name: impl Into<String>, value: Value) {
        self.variables.insert(name.into(), value);
    }

    /// Get a variable
    pub fn get_variable(&self, name: &str) -> Option<&Value> {
        self.variables.get(name)
    }

    /// Install a type converter
    pub fn set_type_converter(&mut self, converter: Arc<dyn TypeConverter>) {
        self.converter = Some(converter);
    }

    /// Installed type converter, if any
    pub fn type_converter(&self) -> Option<&Arc<dyn TypeConverter>> {
        self.converter.as_ref()
    }
}

/// Guard restoring the previous root of an [`EvaluationContext`] on drop
#[derive(Debug)]
pub struct RootScope<'a> {
    context: &'a mut EvaluationContext,
    previous: Option<Value>,
}

impl Deref for RootScope<'_> {
    type Target = EvaluationContext;

    fn deref(&self) -> &Self::Target {
        self.context
    }
}

impl DerefMut for RootScope<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.context
    }
}

impl Drop for RootScope<'_> {
    fn drop(&mut self) {
        if let Some(previous) = self.previous.take() {
            self.context.root = previous;
        }
    }
}
