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

//! Destinations for validation errors

use indexmap::IndexMap;
use serde::Serialize;

/// Receives errors reported by validators
pub trait ErrorSink {
    /// Record an error against a field
    fn add_field_error(&mut self, field: &str, message: &str);

    /// Record an error not tied to a field
    fn add_action_error(&mut self, message: &str);

    /// Name a field error on `field` would be recorded under
    fn full_field_name(&self, field: &str) -> String {
        field.to_string()
    }

    /// Whether any error has been recorded
    fn has_errors(&self) -> bool;
}

/// Collecting sink
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ValidationErrors {
    field_errors: IndexMap<String, Vec<String>>,
    action_errors: Vec<String>,
}

impl ValidationErrors {
    /// Create an empty collection
    pub fn new() -> Self {
        Self::default()
    }

    /// Field errors in the order fields first failed
    pub fn field_errors(&self) -> &IndexMap<String, Vec<String>> {
        &self.field_errors
    }

    /// Messages recorded against `field`
    pub fn field_errors_for(&self, field: &str) -> &[String] {
        self.field_errors.get(field).map_or(&[], Vec::as_slice)
    }

    /// Errors not tied to a field
    pub fn action_errors(&self) -> &[String] {
        &self.action_errors
    }

    /// Whether any field error was recorded
    pub fn has_field_errors(&self) -> bool {
        !self.field_errors.is_empty()
    }

    /// Whether any action error was recorded
    pub fn has_action_errors(&self) -> bool {
        !self.action_errors.is_empty()
    }

    /// Forget everything recorded
    pub fn clear(&mut self) {
        self.field_errors.clear();
        self.action_errors.clear();
    }
}

impl ErrorSink for ValidationErrors {
    fn add_field_error(&mut self, field: &str, message: &str) {
        self.field_errors
            .entry(field.to_string())
            .or_default()
            .push(message.to_string());
    }

    fn add_action_error(&mut self, message: &str) {
        self.action_errors.push(message.to_string());
    }

    fn has_errors(&self) -> bool {
        self.has_field_errors() || self.has_action_errors()
    }
}

/// Sink forwarding everything to its parent unchanged
pub struct DelegatingErrorSink<'a> {
    parent: &'a mut dyn ErrorSink,
}

impl<'a> DelegatingErrorSink<'a> {
    /// Wrap `parent`
    pub fn new(parent: &'a mut dyn ErrorSink) -> Self {
        Self { parent }
    }
}

impl ErrorSink for DelegatingErrorSink<'_> {
    fn add_field_error(&mut self, field: &str, message: &str) {
        self.parent.add_field_error(field, message);
    }

    fn add_action_error(&mut self, message: &str) {
        self.parent.add_action_error(message);
    }

    fn full_field_name(&self, field: &str) -> String {
        self.parent.full_field_name(field)
    }

    fn has_errors(&self) -> bool {
        self.parent.has_errors()
    }
}

/// Sink placing a visited object's errors under the visiting field
///
/// A field error on `name` is recorded as `<field>.<name>`; an action error
/// becomes a field error on `<field>`. Every message is prefixed with
/// `message`. Nested sinks compose, so errors two levels down read
/// `outer.inner.name`.
pub struct AppendingErrorSink<'a> {
    parent: &'a mut dyn ErrorSink,
    field: String,
    message: String,
}

impl<'a> AppendingErrorSink<'a> {
    /// Wrap `parent` for errors of the object visited through `field`
    pub fn new(
        parent: &'a mut dyn ErrorSink,
        field: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            parent,
            field: field.into(),
            message: message.into(),
        }
    }

    /// Field this sink prefixes names with
    pub fn field(&self) -> &str {
        &self.field
    }

    /// Full name as the parent would record it
    pub fn full_field_name_from_parent(&self, field: &str) -> String {
        self.parent.full_field_name(&self.full_field_name(field))
    }
}

impl ErrorSink for AppendingErrorSink<'_> {
    fn add_field_error(&mut self, field: &str, message: &str) {
        let name = self.full_field_name(field);
        self.parent
            .add_field_error(&name, &format!("{}{message}", self.message));
    }

    fn add_action_error(&mut self, message: &str) {
        self.parent
            .add_field_error(&self.field, &format!("{}{message}", self.message));
    }

    fn full_field_name(&self, field: &str) -> String {
        format!("{}.{field}", self.field)
    }

    fn has_errors(&self) -> bool {
        self.parent.has_errors()
    }
}
