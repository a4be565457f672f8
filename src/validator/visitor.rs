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

//! Field validator descending into the object a field holds

use std::fmt;
use std::sync::Arc;

use super::error_sink::{AppendingErrorSink, DelegatingErrorSink, ErrorSink};
use super::session::ValidationSession;
use super::{FieldValidator, ValidationManager};
use crate::error::ValidationResult;
use crate::model::Value;

/// Validates the object (or each element of the collection) held by a field
///
/// The visited objects are validated by the [`ValidationManager`] under
/// `context` when set, otherwise under the session's action name. With
/// `append_prefix` (the default) their errors are reported under
/// `<field>.<name>`, or `<field>[i].<name>` for collection elements.
#[derive(Clone)]
pub struct VisitorFieldValidator {
    field_name: String,
    context: Option<String>,
    append_prefix: bool,
    message: String,
    manager: Arc<dyn ValidationManager>,
}

impl fmt::Debug for VisitorFieldValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VisitorFieldValidator")
            .field("field_name", &self.field_name)
            .field("context", &self.context)
            .field("append_prefix", &self.append_prefix)
            .field("message", &self.message)
            .finish_non_exhaustive()
    }
}

impl VisitorFieldValidator {
    /// Visit `field_name`, delegating visited objects to `manager`
    pub fn new(field_name: impl Into<String>, manager: Arc<dyn ValidationManager>) -> Self {
        Self {
            field_name: field_name.into(),
            context: None,
            append_prefix: true,
            message: String::new(),
            manager,
        }
    }

    /// Validation context name for visited objects
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Whether visited errors are renamed under this field
    pub fn with_append_prefix(mut self, append_prefix: bool) -> Self {
        self.append_prefix = append_prefix;
        self
    }

    /// Prefix for visited error messages; may contain `${expr}`
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Explicit context name
    pub fn context(&self) -> Option<&str> {
        self.context.as_deref()
    }

    /// Whether visited errors are renamed under this field
    pub fn append_prefix(&self) -> bool {
        self.append_prefix
    }

    /// Message prefix template
    pub fn message(&self) -> &str {
        &self.message
    }

    fn validate_elements(
        &self,
        items: Vec<Value>,
        context_name: &str,
        errors: &mut dyn ErrorSink,
        session: &mut ValidationSession,
    ) -> ValidationResult<()> {
        for (index, element) in items.into_iter().enumerate() {
            if element.is_null() {
                continue;
            }
            let field = format!("{}[{index}]", self.field_name);
            self.validate_object(&field, &element, context_name, errors, session)?;
        }
        Ok(())
    }

    fn validate_object(
        &self,
        field: &str,
        object: &Value,
        context_name: &str,
        errors: &mut dyn ErrorSink,
        session: &mut ValidationSession,
    ) -> ValidationResult<()> {
        let mut frame = session.enter(object.clone());

        if self.append_prefix {
            let message = frame.translate(&self.message);
            let mut sink = AppendingErrorSink::new(errors, field, message);
            self.manager
                .validate(object, context_name, &mut sink, &mut frame)
        } else {
            let mut sink = DelegatingErrorSink::new(errors);
            self.manager
                .validate(object, context_name, &mut sink, &mut frame)
        }
    }
}

impl FieldValidator for VisitorFieldValidator {
    fn field_name(&self) -> &str {
        &self.field_name
    }

    fn validate(
        &self,
        object: &Value,
        errors: &mut dyn ErrorSink,
        session: &mut ValidationSession,
    ) -> ValidationResult<()> {
        let value = session.field_value(&self.field_name, object)?;
        if value.is_null() {
            log::warn!(
                "The visited object '{}' is null; visitor validation skipped",
                self.field_name
            );
            return Ok(());
        }

        let mut frame = session.enter(object.clone());
        let context_name = match &self.context {
            Some(context) => context.clone(),
            None => frame.action_name().to_string(),
        };

        match &value {
            Value::List(items) | Value::Array(items) => {
                self.validate_elements(items.snapshot(), &context_name, errors, &mut frame)
            }
            _ => self.validate_object(&self.field_name, &value, &context_name, errors, &mut frame),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationError;
    use crate::engine::ExpressionEngine;
    use crate::model::{ListRef, ObjectRef};
    use crate::validator::ValidationErrors;
    use parking_lot::Mutex;
    use pretty_assertions::assert_eq;

    #[derive(Debug, Default)]
    struct Line {
        sku: String,
    }

    crate::impl_bean!(Line { rw sku: String });

    #[derive(Debug, Default)]
    struct Order {
        number: String,
        lines: Option<ListRef>,
        primary: Option<ObjectRef>,
    }

    crate::impl_bean!(Order {
        rw number: String,
        rw lines: Option<ListRef>,
        rw primary: Option<ObjectRef>,
    });

    /// Requires a non-empty `sku` and records what it was called with
    #[derive(Debug, Default)]
    struct SkuManager {
        calls: Mutex<Vec<(String, usize)>>,
    }

    impl ValidationManager for SkuManager {
        fn validate(
            &self,
            object: &Value,
            context_name: &str,
            errors: &mut dyn ErrorSink,
            session: &mut ValidationSession,
        ) -> ValidationResult<()> {
            self.calls
                .lock()
                .push((context_name.to_string(), session.depth()));
            let sku = session.field_value("sku", object)?;
            if sku.as_str().is_none_or(str::is_empty) {
                errors.add_field_error("sku", "is required");
            }
            Ok(())
        }
    }

    #[derive(Debug)]
    struct FailingManager;

    impl ValidationManager for FailingManager {
        fn validate(
            &self,
            _object: &Value,
            _context_name: &str,
            _errors: &mut dyn ErrorSink,
            _session: &mut ValidationSession,
        ) -> ValidationResult<()> {
            Err(ValidationError::failed("manager unavailable"))
        }
    }

    fn line(sku: &str) -> Value {
        Value::object(Line { sku: sku.into() })
    }

    fn order() -> Value {
        Value::object(Order {
            number: "A-1".into(),
            lines: Some(ListRef::new(vec![line("x"), Value::Null, line("")])),
            primary: Some(ObjectRef::new(Line::default())),
        })
    }

    fn session() -> ValidationSession {
        ValidationSession::new(Arc::new(ExpressionEngine::new()), "checkout")
    }

    #[test]
    fn test_collection_elements_indexed() {
        let manager = Arc::new(SkuManager::default());
        let validator = VisitorFieldValidator::new("lines", manager.clone());
        let mut errors = ValidationErrors::new();
        let mut session = session();

        validator.validate(&order(), &mut errors, &mut session).unwrap();

        assert_eq!(errors.field_errors_for("lines[2].sku"), ["is required"]);
        assert_eq!(errors.field_errors().len(), 1);
        assert_eq!(
            *manager.calls.lock(),
            vec![("checkout".to_string(), 2), ("checkout".to_string(), 2)]
        );
        assert_eq!(session.depth(), 0);
    }

    #[test]
    fn test_single_object_with_message_and_context() {
        let manager = Arc::new(SkuManager::default());
        let validator = VisitorFieldValidator::new("primary", manager.clone())
            .with_context("strict")
            .with_message("Order ${number}: ");
        let mut errors = ValidationErrors::new();
        let mut session = session();

        validator.validate(&order(), &mut errors, &mut session).unwrap();

        assert_eq!(
            errors.field_errors_for("primary.sku"),
            ["Order A-1: is required"]
        );
        assert_eq!(manager.calls.lock()[0].0, "strict");
    }

    #[test]
    fn test_without_prefix_errors_pass_through() {
        let validator = VisitorFieldValidator::new("primary", Arc::new(SkuManager::default()))
            .with_append_prefix(false)
            .with_message("ignored: ");
        let mut errors = ValidationErrors::new();

        validator
            .validate(&order(), &mut errors, &mut session())
            .unwrap();

        assert_eq!(errors.field_errors_for("sku"), ["is required"]);
    }

    #[test]
    fn test_null_field_skipped() {
        let manager = Arc::new(SkuManager::default());
        let validator = VisitorFieldValidator::new("primary", manager.clone());
        let mut errors = ValidationErrors::new();

        validator
            .validate(&Value::object(Order::default()), &mut errors, &mut session())
            .unwrap();

        assert!(!errors.has_errors());
        assert!(manager.calls.lock().is_empty());
    }

    #[test]
    fn test_manager_failure_propagates_and_pops() {
        let validator = VisitorFieldValidator::new("lines", Arc::new(FailingManager));
        let mut errors = ValidationErrors::new();
        let mut session = session();

        let err = validator
            .validate(&order(), &mut errors, &mut session)
            .unwrap_err();

        assert_eq!(err, ValidationError::failed("manager unavailable"));
        assert_eq!(session.depth(), 0);
    }

    #[test]
    fn test_unknown_field_is_error() {
        let validator = VisitorFieldValidator::new("customer", Arc::new(FailingManager));
        let err = validator
            .validate(&order(), &mut ValidationErrors::new(), &mut session())
            .unwrap_err();
        assert!(matches!(err, ValidationError::FieldValue { .. }));
    }
}
