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

//! Integration tests for visitor validation of nested object graphs

use beanpath::error::ValidationResult;
use beanpath::{
    ErrorSink, ExpressionEngine, FieldValidator, ListRef, ObjectRef, ValidationError,
    ValidationErrors, ValidationManager, ValidationSession, Value, VisitorFieldValidator,
    impl_bean,
};
use parking_lot::RwLock;
use pretty_assertions::assert_eq;
use rustc_hash::FxHashMap;
use serde_json::json;
use std::sync::Arc;

mod utils;
use utils::{Address, Person, address, engine, init_logging, person};

#[derive(Debug, Default)]
struct Signup {
    user: Option<ObjectRef>,
}

impl_bean!(Signup { rw user: Option<ObjectRef> });

/// Reports `message` when the field is null or blank
struct RequiredString {
    field: String,
    message: String,
}

impl RequiredString {
    fn new(field: &str, message: &str) -> Arc<dyn FieldValidator> {
        Arc::new(Self {
            field: field.into(),
            message: message.into(),
        })
    }
}

impl FieldValidator for RequiredString {
    fn field_name(&self) -> &str {
        &self.field
    }

    fn validate(
        &self,
        object: &Value,
        errors: &mut dyn ErrorSink,
        session: &mut ValidationSession,
    ) -> ValidationResult<()> {
        let value = session.field_value(&self.field, object)?;
        if value.as_str().is_none_or(|s| s.trim().is_empty()) {
            let message = session.translate(&self.message);
            errors.add_field_error(&self.field, &message);
        }
        Ok(())
    }
}

/// Validators registered per bean type and context name
#[derive(Default)]
struct Registry {
    validators: RwLock<FxHashMap<(&'static str, String), Vec<Arc<dyn FieldValidator>>>>,
    visited: RwLock<Vec<(String, usize)>>,
}

impl Registry {
    fn register(&self, type_name: &'static str, context: &str, validator: Arc<dyn FieldValidator>) {
        self.validators
            .write()
            .entry((type_name, context.to_string()))
            .or_default()
            .push(validator);
    }
}

impl ValidationManager for Registry {
    fn validate(
        &self,
        object: &Value,
        context_name: &str,
        errors: &mut dyn ErrorSink,
        session: &mut ValidationSession,
    ) -> ValidationResult<()> {
        let Some(bean) = object.as_object() else {
            return Ok(());
        };
        self.visited
            .write()
            .push((format!("{}@{context_name}", bean.type_name()), session.depth()));

        let validators = self
            .validators
            .read()
            .get(&(bean.type_name(), context_name.to_string()))
            .cloned()
            .unwrap_or_default();
        for validator in validators {
            validator.validate(object, errors, session)?;
        }
        Ok(())
    }
}

/// Fails on every call, after reporting an action error
struct Unavailable;

impl ValidationManager for Unavailable {
    fn validate(
        &self,
        _object: &Value,
        _context_name: &str,
        errors: &mut dyn ErrorSink,
        _session: &mut ValidationSession,
    ) -> ValidationResult<()> {
        errors.add_action_error("rules unavailable");
        Err(ValidationError::failed("rules unavailable"))
    }
}

fn session(action: &str) -> ValidationSession {
    ValidationSession::new(Arc::new(engine(true)), action)
}

fn blank_city() -> Value {
    Value::object(Address::default())
}

#[test]
fn test_nested_object_errors_are_prefixed() {
    init_logging();
    let registry = Arc::new(Registry::default());
    registry.register("Address", "save", RequiredString::new("city", "city is required"));
    registry.register("Person", "save", RequiredString::new("name", "name is required"));
    registry.register(
        "Person",
        "save",
        Arc::new(VisitorFieldValidator::new("address", registry.clone())),
    );

    let root = Value::object(Person {
        address: Some(ObjectRef::new(Address::default())),
        ..Default::default()
    });
    let mut errors = ValidationErrors::new();
    let mut session = session("save");

    registry
        .validate(&root, "save", &mut errors, &mut session)
        .unwrap();

    assert_eq!(errors.field_errors_for("name"), ["name is required"]);
    assert_eq!(errors.field_errors_for("address.city"), ["city is required"]);
    assert_eq!(session.depth(), 0);
}

#[test]
fn test_visited_user_name_renamed() {
    let registry = Arc::new(Registry::default());
    registry.register("Person", "signup", RequiredString::new("name", "is required"));
    let visitor = VisitorFieldValidator::new("user", registry.clone()).with_message("User: ");

    let root = Value::object(Signup {
        user: Some(ObjectRef::new(Person::default())),
    });
    let mut errors = ValidationErrors::new();

    visitor
        .validate(&root, &mut errors, &mut session("signup"))
        .unwrap();

    assert_eq!(
        serde_json::to_value(&errors).unwrap(),
        json!({
            "field_errors": { "user.name": ["User: is required"] },
            "action_errors": []
        })
    );
}

#[test]
fn test_collection_elements_skip_nulls() {
    let registry = Arc::new(Registry::default());
    registry.register("Address", "save", RequiredString::new("city", "missing"));
    let visitor = VisitorFieldValidator::new("addresses", registry.clone());

    let root = Value::object(Person {
        addresses: Some(ListRef::new(vec![
            blank_city(),
            Value::Null,
            blank_city(),
            address("1 A St", "Bath"),
        ])),
        ..Default::default()
    });
    let mut errors = ValidationErrors::new();

    visitor
        .validate(&root, &mut errors, &mut session("save"))
        .unwrap();

    assert_eq!(
        errors.field_errors().keys().collect::<Vec<_>>(),
        vec!["addresses[0].city", "addresses[2].city"]
    );
    assert_eq!(registry.visited.read().len(), 3);
}

#[derive(Debug, Default)]
struct Household {
    residents: Value,
}

impl_bean!(Household { rw residents: Value });

#[test]
fn test_array_elements_named_by_index() {
    let registry = Arc::new(Registry::default());
    registry.register("Person", "census", RequiredString::new("name", "name is required"));
    let visitor = VisitorFieldValidator::new("residents", registry.clone());

    let root = Value::object(Household {
        residents: Value::array([
            Value::object(Person::default()),
            Value::Null,
            Value::object(Person {
                name: "Ada".into(),
                ..Default::default()
            }),
            Value::object(Person::default()),
        ]),
    });
    let mut errors = ValidationErrors::new();
    let mut session = session("census");

    visitor.validate(&root, &mut errors, &mut session).unwrap();

    assert_eq!(
        errors.field_errors().keys().collect::<Vec<_>>(),
        vec!["residents[0].name", "residents[3].name"]
    );
    assert_eq!(
        *registry.visited.read(),
        vec![
            ("Person@census".to_string(), 2),
            ("Person@census".to_string(), 2),
            ("Person@census".to_string(), 2),
        ]
    );
    assert_eq!(session.depth(), 0);
}

#[test]
fn test_two_levels_compose_paths_and_messages() {
    let registry = Arc::new(Registry::default());
    registry.register("Address", "save", RequiredString::new("city", "city is required"));
    registry.register(
        "Person",
        "save",
        Arc::new(
            VisitorFieldValidator::new("address", registry.clone())
                .with_message("Address of ${name}: "),
        ),
    );
    let visitor = VisitorFieldValidator::new("user", registry.clone()).with_message("User: ");

    let root = Value::object(Signup {
        user: Some(ObjectRef::new(Person {
            name: "Ada".into(),
            address: Some(ObjectRef::new(Address::default())),
            ..Default::default()
        })),
    });
    let mut errors = ValidationErrors::new();

    visitor
        .validate(&root, &mut errors, &mut session("save"))
        .unwrap();

    assert_eq!(
        errors.field_errors_for("user.address.city"),
        ["User: Address of Ada: city is required"]
    );
    assert_eq!(
        *registry.visited.read(),
        vec![("Person@save".to_string(), 2), ("Address@save".to_string(), 4)]
    );
}

#[test]
fn test_explicit_context_overrides_action_name() {
    let registry = Arc::new(Registry::default());
    registry.register("Address", "shipping", RequiredString::new("city", "needed for shipping"));
    let visitor = VisitorFieldValidator::new("address", registry.clone()).with_context("shipping");

    let root = Value::object(Person {
        address: Some(ObjectRef::new(Address::default())),
        ..Default::default()
    });
    let mut errors = ValidationErrors::new();

    visitor
        .validate(&root, &mut errors, &mut session("save"))
        .unwrap();

    assert_eq!(errors.field_errors_for("address.city"), ["needed for shipping"]);
}

#[test]
fn test_without_prefix_field_names_unchanged() {
    let registry = Arc::new(Registry::default());
    registry.register("Address", "save", RequiredString::new("city", "missing"));
    let visitor = VisitorFieldValidator::new("addresses", registry.clone())
        .with_append_prefix(false);

    let root = Value::object(Person {
        addresses: Some(ListRef::new(vec![blank_city(), blank_city()])),
        ..Default::default()
    });
    let mut errors = ValidationErrors::new();

    visitor
        .validate(&root, &mut errors, &mut session("save"))
        .unwrap();

    assert_eq!(errors.field_errors_for("city"), ["missing", "missing"]);
}

#[test]
fn test_null_field_is_skipped() {
    init_logging();
    let registry = Arc::new(Registry::default());
    let visitor = VisitorFieldValidator::new("address", registry.clone());
    let mut errors = ValidationErrors::new();

    visitor
        .validate(&Value::object(Person::default()), &mut errors, &mut session("save"))
        .unwrap();

    assert!(!errors.has_errors());
    assert!(registry.visited.read().is_empty());
}

#[test]
fn test_manager_failure_restores_stack() {
    let visitor = VisitorFieldValidator::new("address", Arc::new(Unavailable)).with_message("Home: ");
    let mut errors = ValidationErrors::new();
    let mut session = session("save");
    let mut outer = session.enter(Value::from("request"));

    let err = visitor
        .validate(&person(), &mut errors, &mut outer)
        .unwrap_err();

    assert_eq!(err, ValidationError::failed("rules unavailable"));
    assert_eq!(outer.depth(), 1);
    assert_eq!(errors.field_errors_for("address"), ["Home: rules unavailable"]);
    assert!(!errors.has_action_errors());
}

#[test]
fn test_session_shares_engine_caches() {
    let engine = Arc::new(ExpressionEngine::new());
    let mut session = ValidationSession::new(engine.clone(), "save");
    let root = person();

    assert_eq!(
        session.field_value("address.city", &root).unwrap(),
        Value::from("London")
    );
    assert!(engine.state().expressions().get("address.city").is_some());
}
