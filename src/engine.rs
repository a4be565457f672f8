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

//! Expression engine: cached parsing, compiled fast path, interpreted fallback
//!
//! Every read and write first tries a [`CompiledAccessor`] when enhanced mode
//! is enabled. Anything the accessor cannot serve is logged and retried once
//! through the [`Interpreter`]; only the interpreter's error reaches callers.

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::cache::{BeanInfoCache, ExpressionCache};
use crate::compiler::{AccessorCache, Attempt, CompiledAccessor};
use crate::config::{ConfigProvider, EnhancementToggle};
use crate::error::{EngineError, Result};
use crate::evaluator::{EvaluationContext, Interpreter};
use crate::model::{
    BeanInfo, DefaultTypeConverter, FromValue, ObjectRef, TypeConverter, Value, ValueType,
    ValueTyped,
};
use crate::parser::Expression;

/// Shared caches backing one or more engines
#[derive(Debug, Default)]
pub struct EngineState {
    expressions: ExpressionCache,
    beans: BeanInfoCache,
    accessors: AccessorCache,
}

static GLOBAL_STATE: Lazy<Arc<EngineState>> = Lazy::new(|| Arc::new(EngineState::new()));

impl EngineState {
    /// Create empty caches
    pub fn new() -> Self {
        Self::default()
    }

    /// Process-wide caches used by [`ExpressionEngine::new`]
    pub fn global() -> Arc<EngineState> {
        GLOBAL_STATE.clone()
    }

    /// Parsed expression cache
    pub fn expressions(&self) -> &ExpressionCache {
        &self.expressions
    }

    /// Bean metadata cache
    pub fn beans(&self) -> &BeanInfoCache {
        &self.beans
    }

    /// Compiled accessor cache
    pub fn accessors(&self) -> &AccessorCache {
        &self.accessors
    }

    /// Empty every cache
    pub fn clear(&self) {
        self.expressions.clear();
        self.beans.clear();
        self.accessors.clear();
    }
}

/// Counters describing how requests were served
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngineStats {
    /// Requests answered by a compiled accessor
    pub compiled_hits: u64,
    /// Requests answered by the interpreter while enhanced mode was on
    pub fallbacks: u64,
}

/// Property access through path expressions
pub struct ExpressionEngine {
    state: Arc<EngineState>,
    toggle: EnhancementToggle,
    converter: Arc<dyn TypeConverter>,
    compiled_hits: AtomicU64,
    fallbacks: AtomicU64,
}

impl fmt::Debug for ExpressionEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExpressionEngine")
            .field("toggle", &self.toggle)
            .field("converter", &self.converter)
            .field("stats", &self.stats())
            .finish_non_exhaustive()
    }
}

impl Default for ExpressionEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ExpressionEngine {
    /// Engine on the global caches with enhanced mode disabled
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Start configuring an engine
    pub fn builder() -> ExpressionEngineBuilder {
        ExpressionEngineBuilder::new()
    }

    /// Caches this engine works on
    pub fn state(&self) -> &Arc<EngineState> {
        &self.state
    }

    /// Enhanced-mode switch
    pub fn toggle(&self) -> &EnhancementToggle {
        &self.toggle
    }

    /// Converter installed by [`set_properties`](Self::set_properties)
    pub fn type_converter(&self) -> &Arc<dyn TypeConverter> {
        &self.converter
    }

    /// How requests have been served so far
    pub fn stats(&self) -> EngineStats {
        EngineStats {
            compiled_hits: self.compiled_hits.load(Ordering::Relaxed),
            fallbacks: self.fallbacks.load(Ordering::Relaxed),
        }
    }

    /// Parse `expression`, returning the cached tree when present
    pub fn parse(&self, expression: &str) -> Result<Arc<Expression>> {
        self.state
            .expressions
            .get_or_parse(expression)
            .map_err(|source| EngineError::malformed(expression, source))
    }

    /// Evaluate `expression` against `root`
    ///
    /// A compiled result of `null` is re-evaluated by the interpreter.
    pub fn get_value(
        &self,
        expression: &str,
        ctx: &mut EvaluationContext,
        root: &Value,
    ) -> Result<Value> {
        let parsed = self.parse(expression)?;

        if self.toggle.is_enabled() {
            match self.compiled_get(&parsed, root) {
                Attempt::Done(value) if !value.is_null() => {
                    self.compiled_hits.fetch_add(1, Ordering::Relaxed);
                    return Ok(value);
                }
                Attempt::Done(_) => {
                    self.fallbacks.fetch_add(1, Ordering::Relaxed);
                }
                other => self.fall_back(expression, other),
            }
        }

        self.interpret(&parsed, ctx, root)
    }

    /// Evaluate `expression` and convert the result to `expected`
    ///
    /// Interpreted results go through the context converter, or the engine
    /// converter when the context has none. A compiled result is returned
    /// as read, `null` included.
    pub fn get_value_as(
        &self,
        expression: &str,
        ctx: &mut EvaluationContext,
        root: &Value,
        expected: ValueType,
    ) -> Result<Value> {
        let parsed = self.parse(expression)?;

        if self.toggle.is_enabled() {
            match self.compiled_get(&parsed, root) {
                Attempt::Done(value) => {
                    self.compiled_hits.fetch_add(1, Ordering::Relaxed);
                    return Ok(value);
                }
                other => self.fall_back(expression, other),
            }
        }

        let value = self.interpret(&parsed, ctx, root)?;
        self.convert(expression, ctx, value, expected)
    }

    /// Evaluate `expression` into a Rust type
    ///
    /// Unlike [`get_value_as`](Self::get_value_as), compiled results are
    /// converted too, so the outcome does not depend on enhanced mode.
    pub fn get<T>(&self, expression: &str, ctx: &mut EvaluationContext, root: &Value) -> Result<T>
    where
        T: FromValue + ValueTyped,
    {
        let value = self.get_value_as(expression, ctx, root, T::VALUE_TYPE)?;
        let value = self.convert(expression, ctx, value, T::VALUE_TYPE)?;
        T::from_value(value).map_err(|err| EngineError::property_access(expression, err.into()))
    }

    /// Assign `value` to the location `expression` designates on `root`
    pub fn set_value(
        &self,
        expression: &str,
        ctx: &mut EvaluationContext,
        root: &Value,
        value: Value,
    ) -> Result<()> {
        let parsed = self.parse(expression)?;

        if self.toggle.is_enabled() {
            match self.compiled_set(&parsed, root, &value, ctx) {
                Attempt::Done(()) => {
                    self.compiled_hits.fetch_add(1, Ordering::Relaxed);
                    return Ok(());
                }
                other => self.fall_back(expression, other),
            }
        }

        let mut scope = ctx.scoped_root(root.clone());
        self.interpreter()
            .assign(parsed.root(), &mut scope, value)
            .map_err(|err| EngineError::property_access(expression, err))
    }

    /// Assign every entry of `props` to `target`, in map order
    ///
    /// The engine converter is installed into `ctx` and the root is `target`
    /// for the duration of the call. With `throw_on_error` the first failure
    /// aborts with [`EngineError::PropertySetFailed`]; entries applied before
    /// it stay applied. Otherwise failures are logged and skipped.
    pub fn set_properties(
        &self,
        props: &IndexMap<String, Value>,
        target: &Value,
        ctx: &mut EvaluationContext,
        throw_on_error: bool,
    ) -> Result<()> {
        ctx.set_type_converter(self.converter.clone());
        let mut scope = ctx.scoped_root(target.clone());

        for (name, value) in props {
            self.apply_property(name, value.clone(), target, &mut scope, throw_on_error)?;
        }
        Ok(())
    }

    /// Single-entry form of [`set_properties`](Self::set_properties)
    pub fn set_property(
        &self,
        name: &str,
        value: Value,
        target: &Value,
        ctx: &mut EvaluationContext,
        throw_on_error: bool,
    ) -> Result<()> {
        ctx.set_type_converter(self.converter.clone());
        let mut scope = ctx.scoped_root(target.clone());
        self.apply_property(name, value, target, &mut scope, throw_on_error)
    }

    fn apply_property(
        &self,
        name: &str,
        value: Value,
        target: &Value,
        ctx: &mut EvaluationContext,
        throw_on_error: bool,
    ) -> Result<()> {
        let Err(err) = self.set_value(name, ctx, target, value) else {
            return Ok(());
        };

        let target_type = target.type_name();
        if throw_on_error {
            log::error!("Caught error while setting property '{name}' on type '{target_type}': {err}");
            return Err(EngineError::PropertySetFailed {
                property: name.to_string(),
                target_type,
                source: Box::new(err),
            });
        }

        log::warn!("Caught error while setting property '{name}' on type '{target_type}': {err}");
        Ok(())
    }

    /// Copy readable properties of `from` onto matching writable properties of `to`
    ///
    /// `exclusions` are checked before `inclusions`. A property failing to
    /// copy is skipped; a `null` endpoint makes the whole call a no-op.
    pub fn copy_properties(
        &self,
        from: &Value,
        to: &Value,
        ctx: &EvaluationContext,
        exclusions: Option<&[&str]>,
        inclusions: Option<&[&str]>,
    ) {
        let (source, dest) = match (from, to) {
            (Value::Object(source), Value::Object(dest)) => (source, dest),
            _ if from.is_null() || to.is_null() => {
                log::warn!(
                    "Attempting to copy from or to a null source; skipping (from: {}, to: {})",
                    from.type_name(),
                    to.type_name()
                );
                return;
            }
            _ => {
                log::warn!(
                    "Properties can only be copied between beans; skipping (from: {}, to: {})",
                    from.type_name(),
                    to.type_name()
                );
                return;
            }
        };

        let source_info = self.state.beans.for_object(source);
        let dest_info = self.state.beans.for_object(dest);
        let mut from_ctx = ctx.fork();
        let mut to_ctx = ctx.fork();
        from_ctx.set_type_converter(self.converter.clone());
        to_ctx.set_type_converter(self.converter.clone());

        for descriptor in source_info.readable() {
            let name = descriptor.name.as_str();
            if exclusions.is_some_and(|excluded| excluded.contains(&name)) {
                continue;
            }
            if inclusions.is_some_and(|included| !included.contains(&name)) {
                continue;
            }
            if !dest_info.property(name).is_some_and(|target| target.writable) {
                continue;
            }

            let copied = self
                .get_value(name, &mut from_ctx, from)
                .and_then(|value| self.set_value(name, &mut to_ctx, to, value));
            if let Err(err) = copied {
                log::debug!("Skipping property '{name}' while copying: {err}");
            }
        }
    }

    /// Map every property of `object` to its current value
    ///
    /// Write-only properties map to a `"There is no read method for <name>"`
    /// marker; a property whose read fails maps to `null`.
    pub fn describe(&self, object: &Value) -> IndexMap<String, Value> {
        let Value::Object(obj) = object else {
            log::warn!("Cannot describe a value of type {}", object.type_name());
            return IndexMap::new();
        };

        let info = self.state.beans.for_object(obj);
        let mut ctx = EvaluationContext::with_root(object.clone());
        let mut described = IndexMap::with_capacity(info.len());

        for descriptor in info.properties() {
            let name = descriptor.name.clone();
            if !descriptor.readable {
                let marker = format!("There is no read method for {name}");
                described.insert(name, Value::String(marker));
                continue;
            }

            let value = self.get_value(&name, &mut ctx, object).unwrap_or_else(|err| {
                log::warn!("Cannot read property '{name}' of {}: {err}", info.type_name());
                Value::Null
            });
            described.insert(name, value);
        }
        described
    }

    /// Cached property metadata of `object`
    pub fn bean_info(&self, object: &ObjectRef) -> Arc<BeanInfo> {
        self.state.beans.for_object(object)
    }

    fn interpreter(&self) -> Interpreter<'_> {
        Interpreter::new(&self.state.beans)
    }

    fn interpret(&self, parsed: &Expression, ctx: &mut EvaluationContext, root: &Value) -> Result<Value> {
        let scope = ctx.scoped_root(root.clone());
        self.interpreter()
            .evaluate(parsed.root(), &scope)
            .map_err(|err| EngineError::property_access(parsed.source(), err))
    }

    fn accessor(&self, parsed: &Expression, root: &Value) -> Attempt<Arc<CompiledAccessor>> {
        let Value::Object(obj) = root else {
            return Attempt::Unsupported(format!("root of type {} is not a bean", root.type_name()).into());
        };
        match self.state.accessors.get_or_compile(parsed, obj, &self.state.beans) {
            Ok(accessor) => Attempt::Done(accessor),
            Err(reason) => Attempt::Unsupported(reason),
        }
    }

    fn compiled_get(&self, parsed: &Expression, root: &Value) -> Attempt<Value> {
        match self.accessor(parsed, root) {
            Attempt::Done(accessor) => accessor.get(root),
            Attempt::Unsupported(reason) => Attempt::Unsupported(reason),
            Attempt::Failed(err) => Attempt::Failed(err),
        }
    }

    fn compiled_set(
        &self,
        parsed: &Expression,
        root: &Value,
        value: &Value,
        ctx: &EvaluationContext,
    ) -> Attempt<()> {
        match self.accessor(parsed, root) {
            Attempt::Done(accessor) => accessor.set(root, value, ctx, &self.interpreter()),
            Attempt::Unsupported(reason) => Attempt::Unsupported(reason),
            Attempt::Failed(err) => Attempt::Failed(err),
        }
    }

    fn convert(
        &self,
        expression: &str,
        ctx: &EvaluationContext,
        value: Value,
        expected: ValueType,
    ) -> Result<Value> {
        let converter = ctx.type_converter().unwrap_or(&self.converter);
        converter
            .convert_value(value, expected)
            .map_err(|err| EngineError::property_access(expression, err.into()))
    }

    fn fall_back<T>(&self, expression: &str, attempt: Attempt<T>) {
        self.fallbacks.fetch_add(1, Ordering::Relaxed);
        match attempt {
            Attempt::Unsupported(reason) => {
                log::warn!("No compiled accessor for '{expression}', interpreting instead: {reason}")
            }
            Attempt::Failed(err) => {
                log::warn!("Compiled accessor failed, interpreting instead: {err}")
            }
            Attempt::Done(_) => {}
        }
    }
}

/// Builder for [`ExpressionEngine`]
pub struct ExpressionEngineBuilder {
    state: Option<Arc<EngineState>>,
    toggle: EnhancementToggle,
    converter: Arc<dyn TypeConverter>,
}

impl ExpressionEngineBuilder {
    /// Start from the global caches, enhanced mode disabled and the default converter
    pub fn new() -> Self {
        Self {
            state: None,
            toggle: EnhancementToggle::disabled(),
            converter: Arc::new(DefaultTypeConverter),
        }
    }

    /// Resolve enhanced mode from a configuration provider
    pub fn with_config_provider(mut self, provider: Arc<dyn ConfigProvider>) -> Self {
        self.toggle = EnhancementToggle::new(provider);
        self
    }

    /// Fix enhanced mode on or off
    pub fn with_enhancement(mut self, enabled: bool) -> Self {
        self.toggle = EnhancementToggle::fixed(enabled);
        self
    }

    /// Converter used by bulk assignment and typed reads
    pub fn with_type_converter(mut self, converter: Arc<dyn TypeConverter>) -> Self {
        self.converter = converter;
        self
    }

    /// Use private caches instead of the global ones
    pub fn with_state(mut self, state: Arc<EngineState>) -> Self {
        self.state = Some(state);
        self
    }

    /// Build the engine
    pub fn build(self) -> ExpressionEngine {
        ExpressionEngine {
            state: self.state.unwrap_or_else(EngineState::global),
            toggle: self.toggle,
            converter: self.converter,
            compiled_hits: AtomicU64::new(0),
            fallbacks: AtomicU64::new(0),
        }
    }
}

impl Default for ExpressionEngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StaticConfig;
    use crate::model::ListRef;
    use pretty_assertions::assert_eq;

    #[derive(Debug, Default)]
    struct Profile {
        nickname: String,
    }

    crate::impl_bean!(Profile { rw nickname: String });

    #[derive(Debug, Default)]
    struct Member {
        name: String,
        age: i64,
        active: bool,
        profile: Option<ObjectRef>,
        roles: Option<ListRef>,
        token: String,
    }

    crate::impl_bean!(Member {
        rw name: String,
        rw age: i64,
        rw active: bool,
        rw profile: Option<ObjectRef>,
        rw roles: Option<ListRef>,
        wo token: String,
    });

    fn isolated(enhanced: bool) -> ExpressionEngine {
        ExpressionEngine::builder()
            .with_state(Arc::new(EngineState::new()))
            .with_enhancement(enhanced)
            .build()
    }

    fn member() -> Value {
        Value::object(Member {
            name: "Kim".into(),
            age: 28,
            profile: Some(ObjectRef::new(Profile {
                nickname: "k".into(),
            })),
            ..Default::default()
        })
    }

    #[test]
    fn test_parse_is_cached() {
        let engine = isolated(false);
        let first = engine.parse("profile.nickname").unwrap();
        let second = engine.parse("profile.nickname").unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(engine.state().expressions().len(), 1);
    }

    #[test]
    fn test_malformed_expression() {
        let engine = isolated(false);
        let err = engine.parse("profile..nickname").unwrap_err();
        assert!(matches!(err, EngineError::MalformedExpression { .. }));
        assert!(engine.state().expressions().is_empty());
    }

    #[test]
    fn test_compiled_path_serves_bean_chains() {
        let engine = isolated(true);
        let mut ctx = EvaluationContext::new();
        let root = member();

        assert_eq!(
            engine.get_value("profile.nickname", &mut ctx, &root).unwrap(),
            Value::from("k")
        );
        assert_eq!(engine.stats().compiled_hits, 1);

        assert_eq!(
            engine.get_value("name.toUpperCase()", &mut ctx, &root).unwrap(),
            Value::from("KIM")
        );
        assert_eq!(engine.stats().fallbacks, 1);
    }

    #[test]
    fn test_disabled_mode_never_compiles() {
        let engine = isolated(false);
        let mut ctx = EvaluationContext::new();
        engine.get_value("name", &mut ctx, &member()).unwrap();
        assert!(engine.state().accessors().is_empty());
        assert_eq!(engine.stats(), EngineStats::default());
    }

    #[test]
    fn test_compiled_null_is_retried() {
        let engine = isolated(true);
        let mut ctx = EvaluationContext::new();
        let root = Value::object(Member::default());

        assert!(engine.get_value("roles", &mut ctx, &root).unwrap().is_null());
        assert_eq!(engine.stats().compiled_hits, 0);
        assert_eq!(engine.stats().fallbacks, 1);

        assert!(engine
            .get_value_as("roles", &mut ctx, &root, ValueType::List)
            .unwrap()
            .is_null());
        assert_eq!(engine.stats().compiled_hits, 1);
    }

    #[test]
    fn test_get_value_as_converts() {
        let engine = isolated(false);
        let mut ctx = EvaluationContext::new();
        let root = member();
        assert_eq!(
            engine
                .get_value_as("age", &mut ctx, &root, ValueType::String)
                .unwrap(),
            Value::from("28")
        );
        let age: String = engine.get("age", &mut ctx, &root).unwrap();
        assert_eq!(age, "28");
    }

    #[test]
    fn test_typed_get_converts_on_both_paths() {
        for enhanced in [false, true] {
            let engine = isolated(enhanced);
            let mut ctx = EvaluationContext::new();
            let root = member();

            let age: String = engine.get("age", &mut ctx, &root).unwrap();
            let years: i64 = engine.get("age", &mut ctx, &root).unwrap();
            assert_eq!(age, "28", "enhanced={enhanced}");
            assert_eq!(years, 28);
        }
    }

    #[test]
    fn test_root_restored_after_calls() {
        let engine = isolated(false);
        let mut ctx = EvaluationContext::with_root(Value::from("outer"));
        let root = member();

        engine.get_value("name", &mut ctx, &root).unwrap();
        assert!(engine.get_value("missing", &mut ctx, &root).is_err());
        engine
            .set_value("name", &mut ctx, &root, Value::from("Lee"))
            .unwrap();
        assert_eq!(ctx.root(), &Value::from("outer"));
    }

    #[test]
    fn test_set_value_both_paths() {
        for enhanced in [false, true] {
            let engine = isolated(enhanced);
            let mut ctx = EvaluationContext::new();
            let root = member();

            engine
                .set_value("profile.nickname", &mut ctx, &root, Value::from("kk"))
                .unwrap();
            assert_eq!(
                engine.get_value("profile.nickname", &mut ctx, &root).unwrap(),
                Value::from("kk")
            );
        }
    }

    #[test]
    fn test_set_properties_loose_skips_failures() {
        let engine = isolated(false);
        let mut ctx = EvaluationContext::new();
        let root = member();
        let props: IndexMap<String, Value> = [
            ("age".to_string(), Value::from("31")),
            ("unknown".to_string(), Value::from("x")),
            ("active".to_string(), Value::from("yes")),
        ]
        .into_iter()
        .collect();

        engine.set_properties(&props, &root, &mut ctx, false).unwrap();

        assert_eq!(engine.get_value("age", &mut ctx, &root).unwrap(), Value::Integer(31));
        assert_eq!(
            engine.get_value("active", &mut ctx, &root).unwrap(),
            Value::Boolean(true)
        );
        assert!(ctx.root().is_null());
        assert!(ctx.type_converter().is_some());
    }

    #[test]
    fn test_set_properties_strict_stops_at_first_failure() {
        let engine = isolated(false);
        let mut ctx = EvaluationContext::new();
        let root = member();
        let props: IndexMap<String, Value> = [
            ("name".to_string(), Value::from("Ola")),
            ("age".to_string(), Value::from("old")),
            ("active".to_string(), Value::Boolean(true)),
        ]
        .into_iter()
        .collect();

        let err = engine
            .set_properties(&props, &root, &mut ctx, true)
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Caught error while setting property 'age' on type 'Member'."
        );
        assert_eq!(engine.get_value("name", &mut ctx, &root).unwrap(), Value::from("Ola"));
        assert_eq!(
            engine.get_value("active", &mut ctx, &root).unwrap(),
            Value::Boolean(false)
        );
    }

    #[test]
    fn test_copy_properties_filters() {
        let engine = isolated(true);
        let ctx = EvaluationContext::new();
        let from = member();
        let to = Value::object(Member::default());

        engine.copy_properties(&from, &to, &ctx, Some(&["age"]), None);
        let mut read = EvaluationContext::new();
        assert_eq!(engine.get_value("name", &mut read, &to).unwrap(), Value::from("Kim"));
        assert_eq!(engine.get_value("age", &mut read, &to).unwrap(), Value::Integer(0));

        let filtered = Value::object(Member::default());
        engine.copy_properties(&from, &filtered, &ctx, Some(&["age"]), Some(&["age", "name"]));
        assert_eq!(
            engine.get_value("name", &mut read, &filtered).unwrap(),
            Value::from("Kim")
        );
        assert_eq!(
            engine.get_value("age", &mut read, &filtered).unwrap(),
            Value::Integer(0)
        );
    }

    #[derive(Debug, Default)]
    struct Badge {
        name: String,
        age: String,
    }

    crate::impl_bean!(Badge {
        rw name: String,
        rw age: String,
    });

    #[test]
    fn test_copy_properties_converts_between_declared_types() {
        for enhanced in [false, true] {
            let engine = isolated(enhanced);
            let badge = Value::object(Badge::default());

            engine.copy_properties(&member(), &badge, &EvaluationContext::new(), None, None);

            let mut read = EvaluationContext::new();
            assert_eq!(
                engine.get_value("age", &mut read, &badge).unwrap(),
                Value::from("28"),
                "enhanced={enhanced}"
            );
            assert_eq!(engine.get_value("name", &mut read, &badge).unwrap(), Value::from("Kim"));
        }
    }

    #[test]
    fn test_copy_properties_null_endpoint_is_noop() {
        let engine = isolated(false);
        let to = member();
        engine.copy_properties(&Value::Null, &to, &EvaluationContext::new(), None, None);
        let mut ctx = EvaluationContext::new();
        assert_eq!(engine.get_value("name", &mut ctx, &to).unwrap(), Value::from("Kim"));
    }

    #[test]
    fn test_describe() {
        let engine = isolated(false);
        let described = engine.describe(&member());

        assert_eq!(described.get("name"), Some(&Value::from("Kim")));
        assert_eq!(described.get("age"), Some(&Value::Integer(28)));
        assert_eq!(
            described.get("token"),
            Some(&Value::from("There is no read method for token"))
        );
        assert_eq!(described.len(), 6);
    }

    #[test]
    fn test_enhancement_from_config() {
        let provider = Arc::new(StaticConfig::new().with_parameter(
            crate::config::ENHANCEMENT_PARAMETER,
            "TRUE",
        ));
        let engine = ExpressionEngine::builder()
            .with_state(Arc::new(EngineState::new()))
            .with_config_provider(provider)
            .build();
        assert!(engine.toggle().is_enabled());
    }
}
