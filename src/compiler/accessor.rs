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

//! Accessor specialised for one root bean type and one property chain

use smallvec::SmallVec;
use std::any::TypeId;
use std::borrow::Cow;

use super::Attempt;
use crate::cache::BeanInfoCache;
use crate::error::EngineError;
use crate::evaluator::{EvaluationContext, Interpreter};
use crate::model::{ObjectRef, PropertyError, Value};
use crate::parser::Expression;

/// Pre-resolved `a.b.c` accessor
///
/// Walks bean properties directly without revisiting the syntax tree.
/// Only bean-to-bean navigation is supported; maps, collections, indexing,
/// variables and method calls are left to the interpreter.
#[derive(Debug, Clone)]
pub struct CompiledAccessor {
    source: String,
    root_type: TypeId,
    root_type_name: &'static str,
    chain: SmallVec<[String; 4]>,
}

impl CompiledAccessor {
    /// Compile `expr` for the concrete type of `root`
    ///
    /// Fails with a reason when the expression is not a plain property chain
    /// or the root type does not declare its first segment.
    pub fn compile(
        expr: &Expression,
        root: &ObjectRef,
        beans: &BeanInfoCache,
    ) -> Result<Self, Cow<'static, str>> {
        let chain = expr
            .root()
            .property_chain()
            .ok_or(Cow::Borrowed("expression is not a plain property chain"))?;

        let info = beans.for_object(root);
        let first = chain[0];
        if !info.has_property(first) {
            return Err(Cow::Owned(format!(
                "type '{}' declares no property '{first}'",
                info.type_name()
            )));
        }

        Ok(Self {
            source: expr.source().to_string(),
            root_type: info.type_id(),
            root_type_name: info.type_name(),
            chain: chain.iter().map(|s| (*s).to_string()).collect(),
        })
    }

    /// Expression text this accessor was compiled from
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Root type this accessor is specialised for
    pub fn root_type(&self) -> TypeId {
        self.root_type
    }

    /// Property names walked, outermost first
    pub fn chain(&self) -> &[String] {
        &self.chain
    }

    /// Read the value at the end of the chain
    pub fn get(&self, root: &Value) -> Attempt<Value> {
        let mut current = match self.check_root(root) {
            Ok(obj) => Value::Object(obj.clone()),
            Err(attempt) => return attempt,
        };

        for segment in &self.chain {
            current = match self.step(&current, segment) {
                Attempt::Done(next) => next,
                other => return other,
            };
        }

        Attempt::Done(current)
    }

    /// Assign `value` to the last property of the chain
    ///
    /// Conversion to the declared property type follows the context
    /// converter, exactly as interpreted assignment does.
    pub fn set(
        &self,
        root: &Value,
        value: &Value,
        ctx: &EvaluationContext,
        interpreter: &Interpreter<'_>,
    ) -> Attempt<()> {
        let obj = match self.check_root(root) {
            Ok(obj) => obj.clone(),
            Err(attempt) => return attempt.map(|_| ()),
        };

        let Some((last, parents)) = self.chain.split_last() else {
            return Attempt::Unsupported(Cow::Borrowed("empty property chain"));
        };

        let mut current = Value::Object(obj);
        for segment in parents {
            current = match self.step(&current, segment) {
                Attempt::Done(next) => next,
                other => return other.map(|_| ()),
            };
        }

        let target = match current {
            Value::Object(target) => target,
            Value::Null => return self.failed(PropertyError::NullSource {
                property: last.clone(),
            }),
            other => {
                return Attempt::Unsupported(Cow::Owned(format!(
                    "assignment target of type {} is not a bean",
                    other.type_name()
                )));
            }
        };

        match interpreter.write_bean_property(&target, last, value.clone(), ctx) {
            Ok(()) => Attempt::Done(()),
            Err(err) => self.failed(err),
        }
    }

    fn check_root<'v>(&self, root: &'v Value) -> Result<&'v ObjectRef, Attempt<Value>> {
        match root {
            Value::Object(obj) if obj.bean_type() == self.root_type => Ok(obj),
            Value::Object(obj) => Err(Attempt::Failed(EngineError::incompatible(
                self.source.clone(),
                format!(
                    "compiled for '{}', root is '{}'",
                    self.root_type_name,
                    obj.type_name()
                ),
            ))),
            other => Err(Attempt::Failed(EngineError::incompatible(
                self.source.clone(),
                format!("root of type {} is not a bean", other.type_name()),
            ))),
        }
    }

    fn step(&self, current: &Value, segment: &str) -> Attempt<Value> {
        match current {
            Value::Object(obj) => match obj.read().get_property(segment) {
                Ok(next) => Attempt::Done(next),
                Err(err) => self.failed(err),
            },
            Value::Null => self.failed(PropertyError::NullSource {
                property: segment.to_string(),
            }),
            other => Attempt::Unsupported(Cow::Owned(format!(
                "intermediate value of type {} is not a bean",
                other.type_name()
            ))),
        }
    }

    fn failed<T>(&self, err: PropertyError) -> Attempt<T> {
        Attempt::Failed(EngineError::property_access(self.source.clone(), err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DefaultTypeConverter;
    use std::sync::Arc;

    #[derive(Debug, Default)]
    struct Engine {
        power: i64,
    }

    crate::impl_bean!(Engine { rw power: i64 });

    #[derive(Debug, Default)]
    struct Car {
        model: String,
        engine: Option<ObjectRef>,
        extras: Option<crate::model::MapRef>,
    }

    crate::impl_bean!(Car {
        rw model: String,
        rw engine: Option<ObjectRef>,
        rw extras: Option<crate::model::MapRef>,
    });

    fn car() -> Value {
        Value::object(Car {
            model: "T".into(),
            engine: Some(ObjectRef::new(Engine { power: 20 })),
            extras: Some(crate::model::MapRef::default()),
        })
    }

    fn compile(source: &str, root: &Value, beans: &BeanInfoCache) -> Result<CompiledAccessor, Cow<'static, str>> {
        let expr = Expression::parse(source).unwrap();
        CompiledAccessor::compile(&expr, root.as_object().unwrap(), beans)
    }

    #[test]
    fn test_compiles_plain_chains_only() {
        let beans = BeanInfoCache::new();
        let root = car();

        let accessor = compile("engine.power", &root, &beans).unwrap();
        assert_eq!(accessor.chain(), ["engine", "power"]);
        assert!(compile("model.trim()", &root, &beans).is_err());
        assert!(compile("#root.model", &root, &beans).is_err());
        assert!(compile("wheels", &root, &beans).is_err());
    }

    #[test]
    fn test_get_and_set() {
        let beans = BeanInfoCache::new();
        let interpreter = Interpreter::new(&beans);
        let root = car();
        let accessor = compile("engine.power", &root, &beans).unwrap();

        assert_eq!(accessor.get(&root), Attempt::Done(Value::Integer(20)));

        let mut ctx = EvaluationContext::new();
        ctx.set_type_converter(Arc::new(DefaultTypeConverter));
        assert!(
            accessor
                .set(&root, &Value::from("90"), &ctx, &interpreter)
                .is_done()
        );
        assert_eq!(accessor.get(&root), Attempt::Done(Value::Integer(90)));
    }

    #[test]
    fn test_fallback_outcomes() {
        let beans = BeanInfoCache::new();
        let root = car();
        let accessor = compile("extras.color", &root, &beans).unwrap();
        assert!(matches!(accessor.get(&root), Attempt::Unsupported(_)));

        let no_engine = Value::object(Car::default());
        let accessor = compile("engine.power", &no_engine, &beans).unwrap();
        assert!(matches!(
            accessor.get(&no_engine),
            Attempt::Failed(EngineError::PropertyAccess {
                source: PropertyError::NullSource { .. },
                ..
            })
        ));

        let other_root = Value::object(Engine::default());
        assert!(matches!(
            accessor.get(&other_root),
            Attempt::Failed(EngineError::CompiledPathIncompatible { .. })
        ));
    }
}
