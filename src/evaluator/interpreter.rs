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

//! Tree-walking interpreter
//!
//! Evaluates any expression the parser accepts against the root of an
//! [`EvaluationContext`]. Navigation through `null` is an error; reading a
//! missing map key yields `null`.

use rust_decimal::Decimal;
use std::borrow::Cow;
use std::str::FromStr;

use super::context::EvaluationContext;
use crate::ast::{ExpressionNode, LiteralValue};
use crate::cache::BeanInfoCache;
use crate::model::{
    ConversionError, ListRef, MapRef, ObjectRef, PropertyError, PropertyResult, Value, ValueType,
};

/// Interpreter over parsed expression trees
#[derive(Debug, Clone, Copy)]
pub struct Interpreter<'a> {
    beans: &'a BeanInfoCache,
}

impl<'a> Interpreter<'a> {
    /// Create an interpreter using `beans` for declared property types
    pub fn new(beans: &'a BeanInfoCache) -> Self {
        Self { beans }
    }

    /// Evaluate `node` against the context root
    pub fn evaluate(&self, node: &ExpressionNode, ctx: &EvaluationContext) -> PropertyResult<Value> {
        match node {
            ExpressionNode::Literal(lit) => literal_value(lit),
            ExpressionNode::Identifier(name) => read_property(ctx.root(), name),
            ExpressionNode::Variable(name) => Ok(read_variable(ctx, name)),
            ExpressionNode::Path { base, path } => {
                let target = self.evaluate(base, ctx)?;
                read_property(&target, path)
            }
            ExpressionNode::Index { base, index } => {
                let target = self.evaluate(base, ctx)?;
                let key = self.evaluate(index, ctx)?;
                read_index(&target, &key)
            }
            ExpressionNode::FunctionCall(data) => {
                let args = self.evaluate_args(&data.args, ctx)?;
                call_method(ctx.root(), &data.name, &args)
            }
            ExpressionNode::MethodCall(data) => {
                let receiver = self.evaluate(&data.base, ctx)?;
                let args = self.evaluate_args(&data.args, ctx)?;
                call_method(&receiver, &data.method, &args)
            }
        }
    }

    /// Assign `value` to the location `node` designates
    pub fn assign(
        &self,
        node: &ExpressionNode,
        ctx: &mut EvaluationContext,
        value: Value,
    ) -> PropertyResult<()> {
        match node {
            ExpressionNode::Identifier(name) => {
                let root = ctx.root().clone();
                self.write_property(&root, name, value, ctx)
            }
            ExpressionNode::Path { base, path } => {
                let target = self.evaluate(base, ctx)?;
                self.write_property(&target, path, value, ctx)
            }
            ExpressionNode::Index { base, index } => {
                let target = self.evaluate(base, ctx)?;
                let key = self.evaluate(index, ctx)?;
                self.write_index(&target, &key, value, ctx)
            }
            ExpressionNode::Variable(name) if name != "root" && name != "this" => {
                ctx.set_variable(name.clone(), value);
                Ok(())
            }
            other => Err(PropertyError::NotAssignable {
                expression: other.to_string(),
            }),
        }
    }

    fn evaluate_args(
        &self,
        args: &[ExpressionNode],
        ctx: &EvaluationContext,
    ) -> PropertyResult<Vec<Value>> {
        args.iter().map(|arg| self.evaluate(arg, ctx)).collect()
    }

    /// Write a bean property or map entry, converting to the declared type
    pub fn write_property(
        &self,
        target: &Value,
        name: &str,
        value: Value,
        ctx: &EvaluationContext,
    ) -> PropertyResult<()> {
        match target {
            Value::Null => Err(PropertyError::NullSource {
                property: name.to_string(),
            }),
            Value::Object(obj) => self.write_bean_property(obj, name, value, ctx),
            Value::Map(entries) => {
                entries.insert(name, value);
                Ok(())
            }
            other => Err(PropertyError::NotWritable {
                type_name: other.type_name(),
                property: name.to_string(),
            }),
        }
    }

    /// Write a bean property, applying the context converter
    pub fn write_bean_property(
        &self,
        obj: &ObjectRef,
        name: &str,
        value: Value,
        ctx: &EvaluationContext,
    ) -> PropertyResult<()> {
        let value = self.convert_for_property(obj, name, value, ctx)?;
        obj.write().set_property(name, value)
    }

    /// Convert `value` to the declared type of `obj.name` when a converter is installed
    pub fn convert_for_property(
        &self,
        obj: &ObjectRef,
        name: &str,
        value: Value,
        ctx: &EvaluationContext,
    ) -> PropertyResult<Value> {
        let Some(converter) = ctx.type_converter() else {
            return Ok(value);
        };

        let info = self.beans.for_object(obj);
        match info.property(name) {
            Some(descriptor)
                if descriptor.value_type != ValueType::Any
                    && descriptor.value_type != value.value_type() =>
            {
                Ok(converter.convert_value(value, descriptor.value_type)?)
            }
            _ => Ok(value),
        }
    }

    fn write_index(
        &self,
        target: &Value,
        key: &Value,
        value: Value,
        ctx: &EvaluationContext,
    ) -> PropertyResult<()> {
        match (target, key) {
            (Value::Null, _) => Err(PropertyError::NullSource {
                property: key.to_string(),
            }),
            (Value::List(items) | Value::Array(items), _) if key.as_i64().is_some() => {
                let index = key.as_i64().unwrap_or_default();
                let mut guard = items.write();
                let len = guard.len();
                let slot = checked_index(index, len).and_then(|i| guard.get_mut(i));
                match slot {
                    Some(slot) => {
                        *slot = value;
                        Ok(())
                    }
                    None => Err(PropertyError::IndexOutOfBounds { index, len }),
                }
            }
            (Value::Map(entries), key) => {
                entries.insert(map_key(key), value);
                Ok(())
            }
            (Value::Object(_), Value::String(name)) => {
                self.write_property(target, name, value, ctx)
            }
            (other, key) => Err(PropertyError::InvalidIndex {
                type_name: other.type_name(),
                key: key.to_string(),
            }),
        }
    }
}

fn literal_value(lit: &LiteralValue) -> PropertyResult<Value> {
    Ok(match lit {
        LiteralValue::Null => Value::Null,
        LiteralValue::Boolean(b) => Value::Boolean(*b),
        LiteralValue::Integer(i) => Value::Integer(*i),
        LiteralValue::Decimal(text) => {
            let decimal = Decimal::from_str(text).map_err(|_| ConversionError::InvalidFormat {
                value: text.clone(),
                to: ValueType::Decimal,
            })?;
            Value::Decimal(decimal)
        }
        LiteralValue::String(s) => Value::String(s.clone()),
    })
}

fn read_variable(ctx: &EvaluationContext, name: &str) -> Value {
    match name {
        "root" | "this" => ctx.root().clone(),
        _ => ctx.get_variable(name).cloned().unwrap_or_default(),
    }
}

/// Read a named property of any value
pub fn read_property(target: &Value, name: &str) -> PropertyResult<Value> {
    match target {
        Value::Null => Err(PropertyError::NullSource {
            property: name.to_string(),
        }),
        Value::Object(obj) => obj.read().get_property(name),
        Value::Map(entries) => Ok(read_map_property(entries, name)),
        Value::List(items) => match name {
            "size" => Ok(len_value(items.len())),
            "isEmpty" => Ok(Value::Boolean(items.is_empty())),
            _ => Err(PropertyError::no_such_property("List", name)),
        },
        Value::Array(items) => match name {
            "length" => Ok(len_value(items.len())),
            _ => Err(PropertyError::no_such_property("Array", name)),
        },
        Value::String(s) => match name {
            "length" => Ok(len_value(s.chars().count())),
            _ => Err(PropertyError::no_such_property("String", name)),
        },
        other => Err(PropertyError::no_such_property(other.type_name(), name)),
    }
}

fn read_map_property(entries: &MapRef, name: &str) -> Value {
    let guard = entries.read();
    if let Some(value) = guard.get(name) {
        return value.clone();
    }
    match name {
        "size" => len_value(guard.len()),
        "isEmpty" => Value::Boolean(guard.is_empty()),
        _ => Value::Null,
    }
}

fn read_index(target: &Value, key: &Value) -> PropertyResult<Value> {
    match (target, key) {
        (Value::Null, _) => Err(PropertyError::NullSource {
            property: key.to_string(),
        }),
        (Value::List(items) | Value::Array(items), _) if key.as_i64().is_some() => {
            element_at(items, key.as_i64().unwrap_or_default())
        }
        (Value::Map(entries), key) => Ok(entries.get(&map_key(key)).unwrap_or_default()),
        (_, Value::String(name)) => read_property(target, name),
        (other, key) => Err(PropertyError::InvalidIndex {
            type_name: other.type_name(),
            key: key.to_string(),
        }),
    }
}

fn element_at(items: &ListRef, index: i64) -> PropertyResult<Value> {
    let guard = items.read();
    checked_index(index, guard.len())
        .and_then(|i| guard.get(i).cloned())
        .ok_or(PropertyError::IndexOutOfBounds {
            index,
            len: guard.len(),
        })
}

fn checked_index(index: i64, len: usize) -> Option<usize> {
    usize::try_from(index).ok().filter(|i| *i < len)
}

fn map_key(key: &Value) -> String {
    match key {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn len_value(len: usize) -> Value {
    Value::Integer(i64::try_from(len).unwrap_or(i64::MAX))
}

/// Invoke a method on any value
///
/// Beans dispatch to [`Bean::invoke`](crate::model::Bean::invoke); strings,
/// collections and maps support a fixed set of builtins.
pub fn call_method(receiver: &Value, method: &str, args: &[Value]) -> PropertyResult<Value> {
    match receiver {
        Value::Null => Err(PropertyError::NullSource {
            property: format!("{method}()"),
        }),
        Value::Object(obj) => obj.read().invoke(method, args),
        Value::String(s) => string_method(s, method, args),
        Value::List(items) | Value::Array(items) => sequence_method(items, method, args),
        Value::Map(entries) => map_method(entries, method, args),
        other => Err(unknown_method(other.type_name(), method, args)),
    }
}

fn unknown_method(type_name: Cow<'static, str>, method: &str, args: &[Value]) -> PropertyError {
    PropertyError::no_such_method(type_name, method, args.len())
}

fn string_method(s: &str, method: &str, args: &[Value]) -> PropertyResult<Value> {
    match (method, args) {
        ("length", []) => Ok(len_value(s.chars().count())),
        ("isEmpty", []) => Ok(Value::Boolean(s.is_empty())),
        ("trim", []) => Ok(Value::String(s.trim().to_string())),
        ("toUpperCase", []) => Ok(Value::String(s.to_uppercase())),
        ("toLowerCase", []) => Ok(Value::String(s.to_lowercase())),
        ("contains", [Value::String(needle)]) => Ok(Value::Boolean(s.contains(needle.as_str()))),
        _ => Err(unknown_method(Cow::Borrowed("String"), method, args)),
    }
}

fn sequence_method(items: &ListRef, method: &str, args: &[Value]) -> PropertyResult<Value> {
    match (method, args) {
        ("size" | "length", []) => Ok(len_value(items.len())),
        ("isEmpty", []) => Ok(Value::Boolean(items.is_empty())),
        ("get", [index]) => match index.as_i64() {
            Some(i) => element_at(items, i),
            None => Err(PropertyError::InvalidIndex {
                type_name: Cow::Borrowed("List"),
                key: index.to_string(),
            }),
        },
        ("contains", [needle]) => Ok(Value::Boolean(items.read().iter().any(|v| v == needle))),
        _ => Err(unknown_method(Cow::Borrowed("List"), method, args)),
    }
}

fn map_method(entries: &MapRef, method: &str, args: &[Value]) -> PropertyResult<Value> {
    match (method, args) {
        ("size", []) => Ok(len_value(entries.len())),
        ("isEmpty", []) => Ok(Value::Boolean(entries.is_empty())),
        ("get", [key]) => Ok(entries.get(&map_key(key)).unwrap_or_default()),
        ("containsKey", [key]) => Ok(Value::Boolean(
            entries.read().contains_key(map_key(key).as_str()),
        )),
        _ => Err(unknown_method(Cow::Borrowed("Map"), method, args)),
    }
}
