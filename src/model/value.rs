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

//! Dynamic value model for the object graphs expressions are evaluated against
//!
//! Scalars are held by value. Lists, arrays, maps and beans are shared
//! references, so an assignment made through one path is visible to every
//! other holder of the same graph.

use indexmap::IndexMap;
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use rust_decimal::Decimal;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use std::any::TypeId;
use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use super::bean::Bean;
use super::error::{ConversionError, ConversionResult};

/// Declared or requested type of a value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    /// Accepts anything, no conversion
    Any,
    /// `true` / `false`
    Boolean,
    /// 64-bit signed integer
    Integer,
    /// Arbitrary precision decimal
    Decimal,
    /// Text
    String,
    /// Growable collection
    List,
    /// Fixed-length array
    Array,
    /// String-keyed map
    Map,
    /// Bean instance
    Object,
}

impl ValueType {
    /// Human readable type name
    pub fn name(self) -> &'static str {
        match self {
            ValueType::Any => "Any",
            ValueType::Boolean => "Boolean",
            ValueType::Integer => "Integer",
            ValueType::Decimal => "Decimal",
            ValueType::String => "String",
            ValueType::List => "List",
            ValueType::Array => "Array",
            ValueType::Map => "Map",
            ValueType::Object => "Object",
        }
    }

    /// Whether values of this type hold a single scalar
    pub fn is_scalar(self) -> bool {
        matches!(
            self,
            ValueType::Boolean | ValueType::Integer | ValueType::Decimal | ValueType::String
        )
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Shared, lockable bean instance
#[derive(Clone)]
pub struct ObjectRef(Arc<RwLock<dyn Bean>>);

impl ObjectRef {
    /// Wrap a bean into a shared reference
    pub fn new<B: Bean>(bean: B) -> Self {
        Self(Arc::new(RwLock::new(bean)))
    }

    /// Lock for reading
    pub fn read(&self) -> RwLockReadGuard<'_, dyn Bean> {
        self.0.read()
    }

    /// Lock for writing
    pub fn write(&self) -> RwLockWriteGuard<'_, dyn Bean> {
        self.0.write()
    }

    /// Identity of the concrete bean type
    pub fn bean_type(&self) -> TypeId {
        self.0.read().bean_type()
    }

    /// Name of the concrete bean type
    pub fn type_name(&self) -> &'static str {
        self.0.read().type_name()
    }

    /// Whether both references point at the same instance
    pub fn ptr_eq(&self, other: &ObjectRef) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.try_read() {
            Some(bean) => fmt::Debug::fmt(&*bean, f),
            None => write!(f, "<locked bean>"),
        }
    }
}

/// Shared, lockable sequence backing both lists and arrays
#[derive(Clone, Default)]
pub struct ListRef(Arc<RwLock<Vec<Value>>>);

impl ListRef {
    /// Wrap elements into a shared sequence
    pub fn new(items: Vec<Value>) -> Self {
        Self(Arc::new(RwLock::new(items)))
    }

    /// Lock for reading
    pub fn read(&self) -> RwLockReadGuard<'_, Vec<Value>> {
        self.0.read()
    }

    /// Lock for writing
    pub fn write(&self) -> RwLockWriteGuard<'_, Vec<Value>> {
        self.0.write()
    }

    /// Number of elements
    pub fn len(&self) -> usize {
        self.0.read().len()
    }

    /// Whether the sequence has no elements
    pub fn is_empty(&self) -> bool {
        self.0.read().is_empty()
    }

    /// Clone of the element at `index`
    pub fn get(&self, index: usize) -> Option<Value> {
        self.0.read().get(index).cloned()
    }

    /// Copy of all elements, taken under a single read lock
    pub fn snapshot(&self) -> Vec<Value> {
        self.0.read().clone()
    }

    /// Whether both references point at the same sequence
    pub fn ptr_eq(&self, other: &ListRef) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for ListRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.try_read() {
            Some(items) => f.debug_list().entries(items.iter()).finish(),
            None => write!(f, "<locked list>"),
        }
    }
}

/// Shared, lockable string-keyed map preserving insertion order
#[derive(Clone, Default)]
pub struct MapRef(Arc<RwLock<IndexMap<String, Value>>>);

impl MapRef {
    /// Wrap entries into a shared map
    pub fn new(entries: IndexMap<String, Value>) -> Self {
        Self(Arc::new(RwLock::new(entries)))
    }

    /// Lock for reading
    pub fn read(&self) -> RwLockReadGuard<'_, IndexMap<String, Value>> {
        self.0.read()
    }

    /// Lock for writing
    pub fn write(&self) -> RwLockWriteGuard<'_, IndexMap<String, Value>> {
        self.0.write()
    }

    /// Clone of the value stored under `key`
    pub fn get(&self, key: &str) -> Option<Value> {
        self.0.read().get(key).cloned()
    }

    /// Insert or replace an entry
    pub fn insert(&self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.0.write().insert(key.into(), value)
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.0.read().len()
    }

    /// Whether the map has no entries
    pub fn is_empty(&self) -> bool {
        self.0.read().is_empty()
    }

    /// Whether both references point at the same map
    pub fn ptr_eq(&self, other: &MapRef) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for MapRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.try_read() {
            Some(entries) => f.debug_map().entries(entries.iter()).finish(),
            None => write!(f, "<locked map>"),
        }
    }
}

/// A node of the object graph
#[derive(Debug, Clone, Default)]
pub enum Value {
    /// Absent value
    #[default]
    Null,
    /// Boolean
    Boolean(bool),
    /// Integer
    Integer(i64),
    /// Decimal
    Decimal(Decimal),
    /// Text
    String(String),
    /// Growable collection
    List(ListRef),
    /// Fixed-length array
    Array(ListRef),
    /// String-keyed map
    Map(MapRef),
    /// Bean instance
    Object(ObjectRef),
}

impl Value {
    /// Wrap a bean
    pub fn object<B: Bean>(bean: B) -> Self {
        Value::Object(ObjectRef::new(bean))
    }

    /// Build a list from any iterable of values
    pub fn list<I, V>(items: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Value::List(ListRef::new(items.into_iter().map(Into::into).collect()))
    }

    /// Build an array from any iterable of values
    pub fn array<I, V>(items: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Value::Array(ListRef::new(items.into_iter().map(Into::into).collect()))
    }

    /// Build a map from key/value pairs
    pub fn map<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        Value::Map(MapRef::new(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        ))
    }

    /// Whether this is `Null`
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Runtime type of the value
    pub fn value_type(&self) -> ValueType {
        match self {
            Value::Null => ValueType::Any,
            Value::Boolean(_) => ValueType::Boolean,
            Value::Integer(_) => ValueType::Integer,
            Value::Decimal(_) => ValueType::Decimal,
            Value::String(_) => ValueType::String,
            Value::List(_) => ValueType::List,
            Value::Array(_) => ValueType::Array,
            Value::Map(_) => ValueType::Map,
            Value::Object(_) => ValueType::Object,
        }
    }

    /// Type name used in diagnostics; beans report their own name
    pub fn type_name(&self) -> Cow<'static, str> {
        match self {
            Value::Null => Cow::Borrowed("null"),
            Value::Object(obj) => Cow::Borrowed(obj.type_name()),
            other => Cow::Borrowed(other.value_type().name()),
        }
    }

    /// Borrow the bean reference
    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            Value::Object(obj) => Some(obj),
            _ => None,
        }
    }

    /// Borrow the text
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Integer view of numeric values
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            Value::Decimal(d) if d.fract().is_zero() => d.to_i64(),
            _ => None,
        }
    }

    /// Boolean view
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Borrow the sequence of a list or array
    pub fn as_sequence(&self) -> Option<&ListRef> {
        match self {
            Value::List(items) | Value::Array(items) => Some(items),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Integer(a), Value::Integer(b)) => a == b,
            (Value::Decimal(a), Value::Decimal(b)) => a == b,
            (Value::Integer(a), Value::Decimal(b)) | (Value::Decimal(b), Value::Integer(a)) => {
                Decimal::from(*a) == *b
            }
            (Value::String(a), Value::String(b)) => a == b,
            (Value::List(a), Value::List(b)) | (Value::Array(a), Value::Array(b)) => {
                a.ptr_eq(b) || *a.read() == *b.read()
            }
            (Value::Map(a), Value::Map(b)) => a.ptr_eq(b) || *a.read() == *b.read(),
            // Beans compare by identity
            (Value::Object(a), Value::Object(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Boolean(b) => write!(f, "{b}"),
            Value::Integer(i) => write!(f, "{i}"),
            Value::Decimal(d) => write!(f, "{d}"),
            Value::String(s) => f.write_str(s),
            Value::List(items) | Value::Array(items) => {
                f.write_str("[")?;
                for (i, item) in items.read().iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Value::Map(entries) => {
                f.write_str("{")?;
                for (i, (k, v)) in entries.read().iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{k}={v}")?;
                }
                f.write_str("}")
            }
            Value::Object(obj) => write!(f, "{obj:?}"),
        }
    }
}

/// Types that can be read out of a [`Value`]
pub trait FromValue: Sized {
    /// Extract `Self`, failing when the value has another shape
    fn from_value(value: Value) -> ConversionResult<Self>;
}

/// Types with a fixed declared [`ValueType`], used for bean descriptors
pub trait ValueTyped {
    /// Declared type of properties holding `Self`
    const VALUE_TYPE: ValueType;
}

fn incompatible<T>(value: &Value, to: ValueType) -> ConversionResult<T> {
    Err(ConversionError::IncompatibleTypes {
        from: value.type_name(),
        to,
    })
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Integer(i64::from(i))
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

impl From<Decimal> for Value {
    fn from(d: Decimal) -> Self {
        Value::Decimal(d)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Decimal::from_f64(f).map_or(Value::Null, Value::Decimal)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<ObjectRef> for Value {
    fn from(obj: ObjectRef) -> Self {
        Value::Object(obj)
    }
}

impl From<ListRef> for Value {
    fn from(items: ListRef) -> Self {
        Value::List(items)
    }
}

impl From<MapRef> for Value {
    fn from(entries: MapRef) -> Self {
        Value::Map(entries)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map_or(Value::Null, Into::into)
    }
}

impl FromValue for Value {
    fn from_value(value: Value) -> ConversionResult<Self> {
        Ok(value)
    }
}

impl FromValue for bool {
    fn from_value(value: Value) -> ConversionResult<Self> {
        match value {
            Value::Boolean(b) => Ok(b),
            other => incompatible(&other, ValueType::Boolean),
        }
    }
}

impl FromValue for i64 {
    fn from_value(value: Value) -> ConversionResult<Self> {
        match value.as_i64() {
            Some(i) => Ok(i),
            None => incompatible(&value, ValueType::Integer),
        }
    }
}

impl FromValue for i32 {
    fn from_value(value: Value) -> ConversionResult<Self> {
        match value.as_i64().and_then(|i| i32::try_from(i).ok()) {
            Some(i) => Ok(i),
            None => incompatible(&value, ValueType::Integer),
        }
    }
}

impl FromValue for Decimal {
    fn from_value(value: Value) -> ConversionResult<Self> {
        match value {
            Value::Decimal(d) => Ok(d),
            Value::Integer(i) => Ok(Decimal::from(i)),
            other => incompatible(&other, ValueType::Decimal),
        }
    }
}

impl FromValue for f64 {
    fn from_value(value: Value) -> ConversionResult<Self> {
        match &value {
            Value::Decimal(d) => d.to_f64().map_or_else(|| incompatible(&value, ValueType::Decimal), Ok),
            Value::Integer(i) => Ok(*i as f64),
            _ => incompatible(&value, ValueType::Decimal),
        }
    }
}

impl FromValue for String {
    fn from_value(value: Value) -> ConversionResult<Self> {
        match value {
            Value::String(s) => Ok(s),
            other => incompatible(&other, ValueType::String),
        }
    }
}

impl FromValue for ObjectRef {
    fn from_value(value: Value) -> ConversionResult<Self> {
        match value {
            Value::Object(obj) => Ok(obj),
            other => incompatible(&other, ValueType::Object),
        }
    }
}

impl FromValue for ListRef {
    fn from_value(value: Value) -> ConversionResult<Self> {
        match value {
            Value::List(items) | Value::Array(items) => Ok(items),
            other => incompatible(&other, ValueType::List),
        }
    }
}

impl FromValue for MapRef {
    fn from_value(value: Value) -> ConversionResult<Self> {
        match value {
            Value::Map(entries) => Ok(entries),
            other => incompatible(&other, ValueType::Map),
        }
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: Value) -> ConversionResult<Self> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

macro_rules! value_typed {
    ($($ty:ty => $vt:expr),* $(,)?) => {
        $(impl ValueTyped for $ty {
            const VALUE_TYPE: ValueType = $vt;
        })*
    };
}

value_typed! {
    Value => ValueType::Any,
    bool => ValueType::Boolean,
    i32 => ValueType::Integer,
    i64 => ValueType::Integer,
    f64 => ValueType::Decimal,
    Decimal => ValueType::Decimal,
    String => ValueType::String,
    ObjectRef => ValueType::Object,
    ListRef => ValueType::List,
    MapRef => ValueType::Map,
}

impl<T: ValueTyped> ValueTyped for Option<T> {
    const VALUE_TYPE: ValueType = T::VALUE_TYPE;
}
