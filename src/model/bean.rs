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

//! Bean introspection: the property surface user types expose to expressions

use indexmap::IndexMap;
use std::any::TypeId;
use std::fmt;

use super::error::{PropertyError, PropertyResult};
use super::value::{Value, ValueType};

/// An object whose named properties can be read and written by expressions
///
/// Most types implement this through [`impl_bean!`](crate::impl_bean). Manual
/// implementations are needed for computed properties or method support.
pub trait Bean: fmt::Debug + Send + Sync + 'static {
    /// Name of the concrete type, used in diagnostics and metadata
    fn type_name(&self) -> &'static str;

    /// Descriptors of every property this type declares
    fn properties(&self) -> Vec<PropertyDescriptor>;

    /// Read a property
    fn get_property(&self, name: &str) -> PropertyResult<Value>;

    /// Write a property
    fn set_property(&mut self, name: &str, value: Value) -> PropertyResult<()>;

    /// Invoke a method by name
    fn invoke(&self, method: &str, args: &[Value]) -> PropertyResult<Value> {
        Err(PropertyError::no_such_method(
            self.type_name(),
            method,
            args.len(),
        ))
    }

    /// Identity of the concrete type, the key of all per-type caches
    fn bean_type(&self) -> TypeId {
        TypeId::of::<Self>()
    }
}

/// Describes one property of a bean type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyDescriptor {
    /// Property name
    pub name: String,
    /// Whether a read accessor exists
    pub readable: bool,
    /// Whether a write accessor exists
    pub writable: bool,
    /// Declared type, drives conversion on writes
    pub value_type: ValueType,
}

impl PropertyDescriptor {
    /// Create a descriptor
    pub fn new(
        name: impl Into<String>,
        readable: bool,
        writable: bool,
        value_type: ValueType,
    ) -> Self {
        Self {
            name: name.into(),
            readable,
            writable,
            value_type,
        }
    }

    /// Read-write property
    pub fn read_write(name: impl Into<String>, value_type: ValueType) -> Self {
        Self::new(name, true, true, value_type)
    }

    /// Read-only property
    pub fn read_only(name: impl Into<String>, value_type: ValueType) -> Self {
        Self::new(name, true, false, value_type)
    }
}

/// Introspected metadata of one concrete bean type
#[derive(Debug, Clone)]
pub struct BeanInfo {
    type_id: TypeId,
    type_name: &'static str,
    properties: IndexMap<String, PropertyDescriptor>,
}

impl BeanInfo {
    /// Introspect a bean instance
    pub fn of(bean: &dyn Bean) -> Self {
        let properties = bean
            .properties()
            .into_iter()
            .map(|descriptor| (descriptor.name.clone(), descriptor))
            .collect();

        Self {
            type_id: bean.bean_type(),
            type_name: bean.type_name(),
            properties,
        }
    }

    /// Concrete type identity
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Concrete type name
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Look up a descriptor by name
    pub fn property(&self, name: &str) -> Option<&PropertyDescriptor> {
        self.properties.get(name)
    }

    /// Whether the type declares `name`
    pub fn has_property(&self, name: &str) -> bool {
        self.properties.contains_key(name)
    }

    /// All descriptors in declaration order
    pub fn properties(&self) -> impl Iterator<Item = &PropertyDescriptor> {
        self.properties.values()
    }

    /// Descriptors with a read accessor
    pub fn readable(&self) -> impl Iterator<Item = &PropertyDescriptor> {
        self.properties.values().filter(|p| p.readable)
    }

    /// Descriptors with a write accessor
    pub fn writable(&self) -> impl Iterator<Item = &PropertyDescriptor> {
        self.properties.values().filter(|p| p.writable)
    }

    /// Number of declared properties
    pub fn len(&self) -> usize {
        self.properties.len()
    }

    /// Whether no properties are declared
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }
}

/// Implement [`Bean`] for a plain struct by listing its exposed fields
///
/// Each field is prefixed with its access mode: `rw`, `ro` (read-only) or
/// `wo` (write-only). Field types must implement
/// [`ValueTyped`](crate::model::ValueTyped),
/// [`FromValue`](crate::model::FromValue), `Clone` and `Into<Value>`.
///
/// ```
/// use beanpath::impl_bean;
///
/// #[derive(Debug, Default)]
/// struct Account {
///     owner: String,
///     balance: i64,
///     id: i64,
/// }
///
/// impl_bean!(Account {
///     rw owner: String,
///     rw balance: i64,
///     ro id: i64,
/// });
/// ```
#[macro_export]
macro_rules! impl_bean {
    ($name:ident { $($mode:ident $field:ident : $fty:ty),* $(,)? }) => {
        impl $crate::model::Bean for $name {
            fn type_name(&self) -> &'static str {
                stringify!($name)
            }

            fn properties(&self) -> ::std::vec::Vec<$crate::model::PropertyDescriptor> {
                vec![$(
                    $crate::model::PropertyDescriptor::new(
                        stringify!($field),
                        $crate::impl_bean!(@readable $mode),
                        $crate::impl_bean!(@writable $mode),
                        <$fty as $crate::model::ValueTyped>::VALUE_TYPE,
                    )
                ),*]
            }

            fn get_property(
                &self,
                name: &str,
            ) -> $crate::model::PropertyResult<$crate::model::Value> {
                $(
                    if name == stringify!($field) {
                        return $crate::impl_bean!(@get $mode self $name $field);
                    }
                )*
                Err($crate::model::PropertyError::no_such_property(stringify!($name), name))
            }

            fn set_property(
                &mut self,
                name: &str,
                value: $crate::model::Value,
            ) -> $crate::model::PropertyResult<()> {
                $(
                    if name == stringify!($field) {
                        return $crate::impl_bean!(@set $mode self $name $field $fty, value);
                    }
                )*
                Err($crate::model::PropertyError::no_such_property(stringify!($name), name))
            }
        }
    };

    (@readable rw) => { true };
    (@readable ro) => { true };
    (@readable wo) => { false };
    (@writable rw) => { true };
    (@writable ro) => { false };
    (@writable wo) => { true };

    (@get wo $self:ident $name:ident $field:ident) => {
        Err($crate::model::PropertyError::NotReadable {
            type_name: ::std::borrow::Cow::Borrowed(stringify!($name)),
            property: stringify!($field).to_string(),
        })
    };
    (@get $mode:ident $self:ident $name:ident $field:ident) => {
        Ok($crate::model::Value::from($self.$field.clone()))
    };

    (@set ro $self:ident $name:ident $field:ident $fty:ty, $value:ident) => {
        Err($crate::model::PropertyError::NotWritable {
            type_name: ::std::borrow::Cow::Borrowed(stringify!($name)),
            property: stringify!($field).to_string(),
        })
    };
    (@set $mode:ident $self:ident $name:ident $field:ident $fty:ty, $value:ident) => {{
        let actual = $value.type_name();
        match <$fty as $crate::model::FromValue>::from_value($value) {
            Ok(converted) => {
                $self.$field = converted;
                Ok(())
            }
            Err(_) => Err($crate::model::PropertyError::TypeMismatch {
                property: stringify!($field).to_string(),
                expected: <$fty as $crate::model::ValueTyped>::VALUE_TYPE,
                actual,
            }),
        }
    }};
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Value;

    #[derive(Debug, Default)]
    struct Account {
        owner: String,
        balance: i64,
        id: i64,
        secret: Option<String>,
    }

    crate::impl_bean!(Account {
        rw owner: String,
        rw balance: i64,
        ro id: i64,
        wo secret: Option<String>,
    });

    #[test]
    fn test_descriptors_follow_declaration() {
        let account = Account::default();
        let info = BeanInfo::of(&account);

        assert_eq!(info.type_name(), "Account");
        assert_eq!(info.len(), 4);
        let names: Vec<_> = info.properties().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["owner", "balance", "id", "secret"]);
        assert_eq!(info.readable().count(), 3);
        assert_eq!(info.writable().count(), 3);
        assert_eq!(
            info.property("id").map(|p| p.value_type),
            Some(ValueType::Integer)
        );
    }

    #[test]
    fn test_access_modes_enforced() {
        let mut account = Account {
            id: 9,
            ..Default::default()
        };

        assert_eq!(account.get_property("id").unwrap(), Value::Integer(9));
        assert!(matches!(
            account.set_property("id", Value::Integer(1)),
            Err(PropertyError::NotWritable { .. })
        ));
        assert!(matches!(
            account.get_property("secret"),
            Err(PropertyError::NotReadable { .. })
        ));

        account
            .set_property("secret", Value::from("hunter2"))
            .unwrap();
        assert_eq!(account.secret.as_deref(), Some("hunter2"));
    }

    #[test]
    fn test_type_mismatch_reports_declared_type() {
        let mut account = Account::default();
        let err = account
            .set_property("balance", Value::from("lots"))
            .unwrap_err();

        assert_eq!(
            err,
            PropertyError::TypeMismatch {
                property: "balance".into(),
                expected: ValueType::Integer,
                actual: "String".into(),
            }
        );
    }

    #[test]
    fn test_unknown_property_and_method() {
        let account = Account::default();
        assert!(matches!(
            account.get_property("missing"),
            Err(PropertyError::NoSuchProperty { .. })
        ));
        assert!(matches!(
            account.invoke("close", &[]),
            Err(PropertyError::NoSuchMethod { arity: 0, .. })
        ));
    }
}
