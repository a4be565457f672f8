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

//! Errors raised while reading, writing or converting values of the object graph

use std::borrow::Cow;
use thiserror::Error;

use super::value::ValueType;

/// Result type for property-level operations
pub type PropertyResult<T> = Result<T, PropertyError>;

/// Result type for type conversion
pub type ConversionResult<T> = Result<T, ConversionError>;

/// A value could not be converted to the requested type
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConversionError {
    /// No conversion exists between the two types
    #[error("Cannot convert {from} to {to}")]
    IncompatibleTypes {
        /// Source type name
        from: Cow<'static, str>,
        /// Target type
        to: ValueType,
    },

    /// The text does not have the format the target type needs
    #[error("Invalid format '{value}' for type {to}")]
    InvalidFormat {
        /// Offending text
        value: String,
        /// Target type
        to: ValueType,
    },

    /// A collection with several elements cannot become a single value
    #[error("Cannot convert a collection of {len} elements to {to}")]
    MultipleElements {
        /// Number of elements found
        len: usize,
        /// Target type
        to: ValueType,
    },
}

/// Failure to access a property, element or method of a value
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PropertyError {
    /// The type declares no property with this name
    #[error("No property '{property}' on type '{type_name}'")]
    NoSuchProperty {
        /// Type that was inspected
        type_name: Cow<'static, str>,
        /// Requested property
        property: String,
    },

    /// The property exists but has no read accessor
    #[error("Property '{property}' of type '{type_name}' is not readable")]
    NotReadable {
        /// Owning type
        type_name: Cow<'static, str>,
        /// Requested property
        property: String,
    },

    /// The property exists but has no write accessor
    #[error("Property '{property}' of type '{type_name}' is not writable")]
    NotWritable {
        /// Owning type
        type_name: Cow<'static, str>,
        /// Requested property
        property: String,
    },

    /// The supplied value does not fit the declared property type
    #[error("Property '{property}' expects {expected}, got {actual}")]
    TypeMismatch {
        /// Property being written
        property: String,
        /// Declared type
        expected: ValueType,
        /// Type name of the supplied value
        actual: Cow<'static, str>,
    },

    /// Navigation hit a null value before reaching the target
    #[error("Source is null while accessing '{property}'")]
    NullSource {
        /// Property or element that was requested from null
        property: String,
    },

    /// Index outside of a list or array
    #[error("Index {index} out of bounds for length {len}")]
    IndexOutOfBounds {
        /// Requested index
        index: i64,
        /// Length of the collection
        len: usize,
    },

    /// The value cannot be indexed with the given key
    #[error("Cannot index {type_name} with {key}")]
    InvalidIndex {
        /// Type of the indexed value
        type_name: Cow<'static, str>,
        /// Rendered key
        key: String,
    },

    /// No method with this name accepts the given arguments
    #[error("No method '{method}' with {arity} argument(s) on type '{type_name}'")]
    NoSuchMethod {
        /// Receiver type
        type_name: Cow<'static, str>,
        /// Requested method
        method: String,
        /// Number of arguments supplied
        arity: usize,
    },

    /// The expression cannot be used as an assignment target
    #[error("Expression '{expression}' is not assignable")]
    NotAssignable {
        /// Rendered expression node
        expression: String,
    },

    /// A bean accessor reported its own failure
    #[error("Accessor failed: {message}")]
    AccessorFailed {
        /// Failure description
        message: Cow<'static, str>,
    },

    /// Conversion of an incoming or outgoing value failed
    #[error(transparent)]
    Conversion(#[from] ConversionError),
}

impl PropertyError {
    /// Create a missing-property error
    pub fn no_such_property(
        type_name: impl Into<Cow<'static, str>>,
        property: impl Into<String>,
    ) -> Self {
        Self::NoSuchProperty {
            type_name: type_name.into(),
            property: property.into(),
        }
    }

    /// Create a missing-method error
    pub fn no_such_method(
        type_name: impl Into<Cow<'static, str>>,
        method: impl Into<String>,
        arity: usize,
    ) -> Self {
        Self::NoSuchMethod {
            type_name: type_name.into(),
            method: method.into(),
            arity,
        }
    }

    /// Create an accessor failure with a free-form message
    pub fn accessor_failed(message: impl Into<Cow<'static, str>>) -> Self {
        Self::AccessorFailed {
            message: message.into(),
        }
    }
}
