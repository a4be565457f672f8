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

//! Value model, bean introspection and type conversion
//!
//! This module provides the object graph expressions operate on: the dynamic
//! [`Value`], the [`Bean`] trait user types implement, and the converters used
//! when values are assigned to typed properties.

pub mod bean;
pub mod conversion;
pub mod error;
pub mod value;

pub use bean::{Bean, BeanInfo, PropertyDescriptor};
pub use conversion::{DefaultTypeConverter, TypeConverter};
pub use error::{ConversionError, ConversionResult, PropertyError, PropertyResult};
pub use value::{FromValue, ListRef, MapRef, ObjectRef, Value, ValueType, ValueTyped};
