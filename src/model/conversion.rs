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

//! Type conversion applied when values are assigned to typed properties

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use std::fmt;
use std::str::FromStr;

use super::error::{ConversionError, ConversionResult};
use super::value::{ListRef, Value, ValueType};

/// Converts values to a requested type
///
/// Installed into an evaluation context, the converter is consulted whenever
/// an expression assigns to a property with a declared type.
pub trait TypeConverter: fmt::Debug + Send + Sync {
    /// Convert `value` to `target`
    fn convert_value(&self, value: Value, target: ValueType) -> ConversionResult<Value>;
}

/// Converter covering the conversions form input needs
///
/// Request parameters arrive as strings, usually wrapped in single-element
/// arrays; both shapes convert to scalar property types.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultTypeConverter;

impl TypeConverter for DefaultTypeConverter {
    fn convert_value(&self, value: Value, target: ValueType) -> ConversionResult<Value> {
        if value.is_null() || target == ValueType::Any {
            return Ok(value);
        }

        match target {
            ValueType::Boolean => Self::to_boolean(value),
            ValueType::Integer => Self::to_integer(value),
            ValueType::Decimal => Self::to_decimal(value),
            ValueType::String => Self::to_string(value),
            ValueType::List => Self::to_sequence(value, false),
            ValueType::Array => Self::to_sequence(value, true),
            ValueType::Map | ValueType::Object => {
                if value.value_type() == target {
                    Ok(value)
                } else {
                    Err(incompatible(&value, target))
                }
            }
            ValueType::Any => Ok(value),
        }
    }
}

impl DefaultTypeConverter {
    fn to_boolean(value: Value) -> ConversionResult<Value> {
        match value {
            Value::Boolean(_) => Ok(value),
            Value::String(ref s) => match s.trim().to_ascii_lowercase().as_str() {
                "" => Ok(Value::Null),
                "true" | "on" | "yes" => Ok(Value::Boolean(true)),
                "false" | "off" | "no" => Ok(Value::Boolean(false)),
                _ => Err(invalid(s, ValueType::Boolean)),
            },
            Value::List(ref items) | Value::Array(ref items) => {
                Self::single(items, ValueType::Boolean).and_then(Self::to_boolean)
            }
            other => Err(incompatible(&other, ValueType::Boolean)),
        }
    }

    fn to_integer(value: Value) -> ConversionResult<Value> {
        match value {
            Value::Integer(_) => Ok(value),
            Value::Decimal(d) => {
                if d.fract().is_zero() {
                    d.to_i64()
                        .map(Value::Integer)
                        .ok_or_else(|| invalid(&d.to_string(), ValueType::Integer))
                } else {
                    Err(invalid(&d.to_string(), ValueType::Integer))
                }
            }
            Value::String(ref s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    return Ok(Value::Null);
                }
                trimmed
                    .parse::<i64>()
                    .map(Value::Integer)
                    .map_err(|_| invalid(s, ValueType::Integer))
            }
            Value::List(ref items) | Value::Array(ref items) => {
                Self::single(items, ValueType::Integer).and_then(Self::to_integer)
            }
            other => Err(incompatible(&other, ValueType::Integer)),
        }
    }

    fn to_decimal(value: Value) -> ConversionResult<Value> {
        match value {
            Value::Decimal(_) => Ok(value),
            Value::Integer(i) => Ok(Value::Decimal(Decimal::from(i))),
            Value::String(ref s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    return Ok(Value::Null);
                }
                Decimal::from_str(trimmed)
                    .map(Value::Decimal)
                    .map_err(|_| invalid(s, ValueType::Decimal))
            }
            Value::List(ref items) | Value::Array(ref items) => {
                Self::single(items, ValueType::Decimal).and_then(Self::to_decimal)
            }
            other => Err(incompatible(&other, ValueType::Decimal)),
        }
    }

    fn to_string(value: Value) -> ConversionResult<Value> {
        match value {
            Value::String(_) => Ok(value),
            Value::Boolean(_) | Value::Integer(_) | Value::Decimal(_) => {
                Ok(Value::String(value.to_string()))
            }
            Value::List(ref items) | Value::Array(ref items) => {
                Self::single(items, ValueType::String).and_then(Self::to_string)
            }
            other => Err(incompatible(&other, ValueType::String)),
        }
    }

    fn to_sequence(value: Value, array: bool) -> ConversionResult<Value> {
        let items = match value {
            Value::List(items) | Value::Array(items) => items,
            Value::Map(_) => {
                let target = if array { ValueType::Array } else { ValueType::List };
                return Err(incompatible(&value, target));
            }
            scalar => ListRef::new(vec![scalar]),
        };
        Ok(if array {
            Value::Array(items)
        } else {
            Value::List(items)
        })
    }

    /// Unwrap a one-element sequence; an empty one becomes null
    fn single(items: &ListRef, target: ValueType) -> ConversionResult<Value> {
        let guard = items.read();
        match guard.len() {
            0 => Ok(Value::Null),
            1 => Ok(guard[0].clone()),
            len => Err(ConversionError::MultipleElements { len, to: target }),
        }
    }
}

fn incompatible(value: &Value, to: ValueType) -> ConversionError {
    ConversionError::IncompatibleTypes {
        from: value.type_name(),
        to,
    }
}

fn invalid(value: &str, to: ValueType) -> ConversionError {
    ConversionError::InvalidFormat {
        value: value.to_string(),
        to,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn convert(value: Value, target: ValueType) -> ConversionResult<Value> {
        DefaultTypeConverter.convert_value(value, target)
    }

    #[test]
    fn test_string_to_scalars() {
        assert_eq!(
            convert(Value::from(" 42 "), ValueType::Integer).unwrap(),
            Value::Integer(42)
        );
        assert_eq!(
            convert(Value::from("2.50"), ValueType::Decimal).unwrap(),
            Value::Decimal(Decimal::new(250, 2))
        );
        assert_eq!(
            convert(Value::from("TRUE"), ValueType::Boolean).unwrap(),
            Value::Boolean(true)
        );
        assert!(convert(Value::from(""), ValueType::Integer).unwrap().is_null());
    }

    #[test]
    fn test_invalid_format() {
        assert!(matches!(
            convert(Value::from("abc"), ValueType::Integer),
            Err(ConversionError::InvalidFormat { .. })
        ));
        assert!(matches!(
            convert(Value::Decimal(Decimal::new(15, 1)), ValueType::Integer),
            Err(ConversionError::InvalidFormat { .. })
        ));
    }

    #[test]
    fn test_request_parameter_arrays() {
        let param = Value::array(["7"]);
        assert_eq!(
            convert(param, ValueType::Integer).unwrap(),
            Value::Integer(7)
        );

        let many = Value::array(["1", "2"]);
        assert_eq!(
            convert(many, ValueType::String).unwrap_err(),
            ConversionError::MultipleElements {
                len: 2,
                to: ValueType::String
            }
        );
    }

    #[test]
    fn test_scalar_wraps_into_list() {
        let wrapped = convert(Value::Integer(1), ValueType::List).unwrap();
        assert_eq!(wrapped, Value::list([1i64]));
    }

    #[test]
    fn test_null_and_any_pass_through() {
        assert!(convert(Value::Null, ValueType::Integer).unwrap().is_null());
        let map = Value::map([("k", 1i64)]);
        assert_eq!(convert(map.clone(), ValueType::Any).unwrap(), map);
        assert!(convert(map, ValueType::Object).is_err());
    }
}
