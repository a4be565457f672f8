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

//! Path-expression property access for object graphs
//!
//! Expressions such as `address.city`, `lines[0].sku` or `#root['key']` read
//! and write properties of [`Bean`] objects, maps and lists. Parsed
//! expressions and bean metadata are cached; plain property chains run
//! through compiled accessors when enhanced mode is on.
//!
//! The [`validator`] module builds recursive object-graph validation on top.

pub mod ast;
pub mod cache;
pub mod compiler;
pub mod config;
pub mod engine;
pub mod error;
pub mod evaluator;
pub mod model;
pub mod parser;
pub mod validator;

// Re-export main types
pub use config::{ConfigProvider, ENHANCEMENT_PARAMETER, EnhancementToggle, StaticConfig};
pub use error::{ConfigError, EngineError, Result, ValidationError};
pub use engine::{EngineState, EngineStats, ExpressionEngine, ExpressionEngineBuilder};
pub use evaluator::{EvaluationContext, ValueStack};
pub use model::{
    Bean, BeanInfo, DefaultTypeConverter, ListRef, MapRef, ObjectRef, PropertyDescriptor,
    PropertyError, TypeConverter, Value, ValueType,
};
pub use parser::{Expression, ParseError, parse_expression as parse};
pub use validator::{
    ErrorSink, FieldValidator, ValidationErrors, ValidationManager, ValidationSession,
    VisitorFieldValidator,
};
