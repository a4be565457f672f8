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

//! Interpreted evaluation of expressions
//!
//! The interpreter handles every expression form and is the fallback for the
//! compiled accessors in [`crate::compiler`].

pub mod context;
pub mod interpreter;
pub mod value_stack;

pub use context::{EvaluationContext, RootScope};
pub use interpreter::{Interpreter, call_method, read_property};
pub use value_stack::{TOP_KEYWORD, ValueStack};
