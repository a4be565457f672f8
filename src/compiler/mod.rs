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

//! Compiled accessors: the fast path for plain bean property chains
//!
//! A compiled accessor is specialised for one root bean type and one
//! expression. It never reports errors to callers; every outcome other than
//! success is an [`Attempt`] variant that tells the engine to fall back to
//! the interpreter.

pub mod accessor;
pub mod accessor_cache;

use std::borrow::Cow;

use crate::error::EngineError;

pub use accessor::CompiledAccessor;
pub use accessor_cache::AccessorCache;

/// Outcome of a fast-path attempt
#[derive(Debug, Clone, PartialEq)]
pub enum Attempt<T> {
    /// The fast path produced a result
    Done(T),
    /// The fast path cannot handle this expression or root
    Unsupported(Cow<'static, str>),
    /// The fast path applied but failed while running
    Failed(EngineError),
}

impl<T> Attempt<T> {
    /// Whether the attempt succeeded
    pub fn is_done(&self) -> bool {
        matches!(self, Attempt::Done(_))
    }

    /// Result value when done
    pub fn done(self) -> Option<T> {
        match self {
            Attempt::Done(value) => Some(value),
            _ => None,
        }
    }

    /// Transform the successful value
    pub fn map<U, F>(self, f: F) -> Attempt<U>
    where
        F: FnOnce(T) -> U,
    {
        match self {
            Attempt::Done(value) => Attempt::Done(f(value)),
            Attempt::Unsupported(reason) => Attempt::Unsupported(reason),
            Attempt::Failed(err) => Attempt::Failed(err),
        }
    }
}
