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

//! Recursive validation of object graphs
//!
//! Validators read fields through the [`ExpressionEngine`](crate::ExpressionEngine)
//! and report into an [`ErrorSink`]. The [`VisitorFieldValidator`] hands the
//! objects a field holds back to a [`ValidationManager`], so whole graphs are
//! validated with errors named by their path from the root.

pub mod error_sink;
pub mod session;
pub mod visitor;

use crate::error::ValidationResult;
use crate::model::Value;

pub use error_sink::{AppendingErrorSink, DelegatingErrorSink, ErrorSink, ValidationErrors};
pub use session::{SessionFrame, ValidationSession};
pub use visitor::VisitorFieldValidator;

/// Runs the validators configured for an object
///
/// Implementations decide which validators apply to `object` under
/// `context_name`. Failures are returned unchanged by the validators that
/// call back into the manager.
pub trait ValidationManager: Send + Sync {
    /// Validate `object`, reporting problems into `errors`
    fn validate(
        &self,
        object: &Value,
        context_name: &str,
        errors: &mut dyn ErrorSink,
        session: &mut ValidationSession,
    ) -> ValidationResult<()>;
}

/// Validator bound to one field of the validated object
pub trait FieldValidator: Send + Sync {
    /// Field this validator reads
    fn field_name(&self) -> &str;

    /// Validate the field of `object`
    fn validate(
        &self,
        object: &Value,
        errors: &mut dyn ErrorSink,
        session: &mut ValidationSession,
    ) -> ValidationResult<()>;
}
