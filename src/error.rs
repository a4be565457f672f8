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

//! Error types for the expression engine, the validator and configuration
//!
//! Lower layers have their own errors ([`ParseError`], [`PropertyError`]);
//! the engine wraps them together with the expression that failed.

use std::borrow::Cow;
use thiserror::Error;

use crate::model::PropertyError;
use crate::parser::ParseError;

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;

/// Result type alias for validation
pub type ValidationResult<T> = std::result::Result<T, ValidationError>;

/// Result type alias for configuration lookups
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Errors raised by the expression engine
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    /// The expression text could not be parsed
    #[error("Malformed expression '{expression}': {source}")]
    MalformedExpression {
        /// Expression text
        expression: String,
        /// Underlying parse failure
        #[source]
        source: ParseError,
    },

    /// Evaluating or assigning through the expression failed
    #[error("Error evaluating '{expression}': {source}")]
    PropertyAccess {
        /// Expression text
        expression: String,
        /// Underlying property failure
        #[source]
        source: PropertyError,
    },

    /// The compiled fast path cannot serve this root or expression
    ///
    /// Only ever logged; the interpreter takes over.
    #[error("Compiled accessor for '{expression}' is incompatible: {reason}")]
    CompiledPathIncompatible {
        /// Expression text
        expression: String,
        /// Why the compiled accessor could not be used
        reason: Cow<'static, str>,
    },

    /// A strict bulk property assignment failed
    #[error("Caught error while setting property '{property}' on type '{target_type}'.")]
    PropertySetFailed {
        /// Property name (the expression key)
        property: String,
        /// Type name of the target object
        target_type: Cow<'static, str>,
        /// The failure that aborted the assignment
        #[source]
        source: Box<EngineError>,
    },
}

impl EngineError {
    /// Create a malformed expression error
    pub fn malformed(expression: impl Into<String>, source: ParseError) -> Self {
        Self::MalformedExpression {
            expression: expression.into(),
            source,
        }
    }

    /// Create a property access error
    pub fn property_access(expression: impl Into<String>, source: PropertyError) -> Self {
        Self::PropertyAccess {
            expression: expression.into(),
            source,
        }
    }

    /// Create a compiled-path incompatibility
    pub fn incompatible(
        expression: impl Into<String>,
        reason: impl Into<Cow<'static, str>>,
    ) -> Self {
        Self::CompiledPathIncompatible {
            expression: expression.into(),
            reason: reason.into(),
        }
    }

    /// Expression text the error refers to
    pub fn expression(&self) -> &str {
        match self {
            Self::MalformedExpression { expression, .. }
            | Self::PropertyAccess { expression, .. }
            | Self::CompiledPathIncompatible { expression, .. } => expression,
            Self::PropertySetFailed { property, .. } => property,
        }
    }
}

/// Errors raised while validating an object graph
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// The validation manager reported a failure; propagated unchanged
    #[error("Validation failed: {message}")]
    Failed {
        /// Failure description
        message: String,
    },

    /// The value of the validated field could not be resolved
    #[error("Cannot resolve value of field '{field}': {source}")]
    FieldValue {
        /// Field name
        field: String,
        /// Engine failure
        #[source]
        source: EngineError,
    },
}

impl ValidationError {
    /// Create a manager failure
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed {
            message: message.into(),
        }
    }
}

/// Errors raised by configuration providers
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The provider could not answer
    #[error("Configuration parameter '{parameter}' unavailable: {message}")]
    Unavailable {
        /// Requested parameter
        parameter: String,
        /// Failure description
        message: String,
    },

    /// A configuration document could not be parsed
    #[error("Invalid configuration document: {0}")]
    InvalidDocument(#[from] serde_json::Error),

    /// A configuration file could not be read
    #[error("Cannot read configuration: {0}")]
    Io(#[from] std::io::Error),
}
