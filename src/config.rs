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

//! Configuration lookup and the enhanced-mode toggle

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};

use crate::error::ConfigResult;

/// Parameter that enables the compiled accessor fast path
pub const ENHANCEMENT_PARAMETER: &str = "useExpressionEnhancement";

/// Source of named configuration parameters
pub trait ConfigProvider: fmt::Debug + Send + Sync {
    /// Value of `name`, `None` when not configured
    fn parameter(&self, name: &str) -> ConfigResult<Option<String>>;
}

/// In-memory configuration provider
///
/// ```
/// use beanpath::config::{ConfigProvider, StaticConfig};
///
/// let config = StaticConfig::from_json_str(r#"{"useExpressionEnhancement": "true"}"#).unwrap();
/// assert_eq!(
///     config.parameter("useExpressionEnhancement").unwrap().as_deref(),
///     Some("true")
/// );
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StaticConfig {
    parameters: IndexMap<String, String>,
}

impl StaticConfig {
    /// Create an empty configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a parameter
    pub fn with_parameter(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters.insert(name.into(), value.into());
        self
    }

    /// Set or replace a parameter
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.parameters.insert(name.into(), value.into());
    }

    /// Parse a flat JSON object of string parameters
    pub fn from_json_str(json: &str) -> ConfigResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read a flat JSON object of string parameters from a file
    pub fn from_json_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Number of parameters
    pub fn len(&self) -> usize {
        self.parameters.len()
    }

    /// Whether no parameters are set
    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }
}

impl ConfigProvider for StaticConfig {
    fn parameter(&self, name: &str) -> ConfigResult<Option<String>> {
        Ok(self.parameters.get(name).cloned())
    }
}

const UNRESOLVED: u8 = 0;
const DISABLED: u8 = 1;
const ENABLED: u8 = 2;

/// Lazily resolved switch for the compiled accessor fast path
///
/// The parameter is read on first use. Only `"true"` (any case) enables the
/// fast path; a missing parameter, other text or a provider error disable it.
/// Concurrent first reads may each consult the provider, after which the
/// outcome is stable until [`reset`](Self::reset).
#[derive(Debug)]
pub struct EnhancementToggle {
    provider: Option<Arc<dyn ConfigProvider>>,
    state: AtomicU8,
}

impl EnhancementToggle {
    /// Toggle backed by a configuration provider
    pub fn new(provider: Arc<dyn ConfigProvider>) -> Self {
        Self {
            provider: Some(provider),
            state: AtomicU8::new(UNRESOLVED),
        }
    }

    /// Toggle without a provider, always disabled until forced
    pub fn disabled() -> Self {
        Self {
            provider: None,
            state: AtomicU8::new(UNRESOLVED),
        }
    }

    /// Toggle fixed to `enabled`, bypassing any provider
    pub fn fixed(enabled: bool) -> Self {
        Self {
            provider: None,
            state: AtomicU8::new(if enabled { ENABLED } else { DISABLED }),
        }
    }

    /// Whether the compiled fast path is enabled
    pub fn is_enabled(&self) -> bool {
        match self.state.load(Ordering::Acquire) {
            ENABLED => true,
            DISABLED => false,
            _ => {
                let enabled = self.resolve();
                self.state
                    .store(if enabled { ENABLED } else { DISABLED }, Ordering::Release);
                enabled
            }
        }
    }

    /// Override the resolved value
    pub fn force(&self, enabled: bool) {
        self.state
            .store(if enabled { ENABLED } else { DISABLED }, Ordering::Release);
    }

    /// Forget the resolved value so the next check consults the provider again
    pub fn reset(&self) {
        self.state.store(UNRESOLVED, Ordering::Release);
    }

    fn resolve(&self) -> bool {
        let Some(provider) = &self.provider else {
            return false;
        };

        match provider.parameter(ENHANCEMENT_PARAMETER) {
            Ok(Some(value)) => value.trim().eq_ignore_ascii_case("true"),
            Ok(None) => false,
            Err(err) => {
                log::warn!(
                    "Cannot read '{ENHANCEMENT_PARAMETER}', compiled accessors stay disabled: {err}"
                );
                false
            }
        }
    }
}

impl Default for EnhancementToggle {
    fn default() -> Self {
        Self::disabled()
    }
}
