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

//! Cache of compiled accessors keyed by root type and expression text

use dashmap::DashMap;
use std::any::TypeId;
use std::borrow::Cow;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use super::accessor::CompiledAccessor;
use crate::cache::{BeanInfoCache, CacheStats};
use crate::model::ObjectRef;
use crate::parser::Expression;

/// Outcome of compiling an expression for a root type
pub type CompileOutcome = Result<Arc<CompiledAccessor>, Cow<'static, str>>;

/// Thread-safe compiled accessor cache
///
/// Both successful compilations and the reasons an expression cannot be
/// compiled are remembered, so each pair is examined once.
#[derive(Debug, Default)]
pub struct AccessorCache {
    entries: DashMap<(TypeId, String), CompileOutcome>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl AccessorCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Accessor for `expr` on the concrete type of `root`, compiling on first use
    pub fn get_or_compile(
        &self,
        expr: &Expression,
        root: &ObjectRef,
        beans: &BeanInfoCache,
    ) -> CompileOutcome {
        let key = (root.bean_type(), expr.source().to_string());

        if let Some(entry) = self.entries.get(&key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return entry.value().clone();
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        self.entries
            .entry(key)
            .or_insert_with(|| {
                log::debug!("Compiling accessor for '{}'", expr.source());
                CompiledAccessor::compile(expr, root, beans).map(Arc::new)
            })
            .value()
            .clone()
    }

    /// Number of cached outcomes
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is cached
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get cache statistics
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.entries.len(),
        }
    }

    /// Drop all entries and reset statistics
    pub fn clear(&self) {
        self.entries.clear();
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
    }
}
