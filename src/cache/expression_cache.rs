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

//! Parsed expression cache keyed by source text

use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use super::CacheStats;
use crate::parser::{Expression, ParseResult};

/// Thread-safe cache of parsed expressions
///
/// Entries are never evicted. Parsing happens while the lock is held.
#[derive(Debug, Default)]
pub struct ExpressionCache {
    entries: Mutex<FxHashMap<String, Arc<Expression>>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl ExpressionCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached expression for `source`, parsing it on first use
    ///
    /// Failed parses are not cached.
    pub fn get_or_parse(&self, source: &str) -> ParseResult<Arc<Expression>> {
        let mut entries = self.entries.lock();

        if let Some(expr) = entries.get(source) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Ok(Arc::clone(expr));
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        log::debug!("Expression cache miss, parsing '{source}'");

        let expr = Arc::new(Expression::parse(source)?);
        entries.insert(source.to_string(), Arc::clone(&expr));
        Ok(expr)
    }

    /// Look up an expression without parsing
    pub fn get(&self, source: &str) -> Option<Arc<Expression>> {
        self.entries.lock().get(source).cloned()
    }

    /// Number of cached expressions
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Whether nothing is cached
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Get cache statistics
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.len(),
        }
    }

    /// Drop all entries and reset statistics
    pub fn clear(&self) {
        self.entries.lock().clear();
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_basic_operations() {
        let cache = ExpressionCache::new();
        assert!(cache.get("user.name").is_none());

        let first = cache.get_or_parse("user.name").unwrap();
        let second = cache.get_or_parse("user.name").unwrap();
        assert!(Arc::ptr_eq(&first, &second));

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.entries, 1);
        assert_eq!(stats.hit_rate(), 50.0);
    }

    #[test]
    fn test_source_text_is_the_key() {
        let cache = ExpressionCache::new();
        cache.get_or_parse("a.b").unwrap();
        cache.get_or_parse(" a.b").unwrap();
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_failed_parse_not_cached() {
        let cache = ExpressionCache::new();
        assert!(cache.get_or_parse("a..b").is_err());
        assert!(cache.is_empty());
        assert_eq!(cache.stats().misses, 1);
    }

    #[test]
    fn test_clear_resets() {
        let cache = ExpressionCache::new();
        cache.get_or_parse("x").unwrap();
        cache.clear();
        assert_eq!(cache.stats(), CacheStats::default());
    }
}
