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

//! Bean metadata cache keyed by concrete type

use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use std::any::TypeId;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use super::CacheStats;
use crate::model::{Bean, BeanInfo, ObjectRef};

/// Thread-safe cache of introspected [`BeanInfo`]
#[derive(Debug, Default)]
pub struct BeanInfoCache {
    entries: Mutex<FxHashMap<TypeId, Arc<BeanInfo>>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl BeanInfoCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Metadata for the bean's concrete type, introspecting on first encounter
    pub fn get_or_introspect(&self, bean: &dyn Bean) -> Arc<BeanInfo> {
        let type_id = bean.bean_type();
        let mut entries = self.entries.lock();

        if let Some(info) = entries.get(&type_id) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Arc::clone(info);
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        log::debug!("Introspecting bean type {}", bean.type_name());

        let info = Arc::new(BeanInfo::of(bean));
        entries.insert(type_id, Arc::clone(&info));
        info
    }

    /// Metadata for the bean behind a shared reference
    pub fn for_object(&self, object: &ObjectRef) -> Arc<BeanInfo> {
        let bean = object.read();
        self.get_or_introspect(&*bean)
    }

    /// Look up metadata without introspecting
    pub fn get(&self, type_id: TypeId) -> Option<Arc<BeanInfo>> {
        self.entries.lock().get(&type_id).cloned()
    }

    /// Number of cached types
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
    use crate::model::Value;

    #[derive(Debug, Default)]
    struct Point {
        x: i64,
        y: i64,
    }

    crate::impl_bean!(Point { rw x: i64, rw y: i64 });

    #[test]
    fn test_one_entry_per_type() {
        let cache = BeanInfoCache::new();
        let a = ObjectRef::new(Point::default());
        let b = ObjectRef::new(Point { x: 1, y: 2 });

        let first = cache.for_object(&a);
        let second = cache.for_object(&b);

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.stats().hits, 1);
        assert!(cache.get(TypeId::of::<Point>()).is_some());
    }

    #[test]
    fn test_descriptors_cached() {
        let cache = BeanInfoCache::new();
        let value = Value::object(Point::default());
        let info = cache.for_object(value.as_object().unwrap());
        assert!(info.has_property("x"));
        assert!(!info.has_property("z"));
    }
}
