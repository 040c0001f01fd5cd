// Copyright 2025 eraflo
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

//! Cache of registered external gauges.

use crate::error::BridgeResult;
use crate::normalize::NameNormalizer;
use crate::sink::{ExternalGauge, ExternalRegistry, GaugeDescriptor};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

type GaugeMap = HashMap<String, Arc<dyn ExternalGauge>>;

/// Maps raw `(namespace, subsystem, name)` triples to their external gauge.
///
/// Each triple is registered with the external registry exactly once, on
/// first sight. Lookup-or-register happens under a single lock, so concurrent
/// upserts of the same triple never register twice.
pub struct GaugeCache {
    registry: Arc<dyn ExternalRegistry>,
    normalizer: NameNormalizer,
    gauges: Mutex<GaugeMap>,
}

impl GaugeCache {
    /// Creates an empty cache publishing into `registry`.
    pub fn new(registry: Arc<dyn ExternalRegistry>, normalizer: NameNormalizer) -> Self {
        Self {
            registry,
            normalizer,
            gauges: Mutex::new(HashMap::new()),
        }
    }

    /// Publishes `value` for the given metric, registering its gauge on first use.
    ///
    /// The cache key is built from the raw names. A registration failure is
    /// returned unchanged and leaves the cache untouched.
    pub fn upsert(
        &self,
        namespace: &str,
        subsystem: &str,
        name: &str,
        value: f64,
    ) -> BridgeResult<()> {
        let key = format!("{namespace}_{subsystem}_{name}");
        let mut gauges = self.lock();

        if let Some(gauge) = gauges.get(&key) {
            gauge.set(value);
            return Ok(());
        }

        let descriptor = GaugeDescriptor {
            namespace: (self.normalizer)(namespace),
            subsystem: (self.normalizer)(subsystem),
            name: (self.normalizer)(name),
            help: name.to_string(),
        };
        let gauge = self.registry.register_gauge(&descriptor)?;
        log::debug!("Registered gauge '{}' for '{}'", descriptor.fq_name(), name);

        gauge.set(value);
        gauges.insert(key, gauge);
        Ok(())
    }

    /// Returns the number of registered gauges.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns `true` if no gauge has been registered yet.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, GaugeMap> {
        self.gauges.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for GaugeCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GaugeCache")
            .field("gauges", &self.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BridgeError;
    use crate::normalize::{default_normalizer, lowercase_normalizer};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;

    struct CountingRegistry {
        registrations: AtomicUsize,
        inner: prometheus::Registry,
    }

    impl ExternalRegistry for CountingRegistry {
        fn register_gauge(
            &self,
            descriptor: &GaugeDescriptor,
        ) -> BridgeResult<Arc<dyn ExternalGauge>> {
            self.registrations.fetch_add(1, Ordering::SeqCst);
            self.inner.register_gauge(descriptor)
        }
    }

    fn cache_with(normalizer: NameNormalizer) -> (GaugeCache, Arc<CountingRegistry>) {
        let registry = Arc::new(CountingRegistry {
            registrations: AtomicUsize::new(0),
            inner: prometheus::Registry::new(),
        });
        (GaugeCache::new(registry.clone(), normalizer), registry)
    }

    #[test]
    fn test_registers_once_then_sets() {
        let (cache, registry) = cache_with(Arc::new(default_normalizer));
        cache.upsert("app", "db", "pool.size", 4.0).unwrap();
        cache.upsert("app", "db", "pool.size", 9.0).unwrap();

        assert_eq!(registry.registrations.load(Ordering::SeqCst), 1);
        assert_eq!(cache.len(), 1);

        let gauge = cache.lock().get("app_db_pool.size").cloned().unwrap();
        assert_eq!(gauge.get(), 9.0);
    }

    #[test]
    fn test_normalization_collision_surfaces_registration_error() {
        let (cache, registry) = cache_with(Arc::new(lowercase_normalizer));
        cache.upsert("app", "sub", "Requests", 1.0).unwrap();

        let err = cache.upsert("app", "sub", "requests", 2.0).unwrap_err();
        assert!(matches!(err, BridgeError::Registration { .. }));
        assert_eq!(registry.registrations.load(Ordering::SeqCst), 2);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_concurrent_upserts_register_once() {
        let (cache, registry) = cache_with(Arc::new(default_normalizer));
        let cache = Arc::new(cache);

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let cache = Arc::clone(&cache);
                thread::spawn(move || cache.upsert("app", "sub", "shared", i as f64))
            })
            .collect();
        for handle in handles {
            handle.join().unwrap().unwrap();
        }

        assert_eq!(registry.registrations.load(Ordering::SeqCst), 1);
        assert_eq!(cache.len(), 1);
    }
}
