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

//! A single conversion-and-publish pass over the source registry.

use crate::cache::GaugeCache;
use crate::convert::ValueConverter;
use crate::error::{BridgeError, BridgeResult};
use gaugebridge_core::SourceRegistry;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Walks the source registry and upserts every convertible metric.
pub struct Publisher {
    source: Arc<dyn SourceRegistry>,
    namespace: String,
    subsystem: String,
    converter: ValueConverter,
    cache: GaugeCache,
    passes: AtomicU64,
}

impl Publisher {
    /// Creates a publisher for the given source and gauge cache.
    pub fn new(
        source: Arc<dyn SourceRegistry>,
        namespace: impl Into<String>,
        subsystem: impl Into<String>,
        converter: ValueConverter,
        cache: GaugeCache,
    ) -> Self {
        Self {
            source,
            namespace: namespace.into(),
            subsystem: subsystem.into(),
            converter,
            cache,
            passes: AtomicU64::new(0),
        }
    }

    /// Runs one pass.
    ///
    /// Metrics the converter rejects are skipped. A registration failure
    /// stops the pass and is returned; metrics after it are not visited.
    pub fn run_once(&self) -> BridgeResult<()> {
        let mut published = 0usize;
        let mut skipped = 0usize;
        let mut fatal: Option<BridgeError> = None;

        self.source.each(&mut |name, metric| {
            if fatal.is_some() {
                return;
            }
            match (self.converter)(name, metric) {
                Ok(value) => {
                    match self
                        .cache
                        .upsert(&self.namespace, &self.subsystem, name, value)
                    {
                        Ok(()) => published += 1,
                        Err(err) => fatal = Some(err),
                    }
                }
                Err(err) => {
                    log::trace!("Skipping '{}': {}", name, err);
                    skipped += 1;
                }
            }
        });

        if let Some(err) = fatal {
            return Err(err);
        }

        let pass = self.passes.fetch_add(1, Ordering::Relaxed) + 1;
        log::debug!(
            "Gauge pass {} done: {} published, {} skipped",
            pass,
            published,
            skipped
        );
        Ok(())
    }

    /// Number of passes that completed without a fatal error.
    pub fn completed_passes(&self) -> u64 {
        self.passes.load(Ordering::Relaxed)
    }

    /// The gauge cache this publisher writes into.
    pub fn cache(&self) -> &GaugeCache {
        &self.cache
    }
}

impl std::fmt::Debug for Publisher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Publisher")
            .field("namespace", &self.namespace)
            .field("subsystem", &self.subsystem)
            .field("cache", &self.cache)
            .field("passes", &self.completed_passes())
            .finish_non_exhaustive()
    }
}
