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

//! Source registries: named collections of live metrics.

use crate::metrics::SourceMetric;
use std::collections::BTreeMap;
use std::fmt::{Debug, Display};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// The read-side contract the bridge needs from a source registry.
pub trait SourceRegistry: Send + Sync + Debug + 'static {
    /// Invokes `f` once for every `(name, metric)` pair currently registered.
    ///
    /// Implementations must tolerate metrics being added or removed while a
    /// walk is in progress.
    fn each(&self, f: &mut dyn FnMut(&str, &SourceMetric));

    /// Returns the number of registered metrics.
    fn len(&self) -> usize;

    /// Returns `true` when no metric is registered.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A specialized `Result` type for source-registry operations.
pub type MetricsResult<T> = Result<T, MetricsError>;

/// An error that can occur within a source registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetricsError {
    /// A metric with this name is already registered.
    DuplicateMetric(String),
    /// The requested metric was not found in the registry.
    MetricNotFound(String),
}

impl Display for MetricsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MetricsError::DuplicateMetric(name) => write!(f, "Duplicate metric: {name}"),
            MetricsError::MetricNotFound(name) => write!(f, "Metric not found: {name}"),
        }
    }
}

impl std::error::Error for MetricsError {}

/// Thread-safe in-memory source registry.
///
/// Metrics are kept sorted by name, so walks are deterministic.
#[derive(Debug, Default)]
pub struct InMemoryRegistry {
    storage: RwLock<BTreeMap<String, SourceMetric>>,
}

impl InMemoryRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `metric` under `name`.
    pub fn register(
        &self,
        name: impl Into<String>,
        metric: impl Into<SourceMetric>,
    ) -> MetricsResult<()> {
        let name = name.into();
        let mut storage = self.write();
        if storage.contains_key(&name) {
            return Err(MetricsError::DuplicateMetric(name));
        }
        log::trace!("Registered source metric '{}'", name);
        storage.insert(name, metric.into());
        Ok(())
    }

    /// Returns the metric under `name`, registering the one built by `make`
    /// if there is none yet.
    pub fn get_or_register<M, F>(&self, name: &str, make: F) -> SourceMetric
    where
        M: Into<SourceMetric>,
        F: FnOnce() -> M,
    {
        if let Some(existing) = self.get(name) {
            return existing;
        }
        self.write()
            .entry(name.to_string())
            .or_insert_with(|| make().into())
            .clone()
    }

    /// Returns the metric registered under `name`.
    pub fn get(&self, name: &str) -> Option<SourceMetric> {
        self.read().get(name).cloned()
    }

    /// Removes the metric registered under `name`.
    pub fn unregister(&self, name: &str) -> MetricsResult<SourceMetric> {
        self.write()
            .remove(name)
            .ok_or_else(|| MetricsError::MetricNotFound(name.to_string()))
    }

    /// Removes every metric.
    pub fn unregister_all(&self) {
        self.write().clear();
    }

    fn read(&self) -> RwLockReadGuard<'_, BTreeMap<String, SourceMetric>> {
        self.storage.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, BTreeMap<String, SourceMetric>> {
        self.storage.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl SourceRegistry for InMemoryRegistry {
    fn each(&self, f: &mut dyn FnMut(&str, &SourceMetric)) {
        // Copy out first so callbacks run without holding the lock.
        let entries: Vec<(String, SourceMetric)> = self
            .read()
            .iter()
            .map(|(name, metric)| (name.clone(), metric.clone()))
            .collect();

        for (name, metric) in &entries {
            f(name, metric);
        }
    }

    fn len(&self) -> usize {
        self.read().len()
    }
}
