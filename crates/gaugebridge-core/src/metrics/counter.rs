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

//! Scalar metrics: counters and gauges.

use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};

/// A monotonic integer count.
#[derive(Debug, Default)]
pub struct Counter {
    count: AtomicI64,
}

impl Counter {
    /// Creates a counter starting at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Increments the counter by `delta`.
    pub fn inc(&self, delta: i64) {
        self.count.fetch_add(delta, Ordering::Relaxed);
    }

    /// Decrements the counter by `delta`.
    pub fn dec(&self, delta: i64) {
        self.count.fetch_sub(delta, Ordering::Relaxed);
    }

    /// Returns the current count.
    pub fn count(&self) -> i64 {
        self.count.load(Ordering::Relaxed)
    }

    /// Resets the counter to zero.
    pub fn clear(&self) {
        self.count.store(0, Ordering::Relaxed);
    }
}

/// A settable integer value.
#[derive(Debug, Default)]
pub struct Gauge {
    value: AtomicI64,
}

impl Gauge {
    /// Creates a gauge holding zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the current value.
    pub fn update(&self, value: i64) {
        self.value.store(value, Ordering::Relaxed);
    }

    /// Returns the current value.
    pub fn value(&self) -> i64 {
        self.value.load(Ordering::Relaxed)
    }
}

/// A settable floating-point value.
///
/// Stored as raw bits so reads and writes stay lock-free.
#[derive(Debug, Default)]
pub struct GaugeFloat {
    bits: AtomicU64,
}

impl GaugeFloat {
    /// Creates a gauge holding `0.0`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the current value.
    pub fn update(&self, value: f64) {
        self.bits.store(value.to_bits(), Ordering::Relaxed);
    }

    /// Returns the current value.
    pub fn value(&self) -> f64 {
        f64::from_bits(self.bits.load(Ordering::Relaxed))
    }
}
