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

//! Histograms backed by a bounded, ordered sample window.

use super::lock;
use std::collections::VecDeque;
use std::sync::Mutex;

/// Number of samples a histogram keeps by default.
pub const DEFAULT_SAMPLE_SIZE: usize = 1028;

/// A distribution of integer observations.
///
/// Only the most recent `capacity` samples are retained, in arrival order,
/// so the last element of a snapshot's sample is always the newest value.
#[derive(Debug)]
pub struct Histogram {
    state: Mutex<SampleWindow>,
}

#[derive(Debug)]
struct SampleWindow {
    values: VecDeque<i64>,
    capacity: usize,
    count: u64,
}

impl Histogram {
    /// Creates a histogram retaining [`DEFAULT_SAMPLE_SIZE`] samples.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_SAMPLE_SIZE)
    }

    /// Creates a histogram retaining at most `capacity` samples (minimum 1).
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            state: Mutex::new(SampleWindow {
                values: VecDeque::with_capacity(capacity),
                capacity,
                count: 0,
            }),
        }
    }

    /// Records an observation, evicting the oldest one when the window is full.
    pub fn update(&self, value: i64) {
        let mut state = lock(&self.state);
        if state.values.len() == state.capacity {
            state.values.pop_front();
        }
        state.values.push_back(value);
        state.count += 1;
    }

    /// Discards every retained sample and resets the observation count.
    pub fn clear(&self) {
        let mut state = lock(&self.state);
        state.values.clear();
        state.count = 0;
    }

    /// Returns the total number of observations ever recorded.
    pub fn count(&self) -> u64 {
        lock(&self.state).count
    }

    /// Takes a point-in-time copy of the distribution.
    pub fn snapshot(&self) -> HistogramSnapshot {
        let state = lock(&self.state);
        HistogramSnapshot {
            sample: SampleSnapshot {
                values: state.values.iter().copied().collect(),
                count: state.count,
            },
        }
    }
}

impl Default for Histogram {
    fn default() -> Self {
        Self::new()
    }
}

/// An immutable copy of a sample window.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleSnapshot {
    values: Vec<i64>,
    count: u64,
}

impl SampleSnapshot {
    /// The retained samples, oldest first.
    pub fn values(&self) -> &[i64] {
        &self.values
    }

    /// Total observations recorded, including evicted ones.
    pub fn count(&self) -> u64 {
        self.count
    }
}

/// An immutable copy of a histogram.
#[derive(Debug, Clone, PartialEq)]
pub struct HistogramSnapshot {
    sample: SampleSnapshot,
}

impl HistogramSnapshot {
    /// The ordered sample this snapshot was taken from.
    pub fn sample(&self) -> &SampleSnapshot {
        &self.sample
    }

    /// Total observations recorded.
    pub fn count(&self) -> u64 {
        self.sample.count
    }

    /// Smallest retained sample, or 0 when empty.
    pub fn min(&self) -> i64 {
        self.sample.values.iter().copied().min().unwrap_or(0)
    }

    /// Largest retained sample, or 0 when empty.
    pub fn max(&self) -> i64 {
        self.sample.values.iter().copied().max().unwrap_or(0)
    }

    /// Arithmetic mean of the retained samples, or 0.0 when empty.
    pub fn mean(&self) -> f64 {
        if self.sample.values.is_empty() {
            return 0.0;
        }
        let sum: f64 = self.sample.values.iter().map(|&v| v as f64).sum();
        sum / self.sample.values.len() as f64
    }
}
