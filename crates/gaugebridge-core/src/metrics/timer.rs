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

//! Timers: a meter of completed events plus a histogram of their durations.

use super::{Histogram, HistogramSnapshot, Meter, MeterSnapshot};
use std::time::{Duration, Instant};

/// Tracks how often something happens and how long it takes.
///
/// Durations are recorded in nanoseconds.
#[derive(Debug, Default)]
pub struct Timer {
    meter: Meter,
    histogram: Histogram,
}

impl Timer {
    /// Creates an empty timer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one event that took `duration`.
    pub fn update(&self, duration: Duration) {
        let nanos = i64::try_from(duration.as_nanos()).unwrap_or(i64::MAX);
        self.histogram.update(nanos);
        self.meter.mark(1);
    }

    /// Runs `f` and records how long it took.
    pub fn time<R>(&self, f: impl FnOnce() -> R) -> R {
        let start = Instant::now();
        let result = f();
        self.update(start.elapsed());
        result
    }

    /// Forces the underlying meter to tick.
    pub fn tick(&self) {
        self.meter.tick();
    }

    /// Takes a point-in-time copy of the rates and durations.
    pub fn snapshot(&self) -> TimerSnapshot {
        TimerSnapshot {
            rates: self.meter.snapshot(),
            durations: self.histogram.snapshot(),
        }
    }
}

/// An immutable copy of a timer.
#[derive(Debug, Clone, PartialEq)]
pub struct TimerSnapshot {
    rates: MeterSnapshot,
    durations: HistogramSnapshot,
}

impl TimerSnapshot {
    /// Number of recorded events.
    pub fn count(&self) -> i64 {
        self.rates.count()
    }

    /// One-minute moving rate of events per second.
    pub fn rate1(&self) -> f64 {
        self.rates.rate1()
    }

    /// The event rates.
    pub fn rates(&self) -> &MeterSnapshot {
        &self.rates
    }

    /// The duration distribution, in nanoseconds.
    pub fn durations(&self) -> &HistogramSnapshot {
        &self.durations
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_feeds_both_sides() {
        let timer = Timer::new();
        timer.update(Duration::from_millis(3));
        timer.update(Duration::from_millis(7));
        timer.tick();

        let snapshot = timer.snapshot();
        assert_eq!(snapshot.count(), 2);
        assert!((snapshot.rate1() - 0.4).abs() < 1e-9);
        assert_eq!(snapshot.durations().sample().values(), &[3_000_000, 7_000_000]);
    }

    #[test]
    fn test_time_returns_closure_result() {
        let timer = Timer::new();
        let value = timer.time(|| 42);
        assert_eq!(value, 42);
        assert_eq!(timer.snapshot().count(), 1);
    }
}
