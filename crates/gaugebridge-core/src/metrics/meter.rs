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

//! Meters: event counts with exponentially-weighted moving rates.

use super::lock;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Interval at which the moving averages absorb pending events.
pub const TICK_INTERVAL: Duration = Duration::from_secs(5);

/// A single exponentially-weighted moving average, in events per second.
#[derive(Debug, Clone)]
struct Ewma {
    alpha: f64,
    rate: f64,
    uncounted: i64,
    initialized: bool,
}

impl Ewma {
    /// An average over a window of `minutes`, ticked every [`TICK_INTERVAL`].
    fn over_minutes(minutes: f64) -> Self {
        let alpha = 1.0 - (-TICK_INTERVAL.as_secs_f64() / 60.0 / minutes).exp();
        Self {
            alpha,
            rate: 0.0,
            uncounted: 0,
            initialized: false,
        }
    }

    fn update(&mut self, n: i64) {
        self.uncounted += n;
    }

    fn tick(&mut self) {
        let instant_rate = self.uncounted as f64 / TICK_INTERVAL.as_secs_f64();
        self.uncounted = 0;
        if self.initialized {
            self.rate += self.alpha * (instant_rate - self.rate);
        } else {
            self.rate = instant_rate;
            self.initialized = true;
        }
    }
}

#[derive(Debug)]
struct MeterState {
    count: i64,
    m1: Ewma,
    m5: Ewma,
    m15: Ewma,
    started: Instant,
    last_tick: Instant,
}

impl MeterState {
    fn tick(&mut self) {
        self.m1.tick();
        self.m5.tick();
        self.m15.tick();
    }

    // Catch up on every tick interval that elapsed since the last one.
    fn tick_if_necessary(&mut self, now: Instant) {
        let elapsed = now.saturating_duration_since(self.last_tick);
        let interval = TICK_INTERVAL.as_nanos();
        let missed = elapsed.as_nanos() / interval;
        if missed == 0 {
            return;
        }
        for _ in 0..missed {
            self.tick();
        }
        // The partial interval carries over; it is always shorter than a tick.
        let partial = u64::try_from(elapsed.as_nanos() % interval).unwrap_or(0);
        self.last_tick = now - Duration::from_nanos(partial);
    }
}

/// Counts events and tracks their 1-, 5- and 15-minute moving rates.
///
/// Ticking is lazy: pending intervals are absorbed whenever the meter is
/// marked or read, so no background thread is needed. [`Meter::tick`] forces
/// a tick for callers that drive time themselves.
#[derive(Debug)]
pub struct Meter {
    state: Mutex<MeterState>,
}

impl Meter {
    /// Creates a meter with no recorded events.
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            state: Mutex::new(MeterState {
                count: 0,
                m1: Ewma::over_minutes(1.0),
                m5: Ewma::over_minutes(5.0),
                m15: Ewma::over_minutes(15.0),
                started: now,
                last_tick: now,
            }),
        }
    }

    /// Records `n` events.
    pub fn mark(&self, n: i64) {
        let mut state = lock(&self.state);
        state.tick_if_necessary(Instant::now());
        state.count += n;
        state.m1.update(n);
        state.m5.update(n);
        state.m15.update(n);
    }

    /// Forces the moving averages to absorb pending events now.
    pub fn tick(&self) {
        let mut state = lock(&self.state);
        state.tick();
        state.last_tick = Instant::now();
    }

    /// Returns the total number of events recorded.
    pub fn count(&self) -> i64 {
        lock(&self.state).count
    }

    /// Takes a point-in-time copy of the count and rates.
    pub fn snapshot(&self) -> MeterSnapshot {
        let now = Instant::now();
        let mut state = lock(&self.state);
        state.tick_if_necessary(now);

        let elapsed = now.saturating_duration_since(state.started).as_secs_f64();
        let rate_mean = if elapsed > 0.0 {
            state.count as f64 / elapsed
        } else {
            0.0
        };

        MeterSnapshot {
            count: state.count,
            rate1: state.m1.rate,
            rate5: state.m5.rate,
            rate15: state.m15.rate,
            rate_mean,
        }
    }
}

impl Default for Meter {
    fn default() -> Self {
        Self::new()
    }
}

/// An immutable copy of a meter, rates in events per second.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeterSnapshot {
    count: i64,
    rate1: f64,
    rate5: f64,
    rate15: f64,
    rate_mean: f64,
}

impl MeterSnapshot {
    /// Total events recorded.
    pub fn count(&self) -> i64 {
        self.count
    }

    /// One-minute moving rate.
    pub fn rate1(&self) -> f64 {
        self.rate1
    }

    /// Five-minute moving rate.
    pub fn rate5(&self) -> f64 {
        self.rate5
    }

    /// Fifteen-minute moving rate.
    pub fn rate15(&self) -> f64 {
        self.rate15
    }

    /// Mean rate since the meter was created.
    pub fn rate_mean(&self) -> f64 {
        self.rate_mean
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rates_are_zero_before_first_tick() {
        let meter = Meter::new();
        meter.mark(15);
        let snapshot = meter.snapshot();
        assert_eq!(snapshot.count(), 15);
        assert_eq!(snapshot.rate1(), 0.0);
    }

    #[test]
    fn test_first_tick_adopts_instant_rate() {
        let meter = Meter::new();
        meter.mark(2);
        meter.mark(13);
        meter.tick();

        // 15 events over a 5 second interval.
        let snapshot = meter.snapshot();
        assert!((snapshot.rate1() - 3.0).abs() < 1e-9);
        assert!((snapshot.rate5() - 3.0).abs() < 1e-9);
        assert!((snapshot.rate15() - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_idle_tick_decays_rate() {
        let meter = Meter::new();
        meter.mark(60);
        meter.tick();
        meter.tick();

        let snapshot = meter.snapshot();
        let alpha = 1.0 - (-5.0f64 / 60.0).exp();
        let expected = 12.0 - alpha * 12.0;
        assert!((snapshot.rate1() - expected).abs() < 1e-9);
        assert!(snapshot.rate15() > snapshot.rate1());
    }

    #[test]
    fn test_lazy_catch_up_ticks() {
        let mut state = MeterState {
            count: 0,
            m1: Ewma::over_minutes(1.0),
            m5: Ewma::over_minutes(5.0),
            m15: Ewma::over_minutes(15.0),
            started: Instant::now(),
            last_tick: Instant::now(),
        };
        state.m1.update(10);
        let later = state.last_tick + Duration::from_secs(11);
        state.tick_if_necessary(later);

        assert!(state.m1.initialized);
        assert_eq!(state.m1.uncounted, 0);
        assert_eq!(state.last_tick + Duration::from_secs(1), later);
    }

    fn idle_state() -> MeterState {
        let now = Instant::now();
        MeterState {
            count: 0,
            m1: Ewma::over_minutes(1.0),
            m5: Ewma::over_minutes(5.0),
            m15: Ewma::over_minutes(15.0),
            started: now,
            last_tick: now,
        }
    }

    #[test]
    fn test_long_idle_gap_keeps_partial_interval() {
        let mut state = idle_state();
        state.m1.update(50);
        // 1000 intervals plus 2.5 s.
        let gap = TICK_INTERVAL * 1000 + Duration::from_millis(2500);
        let later = state.last_tick + gap;
        state.tick_if_necessary(later);

        assert_eq!(state.last_tick + Duration::from_millis(2500), later);
        assert_eq!(state.m1.uncounted, 0);
        assert!(state.m1.rate < 1e-9);
    }

    #[test]
    fn test_clock_behind_last_tick_is_ignored() {
        let mut state = idle_state();
        let last_tick = state.last_tick + Duration::from_secs(1);
        state.last_tick = last_tick;
        state.m1.update(5);
        state.tick_if_necessary(last_tick - Duration::from_millis(500));

        assert_eq!(state.last_tick, last_tick);
        assert!(!state.m1.initialized);
    }
}
