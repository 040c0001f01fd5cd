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

//! Live metric kinds held by a source registry.
//!
//! Every kind is internally synchronized so that the application can update
//! it from any thread while the bridge reads it from its own.

mod counter;
mod histogram;
mod meter;
mod timer;

pub use self::counter::{Counter, Gauge, GaugeFloat};
pub use self::histogram::{Histogram, HistogramSnapshot, SampleSnapshot, DEFAULT_SAMPLE_SIZE};
pub use self::meter::{Meter, MeterSnapshot};
pub use self::timer::{Timer, TimerSnapshot};

use std::borrow::Cow;
use std::fmt::Debug;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// An application-defined metric kind that has no built-in representation.
///
/// The bridge cannot derive a value from these on its own; a custom value
/// converter may downcast them through [`OpaqueMetric::as_any`].
pub trait OpaqueMetric: Send + Sync + Debug + 'static {
    /// Returns a human-readable descriptor of the metric's type.
    fn kind(&self) -> Cow<'static, str>;

    /// Allows downcasting to the concrete metric type.
    fn as_any(&self) -> &dyn std::any::Any;
}

/// A live metric as stored in a source registry.
///
/// Cloning is cheap: every variant shares the underlying metric.
#[derive(Debug, Clone)]
pub enum SourceMetric {
    /// A monotonic integer count.
    Counter(Arc<Counter>),
    /// A settable integer value.
    Gauge(Arc<Gauge>),
    /// A settable floating-point value.
    GaugeFloat(Arc<GaugeFloat>),
    /// A distribution backed by an ordered sample window.
    Histogram(Arc<Histogram>),
    /// A rolling event rate.
    Meter(Arc<Meter>),
    /// A rolling event rate plus a duration distribution.
    Timer(Arc<Timer>),
    /// Anything else the application chose to register.
    Opaque(Arc<dyn OpaqueMetric>),
}

impl SourceMetric {
    /// Returns the type descriptor of this metric (e.g. `"Counter"`).
    pub fn kind(&self) -> Cow<'static, str> {
        match self {
            SourceMetric::Counter(_) => Cow::Borrowed("Counter"),
            SourceMetric::Gauge(_) => Cow::Borrowed("Gauge"),
            SourceMetric::GaugeFloat(_) => Cow::Borrowed("GaugeFloat"),
            SourceMetric::Histogram(_) => Cow::Borrowed("Histogram"),
            SourceMetric::Meter(_) => Cow::Borrowed("Meter"),
            SourceMetric::Timer(_) => Cow::Borrowed("Timer"),
            SourceMetric::Opaque(metric) => metric.kind(),
        }
    }
}

impl From<Arc<Counter>> for SourceMetric {
    fn from(metric: Arc<Counter>) -> Self {
        SourceMetric::Counter(metric)
    }
}

impl From<Arc<Gauge>> for SourceMetric {
    fn from(metric: Arc<Gauge>) -> Self {
        SourceMetric::Gauge(metric)
    }
}

impl From<Arc<GaugeFloat>> for SourceMetric {
    fn from(metric: Arc<GaugeFloat>) -> Self {
        SourceMetric::GaugeFloat(metric)
    }
}

impl From<Arc<Histogram>> for SourceMetric {
    fn from(metric: Arc<Histogram>) -> Self {
        SourceMetric::Histogram(metric)
    }
}

impl From<Arc<Meter>> for SourceMetric {
    fn from(metric: Arc<Meter>) -> Self {
        SourceMetric::Meter(metric)
    }
}

impl From<Arc<Timer>> for SourceMetric {
    fn from(metric: Arc<Timer>) -> Self {
        SourceMetric::Timer(metric)
    }
}

impl From<Arc<dyn OpaqueMetric>> for SourceMetric {
    fn from(metric: Arc<dyn OpaqueMetric>) -> Self {
        SourceMetric::Opaque(metric)
    }
}

/// Locks a metric's state, recovering it if a writer panicked mid-update.
///
/// Metric state is plain numbers, so a poisoned guard is still readable.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Healthcheck;

    impl OpaqueMetric for Healthcheck {
        fn kind(&self) -> Cow<'static, str> {
            Cow::Borrowed("Healthcheck")
        }

        fn as_any(&self) -> &dyn std::any::Any {
            self
        }
    }

    #[test]
    fn test_kind_descriptors() {
        assert_eq!(SourceMetric::from(Arc::new(Counter::new())).kind(), "Counter");
        assert_eq!(SourceMetric::from(Arc::new(GaugeFloat::new())).kind(), "GaugeFloat");
        assert_eq!(SourceMetric::from(Arc::new(Timer::new())).kind(), "Timer");

        let opaque: Arc<dyn OpaqueMetric> = Arc::new(Healthcheck);
        assert_eq!(SourceMetric::from(opaque).kind(), "Healthcheck");
    }

    #[test]
    fn test_clone_shares_the_metric() {
        let counter = Arc::new(Counter::new());
        let metric = SourceMetric::from(counter.clone());
        let copy = metric.clone();
        counter.inc(3);

        match copy {
            SourceMetric::Counter(c) => assert_eq!(c.count(), 3),
            other => panic!("Expected counter, got {}", other.kind()),
        }
    }
}
