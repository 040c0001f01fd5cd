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

//! Reduction of live metrics to a single published scalar.

use crate::error::{BridgeError, BridgeResult};
use gaugebridge_core::SourceMetric;
use std::sync::Arc;

/// Derives the value to publish for a `(name, metric)` pair.
///
/// An `Err` skips the metric for the current pass; it is never fatal.
pub type ValueConverter = Arc<dyn Fn(&str, &SourceMetric) -> BridgeResult<f64> + Send + Sync>;

/// The built-in extraction table.
///
/// | Kind         | Published value                         |
/// |--------------|-----------------------------------------|
/// | `Counter`    | current count                           |
/// | `Gauge`      | current value                           |
/// | `GaugeFloat` | current value                           |
/// | `Histogram`  | newest sample, `0.0` when there is none |
/// | `Meter`      | one-minute moving rate                  |
/// | `Timer`      | one-minute moving rate                  |
///
/// Opaque metrics yield [`BridgeError::Conversion`].
pub fn default_converter(name: &str, metric: &SourceMetric) -> BridgeResult<f64> {
    match metric {
        SourceMetric::Counter(counter) => Ok(counter.count() as f64),
        SourceMetric::Gauge(gauge) => Ok(gauge.value() as f64),
        SourceMetric::GaugeFloat(gauge) => Ok(gauge.value()),
        SourceMetric::Histogram(histogram) => {
            let snapshot = histogram.snapshot();
            // An empty histogram publishes 0.0 rather than being skipped.
            Ok(snapshot
                .sample()
                .values()
                .last()
                .map_or(0.0, |&newest| newest as f64))
        }
        SourceMetric::Meter(meter) => Ok(meter.snapshot().rate1()),
        SourceMetric::Timer(timer) => Ok(timer.snapshot().rate1()),
        SourceMetric::Opaque(other) => Err(BridgeError::Conversion {
            name: name.to_string(),
            kind: other.kind().into_owned(),
        }),
    }
}

/// Wraps [`default_converter`] into a shareable [`ValueConverter`].
pub(crate) fn default_value_converter() -> ValueConverter {
    Arc::new(default_converter)
}

#[cfg(test)]
mod tests {
    use super::*;
    use gaugebridge_core::{Counter, Gauge, GaugeFloat, Histogram, Meter, OpaqueMetric, Timer};
    use std::borrow::Cow;
    use std::time::Duration;

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
    fn test_counter_reads_current_count() {
        let counter = Arc::new(Counter::new());
        counter.inc(2);
        counter.inc(13);
        let value = default_converter("c", &SourceMetric::from(counter)).unwrap();
        assert_eq!(value, 15.0);
    }

    #[test]
    fn test_gauges_read_last_write() {
        let gauge = Arc::new(Gauge::new());
        gauge.update(2);
        gauge.update(13);
        assert_eq!(default_converter("g", &gauge.into()).unwrap(), 13.0);

        let gauge = Arc::new(GaugeFloat::new());
        gauge.update(0.125);
        assert_eq!(default_converter("gf", &gauge.into()).unwrap(), 0.125);
    }

    #[test]
    fn test_histogram_publishes_newest_sample() {
        let histogram = Arc::new(Histogram::new());
        for v in [40, 10, 25] {
            histogram.update(v);
        }
        assert_eq!(default_converter("h", &histogram.into()).unwrap(), 25.0);
    }

    #[test]
    fn test_empty_histogram_publishes_zero() {
        let histogram = Arc::new(Histogram::new());
        assert_eq!(default_converter("h", &histogram.into()).unwrap(), 0.0);
    }

    #[test]
    fn test_meter_and_timer_publish_one_minute_rate() {
        let meter = Arc::new(Meter::new());
        meter.mark(10);
        meter.tick();
        let expected = meter.snapshot().rate1();
        assert_eq!(default_converter("m", &meter.into()).unwrap(), expected);
        assert_eq!(expected, 2.0);

        let timer = Arc::new(Timer::new());
        timer.update(Duration::from_secs(30));
        timer.tick();
        // The rate, not the 30s latency.
        assert_eq!(default_converter("t", &timer.into()).unwrap(), 0.2);
    }

    #[test]
    fn test_opaque_metric_is_rejected() {
        let opaque: Arc<dyn OpaqueMetric> = Arc::new(Healthcheck);
        let err = default_converter("health", &opaque.into()).unwrap_err();
        assert_eq!(err.to_string(), "metric 'health' has unknown type: Healthcheck");
    }
}
