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

//! The contract the bridge needs from an external metrics registry, and its
//! Prometheus implementation.

use crate::error::{BridgeError, BridgeResult};
use std::sync::Arc;

/// Everything needed to create one external gauge.
///
/// `namespace`, `subsystem` and `name` are already normalized; `help` is the
/// raw source name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GaugeDescriptor {
    /// Normalized namespace.
    pub namespace: String,
    /// Normalized subsystem.
    pub subsystem: String,
    /// Normalized metric name.
    pub name: String,
    /// Human-readable description.
    pub help: String,
}

impl GaugeDescriptor {
    /// Returns the fully-qualified identifier: the non-empty parts joined by `_`.
    pub fn fq_name(&self) -> String {
        [&self.namespace, &self.subsystem, &self.name]
            .into_iter()
            .filter(|part| !part.is_empty())
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join("_")
    }
}

/// A settable scalar sink owned by the gauge cache once registered.
pub trait ExternalGauge: Send + Sync {
    /// Publishes `value`.
    fn set(&self, value: f64);

    /// Returns the currently published value.
    fn get(&self) -> f64;
}

/// A registry that exposes gauges to an outside collector.
pub trait ExternalRegistry: Send + Sync + 'static {
    /// Creates and registers a gauge.
    ///
    /// Must fail with [`BridgeError::Registration`] when a gauge with the same
    /// identifier already exists.
    fn register_gauge(&self, descriptor: &GaugeDescriptor) -> BridgeResult<Arc<dyn ExternalGauge>>;
}

impl ExternalGauge for prometheus::Gauge {
    fn set(&self, value: f64) {
        prometheus::Gauge::set(self, value);
    }

    fn get(&self) -> f64 {
        prometheus::Gauge::get(self)
    }
}

impl ExternalRegistry for prometheus::Registry {
    fn register_gauge(&self, descriptor: &GaugeDescriptor) -> BridgeResult<Arc<dyn ExternalGauge>> {
        let registration_error = |err: prometheus::Error| BridgeError::Registration {
            name: descriptor.fq_name(),
            source: Box::new(err),
        };

        let opts = prometheus::Opts::new(descriptor.name.clone(), descriptor.help.clone())
            .namespace(descriptor.namespace.clone())
            .subsystem(descriptor.subsystem.clone());
        let gauge = prometheus::Gauge::with_opts(opts).map_err(registration_error)?;
        self.register(Box::new(gauge.clone()))
            .map_err(registration_error)?;

        Ok(Arc::new(gauge))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prometheus::{Encoder, TextEncoder};

    fn descriptor(name: &str) -> GaugeDescriptor {
        GaugeDescriptor {
            namespace: "test".to_string(),
            subsystem: "subsys".to_string(),
            name: name.to_string(),
            help: name.to_string(),
        }
    }

    #[test]
    fn test_fq_name_skips_empty_parts() {
        assert_eq!(descriptor("counter").fq_name(), "test_subsys_counter");

        let bare = GaugeDescriptor {
            namespace: String::new(),
            subsystem: String::new(),
            name: "up".to_string(),
            help: "up".to_string(),
        };
        assert_eq!(bare.fq_name(), "up");
    }

    #[test]
    fn test_prometheus_registration_and_set() {
        let registry = prometheus::Registry::new();
        let gauge = registry.register_gauge(&descriptor("counter")).unwrap();
        gauge.set(15.0);
        assert_eq!(gauge.get(), 15.0);

        let mut buffer = Vec::new();
        TextEncoder::new()
            .encode(&registry.gather(), &mut buffer)
            .unwrap();
        let text = String::from_utf8(buffer).unwrap();
        assert!(text.contains("# HELP test_subsys_counter counter"));
        assert!(text.contains("test_subsys_counter 15"));
    }

    #[test]
    fn test_prometheus_rejects_duplicates() {
        let registry = prometheus::Registry::new();
        registry.register_gauge(&descriptor("counter")).unwrap();

        match registry.register_gauge(&descriptor("counter")) {
            Ok(_) => panic!("Duplicate gauge should be rejected"),
            Err(BridgeError::Registration { name, source }) => {
                assert_eq!(name, "test_subsys_counter");
                assert!(matches!(
                    source.downcast_ref::<prometheus::Error>(),
                    Some(prometheus::Error::AlreadyReg)
                ));
            }
            Err(other) => panic!("Expected registration error, got {other}"),
        }
    }

    #[test]
    fn test_prometheus_rejects_invalid_identifier() {
        let registry = prometheus::Registry::new();
        let result = registry.register_gauge(&descriptor("bad/name"));
        assert!(matches!(result, Err(BridgeError::Registration { .. })));
    }
}
