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

//! Bridge configuration: a builder for programmatic setup and a
//! serde-backed settings struct for file-based setup.

use crate::bridge::MetricsBridge;
use crate::cache::GaugeCache;
use crate::convert::{default_value_converter, ValueConverter};
use crate::error::{BridgeError, BridgeResult};
use crate::normalize::{default_normalizer, lowercase_normalizer, NameNormalizer};
use crate::publisher::Publisher;
use crate::sink::ExternalRegistry;
use gaugebridge_core::{SourceMetric, SourceRegistry};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

/// Interval between passes when none is configured.
pub const DEFAULT_FLUSH_INTERVAL: Duration = Duration::from_secs(15);

/// Collects the bridge's collaborators and optional overrides.
///
/// Nothing is validated until [`BridgeBuilder::build`], which either returns
/// a fully configured bridge or an error.
pub struct BridgeBuilder {
    source: Arc<dyn SourceRegistry>,
    namespace: String,
    subsystem: String,
    external: Arc<dyn ExternalRegistry>,
    flush_interval: Duration,
    converter: ValueConverter,
    normalizer: NameNormalizer,
}

impl BridgeBuilder {
    /// Starts a configuration with the default interval, converter and normalizer.
    pub fn new(
        source: Arc<dyn SourceRegistry>,
        namespace: impl Into<String>,
        subsystem: impl Into<String>,
        external: Arc<dyn ExternalRegistry>,
    ) -> Self {
        Self {
            source,
            namespace: namespace.into(),
            subsystem: subsystem.into(),
            external,
            flush_interval: DEFAULT_FLUSH_INTERVAL,
            converter: default_value_converter(),
            normalizer: Arc::new(default_normalizer),
        }
    }

    /// Overrides the interval between scheduled passes.
    pub fn flush_interval(mut self, interval: Duration) -> Self {
        self.flush_interval = interval;
        self
    }

    /// Replaces the whole value-extraction table.
    pub fn converter<F>(mut self, converter: F) -> Self
    where
        F: Fn(&str, &SourceMetric) -> BridgeResult<f64> + Send + Sync + 'static,
    {
        self.converter = Arc::new(converter);
        self
    }

    /// Replaces the name normalizer.
    pub fn name_normalizer<F>(mut self, normalizer: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        self.normalizer = Arc::new(normalizer);
        self
    }

    /// Validates the configuration and assembles the bridge.
    pub fn build(self) -> BridgeResult<MetricsBridge> {
        if self.flush_interval.is_zero() {
            return Err(BridgeError::InvalidConfig(
                "flush interval must be greater than zero".to_string(),
            ));
        }

        let cache = GaugeCache::new(self.external, self.normalizer);
        let publisher = Publisher::new(
            self.source,
            self.namespace,
            self.subsystem,
            self.converter,
            cache,
        );
        Ok(MetricsBridge::new(Arc::new(publisher), self.flush_interval))
    }
}

/// File-friendly bridge settings.
///
/// Every field is optional in the serialized form.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BridgeSettings {
    /// Namespace prefixed to every gauge.
    pub namespace: String,
    /// Subsystem prefixed to every gauge, after the namespace.
    pub subsystem: String,
    /// Milliseconds between scheduled passes.
    pub flush_interval_ms: u64,
    /// Use [`lowercase_normalizer`] instead of [`default_normalizer`].
    pub lowercase_names: bool,
}

impl Default for BridgeSettings {
    fn default() -> Self {
        Self {
            namespace: String::new(),
            subsystem: String::new(),
            flush_interval_ms: DEFAULT_FLUSH_INTERVAL.as_millis() as u64,
            lowercase_names: false,
        }
    }
}

impl BridgeSettings {
    /// Parses settings from a JSON document.
    pub fn from_json_str(json: &str) -> BridgeResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Turns these settings into a builder for the given collaborators.
    pub fn into_builder(
        self,
        source: Arc<dyn SourceRegistry>,
        external: Arc<dyn ExternalRegistry>,
    ) -> BridgeBuilder {
        let builder = BridgeBuilder::new(source, self.namespace, self.subsystem, external)
            .flush_interval(Duration::from_millis(self.flush_interval_ms));
        if self.lowercase_names {
            builder.name_normalizer(lowercase_normalizer)
        } else {
            builder
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gaugebridge_core::InMemoryRegistry;

    fn collaborators() -> (Arc<dyn SourceRegistry>, Arc<dyn ExternalRegistry>) {
        (
            Arc::new(InMemoryRegistry::new()),
            Arc::new(prometheus::Registry::new()),
        )
    }

    #[test]
    fn test_defaults() {
        let (source, external) = collaborators();
        let bridge = BridgeBuilder::new(source, "ns", "sub", external)
            .build()
            .unwrap();
        assert_eq!(bridge.flush_interval(), DEFAULT_FLUSH_INTERVAL);
        assert!(!bridge.is_running());
    }

    #[test]
    fn test_zero_interval_fails_closed() {
        let (source, external) = collaborators();
        let result = BridgeBuilder::new(source, "ns", "sub", external)
            .flush_interval(Duration::ZERO)
            .build();
        assert!(matches!(result, Err(BridgeError::InvalidConfig(_))));
    }

    #[test]
    fn test_settings_parse_with_defaults() {
        let settings = BridgeSettings::from_json_str(r#"{ "namespace": "app" }"#).unwrap();
        assert_eq!(settings.namespace, "app");
        assert_eq!(settings.subsystem, "");
        assert_eq!(settings.flush_interval_ms, 15_000);
        assert!(!settings.lowercase_names);
    }

    #[test]
    fn test_settings_into_builder() {
        let settings = BridgeSettings::from_json_str(
            r#"{ "namespace": "app", "subsystem": "db", "flush_interval_ms": 250, "lowercase_names": true }"#,
        )
        .unwrap();
        let (source, external) = collaborators();
        let bridge = settings.into_builder(source, external).build().unwrap();
        assert_eq!(bridge.flush_interval(), Duration::from_millis(250));
    }

    #[test]
    fn test_settings_reject_bad_json() {
        let result = BridgeSettings::from_json_str(r#"{ "flush_interval_ms": "soon" }"#);
        assert!(matches!(result, Err(BridgeError::Settings(_))));
    }
}
