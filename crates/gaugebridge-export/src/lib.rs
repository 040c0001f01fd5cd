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

//! # GaugeBridge Export
//!
//! Periodically reads every metric of a [`SourceRegistry`], reduces it to a
//! single `f64`, and publishes it as a gauge in an external registry
//! (Prometheus by default).
//!
//! ```text
//! Scheduler tick -> Publisher::run_once -> converter -> GaugeCache::upsert
//! ```
//!
//! [`SourceRegistry`]: gaugebridge_core::SourceRegistry

#![warn(missing_docs)]

pub mod bridge;
pub mod cache;
pub mod config;
pub mod convert;
pub mod error;
pub mod normalize;
pub mod publisher;
pub mod scheduler;
pub mod sink;

pub use bridge::MetricsBridge;
pub use cache::GaugeCache;
pub use config::{BridgeBuilder, BridgeSettings, DEFAULT_FLUSH_INTERVAL};
pub use convert::{default_converter, ValueConverter};
pub use error::{BridgeError, BridgeResult};
pub use normalize::{default_normalizer, lowercase_normalizer, NameNormalizer};
pub use publisher::Publisher;
pub use scheduler::Scheduler;
pub use sink::{ExternalGauge, ExternalRegistry, GaugeDescriptor};
