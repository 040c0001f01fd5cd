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

//! # GaugeBridge Core
//!
//! Foundational crate containing the in-process metric kinds and the
//! source-registry contract that the bridge reads from.
//!
//! The application owns and mutates these metrics; `gaugebridge-export`
//! only walks the registry and reads the current values.

#![warn(missing_docs)]

pub mod metrics;
pub mod registry;

pub use metrics::{
    Counter, Gauge, GaugeFloat, Histogram, HistogramSnapshot, Meter, MeterSnapshot, OpaqueMetric,
    SampleSnapshot, SourceMetric, Timer, TimerSnapshot,
};
pub use registry::{InMemoryRegistry, MetricsError, MetricsResult, SourceRegistry};
