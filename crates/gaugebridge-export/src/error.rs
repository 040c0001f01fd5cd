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

//! Error types for the bridge.

use thiserror::Error;

/// A specialized `Result` type for bridge operations.
pub type BridgeResult<T> = Result<T, BridgeError>;

/// An error that can occur while configuring or running the bridge.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// The value converter does not understand this metric kind.
    /// Non-fatal: the metric is skipped for the current pass.
    #[error("metric '{name}' has unknown type: {kind}")]
    Conversion {
        /// Raw name of the metric in the source registry.
        name: String,
        /// Type descriptor of the metric.
        kind: String,
    },

    /// The external registry refused a gauge, usually because two raw names
    /// normalize to the same identifier. Fatal for the current pass.
    #[error("failed to register gauge '{name}': {source}")]
    Registration {
        /// Fully-qualified external identifier.
        name: String,
        /// Error reported by the external registry.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A configuration value was rejected at construction time.
    #[error("invalid bridge configuration: {0}")]
    InvalidConfig(String),

    /// Settings could not be parsed.
    #[error("failed to parse bridge settings: {0}")]
    Settings(#[from] serde_json::Error),

    /// The scheduler thread could not be spawned.
    #[error("failed to spawn scheduler thread: {0}")]
    Spawn(#[from] std::io::Error),

    /// The scheduler thread panicked.
    #[error("scheduler thread panicked")]
    SchedulerPanicked,
}
