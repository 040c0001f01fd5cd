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

//! The operational surface of the bridge.

use crate::error::BridgeResult;
use crate::publisher::Publisher;
use crate::scheduler::Scheduler;
use std::sync::Arc;
use std::time::Duration;

/// A configured bridge between a source registry and an external registry.
///
/// Built with [`BridgeBuilder`](crate::BridgeBuilder). Passes can be run by
/// hand with [`run_once`](Self::run_once), on a timer with
/// [`start_periodic`](Self::start_periodic), or both at once.
#[derive(Debug)]
pub struct MetricsBridge {
    publisher: Arc<Publisher>,
    scheduler: Scheduler,
}

impl MetricsBridge {
    pub(crate) fn new(publisher: Arc<Publisher>, flush_interval: Duration) -> Self {
        Self {
            publisher,
            scheduler: Scheduler::new(flush_interval),
        }
    }

    /// Runs one synchronous pass on the calling thread.
    pub fn run_once(&self) -> BridgeResult<()> {
        self.publisher.run_once()
    }

    /// Starts publishing every flush interval on a background thread.
    /// Returns immediately.
    pub fn start_periodic(&mut self) -> BridgeResult<()> {
        self.scheduler.start(Arc::clone(&self.publisher))
    }

    /// Stops the background thread, returning the error that halted it, if any.
    pub fn stop(&mut self) -> BridgeResult<()> {
        self.scheduler.stop()
    }

    /// Returns `true` while periodic publishing is active.
    pub fn is_running(&self) -> bool {
        self.scheduler.is_running()
    }

    /// The interval between scheduled passes.
    pub fn flush_interval(&self) -> Duration {
        self.scheduler.interval()
    }

    /// Number of gauges registered with the external registry so far.
    pub fn registered_gauges(&self) -> usize {
        self.publisher.cache().len()
    }

    /// Number of passes that completed, scheduled or manual.
    pub fn completed_passes(&self) -> u64 {
        self.publisher.completed_passes()
    }
}
