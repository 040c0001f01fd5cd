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

//! Background thread that drives publisher passes at a fixed interval.

use crate::error::{BridgeError, BridgeResult};
use crate::publisher::Publisher;
use crossbeam_channel::{Receiver, Sender};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Runs [`Publisher::run_once`] every `interval` on a dedicated thread.
///
/// Passes never overlap. A pass that overruns the interval delays the next
/// one instead of queuing extra ticks, and the timer does not compensate for
/// drift. The loop ends on [`Scheduler::stop`] or on the first fatal pass
/// error, which `stop` then returns.
#[derive(Debug)]
pub struct Scheduler {
    interval: Duration,
    running: Arc<AtomicBool>,
    stop_tx: Option<Sender<()>>,
    handle: Option<thread::JoinHandle<BridgeResult<()>>>,
}

impl Scheduler {
    /// Creates a stopped scheduler.
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            running: Arc::new(AtomicBool::new(false)),
            stop_tx: None,
            handle: None,
        }
    }

    /// Spawns the scheduler thread. Does nothing while the thread is looping.
    ///
    /// A thread halted by a fatal pass is joined first and its error logged,
    /// then a fresh thread is spawned.
    pub fn start(&mut self, publisher: Arc<Publisher>) -> BridgeResult<()> {
        if self.handle.is_some() {
            if self.is_running() {
                return Ok(());
            }
            if let Err(err) = self.stop() {
                log::warn!("Restarting gauge scheduler halted by: {}", err);
            }
        }

        let (stop_tx, stop_rx) = crossbeam_channel::bounded(1);
        let running = Arc::clone(&self.running);
        let interval = self.interval;

        running.store(true, Ordering::SeqCst);
        let spawned = thread::Builder::new()
            .name("gaugebridge-scheduler".to_string())
            .spawn(move || {
                let outcome = run_loop(&publisher, interval, stop_rx);
                running.store(false, Ordering::SeqCst);
                outcome
            });

        match spawned {
            Ok(handle) => {
                self.stop_tx = Some(stop_tx);
                self.handle = Some(handle);
                Ok(())
            }
            Err(err) => {
                self.running.store(false, Ordering::SeqCst);
                Err(BridgeError::Spawn(err))
            }
        }
    }

    /// Signals the thread to stop and waits for it.
    ///
    /// Returns the fatal error that halted the loop, if any.
    pub fn stop(&mut self) -> BridgeResult<()> {
        if let Some(stop_tx) = self.stop_tx.take() {
            // The thread may already be gone after a fatal pass.
            let _ = stop_tx.try_send(());
        }
        match self.handle.take() {
            Some(handle) => handle.join().map_err(|_| BridgeError::SchedulerPanicked)?,
            None => Ok(()),
        }
    }

    /// Returns `true` while the scheduler thread is looping.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// The interval between pass starts.
    pub fn interval(&self) -> Duration {
        self.interval
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        if let Err(err) = self.stop() {
            log::warn!("Gauge scheduler ended with an error: {}", err);
        }
    }
}

fn run_loop(publisher: &Publisher, interval: Duration, stop_rx: Receiver<()>) -> BridgeResult<()> {
    let ticker = crossbeam_channel::tick(interval);
    log::info!("Gauge scheduler started (interval: {:?})", interval);

    loop {
        let stop_requested = crossbeam_channel::select! {
            recv(stop_rx) -> _ => true,
            recv(ticker) -> _ => false,
        };
        // Both may be ready at once; stopping wins.
        if stop_requested || !stop_rx.is_empty() {
            break;
        }

        if let Err(err) = publisher.run_once() {
            log::error!("Gauge scheduler halted: {}", err);
            return Err(err);
        }
    }

    log::info!("Gauge scheduler stopped.");
    Ok(())
}
