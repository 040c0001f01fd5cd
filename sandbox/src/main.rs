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

// GaugeBridge Sandbox
// Simulates an application updating its metrics while the bridge republishes
// them, printing the Prometheus exposition after every round.
//
// Usage: sandbox [settings.json] [rounds]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use gaugebridge_core::{Counter, Gauge, GaugeFloat, Histogram, InMemoryRegistry, Meter, Timer};
use gaugebridge_export::BridgeSettings;
use prometheus::{Encoder, TextEncoder};

const DEFAULT_SETTINGS: &str = r#"{
    "namespace": "sandbox",
    "subsystem": "app",
    "flush_interval_ms": 1000
}"#;

fn load_settings(path: Option<&str>) -> Result<BridgeSettings> {
    let json = match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings from {path}"))?,
        None => DEFAULT_SETTINGS.to_string(),
    };
    Ok(BridgeSettings::from_json_str(&json)?)
}

fn populate(source: &InMemoryRegistry) -> Result<Workload> {
    let workload = Workload {
        requests: Arc::new(Counter::new()),
        queue_depth: Arc::new(Gauge::new()),
        load_average: Arc::new(GaugeFloat::new()),
        payload_size: Arc::new(Histogram::new()),
        events: Arc::new(Meter::new()),
        handler: Arc::new(Timer::new()),
    };

    source.register("http.requests", workload.requests.clone())?;
    source.register("queue depth", workload.queue_depth.clone())?;
    source.register("load-average", workload.load_average.clone())?;
    source.register("payload.size", workload.payload_size.clone())?;
    source.register("events", workload.events.clone())?;
    source.register("handler.latency", workload.handler.clone())?;
    Ok(workload)
}

/// The metrics the simulated application keeps updating.
#[derive(Clone)]
struct Workload {
    requests: Arc<Counter>,
    queue_depth: Arc<Gauge>,
    load_average: Arc<GaugeFloat>,
    payload_size: Arc<Histogram>,
    events: Arc<Meter>,
    handler: Arc<Timer>,
}

impl Workload {
    fn step(&self, i: i64) {
        self.requests.inc(1);
        self.queue_depth.update(i % 17);
        self.load_average.update((i % 10) as f64 / 4.0);
        self.payload_size.update(128 + (i * 37) % 512);
        self.events.mark(3);
        self.handler
            .update(Duration::from_micros(200 + (i as u64 * 13) % 900));
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().collect();
    let settings = load_settings(args.get(1).map(String::as_str))?;
    let rounds: u32 = match args.get(2) {
        Some(raw) => raw.parse().context("rounds must be a positive integer")?,
        None => 5,
    };

    let source = Arc::new(InMemoryRegistry::new());
    let workload = populate(&source)?;
    let external = prometheus::Registry::new();

    let mut bridge = settings
        .into_builder(source.clone(), Arc::new(external.clone()))
        .build()?;
    let interval = bridge.flush_interval();

    let stop = Arc::new(AtomicBool::new(false));
    let app = {
        let stop = Arc::clone(&stop);
        let workload = workload.clone();
        thread::spawn(move || {
            let mut i = 0;
            while !stop.load(Ordering::Relaxed) {
                workload.step(i);
                i += 1;
                thread::sleep(Duration::from_millis(10));
            }
        })
    };

    bridge.start_periodic()?;
    log::info!("Bridge running every {:?} for {} rounds", interval, rounds);

    let encoder = TextEncoder::new();
    for round in 1..=rounds {
        thread::sleep(interval);
        let mut buffer = Vec::new();
        encoder.encode(&external.gather(), &mut buffer)?;
        println!("--- Round {round} ---\n{}", String::from_utf8(buffer)?);
    }

    stop.store(true, Ordering::Relaxed);
    if app.join().is_err() {
        log::warn!("Workload thread panicked");
    }
    bridge.stop()?;

    log::info!(
        "Sandbox done: {} gauges, {} passes",
        bridge.registered_gauges(),
        bridge.completed_passes()
    );
    Ok(())
}
