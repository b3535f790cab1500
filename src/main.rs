//! Sensor-monitor firmware entry point.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                    Adapters (outer ring)                     │
//! │    BoardAdapter (Sensor+Actuator)    SerialLogSink (LogSink) │
//! │  ───────────────── Port Trait Boundary ───────────────────   │
//! │  ┌────────────────────────────────────────────────────────┐  │
//! │  │  TaskGraph: 9 jobs · ScalarStore · channels · mailbox  │  │
//! │  └────────────────────────────────────────────────────────┘  │
//! │     CyclicExecutive  ──or──  preemptive task set             │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Configuration defaults can be overridden at build time with a JSON
//! document in `SENSOR_MONITOR_CONFIG`, e.g. `{"dispatch":"Cyclic"}`.
#![deny(unused_must_use)]

use core::sync::atomic::AtomicBool;
use core::time::Duration;
use std::sync::Arc;

use anyhow::Result;
use log::info;

use sensor_monitor::adapters::hardware::BoardAdapter;
use sensor_monitor::adapters::log_sink::SerialLogSink;
use sensor_monitor::adapters::time::MonotonicClock;
use sensor_monitor::config::{DispatchMode, SystemConfig};
use sensor_monitor::diagnostics::Diagnostics;
use sensor_monitor::drivers::hw_init;
use sensor_monitor::graph::TaskGraph;
use sensor_monitor::scheduler::{self, CyclicExecutive};

/// Interval between diagnostics summaries while the task set runs.
const DIAG_INTERVAL: Duration = Duration::from_secs(30);

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  sensor-monitor v{}                ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Peripherals ────────────────────────────────────────
    hw_init::init_peripherals()?;

    // ── 3. Configuration and task graph ───────────────────────
    let config = match option_env!("SENSOR_MONITOR_CONFIG") {
        Some(doc) => SystemConfig::from_json(doc)?,
        None => SystemConfig::default(),
    };
    let graph = TaskGraph::build(&config)?;
    let diagnostics = Arc::new(Diagnostics::new());

    // ── 4. Dispatch ───────────────────────────────────────────
    match config.dispatch {
        DispatchMode::Cyclic => {
            let stop = AtomicBool::new(false);
            let mut executive = CyclicExecutive::new(graph, Arc::clone(&diagnostics))?;
            executive.run(&mut BoardAdapter::new(), &mut SerialLogSink::new(), &stop)?;
        }
        DispatchMode::Preemptive => {
            let tasks = scheduler::spawn(graph, &BoardAdapter::new(), &SerialLogSink::new(), &diagnostics)?;
            let clock = MonotonicClock::new();
            while tasks.is_running() {
                std::thread::sleep(DIAG_INTERVAL);
                info!("uptime {}s", clock.uptime_secs());
                diagnostics.snapshot().log_summary();
            }
            tasks.join()?;
        }
    }

    diagnostics.snapshot().log_summary();
    Ok(())
}
