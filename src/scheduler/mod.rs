//! Dispatchers.
//!
//! Two alternative ways of running the same [`TaskGraph`](crate::graph::TaskGraph),
//! never mixed within one run:
//!
//! ```text
//!  ┌──────────────────────────┐      ┌──────────────────────────────┐
//!  │ cyclic::CyclicExecutive  │      │ preemptive::spawn            │
//!  │                          │      │                              │
//!  │  one thread, slot clock  │      │  one thread per task         │
//!  │  tick % slots == 0 → run │      │  run; sleep until release    │
//!  │  no task may block       │      │  priority-scheduled by RTOS  │
//!  └────────────┬─────────────┘      └──────────────┬───────────────┘
//!               └──────────────┬────────────────────┘
//!                              ▼
//!                     run_monitored(entry)
//!             monitor pin ▲ body ▼ diagnostics
//! ```

use core::sync::atomic::{AtomicBool, Ordering};
use core::time::Duration;
use std::time::Instant;

use log::{debug, error};

use crate::adapters::time::MonotonicClock;
use crate::app::ports::{ActuatorPort, Level, LogSink, SensorPort};
use crate::diagnostics::Diagnostics;
use crate::error::Result;
use crate::graph::TaskEntry;

pub mod cyclic;
pub mod preemptive;

pub use cyclic::CyclicExecutive;
pub use preemptive::{TaskSetHandle, spawn};

/// Longest uninterrupted sleep, so a raised stop flag is seen promptly.
const STOP_POLL: Duration = Duration::from_millis(20);

/// Run one task body with its monitor pin raised, and account for it.
///
/// A recoverable error (an expired bounded wait) is counted and absorbed;
/// the task simply tries again next period. Anything else is returned and
/// stops the dispatcher.
fn run_monitored<H, S>(entry: &mut TaskEntry, hw: &mut H, sink: &mut S, diag: &Diagnostics) -> Result<()>
where
    H: SensorPort + ActuatorPort,
    S: LogSink,
{
    let id = entry.descriptor.id;
    if let Some(pin) = entry.descriptor.monitor_pin {
        hw.set_pin(pin, Level::High);
    }

    let started = Instant::now();
    let outcome = entry.job.run(hw, sink);
    diag.record_run(id, started.elapsed());

    if let Some(pin) = entry.descriptor.monitor_pin {
        hw.set_pin(pin, Level::Low);
    }

    match outcome {
        Ok(()) => Ok(()),
        Err(e) if e.is_recoverable() => {
            debug!("{}: {} (skipped this period)", id, e);
            diag.record_timeout(id);
            Ok(())
        }
        Err(e) => {
            error!("{}: fatal: {}", id, e);
            Err(e)
        }
    }
}

/// Sleep until `deadline` unless `stop` is raised first. Returns `false`
/// if woken by the stop flag.
fn pause_until(deadline: Instant, stop: &AtomicBool) -> bool {
    loop {
        if stop.load(Ordering::Acquire) {
            return false;
        }
        let now = Instant::now();
        if now >= deadline {
            return true;
        }
        MonotonicClock::sleep_until(deadline.min(now + STOP_POLL));
    }
}
