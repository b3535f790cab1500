//! Runtime diagnostics.
//!
//! Lock-free per-task counters, updated by the dispatchers after every task
//! run and read on demand through [`Diagnostics::snapshot`]. Counters are
//! 32-bit because the ESP32's Xtensa core has no native 64-bit atomics.

use core::sync::atomic::{AtomicU32, Ordering};
use core::time::Duration;

use log::info;

use crate::tasks::TaskId;

struct TaskCounters {
    runs: AtomicU32,
    timeouts: AtomicU32,
    overruns: AtomicU32,
    max_exec_us: AtomicU32,
}

impl TaskCounters {
    const fn new() -> Self {
        Self {
            runs: AtomicU32::new(0),
            timeouts: AtomicU32::new(0),
            overruns: AtomicU32::new(0),
            max_exec_us: AtomicU32::new(0),
        }
    }
}

/// Counters for every task plus the cyclic executive's slot overruns.
pub struct Diagnostics {
    tasks: [TaskCounters; TaskId::COUNT],
    slot_overruns: AtomicU32,
}

impl Default for Diagnostics {
    fn default() -> Self {
        Self::new()
    }
}

impl Diagnostics {
    pub const fn new() -> Self {
        Self {
            tasks: [const { TaskCounters::new() }; TaskId::COUNT],
            slot_overruns: AtomicU32::new(0),
        }
    }

    /// One completed body execution of `id` taking `exec`.
    pub fn record_run(&self, id: TaskId, exec: Duration) {
        let c = &self.tasks[id.index()];
        c.runs.fetch_add(1, Ordering::Relaxed);
        let us = u32::try_from(exec.as_micros()).unwrap_or(u32::MAX);
        c.max_exec_us.fetch_max(us, Ordering::Relaxed);
    }

    /// A bounded wait inside `id`'s body expired.
    pub fn record_timeout(&self, id: TaskId) {
        self.tasks[id.index()].timeouts.fetch_add(1, Ordering::Relaxed);
    }

    /// `id` missed its release instant.
    pub fn record_overrun(&self, id: TaskId) {
        self.tasks[id.index()].overruns.fetch_add(1, Ordering::Relaxed);
    }

    /// A cyclic-executive tick ran longer than one slot.
    pub fn record_slot_overrun(&self) {
        self.slot_overruns.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> DiagnosticsSnapshot {
        DiagnosticsSnapshot {
            tasks: TaskId::ALL.map(|id| {
                let c = &self.tasks[id.index()];
                TaskStats {
                    id,
                    runs: c.runs.load(Ordering::Relaxed),
                    timeouts: c.timeouts.load(Ordering::Relaxed),
                    overruns: c.overruns.load(Ordering::Relaxed),
                    max_exec_us: c.max_exec_us.load(Ordering::Relaxed),
                }
            }),
            slot_overruns: self.slot_overruns.load(Ordering::Relaxed),
        }
    }
}

/// Plain-value copy of one task's counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskStats {
    pub id: TaskId,
    pub runs: u32,
    pub timeouts: u32,
    pub overruns: u32,
    pub max_exec_us: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiagnosticsSnapshot {
    pub tasks: [TaskStats; TaskId::COUNT],
    pub slot_overruns: u32,
}

impl DiagnosticsSnapshot {
    pub fn task(&self, id: TaskId) -> TaskStats {
        self.tasks[id.index()]
    }

    /// Write one line per task to the log.
    pub fn log_summary(&self) {
        for t in &self.tasks {
            info!(
                "DIAG | {:<15} runs={} timeouts={} overruns={} max_exec={}us",
                t.id.name(),
                t.runs,
                t.timeouts,
                t.overruns,
                t.max_exec_us
            );
        }
        if self.slot_overruns > 0 {
            info!("DIAG | slot overruns={}", self.slot_overruns);
        }
    }
}
