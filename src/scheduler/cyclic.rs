//! Slot-based cyclic executive.
//!
//! A single thread advances a tick counter once per slot. At start-up each
//! task's period is snapped to the nearest whole number of slots; on every
//! tick, each task whose slot count divides the tick runs to completion, in
//! fixed dispatch order, before the next one is considered. Tick 0 fires
//! every task.
//!
//! There is no preemption and nothing may block. Tasks are built with zero
//! wait budgets in this mode. A tick whose bodies take longer than one slot
//! delays everything after it; the executive counts and logs this as a slot
//! overrun and carries on from its absolute schedule, it does not shed work.

use core::sync::atomic::{AtomicBool, Ordering};
use core::time::Duration;
use std::sync::Arc;
use std::time::Instant;

use heapless::Vec;
use log::{info, warn};

use super::{pause_until, run_monitored};
use crate::app::ports::{ActuatorPort, LogSink, SensorPort};
use crate::config::DispatchMode;
use crate::diagnostics::Diagnostics;
use crate::error::Result;
use crate::graph::{TaskEntry, TaskGraph};
use crate::tasks::TaskId;
use crate::timing::{normalize_period, slots_per_period};

struct SlottedTask {
    entry: TaskEntry,
    /// Normalised period in slots (at least 1).
    slots: u64,
}

pub struct CyclicExecutive {
    slot: Duration,
    tick: u64,
    table: Vec<SlottedTask, { TaskId::COUNT }>,
    diagnostics: Arc<Diagnostics>,
}

impl CyclicExecutive {
    /// Normalise every period in `graph` onto the slot grid. Rejects a
    /// graph built for preemptive dispatch, whose tasks may block.
    pub fn new(graph: TaskGraph, diagnostics: Arc<Diagnostics>) -> Result<Self> {
        graph.expect_mode(DispatchMode::Cyclic)?;
        let slot = graph.slot_width();
        let mut entries = graph.into_entries();
        entries.sort_unstable_by_key(|e| e.descriptor.id.index());

        let mut table = Vec::new();
        for entry in entries {
            let d = entry.descriptor;
            let slots = slots_per_period(d.period, slot);
            info!(
                "cyclic: {:<15} period {:?} -> {:?} ({} slots)",
                d.id.name(),
                d.period,
                normalize_period(d.period, slot),
                slots
            );
            // Capacities match: one slot per task.
            let _ = table.push(SlottedTask { entry, slots });
        }

        Ok(Self {
            slot,
            tick: 0,
            table,
            diagnostics,
        })
    }

    pub fn slot_width(&self) -> Duration {
        self.slot
    }

    /// Ticks dispatched so far.
    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    /// Normalised period of `id`, as dispatched.
    pub fn normalized_period(&self, id: TaskId) -> Option<Duration> {
        self.table
            .iter()
            .find(|t| t.entry.descriptor.id == id)
            .map(|t| normalize_period(t.entry.descriptor.period, self.slot))
    }

    /// Dispatch one tick without pacing: run every due task, then advance
    /// the counter. Returns the tasks that ran, in order.
    pub fn tick<H, S>(&mut self, hw: &mut H, sink: &mut S) -> Result<Vec<TaskId, { TaskId::COUNT }>>
    where
        H: SensorPort + ActuatorPort,
        S: LogSink,
    {
        let mut ran = Vec::new();
        for task in &mut self.table {
            if self.tick % task.slots == 0 {
                run_monitored(&mut task.entry, hw, sink, &self.diagnostics)?;
                let _ = ran.push(task.entry.descriptor.id);
            }
        }
        self.tick += 1;
        Ok(ran)
    }

    /// Dispatch paced ticks until `stop` is raised or a task faults.
    pub fn run<H, S>(&mut self, hw: &mut H, sink: &mut S, stop: &AtomicBool) -> Result<()>
    where
        H: SensorPort + ActuatorPort,
        S: LogSink,
    {
        info!("cyclic: dispatching on {:?} slots", self.slot);
        let mut release = Instant::now();
        while !stop.load(Ordering::Acquire) {
            self.paced_tick(&mut release, hw, sink)?;
            if !pause_until(release, stop) {
                break;
            }
        }
        info!("cyclic: stopped after {} ticks", self.tick);
        Ok(())
    }

    /// Dispatch exactly `ticks` paced ticks.
    pub fn run_ticks<H, S>(&mut self, ticks: u64, hw: &mut H, sink: &mut S) -> Result<()>
    where
        H: SensorPort + ActuatorPort,
        S: LogSink,
    {
        let never = AtomicBool::new(false);
        let mut release = Instant::now();
        for _ in 0..ticks {
            self.paced_tick(&mut release, hw, sink)?;
            pause_until(release, &never);
        }
        Ok(())
    }

    /// Run one tick and advance `release` by one slot on the absolute grid.
    fn paced_tick<H, S>(&mut self, release: &mut Instant, hw: &mut H, sink: &mut S) -> Result<()>
    where
        H: SensorPort + ActuatorPort,
        S: LogSink,
    {
        let tick = self.tick;
        self.tick(hw, sink)?;
        *release += self.slot;

        let now = Instant::now();
        if now > *release {
            self.diagnostics.record_slot_overrun();
            warn!(
                "cyclic: tick {} overran its slot by {:?}",
                tick,
                now - *release
            );
        }
        Ok(())
    }
}
