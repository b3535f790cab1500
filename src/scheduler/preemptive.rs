//! Preemptive task set.
//!
//! Each task runs on its own prioritised thread as "run body; sleep until
//! the next release". Releases are absolute (`release += period`), so
//! execution time does not accumulate into drift. A task that finds its
//! next release already past has missed a deadline: the miss is counted
//! and the task re-synchronises to the current instant instead of
//! bursting to catch up.
//!
//! The only suspension points are the release sleep and the bounded waits
//! inside task bodies. On ESP-IDF the FreeRTOS scheduler picks among ready
//! tasks by priority; a continuously busy high-priority task delays every
//! lower one. On the host, priorities are logged but not enforced.
//!
//! Tasks run until [`TaskSetHandle::shutdown`] raises the shared stop flag;
//! there is no per-task cancellation.

use core::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Instant;

use log::{error, info, warn};

use super::{pause_until, run_monitored};
use crate::app::ports::{ActuatorPort, LogSink, SensorPort};
use crate::config::DispatchMode;
use crate::diagnostics::Diagnostics;
use crate::drivers::task_pin::{Core, spawn_on_core};
use crate::error::{Error, Result};
use crate::graph::{TaskEntry, TaskGraph};
use crate::tasks::TaskId;

#[cfg(target_os = "espidf")]
const TASK_STACK_KB: usize = 6;
#[cfg(not(target_os = "espidf"))]
const TASK_STACK_KB: usize = 64;

/// Running task set. Dropping it without `shutdown` leaves the tasks
/// running for the life of the process.
pub struct TaskSetHandle {
    stop: Arc<AtomicBool>,
    threads: Vec<(TaskId, JoinHandle<Result<()>>)>,
}

impl TaskSetHandle {
    /// Whether every task is still scheduled.
    pub fn is_running(&self) -> bool {
        !self.stop.load(Ordering::Acquire)
    }

    pub fn tasks(&self) -> impl Iterator<Item = TaskId> + '_ {
        self.threads.iter().map(|(id, _)| *id)
    }

    /// Raise the stop flag and wait for every task to finish its current
    /// period. Returns the first fatal task error, if any.
    pub fn shutdown(self) -> Result<()> {
        self.stop.store(true, Ordering::Release);
        self.join()
    }

    /// Wait for the task set to stop on its own (after a fatal fault).
    pub fn join(self) -> Result<()> {
        let mut first_err = None;
        for (id, handle) in self.threads {
            match handle.join() {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    first_err.get_or_insert(e);
                }
                Err(_) => error!("{}: task panicked", id),
            }
        }
        info!("preemptive: task set stopped");
        first_err.map_or(Ok(()), Err)
    }
}

/// Start one thread per task of `graph`, in creation order. A graph built
/// for cyclic dispatch is rejected before any thread starts.
///
/// Every task gets its own clone of the board and sink adapters. If any
/// thread fails to start, the ones already running are stopped and the
/// spawn error is returned.
pub fn spawn<H, S>(graph: TaskGraph, hw: &H, sink: &S, diagnostics: &Arc<Diagnostics>) -> Result<TaskSetHandle>
where
    H: SensorPort + ActuatorPort + Clone + Send + 'static,
    S: LogSink + Clone + Send + 'static,
{
    graph.expect_mode(DispatchMode::Preemptive)?;
    let stop = Arc::new(AtomicBool::new(false));
    let mut set = TaskSetHandle {
        stop: Arc::clone(&stop),
        threads: Vec::with_capacity(TaskId::COUNT),
    };

    for entry in graph.into_entries() {
        let d = entry.descriptor;
        info!(
            "preemptive: {:<15} period {:?} priority {}",
            d.id.name(),
            d.period,
            d.priority
        );

        let hw = hw.clone();
        let sink = sink.clone();
        let diag = Arc::clone(diagnostics);
        let stop = Arc::clone(&stop);
        let spawned = spawn_on_core(Core::App, d.priority, TASK_STACK_KB, d.id.thread_name(), move || {
            task_loop(entry, hw, sink, &diag, &stop)
        });

        match spawned {
            Ok(handle) => set.threads.push((d.id, handle)),
            Err(e) => {
                error!("preemptive: cannot start {}: {}", d.id, e);
                // Whatever the started tasks return, the spawn failure is
                // the error to report.
                let _ = set.shutdown();
                return Err(Error::Spawn(d.id));
            }
        }
    }
    Ok(set)
}

fn task_loop<H, S>(mut entry: TaskEntry, mut hw: H, mut sink: S, diag: &Diagnostics, stop: &AtomicBool) -> Result<()>
where
    H: SensorPort + ActuatorPort,
    S: LogSink,
{
    let id = entry.descriptor.id;
    let period = entry.descriptor.period;
    let mut release = Instant::now();

    while !stop.load(Ordering::Acquire) {
        if let Err(e) = run_monitored(&mut entry, &mut hw, &mut sink, diag) {
            // A fatal task fault tears down the whole set.
            stop.store(true, Ordering::Release);
            return Err(e);
        }

        release += period;
        let now = Instant::now();
        if now >= release {
            diag.record_overrun(id);
            warn!("{}: missed release by {:?}", id, now - release);
            release = now;
        }
        if !pause_until(release, stop) {
            break;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::events::LogEvent;
    use crate::app::ports::{Level, Pin};
    use crate::config::SystemConfig;
    use crate::error::ConfigFault;
    use core::time::Duration;

    #[derive(Clone)]
    struct NullBoard;

    impl SensorPort for NullBoard {
        fn read_digital(&mut self, _pin: Pin) -> bool {
            true
        }
        fn read_analogue(&mut self, _pin: Pin) -> u16 {
            100
        }
        fn measure_pulse_us(&mut self, _pin: Pin, _level: Level, _timeout_us: u32) -> u32 {
            500
        }
    }

    impl ActuatorPort for NullBoard {
        fn set_pin(&mut self, _pin: Pin, _level: Level) {}
        fn delay_us(&mut self, _us: u32) {}
    }

    #[derive(Clone)]
    struct NullSink;

    impl LogSink for NullSink {
        fn emit(&mut self, _event: &LogEvent) {}
    }

    #[test]
    fn spawns_every_task_and_shuts_down() {
        let config = SystemConfig {
            rate_amplifier: 10.0,
            ..SystemConfig::default()
        };
        let graph = TaskGraph::build(&config).unwrap();
        let diag = Arc::new(Diagnostics::new());

        let set = spawn(graph, &NullBoard, &NullSink, &diag).unwrap();
        assert!(set.is_running());
        assert_eq!(set.tasks().count(), TaskId::COUNT);

        std::thread::sleep(Duration::from_millis(150));
        set.shutdown().unwrap();

        let snap = diag.snapshot();
        for id in TaskId::ALL {
            assert!(snap.task(id).runs >= 1, "{id} never ran");
        }
    }

    #[test]
    fn rejects_a_graph_built_for_cyclic_dispatch() {
        let config = SystemConfig {
            dispatch: DispatchMode::Cyclic,
            ..SystemConfig::default()
        };
        let graph = TaskGraph::build(&config).unwrap();
        let diag = Arc::new(Diagnostics::new());

        let err = spawn(graph, &NullBoard, &NullSink, &diag).err().unwrap();
        assert_eq!(
            err,
            Error::Config(ConfigFault::WrongDispatchMode {
                expected: DispatchMode::Preemptive,
                found: DispatchMode::Cyclic,
            })
        );
        assert_eq!(diag.snapshot().task(TaskId::Watchdog).runs, 0);
    }
}
