//! Task graph construction.
//!
//! Turns a validated [`SystemConfig`] into the nine jobs with their
//! descriptors and shared resources. Construction is one-shot; the graph
//! is then handed whole to one dispatcher.
//!
//! Entries are kept in creation order. A notifier needs its consumers'
//! mailbox handles at construction, so the visualiser is created before the
//! classifier and the preemptive dispatcher spawns in this same order.

use std::sync::Arc;

use heapless::Vec;
use log::info;

use crate::config::{DispatchMode, SystemConfig};
use crate::error::{ConfigFault, Result};
use crate::pins;
use crate::sync::{Broadcast, Mailbox};
use crate::tasks::{
    AnalogueSample, BusyWork, Classify, DigitalPoll, ErrorCode, Filter, FrequencyMeasure, Job,
    Logger, Shared, TaskDescriptor, TaskId, Visualise, WatchdogPulse,
};

/// A job together with its scheduling parameters.
pub struct TaskEntry {
    pub descriptor: TaskDescriptor,
    pub job: Job,
}

pub struct TaskGraph {
    mode: DispatchMode,
    slot_width: core::time::Duration,
    shared: Arc<Shared>,
    entries: Vec<TaskEntry, { TaskId::COUNT }>,
}

impl TaskGraph {
    /// Validate `config` and build every task. Fails with a config fault
    /// before any task exists, so a partial graph never runs.
    pub fn build(config: &SystemConfig) -> Result<Self> {
        config.validate()?;

        let shared = Arc::new(Shared::new());
        let waits = config.wait_budgets();
        let mut graph = Self {
            mode: config.dispatch,
            slot_width: config.slot_width(),
            shared: Arc::clone(&shared),
            entries: Vec::new(),
        };

        graph.add(config, Job::Watchdog(WatchdogPulse {
            pin: pins::WATCHDOG_OUTPUT,
            pulse_us: config.watchdog_pulse_us,
        }))?;
        graph.add(config, Job::DigitalPoll(DigitalPoll {
            shared: Arc::clone(&shared),
            pin: pins::DIGITAL_INPUT,
            store_wait: waits.store_write,
        }))?;
        graph.add(config, Job::FrequencyMeasure(FrequencyMeasure {
            shared: Arc::clone(&shared),
            pin: pins::SQUARE_WAVE_INPUT,
            timeout_us: config.pulse_timeout_us,
            store_wait: waits.store_write,
        }))?;
        graph.add(config, Job::AnalogueSample(AnalogueSample::new(
            Arc::clone(&shared),
            pins::ANALOGUE_INPUT,
        )))?;
        graph.add(config, Job::Filter(Filter {
            shared: Arc::clone(&shared),
            window_wait: waits.window_receive,
            store_wait: waits.store_write,
        }))?;
        graph.add(config, Job::BusyWork(BusyWork {
            iterations: config.busy_work_iterations,
        }))?;

        // Consumer first: its handle must exist before the notifier.
        let visualiser_mailbox = Mailbox::<ErrorCode>::new(TaskId::Visualise);
        graph.add(config, Job::Visualise(Visualise {
            mailbox: Arc::clone(&visualiser_mailbox),
            pin: pins::ERROR_CODE_LED,
            mailbox_wait: waits.mailbox,
        }))?;
        graph.add(config, Job::Classify(Classify {
            shared: Arc::clone(&shared),
            max_range: config.analogue_max_range,
            notify: Broadcast::new(&[visualiser_mailbox])?,
        }))?;

        graph.add(config, Job::Logger(Logger {
            shared,
            read_wait: waits.log_read,
            requires_digital_high: config.log_requires_digital_high,
        }))?;

        info!(
            "graph: {} tasks built for {:?} dispatch",
            graph.entries.len(),
            graph.mode
        );
        Ok(graph)
    }

    fn add(&mut self, config: &SystemConfig, job: Job) -> Result<()> {
        let id = job.id();
        let descriptor = TaskDescriptor {
            id,
            period: config.period(id),
            priority: config.priority(id),
            monitor_pin: (id == TaskId::DigitalPoll).then_some(pins::TIMING_MONITOR),
        };
        self.entries
            .push(TaskEntry { descriptor, job })
            .map_err(|_| ConfigFault::TooManyTasks)?;
        Ok(())
    }

    pub fn mode(&self) -> DispatchMode {
        self.mode
    }

    /// Fail unless the graph was built for `mode`. Wait budgets and period
    /// checks differ per model, so a graph only runs under its own one.
    pub fn expect_mode(&self, mode: DispatchMode) -> Result<()> {
        if self.mode == mode {
            Ok(())
        } else {
            Err(ConfigFault::WrongDispatchMode {
                expected: mode,
                found: self.mode,
            }
            .into())
        }
    }

    pub fn slot_width(&self) -> core::time::Duration {
        self.slot_width
    }

    /// Resources shared by the jobs, for inspection.
    pub fn shared(&self) -> &Arc<Shared> {
        &self.shared
    }

    /// Descriptors in creation order.
    pub fn descriptors(&self) -> impl Iterator<Item = &TaskDescriptor> + '_ {
        self.entries.iter().map(|e| &e.descriptor)
    }

    pub fn descriptor(&self, id: TaskId) -> Option<&TaskDescriptor> {
        self.descriptors().find(|d| d.id == id)
    }

    pub fn into_entries(self) -> Vec<TaskEntry, { TaskId::COUNT }> {
        self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn builds_all_nine_tasks() {
        let graph = TaskGraph::build(&SystemConfig::default()).unwrap();
        assert_eq!(graph.descriptors().count(), TaskId::COUNT);
        for id in TaskId::ALL {
            assert!(graph.descriptor(id).is_some(), "{id} missing");
        }
    }

    #[test]
    fn visualiser_is_created_before_classifier() {
        let graph = TaskGraph::build(&SystemConfig::default()).unwrap();
        let order: std::vec::Vec<_> = graph.descriptors().map(|d| d.id).collect();
        let vis = order.iter().position(|&id| id == TaskId::Visualise);
        let cls = order.iter().position(|&id| id == TaskId::Classify);
        assert!(vis < cls);
    }

    #[test]
    fn only_digital_poll_is_monitored() {
        let graph = TaskGraph::build(&SystemConfig::default()).unwrap();
        for d in graph.descriptors() {
            let expected = (d.id == TaskId::DigitalPoll).then_some(pins::TIMING_MONITOR);
            assert_eq!(d.monitor_pin, expected);
        }
    }

    #[test]
    fn descriptors_carry_configured_priorities() {
        let graph = TaskGraph::build(&SystemConfig::default()).unwrap();
        assert_eq!(graph.descriptor(TaskId::Classify).unwrap().priority, 5);
        assert_eq!(graph.descriptor(TaskId::Visualise).unwrap().priority, 4);
    }

    #[test]
    fn invalid_config_builds_nothing() {
        let config = SystemConfig {
            analogue_max_range: 0,
            ..SystemConfig::default()
        };
        assert_eq!(
            TaskGraph::build(&config).err(),
            Some(Error::Config(ConfigFault::ZeroSensorRange))
        );
    }
}
