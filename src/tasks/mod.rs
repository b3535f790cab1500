//! The periodic task set.
//!
//! Nine units of work, each identified by a [`TaskId`] and run through the
//! tagged [`Job`] enum. A job owns its typed parameters and the handles of
//! the shared resources it touches; the dispatchers only see `Job::run`.
//!
//! ```text
//!  digital-poll ─────┐
//!  frequency ────────┼──▶ ScalarStore ─────────────────────────┐
//!  filter ───────────┘                                         ▼
//!  analogue-sample ──▶ window ──▶ filter ──▶ history ──peek──▶ classify
//!                                              │               │ notify
//!                                              └──drain──▶ logger   ▼
//!                                                         visualise ─▶ LED
//!  watchdog ──▶ pulse pin        busy-work ──▶ (CPU load only)
//! ```

use core::fmt;
use core::time::Duration;

use crate::app::ports::Pin;
use crate::sync::{OverwriteChannel, ScalarStore, SlidingWindow};

mod jobs;
pub mod signal;

pub use jobs::{
    AnalogueSample, BusyWork, Classify, DigitalPoll, Filter, FrequencyMeasure, Job, Logger,
    Visualise, WatchdogPulse,
};
pub use signal::ErrorCode;

/// Raw analogue samples averaged by the filter.
pub const WINDOW_SIZE: usize = 4;
/// Filtered averages retained for the classifier and logger.
pub const HISTORY_CAPACITY: usize = 5;

/// Last `WINDOW_SIZE` raw samples, published whole.
pub type AnalogueWindow = [u16; WINDOW_SIZE];

/// Identity of each periodic task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskId {
    Watchdog,
    DigitalPoll,
    FrequencyMeasure,
    AnalogueSample,
    Filter,
    BusyWork,
    Classify,
    Visualise,
    Logger,
}

impl TaskId {
    pub const COUNT: usize = 9;

    /// Every task, in cyclic-executive dispatch order.
    pub const ALL: [Self; Self::COUNT] = [
        Self::Watchdog,
        Self::DigitalPoll,
        Self::FrequencyMeasure,
        Self::AnalogueSample,
        Self::Filter,
        Self::BusyWork,
        Self::Classify,
        Self::Visualise,
        Self::Logger,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            Self::Watchdog => "watchdog",
            Self::DigitalPoll => "digital-poll",
            Self::FrequencyMeasure => "frequency",
            Self::AnalogueSample => "analogue-sample",
            Self::Filter => "filter",
            Self::BusyWork => "busy-work",
            Self::Classify => "classify",
            Self::Visualise => "visualise",
            Self::Logger => "logger",
        }
    }

    /// Null-terminated name for the FreeRTOS task.
    pub const fn thread_name(self) -> &'static str {
        match self {
            Self::Watchdog => "watchdog\0",
            Self::DigitalPoll => "digital-poll\0",
            Self::FrequencyMeasure => "frequency\0",
            Self::AnalogueSample => "analogue-sample\0",
            Self::Filter => "filter\0",
            Self::BusyWork => "busy-work\0",
            Self::Classify => "classify\0",
            Self::Visualise => "visualise\0",
            Self::Logger => "logger\0",
        }
    }

    /// Dense index for per-task tables.
    pub const fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Scheduling parameters of one task, fixed before it starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskDescriptor {
    pub id: TaskId,
    pub period: Duration,
    /// Preemptive model only.
    pub priority: u8,
    /// Driven high for the duration of each run, for scope timing.
    pub monitor_pin: Option<Pin>,
}

/// Resources shared between tasks. Built once per task graph and handed to
/// each job by `Arc`; nothing here is a process global.
#[derive(Default)]
pub struct Shared {
    pub store: ScalarStore,
    pub window: OverwriteChannel<AnalogueWindow>,
    pub history: SlidingWindow<f64, HISTORY_CAPACITY>,
}

impl Shared {
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indices_are_dense_and_ordered() {
        for (i, id) in TaskId::ALL.iter().enumerate() {
            assert_eq!(id.index(), i);
        }
    }

    #[test]
    fn thread_names_are_null_terminated() {
        for id in TaskId::ALL {
            let name = id.thread_name();
            assert!(name.ends_with('\0'));
            assert_eq!(name.trim_end_matches('\0'), id.name());
        }
    }
}
