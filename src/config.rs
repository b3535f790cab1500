//! System configuration parameters
//!
//! Task rates, priorities, wait budgets and the choice of dispatcher.
//! Rates are given in hertz and converted to periods once, when the task
//! graph is built. A JSON document can override any subset of the defaults.

use core::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigFault, Error, Result};
use crate::tasks::TaskId;
use crate::timing::{Hertz, cycle_period};

/// Highest usable task priority (FreeRTOS `configMAX_PRIORITIES - 1`).
pub const MAX_PRIORITY: u8 = 24;

pub const LOW_PRIORITY: u8 = 1;
pub const MEDIUM_PRIORITY: u8 = 2;

/// Which scheduling model runs the task graph. Never mixed within one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DispatchMode {
    /// Single-threaded slot loop.
    Cyclic,
    /// One prioritised thread per task.
    Preemptive,
}

/// Rate and priority of one periodic task.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TaskTiming {
    pub rate_hz: Hertz,
    /// Preemptive model only; higher runs first.
    pub priority: u8,
}

impl TaskTiming {
    pub const fn new(rate_hz: Hertz, priority: u8) -> Self {
        Self { rate_hz, priority }
    }
}

/// Bounded-wait budgets for shared-resource access (milliseconds).
///
/// These apply to the preemptive model. The cyclic executive forbids
/// blocking, so it runs every task with zero waits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaitBudgets {
    /// Producer writes into the scalar store.
    pub store_write_ms: u32,
    /// Filter waiting for a fresh analogue window.
    pub window_receive_ms: u32,
    /// Logger reading the scalar store.
    pub log_read_ms: u32,
    /// Visualiser waiting on its mailbox.
    pub mailbox_ms: u32,
}

/// Core system configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemConfig {
    pub dispatch: DispatchMode,
    /// Tick granularity of the cyclic executive (microseconds).
    pub slot_width_us: u32,
    /// Multiplies every task rate (and divides the watchdog period).
    pub rate_amplifier: f64,

    // --- Watchdog pulse ---
    pub watchdog_period_ms: f64,
    pub watchdog_pulse_us: u32,
    pub watchdog_priority: u8,

    // --- Periodic tasks ---
    pub digital_poll: TaskTiming,
    pub frequency_measure: TaskTiming,
    pub analogue_sample: TaskTiming,
    pub filter: TaskTiming,
    pub busy_work: TaskTiming,
    pub classify: TaskTiming,
    pub visualise: TaskTiming,
    pub logger: TaskTiming,

    // --- Task parameters ---
    /// No-op iterations per busy-work run.
    pub busy_work_iterations: u32,
    /// Give-up time for one square-wave half-period measurement.
    pub pulse_timeout_us: u32,
    /// Full-scale analogue reading; the alarm threshold is half of it.
    pub analogue_max_range: u16,
    /// Only emit log records while the digital input is high.
    pub log_requires_digital_high: bool,

    pub waits: WaitBudgets,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            dispatch: DispatchMode::Preemptive,
            slot_width_us: 4_000,
            rate_amplifier: 1.0,

            watchdog_period_ms: 24.4,
            watchdog_pulse_us: 50,
            watchdog_priority: LOW_PRIORITY,

            digital_poll: TaskTiming::new(5.0, LOW_PRIORITY),
            frequency_measure: TaskTiming::new(1.0, LOW_PRIORITY),
            analogue_sample: TaskTiming::new(24.0, LOW_PRIORITY),
            filter: TaskTiming::new(24.0, LOW_PRIORITY),
            busy_work: TaskTiming::new(10.0, LOW_PRIORITY),
            classify: TaskTiming::new(3.0, 5),
            visualise: TaskTiming::new(3.0, 4),
            logger: TaskTiming::new(0.2, MEDIUM_PRIORITY),

            busy_work_iterations: 1_000,
            pulse_timeout_us: 3_000,
            analogue_max_range: 4_095,
            log_requires_digital_high: false,

            waits: WaitBudgets {
                store_write_ms: 10,
                window_receive_ms: 100,
                log_read_ms: 10,
                mailbox_ms: 0,
            },
        }
    }
}

impl SystemConfig {
    /// Parse a (possibly partial) JSON document over the defaults, then
    /// validate it.
    pub fn from_json(doc: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(doc).map_err(|_| Error::Config(ConfigFault::Malformed))?;
        config.validate()?;
        Ok(config)
    }

    /// Compact binary image, e.g. for a flash partition.
    pub fn to_bytes(&self) -> Result<std::vec::Vec<u8>> {
        postcard::to_allocvec(self).map_err(|_| Error::Config(ConfigFault::Malformed))
    }

    /// Decode and validate an image written by [`to_bytes`](Self::to_bytes).
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let config: Self =
            postcard::from_bytes(bytes).map_err(|_| Error::Config(ConfigFault::Malformed))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the task graph cannot run.
    pub fn validate(&self) -> Result<()> {
        if self.slot_width_us == 0 {
            return Err(ConfigFault::ZeroSlotWidth.into());
        }
        if self.analogue_max_range == 0 {
            return Err(ConfigFault::ZeroSensorRange.into());
        }
        if !(self.rate_amplifier.is_finite() && self.rate_amplifier > 0.0) {
            return Err(ConfigFault::InvalidRate("rate amplifier").into());
        }
        if !(self.watchdog_period_ms.is_finite() && self.watchdog_period_ms > 0.0) {
            return Err(ConfigFault::InvalidRate(TaskId::Watchdog.name()).into());
        }

        for id in TaskId::ALL {
            if let Some(t) = self.timing(id) {
                if !(t.rate_hz.is_finite() && t.rate_hz > 0.0) {
                    return Err(ConfigFault::InvalidRate(id.name()).into());
                }
            }
            let priority = self.priority(id);
            if priority == 0 || priority > MAX_PRIORITY {
                return Err(ConfigFault::InvalidPriority(id.name()).into());
            }
            if self.dispatch == DispatchMode::Cyclic && self.period(id) * 2 < self.slot_width() {
                return Err(ConfigFault::PeriodShorterThanSlot(id.name()).into());
            }
        }
        Ok(())
    }

    pub fn slot_width(&self) -> Duration {
        Duration::from_micros(u64::from(self.slot_width_us))
    }

    /// Natural (un-normalised) period of a task after amplification.
    pub fn period(&self, id: TaskId) -> Duration {
        match self.timing(id) {
            Some(t) => cycle_period(t.rate_hz * self.rate_amplifier),
            None => Duration::from_nanos(
                (self.watchdog_period_ms * 1e6 / self.rate_amplifier).round() as u64,
            ),
        }
    }

    pub fn priority(&self, id: TaskId) -> u8 {
        self.timing(id).map_or(self.watchdog_priority, |t| t.priority)
    }

    /// Resolved wait budgets for the configured dispatch mode.
    pub fn wait_budgets(&self) -> Waits {
        match self.dispatch {
            DispatchMode::Cyclic => Waits::default(),
            DispatchMode::Preemptive => Waits {
                store_write: ms(self.waits.store_write_ms),
                window_receive: ms(self.waits.window_receive_ms),
                log_read: ms(self.waits.log_read_ms),
                mailbox: ms(self.waits.mailbox_ms),
            },
        }
    }

    /// The watchdog has a fixed period rather than a rate.
    fn timing(&self, id: TaskId) -> Option<TaskTiming> {
        match id {
            TaskId::Watchdog => None,
            TaskId::DigitalPoll => Some(self.digital_poll),
            TaskId::FrequencyMeasure => Some(self.frequency_measure),
            TaskId::AnalogueSample => Some(self.analogue_sample),
            TaskId::Filter => Some(self.filter),
            TaskId::BusyWork => Some(self.busy_work),
            TaskId::Classify => Some(self.classify),
            TaskId::Visualise => Some(self.visualise),
            TaskId::Logger => Some(self.logger),
        }
    }
}

/// Wait budgets as durations, fixed when the task graph is built.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Waits {
    pub store_write: Duration,
    pub window_receive: Duration,
    pub log_read: Duration,
    pub mailbox: Duration,
}

fn ms(v: u32) -> Duration {
    Duration::from_millis(u64::from(v))
}
