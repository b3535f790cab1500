//! Unified error types for the sensor-monitor firmware.
//!
//! A single `Error` enum that every subsystem converts into, keeping the
//! dispatchers' error handling uniform. All variants are `Copy` so they can
//! be passed from task bodies to the dispatcher without allocation.
//!
//! | Category           | Variant            | Handling                         |
//! |--------------------|--------------------|----------------------------------|
//! | TimeoutFailure     | `Timeout`          | recovered locally, cycle skipped |
//! | ConfigurationFault | `Config`           | fatal at start-up                |
//! | Thread creation    | `Spawn`            | fatal at start-up                |
//!
//! Empty or full channels are not errors: they surface as `Option` and as
//! the eviction policy of the ring.

use core::fmt;

use crate::config::DispatchMode;
use crate::tasks::TaskId;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Every fallible operation in the firmware funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A bounded wait on a shared resource expired.
    Timeout(Resource),
    /// The task graph or configuration is inconsistent.
    Config(ConfigFault),
    /// A preemptive task thread could not be created.
    Spawn(TaskId),
}

impl Error {
    /// Only timeouts may be absorbed by a task; everything else stops the
    /// dispatcher.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Timeout(r) => write!(f, "timeout: {r}"),
            Self::Config(e) => write!(f, "config: {e}"),
            Self::Spawn(id) => write!(f, "spawn: {id} thread creation failed"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// Shared resources
// ---------------------------------------------------------------------------

/// The shared resource a timed operation was waiting on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    ScalarStore,
    AnalogueWindow,
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ScalarStore => write!(f, "scalar store"),
            Self::AnalogueWindow => write!(f, "analogue window"),
        }
    }
}

// ---------------------------------------------------------------------------
// Configuration faults
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFault {
    /// A notifying task was built without any consumer handle.
    MissingConsumers,
    /// More consumers than a broadcast can hold.
    TooManyConsumers,
    /// The cyclic executive's slot width is zero.
    ZeroSlotWidth,
    /// A task rate is zero, negative or not finite.
    InvalidRate(&'static str),
    /// A task period rounds to less than half a slot.
    PeriodShorterThanSlot(&'static str),
    /// A task priority is outside the RTOS priority range.
    InvalidPriority(&'static str),
    /// The sensor maximum range is zero.
    ZeroSensorRange,
    /// The dispatcher's task table is full.
    TooManyTasks,
    /// The configuration document could not be parsed.
    Malformed,
    /// A task graph was handed to the dispatcher of the other model.
    WrongDispatchMode {
        expected: DispatchMode,
        found: DispatchMode,
    },
}

impl fmt::Display for ConfigFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingConsumers => write!(f, "notifier has no consumer handles"),
            Self::TooManyConsumers => write!(f, "too many notification consumers"),
            Self::ZeroSlotWidth => write!(f, "slot width must be non-zero"),
            Self::InvalidRate(task) => write!(f, "{task}: rate must be positive and finite"),
            Self::PeriodShorterThanSlot(task) => {
                write!(f, "{task}: period shorter than half a slot")
            }
            Self::InvalidPriority(task) => write!(f, "{task}: priority out of range"),
            Self::ZeroSensorRange => write!(f, "sensor maximum range must be non-zero"),
            Self::TooManyTasks => write!(f, "task table full"),
            Self::Malformed => write!(f, "malformed configuration document"),
            Self::WrongDispatchMode { expected, found } => {
                write!(f, "graph built for {found:?} dispatch, expected {expected:?}")
            }
        }
    }
}

impl From<ConfigFault> for Error {
    fn from(e: ConfigFault) -> Self {
        Self::Config(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
