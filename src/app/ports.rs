//! Port traits: the hexagonal boundary between task logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ Job bodies (domain)
//! ```
//!
//! Driven adapters (pins, ADC, pulse timer, log output) implement these
//! traits. The task bodies consume them via generics, so scheduling and
//! synchronisation logic never touches hardware.
//!
//! Every task owns its own adapter value; in the preemptive model the
//! adapters are cloned into each task thread, so implementations must be
//! cheap to clone and must not rely on exclusive access to a pin across
//! tasks.

use super::events::LogEvent;

/// GPIO number, as assigned in [`crate::pins`].
pub type Pin = i32;

/// Logic level of a digital pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Low,
    High,
}

impl From<bool> for Level {
    fn from(high: bool) -> Self {
        if high { Self::High } else { Self::Low }
    }
}

impl Level {
    pub fn is_high(self) -> bool {
        self == Self::High
    }
}

// ───────────────────────────────────────────────────────────────
// Sensor port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Read-side port.
pub trait SensorPort {
    /// Current level of a digital input.
    fn read_digital(&mut self, pin: Pin) -> bool;

    /// Raw analogue sample, `0..=max_range`.
    fn read_analogue(&mut self, pin: Pin) -> u16;

    /// Duration in µs of the next pulse at `level`, or 0 if no complete
    /// pulse is seen within `timeout_us`.
    fn measure_pulse_us(&mut self, pin: Pin, level: Level, timeout_us: u32) -> u32;
}

// ───────────────────────────────────────────────────────────────
// Actuator port (driven adapter: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// Write-side port.
pub trait ActuatorPort {
    /// Drive a digital output.
    fn set_pin(&mut self, pin: Pin, level: Level);

    /// Busy-wait for `us` microseconds without yielding.
    fn delay_us(&mut self, us: u32);
}

// ───────────────────────────────────────────────────────────────
// Log sink port (driven adapter: domain → serial log)
// ───────────────────────────────────────────────────────────────

/// Receives one [`LogEvent`] per logger period. Adapters decide the text
/// format and destination.
pub trait LogSink {
    fn emit(&mut self, event: &LogEvent);
}
