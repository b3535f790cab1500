//! Hardware adapter. Bridges board pins to the domain port traits.
//!
//! The only module in the system that touches pins. It holds no state of
//! its own, so every task gets a copy. On non-espidf targets the
//! underlying driver helpers are simulation stubs backed by injectable
//! atomics.

use crate::app::ports::{ActuatorPort, Level, Pin, SensorPort};
use crate::drivers::hw_init;
use crate::pins;

/// Concrete adapter over the board's GPIO, ADC and pulse timing.
#[derive(Debug, Clone, Copy, Default)]
pub struct BoardAdapter;

impl BoardAdapter {
    pub fn new() -> Self {
        Self
    }
}

// ── SensorPort implementation ─────────────────────────────────

impl SensorPort for BoardAdapter {
    fn read_digital(&mut self, pin: Pin) -> bool {
        hw_init::gpio_read(pin)
    }

    fn read_analogue(&mut self, pin: Pin) -> u16 {
        debug_assert_eq!(pin, pins::ANALOGUE_INPUT, "only one ADC channel is configured");
        hw_init::adc_read()
    }

    fn measure_pulse_us(&mut self, pin: Pin, level: Level, timeout_us: u32) -> u32 {
        hw_init::pulse_in(pin, level.is_high(), timeout_us)
    }
}

// ── ActuatorPort implementation ───────────────────────────────

impl ActuatorPort for BoardAdapter {
    fn set_pin(&mut self, pin: Pin, level: Level) {
        hw_init::gpio_write(pin, level.is_high());
    }

    fn delay_us(&mut self, us: u32) {
        hw_init::delay_us(us);
    }
}
