//! GPIO / peripheral pin assignments for the sensor-monitor board.
//!
//! Single source of truth. Every task and driver references this module
//! rather than hard-coding pin numbers.

use crate::app::ports::Pin;

// ---------------------------------------------------------------------------
// Outputs
// ---------------------------------------------------------------------------

/// Watchdog pulse output.
pub const WATCHDOG_OUTPUT: Pin = 21;
/// Error-code (alarm) LED, driven by the visualiser.
pub const ERROR_CODE_LED: Pin = 15;
/// Oscilloscope timing pin, high while a monitored task body runs.
pub const TIMING_MONITOR: Pin = 22;

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

/// Push-button / switch input.
pub const DIGITAL_INPUT: Pin = 19;
/// Square-wave input whose frequency is measured.
pub const SQUARE_WAVE_INPUT: Pin = 16;
/// Potentiometer / analogue sensor input.
pub const ANALOGUE_INPUT: Pin = 4;

// ---------------------------------------------------------------------------
// ADC mapping for ANALOGUE_INPUT (GPIO 4 = ADC2 channel 0 on ESP32)
// ---------------------------------------------------------------------------

pub const ANALOGUE_ADC_UNIT: u32 = 2;
pub const ANALOGUE_ADC_CHANNEL: u32 = 0;

pub const INPUT_PINS: [Pin; 2] = [DIGITAL_INPUT, SQUARE_WAVE_INPUT];
pub const OUTPUT_PINS: [Pin; 3] = [WATCHDOG_OUTPUT, ERROR_CODE_LED, TIMING_MONITOR];
