//! Outbound log events.
//!
//! The logger task emits these through the [`LogSink`](super::ports::LogSink)
//! port once per period.

use heapless::Vec;

use crate::sync::ScalarSet;
use crate::tasks::HISTORY_CAPACITY;
use crate::timing::Hertz;

/// One combined measurement record.
#[derive(Debug, Clone, PartialEq)]
pub struct LogRecord {
    pub digital_input_state: bool,
    pub square_wave_frequency: Hertz,
    pub filtered_analogue_signal: f64,
    /// Averages received from the filtered history since the previous
    /// record, oldest first. Empty if the filter produced nothing new.
    pub recent_averages: Vec<f64, HISTORY_CAPACITY>,
}

impl LogRecord {
    pub fn new(scalars: ScalarSet, recent_averages: Vec<f64, HISTORY_CAPACITY>) -> Self {
        Self {
            digital_input_state: scalars.digital_input_state,
            square_wave_frequency: scalars.square_wave_frequency,
            filtered_analogue_signal: scalars.filtered_analogue_signal,
            recent_averages,
        }
    }
}

/// Events emitted by the logger task.
#[derive(Debug, Clone, PartialEq)]
pub enum LogEvent {
    /// All required reads succeeded.
    Record(LogRecord),
    /// A required read timed out; this cycle is skipped.
    DataUnavailable,
}
