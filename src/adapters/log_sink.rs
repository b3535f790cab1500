//! Serial log sink adapter.
//!
//! Implements [`LogSink`] by writing each measurement record to the
//! ESP-IDF logger (UART / USB-CDC in production) as one CSV line:
//! `digital,frequency,filtered`, all as integers.

use core::fmt::Write;

use heapless::String;
use log::{debug, info, warn};

use crate::app::events::{LogEvent, LogRecord};
use crate::app::ports::LogSink;

/// Longest line [`format_record`] produces.
pub const LINE_CAPACITY: usize = 64;

/// Adapter that prints every [`LogEvent`] to the serial console.
#[derive(Debug, Clone, Copy, Default)]
pub struct SerialLogSink;

impl SerialLogSink {
    pub fn new() -> Self {
        Self
    }
}

impl LogSink for SerialLogSink {
    fn emit(&mut self, event: &LogEvent) {
        match event {
            LogEvent::Record(record) => {
                info!("{}", format_record(record));
                if !record.recent_averages.is_empty() {
                    debug!("averages since last record: {:?}", record.recent_averages);
                }
            }
            LogEvent::DataUnavailable => warn!("Unable to log, data not accessible."),
        }
    }
}

/// `digital,frequency,filtered` with the fractional parts truncated.
pub fn format_record(record: &LogRecord) -> String<LINE_CAPACITY> {
    let mut line = String::new();
    // Three integers always fit the line buffer.
    let _ = write!(
        line,
        "{},{},{}",
        u8::from(record.digital_input_state),
        record.square_wave_frequency as i64,
        record.filtered_analogue_signal as i64
    );
    line
}
