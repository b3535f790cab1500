//! Mock board and log sink for integration tests.
//!
//! Both are cheap `Clone` handles over shared state, so the preemptive
//! dispatcher can hand one copy to every task while the test keeps another
//! to inject inputs and inspect outputs.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use sensor_monitor::app::events::{LogEvent, LogRecord};
use sensor_monitor::app::ports::{ActuatorPort, Level, LogSink, Pin, SensorPort};

// ── MockBoard ─────────────────────────────────────────────────

#[derive(Default)]
pub struct BoardState {
    pub digital: HashMap<Pin, bool>,
    pub analogue: u16,
    pub pulse_us: u32,
    /// Every output write, in order.
    pub writes: Vec<(Pin, Level)>,
    pub delayed_us: u64,
}

#[derive(Clone, Default)]
pub struct MockBoard {
    state: Arc<Mutex<BoardState>>,
}

#[allow(dead_code)]
impl MockBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> MutexGuard<'_, BoardState> {
        self.state.lock().unwrap()
    }

    pub fn set_digital(&self, pin: Pin, high: bool) {
        self.state().digital.insert(pin, high);
    }

    pub fn set_analogue(&self, raw: u16) {
        self.state().analogue = raw;
    }

    pub fn set_pulse_us(&self, us: u32) {
        self.state().pulse_us = us;
    }

    /// Level of the most recent write to `pin`, if any.
    pub fn output(&self, pin: Pin) -> Option<Level> {
        self.state()
            .writes
            .iter()
            .rev()
            .find(|(p, _)| *p == pin)
            .map(|(_, level)| *level)
    }

    pub fn writes_to(&self, pin: Pin) -> Vec<Level> {
        self.state()
            .writes
            .iter()
            .filter(|(p, _)| *p == pin)
            .map(|(_, level)| *level)
            .collect()
    }
}

impl SensorPort for MockBoard {
    fn read_digital(&mut self, pin: Pin) -> bool {
        self.state().digital.get(&pin).copied().unwrap_or(false)
    }

    fn read_analogue(&mut self, _pin: Pin) -> u16 {
        self.state().analogue
    }

    fn measure_pulse_us(&mut self, _pin: Pin, _level: Level, timeout_us: u32) -> u32 {
        let us = self.state().pulse_us;
        if us > timeout_us { 0 } else { us }
    }
}

impl ActuatorPort for MockBoard {
    fn set_pin(&mut self, pin: Pin, level: Level) {
        self.state().writes.push((pin, level));
    }

    fn delay_us(&mut self, us: u32) {
        self.state().delayed_us += u64::from(us);
    }
}

// ── MockSink ──────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct MockSink {
    events: Arc<Mutex<Vec<LogEvent>>>,
}

#[allow(dead_code)]
impl MockSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<LogEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn records(&self) -> Vec<LogRecord> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                LogEvent::Record(r) => Some(r),
                LogEvent::DataUnavailable => None,
            })
            .collect()
    }
}

impl LogSink for MockSink {
    fn emit(&mut self, event: &LogEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}
