//! Task bodies.
//!
//! Each job struct holds exactly the parameters its task needs, resolved
//! when the task graph is built. [`Job`] tags them so a dispatcher can run
//! any task without knowing its parameter type.
//!
//! A body returns `Err` only for a bounded wait that expired; an empty
//! channel or mailbox is a normal "nothing to do" outcome.

use core::time::Duration;
use std::sync::Arc;

use log::{debug, warn};

use super::signal::{self, ErrorCode};
use super::{AnalogueWindow, Shared, TaskId, WINDOW_SIZE};
use crate::app::events::{LogEvent, LogRecord};
use crate::app::ports::{ActuatorPort, Level, LogSink, Pin, SensorPort};
use crate::error::{Error, Resource, Result};
use crate::sync::{Broadcast, MailboxHandle, ScalarValue};
use crate::timing::frequency_from_half_period_us;

// ── Watchdog pulse ────────────────────────────────────────────

/// Drives `pin` high for `pulse_us`, then low.
pub struct WatchdogPulse {
    pub pin: Pin,
    pub pulse_us: u32,
}

impl WatchdogPulse {
    fn run<H: ActuatorPort>(&mut self, hw: &mut H) {
        hw.set_pin(self.pin, Level::High);
        hw.delay_us(self.pulse_us);
        hw.set_pin(self.pin, Level::Low);
    }
}

// ── Digital poll ──────────────────────────────────────────────

pub struct DigitalPoll {
    pub shared: Arc<Shared>,
    pub pin: Pin,
    pub store_wait: Duration,
}

impl DigitalPoll {
    fn run<H: SensorPort>(&mut self, hw: &mut H) -> Result<()> {
        let state = hw.read_digital(self.pin);
        self.shared
            .store
            .set(ScalarValue::DigitalInput(state), self.store_wait)
    }
}

// ── Frequency measure ─────────────────────────────────────────

/// Measures one high half-period of the square wave. A timed-out
/// measurement is stored as 0 Hz.
pub struct FrequencyMeasure {
    pub shared: Arc<Shared>,
    pub pin: Pin,
    pub timeout_us: u32,
    pub store_wait: Duration,
}

impl FrequencyMeasure {
    fn run<H: SensorPort>(&mut self, hw: &mut H) -> Result<()> {
        let half_period = hw.measure_pulse_us(self.pin, Level::High, self.timeout_us);
        let hz = frequency_from_half_period_us(half_period);
        self.shared
            .store
            .set(ScalarValue::SquareWaveFrequency(hz), self.store_wait)
    }
}

// ── Analogue sample ───────────────────────────────────────────

/// Writes each reading into a circular window and publishes the whole
/// window. The producer never waits.
pub struct AnalogueSample {
    pub shared: Arc<Shared>,
    pub pin: Pin,
    samples: AnalogueWindow,
    index: usize,
}

impl AnalogueSample {
    pub fn new(shared: Arc<Shared>, pin: Pin) -> Self {
        Self {
            shared,
            pin,
            samples: [0; WINDOW_SIZE],
            index: 0,
        }
    }

    fn run<H: SensorPort>(&mut self, hw: &mut H) {
        self.samples[self.index] = hw.read_analogue(self.pin);
        self.index = (self.index + 1) % WINDOW_SIZE;
        self.shared.window.publish(self.samples);
    }
}

// ── Filter ────────────────────────────────────────────────────

/// Averages the latest window into the history and the scalar store.
pub struct Filter {
    pub shared: Arc<Shared>,
    pub window_wait: Duration,
    pub store_wait: Duration,
}

impl Filter {
    fn run(&mut self) -> Result<()> {
        let window = self
            .shared
            .window
            .receive(self.window_wait)
            .ok_or(Error::Timeout(Resource::AnalogueWindow))?;

        let avg = signal::average(&window);
        if let Some(evicted) = self.shared.history.push(avg) {
            debug!("filter: history full, evicted {:.1}", evicted);
        }
        self.shared
            .store
            .set(ScalarValue::FilteredAnalogue(avg), self.store_wait)
    }
}

// ── Busy work ─────────────────────────────────────────────────

pub struct BusyWork {
    pub iterations: u32,
}

// ── Classify ──────────────────────────────────────────────────

/// Peeks the newest average and broadcasts its error code. The history is
/// released before any mailbox is written.
pub struct Classify {
    pub shared: Arc<Shared>,
    pub max_range: u16,
    pub notify: Broadcast<ErrorCode>,
}

impl Classify {
    fn run(&mut self) {
        let Some(avg) = self.shared.history.peek_latest() else {
            return;
        };
        self.notify.notify(signal::classify(avg, self.max_range));
    }
}

// ── Visualise ─────────────────────────────────────────────────

/// Shows the most recent error code on the LED, if one arrived.
pub struct Visualise {
    pub mailbox: MailboxHandle<ErrorCode>,
    pub pin: Pin,
    pub mailbox_wait: Duration,
}

impl Visualise {
    fn run<H: ActuatorPort>(&mut self, hw: &mut H) {
        if let Some(code) = self.mailbox.try_receive(self.mailbox_wait) {
            hw.set_pin(self.pin, code.is_alarm().into());
        }
    }
}

// ── Logger ────────────────────────────────────────────────────

/// Emits one combined record per period, or a "data unavailable" event
/// when the scalar store cannot be read in time.
pub struct Logger {
    pub shared: Arc<Shared>,
    pub read_wait: Duration,
    /// Suppress records while the digital input is low.
    pub requires_digital_high: bool,
}

impl Logger {
    fn run<S: LogSink>(&mut self, sink: &mut S) -> Result<()> {
        let scalars = match self.shared.store.snapshot(self.read_wait) {
            Ok(s) => s,
            Err(e) => {
                warn!("logger: {}", e);
                sink.emit(&LogEvent::DataUnavailable);
                return Err(e);
            }
        };

        let recent = self.shared.history.drain();
        if self.requires_digital_high && !scalars.digital_input_state {
            return Ok(());
        }
        sink.emit(&LogEvent::Record(LogRecord::new(scalars, recent)));
        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════════
//  Tagged job
// ═══════════════════════════════════════════════════════════════

/// One task body with its parameters.
pub enum Job {
    Watchdog(WatchdogPulse),
    DigitalPoll(DigitalPoll),
    FrequencyMeasure(FrequencyMeasure),
    AnalogueSample(AnalogueSample),
    Filter(Filter),
    BusyWork(BusyWork),
    Classify(Classify),
    Visualise(Visualise),
    Logger(Logger),
}

impl Job {
    pub fn id(&self) -> TaskId {
        match self {
            Self::Watchdog(_) => TaskId::Watchdog,
            Self::DigitalPoll(_) => TaskId::DigitalPoll,
            Self::FrequencyMeasure(_) => TaskId::FrequencyMeasure,
            Self::AnalogueSample(_) => TaskId::AnalogueSample,
            Self::Filter(_) => TaskId::Filter,
            Self::BusyWork(_) => TaskId::BusyWork,
            Self::Classify(_) => TaskId::Classify,
            Self::Visualise(_) => TaskId::Visualise,
            Self::Logger(_) => TaskId::Logger,
        }
    }

    /// Run the body once, to completion.
    pub fn run<H, S>(&mut self, hw: &mut H, sink: &mut S) -> Result<()>
    where
        H: SensorPort + ActuatorPort,
        S: LogSink,
    {
        match self {
            Self::DigitalPoll(j) => j.run(hw),
            Self::FrequencyMeasure(j) => j.run(hw),
            Self::Filter(j) => j.run(),
            Self::Logger(j) => j.run(sink),
            // Infallible bodies.
            Self::Watchdog(j) => {
                j.run(hw);
                Ok(())
            }
            Self::AnalogueSample(j) => {
                j.run(hw);
                Ok(())
            }
            Self::BusyWork(j) => {
                signal::busy_work(j.iterations);
                Ok(())
            }
            Self::Classify(j) => {
                j.run();
                Ok(())
            }
            Self::Visualise(j) => {
                j.run(hw);
                Ok(())
            }
        }
    }
}
