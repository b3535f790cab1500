//! Protected scalar store.
//!
//! Holds the latest digital-input state, square-wave frequency and filtered
//! analogue value behind **one** mutex. Every get/set acquires that lock
//! within a caller-supplied budget, performs its read or write and releases
//! it; on timeout nothing is touched and [`Error::Timeout`] is returned.
//! There is no implicit retry; callers try again on their next period.
//!
//! Fields are written independently by different producers, so a reader of
//! several fields sees each one at its own age. [`ScalarStore::snapshot`]
//! reads all three under one acquisition, which rules out torn values but
//! not differing freshness.

use core::time::Duration;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::mutex::{Mutex, MutexGuard};
use log::debug;

use super::wait;
use crate::error::{Error, Resource, Result};
use crate::timing::Hertz;

/// The three shared scalars.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScalarSet {
    pub digital_input_state: bool,
    pub square_wave_frequency: Hertz,
    pub filtered_analogue_signal: f64,
}

/// Field selector for [`ScalarStore::get`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarKind {
    DigitalInput,
    SquareWaveFrequency,
    FilteredAnalogue,
}

/// A single field together with its value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScalarValue {
    DigitalInput(bool),
    SquareWaveFrequency(Hertz),
    FilteredAnalogue(f64),
}

/// Mutex-guarded [`ScalarSet`] with bounded-wait access.
pub struct ScalarStore {
    inner: Mutex<CriticalSectionRawMutex, ScalarSet>,
}

impl Default for ScalarStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ScalarStore {
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(ScalarSet {
                digital_input_state: false,
                square_wave_frequency: 0.0,
                filtered_analogue_signal: 0.0,
            }),
        }
    }

    /// Write one field. Fails with a timeout if the lock is not acquired
    /// within `max_wait`.
    pub fn set(&self, value: ScalarValue, max_wait: Duration) -> Result<()> {
        let mut guard = self.lock(max_wait)?;
        match value {
            ScalarValue::DigitalInput(v) => guard.digital_input_state = v,
            ScalarValue::SquareWaveFrequency(v) => guard.square_wave_frequency = v,
            ScalarValue::FilteredAnalogue(v) => guard.filtered_analogue_signal = v,
        }
        Ok(())
    }

    /// Read one field.
    pub fn get(&self, kind: ScalarKind, max_wait: Duration) -> Result<ScalarValue> {
        let guard = self.lock(max_wait)?;
        Ok(match kind {
            ScalarKind::DigitalInput => ScalarValue::DigitalInput(guard.digital_input_state),
            ScalarKind::SquareWaveFrequency => {
                ScalarValue::SquareWaveFrequency(guard.square_wave_frequency)
            }
            ScalarKind::FilteredAnalogue => {
                ScalarValue::FilteredAnalogue(guard.filtered_analogue_signal)
            }
        })
    }

    /// Read all three fields in one lock acquisition.
    pub fn snapshot(&self, max_wait: Duration) -> Result<ScalarSet> {
        self.lock(max_wait).map(|guard| *guard)
    }

    /// Hold the lock directly, e.g. to update several fields as one.
    /// Every other accessor times out while the guard is alive.
    pub fn lock(
        &self,
        max_wait: Duration,
    ) -> Result<MutexGuard<'_, CriticalSectionRawMutex, ScalarSet>> {
        wait::within(max_wait, || self.inner.try_lock().ok()).ok_or_else(|| {
            debug!("scalar store: lock not acquired within {:?}", max_wait);
            Error::Timeout(Resource::ScalarStore)
        })
    }
}
