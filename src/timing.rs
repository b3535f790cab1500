//! Units and period arithmetic.
//!
//! Rates are configured in hertz and converted to [`Duration`] periods once,
//! at start-up. The cyclic executive additionally snaps every period onto
//! its slot grid with [`normalize_period`].

use core::time::Duration;

/// Frequency in hertz.
pub type Hertz = f64;

/// Period of a task running at `rate` hertz, to the nearest nanosecond.
pub fn cycle_period(rate: Hertz) -> Duration {
    Duration::from_nanos((1e9 / rate).round() as u64)
}

/// Round `period` to the nearest multiple of `slot`, ties rounding up.
///
/// `normalized = round(period / slot) * slot`, computed in integer
/// nanoseconds so the result is an exact multiple of `slot`. A task whose
/// period is not a multiple of the slot width would otherwise only line up
/// with the tick counter every `lcm(period, slot)`; after rounding the error
/// is at most `slot / 2`.
///
/// The result is never shorter than one slot, so a period under half a
/// slot is clamped up to `slot` and the `slot / 2` bound does not hold for
/// it. `SystemConfig::validate` rejects such periods in cyclic mode.
/// `slot` must be non-zero.
pub fn normalize_period(period: Duration, slot: Duration) -> Duration {
    let slot_ns = slot.as_nanos();
    let slots = slots_per_period(period, slot);
    let ns = slot_ns * u128::from(slots);
    Duration::new(
        (ns / 1_000_000_000) as u64,
        (ns % 1_000_000_000) as u32,
    )
}

/// Number of slots in the normalised period (at least 1).
pub fn slots_per_period(period: Duration, slot: Duration) -> u64 {
    let p = period.as_nanos();
    let w = slot.as_nanos();
    // floor((2p + w) / 2w) == round-half-up(p / w)
    let q = (2 * p + w) / (2 * w);
    q.max(1) as u64
}

/// Square-wave frequency from a measured half-period.
///
/// A zero duration means the pulse measurement timed out; the degenerate
/// reading is passed downstream as 0 Hz.
pub fn frequency_from_half_period_us(half_period_us: u32) -> Hertz {
    if half_period_us == 0 {
        return 0.0;
    }
    let half_period_s = f64::from(half_period_us) / 1_000_000.0;
    1.0 / (half_period_s * 2.0)
}
