//! ESP32 time adapter.
//!
//! Monotonic time for the dispatchers and diagnostics.
//!
//! - **`target_os = "espidf"`**: uptime from `esp_timer_get_time()`
//!   (microsecond precision, monotonic).
//! - **`not(target_os = "espidf")`**: uses `std::time::Instant` for
//!   host-side testing and simulation.
//!
//! Sleeping goes through `std::thread::sleep` on both, which ESP-IDF maps
//! onto a FreeRTOS delay. That call is the cooperative suspension point of
//! every periodic task.

use std::time::Instant;

/// Time adapter for the ESP32 platform.
pub struct MonotonicClock {
    #[cfg(not(target_os = "espidf"))]
    start: Instant,
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            #[cfg(not(target_os = "espidf"))]
            start: Instant::now(),
        }
    }

    /// Microseconds since boot (monotonic).
    #[cfg(target_os = "espidf")]
    pub fn uptime_us(&self) -> u64 {
        // SAFETY: esp_timer_get_time is a monotonic counter read.
        (unsafe { esp_idf_svc::sys::esp_timer_get_time() }) as u64
    }

    /// Microseconds since this clock was created (monotonic).
    #[cfg(not(target_os = "espidf"))]
    pub fn uptime_us(&self) -> u64 {
        self.start.elapsed().as_micros() as u64
    }

    pub fn uptime_secs(&self) -> u64 {
        self.uptime_us() / 1_000_000
    }

    /// Suspend the calling thread until `deadline`. Returns at once if the
    /// deadline has passed.
    pub fn sleep_until(deadline: Instant) {
        let now = Instant::now();
        if deadline > now {
            std::thread::sleep(deadline - now);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::time::Duration;

    #[test]
    fn uptime_is_monotonic() {
        let clock = MonotonicClock::new();
        let a = clock.uptime_us();
        std::thread::sleep(Duration::from_millis(2));
        assert!(clock.uptime_us() >= a + 2_000);
    }

    #[test]
    fn past_deadline_does_not_sleep() {
        let start = Instant::now();
        MonotonicClock::sleep_until(start.checked_sub(Duration::from_secs(1)).unwrap_or(start));
        assert!(start.elapsed() < Duration::from_millis(100));
    }

    #[test]
    fn sleeps_until_deadline() {
        let deadline = Instant::now() + Duration::from_millis(5);
        MonotonicClock::sleep_until(deadline);
        assert!(Instant::now() >= deadline);
    }
}
