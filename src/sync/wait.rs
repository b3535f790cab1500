//! Bounded waiting on non-blocking primitives.
//!
//! The embassy primitives only offer `try_*` operations outside an async
//! executor, so timed operations retry them on a short poll interval until
//! the budget runs out. A zero budget makes exactly one attempt.

use core::time::Duration;
use std::time::Instant;

/// Retry interval while waiting. On FreeRTOS this rounds up to one tick.
const POLL_INTERVAL: Duration = Duration::from_micros(250);

/// Run `attempt` until it yields a value or `max_wait` has elapsed.
pub(crate) fn within<T>(max_wait: Duration, mut attempt: impl FnMut() -> Option<T>) -> Option<T> {
    if let Some(v) = attempt() {
        return Some(v);
    }
    if max_wait.is_zero() {
        return None;
    }

    let deadline = Instant::now() + max_wait;
    loop {
        let now = Instant::now();
        if now >= deadline {
            return None;
        }
        std::thread::sleep(POLL_INTERVAL.min(deadline - now));
        if let Some(v) = attempt() {
            return Some(v);
        }
    }
}
