//! Bounded channels with overwrite semantics.
//!
//! Two flavours, neither of which ever blocks its producer:
//!
//! - [`OverwriteChannel`]: one slot. A publish replaces any unread value;
//!   consumers only ever see the most recent one.
//! - [`SlidingWindow`]: a ring of `N` values. Once full, a push drops the
//!   oldest entry before appending, so the ring always holds the latest `N`.
//!   Consumers either [`peek_latest`](SlidingWindow::peek_latest)
//!   (non-destructive) or [`drain`](SlidingWindow::drain) (oldest first,
//!   destructive).

use core::cell::RefCell;
use core::time::Duration;

use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use heapless::{Deque, Vec};

use super::wait;

// ───────────────────────────────────────────────────────────────
// Single-slot overwrite channel
// ───────────────────────────────────────────────────────────────

/// Single-capacity handoff where a new value replaces any unread one.
pub struct OverwriteChannel<T> {
    slot: Signal<CriticalSectionRawMutex, T>,
}

impl<T: Send> Default for OverwriteChannel<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Send> OverwriteChannel<T> {
    pub const fn new() -> Self {
        Self {
            slot: Signal::new(),
        }
    }

    /// Store `value`, discarding any value not yet received. Never fails.
    pub fn publish(&self, value: T) {
        self.slot.signal(value);
    }

    /// Take the pending value, if any.
    pub fn try_receive(&self) -> Option<T> {
        self.slot.try_take()
    }

    /// Take the pending value, waiting up to `max_wait` for one to arrive.
    pub fn receive(&self, max_wait: Duration) -> Option<T> {
        wait::within(max_wait, || self.slot.try_take())
    }

    /// Whether a value is waiting to be received.
    pub fn is_pending(&self) -> bool {
        self.slot.signaled()
    }
}

// ───────────────────────────────────────────────────────────────
// Sliding window ring
// ───────────────────────────────────────────────────────────────

struct Ring<T, const N: usize> {
    items: Deque<T, N>,
    /// Set by the push that fills the ring, cleared by any receive. Tracked
    /// under the same lock as `items` so the check-then-push is atomic.
    full: bool,
}

/// Ring of the most recent `N` values with drop-oldest eviction.
pub struct SlidingWindow<T, const N: usize> {
    ring: Mutex<CriticalSectionRawMutex, RefCell<Ring<T, N>>>,
}

impl<T: Copy, const N: usize> Default for SlidingWindow<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Copy, const N: usize> SlidingWindow<T, N> {
    pub const fn new() -> Self {
        Self {
            ring: Mutex::new(RefCell::new(Ring {
                items: Deque::new(),
                full: false,
            })),
        }
    }

    /// Append `value`, evicting the oldest entry if the window is full.
    /// Returns the evicted value. Never blocks.
    pub fn push(&self, value: T) -> Option<T> {
        self.ring.lock(|cell| {
            let mut ring = cell.borrow_mut();
            let evicted = if ring.full { ring.items.pop_front() } else { None };
            // Cannot fail: a full ring was just made one shorter.
            let _ = ring.items.push_back(value);
            ring.full = ring.items.len() == N;
            evicted
        })
    }

    /// Most recent value, left in place.
    pub fn peek_latest(&self) -> Option<T> {
        self.ring.lock(|cell| cell.borrow().items.back().copied())
    }

    /// Remove every value, oldest first. This is the destructive read;
    /// values taken here are never seen again by any reader.
    pub fn drain(&self) -> Vec<T, N> {
        self.ring.lock(|cell| {
            let mut ring = cell.borrow_mut();
            let mut out = Vec::new();
            while let Some(v) = ring.items.pop_front() {
                // Cannot fail: `out` has the ring's capacity.
                let _ = out.push(v);
            }
            ring.full = false;
            out
        })
    }

    /// Copy of the current contents, oldest first.
    pub fn contents(&self) -> Vec<T, N> {
        self.ring
            .lock(|cell| cell.borrow().items.iter().copied().collect())
    }

    pub fn len(&self) -> usize {
        self.ring.lock(|cell| cell.borrow().items.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_full(&self) -> bool {
        self.ring.lock(|cell| cell.borrow().full)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn overwrite_keeps_only_the_last_value() {
        let ch = OverwriteChannel::new();
        for v in [1, 2, 3] {
            ch.publish(v);
        }
        assert_eq!(ch.try_receive(), Some(3));
        assert_eq!(ch.try_receive(), None);
    }

    #[test]
    fn overwrite_receive_times_out_when_empty() {
        let ch: OverwriteChannel<u8> = OverwriteChannel::new();
        assert_eq!(ch.receive(Duration::from_millis(2)), None);
        assert!(!ch.is_pending());
    }

    #[test]
    fn overwrite_receive_sees_a_late_publish() {
        let ch = Arc::new(OverwriteChannel::new());
        let producer = {
            let ch = Arc::clone(&ch);
            std::thread::spawn(move || {
                std::thread::sleep(Duration::from_millis(5));
                ch.publish([1u16, 2, 3, 4]);
            })
        };
        assert_eq!(ch.receive(Duration::from_secs(2)), Some([1, 2, 3, 4]));
        producer.join().unwrap();
    }

    #[test]
    fn window_of_five_keeps_latest_five() {
        let w: SlidingWindow<u32, 5> = SlidingWindow::new();
        let evicted: std::vec::Vec<_> = (1..=7).filter_map(|v| w.push(v)).collect();
        assert_eq!(evicted, [1, 2]);
        assert_eq!(w.contents().as_slice(), &[3, 4, 5, 6, 7]);
        assert!(w.is_full());
    }

    #[test]
    fn peek_is_not_destructive() {
        let w: SlidingWindow<f64, 5> = SlidingWindow::new();
        w.push(1.0);
        w.push(2.0);
        assert_eq!(w.peek_latest(), Some(2.0));
        assert_eq!(w.peek_latest(), Some(2.0));
        assert_eq!(w.len(), 2);
    }

    #[test]
    fn drain_is_oldest_first_and_clears_fullness() {
        let w: SlidingWindow<u8, 3> = SlidingWindow::new();
        for v in 1..=4 {
            w.push(v);
        }
        assert!(w.is_full());
        assert_eq!(w.drain().as_slice(), &[2, 3, 4]);
        assert!(!w.is_full());

        // Not full any more: the next push appends without evicting.
        assert_eq!(w.push(5), None);
        assert_eq!(w.contents().as_slice(), &[5]);
    }

    #[test]
    fn drain_empties_the_window() {
        let w: SlidingWindow<u8, 5> = SlidingWindow::new();
        w.push(9);
        w.push(8);
        assert_eq!(w.drain().as_slice(), &[9, 8]);
        assert!(w.is_empty());
        assert!(w.drain().is_empty());
    }
}
