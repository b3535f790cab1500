//! Inter-task synchronisation primitives.
//!
//! ```text
//!  producers ──▶ ScalarStore (one lock, bounded wait) ──▶ logger
//!  sampler   ──▶ OverwriteChannel<AnalogueWindow>      ──▶ filter
//!  filter    ──▶ SlidingWindow<f64, 5>  ──peek──▶ classifier
//!                                       ──recv──▶ logger
//!  classifier ─▶ Broadcast ──▶ Mailbox (one per consumer) ──▶ visualiser
//! ```
//!
//! Every primitive is built on `embassy-sync` with a
//! `CriticalSectionRawMutex`, so the same code runs under FreeRTOS on the
//! target and on host threads in tests. No operation blocks indefinitely:
//! each wait carries an explicit budget, and a zero budget never sleeps.
//! No task holds one of these resources while waiting on another.

pub mod channel;
pub mod mailbox;
pub mod store;
mod wait;

pub use channel::{OverwriteChannel, SlidingWindow};
pub use mailbox::{Broadcast, Mailbox, MailboxHandle, MAX_CONSUMERS};
pub use store::{ScalarKind, ScalarSet, ScalarStore, ScalarValue};
