//! One-to-many notification with "latest value wins" delivery.
//!
//! Each consumer task owns a [`Mailbox`]: a single pending-notification
//! slot. A producer holds a [`Broadcast`] built from the consumers' handles
//! and overwrites every slot on [`notify`](Broadcast::notify). A consumer
//! that has not read the previous notification loses it. There is no
//! backlog and no ordering beyond "most recent wins".
//!
//! ```text
//!  classifier ──notify(v)──┬──▶ [slot A] ──try_receive──▶ visualiser
//!                          └──▶ [slot B] ──try_receive──▶ ...
//! ```
//!
//! Handles must exist before the producer is built: `Broadcast::new`
//! rejects an empty consumer list, so a notifier can never run with a
//! dangling target.

use core::time::Duration;
use std::sync::Arc;

use heapless::Vec;

use super::channel::OverwriteChannel;
use crate::error::{ConfigFault, Result};
use crate::tasks::TaskId;

/// Upper bound on consumers per broadcast.
pub const MAX_CONSUMERS: usize = 4;

/// A consumer's pending-notification slot.
pub struct Mailbox<T> {
    owner: TaskId,
    slot: OverwriteChannel<T>,
}

/// Shared handle to a consumer's mailbox.
pub type MailboxHandle<T> = Arc<Mailbox<T>>;

impl<T: Send> Mailbox<T> {
    /// Create the mailbox for `owner` and return its handle.
    pub fn new(owner: TaskId) -> MailboxHandle<T> {
        Arc::new(Self {
            owner,
            slot: OverwriteChannel::new(),
        })
    }

    /// Task that reads this mailbox.
    pub fn owner(&self) -> TaskId {
        self.owner
    }

    /// Read-and-clear the pending notification, waiting up to `timeout`.
    pub fn try_receive(&self, timeout: Duration) -> Option<T> {
        self.slot.receive(timeout)
    }

    fn deliver(&self, value: T) {
        self.slot.publish(value);
    }
}

/// Producer side: the fixed set of consumers a notifier writes to.
pub struct Broadcast<T> {
    consumers: Vec<MailboxHandle<T>, MAX_CONSUMERS>,
}

impl<T: Copy + Send> Broadcast<T> {
    /// Build from already-created consumer handles.
    pub fn new(consumers: &[MailboxHandle<T>]) -> Result<Self> {
        if consumers.is_empty() {
            return Err(ConfigFault::MissingConsumers.into());
        }
        let consumers =
            Vec::from_slice(consumers).map_err(|()| ConfigFault::TooManyConsumers)?;
        Ok(Self { consumers })
    }

    /// Overwrite every consumer's slot with `value`.
    pub fn notify(&self, value: T) {
        for mailbox in &self.consumers {
            mailbox.deliver(value);
        }
    }

    pub fn consumers(&self) -> impl Iterator<Item = TaskId> + '_ {
        self.consumers.iter().map(|m| m.owner())
    }
}
