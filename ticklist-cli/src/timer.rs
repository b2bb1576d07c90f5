//! Scheduled commit of pending removals
//!
//! A [`RemovalTimer`] sleeps until the removal is due and then sends it
//! back to the event loop that owns the store, so the commit runs on the
//! same loop as every other intent.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, sleep_until};
use ticklist_core::PendingRemoval;

pub struct RemovalTimer {
    pending: PendingRemoval,
    handle: JoinHandle<()>,
}

impl RemovalTimer {
    /// Fire `pending` into `due_tx` once `delay` has passed since it was requested
    pub fn schedule(
        pending: PendingRemoval,
        delay: Duration,
        due_tx: mpsc::UnboundedSender<PendingRemoval>,
    ) -> Self {
        let due = Instant::from_std(pending.due_at(delay));
        let handle = tokio::spawn(async move {
            sleep_until(due).await;
            // The loop may already be shutting down; it commits leftovers itself.
            let _ = due_tx.send(pending);
        });

        Self { pending, handle }
    }

    pub fn pending(&self) -> PendingRemoval {
        self.pending
    }

    /// Stop the timer and hand back the removal it was carrying
    pub fn cancel(self) -> PendingRemoval {
        self.handle.abort();
        self.pending
    }
}

/// Timers that have been scheduled and not yet committed
#[derive(Default)]
pub struct RemovalQueue {
    timers: Vec<RemovalTimer>,
}

impl RemovalQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, timer: RemovalTimer) {
        self.timers.push(timer);
    }

    /// Forget the timer that delivered `pending`
    pub fn settle(&mut self, pending: PendingRemoval) {
        self.timers.retain(|t| t.pending() != pending);
    }

    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }

    /// Cancel every timer, returning the removals in request order
    pub fn cancel_all(&mut self) -> Vec<PendingRemoval> {
        self.timers.drain(..).map(RemovalTimer::cancel).collect()
    }
}
