//! Deferred task removal
//!
//! Removing a task happens in two steps: marking records which task is
//! about to go (so a view can show it fading out), and committing, which
//! runs after [`REMOVAL_DELAY`] and actually removes it. Scheduling the
//! commit is up to the front end.

use std::time::{Duration, Instant};

use crate::task::TaskId;

/// Delay between marking a task for removal and committing the removal
pub const REMOVAL_DELAY: Duration = Duration::from_millis(300);

/// A removal that has been requested but not yet committed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingRemoval {
    task: TaskId,
    requested_at: Instant,
}

impl PendingRemoval {
    pub(crate) fn new(task: TaskId) -> Self {
        Self {
            task,
            requested_at: Instant::now(),
        }
    }

    /// The task this removal targets
    pub fn task(&self) -> TaskId {
        self.task
    }

    /// When the commit is due for the given delay
    pub fn due_at(&self, delay: Duration) -> Instant {
        self.requested_at + delay
    }
}
