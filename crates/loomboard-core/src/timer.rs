//! Deadline-ordered task queue for cosmetic, non-geometric timers.
//!
//! Nothing here runs on its own: the owner feeds the current time in via
//! [`TaskQueue::drain_due`] and acts on the returned tasks.

use std::time::Duration;

// Use web_time for WASM compatibility
#[cfg(not(target_arch = "wasm32"))]
pub use std::time::Instant;
#[cfg(target_arch = "wasm32")]
pub use web_time::Instant;

/// Cancellation token for a scheduled task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskHandle(u64);

#[derive(Debug)]
struct Scheduled<T> {
    handle: TaskHandle,
    due: Instant,
    task: T,
}

/// Tasks waiting for their deadline.
#[derive(Debug)]
pub struct TaskQueue<T> {
    next_id: u64,
    scheduled: Vec<Scheduled<T>>,
}

impl<T> Default for TaskQueue<T> {
    fn default() -> Self {
        Self {
            next_id: 0,
            scheduled: Vec::new(),
        }
    }
}

impl<T> TaskQueue<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `task` to become due `delay` after `now`.
    pub fn schedule(&mut self, now: Instant, delay: Duration, task: T) -> TaskHandle {
        let handle = TaskHandle(self.next_id);
        self.next_id += 1;
        self.scheduled.push(Scheduled {
            handle,
            due: now + delay,
            task,
        });
        handle
    }

    /// Cancel a pending task. Returns false if it already ran or was cancelled.
    pub fn cancel(&mut self, handle: TaskHandle) -> bool {
        let before = self.scheduled.len();
        self.scheduled.retain(|s| s.handle != handle);
        self.scheduled.len() != before
    }

    /// Remove and return every task due at `now`, earliest first.
    pub fn drain_due(&mut self, now: Instant) -> Vec<T> {
        let (mut due, pending): (Vec<_>, Vec<_>) =
            self.scheduled.drain(..).partition(|s| s.due <= now);
        self.scheduled = pending;
        due.sort_by_key(|s| s.due);
        due.into_iter().map(|s| s.task).collect()
    }

    pub fn len(&self) -> usize {
        self.scheduled.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scheduled.is_empty()
    }
}
