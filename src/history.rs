//! Bounded, drop-oldest history buffers.
//!
//! `BoundedHistory` backs the request log and the CPU/memory sample
//! histories. New entries go to the front; once the buffer is full the
//! oldest entry at the tail is evicted. Snapshots are copies taken under the
//! same lock as appends, so readers never see a partially applied append.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Default capacity of the request log buffer.
pub const DEFAULT_LOG_CAPACITY: usize = 120;

/// Default capacity of the CPU and memory history buffers.
pub const DEFAULT_HISTORY_CAPACITY: usize = 60;

/// Fixed-capacity history, most-recent-first.
#[derive(Debug)]
pub struct BoundedHistory<T> {
    capacity: usize,
    entries: Mutex<VecDeque<T>>,
}

impl<T: Clone> BoundedHistory<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: Mutex::new(VecDeque::with_capacity(capacity)),
        }
    }

    /// Inserts `item` at the front, evicting the oldest entry when full.
    pub fn push(&self, item: T) {
        if self.capacity == 0 {
            return;
        }
        let mut entries = self.lock();
        if entries.len() >= self.capacity {
            entries.pop_back();
        }
        entries.push_front(item);
    }

    /// Returns a copy of the buffer, most recent entry first.
    pub fn snapshot(&self) -> Vec<T> {
        self.lock().iter().cloned().collect()
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.lock().len()
    }

    #[cfg(test)]
    fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    // A panic while holding the lock cannot leave the deque half-updated
    // (push/pop are single operations), so poisoning is ignored.
    fn lock(&self) -> MutexGuard<'_, VecDeque<T>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
