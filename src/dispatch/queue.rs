//! # Append buffer with atomic drain.
//!
//! [`Queue`] is the only shared mutable state between producers and the
//! dispatch loop. Producers append under a short critical section; the loop
//! swaps the whole buffer out in one step.
//!
//! ## Rules
//! - `push` never blocks on `drain` (and vice versa) beyond the lock itself;
//!   the lock is held only for an append or a swap, never across a sink call.
//! - `drain` returns exactly the elements pushed since the previous drain,
//!   in push order, and leaves the queue empty.
//! - No element is ever returned by more than one drain.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::debug;

use crate::config::{BufferPolicy, OverflowPolicy};

/// Thread-safe append buffer drained whole by the dispatch loop.
pub(crate) struct Queue<T> {
    items: Mutex<VecDeque<T>>,
    bound: Option<(usize, OverflowPolicy)>,
    dropped: AtomicU64,
}

impl<T> Queue<T> {
    /// Creates a queue with the given buffering mode.
    ///
    /// Bounded capacity is clamped to a minimum of 1.
    pub(crate) fn new(buffer: BufferPolicy) -> Self {
        let bound = match buffer {
            BufferPolicy::Unbounded => None,
            BufferPolicy::Bounded { capacity, overflow } => Some((capacity.max(1), overflow)),
        };
        Self {
            items: Mutex::new(VecDeque::new()),
            bound,
            dropped: AtomicU64::new(0),
        }
    }

    /// Appends one event to the tail.
    ///
    /// Unbounded queues always accept. Bounded queues at capacity apply the
    /// overflow policy: `DropOldest` evicts the head, `DropNewest` discards
    /// `item`. Either way the drop is counted.
    pub(crate) fn push(&self, item: T) {
        let mut items = self.items.lock().expect("queue lock poisoned");
        if let Some((capacity, overflow)) = self.bound {
            if items.len() >= capacity {
                match overflow {
                    OverflowPolicy::DropOldest => {
                        items.pop_front();
                        items.push_back(item);
                    }
                    OverflowPolicy::DropNewest => {}
                }
                drop(items);
                let total = self.dropped.fetch_add(1, Ordering::Relaxed) + 1;
                debug!(capacity, total_dropped = total, "queue full, event dropped");
                return;
            }
        }
        items.push_back(item);
    }

    /// Captures and clears the current contents.
    ///
    /// Returns an empty vec when nothing was pushed since the last drain.
    pub(crate) fn drain(&self) -> Vec<T> {
        let mut items = self.items.lock().expect("queue lock poisoned");
        std::mem::take(&mut *items).into()
    }

    /// Number of events dropped due to a bounded buffer overflowing.
    #[allow(dead_code)]
    pub(crate) fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.items.lock().expect("queue lock poisoned").len()
    }
}
