//! Fully locked multi-producer/multi-consumer queue.
//!
//! Any thread may push or pop; both sides take a single mutex. Used where
//! more than one thread drains the same queue and the lock-free consumer
//! contract of the other variants cannot be upheld.

use crate::raw::RawQueue;
use parking_lot::Mutex;

/// A queue safe for any number of concurrent producers and consumers.
pub struct MpmcQueue<T> {
    raw: RawQueue<T>,
    lock: Mutex<()>,
}

impl<T: Send> MpmcQueue<T> {
    /// Create an empty queue.
    pub fn new() -> Self {
        MpmcQueue {
            raw: RawQueue::new(),
            lock: Mutex::new(()),
        }
    }

    /// Append a value. Never fails.
    pub fn push(&self, value: T) {
        let _guard = self.lock.lock();
        unsafe { self.raw.push(value) }
    }

    /// Remove and return the oldest value.
    ///
    /// # Panics
    ///
    /// Panics if the queue is empty; use [`try_pop`](Self::try_pop) to
    /// branch on emptiness.
    pub fn pop(&self) -> T {
        self.try_pop().expect("pop on empty mpmc queue")
    }

    /// Remove and return the oldest value, or `None` when empty.
    pub fn try_pop(&self) -> Option<T> {
        let _guard = self.lock.lock();
        unsafe { self.raw.pop() }
    }

    /// Number of values currently queued.
    pub fn len(&self) -> usize {
        self.raw.len()
    }

    /// Whether the queue is currently empty.
    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }
}

impl<T: Send + Clone> MpmcQueue<T> {
    /// Clone the oldest value without removing it.
    ///
    /// With multiple consumers a borrowed front could be invalidated by a
    /// concurrent pop, so this variant clones under the lock.
    ///
    /// # Panics
    ///
    /// Panics if the queue is empty.
    pub fn front(&self) -> T {
        let _guard = self.lock.lock();
        unsafe { self.raw.front() }
            .expect("front on empty mpmc queue")
            .clone()
    }
}

impl<T: Send> Default for MpmcQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}
