//! Multi-producer/single-consumer queue.
//!
//! Identical node algorithm to [`spsc`](crate::spsc), but the tail-mutation
//! sequence runs under a mutex so concurrent producers cannot race on the
//! sentinel. The consumer side remains lock-free: draining never contends
//! with producers beyond the atomic link loads.

use crate::raw::RawQueue;
use parking_lot::Mutex;
use std::cell::Cell;
use std::marker::PhantomData;
use std::sync::Arc;

struct Shared<T> {
    raw: RawQueue<T>,
    push_lock: Mutex<()>,
}

/// Create a new queue, returning a cloneable producer and the sole consumer.
pub fn queue<T: Send>() -> (Producer<T>, Consumer<T>) {
    let shared = Arc::new(Shared {
        raw: RawQueue::new(),
        push_lock: Mutex::new(()),
    });
    (
        Producer {
            shared: Arc::clone(&shared),
        },
        Consumer {
            shared,
            _not_sync: PhantomData,
        },
    )
}

/// A producing endpoint; clone one per producing thread.
pub struct Producer<T> {
    shared: Arc<Shared<T>>,
}

impl<T> Clone for Producer<T> {
    fn clone(&self) -> Self {
        Producer {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T: Send> Producer<T> {
    /// Append a value. Never fails; only ever waits on other producers
    /// mid-push, never on the consumer.
    pub fn push(&self, value: T) {
        let _guard = self.shared.push_lock.lock();
        // Sound: the lock serializes all producer-side access.
        unsafe { self.shared.raw.push(value) }
    }

    /// Number of values currently queued.
    pub fn len(&self) -> usize {
        self.shared.raw.len()
    }

    /// Whether the queue is currently empty.
    pub fn is_empty(&self) -> bool {
        self.shared.raw.is_empty()
    }
}

/// The consuming endpoint. Exactly one exists per queue.
pub struct Consumer<T> {
    shared: Arc<Shared<T>>,
    _not_sync: PhantomData<Cell<()>>,
}

impl<T: Send> Consumer<T> {
    /// Remove and return the oldest value.
    ///
    /// # Panics
    ///
    /// Panics if the queue is empty; use [`try_pop`](Self::try_pop) to
    /// branch on emptiness.
    pub fn pop(&mut self) -> T {
        self.try_pop().expect("pop on empty mpsc queue")
    }

    /// Remove and return the oldest value, or `None` when empty.
    pub fn try_pop(&mut self) -> Option<T> {
        unsafe { self.shared.raw.pop() }
    }

    /// Borrow the oldest value without removing it.
    ///
    /// # Panics
    ///
    /// Panics if the queue is empty.
    pub fn front(&self) -> &T {
        unsafe { self.shared.raw.front() }.expect("front on empty mpsc queue")
    }

    /// Number of values currently queued.
    pub fn len(&self) -> usize {
        self.shared.raw.len()
    }

    /// Whether the queue is currently empty.
    pub fn is_empty(&self) -> bool {
        self.shared.raw.is_empty()
    }
}
