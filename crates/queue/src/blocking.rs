//! Blocking queue with signal-based cancellation.
//!
//! `pop`/`front` sleep on a condition variable while the queue is empty.
//! [`BlockingQueue::signal`] wakes every blocked consumer *without*
//! delivering a value; the waiter observes [`Wakeup::Signalled`] and must not
//! expect data. This is the designed shutdown path: signal every blocking
//! queue an interface thread might be waiting on, then join the thread.
//!
//! A signal epoch counter (rather than a one-shot flag) guarantees that all
//! consumers blocked at the moment of the signal wake as signalled, even when
//! several are waiting on the same queue.
//!
//! `signal` is deliberately one-shot: a consumer that arrives after it is
//! unaffected. When the producer side is shutting down for good, use
//! [`BlockingQueue::close`] instead; closing is sticky, so a consumer that
//! was mid-item when the queue closed still observes [`Wakeup::Signalled`]
//! on its next empty `pop`/`front` rather than blocking forever.

use crate::raw::RawQueue;
use parking_lot::{Condvar, Mutex};

/// Result of a blocking `pop`/`front`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wakeup<T> {
    /// A value was dequeued (or, for `front`, observed).
    Value(T),
    /// The waiter was woken by [`BlockingQueue::signal`]; no value was
    /// delivered and none should be inferred.
    Signalled,
}

impl<T> Wakeup<T> {
    /// The delivered value, or `None` for a signalled wakeup.
    pub fn value(self) -> Option<T> {
        match self {
            Wakeup::Value(v) => Some(v),
            Wakeup::Signalled => None,
        }
    }

    /// Whether this wakeup came from `signal()` rather than a push.
    pub fn is_signalled(&self) -> bool {
        matches!(self, Wakeup::Signalled)
    }
}

struct State<T> {
    raw: RawQueue<T>,
    signal_epoch: u64,
    closed: bool,
}

/// A multi-producer queue whose consumers block while it is empty.
pub struct BlockingQueue<T> {
    state: Mutex<State<T>>,
    available: Condvar,
}

impl<T: Send> BlockingQueue<T> {
    /// Create an empty queue.
    pub fn new() -> Self {
        BlockingQueue {
            state: Mutex::new(State {
                raw: RawQueue::new(),
                signal_epoch: 0,
                closed: false,
            }),
            available: Condvar::new(),
        }
    }

    /// Append a value and wake one blocked consumer. Never fails.
    pub fn push(&self, value: T) {
        {
            let state = self.state.lock();
            unsafe { state.raw.push(value) }
        }
        self.available.notify_one();
    }

    /// Remove and return the oldest value, blocking while the queue is empty.
    ///
    /// Returns [`Wakeup::Signalled`] when woken by [`signal`](Self::signal)
    /// instead of a push, or whenever the queue is empty and
    /// [`close`](Self::close)d.
    pub fn pop(&self) -> Wakeup<T> {
        let mut state = self.state.lock();
        let entered = state.signal_epoch;
        loop {
            if state.signal_epoch != entered {
                return Wakeup::Signalled;
            }
            if let Some(value) = unsafe { state.raw.pop() } {
                return Wakeup::Value(value);
            }
            if state.closed {
                return Wakeup::Signalled;
            }
            self.available.wait(&mut state);
        }
    }

    /// Clone the oldest value without removing it, blocking while empty.
    ///
    /// Returns [`Wakeup::Signalled`] when woken by [`signal`](Self::signal).
    pub fn front(&self) -> Wakeup<T>
    where
        T: Clone,
    {
        let mut state = self.state.lock();
        let entered = state.signal_epoch;
        loop {
            if state.signal_epoch != entered {
                return Wakeup::Signalled;
            }
            if let Some(value) = unsafe { state.raw.front() } {
                return Wakeup::Value(value.clone());
            }
            if state.closed {
                return Wakeup::Signalled;
            }
            self.available.wait(&mut state);
        }
    }

    /// Remove and return the oldest value without blocking.
    pub fn try_pop(&self) -> Option<T> {
        let state = self.state.lock();
        unsafe { state.raw.pop() }
    }

    /// Wake every consumer currently blocked in `pop`/`front` without
    /// delivering a value.
    ///
    /// Consumers that arrive after the signal are unaffected.
    pub fn signal(&self) {
        {
            let mut state = self.state.lock();
            state.signal_epoch += 1;
        }
        self.available.notify_all();
    }

    /// Permanently mark the queue closed and wake every blocked consumer.
    ///
    /// Values already queued still pop normally; once the queue is empty,
    /// every `pop`/`front` returns [`Wakeup::Signalled`] immediately instead
    /// of blocking. Unlike [`signal`](Self::signal) this is sticky, so a
    /// consumer that was busy processing an item when the queue closed
    /// cannot block forever on its next call.
    pub fn close(&self) {
        {
            let mut state = self.state.lock();
            state.closed = true;
        }
        self.available.notify_all();
    }

    /// Number of values currently queued.
    pub fn len(&self) -> usize {
        self.state.lock().raw.len()
    }

    /// Whether the queue is currently empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: Send> Default for BlockingQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}
