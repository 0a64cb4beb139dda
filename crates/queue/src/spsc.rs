//! Lock-free single-producer/single-consumer queue.
//!
//! [`queue`] returns split [`Producer`]/[`Consumer`] endpoints so the
//! single-writer/single-reader contract is enforced by ownership rather than
//! by caller discipline: neither endpoint is `Clone` or `Sync`, and the
//! mutating operations take `&mut self`. Correctness then reduces to the
//! publish ordering inside the shared node core.

use crate::raw::RawQueue;
use std::cell::Cell;
use std::marker::PhantomData;
use std::sync::Arc;

/// Create a new queue, returning its two endpoints.
///
/// Either endpoint may be sent to another thread. Values pushed through the
/// producer come out of the consumer in FIFO order.
pub fn queue<T: Send>() -> (Producer<T>, Consumer<T>) {
    let raw = Arc::new(RawQueue::new());
    (
        Producer {
            raw: Arc::clone(&raw),
            _not_sync: PhantomData,
        },
        Consumer {
            raw,
            _not_sync: PhantomData,
        },
    )
}

/// The producing endpoint. Exactly one exists per queue.
pub struct Producer<T> {
    raw: Arc<RawQueue<T>>,
    // Cell<()> keeps the endpoint !Sync so a shared reference cannot be used
    // to push from two threads at once.
    _not_sync: PhantomData<Cell<()>>,
}

impl<T: Send> Producer<T> {
    /// Append a value. Never blocks, never fails.
    pub fn push(&mut self, value: T) {
        // Sound: &mut self makes this the only producer-side access.
        unsafe { self.raw.push(value) }
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

/// The consuming endpoint. Exactly one exists per queue.
pub struct Consumer<T> {
    raw: Arc<RawQueue<T>>,
    _not_sync: PhantomData<Cell<()>>,
}

impl<T: Send> Consumer<T> {
    /// Remove and return the oldest value.
    ///
    /// # Panics
    ///
    /// Panics if the queue is empty: a pop on an empty non-blocking queue is
    /// a programming error, not a recoverable condition. Use
    /// [`try_pop`](Self::try_pop) to branch on emptiness.
    pub fn pop(&mut self) -> T {
        self.try_pop().expect("pop on empty spsc queue")
    }

    /// Remove and return the oldest value, or `None` when empty.
    pub fn try_pop(&mut self) -> Option<T> {
        unsafe { self.raw.pop() }
    }

    /// Borrow the oldest value without removing it.
    ///
    /// # Panics
    ///
    /// Panics if the queue is empty, like [`pop`](Self::pop).
    pub fn front(&self) -> &T {
        // Sound: front is the only consumer-side op reachable through &self,
        // and concurrent fronts from one thread are plain reads.
        unsafe { self.raw.front() }.expect("front on empty spsc queue")
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

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_fifo_same_thread() {
        let (mut tx, mut rx) = queue();
        for i in 0..1000 {
            tx.push(i);
        }
        assert_eq!(rx.len(), 1000);
        assert_eq!(*rx.front(), 0);
        for i in 0..1000 {
            assert_eq!(rx.pop(), i);
        }
        assert!(rx.is_empty());
        assert_eq!(tx.len(), 0);
    }

    #[test]
    fn test_fifo_across_threads() {
        let (mut tx, mut rx) = queue();
        let producer = thread::spawn(move || {
            for i in 0..10_000u64 {
                tx.push(i);
            }
        });
        let mut expected = 0u64;
        while expected < 10_000 {
            if let Some(v) = rx.try_pop() {
                assert_eq!(v, expected);
                expected += 1;
            } else {
                thread::yield_now();
            }
        }
        producer.join().unwrap();
        assert!(rx.is_empty());
    }

    #[test]
    #[should_panic(expected = "pop on empty spsc queue")]
    fn test_pop_empty_panics() {
        let (_tx, mut rx) = queue::<u32>();
        rx.pop();
    }

    #[test]
    #[should_panic(expected = "front on empty spsc queue")]
    fn test_front_empty_panics() {
        let (_tx, rx) = queue::<u32>();
        rx.front();
    }
}
