//! Shared linked-node core for every queue variant.
//!
//! The queue is a singly linked chain whose tail node is always an *empty
//! sentinel*. `push` writes the value into the current sentinel, allocates a
//! fresh sentinel behind it, and only then publishes the link, so a consumer
//! chasing `next` pointers can never observe a half-written value. The
//! original construction-order trick is expressed here with explicit
//! Release/Acquire ordering: the value write happens-before the `next` store,
//! and a consumer that loads a non-null `next` has acquired the value.

use std::cell::UnsafeCell;
use std::mem::MaybeUninit;
use std::ptr;
use std::sync::atomic::{AtomicPtr, AtomicUsize, Ordering};

struct Node<T> {
    value: UnsafeCell<MaybeUninit<T>>,
    next: AtomicPtr<Node<T>>,
}

impl<T> Node<T> {
    fn sentinel() -> *mut Node<T> {
        Box::into_raw(Box::new(Node {
            value: UnsafeCell::new(MaybeUninit::uninit()),
            next: AtomicPtr::new(ptr::null_mut()),
        }))
    }
}

/// The unsynchronized queue core.
///
/// # Safety contract
///
/// Callers must guarantee that at most one thread executes a producer-side
/// operation (`push`) at a time, and at most one thread executes a
/// consumer-side operation (`pop`/`front`) at a time. One producer and one
/// consumer may run concurrently. The variant wrappers uphold this either by
/// endpoint ownership (`spsc`), by locking one side (`mpsc`), or by locking
/// both (`mpmc`, `blocking`).
pub(crate) struct RawQueue<T> {
    /// Oldest unconsumed node; only the consumer side touches this.
    head: UnsafeCell<*mut Node<T>>,
    /// The empty sentinel; only the producer side touches this.
    tail: UnsafeCell<*mut Node<T>>,
    len: AtomicUsize,
}

unsafe impl<T: Send> Send for RawQueue<T> {}
unsafe impl<T: Send> Sync for RawQueue<T> {}

impl<T> RawQueue<T> {
    pub(crate) fn new() -> Self {
        let sentinel = Node::sentinel();
        RawQueue {
            head: UnsafeCell::new(sentinel),
            tail: UnsafeCell::new(sentinel),
            len: AtomicUsize::new(0),
        }
    }

    /// Append a value. Never blocks, never fails.
    ///
    /// # Safety
    ///
    /// At most one thread may be inside `push` at a time.
    pub(crate) unsafe fn push(&self, value: T) {
        let tail = *self.tail.get();
        (*(*tail).value.get()).write(value);
        let new_sentinel = Node::sentinel();
        // Publishes the value written above; pairs with the Acquire load in
        // pop/front.
        (*tail).next.store(new_sentinel, Ordering::Release);
        *self.tail.get() = new_sentinel;
        self.len.fetch_add(1, Ordering::Release);
    }

    /// Remove and return the oldest value, or `None` when empty.
    ///
    /// # Safety
    ///
    /// At most one thread may be inside `pop`/`front` at a time.
    pub(crate) unsafe fn pop(&self) -> Option<T> {
        let head = *self.head.get();
        let next = (*head).next.load(Ordering::Acquire);
        if next.is_null() {
            return None;
        }
        let value = (*(*head).value.get()).assume_init_read();
        *self.head.get() = next;
        drop(Box::from_raw(head));
        self.len.fetch_sub(1, Ordering::Release);
        Some(value)
    }

    /// Borrow the oldest value without removing it, or `None` when empty.
    ///
    /// # Safety
    ///
    /// Same contract as [`pop`](Self::pop); the returned reference is valid
    /// until the next consumer-side operation.
    pub(crate) unsafe fn front(&self) -> Option<&T> {
        let head = *self.head.get();
        let next = (*head).next.load(Ordering::Acquire);
        if next.is_null() {
            None
        } else {
            Some((*(*head).value.get()).assume_init_ref())
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.len.load(Ordering::Acquire)
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T> Drop for RawQueue<T> {
    fn drop(&mut self) {
        // &mut self: no concurrent access remains. Walk the chain dropping
        // every initialized value; the final node is the uninitialized
        // sentinel.
        unsafe {
            let mut node = *self.head.get();
            loop {
                let next = (*node).next.load(Ordering::Relaxed);
                if next.is_null() {
                    drop(Box::from_raw(node));
                    break;
                }
                (*(*node).value.get()).assume_init_drop();
                drop(Box::from_raw(node));
                node = next;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fifo_and_len() {
        let q = RawQueue::new();
        unsafe {
            for i in 0..100 {
                q.push(i);
            }
            assert_eq!(q.len(), 100);
            assert_eq!(q.front(), Some(&0));
            for i in 0..100 {
                assert_eq!(q.pop(), Some(i));
            }
            assert_eq!(q.pop(), None::<i32>);
        }
        assert_eq!(q.len(), 0);
    }

    #[test]
    fn test_drop_releases_pending_values() {
        let q = RawQueue::new();
        unsafe {
            for i in 0..10 {
                q.push(vec![i; 8]);
            }
        }
        drop(q); // must not leak the 10 pending vectors
    }
}
