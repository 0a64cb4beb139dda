//! Thread-safe queues for handing values between the simulator core thread
//! and external interface threads.
//!
//! Four variants share one linked-node layout (see [`raw`]) and trade safety
//! for throughput:
//!
//! - [`spsc`]: lock-free single-producer/single-consumer endpoints. The
//!   single-writer/single-reader contract is enforced by ownership of the
//!   [`spsc::Producer`]/[`spsc::Consumer`] halves.
//! - [`mpsc`]: same algorithm with the producer side serialized by a mutex;
//!   the consumer side stays lock-free. Producers are `Clone`.
//! - [`mpmc`]: fully locked; any thread may push or pop.
//! - [`blocking`]: layered on the multi-producer algorithm; `pop`/`front`
//!   sleep on a condition variable when empty, and [`blocking::BlockingQueue::signal`]
//!   wakes blocked consumers without delivering a value. This is the designed
//!   mechanism for unblocking a consumer at interface shutdown.
//!
//! # Contract (all variants)
//!
//! - `push` never blocks and never fails.
//! - `pop`/`front` on an empty *non-blocking* queue is a precondition
//!   violation and panics; use the `try_` variants to branch on emptiness.
//! - FIFO order of pushes is preserved for pops within one queue. No ordering
//!   is guaranteed across queues or against other shared structures.
//! - `len()` always equals pushes minus pops since construction.

mod raw;

pub mod blocking;
pub mod mpmc;
pub mod mpsc;
pub mod spsc;

pub use blocking::{BlockingQueue, Wakeup};
pub use mpmc::MpmcQueue;
