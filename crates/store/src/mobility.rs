//! Buffer of mobility changes awaiting their effect time.
//!
//! External modules command position or speed changes "now", but the effect
//! belongs at a simulated time that may still be in the future. The buffer
//! keeps not-yet-applied changes in time order so the simulator can drain
//! exactly those that have come due.

use simbridge_types::{NodeId, SimTime};
use std::collections::VecDeque;

/// One pending mobility change for a simulated node.
#[derive(Debug, Clone, PartialEq)]
pub struct MobilityChange {
    /// Simulated time at which the change takes effect.
    pub time: SimTime,
    /// The node being moved.
    pub node: NodeId,
    /// Target position (x, y, z) in simulator coordinates.
    pub position: [f64; 3],
    /// Target orientation (azimuth, elevation) in degrees.
    pub orientation: [f64; 2],
    /// Speed in meters per second.
    pub speed: f64,
}

/// Time-ordered buffer of pending [`MobilityChange`]s.
///
/// Insertion keeps the buffer sorted by effect time; changes scheduled for
/// the same time drain in the order they were scheduled. The backing storage
/// retains its capacity across schedule/drain cycles, so steady-state churn
/// does not allocate. Not thread-safe; see the crate docs.
#[derive(Debug, Default)]
pub struct MobilityBuffer {
    pending: VecDeque<MobilityChange>,
}

impl MobilityBuffer {
    /// Create an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a change at its time-ordered position (stable for equal times).
    pub fn schedule(&mut self, change: MobilityChange) {
        let at = self.pending.partition_point(|c| c.time <= change.time);
        self.pending.insert(at, change);
    }

    /// Effect time of the earliest pending change, if any.
    pub fn next_time(&self) -> Option<SimTime> {
        self.pending.front().map(|c| c.time)
    }

    /// Remove and return every change due at or before `now`, in time order.
    pub fn drain_due(&mut self, now: SimTime) -> Vec<MobilityChange> {
        let mut due = Vec::new();
        while self.pending.front().is_some_and(|c| c.time <= now) {
            due.push(self.pending.pop_front().expect("checked front"));
        }
        due
    }

    /// Number of pending changes.
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Whether no changes are pending.
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
