//! Real-time pacing with lookahead.

use simbridge_types::SimTime;
use std::time::{Duration, Instant};
use tracing::debug;

/// Maps wall-clock time onto simulated time for real-time-managed runs.
///
/// An interface that needs the simulator paced against the outside world
/// enables the pacer with a *lookahead*: the maximum distance simulated time
/// may run ahead of wall-derived external time before the core should block
/// and resynchronize. Lookahead may be changed mid-run.
///
/// Pausing freezes the wall↔simulated mapping: the wall-clock delta
/// accumulated while paused is excluded from every subsequent external-time
/// query, so paced interfaces never perceive a time jump across a pause.
#[derive(Debug)]
pub struct RealTimePacer {
    enabled: bool,
    lookahead: SimTime,
    /// Wall-clock origin of simulated time zero. Set on first enable.
    started: Option<Instant>,
    /// When the current pause began, if paused.
    paused_at: Option<Instant>,
    /// Total wall time spent paused so far.
    paused_total: Duration,
}

impl RealTimePacer {
    /// Create a disabled pacer.
    pub fn new() -> Self {
        RealTimePacer {
            enabled: false,
            lookahead: SimTime::ZERO,
            started: None,
            paused_at: None,
            paused_total: Duration::ZERO,
        }
    }

    /// Enable real-time management with the given lookahead.
    ///
    /// The wall-clock origin is pinned on the first enable and survives
    /// later lookahead changes.
    pub fn enable(&mut self, lookahead: SimTime) {
        self.enabled = true;
        self.lookahead = lookahead;
        if self.started.is_none() {
            self.started = Some(Instant::now());
        }
        debug!(%lookahead, "real-time pacing enabled");
    }

    /// Whether real-time management is active.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Current lookahead.
    pub fn lookahead(&self) -> SimTime {
        self.lookahead
    }

    /// Change the lookahead mid-run.
    pub fn set_lookahead(&mut self, lookahead: SimTime) {
        self.lookahead = lookahead;
    }

    /// Freeze the wall↔simulated mapping. Idempotent.
    pub fn pause(&mut self) {
        if self.paused_at.is_none() {
            self.paused_at = Some(Instant::now());
        }
    }

    /// Unfreeze the mapping, excluding the paused interval from it.
    /// Idempotent.
    pub fn resume(&mut self) {
        if let Some(paused_at) = self.paused_at.take() {
            self.paused_total += paused_at.elapsed();
        }
    }

    /// Whether the pacer is currently paused.
    pub fn is_paused(&self) -> bool {
        self.paused_at.is_some()
    }

    /// Wall-derived external time, excluding paused intervals.
    ///
    /// Returns the unbounded sentinel while the pacer is disabled: a
    /// simulator with no real-time-managed interface may run as fast as it
    /// can.
    pub fn external_time(&self) -> SimTime {
        let Some(started) = self.started else {
            return SimTime::MAX;
        };
        if !self.enabled {
            return SimTime::MAX;
        }
        let now = self.paused_at.unwrap_or_else(Instant::now);
        let wall = now.duration_since(started).saturating_sub(self.paused_total);
        SimTime::from(wall)
    }

    /// How far simulated time currently leads external time (zero when
    /// behind or unpaced).
    pub fn ahead_of(&self, sim_now: SimTime) -> SimTime {
        let external = self.external_time();
        if external.is_unbounded() {
            SimTime::ZERO
        } else {
            sim_now.saturating_sub(external)
        }
    }

    /// Wall-clock wait required before the simulator may advance to
    /// `sim_now` without exceeding the lookahead bound.
    ///
    /// Zero while `sim_now` is within `lookahead` of external time; when the
    /// simulator is further ahead, the excess that must elapse on the wall
    /// clock before resuming.
    pub fn required_wait(&self, sim_now: SimTime) -> Duration {
        let ahead = self.ahead_of(sim_now);
        ahead.saturating_sub(self.lookahead).to_duration()
    }
}

impl Default for RealTimePacer {
    fn default() -> Self {
        Self::new()
    }
}
