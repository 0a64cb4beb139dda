//! Warmup phase tracking.

use simbridge_types::SimTime;
use tracing::{debug, info};

/// Phase of the warmup state machine.
///
/// Transitions run strictly forward:
/// `NoWarmup → WaitingToBeginWarmup → PrintedWaitingToBeginWarmup → InWarmup
/// → OutOfWarmup`, with `OutOfWarmup` terminal. A run where no interface
/// requests warmup goes straight from `NoWarmup` to `OutOfWarmup`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarmupPhase {
    /// No interface has requested a warmup interval.
    NoWarmup,
    /// At least one requester has not yet called `begin_warmup`.
    WaitingToBeginWarmup,
    /// Still waiting, and the operator notice has been emitted.
    PrintedWaitingToBeginWarmup,
    /// All requesters are ready; warmup traffic is being buffered.
    InWarmup,
    /// Warmup complete (or never requested); live traffic admitted.
    OutOfWarmup,
}

/// Tracks warmup requests across every interface of one partition.
///
/// Warmup requests are only meaningful during the node-initialization window;
/// the registry opens and closes the window around the initialize-nodes
/// dispatch. Calls outside the window are advisory timing misuse, documented
/// as no-ops rather than errors.
#[derive(Debug)]
pub struct WarmupTracker {
    phase: WarmupPhase,
    /// Maximum warmup duration requested by any interface.
    duration: SimTime,
    /// Requesters that have not yet called `begin_warmup`.
    pending: u32,
    window_open: bool,
}

impl WarmupTracker {
    /// Create a tracker in `NoWarmup`.
    pub fn new() -> Self {
        WarmupTracker {
            phase: WarmupPhase::NoWarmup,
            duration: SimTime::ZERO,
            pending: 0,
            window_open: false,
        }
    }

    /// Current phase.
    pub fn phase(&self) -> WarmupPhase {
        self.phase
    }

    /// The maximum requested warmup duration.
    pub fn duration(&self) -> SimTime {
        self.duration
    }

    /// Whether warmup is requested or running (anything before
    /// `OutOfWarmup`, excluding `NoWarmup`). Interfaces electing
    /// receive-suppression skip their receive hook while this holds.
    pub fn is_warming(&self) -> bool {
        !matches!(self.phase, WarmupPhase::NoWarmup | WarmupPhase::OutOfWarmup)
    }

    /// Open the request window. Called by the registry before dispatching
    /// the initialize-nodes hooks.
    pub fn open_request_window(&mut self) {
        self.window_open = true;
    }

    /// Close the request window after initialize-nodes dispatch.
    pub fn close_request_window(&mut self) {
        self.window_open = false;
    }

    /// Request a warmup interval of at least `duration`.
    ///
    /// Raises the partition-wide warmup duration to the maximum requested and
    /// registers the caller as a pending requester. Outside the
    /// initialize-nodes window this is a no-op.
    pub fn set_warmup_time(&mut self, duration: SimTime) {
        if !self.window_open {
            debug!(%duration, "warmup request outside initialize-nodes window ignored");
            return;
        }
        self.pending += 1;
        if duration > self.duration {
            self.duration = duration;
        }
        if self.phase == WarmupPhase::NoWarmup {
            self.phase = WarmupPhase::WaitingToBeginWarmup;
        }
        debug!(%duration, pending = self.pending, "warmup interval requested");
    }

    /// Report one requester ready to begin warmup.
    ///
    /// The phase advances to `InWarmup` only once every requester has
    /// reported. Calling without a matching `set_warmup_time` is a no-op.
    pub fn begin_warmup(&mut self) {
        if self.pending == 0 {
            debug!("begin_warmup without a pending warmup request ignored");
            return;
        }
        self.pending -= 1;
        if self.pending == 0
            && matches!(
                self.phase,
                WarmupPhase::WaitingToBeginWarmup | WarmupPhase::PrintedWaitingToBeginWarmup
            )
        {
            info!(duration = %self.duration, "all interfaces ready, entering warmup");
            self.phase = WarmupPhase::InWarmup;
        }
    }

    /// Drive time-based transitions. Called by the registry as simulated
    /// time advances.
    pub fn advance(&mut self, sim_now: SimTime) {
        match self.phase {
            WarmupPhase::NoWarmup => {
                // Nothing requested by the end of initialization: terminal.
                if !self.window_open {
                    self.phase = WarmupPhase::OutOfWarmup;
                }
            }
            WarmupPhase::WaitingToBeginWarmup => {
                info!(
                    pending = self.pending,
                    "waiting for external interfaces to begin warmup"
                );
                self.phase = WarmupPhase::PrintedWaitingToBeginWarmup;
            }
            WarmupPhase::PrintedWaitingToBeginWarmup => {}
            WarmupPhase::InWarmup => {
                if sim_now > self.duration {
                    info!(%sim_now, "warmup complete");
                    self.phase = WarmupPhase::OutOfWarmup;
                }
            }
            WarmupPhase::OutOfWarmup => {}
        }
    }
}

impl Default for WarmupTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_requests_goes_straight_out() {
        let mut tracker = WarmupTracker::new();
        tracker.open_request_window();
        tracker.close_request_window();
        tracker.advance(SimTime::ZERO);
        assert_eq!(tracker.phase(), WarmupPhase::OutOfWarmup);
        assert!(!tracker.is_warming());
    }

    #[test]
    fn test_all_requesters_must_begin() {
        let mut tracker = WarmupTracker::new();
        tracker.open_request_window();
        tracker.set_warmup_time(SimTime::from_secs(10));
        tracker.set_warmup_time(SimTime::from_secs(30));
        tracker.close_request_window();
        assert_eq!(tracker.duration(), SimTime::from_secs(30));
        assert_eq!(tracker.phase(), WarmupPhase::WaitingToBeginWarmup);

        tracker.begin_warmup();
        // One of two requesters ready: still waiting.
        assert_ne!(tracker.phase(), WarmupPhase::InWarmup);
        tracker.advance(SimTime::ZERO);
        assert_eq!(tracker.phase(), WarmupPhase::PrintedWaitingToBeginWarmup);

        tracker.begin_warmup();
        assert_eq!(tracker.phase(), WarmupPhase::InWarmup);
    }

    #[test]
    fn test_warmup_ends_after_duration() {
        let mut tracker = WarmupTracker::new();
        tracker.open_request_window();
        tracker.set_warmup_time(SimTime::from_secs(5));
        tracker.close_request_window();
        tracker.begin_warmup();
        assert!(tracker.is_warming());

        tracker.advance(SimTime::from_secs(5));
        assert_eq!(tracker.phase(), WarmupPhase::InWarmup);
        tracker.advance(SimTime::from_nanos(5_000_000_001));
        assert_eq!(tracker.phase(), WarmupPhase::OutOfWarmup);
    }

    #[test]
    fn test_request_outside_window_is_noop() {
        let mut tracker = WarmupTracker::new();
        tracker.set_warmup_time(SimTime::from_secs(5));
        assert_eq!(tracker.phase(), WarmupPhase::NoWarmup);
        tracker.begin_warmup();
        assert_eq!(tracker.phase(), WarmupPhase::NoWarmup);
    }
}
