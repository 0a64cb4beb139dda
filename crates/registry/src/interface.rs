//! Per-interface records: registration metadata, timing state, and the
//! cloneable control handle handed to handler hooks.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use bitflags::bitflags;
use parking_lot::Mutex;
use simbridge_pacing::CpuTimer;
use simbridge_queue::mpsc;
use simbridge_types::{InterfaceId, NodeId, SimTime};

use crate::driver::DriverSet;
use crate::handler::InterfaceHandler;

bitflags! {
    /// Performance hints declared at registration time.
    pub struct PerfFlags: u32 {
        /// The interface burns CPU while polling; the core may yield less
        /// aggressively around it.
        const CPU_HOG = 0b0001;
        /// Run the interface on dedicated driver threads.
        const THREADED = 0b0010;
        /// One driver thread multiplexes non-blocking receive and forward.
        const THREADED_SINGLE = Self::THREADED.bits | 0b0100;
        /// Separate receive and forward threads; receive may block briefly.
        const THREADED_MULTI = Self::THREADED.bits | 0b1000;
    }
}

/// Broad classification of an interface, for logging and tooling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterfaceKind {
    Socket,
    Animation,
    Proxy,
    ScenarioPlayer,
    Custom,
}

/// A message an interface injects toward the simulation core. Drained on the
/// core thread via `InterfaceList::drain_deliveries`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    /// Target node, or `None` for partition-wide messages.
    pub node: Option<NodeId>,
    pub data: Vec<u8>,
}

/// Handle given to every handler hook. Cheap to clone; safe to move onto
/// driver threads.
#[derive(Clone)]
pub struct InterfaceCtl {
    id: InterfaceId,
    name: Arc<str>,
    sim_now: Arc<AtomicI64>,
    delivery: mpsc::Producer<Delivery>,
}

impl InterfaceCtl {
    pub(crate) fn new(
        id: InterfaceId,
        name: Arc<str>,
        sim_now: Arc<AtomicI64>,
        delivery: mpsc::Producer<Delivery>,
    ) -> Self {
        Self { id, name, sim_now, delivery }
    }

    pub fn id(&self) -> InterfaceId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Snapshot of the simulation clock as of the last `set_time` call.
    pub fn sim_time(&self) -> SimTime {
        SimTime::from_nanos(self.sim_now.load(Ordering::Acquire))
    }

    /// Queue a message for the simulation core. Never blocks.
    pub fn deliver(&self, delivery: Delivery) {
        self.delivery.push(delivery);
    }
}

/// Timing state tracked per interface by the dispatch loop.
#[derive(Debug, Clone)]
pub(crate) struct TimingState {
    pub initialize_time: SimTime,
    pub lookahead: SimTime,
    /// Last horizon the handler reported. `MAX` means unbounded, so the
    /// handler is never re-polled; `ZERO` forces a poll on the next pass.
    pub horizon: SimTime,
    pub last_receive: SimTime,
    pub min_receive_delay: SimTime,
}

impl Default for TimingState {
    fn default() -> Self {
        Self {
            initialize_time: SimTime::ZERO,
            lookahead: SimTime::ZERO,
            horizon: SimTime::ZERO,
            last_receive: SimTime::ZERO,
            min_receive_delay: SimTime::ZERO,
        }
    }
}

/// One registered external interface.
pub struct Interface {
    id: InterfaceId,
    name: Arc<str>,
    kind: InterfaceKind,
    flags: PerfFlags,
    pub(crate) timing: TimingState,
    /// Set through `InitControls`: skip receive dispatch while warming up.
    pub(crate) warmup_no_receive: bool,
    pub(crate) active: bool,
    pub(crate) cpu: CpuTimer,
    pub(crate) handler: Arc<Mutex<Box<dyn InterfaceHandler>>>,
    pub(crate) ctl: InterfaceCtl,
    pub(crate) deliveries: mpsc::Consumer<Delivery>,
    pub(crate) drivers: DriverSet,
}

impl Interface {
    pub(crate) fn new(
        id: InterfaceId,
        name: Arc<str>,
        kind: InterfaceKind,
        flags: PerfFlags,
        handler: Box<dyn InterfaceHandler>,
        sim_now: Arc<AtomicI64>,
    ) -> Self {
        let (tx, rx) = mpsc::queue();
        let ctl = InterfaceCtl::new(id, Arc::clone(&name), sim_now, tx);
        Self {
            id,
            name,
            kind,
            flags,
            timing: TimingState::default(),
            warmup_no_receive: false,
            active: true,
            cpu: CpuTimer::new(),
            handler: Arc::new(Mutex::new(handler)),
            ctl,
            deliveries: rx,
            drivers: DriverSet::idle(),
        }
    }

    pub fn id(&self) -> InterfaceId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> InterfaceKind {
        self.kind
    }

    pub fn flags(&self) -> PerfFlags {
        self.flags
    }

    /// False once the interface has been deactivated or finalized.
    pub fn is_active(&self) -> bool {
        self.active
    }
}
