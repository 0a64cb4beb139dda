//! The interface registry and its dispatch loop.
//!
//! `InterfaceList` owns every registered interface plus the partition-wide
//! warmup tracker and real-time pacer. All methods here run on the
//! simulation thread; driver threads touch only the handler mutex, the
//! forward queue, and the delivery queue.

use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use simbridge_pacing::{RealTimePacer, WarmupPhase, WarmupTracker};
use simbridge_types::{BridgeError, Config, InterfaceId, NodeId, PartitionId, SimTime};
use tracing::{debug, info, warn};

use crate::driver::{self, ForwardItem};
use crate::handler::InterfaceHandler;
use crate::interface::{Delivery, Interface, InterfaceKind, PerfFlags};

/// Controls available to a handler only inside its `initialize_nodes` hook.
/// Warmup requests made anywhere else are ignored.
pub struct InitControls<'a> {
    pub(crate) warmup: &'a mut WarmupTracker,
    pub(crate) pacer: &'a mut RealTimePacer,
    pub(crate) iface: &'a mut Interface,
}

impl InitControls<'_> {
    /// Request at least `duration` of warmup before real simulation starts.
    /// The longest request across all interfaces wins.
    pub fn set_warmup_time(&mut self, duration: SimTime) {
        self.warmup.set_warmup_time(duration);
    }

    /// Report that this interface is ready for warmup to begin. Warmup
    /// starts once every requester has reported in.
    pub fn begin_warmup(&mut self) {
        self.warmup.begin_warmup();
    }

    /// Skip this interface's receive dispatch while warmup is in progress.
    pub fn suppress_receive_during_warmup(&mut self) {
        self.iface.warmup_no_receive = true;
    }

    /// Pin the simulation clock to wall-clock time, letting it run at most
    /// `lookahead` ahead of real time.
    pub fn request_realtime(&mut self, lookahead: SimTime) {
        self.iface.timing.lookahead = lookahead;
        self.pacer.enable(lookahead);
    }

    /// Throttle receive dispatch to at most once per `delay` of sim time.
    pub fn set_min_receive_delay(&mut self, delay: SimTime) {
        self.iface.timing.min_receive_delay = delay;
    }
}

/// Registry of external interfaces for one simulation partition.
pub struct InterfaceList {
    partition: PartitionId,
    interfaces: Vec<Interface>,
    active: bool,
    paused: bool,
    stopping: bool,
    warmup: WarmupTracker,
    /// Mirror of `warmup.is_warming()` shared with driver threads, which
    /// consult it to honor receive suppression during warmup.
    warming: Arc<AtomicBool>,
    pacer: RealTimePacer,
    sim_now: Arc<AtomicI64>,
}

impl InterfaceList {
    pub fn new(partition: PartitionId) -> Self {
        Self {
            partition,
            interfaces: Vec::new(),
            active: false,
            paused: false,
            stopping: false,
            warmup: WarmupTracker::new(),
            warming: Arc::new(AtomicBool::new(false)),
            pacer: RealTimePacer::new(),
            sim_now: Arc::new(AtomicI64::new(0)),
        }
    }

    pub fn partition(&self) -> PartitionId {
        self.partition
    }

    pub fn len(&self) -> usize {
        self.interfaces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.interfaces.is_empty()
    }

    /// Register an interface of kind [`InterfaceKind::Custom`].
    pub fn register(
        &mut self,
        name: &str,
        flags: PerfFlags,
        handler: impl InterfaceHandler + 'static,
    ) -> InterfaceId {
        self.register_kind(name, InterfaceKind::Custom, flags, handler)
    }

    /// Register an interface. Ids are dense and assigned in registration
    /// order; they stay valid for the life of the list, even after
    /// deactivation.
    pub fn register_kind(
        &mut self,
        name: &str,
        kind: InterfaceKind,
        flags: PerfFlags,
        handler: impl InterfaceHandler + 'static,
    ) -> InterfaceId {
        let id = InterfaceId(self.interfaces.len() as u32);
        info!(%id, name, ?kind, ?flags, "registered external interface");
        self.interfaces.push(Interface::new(
            id,
            Arc::from(name),
            kind,
            flags,
            Box::new(handler),
            Arc::clone(&self.sim_now),
        ));
        id
    }

    /// Look up an active interface.
    pub fn iface(&self, id: InterfaceId) -> Result<&Interface, BridgeError> {
        self.interfaces
            .get(id.index())
            .filter(|iface| iface.active)
            .ok_or(BridgeError::UnknownInterface(id))
    }

    fn iface_mut(&mut self, id: InterfaceId) -> Result<&mut Interface, BridgeError> {
        self.interfaces
            .get_mut(id.index())
            .filter(|iface| iface.active)
            .ok_or(BridgeError::UnknownInterface(id))
    }

    /// Run every interface's `initialize` hook, in registration order.
    pub fn initialize_all(&mut self, cfg: &Config) {
        self.active = true;
        for iface in &mut self.interfaces {
            let ctl = iface.ctl.clone();
            iface.handler.lock().initialize(&ctl, cfg);
        }
        info!(count = self.interfaces.len(), "external interfaces initialized");
    }

    /// Run every interface's `initialize_nodes` hook with the warmup request
    /// window open, then spawn driver threads for threaded interfaces. The
    /// window closes when this returns; later warmup requests are ignored.
    pub fn initialize_nodes_all(&mut self, cfg: &Config) -> Result<(), BridgeError> {
        let now = self.now();
        self.warmup.open_request_window();
        for iface in &mut self.interfaces {
            iface.timing.initialize_time = now;
            let ctl = iface.ctl.clone();
            let handler = Arc::clone(&iface.handler);
            let mut init =
                InitControls { warmup: &mut self.warmup, pacer: &mut self.pacer, iface };
            handler.lock().initialize_nodes(&ctl, &mut init, cfg);
        }
        self.warmup.close_request_window();
        self.warming.store(self.warmup.is_warming(), Ordering::Release);

        for iface in &mut self.interfaces {
            if iface.flags().contains(PerfFlags::THREADED) {
                let suppress_receive =
                    iface.warmup_no_receive.then(|| Arc::clone(&self.warming));
                iface.drivers = driver::spawn(
                    iface.name(),
                    iface.flags(),
                    Arc::clone(&iface.handler),
                    iface.ctl.clone(),
                    suppress_receive,
                )?;
            }
        }
        Ok(())
    }

    /// Publish the simulation clock and advance the warmup state machine.
    pub fn set_time(&mut self, now: SimTime) {
        self.sim_now.store(now.as_nanos(), Ordering::Release);
        self.warmup.advance(now);
        self.warming.store(self.warmup.is_warming(), Ordering::Release);
    }

    fn now(&self) -> SimTime {
        SimTime::from_nanos(self.sim_now.load(Ordering::Acquire))
    }

    /// Dispatch the receive hook of every plain (non-threaded) active
    /// interface, honoring per-interface receive throttles and warmup
    /// suppression. Also publishes `now` as the current clock.
    pub fn receive_all(&mut self, now: SimTime) {
        self.set_time(now);
        if !self.active || self.paused || self.stopping {
            return;
        }
        let warming = self.warmup.is_warming();
        for iface in &mut self.interfaces {
            if !iface.active || iface.flags().contains(PerfFlags::THREADED) {
                continue;
            }
            if warming && iface.warmup_no_receive {
                continue;
            }
            let due = iface.timing.last_receive.saturating_add(iface.timing.min_receive_delay);
            if now < due {
                continue;
            }
            iface.timing.last_receive = now;
            let ctl = iface.ctl.clone();
            iface.handler.lock().receive(&ctl);
        }
    }

    /// Drain every message the interfaces have queued for the core,
    /// interface by interface in registration order.
    pub fn drain_deliveries(&mut self, mut apply: impl FnMut(InterfaceId, Delivery)) {
        for iface in &mut self.interfaces {
            let id = iface.id();
            while let Some(delivery) = iface.deliveries.try_pop() {
                apply(id, delivery);
            }
        }
    }

    /// Latest time the simulation may run to before the interfaces must be
    /// consulted again. A handler is re-polled only once `now` reaches its
    /// previously reported horizon; `MAX` means no interface imposes one.
    pub fn horizon(&mut self, now: SimTime) -> SimTime {
        let mut min = SimTime::MAX;
        for iface in &mut self.interfaces {
            if !iface.active {
                continue;
            }
            if now >= iface.timing.horizon {
                iface.timing.horizon =
                    iface.handler.lock().simulation_horizon().unwrap_or(SimTime::MAX);
            }
            min = min.min(iface.timing.horizon);
        }
        min
    }

    /// Earliest time any active interface may still inject events at, or
    /// `MAX` when none impose a bound.
    pub fn min_external_time(&self) -> SimTime {
        let mut min = SimTime::MAX;
        for iface in &self.interfaces {
            if !iface.active {
                continue;
            }
            if let Some(t) = iface.handler.lock().external_time() {
                min = min.min(t);
            }
        }
        min
    }

    /// Hand one simulation packet to an interface's forward path. For
    /// threaded interfaces this queues onto the driver and returns
    /// immediately; otherwise the forward hook runs inline.
    pub fn forward_to(
        &mut self,
        id: InterfaceId,
        node: NodeId,
        data: Vec<u8>,
    ) -> Result<(), BridgeError> {
        let iface = self.iface_mut(id)?;
        if let Some(q) = &iface.drivers.forward_q {
            q.push(ForwardItem { node, data });
            return Ok(());
        }
        let ctl = iface.ctl.clone();
        iface
            .handler
            .lock()
            .forward(&ctl, node, &data)
            .map_err(|err| BridgeError::ForwardFailed { interface: id, reason: err.to_string() })
    }

    /// Report a dropped packet to the interface it originated from.
    pub fn packet_dropped(
        &mut self,
        id: InterfaceId,
        payload: &[u8],
        early: bool,
    ) -> Result<(), BridgeError> {
        let iface = self.iface_mut(id)?;
        iface.handler.lock().packet_dropped(payload, early);
        Ok(())
    }

    /// Take an interface out of dispatch. Its driver threads are stopped and
    /// joined, its record stays so the id keeps resolving to "deactivated"
    /// rather than dangling, and its finalize hook will still run at
    /// shutdown.
    pub fn deactivate(&mut self, id: InterfaceId) -> Result<(), BridgeError> {
        let iface = self.iface_mut(id)?;
        iface.active = false;
        iface.drivers.stop();
        warn!(%id, name = iface.name(), "external interface deactivated");
        Ok(())
    }

    /// Shut everything down: stop and join all driver threads, then run
    /// every finalize hook exactly once in registration order, including
    /// for deactivated interfaces.
    pub fn finalize_all(&mut self) {
        if self.stopping {
            return;
        }
        self.stopping = true;
        for iface in &mut self.interfaces {
            iface.drivers.stop();
            let ctl = iface.ctl.clone();
            iface.handler.lock().finalize(&ctl);
            iface.active = false;
        }
        self.active = false;
        info!(count = self.interfaces.len(), "external interfaces finalized");
    }

    /// Thread CPU time consumed on the simulation thread since this
    /// interface was first asked, as a delta-since-first-query.
    pub fn cpu_time(&mut self, id: InterfaceId) -> Result<Duration, BridgeError> {
        let iface = self.iface_mut(id)?;
        Ok(iface.cpu.elapsed())
    }

    /// Report that this interface is ready for warmup to begin; warmup
    /// starts once every requester has reported in. Usable after the
    /// request window has closed, typically from a receive hook's delivery
    /// being processed.
    pub fn begin_warmup(&mut self) {
        self.warmup.begin_warmup();
    }

    pub fn warmup_phase(&self) -> WarmupPhase {
        self.warmup.phase()
    }

    pub fn warmup(&self) -> &WarmupTracker {
        &self.warmup
    }

    pub fn pacer(&self) -> &RealTimePacer {
        &self.pacer
    }

    /// Mutable pacer access, e.g. to adjust lookahead mid-run.
    pub fn pacer_mut(&mut self) -> &mut RealTimePacer {
        &mut self.pacer
    }

    /// Pause real-time pacing; paused wall time is excluded from the
    /// external clock.
    pub fn pause(&mut self) {
        if !self.paused {
            self.paused = true;
            self.pacer.pause();
            debug!("interface dispatch paused");
        }
    }

    pub fn resume(&mut self) {
        if self.paused {
            self.paused = false;
            self.pacer.resume();
            debug!("interface dispatch resumed");
        }
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn is_stopping(&self) -> bool {
        self.stopping
    }
}

impl Drop for InterfaceList {
    fn drop(&mut self) {
        // Driver threads hold clones of the handler Arcs; make sure none
        // outlive the list even if finalize_all was never called.
        for iface in &mut self.interfaces {
            iface.drivers.stop();
        }
    }
}
