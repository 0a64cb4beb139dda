//! The trait an external interface implements to plug into the bridge.
//!
//! Every hook has a default no-op body, so a handler only overrides the
//! lifecycle points it cares about. Hooks run under the interface's handler
//! lock; threaded handlers that block inside [`InterfaceHandler::receive`]
//! should poll with short timeouts so the simulation thread can still reach
//! the other hooks.

use simbridge_types::{BridgeError, Config, NodeId, SimTime};

use crate::interface::InterfaceCtl;
use crate::list::InitControls;

/// Lifecycle hooks for one external interface.
pub trait InterfaceHandler: Send {
    /// Called once before any node exists, straight after registration.
    fn initialize(&mut self, _ctl: &InterfaceCtl, _cfg: &Config) {}

    /// Called once after node creation. This is the only point where the
    /// handler may request warmup or real-time pacing through `init`.
    fn initialize_nodes(&mut self, _ctl: &InterfaceCtl, _init: &mut InitControls<'_>, _cfg: &Config) {
    }

    /// Earliest simulation time at which this interface may inject new
    /// events. `None` means the interface imposes no bound.
    fn external_time(&mut self) -> Option<SimTime> {
        None
    }

    /// Latest simulation time the simulation may safely run to before this
    /// interface must be consulted again. Polled again only once the clock
    /// reaches the previously reported value; `None` means unbounded.
    fn simulation_horizon(&mut self) -> Option<SimTime> {
        None
    }

    /// A packet originating from this interface was dropped. `early` is true
    /// when the drop happened before the packet entered the model proper.
    fn packet_dropped(&mut self, _payload: &[u8], _early: bool) {}

    /// Poll the external side for pending input. Called every simulation
    /// step for plain interfaces, or continuously from a driver thread for
    /// threaded ones. Inject results with [`InterfaceCtl::deliver`].
    fn receive(&mut self, _ctl: &InterfaceCtl) {}

    /// Push one simulation packet out to the external side.
    fn forward(&mut self, _ctl: &InterfaceCtl, _node: NodeId, _data: &[u8]) -> Result<(), BridgeError> {
        Ok(())
    }

    /// Called exactly once at shutdown, in registration order, after the
    /// interface's driver threads (if any) have been joined.
    fn finalize(&mut self, _ctl: &InterfaceCtl) {}
}
