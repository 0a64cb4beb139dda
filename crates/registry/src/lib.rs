//! External-interface registry and lifecycle dispatch.
//!
//! An [`InterfaceList`] holds every external interface registered with a
//! simulation partition and drives its lifecycle: one-time initialization,
//! node-time initialization (where warmup and real-time pacing are
//! requested), per-step receive dispatch, horizon and external-time
//! aggregation, outbound forwarding, and exactly-once finalization in
//! registration order.
//!
//! Interfaces registered with [`PerfFlags::THREADED`] get dedicated driver
//! threads so a slow external peer cannot stall the simulation step; plain
//! interfaces are polled inline. Either way, inbound data reaches the core
//! through [`InterfaceCtl::deliver`] and is drained on the simulation
//! thread with [`InterfaceList::drain_deliveries`].

mod driver;
mod handler;
mod interface;
mod list;

pub use handler::InterfaceHandler;
pub use interface::{Delivery, Interface, InterfaceCtl, InterfaceKind, PerfFlags};
pub use list::{InitControls, InterfaceList};
