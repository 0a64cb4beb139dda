//! Core types shared across the simbridge workspace.
//!
//! simbridge is the synchronization layer between a single-threaded
//! discrete-event simulator and external modules (sockets, consoles,
//! hardware bridges) running on their own threads and their own clocks.
//! This crate holds the vocabulary every other crate speaks:
//!
//! - [`SimTime`]: the simulator tick type (nanoseconds, with an unbounded
//!   sentinel used for "no horizon" / "no external time")
//! - identifier newtypes ([`InterfaceId`], [`PartitionId`], [`NodeId`])
//! - [`Config`]: the query-only boundary to the simulator's key-value
//!   configuration source
//! - [`BridgeError`]: the recoverable error taxonomy

mod config;
mod error;
mod identifiers;
mod time;

pub use config::Config;
pub use error::BridgeError;
pub use identifiers::{InterfaceId, NodeId, PartitionId};
pub use time::SimTime;
