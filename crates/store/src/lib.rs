//! Utility data structures consumed by external interface implementations.
//!
//! These are per-interface, single-owner structures: the reference usage has
//! exactly one interface's threads touching its own instances, so none of
//! them synchronize internally. A caller that shares one across threads must
//! add its own locking; the unsynchronized contract is deliberate, not an
//! oversight.
//!
//! - [`MappingTable`]: chained hash table over raw byte keys, used to
//!   remember associations such as address translations.
//! - [`TimeStore`]: splay tree ordered by [`SimTime`](simbridge_types::SimTime),
//!   holding pending external events with cheap repeated minimum access.
//! - [`MobilityBuffer`]: time-ordered pending mobility changes, decoupling
//!   "command arrived now" from "effect takes place later".

mod mapping;
mod mobility;
mod splay;

pub use mapping::MappingTable;
pub use mobility::{MobilityBuffer, MobilityChange};
pub use splay::TimeStore;
