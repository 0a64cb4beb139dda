//! Error types for the bridge's recoverable surface.
//!
//! Precondition violations (popping an empty non-blocking queue, internal
//! index corruption) are programmer errors and fail fast with panics instead
//! of appearing here. Logical absence (a mapping miss, an unset horizon) is
//! expressed as `Option`, not as an error.

use crate::InterfaceId;
use thiserror::Error;

/// Recoverable errors on the bridge's public surface.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// The referenced interface was never registered or has been deactivated.
    #[error("unknown or deactivated interface: {0}")]
    UnknownInterface(InterfaceId),

    /// A configuration value failed validation.
    #[error("invalid configuration value for '{key}': {reason}")]
    InvalidConfig {
        /// The offending configuration key.
        key: String,
        /// Why the value was rejected.
        reason: String,
    },

    /// An interface driver thread could not be spawned.
    #[error("failed to spawn thread '{name}': {source}")]
    ThreadSpawn {
        /// The thread name that was requested.
        name: String,
        /// The underlying OS error.
        #[source]
        source: std::io::Error,
    },

    /// An interface handler reported a failure while forwarding data out.
    #[error("interface {interface} failed to forward data: {reason}")]
    ForwardFailed {
        /// The interface whose forward hook failed.
        interface: InterfaceId,
        /// Handler-reported reason.
        reason: String,
    },
}
