//! Delivery guarantees consumed from the networking layer.
//!
//! The core does not implement retransmission or ordering itself; it tags
//! every outgoing message with the guarantee it needs and lets the
//! transport collaborator provide it.

use serde::{Deserialize, Serialize};

/// How a message must be delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeliveryMethod {
    /// Guaranteed, in order. Session and handshake-critical messages.
    ReliableOrdered,
    /// Guaranteed, order irrelevant. Component commands.
    ReliableUnordered,
    /// Best effort. State deltas — a lost one is superseded by the next.
    Unreliable,
}
