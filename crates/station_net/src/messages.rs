//! Messages exchanged between server and clients.
//!
//! Every message is MessagePack-encoded and crosses the wire inside a
//! compressed frame (see [`crate::frame`]). Each variant knows the
//! delivery guarantee it needs; the transport collaborator provides it.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use station_core::{ComponentFamily, ComponentMessage, EntityId};
use station_state::GameStateDelta;

use crate::delivery::DeliveryMethod;

/// A message between server and client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NetMessage {
    /// Client → server: request to join with a display name.
    SessionJoin {
        /// Requested display name.
        name: String,
    },
    /// Server → client: the session was accepted.
    SessionWelcome {
        /// The session id assigned to this client.
        session: Uuid,
        /// Network ticks per second, for client-side interpolation pacing.
        net_rate: f64,
    },
    /// Client → server: orderly departure.
    SessionLeave,
    /// Server → client: a state update.
    ///
    /// Full states use the same shape: a delta computed against the empty
    /// baseline (`from_sequence == 0`).
    StateUpdate {
        /// The change set.
        delta: GameStateDelta,
    },
    /// Client → server: the client has applied this sequence.
    StateAck {
        /// The applied sequence.
        sequence: u32,
    },
    /// Client → server: the state lineage broke (desync or unusable base);
    /// the next update must be a full state.
    ResyncRequest {
        /// The last sequence the client successfully applied.
        last_sequence: u32,
    },
    /// A component message for a specific entity and family.
    EntityComponent {
        /// Target entity.
        entity: EntityId,
        /// Target family on that entity.
        family: ComponentFamily,
        /// The message itself.
        message: ComponentMessage,
    },
}

impl NetMessage {
    /// The delivery guarantee this message needs.
    #[must_use]
    pub fn delivery(&self) -> DeliveryMethod {
        match self {
            NetMessage::SessionJoin { .. }
            | NetMessage::SessionWelcome { .. }
            | NetMessage::SessionLeave
            | NetMessage::ResyncRequest { .. } => DeliveryMethod::ReliableOrdered,
            NetMessage::EntityComponent { .. } => DeliveryMethod::ReliableUnordered,
            NetMessage::StateUpdate { .. } | NetMessage::StateAck { .. } => {
                DeliveryMethod::Unreliable
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use station_state::{GameState, delta};

    use crate::codec;

    use super::*;

    #[test]
    fn test_delivery_mapping() {
        assert_eq!(
            NetMessage::SessionJoin {
                name: "tester".to_string()
            }
            .delivery(),
            DeliveryMethod::ReliableOrdered
        );
        assert_eq!(
            NetMessage::StateAck { sequence: 3 }.delivery(),
            DeliveryMethod::Unreliable
        );
        assert_eq!(
            NetMessage::EntityComponent {
                entity: EntityId::from_raw(1),
                family: ComponentFamily::Damageable,
                message: ComponentMessage::Damage { amount: 5.0 },
            }
            .delivery(),
            DeliveryMethod::ReliableUnordered
        );
    }

    #[test]
    fn test_state_update_roundtrip_through_frame() {
        let to = GameState::new(7, Vec::new(), Vec::new());
        let msg = NetMessage::StateUpdate {
            delta: delta(&GameState::empty(), &to).unwrap(),
        };
        let frame = codec::encode_compressed(&msg).unwrap();
        let restored: NetMessage = codec::decode_compressed(&frame).unwrap();
        assert_eq!(msg, restored);
    }
}
