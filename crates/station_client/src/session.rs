//! The client session — message handling glue.
//!
//! Ties the state manager and reconciler together behind a single
//! [`ClientSession::handle_message`] entry point: state updates advance
//! the mirror and produce acks, broken lineage produces a resync request,
//! stale updates vanish. The transport side stays outside; this type is
//! pure message-in / message-out, which keeps the whole reconciliation
//! path unit-testable.

use tracing::{debug, warn};

use station_core::PrototypeRegistry;
use station_net::NetMessage;
use station_state::StateError;
use station_world::EntityManager;

use crate::reconcile::Reconciler;
use crate::state_manager::ClientStateManager;

/// Client-side session state: the reconstructed authoritative state and
/// the local entity mirror.
pub struct ClientSession {
    state: ClientStateManager,
    reconciler: Reconciler,
    entities: EntityManager,
    net_rate: f64,
}

impl ClientSession {
    /// Create a session over the client's prototype registry.
    #[must_use]
    pub fn new(prototypes: PrototypeRegistry) -> Self {
        Self {
            state: ClientStateManager::new(),
            reconciler: Reconciler::new(),
            entities: EntityManager::new(prototypes),
            net_rate: 0.0,
        }
    }

    /// The local entity mirror.
    #[must_use]
    pub fn entities(&self) -> &EntityManager {
        &self.entities
    }

    /// Mutable access to the local entity mirror.
    pub fn entities_mut(&mut self) -> &mut EntityManager {
        &mut self.entities
    }

    /// The last applied sequence.
    #[must_use]
    pub fn sequence(&self) -> u32 {
        self.state.sequence()
    }

    /// The server's network tick rate, once welcomed.
    #[must_use]
    pub fn net_rate(&self) -> f64 {
        self.net_rate
    }

    /// Handle a message from the server. Returns the reply to send back,
    /// if any.
    pub fn handle_message(&mut self, message: &NetMessage) -> Option<NetMessage> {
        match message {
            NetMessage::SessionWelcome { net_rate, .. } => {
                self.net_rate = *net_rate;
                None
            }
            NetMessage::StateUpdate { delta } => match self.state.apply(delta) {
                Ok(state) => {
                    let sequence = state.sequence;
                    let state = state.clone();
                    self.reconciler.apply(&mut self.entities, &state);
                    Some(NetMessage::StateAck { sequence })
                }
                Err(StateError::Stale { received, current }) => {
                    debug!(received, current, "stale state update discarded");
                    None
                }
                Err(err @ (StateError::BaseMismatch { .. } | StateError::Desync { .. })) => {
                    warn!(%err, "state lineage broken, requesting resync");
                    Some(NetMessage::ResyncRequest {
                        last_sequence: self.state.sequence(),
                    })
                }
                Err(err) => {
                    warn!(%err, "unusable state update dropped");
                    None
                }
            },
            NetMessage::EntityComponent {
                entity,
                family,
                message,
            } => {
                let reply = self.entities.send_message(None, *entity, *family, message);
                debug!(%entity, family = %family, ?reply, "entity component message handled");
                None
            }
            _ => None,
        }
    }

    /// Write interpolated transforms into the mirror. `elapsed` is wall
    /// time since the last state update, in seconds.
    pub fn interpolate(&mut self, elapsed: f32) {
        if self.net_rate <= 0.0 {
            return;
        }
        let tick_interval = 1.0 / self.net_rate as f32;
        let alpha = elapsed / tick_interval;
        self.reconciler.interpolate(&mut self.entities, alpha);
    }
}

#[cfg(test)]
mod tests {
    use station_state::{GameState, delta};

    use super::*;

    #[test]
    fn test_welcome_sets_net_rate() {
        let mut session = ClientSession::new(PrototypeRegistry::new());
        let reply = session.handle_message(&NetMessage::SessionWelcome {
            session: uuid::Uuid::from_u128(1),
            net_rate: 20.0,
        });
        assert!(reply.is_none());
        assert!((session.net_rate() - 20.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_state_update_produces_ack() {
        let mut session = ClientSession::new(PrototypeRegistry::new());
        let to = GameState::new(3, Vec::new(), Vec::new());
        let update = NetMessage::StateUpdate {
            delta: delta(&GameState::empty(), &to).unwrap(),
        };
        let reply = session.handle_message(&update);
        assert_eq!(reply, Some(NetMessage::StateAck { sequence: 3 }));
        assert_eq!(session.sequence(), 3);

        // A duplicate is silently dropped.
        assert!(session.handle_message(&update).is_none());
    }

    #[test]
    fn test_interpolate_moves_mirror_between_updates() {
        use glam::Vec2;
        use station_core::components::TransformComponent;
        use station_core::state::TransformState;
        use station_core::{ComponentFamily, ComponentState, EntityId};
        use station_state::EntityState;

        let mut registry = PrototypeRegistry::new();
        registry
            .load_json(r#"[{ "name": "crate", "components": [{ "family": "Transform" }] }]"#)
            .unwrap();
        let mut session = ClientSession::new(registry);
        session.handle_message(&NetMessage::SessionWelcome {
            session: uuid::Uuid::from_u128(1),
            net_rate: 10.0,
        });

        let state = |sequence: u32, x: f32| {
            GameState::new(
                sequence,
                vec![EntityState {
                    id: EntityId::from_raw(1),
                    prototype: "crate".to_string(),
                    states: vec![ComponentState::Transform(TransformState {
                        position: Vec2::new(x, 0.0),
                        rotation: 0.0,
                    })],
                }],
                Vec::new(),
            )
        };
        let s1 = state(1, 0.0);
        let s2 = state(2, 4.0);
        session.handle_message(&NetMessage::StateUpdate {
            delta: delta(&GameState::empty(), &s1).unwrap(),
        });
        session.handle_message(&NetMessage::StateUpdate {
            delta: delta(&s1, &s2).unwrap(),
        });

        // Half a network tick after the newest sample: halfway there.
        session.interpolate(0.05);
        let transform = session
            .entities()
            .component::<TransformComponent>(EntityId::from_raw(1), ComponentFamily::Transform)
            .unwrap();
        assert!((transform.position().x - 2.0).abs() < 1e-4);
    }

    #[test]
    fn test_broken_lineage_requests_resync() {
        let mut session = ClientSession::new(PrototypeRegistry::new());
        let s5 = GameState::new(5, Vec::new(), Vec::new());
        let s6 = GameState::new(6, Vec::new(), Vec::new());
        // The client never saw sequence 5.
        let update = NetMessage::StateUpdate {
            delta: delta(&s5, &s6).unwrap(),
        };
        let reply = session.handle_message(&update);
        assert_eq!(reply, Some(NetMessage::ResyncRequest { last_sequence: 0 }));
    }
}
