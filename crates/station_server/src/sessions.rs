//! Connected player sessions.
//!
//! The registry lives on the simulation thread; session control messages
//! from the network reach it through the server's command channel. Its
//! [`SessionRegistry::player_states`] output is folded into every captured
//! game state so clients learn session-level facts.

use std::collections::HashMap;

use uuid::Uuid;

use station_core::EntityId;
use station_state::{PlayerState, SessionStatus};

/// One connected client.
#[derive(Debug, Clone)]
pub struct Session {
    /// Stable session identifier (chosen by the client's transport).
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Lifecycle status.
    pub status: SessionStatus,
    /// The entity this session controls, if any.
    pub controlled: Option<EntityId>,
}

/// All connected sessions, keyed by id.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: HashMap<Uuid, Session>,
}

impl SessionRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            sessions: HashMap::new(),
        }
    }

    /// Register a joining session in the lobby. Re-joining with a known id
    /// refreshes the name only.
    pub fn join(&mut self, id: Uuid, name: impl Into<String>) {
        let name = name.into();
        self.sessions
            .entry(id)
            .and_modify(|s| s.name.clone_from(&name))
            .or_insert(Session {
                id,
                name,
                status: SessionStatus::InLobby,
                controlled: None,
            });
    }

    /// Remove a session. Returns the entity it controlled, if any.
    pub fn leave(&mut self, id: Uuid) -> Option<EntityId> {
        self.sessions.remove(&id).and_then(|s| s.controlled)
    }

    /// Give a session control of an entity and mark it in-game.
    pub fn attach(&mut self, id: Uuid, entity: EntityId) -> bool {
        let Some(session) = self.sessions.get_mut(&id) else {
            return false;
        };
        session.controlled = Some(entity);
        session.status = SessionStatus::InGame;
        true
    }

    /// Returns a session by id.
    #[must_use]
    pub fn get(&self, id: Uuid) -> Option<&Session> {
        self.sessions.get(&id)
    }

    /// Returns the number of connected sessions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Returns `true` if no sessions are connected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Session ids, sorted for deterministic iteration.
    #[must_use]
    pub fn ids(&self) -> Vec<Uuid> {
        let mut ids: Vec<_> = self.sessions.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Replicable player states, sorted by session id.
    #[must_use]
    pub fn player_states(&self) -> Vec<PlayerState> {
        let mut states: Vec<_> = self
            .sessions
            .values()
            .map(|s| PlayerState {
                unique_id: s.id,
                name: s.name.clone(),
                status: s.status,
                controlled_entity: s.controlled,
            })
            .collect();
        states.sort_by_key(|p| p.unique_id);
        states
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_attach_leave() {
        let mut registry = SessionRegistry::new();
        let id = Uuid::from_u128(1);
        registry.join(id, "tester");
        assert_eq!(registry.get(id).unwrap().status, SessionStatus::InLobby);

        let entity = EntityId::from_raw(7);
        assert!(registry.attach(id, entity));
        assert_eq!(registry.get(id).unwrap().status, SessionStatus::InGame);

        assert_eq!(registry.leave(id), Some(entity));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_player_states_sorted() {
        let mut registry = SessionRegistry::new();
        registry.join(Uuid::from_u128(9), "b");
        registry.join(Uuid::from_u128(1), "a");
        let states = registry.player_states();
        assert_eq!(states[0].unique_id, Uuid::from_u128(1));
        assert_eq!(states[1].unique_id, Uuid::from_u128(9));
    }
}
