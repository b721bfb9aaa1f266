//! Game state snapshots.
//!
//! A [`GameState`] is the serializable snapshot of all mutable, networked
//! component data plus session-level player facts at one network tick. It
//! is immutable once captured: the server produces one per network tick
//! with a strictly increasing sequence, and clients fold received states
//! into local truth and discard them.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use station_core::{ComponentState, EntityId};

/// Where a connected session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionStatus {
    /// Handshake in progress.
    Connecting,
    /// Connected, sitting in the lobby.
    InLobby,
    /// Playing.
    InGame,
    /// Gone; kept briefly so clients can show a departure.
    Disconnected,
}

/// Session-level facts about one connected client, replicated so every
/// client knows who is present and what they control.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerState {
    /// Stable session identifier.
    pub unique_id: Uuid,
    /// Display name.
    pub name: String,
    /// Lifecycle status.
    pub status: SessionStatus,
    /// The entity this player controls, if any.
    pub controlled_entity: Option<EntityId>,
}

/// One entity's replicated state at a tick: its id, the prototype it was
/// spawned from, and the value snapshots of its networked components.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityState {
    /// The entity.
    pub id: EntityId,
    /// Prototype name, so an unseen entity can be spawned client-side.
    pub prototype: String,
    /// Component snapshots, in family slot order.
    pub states: Vec<ComponentState>,
}

/// The full replicated simulation state at one network tick.
///
/// Entity states are kept sorted by id and player states by session id, so
/// that two states with equal content compare equal and checksum equal
/// regardless of capture order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    /// Monotonic network tick id.
    pub sequence: u32,
    /// One entry per live entity.
    pub entity_states: Vec<EntityState>,
    /// One entry per connected session.
    pub player_states: Vec<PlayerState>,
}

impl GameState {
    /// Build a state, normalizing to canonical order.
    #[must_use]
    pub fn new(
        sequence: u32,
        mut entity_states: Vec<EntityState>,
        mut player_states: Vec<PlayerState>,
    ) -> Self {
        entity_states.sort_by_key(|e| e.id);
        player_states.sort_by_key(|p| p.unique_id);
        Self {
            sequence,
            entity_states,
            player_states,
        }
    }

    /// The empty baseline: sequence 0, no entities, no players.
    ///
    /// A "full" state update is a delta computed against this.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            sequence: 0,
            entity_states: Vec::new(),
            player_states: Vec::new(),
        }
    }

    /// Look up one entity's state by id.
    #[must_use]
    pub fn entity(&self, id: EntityId) -> Option<&EntityState> {
        self.entity_states
            .binary_search_by_key(&id, |e| e.id)
            .ok()
            .map(|i| &self.entity_states[i])
    }
}
