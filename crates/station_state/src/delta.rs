//! Delta computation and patching between game states.
//!
//! [`delta`] produces the minimal change set between two states on the
//! same lineage; [`patch`] applies it. Both are pure functions, so the
//! round-trip law holds exactly and can be unit-tested:
//!
//! ```text
//! patch(from, delta(from, to)) == to
//! ```
//!
//! A full state update is the delta computed against
//! [`GameState::empty`], so one wire shape covers both paths.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use station_core::EntityId;

use crate::checksum::state_checksum;
use crate::error::StateError;
use crate::game_state::{EntityState, GameState, PlayerState};

/// The change set between two game states.
///
/// Entities are compared by value equality of their component snapshots:
/// an entity appears in `changed` when it is new or any of its component
/// states differ, and in `removed` when it is gone from the target state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameStateDelta {
    /// Sequence of the base state this delta was computed against.
    pub from_sequence: u32,
    /// Sequence of the state this delta leads to.
    pub to_sequence: u32,
    /// Added or mutated entities, as full per-entity snapshots.
    pub changed: Vec<EntityState>,
    /// Entities present in the base state but absent from the target.
    pub removed: Vec<EntityId>,
    /// Added or mutated player entries.
    pub player_changed: Vec<PlayerState>,
    /// Sessions present in the base state but absent from the target.
    pub player_removed: Vec<Uuid>,
    /// FNV-1a checksum of the target state, for desync detection.
    pub checksum: u64,
}

impl GameStateDelta {
    /// Returns `true` if the delta carries no changes at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.changed.is_empty()
            && self.removed.is_empty()
            && self.player_changed.is_empty()
            && self.player_removed.is_empty()
    }
}

/// Compute the change set that transforms `from` into `to`.
///
/// # Errors
///
/// Returns [`StateError::Encode`] if the target state cannot be
/// checksummed.
pub fn delta(from: &GameState, to: &GameState) -> Result<GameStateDelta, StateError> {
    let from_entities: HashMap<EntityId, &EntityState> =
        from.entity_states.iter().map(|e| (e.id, e)).collect();
    let to_entities: HashMap<EntityId, &EntityState> =
        to.entity_states.iter().map(|e| (e.id, e)).collect();

    let changed = to
        .entity_states
        .iter()
        .filter(|entry| match from_entities.get(&entry.id) {
            Some(prev) => *prev != *entry,
            None => true,
        })
        .cloned()
        .collect();
    let removed = from
        .entity_states
        .iter()
        .filter(|e| !to_entities.contains_key(&e.id))
        .map(|e| e.id)
        .collect();

    let from_players: HashMap<Uuid, &PlayerState> =
        from.player_states.iter().map(|p| (p.unique_id, p)).collect();
    let to_players: HashMap<Uuid, &PlayerState> =
        to.player_states.iter().map(|p| (p.unique_id, p)).collect();

    let player_changed = to
        .player_states
        .iter()
        .filter(|entry| match from_players.get(&entry.unique_id) {
            Some(prev) => *prev != *entry,
            None => true,
        })
        .cloned()
        .collect();
    let player_removed = from
        .player_states
        .iter()
        .filter(|p| !to_players.contains_key(&p.unique_id))
        .map(|p| p.unique_id)
        .collect();

    Ok(GameStateDelta {
        from_sequence: from.sequence,
        to_sequence: to.sequence,
        changed,
        removed,
        player_changed,
        player_removed,
        checksum: state_checksum(to)?,
    })
}

/// Apply a change set to a base state, reconstructing the target state.
///
/// Pure: the result depends only on the arguments.
///
/// # Errors
///
/// Returns [`StateError::BaseMismatch`] when `from` is not the state the
/// delta was computed against.
pub fn patch(from: &GameState, delta: &GameStateDelta) -> Result<GameState, StateError> {
    if from.sequence != delta.from_sequence {
        return Err(StateError::BaseMismatch {
            expected: delta.from_sequence,
            actual: from.sequence,
        });
    }

    let mut entities: HashMap<EntityId, EntityState> = from
        .entity_states
        .iter()
        .map(|e| (e.id, e.clone()))
        .collect();
    for entry in &delta.changed {
        entities.insert(entry.id, entry.clone());
    }
    for id in &delta.removed {
        entities.remove(id);
    }

    let mut players: HashMap<Uuid, PlayerState> = from
        .player_states
        .iter()
        .map(|p| (p.unique_id, p.clone()))
        .collect();
    for entry in &delta.player_changed {
        players.insert(entry.unique_id, entry.clone());
    }
    for id in &delta.player_removed {
        players.remove(id);
    }

    Ok(GameState::new(
        delta.to_sequence,
        entities.into_values().collect(),
        players.into_values().collect(),
    ))
}

#[cfg(test)]
mod tests {
    use glam::Vec2;
    use station_core::ComponentState;
    use station_core::state::{DamageableState, TransformState};

    use crate::game_state::SessionStatus;

    use super::*;

    fn transform(x: f32, y: f32) -> ComponentState {
        ComponentState::Transform(TransformState {
            position: Vec2::new(x, y),
            rotation: 0.0,
        })
    }

    fn entity(id: u64, states: Vec<ComponentState>) -> EntityState {
        EntityState {
            id: EntityId::from_raw(id),
            prototype: "crate".to_string(),
            states,
        }
    }

    fn player(id: u128, status: SessionStatus) -> PlayerState {
        PlayerState {
            unique_id: Uuid::from_u128(id),
            name: format!("player-{id}"),
            status,
            controlled_entity: None,
        }
    }

    #[test]
    fn test_round_trip_law() {
        let from = GameState::new(
            100,
            vec![
                entity(1, vec![transform(5.0, 5.0)]),
                entity(2, vec![transform(0.0, 0.0)]),
            ],
            vec![player(1, SessionStatus::InLobby)],
        );
        let to = GameState::new(
            101,
            vec![
                entity(1, vec![transform(6.0, 5.0)]),
                entity(3, vec![transform(9.0, 9.0)]),
            ],
            vec![player(1, SessionStatus::InGame), player(2, SessionStatus::Connecting)],
        );

        let d = delta(&from, &to).unwrap();
        let patched = patch(&from, &d).unwrap();
        assert_eq!(patched, to);
    }

    #[test]
    fn test_delta_contains_only_changes() {
        // Server at tick 100: entity 1 at (5,5). Tick 101 moves it to (6,5).
        let from = GameState::new(
            100,
            vec![
                entity(1, vec![transform(5.0, 5.0)]),
                entity(2, vec![transform(3.0, 3.0)]),
            ],
            Vec::new(),
        );
        let to = GameState::new(
            101,
            vec![
                entity(1, vec![transform(6.0, 5.0)]),
                entity(2, vec![transform(3.0, 3.0)]),
            ],
            Vec::new(),
        );

        let d = delta(&from, &to).unwrap();
        assert_eq!(d.changed.len(), 1);
        assert_eq!(d.changed[0].id, EntityId::from_raw(1));
        assert_eq!(d.changed[0].states, vec![transform(6.0, 5.0)]);
        assert!(d.removed.is_empty());

        // Applying it does not touch the unrelated entity.
        let patched = patch(&from, &d).unwrap();
        assert_eq!(
            patched.entity(EntityId::from_raw(2)).unwrap().states,
            vec![transform(3.0, 3.0)]
        );
    }

    #[test]
    fn test_unchanged_component_values_are_excluded() {
        // Same entity, one changed component out of two: the entity is
        // included (snapshots are per-entity), but only because a value
        // actually differs.
        let from = GameState::new(
            10,
            vec![entity(
                1,
                vec![
                    transform(1.0, 1.0),
                    ComponentState::Damageable(DamageableState {
                        health: 100.0,
                        max_health: 100.0,
                        dead: false,
                    }),
                ],
            )],
            Vec::new(),
        );
        let same = GameState::new(11, from.entity_states.clone(), Vec::new());
        let d = delta(&from, &same).unwrap();
        assert!(d.is_empty());
    }

    #[test]
    fn test_removal_markers() {
        let from = GameState::new(
            7,
            vec![entity(1, Vec::new()), entity(2, Vec::new())],
            Vec::new(),
        );
        let to = GameState::new(8, vec![entity(1, Vec::new())], Vec::new());

        let d = delta(&from, &to).unwrap();
        assert_eq!(d.removed, vec![EntityId::from_raw(2)]);
        let patched = patch(&from, &d).unwrap();
        assert!(patched.entity(EntityId::from_raw(2)).is_none());
    }

    #[test]
    fn test_full_state_is_delta_from_empty_baseline() {
        let to = GameState::new(
            50,
            vec![entity(4, vec![transform(2.0, 2.0)])],
            vec![player(1, SessionStatus::InGame)],
        );
        let d = delta(&GameState::empty(), &to).unwrap();
        assert_eq!(d.from_sequence, 0);
        let patched = patch(&GameState::empty(), &d).unwrap();
        assert_eq!(patched, to);
    }

    #[test]
    fn test_patch_rejects_wrong_base() {
        let from = GameState::new(5, Vec::new(), Vec::new());
        let to = GameState::new(6, vec![entity(1, Vec::new())], Vec::new());
        let d = delta(&from, &to).unwrap();

        let wrong_base = GameState::new(9, Vec::new(), Vec::new());
        let err = patch(&wrong_base, &d).unwrap_err();
        assert!(matches!(
            err,
            StateError::BaseMismatch {
                expected: 5,
                actual: 9
            }
        ));
    }

    #[test]
    fn test_player_diff() {
        let from = GameState::new(
            1,
            Vec::new(),
            vec![player(1, SessionStatus::InLobby), player(2, SessionStatus::InGame)],
        );
        let to = GameState::new(
            2,
            Vec::new(),
            vec![player(1, SessionStatus::InGame)],
        );

        let d = delta(&from, &to).unwrap();
        assert_eq!(d.player_changed.len(), 1);
        assert_eq!(d.player_changed[0].unique_id, Uuid::from_u128(1));
        assert_eq!(d.player_removed, vec![Uuid::from_u128(2)]);
    }

    #[test]
    fn test_delta_checksum_matches_target() {
        let from = GameState::new(1, Vec::new(), Vec::new());
        let to = GameState::new(2, vec![entity(1, vec![transform(0.0, 0.0)])], Vec::new());
        let d = delta(&from, &to).unwrap();
        assert_eq!(d.checksum, state_checksum(&to).unwrap());
    }
}
