//! Mirror reconciliation — folding authoritative state into local
//! entities.
//!
//! After the [`ClientStateManager`](crate::ClientStateManager) reconstructs
//! an authoritative [`GameState`], the reconciler walks it against the
//! local entity mirror: unseen entities are spawned from their prototype,
//! existing components apply the new snapshots (idempotent and
//! sequence-gated), and local entities absent from the state are deleted.
//! Transform snapshots additionally feed per-entity interpolation buffers
//! so rendering sees smooth motion instead of network-rate snaps.

use std::collections::HashMap;

use tracing::warn;

use station_core::components::TransformComponent;
use station_core::{ComponentFamily, ComponentState, EntityId};
use station_state::GameState;
use station_world::EntityManager;

use crate::interpolation::InterpolationBuffer;

/// Default snap threshold, in meters: authoritative corrections larger
/// than this are applied directly instead of interpolated.
pub const DEFAULT_SNAP_THRESHOLD: f32 = 8.0;

/// Applies authoritative game states to the local entity mirror.
pub struct Reconciler {
    buffers: HashMap<EntityId, InterpolationBuffer>,
    snap_threshold: f32,
}

impl Reconciler {
    /// Create a reconciler with the default snap threshold.
    #[must_use]
    pub fn new() -> Self {
        Self::with_snap_threshold(DEFAULT_SNAP_THRESHOLD)
    }

    /// Create a reconciler with a custom snap threshold, in meters.
    #[must_use]
    pub fn with_snap_threshold(snap_threshold: f32) -> Self {
        Self {
            buffers: HashMap::new(),
            snap_threshold,
        }
    }

    /// Fold an authoritative state into the local mirror.
    ///
    /// Entities whose prototype the client does not know are skipped with
    /// a warning — a content mismatch must not take the session down.
    pub fn apply(&mut self, entities: &mut EntityManager, state: &GameState) {
        let sequence = state.sequence;

        for entity_state in &state.entity_states {
            if !entities.contains(entity_state.id) {
                if let Err(err) = entities.spawn_mirror(entity_state.id, &entity_state.prototype) {
                    warn!(id = %entity_state.id, %err, "skipping entity from state");
                    continue;
                }
            }

            for component_state in &entity_state.states {
                if let ComponentState::Transform(transform) = component_state {
                    self.buffers
                        .entry(entity_state.id)
                        .or_default()
                        .push(sequence, *transform);
                }
                entities.apply_component_state(entity_state.id, component_state, sequence);
            }
        }

        // Entities the server no longer replicates are gone.
        for id in entities.entity_ids() {
            if state.entity(id).is_none() {
                entities.delete(id);
                self.buffers.remove(&id);
            }
        }
    }

    /// Write interpolated transforms into the mirror.
    ///
    /// `alpha` is elapsed wall time since the last applied state divided
    /// by the network tick interval. Call once per render frame.
    pub fn interpolate(&mut self, entities: &mut EntityManager, alpha: f32) {
        for (&id, buffer) in &self.buffers {
            let Some(sampled) = buffer.sample(alpha, self.snap_threshold) else {
                continue;
            };
            if let Some(transform) =
                entities.component_mut::<TransformComponent>(id, ComponentFamily::Transform)
            {
                transform.set_position(sampled.position);
                transform.set_rotation(sampled.rotation);
            }
        }
    }
}

impl Default for Reconciler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec2;
    use station_core::PrototypeRegistry;
    use station_core::state::TransformState;
    use station_state::EntityState;

    use super::*;

    fn registry() -> PrototypeRegistry {
        let mut registry = PrototypeRegistry::new();
        registry
            .load_json(
                r#"[{ "name": "crate", "components": [
                    { "family": "Transform" },
                    { "family": "Collidable" }
                ] }]"#,
            )
            .unwrap();
        registry
    }

    fn game_state(sequence: u32, entities: &[(u64, f32)]) -> GameState {
        GameState::new(
            sequence,
            entities
                .iter()
                .map(|&(id, x)| EntityState {
                    id: EntityId::from_raw(id),
                    prototype: "crate".to_string(),
                    states: vec![ComponentState::Transform(TransformState {
                        position: Vec2::new(x, 0.0),
                        rotation: 0.0,
                    })],
                })
                .collect(),
            Vec::new(),
        )
    }

    #[test]
    fn test_apply_creates_updates_deletes() {
        let mut entities = EntityManager::new(registry());
        let mut reconciler = Reconciler::new();

        reconciler.apply(&mut entities, &game_state(1, &[(1, 1.0), (2, 2.0)]));
        assert_eq!(entities.len(), 2);

        // Entity 2 disappears, entity 1 moves, entity 3 arrives.
        reconciler.apply(&mut entities, &game_state(2, &[(1, 5.0), (3, 0.0)]));
        assert_eq!(entities.len(), 2);
        assert!(!entities.contains(EntityId::from_raw(2)));
        let transform = entities
            .component::<TransformComponent>(EntityId::from_raw(1), ComponentFamily::Transform)
            .unwrap();
        assert_eq!(transform.position(), Vec2::new(5.0, 0.0));
    }

    #[test]
    fn test_unknown_prototype_skipped_without_failing() {
        let mut entities = EntityManager::new(registry());
        let mut reconciler = Reconciler::new();

        let mut state = game_state(1, &[(1, 1.0)]);
        state.entity_states[0].prototype = "not-a-thing".to_string();
        reconciler.apply(&mut entities, &state);
        assert!(entities.is_empty());
    }

    #[test]
    fn test_interpolate_blends_towards_latest() {
        let mut entities = EntityManager::new(registry());
        let mut reconciler = Reconciler::new();

        reconciler.apply(&mut entities, &game_state(1, &[(1, 0.0)]));
        reconciler.apply(&mut entities, &game_state(2, &[(1, 2.0)]));

        reconciler.interpolate(&mut entities, 0.5);
        let transform = entities
            .component::<TransformComponent>(EntityId::from_raw(1), ComponentFamily::Transform)
            .unwrap();
        assert!((transform.position().x - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_interpolate_snaps_on_large_correction() {
        let mut entities = EntityManager::new(registry());
        let mut reconciler = Reconciler::with_snap_threshold(4.0);

        reconciler.apply(&mut entities, &game_state(1, &[(1, 0.0)]));
        reconciler.apply(&mut entities, &game_state(2, &[(1, 50.0)]));

        reconciler.interpolate(&mut entities, 0.1);
        let transform = entities
            .component::<TransformComponent>(EntityId::from_raw(1), ComponentFamily::Transform)
            .unwrap();
        assert_eq!(transform.position().x, 50.0);
    }
}
