//! The entity manager — owner of all entities and components.
//!
//! The manager is the single source of truth for live simulation state. It
//! is exclusively owned and mutated by the simulation thread; network I/O
//! posts mutations through the task queue instead of touching it directly.
//!
//! Besides lifecycle (spawn from prototype, delete) the manager fronts the
//! event bus — resolving directed targets to their family sets — and
//! produces the per-tick [`EntityState`] capture consumed by the state
//! delta engine.

use std::collections::HashMap;

use thiserror::Error;
use tracing::debug;

use station_core::components::instantiate;
use station_core::{
    Component, ComponentFamily, ComponentMessage, ComponentReply, ComponentState, Entity,
    EntityAllocator, EntityId, FamilySet, PrototypeRegistry,
};
use station_events::{Event, EventBus};
use station_state::EntityState;

use crate::system::EntityQuery;

/// Errors raised while spawning entities.
#[derive(Debug, Error)]
pub enum SpawnError {
    /// The named prototype is not registered.
    #[error("prototype not found: {0}")]
    PrototypeNotFound(String),
}

struct EntityRecord {
    entity: Entity,
    /// Last captured snapshot, reused while no component is dirty.
    cached: Option<EntityState>,
}

/// Owns all entities and components, their lifecycle, and the event bus.
pub struct EntityManager {
    entities: HashMap<EntityId, EntityRecord>,
    allocator: EntityAllocator,
    prototypes: PrototypeRegistry,
    bus: EventBus,
}

impl EntityManager {
    /// Create a manager over the given prototype registry.
    #[must_use]
    pub fn new(prototypes: PrototypeRegistry) -> Self {
        Self {
            entities: HashMap::new(),
            allocator: EntityAllocator::new(),
            prototypes,
            bus: EventBus::new(),
        }
    }

    /// Returns the number of live entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Returns `true` if no entities are live.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Returns `true` if the entity is live.
    #[must_use]
    pub fn contains(&self, id: EntityId) -> bool {
        self.entities.contains_key(&id)
    }

    /// Mutable access to the event bus, for registering subscriptions.
    pub fn bus_mut(&mut self) -> &mut EventBus {
        &mut self.bus
    }

    // ── Lifecycle ───────────────────────────────────────────────────────────

    /// Spawn an entity from a prototype.
    ///
    /// Allocates a fresh id, attaches the declared components (`on_add` in
    /// declaration order), applies declared initial states, then runs
    /// `initialize` on each component in declaration order. Raises a
    /// broadcast [`Event::EntitySpawned`] once the entity is fully built.
    ///
    /// # Errors
    ///
    /// Returns [`SpawnError::PrototypeNotFound`] for an unknown prototype
    /// name.
    pub fn spawn(&mut self, prototype: &str) -> Result<EntityId, SpawnError> {
        let proto = self
            .prototypes
            .get(prototype)
            .ok_or_else(|| SpawnError::PrototypeNotFound(prototype.to_string()))?
            .clone();

        let id = self.allocator.allocate();
        let mut entity = Entity::new(id, &proto.name);
        for spec in &proto.components {
            entity.add_component(instantiate(spec.family));
            if let Some(initial) = &spec.initial
                && let Some(component) = entity.component_mut(spec.family)
            {
                component.handle_state(initial, 0);
            }
        }
        entity.initialize_components();

        self.entities.insert(
            id,
            EntityRecord {
                entity,
                cached: None,
            },
        );
        debug!(%id, prototype = proto.name, "entity spawned");
        self.bus.raise(&Event::EntitySpawned {
            entity: id,
            prototype: proto.name,
        });
        Ok(id)
    }

    /// Spawn a replicated mirror of a server entity, keeping the server's
    /// id.
    ///
    /// Used by client reconciliation: ids are authoritative, so the local
    /// allocator is not consulted. Spawning an id that already exists is a
    /// no-op (duplicate delivery of a creation is normal).
    ///
    /// # Errors
    ///
    /// Returns [`SpawnError::PrototypeNotFound`] for an unknown prototype
    /// name.
    pub fn spawn_mirror(&mut self, id: EntityId, prototype: &str) -> Result<(), SpawnError> {
        if self.entities.contains_key(&id) {
            return Ok(());
        }
        let proto = self
            .prototypes
            .get(prototype)
            .ok_or_else(|| SpawnError::PrototypeNotFound(prototype.to_string()))?
            .clone();

        let mut entity = Entity::new(id, &proto.name);
        for spec in &proto.components {
            entity.add_component(instantiate(spec.family));
            if let Some(initial) = &spec.initial
                && let Some(component) = entity.component_mut(spec.family)
            {
                component.handle_state(initial, 0);
            }
        }
        entity.initialize_components();

        self.entities.insert(
            id,
            EntityRecord {
                entity,
                cached: None,
            },
        );
        debug!(%id, prototype = proto.name, "mirror entity spawned");
        self.bus.raise(&Event::EntitySpawned {
            entity: id,
            prototype: proto.name,
        });
        Ok(())
    }

    /// Delete an entity: run `on_remove` on its components in reverse
    /// attachment order and unregister it. Deleting an unknown or
    /// already-deleted id is a no-op.
    ///
    /// The removal reaches clients through the next state delta — a deleted
    /// entity is simply absent from the following capture.
    pub fn delete(&mut self, id: EntityId) {
        let Some(mut record) = self.entities.remove(&id) else {
            debug!(%id, "delete of unknown entity ignored");
            return;
        };
        record.entity.shutdown();
        self.bus.raise(&Event::EntityDeleted { entity: id });
    }

    // ── Access & queries ────────────────────────────────────────────────────

    /// Returns the prototype name the entity was spawned from.
    #[must_use]
    pub fn prototype_of(&self, id: EntityId) -> Option<&str> {
        self.entities.get(&id).map(|r| r.entity.prototype())
    }

    /// Returns the set of families attached to the entity.
    #[must_use]
    pub fn families(&self, id: EntityId) -> Option<FamilySet> {
        self.entities.get(&id).map(|r| r.entity.families())
    }

    /// Typed access to a component.
    #[must_use]
    pub fn component<T: Component>(&self, id: EntityId, family: ComponentFamily) -> Option<&T> {
        self.entities.get(&id)?.entity.get::<T>(family)
    }

    /// Typed mutable access to a component.
    pub fn component_mut<T: Component>(
        &mut self,
        id: EntityId,
        family: ComponentFamily,
    ) -> Option<&mut T> {
        self.entities.get_mut(&id)?.entity.get_mut::<T>(family)
    }

    /// All live entity ids, sorted for deterministic iteration.
    #[must_use]
    pub fn entity_ids(&self) -> Vec<EntityId> {
        let mut ids: Vec<_> = self.entities.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// All entities matching a family query, sorted by id.
    #[must_use]
    pub fn entities_matching(&self, query: &EntityQuery) -> Vec<EntityId> {
        let mut ids: Vec<_> = self
            .entities
            .iter()
            .filter(|(_, record)| query.matches(record.entity.families()))
            .map(|(&id, _)| id)
            .collect();
        ids.sort_unstable();
        ids
    }

    // ── Messages ────────────────────────────────────────────────────────────

    /// Synchronously dispatch a message to one component, resolved by
    /// family on the target entity.
    ///
    /// An absent entity or family yields [`ComponentReply::Empty`] — never
    /// an error.
    pub fn send_message(
        &mut self,
        sender: Option<ComponentFamily>,
        id: EntityId,
        family: ComponentFamily,
        message: &ComponentMessage,
    ) -> ComponentReply {
        match self.entities.get_mut(&id) {
            Some(record) => record.entity.send_message(sender, family, message),
            None => ComponentReply::Empty,
        }
    }

    /// Apply an authoritative component snapshot to a live entity.
    ///
    /// Returns `true` if the entity exists and carries the snapshot's
    /// family.
    pub fn apply_component_state(
        &mut self,
        id: EntityId,
        state: &ComponentState,
        sequence: u32,
    ) -> bool {
        let Some(record) = self.entities.get_mut(&id) else {
            return false;
        };
        match record.entity.component_mut(state.family()) {
            Some(component) => {
                component.handle_state(state, sequence);
                true
            }
            None => false,
        }
    }

    // ── Events ──────────────────────────────────────────────────────────────

    /// Raise a broadcast event immediately.
    pub fn raise(&mut self, event: &Event) {
        self.bus.raise(event);
    }

    /// Raise a directed event immediately against a live entity.
    ///
    /// Dropped silently if the entity is gone — directed events to deleted
    /// entities are a normal race.
    pub fn raise_local(&mut self, id: EntityId, event: &Event) {
        if let Some(record) = self.entities.get(&id) {
            let families = record.entity.families();
            self.bus.raise_directed(id, families, event);
        }
    }

    /// Defer a broadcast event to the next tick's drain.
    pub fn queue_event(&mut self, event: Event) {
        self.bus.queue(event);
    }

    /// Defer a directed event to the next tick's drain.
    pub fn queue_local(&mut self, id: EntityId, event: Event) {
        self.bus.queue_directed(id, event);
    }

    /// Drain queued events in FIFO order, resolving directed targets to
    /// their current family sets. Called once per tick, before systems run.
    pub fn drain_events(&mut self) {
        for queued in self.bus.take_queued() {
            match queued.target {
                None => self.bus.raise(&queued.event),
                Some(id) => {
                    let Some(record) = self.entities.get(&id) else {
                        continue;
                    };
                    let families = record.entity.families();
                    self.bus.raise_directed(id, families, &queued.event);
                }
            }
        }
    }

    // ── State capture ───────────────────────────────────────────────────────

    /// Capture the replicated state of every live entity, sorted by id.
    ///
    /// The output is always a complete snapshot; per-component dirty flags
    /// only decide whether an entity's snapshot is rebuilt or served from
    /// the cache of the previous capture. Runs after a tick fully
    /// completes, so it never observes a torn update.
    pub fn capture_states(&mut self) -> Vec<EntityState> {
        let mut ids: Vec<_> = self.entities.keys().copied().collect();
        ids.sort_unstable();

        let mut states = Vec::with_capacity(ids.len());
        for id in ids {
            let Some(record) = self.entities.get_mut(&id) else {
                continue;
            };
            let rebuild = record.cached.is_none() || record.entity.any_dirty();
            if rebuild {
                let state = EntityState {
                    id,
                    prototype: record.entity.prototype().to_string(),
                    states: record.entity.capture_states(),
                };
                record.entity.mark_clean();
                record.cached = Some(state);
            }
            if let Some(cached) = &record.cached {
                states.push(cached.clone());
            }
        }
        states
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use glam::Vec2;
    use station_core::components::{TransformComponent, VelocityComponent};
    use station_core::state::TransformState;
    use station_events::EventKind;

    use super::*;

    fn test_registry() -> PrototypeRegistry {
        let mut registry = PrototypeRegistry::new();
        registry
            .load_json(
                r#"[
                    {
                        "name": "crate",
                        "components": [
                            { "family": "Transform",
                              "initial": { "Transform": { "position": [5.0, 5.0], "rotation": 0.0 } } },
                            { "family": "Collidable" }
                        ]
                    },
                    {
                        "name": "drone",
                        "components": [
                            { "family": "Transform" },
                            { "family": "Velocity" },
                            { "family": "Damageable" }
                        ]
                    }
                ]"#,
            )
            .unwrap();
        registry
    }

    fn manager() -> EntityManager {
        EntityManager::new(test_registry())
    }

    #[test]
    fn test_spawn_applies_prototype_initial_state() {
        let mut m = manager();
        let id = m.spawn("crate").unwrap();

        let transform = m
            .component::<TransformComponent>(id, ComponentFamily::Transform)
            .unwrap();
        assert_eq!(transform.position(), Vec2::new(5.0, 5.0));
        assert!(m.families(id).unwrap().contains(ComponentFamily::Collidable));
    }

    #[test]
    fn test_spawn_unknown_prototype_fails() {
        let mut m = manager();
        let err = m.spawn("gibberish").unwrap_err();
        assert!(matches!(err, SpawnError::PrototypeNotFound(name) if name == "gibberish"));
    }

    #[test]
    fn test_delete_is_idempotent() {
        let mut m = manager();
        let id = m.spawn("crate").unwrap();
        m.delete(id);
        assert!(!m.contains(id));
        // Double delete must be a no-op.
        m.delete(id);
        assert!(m.is_empty());
    }

    #[test]
    fn test_spawn_after_delete_never_reuses_id() {
        let mut m = manager();
        let first = m.spawn("crate").unwrap();
        m.delete(first);
        let second = m.spawn("crate").unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_send_message_to_absent_family_is_empty() {
        let mut m = manager();
        let id = m.spawn("crate").unwrap();
        // "crate" has no Renderable component.
        let reply = m.send_message(
            None,
            id,
            ComponentFamily::Renderable,
            &ComponentMessage::GetAabb,
        );
        assert_eq!(reply, ComponentReply::Empty);
    }

    #[test]
    fn test_send_message_to_absent_entity_is_empty() {
        let mut m = manager();
        let reply = m.send_message(
            None,
            EntityId::from_raw(999),
            ComponentFamily::Transform,
            &ComponentMessage::GetPosition,
        );
        assert_eq!(reply, ComponentReply::Empty);
    }

    #[test]
    fn test_entities_matching_query() {
        let mut m = manager();
        let moving = m.spawn("drone").unwrap();
        let _static_crate = m.spawn("crate").unwrap();

        let query = EntityQuery::new()
            .with_all(ComponentFamily::Transform)
            .with_all(ComponentFamily::Velocity);
        assert_eq!(m.entities_matching(&query), vec![moving]);

        let without_velocity = EntityQuery::new()
            .with_all(ComponentFamily::Transform)
            .with_none(ComponentFamily::Velocity);
        assert_eq!(m.entities_matching(&without_velocity), vec![_static_crate]);
    }

    #[test]
    fn test_capture_is_complete_and_sorted() {
        let mut m = manager();
        let a = m.spawn("crate").unwrap();
        let b = m.spawn("drone").unwrap();

        let states = m.capture_states();
        assert_eq!(states.len(), 2);
        assert_eq!(states[0].id, a);
        assert_eq!(states[1].id, b);
        // Crate carries Transform + Collidable snapshots.
        assert_eq!(states[0].states.len(), 2);
    }

    #[test]
    fn test_capture_reuses_cache_until_dirty() {
        let mut m = manager();
        let id = m.spawn("drone").unwrap();

        let first = m.capture_states();
        // Nothing changed: the second capture is identical.
        let second = m.capture_states();
        assert_eq!(first, second);

        // Mutate; the next capture reflects it.
        m.component_mut::<VelocityComponent>(id, ComponentFamily::Velocity)
            .unwrap()
            .set_linear(Vec2::new(1.0, 0.0));
        let third = m.capture_states();
        assert_ne!(second, third);
    }

    #[test]
    fn test_apply_component_state() {
        let mut m = manager();
        let id = m.spawn("crate").unwrap();
        let applied = m.apply_component_state(
            id,
            &ComponentState::Transform(TransformState {
                position: Vec2::new(9.0, 9.0),
                rotation: 1.0,
            }),
            10,
        );
        assert!(applied);
        let transform = m
            .component::<TransformComponent>(id, ComponentFamily::Transform)
            .unwrap();
        assert_eq!(transform.position(), Vec2::new(9.0, 9.0));

        // Family not on the entity.
        let missing = m.apply_component_state(
            id,
            &ComponentState::Velocity(station_core::state::VelocityState {
                linear: Vec2::ZERO,
                angular: 0.0,
            }),
            10,
        );
        assert!(!missing);
    }

    #[test]
    fn test_spawn_mirror_keeps_server_id() {
        let mut m = manager();
        let server_id = EntityId::from_raw(4242);
        m.spawn_mirror(server_id, "crate").unwrap();
        assert!(m.contains(server_id));
        // Duplicate creation delivery is a no-op.
        m.spawn_mirror(server_id, "crate").unwrap();
        assert_eq!(m.len(), 1);

        assert!(matches!(
            m.spawn_mirror(EntityId::from_raw(1), "gibberish"),
            Err(SpawnError::PrototypeNotFound(_))
        ));
    }

    #[test]
    fn test_spawn_raises_broadcast_event() {
        let mut m = manager();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let s = seen.clone();
        m.bus_mut().subscribe(EventKind::EntitySpawned, move |event| {
            if let Event::EntitySpawned { prototype, .. } = event {
                s.lock().unwrap().push(prototype.clone());
            }
            Ok(())
        });
        m.spawn("crate").unwrap();
        assert_eq!(*seen.lock().unwrap(), vec!["crate".to_string()]);
    }

    #[test]
    fn test_raise_local_respects_family_filter() {
        let mut m = manager();
        let drone = m.spawn("drone").unwrap();
        let crate_id = m.spawn("crate").unwrap();

        let seen = Arc::new(Mutex::new(Vec::new()));
        let s = seen.clone();
        m.bus_mut().subscribe_directed(
            EventKind::DamageTaken,
            ComponentFamily::Damageable,
            move |entity, _| {
                s.lock().unwrap().push(entity);
                Ok(())
            },
        );

        let event = |entity| Event::DamageTaken {
            entity,
            amount: 1.0,
            remaining: 99.0,
        };
        // The drone has a Damageable component, the crate does not.
        m.raise_local(drone, &event(drone));
        m.raise_local(crate_id, &event(crate_id));
        assert_eq!(*seen.lock().unwrap(), vec![drone]);
    }

    #[test]
    fn test_queued_directed_event_resolves_current_families() {
        let mut m = manager();
        let id = m.spawn("drone").unwrap();

        let seen = Arc::new(Mutex::new(0));
        let s = seen.clone();
        m.bus_mut().subscribe_directed(
            EventKind::DamageTaken,
            ComponentFamily::Damageable,
            move |_, _| {
                *s.lock().unwrap() += 1;
                Ok(())
            },
        );

        m.queue_local(
            id,
            Event::DamageTaken {
                entity: id,
                amount: 5.0,
                remaining: 95.0,
            },
        );
        // Not delivered until the per-tick drain.
        assert_eq!(*seen.lock().unwrap(), 0);
        m.drain_events();
        assert_eq!(*seen.lock().unwrap(), 1);
    }
}
