//! Entity systems — periodic update subsystems over family queries.
//!
//! A system declares an [`EntityQuery`] (required, excluded, and any-of
//! families) and receives the matching entities once per update. Systems
//! run sequentially in registration order on the simulation thread, so an
//! update is deterministic given the same entity/component state. A system
//! that fails is logged and skipped for that tick only; it runs again next
//! tick.

use thiserror::Error;
use tracing::warn;

use station_core::{ComponentFamily, EntityId, FamilySet};

use crate::entity_manager::EntityManager;

/// An error returned by a system update.
#[derive(Debug, Error)]
#[error("system '{system}' failed: {reason}")]
pub struct SystemError {
    /// The failing system's name.
    pub system: &'static str,
    /// Human-readable failure description.
    pub reason: String,
}

impl SystemError {
    /// Create a system error.
    #[must_use]
    pub fn new(system: &'static str, reason: impl Into<String>) -> Self {
        Self {
            system,
            reason: reason.into(),
        }
    }
}

/// Declares which entities a system wants to see.
#[derive(Debug, Clone, Copy, Default)]
pub struct EntityQuery {
    all: FamilySet,
    none: FamilySet,
    any: FamilySet,
}

impl EntityQuery {
    /// Create an empty query (matches every entity).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Require a family to be present.
    #[must_use]
    pub fn with_all(mut self, family: ComponentFamily) -> Self {
        self.all.insert(family);
        self
    }

    /// Require a family to be absent.
    #[must_use]
    pub fn with_none(mut self, family: ComponentFamily) -> Self {
        self.none.insert(family);
        self
    }

    /// Require at least one of the `any` families to be present.
    #[must_use]
    pub fn with_any(mut self, family: ComponentFamily) -> Self {
        self.any.insert(family);
        self
    }

    /// Returns `true` if an entity with the given families matches.
    #[must_use]
    pub fn matches(&self, families: FamilySet) -> bool {
        families.contains_all(self.all)
            && !families.intersects(self.none)
            && (self.any.is_empty() || families.intersects(self.any))
    }
}

/// A periodic update subsystem.
pub trait EntitySystem: Send {
    /// Stable system name, used in logs.
    fn name(&self) -> &'static str;

    /// The family query selecting this system's entities.
    fn query(&self) -> EntityQuery;

    /// Run one update over the matching entities.
    ///
    /// `matched` is sorted by entity id. Correctness must not depend on
    /// iteration order across ticks.
    ///
    /// # Errors
    ///
    /// A returned error skips this system for the current tick only.
    fn update(
        &mut self,
        entities: &mut EntityManager,
        matched: &[EntityId],
        frame_time: f32,
    ) -> Result<(), SystemError>;
}

/// Runs a fixed set of systems in registration order.
#[derive(Default)]
pub struct SystemManager {
    systems: Vec<Box<dyn EntitySystem>>,
}

impl SystemManager {
    /// Create an empty system manager.
    #[must_use]
    pub fn new() -> Self {
        Self {
            systems: Vec::new(),
        }
    }

    /// Register a system. Registration order is execution order.
    pub fn register(&mut self, system: impl EntitySystem + 'static) {
        self.systems.push(Box::new(system));
    }

    /// Returns the number of registered systems.
    #[must_use]
    pub fn len(&self) -> usize {
        self.systems.len()
    }

    /// Returns `true` if no systems are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.systems.is_empty()
    }

    /// Run every system once, in registration order.
    ///
    /// A failing system is logged and skipped for this tick; the remaining
    /// systems still run.
    pub fn update(&mut self, entities: &mut EntityManager, frame_time: f32) {
        for system in &mut self.systems {
            let matched = entities.entities_matching(&system.query());
            if let Err(err) = system.update(entities, &matched, frame_time) {
                warn!(system = system.name(), %err, "system update failed, skipping this tick");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use station_core::PrototypeRegistry;

    use super::*;

    #[test]
    fn test_query_matching() {
        let query = EntityQuery::new()
            .with_all(ComponentFamily::Transform)
            .with_none(ComponentFamily::Light)
            .with_any(ComponentFamily::Velocity)
            .with_any(ComponentFamily::Damageable);

        let moving = FamilySet::from_families(&[ComponentFamily::Transform, ComponentFamily::Velocity]);
        assert!(query.matches(moving));

        let lit = FamilySet::from_families(&[
            ComponentFamily::Transform,
            ComponentFamily::Velocity,
            ComponentFamily::Light,
        ]);
        assert!(!query.matches(lit), "excluded family must reject");

        let bare = FamilySet::from_families(&[ComponentFamily::Transform]);
        assert!(!query.matches(bare), "no any-of family present");
    }

    #[test]
    fn test_empty_query_matches_everything() {
        assert!(EntityQuery::new().matches(FamilySet::EMPTY));
        assert!(EntityQuery::new().matches(FamilySet::from_families(&[ComponentFamily::Actor])));
    }

    struct Recorder {
        name: &'static str,
        log: Arc<Mutex<Vec<&'static str>>>,
        fail: bool,
    }

    impl EntitySystem for Recorder {
        fn name(&self) -> &'static str {
            self.name
        }

        fn query(&self) -> EntityQuery {
            EntityQuery::new()
        }

        fn update(
            &mut self,
            _entities: &mut EntityManager,
            _matched: &[EntityId],
            _frame_time: f32,
        ) -> Result<(), SystemError> {
            self.log.lock().unwrap().push(self.name);
            if self.fail {
                Err(SystemError::new(self.name, "intentional"))
            } else {
                Ok(())
            }
        }
    }

    #[test]
    fn test_systems_run_in_registration_order_and_isolate_failure() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut systems = SystemManager::new();
        systems.register(Recorder {
            name: "first",
            log: log.clone(),
            fail: false,
        });
        systems.register(Recorder {
            name: "failing",
            log: log.clone(),
            fail: true,
        });
        systems.register(Recorder {
            name: "last",
            log: log.clone(),
            fail: false,
        });

        let mut entities = EntityManager::new(PrototypeRegistry::new());
        systems.update(&mut entities, 1.0 / 60.0);
        assert_eq!(*log.lock().unwrap(), vec!["first", "failing", "last"]);

        // The failing system resumes on the next tick.
        systems.update(&mut entities, 1.0 / 60.0);
        assert_eq!(log.lock().unwrap().len(), 6);
    }
}
