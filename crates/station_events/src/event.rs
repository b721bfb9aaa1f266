//! Event types raised between components and systems.
//!
//! Events form a closed set, like component families: dispatch filters are
//! a `match` over [`EventKind`], never runtime type discovery.

use glam::Vec2;
use uuid::Uuid;

use station_core::EntityId;

/// A typed event value.
///
/// Raised either broadcast (to every subscriber of its kind) or directed at
/// a specific entity (to subscribers registered against a family that
/// entity possesses).
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// A new entity entered the world.
    EntitySpawned {
        /// The spawned entity.
        entity: EntityId,
        /// The prototype it was spawned from.
        prototype: String,
    },
    /// An entity left the world.
    EntityDeleted {
        /// The deleted entity.
        entity: EntityId,
    },
    /// Two collidables overlapped. Emitted by the physics collaborator.
    Collision {
        /// First entity.
        first: EntityId,
        /// Second entity.
        second: EntityId,
        /// Contact normal, pointing from `first` to `second`.
        normal: Vec2,
    },
    /// An entity took damage.
    DamageTaken {
        /// The damaged entity.
        entity: EntityId,
        /// Damage applied.
        amount: f32,
        /// Health remaining afterwards.
        remaining: f32,
    },
    /// An entity's health reached zero.
    EntityDied {
        /// The dead entity.
        entity: EntityId,
    },
    /// A player session took control of an entity.
    PlayerAttached {
        /// The controlled entity.
        entity: EntityId,
        /// The controlling session.
        session: Uuid,
    },
    /// A player session released control of an entity.
    PlayerDetached {
        /// The released entity.
        entity: EntityId,
        /// The session that had control.
        session: Uuid,
    },
}

/// The discriminant of an [`Event`], used as the subscription filter key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// [`Event::EntitySpawned`].
    EntitySpawned,
    /// [`Event::EntityDeleted`].
    EntityDeleted,
    /// [`Event::Collision`].
    Collision,
    /// [`Event::DamageTaken`].
    DamageTaken,
    /// [`Event::EntityDied`].
    EntityDied,
    /// [`Event::PlayerAttached`].
    PlayerAttached,
    /// [`Event::PlayerDetached`].
    PlayerDetached,
}

impl Event {
    /// Returns the kind discriminant of this event.
    #[must_use]
    pub fn kind(&self) -> EventKind {
        match self {
            Event::EntitySpawned { .. } => EventKind::EntitySpawned,
            Event::EntityDeleted { .. } => EventKind::EntityDeleted,
            Event::Collision { .. } => EventKind::Collision,
            Event::DamageTaken { .. } => EventKind::DamageTaken,
            Event::EntityDied { .. } => EventKind::EntityDied,
            Event::PlayerAttached { .. } => EventKind::PlayerAttached,
            Event::PlayerDetached { .. } => EventKind::PlayerDetached,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_kind_mapping() {
        let event = Event::EntityDied {
            entity: EntityId::from_raw(3),
        };
        assert_eq!(event.kind(), EventKind::EntityDied);
    }
}
