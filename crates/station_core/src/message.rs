//! Component messages — entity-local coordination between components.
//!
//! A [`ComponentMessage`] is a discriminated value sent to a component
//! resolved by family on a given entity. Dispatch is synchronous and
//! returns a [`ComponentReply`]; sending to an absent family yields
//! [`ComponentReply::Empty`], never an error.
//!
//! The same enum is marshaled across the network inside a
//! `NetMessage::EntityComponentMessage`, tagged with the target entity,
//! family, and delivery guarantee.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entity::EntityId;
use crate::state::LightMode;

/// A message addressed to a single component, resolved by family.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ComponentMessage {
    /// Ask for the component's local-space bounding box.
    GetAabb,
    /// Ask for the current position and rotation.
    GetPosition,
    /// Teleport to a world position.
    SetPosition { position: Vec2 },
    /// Move by an offset.
    Translate { offset: Vec2 },
    /// Set the rotation, in radians.
    SetRotation { rotation: f32 },
    /// Set the linear velocity.
    SetVelocity { linear: Vec2 },
    /// Apply damage.
    Damage { amount: f32 },
    /// Restore health.
    Heal { amount: f32 },
    /// Put an entity into the inventory.
    PickUpItem { item: EntityId },
    /// Remove an entity from the inventory.
    DropItem { item: EntityId },
    /// Switch the light on or off.
    SetLightEnabled { enabled: bool },
    /// Change the light behavior variant.
    SetLightMode { mode: LightMode },
    /// Change the sprite resource.
    SetSprite { sprite: String },
    /// Show or hide the entity.
    SetVisible { visible: bool },
    /// Bind a player session to this entity.
    AttachSession { session: Uuid },
    /// Unbind the controlling session.
    DetachSession,
}

/// The reply returned from a component message dispatch.
///
/// `Empty` is the sentinel for "no component answered" — it is returned
/// both by a component that does not handle the message kind and by the
/// dispatcher when the target family is absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ComponentReply {
    /// No reply; the message was unhandled or the target family is absent.
    Empty,
    /// The message was handled but has no data to return.
    Handled,
    /// A local-space axis-aligned bounding box.
    Aabb { min: Vec2, max: Vec2 },
    /// Current position and rotation.
    Position { position: Vec2, rotation: f32 },
}

impl ComponentReply {
    /// Returns `true` if this is the [`ComponentReply::Empty`] sentinel.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self, ComponentReply::Empty)
    }
}
