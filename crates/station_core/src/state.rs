//! Serializable component state — the networked subset of component data.
//!
//! A [`ComponentState`] is an immutable value snapshot of one component's
//! networked fields at a given tick. It is a sealed tagged union with one
//! variant per networked family, so state application on the receiving side
//! is a compile-time `match`, and every variant is independently
//! deserializable without touching live objects.
//!
//! All spatial fields use simulation units: world meters and radians. No
//! client-only unit conversion leaks into the wire format.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entity::EntityId;
use crate::family::ComponentFamily;

/// Snapshot of one component's networked fields.
///
/// Value-equality (`PartialEq`) between two snapshots of the same family is
/// what the delta engine uses to decide whether an entity changed between
/// two game states.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ComponentState {
    /// World position and rotation.
    Transform(TransformState),
    /// Linear and angular velocity.
    Velocity(VelocityState),
    /// Collision shape and behavior variant.
    Collidable(CollidableState),
    /// Sprite and draw metadata.
    Renderable(RenderableState),
    /// Container contents.
    Inventory(InventoryState),
    /// Light emission parameters.
    Light(LightState),
    /// Health and death tracking.
    Damageable(DamageableState),
    /// Player control binding.
    Actor(ActorState),
}

impl ComponentState {
    /// Returns the family this state belongs to.
    #[must_use]
    pub fn family(&self) -> ComponentFamily {
        match self {
            ComponentState::Transform(_) => ComponentFamily::Transform,
            ComponentState::Velocity(_) => ComponentFamily::Velocity,
            ComponentState::Collidable(_) => ComponentFamily::Collidable,
            ComponentState::Renderable(_) => ComponentFamily::Renderable,
            ComponentState::Inventory(_) => ComponentFamily::Inventory,
            ComponentState::Light(_) => ComponentFamily::Light,
            ComponentState::Damageable(_) => ComponentFamily::Damageable,
            ComponentState::Actor(_) => ComponentFamily::Actor,
        }
    }
}

/// Networked fields of the transform component. Position in world meters,
/// rotation in radians.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TransformState {
    /// World-space position.
    pub position: Vec2,
    /// Rotation in radians.
    pub rotation: f32,
}

/// Networked fields of the velocity component.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VelocityState {
    /// Linear velocity in meters per second.
    pub linear: Vec2,
    /// Angular velocity in radians per second.
    pub angular: f32,
}

/// The behavior variant of a collidable.
///
/// Replaces what older generations modeled as an inheritance chain
/// (collidable → triggerable): the shared fields live on the component, the
/// specialization is this enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CollidableKind {
    /// Immovable geometry.
    Static,
    /// Moving body that blocks.
    Dynamic,
    /// Overlap region that raises events but does not block.
    Trigger,
}

/// Networked fields of the collidable component.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CollidableState {
    /// Behavior variant.
    pub kind: CollidableKind,
    /// Half extents of the axis-aligned bounding box, in meters.
    pub half_extents: Vec2,
    /// Whether collision is currently enabled.
    pub enabled: bool,
}

/// Networked fields of the renderable component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderableState {
    /// Sprite resource name.
    pub sprite: String,
    /// Draw ordering depth.
    pub draw_depth: i32,
    /// Whether the entity is drawn at all.
    pub visible: bool,
}

/// Networked fields of the inventory component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryState {
    /// Maximum number of held entities.
    pub max_slots: u32,
    /// Ids of contained entities.
    pub contents: Vec<EntityId>,
}

/// The behavior variant of a light.
///
/// Replaces the point-light → flash-light inheritance of older generations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LightMode {
    /// Steady emission.
    Constant,
    /// Random flicker.
    Flicker,
    /// Smooth pulse.
    Pulse,
}

/// Networked fields of the light component.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LightState {
    /// Behavior variant.
    pub mode: LightMode,
    /// RGB color.
    pub color: [u8; 3],
    /// Emission radius in meters.
    pub radius: f32,
    /// Whether the light is on.
    pub enabled: bool,
}

/// Networked fields of the damageable component.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DamageableState {
    /// Current health.
    pub health: f32,
    /// Maximum health.
    pub max_health: f32,
    /// Whether the entity is dead.
    pub dead: bool,
}

/// Networked fields of the actor component.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActorState {
    /// The session controlling this entity, if any.
    pub controlled_by: Option<Uuid>,
}
