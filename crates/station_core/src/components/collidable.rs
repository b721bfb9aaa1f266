//! Collidable component — collision shape and behavior variant.
//!
//! Collision response itself belongs to the physics collaborator; this
//! component only carries the shape and answers AABB queries from siblings.
//! The AABB reply is in local space — callers combine it with the sibling
//! transform.

use std::any::Any;

use glam::Vec2;

use crate::component::Component;
use crate::family::ComponentFamily;
use crate::message::{ComponentMessage, ComponentReply};
use crate::state::{CollidableKind, CollidableState, ComponentState};

/// Axis-aligned collision shape with a behavior variant.
#[derive(Debug)]
pub struct CollidableComponent {
    kind: CollidableKind,
    half_extents: Vec2,
    enabled: bool,
    dirty: bool,
    last_applied: u32,
}

impl CollidableComponent {
    /// Create a collidable with the given variant and half extents.
    #[must_use]
    pub fn new(kind: CollidableKind, half_extents: Vec2) -> Self {
        Self {
            kind,
            half_extents,
            enabled: true,
            dirty: true,
            last_applied: 0,
        }
    }

    /// Returns the behavior variant.
    #[must_use]
    pub fn kind(&self) -> CollidableKind {
        self.kind
    }

    /// Returns the half extents in meters.
    #[must_use]
    pub fn half_extents(&self) -> Vec2 {
        self.half_extents
    }

    /// Returns whether collision is enabled.
    #[must_use]
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Enable or disable collision.
    pub fn set_enabled(&mut self, enabled: bool) {
        if self.enabled != enabled {
            self.enabled = enabled;
            self.dirty = true;
        }
    }
}

impl Default for CollidableComponent {
    fn default() -> Self {
        Self::new(CollidableKind::Dynamic, Vec2::new(0.5, 0.5))
    }
}

impl Component for CollidableComponent {
    fn family(&self) -> ComponentFamily {
        ComponentFamily::Collidable
    }

    fn receive_message(
        &mut self,
        _sender: Option<ComponentFamily>,
        message: &ComponentMessage,
    ) -> ComponentReply {
        match message {
            ComponentMessage::GetAabb => ComponentReply::Aabb {
                min: -self.half_extents,
                max: self.half_extents,
            },
            _ => ComponentReply::Empty,
        }
    }

    fn state(&self) -> Option<ComponentState> {
        Some(ComponentState::Collidable(CollidableState {
            kind: self.kind,
            half_extents: self.half_extents,
            enabled: self.enabled,
        }))
    }

    fn is_dirty(&self) -> bool {
        self.dirty
    }

    fn mark_clean(&mut self) {
        self.dirty = false;
    }

    fn handle_state(&mut self, state: &ComponentState, sequence: u32) {
        let ComponentState::Collidable(next) = state else {
            return;
        };
        if sequence < self.last_applied {
            return;
        }
        self.last_applied = sequence;
        self.kind = next.kind;
        self.half_extents = next.half_extents;
        self.enabled = next.enabled;
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
