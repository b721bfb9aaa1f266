//! Transform component — world position and rotation.
//!
//! The primary spatial component: nearly every entity in the simulation has
//! one. Position is in world meters, rotation in radians, matching the wire
//! format exactly.

use std::any::Any;

use glam::Vec2;

use crate::component::Component;
use crate::family::ComponentFamily;
use crate::message::{ComponentMessage, ComponentReply};
use crate::state::{ComponentState, TransformState};

/// World-space position and rotation.
#[derive(Debug)]
pub struct TransformComponent {
    position: Vec2,
    rotation: f32,
    dirty: bool,
    last_applied: u32,
}

impl TransformComponent {
    /// Create a transform at the given position with no rotation.
    #[must_use]
    pub fn new(position: Vec2) -> Self {
        Self {
            position,
            rotation: 0.0,
            dirty: true,
            last_applied: 0,
        }
    }

    /// Returns the world-space position.
    #[must_use]
    pub fn position(&self) -> Vec2 {
        self.position
    }

    /// Returns the rotation in radians.
    #[must_use]
    pub fn rotation(&self) -> f32 {
        self.rotation
    }

    /// Teleport to a world position.
    pub fn set_position(&mut self, position: Vec2) {
        if self.position != position {
            self.position = position;
            self.dirty = true;
        }
    }

    /// Move by an offset.
    pub fn translate(&mut self, offset: Vec2) {
        if offset != Vec2::ZERO {
            self.position += offset;
            self.dirty = true;
        }
    }

    /// Set the rotation, in radians.
    pub fn set_rotation(&mut self, rotation: f32) {
        if self.rotation != rotation {
            self.rotation = rotation;
            self.dirty = true;
        }
    }
}

impl Default for TransformComponent {
    fn default() -> Self {
        Self::new(Vec2::ZERO)
    }
}

impl Component for TransformComponent {
    fn family(&self) -> ComponentFamily {
        ComponentFamily::Transform
    }

    fn receive_message(
        &mut self,
        _sender: Option<ComponentFamily>,
        message: &ComponentMessage,
    ) -> ComponentReply {
        match message {
            ComponentMessage::GetPosition => ComponentReply::Position {
                position: self.position,
                rotation: self.rotation,
            },
            ComponentMessage::SetPosition { position } => {
                self.set_position(*position);
                ComponentReply::Handled
            }
            ComponentMessage::Translate { offset } => {
                self.translate(*offset);
                ComponentReply::Handled
            }
            ComponentMessage::SetRotation { rotation } => {
                self.set_rotation(*rotation);
                ComponentReply::Handled
            }
            _ => ComponentReply::Empty,
        }
    }

    fn state(&self) -> Option<ComponentState> {
        Some(ComponentState::Transform(TransformState {
            position: self.position,
            rotation: self.rotation,
        }))
    }

    fn is_dirty(&self) -> bool {
        self.dirty
    }

    fn mark_clean(&mut self) {
        self.dirty = false;
    }

    fn handle_state(&mut self, state: &ComponentState, sequence: u32) {
        let ComponentState::Transform(next) = state else {
            return;
        };
        if sequence < self.last_applied {
            return;
        }
        self.last_applied = sequence;
        self.position = next.position;
        self.rotation = next.rotation;
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_translate_marks_dirty() {
        let mut t = TransformComponent::new(Vec2::new(5.0, 5.0));
        t.mark_clean();
        t.translate(Vec2::new(1.0, 0.0));
        assert!(t.is_dirty());
        assert_eq!(t.position(), Vec2::new(6.0, 5.0));
    }

    #[test]
    fn test_noop_translate_stays_clean() {
        let mut t = TransformComponent::new(Vec2::ZERO);
        t.mark_clean();
        t.translate(Vec2::ZERO);
        assert!(!t.is_dirty());
    }

    #[test]
    fn test_get_position_message() {
        let mut t = TransformComponent::new(Vec2::new(2.0, 3.0));
        let reply = t.receive_message(None, &ComponentMessage::GetPosition);
        assert_eq!(
            reply,
            ComponentReply::Position {
                position: Vec2::new(2.0, 3.0),
                rotation: 0.0
            }
        );
    }

    #[test]
    fn test_handle_state_ignores_stale_sequence() {
        let mut t = TransformComponent::default();
        let newer = ComponentState::Transform(TransformState {
            position: Vec2::new(6.0, 5.0),
            rotation: 0.0,
        });
        let older = ComponentState::Transform(TransformState {
            position: Vec2::new(5.0, 5.0),
            rotation: 0.0,
        });
        t.handle_state(&newer, 101);
        t.handle_state(&older, 100);
        assert_eq!(t.position(), Vec2::new(6.0, 5.0));
    }

    #[test]
    fn test_handle_state_duplicate_is_idempotent() {
        let mut t = TransformComponent::default();
        let state = ComponentState::Transform(TransformState {
            position: Vec2::new(1.0, 1.0),
            rotation: 0.25,
        });
        t.handle_state(&state, 7);
        t.handle_state(&state, 7);
        assert_eq!(t.position(), Vec2::new(1.0, 1.0));
        assert_eq!(t.rotation(), 0.25);
    }
}
