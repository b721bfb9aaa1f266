//! Velocity component — linear and angular motion.

use std::any::Any;

use glam::Vec2;

use crate::component::Component;
use crate::family::ComponentFamily;
use crate::message::{ComponentMessage, ComponentReply};
use crate::state::{ComponentState, VelocityState};

/// Linear velocity in meters per second, angular in radians per second.
#[derive(Debug)]
pub struct VelocityComponent {
    linear: Vec2,
    angular: f32,
    dirty: bool,
    last_applied: u32,
}

impl VelocityComponent {
    /// Create a velocity component with the given linear velocity.
    #[must_use]
    pub fn new(linear: Vec2) -> Self {
        Self {
            linear,
            angular: 0.0,
            dirty: true,
            last_applied: 0,
        }
    }

    /// Returns the linear velocity.
    #[must_use]
    pub fn linear(&self) -> Vec2 {
        self.linear
    }

    /// Returns the angular velocity.
    #[must_use]
    pub fn angular(&self) -> f32 {
        self.angular
    }

    /// Set the linear velocity.
    pub fn set_linear(&mut self, linear: Vec2) {
        if self.linear != linear {
            self.linear = linear;
            self.dirty = true;
        }
    }

    /// Set the angular velocity.
    pub fn set_angular(&mut self, angular: f32) {
        if self.angular != angular {
            self.angular = angular;
            self.dirty = true;
        }
    }
}

impl Default for VelocityComponent {
    fn default() -> Self {
        Self::new(Vec2::ZERO)
    }
}

impl Component for VelocityComponent {
    fn family(&self) -> ComponentFamily {
        ComponentFamily::Velocity
    }

    fn receive_message(
        &mut self,
        _sender: Option<ComponentFamily>,
        message: &ComponentMessage,
    ) -> ComponentReply {
        match message {
            ComponentMessage::SetVelocity { linear } => {
                self.set_linear(*linear);
                ComponentReply::Handled
            }
            _ => ComponentReply::Empty,
        }
    }

    fn state(&self) -> Option<ComponentState> {
        Some(ComponentState::Velocity(VelocityState {
            linear: self.linear,
            angular: self.angular,
        }))
    }

    fn is_dirty(&self) -> bool {
        self.dirty
    }

    fn mark_clean(&mut self) {
        self.dirty = false;
    }

    fn handle_state(&mut self, state: &ComponentState, sequence: u32) {
        let ComponentState::Velocity(next) = state else {
            return;
        };
        if sequence < self.last_applied {
            return;
        }
        self.last_applied = sequence;
        self.linear = next.linear;
        self.angular = next.angular;
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
