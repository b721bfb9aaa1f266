//! Light component — emission parameters with a behavior variant.
//!
//! The [`LightMode`] variant replaces the point-light/flash-light
//! inheritance of older engine generations: shared fields live here, the
//! specialization is data.

use std::any::Any;

use crate::component::Component;
use crate::family::ComponentFamily;
use crate::message::{ComponentMessage, ComponentReply};
use crate::state::{ComponentState, LightMode, LightState};

/// A light source attached to an entity.
#[derive(Debug)]
pub struct LightComponent {
    mode: LightMode,
    color: [u8; 3],
    radius: f32,
    enabled: bool,
    dirty: bool,
    last_applied: u32,
}

impl LightComponent {
    /// Create a light with the given mode, color, and radius.
    #[must_use]
    pub fn new(mode: LightMode, color: [u8; 3], radius: f32) -> Self {
        Self {
            mode,
            color,
            radius,
            enabled: true,
            dirty: true,
            last_applied: 0,
        }
    }

    /// Returns the behavior variant.
    #[must_use]
    pub fn mode(&self) -> LightMode {
        self.mode
    }

    /// Returns whether the light is on.
    #[must_use]
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Switch the light on or off.
    pub fn set_enabled(&mut self, enabled: bool) {
        if self.enabled != enabled {
            self.enabled = enabled;
            self.dirty = true;
        }
    }

    /// Change the behavior variant.
    pub fn set_mode(&mut self, mode: LightMode) {
        if self.mode != mode {
            self.mode = mode;
            self.dirty = true;
        }
    }
}

impl Default for LightComponent {
    fn default() -> Self {
        Self::new(LightMode::Constant, [255, 255, 255], 5.0)
    }
}

impl Component for LightComponent {
    fn family(&self) -> ComponentFamily {
        ComponentFamily::Light
    }

    fn receive_message(
        &mut self,
        _sender: Option<ComponentFamily>,
        message: &ComponentMessage,
    ) -> ComponentReply {
        match message {
            ComponentMessage::SetLightEnabled { enabled } => {
                self.set_enabled(*enabled);
                ComponentReply::Handled
            }
            ComponentMessage::SetLightMode { mode } => {
                self.set_mode(*mode);
                ComponentReply::Handled
            }
            _ => ComponentReply::Empty,
        }
    }

    fn state(&self) -> Option<ComponentState> {
        Some(ComponentState::Light(LightState {
            mode: self.mode,
            color: self.color,
            radius: self.radius,
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
        let ComponentState::Light(next) = state else {
            return;
        };
        if sequence < self.last_applied {
            return;
        }
        self.last_applied = sequence;
        self.mode = next.mode;
        self.color = next.color;
        self.radius = next.radius;
        self.enabled = next.enabled;
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
