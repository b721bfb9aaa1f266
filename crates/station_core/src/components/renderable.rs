//! Renderable component — sprite and draw metadata.
//!
//! Rendering itself is an external collaborator; it reads this component's
//! state and never mutates it.

use std::any::Any;

use crate::component::Component;
use crate::family::ComponentFamily;
use crate::message::{ComponentMessage, ComponentReply};
use crate::state::{ComponentState, RenderableState};

/// Sprite resource, draw ordering, and visibility.
#[derive(Debug)]
pub struct RenderableComponent {
    sprite: String,
    draw_depth: i32,
    visible: bool,
    dirty: bool,
    last_applied: u32,
}

impl RenderableComponent {
    /// Create a renderable for the given sprite resource.
    #[must_use]
    pub fn new(sprite: impl Into<String>) -> Self {
        Self {
            sprite: sprite.into(),
            draw_depth: 0,
            visible: true,
            dirty: true,
            last_applied: 0,
        }
    }

    /// Returns the sprite resource name.
    #[must_use]
    pub fn sprite(&self) -> &str {
        &self.sprite
    }

    /// Returns whether the entity is drawn.
    #[must_use]
    pub fn visible(&self) -> bool {
        self.visible
    }

    /// Change the sprite resource.
    pub fn set_sprite(&mut self, sprite: impl Into<String>) {
        let sprite = sprite.into();
        if self.sprite != sprite {
            self.sprite = sprite;
            self.dirty = true;
        }
    }

    /// Show or hide the entity.
    pub fn set_visible(&mut self, visible: bool) {
        if self.visible != visible {
            self.visible = visible;
            self.dirty = true;
        }
    }
}

impl Default for RenderableComponent {
    fn default() -> Self {
        Self::new("")
    }
}

impl Component for RenderableComponent {
    fn family(&self) -> ComponentFamily {
        ComponentFamily::Renderable
    }

    fn receive_message(
        &mut self,
        _sender: Option<ComponentFamily>,
        message: &ComponentMessage,
    ) -> ComponentReply {
        match message {
            ComponentMessage::SetSprite { sprite } => {
                self.set_sprite(sprite.clone());
                ComponentReply::Handled
            }
            ComponentMessage::SetVisible { visible } => {
                self.set_visible(*visible);
                ComponentReply::Handled
            }
            _ => ComponentReply::Empty,
        }
    }

    fn state(&self) -> Option<ComponentState> {
        Some(ComponentState::Renderable(RenderableState {
            sprite: self.sprite.clone(),
            draw_depth: self.draw_depth,
            visible: self.visible,
        }))
    }

    fn is_dirty(&self) -> bool {
        self.dirty
    }

    fn mark_clean(&mut self) {
        self.dirty = false;
    }

    fn handle_state(&mut self, state: &ComponentState, sequence: u32) {
        let ComponentState::Renderable(next) = state else {
            return;
        };
        if sequence < self.last_applied {
            return;
        }
        self.last_applied = sequence;
        self.sprite = next.sprite.clone();
        self.draw_depth = next.draw_depth;
        self.visible = next.visible;
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
