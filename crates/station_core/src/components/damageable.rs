//! Damageable component — health and death tracking.

use std::any::Any;

use crate::component::Component;
use crate::family::ComponentFamily;
use crate::message::{ComponentMessage, ComponentReply};
use crate::state::{ComponentState, DamageableState};

/// Health pool. Death is latched: a dead entity stays dead until its state
/// is replaced by the server.
#[derive(Debug)]
pub struct DamageableComponent {
    health: f32,
    max_health: f32,
    dead: bool,
    dirty: bool,
    last_applied: u32,
}

impl DamageableComponent {
    /// Create a damageable at full health.
    #[must_use]
    pub fn new(max_health: f32) -> Self {
        Self {
            health: max_health,
            max_health,
            dead: false,
            dirty: true,
            last_applied: 0,
        }
    }

    /// Returns the current health.
    #[must_use]
    pub fn health(&self) -> f32 {
        self.health
    }

    /// Returns `true` if the entity is dead.
    #[must_use]
    pub fn is_dead(&self) -> bool {
        self.dead
    }

    /// Apply damage. Returns the remaining health.
    pub fn damage(&mut self, amount: f32) -> f32 {
        if self.dead || amount <= 0.0 {
            return self.health;
        }
        self.health = (self.health - amount).max(0.0);
        if self.health == 0.0 {
            self.dead = true;
        }
        self.dirty = true;
        self.health
    }

    /// Restore health. Has no effect on a dead entity.
    pub fn heal(&mut self, amount: f32) {
        if self.dead || amount <= 0.0 {
            return;
        }
        let healed = (self.health + amount).min(self.max_health);
        if healed != self.health {
            self.health = healed;
            self.dirty = true;
        }
    }
}

impl Default for DamageableComponent {
    fn default() -> Self {
        Self::new(100.0)
    }
}

impl Component for DamageableComponent {
    fn family(&self) -> ComponentFamily {
        ComponentFamily::Damageable
    }

    fn receive_message(
        &mut self,
        _sender: Option<ComponentFamily>,
        message: &ComponentMessage,
    ) -> ComponentReply {
        match message {
            ComponentMessage::Damage { amount } => {
                self.damage(*amount);
                ComponentReply::Handled
            }
            ComponentMessage::Heal { amount } => {
                self.heal(*amount);
                ComponentReply::Handled
            }
            _ => ComponentReply::Empty,
        }
    }

    fn state(&self) -> Option<ComponentState> {
        Some(ComponentState::Damageable(DamageableState {
            health: self.health,
            max_health: self.max_health,
            dead: self.dead,
        }))
    }

    fn is_dirty(&self) -> bool {
        self.dirty
    }

    fn mark_clean(&mut self) {
        self.dirty = false;
    }

    fn handle_state(&mut self, state: &ComponentState, sequence: u32) {
        let ComponentState::Damageable(next) = state else {
            return;
        };
        if sequence < self.last_applied {
            return;
        }
        self.last_applied = sequence;
        self.health = next.health;
        self.max_health = next.max_health;
        self.dead = next.dead;
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
