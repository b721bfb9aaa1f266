//! Actor component — binds a player session to an entity.

use std::any::Any;

use uuid::Uuid;

use crate::component::Component;
use crate::family::ComponentFamily;
use crate::message::{ComponentMessage, ComponentReply};
use crate::state::{ActorState, ComponentState};

/// Marks an entity as controllable and tracks the controlling session.
#[derive(Debug)]
pub struct ActorComponent {
    controlled_by: Option<Uuid>,
    dirty: bool,
    last_applied: u32,
}

impl ActorComponent {
    /// Create an unbound actor.
    #[must_use]
    pub fn new() -> Self {
        Self {
            controlled_by: None,
            dirty: true,
            last_applied: 0,
        }
    }

    /// Returns the controlling session, if any.
    #[must_use]
    pub fn controlled_by(&self) -> Option<Uuid> {
        self.controlled_by
    }

    /// Bind a session to this entity.
    pub fn attach(&mut self, session: Uuid) {
        if self.controlled_by != Some(session) {
            self.controlled_by = Some(session);
            self.dirty = true;
        }
    }

    /// Unbind the controlling session.
    pub fn detach(&mut self) {
        if self.controlled_by.is_some() {
            self.controlled_by = None;
            self.dirty = true;
        }
    }
}

impl Default for ActorComponent {
    fn default() -> Self {
        Self::new()
    }
}

impl Component for ActorComponent {
    fn family(&self) -> ComponentFamily {
        ComponentFamily::Actor
    }

    fn receive_message(
        &mut self,
        _sender: Option<ComponentFamily>,
        message: &ComponentMessage,
    ) -> ComponentReply {
        match message {
            ComponentMessage::AttachSession { session } => {
                self.attach(*session);
                ComponentReply::Handled
            }
            ComponentMessage::DetachSession => {
                self.detach();
                ComponentReply::Handled
            }
            _ => ComponentReply::Empty,
        }
    }

    fn state(&self) -> Option<ComponentState> {
        Some(ComponentState::Actor(ActorState {
            controlled_by: self.controlled_by,
        }))
    }

    fn is_dirty(&self) -> bool {
        self.dirty
    }

    fn mark_clean(&mut self) {
        self.dirty = false;
    }

    fn handle_state(&mut self, state: &ComponentState, sequence: u32) {
        let ComponentState::Actor(next) = state else {
            return;
        };
        if sequence < self.last_applied {
            return;
        }
        self.last_applied = sequence;
        self.controlled_by = next.controlled_by;
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
    fn test_attach_detach() {
        let mut actor = ActorComponent::new();
        let session = Uuid::from_u128(7);
        actor.mark_clean();
        actor.attach(session);
        assert_eq!(actor.controlled_by(), Some(session));
        assert!(actor.is_dirty());
        actor.detach();
        assert_eq!(actor.controlled_by(), None);
    }
}
