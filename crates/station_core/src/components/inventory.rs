//! Inventory component — a container of other entities.

use std::any::Any;

use crate::component::Component;
use crate::entity::EntityId;
use crate::family::ComponentFamily;
use crate::message::{ComponentMessage, ComponentReply};
use crate::state::{ComponentState, InventoryState};

/// Holds up to `max_slots` entity ids.
#[derive(Debug)]
pub struct InventoryComponent {
    max_slots: u32,
    contents: Vec<EntityId>,
    dirty: bool,
    last_applied: u32,
}

impl InventoryComponent {
    /// Create an inventory with the given capacity.
    #[must_use]
    pub fn new(max_slots: u32) -> Self {
        Self {
            max_slots,
            contents: Vec::new(),
            dirty: true,
            last_applied: 0,
        }
    }

    /// Returns the contained entity ids.
    #[must_use]
    pub fn contents(&self) -> &[EntityId] {
        &self.contents
    }

    /// Returns `true` if the inventory holds the given entity.
    #[must_use]
    pub fn contains(&self, item: EntityId) -> bool {
        self.contents.contains(&item)
    }

    /// Add an entity. Fails when full or already contained.
    pub fn pick_up(&mut self, item: EntityId) -> bool {
        if self.contents.len() as u32 >= self.max_slots || self.contains(item) {
            return false;
        }
        self.contents.push(item);
        self.dirty = true;
        true
    }

    /// Remove an entity. Fails when not contained.
    pub fn drop_item(&mut self, item: EntityId) -> bool {
        let Some(pos) = self.contents.iter().position(|&e| e == item) else {
            return false;
        };
        self.contents.remove(pos);
        self.dirty = true;
        true
    }
}

impl Default for InventoryComponent {
    fn default() -> Self {
        Self::new(4)
    }
}

impl Component for InventoryComponent {
    fn family(&self) -> ComponentFamily {
        ComponentFamily::Inventory
    }

    fn receive_message(
        &mut self,
        _sender: Option<ComponentFamily>,
        message: &ComponentMessage,
    ) -> ComponentReply {
        match message {
            ComponentMessage::PickUpItem { item } => {
                if self.pick_up(*item) {
                    ComponentReply::Handled
                } else {
                    ComponentReply::Empty
                }
            }
            ComponentMessage::DropItem { item } => {
                if self.drop_item(*item) {
                    ComponentReply::Handled
                } else {
                    ComponentReply::Empty
                }
            }
            _ => ComponentReply::Empty,
        }
    }

    fn state(&self) -> Option<ComponentState> {
        Some(ComponentState::Inventory(InventoryState {
            max_slots: self.max_slots,
            contents: self.contents.clone(),
        }))
    }

    fn is_dirty(&self) -> bool {
        self.dirty
    }

    fn mark_clean(&mut self) {
        self.dirty = false;
    }

    fn handle_state(&mut self, state: &ComponentState, sequence: u32) {
        let ComponentState::Inventory(next) = state else {
            return;
        };
        if sequence < self.last_applied {
            return;
        }
        self.last_applied = sequence;
        self.max_slots = next.max_slots;
        self.contents = next.contents.clone();
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
    fn test_pick_up_and_drop() {
        let mut inv = InventoryComponent::new(2);
        let item = EntityId::from_raw(9);
        assert!(inv.pick_up(item));
        assert!(inv.contains(item));
        // Duplicates are rejected.
        assert!(!inv.pick_up(item));
        assert!(inv.drop_item(item));
        assert!(!inv.drop_item(item));
    }

    #[test]
    fn test_capacity_limit() {
        let mut inv = InventoryComponent::new(1);
        assert!(inv.pick_up(EntityId::from_raw(1)));
        let reply = inv.receive_message(
            None,
            &ComponentMessage::PickUpItem {
                item: EntityId::from_raw(2),
            },
        );
        assert_eq!(reply, ComponentReply::Empty);
    }
}
