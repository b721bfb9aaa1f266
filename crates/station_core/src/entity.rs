//! Entity identity, allocation, and the per-entity component container.
//!
//! An [`EntityId`] is a lightweight `u64` identifier. All ids are allocated
//! by the authoritative server and are never reused: replication state on
//! remote clients may reference an id long after the entity itself is gone,
//! so a recycled id would make a deletion and a later spawn
//! indistinguishable on the wire.
//!
//! An [`Entity`] owns its components in a fixed-size slot array indexed by
//! [`ComponentFamily`], which structurally enforces the invariant that no
//! two components of the same family coexist on one entity.

use serde::{Deserialize, Serialize};

use crate::component::Component;
use crate::family::{ComponentFamily, FamilySet};
use crate::message::{ComponentMessage, ComponentReply};
use crate::state::ComponentState;

/// A unique entity identifier.
///
/// Entities are pure identifiers on the wire — they carry no data of their
/// own. Components attached to an entity give it meaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub u64);

impl EntityId {
    /// The null / invalid entity sentinel.
    pub const INVALID: EntityId = EntityId(0);

    /// Create an entity id from a raw `u64`.
    #[must_use]
    pub const fn from_raw(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw `u64` identifier.
    #[must_use]
    pub const fn id(self) -> u64 {
        self.0
    }

    /// Returns `true` if this is a valid (non-zero) entity id.
    #[must_use]
    pub const fn is_valid(self) -> bool {
        self.0 != 0
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Entity({})", self.0)
    }
}

/// Allocates monotonically increasing entity ids.
///
/// The allocator is the single source of truth for entity identity on the
/// server. Ids are never recycled: a deleted entity's id stays retired for
/// the lifetime of the process, so a new spawn can never collide with an id
/// still referenced by in-flight replication state.
#[derive(Debug)]
pub struct EntityAllocator {
    next_id: u64,
}

impl EntityAllocator {
    /// Creates a new allocator. Ids start at 1 (0 is reserved for
    /// [`EntityId::INVALID`]).
    #[must_use]
    pub fn new() -> Self {
        Self { next_id: 1 }
    }

    /// Allocates a fresh entity id.
    pub fn allocate(&mut self) -> EntityId {
        let id = self.next_id;
        self.next_id += 1;
        EntityId(id)
    }

    /// Returns the number of ids allocated so far.
    #[must_use]
    pub fn count(&self) -> u64 {
        self.next_id - 1
    }
}

impl Default for EntityAllocator {
    fn default() -> Self {
        Self::new()
    }
}

/// An entity: an id plus its owned component set.
///
/// Components live in a slot array indexed by family, so family uniqueness
/// holds by construction. The entity remembers attachment order so that
/// deletion can run `on_remove` hooks in reverse order.
pub struct Entity {
    id: EntityId,
    prototype: String,
    slots: [Option<Box<dyn Component>>; ComponentFamily::COUNT],
    add_order: Vec<ComponentFamily>,
}

impl Entity {
    /// Create an entity with no components.
    #[must_use]
    pub fn new(id: EntityId, prototype: impl Into<String>) -> Self {
        Self {
            id,
            prototype: prototype.into(),
            slots: std::array::from_fn(|_| None),
            add_order: Vec::new(),
        }
    }

    /// Returns the entity's id.
    #[must_use]
    pub fn id(&self) -> EntityId {
        self.id
    }

    /// Returns the name of the prototype this entity was spawned from.
    #[must_use]
    pub fn prototype(&self) -> &str {
        &self.prototype
    }

    /// Attach a component, replacing any existing component of the same
    /// family (the old component's `on_remove` runs first).
    ///
    /// Runs the new component's `on_add` hook.
    pub fn add_component(&mut self, mut component: Box<dyn Component>) {
        let family = component.family();
        if let Some(mut old) = self.slots[family.index()].take() {
            old.on_remove();
            self.add_order.retain(|&f| f != family);
        }
        component.on_add(self.id);
        self.slots[family.index()] = Some(component);
        self.add_order.push(family);
    }

    /// Detach a component, running its `on_remove` hook.
    ///
    /// Returns `true` if a component of that family was present.
    pub fn remove_component(&mut self, family: ComponentFamily) -> bool {
        if let Some(mut component) = self.slots[family.index()].take() {
            component.on_remove();
            self.add_order.retain(|&f| f != family);
            true
        } else {
            false
        }
    }

    /// Returns `true` if a component of the given family is attached.
    #[must_use]
    pub fn has_component(&self, family: ComponentFamily) -> bool {
        self.slots[family.index()].is_some()
    }

    /// Returns the component of the given family, if attached.
    #[must_use]
    pub fn component(&self, family: ComponentFamily) -> Option<&dyn Component> {
        self.slots[family.index()].as_deref()
    }

    /// Returns the component of the given family mutably, if attached.
    pub fn component_mut(&mut self, family: ComponentFamily) -> Option<&mut dyn Component> {
        self.slots[family.index()].as_deref_mut()
    }

    /// Typed access to the component of the given family.
    #[must_use]
    pub fn get<T: Component>(&self, family: ComponentFamily) -> Option<&T> {
        self.component(family)?.as_any().downcast_ref::<T>()
    }

    /// Typed mutable access to the component of the given family.
    pub fn get_mut<T: Component>(&mut self, family: ComponentFamily) -> Option<&mut T> {
        self.slots[family.index()]
            .as_deref_mut()?
            .as_any_mut()
            .downcast_mut::<T>()
    }

    /// Returns the set of families currently attached.
    #[must_use]
    pub fn families(&self) -> FamilySet {
        let mut set = FamilySet::EMPTY;
        for family in ComponentFamily::ALL {
            if self.has_component(family) {
                set.insert(family);
            }
        }
        set
    }

    /// Run `initialize` on every component, in attachment order.
    pub fn initialize_components(&mut self) {
        for family in self.add_order.clone() {
            if let Some(component) = self.slots[family.index()].as_deref_mut() {
                component.initialize();
            }
        }
    }

    /// Synchronously dispatch a message to the component of `family`.
    ///
    /// Resolution is a family lookup on this entity. An absent family
    /// yields [`ComponentReply::Empty`] — never an error.
    pub fn send_message(
        &mut self,
        sender: Option<ComponentFamily>,
        family: ComponentFamily,
        message: &ComponentMessage,
    ) -> ComponentReply {
        match self.slots[family.index()].as_deref_mut() {
            Some(component) => component.receive_message(sender, message),
            None => ComponentReply::Empty,
        }
    }

    /// Dispatch a message to every attached component except the sender.
    ///
    /// Replies are collected in slot order.
    pub fn broadcast_message(
        &mut self,
        sender: Option<ComponentFamily>,
        message: &ComponentMessage,
    ) -> Vec<(ComponentFamily, ComponentReply)> {
        let mut replies = Vec::new();
        for family in ComponentFamily::ALL {
            if sender == Some(family) {
                continue;
            }
            if let Some(component) = self.slots[family.index()].as_deref_mut() {
                replies.push((family, component.receive_message(sender, message)));
            }
        }
        replies
    }

    /// Capture the networked states of all components, in slot order.
    #[must_use]
    pub fn capture_states(&self) -> Vec<ComponentState> {
        ComponentFamily::ALL
            .into_iter()
            .filter_map(|f| self.component(f)?.state())
            .collect()
    }

    /// Returns `true` if any component's networked fields changed since the
    /// last capture.
    #[must_use]
    pub fn any_dirty(&self) -> bool {
        ComponentFamily::ALL
            .into_iter()
            .filter_map(|f| self.component(f))
            .any(Component::is_dirty)
    }

    /// Clear every component's dirty flag after a capture pass.
    pub fn mark_clean(&mut self) {
        for family in ComponentFamily::ALL {
            if let Some(component) = self.slots[family.index()].as_deref_mut() {
                component.mark_clean();
            }
        }
    }

    /// Tear down the entity: run `on_remove` on every component in reverse
    /// attachment order and drop them.
    pub fn shutdown(&mut self) {
        while let Some(family) = self.add_order.pop() {
            if let Some(mut component) = self.slots[family.index()].take() {
                component.on_remove();
            }
        }
    }
}

impl std::fmt::Debug for Entity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Entity")
            .field("id", &self.id)
            .field("prototype", &self.prototype)
            .field("families", &self.add_order)
            .finish()
    }
}
