//! The core [`Component`] trait.
//!
//! A component is a typed data/behavior unit attached to exactly one entity.
//! It carries a [`ComponentFamily`] tag, lifecycle hooks, a synchronous
//! message handler, and a serializable networked state.
//!
//! ## Lifecycle
//!
//! `on_add` fires when the component is attached to its entity, `initialize`
//! after every component declared by the prototype has been attached, and
//! `on_remove` when the component is detached or its entity is deleted.
//!
//! ## Networked state
//!
//! [`Component::state`] captures the networked fields as a value snapshot;
//! it is pure and side-effect free. Components track an internal dirty flag
//! so the capture pass can skip rebuilding snapshots of unchanged
//! components — [`Component::mark_clean`] is the only way to clear it.
//! [`Component::handle_state`] applies an authoritative snapshot on the
//! client; it must be idempotent and monotonic (stale sequences are
//! ignored).

use std::any::Any;

use crate::entity::EntityId;
use crate::family::ComponentFamily;
use crate::message::{ComponentMessage, ComponentReply};
use crate::state::ComponentState;

/// A typed data/behavior unit attached to exactly one entity.
pub trait Component: Send + Sync + 'static {
    /// The family tag that keys this component within its entity.
    fn family(&self) -> ComponentFamily;

    /// Called when the component is attached to an entity.
    fn on_add(&mut self, owner: EntityId) {
        let _ = owner;
    }

    /// Called after every component of the owning entity has been attached.
    ///
    /// Soft dependencies on sibling components are resolved after this
    /// point, by family lookup on the owning entity.
    fn initialize(&mut self) {}

    /// Called when the component is detached or its entity is deleted.
    fn on_remove(&mut self) {}

    /// Handle a message addressed to this component.
    ///
    /// `sender` is the family of the sibling component that sent the
    /// message, or `None` when the message came from outside the entity.
    /// Unhandled message kinds return [`ComponentReply::Empty`].
    fn receive_message(
        &mut self,
        sender: Option<ComponentFamily>,
        message: &ComponentMessage,
    ) -> ComponentReply {
        let _ = (sender, message);
        ComponentReply::Empty
    }

    /// Capture the networked fields as a value snapshot.
    ///
    /// Pure and side-effect free. Returns `None` for components with no
    /// networked state.
    fn state(&self) -> Option<ComponentState>;

    /// Capture a snapshot only if network-relevant fields changed since the
    /// last [`Component::mark_clean`].
    fn dirty_state(&self) -> Option<ComponentState> {
        if self.is_dirty() { self.state() } else { None }
    }

    /// Whether network-relevant fields changed since the last capture.
    fn is_dirty(&self) -> bool;

    /// Clear the dirty flag after a capture pass.
    fn mark_clean(&mut self);

    /// Apply an authoritative snapshot received from the server.
    ///
    /// Must tolerate out-of-order and duplicate delivery: snapshots with a
    /// sequence older than the last applied one are ignored, and re-applying
    /// the same snapshot is a no-op.
    fn handle_state(&mut self, state: &ComponentState, sequence: u32);

    /// Upcast for typed access.
    fn as_any(&self) -> &dyn Any;

    /// Upcast for typed mutable access.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}
