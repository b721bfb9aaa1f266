//! The event bus — synchronous directed/broadcast dispatch with a deferred
//! queue.
//!
//! Handlers for one raised event run synchronously, in subscription
//! registration order, on the calling thread. A handler that returns an
//! error is logged and skipped; the remaining handlers still run and the
//! subscriber table is untouched. Events queued with [`EventBus::queue`]
//! are drained in FIFO order once per tick, before systems run.

use std::collections::VecDeque;

use thiserror::Error;
use tracing::{debug, warn};

use station_core::{ComponentFamily, EntityId, FamilySet};

use crate::event::{Event, EventKind};

/// An error returned by an event handler.
///
/// Handler failures are isolated: the bus logs them and keeps dispatching.
#[derive(Debug, Error)]
#[error("event handler failed: {reason}")]
pub struct EventError {
    /// Human-readable failure description.
    pub reason: String,
}

impl EventError {
    /// Create a handler error from any displayable reason.
    #[must_use]
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Identifies a subscription for later removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriberId(u64);

type BroadcastHandler = Box<dyn FnMut(&Event) -> Result<(), EventError> + Send>;
type DirectedHandler = Box<dyn FnMut(EntityId, &Event) -> Result<(), EventError> + Send>;

enum HandlerKind {
    Broadcast(BroadcastHandler),
    Directed {
        family: ComponentFamily,
        handler: DirectedHandler,
    },
}

struct Subscription {
    id: SubscriberId,
    kind: EventKind,
    handler: HandlerKind,
}

/// A queued event awaiting the per-tick drain.
#[derive(Debug, Clone)]
pub struct QueuedEvent {
    /// Directed target, or `None` for broadcast.
    pub target: Option<EntityId>,
    /// The event value.
    pub event: Event,
}

/// Typed, directed-or-broadcast event dispatch.
///
/// The bus is owned by the entity manager and passed to systems explicitly;
/// it is not a global.
#[derive(Default)]
pub struct EventBus {
    subscriptions: Vec<Subscription>,
    next_id: u64,
    queued: VecDeque<QueuedEvent>,
}

impl EventBus {
    /// Create an empty bus.
    #[must_use]
    pub fn new() -> Self {
        Self {
            subscriptions: Vec::new(),
            next_id: 0,
            queued: VecDeque::new(),
        }
    }

    /// Subscribe to broadcast raises of `kind`.
    pub fn subscribe(
        &mut self,
        kind: EventKind,
        handler: impl FnMut(&Event) -> Result<(), EventError> + Send + 'static,
    ) -> SubscriberId {
        let id = self.allocate_id();
        self.subscriptions.push(Subscription {
            id,
            kind,
            handler: HandlerKind::Broadcast(Box::new(handler)),
        });
        id
    }

    /// Subscribe to directed raises of `kind`, delivered only when the
    /// target entity carries a component of `family`.
    pub fn subscribe_directed(
        &mut self,
        kind: EventKind,
        family: ComponentFamily,
        handler: impl FnMut(EntityId, &Event) -> Result<(), EventError> + Send + 'static,
    ) -> SubscriberId {
        let id = self.allocate_id();
        self.subscriptions.push(Subscription {
            id,
            kind,
            handler: HandlerKind::Directed {
                family,
                handler: Box::new(handler),
            },
        });
        id
    }

    /// Remove a subscription. Returns `true` if it existed.
    pub fn unsubscribe(&mut self, id: SubscriberId) -> bool {
        let before = self.subscriptions.len();
        self.subscriptions.retain(|s| s.id != id);
        before != self.subscriptions.len()
    }

    /// Returns the number of live subscriptions.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.subscriptions.len()
    }

    /// Raise an event broadcast: every broadcast subscriber of its kind
    /// runs, in registration order.
    pub fn raise(&mut self, event: &Event) {
        let kind = event.kind();
        for sub in &mut self.subscriptions {
            if sub.kind != kind {
                continue;
            }
            if let HandlerKind::Broadcast(handler) = &mut sub.handler
                && let Err(err) = handler(event)
            {
                warn!(kind = ?kind, %err, "broadcast event handler failed");
            }
        }
    }

    /// Raise an event directed at `entity`: only directed subscribers of
    /// its kind whose family is present in `families` run, in registration
    /// order.
    pub fn raise_directed(&mut self, entity: EntityId, families: FamilySet, event: &Event) {
        let kind = event.kind();
        for sub in &mut self.subscriptions {
            if sub.kind != kind {
                continue;
            }
            if let HandlerKind::Directed { family, handler } = &mut sub.handler
                && families.contains(*family)
                && let Err(err) = handler(entity, event)
            {
                warn!(kind = ?kind, %entity, %err, "directed event handler failed");
            }
        }
    }

    /// Defer a broadcast event to the next per-tick drain.
    pub fn queue(&mut self, event: Event) {
        self.queued.push_back(QueuedEvent {
            target: None,
            event,
        });
    }

    /// Defer a directed event to the next per-tick drain.
    pub fn queue_directed(&mut self, entity: EntityId, event: Event) {
        self.queued.push_back(QueuedEvent {
            target: Some(entity),
            event,
        });
    }

    /// Take all queued events, oldest first.
    ///
    /// The caller (the entity manager) resolves directed targets' family
    /// sets and re-dispatches through [`EventBus::raise`] /
    /// [`EventBus::raise_directed`].
    pub fn take_queued(&mut self) -> Vec<QueuedEvent> {
        let drained: Vec<_> = self.queued.drain(..).collect();
        if !drained.is_empty() {
            debug!(count = drained.len(), "draining queued events");
        }
        drained
    }

    fn allocate_id(&mut self) -> SubscriberId {
        let id = SubscriberId(self.next_id);
        self.next_id += 1;
        id
    }
}
