//! # station_events
//!
//! Typed, directed-or-broadcast event dispatch between components and
//! systems.
//!
//! This crate provides:
//!
//! - [`Event`] / [`EventKind`] — the closed set of event types.
//! - [`EventBus`] — subscription table with synchronous in-order dispatch,
//!   per-handler error isolation, and a FIFO deferred queue drained once
//!   per tick.

pub mod bus;
pub mod event;

pub use bus::{EventBus, EventError, QueuedEvent, SubscriberId};
pub use event::{Event, EventKind};
