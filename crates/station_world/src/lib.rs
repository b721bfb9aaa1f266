//! # station_world
//!
//! The authoritative simulation world: entity ownership, periodic systems,
//! and the fixed-timestep tick loop.
//!
//! This crate provides:
//!
//! - [`EntityManager`] — owner of all entities/components, spawn/delete
//!   lifecycle, family queries, message dispatch, event draining, and the
//!   per-tick [`EntityState`](station_state::EntityState) capture.
//! - [`EntitySystem`] / [`SystemManager`] — periodic subsystems over
//!   family queries, run deterministically in registration order.
//! - [`TaskQueue`] / [`TaskSender`] — the post-to-main-thread boundary
//!   between network I/O and the simulation thread.
//! - [`Simulation`] — the fixed-timestep loop tying it together.

pub mod entity_manager;
pub mod system;
pub mod systems;
pub mod task_queue;
pub mod tick;

pub use entity_manager::{EntityManager, SpawnError};
pub use system::{EntityQuery, EntitySystem, SystemError, SystemManager};
pub use task_queue::{Task, TaskQueue, TaskSender};
pub use tick::{Simulation, TickConfig};
