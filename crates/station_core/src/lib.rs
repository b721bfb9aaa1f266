//! # station_core
//!
//! Entity, component, and prototype primitives for the station simulation
//! core.
//!
//! This crate provides:
//!
//! - [`EntityId`] / [`EntityAllocator`] — never-reused `u64` entity ids.
//! - [`Entity`] — the per-entity component container, slot-indexed by
//!   family.
//! - [`ComponentFamily`] / [`FamilySet`] — the closed set of component
//!   categories and bitmask queries over it.
//! - [`Component`] — the trait all components implement: lifecycle hooks,
//!   message handling, and networked state capture/apply.
//! - [`ComponentState`] — the sealed tagged union of per-family wire
//!   states.
//! - [`ComponentMessage`] / [`ComponentReply`] — entity-local message
//!   dispatch values.
//! - [`PrototypeRegistry`] — JSON-loaded spawn recipes.

pub mod component;
pub mod components;
pub mod entity;
pub mod family;
pub mod message;
pub mod prototype;
pub mod state;

pub use component::Component;
pub use entity::{Entity, EntityAllocator, EntityId};
pub use family::{ComponentFamily, FamilySet};
pub use message::{ComponentMessage, ComponentReply};
pub use prototype::{ComponentSpec, EntityPrototype, PrototypeError, PrototypeRegistry};
pub use state::ComponentState;
