//! Built-in entity systems.

mod movement;

pub use movement::MovementSystem;
