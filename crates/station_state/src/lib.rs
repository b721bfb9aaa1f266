//! # station_state
//!
//! Game state snapshots and the delta engine for the station simulation
//! core.
//!
//! This crate provides:
//!
//! - [`GameState`] / [`EntityState`] / [`PlayerState`] — the per-tick
//!   serializable snapshot of the networked simulation.
//! - [`GameStateDelta`] and the pure [`delta`] / [`patch`] pair, obeying
//!   the round-trip law `patch(a, delta(a, b)) == b`.
//! - [`state_checksum`] — FNV-1a checksums for desync detection.
//! - [`StateError`] — stale, base-mismatch, and desync conditions.

pub mod checksum;
pub mod delta;
pub mod error;
pub mod game_state;

pub use checksum::{fnv1a_64, state_checksum};
pub use delta::{GameStateDelta, delta, patch};
pub use error::StateError;
pub use game_state::{EntityState, GameState, PlayerState, SessionStatus};
