//! # station_client
//!
//! Client-side reconciliation for the station simulation core.
//!
//! This crate provides:
//!
//! - [`ClientStateManager`] — folds incoming deltas into the client's copy
//!   of the authoritative game state, with monotonic sequence application
//!   and checksum verification.
//! - [`Reconciler`] — walks an authoritative state against the local
//!   entity mirror: create, update, delete, and feed interpolation.
//! - [`InterpolationBuffer`] — blends transforms between the last two
//!   authoritative samples, snapping past a divergence threshold.
//! - [`ClientSession`] — message-in / message-out glue over the above.

pub mod interpolation;
pub mod reconcile;
pub mod session;
pub mod state_manager;

pub use interpolation::InterpolationBuffer;
pub use reconcile::{DEFAULT_SNAP_THRESHOLD, Reconciler};
pub use session::ClientSession;
pub use state_manager::ClientStateManager;
