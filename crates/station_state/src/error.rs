//! State-layer error types.

use thiserror::Error;

/// Errors raised while producing, applying, or validating game states.
#[derive(Debug, Error)]
pub enum StateError {
    /// A state or delta arrived with a sequence older than what the
    /// receiver already holds. Discarded silently; logged at debug level.
    #[error("stale state: received sequence {received}, already at {current}")]
    Stale {
        /// The sequence that arrived.
        received: u32,
        /// The sequence the receiver is at.
        current: u32,
    },

    /// A delta references a base state the receiver does not hold.
    #[error("delta base mismatch: delta is from sequence {expected}, local state is at {actual}")]
    BaseMismatch {
        /// The base sequence the delta was computed against.
        expected: u32,
        /// The sequence of the receiver's current state.
        actual: u32,
    },

    /// The checksum of a reconstructed state does not match the server's.
    /// Recoverable: the client requests a fresh full state.
    #[error("state checksum mismatch: expected {expected:#018x}, computed {actual:#018x}")]
    Desync {
        /// The checksum the server stamped on the delta.
        expected: u64,
        /// The checksum computed over the reconstructed state.
        actual: u64,
    },

    /// The state could not be encoded for checksumming.
    #[error("failed to encode state: {0}")]
    Encode(#[from] rmp_serde::encode::Error),
}
