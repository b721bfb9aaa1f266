//! FNV-1a state checksums for desync detection.
//!
//! The server stamps every delta with the checksum of the state it leads
//! to; clients recompute it over the reconstructed state and request a
//! resync on mismatch. FNV-1a over the canonical MessagePack encoding is
//! deterministic across both sides because [`GameState`](crate::GameState)
//! normalizes entity and player ordering.

use crate::error::StateError;
use crate::game_state::GameState;

const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0100_0000_01b3;

/// FNV-1a 64-bit hash of a byte slice.
#[must_use]
pub fn fnv1a_64(bytes: &[u8]) -> u64 {
    let mut hash = FNV_OFFSET_BASIS;
    for &byte in bytes {
        hash ^= u64::from(byte);
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}

/// Checksum a game state over its canonical encoding.
///
/// # Errors
///
/// Returns [`StateError::Encode`] if the state cannot be serialized.
pub fn state_checksum(state: &GameState) -> Result<u64, StateError> {
    let bytes = rmp_serde::to_vec(state)?;
    Ok(fnv1a_64(&bytes))
}
