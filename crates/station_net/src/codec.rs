//! MessagePack codec helpers.
//!
//! Thin wrappers around `rmp-serde`, plus the compressed-frame variants
//! used for everything that actually crosses the wire.

use serde::{Deserialize, Serialize};
use serde::de::DeserializeOwned;

use crate::error::NetError;
use crate::frame;

/// Encode a value to MessagePack bytes.
///
/// # Errors
///
/// Returns [`NetError::Encode`] if serialization fails.
pub fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, NetError> {
    rmp_serde::to_vec(value).map_err(NetError::Encode)
}

/// Decode a value from MessagePack bytes.
///
/// # Errors
///
/// Returns [`NetError::Decode`] if deserialization fails.
pub fn decode<'a, T: Deserialize<'a>>(bytes: &'a [u8]) -> Result<T, NetError> {
    rmp_serde::from_slice(bytes).map_err(NetError::Decode)
}

/// Encode a value and wrap it in a compressed, length-prefixed frame.
///
/// # Errors
///
/// Returns [`NetError::Encode`] or [`NetError::Compress`].
pub fn encode_compressed<T: Serialize>(value: &T) -> Result<Vec<u8>, NetError> {
    frame::compress(&encode(value)?)
}

/// Unwrap a compressed frame and decode the value inside.
///
/// # Errors
///
/// Returns [`NetError::Frame`], [`NetError::Decompress`], or
/// [`NetError::Decode`].
pub fn decode_compressed<T: DeserializeOwned>(frame_bytes: &[u8]) -> Result<T, NetError> {
    let payload = frame::decompress(frame_bytes)?;
    decode(&payload)
}
