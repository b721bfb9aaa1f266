//! Compressed wire framing.
//!
//! Every payload crosses the wire as an opaque zstd blob prefixed by its
//! uncompressed and compressed lengths (little-endian `u32` each).
//! Decompression exactly inverts compression; any header/length mismatch is
//! rejected before the bytes reach the codec.

use crate::error::NetError;

/// Bytes of frame header: uncompressed length + compressed length.
pub const FRAME_HEADER_LEN: usize = 8;

/// zstd compression level for state payloads.
const COMPRESSION_LEVEL: i32 = 3;

/// Compress a payload into a length-prefixed frame.
///
/// # Errors
///
/// Returns [`NetError::Compress`] if zstd fails.
pub fn compress(payload: &[u8]) -> Result<Vec<u8>, NetError> {
    let compressed = zstd::bulk::compress(payload, COMPRESSION_LEVEL).map_err(NetError::Compress)?;

    let uncompressed_len = u32::try_from(payload.len())
        .map_err(|_| NetError::Frame("payload exceeds u32 length prefix".to_string()))?;
    let compressed_len = u32::try_from(compressed.len())
        .map_err(|_| NetError::Frame("compressed payload exceeds u32 length prefix".to_string()))?;

    let mut frame = Vec::with_capacity(FRAME_HEADER_LEN + compressed.len());
    frame.extend_from_slice(&uncompressed_len.to_le_bytes());
    frame.extend_from_slice(&compressed_len.to_le_bytes());
    frame.extend_from_slice(&compressed);
    Ok(frame)
}

/// Decompress a length-prefixed frame back into the original payload.
///
/// # Errors
///
/// Returns [`NetError::Frame`] on a truncated header or length mismatch,
/// and [`NetError::Decompress`] on corrupt zstd data.
pub fn decompress(frame: &[u8]) -> Result<Vec<u8>, NetError> {
    if frame.len() < FRAME_HEADER_LEN {
        return Err(NetError::Frame(format!(
            "frame of {} bytes is shorter than the {FRAME_HEADER_LEN}-byte header",
            frame.len()
        )));
    }

    let uncompressed_len = u32::from_le_bytes([frame[0], frame[1], frame[2], frame[3]]) as usize;
    let compressed_len = u32::from_le_bytes([frame[4], frame[5], frame[6], frame[7]]) as usize;
    let body = &frame[FRAME_HEADER_LEN..];
    if body.len() != compressed_len {
        return Err(NetError::Frame(format!(
            "header declares {compressed_len} compressed bytes, frame carries {}",
            body.len()
        )));
    }

    let payload = zstd::bulk::decompress(body, uncompressed_len).map_err(NetError::Decompress)?;
    if payload.len() != uncompressed_len {
        return Err(NetError::Frame(format!(
            "header declares {uncompressed_len} uncompressed bytes, got {}",
            payload.len()
        )));
    }
    Ok(payload)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compress_decompress_roundtrip() {
        let payload: Vec<u8> = (0..2048u32).map(|i| (i % 251) as u8).collect();
        let frame = compress(&payload).unwrap();
        let restored = decompress(&frame).unwrap();
        assert_eq!(payload, restored);
    }

    #[test]
    fn test_empty_payload_roundtrip() {
        let frame = compress(&[]).unwrap();
        assert_eq!(decompress(&frame).unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn test_truncated_header_rejected() {
        assert!(matches!(decompress(&[1, 2, 3]), Err(NetError::Frame(_))));
    }

    #[test]
    fn test_length_mismatch_rejected() {
        let mut frame = compress(b"hello station").unwrap();
        // Declare one more compressed byte than the frame carries.
        let wrong = (frame.len() - FRAME_HEADER_LEN + 1) as u32;
        frame[4..8].copy_from_slice(&wrong.to_le_bytes());
        assert!(matches!(decompress(&frame), Err(NetError::Frame(_))));
    }

    #[test]
    fn test_corrupt_body_rejected() {
        let mut frame = compress(b"the quick brown fox jumps over the lazy dog").unwrap();
        let last = frame.len() - 1;
        frame[last] ^= 0xFF;
        assert!(decompress(&frame).is_err());
    }
}
