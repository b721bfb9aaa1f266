//! Network-layer error types.
//!
//! Serialization and framing errors are connection-fatal for the affected
//! client only; they never unwind into the simulation.

/// Errors that can occur during network operations.
#[derive(Debug, thiserror::Error)]
pub enum NetError {
    /// Failed to encode a message to MessagePack.
    #[error("failed to encode message: {0}")]
    Encode(#[from] rmp_serde::encode::Error),

    /// Failed to decode a message from MessagePack.
    #[error("failed to decode message: {0}")]
    Decode(#[from] rmp_serde::decode::Error),

    /// zstd compression failed.
    #[error("compression failed: {0}")]
    Compress(std::io::Error),

    /// zstd decompression failed (corrupt or malicious payload).
    #[error("decompression failed: {0}")]
    Decompress(std::io::Error),

    /// The frame header is truncated or its lengths are inconsistent.
    #[error("malformed frame: {0}")]
    Frame(String),

    /// NATS subscription error.
    #[error("NATS subscribe error: {0}")]
    Subscribe(#[from] async_nats::SubscribeError),

    /// NATS publish error.
    #[error("NATS publish error: {0}")]
    Publish(#[from] async_nats::PublishError),

    /// NATS connection error.
    #[error("NATS connection error: {0}")]
    Connect(#[from] async_nats::ConnectError),

    /// A required routing header was missing from an incoming message.
    #[error("missing header: {0}")]
    MissingHeader(String),

    /// The peer side of an in-memory transport is gone.
    #[error("transport channel closed")]
    ChannelClosed,
}
