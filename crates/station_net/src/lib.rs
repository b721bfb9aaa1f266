//! # station_net
//!
//! Wire messages, codec, compression, and the transport contract for the
//! station simulation core.
//!
//! This crate provides:
//!
//! - [`messages`] — the [`NetMessage`] enum exchanged between server and
//!   clients, each variant tagged with its [`DeliveryMethod`].
//! - [`codec`] — MessagePack serialization plus compressed-frame helpers.
//! - [`frame`] — zstd framing with uncompressed/compressed length
//!   prefixes.
//! - [`transport`] — the [`Transport`] trait with in-memory loopback and
//!   NATS-backed implementations.
//! - [`connection`] — NATS connection management.
//! - [`error`] — network-layer error types.

pub mod codec;
pub mod connection;
pub mod delivery;
pub mod error;
pub mod frame;
pub mod messages;
pub mod subjects;
pub mod transport;

pub use codec::{decode, decode_compressed, encode, encode_compressed};
pub use connection::NatsConnection;
pub use delivery::DeliveryMethod;
pub use error::NetError;
pub use messages::NetMessage;
pub use transport::{
    LoopbackClient, LoopbackServer, NatsTransport, PeerId, SERVER_PEER, Transport,
};
