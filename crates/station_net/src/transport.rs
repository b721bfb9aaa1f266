//! The transport contract and its implementations.
//!
//! The simulation core never opens sockets itself: it hands framed bytes,
//! tagged with a [`DeliveryMethod`], to a [`Transport`]. Two
//! implementations are provided:
//!
//! - [`LoopbackServer`] / [`LoopbackClient`] — in-memory channel pairs for
//!   tests and single-process demos. A perfect link: every delivery
//!   guarantee is trivially met.
//! - [`NatsTransport`] — NATS-backed, for multi-process development. NATS
//!   gives per-publisher ordering and at-most-once delivery, which covers
//!   the best-effort-ordered channel state deltas need; the delivery tag
//!   is forwarded as a header for transports that can act on it.
//!
//! Clients choose their own session id and present it on every message,
//! the way the original connection-derived unique identifiers worked.

use std::collections::HashMap;

use futures::StreamExt;
use tokio::sync::mpsc;
use tracing::warn;
use uuid::Uuid;

use crate::connection::NatsConnection;
use crate::delivery::DeliveryMethod;
use crate::error::NetError;
use crate::subjects::{self, headers};

/// Identifies the remote end of a transport: a client's session id, or
/// [`SERVER_PEER`] for the server itself.
pub type PeerId = Uuid;

/// The peer id clients see for the server.
pub const SERVER_PEER: PeerId = Uuid::nil();

/// Moves framed bytes between peers with a requested delivery guarantee.
#[allow(async_fn_in_trait)]
pub trait Transport: Send {
    /// Send a frame to a peer.
    ///
    /// # Errors
    ///
    /// Returns a [`NetError`] when the peer is unreachable. Send failures
    /// on the unreliable channel may also be silent, per its contract.
    async fn send(
        &self,
        peer: PeerId,
        delivery: DeliveryMethod,
        frame: Vec<u8>,
    ) -> Result<(), NetError>;

    /// Receive the next frame, with the sending peer's id.
    ///
    /// Returns `None` once the transport is closed.
    async fn recv(&mut self) -> Option<(PeerId, Vec<u8>)>;
}

// ── Loopback ────────────────────────────────────────────────────────────────

/// Server end of an in-memory transport. Accepts any number of clients.
pub struct LoopbackServer {
    ingress_tx: mpsc::UnboundedSender<(PeerId, Vec<u8>)>,
    ingress_rx: mpsc::UnboundedReceiver<(PeerId, Vec<u8>)>,
    clients: HashMap<PeerId, mpsc::UnboundedSender<(PeerId, Vec<u8>)>>,
}

/// Client end of an in-memory transport.
pub struct LoopbackClient {
    session: PeerId,
    tx: mpsc::UnboundedSender<(PeerId, Vec<u8>)>,
    rx: mpsc::UnboundedReceiver<(PeerId, Vec<u8>)>,
}

impl LoopbackServer {
    /// Create a server end with no clients.
    #[must_use]
    pub fn new() -> Self {
        let (ingress_tx, ingress_rx) = mpsc::unbounded_channel();
        Self {
            ingress_tx,
            ingress_rx,
            clients: HashMap::new(),
        }
    }

    /// Attach a new client with the given session id.
    pub fn connect(&mut self, session: PeerId) -> LoopbackClient {
        let (egress_tx, egress_rx) = mpsc::unbounded_channel();
        self.clients.insert(session, egress_tx);
        LoopbackClient {
            session,
            tx: self.ingress_tx.clone(),
            rx: egress_rx,
        }
    }

    /// Detach a client, dropping its egress channel.
    pub fn disconnect(&mut self, session: PeerId) {
        self.clients.remove(&session);
    }
}

impl Default for LoopbackServer {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for LoopbackServer {
    async fn send(
        &self,
        peer: PeerId,
        _delivery: DeliveryMethod,
        frame: Vec<u8>,
    ) -> Result<(), NetError> {
        let Some(client) = self.clients.get(&peer) else {
            return Err(NetError::ChannelClosed);
        };
        client
            .send((SERVER_PEER, frame))
            .map_err(|_| NetError::ChannelClosed)
    }

    async fn recv(&mut self) -> Option<(PeerId, Vec<u8>)> {
        self.ingress_rx.recv().await
    }
}

impl Transport for LoopbackClient {
    async fn send(
        &self,
        _peer: PeerId,
        _delivery: DeliveryMethod,
        frame: Vec<u8>,
    ) -> Result<(), NetError> {
        self.tx
            .send((self.session, frame))
            .map_err(|_| NetError::ChannelClosed)
    }

    async fn recv(&mut self) -> Option<(PeerId, Vec<u8>)> {
        self.rx.recv().await
    }
}

// ── NATS ────────────────────────────────────────────────────────────────────

fn delivery_header(delivery: DeliveryMethod) -> &'static str {
    match delivery {
        DeliveryMethod::ReliableOrdered => "reliable-ordered",
        DeliveryMethod::ReliableUnordered => "reliable-unordered",
        DeliveryMethod::Unreliable => "unreliable",
    }
}

/// NATS-backed transport. One instance per process side.
pub struct NatsTransport {
    conn: NatsConnection,
    /// `Some` on the client side (its chosen session id), `None` on the
    /// server side.
    session: Option<Uuid>,
    rx: mpsc::UnboundedReceiver<(PeerId, Vec<u8>)>,
}

impl NatsTransport {
    /// Build the server side: subscribes to the shared ingress subject and
    /// resolves sender sessions from headers.
    ///
    /// # Errors
    ///
    /// Returns [`NetError::Subscribe`] if the subscription fails.
    pub async fn server(conn: NatsConnection) -> Result<Self, NetError> {
        let mut sub = conn.subscribe(subjects::SERVER_INGRESS).await?;
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(async move {
            while let Some(message) = sub.next().await {
                let session = message
                    .headers
                    .as_ref()
                    .and_then(|h| h.get(headers::SESSION_ID))
                    .and_then(|v| Uuid::parse_str(v.as_str()).ok());
                let Some(session) = session else {
                    warn!(subject = %message.subject, "ingress message without session header dropped");
                    continue;
                };
                if tx.send((session, message.payload.to_vec())).is_err() {
                    break;
                }
            }
        });
        Ok(Self {
            conn,
            session: None,
            rx,
        })
    }

    /// Build the client side for a chosen session id: subscribes to this
    /// session's egress subject.
    ///
    /// # Errors
    ///
    /// Returns [`NetError::Subscribe`] if the subscription fails.
    pub async fn client(conn: NatsConnection, session: Uuid) -> Result<Self, NetError> {
        let mut sub = conn.subscribe(&subjects::session_egress(&session)).await?;
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(async move {
            while let Some(message) = sub.next().await {
                if tx.send((SERVER_PEER, message.payload.to_vec())).is_err() {
                    break;
                }
            }
        });
        Ok(Self {
            conn,
            session: Some(session),
            rx,
        })
    }
}

impl Transport for NatsTransport {
    async fn send(
        &self,
        peer: PeerId,
        delivery: DeliveryMethod,
        frame: Vec<u8>,
    ) -> Result<(), NetError> {
        let mut hdrs = async_nats::HeaderMap::new();
        hdrs.insert(headers::DELIVERY, delivery_header(delivery));

        match self.session {
            Some(session) => {
                hdrs.insert(headers::SESSION_ID, session.to_string().as_str());
                self.conn
                    .publish_framed(subjects::SERVER_INGRESS, hdrs, frame)
                    .await
            }
            None => {
                self.conn
                    .publish_framed(&subjects::session_egress(&peer), hdrs, frame)
                    .await
            }
        }
    }

    async fn recv(&mut self) -> Option<(PeerId, Vec<u8>)> {
        self.rx.recv().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_loopback_roundtrip() {
        let mut server = LoopbackServer::new();
        let session = Uuid::from_u128(42);
        let mut client = server.connect(session);

        client
            .send(SERVER_PEER, DeliveryMethod::ReliableOrdered, vec![1, 2, 3])
            .await
            .unwrap();
        let (from, frame) = server.recv().await.unwrap();
        assert_eq!(from, session);
        assert_eq!(frame, vec![1, 2, 3]);

        server
            .send(session, DeliveryMethod::Unreliable, vec![9])
            .await
            .unwrap();
        let (from, frame) = client.recv().await.unwrap();
        assert_eq!(from, SERVER_PEER);
        assert_eq!(frame, vec![9]);
    }

    #[tokio::test]
    async fn test_loopback_send_to_unknown_peer_fails() {
        let server = LoopbackServer::new();
        let err = server
            .send(Uuid::from_u128(1), DeliveryMethod::Unreliable, vec![0])
            .await
            .unwrap_err();
        assert!(matches!(err, NetError::ChannelClosed));
    }

    #[tokio::test]
    async fn test_loopback_disconnect_aborts_delivery() {
        let mut server = LoopbackServer::new();
        let session = Uuid::from_u128(7);
        let _client = server.connect(session);
        server.disconnect(session);
        assert!(
            server
                .send(session, DeliveryMethod::Unreliable, vec![0])
                .await
                .is_err()
        );
    }
}
