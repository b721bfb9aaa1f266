//! NATS subject hierarchy for the NATS-backed transport.
//!
//! All subjects are prefixed with `station.` to namespace within a shared
//! NATS cluster.

use uuid::Uuid;

/// Root prefix for all station subjects.
pub const PREFIX: &str = "station";

/// Client → server messages. Each message carries the sender's session id
/// in a header.
pub const SERVER_INGRESS: &str = "station.server.ingress";

/// Build the subject for server → client messages to one session.
///
/// `station.session.<session-id>`
#[must_use]
pub fn session_egress(session: &Uuid) -> String {
    format!("station.session.{session}")
}

/// Routing header keys.
pub mod headers {
    /// The sender's session id.
    pub const SESSION_ID: &str = "session-id";
    /// The delivery guarantee requested for the message.
    pub const DELIVERY: &str = "delivery";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_egress_subject() {
        let session = Uuid::from_u128(1);
        let subject = session_egress(&session);
        assert!(subject.starts_with("station.session."));
        assert!(subject.ends_with(&session.to_string()));
    }
}
