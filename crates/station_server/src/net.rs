//! Ingress routing — from transport frames to simulation-thread work.
//!
//! Runs on the network I/O side. Nothing here touches the entity table
//! directly: entity mutations go through the task queue, session control
//! through the command channel, and acks into the shared ack map. A
//! malformed frame is connection-fatal for that client only — it is
//! logged and dropped, and the simulation never sees it.

use std::sync::Arc;
use std::sync::mpsc::Sender;

use dashmap::DashMap;
use tracing::{debug, warn};
use uuid::Uuid;

use station_net::{NetMessage, PeerId, codec};
use station_world::TaskSender;

use crate::server::SessionCommand;
use crate::state_manager::record_ack;

/// The handles network I/O needs to feed the simulation thread.
#[derive(Clone)]
pub struct NetHandles {
    /// Post-to-main-thread queue for entity mutations.
    pub tasks: TaskSender,
    /// Session control commands.
    pub commands: Sender<SessionCommand>,
    /// Shared ack table.
    pub acks: Arc<DashMap<Uuid, u32>>,
}

/// Decode one ingress frame and route its message.
pub fn handle_ingress(peer: PeerId, frame: &[u8], handles: &NetHandles) {
    let message: NetMessage = match codec::decode_compressed(frame) {
        Ok(message) => message,
        Err(err) => {
            // Connection-fatal for this client only: its session is torn
            // down, the simulation and other sessions are untouched.
            warn!(%peer, %err, "malformed frame, dropping session");
            let _ = handles.commands.send(SessionCommand::Leave { session: peer });
            return;
        }
    };

    match message {
        NetMessage::SessionJoin { name } => {
            let _ = handles.commands.send(SessionCommand::Join {
                session: peer,
                name,
            });
        }
        NetMessage::SessionLeave => {
            let _ = handles.commands.send(SessionCommand::Leave { session: peer });
        }
        NetMessage::StateAck { sequence } => {
            record_ack(&handles.acks, peer, sequence);
        }
        NetMessage::ResyncRequest { last_sequence } => {
            debug!(%peer, last_sequence, "resync requested");
            let _ = handles.commands.send(SessionCommand::Resync { session: peer });
        }
        NetMessage::EntityComponent {
            entity,
            family,
            message,
        } => {
            handles.tasks.post(move |entities| {
                entities.send_message(None, entity, family, &message);
            });
        }
        NetMessage::SessionWelcome { .. } | NetMessage::StateUpdate { .. } => {
            warn!(%peer, "client sent a server-only message, ignoring");
        }
    }
}
