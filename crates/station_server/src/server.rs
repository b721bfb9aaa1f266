//! The authoritative server core.
//!
//! [`StationServer`] runs on the simulation thread and is purely
//! synchronous: network I/O posts session commands and entity mutations
//! into it, and [`StationServer::step`] returns the frames to put on the
//! wire. The async side stays a thin shell, and the whole server behavior
//! is testable without a socket.

use std::sync::mpsc::{Receiver, Sender, channel};

use tracing::{info, warn};
use uuid::Uuid;

use station_core::{ComponentFamily, ComponentMessage};
use station_net::{DeliveryMethod, NetMessage, PeerId, codec};
use station_state::GameState;
use station_world::{Simulation, TaskSender};

use crate::sessions::SessionRegistry;
use crate::state_manager::GameStateManager;

/// Session-level control commands posted from network I/O.
#[derive(Debug)]
pub enum SessionCommand {
    /// A client asked to join.
    Join {
        /// The client's session id.
        session: Uuid,
        /// Requested display name.
        name: String,
    },
    /// A client left.
    Leave {
        /// The departing session.
        session: Uuid,
    },
    /// A client's state lineage broke; its next update must be full.
    Resync {
        /// The affected session.
        session: Uuid,
    },
}

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Simulation ticks per second.
    pub tick_rate: f64,
    /// Simulation ticks per network tick.
    pub net_interval: u64,
    /// Prototype spawned for each joining player.
    pub player_prototype: String,
}

impl ServerConfig {
    /// Network ticks per second.
    #[must_use]
    pub fn net_rate(&self) -> f64 {
        self.tick_rate / self.net_interval as f64
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            tick_rate: 60.0,
            net_interval: 3,
            player_prototype: "player".to_string(),
        }
    }
}

/// A frame ready to hand to the transport.
#[derive(Debug)]
pub struct OutgoingFrame {
    /// Destination session.
    pub peer: PeerId,
    /// Delivery guarantee the message needs.
    pub delivery: DeliveryMethod,
    /// Compressed wire frame.
    pub frame: Vec<u8>,
}

/// The authoritative server: simulation, sessions, and state replication.
pub struct StationServer {
    config: ServerConfig,
    simulation: Simulation,
    sessions: SessionRegistry,
    states: GameStateManager,
    net_sequence: u32,
    commands_tx: Sender<SessionCommand>,
    commands_rx: Receiver<SessionCommand>,
}

impl StationServer {
    /// Create a server over a prepared simulation.
    #[must_use]
    pub fn new(config: ServerConfig, simulation: Simulation) -> Self {
        let (commands_tx, commands_rx) = channel();
        Self {
            config,
            simulation,
            sessions: SessionRegistry::new(),
            states: GameStateManager::new(),
            net_sequence: 0,
            commands_tx,
            commands_rx,
        }
    }

    /// Returns the server configuration.
    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Mutable access to the simulation, for system registration and tests.
    pub fn simulation_mut(&mut self) -> &mut Simulation {
        &mut self.simulation
    }

    /// Returns the session registry.
    #[must_use]
    pub fn sessions(&self) -> &SessionRegistry {
        &self.sessions
    }

    /// Returns the state manager.
    #[must_use]
    pub fn states(&self) -> &GameStateManager {
        &self.states
    }

    /// Command channel sender for network I/O.
    #[must_use]
    pub fn command_sender(&self) -> Sender<SessionCommand> {
        self.commands_tx.clone()
    }

    /// Task sender for posting entity mutations from network I/O.
    #[must_use]
    pub fn task_sender(&self) -> TaskSender {
        self.simulation.task_sender()
    }

    /// Run one simulation step. Returns the frames to send, if any (a
    /// welcome after a join, state updates on a network tick).
    pub fn step(&mut self, dt: f32) -> Vec<OutgoingFrame> {
        let mut outgoing = self.drain_commands();

        self.simulation.tick(dt);

        if self.simulation.tick_id() % self.config.net_interval == 0 {
            outgoing.append(&mut self.net_tick());
        }
        outgoing
    }

    fn drain_commands(&mut self) -> Vec<OutgoingFrame> {
        let mut outgoing = Vec::new();
        while let Ok(command) = self.commands_rx.try_recv() {
            match command {
                SessionCommand::Join { session, name } => {
                    info!(%session, name, "session joining");
                    self.sessions.join(session, name);

                    match self
                        .simulation
                        .entities_mut()
                        .spawn(&self.config.player_prototype)
                    {
                        Ok(entity) => {
                            self.sessions.attach(session, entity);
                            self.simulation.entities_mut().send_message(
                                None,
                                entity,
                                ComponentFamily::Actor,
                                &ComponentMessage::AttachSession { session },
                            );
                        }
                        Err(err) => {
                            warn!(%session, %err, "player entity not spawned, session stays in lobby");
                        }
                    }

                    let welcome = NetMessage::SessionWelcome {
                        session,
                        net_rate: self.config.net_rate(),
                    };
                    match codec::encode_compressed(&welcome) {
                        Ok(frame) => outgoing.push(OutgoingFrame {
                            peer: session,
                            delivery: welcome.delivery(),
                            frame,
                        }),
                        Err(err) => warn!(%session, %err, "failed to encode welcome"),
                    }
                }
                SessionCommand::Leave { session } => {
                    info!(%session, "session leaving");
                    if let Some(entity) = self.sessions.leave(session) {
                        self.simulation.entities_mut().delete(entity);
                    }
                    self.states.remove_session(session);
                }
                SessionCommand::Resync { session } => {
                    info!(%session, "resync requested");
                    self.states.force_full(session);
                }
            }
        }
        outgoing
    }

    /// Capture the current state and build one update per session.
    fn net_tick(&mut self) -> Vec<OutgoingFrame> {
        self.net_sequence += 1;
        let entity_states = self.simulation.entities_mut().capture_states();
        let state = GameState::new(
            self.net_sequence,
            entity_states,
            self.sessions.player_states(),
        );
        self.states.add(state.clone());

        let mut outgoing = Vec::new();
        for session in self.sessions.ids() {
            let update = match self.states.update_for(session, &state) {
                Ok(delta) => NetMessage::StateUpdate { delta },
                Err(err) => {
                    warn!(%session, %err, "failed to build state update");
                    continue;
                }
            };
            match codec::encode_compressed(&update) {
                Ok(frame) => outgoing.push(OutgoingFrame {
                    peer: session,
                    delivery: update.delivery(),
                    frame,
                }),
                Err(err) => warn!(%session, %err, "failed to encode state update"),
            }
        }

        self.states.cull();
        outgoing
    }
}
