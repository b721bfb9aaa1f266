//! # station_server — authoritative simulation server
//!
//! Owns the entity/component world and replicates it to clients as
//! delta-compressed game states.
//!
//! ## Startup sequence
//!
//! 1. Load the prototype registry.
//! 2. Connect to NATS (configurable URL, default `nats://localhost:4222`).
//! 3. Start the simulation thread (fixed timestep, task-queue pumped).
//! 4. Run the network loop: route ingress frames, flush outgoing frames.

mod net;
mod server;
mod sessions;
mod state_manager;

use std::time::{Duration, Instant};

use anyhow::Result;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use station_core::PrototypeRegistry;
use station_net::{NatsConnection, NatsTransport, Transport};
use station_world::systems::MovementSystem;
use station_world::{EntityManager, Simulation, TickConfig};

use net::{NetHandles, handle_ingress};
use server::{ServerConfig, StationServer};

/// Built-in prototype set. A deployment overrides this with its own
/// document via `STATION_PROTOTYPES`.
const DEFAULT_PROTOTYPES: &str = r#"[
    {
        "name": "player",
        "components": [
            { "family": "Transform" },
            { "family": "Velocity" },
            { "family": "Collidable" },
            { "family": "Renderable",
              "initial": { "Renderable": { "sprite": "mobs/engineer", "draw_depth": 10, "visible": true } } },
            { "family": "Damageable" },
            { "family": "Actor" }
        ]
    },
    {
        "name": "crate",
        "components": [
            { "family": "Transform" },
            { "family": "Collidable" },
            { "family": "Renderable",
              "initial": { "Renderable": { "sprite": "objects/crate", "draw_depth": 5, "visible": true } } },
            { "family": "Inventory" }
        ]
    },
    {
        "name": "wall_lamp",
        "components": [
            { "family": "Transform" },
            { "family": "Renderable",
              "initial": { "Renderable": { "sprite": "objects/wall_lamp", "draw_depth": 8, "visible": true } } },
            { "family": "Light",
              "initial": { "Light": { "mode": "Constant", "color": [255, 240, 200], "radius": 6.0, "enabled": true } } }
        ]
    }
]"#;

/// Environment variable holding a prototype document path.
const PROTOTYPES_ENV: &str = "STATION_PROTOTYPES";

fn load_prototypes() -> Result<PrototypeRegistry> {
    let mut registry = PrototypeRegistry::new();
    let count = match std::env::var(PROTOTYPES_ENV) {
        Ok(path) => {
            let document = std::fs::read_to_string(&path)?;
            info!(path, "loading prototype document");
            registry.load_json(&document)?
        }
        Err(_) => registry.load_json(DEFAULT_PROTOTYPES)?,
    };
    info!(count, "prototypes loaded");
    Ok(registry)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialise structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("station_server=info".parse()?),
        )
        .init();

    info!("station server starting");

    let prototypes = load_prototypes()?;
    let config = ServerConfig::default();

    let mut simulation = Simulation::new(
        TickConfig {
            tick_rate: config.tick_rate,
            max_ticks: 0,
        },
        EntityManager::new(prototypes),
    );
    simulation.systems_mut().register(MovementSystem);

    let server = StationServer::new(config.clone(), simulation);
    let handles = NetHandles {
        tasks: server.task_sender(),
        commands: server.command_sender(),
        acks: server.states().acks_handle(),
    };

    // Connect to NATS and build the server transport.
    let conn = NatsConnection::connect().await?;
    let mut transport = NatsTransport::server(conn).await?;

    // Simulation thread: fixed timestep, frames out through the channel.
    let (out_tx, mut out_rx) = tokio::sync::mpsc::unbounded_channel();
    std::thread::spawn(move || {
        let mut server = server;
        let tick_duration = Duration::from_secs_f64(1.0 / server.config().tick_rate);
        let dt = tick_duration.as_secs_f32();
        loop {
            let start = Instant::now();
            for frame in server.step(dt) {
                if out_tx.send(frame).is_err() {
                    info!("network side gone, stopping simulation");
                    return;
                }
            }
            let elapsed = start.elapsed();
            if elapsed < tick_duration {
                std::thread::sleep(tick_duration - elapsed);
            } else {
                warn!(
                    elapsed_ms = elapsed.as_millis() as u64,
                    budget_ms = tick_duration.as_millis() as u64,
                    "tick exceeded time budget"
                );
            }
        }
    });

    info!("station server running");

    // Network loop: ingress routing and egress flushing.
    enum NetEvent {
        Incoming(Option<(station_net::PeerId, Vec<u8>)>),
        Outgoing(Option<server::OutgoingFrame>),
    }

    loop {
        let event = tokio::select! {
            incoming = transport.recv() => NetEvent::Incoming(incoming),
            outgoing = out_rx.recv() => NetEvent::Outgoing(outgoing),
        };
        match event {
            NetEvent::Incoming(Some((peer, frame))) => handle_ingress(peer, &frame, &handles),
            NetEvent::Outgoing(Some(out)) => {
                if let Err(err) = transport.send(out.peer, out.delivery, out.frame).await {
                    warn!(peer = %out.peer, %err, "failed to send frame");
                }
            }
            NetEvent::Incoming(None) | NetEvent::Outgoing(None) => break,
        }
    }

    info!("station server shut down");
    Ok(())
}
