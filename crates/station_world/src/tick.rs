//! The fixed-timestep simulation loop.
//!
//! One tick is: pump the task queue, drain queued events, run every system.
//! Everything inside a tick runs sequentially on the simulation thread with
//! no suspension points; state capture for serialization happens only
//! between ticks.

use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::entity_manager::EntityManager;
use crate::system::SystemManager;
use crate::task_queue::{TaskQueue, TaskSender};

/// Configuration for the simulation loop.
#[derive(Debug, Clone)]
pub struct TickConfig {
    /// Target simulation ticks per second.
    pub tick_rate: f64,
    /// Maximum number of ticks to run (0 = unlimited).
    pub max_ticks: u64,
}

impl Default for TickConfig {
    fn default() -> Self {
        Self {
            tick_rate: 60.0,
            max_ticks: 0,
        }
    }
}

/// The authoritative simulation: entities, systems, and the tick counter.
pub struct Simulation {
    tick_id: u64,
    config: TickConfig,
    entities: EntityManager,
    systems: SystemManager,
    tasks: TaskQueue,
}

impl Simulation {
    /// Create a simulation over the given entity manager.
    #[must_use]
    pub fn new(config: TickConfig, entities: EntityManager) -> Self {
        Self {
            tick_id: 0,
            config,
            entities,
            systems: SystemManager::new(),
            tasks: TaskQueue::new(),
        }
    }

    /// Returns the current tick counter.
    #[must_use]
    pub fn tick_id(&self) -> u64 {
        self.tick_id
    }

    /// Returns a reference to the entity manager.
    #[must_use]
    pub fn entities(&self) -> &EntityManager {
        &self.entities
    }

    /// Returns a mutable reference to the entity manager.
    pub fn entities_mut(&mut self) -> &mut EntityManager {
        &mut self.entities
    }

    /// Returns a mutable reference to the system manager, for registration.
    pub fn systems_mut(&mut self) -> &mut SystemManager {
        &mut self.systems
    }

    /// Create a task sender for I/O threads.
    #[must_use]
    pub fn task_sender(&self) -> TaskSender {
        self.tasks.sender()
    }

    /// Run one simulation tick.
    pub fn tick(&mut self, dt: f32) {
        self.tick_id += 1;

        let pumped = self.tasks.pump(&mut self.entities);
        self.entities.drain_events();
        self.systems.update(&mut self.entities, dt);

        debug!(
            tick_id = self.tick_id,
            dt,
            pumped,
            entities = self.entities.len(),
            "tick complete"
        );
    }

    /// Run the loop for the configured number of ticks, or indefinitely.
    ///
    /// Blocking; intended for the server binary's simulation thread.
    pub fn run(&mut self) {
        let tick_duration = Duration::from_secs_f64(1.0 / self.config.tick_rate);
        let mut tick_count = 0u64;

        info!(
            tick_rate = self.config.tick_rate,
            max_ticks = self.config.max_ticks,
            "starting simulation loop"
        );

        loop {
            let start = Instant::now();

            self.tick(tick_duration.as_secs_f32());

            tick_count += 1;
            if self.config.max_ticks > 0 && tick_count >= self.config.max_ticks {
                info!(ticks = tick_count, "simulation loop complete");
                break;
            }

            let elapsed = start.elapsed();
            if elapsed < tick_duration {
                std::thread::sleep(tick_duration - elapsed);
            } else {
                warn!(
                    tick_id = self.tick_id,
                    elapsed_ms = elapsed.as_millis() as u64,
                    budget_ms = tick_duration.as_millis() as u64,
                    "tick exceeded time budget"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use station_core::PrototypeRegistry;

    use super::*;

    fn simulation() -> Simulation {
        let mut registry = PrototypeRegistry::new();
        registry
            .load_json(r#"[{ "name": "marker", "components": [{ "family": "Transform" }] }]"#)
            .unwrap();
        Simulation::new(TickConfig::default(), EntityManager::new(registry))
    }

    #[test]
    fn test_tick_advances_counter() {
        let mut sim = simulation();
        assert_eq!(sim.tick_id(), 0);
        sim.tick(1.0 / 60.0);
        assert_eq!(sim.tick_id(), 1);
        sim.tick(1.0 / 60.0);
        assert_eq!(sim.tick_id(), 2);
    }

    #[test]
    fn test_posted_tasks_apply_before_systems() {
        let mut sim = simulation();
        let sender = sim.task_sender();
        sender.post(|m| {
            m.spawn("marker").unwrap();
        });
        sim.tick(1.0 / 60.0);
        assert_eq!(sim.entities().len(), 1);
    }

    #[test]
    fn test_run_limited_ticks() {
        let mut sim = Simulation::new(
            TickConfig {
                tick_rate: 1000.0, // fast for testing
                max_ticks: 5,
            },
            EntityManager::new(PrototypeRegistry::new()),
        );
        sim.run();
        assert_eq!(sim.tick_id(), 5);
    }
}
