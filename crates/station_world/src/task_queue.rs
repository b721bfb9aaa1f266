//! Post-to-main-thread task queue.
//!
//! Network I/O runs on separate threads, but all entity/component mutation
//! happens on the simulation thread. I/O code clones a [`TaskSender`] and
//! posts closures; the simulation pumps them at the start of each tick,
//! before systems run. No component mutation ever happens concurrently with
//! a system update.

use std::sync::mpsc::{Receiver, Sender, channel};

use crate::entity_manager::EntityManager;

/// A deferred mutation of the entity manager.
pub type Task = Box<dyn FnOnce(&mut EntityManager) + Send>;

/// Cloneable handle for posting tasks from other threads.
#[derive(Clone)]
pub struct TaskSender {
    tx: Sender<Task>,
}

impl TaskSender {
    /// Post a task to run on the simulation thread.
    ///
    /// Returns `false` if the simulation side is gone.
    pub fn post(&self, task: impl FnOnce(&mut EntityManager) + Send + 'static) -> bool {
        self.tx.send(Box::new(task)).is_ok()
    }
}

/// Receiving end of the queue, owned by the simulation thread.
pub struct TaskQueue {
    tx: Sender<Task>,
    rx: Receiver<Task>,
}

impl TaskQueue {
    /// Create an empty queue.
    #[must_use]
    pub fn new() -> Self {
        let (tx, rx) = channel();
        Self { tx, rx }
    }

    /// Create a sender handle for another thread.
    #[must_use]
    pub fn sender(&self) -> TaskSender {
        TaskSender {
            tx: self.tx.clone(),
        }
    }

    /// Run every queued task against the entity manager, in posting order.
    /// Returns the number of tasks executed.
    pub fn pump(&mut self, entities: &mut EntityManager) -> usize {
        let mut count = 0;
        while let Ok(task) = self.rx.try_recv() {
            task(entities);
            count += 1;
        }
        count
    }
}

impl Default for TaskQueue {
    fn default() -> Self {
        Self::new()
    }
}
