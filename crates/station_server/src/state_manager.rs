//! Server-side game state history and per-client delta policy.
//!
//! The manager keeps recent [`GameState`]s keyed by sequence and the last
//! sequence each client acknowledged. Every network tick it produces, per
//! client, either a delta from that client's acked state or — when the
//! client has acked nothing, the acked state has been culled, or the ack
//! is older than the policy window — a full state (a delta from the empty
//! baseline). History is culled after every send so memory stays bounded
//! by the slowest live client, never by a dead one.
//!
//! Acks are recorded from network I/O tasks into a shared [`DashMap`];
//! everything else runs on the simulation thread.

use std::collections::BTreeMap;
use std::sync::Arc;

use dashmap::DashMap;
use tracing::debug;
use uuid::Uuid;

use station_state::{GameState, GameStateDelta, StateError, delta};

/// A client whose ack lags the current sequence by more than this many
/// network ticks gets a full state instead of an unbounded-history delta.
pub const ACK_WINDOW: u32 = 128;

/// Hard cap on retained history, in network ticks.
const HISTORY_LIMIT: u32 = 256;

/// Record an acknowledgment, keeping the highest sequence per session.
///
/// Called from network I/O tasks; the map is shared with the manager.
pub fn record_ack(acks: &DashMap<Uuid, u32>, session: Uuid, sequence: u32) {
    acks.entry(session)
        .and_modify(|s| {
            if sequence > *s {
                *s = sequence;
            }
        })
        .or_insert(sequence);
}

/// Game state history with per-client acknowledgment tracking.
pub struct GameStateManager {
    states: BTreeMap<u32, GameState>,
    acks: Arc<DashMap<Uuid, u32>>,
}

impl GameStateManager {
    /// Create an empty manager.
    #[must_use]
    pub fn new() -> Self {
        Self {
            states: BTreeMap::new(),
            acks: Arc::new(DashMap::new()),
        }
    }

    /// A handle for network I/O tasks to record acks through.
    #[must_use]
    pub fn acks_handle(&self) -> Arc<DashMap<Uuid, u32>> {
        Arc::clone(&self.acks)
    }

    /// Store a freshly captured state.
    pub fn add(&mut self, state: GameState) {
        self.states.insert(state.sequence, state);
    }

    /// The newest stored sequence, if any.
    #[must_use]
    pub fn latest_sequence(&self) -> Option<u32> {
        self.states.keys().next_back().copied()
    }

    /// The last sequence a session acknowledged.
    #[must_use]
    pub fn last_acked(&self, session: Uuid) -> Option<u32> {
        self.acks.get(&session).map(|r| *r)
    }

    /// Forget a session's ack so its next update is a full state.
    /// Used when the client requests a resync.
    pub fn force_full(&self, session: Uuid) {
        self.acks.remove(&session);
    }

    /// Drop a departing session's ack state.
    pub fn remove_session(&self, session: Uuid) {
        self.acks.remove(&session);
    }

    /// Build the update for one client against the current state.
    ///
    /// # Errors
    ///
    /// Returns [`StateError::Encode`] if the state cannot be checksummed.
    pub fn update_for(&self, session: Uuid, current: &GameState) -> Result<GameStateDelta, StateError> {
        let base = self
            .last_acked(session)
            .filter(|&seq| current.sequence.saturating_sub(seq) <= ACK_WINDOW)
            .and_then(|seq| self.states.get(&seq));

        match base {
            Some(base) => delta(base, current),
            None => {
                debug!(%session, sequence = current.sequence, "sending full state");
                delta(&GameState::empty(), current)
            }
        }
    }

    /// Drop history no live client can still reference.
    ///
    /// With no clients connected, only the latest state is kept.
    pub fn cull(&mut self) {
        let Some(latest) = self.latest_sequence() else {
            return;
        };
        let min_acked = self.acks.iter().map(|r| *r.value()).min();
        let keep_from = min_acked
            .unwrap_or(latest)
            .max(latest.saturating_sub(HISTORY_LIMIT));
        self.states.retain(|&seq, _| seq >= keep_from.min(latest));
    }

    /// Number of retained states.
    #[must_use]
    pub fn history_len(&self) -> usize {
        self.states.len()
    }
}

impl Default for GameStateManager {
    fn default() -> Self {
        Self::new()
    }
}
