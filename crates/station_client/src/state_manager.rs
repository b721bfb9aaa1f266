//! Client-side game state tracking.
//!
//! The [`ClientStateManager`] folds incoming deltas into the client's view
//! of the authoritative state. Sequences are applied in non-decreasing
//! order: anything older than the current state is discarded. Every
//! reconstructed state is checksummed against the server's stamp before it
//! becomes truth.

use tracing::debug;

use station_state::{GameState, GameStateDelta, StateError, patch, state_checksum};

/// Holds the client's copy of the authoritative [`GameState`].
#[derive(Debug)]
pub struct ClientStateManager {
    current: GameState,
}

impl ClientStateManager {
    /// Create a manager with no state applied yet.
    #[must_use]
    pub fn new() -> Self {
        Self {
            current: GameState::empty(),
        }
    }

    /// The sequence of the last applied state (0 before the first).
    #[must_use]
    pub fn sequence(&self) -> u32 {
        self.current.sequence
    }

    /// The current reconstructed authoritative state.
    #[must_use]
    pub fn current(&self) -> &GameState {
        &self.current
    }

    /// Apply a state update, advancing the current state.
    ///
    /// A delta with `from_sequence == 0` is a full state and applies
    /// against the empty baseline regardless of what the client holds;
    /// anything else must be based on the client's current state.
    ///
    /// # Errors
    ///
    /// - [`StateError::Stale`] — the update does not lead past the current
    ///   sequence; the caller discards it (logged at debug level here).
    /// - [`StateError::BaseMismatch`] — the delta's base is not the
    ///   current state; the caller should request a resync.
    /// - [`StateError::Desync`] — the reconstructed state's checksum does
    ///   not match the server's; the caller should request a resync.
    pub fn apply(&mut self, delta: &GameStateDelta) -> Result<&GameState, StateError> {
        if delta.to_sequence <= self.current.sequence {
            debug!(
                received = delta.to_sequence,
                current = self.current.sequence,
                "discarding stale state update"
            );
            return Err(StateError::Stale {
                received: delta.to_sequence,
                current: self.current.sequence,
            });
        }

        let next = if delta.from_sequence == 0 {
            patch(&GameState::empty(), delta)?
        } else {
            patch(&self.current, delta)?
        };

        let actual = state_checksum(&next)?;
        if actual != delta.checksum {
            return Err(StateError::Desync {
                expected: delta.checksum,
                actual,
            });
        }

        self.current = next;
        Ok(&self.current)
    }
}

impl Default for ClientStateManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use station_core::{ComponentState, EntityId};
    use station_core::state::TransformState;
    use station_state::{EntityState, delta};

    use glam::Vec2;

    use super::*;

    fn state(sequence: u32, positions: &[(u64, f32)]) -> GameState {
        GameState::new(
            sequence,
            positions
                .iter()
                .map(|&(id, x)| EntityState {
                    id: EntityId::from_raw(id),
                    prototype: "crate".to_string(),
                    states: vec![ComponentState::Transform(TransformState {
                        position: Vec2::new(x, 0.0),
                        rotation: 0.0,
                    })],
                })
                .collect(),
            Vec::new(),
        )
    }

    #[test]
    fn test_apply_full_then_delta() {
        let mut manager = ClientStateManager::new();

        let s5 = state(5, &[(1, 1.0)]);
        let full = delta(&GameState::empty(), &s5).unwrap();
        manager.apply(&full).unwrap();
        assert_eq!(manager.sequence(), 5);

        let s6 = state(6, &[(1, 2.0)]);
        let d = delta(&s5, &s6).unwrap();
        manager.apply(&d).unwrap();
        assert_eq!(manager.current(), &s6);
    }

    #[test]
    fn test_duplicate_delta_is_noop() {
        let mut manager = ClientStateManager::new();
        let s5 = state(5, &[(1, 1.0)]);
        let full = delta(&GameState::empty(), &s5).unwrap();
        manager.apply(&full).unwrap();

        // Applying the same update again changes nothing.
        let err = manager.apply(&full).unwrap_err();
        assert!(matches!(err, StateError::Stale { received: 5, current: 5 }));
        assert_eq!(manager.current(), &s5);
    }

    #[test]
    fn test_out_of_order_full_states_converge() {
        // Server sends full states for sequences 5, 6, 7; network delivers
        // them 7, 5, 6. The result equals in-order application through 7.
        let states = [
            state(5, &[(1, 1.0)]),
            state(6, &[(1, 2.0)]),
            state(7, &[(1, 3.0)]),
        ];
        let fulls: Vec<_> = states
            .iter()
            .map(|s| delta(&GameState::empty(), s).unwrap())
            .collect();

        let mut in_order = ClientStateManager::new();
        for full in &fulls {
            let _ = in_order.apply(full);
        }

        let mut shuffled = ClientStateManager::new();
        shuffled.apply(&fulls[2]).unwrap();
        assert!(matches!(
            shuffled.apply(&fulls[0]),
            Err(StateError::Stale { .. })
        ));
        assert!(matches!(
            shuffled.apply(&fulls[1]),
            Err(StateError::Stale { .. })
        ));

        assert_eq!(in_order.current(), shuffled.current());
        assert_eq!(shuffled.sequence(), 7);
    }

    #[test]
    fn test_base_mismatch_reported() {
        let mut manager = ClientStateManager::new();
        let s5 = state(5, &[(1, 1.0)]);
        manager.apply(&delta(&GameState::empty(), &s5).unwrap()).unwrap();

        // A delta based on sequence 6 cannot apply on top of 5.
        let s6 = state(6, &[(1, 2.0)]);
        let s7 = state(7, &[(1, 3.0)]);
        let d67 = delta(&s6, &s7).unwrap();
        assert!(matches!(
            manager.apply(&d67),
            Err(StateError::BaseMismatch { expected: 6, actual: 5 })
        ));
        // The current state is untouched.
        assert_eq!(manager.sequence(), 5);
    }

    #[test]
    fn test_checksum_mismatch_is_desync() {
        let mut manager = ClientStateManager::new();
        let s5 = state(5, &[(1, 1.0)]);
        let mut full = delta(&GameState::empty(), &s5).unwrap();
        full.checksum ^= 0xDEAD_BEEF;
        assert!(matches!(
            manager.apply(&full),
            Err(StateError::Desync { .. })
        ));
        assert_eq!(manager.sequence(), 0);
    }
}
