//! Transform interpolation between authoritative samples.
//!
//! Network updates arrive at the net rate, rendering runs faster. Instead
//! of snapping a transform to each authoritative position, the client
//! keeps the last two samples and blends between them using elapsed wall
//! time scaled by the tick interval. When the gap between samples exceeds
//! the snap threshold (a teleport, or a long loss burst), blending would
//! smear the entity across the map — the buffer snaps to the authoritative
//! value instead.

use std::f32::consts::{PI, TAU};

use station_core::state::TransformState;

/// How far past the newest sample extrapolation may run, as a fraction of
/// the tick interval. Beyond this the entity holds at the newest sample.
const MAX_EXTRAPOLATION: f32 = 1.25;

/// Interpolate an angle along the shortest arc.
fn lerp_angle(from: f32, to: f32, t: f32) -> f32 {
    let mut diff = (to - from).rem_euclid(TAU);
    if diff > PI {
        diff -= TAU;
    }
    from + diff * t
}

/// The last two authoritative transform samples for one entity.
#[derive(Debug, Default)]
pub struct InterpolationBuffer {
    prev: Option<(u32, TransformState)>,
    next: Option<(u32, TransformState)>,
}

impl InterpolationBuffer {
    /// Create an empty buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an authoritative sample. Stale sequences are ignored; a
    /// duplicate of the newest sequence replaces it.
    pub fn push(&mut self, sequence: u32, state: TransformState) {
        match self.next {
            None => self.next = Some((sequence, state)),
            Some((newest, _)) => {
                if sequence < newest {
                    return;
                }
                if sequence == newest {
                    self.next = Some((sequence, state));
                    return;
                }
                self.prev = self.next;
                self.next = Some((sequence, state));
            }
        }
    }

    /// Sample the blended transform.
    ///
    /// `alpha` is elapsed wall time since the newest sample divided by the
    /// tick interval: 0.0 right at arrival, 1.0 when the next sample is
    /// due. With a single sample, or when the samples are further apart
    /// than `snap_threshold` meters, the newest sample is returned
    /// directly.
    #[must_use]
    pub fn sample(&self, alpha: f32, snap_threshold: f32) -> Option<TransformState> {
        let (_, next) = self.next?;
        let Some((_, prev)) = self.prev else {
            return Some(next);
        };

        if prev.position.distance(next.position) > snap_threshold {
            return Some(next);
        }

        // t runs 0 → 1 over the prev→next span and may extrapolate a
        // little past it while the next sample is late.
        let t = alpha.clamp(0.0, MAX_EXTRAPOLATION);
        Some(TransformState {
            position: prev.position + (next.position - prev.position) * t,
            rotation: lerp_angle(prev.rotation, next.rotation, t.min(1.0)),
        })
    }
}
