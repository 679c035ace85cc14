//! Stuck-rescue probe ring.
//!
//! When the watchdog decides an actor is wedged, rescue tries a fixed
//! deterministic pattern of candidate points around it: four radii by
//! eight compass/diagonal directions, nearest ring first, and takes the
//! first collision-free point inside world bounds.

use crate::constants::rescue;
use crate::geometry::Vec2;

const DIAG: f32 = std::f32::consts::FRAC_1_SQRT_2;

/// The eight unit directions, compass-ordered: N, NE, E, SE, S, SW, W, NW.
pub const DIRECTIONS: [Vec2; 8] = [
    Vec2 { x: 0.0, y: -1.0 },
    Vec2 { x: DIAG, y: -DIAG },
    Vec2 { x: 1.0, y: 0.0 },
    Vec2 { x: DIAG, y: DIAG },
    Vec2 { x: 0.0, y: 1.0 },
    Vec2 { x: -DIAG, y: DIAG },
    Vec2 { x: -1.0, y: 0.0 },
    Vec2 { x: -DIAG, y: -DIAG },
];

/// Candidate offsets in probe order (nearest ring first, compass order
/// within a ring).
pub fn probe_offsets() -> impl Iterator<Item = Vec2> {
    rescue::PROBE_RADII
        .into_iter()
        .flat_map(|radius| DIRECTIONS.into_iter().map(move |dir| dir * radius))
}

/// Work-stall predicate: a movement-dependent state that has run for a
/// window without meaningful displacement counts as stuck.
pub fn is_stalled(elapsed_in_state: f32, displacement: f32) -> bool {
    elapsed_in_state > rescue::STALL_WINDOW && displacement < rescue::STALL_DISPLACEMENT
}
