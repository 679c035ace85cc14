//! Threat assessment — deterministic scoring over the visible enemy
//! list.
//!
//! Every actor runs the identical function over the same inputs, so
//! multiple actors independently converge on the same highest-priority
//! target (focus fire) with no coordination messages. Exact score ties
//! break toward the lower id to keep the choice deterministic.

use crate::constants::{threat, world};

/// Plain snapshot of one hostile as seen by one actor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThreatProfile {
    /// Stable identifier, used for deterministic tie-breaking.
    pub id: u64,
    /// Distance from the evaluating actor (world units).
    pub distance: f32,
    /// Hit points 0..=100. Lower hp raises priority.
    pub hp: f32,
    /// Effective weapon range; a proxy for how dangerous it is.
    pub weapon_range: f32,
}

/// Priority score for one threat. Combines inverse-hp (finish wounded
/// enemies first), inverse-distance, and weapon capability.
pub fn threat_score(profile: &ThreatProfile) -> f32 {
    let hp_term = (100.0 - profile.hp.clamp(0.0, 100.0)) / 100.0;
    let dist_term = 1.0 / (1.0 + profile.distance.max(0.0) / world::TILE_SIZE);
    let weapon_term = (profile.weapon_range / threat::MAX_WEAPON_RANGE).clamp(0.0, 1.0);

    hp_term * threat::HP_WEIGHT + dist_term * threat::DISTANCE_WEIGHT + weapon_term * threat::WEAPON_WEIGHT
}

/// Select the highest-priority threat. Exact ties break toward the
/// lower id so identical inputs always yield identical picks.
pub fn best_target(threats: &[ThreatProfile]) -> Option<ThreatProfile> {
    threats.iter().copied().reduce(|best, candidate| {
        let bs = threat_score(&best);
        let cs = threat_score(&candidate);
        if cs > bs || (cs == bs && candidate.id < best.id) {
            candidate
        } else {
            best
        }
    })
}
