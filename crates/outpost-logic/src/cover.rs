//! Cover value math.
//!
//! Effective cover = base value of the object × a directional
//! multiplier (how square-on the object sits to the incoming shot) × a
//! distance multiplier (cover hugged at point-blank protects less).
//! Only objects in the final stretch of the shot path toward the
//! defender count, and multiple low-cover objects stack with strongly
//! diminishing returns up to a hard cap.

use crate::constants::{cover, world};
use crate::geometry::Vec2;

/// Directional multiplier from the angle (degrees) between the threat
/// vector and the cover object's facing: full value when nearly
/// square-on, stepping down to nothing past the last band.
pub fn directional_multiplier(angle_deg: f32) -> f32 {
    let angle = angle_deg.abs();
    for (limit, mult) in cover::ANGLE_BANDS {
        if angle < limit {
            return mult;
        }
    }
    0.0
}

/// Distance multiplier from how far the defender stands from the cover
/// object, in tiles: a third at point-blank, two thirds at about a
/// tile, full value from two tiles out.
pub fn distance_multiplier(dist_tiles: f32) -> f32 {
    if dist_tiles < cover::DIST_NEAR_TILES {
        cover::DIST_NEAR_MULT
    } else if dist_tiles < cover::DIST_MID_TILES {
        cover::DIST_MID_MULT
    } else {
        1.0
    }
}

/// Effective cover value of a single object for a given shot geometry.
pub fn effective_cover(base: f32, angle_deg: f32, dist_tiles: f32) -> f32 {
    base.clamp(0.0, 1.0) * directional_multiplier(angle_deg) * distance_multiplier(dist_tiles)
}

/// Whether an object lies within the final stretch of the shot path
/// toward the defender (the last quarter of the segment), within one
/// tile laterally. Cover far from the defender stops nothing.
pub fn in_shot_path(threat: Vec2, defender: Vec2, object: Vec2) -> bool {
    let path = defender - threat;
    let len_sq = path.length() * path.length();
    if len_sq <= f32::EPSILON {
        return false;
    }
    let to_object = object - threat;
    let t = to_object.dot(&path) / len_sq;
    if t < 1.0 - cover::SHOT_PATH_WINDOW || t > 1.0 {
        return false;
    }
    let closest = threat + path * t;
    closest.distance(&object) <= world::TILE_SIZE
}

/// Combine effective cover from several `(value, high)` objects. The
/// best object counts at full value; only low cover stacks behind it,
/// up to two secondaries at a fifth each, capped. High cover blocks
/// the shot line outright, so nothing stacks on top of a high primary
/// and high objects never act as secondaries.
pub fn stack_cover(values: &[(f32, bool)]) -> f32 {
    let mut sorted: Vec<(f32, bool)> = values
        .iter()
        .map(|&(v, high)| (v.clamp(0.0, 1.0), high))
        .collect();
    sorted.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));

    let Some(&(primary, primary_high)) = sorted.first() else {
        return 0.0;
    };

    let mut total = primary;
    if !primary_high {
        total += sorted[1..]
            .iter()
            .filter(|&&(_, high)| !high)
            .take(2)
            .map(|&(v, _)| v * cover::STACK_FRACTION)
            .sum::<f32>();
    }
    total.min(cover::STACK_CAP)
}

/// Score for a candidate cover position: mostly how much cover it
/// grants, partly how far it keeps the defender from the threat.
pub fn position_score(cover_value: f32, threat_dist: f32, max_dist: f32) -> f32 {
    let dist_norm = if max_dist > 0.0 {
        (threat_dist / max_dist).clamp(0.0, 1.0)
    } else {
        0.0
    };
    cover::SEEK_COVER_WEIGHT * cover_value.clamp(0.0, 1.0) + cover::SEEK_DISTANCE_WEIGHT * dist_norm
}
