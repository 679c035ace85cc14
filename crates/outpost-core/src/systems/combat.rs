//! Tactical combat decision engine.
//!
//! Consumed by the scheduler's flee and combat-adjacent states.
//! Everything here is recomputed per evaluation from the live world —
//! danger state, cover candidates, retreat destinations are never
//! shared by reference across ticks. The only persistent piece is a
//! small per-actor cache of recent cover picks, pruned on `cleanup`.

use crate::components::{
    BehaviorRuntime, Building, Colonist, CoverObject, Hostile, Position, Vitals, Weapon,
};
use hecs::{Entity, World};
use outpost_logic::constants::{danger, tactical, world as world_consts};
use outpost_logic::cover::{effective_cover, in_shot_path, position_score, stack_cover};
use outpost_logic::geometry::{angle_between_deg, Vec2};
use outpost_logic::rescue::DIRECTIONS;
use outpost_logic::threat::{best_target as pick_threat, ThreatProfile};
use std::collections::HashMap;

/// Derived danger reading — never stored on the actor beyond the
/// remembered threat entity that feeds the hysteresis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DangerState {
    pub in_danger: bool,
    pub threat: Option<Entity>,
    pub distance: f32,
}

impl DangerState {
    fn safe() -> Self {
        Self {
            in_danger: false,
            threat: None,
            distance: f32::INFINITY,
        }
    }
}

/// A scored cover position candidate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoverSpot {
    pub pos: Vec2,
    /// Combined effective cover value at this spot, 0..=0.9.
    pub cover_value: f32,
    pub score: f32,
}

#[derive(Debug, Clone, Copy)]
struct CachedCover {
    spot: CoverSpot,
    at: f64,
}

/// The tactical engine. One instance per simulation; per-actor state
/// is keyed by entity and bounded by the cleanup TTL.
#[derive(Debug, Default)]
pub struct TacticalEngine {
    cover_cache: HashMap<Entity, CachedCover>,
}

impl TacticalEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compute the danger state for an actor at `actor_pos`.
    ///
    /// Hysteresis: entering danger needs a hostile inside the enter
    /// radius, but once fleeing from a specific threat the actor stays
    /// in danger until *that same threat* is dead or beyond the exit
    /// radius — "any enemy nearby" checks would oscillate with several
    /// enemies around.
    pub fn danger_state(
        &self,
        world: &World,
        actor_pos: Vec2,
        remembered: Option<Entity>,
    ) -> DangerState {
        if let Some(threat) = remembered {
            if let Some(distance) = hostile_distance(world, threat, actor_pos) {
                if distance <= danger::EXIT_RADIUS {
                    return DangerState {
                        in_danger: true,
                        threat: Some(threat),
                        distance,
                    };
                }
            }
            // Remembered threat gone or out of the band; fall through
            // to a fresh scan with the tighter enter radius.
        }

        let mut nearest: Option<(Entity, f32)> = None;
        for (entity, (_, pos, vitals)) in world.query::<(&Hostile, &Position, &Vitals)>().iter() {
            if !vitals.alive() {
                continue;
            }
            let distance = pos.pos.distance(&actor_pos);
            if distance <= danger::ENTER_RADIUS
                && nearest.map(|(_, d)| distance < d).unwrap_or(true)
            {
                nearest = Some((entity, distance));
            }
        }

        match nearest {
            Some((threat, distance)) => DangerState {
                in_danger: true,
                threat: Some(threat),
                distance,
            },
            None => DangerState::safe(),
        }
    }

    /// Whether the actor should be fleeing right now.
    pub fn should_flee(&self, world: &World, actor_pos: Vec2, remembered: Option<Entity>) -> bool {
        self.danger_state(world, actor_pos, remembered).in_danger
    }

    /// Whether seeking cover beats running: worthwhile when the threat
    /// is ranged and some cover exists within awareness range.
    pub fn should_take_cover(&self, world: &World, actor_pos: Vec2, threat: Entity) -> bool {
        let threat_ranged = world
            .get::<&Weapon>(threat)
            .map(|w| w.range > world_consts::TILE_SIZE * 2.0)
            .unwrap_or(false);
        if !threat_ranged {
            return false;
        }
        let awareness_sq = danger::AWARENESS_RADIUS * danger::AWARENESS_RADIUS;
        world
            .query::<(&CoverObject, &Position)>()
            .iter()
            .any(|(_, (_, pos))| pos.pos.distance_squared(&actor_pos) <= awareness_sq)
    }

    /// Find the best cover position against a threat at `threat_pos`.
    ///
    /// Candidates ring every cover object in awareness range on the
    /// side away from the threat; each is scored by its stacked
    /// effective cover and its distance from the threat. Recent picks
    /// are cached per actor so a fleeing colonist does not re-solve
    /// every frame.
    pub fn find_cover_position(
        &mut self,
        world: &World,
        actor: Entity,
        actor_pos: Vec2,
        threat_pos: Vec2,
        now: f64,
    ) -> Option<CoverSpot> {
        if let Some(cached) = self.cover_cache.get(&actor) {
            if now - cached.at < 0.5 {
                return Some(cached.spot);
            }
        }

        let awareness_sq = danger::AWARENESS_RADIUS * danger::AWARENESS_RADIUS;
        let objects: Vec<(Vec2, f32, f32, bool)> = world
            .query::<(&CoverObject, &Position)>()
            .iter()
            .filter(|(_, (_, pos))| pos.pos.distance_squared(&actor_pos) <= awareness_sq)
            .map(|(_, (cover, pos))| (pos.pos, cover.base_value, cover.radius, cover.high))
            .collect();

        let mut best: Option<CoverSpot> = None;
        for &(obj_pos, _, obj_radius, _) in &objects {
            let away = (obj_pos - threat_pos).normalize();
            for dir in DIRECTIONS {
                // Only positions on the far side of the object.
                if dir.dot(&away) <= 0.0 {
                    continue;
                }
                let candidate = obj_pos + dir * (obj_radius + 10.0);
                let value = cover_value_at(&objects, threat_pos, candidate);
                let score = position_score(
                    value,
                    candidate.distance(&threat_pos),
                    danger::AWARENESS_RADIUS,
                );
                if best.map(|b| score > b.score).unwrap_or(true) {
                    best = Some(CoverSpot {
                        pos: candidate,
                        cover_value: value,
                        score,
                    });
                }
            }
        }

        if let Some(spot) = best {
            self.cover_cache.insert(actor, CachedCover { spot, at: now });
        }
        best
    }

    /// Pick a retreat destination: a building inside a turret's
    /// protection range beats arbitrary shelter, then the nearest
    /// building with free capacity, then the home base. Always returns
    /// somewhere — the caller never stalls.
    pub fn find_retreat_position(&self, world: &World, actor_pos: Vec2, home: Vec2) -> Vec2 {
        let turrets: Vec<(Vec2, f32)> = world
            .query::<(&Building, &Position)>()
            .iter()
            .filter_map(|(_, (b, pos))| b.protection_radius().map(|r| (pos.pos, r)))
            .collect();

        let mut protected: Option<(Vec2, f32)> = None;
        let mut fallback: Option<(Vec2, f32)> = None;
        for (_, (building, pos)) in world.query::<(&Building, &Position)>().iter() {
            if !building.has_free_capacity() {
                continue;
            }
            let distance = pos.pos.distance(&actor_pos);
            let guarded = turrets
                .iter()
                .any(|(tp, r)| tp.distance(&pos.pos) <= *r);
            if guarded && protected.map(|(_, d)| distance < d).unwrap_or(true) {
                protected = Some((pos.pos, distance));
            }
            if fallback.map(|(_, d)| distance < d).unwrap_or(true) {
                fallback = Some((pos.pos, distance));
            }
        }

        protected.or(fallback).map(|(p, _)| p).unwrap_or(home)
    }

    /// Best attack target within `range` of `actor_pos`. All actors run
    /// the same deterministic scoring over the same enemy list, so
    /// focus fire emerges without any coordination messages.
    pub fn best_target(&self, world: &World, actor_pos: Vec2, range: f32) -> Option<Entity> {
        let mut profiles = Vec::new();
        let mut by_id: HashMap<u64, Entity> = HashMap::new();

        for (entity, (_, pos, vitals)) in world.query::<(&Hostile, &Position, &Vitals)>().iter() {
            if !vitals.alive() {
                continue;
            }
            let distance = pos.pos.distance(&actor_pos);
            if distance > range {
                continue;
            }
            let weapon_range = world.get::<&Weapon>(entity).map(|w| w.range).unwrap_or(0.0);
            let id = entity.id() as u64;
            profiles.push(ThreatProfile {
                id,
                distance,
                hp: vitals.hp,
                weapon_range,
            });
            by_id.insert(id, entity);
        }

        pick_threat(&profiles).and_then(|t| by_id.get(&t.id).copied())
    }

    /// Prune cached tactical state and stale danger memories. Run once
    /// per global tick to bound memory.
    pub fn cleanup(&mut self, world: &mut World, now: f64) {
        let ttl = tactical::CACHE_TTL as f64;
        self.cover_cache.retain(|_, c| now - c.at < ttl);

        for (_, (_, runtime)) in world.query_mut::<(&Colonist, &mut BehaviorRuntime)>() {
            runtime.prune_danger_memory(now);
        }
    }
}

/// Distance to a specific hostile, if it still exists and is alive.
fn hostile_distance(world: &World, entity: Entity, from: Vec2) -> Option<f32> {
    let pos = world.get::<&Position>(entity).ok()?.pos;
    let alive = world.get::<&Vitals>(entity).map(|v| v.alive()).unwrap_or(false);
    if world.get::<&Hostile>(entity).is_ok() && alive {
        Some(pos.distance(&from))
    } else {
        None
    }
}

/// Stacked effective cover at `defender` against a shot from
/// `threat_pos`, considering only objects within the final stretch of
/// the shot path.
fn cover_value_at(objects: &[(Vec2, f32, f32, bool)], threat_pos: Vec2, defender: Vec2) -> f32 {
    let mut values = Vec::new();
    for &(obj_pos, base, _, high) in objects {
        if !in_shot_path(threat_pos, defender, obj_pos) {
            continue;
        }
        let angle = angle_between_deg(defender - obj_pos, defender - threat_pos);
        let dist_tiles = defender.distance(&obj_pos) / world_consts::TILE_SIZE;
        let value = effective_cover(base, angle, dist_tiles);
        if value > 0.0 {
            values.push((value, high));
        }
    }
    stack_cover(&values)
}
