//! Stuck detection and rescue.
//!
//! Actors can end up inside an obstacle footprint (a building finishes
//! on top of them, a spawn lands badly) or grind against geometry
//! while trying to reach a work target. Both feed one stuck timer; once
//! it exceeds the grace period the actor is teleported to the nearest
//! free point and reset to task-seeking. Rescue is loud — every
//! teleport is logged with the actor and both positions.

use crate::components::{Building, Colonist, Mobility, Obstacle, Position, WorldConfig};
use crate::reservations::ReservationLedger;
use crate::systems::movement::clear_route;
use crate::components::{BehaviorRuntime, BehaviorState, Route};
use hecs::{Entity, World};
use outpost_logic::constants::rescue as limits;
use outpost_logic::geometry::{circles_overlap, Bounds, Vec2};
use outpost_logic::rescue::{is_stalled, probe_offsets};

/// Detect stuck colonists and teleport them free.
pub fn rescue_system(
    world: &mut World,
    ledger: &mut ReservationLedger,
    config: &WorldConfig,
    dt: f32,
    now: f64,
) {
    let obstacles: Vec<(Vec2, f32)> = world
        .query::<(&Obstacle, &Position)>()
        .iter()
        .map(|(_, (o, pos))| (pos.pos, o.radius))
        .collect();

    let bounds = config.bounds();
    let mut rescues: Vec<(Entity, Vec2, Vec2)> = Vec::new();

    for (entity, (_, pos, mobility, runtime)) in world
        .query::<(&Colonist, &Position, &Mobility, &mut BehaviorRuntime)>()
        .iter()
    {
        let here = pos.pos;
        let overlapping = obstacles
            .iter()
            .any(|&(op, or)| circles_overlap(here, mobility.radius, op, or));

        if overlapping {
            runtime.stuck_timer += dt;
        }

        // Progress stalls only count while the actor is actually trying
        // to go somewhere. Each elapsed window with no displacement adds
        // the whole window to the stuck timer.
        let routing = world.get::<&Route>(entity).is_ok();
        runtime.work_stall_timer += dt;
        if runtime.work_stall_timer >= limits::STALL_WINDOW {
            let displacement = here.distance(&runtime.last_position);
            if routing && is_stalled(runtime.work_stall_timer, displacement) {
                runtime.stuck_timer += runtime.work_stall_timer;
            }
            runtime.work_stall_timer = 0.0;
            runtime.last_position = here;
        }

        if !overlapping && !routing {
            runtime.stuck_timer = 0.0;
        }

        if runtime.stuck_timer >= limits::STUCK_GRACE {
            let target = free_point_near(here, mobility.radius, &obstacles, &bounds)
                .unwrap_or_else(|| {
                    config.home_base + Vec2::new(limits::HOME_FALLBACK_OFFSET, 0.0)
                });
            rescues.push((entity, here, target));
        }
    }

    for (entity, from, to) in rescues {
        log::warn!(
            "rescuing stuck actor {:?} from ({:.0},{:.0}) to ({:.0},{:.0})",
            entity,
            from.x,
            from.y,
            to.x,
            to.y
        );
        ledger.release(entity);
        clear_route(world, entity);
        if let Ok(mut pos) = world.get::<&mut Position>(entity) {
            pos.pos = to;
        }
        let occupied = match world.get::<&mut BehaviorRuntime>(entity) {
            Ok(mut runtime) => {
                runtime.stuck_timer = 0.0;
                runtime.work_stall_timer = 0.0;
                runtime.last_position = to;
                runtime.task = None;
                let occupied = runtime.occupying.take();
                runtime.enter_state(BehaviorState::SeekTask, now);
                occupied
            }
            Err(_) => None,
        };
        if let Some(building) = occupied {
            if let Ok(mut b) = world.get::<&mut Building>(building) {
                b.occupancy = b.occupancy.saturating_sub(1);
            }
        }
    }
}

/// First probe point around `from` where an actor of `actor_radius`
/// fits inside the world clear of every obstacle. Probes expand outward
/// ring by ring so the rescue displacement stays as small as possible.
fn free_point_near(
    from: Vec2,
    actor_radius: f32,
    obstacles: &[(Vec2, f32)],
    bounds: &Bounds,
) -> Option<Vec2> {
    for offset in probe_offsets() {
        let candidate = from + offset;
        if !bounds.contains(&candidate) {
            continue;
        }
        let clear = obstacles
            .iter()
            .all(|&(op, or)| !circles_overlap(candidate, actor_radius, op, or));
        if clear {
            return Some(candidate);
        }
    }
    None
}
