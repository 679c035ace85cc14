//! The movement primitive.
//!
//! Pathfinding is an external collaborator; the behavior core only
//! needs "move toward this point, tell me when I arrive". The cached
//! route is the [`Route`] component, present while a destination is
//! active.

use crate::components::{Mobility, Position, Route};
use hecs::{Entity, World};
use outpost_logic::capacity::{move_speed_scalar, Capacities};
use outpost_logic::geometry::Vec2;

/// Step `entity` toward `dest`, returning true once it is within
/// `arrival_radius`. Speed is the actor's base speed scaled by its
/// current capabilities.
pub fn move_toward(world: &mut World, entity: Entity, dt: f32, dest: Vec2, arrival_radius: f32) -> bool {
    let (current, speed) = {
        let Ok(pos) = world.get::<&Position>(entity) else {
            return false;
        };
        let base = world
            .get::<&Mobility>(entity)
            .map(|m| m.base_speed)
            .unwrap_or(60.0);
        let scalar = world
            .get::<&Capacities>(entity)
            .map(|c| move_speed_scalar(&c))
            .unwrap_or(1.0);
        (pos.pos, base * scalar)
    };

    let diff = dest - current;
    let distance = diff.length();
    if distance <= arrival_radius {
        clear_route(world, entity);
        return true;
    }

    let step = (speed * dt).min(distance);
    let new_pos = current + diff.normalize() * step;

    if let Ok(mut pos) = world.get::<&mut Position>(entity) {
        pos.pos = new_pos;
    }

    // An arrival ends the route whether it happened before or after the
    // step; a lingering Route on a stationary actor reads as a stall to
    // the stuck watchdog.
    if new_pos.distance(&dest) <= arrival_radius {
        clear_route(world, entity);
        true
    } else {
        let _ = world.insert_one(entity, Route { dest, arrival_radius });
        false
    }
}

/// Drop the cached route. Mandatory on every transition out of a
/// movement-dependent state so a stale destination never leaks into
/// the next behavior.
pub fn clear_route(world: &mut World, entity: Entity) {
    let _ = world.remove_one::<Route>(entity);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::Colonist;

    fn spawn_walker(world: &mut World, x: f32, y: f32) -> Entity {
        world.spawn((
            Colonist,
            Position::new(x, y),
            Mobility::default(),
            Capacities::default(),
        ))
    }

    #[test]
    fn test_arrives_within_radius() {
        let mut world = World::new();
        let walker = spawn_walker(&mut world, 0.0, 0.0);

        // 60 units/s for 1s covers the 50 units easily.
        let arrived = move_toward(&mut world, walker, 1.0, Vec2::new(50.0, 0.0), 4.0);
        assert!(arrived);
        // Route cleared on arrival.
        assert!(world.get::<&Route>(walker).is_err());
    }

    #[test]
    fn test_partial_progress() {
        let mut world = World::new();
        let walker = spawn_walker(&mut world, 0.0, 0.0);

        let arrived = move_toward(&mut world, walker, 0.5, Vec2::new(200.0, 0.0), 4.0);
        assert!(!arrived);

        let pos = world.get::<&Position>(walker).unwrap();
        assert!((pos.pos.x - 30.0).abs() < 0.001);
        assert!(world.get::<&Route>(walker).is_ok());
    }

    #[test]
    fn test_reduced_mobility_slows() {
        let mut world = World::new();
        let walker = spawn_walker(&mut world, 0.0, 0.0);
        {
            let mut caps = world.get::<&mut Capacities>(walker).unwrap();
            caps.mobility = 0.5;
        }

        move_toward(&mut world, walker, 1.0, Vec2::new(500.0, 0.0), 4.0);
        let pos = world.get::<&Position>(walker).unwrap();
        assert!(pos.pos.x < 40.0);
    }

    #[test]
    fn test_route_cleared_by_arriving_step() {
        let mut world = World::new();
        let walker = spawn_walker(&mut world, 0.0, 0.0);

        // First step is partial and caches a route.
        assert!(!move_toward(&mut world, walker, 0.5, Vec2::new(100.0, 0.0), 4.0));
        assert!(world.get::<&Route>(walker).is_ok());

        // The step that lands inside the arrival radius drops it, so a
        // now-stationary actor carries no route.
        assert!(move_toward(&mut world, walker, 2.0, Vec2::new(100.0, 0.0), 4.0));
        assert!(world.get::<&Route>(walker).is_err());
    }

    #[test]
    fn test_clear_route() {
        let mut world = World::new();
        let walker = spawn_walker(&mut world, 0.0, 0.0);

        move_toward(&mut world, walker, 0.1, Vec2::new(500.0, 0.0), 4.0);
        assert!(world.get::<&Route>(walker).is_ok());

        clear_route(&mut world, walker);
        assert!(world.get::<&Route>(walker).is_err());
        // Clearing again is harmless.
        clear_route(&mut world, walker);
    }
}
