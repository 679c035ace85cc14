//! Hostile actors and automated defenses.
//!
//! Hostiles run a deliberately simple loop — chase the nearest living
//! colonist, attack in weapon range — so the interesting decisions stay
//! on the colonist side. Turrets share the colonists' threat scoring,
//! which is what makes defensive fire converge on one target.

use crate::components::{Building, Colonist, Hostile, Position, Vitals, Weapon};
use crate::systems::combat::TacticalEngine;
use crate::systems::movement::move_toward;
use crate::systems::scheduler::attack;
use hecs::{Entity, World};
use outpost_logic::geometry::Vec2;

/// Advance every hostile: pick the nearest colonist, close, attack.
pub fn hostiles_system(world: &mut World, dt: f32) {
    let colonists: Vec<(Entity, Vec2)> = world
        .query::<(&Colonist, &Position, &Vitals)>()
        .iter()
        .filter(|(_, (_, _, v))| v.alive())
        .map(|(e, (_, p, _))| (e, p.pos))
        .collect();

    let hostiles: Vec<(Entity, Vec2, f32, bool)> = world
        .query::<(&Hostile, &Position, &Vitals)>()
        .iter()
        .map(|(e, (_, p, v))| {
            let range = world.get::<&Weapon>(e).map(|w| w.range).unwrap_or(16.0);
            (e, p.pos, range, v.alive())
        })
        .collect();

    for (hostile, pos, range, alive) in hostiles {
        if !alive {
            continue;
        }
        let Some((target, target_pos)) = colonists
            .iter()
            .min_by(|(_, a), (_, b)| {
                a.distance_squared(&pos)
                    .partial_cmp(&b.distance_squared(&pos))
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .copied()
        else {
            continue;
        };

        if pos.distance(&target_pos) <= range {
            attack(world, hostile, target, dt);
        } else {
            move_toward(world, hostile, dt, target_pos, range * 0.9);
        }
    }
}

/// Turret fire. Each turret asks the tactical engine for the best
/// target within its weapon range, so all turrets (and armed colonists)
/// concentrate on the same enemy.
pub fn turrets_system(world: &mut World, tactical: &TacticalEngine, dt: f32) {
    let turrets: Vec<(Entity, Vec2, f32)> = world
        .query::<(&Building, &Position, &Weapon)>()
        .iter()
        .filter(|(_, (b, _, _))| b.protection_radius().is_some())
        .map(|(e, (_, p, w))| (e, p.pos, w.range))
        .collect();

    for (turret, pos, range) in turrets {
        if let Some(target) = tactical.best_target(world, pos, range) {
            attack(world, turret, target, dt);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{BuildingKind, Mobility};
    use outpost_logic::capacity::Capacities;

    #[test]
    fn test_hostile_chases_colonist() {
        let mut world = World::new();
        world.spawn((Colonist, Position::new(300.0, 0.0), Vitals::default()));
        let hostile = world.spawn((
            Hostile,
            Position::new(0.0, 0.0),
            Vitals::default(),
            Mobility::default(),
            Capacities::default(),
            Weapon::new(16.0, 5.0, 1.0),
        ));

        hostiles_system(&mut world, 1.0);

        let pos = world.get::<&Position>(hostile).unwrap().pos;
        assert!(pos.x > 0.0);
    }

    #[test]
    fn test_hostile_attacks_in_range() {
        let mut world = World::new();
        let colonist = world.spawn((Colonist, Position::new(10.0, 0.0), Vitals::default()));
        world.spawn((
            Hostile,
            Position::new(0.0, 0.0),
            Vitals::default(),
            Mobility::default(),
            Capacities::default(),
            Weapon::new(16.0, 5.0, 1.0),
        ));

        hostiles_system(&mut world, 0.1);

        let hp = world.get::<&Vitals>(colonist).unwrap().hp;
        assert!(hp < 100.0);
    }

    #[test]
    fn test_dead_hostile_stays_down() {
        let mut world = World::new();
        let colonist = world.spawn((Colonist, Position::new(10.0, 0.0), Vitals::default()));
        world.spawn((
            Hostile,
            Position::new(0.0, 0.0),
            Vitals {
                hp: 0.0,
                ..Default::default()
            },
            Mobility::default(),
            Capacities::default(),
            Weapon::new(16.0, 5.0, 1.0),
        ));

        hostiles_system(&mut world, 0.1);

        let hp = world.get::<&Vitals>(colonist).unwrap().hp;
        assert_eq!(hp, 100.0);
    }

    #[test]
    fn test_turrets_focus_the_same_target() {
        let mut world = World::new();
        for x in [0.0, 50.0] {
            world.spawn((
                Building::new(BuildingKind::Turret),
                Position::new(x, 0.0),
                Weapon::new(200.0, 10.0, 1.0),
            ));
        }
        let strong = world.spawn((
            Hostile,
            Position::new(100.0, 0.0),
            Vitals::default(),
        ));
        let weak = world.spawn((
            Hostile,
            Position::new(110.0, 0.0),
            Vitals {
                hp: 20.0,
                ..Default::default()
            },
        ));

        let tactical = TacticalEngine::new();
        turrets_system(&mut world, &tactical, 0.1);

        // Both turrets hit the wounded enemy; the healthy one is untouched.
        assert_eq!(world.get::<&Vitals>(strong).unwrap().hp, 100.0);
        assert!(world.get::<&Vitals>(weak).unwrap().hp < 20.0);
    }
}
