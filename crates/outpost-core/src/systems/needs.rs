//! Needs & vitals system, plus the capability-provider seam.
//!
//! The vitals update is a pure per-tick step with no branching on
//! other systems: activity class comes from the actor's current state,
//! the healing aura from proximity to a built medical building, and
//! the rest is `outpost_logic::needs`.

use crate::components::{Building, BuildingKind, Colonist, Position, Vitals};
use crate::components::BehaviorRuntime;
use hecs::World;
use outpost_logic::capacity::Capacities;
use outpost_logic::constants::needs as rates;
use outpost_logic::geometry::Vec2;
use outpost_logic::needs::{step_vitals, Temperament};

/// Source of per-actor capability scalars, refreshed before each
/// scheduler tick. The real body simulation lives outside this crate;
/// the default implementation derives rough scalars from vitals so the
/// core runs stand-alone.
pub trait CapabilityProvider {
    fn refresh(&self, world: &mut World);
}

/// Default provider: capabilities degrade with lost hp.
#[derive(Debug, Default)]
pub struct VitalsCapabilities;

impl CapabilityProvider for VitalsCapabilities {
    fn refresh(&self, world: &mut World) {
        for (_, (vitals, caps)) in world.query_mut::<(&Vitals, &mut Capacities)>() {
            let health = vitals.hp / 100.0;
            caps.consciousness = (0.3 + 0.7 * health).clamp(0.0, 1.0);
            caps.mobility = (0.4 + 0.6 * health).clamp(0.0, 1.0);
            caps.manipulation = (0.4 + 0.6 * health).clamp(0.0, 1.0);
            caps.pain = ((1.0 - health) * 0.6).clamp(0.0, 1.0);
            caps.bleeding = vitals.hp < 25.0;
            caps.blood_level = (0.5 + 0.5 * health).clamp(0.0, 1.0);
        }
    }
}

/// Positions of built medical buildings, for aura checks.
fn healing_sources(world: &World) -> Vec<Vec2> {
    world
        .query::<(&Building, &Position)>()
        .iter()
        .filter(|(_, (b, _))| b.kind == BuildingKind::Medical && b.built)
        .map(|(_, (_, pos))| pos.pos)
        .collect()
}

/// Advance hunger, fatigue and hp for every colonist.
pub fn needs_system(world: &mut World, dt: f32) {
    let sources = healing_sources(world);
    let aura_sq = rates::HEALING_AURA_RADIUS * rates::HEALING_AURA_RADIUS;

    for (_, (_, vitals, runtime, temperament, pos)) in world
        .query_mut::<(&Colonist, &mut Vitals, &BehaviorRuntime, &Temperament, &Position)>()
    {
        let in_aura = sources
            .iter()
            .any(|s| s.distance_squared(&pos.pos) <= aura_sq);

        let step = step_vitals(
            vitals.hunger,
            vitals.fatigue,
            vitals.hp,
            runtime.state.activity_class(),
            temperament,
            in_aura,
            dt,
        );
        vitals.hunger = step.hunger;
        vitals.fatigue = step.fatigue;
        vitals.hp = step.hp;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::BehaviorState;

    fn spawn_colonist(world: &mut World, x: f32, y: f32) -> hecs::Entity {
        world.spawn((
            Colonist,
            Position::new(x, y),
            Vitals::default(),
            Capacities::default(),
            Temperament::default(),
            BehaviorRuntime::default(),
        ))
    }

    #[test]
    fn test_needs_accumulate() {
        let mut world = World::new();
        let colonist = spawn_colonist(&mut world, 0.0, 0.0);

        needs_system(&mut world, 10.0);

        let vitals = world.get::<&Vitals>(colonist).unwrap();
        assert!(vitals.hunger > 0.0);
        assert!(vitals.fatigue > 0.0);
    }

    #[test]
    fn test_sleeping_recovers_fatigue() {
        let mut world = World::new();
        let colonist = spawn_colonist(&mut world, 0.0, 0.0);
        {
            let mut vitals = world.get::<&mut Vitals>(colonist).unwrap();
            vitals.fatigue = 80.0;
            let mut runtime = world.get::<&mut BehaviorRuntime>(colonist).unwrap();
            runtime.state = BehaviorState::Sleep;
        }

        needs_system(&mut world, 5.0);

        let vitals = world.get::<&Vitals>(colonist).unwrap();
        assert!(vitals.fatigue < 80.0);
    }

    #[test]
    fn test_healing_aura_applies_in_range() {
        let mut world = World::new();
        let near = spawn_colonist(&mut world, 10.0, 0.0);
        let far = spawn_colonist(&mut world, 500.0, 0.0);
        for e in [near, far] {
            world.get::<&mut Vitals>(e).unwrap().hp = 50.0;
        }
        world.spawn((Building::new(BuildingKind::Medical), Position::new(0.0, 0.0)));

        needs_system(&mut world, 5.0);

        let hp_near = world.get::<&Vitals>(near).unwrap().hp;
        let hp_far = world.get::<&Vitals>(far).unwrap().hp;
        assert!(hp_near > hp_far);
    }

    #[test]
    fn test_capability_provider_degrades_with_hp() {
        let mut world = World::new();
        let colonist = spawn_colonist(&mut world, 0.0, 0.0);
        world.get::<&mut Vitals>(colonist).unwrap().hp = 20.0;

        VitalsCapabilities.refresh(&mut world);

        let caps = world.get::<&Capacities>(colonist).unwrap();
        assert!(caps.mobility < 1.0);
        assert!(caps.pain > 0.0);
        assert!(caps.bleeding);
    }
}
