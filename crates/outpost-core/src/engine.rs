//! The simulation engine: owns the world and shared services, and runs
//! the per-tick system order.

use crate::components::{
    BehaviorRuntime, Building, BuildingKind, Colonist, CoverObject, Hostile, Medic, Mobility,
    Obstacle, Position, ResourceKind, ResourceNode, Vitals, Weapon, WorldConfig,
};
use crate::reservations::ReservationLedger;
use crate::systems::combat::TacticalEngine;
use crate::systems::hostiles::{hostiles_system, turrets_system};
use crate::systems::needs::{needs_system, CapabilityProvider, VitalsCapabilities};
use crate::systems::rescue::rescue_system;
use crate::systems::scheduler::{scheduler_system, SchedulerCtx};
use hecs::{Entity, World};
use outpost_logic::constants::world as world_consts;
use outpost_logic::needs::Temperament;

/// Top-level simulation. Systems run in a fixed order each tick:
/// capability refresh, stuck rescue, needs, the behavior scheduler,
/// hostiles and turrets, death cleanup, tactical cache pruning.
pub struct Engine {
    pub world: World,
    pub config: WorldConfig,
    ledger: ReservationLedger,
    tactical: TacticalEngine,
    capabilities: Box<dyn CapabilityProvider>,
    /// Colony food stock.
    pub food: u32,
    sim_time: f64,
}

impl Engine {
    pub fn new(config: WorldConfig) -> Self {
        Self {
            world: World::new(),
            config,
            ledger: ReservationLedger::new(),
            tactical: TacticalEngine::new(),
            capabilities: Box::new(VitalsCapabilities),
            food: 0,
            sim_time: 0.0,
        }
    }

    /// Swap in an external capability source (a richer body simulation).
    pub fn with_capability_provider(mut self, provider: Box<dyn CapabilityProvider>) -> Self {
        self.capabilities = provider;
        self
    }

    /// Advance the simulation by `dt` seconds.
    pub fn update(&mut self, dt: f32) {
        self.sim_time += dt as f64;
        let night = self.is_night();

        self.capabilities.refresh(&mut self.world);
        rescue_system(&mut self.world, &mut self.ledger, &self.config, dt, self.sim_time);
        needs_system(&mut self.world, dt);

        let mut ctx = SchedulerCtx {
            ledger: &mut self.ledger,
            tactical: &mut self.tactical,
            config: &self.config,
            food: &mut self.food,
            now: self.sim_time,
            night,
            dt,
        };
        scheduler_system(&mut self.world, &mut ctx);

        hostiles_system(&mut self.world, dt);
        turrets_system(&mut self.world, &self.tactical, dt);

        self.bury_dead();
        self.tactical.cleanup(&mut self.world, self.sim_time);
    }

    pub fn sim_time(&self) -> f64 {
        self.sim_time
    }

    /// Hour of the simulated day, 0..24.
    pub fn hour_of_day(&self) -> f32 {
        let day_fraction = (self.sim_time / world_consts::DAY_LENGTH as f64).fract();
        (day_fraction * 24.0) as f32
    }

    pub fn is_night(&self) -> bool {
        let hour = self.hour_of_day();
        hour >= world_consts::NIGHT_START || hour < world_consts::NIGHT_END
    }

    pub fn reservations(&self) -> &ReservationLedger {
        &self.ledger
    }

    // -- spawning ------------------------------------------------------

    pub fn spawn_colonist(&mut self, x: f32, y: f32) -> Entity {
        self.world.spawn((
            Colonist,
            Position::new(x, y),
            Vitals::default(),
            Mobility::default(),
            outpost_logic::capacity::Capacities::default(),
            Temperament::default(),
            BehaviorRuntime::default(),
        ))
    }

    pub fn spawn_medic(&mut self, x: f32, y: f32) -> Entity {
        let medic = self.spawn_colonist(x, y);
        // Insert cannot fail: the entity was just spawned.
        let _ = self.world.insert_one(medic, Medic);
        medic
    }

    pub fn spawn_hostile(&mut self, x: f32, y: f32, weapon: Weapon) -> Entity {
        self.world.spawn((
            Hostile,
            Position::new(x, y),
            Vitals::default(),
            Mobility::default(),
            outpost_logic::capacity::Capacities::default(),
            weapon,
        ))
    }

    /// Place a finished building. Walls also block movement and give
    /// high cover; turrets come armed.
    pub fn spawn_building(&mut self, kind: BuildingKind, x: f32, y: f32) -> Entity {
        let building = Building::new(kind);
        let entity = self.world.spawn((building, Position::new(x, y)));
        match kind {
            BuildingKind::Wall => {
                let _ = self
                    .world
                    .insert(entity, (CoverObject::wall(), Obstacle { radius: building.radius }));
            }
            BuildingKind::Turret => {
                let _ = self.world.insert_one(entity, Weapon::new(200.0, 8.0, 1.0));
            }
            _ => {}
        }
        entity
    }

    pub fn spawn_build_site(&mut self, kind: BuildingKind, effort: f32, x: f32, y: f32) -> Entity {
        self.world.spawn((
            Building::under_construction(kind, effort),
            Position::new(x, y),
        ))
    }

    /// Place a resource node. Trees and rocks double as low cover.
    pub fn spawn_resource(&mut self, kind: ResourceKind, x: f32, y: f32) -> Entity {
        let node = ResourceNode::new(kind);
        let entity = self.world.spawn((node, Position::new(x, y)));
        match kind {
            ResourceKind::Tree => {
                let _ = self.world.insert_one(entity, CoverObject::tree());
            }
            ResourceKind::Rock => {
                let _ = self.world.insert_one(entity, CoverObject::rock());
            }
            ResourceKind::Crop => {}
        }
        entity
    }

    // -- queries -------------------------------------------------------

    pub fn colonist_count(&self) -> usize {
        self.world
            .query::<(&Colonist, &Vitals)>()
            .iter()
            .filter(|(_, (_, v))| v.alive())
            .count()
    }

    pub fn hostile_count(&self) -> usize {
        self.world
            .query::<(&Hostile, &Vitals)>()
            .iter()
            .filter(|(_, (_, v))| v.alive())
            .count()
    }

    /// Despawn dead actors, returning their reservations and occupancy
    /// slots to the pool.
    fn bury_dead(&mut self) {
        let dead: Vec<(Entity, Option<Entity>)> = self
            .world
            .query::<(&Vitals,)>()
            .iter()
            .filter(|(_, (v,))| !v.alive())
            .map(|(e, _)| {
                let occupied = self
                    .world
                    .get::<&BehaviorRuntime>(e)
                    .ok()
                    .and_then(|r| r.occupying);
                (e, occupied)
            })
            .collect();

        for (entity, occupied) in dead {
            log::info!("actor {:?} died", entity);
            self.ledger.release(entity);
            if let Some(building) = occupied {
                if let Ok(mut b) = self.world.get::<&mut Building>(building) {
                    b.occupancy = b.occupancy.saturating_sub(1);
                }
            }
            let _ = self.world.despawn(entity);
        }
    }
}
