//! The behavior scheduler — per-actor intent evaluation plus the state
//! dispatch that carries each behavior out.
//!
//! Actors are processed strictly sequentially within a tick, so every
//! reservation or occupancy claim an earlier actor makes is visible to
//! later ones. Each actor's update is: snapshot readings → score
//! candidate intents → maybe preempt the current state → run the
//! current state's handler. All state exits funnel through one
//! transition routine that releases reservations, occupancy slots and
//! the cached route.

use crate::components::{
    BehaviorRuntime, BehaviorState, Building, BuildingKind, Colonist, Medic, Position,
    ResourceKind, ResourceNode, Task, TaskKind, Vitals, Weapon, WorldConfig,
};
use crate::reservations::ReservationLedger;
use crate::systems::combat::TacticalEngine;
use crate::systems::movement::{clear_route, move_toward};
use hecs::{Entity, World};
use outpost_logic::constants::{needs as vitals_consts, timeouts};
use outpost_logic::geometry::Vec2;
use outpost_logic::intent::{pick_best, should_switch, IntentInput, IntentKind};
use outpost_logic::needs::{needs_medical, treatment_complete};
use rand::Rng;

/// Resource damage per second of work at full capability.
const WORK_RATE: f32 = 10.0;
/// Food units gained from one harvested crop.
const HARVEST_FOOD_YIELD: u32 = 2;
/// How close an actor must be to operate on a target.
const INTERACT_MARGIN: f32 = 6.0;
/// Reach of a medic treating a patient.
const HEAL_RANGE: f32 = 24.0;
/// Radius around the heal target within which extra patients enable
/// multi-patient treatment.
const MULTI_HEAL_RADIUS: f32 = 48.0;
/// Idle actors wander within this box around the home base.
const WANDER_SPREAD: f32 = 96.0;

/// Shared mutable context for one scheduler pass.
pub struct SchedulerCtx<'a> {
    pub ledger: &'a mut ReservationLedger,
    pub tactical: &'a mut TacticalEngine,
    pub config: &'a WorldConfig,
    /// Colony food stock, consumed by eating and fed by harvesting.
    pub food: &'a mut u32,
    pub now: f64,
    pub night: bool,
    pub dt: f32,
}

/// Run one scheduler pass over every living colonist.
pub fn scheduler_system(world: &mut World, ctx: &mut SchedulerCtx) {
    let actors: Vec<Entity> = world
        .query::<(&Colonist, &BehaviorRuntime)>()
        .iter()
        .map(|(e, _)| e)
        .collect();

    for actor in actors {
        advance_actor(world, ctx, actor);
    }
}

fn advance_actor(world: &mut World, ctx: &mut SchedulerCtx, actor: Entity) {
    let Some((pos, vitals)) = read_actor(world, actor) else {
        return;
    };
    if !vitals.alive() {
        return;
    }

    // Incapacitated actors cannot act; they lie where they are until a
    // medic or the healing aura brings them back.
    let incapacitated = world
        .get::<&outpost_logic::capacity::Capacities>(actor)
        .map(|c| c.is_incapacitated())
        .unwrap_or(false);
    if incapacitated {
        return;
    }

    let Ok(mut runtime) = world.get::<&BehaviorRuntime>(actor).map(|r| (*r).clone()) else {
        return;
    };

    // Danger first: the reading feeds both intent scoring and the flee
    // handler, and updates the remembered threat for the hysteresis.
    let danger = ctx
        .tactical
        .danger_state(world, pos, runtime.active_threat);
    runtime.active_threat = danger.threat.filter(|_| danger.in_danger);
    if let Some(threat) = runtime.active_threat {
        if let Ok(threat_pos) = world.get::<&Position>(threat) {
            runtime.remember_danger(threat_pos.pos, danger.distance, ctx.now);
        }
    }

    let input = IntentInput {
        in_danger: danger.in_danger,
        hp: vitals.hp,
        hunger: vitals.hunger,
        fatigue: vitals.fatigue,
        night: ctx.night,
        food_available: *ctx.food > 0,
        under_treatment: matches!(
            runtime.state,
            BehaviorState::SeekMedical | BehaviorState::Medical | BehaviorState::MedicalMultiple
        ) || (runtime.state == BehaviorState::Resting && needs_medical(vitals.hp)),
        is_medic: world.get::<&Medic>(actor).is_ok(),
        patient_available: patient_near(world, actor).is_some(),
    };

    let best = pick_best(&input);
    if should_switch(
        runtime.state.intent_kind(),
        runtime.state_since,
        runtime.soft_lock_remaining(ctx.now),
        &best,
        ctx.night,
    ) {
        let next = state_for_intent(best.kind);
        switch_to(world, ctx, actor, &mut runtime, next);
    }

    runtime.state_since += ctx.dt;

    match runtime.state {
        BehaviorState::SeekTask => seek_task(world, ctx, actor, &mut runtime),
        BehaviorState::Idle => idle(world, ctx, actor, &mut runtime),
        BehaviorState::MoveTo { dest } => move_to(world, ctx, actor, &mut runtime, dest),
        BehaviorState::Resting => resting(world, ctx, actor, &mut runtime, &vitals),
        BehaviorState::Build
        | BehaviorState::Chop
        | BehaviorState::Mine
        | BehaviorState::Harvest => work(world, ctx, actor, &mut runtime, pos),
        BehaviorState::Eat => eat(world, ctx, actor, &mut runtime, pos),
        BehaviorState::GoToSleep => go_to_sleep(world, ctx, actor, &mut runtime, pos),
        BehaviorState::Sleep => sleep(world, ctx, actor, &mut runtime, &vitals),
        BehaviorState::SeekMedical => seek_medical(world, ctx, actor, &mut runtime, pos),
        BehaviorState::Medical => medical(world, ctx, actor, &mut runtime, &vitals),
        BehaviorState::Heal | BehaviorState::MedicalMultiple => {
            heal(world, ctx, actor, &mut runtime, pos)
        }
        BehaviorState::Flee => flee(world, ctx, actor, &mut runtime, pos, &danger),
    }

    if let Ok(mut slot) = world.get::<&mut BehaviorRuntime>(actor) {
        *slot = runtime;
    }
}

fn read_actor(world: &World, actor: Entity) -> Option<(Vec2, Vitals)> {
    let pos = world.get::<&Position>(actor).ok()?.pos;
    let vitals = *world.get::<&Vitals>(actor).ok()?;
    Some((pos, vitals))
}

/// The behavior state entered when an intent wins the scoring pass.
/// Handler-internal transitions (go-to-sleep → sleep, seek-medical →
/// medical) never come through here.
fn state_for_intent(kind: IntentKind) -> BehaviorState {
    match kind {
        IntentKind::Flee => BehaviorState::Flee,
        IntentKind::SeekMedical => BehaviorState::SeekMedical,
        IntentKind::Medical => BehaviorState::Medical,
        IntentKind::MedicalMultiple => BehaviorState::MedicalMultiple,
        IntentKind::Heal => BehaviorState::Heal,
        IntentKind::Sleep => BehaviorState::Sleep,
        IntentKind::GoToSleep => BehaviorState::GoToSleep,
        IntentKind::Eat => BehaviorState::Eat,
        IntentKind::Build => BehaviorState::Build,
        IntentKind::Chop => BehaviorState::Chop,
        IntentKind::Mine => BehaviorState::Mine,
        IntentKind::Harvest => BehaviorState::Harvest,
        IntentKind::Resting => BehaviorState::Resting,
        IntentKind::MoveTo => BehaviorState::Idle,
        IntentKind::Idle => BehaviorState::Idle,
        IntentKind::SeekTask => BehaviorState::SeekTask,
    }
}

/// The single transition routine. Work reservations, occupancy slots
/// and the cached route are all released here so no exit path can leak
/// them.
fn switch_to(
    world: &mut World,
    ctx: &mut SchedulerCtx,
    actor: Entity,
    runtime: &mut BehaviorRuntime,
    next: BehaviorState,
) {
    if runtime.state.intent_kind().is_work() {
        ctx.ledger.release(actor);
        runtime.task = None;
    }
    if let Some(occupied) = runtime.occupying.take() {
        if let Ok(mut building) = world.get::<&mut Building>(occupied) {
            building.occupancy = building.occupancy.saturating_sub(1);
        }
    }
    clear_route(world, actor);

    log::debug!(
        "actor {:?}: {:?} -> {:?}",
        actor,
        runtime.state.intent_kind(),
        next.intent_kind()
    );
    runtime.enter_state(next, ctx.now);
}

/// Whether anyone near enough needs a medic. Patients already inside a
/// medical building don't count.
fn patient_near(world: &World, medic: Entity) -> Option<Entity> {
    let medic_pos = world.get::<&Position>(medic).ok()?.pos;
    let mut best: Option<(Entity, f32)> = None;
    for (entity, (_, pos, vitals, runtime)) in world
        .query::<(&Colonist, &Position, &Vitals, &BehaviorRuntime)>()
        .iter()
    {
        if entity == medic || !vitals.alive() || !needs_medical(vitals.hp) {
            continue;
        }
        if matches!(
            runtime.state,
            BehaviorState::Medical | BehaviorState::MedicalMultiple
        ) {
            continue;
        }
        let distance = pos.pos.distance(&medic_pos);
        if best.map(|(_, d)| distance < d).unwrap_or(true) {
            best = Some((entity, distance));
        }
    }
    best.map(|(e, _)| e)
}

// ---------------------------------------------------------------------
// State handlers
// ---------------------------------------------------------------------

fn seek_task(world: &mut World, ctx: &mut SchedulerCtx, actor: Entity, runtime: &mut BehaviorRuntime) {
    let Some(actor_pos) = world.get::<&Position>(actor).ok().map(|p| p.pos) else {
        return;
    };

    // Build sites first, then the nearest unreserved resource node.
    let mut candidate: Option<(Entity, TaskKind, f32)> = None;
    for (entity, (building, pos)) in world.query::<(&Building, &Position)>().iter() {
        if building.built || ctx.ledger.is_reserved(entity) {
            continue;
        }
        let distance = pos.pos.distance(&actor_pos);
        if candidate.map(|(_, _, d)| distance < d).unwrap_or(true) {
            candidate = Some((entity, TaskKind::Build, distance));
        }
    }
    if candidate.is_none() {
        for (entity, (node, pos)) in world.query::<(&ResourceNode, &Position)>().iter() {
            if node.depleted() || ctx.ledger.is_reserved(entity) {
                continue;
            }
            let kind = match node.kind {
                ResourceKind::Tree => TaskKind::Chop,
                ResourceKind::Rock => TaskKind::Mine,
                ResourceKind::Crop => TaskKind::Harvest,
            };
            let distance = pos.pos.distance(&actor_pos);
            if candidate.map(|(_, _, d)| distance < d).unwrap_or(true) {
                candidate = Some((entity, kind, distance));
            }
        }
    }

    match candidate {
        Some((target, kind, _)) if ctx.ledger.reserve(target, actor) => {
            switch_to(world, ctx, actor, runtime, kind.state());
            runtime.task = Some(Task { kind, target });
        }
        _ => switch_to(world, ctx, actor, runtime, BehaviorState::Idle),
    }
}

fn idle(world: &mut World, ctx: &mut SchedulerCtx, actor: Entity, runtime: &mut BehaviorRuntime) {
    runtime.progress += ctx.dt;
    if runtime.progress < 2.0 {
        return;
    }
    runtime.progress = 0.0;

    let mut rng = rand::thread_rng();
    if rng.gen_bool(0.5) {
        let dest = ctx.config.home_base
            + Vec2::new(
                rng.gen_range(-WANDER_SPREAD..WANDER_SPREAD),
                rng.gen_range(-WANDER_SPREAD..WANDER_SPREAD),
            );
        let dest = ctx.config.bounds().clamp(dest);
        switch_to(world, ctx, actor, runtime, BehaviorState::MoveTo { dest });
    } else {
        // Re-check for work instead of wandering.
        switch_to(world, ctx, actor, runtime, BehaviorState::SeekTask);
    }
}

fn move_to(
    world: &mut World,
    ctx: &mut SchedulerCtx,
    actor: Entity,
    runtime: &mut BehaviorRuntime,
    dest: Vec2,
) {
    if move_toward(world, actor, ctx.dt, dest, INTERACT_MARGIN) {
        switch_to(world, ctx, actor, runtime, BehaviorState::Idle);
    }
}

fn resting(
    world: &mut World,
    ctx: &mut SchedulerCtx,
    actor: Entity,
    runtime: &mut BehaviorRuntime,
    vitals: &Vitals,
) {
    // Rest until reasonably recovered; the needs system does the actual
    // fatigue and hp arithmetic.
    if vitals.fatigue <= 30.0 && !needs_medical(vitals.hp) {
        switch_to(world, ctx, actor, runtime, BehaviorState::SeekTask);
    }
}

fn work(
    world: &mut World,
    ctx: &mut SchedulerCtx,
    actor: Entity,
    runtime: &mut BehaviorRuntime,
    actor_pos: Vec2,
) {
    let Some(task) = runtime.task else {
        switch_to(world, ctx, actor, runtime, BehaviorState::SeekTask);
        return;
    };

    let timeout = match task.kind {
        TaskKind::Build => timeouts::BUILD,
        TaskKind::Chop => timeouts::CHOP,
        TaskKind::Mine => timeouts::MINE,
        TaskKind::Harvest => timeouts::HARVEST,
    };
    if runtime.state_since > timeout {
        log::debug!("actor {:?}: {:?} timed out, reassigning", actor, task.kind);
        switch_to(world, ctx, actor, runtime, BehaviorState::SeekTask);
        return;
    }

    let Some((target_pos, target_radius)) = target_location(world, task.target) else {
        switch_to(world, ctx, actor, runtime, BehaviorState::SeekTask);
        return;
    };

    let reach = target_radius + INTERACT_MARGIN;
    if actor_pos.distance(&target_pos) > reach {
        move_toward(world, actor, ctx.dt, target_pos, reach);
        return;
    }

    let scalar = work_scalar(world, actor);
    let effort = WORK_RATE * scalar * ctx.dt;

    match task.kind {
        TaskKind::Build => {
            let done = {
                let Ok(mut building) = world.get::<&mut Building>(task.target) else {
                    switch_to(world, ctx, actor, runtime, BehaviorState::SeekTask);
                    return;
                };
                building.build_remaining -= scalar * ctx.dt;
                if building.build_remaining <= 0.0 {
                    building.build_remaining = 0.0;
                    building.built = true;
                    true
                } else {
                    false
                }
            };
            if done {
                log::debug!("actor {:?}: construction finished", actor);
                switch_to(world, ctx, actor, runtime, BehaviorState::SeekTask);
            }
        }
        TaskKind::Chop | TaskKind::Mine | TaskKind::Harvest => {
            let depleted = {
                let Ok(mut node) = world.get::<&mut ResourceNode>(task.target) else {
                    switch_to(world, ctx, actor, runtime, BehaviorState::SeekTask);
                    return;
                };
                node.hp -= effort;
                node.depleted()
            };
            if depleted {
                if task.kind == TaskKind::Harvest {
                    *ctx.food += HARVEST_FOOD_YIELD;
                }
                switch_to(world, ctx, actor, runtime, BehaviorState::SeekTask);
                let _ = world.despawn(task.target);
            }
        }
    }
}

fn work_scalar(world: &World, actor: Entity) -> f32 {
    world
        .get::<&outpost_logic::capacity::Capacities>(actor)
        .map(|c| outpost_logic::capacity::work_speed_scalar(&c))
        .unwrap_or(1.0)
}

fn target_location(world: &World, target: Entity) -> Option<(Vec2, f32)> {
    let pos = world.get::<&Position>(target).ok()?.pos;
    let radius = world
        .get::<&Building>(target)
        .map(|b| b.radius)
        .or_else(|_| world.get::<&crate::components::Obstacle>(target).map(|o| o.radius))
        .unwrap_or(8.0);
    Some((pos, radius))
}

fn eat(
    world: &mut World,
    ctx: &mut SchedulerCtx,
    actor: Entity,
    runtime: &mut BehaviorRuntime,
    actor_pos: Vec2,
) {
    if *ctx.food == 0 {
        switch_to(world, ctx, actor, runtime, BehaviorState::SeekTask);
        return;
    }

    let table = nearest_building(world, actor_pos, BuildingKind::Storage, false)
        .map(|(_, pos, radius)| (pos, radius))
        .unwrap_or((ctx.config.home_base, 24.0));

    if actor_pos.distance(&table.0) > table.1 + INTERACT_MARGIN {
        move_toward(world, actor, ctx.dt, table.0, table.1 + INTERACT_MARGIN);
        return;
    }

    runtime.progress += ctx.dt;
    if runtime.progress >= vitals_consts::EAT_DURATION {
        if let Ok(mut vitals) = world.get::<&mut Vitals>(actor) {
            vitals.hunger = (vitals.hunger - vitals_consts::MEAL_VALUE).max(0.0);
        }
        *ctx.food = ctx.food.saturating_sub(1);
        switch_to(world, ctx, actor, runtime, BehaviorState::SeekTask);
    }
}

fn go_to_sleep(
    world: &mut World,
    ctx: &mut SchedulerCtx,
    actor: Entity,
    runtime: &mut BehaviorRuntime,
    actor_pos: Vec2,
) {
    if runtime.state_since > timeouts::SLEEP_SEARCH {
        // No bed reachable; rest on the ground instead.
        switch_to(world, ctx, actor, runtime, BehaviorState::Resting);
        return;
    }

    // The bed choice is sticky for a few seconds so two equidistant
    // beds don't cause flip-flopping mid-walk.
    let chosen = runtime
        .chosen_bed
        .filter(|&bed| ctx.now < runtime.bed_locked_until && bed_free(world, bed, actor));
    let bed = match chosen {
        Some(bed) => Some(bed),
        None => {
            let found = nearest_building(world, actor_pos, BuildingKind::Bed, true).map(|(e, _, _)| e);
            runtime.chosen_bed = found;
            runtime.bed_locked_until = ctx.now + timeouts::BED_CHOICE_MEMORY as f64;
            found
        }
    };

    let Some(bed) = bed else {
        return; // keep searching until the timeout fires
    };
    let Some((bed_pos, radius)) = target_location(world, bed) else {
        runtime.chosen_bed = None;
        return;
    };

    if move_toward(world, actor, ctx.dt, bed_pos, radius) {
        let claimed = world
            .get::<&mut Building>(bed)
            .map(|mut b| {
                if b.has_free_capacity() {
                    b.occupancy += 1;
                    true
                } else {
                    false
                }
            })
            .unwrap_or(false);
        if claimed {
            switch_to(world, ctx, actor, runtime, BehaviorState::Sleep);
            runtime.occupying = Some(bed);
        } else {
            // Someone took it during the walk; pick again next tick.
            runtime.chosen_bed = None;
        }
    }
}

fn bed_free(world: &World, bed: Entity, _actor: Entity) -> bool {
    world
        .get::<&Building>(bed)
        .map(|b| b.has_free_capacity())
        .unwrap_or(false)
}

fn sleep(
    world: &mut World,
    ctx: &mut SchedulerCtx,
    actor: Entity,
    runtime: &mut BehaviorRuntime,
    vitals: &Vitals,
) {
    if vitals.fatigue <= vitals_consts::WAKE_FATIGUE {
        runtime.chosen_bed = None;
        switch_to(world, ctx, actor, runtime, BehaviorState::SeekTask);
    }
}

fn seek_medical(
    world: &mut World,
    ctx: &mut SchedulerCtx,
    actor: Entity,
    runtime: &mut BehaviorRuntime,
    actor_pos: Vec2,
) {
    if runtime.state_since > timeouts::SEEK_MEDICAL {
        switch_to(world, ctx, actor, runtime, BehaviorState::Resting);
        return;
    }

    let Some((clinic, clinic_pos, radius)) =
        nearest_building(world, actor_pos, BuildingKind::Medical, true)
    else {
        // No clinic at all: resting still benefits from passive regen.
        switch_to(world, ctx, actor, runtime, BehaviorState::Resting);
        return;
    };

    if move_toward(world, actor, ctx.dt, clinic_pos, radius) {
        let claimed = world
            .get::<&mut Building>(clinic)
            .map(|mut b| {
                if b.has_free_capacity() {
                    b.occupancy += 1;
                    true
                } else {
                    false
                }
            })
            .unwrap_or(false);
        if claimed {
            switch_to(world, ctx, actor, runtime, BehaviorState::Medical);
            runtime.occupying = Some(clinic);
        }
        // Full clinic: wait in place inside the aura.
    }
}

fn medical(
    world: &mut World,
    ctx: &mut SchedulerCtx,
    actor: Entity,
    runtime: &mut BehaviorRuntime,
    vitals: &Vitals,
) {
    // The healing aura in the needs system does the hp arithmetic.
    if treatment_complete(vitals.hp) {
        switch_to(world, ctx, actor, runtime, BehaviorState::SeekTask);
    }
}

fn heal(
    world: &mut World,
    ctx: &mut SchedulerCtx,
    actor: Entity,
    runtime: &mut BehaviorRuntime,
    actor_pos: Vec2,
) {
    if runtime.state_since > timeouts::HEAL {
        switch_to(world, ctx, actor, runtime, BehaviorState::SeekTask);
        return;
    }

    let Some(patient) = patient_near(world, actor) else {
        switch_to(world, ctx, actor, runtime, BehaviorState::SeekTask);
        return;
    };
    let Some(patient_pos) = world.get::<&Position>(patient).ok().map(|p| p.pos) else {
        return;
    };

    if actor_pos.distance(&patient_pos) > HEAL_RANGE {
        move_toward(world, actor, ctx.dt, patient_pos, HEAL_RANGE);
        return;
    }

    // Several wounded in reach: treat them all at a reduced per-patient
    // rate instead of queueing them.
    let nearby = wounded_within(world, actor, actor_pos, MULTI_HEAL_RADIUS);
    if nearby.len() >= 2 {
        if runtime.state != BehaviorState::MedicalMultiple {
            switch_to(world, ctx, actor, runtime, BehaviorState::MedicalMultiple);
        }
        let rate = vitals_consts::HEAL_RATE * vitals_consts::HEAL_MULTI_FACTOR;
        for entity in nearby {
            if let Ok(mut v) = world.get::<&mut Vitals>(entity) {
                v.hp = (v.hp + rate * ctx.dt).min(100.0);
            }
        }
    } else {
        if runtime.state == BehaviorState::MedicalMultiple {
            switch_to(world, ctx, actor, runtime, BehaviorState::Heal);
        }
        if let Ok(mut v) = world.get::<&mut Vitals>(patient) {
            v.hp = (v.hp + vitals_consts::HEAL_RATE * ctx.dt).min(100.0);
        }
    }
}

/// Wounded colonists (excluding the medic) within `radius`.
fn wounded_within(world: &World, medic: Entity, center: Vec2, radius: f32) -> Vec<Entity> {
    let radius_sq = radius * radius;
    world
        .query::<(&Colonist, &Position, &Vitals)>()
        .iter()
        .filter(|(entity, (_, pos, vitals))| {
            *entity != medic
                && vitals.alive()
                && needs_medical(vitals.hp)
                && pos.pos.distance_squared(&center) <= radius_sq
        })
        .map(|(entity, _)| entity)
        .collect()
}

fn flee(
    world: &mut World,
    ctx: &mut SchedulerCtx,
    actor: Entity,
    runtime: &mut BehaviorRuntime,
    actor_pos: Vec2,
    danger: &crate::systems::combat::DangerState,
) {
    let Some(threat) = danger.threat.filter(|_| danger.in_danger) else {
        // Hysteresis released us; the threat is dead or far enough.
        runtime.active_threat = None;
        switch_to(world, ctx, actor, runtime, BehaviorState::SeekTask);
        return;
    };

    let Some(threat_pos) = world.get::<&Position>(threat).ok().map(|p| p.pos) else {
        runtime.active_threat = None;
        switch_to(world, ctx, actor, runtime, BehaviorState::SeekTask);
        return;
    };

    let dest = if ctx.tactical.should_take_cover(world, actor_pos, threat) {
        ctx.tactical
            .find_cover_position(world, actor, actor_pos, threat_pos, ctx.now)
            .map(|spot| spot.pos)
            .unwrap_or_else(|| {
                ctx.tactical
                    .find_retreat_position(world, actor_pos, ctx.config.home_base)
            })
    } else {
        ctx.tactical
            .find_retreat_position(world, actor_pos, ctx.config.home_base)
    };

    let arrived = move_toward(world, actor, ctx.dt, dest, INTERACT_MARGIN);

    // Armed colonists fight back once they stop running.
    if arrived {
        if let Some(target) = ctx.tactical.best_target(world, actor_pos, weapon_range(world, actor))
        {
            attack(world, actor, target, ctx.dt);
        }
    }
}

fn weapon_range(world: &World, actor: Entity) -> f32 {
    world.get::<&Weapon>(actor).map(|w| w.range).unwrap_or(0.0)
}

/// Apply one attack tick if the weapon is off cooldown.
pub fn attack(world: &mut World, attacker: Entity, target: Entity, dt: f32) {
    let damage = {
        let Ok(mut weapon) = world.get::<&mut Weapon>(attacker) else {
            return;
        };
        weapon.cooldown_remaining -= dt;
        if weapon.cooldown_remaining > 0.0 {
            return;
        }
        weapon.cooldown_remaining = weapon.cooldown;
        weapon.damage
    };
    if let Ok(mut vitals) = world.get::<&mut Vitals>(target) {
        vitals.apply_damage(damage);
    }
}

/// Nearest building of `kind`, optionally only ones with a free slot.
fn nearest_building(
    world: &World,
    from: Vec2,
    kind: BuildingKind,
    needs_capacity: bool,
) -> Option<(Entity, Vec2, f32)> {
    let mut best: Option<(Entity, Vec2, f32, f32)> = None;
    for (entity, (building, pos)) in world.query::<(&Building, &Position)>().iter() {
        if building.kind != kind || !building.built {
            continue;
        }
        if needs_capacity && !building.has_free_capacity() {
            continue;
        }
        let distance = pos.pos.distance(&from);
        if best.map(|(_, _, _, d)| distance < d).unwrap_or(true) {
            best = Some((entity, pos.pos, building.radius, distance));
        }
    }
    best.map(|(e, p, r, _)| (e, p, r))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{Mobility, Route};
    use outpost_logic::capacity::Capacities;
    use outpost_logic::needs::Temperament;

    struct Fixture {
        world: World,
        ledger: ReservationLedger,
        tactical: TacticalEngine,
        config: WorldConfig,
        food: u32,
        now: f64,
        night: bool,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                world: World::new(),
                ledger: ReservationLedger::new(),
                tactical: TacticalEngine::new(),
                config: WorldConfig::default(),
                food: 10,
                now: 0.0,
                night: false,
            }
        }

        fn spawn_colonist(&mut self, x: f32, y: f32) -> Entity {
            self.world.spawn((
                Colonist,
                Position::new(x, y),
                Vitals::default(),
                Mobility::default(),
                Capacities::default(),
                Temperament::default(),
                BehaviorRuntime::default(),
            ))
        }

        fn tick(&mut self, dt: f32) {
            let mut ctx = SchedulerCtx {
                ledger: &mut self.ledger,
                tactical: &mut self.tactical,
                config: &self.config,
                food: &mut self.food,
                now: self.now,
                night: self.night,
                dt,
            };
            scheduler_system(&mut self.world, &mut ctx);
            self.now += dt as f64;
        }

        fn run(&mut self, secs: f32) {
            let mut t = 0.0;
            while t < secs {
                self.tick(0.1);
                t += 0.1;
            }
        }

        fn state(&self, actor: Entity) -> BehaviorState {
            self.world.get::<&BehaviorRuntime>(actor).unwrap().state
        }
    }

    #[test]
    fn test_seek_task_claims_nearest_node() {
        let mut fx = Fixture::new();
        let colonist = fx.spawn_colonist(100.0, 100.0);
        let near = fx
            .world
            .spawn((ResourceNode::new(ResourceKind::Tree), Position::new(150.0, 100.0)));
        fx.world
            .spawn((ResourceNode::new(ResourceKind::Tree), Position::new(900.0, 100.0)));

        fx.tick(0.1);

        assert_eq!(fx.state(colonist), BehaviorState::Chop);
        assert_eq!(fx.ledger.holder(near), Some(colonist));
    }

    #[test]
    fn test_two_colonists_never_share_a_target() {
        let mut fx = Fixture::new();
        let a = fx.spawn_colonist(100.0, 100.0);
        let b = fx.spawn_colonist(102.0, 100.0);
        fx.world
            .spawn((ResourceNode::new(ResourceKind::Tree), Position::new(150.0, 100.0)));
        fx.world
            .spawn((ResourceNode::new(ResourceKind::Rock), Position::new(160.0, 100.0)));

        fx.tick(0.1);

        let ta = fx.ledger.held_by(a);
        let tb = fx.ledger.held_by(b);
        assert!(ta.is_some());
        assert!(tb.is_some());
        assert_ne!(ta, tb);
    }

    #[test]
    fn test_chop_depletes_and_releases() {
        let mut fx = Fixture::new();
        fx.spawn_colonist(140.0, 100.0);
        let tree = fx
            .world
            .spawn((ResourceNode::new(ResourceKind::Tree), Position::new(150.0, 100.0)));

        // Tree has 30 hp at ~10/s: a few seconds of work.
        fx.run(6.0);

        assert!(!fx.world.contains(tree));
        assert!(fx.ledger.is_empty());
    }

    #[test]
    fn test_harvest_adds_food() {
        let mut fx = Fixture::new();
        fx.food = 0;
        fx.spawn_colonist(140.0, 100.0);
        fx.world
            .spawn((ResourceNode::new(ResourceKind::Crop), Position::new(150.0, 100.0)));

        fx.run(4.0);

        assert_eq!(fx.food, HARVEST_FOOD_YIELD);
    }

    #[test]
    fn test_build_completes_site() {
        let mut fx = Fixture::new();
        fx.spawn_colonist(140.0, 100.0);
        let site = fx.world.spawn((
            Building::under_construction(BuildingKind::Bed, 2.0),
            Position::new(150.0, 100.0),
        ));

        fx.run(5.0);

        let building = fx.world.get::<&Building>(site).unwrap();
        assert!(building.built);
    }

    #[test]
    fn test_hungry_colonist_eats() {
        let mut fx = Fixture::new();
        let colonist = fx.spawn_colonist(790.0, 600.0);
        fx.world
            .spawn((Building::new(BuildingKind::Storage), Position::new(800.0, 600.0)));
        fx.world
            .get::<&mut Vitals>(colonist)
            .unwrap()
            .hunger = 80.0;

        fx.run(3.0);

        let vitals = fx.world.get::<&Vitals>(colonist).unwrap();
        assert!(vitals.hunger < 25.0);
        assert_eq!(fx.food, 9);
    }

    #[test]
    fn test_no_food_means_no_eat() {
        let mut fx = Fixture::new();
        fx.food = 0;
        let colonist = fx.spawn_colonist(790.0, 600.0);
        fx.world
            .get::<&mut Vitals>(colonist)
            .unwrap()
            .hunger = 80.0;

        fx.tick(0.1);

        assert_ne!(fx.state(colonist), BehaviorState::Eat);
    }

    #[test]
    fn test_tired_colonist_claims_bed_and_sleeps() {
        let mut fx = Fixture::new();
        let colonist = fx.spawn_colonist(790.0, 600.0);
        let bed = fx
            .world
            .spawn((Building::new(BuildingKind::Bed), Position::new(800.0, 600.0)));
        fx.world.get::<&mut Vitals>(colonist).unwrap().fatigue = 90.0;

        fx.run(3.0);

        assert_eq!(fx.state(colonist), BehaviorState::Sleep);
        assert_eq!(fx.world.get::<&Building>(bed).unwrap().occupancy, 1);
    }

    #[test]
    fn test_full_bed_not_double_claimed() {
        let mut fx = Fixture::new();
        let a = fx.spawn_colonist(790.0, 600.0);
        let b = fx.spawn_colonist(792.0, 600.0);
        let bed = fx
            .world
            .spawn((Building::new(BuildingKind::Bed), Position::new(800.0, 600.0)));
        for e in [a, b] {
            fx.world.get::<&mut Vitals>(e).unwrap().fatigue = 90.0;
        }

        fx.run(5.0);

        assert_eq!(fx.world.get::<&Building>(bed).unwrap().occupancy, 1);
        let sleeping = [a, b]
            .iter()
            .filter(|&&e| fx.state(e) == BehaviorState::Sleep)
            .count();
        assert_eq!(sleeping, 1);
    }

    #[test]
    fn test_wounded_seeks_medical_and_recovers() {
        let mut fx = Fixture::new();
        // Spawned well outside the clinic radius so the travel phase is
        // observable before treatment starts.
        let colonist = fx.spawn_colonist(600.0, 600.0);
        let clinic = fx
            .world
            .spawn((Building::new(BuildingKind::Medical), Position::new(800.0, 600.0)));
        fx.world.get::<&mut Vitals>(colonist).unwrap().hp = 30.0;

        fx.tick(0.1);
        assert_eq!(fx.state(colonist), BehaviorState::SeekMedical);

        fx.run(6.0);
        assert_eq!(fx.state(colonist), BehaviorState::Medical);
        assert_eq!(fx.world.get::<&Building>(clinic).unwrap().occupancy, 1);
    }

    #[test]
    fn test_medic_heals_patient() {
        let mut fx = Fixture::new();
        let medic = fx.spawn_colonist(100.0, 100.0);
        fx.world.insert_one(medic, Medic).unwrap();
        let patient = fx.spawn_colonist(140.0, 100.0);
        fx.world.get::<&mut Vitals>(patient).unwrap().hp = 30.0;

        fx.run(1.0);
        assert_eq!(fx.state(medic), BehaviorState::Heal);

        fx.run(8.0);
        let hp = fx.world.get::<&Vitals>(patient).unwrap().hp;
        assert!(hp > 30.0);
    }

    #[test]
    fn test_flee_preempts_work_and_releases_reservation() {
        let mut fx = Fixture::new();
        let colonist = fx.spawn_colonist(140.0, 100.0);
        let tree = fx
            .world
            .spawn((ResourceNode::new(ResourceKind::Tree), Position::new(150.0, 100.0)));

        fx.tick(0.1);
        assert_eq!(fx.state(colonist), BehaviorState::Chop);

        // A hostile appears inside the danger enter radius.
        fx.world.spawn((
            Hostile,
            Position::new(200.0, 100.0),
            Vitals::default(),
            Weapon::new(120.0, 5.0, 1.0),
        ));
        fx.tick(0.1);

        assert_eq!(fx.state(colonist), BehaviorState::Flee);
        assert!(!fx.ledger.is_reserved(tree));
    }

    #[test]
    fn test_flee_holds_inside_hysteresis_band() {
        let mut fx = Fixture::new();
        let colonist = fx.spawn_colonist(100.0, 100.0);
        let hostile = fx.world.spawn((
            Hostile,
            Position::new(200.0, 100.0),
            Vitals::default(),
        ));

        fx.tick(0.1);
        assert_eq!(fx.state(colonist), BehaviorState::Flee);

        // Move the threat into the band between enter and exit radii;
        // the actor keeps fleeing.
        let actor_pos = fx.world.get::<&Position>(colonist).unwrap().pos;
        fx.world.get::<&mut Position>(hostile).unwrap().pos =
            actor_pos + Vec2::new(160.0, 0.0);
        fx.tick(0.1);
        assert_eq!(fx.state(colonist), BehaviorState::Flee);

        // Past the exit radius it stops.
        let actor_pos = fx.world.get::<&Position>(colonist).unwrap().pos;
        fx.world.get::<&mut Position>(hostile).unwrap().pos =
            actor_pos + Vec2::new(500.0, 0.0);
        fx.tick(0.1);
        assert_ne!(fx.state(colonist), BehaviorState::Flee);
    }

    #[test]
    fn test_preempted_sleeper_frees_bed() {
        let mut fx = Fixture::new();
        let colonist = fx.spawn_colonist(790.0, 600.0);
        let bed = fx
            .world
            .spawn((Building::new(BuildingKind::Bed), Position::new(800.0, 600.0)));
        fx.world.get::<&mut Vitals>(colonist).unwrap().fatigue = 90.0;

        fx.run(3.0);
        assert_eq!(fx.state(colonist), BehaviorState::Sleep);

        // Danger preempts sleep and the bed slot is released.
        let actor_pos = fx.world.get::<&Position>(colonist).unwrap().pos;
        fx.world.spawn((
            Hostile,
            Position::new(actor_pos.x + 100.0, actor_pos.y),
            Vitals::default(),
        ));
        fx.tick(0.1);

        assert_eq!(fx.state(colonist), BehaviorState::Flee);
        assert_eq!(fx.world.get::<&Building>(bed).unwrap().occupancy, 0);
    }

    #[test]
    fn test_eat_soft_lock_resists_task_pressure() {
        let mut fx = Fixture::new();
        let colonist = fx.spawn_colonist(790.0, 600.0);
        fx.world
            .spawn((Building::new(BuildingKind::Storage), Position::new(800.0, 600.0)));
        fx.world.get::<&mut Vitals>(colonist).unwrap().hunger = 80.0;

        fx.run(1.0);
        assert_eq!(fx.state(colonist), BehaviorState::Eat);

        // Work appearing nearby must not interrupt the meal.
        fx.world
            .spawn((ResourceNode::new(ResourceKind::Tree), Position::new(820.0, 600.0)));
        fx.tick(0.1);
        assert_eq!(fx.state(colonist), BehaviorState::Eat);
    }

    use crate::components::Hostile;

    #[test]
    fn test_idle_when_nothing_to_do() {
        let mut fx = Fixture::new();
        let colonist = fx.spawn_colonist(800.0, 600.0);

        fx.tick(0.1);

        assert_eq!(fx.state(colonist), BehaviorState::Idle);
        assert!(fx.world.get::<&Route>(colonist).is_err());
    }
}
