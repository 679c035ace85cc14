//! Outpost Headless Simulation Harness
//!
//! Validates the behavior logic and runs full engine soaks without any
//! rendering — entirely in-process.
//!
//! Usage:
//!   cargo run -p outpost-simtest
//!   cargo run -p outpost-simtest -- --verbose

use outpost_core::components::{
    BehaviorRuntime, BehaviorState, Building, BuildingKind, ResourceKind, Vitals, Weapon,
    WorldConfig,
};
use outpost_core::Engine;
use outpost_logic::constants::{cover as cover_consts, danger, priorities};
use outpost_logic::cover::{effective_cover, position_score, stack_cover};
use outpost_logic::geometry::Vec2;
use outpost_logic::intent::{pick_best, should_switch, IntentInput, IntentKind, ScoredIntent};
use outpost_logic::needs::{step_vitals, ActivityClass, Temperament};
use outpost_logic::rescue::probe_offsets;
use outpost_logic::threat::{best_target, ThreatProfile};
use serde::Deserialize;

// ── Scenario manifest ───────────────────────────────────────────────────
const SCENARIO_JSON: &str = include_str!("../../../data/scenarios.json");

#[derive(Debug, Deserialize)]
struct Scenario {
    name: String,
    food: u32,
    colonists: Vec<SpawnPoint>,
    medics: Vec<SpawnPoint>,
    hostiles: Vec<HostileSpec>,
    buildings: Vec<BuildingSpec>,
    resources: Vec<ResourceSpec>,
}

#[derive(Debug, Deserialize)]
struct SpawnPoint {
    x: f32,
    y: f32,
}

#[derive(Debug, Deserialize)]
struct HostileSpec {
    x: f32,
    y: f32,
    range: f32,
    damage: f32,
    cooldown: f32,
}

#[derive(Debug, Deserialize)]
struct BuildingSpec {
    kind: BuildingKind,
    x: f32,
    y: f32,
}

#[derive(Debug, Deserialize)]
struct ResourceSpec {
    kind: ResourceKind,
    x: f32,
    y: f32,
}

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

fn check(name: &str, passed: bool, detail: String) -> TestResult {
    TestResult {
        name: name.into(),
        passed,
        detail,
    }
}

fn main() {
    let verbose = std::env::args().any(|a| a == "--verbose");
    println!("=== Outpost Simulation Harness ===\n");

    let mut results = Vec::new();

    // 1. Scenario manifest validation
    results.extend(validate_scenario_manifest(verbose));

    // 2. Intent scoring sweep
    results.extend(validate_intent_scoring(verbose));

    // 3. Cover math
    results.extend(validate_cover_math(verbose));

    // 4. Threat assessment & focus fire
    results.extend(validate_threat_scoring(verbose));

    // 5. Rescue probe geometry
    results.extend(validate_rescue_probes(verbose));

    // 6. Needs & vitals sweep
    results.extend(validate_needs(verbose));

    // 7. Full engine soak from the manifest
    results.extend(run_engine_soak(verbose));

    // ── Summary ──
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.iter().filter(|r| !r.passed).count();
    let total = results.len();

    for r in &results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || verbose {
            println!("  {} {}: {}", icon, r.name, r.detail);
        }
    }

    println!(
        "\n=== RESULT: {}/{} passed, {} failed ===",
        passed, total, failed
    );

    if failed > 0 {
        std::process::exit(1);
    }
}

// ── 1. Scenario manifest ────────────────────────────────────────────────

fn validate_scenario_manifest(_verbose: bool) -> Vec<TestResult> {
    println!("--- Scenario Manifest ---");
    let mut results = Vec::new();

    let scenario: Scenario = match serde_json::from_str(SCENARIO_JSON) {
        Ok(s) => s,
        Err(e) => {
            results.push(check(
                "manifest_parse",
                false,
                format!("JSON parse error: {}", e),
            ));
            return results;
        }
    };

    results.push(check(
        "manifest_parse",
        true,
        format!("scenario '{}' loaded", scenario.name),
    ));
    results.push(check(
        "manifest_has_colonists",
        !scenario.colonists.is_empty(),
        format!("{} colonists", scenario.colonists.len()),
    ));
    results.push(check(
        "manifest_has_home",
        scenario
            .buildings
            .iter()
            .any(|b| b.kind == BuildingKind::Home),
        "home base present".into(),
    ));

    let config = WorldConfig::default();
    let bounds = config.bounds();
    let all_in_bounds = scenario
        .colonists
        .iter()
        .chain(&scenario.medics)
        .all(|p| bounds.contains(&Vec2::new(p.x, p.y)))
        && scenario
            .buildings
            .iter()
            .all(|b| bounds.contains(&Vec2::new(b.x, b.y)))
        && scenario
            .resources
            .iter()
            .all(|r| bounds.contains(&Vec2::new(r.x, r.y)));
    results.push(check(
        "manifest_in_bounds",
        all_in_bounds,
        "all spawn points inside the world".into(),
    ));

    results
}

// ── 2. Intent scoring ───────────────────────────────────────────────────

fn validate_intent_scoring(verbose: bool) -> Vec<TestResult> {
    println!("--- Intent Scoring ---");
    let mut results = Vec::new();

    // Danger wins against every competing pressure.
    let input = IntentInput {
        in_danger: true,
        hp: 30.0,
        hunger: 100.0,
        fatigue: 100.0,
        night: true,
        food_available: true,
        ..Default::default()
    };
    let best = pick_best(&input);
    results.push(check(
        "flee_dominates_everything",
        best.kind == IntentKind::Flee,
        format!("picked {:?} at {}", best.kind, best.score),
    ));

    // Monotone eat pressure across the hunger band.
    let mut last = 0.0;
    let mut monotone = true;
    for hunger in [60.0, 70.0, 80.0, 90.0, 100.0] {
        let score = outpost_logic::intent::eat_score(hunger);
        if score < last {
            monotone = false;
        }
        if verbose {
            println!("  hunger {:>5.1} -> eat score {:.1}", hunger, score);
        }
        last = score;
    }
    results.push(check(
        "eat_score_monotone",
        monotone && (last - priorities::EAT_MAX).abs() < 0.01,
        format!("tops out at {:.1}", last),
    ));

    // A flee in progress cannot be stolen by the medical family.
    let medical = ScoredIntent {
        kind: IntentKind::SeekMedical,
        score: priorities::SEEK_MEDICAL,
    };
    results.push(check(
        "flee_resists_medical",
        !should_switch(IntentKind::Flee, 5.0, 0.0, &medical, false),
        "seek-medical does not preempt flee".into(),
    ));

    // Critical flee bypasses a fresh eat soft lock.
    let flee = ScoredIntent {
        kind: IntentKind::Flee,
        score: priorities::FLEE,
    };
    results.push(check(
        "flee_bypasses_soft_lock",
        should_switch(IntentKind::Eat, 0.1, 1.4, &flee, false),
        "flee preempts a fresh meal".into(),
    ));

    results
}

// ── 3. Cover math ───────────────────────────────────────────────────────

fn validate_cover_math(verbose: bool) -> Vec<TestResult> {
    println!("--- Cover Math ---");
    let mut results = Vec::new();

    // A wall faced square-on beyond the mid band keeps its full value.
    let wall = effective_cover(cover_consts::WALL_BASE, 10.0, 3.0);
    results.push(check(
        "wall_square_on",
        (wall - 0.75).abs() < 0.001,
        format!("0.75 expected, got {:.3}", wall),
    ));

    // Point-blank cover is worth a third.
    let close = effective_cover(cover_consts::WALL_BASE, 10.0, 0.3);
    results.push(check(
        "point_blank_discount",
        (close - 0.75 * cover_consts::DIST_NEAR_MULT).abs() < 0.001,
        format!("got {:.3}", close),
    ));

    // Past the last angle band cover vanishes entirely.
    let oblique = effective_cover(cover_consts::WALL_BASE, 80.0, 3.0);
    results.push(check(
        "oblique_no_cover",
        oblique == 0.0,
        format!("got {:.3}", oblique),
    ));

    // Stacking three rocks: primary full, others 20% each, under the cap.
    let stacked = stack_cover(&[(0.5, false), (0.5, false), (0.5, false)]);
    results.push(check(
        "stacking_three_rocks",
        (stacked - 0.7).abs() < 0.001 && stacked <= cover_consts::STACK_CAP,
        format!("got {:.3}", stacked),
    ));

    // A high wall stands alone; low objects behind it add nothing.
    let walled = stack_cover(&[(cover_consts::WALL_BASE, true), (0.5, false)]);
    results.push(check(
        "high_cover_not_stacked",
        (walled - cover_consts::WALL_BASE).abs() < 0.001,
        format!("got {:.3}", walled),
    ));

    // Position score prefers covered-and-distant over exposed-and-near.
    let covered = position_score(0.7, 250.0, danger::AWARENESS_RADIUS);
    let exposed = position_score(0.1, 100.0, danger::AWARENESS_RADIUS);
    if verbose {
        println!("  covered {:.3} vs exposed {:.3}", covered, exposed);
    }
    results.push(check(
        "position_score_weighting",
        covered > exposed,
        format!("{:.3} > {:.3}", covered, exposed),
    ));

    results
}

// ── 4. Threat assessment ────────────────────────────────────────────────

fn validate_threat_scoring(verbose: bool) -> Vec<TestResult> {
    println!("--- Threat Assessment ---");
    let mut results = Vec::new();

    let enemies = vec![
        ThreatProfile {
            id: 7,
            distance: 150.0,
            hp: 90.0,
            weapon_range: 30.0,
        },
        ThreatProfile {
            id: 3,
            distance: 160.0,
            hp: 20.0,
            weapon_range: 30.0,
        },
        ThreatProfile {
            id: 11,
            distance: 140.0,
            hp: 60.0,
            weapon_range: 120.0,
        },
    ];

    let pick = best_target(&enemies);
    results.push(check(
        "wounded_enemy_prioritized",
        pick.map(|t| t.id) == Some(3),
        format!("picked {:?}", pick.map(|t| t.id)),
    ));

    // Same inputs, same pick, every time — the focus-fire invariant.
    let mut consistent = true;
    for _ in 0..10 {
        if best_target(&enemies).map(|t| t.id) != Some(3) {
            consistent = false;
        }
    }
    results.push(check(
        "focus_fire_deterministic",
        consistent,
        "10/10 evaluations agree".into(),
    ));

    // Exact score ties break toward the lower id.
    let twins = vec![
        ThreatProfile {
            id: 9,
            distance: 100.0,
            hp: 50.0,
            weapon_range: 50.0,
        },
        ThreatProfile {
            id: 4,
            distance: 100.0,
            hp: 50.0,
            weapon_range: 50.0,
        },
    ];
    let pick = best_target(&twins);
    if verbose {
        println!("  tie-break picked id {:?}", pick.map(|t| t.id));
    }
    results.push(check(
        "tie_breaks_to_lower_id",
        pick.map(|t| t.id) == Some(4),
        format!("picked {:?}", pick.map(|t| t.id)),
    ));

    results
}

// ── 5. Rescue probes ────────────────────────────────────────────────────

fn validate_rescue_probes(verbose: bool) -> Vec<TestResult> {
    println!("--- Rescue Probes ---");
    let mut results = Vec::new();

    let offsets: Vec<Vec2> = probe_offsets().collect();
    results.push(check(
        "probe_count",
        offsets.len() == 32,
        format!("{} offsets (4 rings x 8 directions)", offsets.len()),
    ));

    // Rings expand outward so the rescue displacement stays minimal.
    let mut ordered = true;
    let mut last_ring = 0.0f32;
    for chunk in offsets.chunks(8) {
        let ring = chunk[0].length();
        if ring < last_ring {
            ordered = false;
        }
        if verbose {
            println!("  ring at {:.0} units", ring);
        }
        last_ring = ring;
    }
    results.push(check(
        "probes_nearest_first",
        ordered,
        format!("outermost ring {:.0}", last_ring),
    ));

    results
}

// ── 6. Needs & vitals ───────────────────────────────────────────────────

fn validate_needs(verbose: bool) -> Vec<TestResult> {
    println!("--- Needs & Vitals ---");
    let mut results = Vec::new();
    let temperament = Temperament::default();

    // Working burns needs faster than idling.
    let work = step_vitals(0.0, 0.0, 100.0, ActivityClass::Working, &temperament, false, 60.0);
    let idle = step_vitals(0.0, 0.0, 100.0, ActivityClass::Idle, &temperament, false, 60.0);
    results.push(check(
        "working_burns_faster",
        work.hunger > idle.hunger && work.fatigue > idle.fatigue,
        format!(
            "work hunger {:.1} vs idle {:.1} after a minute",
            work.hunger, idle.hunger
        ),
    ));

    // Sleep recovers fatigue.
    let asleep = step_vitals(0.0, 80.0, 100.0, ActivityClass::Sleeping, &temperament, false, 5.0);
    results.push(check(
        "sleep_recovers",
        asleep.fatigue < 80.0,
        format!("fatigue {:.1} after 5s asleep", asleep.fatigue),
    ));

    // Starvation drains hp; the healing aura pushes back.
    let starving = step_vitals(96.0, 0.0, 100.0, ActivityClass::Idle, &temperament, false, 10.0);
    let aided = step_vitals(96.0, 0.0, 100.0, ActivityClass::Idle, &temperament, true, 10.0);
    if verbose {
        println!(
            "  starving hp {:.1}, with aura {:.1}",
            starving.hp, aided.hp
        );
    }
    results.push(check(
        "starvation_drains_hp",
        starving.hp < 100.0 && aided.hp > starving.hp,
        format!("{:.1} < 100, aura raises to {:.1}", starving.hp, aided.hp),
    ));

    // Vitals never escape their 0..=100 range.
    let extreme = step_vitals(99.0, 99.0, 1.0, ActivityClass::Working, &temperament, false, 600.0);
    results.push(check(
        "vitals_stay_clamped",
        (0.0..=100.0).contains(&extreme.hunger)
            && (0.0..=100.0).contains(&extreme.fatigue)
            && (0.0..=100.0).contains(&extreme.hp),
        format!(
            "hunger {:.1} fatigue {:.1} hp {:.1}",
            extreme.hunger, extreme.fatigue, extreme.hp
        ),
    ));

    results
}

// ── 7. Engine soak ──────────────────────────────────────────────────────

fn run_engine_soak(verbose: bool) -> Vec<TestResult> {
    println!("--- Engine Soak ---");
    let mut results = Vec::new();

    let scenario: Scenario = match serde_json::from_str(SCENARIO_JSON) {
        Ok(s) => s,
        Err(e) => {
            results.push(check("soak_setup", false, format!("{}", e)));
            return results;
        }
    };

    let mut engine = Engine::new(WorldConfig::default());
    engine.food = scenario.food;
    for p in &scenario.colonists {
        engine.spawn_colonist(p.x, p.y);
    }
    for p in &scenario.medics {
        engine.spawn_medic(p.x, p.y);
    }
    for h in &scenario.hostiles {
        engine.spawn_hostile(h.x, h.y, Weapon::new(h.range, h.damage, h.cooldown));
    }
    for b in &scenario.buildings {
        engine.spawn_building(b.kind, b.x, b.y);
    }
    for r in &scenario.resources {
        engine.spawn_resource(r.kind, r.x, r.y);
    }

    let initial_colonists = engine.colonist_count();

    // Two simulated minutes at 10 Hz.
    let mut max_reservations = 0usize;
    for step in 0..1200 {
        engine.update(0.1);
        max_reservations = max_reservations.max(engine.reservations().len());

        if verbose && step % 300 == 0 {
            println!(
                "  t={:>5.1}s colonists={} hostiles={} food={} reservations={}",
                engine.sim_time(),
                engine.colonist_count(),
                engine.hostile_count(),
                engine.food,
                engine.reservations().len()
            );
        }
    }

    results.push(check(
        "soak_colony_survives",
        engine.colonist_count() == initial_colonists,
        format!(
            "{}/{} colonists alive after {:.0}s",
            engine.colonist_count(),
            initial_colonists,
            engine.sim_time()
        ),
    ));

    // Reservations never exceed the number of actors.
    results.push(check(
        "soak_reservations_bounded",
        max_reservations <= initial_colonists,
        format!("peak {} reservations", max_reservations),
    ));

    // Occupancy never exceeds capacity anywhere.
    let occupancy_ok = engine
        .world
        .query::<(&Building,)>()
        .iter()
        .all(|(_, (b,))| b.occupancy <= b.capacity);
    results.push(check(
        "soak_occupancy_within_capacity",
        occupancy_ok,
        "no overbooked building".into(),
    ));

    // Every surviving colonist ends in a legal state with sane vitals.
    let mut states_ok = true;
    let mut vitals_ok = true;
    for (_, (runtime, vitals)) in engine
        .world
        .query::<(&BehaviorRuntime, &Vitals)>()
        .iter()
    {
        if let BehaviorState::MoveTo { dest } = runtime.state {
            if !WorldConfig::default().bounds().contains(&dest) {
                states_ok = false;
            }
        }
        if !(0.0..=100.0).contains(&vitals.hunger)
            || !(0.0..=100.0).contains(&vitals.fatigue)
            || !(0.0..=100.0).contains(&vitals.hp)
        {
            vitals_ok = false;
        }
    }
    results.push(check("soak_states_legal", states_ok, "destinations in bounds".into()));
    results.push(check("soak_vitals_clamped", vitals_ok, "all vitals in 0..=100".into()));

    results
}
