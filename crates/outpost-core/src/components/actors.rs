//! Actor components: colonists, hostiles, vitals, and the per-actor
//! behavior runtime the scheduler owns.

use hecs::Entity;
use outpost_logic::geometry::Vec2;
use outpost_logic::intent::IntentKind;
use outpost_logic::needs::ActivityClass;
use serde::{Deserialize, Serialize};

/// Marker component identifying a player-faction colonist.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Colonist;

/// Marker component identifying a hostile actor.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Hostile;

/// Marker for colonists able to treat patients.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Medic;

/// Core vitals — all 0..=100, kept clamped by the needs system.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Vitals {
    pub hunger: f32,
    pub fatigue: f32,
    pub hp: f32,
}

impl Default for Vitals {
    fn default() -> Self {
        Self {
            hunger: 0.0,
            fatigue: 0.0,
            hp: 100.0,
        }
    }
}

impl Vitals {
    pub fn alive(&self) -> bool {
        self.hp > 0.0
    }

    pub fn apply_damage(&mut self, amount: f32) {
        self.hp = (self.hp - amount).clamp(0.0, 100.0);
    }
}

/// Base locomotion parameters, scaled by capability each tick.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Mobility {
    /// World units per second at full capability.
    pub base_speed: f32,
    /// Collision radius.
    pub radius: f32,
}

impl Default for Mobility {
    fn default() -> Self {
        Self {
            base_speed: 60.0,
            radius: 8.0,
        }
    }
}

/// Weapon stats for combat-capable actors.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Weapon {
    pub range: f32,
    pub damage: f32,
    /// Seconds between attacks.
    pub cooldown: f32,
    pub cooldown_remaining: f32,
}

impl Weapon {
    pub fn new(range: f32, damage: f32, cooldown: f32) -> Self {
        Self {
            range,
            damage,
            cooldown,
            cooldown_remaining: 0.0,
        }
    }
}

/// Kinds of work tasks a colonist can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskKind {
    Build,
    Chop,
    Mine,
    Harvest,
}

impl TaskKind {
    /// The behavior state that performs this task.
    pub fn state(self) -> BehaviorState {
        match self {
            TaskKind::Build => BehaviorState::Build,
            TaskKind::Chop => BehaviorState::Chop,
            TaskKind::Mine => BehaviorState::Mine,
            TaskKind::Harvest => BehaviorState::Harvest,
        }
    }
}

/// A work assignment: what to do and to which world entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Task {
    pub kind: TaskKind,
    pub target: Entity,
}

/// The full behavior state machine. `MoveTo` carries its destination;
/// work and medical targets live in [`BehaviorRuntime::task`] /
/// remembered entities so variants stay cheap to copy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BehaviorState {
    SeekTask,
    Idle,
    MoveTo { dest: Vec2 },
    Resting,
    Build,
    Chop,
    Mine,
    Harvest,
    Eat,
    GoToSleep,
    Sleep,
    SeekMedical,
    Medical,
    MedicalMultiple,
    Heal,
    Flee,
}

impl BehaviorState {
    /// The intent kind this state corresponds to, for priority and
    /// switch decisions.
    pub fn intent_kind(&self) -> IntentKind {
        match self {
            BehaviorState::SeekTask => IntentKind::SeekTask,
            BehaviorState::Idle => IntentKind::Idle,
            BehaviorState::MoveTo { .. } => IntentKind::MoveTo,
            BehaviorState::Resting => IntentKind::Resting,
            BehaviorState::Build => IntentKind::Build,
            BehaviorState::Chop => IntentKind::Chop,
            BehaviorState::Mine => IntentKind::Mine,
            BehaviorState::Harvest => IntentKind::Harvest,
            BehaviorState::Eat => IntentKind::Eat,
            BehaviorState::GoToSleep => IntentKind::GoToSleep,
            BehaviorState::Sleep => IntentKind::Sleep,
            BehaviorState::SeekMedical => IntentKind::SeekMedical,
            BehaviorState::Medical => IntentKind::Medical,
            BehaviorState::MedicalMultiple => IntentKind::MedicalMultiple,
            BehaviorState::Heal => IntentKind::Heal,
            BehaviorState::Flee => IntentKind::Flee,
        }
    }

    /// Activity class for the needs system.
    pub fn activity_class(&self) -> ActivityClass {
        match self {
            BehaviorState::Build
            | BehaviorState::Chop
            | BehaviorState::Mine
            | BehaviorState::Harvest
            | BehaviorState::Heal
            | BehaviorState::Flee => ActivityClass::Working,
            BehaviorState::Resting
            | BehaviorState::Medical
            | BehaviorState::MedicalMultiple => ActivityClass::Resting,
            BehaviorState::Sleep => ActivityClass::Sleeping,
            _ => ActivityClass::Idle,
        }
    }
}

/// One remembered danger location.
#[derive(Debug, Clone, Copy)]
pub struct DangerMemory {
    pub pos: Vec2,
    pub at: f64,
    pub radius: f32,
}

/// Per-actor behavior runtime, owned 1:1 by each actor. Reifies the
/// scheduler's timers and memories as one struct instead of scattering
/// optional fields across the actor record.
#[derive(Debug, Clone)]
pub struct BehaviorRuntime {
    pub state: BehaviorState,
    /// Seconds spent in the current state; resets on every transition.
    pub state_since: f32,
    /// Sim time until which non-critical switches are suppressed.
    pub soft_lock_until: f64,
    /// Current work assignment, if any.
    pub task: Option<Task>,
    /// Remembered danger positions, pruned after the memory TTL.
    pub danger_memory: Vec<DangerMemory>,
    /// The specific threat that triggered flee; hysteresis exit checks
    /// this same actor, not "any enemy nearby".
    pub active_threat: Option<Entity>,
    /// Continuous seconds the stuck watchdog has accumulated.
    pub stuck_timer: f32,
    /// Position sampled last tick, for displacement checks.
    pub last_position: Vec2,
    /// Seconds in a movement-dependent work state without progress.
    pub work_stall_timer: f32,
    /// Generic in-state progress timer (eating, healing).
    pub progress: f32,
    /// Sticky bed choice so similar beds don't cause flip-flopping.
    pub chosen_bed: Option<Entity>,
    pub bed_locked_until: f64,
    /// Building whose occupancy slot this actor currently holds (a bed
    /// while sleeping, a medical building while under treatment). The
    /// transition routine releases it on every exit.
    pub occupying: Option<Entity>,
}

impl Default for BehaviorRuntime {
    fn default() -> Self {
        Self {
            state: BehaviorState::SeekTask,
            state_since: 0.0,
            soft_lock_until: 0.0,
            task: None,
            danger_memory: Vec::new(),
            active_threat: None,
            stuck_timer: 0.0,
            last_position: Vec2::ZERO,
            work_stall_timer: 0.0,
            progress: 0.0,
            chosen_bed: None,
            bed_locked_until: 0.0,
            occupying: None,
        }
    }
}

impl BehaviorRuntime {
    /// Switch state, resetting per-state timers and arming the new
    /// state's soft lock. Task release and route clearing are the
    /// transition routine's job, not this struct's.
    pub fn enter_state(&mut self, state: BehaviorState, now: f64) {
        let lock = state.intent_kind().soft_lock_secs();
        self.state = state;
        self.state_since = 0.0;
        self.progress = 0.0;
        self.soft_lock_until = if lock > 0.0 { now + lock as f64 } else { 0.0 };
    }

    /// Remaining soft-lock seconds at `now`.
    pub fn soft_lock_remaining(&self, now: f64) -> f32 {
        (self.soft_lock_until - now).max(0.0) as f32
    }

    /// Record a danger location and drop expired memories.
    pub fn remember_danger(&mut self, pos: Vec2, radius: f32, now: f64) {
        self.danger_memory.push(DangerMemory { pos, at: now, radius });
        self.prune_danger_memory(now);
    }

    /// Drop memories older than the danger TTL.
    pub fn prune_danger_memory(&mut self, now: f64) {
        let ttl = outpost_logic::constants::danger::MEMORY_TTL as f64;
        self.danger_memory.retain(|m| now - m.at < ttl);
    }
}
