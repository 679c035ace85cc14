//! Behavior tuning constants — priorities, radii, rates, timeouts.
//!
//! Everything the scheduler and combat engine compare against lives
//! here so balance passes touch a single file.

/// Baseline priority per intent, used for preemption decisions.
/// Strictly ordered: flee > medical family > heal > sleep > go-to-sleep
/// band > eat band > work > resting > move/idle > seek-task.
pub mod priorities {
    pub const FLEE: f32 = 100.0;
    pub const SEEK_MEDICAL: f32 = 95.0;
    pub const MEDICAL: f32 = 92.0;
    pub const MEDICAL_MULTIPLE: f32 = 90.0;
    pub const HEAL: f32 = 90.0;
    pub const SLEEP: f32 = 80.0;
    /// Go-to-sleep scales from this floor up to GO_TO_SLEEP_MAX with
    /// fatigue excess over the threshold.
    pub const GO_TO_SLEEP_MIN: f32 = 70.0;
    pub const GO_TO_SLEEP_MAX: f32 = 90.0;
    /// Eat scales from this floor up to EAT_MAX with hunger excess.
    pub const EAT_MIN: f32 = 60.0;
    pub const EAT_MAX: f32 = 85.0;
    pub const WORK: f32 = 40.0;
    pub const RESTING: f32 = 35.0;
    pub const MOVE: f32 = 20.0;
    pub const IDLE: f32 = 15.0;
    pub const SEEK_TASK: f32 = 10.0;
}

/// Danger detection hysteresis and threat memory.
pub mod danger {
    /// Entering flee: threat closer than this (world units).
    pub const ENTER_RADIUS: f32 = 140.0;
    /// Leaving flee: the *same* threat farther than this.
    pub const EXIT_RADIUS: f32 = 180.0;
    /// How far an actor notices hostiles at all.
    pub const AWARENESS_RADIUS: f32 = 320.0;
    /// Remembered danger positions are pruned after this many seconds.
    pub const MEMORY_TTL: f32 = 20.0;
}

/// Soft-lock windows and the anti-thrash guard.
pub mod locks {
    /// Minimum time in a state before a non-critical switch is allowed.
    pub const MIN_STATE_SECONDS: f32 = 0.5;
    pub const EAT: f32 = 1.5;
    pub const SLEEP: f32 = 2.0;
    pub const GO_TO_SLEEP: f32 = 2.0;
    pub const RESTING: f32 = 1.0;
}

/// Per-state watchdog timeouts guaranteeing forward progress.
pub mod timeouts {
    pub const BUILD: f32 = 20.0;
    pub const CHOP: f32 = 15.0;
    pub const MINE: f32 = 15.0;
    pub const HARVEST: f32 = 15.0;
    /// Give up looking for a bed after this long and rest on the ground.
    pub const SLEEP_SEARCH: f32 = 15.0;
    /// A chosen bed is sticky for this long to avoid flip-flopping.
    pub const BED_CHOICE_MEMORY: f32 = 3.0;
    pub const SEEK_MEDICAL: f32 = 20.0;
    pub const HEAL: f32 = 20.0;
}

/// Needs & vitals rates. Hunger/fatigue/hp are all 0..=100.
pub mod needs {
    /// Hunger gain per second by activity class.
    pub const HUNGER_WORKING: f32 = 0.35;
    pub const HUNGER_IDLE: f32 = 0.15;
    pub const HUNGER_RESTING: f32 = 0.10;
    pub const HUNGER_SLEEPING: f32 = 0.05;

    /// Fatigue gain per second by activity class (sleep/rest recover).
    pub const FATIGUE_WORKING: f32 = 0.40;
    pub const FATIGUE_IDLE: f32 = 0.12;
    pub const FATIGUE_REST_RECOVERY: f32 = 2.0;
    pub const FATIGUE_SLEEP_RECOVERY: f32 = 8.0;

    /// Eat when hunger passes this; intent priority scales above it.
    pub const HUNGER_THRESHOLD: f32 = 60.0;
    /// Seek a bed when fatigue passes this.
    pub const FATIGUE_THRESHOLD: f32 = 60.0;
    /// Eating restores this much hunger from one food unit.
    pub const MEAL_VALUE: f32 = 60.0;
    /// Seconds of eating after arrival before the meal takes effect.
    pub const EAT_DURATION: f32 = 0.6;
    /// Wake when fatigue drops to this.
    pub const WAKE_FATIGUE: f32 = 5.0;

    /// Starvation: hp drain once hunger reaches the threshold.
    pub const STARVATION_HUNGER: f32 = 95.0;
    pub const STARVATION_HP_DRAIN: f32 = 0.5;
    /// Passive regen per second when fed and not working.
    pub const HP_REGEN: f32 = 0.2;
    /// Must be below this hunger for passive regen.
    pub const REGEN_HUNGER_CEILING: f32 = 50.0;
    /// Flat extra regen per second inside a medical building's aura.
    pub const HEALING_AURA_REGEN: f32 = 1.0;
    pub const HEALING_AURA_RADIUS: f32 = 96.0;
    /// Seek treatment below this hp; treated until back above the exit.
    pub const MEDICAL_HP_THRESHOLD: f32 = 40.0;
    pub const MEDICAL_HP_EXIT: f32 = 90.0;
    /// Medic healing per second on a single patient; split when
    /// treating several at once.
    pub const HEAL_RATE: f32 = 4.0;
    pub const HEAL_MULTI_FACTOR: f32 = 0.6;
}

/// Cover math (spec values; one tile = `world::TILE_SIZE` units).
pub mod cover {
    pub const WALL_BASE: f32 = 0.75;
    pub const ROCK_BASE: f32 = 0.5;
    pub const TREE_BASE: f32 = 0.3;

    /// Angle bands between the threat vector and the object facing:
    /// full value below the first band, stepping down to nothing.
    pub const ANGLE_BANDS: [(f32, f32); 5] = [
        (15.0, 1.0),
        (27.0, 0.8),
        (40.0, 0.6),
        (52.0, 0.4),
        (65.0, 0.2),
    ];

    /// Point-blank cover is worth a third, one tile out two thirds.
    pub const DIST_NEAR_TILES: f32 = 0.5;
    pub const DIST_NEAR_MULT: f32 = 0.33;
    pub const DIST_MID_TILES: f32 = 2.0;
    pub const DIST_MID_MULT: f32 = 0.66;

    /// Secondary/tertiary low cover contributes this fraction each.
    pub const STACK_FRACTION: f32 = 0.2;
    /// Total effective cover never exceeds this.
    pub const STACK_CAP: f32 = 0.9;
    /// Only objects within the final quarter of the shot path count.
    pub const SHOT_PATH_WINDOW: f32 = 0.25;

    /// Cover-seeking position score weights.
    pub const SEEK_COVER_WEIGHT: f32 = 0.7;
    pub const SEEK_DISTANCE_WEIGHT: f32 = 0.3;
}

/// Threat assessment score weights (must sum to 1.0 so the score is
/// comparable across actors — focus fire depends on it).
pub mod threat {
    pub const HP_WEIGHT: f32 = 0.4;
    pub const DISTANCE_WEIGHT: f32 = 0.4;
    pub const WEAPON_WEIGHT: f32 = 0.2;
    /// Weapon ranges are normalized against this.
    pub const MAX_WEAPON_RANGE: f32 = 256.0;
}

/// Stuck detection & rescue.
pub mod rescue {
    /// Continuous stuck time before a rescue fires.
    pub const STUCK_GRACE: f32 = 3.0;
    /// Probe rings tried for a collision-free point, nearest first.
    pub const PROBE_RADII: [f32; 4] = [20.0, 40.0, 60.0, 80.0];
    /// Work-stall signal: this long in a movement-dependent work state...
    pub const STALL_WINDOW: f32 = 1.0;
    /// ...with less than this much net displacement.
    pub const STALL_DISPLACEMENT: f32 = 5.0;
    /// Last-resort teleport offset from the home base.
    pub const HOME_FALLBACK_OFFSET: f32 = 48.0;
}

/// Tactical engine caching.
pub mod tactical {
    /// Cached per-actor tactical entries are pruned after this long.
    pub const CACHE_TTL: f32 = 5.0;
}

/// World-scale constants.
pub mod world {
    pub const TILE_SIZE: f32 = 32.0;
    /// Simulated seconds per day.
    pub const DAY_LENGTH: f32 = 600.0;
    /// Night spans [NIGHT_START, 24) and [0, NIGHT_END) in sim hours.
    pub const NIGHT_START: f32 = 22.0;
    pub const NIGHT_END: f32 = 6.0;
}
