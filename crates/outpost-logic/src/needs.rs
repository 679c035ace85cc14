//! Pure vitals math — hunger and fatigue accumulation, health
//! regeneration and starvation.
//!
//! The per-tick update has no branching on other components: the caller
//! tells it what activity class the actor is in and whether a healing
//! aura applies, and it returns the new clamped values.

use crate::constants::needs;
use serde::{Deserialize, Serialize};

/// Coarse activity classification driving need rates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActivityClass {
    Working,
    Resting,
    Sleeping,
    Idle,
}

/// Per-actor rate multipliers (personality data, supplied externally).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Temperament {
    /// Scales hunger accumulation.
    pub metabolism: f32,
    /// Scales fatigue accumulation.
    pub stamina: f32,
}

impl Default for Temperament {
    fn default() -> Self {
        Self {
            metabolism: 1.0,
            stamina: 1.0,
        }
    }
}

/// Hunger gain per second for an activity class.
pub fn hunger_rate(class: ActivityClass) -> f32 {
    match class {
        ActivityClass::Working => needs::HUNGER_WORKING,
        ActivityClass::Resting => needs::HUNGER_RESTING,
        ActivityClass::Sleeping => needs::HUNGER_SLEEPING,
        ActivityClass::Idle => needs::HUNGER_IDLE,
    }
}

/// Fatigue change per second for an activity class (negative while
/// resting or sleeping).
pub fn fatigue_rate(class: ActivityClass) -> f32 {
    match class {
        ActivityClass::Working => needs::FATIGUE_WORKING,
        ActivityClass::Resting => -needs::FATIGUE_REST_RECOVERY,
        ActivityClass::Sleeping => -needs::FATIGUE_SLEEP_RECOVERY,
        ActivityClass::Idle => needs::FATIGUE_IDLE,
    }
}

/// Result of one vitals step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VitalsStep {
    pub hunger: f32,
    pub fatigue: f32,
    pub hp: f32,
}

/// Advance hunger, fatigue, and hp by `dt` seconds.
///
/// Health regenerates slowly when well-fed and not working, drains
/// under starvation, and gets flat extra regen inside a medical
/// building's aura. All outputs stay clamped to 0..=100.
pub fn step_vitals(
    hunger: f32,
    fatigue: f32,
    hp: f32,
    class: ActivityClass,
    temperament: &Temperament,
    in_healing_aura: bool,
    dt: f32,
) -> VitalsStep {
    let new_hunger = (hunger + hunger_rate(class) * temperament.metabolism * dt).clamp(0.0, 100.0);
    let new_fatigue = (fatigue + fatigue_rate(class) * temperament.stamina * dt).clamp(0.0, 100.0);

    let mut hp_delta = 0.0;
    if new_hunger >= needs::STARVATION_HUNGER {
        hp_delta -= needs::STARVATION_HP_DRAIN * dt;
    } else if new_hunger < needs::REGEN_HUNGER_CEILING && class != ActivityClass::Working {
        hp_delta += needs::HP_REGEN * dt;
    }
    if in_healing_aura {
        hp_delta += needs::HEALING_AURA_REGEN * dt;
    }

    VitalsStep {
        hunger: new_hunger,
        fatigue: new_fatigue,
        hp: (hp + hp_delta).clamp(0.0, 100.0),
    }
}

/// Whether hp is low enough to seek treatment.
pub fn needs_medical(hp: f32) -> bool {
    hp < needs::MEDICAL_HP_THRESHOLD
}

/// Whether a patient under treatment is recovered enough to leave.
pub fn treatment_complete(hp: f32) -> bool {
    hp >= needs::MEDICAL_HP_EXIT
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_working_builds_hunger_and_fatigue() {
        let step = step_vitals(
            0.0,
            0.0,
            100.0,
            ActivityClass::Working,
            &Temperament::default(),
            false,
            10.0,
        );
        assert!(step.hunger > 0.0);
        assert!(step.fatigue > 0.0);
    }

    #[test]
    fn test_sleep_recovers_fatigue() {
        let step = step_vitals(
            20.0,
            80.0,
            100.0,
            ActivityClass::Sleeping,
            &Temperament::default(),
            false,
            5.0,
        );
        assert!(step.fatigue < 80.0);
    }

    #[test]
    fn test_values_stay_clamped() {
        let step = step_vitals(
            99.0,
            99.0,
            100.0,
            ActivityClass::Working,
            &Temperament::default(),
            false,
            100.0,
        );
        assert!(step.hunger <= 100.0);
        assert!(step.fatigue <= 100.0);

        let step = step_vitals(
            0.0,
            0.5,
            100.0,
            ActivityClass::Sleeping,
            &Temperament::default(),
            false,
            100.0,
        );
        assert!(step.fatigue >= 0.0);
    }

    #[test]
    fn test_starvation_drains_hp() {
        let step = step_vitals(
            96.0,
            10.0,
            50.0,
            ActivityClass::Idle,
            &Temperament::default(),
            false,
            10.0,
        );
        assert!(step.hp < 50.0);
    }

    #[test]
    fn test_fed_idle_regenerates() {
        let step = step_vitals(
            10.0,
            10.0,
            50.0,
            ActivityClass::Idle,
            &Temperament::default(),
            false,
            10.0,
        );
        assert!(step.hp > 50.0);
    }

    #[test]
    fn test_no_regen_while_working() {
        let step = step_vitals(
            10.0,
            10.0,
            50.0,
            ActivityClass::Working,
            &Temperament::default(),
            false,
            10.0,
        );
        assert!((step.hp - 50.0).abs() < 0.001);
    }

    #[test]
    fn test_healing_aura_stacks_on_regen() {
        let plain = step_vitals(
            10.0,
            10.0,
            50.0,
            ActivityClass::Resting,
            &Temperament::default(),
            false,
            10.0,
        );
        let aura = step_vitals(
            10.0,
            10.0,
            50.0,
            ActivityClass::Resting,
            &Temperament::default(),
            true,
            10.0,
        );
        assert!(aura.hp > plain.hp);
    }

    #[test]
    fn test_fast_metabolism_hungers_faster() {
        let fast = Temperament {
            metabolism: 1.5,
            stamina: 1.0,
        };
        let a = step_vitals(0.0, 0.0, 100.0, ActivityClass::Idle, &fast, false, 10.0);
        let b = step_vitals(
            0.0,
            0.0,
            100.0,
            ActivityClass::Idle,
            &Temperament::default(),
            false,
            10.0,
        );
        assert!(a.hunger > b.hunger);
    }

    #[test]
    fn test_medical_thresholds() {
        assert!(needs_medical(30.0));
        assert!(!needs_medical(60.0));
        assert!(treatment_complete(95.0));
        assert!(!treatment_complete(60.0));
    }
}
