//! Intent evaluation — the scored candidate system behind the
//! behavior scheduler.
//!
//! Every tick the scheduler snapshots an actor's readings into an
//! [`IntentInput`], scores the applicable candidates, and asks
//! [`should_switch`] whether the best one may preempt the current
//! state. Critical intents (flee, the medical family, sleep at night)
//! bypass the soft-lock and minimum-duration throttles but still have
//! to outrank the current state's baseline, so flee is never preempted
//! by a lower-priority critical intent.

use crate::constants::{locks, needs, priorities};
use serde::{Deserialize, Serialize};

/// Every behavior state an actor can be in. Baseline priorities are
/// strictly ordered for preemption decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IntentKind {
    Flee,
    SeekMedical,
    Medical,
    MedicalMultiple,
    Heal,
    Sleep,
    GoToSleep,
    Eat,
    Build,
    Chop,
    Mine,
    Harvest,
    Resting,
    MoveTo,
    Idle,
    SeekTask,
}

impl IntentKind {
    /// Baseline priority used when defending the current state against
    /// a candidate. Scaling intents (eat, go-to-sleep) defend with
    /// their band floor.
    pub fn baseline_priority(self) -> f32 {
        match self {
            IntentKind::Flee => priorities::FLEE,
            IntentKind::SeekMedical => priorities::SEEK_MEDICAL,
            IntentKind::Medical => priorities::MEDICAL,
            IntentKind::MedicalMultiple => priorities::MEDICAL_MULTIPLE,
            IntentKind::Heal => priorities::HEAL,
            IntentKind::Sleep => priorities::SLEEP,
            IntentKind::GoToSleep => priorities::GO_TO_SLEEP_MIN,
            IntentKind::Eat => priorities::EAT_MIN,
            IntentKind::Build | IntentKind::Chop | IntentKind::Mine | IntentKind::Harvest => {
                priorities::WORK
            }
            IntentKind::Resting => priorities::RESTING,
            IntentKind::MoveTo => priorities::MOVE,
            IntentKind::Idle => priorities::IDLE,
            IntentKind::SeekTask => priorities::SEEK_TASK,
        }
    }

    /// Critical intents switch immediately, bypassing soft-locks and
    /// the minimum-state-duration guard. Sleep only counts at night.
    pub fn is_critical(self, night: bool) -> bool {
        match self {
            IntentKind::Flee
            | IntentKind::SeekMedical
            | IntentKind::Medical
            | IntentKind::MedicalMultiple => true,
            IntentKind::Sleep | IntentKind::GoToSleep => night,
            _ => false,
        }
    }

    /// Soft-lock armed when entering this state, suppressing
    /// non-critical switches while it runs.
    pub fn soft_lock_secs(self) -> f32 {
        match self {
            IntentKind::Eat => locks::EAT,
            IntentKind::Sleep => locks::SLEEP,
            IntentKind::GoToSleep => locks::GO_TO_SLEEP,
            IntentKind::Resting => locks::RESTING,
            _ => 0.0,
        }
    }

    /// Work states depend on reaching a target; the stall detector only
    /// watches these.
    pub fn is_work(self) -> bool {
        matches!(
            self,
            IntentKind::Build | IntentKind::Chop | IntentKind::Mine | IntentKind::Harvest
        )
    }
}

/// Snapshot of actor readings the scoring function needs — plain data,
/// no world access.
#[derive(Debug, Clone, Default)]
pub struct IntentInput {
    pub in_danger: bool,
    pub hp: f32,
    pub hunger: f32,
    pub fatigue: f32,
    pub night: bool,
    pub food_available: bool,
    pub under_treatment: bool,
    pub is_medic: bool,
    pub patient_available: bool,
}

/// A scored candidate intent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoredIntent {
    pub kind: IntentKind,
    pub score: f32,
}

/// Eat priority scales from the band floor to its ceiling as hunger
/// climbs past the threshold.
pub fn eat_score(hunger: f32) -> f32 {
    let excess = (hunger - needs::HUNGER_THRESHOLD) / (100.0 - needs::HUNGER_THRESHOLD);
    priorities::EAT_MIN + excess.clamp(0.0, 1.0) * (priorities::EAT_MAX - priorities::EAT_MIN)
}

/// Go-to-sleep priority scales with fatigue excess the same way.
pub fn sleep_score(fatigue: f32) -> f32 {
    let excess = (fatigue - needs::FATIGUE_THRESHOLD) / (100.0 - needs::FATIGUE_THRESHOLD);
    priorities::GO_TO_SLEEP_MIN
        + excess.clamp(0.0, 1.0) * (priorities::GO_TO_SLEEP_MAX - priorities::GO_TO_SLEEP_MIN)
}

/// Score all applicable candidate intents, sorted best-first. The
/// seek-task fallback is always present so the result is never empty.
pub fn score_intents(input: &IntentInput) -> Vec<ScoredIntent> {
    let mut candidates = Vec::with_capacity(6);

    if input.in_danger {
        candidates.push(ScoredIntent {
            kind: IntentKind::Flee,
            score: priorities::FLEE,
        });
    }

    if crate::needs::needs_medical(input.hp) && !input.under_treatment {
        candidates.push(ScoredIntent {
            kind: IntentKind::SeekMedical,
            score: priorities::SEEK_MEDICAL,
        });
    }

    if input.is_medic && input.patient_available {
        candidates.push(ScoredIntent {
            kind: IntentKind::Heal,
            score: priorities::HEAL,
        });
    }

    // Sleep pressure: over the fatigue threshold, or merely tired at
    // night when sleep becomes the critical default.
    if input.fatigue >= needs::FATIGUE_THRESHOLD || (input.night && input.fatigue >= 30.0) {
        candidates.push(ScoredIntent {
            kind: IntentKind::GoToSleep,
            score: sleep_score(input.fatigue),
        });
    }

    if input.hunger >= needs::HUNGER_THRESHOLD && input.food_available {
        candidates.push(ScoredIntent {
            kind: IntentKind::Eat,
            score: eat_score(input.hunger),
        });
    }

    candidates.push(ScoredIntent {
        kind: IntentKind::SeekTask,
        score: priorities::SEEK_TASK,
    });

    // Sort descending; insertion order breaks exact ties so the result
    // is deterministic for identical inputs.
    candidates.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
    candidates
}

/// Best candidate for the given readings.
pub fn pick_best(input: &IntentInput) -> ScoredIntent {
    score_intents(input)
        .into_iter()
        .next()
        .unwrap_or(ScoredIntent {
            kind: IntentKind::SeekTask,
            score: priorities::SEEK_TASK,
        })
}

/// Whether `candidate` may replace the current state right now.
///
/// Critical candidates skip the throttles but still have to outrank
/// the current baseline — a flee in progress is not abandoned for a
/// lower-priority medical intent.
pub fn should_switch(
    current: IntentKind,
    state_since: f32,
    soft_lock_remaining: f32,
    candidate: &ScoredIntent,
    night: bool,
) -> bool {
    if candidate.kind == current {
        return false;
    }
    if candidate.kind.is_critical(night) {
        return candidate.score > current.baseline_priority();
    }
    if soft_lock_remaining > 0.0 {
        return false;
    }
    if state_since < locks::MIN_STATE_SECONDS {
        return false;
    }
    candidate.score > current.baseline_priority()
}
