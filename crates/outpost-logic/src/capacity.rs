//! Capability scalars consumed from the external body simulation.
//!
//! The behavior core never computes these — it reads them each tick and
//! scales movement speed and work throughput. All scalars are 0..=1
//! except `pain` which is 0 (none) to 1 (incapacitating).

use serde::{Deserialize, Serialize};

/// Per-actor capability snapshot, refreshed before each scheduler tick.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Capacities {
    pub consciousness: f32,
    pub mobility: f32,
    pub manipulation: f32,
    pub pain: f32,
    pub bleeding: bool,
    pub blood_level: f32,
}

impl Default for Capacities {
    fn default() -> Self {
        Self {
            consciousness: 1.0,
            mobility: 1.0,
            manipulation: 1.0,
            pain: 0.0,
            bleeding: false,
            blood_level: 1.0,
        }
    }
}

impl Capacities {
    /// An actor below this consciousness cannot act at all.
    pub fn is_incapacitated(&self) -> bool {
        self.consciousness < 0.1 || self.mobility < 0.05
    }
}

/// Movement speed factor. Mobility dominates; low consciousness and
/// pain slow an actor further. Never fully zero for a conscious actor
/// so rescue/flee movement remains possible.
pub fn move_speed_scalar(caps: &Capacities) -> f32 {
    let conscious = 0.2 + 0.8 * caps.consciousness.clamp(0.0, 1.0);
    let pain_drag = 1.0 - 0.3 * caps.pain.clamp(0.0, 1.0);
    (caps.mobility.clamp(0.0, 1.0) * conscious * pain_drag).clamp(0.05, 1.0)
}

/// Work throughput factor. Manipulation dominates; pain hurts work
/// more than it hurts walking.
pub fn work_speed_scalar(caps: &Capacities) -> f32 {
    let conscious = 0.2 + 0.8 * caps.consciousness.clamp(0.0, 1.0);
    let pain_drag = 1.0 - 0.5 * caps.pain.clamp(0.0, 1.0);
    (caps.manipulation.clamp(0.0, 1.0) * conscious * pain_drag).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_healthy_actor_full_speed() {
        let caps = Capacities::default();
        assert!((move_speed_scalar(&caps) - 1.0).abs() < 0.001);
        assert!((work_speed_scalar(&caps) - 1.0).abs() < 0.001);
    }

    #[test]
    fn test_pain_slows_work_more_than_movement() {
        let caps = Capacities {
            pain: 1.0,
            ..Default::default()
        };
        assert!(work_speed_scalar(&caps) < move_speed_scalar(&caps));
    }

    #[test]
    fn test_move_speed_floor() {
        let caps = Capacities {
            consciousness: 0.2,
            mobility: 0.1,
            pain: 1.0,
            ..Default::default()
        };
        assert!(move_speed_scalar(&caps) >= 0.05);
    }

    #[test]
    fn test_incapacitated() {
        let caps = Capacities {
            consciousness: 0.05,
            ..Default::default()
        };
        assert!(caps.is_incapacitated());
        assert!(!Capacities::default().is_incapacitated());
    }
}
