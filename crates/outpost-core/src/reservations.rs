//! Work-target reservations.
//!
//! An exclusive claim on a world resource (build site, tree, rock)
//! preventing double-assignment. Reserve and release are invoked only
//! from the scheduler's transition routine so there is one choke point
//! for the "release before reassigning" discipline.

use hecs::Entity;
use std::collections::HashMap;

/// Reservation table: target → holding actor, plus the reverse index.
#[derive(Debug, Default)]
pub struct ReservationLedger {
    by_target: HashMap<Entity, Entity>,
    by_actor: HashMap<Entity, Entity>,
}

impl ReservationLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `target` for `actor`. Fails if another actor already holds
    /// it. Re-reserving one's own target succeeds. An actor switching
    /// targets implicitly releases its old one first.
    pub fn reserve(&mut self, target: Entity, actor: Entity) -> bool {
        match self.by_target.get(&target) {
            Some(&holder) if holder != actor => false,
            _ => {
                self.release(actor);
                self.by_target.insert(target, actor);
                self.by_actor.insert(actor, target);
                true
            }
        }
    }

    /// Drop whatever `actor` holds. Idempotent: releasing with nothing
    /// held is a no-op.
    pub fn release(&mut self, actor: Entity) {
        if let Some(target) = self.by_actor.remove(&actor) {
            self.by_target.remove(&target);
        }
    }

    /// Who holds `target`, if anyone.
    pub fn holder(&self, target: Entity) -> Option<Entity> {
        self.by_target.get(&target).copied()
    }

    /// What `actor` currently holds, if anything.
    pub fn held_by(&self, actor: Entity) -> Option<Entity> {
        self.by_actor.get(&actor).copied()
    }

    pub fn is_reserved(&self, target: Entity) -> bool {
        self.by_target.contains_key(&target)
    }

    pub fn len(&self) -> usize {
        self.by_target.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_target.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hecs::World;

    fn entities(n: usize) -> Vec<Entity> {
        let mut world = World::new();
        (0..n).map(|_| world.spawn(())).collect()
    }

    #[test]
    fn test_reserve_is_exclusive() {
        let e = entities(3);
        let mut ledger = ReservationLedger::new();

        assert!(ledger.reserve(e[0], e[1]));
        assert!(!ledger.reserve(e[0], e[2]));
        assert_eq!(ledger.holder(e[0]), Some(e[1]));
    }

    #[test]
    fn test_release_idempotent() {
        let e = entities(2);
        let mut ledger = ReservationLedger::new();

        ledger.reserve(e[0], e[1]);
        ledger.release(e[1]);
        assert!(ledger.is_empty());

        // Double release must not corrupt the table.
        ledger.release(e[1]);
        assert!(ledger.is_empty());
        assert_eq!(ledger.holder(e[0]), None);
    }

    #[test]
    fn test_switching_targets_releases_old() {
        let e = entities(3);
        let mut ledger = ReservationLedger::new();

        ledger.reserve(e[0], e[2]);
        ledger.reserve(e[1], e[2]);

        assert_eq!(ledger.len(), 1);
        assert!(!ledger.is_reserved(e[0]));
        assert_eq!(ledger.holder(e[1]), Some(e[2]));
    }

    #[test]
    fn test_re_reserving_own_target() {
        let e = entities(2);
        let mut ledger = ReservationLedger::new();

        assert!(ledger.reserve(e[0], e[1]));
        assert!(ledger.reserve(e[0], e[1]));
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn test_freed_target_reservable() {
        let e = entities(3);
        let mut ledger = ReservationLedger::new();

        ledger.reserve(e[0], e[1]);
        ledger.release(e[1]);
        assert!(ledger.reserve(e[0], e[2]));
    }
}
