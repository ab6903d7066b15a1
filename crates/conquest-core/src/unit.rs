use conquest_protocol::{Hex, PlayerId, UnitId, UnitKind, UnitSnapshot, UnitStats};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Unit {
    pub id: UnitId,
    pub kind: UnitKind,
    pub owner: PlayerId,
    pub position: Hex,
    pub health: i32,
    pub movement_remaining: i32,
    pub has_attacked: bool,
}

impl Unit {
    /// A fresh unit at full health with a full movement budget.
    pub fn new(id: UnitId, kind: UnitKind, owner: PlayerId, position: Hex) -> Self {
        let stats = kind.stats();
        Self {
            id,
            kind,
            owner,
            position,
            health: stats.max_health,
            movement_remaining: stats.movement,
            has_attacked: false,
        }
    }

    pub fn stats(&self) -> UnitStats {
        self.kind.stats()
    }

    /// Restore movement and clear the attack flag at the start of the owner's turn.
    pub fn reset_turn(&mut self) {
        self.movement_remaining = self.stats().movement;
        self.has_attacked = false;
    }

    pub fn can_move(&self) -> bool {
        self.movement_remaining > 0
    }

    pub fn can_attack(&self) -> bool {
        !self.has_attacked && self.health > 0
    }

    pub fn is_destroyed(&self) -> bool {
        self.health <= 0
    }

    pub fn snapshot(&self) -> UnitSnapshot {
        UnitSnapshot {
            id: self.id,
            kind: self.kind,
            owner: self.owner,
            position: self.position,
            health: self.health,
            movement_remaining: self.movement_remaining,
            has_attacked: self.has_attacked,
            stats: self.stats().into(),
        }
    }

    /// Restore a unit from a snapshot, clamping counters into their valid ranges.
    pub fn from_snapshot(snap: &UnitSnapshot) -> Self {
        let stats = snap.kind.stats();
        Self {
            id: snap.id,
            kind: snap.kind,
            owner: snap.owner,
            position: snap.position,
            health: snap.health.clamp(0, stats.max_health),
            movement_remaining: snap.movement_remaining.clamp(0, stats.movement),
            has_attacked: snap.has_attacked,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tank() -> Unit {
        Unit::new(UnitId(1), UnitKind::Tank, PlayerId::Player1, Hex::new(0, 0))
    }

    #[test]
    fn new_unit_starts_full() {
        let unit = tank();
        assert_eq!(unit.health, 15);
        assert_eq!(unit.movement_remaining, 3);
        assert!(unit.can_move());
        assert!(unit.can_attack());
    }

    #[test]
    fn reset_turn_is_idempotent() {
        let mut unit = tank();
        unit.movement_remaining = 0;
        unit.has_attacked = true;

        unit.reset_turn();
        let once = unit.clone();
        unit.reset_turn();
        assert_eq!(unit, once);
        assert_eq!(unit.movement_remaining, 3);
        assert!(!unit.has_attacked);
    }

    #[test]
    fn exhausted_or_dead_units_cannot_act() {
        let mut unit = tank();
        unit.movement_remaining = 0;
        assert!(!unit.can_move());

        unit.has_attacked = true;
        assert!(!unit.can_attack());

        unit.has_attacked = false;
        unit.health = 0;
        assert!(!unit.can_attack());
    }

    #[test]
    fn snapshot_restore_clamps_out_of_range_values() {
        let mut snap = tank().snapshot();
        snap.health = 99;
        snap.movement_remaining = -4;
        let unit = Unit::from_snapshot(&snap);
        assert_eq!(unit.health, 15);
        assert_eq!(unit.movement_remaining, 0);
    }
}
