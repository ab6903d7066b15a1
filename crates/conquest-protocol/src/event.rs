use serde::{Deserialize, Serialize};

use crate::{CityId, Hex, PlayerId, UnitId, UnitKind};

/// Outcome of one resolved attack.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatReport {
    pub attacker: UnitId,
    pub defender: UnitId,
    pub attack_roll: i32,
    pub defense_roll: i32,
    pub damage_to_defender: i32,
    pub damage_to_attacker: i32,
    pub attacker_health: i32,
    pub defender_health: i32,
    pub defender_destroyed: bool,
    pub attacker_survived: bool,
}

/// All sim→client events. Fully serializable.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    // Game flow
    TurnStarted {
        turn: u32,
        player: PlayerId,
    },
    ResourcesGranted {
        player: PlayerId,
        amount: i32,
        total: i32,
    },
    GameOver {
        winner: PlayerId,
    },

    // Units
    UnitMoved {
        unit: UnitId,
        from: Hex,
        to: Hex,
        movement_remaining: i32,
    },
    CombatResolved {
        report: CombatReport,
    },
    UnitDestroyed {
        unit: UnitId,
        owner: PlayerId,
        at: Hex,
    },

    // Cities
    CityCaptured {
        city: CityId,
        name: String,
        previous_owner: Option<PlayerId>,
        new_owner: PlayerId,
    },
    ProductionStarted {
        city: CityId,
        kind: UnitKind,
    },
    UnitProduced {
        city: CityId,
        unit: UnitId,
        kind: UnitKind,
        at: Hex,
    },
    /// Production completed but no free neighbouring tile could take the unit.
    ProductionLost {
        city: CityId,
        kind: UnitKind,
    },
}
