use serde::{Deserialize, Serialize};

use crate::{CityId, Hex, UnitId, UnitKind};

/// All player actions the simulation accepts. Fully serializable.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Command {
    MoveUnit { unit: UnitId, target: Hex },
    Attack { attacker: UnitId, defender: UnitId },
    StartProduction { city: CityId, kind: UnitKind },
    EndTurn,
}
