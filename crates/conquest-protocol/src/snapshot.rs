use serde::{Deserialize, Serialize};

use crate::{CityId, Hex, PlayerId, Resources, Terrain, UnitId, UnitKind, UnitStats};

/// Full game state for display, save files, and session resume.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub turn: u32,
    pub current_player: PlayerId,
    pub map: MapSnapshot,
    pub units: Vec<UnitSnapshot>,
    pub cities: Vec<CitySnapshot>,
    pub resources: Resources,
    pub game_over: bool,
    #[serde(default)]
    pub winner: Option<PlayerId>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MapSnapshot {
    pub width: u32,
    pub height: u32,
    pub tiles: Vec<TileSnapshot>, // generation order
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TileSnapshot {
    pub hex: Hex,
    pub terrain: Terrain,
    #[serde(default)]
    pub unit: Option<UnitId>,
    #[serde(default)]
    pub city: Option<CityId>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UnitSnapshot {
    pub id: UnitId,
    #[serde(rename = "type")]
    pub kind: UnitKind,
    pub owner: PlayerId,
    pub position: Hex,
    pub health: i32,
    pub movement_remaining: i32,
    #[serde(default)]
    pub has_attacked: bool,
    /// Informational copy of the kind's static stats; ignored on load.
    #[serde(default)]
    pub stats: UnitStatsSnapshot,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitStatsSnapshot {
    pub name: String,
    pub movement: i32,
    pub attack: i32,
    pub defense: i32,
    pub range: i32,
    pub cost: i32,
    pub max_health: i32,
    pub can_capture: bool,
}

impl From<UnitStats> for UnitStatsSnapshot {
    fn from(stats: UnitStats) -> Self {
        Self {
            name: stats.name.to_string(),
            movement: stats.movement,
            attack: stats.attack,
            defense: stats.defense,
            range: stats.range,
            cost: stats.cost,
            max_health: stats.max_health,
            can_capture: stats.can_capture,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CitySnapshot {
    pub id: CityId,
    pub name: String,
    pub position: Hex,
    pub owner: Option<PlayerId>,
    pub production_capacity: i32,
    #[serde(default)]
    pub current_production: Option<UnitKind>,
    #[serde(default)]
    pub production_progress: i32,
}

impl Snapshot {
    pub fn unit(&self, id: UnitId) -> Option<&UnitSnapshot> {
        self.units.iter().find(|u| u.id == id)
    }

    pub fn city(&self, id: CityId) -> Option<&CitySnapshot> {
        self.cities.iter().find(|c| c.id == id)
    }

    pub fn cities_owned_by(&self, player: PlayerId) -> usize {
        self.cities
            .iter()
            .filter(|c| c.owner == Some(player))
            .count()
    }
}
