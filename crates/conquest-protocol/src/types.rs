use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The two sides of a game. Player1 is the human seat, Player2 the scripted opponent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayerId {
    Player1,
    Player2,
}

impl PlayerId {
    pub const ALL: [PlayerId; 2] = [PlayerId::Player1, PlayerId::Player2];

    pub const fn opponent(self) -> PlayerId {
        match self {
            PlayerId::Player1 => PlayerId::Player2,
            PlayerId::Player2 => PlayerId::Player1,
        }
    }

    /// Short tag used in generated city names.
    pub const fn tag(self) -> &'static str {
        match self {
            PlayerId::Player1 => "P1",
            PlayerId::Player2 => "P2",
        }
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlayerId::Player1 => f.write_str("player1"),
            PlayerId::Player2 => f.write_str("player2"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Terrain {
    Water,
    #[default]
    Land,
    Forest,
    Mountain,
}

impl Terrain {
    /// Defense bonus granted to a unit standing on this terrain.
    pub const fn defense_bonus(self) -> i32 {
        match self {
            Terrain::Forest => 1,
            Terrain::Mountain => 2,
            Terrain::Land | Terrain::Water => 0,
        }
    }
}

/// How a unit kind interacts with terrain.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MovementClass {
    Ground,
    Naval,
    Air,
}

impl MovementClass {
    pub const fn can_enter(self, terrain: Terrain) -> bool {
        match self {
            MovementClass::Air => true,
            MovementClass::Naval => matches!(terrain, Terrain::Water),
            MovementClass::Ground => !matches!(terrain, Terrain::Water),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitKind {
    Infantry,
    Tank,
    Fighter,
    Bomber,
    Transport,
    Destroyer,
}

/// Static per-kind combat and movement stats.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UnitStats {
    pub name: &'static str,
    pub movement: i32,
    pub attack: i32,
    pub defense: i32,
    pub range: i32,
    pub cost: i32,
    pub max_health: i32,
    pub can_capture: bool,
}

impl UnitKind {
    pub const ALL: [UnitKind; 6] = [
        UnitKind::Infantry,
        UnitKind::Tank,
        UnitKind::Fighter,
        UnitKind::Bomber,
        UnitKind::Transport,
        UnitKind::Destroyer,
    ];

    pub const fn stats(self) -> UnitStats {
        match self {
            UnitKind::Infantry => INFANTRY,
            UnitKind::Tank => TANK,
            UnitKind::Fighter => FIGHTER,
            UnitKind::Bomber => BOMBER,
            UnitKind::Transport => TRANSPORT,
            UnitKind::Destroyer => DESTROYER,
        }
    }

    pub const fn movement_class(self) -> MovementClass {
        match self {
            UnitKind::Infantry | UnitKind::Tank => MovementClass::Ground,
            UnitKind::Transport | UnitKind::Destroyer => MovementClass::Naval,
            UnitKind::Fighter | UnitKind::Bomber => MovementClass::Air,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            UnitKind::Infantry => "infantry",
            UnitKind::Tank => "tank",
            UnitKind::Fighter => "fighter",
            UnitKind::Bomber => "bomber",
            UnitKind::Transport => "transport",
            UnitKind::Destroyer => "destroyer",
        }
    }
}

impl fmt::Display for UnitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid unit type: {0}")]
pub struct ParseUnitKindError(pub String);

impl FromStr for UnitKind {
    type Err = ParseUnitKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        UnitKind::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ParseUnitKindError(s.to_string()))
    }
}

/// Per-player resource pools.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resources {
    pub player1: i32,
    pub player2: i32,
}

impl Resources {
    pub const fn uniform(amount: i32) -> Self {
        Self {
            player1: amount,
            player2: amount,
        }
    }

    pub fn get(&self, player: PlayerId) -> i32 {
        match player {
            PlayerId::Player1 => self.player1,
            PlayerId::Player2 => self.player2,
        }
    }

    pub fn add(&mut self, player: PlayerId, amount: i32) -> i32 {
        let pool = match player {
            PlayerId::Player1 => &mut self.player1,
            PlayerId::Player2 => &mut self.player2,
        };
        *pool = pool.saturating_add(amount);
        *pool
    }
}

const INFANTRY: UnitStats = UnitStats {
    name: "Infantry",
    movement: 2,
    attack: 3,
    defense: 4,
    range: 1,
    cost: 50,
    max_health: 10,
    can_capture: true,
};

const TANK: UnitStats = UnitStats {
    name: "Tank",
    movement: 3,
    attack: 8,
    defense: 6,
    range: 1,
    cost: 100,
    max_health: 15,
    can_capture: false,
};

const FIGHTER: UnitStats = UnitStats {
    name: "Fighter",
    movement: 6,
    attack: 6,
    defense: 4,
    range: 1,
    cost: 80,
    max_health: 8,
    can_capture: false,
};

const BOMBER: UnitStats = UnitStats {
    name: "Bomber",
    movement: 5,
    attack: 10,
    defense: 2,
    range: 1,
    cost: 120,
    max_health: 10,
    can_capture: false,
};

const TRANSPORT: UnitStats = UnitStats {
    name: "Transport",
    movement: 4,
    attack: 0,
    defense: 3,
    range: 0,
    cost: 70,
    max_health: 12,
    can_capture: false,
};

const DESTROYER: UnitStats = UnitStats {
    name: "Destroyer",
    movement: 4,
    attack: 7,
    defense: 5,
    range: 2,
    cost: 90,
    max_health: 12,
    can_capture: false,
};
