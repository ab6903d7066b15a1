use std::fmt;

use serde::{Deserialize, Serialize};

/// Stable handle for a unit. Ids are never reused within a game.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UnitId(pub u32);

/// Stable handle for a city.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CityId(pub u32);

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unit_{}", self.0)
    }
}

impl fmt::Display for CityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "city_{}", self.0)
    }
}

/// Raw numeric access shared by the id newtypes, used by id-keyed storage.
pub trait RawId: Copy + Ord {
    fn from_raw(raw: u32) -> Self;
    fn raw(self) -> u32;
}

impl RawId for UnitId {
    #[inline]
    fn from_raw(raw: u32) -> Self {
        UnitId(raw)
    }

    #[inline]
    fn raw(self) -> u32 {
        self.0
    }
}

impl RawId for CityId {
    #[inline]
    fn from_raw(raw: u32) -> Self {
        CityId(raw)
    }

    #[inline]
    fn raw(self) -> u32 {
        self.0
    }
}
