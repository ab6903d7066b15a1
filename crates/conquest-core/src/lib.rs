mod ai;
mod city;
mod combat;
mod entities;
mod game;
mod map;
pub mod mapgen;
mod unit;

pub use crate::ai::OPPONENT_BUILD_OPTIONS;
pub use crate::city::*;
pub use crate::combat::*;
pub use crate::entities::*;
pub use crate::game::*;
pub use crate::map::*;
pub use crate::mapgen::{generate_map, MapGenConfig};
pub use crate::unit::*;
