//! Shared vocabulary for Strategic Conquest: hex coordinates, closed game enumerations,
//! typed ids, commands, events, and the full-state snapshot with its wire encodings.

mod command;
mod event;
mod hex;
mod ids;
mod snapshot;
mod types;
pub mod wire;

pub use crate::command::*;
pub use crate::event::*;
pub use crate::hex::*;
pub use crate::ids::*;
pub use crate::snapshot::*;
pub use crate::types::*;
