//! Scripted opponent.
//!
//! Keeps every owned city busy with a random build, then walks each unit toward the closest
//! enemy unit and attacks once it is in range. All actions go through the same validated paths
//! a human player uses; rejected actions are skipped.

use conquest_protocol::{Event, Hex, PlayerId, UnitId, UnitKind};
use rand::seq::SliceRandom;
use tracing::debug;

use crate::game::GameEngine;

/// Unit kinds the scripted opponent picks from when a city is idle.
pub const OPPONENT_BUILD_OPTIONS: [UnitKind; 3] =
    [UnitKind::Infantry, UnitKind::Tank, UnitKind::Fighter];

impl GameEngine {
    pub(crate) fn run_scripted_turn(&mut self, player: PlayerId) -> Vec<Event> {
        let mut events = Vec::new();

        let idle_cities = self
            .state()
            .cities
            .iter_ordered()
            .filter_map(|(id, c)| {
                (c.owner == Some(player) && c.current_production.is_none()).then_some(id)
            })
            .collect::<Vec<_>>();
        for city_id in idle_cities {
            let Some(&kind) = OPPONENT_BUILD_OPTIONS.choose(&mut self.rng) else {
                continue;
            };
            if let Ok(mut ev) = self.start_production_as(player, city_id, kind) {
                events.append(&mut ev);
            }
        }

        for unit_id in self.state().units_owned_by(player) {
            let Some(unit) = self.unit(unit_id) else {
                continue;
            };
            let (position, range) = (unit.position, unit.stats().range);
            let (can_attack, can_move) = (unit.can_attack(), unit.can_move());

            let Some((target, distance)) = self.ai_closest_enemy(position, player) else {
                continue;
            };

            if distance <= range && can_attack {
                match self.attack_as(player, unit_id, target) {
                    Ok(mut ev) => events.append(&mut ev),
                    Err(err) => debug!(unit = %unit_id, %err, "opponent attack skipped"),
                }
            } else if can_move {
                let Some(step) = self.ai_step_toward(unit_id, distance, target) else {
                    continue;
                };
                match self.move_unit_as(player, unit_id, step) {
                    Ok(mut ev) => events.append(&mut ev),
                    Err(err) => debug!(unit = %unit_id, %err, "opponent move skipped"),
                }
            }
        }

        events
    }

    /// Closest enemy unit to `from`; ties go to the lowest id.
    fn ai_closest_enemy(&self, from: Hex, player: PlayerId) -> Option<(UnitId, i32)> {
        self.state()
            .units
            .iter_ordered()
            .filter(|(_, u)| u.owner != player)
            .map(|(id, u)| (id, from.distance(u.position)))
            .min_by_key(|&(_, distance)| distance)
    }

    /// A random free, enterable neighbour that is strictly closer to `target`.
    fn ai_step_toward(&mut self, unit_id: UnitId, current: i32, target: UnitId) -> Option<Hex> {
        let unit = self.unit(unit_id)?;
        let goal = self.unit(target)?.position;
        let map = self.map();

        let candidates = unit
            .position
            .neighbors()
            .filter(|&hex| {
                map.unit_at(hex).is_none()
                    && map.is_passable(hex, unit.kind)
                    && hex.distance(goal) < current
            })
            .collect::<Vec<_>>();

        candidates.choose(&mut self.rng).copied()
    }
}
