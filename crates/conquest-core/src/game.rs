use conquest_protocol::{
    CityId, Command, Event, Hex, PlayerId, Resources, Snapshot, Terrain, UnitId, UnitKind,
};
use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::{
    city::City,
    combat::{check_attack, resolve_combat, AttackDenied},
    entities::EntityStore,
    map::GameMap,
    mapgen::{generate_map, MapGenConfig},
    unit::Unit,
};

/// Rejected player action. Nothing is mutated when one of these is returned.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum GameError {
    #[error("Unit not found")]
    UnknownUnit,
    #[error("City not found")]
    UnknownCity,
    #[error("Not your unit")]
    NotYourUnit,
    #[error("Not your city")]
    NotYourCity,
    #[error("No movement remaining")]
    NoMovement,
    #[error("Target too far")]
    TooFar { distance: i32, movement_remaining: i32 },
    #[error("Cannot move there")]
    Impassable,
    #[error("Hex occupied")]
    Occupied,
    #[error(transparent)]
    Attack(#[from] AttackDenied),
}

/// Broad category of a [`GameError`], for callers that map failures onto responses.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Authorization,
    IllegalAction,
}

impl GameError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            GameError::UnknownUnit | GameError::UnknownCity => ErrorKind::NotFound,
            GameError::NotYourUnit | GameError::NotYourCity => ErrorKind::Authorization,
            GameError::NoMovement
            | GameError::TooFar { .. }
            | GameError::Impassable
            | GameError::Occupied
            | GameError::Attack(_) => ErrorKind::IllegalAction,
        }
    }
}

/// A snapshot that cannot be turned back into a consistent game.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum SnapshotError {
    #[error("turn counter must start at 1")]
    InvalidTurn,
    #[error("game over without a winner")]
    MissingWinner,
    #[error("duplicate tile at {0}")]
    DuplicateTile(Hex),
    #[error("duplicate unit id {0}")]
    DuplicateUnit(UnitId),
    #[error("duplicate city id {0}")]
    DuplicateCity(CityId),
    #[error("{0} has no health left")]
    DeadUnit(UnitId),
    #[error("{id} is off the map at {at}")]
    UnitOffMap { id: UnitId, at: Hex },
    #[error("{id} is off the map at {at}")]
    CityOffMap { id: CityId, at: Hex },
    #[error("{at} holds more than one unit")]
    StackedUnits { at: Hex },
    #[error("{at} holds more than one city")]
    StackedCities { at: Hex },
}

/// Game rules that are tunable per session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub starting_resources: i32,
    pub city_production_capacity: i32,
    pub cities_per_player: usize,
    pub starting_infantry_per_city: usize,
    /// Resources granted per owned city when a player ends their turn.
    pub income_per_city: i32,
    pub mapgen: MapGenConfig,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            starting_resources: 200,
            city_production_capacity: 10,
            cities_per_player: 2,
            starting_infantry_per_city: 2,
            income_per_city: 10,
            mapgen: MapGenConfig::default(),
        }
    }
}

/// Everything that makes up one game in progress.
#[derive(Clone, Debug)]
pub struct GameState {
    pub turn: u32,
    pub current_player: PlayerId,
    pub map: GameMap,
    pub units: EntityStore<UnitId, Unit>,
    pub cities: EntityStore<CityId, City>,
    pub resources: Resources,
    pub game_over: bool,
    pub winner: Option<PlayerId>,
}

impl GameState {
    pub fn cities_owned_by(&self, player: PlayerId) -> usize {
        self.cities
            .values()
            .filter(|c| c.owner == Some(player))
            .count()
    }

    pub fn units_owned_by(&self, player: PlayerId) -> Vec<UnitId> {
        self.units
            .iter_ordered()
            .filter(|(_, u)| u.owner == player)
            .map(|(id, _)| id)
            .collect()
    }
}

/// Owns one game and applies validated actions to it.
///
/// Player1 is driven through the public action methods; Player2 is the scripted opponent and
/// acts inside [`GameEngine::end_turn`].
#[derive(Debug)]
pub struct GameEngine {
    state: GameState,
    config: GameConfig,
    pub(crate) rng: StdRng,
}

impl GameEngine {
    /// Start a new game on a freshly generated map, using entropy-seeded randomness.
    pub fn new_game(width: u32, height: u32, config: GameConfig) -> Self {
        Self::new_game_with_rng(width, height, config, StdRng::from_entropy())
    }

    pub fn new_game_with_rng(width: u32, height: u32, config: GameConfig, mut rng: StdRng) -> Self {
        let map = generate_map(width, height, &config.mapgen, &mut rng);
        let mut engine = Self::with_map(map, config, rng);
        engine.place_starting_cities();
        engine.place_starting_units();

        info!(
            width,
            height,
            cities = engine.state.cities.len(),
            units = engine.state.units.len(),
            "new game started"
        );
        engine
    }

    /// An empty game (no units, no cities) on the given map. Turn 1, Player1 to act.
    pub fn with_map(map: GameMap, config: GameConfig, rng: StdRng) -> Self {
        let resources = Resources::uniform(config.starting_resources);
        Self {
            state: GameState {
                turn: 1,
                current_player: PlayerId::Player1,
                map,
                units: EntityStore::default(),
                cities: EntityStore::default(),
                resources,
                game_over: false,
                winner: None,
            },
            config,
            rng,
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn map(&self) -> &GameMap {
        &self.state.map
    }

    pub fn turn(&self) -> u32 {
        self.state.turn
    }

    pub fn current_player(&self) -> PlayerId {
        self.state.current_player
    }

    pub fn unit(&self, id: UnitId) -> Option<&Unit> {
        self.state.units.get(id)
    }

    pub fn city(&self, id: CityId) -> Option<&City> {
        self.state.cities.get(id)
    }

    pub fn is_game_over(&self) -> bool {
        self.state.game_over
    }

    pub fn winner(&self) -> Option<PlayerId> {
        self.state.winner
    }

    /// Create a unit on `at` if the tile exists and holds no unit.
    pub fn spawn_unit(&mut self, kind: UnitKind, owner: PlayerId, at: Hex) -> Option<UnitId> {
        let tile = self.state.map.get(at)?;
        if tile.unit.is_some() {
            return None;
        }

        let id = self
            .state
            .units
            .insert_with(|id| Unit::new(id, kind, owner, at));
        if let Some(tile) = self.state.map.get_mut(at) {
            tile.unit = Some(id);
        }
        Some(id)
    }

    /// Create a city on `at` if the tile exists and holds no city.
    pub fn found_city(
        &mut self,
        name: impl Into<String>,
        at: Hex,
        owner: Option<PlayerId>,
    ) -> Option<CityId> {
        let tile = self.state.map.get(at)?;
        if tile.city.is_some() {
            return None;
        }

        let name = name.into();
        let capacity = self.config.city_production_capacity;
        let id = self
            .state
            .cities
            .insert_with(|id| City::new(id, name, at, owner, capacity));
        if let Some(tile) = self.state.map.get_mut(at) {
            tile.city = Some(id);
        }
        Some(id)
    }

    fn place_starting_cities(&mut self) {
        let mut sites: Vec<Hex> = self
            .state
            .map
            .tiles()
            .iter()
            .filter(|t| t.terrain == Terrain::Land)
            .map(|t| t.hex)
            .collect();
        if sites.len() < 4 {
            sites = self.state.map.hexes().take(4).collect();
        }
        sites.shuffle(&mut self.rng);

        // Player1 settles from the front of the shuffled list, Player2 from the back.
        let per_player = self.config.cities_per_player;
        for (i, &site) in sites.iter().take(per_player).enumerate() {
            let name = format!("City-{}-{}", PlayerId::Player1.tag(), i + 1);
            self.found_city(name, site, Some(PlayerId::Player1));
        }
        for (i, &site) in sites.iter().rev().take(per_player).enumerate() {
            let name = format!("City-{}-{}", PlayerId::Player2.tag(), i + 1);
            self.found_city(name, site, Some(PlayerId::Player2));
        }
    }

    fn place_starting_units(&mut self) {
        let garrisons: Vec<(Hex, PlayerId)> = self
            .state
            .cities
            .values()
            .filter_map(|c| c.owner.map(|owner| (c.position, owner)))
            .collect();

        for (center, owner) in garrisons {
            let mut placed = 0;
            for hex in center.neighbors() {
                if placed >= self.config.starting_infantry_per_city {
                    break;
                }
                let free_land = self
                    .state
                    .map
                    .get(hex)
                    .is_some_and(|t| t.terrain != Terrain::Water && t.unit.is_none());
                if free_land && self.spawn_unit(UnitKind::Infantry, owner, hex).is_some() {
                    placed += 1;
                }
            }
        }
    }

    /// Apply a command on behalf of the current player.
    pub fn apply_command(&mut self, command: Command) -> Result<Vec<Event>, GameError> {
        match command {
            Command::MoveUnit { unit, target } => self.move_unit(unit, target),
            Command::Attack { attacker, defender } => self.attack(attacker, defender),
            Command::StartProduction { city, kind } => self.start_production(city, kind),
            Command::EndTurn => Ok(self.end_turn()),
        }
    }

    pub fn move_unit(&mut self, unit_id: UnitId, target: Hex) -> Result<Vec<Event>, GameError> {
        self.move_unit_as(self.state.current_player, unit_id, target)
    }

    pub fn attack(
        &mut self,
        attacker_id: UnitId,
        defender_id: UnitId,
    ) -> Result<Vec<Event>, GameError> {
        self.attack_as(self.state.current_player, attacker_id, defender_id)
    }

    pub fn start_production(
        &mut self,
        city_id: CityId,
        kind: UnitKind,
    ) -> Result<Vec<Event>, GameError> {
        self.start_production_as(self.state.current_player, city_id, kind)
    }

    pub(crate) fn move_unit_as(
        &mut self,
        actor: PlayerId,
        unit_id: UnitId,
        target: Hex,
    ) -> Result<Vec<Event>, GameError> {
        let unit = self
            .state
            .units
            .get(unit_id)
            .ok_or(GameError::UnknownUnit)?;
        if unit.owner != actor {
            return Err(GameError::NotYourUnit);
        }
        if !unit.can_move() {
            return Err(GameError::NoMovement);
        }
        if !self.state.map.contains(target) {
            return Err(GameError::Impassable);
        }

        let distance = unit.position.distance(target);
        if distance > unit.movement_remaining {
            return Err(GameError::TooFar {
                distance,
                movement_remaining: unit.movement_remaining,
            });
        }
        if !self.state.map.is_passable(target, unit.kind) {
            return Err(GameError::Impassable);
        }
        if let Some(occupant) = self.state.map.unit_at(target) {
            if occupant != unit_id {
                return Err(GameError::Occupied);
            }
        }

        let (from, kind, owner) = (unit.position, unit.kind, unit.owner);

        if let Some(tile) = self.state.map.get_mut(from) {
            tile.unit = None;
        }
        let movement_remaining = {
            let unit = self
                .state
                .units
                .get_mut(unit_id)
                .ok_or(GameError::UnknownUnit)?;
            unit.position = target;
            unit.movement_remaining -= distance;
            unit.movement_remaining
        };
        if let Some(tile) = self.state.map.get_mut(target) {
            tile.unit = Some(unit_id);
        }

        debug!(unit = %unit_id, %from, to = %target, movement_remaining, "unit moved");
        let mut events = vec![Event::UnitMoved {
            unit: unit_id,
            from,
            to: target,
            movement_remaining,
        }];

        if kind.stats().can_capture {
            if let Some(city) = self
                .state
                .map
                .city_at(target)
                .and_then(|id| self.state.cities.get_mut(id))
            {
                if city.owner != Some(owner) {
                    let previous_owner = city.owner.replace(owner);
                    info!(city = %city.id, name = %city.name, new_owner = %owner, "city captured");
                    events.push(Event::CityCaptured {
                        city: city.id,
                        name: city.name.clone(),
                        previous_owner,
                        new_owner: owner,
                    });
                }
            }
        }

        Ok(events)
    }

    pub(crate) fn attack_as(
        &mut self,
        actor: PlayerId,
        attacker_id: UnitId,
        defender_id: UnitId,
    ) -> Result<Vec<Event>, GameError> {
        let attacker = self
            .state
            .units
            .get(attacker_id)
            .ok_or(GameError::UnknownUnit)?;
        let defender = self
            .state
            .units
            .get(defender_id)
            .ok_or(GameError::UnknownUnit)?;
        if attacker.owner != actor {
            return Err(GameError::NotYourUnit);
        }

        let distance = attacker.position.distance(defender.position);
        check_attack(attacker, defender, distance)?;

        let terrain_modifier = self.state.map.defense_modifier(defender.position);
        let report = {
            let (attacker, defender) = self
                .state
                .units
                .get2_mut(attacker_id, defender_id)
                .ok_or(GameError::UnknownUnit)?;
            resolve_combat(attacker, defender, terrain_modifier, &mut self.rng)
        };

        let mut events = vec![Event::CombatResolved { report }];
        for id in [defender_id, attacker_id] {
            if let Some(event) = self.remove_if_destroyed(id) {
                events.push(event);
            }
        }
        Ok(events)
    }

    fn remove_if_destroyed(&mut self, id: UnitId) -> Option<Event> {
        if !self.state.units.get(id)?.is_destroyed() {
            return None;
        }
        let unit = self.state.units.remove(id)?;
        if let Some(tile) = self.state.map.get_mut(unit.position) {
            if tile.unit == Some(id) {
                tile.unit = None;
            }
        }
        debug!(unit = %id, owner = %unit.owner, at = %unit.position, "unit destroyed");
        Some(Event::UnitDestroyed {
            unit: id,
            owner: unit.owner,
            at: unit.position,
        })
    }

    pub(crate) fn start_production_as(
        &mut self,
        actor: PlayerId,
        city_id: CityId,
        kind: UnitKind,
    ) -> Result<Vec<Event>, GameError> {
        let city = self
            .state
            .cities
            .get_mut(city_id)
            .ok_or(GameError::UnknownCity)?;
        if city.owner != Some(actor) {
            return Err(GameError::NotYourCity);
        }

        city.start_production(kind);
        debug!(city = %city_id, %kind, "production started");
        Ok(vec![Event::ProductionStarted { city: city_id, kind }])
    }

    /// End the current player's turn.
    ///
    /// Only the ending player's cities produce and pay income. When Player1 ends, the scripted
    /// Player2 actions run in between with no bookkeeping of their own, so Player2 units keep
    /// whatever movement they have left and control is back with Player1 afterwards.
    pub fn end_turn(&mut self) -> Vec<Event> {
        let ending = self.state.current_player;
        let mut events = self.finish_turn_for(ending);

        match ending {
            PlayerId::Player1 => {
                self.state.current_player = PlayerId::Player2;
                events.extend(self.run_scripted_turn(PlayerId::Player2));
                self.state.turn += 1;
                self.begin_turn_for(PlayerId::Player1, &mut events);
            }
            PlayerId::Player2 => {
                self.state.turn += 1;
                self.begin_turn_for(PlayerId::Player1, &mut events);
            }
        }

        events.extend(self.check_victory());
        events
    }

    /// End-of-turn bookkeeping for `player`: city production, then income.
    fn finish_turn_for(&mut self, player: PlayerId) -> Vec<Event> {
        let mut events = Vec::new();

        for city_id in self.state.cities.ids() {
            let Some(city) = self.state.cities.get_mut(city_id) else {
                continue;
            };
            if city.owner != Some(player) {
                continue;
            }
            let Some(kind) = city.advance_production() else {
                continue;
            };
            let center = city.position;
            events.push(self.deploy_produced_unit(city_id, center, kind, player));
        }

        let owned = self.state.cities_owned_by(player) as i32;
        let amount = owned.saturating_mul(self.config.income_per_city);
        let total = self.state.resources.add(player, amount);
        events.push(Event::ResourcesGranted {
            player,
            amount,
            total,
        });

        events
    }

    /// Place a finished unit on the first free, passable neighbour of its city.
    fn deploy_produced_unit(
        &mut self,
        city: CityId,
        center: Hex,
        kind: UnitKind,
        owner: PlayerId,
    ) -> Event {
        let spot = center.neighbors().find(|&hex| {
            self.state.map.unit_at(hex).is_none() && self.state.map.is_passable(hex, kind)
        });

        match spot.and_then(|at| self.spawn_unit(kind, owner, at).map(|unit| (unit, at))) {
            Some((unit, at)) => {
                debug!(city = %city, unit = %unit, %kind, %at, "unit produced");
                Event::UnitProduced {
                    city,
                    unit,
                    kind,
                    at,
                }
            }
            None => {
                debug!(city = %city, %kind, "no room to deploy produced unit");
                Event::ProductionLost { city, kind }
            }
        }
    }

    fn begin_turn_for(&mut self, player: PlayerId, events: &mut Vec<Event>) {
        self.state.current_player = player;
        for (_, unit) in self.state.units.iter_ordered_mut() {
            if unit.owner == player {
                unit.reset_turn();
            }
        }
        events.push(Event::TurnStarted {
            turn: self.state.turn,
            player,
        });
    }

    /// A player with no cities loses, provided the other side still holds at least one.
    fn check_victory(&mut self) -> Option<Event> {
        if self.state.game_over {
            return None;
        }

        let p1 = self.state.cities_owned_by(PlayerId::Player1);
        let p2 = self.state.cities_owned_by(PlayerId::Player2);
        let winner = if p1 == 0 && p2 > 0 {
            PlayerId::Player2
        } else if p2 == 0 && p1 > 0 {
            PlayerId::Player1
        } else {
            return None;
        };

        self.state.game_over = true;
        self.state.winner = Some(winner);
        info!(%winner, turn = self.state.turn, "game over");
        Some(Event::GameOver { winner })
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            turn: self.state.turn,
            current_player: self.state.current_player,
            map: self.state.map.snapshot(),
            units: self.state.units.values().map(Unit::snapshot).collect(),
            cities: self.state.cities.values().map(City::snapshot).collect(),
            resources: self.state.resources,
            game_over: self.state.game_over,
            winner: self.state.winner,
        }
    }

    /// Rebuild a game from a snapshot, restoring tile occupancy from unit and city positions.
    pub fn from_snapshot(snapshot: &Snapshot, config: GameConfig) -> Result<Self, SnapshotError> {
        Self::from_snapshot_with_rng(snapshot, config, StdRng::from_entropy())
    }

    pub fn from_snapshot_with_rng(
        snapshot: &Snapshot,
        config: GameConfig,
        rng: StdRng,
    ) -> Result<Self, SnapshotError> {
        if snapshot.turn == 0 {
            return Err(SnapshotError::InvalidTurn);
        }
        if snapshot.game_over && snapshot.winner.is_none() {
            return Err(SnapshotError::MissingWinner);
        }

        let map = GameMap::from_snapshot(&snapshot.map);
        if map.len() != snapshot.map.tiles.len() {
            let mut seen = std::collections::HashSet::new();
            let dup = snapshot
                .map
                .tiles
                .iter()
                .find(|t| !seen.insert(t.hex))
                .map_or(Hex::new(0, 0), |t| t.hex);
            return Err(SnapshotError::DuplicateTile(dup));
        }

        let mut engine = Self::with_map(map, config, rng);
        engine.state.turn = snapshot.turn;
        engine.state.current_player = snapshot.current_player;
        engine.state.resources = snapshot.resources;
        engine.state.game_over = snapshot.game_over;
        engine.state.winner = snapshot.winner;

        for snap in &snapshot.units {
            if snap.health <= 0 {
                return Err(SnapshotError::DeadUnit(snap.id));
            }
            let tile = engine
                .state
                .map
                .get_mut(snap.position)
                .ok_or(SnapshotError::UnitOffMap {
                    id: snap.id,
                    at: snap.position,
                })?;
            if tile.unit.is_some() {
                return Err(SnapshotError::StackedUnits { at: snap.position });
            }
            tile.unit = Some(snap.id);
            if engine
                .state
                .units
                .insert_at(snap.id, Unit::from_snapshot(snap))
                .is_some()
            {
                return Err(SnapshotError::DuplicateUnit(snap.id));
            }
        }

        for snap in &snapshot.cities {
            let tile = engine
                .state
                .map
                .get_mut(snap.position)
                .ok_or(SnapshotError::CityOffMap {
                    id: snap.id,
                    at: snap.position,
                })?;
            if tile.city.is_some() {
                return Err(SnapshotError::StackedCities { at: snap.position });
            }
            tile.city = Some(snap.id);
            if engine
                .state
                .cities
                .insert_at(snap.id, City::from_snapshot(snap))
                .is_some()
            {
                return Err(SnapshotError::DuplicateCity(snap.id));
            }
        }

        Ok(engine)
    }

    #[cfg(test)]
    pub(crate) fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }
}
