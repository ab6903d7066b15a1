//! Hosted games keyed by session handle.

use std::collections::HashMap;
use std::fmt;

use conquest_core::{GameEngine, GameError};
use conquest_protocol::{CityId, Event, Hex, UnitId, UnitKind};
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::ServerConfig;
use crate::protocol::{ApiResponse, ClientRequest};
use crate::storage::SaveStore;

const NO_ACTIVE_GAME: &str = "No active game";

/// Opaque handle a client uses to address its game.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    fn generate<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self(format!("{:016x}", rng.gen::<u64>()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SessionId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Owns every running game. Mutation needs `&mut self`; callers serialize access.
pub struct SessionManager {
    config: ServerConfig,
    store: SaveStore,
    sessions: HashMap<SessionId, GameEngine>,
    rng: StdRng,
}

impl SessionManager {
    pub fn new(config: ServerConfig) -> Self {
        Self::with_rng(config, StdRng::from_entropy())
    }

    /// Session ids and every game's randomness derive from `rng`.
    pub fn with_rng(config: ServerConfig, rng: StdRng) -> Self {
        let store = SaveStore::new(config.save_dir.clone(), config.save_format);
        Self {
            config,
            store,
            sessions: HashMap::new(),
            rng,
        }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    pub fn engine(&self, session: &SessionId) -> Option<&GameEngine> {
        self.sessions.get(session)
    }

    pub fn handle(&mut self, request: ClientRequest) -> ApiResponse {
        match request {
            ClientRequest::NewGame { width, height } => self.new_game(width, height),
            ClientRequest::State { session } => self.state(&session),
            ClientRequest::MoveUnit {
                session,
                unit_id,
                target_hex,
            } => self.move_unit(&session, unit_id, target_hex),
            ClientRequest::Attack {
                session,
                attacker_id,
                defender_id,
            } => self.attack(&session, attacker_id, defender_id),
            ClientRequest::Produce {
                session,
                city_id,
                unit_type,
            } => self.start_production(&session, city_id, &unit_type),
            ClientRequest::EndTurn { session } => self.end_turn(&session),
            ClientRequest::Save { session, filename } => {
                self.save(&session, filename.as_deref().unwrap_or("savegame"))
            }
            ClientRequest::Load { filename } => self.load(&filename),
            ClientRequest::ListSaves => self.list_saves(),
            ClientRequest::Close { session } => self.close(&session),
        }
    }

    pub fn new_game(&mut self, width: Option<u32>, height: Option<u32>) -> ApiResponse {
        let (width, height) = self.config.map_dimensions(width, height);
        let game_rng = StdRng::seed_from_u64(self.rng.gen());
        let engine =
            GameEngine::new_game_with_rng(width, height, self.config.game.clone(), game_rng);

        let session = self.open(engine);
        info!(%session, width, height, "session opened");
        self.respond_with_state(&session, ApiResponse::ok("New game started"))
    }

    pub fn state(&self, session: &SessionId) -> ApiResponse {
        self.respond_with_state(session, ApiResponse::ok("Game state"))
    }

    pub fn move_unit(&mut self, session: &SessionId, unit: UnitId, target: Hex) -> ApiResponse {
        self.act(session, |engine| engine.move_unit(unit, target), |events| {
            events
                .iter()
                .find_map(|e| match e {
                    Event::CityCaptured { name, .. } => Some(format!("Captured {name}!")),
                    _ => None,
                })
                .unwrap_or_else(|| "Unit moved".to_string())
        })
    }

    pub fn attack(
        &mut self,
        session: &SessionId,
        attacker: UnitId,
        defender: UnitId,
    ) -> ApiResponse {
        self.act(session, |engine| engine.attack(attacker, defender), |events| {
            events
                .iter()
                .find_map(|e| match e {
                    Event::CombatResolved { report } => Some(format!(
                        "Dealt {} damage, took {}",
                        report.damage_to_defender, report.damage_to_attacker
                    )),
                    _ => None,
                })
                .unwrap_or_else(|| "Attack resolved".to_string())
        })
    }

    pub fn start_production(
        &mut self,
        session: &SessionId,
        city: CityId,
        unit_type: &str,
    ) -> ApiResponse {
        if !self.sessions.contains_key(session) {
            return ApiResponse::failure(NO_ACTIVE_GAME);
        }
        let Ok(kind) = unit_type.parse::<UnitKind>() else {
            warn!(%session, unit_type, "rejected production: unknown unit type");
            return self.respond_with_state(session, ApiResponse::failure("Invalid unit type"));
        };

        self.act(session, |engine| engine.start_production(city, kind), |_| {
            format!("Started producing {kind}")
        })
    }

    pub fn end_turn(&mut self, session: &SessionId) -> ApiResponse {
        let Some(engine) = self.sessions.get_mut(session) else {
            return ApiResponse::failure(NO_ACTIVE_GAME);
        };

        let events = engine.end_turn();
        let message = match engine.winner() {
            Some(winner) => format!("Game over: {winner} wins"),
            None => format!("Turn {}", engine.turn()),
        };
        self.respond_with_state(session, ApiResponse::ok(message).with_events(events))
    }

    pub fn save(&mut self, session: &SessionId, name: &str) -> ApiResponse {
        let Some(engine) = self.sessions.get(session) else {
            return ApiResponse::failure(NO_ACTIVE_GAME);
        };

        match self.store.save(name, &engine.snapshot()) {
            Ok(key) => ApiResponse::ok("Game saved")
                .with_session(session.clone())
                .with_save_key(key),
            Err(err) => {
                warn!(%session, %err, "save failed");
                ApiResponse::failure(err.to_string())
            }
        }
    }

    /// Open a new session from a stored snapshot.
    pub fn load(&mut self, key: &str) -> ApiResponse {
        let snapshot = match self.store.load(key) {
            Ok(snapshot) => snapshot,
            Err(err) => {
                warn!(key, %err, "load failed");
                return ApiResponse::failure(err.to_string());
            }
        };

        let game_rng = StdRng::seed_from_u64(self.rng.gen());
        let engine =
            match GameEngine::from_snapshot_with_rng(&snapshot, self.config.game.clone(), game_rng)
            {
                Ok(engine) => engine,
                Err(err) => {
                    warn!(key, %err, "save is corrupt");
                    return ApiResponse::failure(format!("Corrupt save: {err}"));
                }
            };

        let session = self.open(engine);
        info!(%session, key, "session restored");
        self.respond_with_state(&session, ApiResponse::ok("Game loaded"))
    }

    pub fn list_saves(&self) -> ApiResponse {
        match self.store.list() {
            Ok(keys) => ApiResponse::ok("Saved games").with_saves(keys),
            Err(err) => {
                warn!(%err, "listing saves failed");
                ApiResponse::failure(err.to_string())
            }
        }
    }

    pub fn close(&mut self, session: &SessionId) -> ApiResponse {
        match self.sessions.remove(session) {
            Some(_) => {
                info!(%session, "session closed");
                ApiResponse::ok("Session closed")
            }
            None => ApiResponse::failure(NO_ACTIVE_GAME),
        }
    }

    fn open(&mut self, engine: GameEngine) -> SessionId {
        let mut session = SessionId::generate(&mut self.rng);
        while self.sessions.contains_key(&session) {
            session = SessionId::generate(&mut self.rng);
        }
        self.sessions.insert(session.clone(), engine);
        session
    }

    /// Run one validated action and report its outcome along with the resulting state.
    fn act(
        &mut self,
        session: &SessionId,
        action: impl FnOnce(&mut GameEngine) -> Result<Vec<Event>, GameError>,
        describe: impl FnOnce(&[Event]) -> String,
    ) -> ApiResponse {
        let Some(engine) = self.sessions.get_mut(session) else {
            return ApiResponse::failure(NO_ACTIVE_GAME);
        };

        let response = match action(engine) {
            Ok(events) => ApiResponse::ok(describe(&events)).with_events(events),
            Err(err) => {
                warn!(%session, %err, kind = ?err.kind(), "action rejected");
                ApiResponse::failure(err.to_string())
            }
        };
        self.respond_with_state(session, response)
    }

    fn respond_with_state(&self, session: &SessionId, response: ApiResponse) -> ApiResponse {
        match self.sessions.get(session) {
            Some(engine) => response
                .with_session(session.clone())
                .with_state(engine.snapshot()),
            None => ApiResponse::failure(NO_ACTIVE_GAME),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager() -> SessionManager {
        let config = ServerConfig {
            save_dir: std::env::temp_dir().join("conquest-session-unit-tests"),
            ..ServerConfig::default()
        };
        SessionManager::with_rng(config, StdRng::seed_from_u64(17))
    }

    #[test]
    fn unknown_session_has_no_active_game() {
        let mut sessions = manager();
        let ghost = SessionId::from("nope");

        for response in [
            sessions.state(&ghost),
            sessions.end_turn(&ghost),
            sessions.move_unit(&ghost, UnitId(1), Hex::new(0, 0)),
            sessions.start_production(&ghost, CityId(1), "tank"),
            sessions.close(&ghost),
        ] {
            assert!(!response.success);
            assert_eq!(response.message, "No active game");
            assert!(response.state.is_none());
        }
    }

    #[test]
    fn new_game_clamps_dimensions() {
        let mut sessions = manager();
        let response = sessions.new_game(Some(999), Some(5));
        assert!(response.success);

        let state = response.state.unwrap();
        assert_eq!((state.map.width, state.map.height), (50, 5));
        assert_eq!(sessions.session_count(), 1);
    }

    #[test]
    fn invalid_unit_type_is_reported_with_state() {
        let mut sessions = manager();
        let session = sessions.new_game(None, None).session.unwrap();
        let city = sessions.engine(&session).unwrap().state().cities.ids()[0];

        let response = sessions.start_production(&session, city, "battleship");
        assert!(!response.success);
        assert_eq!(response.message, "Invalid unit type");
        assert!(response.state.is_some());

        let response = sessions.start_production(&session, city, "Tank");
        assert!(response.success);
        assert_eq!(response.message, "Started producing tank");
    }

    #[test]
    fn sessions_are_independent() {
        let mut sessions = manager();
        let a = sessions.new_game(Some(10), Some(10)).session.unwrap();
        let b = sessions.new_game(Some(10), Some(10)).session.unwrap();
        assert_ne!(a, b);

        sessions.end_turn(&a);
        assert_eq!(sessions.engine(&a).unwrap().turn(), 2);
        assert_eq!(sessions.engine(&b).unwrap().turn(), 1);

        assert!(sessions.close(&a).success);
        assert!(sessions.engine(&a).is_none());
        assert!(sessions.engine(&b).is_some());
    }
}
