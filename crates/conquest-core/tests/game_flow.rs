//! End-to-end games driven through the public engine API.

use conquest_core::{GameConfig, GameEngine, GameError, GameMap};
use conquest_protocol::{wire, Command, Event, Hex, PlayerId, Terrain, UnitKind};
use rand::{rngs::StdRng, SeedableRng};

fn standard_game(seed: u64) -> GameEngine {
    GameEngine::new_game_with_rng(30, 20, GameConfig::default(), StdRng::seed_from_u64(seed))
}

#[test]
fn new_game_sets_up_both_sides() {
    for seed in 0..8 {
        let engine = standard_game(seed);
        let state = engine.state();

        assert_eq!(engine.turn(), 1);
        assert_eq!(engine.current_player(), PlayerId::Player1);
        assert_eq!(state.resources.get(PlayerId::Player1), 200);
        assert_eq!(state.resources.get(PlayerId::Player2), 200);
        assert_eq!(state.cities_owned_by(PlayerId::Player1), 2);
        assert_eq!(state.cities_owned_by(PlayerId::Player2), 2);

        let names: Vec<_> = state.cities.values().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["City-P1-1", "City-P1-2", "City-P2-1", "City-P2-2"]);

        for city in state.cities.values() {
            assert_eq!(state.map.terrain(city.position), Some(Terrain::Land));
            assert_eq!(city.production_capacity, 10);
            assert_eq!(city.current_production, None);
        }

        for unit in state.units.values() {
            assert_eq!(unit.kind, UnitKind::Infantry);
            assert_ne!(state.map.terrain(unit.position), Some(Terrain::Water));
            assert_eq!(state.map.unit_at(unit.position), Some(unit.id));
            assert!(state
                .cities
                .values()
                .any(|c| c.owner == Some(unit.owner) && c.position.distance(unit.position) == 1));
        }
        assert!(state.units.len() <= 8);
    }
}

#[test]
fn idle_end_turn_hands_control_back() {
    let mut engine = standard_game(11);

    let events = engine.end_turn();
    assert_eq!(engine.turn(), 2);
    assert_eq!(engine.current_player(), PlayerId::Player1);
    assert_eq!(engine.state().resources.get(PlayerId::Player1), 220);
    assert_eq!(engine.state().resources.get(PlayerId::Player2), 200);
    assert!(events.iter().any(|e| matches!(
        e,
        Event::TurnStarted {
            turn: 2,
            player: PlayerId::Player1
        }
    )));

    // Every Player2 city was idle, so the opponent queued something in each.
    for city in engine.state().cities.values() {
        if city.owner == Some(PlayerId::Player2) {
            assert!(city.current_production.is_some());
        }
    }
}

#[test]
fn units_are_refreshed_at_turn_start() {
    let mut engine = standard_game(3);
    let ids = engine.state().units_owned_by(PlayerId::Player1);

    for id in &ids {
        let unit = engine.unit(*id).unwrap();
        let here = unit.position;
        // Stay in place: legal, costs nothing, and still exercises the full validation path.
        engine.move_unit(*id, here).unwrap();
    }

    engine.end_turn();
    for id in ids {
        if let Some(unit) = engine.unit(id) {
            assert_eq!(unit.movement_remaining, 2);
            assert!(!unit.has_attacked);
        }
    }
}

#[test]
fn commands_round_trip_through_json() {
    let mut engine = standard_game(5);
    let city = engine
        .state()
        .cities
        .values()
        .find(|c| c.owner == Some(PlayerId::Player1))
        .map(|c| c.id)
        .unwrap();

    let text = format!(r#"{{"type":"StartProduction","city":{},"kind":"tank"}}"#, city.0);
    let command: Command = serde_json::from_str(&text).unwrap();
    let events = engine.apply_command(command).unwrap();
    assert_eq!(
        events,
        vec![Event::ProductionStarted {
            city,
            kind: UnitKind::Tank
        }]
    );

    let err = engine
        .apply_command(Command::MoveUnit {
            unit: conquest_protocol::UnitId(9999),
            target: Hex::new(0, 0),
        })
        .unwrap_err();
    assert_eq!(err, GameError::UnknownUnit);
    assert_eq!(err.to_string(), "Unit not found");
}

#[test]
fn capturing_the_last_city_wins() {
    let map = GameMap::new(8, 6, Terrain::Land);
    let mut engine =
        GameEngine::with_map(map, GameConfig::default(), StdRng::seed_from_u64(2));
    engine.found_city("Home", Hex::new(0, 0), Some(PlayerId::Player1));
    let target = engine
        .found_city("Far", Hex::new(3, 2), Some(PlayerId::Player2))
        .unwrap();
    let inf = engine
        .spawn_unit(UnitKind::Infantry, PlayerId::Player1, Hex::new(2, 2))
        .unwrap();

    let events = engine.move_unit(inf, Hex::new(3, 2)).unwrap();
    assert!(events.iter().any(|e| matches!(
        e,
        Event::CityCaptured { city, .. } if *city == target
    )));
    assert!(!engine.is_game_over());

    let events = engine.end_turn();
    assert!(engine.is_game_over());
    assert_eq!(engine.winner(), Some(PlayerId::Player1));
    assert_eq!(
        events.last(),
        Some(&Event::GameOver {
            winner: PlayerId::Player1
        })
    );

    // The result sticks on later turns.
    engine.end_turn();
    assert_eq!(engine.winner(), Some(PlayerId::Player1));
}

#[test]
fn snapshot_survives_json_save_format() {
    let mut engine = standard_game(8);
    engine.end_turn();
    engine.end_turn();
    let snapshot = engine.snapshot();

    let json = wire::snapshot_to_json(&snapshot).unwrap();
    let decoded = wire::snapshot_from_json(&json).unwrap();
    let restored = GameEngine::from_snapshot(&decoded, GameConfig::default()).unwrap();
    assert_eq!(restored.snapshot(), snapshot);
    assert_eq!(
        wire::snapshot_hash(&restored.snapshot()).unwrap(),
        wire::snapshot_hash(&snapshot).unwrap()
    );

    // Fresh ids continue after the largest loaded one.
    let mut restored = restored;
    let max_id = snapshot.units.iter().map(|u| u.id).max();
    let free = restored
        .map()
        .tiles()
        .iter()
        .find(|t| t.unit.is_none() && t.terrain != Terrain::Water)
        .map(|t| t.hex)
        .unwrap();
    let fresh = restored
        .spawn_unit(UnitKind::Infantry, PlayerId::Player1, free)
        .unwrap();
    assert!(Some(fresh) > max_id);
}

#[test]
fn long_games_keep_occupancy_consistent() {
    let mut engine = standard_game(99);
    for _ in 0..30 {
        engine.end_turn();

        let state = engine.state();
        for unit in state.units.values() {
            assert!(unit.health > 0);
            assert_eq!(state.map.unit_at(unit.position), Some(unit.id));
        }
        let occupied = state.map.tiles().iter().filter(|t| t.unit.is_some()).count();
        assert_eq!(occupied, state.units.len());
    }
}
