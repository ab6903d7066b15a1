use rmp_serde::{decode, encode};
use thiserror::Error;

use crate::Snapshot;

#[derive(Debug, Error)]
pub enum WireError {
    #[error("encode error: {0}")]
    Encode(#[from] encode::Error),
    #[error("decode error: {0}")]
    Decode(#[from] decode::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Compact binary save document.
pub fn serialize_snapshot(snapshot: &Snapshot) -> Result<Vec<u8>, WireError> {
    Ok(encode::to_vec(snapshot)?)
}

pub fn deserialize_snapshot(bytes: &[u8]) -> Result<Snapshot, WireError> {
    Ok(decode::from_slice(bytes)?)
}

/// Human-readable save document.
pub fn snapshot_to_json(snapshot: &Snapshot) -> Result<String, WireError> {
    Ok(serde_json::to_string_pretty(snapshot)?)
}

pub fn snapshot_from_json(text: &str) -> Result<Snapshot, WireError> {
    Ok(serde_json::from_str(text)?)
}

/// Stable snapshot hash, logged with every save and load so the two can be matched up.
///
/// Hashes the MessagePack-serialized snapshot using FNV-1a 64-bit.
pub fn snapshot_hash(snapshot: &Snapshot) -> Result<u64, WireError> {
    let bytes = serialize_snapshot(snapshot)?;
    Ok(hash_bytes_fnv1a64(&bytes))
}

/// Deterministic, stable 64-bit hash for raw bytes (FNV-1a).
pub fn hash_bytes_fnv1a64(bytes: &[u8]) -> u64 {
    const OFFSET_BASIS: u64 = 0xcbf29ce484222325;
    const PRIME: u64 = 0x100000001b3;

    let mut hash = OFFSET_BASIS;
    for &byte in bytes {
        hash ^= u64::from(byte);
        hash = hash.wrapping_mul(PRIME);
    }
    hash
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        CitySnapshot, Hex, MapSnapshot, PlayerId, Resources, Terrain, TileSnapshot, UnitId,
        UnitKind, UnitSnapshot,
    };

    fn sample_snapshot() -> Snapshot {
        Snapshot {
            turn: 3,
            current_player: PlayerId::Player1,
            map: MapSnapshot {
                width: 2,
                height: 1,
                tiles: vec![
                    TileSnapshot {
                        hex: Hex::new(0, 0),
                        terrain: Terrain::Land,
                        unit: Some(UnitId(1)),
                        city: None,
                    },
                    TileSnapshot {
                        hex: Hex::new(1, 0),
                        terrain: Terrain::Forest,
                        unit: None,
                        city: Some(crate::CityId(1)),
                    },
                ],
            },
            units: vec![UnitSnapshot {
                id: UnitId(1),
                kind: UnitKind::Tank,
                owner: PlayerId::Player2,
                position: Hex::new(0, 0),
                health: 9,
                movement_remaining: 1,
                has_attacked: true,
                stats: UnitKind::Tank.stats().into(),
            }],
            cities: vec![CitySnapshot {
                id: crate::CityId(1),
                name: "City-P1-1".into(),
                position: Hex::new(1, 0),
                owner: Some(PlayerId::Player1),
                production_capacity: 10,
                current_production: Some(UnitKind::Infantry),
                production_progress: 20,
            }],
            resources: Resources::uniform(200),
            game_over: false,
            winner: None,
        }
    }

    #[test]
    fn json_document_uses_pair_coordinates() {
        let json = snapshot_to_json(&sample_snapshot()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["units"][0]["position"], serde_json::json!([0, 0]));
        assert_eq!(value["units"][0]["type"], "tank");
        assert_eq!(value["units"][0]["stats"]["max_health"], 15);
        assert_eq!(value["resources"]["player1"], 200);
    }

    #[test]
    fn snapshot_survives_both_encodings() {
        let snapshot = sample_snapshot();
        let json = snapshot_to_json(&snapshot).unwrap();
        assert_eq!(snapshot_from_json(&json).unwrap(), snapshot);

        let bytes = serialize_snapshot(&snapshot).unwrap();
        let decoded = deserialize_snapshot(&bytes).unwrap();
        assert_eq!(snapshot_hash(&decoded).unwrap(), snapshot_hash(&snapshot).unwrap());
    }

    #[test]
    fn hash_tracks_content() {
        let snapshot = sample_snapshot();
        let mut later = snapshot.clone();
        later.turn += 1;
        assert_ne!(snapshot_hash(&snapshot).unwrap(), snapshot_hash(&later).unwrap());
        assert_eq!(hash_bytes_fnv1a64(b""), 0xcbf29ce484222325);
    }
}
