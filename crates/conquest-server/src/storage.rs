//! Save files: one snapshot per file, pretty JSON or MessagePack.

use std::path::PathBuf;

use chrono::Local;
use conquest_protocol::{
    wire::{self, WireError},
    Snapshot,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("save not found: {0}")]
    NotFound(String),
    #[error("invalid save key: {0}")]
    InvalidKey(String),
    #[error("save I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("save encoding failed: {0}")]
    Encoding(#[from] WireError),
}

/// Encoding used for new saves. Loading accepts either, chosen by file extension.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SaveFormat {
    #[default]
    Json,
    #[serde(alias = "messagepack")]
    Msgpack,
}

impl SaveFormat {
    pub const fn extension(self) -> &'static str {
        match self {
            SaveFormat::Json => "json",
            SaveFormat::Msgpack => "msgpack",
        }
    }

    fn for_key(key: &str) -> Option<Self> {
        let (_, ext) = key.rsplit_once('.')?;
        [SaveFormat::Json, SaveFormat::Msgpack]
            .into_iter()
            .find(|format| format.extension() == ext)
    }

    fn encode(self, snapshot: &Snapshot) -> Result<Vec<u8>, WireError> {
        match self {
            SaveFormat::Json => Ok(wire::snapshot_to_json(snapshot)?.into_bytes()),
            SaveFormat::Msgpack => wire::serialize_snapshot(snapshot),
        }
    }

    fn decode(self, bytes: &[u8]) -> Result<Snapshot, WireError> {
        match self {
            SaveFormat::Json => Ok(serde_json::from_slice(bytes)?),
            SaveFormat::Msgpack => wire::deserialize_snapshot(bytes),
        }
    }
}

#[derive(Clone, Debug)]
pub struct SaveStore {
    dir: PathBuf,
    format: SaveFormat,
}

impl SaveStore {
    pub fn new(dir: impl Into<PathBuf>, format: SaveFormat) -> Self {
        Self {
            dir: dir.into(),
            format,
        }
    }

    /// Write `snapshot` as `<name>_<YYYYmmdd_HHMMSS>.<ext>` and return that file name as the key.
    pub fn save(&self, name: &str, snapshot: &Snapshot) -> Result<String, StorageError> {
        std::fs::create_dir_all(&self.dir)?;

        let stem = sanitize_name(name);
        let stamp = Local::now().format("%Y%m%d_%H%M%S");
        let key = format!("{stem}_{stamp}.{}", self.format.extension());

        let bytes = self.format.encode(snapshot)?;
        std::fs::write(self.dir.join(&key), bytes)?;

        let checksum = wire::snapshot_hash(snapshot)?;
        info!(
            key = %key,
            dir = %self.dir.display(),
            checksum = %format!("{checksum:016x}"),
            "game saved"
        );
        Ok(key)
    }

    pub fn load(&self, key: &str) -> Result<Snapshot, StorageError> {
        let path = self.path_for(key)?;
        let format =
            SaveFormat::for_key(key).ok_or_else(|| StorageError::InvalidKey(key.to_string()))?;
        let bytes = match std::fs::read(&path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Err(StorageError::NotFound(key.to_string()))
            }
            Err(err) => return Err(err.into()),
        };

        let snapshot = format.decode(&bytes)?;
        let checksum = wire::snapshot_hash(&snapshot)?;
        info!(
            key = %key,
            turn = snapshot.turn,
            checksum = %format!("{checksum:016x}"),
            "game loaded"
        );
        Ok(snapshot)
    }

    /// Keys of every save in the directory, in either format, sorted.
    pub fn list(&self) -> Result<Vec<String>, StorageError> {
        let entries = match std::fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };

        let mut keys = Vec::new();
        for entry in entries {
            let name = entry?.file_name();
            if let Some(name) = name.to_str() {
                if SaveFormat::for_key(name).is_some() {
                    keys.push(name.to_string());
                }
            }
        }
        keys.sort();
        Ok(keys)
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        let valid = !key.is_empty()
            && key != "."
            && key != ".."
            && !key.contains(['/', '\\'])
            && !key.contains('\0');
        if !valid {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(key))
    }
}

/// Keep save names to a safe file-name alphabet.
fn sanitize_name(name: &str) -> String {
    let cleaned: String = name
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.is_empty() {
        "savegame".to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use conquest_core::{GameConfig, GameEngine};
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;

    fn snapshot() -> Snapshot {
        GameEngine::new_game_with_rng(10, 8, GameConfig::default(), StdRng::seed_from_u64(1))
            .snapshot()
    }

    #[test]
    fn save_then_load_by_key() {
        let dir = tempfile::tempdir().unwrap();
        let store = SaveStore::new(dir.path().join("saves"), SaveFormat::Json);
        let snap = snapshot();

        let key = store.save("campaign", &snap).unwrap();
        assert!(key.starts_with("campaign_"));
        assert!(key.ends_with(".json"));
        // campaign_YYYYmmdd_HHMMSS.json
        assert_eq!(key.len(), "campaign_".len() + 15 + ".json".len());

        assert_eq!(store.load(&key).unwrap(), snap);
        assert_eq!(store.list().unwrap(), vec![key]);
    }

    #[test]
    fn names_are_sanitized() {
        assert_eq!(sanitize_name("../etc/passwd"), "___etc_passwd");
        assert_eq!(sanitize_name("  "), "savegame");
        assert_eq!(sanitize_name("my-save_2"), "my-save_2");
    }

    #[test]
    fn bad_keys_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = SaveStore::new(dir.path(), SaveFormat::Json);

        assert!(matches!(
            store.load("../outside.json"),
            Err(StorageError::InvalidKey(_))
        ));
        assert!(matches!(store.load(""), Err(StorageError::InvalidKey(_))));
        assert!(matches!(
            store.load("missing.json"),
            Err(StorageError::NotFound(_))
        ));
    }

    #[test]
    fn corrupt_file_is_an_encoding_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("broken.json"), "{ not json").unwrap();
        let store = SaveStore::new(dir.path(), SaveFormat::Json);
        assert!(matches!(
            store.load("broken.json"),
            Err(StorageError::Encoding(_))
        ));
    }

    #[test]
    fn msgpack_saves_load_alongside_json() {
        let dir = tempfile::tempdir().unwrap();
        let snap = snapshot();

        let binary = SaveStore::new(dir.path(), SaveFormat::Msgpack);
        let packed = binary.save("compact", &snap).unwrap();
        assert!(packed.ends_with(".msgpack"));
        let bytes = std::fs::read(dir.path().join(&packed)).unwrap();
        assert!(serde_json::from_slice::<serde_json::Value>(&bytes).is_err());

        // A JSON store still reads the binary save, and lists both.
        let text = SaveStore::new(dir.path(), SaveFormat::Json);
        let readable = text.save("readable", &snap).unwrap();
        assert_eq!(text.load(&packed).unwrap(), snap);
        assert_eq!(binary.load(&readable).unwrap(), snap);
        assert_eq!(text.list().unwrap(), vec![packed, readable]);
    }

    #[test]
    fn unknown_extensions_are_not_saves() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("notes.txt"), "hello").unwrap();
        let store = SaveStore::new(dir.path(), SaveFormat::Json);

        assert!(store.list().unwrap().is_empty());
        assert!(matches!(
            store.load("notes.txt"),
            Err(StorageError::InvalidKey(_))
        ));
    }

    #[test]
    fn listing_a_missing_dir_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = SaveStore::new(dir.path().join("never-created"), SaveFormat::Json);
        assert!(store.list().unwrap().is_empty());
    }
}
