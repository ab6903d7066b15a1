//! Server configuration

use std::path::{Path, PathBuf};

use conquest_core::GameConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::storage::SaveFormat;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

/// Server configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Map width used when a new game does not ask for one
    pub default_width: u32,
    /// Map height used when a new game does not ask for one
    pub default_height: u32,
    /// Largest accepted map dimension; larger requests are clamped
    pub max_map_size: u32,
    /// Directory save files are written to
    pub save_dir: PathBuf,
    /// Encoding for new save files
    pub save_format: SaveFormat,
    /// Rules for every game hosted by this server
    pub game: GameConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            default_width: 30,
            default_height: 20,
            max_map_size: 50,
            save_dir: PathBuf::from("saves"),
            save_format: SaveFormat::Json,
            game: GameConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Load from a YAML file. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        serde_yaml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Resolve requested map dimensions: defaults fill gaps, then both sides clamp to
    /// `1..=max_map_size`.
    pub fn map_dimensions(&self, width: Option<u32>, height: Option<u32>) -> (u32, u32) {
        let max = self.max_map_size.max(1);
        (
            width.unwrap_or(self.default_width).clamp(1, max),
            height.unwrap_or(self.default_height).clamp(1, max),
        )
    }
}
