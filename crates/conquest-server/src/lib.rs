//! Strategic Conquest game host
//!
//! Keeps any number of independent games behind session handles, persists them as JSON or
//! MessagePack save files, and speaks a line-delimited JSON request/response protocol.

pub mod config;
pub mod protocol;
pub mod session;
pub mod storage;

pub use config::{ConfigError, ServerConfig};
pub use protocol::*;
pub use session::{SessionId, SessionManager};
pub use storage::{SaveFormat, SaveStore, StorageError};
