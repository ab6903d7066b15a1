//! Request/response messages for hosted games.
//!
//! One JSON object per line in each direction; see `main.rs`.

use serde::{Deserialize, Serialize};

use conquest_protocol::{CityId, Event, Hex, Snapshot, UnitId};

use crate::session::SessionId;

/// Client-to-server requests
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ClientRequest {
    /// Start a new game; omitted dimensions use the configured defaults
    NewGame {
        #[serde(default)]
        width: Option<u32>,
        #[serde(default)]
        height: Option<u32>,
    },
    /// Fetch the full state of a running game
    State { session: SessionId },
    MoveUnit {
        session: SessionId,
        unit_id: UnitId,
        target_hex: Hex,
    },
    Attack {
        session: SessionId,
        attacker_id: UnitId,
        defender_id: UnitId,
    },
    /// Queue production; `unit_type` is a unit kind name such as `"tank"`
    Produce {
        session: SessionId,
        city_id: CityId,
        unit_type: String,
    },
    EndTurn { session: SessionId },
    Save {
        session: SessionId,
        #[serde(default)]
        filename: Option<String>,
    },
    /// Load a save into a new session
    Load { filename: String },
    /// Keys of every stored save
    ListSaves,
    /// Drop a session and its game
    Close { session: SessionId },
}

/// Uniform reply to every request.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse {
    pub success: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session: Option<SessionId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<Snapshot>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub events: Vec<Event>,
    /// Storage key of a save just written
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub save_key: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub saves: Vec<String>,
}

impl ApiResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            session: None,
            state: None,
            events: Vec::new(),
            save_key: None,
            saves: Vec::new(),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            ..Self::ok(message)
        }
    }

    pub fn with_session(mut self, session: SessionId) -> Self {
        self.session = Some(session);
        self
    }

    pub fn with_state(mut self, state: Snapshot) -> Self {
        self.state = Some(state);
        self
    }

    pub fn with_events(mut self, events: Vec<Event>) -> Self {
        self.events = events;
        self
    }

    pub fn with_save_key(mut self, key: String) -> Self {
        self.save_key = Some(key);
        self
    }

    pub fn with_saves(mut self, saves: Vec<String>) -> Self {
        self.saves = saves;
        self
    }
}

pub fn parse_request(line: &str) -> Result<ClientRequest, serde_json::Error> {
    serde_json::from_str(line)
}

pub fn encode_response(response: &ApiResponse) -> Result<String, serde_json::Error> {
    serde_json::to_string(response)
}
