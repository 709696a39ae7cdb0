//! Public protocol structs for WebSocket and HTTP endpoints (serde ready).
//! Keep this small and stable to evolve backend and frontend independently.

use serde::{Deserialize, Serialize};

use crate::domain::Item;
use crate::engine::SessionSnapshot;

/// Messages the client can send over WebSocket.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientWsMessage {
    Ping,
    State,
    Guess {
        name: String,
    },
    Skip,
    /// Absent or null category selects "all".
    Filter {
        #[serde(default)]
        category: Option<String>,
    },
    PlaySound,
}

/// Messages the server sends back over WebSocket.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerWsMessage {
    Pong,
    State {
        state: SessionSnapshot,
    },
    Tick {
        #[serde(rename = "secondsLeft")]
        seconds_left: u32,
    },
    Sound {
        audio: String,
    },
    Error {
        message: String,
    },
}

//
// HTTP response DTOs
//

#[derive(Serialize)]
pub struct HealthOut {
    pub ok: bool,
}

/// Pool listing without audio, so the answer of a live round can't be looked up by sound.
#[derive(Serialize)]
pub struct PoolItemOut {
    pub name: String,
    pub category: String,
    pub image: String,
}

#[derive(Serialize)]
pub struct PoolOut {
    pub categories: Vec<String>,
    pub items: Vec<PoolItemOut>,
}

pub fn to_pool_out(categories: &[String], items: &[Item]) -> PoolOut {
    PoolOut {
        categories: categories.to_vec(),
        items: items
            .iter()
            .map(|i| PoolItemOut { name: i.name.clone(), category: i.category.clone(), image: i.image.clone() })
            .collect(),
    }
}
