//! The dedicated namespace autonomous thoughts live in.

use serde::{Deserialize, Serialize};

/// A world as understood by the host runtime's context APIs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct World {
    pub id: String,
    pub name: String,
    pub agent_id: String,
}

/// A room inside a world.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    pub id: String,
    pub name: String,
    pub world_id: String,
    pub agent_id: String,
    pub source: String,
}

/// World and room pair reused for the lifetime of the process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationContext {
    pub world_id: String,
    pub room_id: String,
}

impl ConversationContext {
    pub fn new(world_id: impl Into<String>, room_id: impl Into<String>) -> Self {
        Self {
            world_id: world_id.into(),
            room_id: room_id.into(),
        }
    }
}
