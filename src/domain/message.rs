//! Synthetic self-authored messages handed to the processing pipeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::ConversationContext;
use crate::id::generate_entity_id;

/// Source tag stamped on every autonomy message.
pub const AUTONOMY_SOURCE: &str = "autonomy";

/// Tags that mark a message as an autonomy trigger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageMetadata {
    pub is_autonomous: bool,
    pub is_internal_thought: bool,
    pub is_continuation: bool,
    pub iteration_id: String,
}

/// A message as the pipeline sees it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentMessage {
    pub id: String,
    pub author_id: String,
    pub agent_id: String,
    pub room_id: String,
    pub world_id: String,
    pub text: String,
    pub source: String,
    pub created_at: DateTime<Utc>,
    pub metadata: MessageMetadata,
}

impl AgentMessage {
    /// Build the self-addressed trigger for one iteration.
    pub fn autonomous_trigger(
        agent_id: &str,
        context: &ConversationContext,
        text: impl Into<String>,
        iteration_id: &str,
        is_continuation: bool,
    ) -> Self {
        Self {
            id: generate_entity_id(),
            author_id: agent_id.to_string(),
            agent_id: agent_id.to_string(),
            room_id: context.room_id.clone(),
            world_id: context.world_id.clone(),
            text: text.into(),
            source: AUTONOMY_SOURCE.to_string(),
            created_at: Utc::now(),
            metadata: MessageMetadata {
                is_autonomous: true,
                is_internal_thought: true,
                is_continuation,
                iteration_id: iteration_id.to_string(),
            },
        }
    }
}
