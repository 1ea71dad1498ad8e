//! Finds the latest autonomous thought so the next one can build on it.

use std::sync::Arc;

use crate::domain::ConversationContext;
use crate::memory::{MemoryQuery, MemoryStore};

/// Looks up the most recent autonomous thought in the dedicated room.
#[derive(Clone)]
pub struct ContinuityResolver {
    memory: Arc<dyn MemoryStore>,
    agent_id: String,
    history_count: usize,
    table: String,
}

impl ContinuityResolver {
    pub fn new(
        memory: Arc<dyn MemoryStore>,
        agent_id: impl Into<String>,
        history_count: usize,
        table: impl Into<String>,
    ) -> Self {
        Self {
            memory,
            agent_id: agent_id.into(),
            history_count,
            table: table.into(),
        }
    }

    /// Text of the latest autonomous thought, or `None` for a first thought.
    ///
    /// Store failures are treated as a first thought.
    pub async fn latest_thought(&self, context: &ConversationContext) -> Option<String> {
        let query = MemoryQuery::new(&context.room_id, self.history_count, &self.table);
        let records = match self.memory.get_memories(&query).await {
            Ok(records) => records,
            Err(e) => {
                tracing::warn!(
                    room_id = %context.room_id,
                    error = %e,
                    "Failed to read prior thoughts, starting fresh"
                );
                return None;
            }
        };

        records
            .into_iter()
            .filter(|r| r.is_autonomous_thought_of(&self.agent_id))
            .filter(|r| !r.text.trim().is_empty())
            .max_by(|a, b| a.created_at.cmp(&b.created_at))
            .map(|r| r.text)
    }
}
