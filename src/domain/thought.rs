//! Thought records as stored in the agent's conversational log.
//!
//! Records are written by the external pipeline and only read here.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Metadata tags carried by a record in the log.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RecordMetadata {
    /// Produced by the autonomy loop rather than a human conversation
    pub is_autonomous: bool,
    /// The synthetic instruction that triggered a cycle
    pub is_internal_thought: bool,
    /// Chained onto a previous thought
    pub is_continuation: bool,
    /// Iteration that produced (or triggered) this record
    pub source_iteration_id: Option<String>,
}

/// A single record from the memory/log store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThoughtRecord {
    pub id: String,
    pub author_id: String,
    pub room_id: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub metadata: RecordMetadata,
}

impl ThoughtRecord {
    /// Create a record with a fresh id and the current timestamp.
    pub fn new(
        author_id: impl Into<String>,
        room_id: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            id: crate::id::generate_entity_id(),
            author_id: author_id.into(),
            room_id: room_id.into(),
            text: text.into(),
            created_at: Utc::now(),
            metadata: RecordMetadata::default(),
        }
    }

    /// Mark the record as an autonomous thought.
    pub fn autonomous(mut self) -> Self {
        self.metadata.is_autonomous = true;
        self
    }

    /// Mark the record as a cycle trigger.
    pub fn trigger(mut self) -> Self {
        self.metadata.is_internal_thought = true;
        self
    }

    /// Attach the iteration that produced the record.
    pub fn from_iteration(mut self, iteration_id: impl Into<String>) -> Self {
        self.metadata.source_iteration_id = Some(iteration_id.into());
        self
    }

    /// Override the creation timestamp.
    pub fn at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }

    /// Authored by `agent_id`, tagged autonomous, and not a trigger.
    pub fn is_autonomous_thought_of(&self, agent_id: &str) -> bool {
        self.author_id == agent_id
            && self.metadata.is_autonomous
            && !self.metadata.is_internal_thought
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_builder_sets_tags() {
        let record = ThoughtRecord::new("agent", "room", "hello")
            .autonomous()
            .from_iteration("iter-1");
        assert!(record.metadata.is_autonomous);
        assert!(!record.metadata.is_internal_thought);
        assert_eq!(record.metadata.source_iteration_id.as_deref(), Some("iter-1"));
    }

    #[test]
    fn test_is_autonomous_thought_of() {
        let thought = ThoughtRecord::new("agent", "room", "t").autonomous();
        assert!(thought.is_autonomous_thought_of("agent"));
        assert!(!thought.is_autonomous_thought_of("someone-else"));

        let trigger = ThoughtRecord::new("agent", "room", "t").autonomous().trigger();
        assert!(!trigger.is_autonomous_thought_of("agent"));

        let plain = ThoughtRecord::new("agent", "room", "t");
        assert!(!plain.is_autonomous_thought_of("agent"));
    }

    #[test]
    fn test_deserialize_without_metadata() {
        let value = json!({
            "id": "m1",
            "authorId": "agent",
            "roomId": "room",
            "text": "hi",
            "createdAt": "2026-01-01T00:00:00Z"
        });
        let record: ThoughtRecord = serde_json::from_value(value).unwrap();
        assert_eq!(record.metadata, RecordMetadata::default());
    }

    #[test]
    fn test_metadata_wire_names() {
        let record = ThoughtRecord::new("a", "r", "t").autonomous().trigger();
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["metadata"]["isAutonomous"], json!(true));
        assert_eq!(value["metadata"]["isInternalThought"], json!(true));
        assert!(value.get("authorId").is_some());
    }
}
