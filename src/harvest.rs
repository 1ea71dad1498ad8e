//! Polls the log for the record a submission produced.
//!
//! The pipeline offers no return channel, so the harvester waits a settle delay and
//! then looks for a new agent-authored record. Finding nothing is a normal outcome;
//! a slow pipeline simply misses the cycle.

use std::sync::Arc;
use std::time::Duration;

use crate::domain::ThoughtRecord;
use crate::memory::{MemoryQuery, MemoryStore};
use crate::pipeline::Submission;

/// Result of polling for a cycle's thought.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Harvest {
    Found(ThoughtRecord),
    Miss,
}

impl Harvest {
    pub fn is_miss(&self) -> bool {
        matches!(self, Harvest::Miss)
    }
}

#[derive(Clone)]
pub struct ResponseHarvester {
    memory: Arc<dyn MemoryStore>,
    agent_id: String,
    settle_delay: Duration,
    history_count: usize,
    table: String,
}

impl ResponseHarvester {
    pub fn new(
        memory: Arc<dyn MemoryStore>,
        agent_id: impl Into<String>,
        settle_delay: Duration,
        history_count: usize,
        table: impl Into<String>,
    ) -> Self {
        Self {
            memory,
            agent_id: agent_id.into(),
            settle_delay,
            history_count,
            table: table.into(),
        }
    }

    /// Wait the settle delay, then collect.
    pub async fn harvest(&self, submission: &Submission) -> Harvest {
        tokio::time::sleep(self.settle_delay).await;
        self.collect(submission).await
    }

    /// Look for the newest qualifying record right now.
    pub async fn collect(&self, submission: &Submission) -> Harvest {
        let query = MemoryQuery::new(&submission.room_id, self.history_count, &self.table);
        let records = match self.memory.get_memories(&query).await {
            Ok(records) => records,
            Err(e) => {
                tracing::warn!(
                    iteration_id = %submission.iteration_id,
                    error = %e,
                    "Failed to read harvest candidates"
                );
                return Harvest::Miss;
            }
        };

        let found = records
            .into_iter()
            .filter(|r| self.qualifies(r, submission))
            .max_by(|a, b| a.created_at.cmp(&b.created_at));

        match found {
            Some(record) => Harvest::Found(record),
            None => {
                tracing::debug!(
                    iteration_id = %submission.iteration_id,
                    "No thought produced this cycle"
                );
                Harvest::Miss
            }
        }
    }

    fn qualifies(&self, record: &ThoughtRecord, submission: &Submission) -> bool {
        record.author_id == self.agent_id
            && record.id != submission.message_id
            && !record.metadata.is_internal_thought
            && record.created_at >= submission.submitted_at
            && !record.text.trim().is_empty()
    }
}
