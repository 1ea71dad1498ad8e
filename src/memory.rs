//! Memory/log store boundary.
//!
//! The log is append-only and shared with the pipeline; reads are point-in-time
//! snapshots, so no coordination is needed beyond the store's own.

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::ThoughtRecord;
use crate::error::Result;

/// Query for the most recent records of a room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryQuery {
    pub room_id: String,
    pub count: usize,
    pub table: String,
}

impl MemoryQuery {
    pub fn new(room_id: impl Into<String>, count: usize, table: impl Into<String>) -> Self {
        Self {
            room_id: room_id.into(),
            count,
            table: table.into(),
        }
    }
}

/// Read side of the conversational log.
#[async_trait]
pub trait MemoryStore: Send + Sync {
    /// Up to `query.count` records of the room, newest first.
    async fn get_memories(&self, query: &MemoryQuery) -> Result<Vec<ThoughtRecord>>;
}

/// Append-only log held in process memory.
#[derive(Debug, Default)]
pub struct InMemoryLog {
    entries: RwLock<Vec<(String, ThoughtRecord)>>,
}

impl InMemoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record to `table`.
    pub async fn append(&self, table: &str, record: ThoughtRecord) {
        self.entries.write().await.push((table.to_string(), record));
    }

    /// Number of records across all tables.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl MemoryStore for InMemoryLog {
    async fn get_memories(&self, query: &MemoryQuery) -> Result<Vec<ThoughtRecord>> {
        let entries = self.entries.read().await;
        let mut matching: Vec<ThoughtRecord> = entries
            .iter()
            .filter(|(table, record)| *table == query.table && record.room_id == query.room_id)
            .map(|(_, record)| record.clone())
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        matching.truncate(query.count);
        Ok(matching)
    }
}
