//! Ships harvested thoughts to the external broadcast boundary.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::BroadcastConfig;
use crate::domain::{AUTONOMY_SOURCE, ThoughtRecord};
use crate::error::{MonologueError, Result};

/// Metadata attached to every broadcast thought.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BroadcastMetadata {
    pub room_id: String,
    pub agent_id: String,
    pub iteration_id: String,
    pub record_id: String,
    pub timestamp: DateTime<Utc>,
    pub is_autonomous: bool,
    pub is_continuation: bool,
    pub source: String,
}

/// Body of a broadcast request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BroadcastMessage {
    pub channel_id: String,
    pub author_id: String,
    pub content: String,
    pub metadata: BroadcastMetadata,
}

/// Reply from the broadcast boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BroadcastAck {
    pub success: bool,
}

/// Where published thoughts go.
#[async_trait]
pub trait BroadcastSink: Send + Sync {
    async fn send(&self, message: &BroadcastMessage) -> Result<BroadcastAck>;
}

/// Posts thoughts as JSON to an HTTP endpoint.
#[derive(Debug, Clone)]
pub struct HttpBroadcaster {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpBroadcaster {
    pub fn new(config: &BroadcastConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()?;
        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl BroadcastSink for HttpBroadcaster {
    async fn send(&self, message: &BroadcastMessage) -> Result<BroadcastAck> {
        let response = self.client.post(&self.endpoint).json(message).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MonologueError::publish_status(status.as_u16(), body));
        }

        Ok(response.json::<BroadcastAck>().await?)
    }
}

/// Publishes a cycle's thought once; failures are reported, never retried.
#[derive(Clone)]
pub struct Publisher {
    sink: Arc<dyn BroadcastSink>,
    agent_id: String,
}

impl Publisher {
    pub fn new(sink: Arc<dyn BroadcastSink>, agent_id: impl Into<String>) -> Self {
        Self {
            sink,
            agent_id: agent_id.into(),
        }
    }

    /// Build the broadcast body for a harvested record.
    pub fn message_for(
        &self,
        record: &ThoughtRecord,
        iteration_id: &str,
        is_continuation: bool,
    ) -> BroadcastMessage {
        BroadcastMessage {
            channel_id: record.room_id.clone(),
            author_id: self.agent_id.clone(),
            content: record.text.clone(),
            metadata: BroadcastMetadata {
                room_id: record.room_id.clone(),
                agent_id: self.agent_id.clone(),
                iteration_id: iteration_id.to_string(),
                record_id: record.id.clone(),
                timestamp: Utc::now(),
                is_autonomous: true,
                is_continuation,
                source: AUTONOMY_SOURCE.to_string(),
            },
        }
    }

    pub async fn publish(
        &self,
        record: &ThoughtRecord,
        iteration_id: &str,
        is_continuation: bool,
    ) -> Result<()> {
        let message = self.message_for(record, iteration_id, is_continuation);
        let ack = self.sink.send(&message).await?;
        if !ack.success {
            return Err(MonologueError::Publish {
                status: None,
                message: "broadcast boundary reported failure".to_string(),
            });
        }
        tracing::info!(
            iteration_id = %iteration_id,
            room_id = %record.room_id,
            "Published autonomous thought"
        );
        Ok(())
    }
}
