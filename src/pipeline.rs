//! Boundary to the external message-processing pipeline.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{AgentMessage, ConversationContext};
use crate::error::{MonologueError, Result};
use crate::prompt::Prompt;

/// The host's message pipeline.
///
/// Whether and when a reply record is persisted is entirely up to the pipeline; no
/// return value is consumed.
#[async_trait]
pub trait MessagePipeline: Send + Sync {
    async fn process_message(&self, message: AgentMessage) -> Result<()>;
}

/// What the harvester needs to recognise the cycle's result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub iteration_id: String,
    pub message_id: String,
    pub room_id: String,
    pub submitted_at: DateTime<Utc>,
    pub is_continuation: bool,
}

/// Wraps prompts as self-messages and hands them to the pipeline.
#[derive(Clone)]
pub struct PipelineGateway {
    pipeline: Arc<dyn MessagePipeline>,
    agent_id: String,
}

impl PipelineGateway {
    pub fn new(pipeline: Arc<dyn MessagePipeline>, agent_id: impl Into<String>) -> Self {
        Self {
            pipeline,
            agent_id: agent_id.into(),
        }
    }

    /// Submit one prompt for `iteration_id`.
    ///
    /// There is no timeout here: a slow pipeline delays this cycle's harvest only.
    pub async fn submit(
        &self,
        context: &ConversationContext,
        prompt: &Prompt,
        iteration_id: &str,
    ) -> Result<Submission> {
        let message = AgentMessage::autonomous_trigger(
            &self.agent_id,
            context,
            prompt.text.clone(),
            iteration_id,
            prompt.is_continuation(),
        );
        let submission = Submission {
            iteration_id: iteration_id.to_string(),
            message_id: message.id.clone(),
            room_id: context.room_id.clone(),
            submitted_at: message.created_at,
            is_continuation: prompt.is_continuation(),
        };

        tracing::debug!(
            iteration_id = %iteration_id,
            message_id = %submission.message_id,
            continuation = submission.is_continuation,
            "Submitting autonomous prompt"
        );

        self.pipeline
            .process_message(message)
            .await
            .map_err(|e| match e {
                MonologueError::Pipeline(_) => e,
                other => MonologueError::Pipeline(other.to_string()),
            })?;

        Ok(submission)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::compose;
    use std::sync::Mutex;

    #[derive(Default)]
    struct CapturingPipeline {
        seen: Mutex<Vec<AgentMessage>>,
        fail: bool,
    }

    #[async_trait]
    impl MessagePipeline for CapturingPipeline {
        async fn process_message(&self, message: AgentMessage) -> Result<()> {
            if self.fail {
                return Err(MonologueError::Store("evaluator crashed".into()));
            }
            self.seen.lock().unwrap().push(message);
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_submit_builds_tagged_self_message() {
        let pipeline = Arc::new(CapturingPipeline::default());
        let gateway = PipelineGateway::new(pipeline.clone(), "agent");
        let ctx = ConversationContext::new("world", "room");

        let submission = gateway
            .submit(&ctx, &compose(Some("earlier")), "iter-1")
            .await
            .unwrap();

        let seen = pipeline.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        let message = &seen[0];
        assert_eq!(message.id, submission.message_id);
        assert_eq!(message.author_id, "agent");
        assert_eq!(message.room_id, "room");
        assert!(message.metadata.is_autonomous);
        assert!(message.metadata.is_internal_thought);
        assert!(message.metadata.is_continuation);
        assert_eq!(message.metadata.iteration_id, "iter-1");
        assert!(message.text.contains("earlier"));
        assert!(submission.is_continuation);
    }

    #[tokio::test]
    async fn test_submit_failure_is_pipeline_error() {
        let pipeline = Arc::new(CapturingPipeline {
            fail: true,
            ..CapturingPipeline::default()
        });
        let gateway = PipelineGateway::new(pipeline, "agent");
        let ctx = ConversationContext::new("world", "room");

        let err = gateway.submit(&ctx, &compose(None), "iter-1").await.unwrap_err();
        assert!(matches!(err, MonologueError::Pipeline(_)));
    }
}
