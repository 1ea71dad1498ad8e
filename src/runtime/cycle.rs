//! One think cycle: resolve → compose → submit → settle/harvest → publish.

use crate::continuity::ContinuityResolver;
use crate::domain::{ConversationContext, ThoughtRecord};
use crate::harvest::{Harvest, ResponseHarvester};
use crate::pipeline::PipelineGateway;
use crate::prompt::compose;
use crate::publish::Publisher;

/// How a cycle ended. None of these stop the loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IterationOutcome {
    /// Thought harvested and accepted by the broadcast boundary
    Published(ThoughtRecord),
    /// Thought harvested but the broadcast failed; not retried
    PublishFailed(ThoughtRecord),
    /// Pipeline produced nothing qualifying within the settle delay
    HarvestMiss,
    /// Submission raised; the cycle was abandoned
    SubmitFailed(String),
}

impl IterationOutcome {
    /// The harvested thought, whether or not it was published.
    pub fn thought(&self) -> Option<&ThoughtRecord> {
        match self {
            Self::Published(record) | Self::PublishFailed(record) => Some(record),
            Self::HarvestMiss | Self::SubmitFailed(_) => None,
        }
    }
}

/// What one iteration did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IterationReport {
    pub iteration_id: String,
    pub is_continuation: bool,
    pub outcome: IterationOutcome,
}

/// The per-iteration pipeline, wired once and reused by every cycle.
#[derive(Clone)]
pub struct ThinkCycle {
    context: ConversationContext,
    resolver: ContinuityResolver,
    gateway: PipelineGateway,
    harvester: ResponseHarvester,
    publisher: Publisher,
}

impl ThinkCycle {
    pub fn new(
        context: ConversationContext,
        resolver: ContinuityResolver,
        gateway: PipelineGateway,
        harvester: ResponseHarvester,
        publisher: Publisher,
    ) -> Self {
        Self {
            context,
            resolver,
            gateway,
            harvester,
            publisher,
        }
    }

    pub async fn run(&self, iteration_id: &str) -> IterationReport {
        let prior = self.resolver.latest_thought(&self.context).await;
        let prompt = compose(prior.as_deref());
        let is_continuation = prompt.is_continuation();

        let report = |outcome| IterationReport {
            iteration_id: iteration_id.to_string(),
            is_continuation,
            outcome,
        };

        let submission = match self.gateway.submit(&self.context, &prompt, iteration_id).await {
            Ok(submission) => submission,
            Err(e) => {
                tracing::error!(
                    iteration_id = %iteration_id,
                    error = %e,
                    "Failed to submit autonomous prompt"
                );
                return report(IterationOutcome::SubmitFailed(e.to_string()));
            }
        };

        let record = match self.harvester.harvest(&submission).await {
            Harvest::Found(record) => record,
            Harvest::Miss => return report(IterationOutcome::HarvestMiss),
        };

        match self.publisher.publish(&record, iteration_id, is_continuation).await {
            Ok(()) => report(IterationOutcome::Published(record)),
            Err(e) => {
                tracing::warn!(
                    iteration_id = %iteration_id,
                    error = %e,
                    "Failed to publish autonomous thought"
                );
                report(IterationOutcome::PublishFailed(record))
            }
        }
    }
}
