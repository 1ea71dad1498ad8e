//! Loop state, statistics, and the status snapshot exposed to callers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Shortest allowed gap between iterations.
pub const MIN_INTERVAL_MS: u64 = 100;
/// Longest allowed gap between iterations.
pub const MAX_INTERVAL_MS: u64 = 60_000;

/// Clamp a requested interval into `[MIN_INTERVAL_MS, MAX_INTERVAL_MS]`.
pub fn clamp_interval(ms: u64) -> u64 {
    ms.clamp(MIN_INTERVAL_MS, MAX_INTERVAL_MS)
}

/// Run state of the loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunState {
    Stopped,
    Running,
}

/// Counters for what happened across iterations this session
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoopStats {
    /// Iterations that ran to an outcome
    pub iterations: u64,
    /// Thoughts harvested and published
    pub published: u64,
    /// Cycles where the pipeline produced nothing in time
    pub harvest_misses: u64,
    /// Cycles aborted at submission (including panics)
    pub submit_failures: u64,
    /// Thoughts harvested but rejected by the broadcast boundary
    pub publish_failures: u64,
}

impl LoopStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn published(&mut self) {
        self.iterations += 1;
        self.published += 1;
    }

    pub fn harvest_miss(&mut self) {
        self.iterations += 1;
        self.harvest_misses += 1;
    }

    pub fn submit_failed(&mut self) {
        self.iterations += 1;
        self.submit_failures += 1;
    }

    pub fn publish_failed(&mut self) {
        self.iterations += 1;
        self.publish_failures += 1;
    }
}

/// Point-in-time view of the loop.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutonomyStatus {
    /// Last known desired state from the settings store
    pub enabled: bool,
    /// Whether future iterations are being scheduled
    pub running: bool,
    /// Whether an iteration is in flight right now
    pub thinking: bool,
    pub interval_ms: u64,
    pub world_id: String,
    pub room_id: String,
    pub last_iteration_at: Option<DateTime<Utc>>,
    pub stats: LoopStats,
}

impl AutonomyStatus {
    pub fn state(&self) -> RunState {
        if self.running {
            RunState::Running
        } else {
            RunState::Stopped
        }
    }
}

/// A harvested thought, fanned out to in-process subscribers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThoughtEvent {
    pub iteration_id: String,
    pub agent_id: String,
    pub room_id: String,
    pub record_id: String,
    pub text: String,
    pub is_continuation: bool,
    pub timestamp: DateTime<Utc>,
}
