//! Shared fakes for integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use monologue::config::AutonomyConfig;
use monologue::domain::{AgentMessage, ConversationContext, ThoughtRecord};
use monologue::error::{MonologueError, Result};
use monologue::memory::{InMemoryLog, MemoryQuery, MemoryStore};
use monologue::pipeline::MessagePipeline;
use monologue::publish::{BroadcastAck, BroadcastMessage, BroadcastSink};
use monologue::settings::{InMemorySettings, SettingsStore};
use monologue::{AutonomyService, Collaborators};
use tokio::sync::Notify;

pub const TABLE: &str = "messages";
pub const AGENT: &str = "agent-1";

/// Ordered trail of boundary calls, shared by the fakes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Call {
    Read,
    Submit,
}

pub type Trail = Arc<Mutex<Vec<Call>>>;

/// Memory store that records every read.
pub struct TracingMemory {
    pub log: Arc<InMemoryLog>,
    pub trail: Trail,
}

#[async_trait]
impl MemoryStore for TracingMemory {
    async fn get_memories(&self, query: &MemoryQuery) -> Result<Vec<ThoughtRecord>> {
        self.trail.lock().unwrap().push(Call::Read);
        self.log.get_memories(query).await
    }
}

/// Pipeline that captures submissions and optionally writes a reply.
pub struct FakePipeline {
    pub log: Arc<InMemoryLog>,
    pub trail: Trail,
    pub seen: Mutex<Vec<AgentMessage>>,
    pub reply: Option<String>,
    pub delay: Duration,
    pub submitted: Notify,
    pub fail: AtomicBool,
}

impl FakePipeline {
    pub fn new(log: Arc<InMemoryLog>, trail: Trail, reply: Option<&str>) -> Self {
        Self {
            log,
            trail,
            seen: Mutex::new(Vec::new()),
            reply: reply.map(str::to_string),
            delay: Duration::ZERO,
            submitted: Notify::new(),
            fail: AtomicBool::new(false),
        }
    }

    pub fn seen(&self) -> Vec<AgentMessage> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl MessagePipeline for FakePipeline {
    async fn process_message(&self, message: AgentMessage) -> Result<()> {
        self.trail.lock().unwrap().push(Call::Submit);
        self.seen.lock().unwrap().push(message.clone());
        self.submitted.notify_one();

        if self.fail.load(Ordering::SeqCst) {
            return Err(MonologueError::Pipeline("model unavailable".into()));
        }
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if let Some(text) = &self.reply {
            let record = ThoughtRecord::new(&message.agent_id, &message.room_id, text.clone())
                .autonomous()
                .from_iteration(&message.metadata.iteration_id);
            self.log.append(TABLE, record).await;
        }
        Ok(())
    }
}

/// Broadcast sink that captures messages and can be told to fail.
#[derive(Default)]
pub struct FakeSink {
    pub sent: Mutex<Vec<BroadcastMessage>>,
    pub fail: AtomicBool,
}

impl FakeSink {
    pub fn sent(&self) -> Vec<BroadcastMessage> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl BroadcastSink for FakeSink {
    async fn send(&self, message: &BroadcastMessage) -> Result<BroadcastAck> {
        self.sent.lock().unwrap().push(message.clone());
        if self.fail.load(Ordering::SeqCst) {
            return Err(MonologueError::publish_status(500, "internal server error"));
        }
        Ok(BroadcastAck { success: true })
    }
}

pub struct Harness {
    pub service: AutonomyService,
    pub settings: Arc<InMemorySettings>,
    pub log: Arc<InMemoryLog>,
    pub pipeline: Arc<FakePipeline>,
    pub sink: Arc<FakeSink>,
    pub trail: Trail,
}

pub fn fast_config() -> AutonomyConfig {
    AutonomyConfig {
        interval_ms: 100,
        settle_delay_ms: 20,
        reconcile_interval_ms: 50,
        ..AutonomyConfig::default()
    }
}

pub fn harness(reply: Option<&str>, config: AutonomyConfig) -> Harness {
    harness_with(reply, config, |_| {})
}

pub fn harness_with(
    reply: Option<&str>,
    config: AutonomyConfig,
    tweak: impl FnOnce(&mut FakePipeline),
) -> Harness {
    let trail: Trail = Arc::new(Mutex::new(Vec::new()));
    let log = Arc::new(InMemoryLog::new());
    let mut pipeline = FakePipeline::new(log.clone(), trail.clone(), reply);
    tweak(&mut pipeline);
    let pipeline = Arc::new(pipeline);
    let sink = Arc::new(FakeSink::default());
    let settings = Arc::new(InMemorySettings::new());

    let service = AutonomyService::new(
        AGENT,
        ConversationContext::new("world-1", "room-1"),
        Collaborators {
            settings: settings.clone() as Arc<dyn SettingsStore>,
            memory: Arc::new(TracingMemory {
                log: log.clone(),
                trail: trail.clone(),
            }),
            pipeline: pipeline.clone(),
            broadcast: sink.clone(),
        },
        &config,
    );

    Harness {
        service,
        settings,
        log,
        pipeline,
        sink,
        trail,
    }
}

/// Poll `cond` every 10ms until it holds or `timeout` passes.
pub async fn wait_until(timeout: Duration, mut cond: impl FnMut() -> bool) -> bool {
    let deadline = tokio::time::Instant::now() + timeout;
    while tokio::time::Instant::now() < deadline {
        if cond() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    cond()
}
