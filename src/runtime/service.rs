//! Lifecycle controller for the autonomy loop.
//!
//! Desired state lives in the settings store; actual state lives here. `start()` and
//! `stop()` change actual state (and persist the desired flag), `reconcile()` pulls
//! actual state toward whatever the store says.
//!
//! Iterations are self-chained: the next one is scheduled only after the current one
//! settles, so at most one is ever in flight. Stopping cancels the pending timer but
//! lets an in-flight iteration finish harvesting and publishing.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde_json::Value;
use tokio::sync::{Mutex, RwLock, broadcast, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use super::cycle::{IterationOutcome, IterationReport, ThinkCycle};
use crate::config::{AutonomyConfig, Config};
use crate::context::{ContextApi, ContextProvisioner};
use crate::continuity::ContinuityResolver;
use crate::domain::{AutonomyStatus, ConversationContext, LoopStats, ThoughtEvent, clamp_interval};
use crate::error::Result;
use crate::harvest::ResponseHarvester;
use crate::id::generate_iteration_id;
use crate::memory::MemoryStore;
use crate::pipeline::{MessagePipeline, PipelineGateway};
use crate::publish::{BroadcastSink, Publisher};
use crate::settings::{SettingsStore, coerce_bool};

const EVENT_CAPACITY: usize = 64;

/// External collaborators the loop is driven through.
#[derive(Clone)]
pub struct Collaborators {
    pub settings: Arc<dyn SettingsStore>,
    pub memory: Arc<dyn MemoryStore>,
    pub pipeline: Arc<dyn MessagePipeline>,
    pub broadcast: Arc<dyn BroadcastSink>,
}

/// What a reconciliation pass did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileAction {
    Started,
    Stopped,
    Unchanged,
    /// Desired state could not be read; actual state was left alone
    Drift,
}

struct Inner {
    agent_id: String,
    context: ConversationContext,
    enabled_key: String,
    reconcile_interval: Duration,
    settings: Arc<dyn SettingsStore>,
    cycle: ThinkCycle,
    interval_ms: AtomicU64,
    running: AtomicBool,
    desired: AtomicBool,
    thinking: AtomicBool,
    /// Stop signal for the live scheduling task, `None` while stopped
    control: Mutex<Option<watch::Sender<bool>>>,
    iteration_gate: Mutex<()>,
    stats: RwLock<LoopStats>,
    last_iteration_at: RwLock<Option<DateTime<Utc>>>,
    events: broadcast::Sender<ThoughtEvent>,
    reconciler: Mutex<Option<JoinHandle<()>>>,
}

/// Handle to an agent's autonomy loop. Cheap to clone.
#[derive(Clone)]
pub struct AutonomyService {
    inner: Arc<Inner>,
}

impl AutonomyService {
    /// Build a stopped service over an already provisioned context.
    pub fn new(
        agent_id: impl Into<String>,
        context: ConversationContext,
        collaborators: Collaborators,
        config: &AutonomyConfig,
    ) -> Self {
        let agent_id = agent_id.into();
        let resolver = ContinuityResolver::new(
            collaborators.memory.clone(),
            agent_id.clone(),
            config.history_count,
            config.memory_table.clone(),
        );
        let gateway = PipelineGateway::new(collaborators.pipeline.clone(), agent_id.clone());
        let harvester = ResponseHarvester::new(
            collaborators.memory.clone(),
            agent_id.clone(),
            Duration::from_millis(config.settle_delay_ms),
            config.history_count,
            config.memory_table.clone(),
        );
        let publisher = Publisher::new(collaborators.broadcast.clone(), agent_id.clone());
        let cycle = ThinkCycle::new(context.clone(), resolver, gateway, harvester, publisher);
        let (events, _) = broadcast::channel(EVENT_CAPACITY);

        Self {
            inner: Arc::new(Inner {
                agent_id,
                context,
                enabled_key: config.enabled_key.clone(),
                reconcile_interval: Duration::from_millis(config.reconcile_interval_ms.max(1)),
                settings: collaborators.settings,
                cycle,
                interval_ms: AtomicU64::new(config.effective_interval_ms()),
                running: AtomicBool::new(false),
                desired: AtomicBool::new(false),
                thinking: AtomicBool::new(false),
                control: Mutex::new(None),
                iteration_gate: Mutex::new(()),
                stats: RwLock::new(LoopStats::new()),
                last_iteration_at: RwLock::new(None),
                events,
                reconciler: Mutex::new(None),
            }),
        }
    }

    /// Provision the dedicated context, then build the service.
    pub async fn bootstrap(
        agent_id: impl Into<String>,
        context_api: &dyn ContextApi,
        collaborators: Collaborators,
        config: &Config,
    ) -> Result<Self> {
        let agent_id = agent_id.into();
        let context = ContextProvisioner::new(config.context.clone())
            .provision(context_api, &agent_id)
            .await?;
        Ok(Self::new(agent_id, context, collaborators, &config.autonomy))
    }

    pub fn agent_id(&self) -> &str {
        &self.inner.agent_id
    }

    pub fn context(&self) -> &ConversationContext {
        &self.inner.context
    }

    pub fn is_running(&self) -> bool {
        self.inner.running.load(Ordering::SeqCst)
    }

    pub fn is_thinking(&self) -> bool {
        self.inner.thinking.load(Ordering::SeqCst)
    }

    pub fn interval_ms(&self) -> u64 {
        self.inner.interval_ms.load(Ordering::SeqCst)
    }

    /// Set the gap before the next scheduled iteration, returning the clamped value.
    ///
    /// A timer that is already pending keeps its original deadline.
    pub fn set_interval(&self, ms: u64) -> u64 {
        let effective = clamp_interval(ms);
        if effective != ms {
            tracing::debug!(requested = ms, effective, "Interval clamped");
        }
        self.inner.interval_ms.store(effective, Ordering::SeqCst);
        effective
    }

    /// Subscribe to thoughts harvested by this loop.
    pub fn subscribe(&self) -> broadcast::Receiver<ThoughtEvent> {
        self.inner.events.subscribe()
    }

    /// Begin scheduling iterations. Returns `false` if already running.
    pub async fn start(&self) -> bool {
        let mut control = self.inner.control.lock().await;
        self.start_locked(&mut control).await
    }

    /// Stop scheduling iterations. Returns `false` if not running.
    ///
    /// An iteration already in flight still harvests and publishes.
    pub async fn stop(&self) -> bool {
        let mut control = self.inner.control.lock().await;
        self.stop_locked(&mut control).await
    }

    async fn start_locked(&self, control: &mut Option<watch::Sender<bool>>) -> bool {
        if control.is_some() {
            return false;
        }

        self.inner.persist_enabled(true).await;
        self.inner.running.store(true, Ordering::SeqCst);

        let (stop_tx, stop_rx) = watch::channel(false);
        tokio::spawn(run_loop(self.inner.clone(), stop_rx));
        *control = Some(stop_tx);

        tracing::info!(
            room_id = %self.inner.context.room_id,
            interval_ms = self.interval_ms(),
            "Autonomy loop started"
        );
        true
    }

    async fn stop_locked(&self, control: &mut Option<watch::Sender<bool>>) -> bool {
        let Some(stop_tx) = control.take() else {
            return false;
        };

        let _ = stop_tx.send(true);
        self.inner.running.store(false, Ordering::SeqCst);
        self.inner.persist_enabled(false).await;

        tracing::info!(room_id = %self.inner.context.room_id, "Autonomy loop stopped");
        true
    }

    /// Persist `enabled=true` and start.
    pub async fn enable(&self) {
        let mut control = self.inner.control.lock().await;
        if !self.start_locked(&mut control).await {
            self.inner.persist_enabled(true).await;
        }
    }

    /// Persist `enabled=false` and stop.
    pub async fn disable(&self) {
        let mut control = self.inner.control.lock().await;
        if !self.stop_locked(&mut control).await {
            self.inner.persist_enabled(false).await;
        }
    }

    /// Compare the persisted flag with actual state and correct any drift.
    ///
    /// Holds the control lock across the read, so a concurrent `start()` or `stop()`
    /// lands after this pass instead of being overwritten by it.
    pub async fn reconcile(&self) -> ReconcileAction {
        let mut control = self.inner.control.lock().await;
        let key = &self.inner.enabled_key;
        let desired = match self.inner.settings.get(key).await {
            Ok(Some(value)) => match coerce_bool(&value) {
                Some(desired) => desired,
                None => {
                    tracing::warn!(key = %key, value = %value, "Enabled flag is not a boolean, keeping current state");
                    return ReconcileAction::Drift;
                }
            },
            Ok(None) => {
                tracing::debug!(key = %key, "Enabled flag not set, keeping current state");
                return ReconcileAction::Drift;
            }
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Failed to read enabled flag, keeping current state");
                return ReconcileAction::Drift;
            }
        };

        self.inner.desired.store(desired, Ordering::SeqCst);
        match (desired, control.is_some()) {
            (true, false) => {
                tracing::info!("Enabled flag set, starting autonomy loop");
                self.start_locked(&mut control).await;
                ReconcileAction::Started
            }
            (false, true) => {
                tracing::info!("Enabled flag cleared, stopping autonomy loop");
                self.stop_locked(&mut control).await;
                ReconcileAction::Stopped
            }
            _ => ReconcileAction::Unchanged,
        }
    }

    /// Run `reconcile()` on a fixed period, starting immediately.
    pub async fn spawn_reconciler(&self) {
        let mut slot = self.inner.reconciler.lock().await;
        if slot.is_some() {
            return;
        }

        let service = self.clone();
        let period = self.inner.reconcile_interval;
        *slot = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                service.reconcile().await;
            }
        }));
    }

    /// Run one iteration now, waiting for any in-flight iteration first.
    pub async fn think_once(&self) -> Option<IterationReport> {
        self.inner.run_iteration(None).await
    }

    /// Halt the reconciler and future scheduling without touching the persisted flag.
    pub async fn shutdown(&self) {
        if let Some(handle) = self.inner.reconciler.lock().await.take() {
            handle.abort();
        }
        if let Some(stop_tx) = self.inner.control.lock().await.take() {
            let _ = stop_tx.send(true);
        }
        self.inner.running.store(false, Ordering::SeqCst);
        tracing::info!(room_id = %self.inner.context.room_id, "Autonomy service shut down");
    }

    pub async fn stats(&self) -> LoopStats {
        self.inner.stats.read().await.clone()
    }

    pub async fn status(&self) -> AutonomyStatus {
        AutonomyStatus {
            enabled: self.inner.desired.load(Ordering::SeqCst),
            running: self.is_running(),
            thinking: self.is_thinking(),
            interval_ms: self.interval_ms(),
            world_id: self.inner.context.world_id.clone(),
            room_id: self.inner.context.room_id.clone(),
            last_iteration_at: *self.inner.last_iteration_at.read().await,
            stats: self.stats().await,
        }
    }
}

impl Inner {
    async fn persist_enabled(&self, enabled: bool) {
        self.desired.store(enabled, Ordering::SeqCst);
        if let Err(e) = self.settings.set(&self.enabled_key, Value::Bool(enabled)).await {
            tracing::warn!(key = %self.enabled_key, error = %e, "Failed to persist enabled flag");
        }
    }

    /// Run one cycle behind the gate. A scheduled run passes its stop signal and is
    /// skipped if the loop was stopped while it waited.
    async fn run_iteration(&self, stop: Option<&watch::Receiver<bool>>) -> Option<IterationReport> {
        let _gate = self.iteration_gate.lock().await;
        if stop.is_some_and(|rx| *rx.borrow()) {
            tracing::debug!(room_id = %self.context.room_id, "Loop stopped while waiting, skipping iteration");
            return None;
        }
        self.thinking.store(true, Ordering::SeqCst);
        *self.last_iteration_at.write().await = Some(Utc::now());

        let iteration_id = generate_iteration_id();
        let cycle = self.cycle.clone();
        let task_id = iteration_id.clone();
        let joined = tokio::spawn(async move { cycle.run(&task_id).await }).await;

        let report = match joined {
            Ok(report) => {
                self.record(&report).await;
                Some(report)
            }
            Err(e) => {
                tracing::error!(iteration_id = %iteration_id, error = ?e, "Iteration task panicked");
                self.stats.write().await.submit_failed();
                None
            }
        };

        self.thinking.store(false, Ordering::SeqCst);
        report
    }

    async fn record(&self, report: &IterationReport) {
        {
            let mut stats = self.stats.write().await;
            match &report.outcome {
                IterationOutcome::Published(_) => stats.published(),
                IterationOutcome::PublishFailed(_) => stats.publish_failed(),
                IterationOutcome::HarvestMiss => stats.harvest_miss(),
                IterationOutcome::SubmitFailed(_) => stats.submit_failed(),
            }
        }

        if let Some(record) = report.outcome.thought() {
            // No subscribers is fine
            let _ = self.events.send(ThoughtEvent {
                iteration_id: report.iteration_id.clone(),
                agent_id: self.agent_id.clone(),
                room_id: record.room_id.clone(),
                record_id: record.id.clone(),
                text: record.text.clone(),
                is_continuation: report.is_continuation,
                timestamp: Utc::now(),
            });
        }
    }
}

/// Self-chaining scheduler: wait the interval, run one iteration, repeat.
async fn run_loop(inner: Arc<Inner>, mut stop_rx: watch::Receiver<bool>) {
    loop {
        let delay = Duration::from_millis(inner.interval_ms.load(Ordering::SeqCst));
        tokio::select! {
            _ = stop_rx.changed() => break,
            _ = tokio::time::sleep(delay) => {}
        }
        if *stop_rx.borrow() {
            break;
        }

        inner.run_iteration(Some(&stop_rx)).await;

        if *stop_rx.borrow() {
            break;
        }
    }
    tracing::debug!(room_id = %inner.context.room_id, "Autonomy scheduler exited");
}
