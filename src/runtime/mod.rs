//! Autonomy runtime - lifecycle controller and the per-iteration think cycle
//!
//! The runtime:
//! - Schedules iterations one at a time, each after the previous settles
//! - Reconciles actual run state against the persisted `enabled` flag
//! - Isolates every per-iteration failure so the loop never stops on its own

pub mod cycle;
pub mod service;

pub use cycle::{IterationOutcome, IterationReport, ThinkCycle};
pub use service::{AutonomyService, Collaborators, ReconcileAction};
