//! Monologue - a self-driving autonomous thought loop
//!
//! Monologue periodically prompts an agent's own message pipeline to think, chains
//! each thought onto the previous one, and publishes what comes back. It is driven
//! entirely through injected collaborators (settings, memory log, pipeline, broadcast)
//! plus programmatic `start()` / `stop()` / `set_interval()`.

pub mod config;
pub mod context;
pub mod continuity;
pub mod domain;
pub mod error;
pub mod harvest;
pub mod id;
pub mod memory;
pub mod pipeline;
pub mod prompt;
pub mod publish;
pub mod runtime;
pub mod settings;

pub use config::Config;
pub use error::{MonologueError, Result};
pub use runtime::{AutonomyService, Collaborators, IterationOutcome, ReconcileAction};
