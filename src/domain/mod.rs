//! Domain types for Monologue
//!
//! - ThoughtRecord: a record read back from the conversational log
//! - AgentMessage: the synthetic trigger submitted to the pipeline
//! - ConversationContext: the dedicated world/room pair
//! - LoopStats / AutonomyStatus / ThoughtEvent: what the runtime reports

pub mod context;
pub mod message;
pub mod state;
pub mod thought;

pub use context::{ConversationContext, Room, World};
pub use message::{AUTONOMY_SOURCE, AgentMessage, MessageMetadata};
pub use state::{
    AutonomyStatus, LoopStats, MAX_INTERVAL_MS, MIN_INTERVAL_MS, RunState, ThoughtEvent,
    clamp_interval,
};
pub use thought::{RecordMetadata, ThoughtRecord};
