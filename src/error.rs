//! Error types for Monologue
//!
//! Centralized error handling using thiserror. Every variant is recoverable from the
//! loop's point of view: the runtime logs it and keeps scheduling.

use thiserror::Error;

/// All error types that can occur in Monologue
#[derive(Debug, Error)]
pub enum MonologueError {
    /// Memory/log store read failed
    #[error("Store error: {0}")]
    Store(String),

    /// Handing a message to the processing pipeline failed
    #[error("Pipeline error: {0}")]
    Pipeline(String),

    /// Broadcast boundary rejected or never received the thought
    #[error("Publish error ({status:?}): {message}")]
    Publish { status: Option<u16>, message: String },

    /// Settings store read/write failed
    #[error("Settings error: {0}")]
    Settings(String),

    /// World/room provisioning failed
    #[error("Context error: {0}")]
    Context(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP transport error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// SQLite error
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

impl MonologueError {
    /// Build a publish error from a non-success HTTP status.
    pub fn publish_status(status: u16, message: impl Into<String>) -> Self {
        Self::Publish {
            status: Some(status),
            message: message.into(),
        }
    }
}

/// Result type alias for Monologue operations
pub type Result<T> = std::result::Result<T, MonologueError>;
