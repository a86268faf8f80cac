//! Dispatcher error types

use thiserror::Error;

/// Dispatcher-specific errors
#[derive(Debug, Error)]
pub enum DispatcherError {
    /// Sink creation error
    #[error("failed to create sink '{name}': {message}")]
    SinkCreation { name: String, message: String },

    /// Queue full - frame dropped
    #[error("queue full for sink '{sink_name}', frame {seq} dropped")]
    QueueFull { sink_name: String, seq: u64 },

    /// Sink worker is gone
    #[error("sink '{0}' is closed")]
    SinkClosed(String),
}

impl DispatcherError {
    /// Create a sink creation error
    pub fn sink_creation(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SinkCreation {
            name: name.into(),
            message: message.into(),
        }
    }
}
