//! Error types for the notification bus.

use thiserror::Error;

/// Errors from bus operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BusError {
    /// Queued delivery needs a running tokio runtime.
    #[error("No tokio runtime available for delivery queue {queue}")]
    NoRuntime { queue: String },

    /// The delivery queue worker has stopped.
    #[error("Delivery queue {queue} is closed")]
    QueueClosed { queue: String },
}
