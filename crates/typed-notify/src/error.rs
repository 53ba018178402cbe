//! Error types for the typed notification layer.

use notify_bus::{BusError, NotificationName};
use thiserror::Error;

/// Errors from typed registration and posting.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NotifyError {
    /// The payload type does not list this name in its catalog.
    #[error("Notification {name} is not declared by {payload}")]
    NameNotInCatalog {
        name: NotificationName,
        payload: &'static str,
    },

    /// The name is already bound to a different payload type.
    #[error("Notification {name} carries {bound}, cannot bind it to {requested}")]
    PayloadTypeConflict {
        name: NotificationName,
        bound: &'static str,
        requested: &'static str,
    },

    /// Error from the underlying bus.
    #[error("Bus error: {0}")]
    Bus(#[from] BusError),

    /// Invalid configuration value.
    #[error("Invalid configuration: {0}")]
    Config(String),
}
