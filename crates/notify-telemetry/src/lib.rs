//! # Notify Telemetry
//!
//! Structured logging for services built on typed notifications.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use notify_telemetry::{init_logging, TelemetryConfig};
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = TelemetryConfig::from_env();
//!     let _guard = init_logging(&config)?;
//!
//!     // tracing macros now write through the configured subscriber
//!     Ok(())
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `NOTIFY_SERVICE_NAME` | `typed-notify` | Service name in the startup line |
//! | `NOTIFY_LOG_LEVEL` | `RUST_LOG`, then `info` | Filter directive |
//! | `NOTIFY_CONSOLE_OUTPUT` | `true` | Write log lines to the console |
//! | `NOTIFY_JSON_LOGS` | `false` | JSON instead of pretty output |

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod config;
mod logging;

pub use config::TelemetryConfig;
pub use logging::{init_logging, LoggingGuard};

use thiserror::Error;

/// Logging initialization errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TelemetryError {
    #[error("Global subscriber already installed: {0}")]
    AlreadyInitialized(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}
