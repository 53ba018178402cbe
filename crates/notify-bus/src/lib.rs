//! # Notify Bus - In-Process Notification Center
//!
//! An untyped broadcast bus: notifications are identified by a string name
//! and carry an optional sender object plus a loosely typed user info map.
//!
//! ```text
//! ┌──────────────┐                    ┌──────────────┐
//! │   Poster     │                    │   Observer   │
//! │              │    post(name)      │              │
//! │              │ ──────┐            │              │
//! └──────────────┘       │            └──────────────┘
//!                        ▼                    ↑
//!                ┌────────────────────┐       │
//!                │ NotificationCenter │ ──────┘
//!                │  name -> observers │  sync call or DeliveryQueue
//!                └────────────────────┘
//! ```
//!
//! ## Delivery
//!
//! - Any number of observers per name, plus wildcard observers.
//! - Synchronous on the posting thread, or deferred through a [`DeliveryQueue`].
//! - No ordering guarantee between different names.
//!
//! Payloads are untyped here. The `typed-notify` crate layers a typed
//! contract on top.

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod center;
pub mod error;
pub mod name;
pub mod notification;
pub mod queue;
pub mod subscriber;

// Re-export main types
pub use center::{BusStats, NotificationCenter, ObserverBlock, ObserverToken};
pub use error::BusError;
pub use name::NotificationName;
pub use notification::{same_object, AnyObject, Notification, UserInfo};
pub use queue::DeliveryQueue;
pub use subscriber::NotificationStream;
