//! # Typed Notify - Typed Notifications over an Untyped Bus
//!
//! The bus identifies notifications by a string name and carries an untyped
//! user info map. Callers have to cast payloads by hand, and nothing stops
//! them from observing a name with the wrong payload type.
//!
//! This crate layers a typed contract on top:
//!
//! - **Catalogs**: a closed enum implements [`NotificationEnum`]; every
//!   variant maps to one name. [`notification_catalog!`] writes the mapping.
//! - **Payload transport**: posting stores the enum value under
//!   [`PAYLOAD_KEY`] and extraction downcasts it back.
//! - **Registry**: [`PayloadRegistry`] binds each name to one payload type.
//!   Observing or posting a name as another type fails when the observer is
//!   added, not when the first notification arrives.
//! - **Tokens**: every observer is owned by a [`NotificationToken`]; dropping
//!   it unsubscribes.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use typed_notify::{notification_catalog, TypedNotificationCenter};
//!
//! notification_catalog! {
//!     #[derive(Debug, Clone)]
//!     pub enum MyAppNotifs {
//!         APP_DOWNLOADED_DATA => AppDownloadedData { title: String, index: i64 },
//!     }
//! }
//!
//! let center = TypedNotificationCenter::default_center();
//! let _token = center.observe(MyAppNotifs::APP_DOWNLOADED_DATA, |note: &MyAppNotifs| {
//!     if let MyAppNotifs::AppDownloadedData { title, index } = note {
//!         println!("title: {title}, index: {index}");
//!     }
//! })?;
//!
//! center.post(MyAppNotifs::AppDownloadedData { title: "Test".into(), index: 5 })?;
//! ```
//!
//! ## Limits
//!
//! The name-to-type relationship is checked at runtime, once per binding. It
//! is not a compile-time proof: a raw post through the untyped bus under a
//! bound name still reaches typed observers, which then apply the configured
//! [`MismatchPolicy`].

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod catalog;
pub mod center;
pub mod config;
pub mod error;
pub mod registry;
pub mod stream;
pub mod token;

// Re-export main types
pub use catalog::{ensure_declared, NotificationEnum};
pub use center::{NotifyStats, TypedNotificationCenter};
pub use config::{MismatchPolicy, TypedCenterConfig};
pub use error::NotifyError;
pub use registry::{PayloadRegistry, PayloadType};
pub use stream::TypedNotificationStream;
pub use token::NotificationToken;

pub use notify_bus::{AnyObject, DeliveryQueue, NotificationCenter, NotificationName};

/// User info key the typed payload travels under.
pub const PAYLOAD_KEY: &str = "_$key$_";
