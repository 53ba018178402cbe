//! # Notification Catalogs
//!
//! A catalog is a closed enum whose variants are the notifications one part of
//! an application posts. Each variant maps to exactly one name, and the value
//! itself travels through the bus as the payload.
//!
//! The mapping is written once, where the enum is defined. The
//! [`notification_catalog!`](crate::notification_catalog) macro generates it:
//!
//! ```ignore
//! use typed_notify::notification_catalog;
//!
//! notification_catalog! {
//!     #[derive(Debug, Clone)]
//!     pub enum MyAppNotifs {
//!         APP_HAS_LAUNCHED => AppHasLaunched { launch_date: std::time::SystemTime },
//!         APP_DOWNLOADED_DATA => AppDownloadedData { title: String, index: i64 },
//!         APP_WILL_CRASH => AppWillCrash(String),
//!     }
//! }
//!
//! assert_eq!(MyAppNotifs::APP_DOWNLOADED_DATA.as_str(), "MyAppNotifs.AppDownloadedData");
//! ```

use crate::error::NotifyError;
use notify_bus::NotificationName;
use std::any::{type_name, Any};

/// A closed set of typed notifications, each mapped to a name.
pub trait NotificationEnum: Any + Send + Sync + 'static {
    /// Every name a value of this type can report from [`name`](Self::name).
    const NAMES: &'static [NotificationName];

    /// The name this value is posted under.
    fn name(&self) -> NotificationName;

    /// Whether `name` belongs to this catalog.
    fn declares(name: &str) -> bool
    where
        Self: Sized,
    {
        Self::NAMES.iter().any(|declared| declared.as_str() == name)
    }
}

/// Fail with [`NotifyError::NameNotInCatalog`] unless `A` declares `name`.
pub fn ensure_declared<A: NotificationEnum>(name: &NotificationName) -> Result<(), NotifyError> {
    if A::declares(name.as_str()) {
        Ok(())
    } else {
        Err(NotifyError::NameNotInCatalog {
            name: name.clone(),
            payload: type_name::<A>(),
        })
    }
}

/// Define a notification catalog enum.
///
/// Each entry is `CONST_NAME => Variant`, optionally followed by `{ fields }`
/// or `( types )`. For every entry the macro emits an associated
/// `NotificationName` constant named `CONST_NAME` with the value
/// `"<Enum>.<Variant>"`, and implements
/// [`NotificationEnum`](crate::NotificationEnum) for the enum.
#[macro_export]
macro_rules! notification_catalog {
    (
        $(#[$meta:meta])*
        $vis:vis enum $enum_name:ident {
            $(
                $(#[$vmeta:meta])*
                $const_name:ident => $variant:ident
                    $({ $($fields:tt)* })?
                    $(( $($tuple:tt)* ))?
            ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        $vis enum $enum_name {
            $(
                $(#[$vmeta])*
                $variant $({ $($fields)* })? $(( $($tuple)* ))?,
            )+
        }

        impl $enum_name {
            $(
                #[doc = concat!(
                    "Name posted by `", stringify!($enum_name), "::", stringify!($variant), "`."
                )]
                pub const $const_name: $crate::NotificationName = $crate::NotificationName::from_static(
                    concat!(stringify!($enum_name), ".", stringify!($variant)),
                );
            )+
        }

        impl $crate::NotificationEnum for $enum_name {
            const NAMES: &'static [$crate::NotificationName] = &[$(Self::$const_name),+];

            fn name(&self) -> $crate::NotificationName {
                match self {
                    $(Self::$variant { .. } => Self::$const_name,)+
                }
            }
        }
    };
}
