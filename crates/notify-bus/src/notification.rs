//! # Notifications
//!
//! The untyped unit of delivery: a name, an optional sender object and an
//! optional string-keyed map of loosely typed values.

use crate::name::NotificationName;
use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// An object attached to a post. Observers filter on it by identity.
pub type AnyObject = Arc<dyn Any + Send + Sync>;

/// Loosely typed values attached to a post.
pub type UserInfo = HashMap<String, Arc<dyn Any + Send + Sync>>;

/// Compare two objects by identity (same allocation).
#[must_use]
pub fn same_object(a: &AnyObject, b: &AnyObject) -> bool {
    std::ptr::eq(
        Arc::as_ptr(a).cast::<()>(),
        Arc::as_ptr(b).cast::<()>(),
    )
}

/// A notification as carried by the bus.
#[derive(Clone)]
pub struct Notification {
    /// Name the notification was posted under.
    pub name: NotificationName,
    /// Object attached by the poster, if any.
    pub object: Option<AnyObject>,
    /// Untyped payload, if any.
    pub user_info: Option<UserInfo>,
}

impl Notification {
    /// Create a notification with no object and no user info.
    #[must_use]
    pub fn new(name: NotificationName) -> Self {
        Self {
            name,
            object: None,
            user_info: None,
        }
    }

    /// Attach a sender object.
    #[must_use]
    pub fn with_object(mut self, object: AnyObject) -> Self {
        self.object = Some(object);
        self
    }

    /// Attach a user info map.
    #[must_use]
    pub fn with_user_info(mut self, user_info: UserInfo) -> Self {
        self.user_info = Some(user_info);
        self
    }

    /// Look up a user info value and downcast it.
    ///
    /// Returns `None` if the key is missing or holds another type.
    #[must_use]
    pub fn user_info_value<T: Any>(&self, key: &str) -> Option<&T> {
        self.user_info
            .as_ref()
            .and_then(|info| info.get(key))
            .and_then(|value| value.downcast_ref::<T>())
    }
}

impl fmt::Debug for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let keys: Vec<&str> = self
            .user_info
            .iter()
            .flat_map(|info| info.keys().map(String::as_str))
            .collect();
        f.debug_struct("Notification")
            .field("name", &self.name)
            .field("has_object", &self.object.is_some())
            .field("user_info_keys", &keys)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_info_value_downcast() {
        let mut info = UserInfo::new();
        info.insert("count".to_string(), Arc::new(5_u32));
        let note = Notification::new(NotificationName::from_static("Test.count"))
            .with_user_info(info);

        assert_eq!(note.user_info_value::<u32>("count"), Some(&5));
        assert_eq!(note.user_info_value::<i64>("count"), None);
        assert_eq!(note.user_info_value::<u32>("missing"), None);
    }

    #[test]
    fn test_same_object_identity() {
        let a: AnyObject = Arc::new(String::from("sender"));
        let b: AnyObject = Arc::new(String::from("sender"));
        let a2 = Arc::clone(&a);

        assert!(same_object(&a, &a2));
        assert!(!same_object(&a, &b));
    }

    #[test]
    fn test_debug_hides_values() {
        let note = Notification::new(NotificationName::from_static("Test.debug"));
        let rendered = format!("{note:?}");
        assert!(rendered.contains("Test.debug"));
        assert!(rendered.contains("has_object: false"));
    }
}
