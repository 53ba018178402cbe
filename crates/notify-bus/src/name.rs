//! # Notification Names
//!
//! The string key that identifies a kind of notification on the bus.

use std::borrow::{Borrow, Cow};
use std::fmt;

/// Name under which notifications are posted and observed.
///
/// Names built from string literals are free to construct and can be used in
/// `const` items; names built at runtime own their string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NotificationName(Cow<'static, str>);

impl NotificationName {
    /// Create a name from a static string. Usable in `const` context.
    #[must_use]
    pub const fn from_static(raw: &'static str) -> Self {
        Self(Cow::Borrowed(raw))
    }

    /// Create a name from any string.
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        Self(Cow::Owned(raw.into()))
    }

    /// The raw string value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NotificationName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for NotificationName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for NotificationName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&'static str> for NotificationName {
    fn from(raw: &'static str) -> Self {
        Self::from_static(raw)
    }
}

impl From<String> for NotificationName {
    fn from(raw: String) -> Self {
        Self::new(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const LAUNCHED: NotificationName = NotificationName::from_static("App.launched");

    #[test]
    fn test_static_and_owned_names_are_equal() {
        let owned = NotificationName::new(String::from("App.launched"));
        assert_eq!(LAUNCHED, owned);
    }

    #[test]
    fn test_lookup_by_str() {
        let mut map = HashMap::new();
        map.insert(LAUNCHED, 1);
        assert_eq!(map.get("App.launched"), Some(&1));
    }

    #[test]
    fn test_display() {
        assert_eq!(LAUNCHED.to_string(), "App.launched");
    }
}
