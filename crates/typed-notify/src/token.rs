//! # Notification Token
//!
//! Ties the lifetime of typed observers to a value: when the token is
//! dropped, every observer it owns is removed from the bus.

use notify_bus::{NotificationCenter, NotificationName, ObserverToken};
use std::sync::{Arc, Weak};
use tracing::debug;

/// Subscription handle for one or more typed observers.
///
/// Holds a weak reference to the center, so a token never keeps the bus
/// alive. If the center is gone first, dropping the token does nothing.
#[must_use = "dropping the token removes the observer immediately"]
pub struct NotificationToken {
    tokens: Vec<ObserverToken>,
    center: Weak<NotificationCenter>,
}

impl NotificationToken {
    pub(crate) fn new(tokens: Vec<ObserverToken>, center: &Arc<NotificationCenter>) -> Self {
        Self {
            tokens,
            center: Arc::downgrade(center),
        }
    }

    /// Remove the observers now. Returns how many were removed.
    pub fn cancel(mut self) -> usize {
        self.release()
    }

    /// Whether the token still owns observers in a live center.
    #[must_use]
    pub fn is_active(&self) -> bool {
        !self.tokens.is_empty() && self.center.strong_count() > 0
    }

    /// Names covered by this token.
    pub fn names(&self) -> impl Iterator<Item = &NotificationName> {
        self.tokens.iter().filter_map(ObserverToken::name)
    }

    fn release(&mut self) -> usize {
        let tokens = std::mem::take(&mut self.tokens);
        let Some(center) = self.center.upgrade() else {
            return 0;
        };
        let removed = tokens
            .iter()
            .filter(|token| center.remove_observer(token))
            .count();
        debug!(removed, "Notification token released");
        removed
    }
}

impl Drop for NotificationToken {
    fn drop(&mut self) {
        self.release();
    }
}

impl std::fmt::Debug for NotificationToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationToken")
            .field("observers", &self.tokens.len())
            .field("active", &self.is_active())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PING: NotificationName = NotificationName::from_static("Test.ping");

    fn token_for(center: &Arc<NotificationCenter>) -> NotificationToken {
        let observer = center.add_observer(Some(PING), None, None, |_| {});
        NotificationToken::new(vec![observer], center)
    }

    #[test]
    fn test_drop_removes_observer() {
        let center = Arc::new(NotificationCenter::new());
        {
            let token = token_for(&center);
            assert!(token.is_active());
            assert_eq!(center.observer_count(), 1);
        }
        assert_eq!(center.observer_count(), 0);
    }

    #[test]
    fn test_cancel_reports_removed() {
        let center = Arc::new(NotificationCenter::new());
        let token = token_for(&center);
        assert_eq!(token.names().collect::<Vec<_>>(), vec![&PING]);
        assert_eq!(token.cancel(), 1);
        assert_eq!(center.observer_count(), 0);
    }

    #[test]
    fn test_token_outliving_center_is_inert() {
        let center = Arc::new(NotificationCenter::new());
        let token = token_for(&center);
        drop(center);

        assert!(!token.is_active());
        assert_eq!(token.cancel(), 0);
    }
}
