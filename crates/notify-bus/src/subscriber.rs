//! # Notification Stream
//!
//! Async consumption of notifications for one name.

use crate::center::{NotificationCenter, ObserverToken};
use crate::notification::Notification;
use std::pin::Pin;
use std::sync::Weak;
use std::task::{Context, Poll};
use tokio::sync::mpsc;
use tokio_stream::Stream;
use tracing::debug;

/// A stream of notifications posted under one name.
///
/// When dropped, the underlying observer is removed from the center.
pub struct NotificationStream {
    /// Notifications forwarded by the observer.
    receiver: mpsc::UnboundedReceiver<Notification>,

    /// Registration to remove on drop.
    token: ObserverToken,

    /// Center the observer lives in.
    center: Weak<NotificationCenter>,
}

impl NotificationStream {
    pub(crate) fn new(
        receiver: mpsc::UnboundedReceiver<Notification>,
        token: ObserverToken,
        center: Weak<NotificationCenter>,
    ) -> Self {
        Self {
            receiver,
            token,
            center,
        }
    }

    /// Receive the next notification.
    ///
    /// # Returns
    ///
    /// - `Some(notification)` - The next notification
    /// - `None` - The observer was removed
    pub async fn recv(&mut self) -> Option<Notification> {
        self.receiver.recv().await
    }

    /// Receive without waiting. `None` if nothing is pending.
    pub fn try_recv(&mut self) -> Option<Notification> {
        self.receiver.try_recv().ok()
    }

    /// The registration backing this stream.
    #[must_use]
    pub fn token(&self) -> &ObserverToken {
        &self.token
    }
}

impl Stream for NotificationStream {
    type Item = Notification;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.receiver.poll_recv(cx)
    }
}

impl Drop for NotificationStream {
    fn drop(&mut self) {
        if let Some(center) = self.center.upgrade() {
            center.remove_observer(&self.token);
        }
        debug!(observer = %self.token.id(), "Notification stream dropped");
    }
}
