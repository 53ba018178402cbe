//! Async stream of typed payloads.

use crate::token::NotificationToken;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::sync::mpsc;
use tokio_stream::Stream;

/// Stream of payloads posted under one name.
///
/// Owns its [`NotificationToken`]; dropping the stream unsubscribes.
pub struct TypedNotificationStream<A> {
    receiver: mpsc::UnboundedReceiver<Arc<A>>,
    token: NotificationToken,
}

impl<A> TypedNotificationStream<A> {
    pub(crate) fn new(receiver: mpsc::UnboundedReceiver<Arc<A>>, token: NotificationToken) -> Self {
        Self { receiver, token }
    }

    /// Receive the next payload. `None` once the observer is gone.
    pub async fn recv(&mut self) -> Option<Arc<A>> {
        self.receiver.recv().await
    }

    /// Receive without waiting.
    pub fn try_recv(&mut self) -> Option<Arc<A>> {
        self.receiver.try_recv().ok()
    }

    /// The token backing this stream.
    pub fn token(&self) -> &NotificationToken {
        &self.token
    }
}

impl<A> Unpin for TypedNotificationStream<A> {}

impl<A> Stream for TypedNotificationStream<A> {
    type Item = Arc<A>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.receiver.poll_recv(cx)
    }
}
