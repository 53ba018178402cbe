//! # Notification Center
//!
//! The posting and observing side of the bus.
//!
//! Observers register for a name (or for every name), optionally filtered to a
//! single sender object, and are invoked either synchronously on the posting
//! thread or through a [`DeliveryQueue`].

use crate::name::NotificationName;
use crate::notification::{same_object, AnyObject, Notification, UserInfo};
use crate::queue::DeliveryQueue;
use crate::subscriber::NotificationStream;
use lazy_static::lazy_static;
use parking_lot::RwLock;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, trace, warn};
use uuid::Uuid;

/// Callback invoked for every matching notification.
pub type ObserverBlock = Arc<dyn Fn(&Notification) + Send + Sync + 'static>;

lazy_static! {
    static ref DEFAULT_CENTER: Arc<NotificationCenter> = Arc::new(NotificationCenter::new());
}

/// Opaque handle for a registered observer.
///
/// Pass it to [`NotificationCenter::remove_observer`] to stop delivery. The
/// bus token does not unregister on drop; the typed layer wraps it for that.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObserverToken {
    id: Uuid,
    name: Option<NotificationName>,
}

impl ObserverToken {
    /// Unique id of the registration.
    #[must_use]
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// The name observed, or `None` for a wildcard observer.
    #[must_use]
    pub fn name(&self) -> Option<&NotificationName> {
        self.name.as_ref()
    }
}

/// Counters for the bus.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BusStats {
    /// Notifications posted, with or without observers.
    pub notifications_posted: u64,
    /// Deliveries handed to observers (sync calls plus queued jobs).
    pub deliveries: u64,
    /// Observers currently registered.
    pub observers: usize,
}

struct ObserverEntry {
    id: Uuid,
    object: Option<AnyObject>,
    queue: Option<DeliveryQueue>,
    block: ObserverBlock,
    active: AtomicBool,
}

impl ObserverEntry {
    fn accepts(&self, notification: &Notification) -> bool {
        match (&self.object, &notification.object) {
            (None, _) => true,
            (Some(wanted), Some(posted)) => same_object(wanted, posted),
            (Some(_), None) => false,
        }
    }

    fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }
}

#[derive(Default)]
struct ObserverTable {
    named: HashMap<NotificationName, Vec<Arc<ObserverEntry>>>,
    wildcard: Vec<Arc<ObserverEntry>>,
}

impl ObserverTable {
    fn len(&self) -> usize {
        self.named.values().map(Vec::len).sum::<usize>() + self.wildcard.len()
    }

    fn matching(&self, notification: &Notification) -> Vec<Arc<ObserverEntry>> {
        self.named
            .get(&notification.name)
            .into_iter()
            .flatten()
            .chain(self.wildcard.iter())
            .filter(|entry| entry.accepts(notification))
            .cloned()
            .collect()
    }
}

/// In-memory notification center.
///
/// Suitable for single-process use. Any number of observers may register for
/// the same name; each receives its own delivery.
pub struct NotificationCenter {
    /// Registered observers, keyed by name.
    observers: RwLock<ObserverTable>,

    /// Total notifications posted.
    notifications_posted: AtomicU64,

    /// Total deliveries handed out.
    deliveries: AtomicU64,
}

impl NotificationCenter {
    /// Create an empty center.
    #[must_use]
    pub fn new() -> Self {
        Self {
            observers: RwLock::new(ObserverTable::default()),
            notifications_posted: AtomicU64::new(0),
            deliveries: AtomicU64::new(0),
        }
    }

    /// The process-wide shared center.
    #[must_use]
    pub fn default_center() -> Arc<Self> {
        Arc::clone(&DEFAULT_CENTER)
    }

    /// Register an observer.
    ///
    /// - `name`: the name to observe, or `None` for every name.
    /// - `object`: only deliver posts carrying this exact object.
    /// - `queue`: run the block on this queue instead of the posting thread.
    pub fn add_observer<F>(
        &self,
        name: Option<NotificationName>,
        object: Option<AnyObject>,
        queue: Option<DeliveryQueue>,
        block: F,
    ) -> ObserverToken
    where
        F: Fn(&Notification) + Send + Sync + 'static,
    {
        let id = Uuid::new_v4();
        let entry = Arc::new(ObserverEntry {
            id,
            object,
            queue,
            block: Arc::new(block),
            active: AtomicBool::new(true),
        });

        {
            let mut table = self.observers.write();
            match &name {
                Some(name) => table.named.entry(name.clone()).or_default().push(entry),
                None => table.wildcard.push(entry),
            }
        }

        debug!(
            name = name.as_ref().map_or("*", NotificationName::as_str),
            observer = %id,
            "Observer added"
        );

        ObserverToken { id, name }
    }

    /// Remove an observer. Returns `false` if it was already gone.
    pub fn remove_observer(&self, token: &ObserverToken) -> bool {
        let removed = {
            let mut table = self.observers.write();
            let list = match &token.name {
                Some(name) => table.named.get_mut(name),
                None => Some(&mut table.wildcard),
            };
            let removed = list.and_then(|list| {
                let index = list.iter().position(|entry| entry.id == token.id)?;
                Some(list.remove(index))
            });
            if let Some(name) = &token.name {
                if table.named.get(name).is_some_and(Vec::is_empty) {
                    table.named.remove(name);
                }
            }
            removed
        };

        match removed {
            Some(entry) => {
                entry.active.store(false, Ordering::Release);
                debug!(observer = %token.id, "Observer removed");
                true
            }
            None => false,
        }
    }

    /// Post a notification to every matching observer.
    ///
    /// Returns the number of observers the notification was handed to.
    pub fn post(&self, notification: Notification) -> usize {
        self.notifications_posted.fetch_add(1, Ordering::Relaxed);

        // Snapshot so observers can add or remove observers while running.
        let targets = self.observers.read().matching(&notification);
        if targets.is_empty() {
            trace!(name = %notification.name, "Notification posted with no observers");
            return 0;
        }

        let shared = Arc::new(notification);
        let mut delivered = 0;
        for entry in targets {
            if !entry.is_active() {
                continue;
            }
            match &entry.queue {
                None => {
                    (entry.block)(shared.as_ref());
                    delivered += 1;
                }
                Some(queue) => {
                    let job_entry = Arc::clone(&entry);
                    let job_note = Arc::clone(&shared);
                    let queued = queue.enqueue(move || {
                        if job_entry.is_active() {
                            (job_entry.block)(job_note.as_ref());
                        }
                    });
                    match queued {
                        Ok(()) => delivered += 1,
                        Err(e) => warn!(
                            name = %shared.name,
                            observer = %entry.id,
                            error = %e,
                            "Queued delivery dropped"
                        ),
                    }
                }
            }
        }

        self.deliveries.fetch_add(delivered as u64, Ordering::Relaxed);
        debug!(name = %shared.name, observers = delivered, "Notification posted");
        delivered
    }

    /// Build and post a notification in one call.
    pub fn post_name(
        &self,
        name: NotificationName,
        object: Option<AnyObject>,
        user_info: Option<UserInfo>,
    ) -> usize {
        self.post(Notification {
            name,
            object,
            user_info,
        })
    }

    /// Receive notifications for `name` as an async stream.
    ///
    /// The observer is removed when the stream is dropped.
    #[must_use]
    pub fn notifications(self: &Arc<Self>, name: NotificationName) -> NotificationStream {
        let (sender, receiver) = mpsc::unbounded_channel();
        let token = self.add_observer(Some(name), None, None, move |note| {
            // Receiver gone means the stream is being dropped.
            let _ = sender.send(note.clone());
        });
        NotificationStream::new(receiver, token, Arc::downgrade(self))
    }

    /// Number of registered observers.
    #[must_use]
    pub fn observer_count(&self) -> usize {
        self.observers.read().len()
    }

    /// Number of observers registered for exactly `name` (wildcards excluded).
    #[must_use]
    pub fn observer_count_for(&self, name: &str) -> usize {
        self.observers.read().named.get(name).map_or(0, Vec::len)
    }

    /// Current counters.
    #[must_use]
    pub fn stats(&self) -> BusStats {
        BusStats {
            notifications_posted: self.notifications_posted.load(Ordering::Relaxed),
            deliveries: self.deliveries.load(Ordering::Relaxed),
            observers: self.observer_count(),
        }
    }
}

impl Default for NotificationCenter {
    fn default() -> Self {
        Self::new()
    }
}
