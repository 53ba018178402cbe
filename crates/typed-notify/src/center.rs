//! # Typed Notification Center
//!
//! Wraps a [`NotificationCenter`] so that callers post catalog values and
//! observe them as typed payloads.
//!
//! ## Wire protocol
//!
//! ```text
//! post(MyAppNotifs::AppDownloadedData { .. })
//!     │
//!     ├── name      = value.name()            ("MyAppNotifs.AppDownloadedData")
//!     ├── user_info = { PAYLOAD_KEY: value }
//!     ▼
//! NotificationCenter ──► observer: user_info[PAYLOAD_KEY].downcast::<MyAppNotifs>()
//! ```
//!
//! Names and payload types are checked against the [`PayloadRegistry`] when an
//! observer is added and when a value is posted, so a mismatched observer is
//! rejected up front instead of failing on its first delivery.

use crate::catalog::{ensure_declared, NotificationEnum};
use crate::config::{MismatchPolicy, TypedCenterConfig};
use crate::error::NotifyError;
use crate::registry::PayloadRegistry;
use crate::stream::TypedNotificationStream;
use crate::token::NotificationToken;
use crate::PAYLOAD_KEY;
use lazy_static::lazy_static;
use notify_bus::{
    AnyObject, BusStats, DeliveryQueue, Notification, NotificationCenter, NotificationName,
    UserInfo,
};
use serde::Serialize;
use std::any::type_name;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, trace};

#[derive(Debug, Default)]
struct Counters {
    posted: AtomicU64,
    delivered: AtomicU64,
    mismatched: AtomicU64,
}

lazy_static! {
    // Counters of the process-wide typed center, shared by every handle.
    static ref DEFAULT_COUNTERS: Arc<Counters> = Arc::new(Counters::default());
}

/// Counters for the typed layer, with the bus counters underneath.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NotifyStats {
    /// Typed notifications posted.
    pub posted: u64,
    /// Typed payloads handed to observers and streams.
    pub delivered: u64,
    /// Deliveries that did not carry the expected payload type.
    pub mismatched: u64,
    /// Names bound in the registry.
    pub bound_names: usize,
    /// Counters of the underlying bus.
    pub bus: BusStats,
}

/// Typed front end to a notification center.
///
/// Cheap to clone; clones share the bus, the registry and the counters.
#[derive(Clone)]
pub struct TypedNotificationCenter {
    center: Arc<NotificationCenter>,
    registry: Arc<PayloadRegistry>,
    config: TypedCenterConfig,
    counters: Arc<Counters>,
}

impl TypedNotificationCenter {
    /// Wrap a center with a fresh registry and default configuration.
    #[must_use]
    pub fn new(center: Arc<NotificationCenter>) -> Self {
        Self::with_config(center, TypedCenterConfig::default())
    }

    /// Wrap a center with a fresh registry.
    #[must_use]
    pub fn with_config(center: Arc<NotificationCenter>, config: TypedCenterConfig) -> Self {
        Self::with_registry(center, Arc::new(PayloadRegistry::new()), config)
    }

    /// Wrap a center with an existing registry.
    ///
    /// Every typed center over the same bus should share one registry, or
    /// the name bindings of one are invisible to the other.
    #[must_use]
    pub fn with_registry(
        center: Arc<NotificationCenter>,
        registry: Arc<PayloadRegistry>,
        config: TypedCenterConfig,
    ) -> Self {
        Self::from_parts(center, registry, config, Arc::new(Counters::default()))
    }

    /// Typed center over the process-wide bus and registry, configured from
    /// the environment.
    ///
    /// Every handle returned here shares the same counters, so `stats()`
    /// reports process-wide totals from any of them.
    #[must_use]
    pub fn default_center() -> Self {
        Self::from_parts(
            NotificationCenter::default_center(),
            PayloadRegistry::shared(),
            TypedCenterConfig::from_env(),
            Arc::clone(&DEFAULT_COUNTERS),
        )
    }

    fn from_parts(
        center: Arc<NotificationCenter>,
        registry: Arc<PayloadRegistry>,
        config: TypedCenterConfig,
        counters: Arc<Counters>,
    ) -> Self {
        Self {
            center,
            registry,
            config,
            counters,
        }
    }

    /// The underlying untyped bus.
    #[must_use]
    pub fn bus(&self) -> &Arc<NotificationCenter> {
        &self.center
    }

    /// The name-to-type registry.
    #[must_use]
    pub fn registry(&self) -> &PayloadRegistry {
        &self.registry
    }

    /// Active configuration.
    #[must_use]
    pub fn config(&self) -> &TypedCenterConfig {
        &self.config
    }

    /// Create a delivery queue on the current runtime.
    ///
    /// # Errors
    ///
    /// `NotifyError::Bus` if no tokio runtime is running.
    pub fn queue(&self, label: impl Into<String>) -> Result<DeliveryQueue, NotifyError> {
        Ok(DeliveryQueue::new(label)?)
    }

    /// Bind every name of `A`'s catalog to `A`.
    ///
    /// Optional: observing and posting bind names lazily. Registering up front
    /// surfaces catalog collisions at startup.
    ///
    /// # Errors
    ///
    /// `NotifyError::PayloadTypeConflict` if any name is owned by another type.
    pub fn register<A: NotificationEnum>(&self) -> Result<usize, NotifyError> {
        self.registry.register::<A>()
    }

    /// Post a catalog value.
    ///
    /// Returns the number of observers it was handed to.
    ///
    /// # Errors
    ///
    /// When `validate_on_post` is set: `NameNotInCatalog` if the value's name
    /// is missing from its own catalog, `PayloadTypeConflict` if the name is
    /// bound to another type.
    pub fn post<A: NotificationEnum>(&self, notification: A) -> Result<usize, NotifyError> {
        self.post_inner(notification, None)
    }

    /// Post a catalog value with a sender object attached.
    ///
    /// # Errors
    ///
    /// Same as [`post`](Self::post).
    pub fn post_with_object<A: NotificationEnum>(
        &self,
        notification: A,
        object: AnyObject,
    ) -> Result<usize, NotifyError> {
        self.post_inner(notification, Some(object))
    }

    fn post_inner<A: NotificationEnum>(
        &self,
        notification: A,
        object: Option<AnyObject>,
    ) -> Result<usize, NotifyError> {
        let name = notification.name();
        if self.config.validate_on_post {
            self.claim::<A>(&name)?;
        }

        let mut user_info = UserInfo::with_capacity(1);
        user_info.insert(PAYLOAD_KEY.to_string(), Arc::new(notification));

        self.counters.posted.fetch_add(1, Ordering::Relaxed);
        let observers = self
            .center
            .post_name(name.clone(), object, Some(user_info));

        trace!(
            name = %name,
            payload = type_name::<A>(),
            observers,
            "Typed notification posted"
        );
        Ok(observers)
    }

    /// Observe `name`, receiving payloads of type `A`.
    ///
    /// - `object`: only deliver posts carrying this exact object.
    /// - `queue`: deliver on this queue instead of the posting thread.
    ///
    /// The block receives the payload and the object attached to the post.
    /// An unfiltered observer therefore still sees the sender, rather than
    /// `None`.
    ///
    /// # Errors
    ///
    /// `NameNotInCatalog` if `A` does not declare `name`;
    /// `PayloadTypeConflict` if `name` is bound to another type.
    pub fn add_observer<A, F>(
        &self,
        name: NotificationName,
        object: Option<AnyObject>,
        queue: Option<DeliveryQueue>,
        block: F,
    ) -> Result<NotificationToken, NotifyError>
    where
        A: NotificationEnum,
        F: Fn(&A, Option<&AnyObject>) + Send + Sync + 'static,
    {
        self.claim::<A>(&name)?;
        let handler = self.handler::<A, F>(Arc::new(block));
        let token = self.center.add_observer(Some(name), object, queue, handler);
        Ok(NotificationToken::new(vec![token], &self.center))
    }

    /// Observe `name` synchronously, ignoring the sender object.
    ///
    /// # Errors
    ///
    /// Same as [`add_observer`](Self::add_observer).
    pub fn observe<A, F>(&self, name: NotificationName, block: F) -> Result<NotificationToken, NotifyError>
    where
        A: NotificationEnum,
        F: Fn(&A) + Send + Sync + 'static,
    {
        self.add_observer(name, None, None, move |payload: &A, _: Option<&AnyObject>| {
            block(payload)
        })
    }

    /// Observe every name in `A`'s catalog with a single token.
    ///
    /// No name is passed, so the name and the payload type cannot disagree.
    ///
    /// # Errors
    ///
    /// `PayloadTypeConflict` if any catalog name is owned by another type.
    pub fn observe_all<A, F>(&self, block: F) -> Result<NotificationToken, NotifyError>
    where
        A: NotificationEnum,
        F: Fn(&A, Option<&AnyObject>) + Send + Sync + 'static,
    {
        self.registry.register::<A>()?;

        let block = Arc::new(block);
        let tokens = A::NAMES
            .iter()
            .map(|name| {
                self.center.add_observer(
                    Some(name.clone()),
                    None,
                    None,
                    self.handler::<A, F>(Arc::clone(&block)),
                )
            })
            .collect();

        debug!(
            payload = type_name::<A>(),
            names = A::NAMES.len(),
            "Observing whole notification catalog"
        );
        Ok(NotificationToken::new(tokens, &self.center))
    }

    /// Receive payloads posted under `name` as an async stream.
    ///
    /// # Errors
    ///
    /// Same as [`add_observer`](Self::add_observer).
    pub fn stream<A: NotificationEnum>(
        &self,
        name: NotificationName,
    ) -> Result<TypedNotificationStream<A>, NotifyError> {
        self.claim::<A>(&name)?;

        let (sender, receiver) = mpsc::unbounded_channel::<Arc<A>>();
        let counters = Arc::clone(&self.counters);
        let policy = self.config.mismatch_policy;
        let handler = move |note: &Notification| match shared_payload::<A>(note) {
            Some(payload) => {
                counters.delivered.fetch_add(1, Ordering::Relaxed);
                // Receiver gone means the stream is being dropped.
                let _ = sender.send(payload);
            }
            None => on_mismatch::<A>(policy, &counters, note),
        };

        let token = self.center.add_observer(Some(name), None, None, handler);
        Ok(TypedNotificationStream::new(
            receiver,
            NotificationToken::new(vec![token], &self.center),
        ))
    }

    /// Current counters.
    #[must_use]
    pub fn stats(&self) -> NotifyStats {
        NotifyStats {
            posted: self.counters.posted.load(Ordering::Relaxed),
            delivered: self.counters.delivered.load(Ordering::Relaxed),
            mismatched: self.counters.mismatched.load(Ordering::Relaxed),
            bound_names: self.registry.len(),
            bus: self.center.stats(),
        }
    }

    fn claim<A: NotificationEnum>(&self, name: &NotificationName) -> Result<(), NotifyError> {
        ensure_declared::<A>(name)?;
        self.registry.bind::<A>(name)?;
        Ok(())
    }

    fn handler<A, F>(&self, block: Arc<F>) -> impl Fn(&Notification) + Send + Sync + 'static
    where
        A: NotificationEnum,
        F: Fn(&A, Option<&AnyObject>) + Send + Sync + 'static,
    {
        let counters = Arc::clone(&self.counters);
        let policy = self.config.mismatch_policy;
        move |note: &Notification| match note.user_info_value::<A>(PAYLOAD_KEY) {
            Some(payload) => {
                counters.delivered.fetch_add(1, Ordering::Relaxed);
                (*block)(payload, note.object.as_ref());
            }
            None => on_mismatch::<A>(policy, &counters, note),
        }
    }
}

impl std::fmt::Debug for TypedNotificationCenter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypedNotificationCenter")
            .field("registry", &self.registry)
            .field("config", &self.config)
            .finish()
    }
}

fn shared_payload<A: NotificationEnum>(note: &Notification) -> Option<Arc<A>> {
    let value = note.user_info.as_ref()?.get(PAYLOAD_KEY)?;
    Arc::clone(value).downcast::<A>().ok()
}

fn on_mismatch<A>(policy: MismatchPolicy, counters: &Counters, note: &Notification) {
    counters.mismatched.fetch_add(1, Ordering::Relaxed);
    match policy {
        MismatchPolicy::Drop => error!(
            name = %note.name,
            expected = type_name::<A>(),
            "Notification payload missing or of another type, delivery dropped"
        ),
        MismatchPolicy::Panic => panic!(
            "notification {} does not carry a {} payload",
            note.name,
            type_name::<A>()
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::time::Duration;
    use tokio::time::timeout;

    crate::notification_catalog! {
        #[derive(Debug, Clone, PartialEq)]
        enum AppNotifs {
            LAUNCHED => Launched { at: u64 },
            DOWNLOADED => Downloaded { title: String, index: i64 },
        }
    }

    crate::notification_catalog! {
        #[derive(Debug, Clone, PartialEq)]
        enum OtherNotifs {
            #[allow(dead_code)]
            WRONG => SomethingIsWrong,
        }
    }

    fn typed() -> TypedNotificationCenter {
        TypedNotificationCenter::new(Arc::new(NotificationCenter::new()))
    }

    fn recorder<A: Clone + Send + 'static>() -> (Arc<Mutex<Vec<A>>>, impl Fn(&A) + Send + Sync + 'static) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let inner = Arc::clone(&seen);
        (seen, move |payload: &A| inner.lock().push(payload.clone()))
    }

    #[test]
    fn test_post_and_observe() {
        let center = typed();
        let (seen, block) = recorder::<AppNotifs>();
        let _token = center.observe::<AppNotifs, _>(AppNotifs::DOWNLOADED, block).expect("observe");

        let delivered = center
            .post(AppNotifs::Downloaded {
                title: "Test".to_string(),
                index: 5,
            })
            .expect("post");

        assert_eq!(delivered, 1);
        assert_eq!(
            *seen.lock(),
            vec![AppNotifs::Downloaded {
                title: "Test".to_string(),
                index: 5
            }]
        );
    }

    #[test]
    fn test_other_variants_not_delivered_to_named_observer() {
        let center = typed();
        let (seen, block) = recorder::<AppNotifs>();
        let _token = center.observe::<AppNotifs, _>(AppNotifs::DOWNLOADED, block).expect("observe");

        center.post(AppNotifs::Launched { at: 1 }).expect("post");
        assert!(seen.lock().is_empty());
    }

    #[test]
    fn test_mismatched_observer_rejected_at_registration() {
        let center = typed();
        let result = center.observe::<OtherNotifs, _>(AppNotifs::DOWNLOADED, |_: &OtherNotifs| {});

        match result {
            Err(NotifyError::NameNotInCatalog { name, payload }) => {
                assert_eq!(name, AppNotifs::DOWNLOADED);
                assert!(payload.ends_with("OtherNotifs"));
            }
            other => panic!("Expected NameNotInCatalog, got {other:?}"),
        }
        assert_eq!(center.bus().observer_count(), 0);
    }

    #[test]
    fn test_post_binds_name() {
        let center = typed();
        center.post(AppNotifs::Launched { at: 7 }).expect("post");
        assert!(center.registry().is_bound_to::<AppNotifs>("AppNotifs.Launched"));
        assert!(center.registry().binding("AppNotifs.Downloaded").is_none());
    }

    #[test]
    fn test_sender_object_passed_to_block() {
        let center = typed();
        let sender: AnyObject = Arc::new("downloader".to_string());
        let received = Arc::new(Mutex::new(None));
        let slot = Arc::clone(&received);

        let _token = center
            .add_observer(
                AppNotifs::LAUNCHED,
                None,
                None,
                move |_: &AppNotifs, object: Option<&AnyObject>| {
                    *slot.lock() = object.cloned();
                },
            )
            .expect("observe");

        center
            .post_with_object(AppNotifs::Launched { at: 1 }, Arc::clone(&sender))
            .expect("post");

        let got = received.lock().clone().expect("object delivered");
        assert!(notify_bus::same_object(&got, &sender));
    }

    #[test]
    fn test_token_drop_unsubscribes() {
        let center = typed();
        let (seen, block) = recorder::<AppNotifs>();
        let token = center.observe::<AppNotifs, _>(AppNotifs::LAUNCHED, block).expect("observe");

        center.post(AppNotifs::Launched { at: 1 }).expect("post");
        drop(token);
        center.post(AppNotifs::Launched { at: 2 }).expect("post");

        assert_eq!(*seen.lock(), vec![AppNotifs::Launched { at: 1 }]);
        assert_eq!(center.bus().observer_count(), 0);
    }

    #[test]
    fn test_untyped_post_under_bound_name_is_dropped() {
        let center = typed();
        let (seen, block) = recorder::<AppNotifs>();
        let _token = center.observe::<AppNotifs, _>(AppNotifs::LAUNCHED, block).expect("observe");

        center
            .bus()
            .post(Notification::new(AppNotifs::LAUNCHED));

        assert!(seen.lock().is_empty());
        assert_eq!(center.stats().mismatched, 1);
        assert_eq!(center.stats().delivered, 0);
    }

    #[test]
    #[should_panic(expected = "does not carry")]
    fn test_panic_policy() {
        let config = TypedCenterConfig {
            mismatch_policy: MismatchPolicy::Panic,
            ..TypedCenterConfig::default()
        };
        let center = TypedNotificationCenter::with_config(Arc::new(NotificationCenter::new()), config);
        let _token = center
            .observe::<AppNotifs, _>(AppNotifs::LAUNCHED, |_: &AppNotifs| {})
            .expect("observe");

        center.bus().post(Notification::new(AppNotifs::LAUNCHED));
    }

    #[test]
    fn test_observe_all_catalog() {
        let center = typed();
        let (seen, block) = recorder::<AppNotifs>();
        let token = center
            .observe_all::<AppNotifs, _>(move |payload: &AppNotifs, _: Option<&AnyObject>| block(payload))
            .expect("observe all");

        center.post(AppNotifs::Launched { at: 3 }).expect("post");
        center
            .post(AppNotifs::Downloaded {
                title: "a".to_string(),
                index: 0,
            })
            .expect("post");

        assert_eq!(seen.lock().len(), 2);
        assert_eq!(token.names().count(), 2);
        assert_eq!(center.registry().len(), 2);
    }

    #[test]
    fn test_validate_on_post_disabled_skips_registry() {
        let config = TypedCenterConfig {
            validate_on_post: false,
            ..TypedCenterConfig::default()
        };
        let center = TypedNotificationCenter::with_config(Arc::new(NotificationCenter::new()), config);

        center.post(AppNotifs::Launched { at: 1 }).expect("post");
        assert!(center.registry().is_empty());
    }

    #[tokio::test]
    async fn test_stream_yields_payloads() {
        let center = typed();
        let mut stream = center.stream::<AppNotifs>(AppNotifs::LAUNCHED).expect("stream");

        center.post(AppNotifs::Launched { at: 9 }).expect("post");

        let payload = timeout(Duration::from_millis(100), stream.recv())
            .await
            .expect("timeout")
            .expect("payload");
        assert_eq!(*payload, AppNotifs::Launched { at: 9 });
    }

    #[tokio::test]
    async fn test_queued_observer() {
        let center = typed();
        let queue = center.queue("typed-test").expect("runtime");
        let (tx, mut rx) = mpsc::unbounded_channel();

        let _token = center
            .add_observer(
                AppNotifs::DOWNLOADED,
                None,
                Some(queue),
                move |payload: &AppNotifs, _: Option<&AnyObject>| {
                    let _ = tx.send(payload.clone());
                },
            )
            .expect("observe");

        center
            .post(AppNotifs::Downloaded {
                title: "queued".to_string(),
                index: 1,
            })
            .expect("post");

        let payload = timeout(Duration::from_millis(200), rx.recv())
            .await
            .expect("timeout")
            .expect("payload");
        assert!(matches!(payload, AppNotifs::Downloaded { index: 1, .. }));
    }

    #[test]
    fn test_stats_serialize() {
        let center = typed();
        let _token = center
            .observe::<AppNotifs, _>(AppNotifs::LAUNCHED, |_: &AppNotifs| {})
            .expect("observe");
        center.post(AppNotifs::Launched { at: 1 }).expect("post");

        let json = serde_json::to_value(center.stats()).expect("serialize");
        assert_eq!(json["posted"], 1);
        assert_eq!(json["delivered"], 1);
        assert_eq!(json["bound_names"], 1);
        assert_eq!(json["bus"]["deliveries"], 1);
    }
}
