//! # Payload Registry
//!
//! Binds each notification name to the one payload type allowed to travel
//! under it. The check runs when an observer is added or a catalog is
//! registered; after the first binding a lookup is a read-locked map hit.
//!
//! The type system cannot tie a runtime string to a Rust type, so this is
//! the contract that stands in for it: once `"MyAppNotifs.AppDownloadedData"`
//! is bound to `MyAppNotifs`, observing or posting it as anything else fails.

use crate::catalog::NotificationEnum;
use crate::error::NotifyError;
use lazy_static::lazy_static;
use notify_bus::NotificationName;
use parking_lot::RwLock;
use std::any::{type_name, Any, TypeId};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

lazy_static! {
    static ref DEFAULT_REGISTRY: Arc<PayloadRegistry> = Arc::new(PayloadRegistry::new());
}

/// Runtime identity of a payload type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PayloadType {
    id: TypeId,
    label: &'static str,
}

impl PayloadType {
    /// Identity of `A`.
    #[must_use]
    pub fn of<A: Any>() -> Self {
        Self {
            id: TypeId::of::<A>(),
            label: type_name::<A>(),
        }
    }

    /// Full type name, for diagnostics.
    #[must_use]
    pub fn label(&self) -> &'static str {
        self.label
    }
}

impl fmt::Display for PayloadType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label)
    }
}

/// Name-to-payload-type bindings.
pub struct PayloadRegistry {
    bindings: RwLock<HashMap<NotificationName, PayloadType>>,
}

impl PayloadRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            bindings: RwLock::new(HashMap::new()),
        }
    }

    /// The registry shared by every default typed center.
    #[must_use]
    pub fn shared() -> Arc<Self> {
        Arc::clone(&DEFAULT_REGISTRY)
    }

    /// Bind `name` to `A`.
    ///
    /// Returns `true` if the binding is new, `false` if it already existed.
    ///
    /// # Errors
    ///
    /// `NotifyError::PayloadTypeConflict` if `name` is bound to another type.
    pub fn bind<A: Any>(&self, name: &NotificationName) -> Result<bool, NotifyError> {
        let requested = PayloadType::of::<A>();

        if let Some(bound) = self.bindings.read().get(name) {
            return Self::check(name, *bound, requested).map(|()| false);
        }

        let mut bindings = self.bindings.write();
        match bindings.entry(name.clone()) {
            Entry::Occupied(entry) => Self::check(name, *entry.get(), requested).map(|()| false),
            Entry::Vacant(entry) => {
                entry.insert(requested);
                debug!(name = %name, payload = requested.label, "Notification name bound");
                Ok(true)
            }
        }
    }

    /// Bind every name in `A`'s catalog.
    ///
    /// All-or-nothing: on conflict no name is bound. Returns how many
    /// bindings were new.
    ///
    /// # Errors
    ///
    /// `NotifyError::PayloadTypeConflict` for the first conflicting name.
    pub fn register<A: NotificationEnum>(&self) -> Result<usize, NotifyError> {
        let requested = PayloadType::of::<A>();
        let mut bindings = self.bindings.write();

        for name in A::NAMES {
            if let Some(bound) = bindings.get(name) {
                Self::check(name, *bound, requested)?;
            }
        }

        let mut added = 0;
        for name in A::NAMES {
            if let Entry::Vacant(entry) = bindings.entry(name.clone()) {
                entry.insert(requested);
                added += 1;
            }
        }

        debug!(
            payload = requested.label,
            names = A::NAMES.len(),
            added,
            "Notification catalog registered"
        );
        Ok(added)
    }

    /// The type bound to `name`, if any.
    #[must_use]
    pub fn binding(&self, name: &str) -> Option<PayloadType> {
        self.bindings.read().get(name).copied()
    }

    /// Whether `name` is bound to `A`.
    #[must_use]
    pub fn is_bound_to<A: Any>(&self, name: &str) -> bool {
        self.binding(name)
            .is_some_and(|bound| bound.id == TypeId::of::<A>())
    }

    /// All bound names, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<NotificationName> {
        let mut names: Vec<_> = self.bindings.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// Number of bound names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bindings.read().len()
    }

    /// Whether nothing is bound.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bindings.read().is_empty()
    }

    fn check(
        name: &NotificationName,
        bound: PayloadType,
        requested: PayloadType,
    ) -> Result<(), NotifyError> {
        if bound == requested {
            Ok(())
        } else {
            Err(NotifyError::PayloadTypeConflict {
                name: name.clone(),
                bound: bound.label,
                requested: requested.label,
            })
        }
    }
}

impl Default for PayloadRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for PayloadRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PayloadRegistry")
            .field("bindings", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    crate::notification_catalog! {
        #[derive(Debug)]
        enum Downloads {
            #[allow(dead_code)]
            STARTED => Started,
            #[allow(dead_code)]
            FINISHED => Finished { bytes: u64 },
        }
    }

    /// A hand-written catalog that reuses a name owned by `Downloads`.
    #[derive(Debug)]
    struct Impostor;

    impl NotificationEnum for Impostor {
        const NAMES: &'static [NotificationName] = &[
            NotificationName::from_static("Impostor.Other"),
            NotificationName::from_static("Downloads.Started"),
        ];

        fn name(&self) -> NotificationName {
            NotificationName::from_static("Downloads.Started")
        }
    }

    #[test]
    fn test_bind_new_then_existing() {
        let registry = PayloadRegistry::new();
        assert_eq!(registry.bind::<Downloads>(&Downloads::STARTED), Ok(true));
        assert_eq!(registry.bind::<Downloads>(&Downloads::STARTED), Ok(false));
        assert!(registry.is_bound_to::<Downloads>("Downloads.Started"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_bind_conflict() {
        let registry = PayloadRegistry::new();
        registry.bind::<Downloads>(&Downloads::STARTED).expect("first bind");

        let err = registry.bind::<Impostor>(&Downloads::STARTED).unwrap_err();
        match err {
            NotifyError::PayloadTypeConflict {
                name,
                bound,
                requested,
            } => {
                assert_eq!(name, Downloads::STARTED);
                assert!(bound.ends_with("Downloads"));
                assert!(requested.ends_with("Impostor"));
            }
            other => panic!("Expected conflict, got {other:?}"),
        }
    }

    #[test]
    fn test_register_whole_catalog() {
        let registry = PayloadRegistry::new();
        assert_eq!(registry.register::<Downloads>(), Ok(2));
        assert_eq!(registry.register::<Downloads>(), Ok(0));
        assert_eq!(
            registry.names(),
            vec![Downloads::FINISHED, Downloads::STARTED]
        );
    }

    #[test]
    fn test_register_is_all_or_nothing() {
        let registry = PayloadRegistry::new();
        registry.register::<Downloads>().expect("register");

        let result = registry.register::<Impostor>();
        assert!(matches!(result, Err(NotifyError::PayloadTypeConflict { .. })));
        assert!(registry.binding("Impostor.Other").is_none());
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_payload_type_display() {
        let payload = PayloadType::of::<Downloads>();
        assert!(payload.to_string().ends_with("Downloads"));
        assert_eq!(payload.label(), payload.to_string());
    }
}
