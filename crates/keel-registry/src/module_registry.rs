//! (type, instance-id) indexed store for modules.
//!
//! Multiple module instances coexist under one capability type, each
//! identified by a caller-assigned UID. The primary index is per-type
//! (capability → UID → instance), but UIDs are enforced unique
//! system-wide so that cross-type lookup by UID is unambiguous.
//!
//! # Locking
//!
//! One coarse `parking_lot::Mutex`, like the service registry. The
//! exception is [`ModuleRegistry::iter`], which holds the lock for the
//! iterator's lifetime; do not call other registry methods while an
//! iterator is alive; collect it first.

use crate::{Module, ModuleState, RegistryError};
use keel_types::CapabilityId;
use parking_lot::{Mutex, MutexGuard};
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Delegates the [`Module`] lifecycle through an `Arc` to an unsized
/// capability type.
struct ModuleProxy<M: ?Sized + Module>(Arc<M>);

impl<M: ?Sized + Module> Module for ModuleProxy<M> {
    fn uid(&self) -> &str {
        self.0.uid()
    }

    fn initialize(&self) -> Result<(), crate::ModuleError> {
        self.0.initialize()
    }

    fn shutdown(&self) -> Result<(), crate::ModuleError> {
        self.0.shutdown()
    }
}

struct ModuleEntry {
    instance: Box<dyn Any + Send + Sync>,
    runner: Arc<dyn Module>,
    registered_by: Option<String>,
    state: ModuleState,
    active: bool,
    last_error: Option<String>,
}

/// Orchestrator-facing view of one registered module.
///
/// A snapshot: holds its own `Arc` clones and stays valid after the
/// registry changes.
#[derive(Clone)]
pub struct ModuleHandle {
    /// Capability bucket the module lives in.
    pub capability: CapabilityId,
    /// The module's unique instance id.
    pub uid: String,
    /// Whether the module participates in initialization.
    pub active: bool,
    /// Lifecycle view of the instance.
    pub runner: Arc<dyn Module>,
}

/// Point-in-time status of one module entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleReport {
    /// Capability short name.
    pub capability: String,
    /// The module's unique instance id.
    pub uid: String,
    /// Current lifecycle state.
    pub state: ModuleState,
    /// Whether the module participates in initialization.
    pub active: bool,
    /// Most recent recorded error, if any.
    pub last_error: Option<String>,
    /// Caller-supplied registration label, if one was given.
    pub registered_by: Option<String>,
}

#[derive(Default)]
struct Buckets {
    by_capability: HashMap<CapabilityId, HashMap<String, ModuleEntry>>,
    /// Registration order across all buckets. Module initialization
    /// order is registration order, so this is the orchestrator's walk
    /// order.
    order: Vec<(CapabilityId, String)>,
}

impl Buckets {
    fn uid_owner(&self, uid: &str) -> Option<CapabilityId> {
        // O(total modules): scans every bucket. Fine for a registry of
        // metadata entries, called on registration and explicit checks.
        self.by_capability
            .iter()
            .find(|(_, bucket)| bucket.contains_key(uid))
            .map(|(capability, _)| *capability)
    }
}

/// Lock-holding walk over all modules in registration order.
///
/// Finite and not restartable; the registry lock is held until the
/// iterator is dropped. Yields owned [`ModuleHandle`] snapshots, so
/// collecting releases the lock and leaves usable handles.
pub struct ModuleIter<'a> {
    guard: MutexGuard<'a, Buckets>,
    pos: usize,
}

impl Iterator for ModuleIter<'_> {
    type Item = ModuleHandle;

    fn next(&mut self) -> Option<Self::Item> {
        while self.pos < self.guard.order.len() {
            let (capability, uid) = self.guard.order[self.pos].clone();
            self.pos += 1;
            if let Some(entry) = self
                .guard
                .by_capability
                .get(&capability)
                .and_then(|bucket| bucket.get(&uid))
            {
                return Some(ModuleHandle {
                    capability,
                    uid,
                    active: entry.active,
                    runner: Arc::clone(&entry.runner),
                });
            }
        }
        None
    }
}

/// (capability type, UID) indexed multi-instance store.
///
/// Modules are optional by design: lookups return `Option`, and teardown
/// paths swallow (and log) individual failures so one misbehaving module
/// cannot block the rest.
///
/// # Example
///
/// ```
/// use keel_registry::{Module, ModuleError, ModuleRegistry};
/// use std::sync::Arc;
///
/// struct Overlay {
///     uid: String,
/// }
///
/// impl Module for Overlay {
///     fn uid(&self) -> &str {
///         &self.uid
///     }
///     fn initialize(&self) -> Result<(), ModuleError> {
///         Ok(())
///     }
///     fn shutdown(&self) -> Result<(), ModuleError> {
///         Ok(())
///     }
/// }
///
/// let registry = ModuleRegistry::new();
/// registry
///     .register::<Overlay>(Arc::new(Overlay { uid: "minimap".into() }))
///     .expect("uid is unique");
///
/// assert!(registry.get::<Overlay>("minimap").is_some());
/// assert!(registry.get::<Overlay>("compass").is_none());
/// ```
#[derive(Default)]
pub struct ModuleRegistry {
    inner: Mutex<Buckets>,
}

impl ModuleRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a module under capability `M`, keyed by its own UID.
    ///
    /// # Errors
    ///
    /// - [`RegistryError::EmptyUid`] if the module reports an empty UID;
    ///   checked before any mutation.
    /// - [`RegistryError::DuplicateUid`] if the UID exists anywhere in
    ///   the registry; UIDs are unique system-wide, not just within the
    ///   `(capability, uid)` bucket. The error names the bucket that
    ///   already owns the UID.
    pub fn register<M>(&self, instance: Arc<M>) -> Result<(), RegistryError>
    where
        M: Module + ?Sized + 'static,
    {
        self.register_inner(instance, None)
    }

    /// Like [`register`](Self::register), with a caller-supplied label
    /// recording who performed the registration.
    ///
    /// A debugging aid surfaced in [`ModuleReport::registered_by`]; it
    /// plays no role in lookups.
    ///
    /// # Errors
    ///
    /// Same as [`register`](Self::register).
    pub fn register_labeled<M>(
        &self,
        instance: Arc<M>,
        registered_by: impl Into<String>,
    ) -> Result<(), RegistryError>
    where
        M: Module + ?Sized + 'static,
    {
        self.register_inner(instance, Some(registered_by.into()))
    }

    fn register_inner<M>(
        &self,
        instance: Arc<M>,
        registered_by: Option<String>,
    ) -> Result<(), RegistryError>
    where
        M: Module + ?Sized + 'static,
    {
        let capability = CapabilityId::of::<M>();
        let uid = instance.uid().to_string();
        if uid.is_empty() {
            return Err(RegistryError::EmptyUid(capability));
        }

        let runner: Arc<dyn Module> = Arc::new(ModuleProxy(Arc::clone(&instance)));

        let mut inner = self.inner.lock();
        if let Some(owner) = inner.uid_owner(&uid) {
            return Err(RegistryError::DuplicateUid {
                capability: owner,
                uid,
            });
        }

        inner.by_capability.entry(capability).or_default().insert(
            uid.clone(),
            ModuleEntry {
                instance: Box::new(instance),
                runner,
                registered_by,
                state: ModuleState::Registered,
                active: true,
                last_error: None,
            },
        );
        inner.order.push((capability, uid.clone()));

        info!(capability = %capability, uid, "registered module");
        Ok(())
    }

    /// Looks up one module instance.
    ///
    /// Modules are optional: absence is a normal runtime condition, not
    /// an error.
    #[must_use]
    pub fn get<M>(&self, uid: &str) -> Option<Arc<M>>
    where
        M: ?Sized + 'static,
    {
        let inner = self.inner.lock();
        inner
            .by_capability
            .get(&CapabilityId::of::<M>())
            .and_then(|bucket| bucket.get(uid))
            .and_then(|entry| entry.instance.downcast_ref::<Arc<M>>())
            .cloned()
    }

    /// Returns all instances of capability `M`, in registration order.
    ///
    /// The returned vector is a defensive copy: mutating it never
    /// perturbs registry state, and later registrations do not appear in
    /// previously returned vectors.
    #[must_use]
    pub fn get_all<M>(&self) -> Vec<Arc<M>>
    where
        M: ?Sized + 'static,
    {
        let capability = CapabilityId::of::<M>();
        let inner = self.inner.lock();
        inner
            .order
            .iter()
            .filter(|(c, _)| *c == capability)
            .filter_map(|(c, uid)| inner.by_capability.get(c).and_then(|b| b.get(uid)))
            .filter_map(|entry| entry.instance.downcast_ref::<Arc<M>>())
            .cloned()
            .collect()
    }

    /// Returns `true` if `uid` is taken by any module of any capability.
    ///
    /// O(total modules): scans every type bucket. This is the
    /// system-wide uniqueness check backing cross-type lookup by UID.
    #[must_use]
    pub fn is_registered_anywhere(&self, uid: &str) -> bool {
        self.inner.lock().uid_owner(uid).is_some()
    }

    /// Removes a module and invokes its shutdown hook.
    ///
    /// A failing (or panicking) hook is logged and swallowed so that one
    /// misbehaving module cannot block teardown of the rest. Returns
    /// `true` if an entry was removed.
    pub fn unregister<M>(&self, uid: &str) -> bool
    where
        M: ?Sized + 'static,
    {
        let capability = CapabilityId::of::<M>();
        let removed = {
            let mut inner = self.inner.lock();
            let removed = inner
                .by_capability
                .get_mut(&capability)
                .and_then(|bucket| bucket.remove(uid));
            if removed.is_some() {
                inner.order.retain(|(c, u)| !(*c == capability && u == uid));
            }
            removed
        };

        match removed {
            Some(entry) => {
                run_shutdown_hook(&entry.runner, capability, uid);
                info!(capability = %capability, uid, "unregistered module");
                true
            }
            None => {
                debug!(capability = %capability, uid, "unregister: no such module");
                false
            }
        }
    }

    /// Walks all modules in registration order, holding the registry
    /// lock for the iterator's lifetime.
    ///
    /// Do not call other registry methods while the iterator is alive;
    /// `collect()` first to release the lock.
    #[must_use]
    pub fn iter(&self) -> ModuleIter<'_> {
        ModuleIter {
            guard: self.inner.lock(),
            pos: 0,
        }
    }

    /// Snapshot of all modules under one capability, in registration
    /// order.
    #[must_use]
    pub fn modules_of(&self, capability: CapabilityId) -> Vec<ModuleHandle> {
        let inner = self.inner.lock();
        inner
            .order
            .iter()
            .filter(|(c, _)| *c == capability)
            .filter_map(|(c, uid)| {
                inner.by_capability.get(c).and_then(|b| b.get(uid)).map(|entry| {
                    ModuleHandle {
                        capability: *c,
                        uid: uid.clone(),
                        active: entry.active,
                        runner: Arc::clone(&entry.runner),
                    }
                })
            })
            .collect()
    }

    /// Sets a module's active flag.
    ///
    /// Inactive modules keep their UID and entry but are skipped by the
    /// orchestrator's initialize phase. Returns `false` if the module
    /// does not exist.
    pub fn set_active<M>(&self, uid: &str, active: bool) -> bool
    where
        M: ?Sized + 'static,
    {
        let mut inner = self.inner.lock();
        match inner
            .by_capability
            .get_mut(&CapabilityId::of::<M>())
            .and_then(|bucket| bucket.get_mut(uid))
        {
            Some(entry) => {
                entry.active = active;
                true
            }
            None => false,
        }
    }

    /// Best-effort shutdown of every module, then drops all entries.
    ///
    /// Failures are collected (logged) but never abort the sweep.
    pub fn clear(&self) {
        let drained: Vec<(CapabilityId, String, Arc<dyn Module>)> = {
            let mut inner = self.inner.lock();
            let order = std::mem::take(&mut inner.order);
            let mut buckets = std::mem::take(&mut inner.by_capability);
            order
                .into_iter()
                .filter_map(|(capability, uid)| {
                    buckets
                        .get_mut(&capability)
                        .and_then(|bucket| bucket.remove(&uid))
                        .map(|entry| (capability, uid, entry.runner))
                })
                .collect()
        };

        let total = drained.len();
        for (capability, uid, runner) in drained {
            run_shutdown_hook(&runner, capability, &uid);
        }
        debug!(dropped = total, "cleared module registry");
    }

    /// Number of registered modules across all capabilities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().order.len()
    }

    /// Returns `true` if no modules are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.lock().order.is_empty()
    }

    /// Point-in-time status of every entry, in registration order.
    #[must_use]
    pub fn report(&self) -> Vec<ModuleReport> {
        let inner = self.inner.lock();
        inner
            .order
            .iter()
            .filter_map(|(capability, uid)| {
                inner
                    .by_capability
                    .get(capability)
                    .and_then(|bucket| bucket.get(uid))
                    .map(|entry| ModuleReport {
                        capability: capability.short_name().to_string(),
                        uid: uid.clone(),
                        state: entry.state,
                        active: entry.active,
                        last_error: entry.last_error.clone(),
                        registered_by: entry.registered_by.clone(),
                    })
            })
            .collect()
    }

    // === Orchestrator-facing state transitions ===

    /// Marks a module as successfully initialized.
    pub fn mark_initialized(&self, capability: CapabilityId, uid: &str) {
        self.with_entry(capability, uid, |entry| {
            entry.state = ModuleState::Initialized;
        });
    }

    /// Records a module failure.
    pub fn record_error(&self, capability: CapabilityId, uid: &str, error: &str) {
        self.with_entry(capability, uid, |entry| {
            entry.state = ModuleState::Error;
            entry.last_error = Some(error.to_string());
        });
    }

    /// Marks a module as shut down.
    pub fn mark_shutdown(&self, capability: CapabilityId, uid: &str) {
        self.with_entry(capability, uid, |entry| {
            entry.state = ModuleState::Shutdown;
        });
    }

    fn with_entry(&self, capability: CapabilityId, uid: &str, f: impl FnOnce(&mut ModuleEntry)) {
        let mut inner = self.inner.lock();
        match inner
            .by_capability
            .get_mut(&capability)
            .and_then(|bucket| bucket.get_mut(uid))
        {
            Some(entry) => f(entry),
            None => debug!(capability = %capability, uid, "state update: entry gone"),
        }
    }
}

/// Runs a module's shutdown hook, containing errors and panics.
fn run_shutdown_hook(runner: &Arc<dyn Module>, capability: CapabilityId, uid: &str) {
    match catch_unwind(AssertUnwindSafe(|| runner.shutdown())) {
        Ok(Ok(())) => {}
        Ok(Err(err)) => {
            warn!(capability = %capability, uid, %err, "module shutdown failed");
        }
        Err(_) => {
            warn!(capability = %capability, uid, "module shutdown panicked");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ModuleError;
    use keel_types::ErrorCode;
    use std::sync::atomic::{AtomicBool, Ordering};

    trait HudElement: Module {}

    struct Widget {
        uid: String,
        shutdown_called: AtomicBool,
        fail_shutdown: bool,
    }

    impl Widget {
        fn new(uid: &str) -> Self {
            Self {
                uid: uid.into(),
                shutdown_called: AtomicBool::new(false),
                fail_shutdown: false,
            }
        }

        fn failing_shutdown(uid: &str) -> Self {
            Self {
                fail_shutdown: true,
                ..Self::new(uid)
            }
        }
    }

    impl Module for Widget {
        fn uid(&self) -> &str {
            &self.uid
        }

        fn initialize(&self) -> Result<(), ModuleError> {
            Ok(())
        }

        fn shutdown(&self) -> Result<(), ModuleError> {
            self.shutdown_called.store(true, Ordering::SeqCst);
            if self.fail_shutdown {
                Err(ModuleError::ShutdownFailed("intentional".into()))
            } else {
                Ok(())
            }
        }
    }

    impl HudElement for Widget {}

    struct AudioTap {
        uid: String,
    }

    impl Module for AudioTap {
        fn uid(&self) -> &str {
            &self.uid
        }
        fn initialize(&self) -> Result<(), ModuleError> {
            Ok(())
        }
        fn shutdown(&self) -> Result<(), ModuleError> {
            Ok(())
        }
    }

    #[test]
    fn distinct_uids_coexist_in_one_bucket() {
        let registry = ModuleRegistry::new();
        registry
            .register::<Widget>(Arc::new(Widget::new("minimap")))
            .expect("minimap");
        registry
            .register::<Widget>(Arc::new(Widget::new("compass")))
            .expect("compass");

        let minimap = registry.get::<Widget>("minimap").expect("registered");
        let compass = registry.get::<Widget>("compass").expect("registered");
        assert!(!Arc::ptr_eq(&minimap, &compass));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn empty_uid_rejected_before_mutation() {
        let registry = ModuleRegistry::new();
        let err = registry
            .register::<Widget>(Arc::new(Widget::new("")))
            .expect_err("empty uid");

        assert_eq!(err.code(), "REGISTRY_EMPTY_UID");
        assert_eq!(registry.len(), 0);
    }

    #[test]
    fn duplicate_uid_in_same_bucket_rejected() {
        let registry = ModuleRegistry::new();
        registry
            .register::<Widget>(Arc::new(Widget::new("minimap")))
            .expect("first");
        let err = registry
            .register::<Widget>(Arc::new(Widget::new("minimap")))
            .expect_err("duplicate");

        assert_eq!(err.code(), "REGISTRY_DUPLICATE_UID");
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn uid_is_unique_across_capabilities() {
        let registry = ModuleRegistry::new();
        registry
            .register::<Widget>(Arc::new(Widget::new("overlay")))
            .expect("widget");

        // Same UID under a different capability type still collides.
        let err = registry
            .register::<AudioTap>(Arc::new(AudioTap {
                uid: "overlay".into(),
            }))
            .expect_err("system-wide uniqueness");
        assert_eq!(err.code(), "REGISTRY_DUPLICATE_UID");
        assert!(err.to_string().contains("Widget"));

        assert!(registry.is_registered_anywhere("overlay"));
        assert!(!registry.is_registered_anywhere("unknown"));
    }

    #[test]
    fn get_all_returns_defensive_copy() {
        let registry = ModuleRegistry::new();
        registry
            .register::<Widget>(Arc::new(Widget::new("a")))
            .expect("a");
        registry
            .register::<Widget>(Arc::new(Widget::new("b")))
            .expect("b");

        let mut copy = registry.get_all::<Widget>();
        assert_eq!(copy.len(), 2);

        copy.clear();
        copy.push(Arc::new(Widget::new("stray")));

        // Registry state is unchanged by caller-side mutation.
        assert_eq!(registry.get_all::<Widget>().len(), 2);
        assert!(registry.get::<Widget>("stray").is_none());
    }

    #[test]
    fn get_all_preserves_registration_order() {
        let registry = ModuleRegistry::new();
        for uid in ["first", "second", "third"] {
            registry
                .register::<Widget>(Arc::new(Widget::new(uid)))
                .expect(uid);
        }

        let uids: Vec<String> = registry
            .get_all::<Widget>()
            .iter()
            .map(|w| w.uid.clone())
            .collect();
        assert_eq!(uids, vec!["first", "second", "third"]);
    }

    #[test]
    fn trait_object_capability_bucket() {
        let registry = ModuleRegistry::new();
        registry
            .register::<dyn HudElement>(Arc::new(Widget::new("healthbar")))
            .expect("registration");

        let element = registry.get::<dyn HudElement>("healthbar").expect("present");
        assert_eq!(element.uid(), "healthbar");
        // The concrete-type bucket is a different capability.
        assert!(registry.get::<Widget>("healthbar").is_none());
    }

    #[test]
    fn unregister_runs_shutdown_hook() {
        let registry = ModuleRegistry::new();
        let widget = Arc::new(Widget::new("minimap"));
        registry
            .register::<Widget>(Arc::clone(&widget))
            .expect("registration");

        assert!(registry.unregister::<Widget>("minimap"));
        assert!(widget.shutdown_called.load(Ordering::SeqCst));
        assert!(registry.get::<Widget>("minimap").is_none());
    }

    #[test]
    fn unregister_swallows_shutdown_failure() {
        let registry = ModuleRegistry::new();
        registry
            .register::<Widget>(Arc::new(Widget::failing_shutdown("broken")))
            .expect("registration");

        // The failing hook is logged, not propagated.
        assert!(registry.unregister::<Widget>("broken"));
        assert_eq!(registry.len(), 0);
    }

    #[test]
    fn unregister_missing_is_noop() {
        let registry = ModuleRegistry::new();
        assert!(!registry.unregister::<Widget>("ghost"));
    }

    #[test]
    fn iter_walks_registration_order_across_buckets() {
        let registry = ModuleRegistry::new();
        registry
            .register::<Widget>(Arc::new(Widget::new("w1")))
            .expect("w1");
        registry
            .register::<AudioTap>(Arc::new(AudioTap { uid: "t1".into() }))
            .expect("t1");
        registry
            .register::<Widget>(Arc::new(Widget::new("w2")))
            .expect("w2");

        let uids: Vec<String> = registry.iter().map(|h| h.uid).collect();
        assert_eq!(uids, vec!["w1", "t1", "w2"]);
    }

    #[test]
    fn clear_shuts_everything_down_best_effort() {
        let registry = ModuleRegistry::new();
        let ok = Arc::new(Widget::new("ok"));
        let broken = Arc::new(Widget::failing_shutdown("broken"));
        registry.register::<Widget>(Arc::clone(&broken)).expect("broken");
        registry.register::<Widget>(Arc::clone(&ok)).expect("ok");

        registry.clear();

        // The failing module did not prevent the healthy one's teardown.
        assert!(broken.shutdown_called.load(Ordering::SeqCst));
        assert!(ok.shutdown_called.load(Ordering::SeqCst));
        assert!(registry.is_empty());
    }

    #[test]
    fn set_active_toggles_flag() {
        let registry = ModuleRegistry::new();
        registry
            .register::<Widget>(Arc::new(Widget::new("minimap")))
            .expect("registration");

        assert!(registry.set_active::<Widget>("minimap", false));
        let report = registry.report();
        assert!(!report[0].active);

        assert!(!registry.set_active::<Widget>("ghost", false));
    }

    #[test]
    fn registration_label_surfaces_in_report() {
        let registry = ModuleRegistry::new();
        registry
            .register_labeled::<Widget>(Arc::new(Widget::new("minimap")), "hud::bootstrap")
            .expect("registration");
        registry
            .register::<Widget>(Arc::new(Widget::new("compass")))
            .expect("registration");

        let report = registry.report();
        assert_eq!(report[0].registered_by.as_deref(), Some("hud::bootstrap"));
        assert_eq!(report[1].registered_by, None);
    }

    #[test]
    fn state_transitions_surface_in_report() {
        let registry = ModuleRegistry::new();
        registry
            .register::<Widget>(Arc::new(Widget::new("minimap")))
            .expect("registration");
        let capability = CapabilityId::of::<Widget>();

        assert_eq!(registry.report()[0].state, ModuleState::Registered);

        registry.mark_initialized(capability, "minimap");
        assert_eq!(registry.report()[0].state, ModuleState::Initialized);

        registry.record_error(capability, "minimap", "texture missing");
        let report = registry.report();
        assert_eq!(report[0].state, ModuleState::Error);
        assert_eq!(report[0].last_error.as_deref(), Some("texture missing"));

        registry.mark_shutdown(capability, "minimap");
        assert_eq!(registry.report()[0].state, ModuleState::Shutdown);
    }
}
