//! Type-indexed singleton store for services.
//!
//! Maps a capability type to exactly one concrete instance. Resolution is
//! fail-fast by default ([`ServiceRegistry::resolve`]) because a missing
//! service indicates a startup-ordering bug; [`ServiceRegistry::try_resolve`]
//! exists for genuinely optional capabilities.
//!
//! # Locking
//!
//! One coarse `parking_lot::Mutex` serializes every operation. Registry
//! operations are O(1) hash lookups on metadata, never long-running work,
//! so registration and resolution from concurrent initializers never race
//! and never contend for long. User code (initializers, shutdown hooks)
//! is never called while the lock is held.

use crate::{RegistryError, Service, ServiceState};
use keel_types::CapabilityId;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Delegates the [`Service`] lifecycle through an `Arc` to an unsized
/// capability type, giving the orchestrator a uniform `Arc<dyn Service>`
/// view of every entry.
struct LifecycleProxy<C: ?Sized + Service>(Arc<C>);

#[async_trait::async_trait]
impl<C: ?Sized + Service> Service for LifecycleProxy<C> {
    fn name(&self) -> &str {
        self.0.name()
    }

    async fn initialize(&self) -> Result<(), crate::ServiceError> {
        self.0.initialize().await
    }

    async fn shutdown(&self) -> Result<(), crate::ServiceError> {
        self.0.shutdown().await
    }
}

fn instance_matches<C: ?Sized + 'static>(instance: &(dyn Any + Send + Sync)) -> bool {
    instance.is::<Arc<C>>()
}

struct ServiceEntry {
    capability: CapabilityId,
    implementation: String,
    /// The registered `Arc<C>`, type-erased for storage. Downcast back
    /// to `Arc<C>` on resolve.
    instance: Box<dyn Any + Send + Sync>,
    runner: Arc<dyn Service>,
    matches_capability: fn(&(dyn Any + Send + Sync)) -> bool,
    registered_by: Option<String>,
    state: ServiceState,
    init_duration: Option<Duration>,
    last_error: Option<String>,
    error_count: u32,
}

/// Orchestrator-facing view of one registered service.
///
/// A snapshot: holds its own `Arc` clones and stays valid after the
/// registry changes.
#[derive(Clone)]
pub struct ServiceHandle {
    /// Capability the service is registered under.
    pub capability: CapabilityId,
    /// Implementation name.
    pub name: String,
    /// Lifecycle view of the instance.
    pub runner: Arc<dyn Service>,
}

/// Point-in-time status of one service entry, feeding the health
/// snapshot and diagnostics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceReport {
    /// Implementation name.
    pub name: String,
    /// Capability short name.
    pub capability: String,
    /// Current lifecycle state.
    pub state: ServiceState,
    /// Last measured initialization duration, in milliseconds.
    pub init_ms: Option<u64>,
    /// Most recent recorded error, if any.
    pub last_error: Option<String>,
    /// Number of recorded errors over the entry's lifetime.
    pub error_count: u32,
    /// Caller-supplied registration label, if one was given.
    pub registered_by: Option<String>,
}

#[derive(Default)]
struct Entries {
    by_capability: HashMap<CapabilityId, ServiceEntry>,
    /// Registration order, for deterministic logs and reverse-order
    /// shutdown.
    order: Vec<CapabilityId>,
}

/// Type-indexed singleton store: capability type → one instance.
///
/// # Example
///
/// ```
/// use keel_registry::{Service, ServiceError, ServiceRegistry};
/// use std::sync::Arc;
///
/// trait Audio: Service {
///     fn master_volume(&self) -> f32;
/// }
///
/// struct NullAudio;
///
/// #[async_trait::async_trait]
/// impl Service for NullAudio {
///     fn name(&self) -> &str {
///         "NullAudio"
///     }
///     async fn initialize(&self) -> Result<(), ServiceError> {
///         Ok(())
///     }
///     async fn shutdown(&self) -> Result<(), ServiceError> {
///         Ok(())
///     }
/// }
///
/// impl Audio for NullAudio {
///     fn master_volume(&self) -> f32 {
///         0.0
///     }
/// }
///
/// let registry = ServiceRegistry::new();
/// registry
///     .register::<dyn Audio>(Arc::new(NullAudio))
///     .expect("first registration");
///
/// let audio = registry.resolve::<dyn Audio>().expect("registered above");
/// assert_eq!(audio.master_volume(), 0.0);
/// ```
#[derive(Default)]
pub struct ServiceRegistry {
    inner: Mutex<Entries>,
}

impl ServiceRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `instance` as the singleton for capability `C`.
    ///
    /// The registry owns the instance for its own lifetime (entries are
    /// dropped on [`unregister`](Self::unregister)/[`clear`](Self::clear)).
    /// The new entry starts in [`ServiceState::Registered`].
    ///
    /// # Errors
    ///
    /// [`RegistryError::AlreadyRegistered`] if `C` already has an entry;
    /// the existing registration is unaffected.
    pub fn register<C>(&self, instance: Arc<C>) -> Result<(), RegistryError>
    where
        C: Service + ?Sized + 'static,
    {
        self.register_inner(instance, None)
    }

    /// Like [`register`](Self::register), with a caller-supplied label
    /// recording who performed the registration.
    ///
    /// The label is a debugging aid surfaced in
    /// [`ServiceReport::registered_by`]; it plays no role in lookups.
    ///
    /// # Errors
    ///
    /// Same as [`register`](Self::register).
    pub fn register_labeled<C>(
        &self,
        instance: Arc<C>,
        registered_by: impl Into<String>,
    ) -> Result<(), RegistryError>
    where
        C: Service + ?Sized + 'static,
    {
        self.register_inner(instance, Some(registered_by.into()))
    }

    fn register_inner<C>(
        &self,
        instance: Arc<C>,
        registered_by: Option<String>,
    ) -> Result<(), RegistryError>
    where
        C: Service + ?Sized + 'static,
    {
        let capability = CapabilityId::of::<C>();
        let implementation = instance.name().to_string();
        let runner: Arc<dyn Service> = Arc::new(LifecycleProxy(Arc::clone(&instance)));

        let mut inner = self.inner.lock();
        if inner.by_capability.contains_key(&capability) {
            return Err(RegistryError::AlreadyRegistered(capability));
        }

        inner.by_capability.insert(
            capability,
            ServiceEntry {
                capability,
                implementation: implementation.clone(),
                instance: Box::new(instance),
                runner,
                matches_capability: instance_matches::<C>,
                registered_by,
                state: ServiceState::Registered,
                init_duration: None,
                last_error: None,
                error_count: 0,
            },
        );
        inner.order.push(capability);

        info!(capability = %capability, implementation, "registered service");
        Ok(())
    }

    /// Resolves the singleton registered under capability `C`.
    ///
    /// # Errors
    ///
    /// [`RegistryError::ServiceNotRegistered`] when absent. Existence is
    /// assumed to be guaranteed by correct startup ordering, so this is
    /// fail-fast rather than fail-soft; use [`try_resolve`](Self::try_resolve)
    /// for optional capabilities.
    pub fn resolve<C>(&self) -> Result<Arc<C>, RegistryError>
    where
        C: ?Sized + 'static,
    {
        let capability = CapabilityId::of::<C>();
        let inner = self.inner.lock();
        let entry = inner
            .by_capability
            .get(&capability)
            .ok_or(RegistryError::ServiceNotRegistered(capability))?;

        entry
            .instance
            .downcast_ref::<Arc<C>>()
            .cloned()
            .ok_or_else(|| RegistryError::CapabilityMismatch {
                mismatches: vec![entry.implementation.clone()],
            })
    }

    /// Resolves the singleton for `C`, or `None` when absent.
    ///
    /// For genuinely optional capabilities; absence is not an error.
    #[must_use]
    pub fn try_resolve<C>(&self) -> Option<Arc<C>>
    where
        C: ?Sized + 'static,
    {
        let inner = self.inner.lock();
        inner
            .by_capability
            .get(&CapabilityId::of::<C>())
            .and_then(|entry| entry.instance.downcast_ref::<Arc<C>>())
            .cloned()
    }

    /// Returns `true` if capability `C` has a registered service.
    #[must_use]
    pub fn is_registered<C>(&self) -> bool
    where
        C: ?Sized + 'static,
    {
        self.inner
            .lock()
            .by_capability
            .contains_key(&CapabilityId::of::<C>())
    }

    /// Removes the entry for capability `C`.
    ///
    /// Idempotent: removing an absent capability warns and returns
    /// `false` instead of failing. Does not run the service's shutdown;
    /// teardown ordering belongs to the lifecycle orchestrator.
    pub fn unregister<C>(&self) -> bool
    where
        C: ?Sized + 'static,
    {
        let capability = CapabilityId::of::<C>();
        let mut inner = self.inner.lock();
        match inner.by_capability.remove(&capability) {
            Some(entry) => {
                inner.order.retain(|c| *c != capability);
                info!(
                    capability = %capability,
                    implementation = entry.implementation,
                    "unregistered service"
                );
                true
            }
            None => {
                warn!(capability = %capability, "unregister: no service registered");
                false
            }
        }
    }

    /// Drops every entry.
    pub fn clear(&self) {
        let mut inner = self.inner.lock();
        let dropped = inner.by_capability.len();
        inner.by_capability.clear();
        inner.order.clear();
        debug!(dropped, "cleared service registry");
    }

    /// Walks all entries and verifies each stored instance still
    /// satisfies its declared capability type.
    ///
    /// A startup-time sanity check.
    ///
    /// # Errors
    ///
    /// [`RegistryError::CapabilityMismatch`] enumerating every offending
    /// entry.
    pub fn validate(&self) -> Result<(), RegistryError> {
        let inner = self.inner.lock();
        let mismatches: Vec<String> = inner
            .order
            .iter()
            .filter_map(|capability| inner.by_capability.get(capability))
            .filter(|entry| !(entry.matches_capability)(entry.instance.as_ref()))
            .map(|entry| format!("{} ({})", entry.implementation, entry.capability))
            .collect();

        if mismatches.is_empty() {
            Ok(())
        } else {
            Err(RegistryError::CapabilityMismatch { mismatches })
        }
    }

    /// Number of registered services.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().by_capability.len()
    }

    /// Returns `true` if no services are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.lock().by_capability.is_empty()
    }

    /// Capability short names in registration order, for logs.
    #[must_use]
    pub fn capabilities(&self) -> Vec<&'static str> {
        self.inner
            .lock()
            .order
            .iter()
            .map(CapabilityId::short_name)
            .collect()
    }

    /// Snapshot of all entries in registration order, for the
    /// orchestrator's bulk initialize/shutdown.
    #[must_use]
    pub fn handles(&self) -> Vec<ServiceHandle> {
        let inner = self.inner.lock();
        inner
            .order
            .iter()
            .filter_map(|capability| inner.by_capability.get(capability))
            .map(|entry| ServiceHandle {
                capability: entry.capability,
                name: entry.implementation.clone(),
                runner: Arc::clone(&entry.runner),
            })
            .collect()
    }

    /// Point-in-time status of every entry, in registration order.
    #[must_use]
    pub fn report(&self) -> Vec<ServiceReport> {
        let inner = self.inner.lock();
        inner
            .order
            .iter()
            .filter_map(|capability| inner.by_capability.get(capability))
            .map(|entry| ServiceReport {
                name: entry.implementation.clone(),
                capability: entry.capability.short_name().to_string(),
                state: entry.state,
                init_ms: entry
                    .init_duration
                    .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX)),
                last_error: entry.last_error.clone(),
                error_count: entry.error_count,
                registered_by: entry.registered_by.clone(),
            })
            .collect()
    }

    // === Orchestrator-facing state transitions ===
    //
    // Entry states are mutated only through these methods, by the
    // lifecycle orchestrator. An absent capability (unregistered in the
    // meantime) is logged and ignored.

    /// Marks a service as initializing.
    pub fn mark_initializing(&self, capability: CapabilityId) {
        self.set_state(capability, ServiceState::Initializing);
    }

    /// Records a successful initialization and its measured duration.
    pub fn record_ready(&self, capability: CapabilityId, duration: Duration) {
        let mut inner = self.inner.lock();
        if let Some(entry) = inner.by_capability.get_mut(&capability) {
            entry.state = ServiceState::Ready;
            entry.init_duration = Some(duration);
        } else {
            debug!(capability = %capability, "record_ready: entry gone");
        }
    }

    /// Records a failure; increments the entry's error count.
    pub fn record_error(&self, capability: CapabilityId, error: &str) {
        let mut inner = self.inner.lock();
        if let Some(entry) = inner.by_capability.get_mut(&capability) {
            entry.state = ServiceState::Error;
            entry.last_error = Some(error.to_string());
            entry.error_count += 1;
        } else {
            debug!(capability = %capability, "record_error: entry gone");
        }
    }

    /// Marks a service as shutting down.
    pub fn mark_shutting_down(&self, capability: CapabilityId) {
        self.set_state(capability, ServiceState::ShuttingDown);
    }

    /// Marks a service as shut down.
    pub fn mark_shutdown(&self, capability: CapabilityId) {
        self.set_state(capability, ServiceState::Shutdown);
    }

    fn set_state(&self, capability: CapabilityId, state: ServiceState) {
        let mut inner = self.inner.lock();
        if let Some(entry) = inner.by_capability.get_mut(&capability) {
            entry.state = state;
        } else {
            debug!(capability = %capability, %state, "set_state: entry gone");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ServiceError;
    use keel_types::ErrorCode;

    trait Audio: Service {
        fn volume(&self) -> f32;
    }

    trait Save: Service {}

    struct NullAudio {
        volume: f32,
    }

    #[async_trait::async_trait]
    impl Service for NullAudio {
        fn name(&self) -> &str {
            "NullAudio"
        }
        async fn initialize(&self) -> Result<(), ServiceError> {
            Ok(())
        }
        async fn shutdown(&self) -> Result<(), ServiceError> {
            Ok(())
        }
    }

    impl Audio for NullAudio {
        fn volume(&self) -> f32 {
            self.volume
        }
    }

    struct MemorySave;

    #[async_trait::async_trait]
    impl Service for MemorySave {
        fn name(&self) -> &str {
            "MemorySave"
        }
        async fn initialize(&self) -> Result<(), ServiceError> {
            Ok(())
        }
        async fn shutdown(&self) -> Result<(), ServiceError> {
            Ok(())
        }
    }

    impl Save for MemorySave {}

    #[test]
    fn register_and_resolve_by_capability() {
        let registry = ServiceRegistry::new();
        registry
            .register::<dyn Audio>(Arc::new(NullAudio { volume: 0.5 }))
            .expect("first registration");

        let audio = registry.resolve::<dyn Audio>().expect("registered");
        assert_eq!(audio.volume(), 0.5);
        assert_eq!(audio.name(), "NullAudio");
    }

    #[test]
    fn second_registration_fails_first_unaffected() {
        let registry = ServiceRegistry::new();
        let first = Arc::new(NullAudio { volume: 0.1 });
        registry
            .register::<dyn Audio>(Arc::clone(&first) as Arc<dyn Audio>)
            .expect("first registration");

        let err = registry
            .register::<dyn Audio>(Arc::new(NullAudio { volume: 0.9 }))
            .expect_err("duplicate must fail");
        assert_eq!(err.code(), "REGISTRY_ALREADY_REGISTERED");

        // First registration still wins.
        let resolved = registry.resolve::<dyn Audio>().expect("still there");
        assert_eq!(resolved.volume(), 0.1);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn resolve_missing_is_hard_error() {
        let registry = ServiceRegistry::new();
        let err = registry.resolve::<dyn Audio>().err().expect("nothing registered");
        assert_eq!(err.code(), "REGISTRY_SERVICE_NOT_REGISTERED");
        assert!(err.to_string().contains("Audio"));
    }

    #[test]
    fn try_resolve_missing_is_none() {
        let registry = ServiceRegistry::new();
        assert!(registry.try_resolve::<dyn Audio>().is_none());

        registry
            .register::<dyn Audio>(Arc::new(NullAudio { volume: 0.0 }))
            .expect("registration");
        assert!(registry.try_resolve::<dyn Audio>().is_some());
    }

    #[test]
    fn capabilities_are_independent() {
        let registry = ServiceRegistry::new();
        registry
            .register::<dyn Audio>(Arc::new(NullAudio { volume: 0.0 }))
            .expect("audio");
        registry
            .register::<dyn Save>(Arc::new(MemorySave))
            .expect("save");

        assert_eq!(registry.len(), 2);
        assert!(registry.is_registered::<dyn Audio>());
        assert!(registry.is_registered::<dyn Save>());
        assert_eq!(registry.capabilities(), vec!["Audio", "Save"]);
    }

    #[test]
    fn unregister_is_idempotent() {
        let registry = ServiceRegistry::new();
        registry
            .register::<dyn Audio>(Arc::new(NullAudio { volume: 0.0 }))
            .expect("registration");

        assert!(registry.unregister::<dyn Audio>());
        // Absent now: warns, does not fail.
        assert!(!registry.unregister::<dyn Audio>());
        assert!(registry.is_empty());
    }

    #[test]
    fn clear_drops_everything() {
        let registry = ServiceRegistry::new();
        registry
            .register::<dyn Audio>(Arc::new(NullAudio { volume: 0.0 }))
            .expect("audio");
        registry
            .register::<dyn Save>(Arc::new(MemorySave))
            .expect("save");

        registry.clear();
        assert!(registry.is_empty());
        assert!(registry.try_resolve::<dyn Audio>().is_none());
    }

    #[test]
    fn validate_passes_for_typed_registrations() {
        let registry = ServiceRegistry::new();
        registry
            .register::<dyn Audio>(Arc::new(NullAudio { volume: 0.0 }))
            .expect("audio");
        registry
            .register::<dyn Save>(Arc::new(MemorySave))
            .expect("save");

        registry.validate().expect("typed registrations always match");
    }

    #[test]
    fn concrete_type_can_be_its_own_capability() {
        let registry = ServiceRegistry::new();
        registry
            .register::<MemorySave>(Arc::new(MemorySave))
            .expect("registration");

        let save = registry.resolve::<MemorySave>().expect("registered");
        assert_eq!(save.name(), "MemorySave");
    }

    #[test]
    fn state_transitions_surface_in_report() {
        let registry = ServiceRegistry::new();
        registry
            .register::<dyn Audio>(Arc::new(NullAudio { volume: 0.0 }))
            .expect("registration");
        let capability = CapabilityId::of::<dyn Audio>();

        registry.mark_initializing(capability);
        assert_eq!(registry.report()[0].state, ServiceState::Initializing);

        registry.record_ready(capability, Duration::from_millis(12));
        let report = registry.report();
        assert_eq!(report[0].state, ServiceState::Ready);
        assert_eq!(report[0].init_ms, Some(12));

        registry.record_error(capability, "device lost");
        let report = registry.report();
        assert_eq!(report[0].state, ServiceState::Error);
        assert_eq!(report[0].last_error.as_deref(), Some("device lost"));
        assert_eq!(report[0].error_count, 1);
    }

    #[test]
    fn registration_label_surfaces_in_report() {
        let registry = ServiceRegistry::new();
        registry
            .register_labeled::<dyn Audio>(
                Arc::new(NullAudio { volume: 0.0 }),
                "bootstrap::wire_audio",
            )
            .expect("registration");
        registry
            .register::<dyn Save>(Arc::new(MemorySave))
            .expect("registration");

        let report = registry.report();
        assert_eq!(report[0].registered_by.as_deref(), Some("bootstrap::wire_audio"));
        assert_eq!(report[1].registered_by, None);
    }

    #[test]
    fn handles_follow_registration_order() {
        let registry = ServiceRegistry::new();
        registry
            .register::<dyn Save>(Arc::new(MemorySave))
            .expect("save");
        registry
            .register::<dyn Audio>(Arc::new(NullAudio { volume: 0.0 }))
            .expect("audio");

        let names: Vec<String> = registry.handles().into_iter().map(|h| h.name).collect();
        assert_eq!(names, vec!["MemorySave", "NullAudio"]);
    }

    #[tokio::test]
    async fn handle_runner_drives_the_instance() {
        let registry = ServiceRegistry::new();
        registry
            .register::<dyn Audio>(Arc::new(NullAudio { volume: 0.0 }))
            .expect("registration");

        let handles = registry.handles();
        assert_eq!(handles.len(), 1);
        handles[0]
            .runner
            .initialize()
            .await
            .expect("null audio init always succeeds");
        assert_eq!(handles[0].runner.name(), "NullAudio");
    }
}
