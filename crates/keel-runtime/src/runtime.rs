//! Runtime: dependency-injection root and lifecycle orchestrator.
//!
//! The [`Runtime`] owns the service registry, the module registry, the
//! event bus, and the diagnostics ledger, and drives the phased
//! startup/shutdown sequence across them. It is an explicitly
//! constructed, explicitly passed root object: there are no ambient
//! statics, so tests (and embedders) can build as many isolated
//! runtimes as they want.
//!
//! # Startup Phases
//!
//! ```text
//! 1. RegisteringComponents   register_service / register_module
//! 2. InitializingServices    concurrent, bounded by timeout, fail-fast
//! 3. InitializingModules     sequential, registration order, contained
//! 4. PostInitializing        ready hooks (cross-service wiring)
//! 5. Ready                   SystemReady published exactly once
//! ```
//!
//! # Failure Semantics
//!
//! Service startup is fail-fast and all-or-nothing: a broken core
//! dependency must surface immediately rather than leave the system
//! partially and silently usable. Module startup and all teardown are
//! best-effort and fault-isolated: optional features must not be able to
//! take the system down, and shutdown must never hang or abort.

use crate::{
    HealthSnapshot, LedgerEventKind, LedgerRecord, PhaseTransition, ReadyHook, RegistryLedger,
    RuntimeConfig, RuntimeError, RuntimeState, SystemReady,
};
use keel_event::EventBus;
use keel_registry::{Module, ModuleHandle, ModuleRegistry, Service, ServiceError, ServiceRegistry};
use keel_types::CapabilityId;
use parking_lot::Mutex;
use std::any::Any;
use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

/// Label used for runtime-scoped ledger records.
const RUNTIME_TARGET: &str = "runtime";

/// Dependency-injection root and lifecycle orchestrator.
///
/// Construct one per system, register components, then drive it:
///
/// ```no_run
/// # use keel_runtime::{Runtime, RuntimeConfig};
/// # async fn demo() -> Result<(), keel_runtime::RuntimeError> {
/// let runtime = Runtime::new(RuntimeConfig::default());
/// // runtime.register_service::<dyn Audio>(audio)?;
/// // runtime.register_module::<dyn HudElement>(minimap)?;
/// runtime.start().await?;
/// assert!(runtime.is_ready());
/// runtime.shutdown().await;
/// # Ok(())
/// # }
/// ```
pub struct Runtime {
    config: RuntimeConfig,
    services: Arc<ServiceRegistry>,
    modules: Arc<ModuleRegistry>,
    bus: Arc<EventBus>,
    ledger: Arc<RegistryLedger>,
    state: Mutex<RuntimeState>,
    transitions: Mutex<Vec<PhaseTransition>>,
    hooks: Mutex<Vec<Arc<dyn ReadyHook>>>,
}

impl Runtime {
    /// Creates a runtime with the given configuration.
    #[must_use]
    pub fn new(config: RuntimeConfig) -> Self {
        let ledger = Arc::new(RegistryLedger::new(config.ledger_capacity));
        Self {
            config,
            services: Arc::new(ServiceRegistry::new()),
            modules: Arc::new(ModuleRegistry::new()),
            bus: Arc::new(EventBus::new()),
            ledger,
            state: Mutex::new(RuntimeState::Uninitialized),
            transitions: Mutex::new(Vec::new()),
            hooks: Mutex::new(Vec::new()),
        }
    }

    // === Registration (phase 1) ===

    /// Registers a service under capability `C`.
    ///
    /// Permitted only before [`start`](Self::start).
    ///
    /// # Errors
    ///
    /// - [`RuntimeError::InvalidState`] after startup began.
    /// - [`RuntimeError::Registry`] for duplicate registration.
    pub fn register_service<C>(&self, instance: Arc<C>) -> Result<(), RuntimeError>
    where
        C: Service + ?Sized + 'static,
    {
        self.enter_registration("register_service")?;
        let name = instance.name().to_string();
        let capability = CapabilityId::of::<C>();

        self.services.register(instance)?;
        self.ledger.record(LedgerRecord::new(
            LedgerEventKind::ServiceRegistered,
            &name,
            capability.short_name(),
            "",
        ));
        Ok(())
    }

    /// Like [`register_service`](Self::register_service), with a
    /// caller-supplied label recording who performed the registration.
    ///
    /// # Errors
    ///
    /// Same as [`register_service`](Self::register_service).
    pub fn register_service_labeled<C>(
        &self,
        instance: Arc<C>,
        registered_by: impl Into<String>,
    ) -> Result<(), RuntimeError>
    where
        C: Service + ?Sized + 'static,
    {
        self.enter_registration("register_service")?;
        let name = instance.name().to_string();
        let capability = CapabilityId::of::<C>();
        let registered_by = registered_by.into();

        self.services
            .register_labeled(instance, registered_by.clone())?;
        self.ledger.record(LedgerRecord::new(
            LedgerEventKind::ServiceRegistered,
            &name,
            capability.short_name(),
            format!("registered by {registered_by}"),
        ));
        Ok(())
    }

    /// Registers a module under capability `M`, keyed by its UID.
    ///
    /// Permitted only before [`start`](Self::start).
    ///
    /// # Errors
    ///
    /// - [`RuntimeError::InvalidState`] after startup began.
    /// - [`RuntimeError::Registry`] for empty or duplicate UIDs.
    pub fn register_module<M>(&self, instance: Arc<M>) -> Result<(), RuntimeError>
    where
        M: Module + ?Sized + 'static,
    {
        self.enter_registration("register_module")?;
        let uid = instance.uid().to_string();
        let capability = CapabilityId::of::<M>();

        self.modules.register(instance)?;
        self.ledger.record(LedgerRecord::new(
            LedgerEventKind::ModuleRegistered,
            &uid,
            capability.short_name(),
            "",
        ));
        Ok(())
    }

    /// Like [`register_module`](Self::register_module), with a
    /// caller-supplied label recording who performed the registration.
    ///
    /// # Errors
    ///
    /// Same as [`register_module`](Self::register_module).
    pub fn register_module_labeled<M>(
        &self,
        instance: Arc<M>,
        registered_by: impl Into<String>,
    ) -> Result<(), RuntimeError>
    where
        M: Module + ?Sized + 'static,
    {
        self.enter_registration("register_module")?;
        let uid = instance.uid().to_string();
        let capability = CapabilityId::of::<M>();
        let registered_by = registered_by.into();

        self.modules
            .register_labeled(instance, registered_by.clone())?;
        self.ledger.record(LedgerRecord::new(
            LedgerEventKind::ModuleRegistered,
            &uid,
            capability.short_name(),
            format!("registered by {registered_by}"),
        ));
        Ok(())
    }

    /// Installs a post-init hook, run in installation order during the
    /// post-initializing phase.
    ///
    /// # Errors
    ///
    /// [`RuntimeError::InvalidState`] after startup began.
    pub fn add_ready_hook(&self, hook: Arc<dyn ReadyHook>) -> Result<(), RuntimeError> {
        self.enter_registration("add_ready_hook")?;
        self.hooks.lock().push(hook);
        Ok(())
    }

    // === Discovery ===

    /// Resolves the service registered under capability `C`.
    ///
    /// # Errors
    ///
    /// [`RuntimeError::Registry`] with `REGISTRY_SERVICE_NOT_REGISTERED`
    /// when absent, a fail-fast programmer-error surface.
    pub fn resolve<C>(&self) -> Result<Arc<C>, RuntimeError>
    where
        C: ?Sized + 'static,
    {
        Ok(self.services.resolve::<C>()?)
    }

    /// Resolves the service for `C`, or `None` when absent.
    #[must_use]
    pub fn try_resolve<C>(&self) -> Option<Arc<C>>
    where
        C: ?Sized + 'static,
    {
        self.services.try_resolve::<C>()
    }

    /// Looks up one module instance; absence is a normal condition.
    #[must_use]
    pub fn module<M>(&self, uid: &str) -> Option<Arc<M>>
    where
        M: ?Sized + 'static,
    {
        self.modules.get::<M>(uid)
    }

    /// Returns all module instances of capability `M` (defensive copy).
    #[must_use]
    pub fn modules_of<M>(&self) -> Vec<Arc<M>>
    where
        M: ?Sized + 'static,
    {
        self.modules.get_all::<M>()
    }

    // === Lifecycle ===

    /// Drives startup phases 2–5.
    ///
    /// Returns once the runtime is ready (and the [`SystemReady`] event
    /// has been published), or with the startup failure that left the
    /// runtime in [`RuntimeState::Error`]. A failed start is queryable
    /// via [`initialization_log`](Self::initialization_log) and the
    /// ledger.
    ///
    /// # Errors
    ///
    /// - [`RuntimeError::InvalidState`] if startup already ran.
    /// - [`RuntimeError::Registry`] if configuration validation fails.
    /// - [`RuntimeError::ServiceInitFailed`] /
    ///   [`RuntimeError::ServiceInitTimeout`] from the service phase.
    /// - [`RuntimeError::PostInitFailed`] from a ready hook.
    pub async fn start(&self) -> Result<(), RuntimeError> {
        let entered_from = {
            let mut state = self.state.lock();
            if !state.can_register() {
                return Err(RuntimeError::InvalidState {
                    state: *state,
                    required: "before startup",
                });
            }
            let from = *state;
            *state = RuntimeState::InitializingServices;
            from
        };

        if entered_from == RuntimeState::Uninitialized {
            self.log_transition(
                RuntimeState::Uninitialized,
                RuntimeState::RegisteringComponents,
                "startup with no prior registrations",
            );
        }
        self.log_transition(
            RuntimeState::RegisteringComponents,
            RuntimeState::InitializingServices,
            format!(
                "{} services, {} modules",
                self.services.len(),
                self.modules.len()
            ),
        );

        if let Err(err) = self.services.validate() {
            self.fail_startup(format!("configuration validation failed: {err}"));
            return Err(err.into());
        }

        self.initialize_services().await?;

        self.advance(
            RuntimeState::InitializingModules,
            format!("{} modules", self.modules.len()),
        );
        self.initialize_modules();

        let hooks: Vec<Arc<dyn ReadyHook>> = self.hooks.lock().clone();
        self.advance(
            RuntimeState::PostInitializing,
            format!("{} hooks", hooks.len()),
        );
        for hook in hooks {
            if let Err(err) = hook.run(self).await {
                self.fail_startup(format!("post-init hook '{}' failed: {err}", hook.name()));
                return Err(RuntimeError::PostInitFailed {
                    hook: hook.name().to_string(),
                    reason: err.to_string(),
                });
            }
        }

        self.advance(RuntimeState::Ready, "startup complete");

        let ready = SystemReady {
            log: self.initialization_log(),
        };
        let outcome = self.bus.publish(&ready);
        info!(
            delivered = outcome.delivered,
            failed = outcome.failed,
            "system ready"
        );
        Ok(())
    }

    /// Phase 2: concurrent service initialization, bounded by the
    /// configured timeout, fail-fast on the first failure.
    async fn initialize_services(&self) -> Result<(), RuntimeError> {
        let handles = self.services.handles();
        let timeout = self.config.service_init_timeout();

        // Set once the orchestrator stops waiting. Stragglers consult it
        // so late completions are logged as such; they still update
        // their registry entry but never resurrect orchestrator state.
        let abandoned = Arc::new(AtomicBool::new(false));

        let mut tasks: JoinSet<(CapabilityId, String, Result<(), ServiceError>)> = JoinSet::new();
        let mut task_labels: HashMap<tokio::task::Id, (CapabilityId, String)> = HashMap::new();

        for handle in handles {
            self.services.mark_initializing(handle.capability);
            self.ledger.record(LedgerRecord::new(
                LedgerEventKind::ServiceInitializing,
                &handle.name,
                handle.capability.short_name(),
                "",
            ));

            let services = Arc::clone(&self.services);
            let ledger = Arc::clone(&self.ledger);
            let abandoned = Arc::clone(&abandoned);
            let label = (handle.capability, handle.name.clone());

            let abort_handle = tasks.spawn(async move {
                let started = Instant::now();
                let result = handle.runner.initialize().await;
                let elapsed = started.elapsed();
                let late = abandoned.load(Ordering::SeqCst);

                match &result {
                    Ok(()) => {
                        services.record_ready(handle.capability, elapsed);
                        ledger.record(LedgerRecord::new(
                            LedgerEventKind::ServiceReady,
                            &handle.name,
                            handle.capability.short_name(),
                            format!("initialized in {} ms", elapsed.as_millis()),
                        ));
                        if late {
                            warn!(
                                service = %handle.name,
                                "service initializer completed after startup was abandoned"
                            );
                        } else {
                            info!(
                                service = %handle.name,
                                elapsed_ms = elapsed.as_millis() as u64,
                                "service initialized"
                            );
                        }
                    }
                    Err(err) => {
                        services.record_error(handle.capability, &err.to_string());
                        ledger.record(LedgerRecord::new(
                            LedgerEventKind::ServiceFailed,
                            &handle.name,
                            handle.capability.short_name(),
                            err.to_string(),
                        ));
                        if late {
                            warn!(
                                service = %handle.name, %err,
                                "service initializer failed after startup was abandoned"
                            );
                        }
                    }
                }
                (handle.capability, handle.name, result)
            });
            task_labels.insert(abort_handle.id(), label);
        }

        let deadline = Instant::now() + timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match tokio::time::timeout(remaining, tasks.join_next()).await {
                // All initializers completed successfully.
                Ok(None) => return Ok(()),

                Ok(Some(Ok((_, _, Ok(()))))) => {}

                // First failure aborts startup; remaining initializers
                // keep running detached (cooperative cancellation).
                Ok(Some(Ok((_, name, Err(err))))) => {
                    abandoned.store(true, Ordering::SeqCst);
                    tasks.detach_all();
                    self.fail_startup(format!("service '{name}' failed: {err}"));
                    return Err(RuntimeError::ServiceInitFailed {
                        service: name,
                        reason: err.to_string(),
                    });
                }

                // Initializer panicked: the task never reached its own
                // bookkeeping, so record the failure here.
                Ok(Some(Err(join_err))) => {
                    let (capability, name) = task_labels
                        .get(&join_err.id())
                        .cloned()
                        .unwrap_or((CapabilityId::of::<()>(), "<unknown>".to_string()));
                    self.services.record_error(capability, "initializer panicked");
                    self.ledger.record(LedgerRecord::new(
                        LedgerEventKind::ServiceFailed,
                        &name,
                        capability.short_name(),
                        "initializer panicked",
                    ));
                    abandoned.store(true, Ordering::SeqCst);
                    tasks.detach_all();
                    self.fail_startup(format!("service '{name}' initializer panicked"));
                    return Err(RuntimeError::ServiceInitFailed {
                        service: name,
                        reason: "initializer panicked".into(),
                    });
                }

                Err(_elapsed) => {
                    abandoned.store(true, Ordering::SeqCst);
                    tasks.detach_all();
                    self.fail_startup(format!(
                        "service initialization timed out after {} ms",
                        timeout.as_millis()
                    ));
                    return Err(RuntimeError::ServiceInitTimeout {
                        timeout_ms: self.config.service_init_timeout_ms,
                    });
                }
            }
        }
    }

    /// Phase 3: sequential module initialization in registration order.
    /// Per-module failures and panics are contained; the phase always
    /// runs to the end of the list.
    fn initialize_modules(&self) {
        let handles: Vec<ModuleHandle> = self.modules.iter().collect();
        for handle in handles {
            if !handle.active {
                debug!(uid = %handle.uid, "module inactive, skipping initialization");
                continue;
            }

            match catch_unwind(AssertUnwindSafe(|| handle.runner.initialize())) {
                Ok(Ok(())) => {
                    self.modules.mark_initialized(handle.capability, &handle.uid);
                    self.ledger.record(LedgerRecord::new(
                        LedgerEventKind::ModuleInitialized,
                        &handle.uid,
                        handle.capability.short_name(),
                        "",
                    ));
                    info!(uid = %handle.uid, "module initialized");
                }
                Ok(Err(err)) => {
                    self.modules
                        .record_error(handle.capability, &handle.uid, &err.to_string());
                    self.ledger.record(LedgerRecord::new(
                        LedgerEventKind::ModuleFailed,
                        &handle.uid,
                        handle.capability.short_name(),
                        err.to_string(),
                    ));
                    warn!(uid = %handle.uid, %err, "module initialization failed, continuing");
                }
                Err(panic) => {
                    let reason = panic_label(panic.as_ref());
                    self.modules
                        .record_error(handle.capability, &handle.uid, &reason);
                    self.ledger.record(LedgerRecord::new(
                        LedgerEventKind::ModuleFailed,
                        &handle.uid,
                        handle.capability.short_name(),
                        &reason,
                    ));
                    warn!(uid = %handle.uid, reason = %reason, "module initialization panicked, continuing");
                }
            }
        }
    }

    /// Drives phase 6: modules down first (reverse registration order),
    /// then services. Every failure is caught and logged; teardown
    /// always runs to completion. Idempotent: a second call is a no-op
    /// and the runtime stays in [`RuntimeState::Shutdown`].
    pub async fn shutdown(&self) {
        let from = {
            let mut state = self.state.lock();
            if matches!(*state, RuntimeState::ShuttingDown | RuntimeState::Shutdown) {
                debug!(state = %*state, "shutdown already underway or complete");
                return;
            }
            let from = *state;
            *state = RuntimeState::ShuttingDown;
            from
        };
        self.log_transition(from, RuntimeState::ShuttingDown, "modules first, then services");

        let mut module_handles: Vec<ModuleHandle> = self.modules.iter().collect();
        module_handles.reverse();
        for handle in module_handles {
            match catch_unwind(AssertUnwindSafe(|| handle.runner.shutdown())) {
                Ok(Ok(())) => debug!(uid = %handle.uid, "module shut down"),
                Ok(Err(err)) => warn!(uid = %handle.uid, %err, "module shutdown failed"),
                Err(_) => warn!(uid = %handle.uid, "module shutdown panicked"),
            }
            self.modules.mark_shutdown(handle.capability, &handle.uid);
            self.ledger.record(LedgerRecord::new(
                LedgerEventKind::ModuleShutdown,
                &handle.uid,
                handle.capability.short_name(),
                "",
            ));
        }

        let mut service_handles = self.services.handles();
        service_handles.reverse();
        for handle in service_handles {
            self.services.mark_shutting_down(handle.capability);
            let runner = Arc::clone(&handle.runner);
            // Spawned so a panicking shutdown surfaces as a JoinError
            // instead of unwinding through the orchestrator.
            match tokio::spawn(async move { runner.shutdown().await }).await {
                Ok(Ok(())) => debug!(service = %handle.name, "service shut down"),
                Ok(Err(err)) => warn!(service = %handle.name, %err, "service shutdown failed"),
                Err(_) => warn!(service = %handle.name, "service shutdown panicked"),
            }
            self.services.mark_shutdown(handle.capability);
            self.ledger.record(LedgerRecord::new(
                LedgerEventKind::ServiceShutdown,
                &handle.name,
                handle.capability.short_name(),
                "",
            ));
        }

        self.advance(RuntimeState::Shutdown, "teardown complete");
    }

    // === Observation ===

    /// Returns `true` once startup completed successfully.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.state.lock().is_ready()
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> RuntimeState {
        *self.state.lock()
    }

    /// The accumulated phase transition log, oldest first.
    #[must_use]
    pub fn initialization_log(&self) -> Vec<PhaseTransition> {
        self.transitions.lock().clone()
    }

    /// Computes a point-in-time health snapshot over both registries.
    #[must_use]
    pub fn health(&self) -> HealthSnapshot {
        HealthSnapshot::compute(&self.services.report(), &self.modules.report())
    }

    /// Periodic maintenance hook.
    ///
    /// The runtime assumes no tick rate of its own; the host's scheduler
    /// invokes this at whatever cadence it chooses. Purely
    /// observational: recomputes the health snapshot, logs it, and
    /// records a ledger alert when the system is degraded.
    pub fn run_maintenance(&self) -> HealthSnapshot {
        let snapshot = self.health();
        if snapshot.is_healthy() {
            debug!(score = snapshot.score, "maintenance: system healthy");
        } else {
            warn!(
                score = snapshot.score,
                errors = snapshot.errors.len(),
                "maintenance: system degraded"
            );
            self.ledger.record(LedgerRecord::new(
                LedgerEventKind::HealthAlert,
                RUNTIME_TARGET,
                RUNTIME_TARGET,
                format!(
                    "score {} with {} component error(s)",
                    snapshot.score,
                    snapshot.errors.len()
                ),
            ));
        }
        snapshot
    }

    /// The service registry.
    #[must_use]
    pub fn services(&self) -> &ServiceRegistry {
        &self.services
    }

    /// The module registry.
    #[must_use]
    pub fn modules(&self) -> &ModuleRegistry {
        &self.modules
    }

    /// The event bus.
    #[must_use]
    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    /// The diagnostics ledger.
    #[must_use]
    pub fn ledger(&self) -> &RegistryLedger {
        &self.ledger
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    // === Internals ===

    /// Gate for registration-window operations; performs the
    /// `Uninitialized → RegisteringComponents` transition on first use.
    fn enter_registration(&self, operation: &str) -> Result<(), RuntimeError> {
        let first = {
            let mut state = self.state.lock();
            if !state.can_register() {
                return Err(RuntimeError::InvalidState {
                    state: *state,
                    required: "before startup",
                });
            }
            if *state == RuntimeState::Uninitialized {
                *state = RuntimeState::RegisteringComponents;
                true
            } else {
                false
            }
        };
        if first {
            self.log_transition(
                RuntimeState::Uninitialized,
                RuntimeState::RegisteringComponents,
                format!("first registration ({operation})"),
            );
        }
        Ok(())
    }

    /// Moves to `to` and records the transition.
    fn advance(&self, to: RuntimeState, detail: impl Into<String>) {
        let from = {
            let mut state = self.state.lock();
            let from = *state;
            *state = to;
            from
        };
        self.log_transition(from, to, detail);
    }

    /// Moves to the error state with a failure description.
    fn fail_startup(&self, detail: String) {
        self.advance(RuntimeState::Error, detail);
    }

    fn log_transition(&self, from: RuntimeState, to: RuntimeState, detail: impl Into<String>) {
        let transition = PhaseTransition::new(from, to, detail);
        info!(%from, %to, detail = %transition.detail, "runtime phase");
        self.ledger.record(LedgerRecord::new(
            LedgerEventKind::PhaseChanged,
            RUNTIME_TARGET,
            RUNTIME_TARGET,
            format!("{from} -> {to}: {}", transition.detail),
        ));
        self.transitions.lock().push(transition);
    }
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new(RuntimeConfig::default())
    }
}

fn panic_label(panic: &(dyn Any + Send)) -> String {
    if let Some(msg) = panic.downcast_ref::<&'static str>() {
        format!("panicked: {msg}")
    } else if let Some(msg) = panic.downcast_ref::<String>() {
        format!("panicked: {msg}")
    } else {
        "panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use keel_types::ErrorCode;

    #[test]
    fn fresh_runtime_is_uninitialized() {
        let runtime = Runtime::default();
        assert_eq!(runtime.state(), RuntimeState::Uninitialized);
        assert!(!runtime.is_ready());
        assert!(runtime.initialization_log().is_empty());
    }

    #[test]
    fn health_of_empty_runtime_is_perfect() {
        let runtime = Runtime::default();
        let snapshot = runtime.health();
        assert_eq!(snapshot.score, 100);
        assert!(snapshot.is_healthy());
    }

    #[test]
    fn maintenance_on_healthy_system_records_no_alert() {
        let runtime = Runtime::default();
        let before = runtime.ledger().len();
        let snapshot = runtime.run_maintenance();
        assert!(snapshot.is_healthy());
        assert_eq!(runtime.ledger().len(), before);
    }

    #[tokio::test]
    async fn start_twice_is_invalid() {
        let runtime = Runtime::default();
        runtime.start().await.expect("empty startup succeeds");

        let err = runtime.start().await.expect_err("second start must fail");
        assert_eq!(err.code(), "RUNTIME_INVALID_STATE");
    }

    #[tokio::test]
    async fn empty_startup_walks_all_phases() {
        let runtime = Runtime::default();
        runtime.start().await.expect("empty startup succeeds");
        assert!(runtime.is_ready());

        let phases: Vec<RuntimeState> = runtime
            .initialization_log()
            .iter()
            .map(|t| t.to)
            .collect();
        assert_eq!(
            phases,
            vec![
                RuntimeState::RegisteringComponents,
                RuntimeState::InitializingServices,
                RuntimeState::InitializingModules,
                RuntimeState::PostInitializing,
                RuntimeState::Ready,
            ]
        );
    }
}
