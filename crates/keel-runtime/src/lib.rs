//! Runtime layer for KEEL, the in-process service/module orchestration
//! runtime.
//!
//! KEEL lets independently-developed subsystems (audio, UI, save,
//! analytics, ...) register themselves, declare singleton-vs-multi-
//! instance identity, initialize asynchronously in a controlled order,
//! be discovered by type, and shut down deterministically.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                        Runtime (DI root)                         │
//! │  ┌────────────────────────────────────────────────────────────┐  │
//! │  │                  Lifecycle Orchestrator                    │  │
//! │  │  register → init services (async, timeout, fail-fast)     │  │
//! │  │           → init modules (sync, ordered, contained)       │  │
//! │  │           → ready hooks → publish SystemReady             │  │
//! │  └────────────────────────────────────────────────────────────┘  │
//! │        │                  │                  │                   │
//! │        ▼                  ▼                  ▼                   │
//! │  ServiceRegistry    ModuleRegistry       EventBus                │
//! │  (singletons)       (multi-instance)     (typed pub/sub)         │
//! │        │                  │                                      │
//! │        └───────┬──────────┘                                      │
//! │                ▼                                                 │
//! │        RegistryLedger + HealthSnapshot (observation only)        │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The [`Runtime`] is an explicitly constructed, explicitly passed root
//! object with no ambient statics, so tests construct isolated instances
//! freely.
//!
//! # Example
//!
//! ```
//! use keel_registry::{Service, ServiceError};
//! use keel_runtime::{Runtime, RuntimeConfig, SystemReady};
//! use std::sync::Arc;
//!
//! struct Telemetry;
//!
//! #[async_trait::async_trait]
//! impl Service for Telemetry {
//!     fn name(&self) -> &str {
//!         "Telemetry"
//!     }
//!     async fn initialize(&self) -> Result<(), ServiceError> {
//!         Ok(())
//!     }
//!     async fn shutdown(&self) -> Result<(), ServiceError> {
//!         Ok(())
//!     }
//! }
//!
//! # tokio::runtime::Builder::new_current_thread().enable_time().build().unwrap().block_on(async {
//! let runtime = Runtime::new(RuntimeConfig::default());
//! runtime
//!     .register_service::<Telemetry>(Arc::new(Telemetry))
//!     .expect("registration window is open");
//!
//! runtime.bus().subscribe::<SystemReady>(0, |ready| {
//!     println!("up after {} transitions", ready.log.len());
//! });
//!
//! runtime.start().await.expect("startup succeeds");
//! assert!(runtime.is_ready());
//!
//! runtime.shutdown().await;
//! # });
//! ```

mod config;
mod error;
mod events;
mod health;
mod hooks;
mod ledger;
mod runtime;
mod state;

pub use config::RuntimeConfig;
pub use error::RuntimeError;
pub use events::SystemReady;
pub use health::{HealthIssue, HealthSnapshot, ModuleStateCounts, ServiceStateCounts};
pub use hooks::ReadyHook;
pub use ledger::{LedgerEventKind, LedgerRecord, RegistryLedger};
pub use runtime::Runtime;
pub use state::{PhaseTransition, RuntimeState};

// Re-export the SDK layer so hosts can depend on `keel-runtime` alone.
pub use keel_event::{DispatchOutcome, DispatchStats, EventBus, SubscriptionId};
pub use keel_registry::{
    Module, ModuleError, ModuleRegistry, ModuleReport, ModuleState, RegistryError, Service,
    ServiceError, ServiceRegistry, ServiceReport, ServiceState,
};
pub use keel_types::{CapabilityId, ComponentKind, ErrorCode};
