//! Component registries for the KEEL orchestration runtime.
//!
//! This crate provides the two identity models of the runtime and the
//! type-indexed stores behind them:
//!
//! - **Services** ([`Service`], [`ServiceRegistry`]): singletons with
//!   asynchronous initialization, exactly one instance per capability
//!   type, resolved fail-fast.
//! - **Modules** ([`Module`], [`ModuleRegistry`]): optional multi-instance
//!   components with synchronous initialization, keyed by
//!   `(capability type, UID)` and looked up fail-soft.
//!
//! # Crate Architecture
//!
//! Part of the **SDK layer**:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        SDK Layer                            │
//! ├─────────────────────────────────────────────────────────────┤
//! │  keel-types    : CapabilityId, ErrorCode                    │
//! │  keel-event    : EventBus, DispatchStats                    │
//! │  keel-registry : Service/Module traits, registries ◄── HERE │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! The lifecycle orchestrator in `keel-runtime` drives both registries
//! through their handle snapshots ([`ServiceHandle`], [`ModuleHandle`])
//! and state-transition methods; hosts use the typed
//! register/resolve/get surface.
//!
//! # Example
//!
//! ```
//! use keel_registry::{Service, ServiceError, ServiceRegistry};
//! use std::sync::Arc;
//!
//! trait Analytics: Service {
//!     fn track(&self, event: &str);
//! }
//!
//! struct NoopAnalytics;
//!
//! #[async_trait::async_trait]
//! impl Service for NoopAnalytics {
//!     fn name(&self) -> &str {
//!         "NoopAnalytics"
//!     }
//!     async fn initialize(&self) -> Result<(), ServiceError> {
//!         Ok(())
//!     }
//!     async fn shutdown(&self) -> Result<(), ServiceError> {
//!         Ok(())
//!     }
//! }
//!
//! impl Analytics for NoopAnalytics {
//!     fn track(&self, _event: &str) {}
//! }
//!
//! let services = ServiceRegistry::new();
//! services
//!     .register::<dyn Analytics>(Arc::new(NoopAnalytics))
//!     .expect("first registration");
//!
//! services
//!     .resolve::<dyn Analytics>()
//!     .expect("registered above")
//!     .track("session_start");
//! ```

mod error;
mod module;
mod module_registry;
mod service;
mod service_registry;
mod status;

pub use error::RegistryError;
pub use module::{Module, ModuleError};
pub use module_registry::{ModuleHandle, ModuleIter, ModuleRegistry, ModuleReport};
pub use service::{Service, ServiceError};
pub use service_registry::{ServiceHandle, ServiceRegistry, ServiceReport};
pub use status::{ModuleState, ServiceState};
