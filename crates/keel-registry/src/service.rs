//! Service trait for singleton components.
//!
//! A **service** is a singleton component registered under a capability
//! type: audio, persistence, analytics, the subsystems everything else
//! depends on. Services initialize asynchronously and concurrently during
//! startup, so they must not assume any ordering relative to each other;
//! a dependency on another service is expressed by resolving it lazily
//! after the system is ready.
//!
//! # Shape Contract
//!
//! | Method | Purpose |
//! |--------|---------|
//! | `name` | Implementation name for logs and diagnostics |
//! | `initialize` | Asynchronous startup; fail-fast for the whole system |
//! | `shutdown` | Teardown; failures are logged, never propagated |
//!
//! # Thread Safety
//!
//! Services are shared as `Arc` and called through `&self`; use interior
//! mutability for any state mutated after construction.
//!
//! # Example
//!
//! ```
//! use keel_registry::{Service, ServiceError};
//! use std::sync::atomic::{AtomicBool, Ordering};
//!
//! #[derive(Default)]
//! struct NullAudio {
//!     running: AtomicBool,
//! }
//!
//! #[async_trait::async_trait]
//! impl Service for NullAudio {
//!     fn name(&self) -> &str {
//!         "NullAudio"
//!     }
//!
//!     async fn initialize(&self) -> Result<(), ServiceError> {
//!         self.running.store(true, Ordering::SeqCst);
//!         Ok(())
//!     }
//!
//!     async fn shutdown(&self) -> Result<(), ServiceError> {
//!         self.running.store(false, Ordering::SeqCst);
//!         Ok(())
//!     }
//! }
//! ```

use keel_types::ErrorCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Singleton component with asynchronous initialization.
///
/// Implement this for every type registered with the service registry.
/// Capability traits extend it, so a trait-object capability is itself
/// drivable through the lifecycle:
///
/// ```
/// use keel_registry::Service;
///
/// trait Audio: Service {
///     fn master_volume(&self) -> f32;
/// }
/// ```
#[async_trait::async_trait]
pub trait Service: Send + Sync + 'static {
    /// Human-readable implementation name, used in logs, the diagnostics
    /// ledger, and health reports.
    fn name(&self) -> &str;

    /// Asynchronous initializer.
    ///
    /// Started concurrently with every other registered service during
    /// startup. A failure here is fatal to the whole startup sequence.
    /// Expected to observe cooperative cancellation: after the startup
    /// timeout the orchestrator stops waiting, and a straggler's eventual
    /// result is logged but changes nothing.
    async fn initialize(&self) -> Result<(), ServiceError>;

    /// Teardown.
    ///
    /// Called during system shutdown after all modules are down. Errors
    /// are caught and logged by the caller; returning `Err` cannot stop
    /// teardown of the remaining services.
    async fn shutdown(&self) -> Result<(), ServiceError>;
}

/// Service operation error.
///
/// | Variant | Code | Recoverable |
/// |---------|------|-------------|
/// | [`InitFailed`](ServiceError::InitFailed) | `SERVICE_INIT_FAILED` | Yes |
/// | [`ShutdownFailed`](ServiceError::ShutdownFailed) | `SERVICE_SHUTDOWN_FAILED` | No |
/// | [`Unavailable`](ServiceError::Unavailable) | `SERVICE_UNAVAILABLE` | Yes |
#[derive(Debug, Clone, Serialize, Deserialize, Error)]
pub enum ServiceError {
    /// Initialization failed.
    ///
    /// May succeed on a later start with a different configuration.
    #[error("initialization failed: {0}")]
    InitFailed(String),

    /// Shutdown failed. The caller logs and continues teardown.
    #[error("shutdown failed: {0}")]
    ShutdownFailed(String),

    /// A resource the service depends on is unavailable.
    ///
    /// Transient by definition: retry may succeed.
    #[error("service unavailable: {0}")]
    Unavailable(String),
}

impl ErrorCode for ServiceError {
    fn code(&self) -> &'static str {
        match self {
            Self::InitFailed(_) => "SERVICE_INIT_FAILED",
            Self::ShutdownFailed(_) => "SERVICE_SHUTDOWN_FAILED",
            Self::Unavailable(_) => "SERVICE_UNAVAILABLE",
        }
    }

    fn is_recoverable(&self) -> bool {
        matches!(self, Self::InitFailed(_) | Self::Unavailable(_))
    }
}
