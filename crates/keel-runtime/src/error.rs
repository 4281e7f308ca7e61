//! Runtime layer errors.
//!
//! # Error Codes
//!
//! | Variant | Code | Recoverable |
//! |---------|------|-------------|
//! | [`RuntimeError::Registry`] | delegated (`REGISTRY_*`) | delegated |
//! | [`RuntimeError::InvalidState`] | `RUNTIME_INVALID_STATE` | No |
//! | [`RuntimeError::ServiceInitFailed`] | `RUNTIME_SERVICE_INIT_FAILED` | Yes |
//! | [`RuntimeError::ServiceInitTimeout`] | `RUNTIME_SERVICE_INIT_TIMEOUT` | Yes |
//! | [`RuntimeError::PostInitFailed`] | `RUNTIME_POST_INIT_FAILED` | No |
//!
//! Initialization failures are recoverable in the sense that a later
//! `start()` on a freshly built runtime may succeed (slow hardware,
//! transient resources). State misuse and broken post-init wiring are
//! structural and are not.

use crate::RuntimeState;
use keel_registry::RegistryError;
use keel_types::ErrorCode;
use thiserror::Error;

/// Runtime layer error.
///
/// # Example
///
/// ```
/// use keel_runtime::{RuntimeError, RuntimeState};
/// use keel_types::ErrorCode;
///
/// let err = RuntimeError::InvalidState {
///     state: RuntimeState::Ready,
///     required: "before startup",
/// };
/// assert_eq!(err.code(), "RUNTIME_INVALID_STATE");
/// assert!(!err.is_recoverable());
/// ```
#[derive(Debug, Clone, Error)]
pub enum RuntimeError {
    /// A registry operation failed (duplicate registration, missing
    /// service, ...). Carries the registry's own error code.
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// The operation is not permitted in the runtime's current state,
    /// e.g. registering a component after `start()`.
    #[error("runtime in state '{state}', operation requires {required}")]
    InvalidState {
        /// Current state.
        state: RuntimeState,
        /// What the operation needed.
        required: &'static str,
    },

    /// A service initializer returned an error or panicked.
    ///
    /// Fatal to the startup sequence: the runtime is left in
    /// [`RuntimeState::Error`].
    #[error("service '{service}' failed to initialize: {reason}")]
    ServiceInitFailed {
        /// Implementation name of the failed service.
        service: String,
        /// Failure description.
        reason: String,
    },

    /// The service initialization phase exceeded its configured timeout.
    ///
    /// In-flight initializers are not forcibly killed; the orchestrator
    /// stops waiting and the runtime is left in [`RuntimeState::Error`].
    #[error("service initialization timed out after {timeout_ms} ms")]
    ServiceInitTimeout {
        /// The configured timeout that elapsed.
        timeout_ms: u64,
    },

    /// A post-init hook failed while wiring the ready service set.
    #[error("post-init hook '{hook}' failed: {reason}")]
    PostInitFailed {
        /// Name of the failed hook.
        hook: String,
        /// Failure description.
        reason: String,
    },
}

impl ErrorCode for RuntimeError {
    fn code(&self) -> &'static str {
        match self {
            Self::Registry(err) => err.code(),
            Self::InvalidState { .. } => "RUNTIME_INVALID_STATE",
            Self::ServiceInitFailed { .. } => "RUNTIME_SERVICE_INIT_FAILED",
            Self::ServiceInitTimeout { .. } => "RUNTIME_SERVICE_INIT_TIMEOUT",
            Self::PostInitFailed { .. } => "RUNTIME_POST_INIT_FAILED",
        }
    }

    fn is_recoverable(&self) -> bool {
        match self {
            Self::Registry(err) => err.is_recoverable(),
            Self::ServiceInitFailed { .. } | Self::ServiceInitTimeout { .. } => true,
            Self::InvalidState { .. } | Self::PostInitFailed { .. } => false,
        }
    }
}
