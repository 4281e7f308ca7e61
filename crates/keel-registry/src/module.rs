//! Module trait for optional multi-instance components.
//!
//! A **module** is an optional feature: many instances may coexist under
//! one capability type, each identified by a caller-assigned UID.
//! Absence of a module is a normal runtime condition, and a module's
//! failure must never take the system down, so initialization is
//! fault-contained per instance.
//!
//! # Module vs Service
//!
//! | Aspect | Service | Module |
//! |--------|---------|--------|
//! | Cardinality | one per capability | many per capability |
//! | Identity | capability type | (capability type, UID) |
//! | Initialization | async, concurrent | sync, registration order |
//! | Init failure | fatal to startup | contained, phase continues |
//! | Missing at lookup | hard error | `None` |
//!
//! # Example
//!
//! ```
//! use keel_registry::{Module, ModuleError};
//!
//! struct Minimap {
//!     uid: String,
//! }
//!
//! impl Module for Minimap {
//!     fn uid(&self) -> &str {
//!         &self.uid
//!     }
//!
//!     fn initialize(&self) -> Result<(), ModuleError> {
//!         Ok(())
//!     }
//!
//!     fn shutdown(&self) -> Result<(), ModuleError> {
//!         Ok(())
//!     }
//! }
//! ```

use keel_types::ErrorCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Optional multi-instance component with synchronous initialization.
///
/// The UID is supplied by the module itself, must be non-empty, and must
/// be unique system-wide, not just within the module's capability
/// bucket. Registration enforces both.
///
/// Modules are shared as `Arc` and called through `&self`; use interior
/// mutability for mutable state.
pub trait Module: Send + Sync + 'static {
    /// Caller-assigned unique instance id.
    ///
    /// Non-empty; unique across every capability bucket in the registry.
    fn uid(&self) -> &str;

    /// Synchronous initializer.
    ///
    /// Run sequentially in registration order during startup. A failure
    /// (or panic) here is caught and recorded; later modules still
    /// initialize.
    fn initialize(&self) -> Result<(), ModuleError>;

    /// Teardown hook.
    ///
    /// Invoked on unregistration and system shutdown. Errors are caught
    /// and logged by the caller; one misbehaving module cannot block
    /// teardown of the rest.
    fn shutdown(&self) -> Result<(), ModuleError>;
}

/// Module operation error.
///
/// | Variant | Code | Recoverable |
/// |---------|------|-------------|
/// | [`InitFailed`](ModuleError::InitFailed) | `MODULE_INIT_FAILED` | Yes |
/// | [`ShutdownFailed`](ModuleError::ShutdownFailed) | `MODULE_SHUTDOWN_FAILED` | No |
#[derive(Debug, Clone, Serialize, Deserialize, Error)]
pub enum ModuleError {
    /// Initialization failed. The module stays registered in its error
    /// state; the rest of the phase proceeds.
    #[error("initialization failed: {0}")]
    InitFailed(String),

    /// Shutdown failed. Logged and ignored for control flow.
    #[error("shutdown failed: {0}")]
    ShutdownFailed(String),
}

impl ErrorCode for ModuleError {
    fn code(&self) -> &'static str {
        match self {
            Self::InitFailed(_) => "MODULE_INIT_FAILED",
            Self::ShutdownFailed(_) => "MODULE_SHUTDOWN_FAILED",
        }
    }

    fn is_recoverable(&self) -> bool {
        matches!(self, Self::InitFailed(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use keel_types::assert_error_codes;

    fn all_variants() -> Vec<ModuleError> {
        vec![
            ModuleError::InitFailed("x".into()),
            ModuleError::ShutdownFailed("x".into()),
        ]
    }

    #[test]
    fn all_error_codes_valid() {
        assert_error_codes(&all_variants(), "MODULE_");
    }

    #[test]
    fn recoverability() {
        assert!(ModuleError::InitFailed("x".into()).is_recoverable());
        assert!(!ModuleError::ShutdownFailed("x".into()).is_recoverable());
    }
}
