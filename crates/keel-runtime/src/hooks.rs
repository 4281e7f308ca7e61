//! Post-initialization hooks.
//!
//! Hooks run during the post-init phase, after every service initialized
//! and before the ready event is published. They exist for cross-service
//! wiring that needs the fully-initialized service set: subscribing one
//! service's listener to another's notifications, warming caches, and so
//! on. Hooks are expected to be idempotent and side-effect-light.
//!
//! A hook failure is a structural wiring error and fails the startup
//! sequence (unlike module failures, which are contained).

use crate::{Runtime, RuntimeError};

/// A unit of cross-service wiring run once the service set is ready.
///
/// # Example
///
/// ```no_run
/// use keel_runtime::{ReadyHook, Runtime, RuntimeError};
///
/// struct WireAnalytics;
///
/// #[async_trait::async_trait]
/// impl ReadyHook for WireAnalytics {
///     fn name(&self) -> &str {
///         "wire-analytics"
///     }
///
///     async fn run(&self, _runtime: &Runtime) -> Result<(), RuntimeError> {
///         // resolve services and connect them here
///         Ok(())
///     }
/// }
/// ```
#[async_trait::async_trait]
pub trait ReadyHook: Send + Sync {
    /// Hook name, for logs and failure reports.
    fn name(&self) -> &str {
        "ready-hook"
    }

    /// Runs the hook against the runtime's ready service set.
    ///
    /// # Errors
    ///
    /// Returning an error aborts startup and leaves the runtime in the
    /// error state.
    async fn run(&self, runtime: &Runtime) -> Result<(), RuntimeError>;
}
