//! Status types for registered components.
//!
//! Registry entries track where each component sits in its lifecycle.
//! Services and modules deliberately have different state sets: services
//! move through an asynchronous, orchestrated startup, while modules have
//! a flat synchronous lifecycle.
//!
//! # Service Lifecycle
//!
//! ```text
//! Registered → Initializing → Ready → ShuttingDown → Shutdown
//!                   ↓
//!                 Error
//! ```
//!
//! # Module Lifecycle
//!
//! ```text
//! Registered → Initialized → Shutdown
//!         ↓
//!       Error
//! ```

use serde::{Deserialize, Serialize};

/// Lifecycle state of a registered service.
///
/// Mutated only by the lifecycle orchestrator; the registry itself only
/// creates entries (`Registered`) and removes them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceState {
    /// Stored in the registry, initializer not yet started.
    #[default]
    Registered,

    /// Asynchronous initializer in flight.
    Initializing,

    /// Initialization completed successfully.
    Ready,

    /// Initialization or shutdown failed.
    Error,

    /// Shutdown in progress.
    ShuttingDown,

    /// Shutdown completed. Terminal.
    Shutdown,
}

impl ServiceState {
    /// Returns `true` if the service completed initialization and has not
    /// begun shutting down.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready)
    }

    /// Returns `true` if the service recorded a failure.
    #[must_use]
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Error)
    }

    /// Returns `true` for states with no further transitions.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Shutdown)
    }
}

impl std::fmt::Display for ServiceState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Registered => write!(f, "registered"),
            Self::Initializing => write!(f, "initializing"),
            Self::Ready => write!(f, "ready"),
            Self::Error => write!(f, "error"),
            Self::ShuttingDown => write!(f, "shutting_down"),
            Self::Shutdown => write!(f, "shutdown"),
        }
    }
}

/// Lifecycle state of a registered module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModuleState {
    /// Stored in the registry, not yet initialized.
    #[default]
    Registered,

    /// Synchronous initialization completed.
    Initialized,

    /// Initialization failed; the module stays registered but unusable.
    Error,

    /// Shut down. Terminal.
    Shutdown,
}

impl ModuleState {
    /// Returns `true` if the module initialized successfully.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        matches!(self, Self::Initialized)
    }

    /// Returns `true` if the module recorded a failure.
    #[must_use]
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Error)
    }
}

impl std::fmt::Display for ModuleState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Registered => write!(f, "registered"),
            Self::Initialized => write!(f, "initialized"),
            Self::Error => write!(f, "error"),
            Self::Shutdown => write!(f, "shutdown"),
        }
    }
}
