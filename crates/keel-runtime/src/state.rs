//! Runtime lifecycle states and the phase transition log.
//!
//! The orchestrator is a state machine over the whole system:
//!
//! ```text
//! Uninitialized → RegisteringComponents → InitializingServices
//!                                               │        ↓
//!                                               │      Error ──┐
//!                                               ▼              │
//!                                     InitializingModules      │
//!                                               ▼              │
//!                                       PostInitializing       │
//!                                               ▼              │
//!                                             Ready            │
//!                                               ▼              ▼
//!                                         ShuttingDown ◄───────┘
//!                                               ▼
//!                                           Shutdown
//! ```
//!
//! `Error` is an absorbing startup state reachable from
//! `InitializingServices` on the first failure or on timeout. Shutdown is
//! reachable from both `Ready` and `Error`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle state of the whole runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuntimeState {
    /// Constructed, nothing registered yet.
    #[default]
    Uninitialized,

    /// Components are being registered; nothing is initialized.
    ///
    /// Registration order matters only for human-readable logs.
    RegisteringComponents,

    /// Service initializers running concurrently, bounded by the
    /// configured timeout. Fail-fast: the first failure aborts startup.
    InitializingServices,

    /// Modules initializing sequentially in registration order.
    /// Fault-contained: per-module failures do not abort the phase.
    InitializingModules,

    /// Post-init hooks running against the fully-initialized service set.
    PostInitializing,

    /// Startup complete; the system-ready event has been published.
    Ready,

    /// Startup failed. Absorbing: only shutdown leaves this state.
    Error,

    /// Teardown in progress: modules first, then services.
    ShuttingDown,

    /// Teardown complete. Terminal.
    Shutdown,
}

impl RuntimeState {
    /// Returns `true` once startup completed successfully.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready)
    }

    /// Returns `true` if startup failed.
    #[must_use]
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Error)
    }

    /// Returns `true` for the terminal state.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Shutdown)
    }

    /// Returns `true` while registration (and hook installation) is
    /// still permitted, before `start()` begins initialization.
    #[must_use]
    pub fn can_register(&self) -> bool {
        matches!(self, Self::Uninitialized | Self::RegisteringComponents)
    }
}

impl std::fmt::Display for RuntimeState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Uninitialized => write!(f, "uninitialized"),
            Self::RegisteringComponents => write!(f, "registering_components"),
            Self::InitializingServices => write!(f, "initializing_services"),
            Self::InitializingModules => write!(f, "initializing_modules"),
            Self::PostInitializing => write!(f, "post_initializing"),
            Self::Ready => write!(f, "ready"),
            Self::Error => write!(f, "error"),
            Self::ShuttingDown => write!(f, "shutting_down"),
            Self::Shutdown => write!(f, "shutdown"),
        }
    }
}

/// One recorded state transition.
///
/// The accumulated transition log is queryable via
/// `Runtime::initialization_log` and travels with the system-ready event,
/// so a failed startup can always be traced to the phase and component
/// that broke it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseTransition {
    /// State before the transition.
    pub from: RuntimeState,
    /// State after the transition.
    pub to: RuntimeState,
    /// When the transition happened.
    pub at: DateTime<Utc>,
    /// Human-readable context (component counts, failure cause, ...).
    pub detail: String,
}

impl PhaseTransition {
    /// Creates a transition stamped with the current time.
    #[must_use]
    pub fn new(from: RuntimeState, to: RuntimeState, detail: impl Into<String>) -> Self {
        Self {
            from,
            to,
            at: Utc::now(),
            detail: detail.into(),
        }
    }
}
