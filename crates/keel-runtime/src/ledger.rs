//! Diagnostics ledger: append-only record of registry and lifecycle
//! activity.
//!
//! The ledger is purely observational: it never feeds back into
//! orchestration decisions, so the orchestrator behaves identically with
//! a capacity-1 ledger and a capacity-10000 one. Retention is a bounded
//! ring: once the configured capacity is exceeded the oldest records are
//! evicted first.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// What a ledger record describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LedgerEventKind {
    /// A service was registered.
    ServiceRegistered,
    /// A service initializer was started.
    ServiceInitializing,
    /// A service initializer completed successfully.
    ServiceReady,
    /// A service initializer failed or panicked.
    ServiceFailed,
    /// A service was shut down.
    ServiceShutdown,
    /// A module was registered.
    ModuleRegistered,
    /// A module initialized successfully.
    ModuleInitialized,
    /// A module initializer failed or panicked.
    ModuleFailed,
    /// A module was shut down.
    ModuleShutdown,
    /// The runtime moved to a new lifecycle state.
    PhaseChanged,
    /// Periodic maintenance found the system degraded.
    HealthAlert,
}

impl std::fmt::Display for LedgerEventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::ServiceRegistered => "service_registered",
            Self::ServiceInitializing => "service_initializing",
            Self::ServiceReady => "service_ready",
            Self::ServiceFailed => "service_failed",
            Self::ServiceShutdown => "service_shutdown",
            Self::ModuleRegistered => "module_registered",
            Self::ModuleInitialized => "module_initialized",
            Self::ModuleFailed => "module_failed",
            Self::ModuleShutdown => "module_shutdown",
            Self::PhaseChanged => "phase_changed",
            Self::HealthAlert => "health_alert",
        };
        write!(f, "{label}")
    }
}

/// One immutable ledger record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerRecord {
    /// When the event happened.
    pub at: DateTime<Utc>,
    /// Event classification.
    pub kind: LedgerEventKind,
    /// Name of the affected component (or `"runtime"`).
    pub target: String,
    /// Capability short name of the target (or `"runtime"`).
    pub target_type: String,
    /// Free-text context: durations, failure causes, ...
    pub detail: String,
}

impl LedgerRecord {
    /// Creates a record stamped with the current time.
    #[must_use]
    pub fn new(
        kind: LedgerEventKind,
        target: impl Into<String>,
        target_type: impl Into<String>,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            at: Utc::now(),
            kind,
            target: target.into(),
            target_type: target_type.into(),
            detail: detail.into(),
        }
    }
}

struct Ring {
    records: VecDeque<LedgerRecord>,
    capacity: usize,
}

/// Bounded, append-only event log over the registries and the lifecycle
/// orchestrator.
///
/// # Example
///
/// ```
/// use keel_runtime::{LedgerEventKind, LedgerRecord, RegistryLedger};
///
/// let ledger = RegistryLedger::new(2);
/// for uid in ["a", "b", "c"] {
///     ledger.record(LedgerRecord::new(
///         LedgerEventKind::ModuleRegistered,
///         uid,
///         "HudElement",
///         "",
///     ));
/// }
///
/// // Capacity 2: the oldest record was evicted.
/// let recent = ledger.recent(10);
/// assert_eq!(recent.len(), 2);
/// assert_eq!(recent[0].target, "c"); // newest first
/// assert_eq!(recent[1].target, "b");
/// ```
pub struct RegistryLedger {
    inner: Mutex<Ring>,
}

impl RegistryLedger {
    /// Creates a ledger retaining at most `capacity` records.
    ///
    /// A zero capacity is clamped to 1 so the most recent record is
    /// always queryable.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(Ring {
                records: VecDeque::new(),
                capacity: capacity.max(1),
            }),
        }
    }

    /// Appends a record, evicting the oldest once over capacity.
    pub fn record(&self, record: LedgerRecord) {
        let mut ring = self.inner.lock();
        while ring.records.len() >= ring.capacity {
            ring.records.pop_front();
        }
        ring.records.push_back(record);
    }

    /// Returns the most recent `n` records, newest first.
    #[must_use]
    pub fn recent(&self, n: usize) -> Vec<LedgerRecord> {
        let ring = self.inner.lock();
        ring.records.iter().rev().take(n).cloned().collect()
    }

    /// Number of retained records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().records.len()
    }

    /// Returns `true` if nothing has been recorded (or everything was
    /// evicted).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.lock().records.is_empty()
    }

    /// The configured retention bound.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.inner.lock().capacity
    }
}
