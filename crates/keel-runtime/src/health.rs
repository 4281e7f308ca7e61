//! Derived health snapshot over the registries' status reports.
//!
//! A [`HealthSnapshot`] is a point-in-time aggregate: per-status counts,
//! accumulated initialization time, the list of current errors, and a
//! 0–100 score. It is computed from the registries' reports and holds no
//! live references, so it is safe to serialize, ship, or diff.

use keel_registry::{ModuleReport, ModuleState, ServiceReport, ServiceState};
use keel_types::ComponentKind;
use serde::{Deserialize, Serialize};

/// Score at or above which (with zero errors) the system is healthy.
const HEALTHY_SCORE_FLOOR: u8 = 90;

/// Per-status service counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceStateCounts {
    /// Entries in [`ServiceState::Registered`].
    pub registered: usize,
    /// Entries in [`ServiceState::Initializing`].
    pub initializing: usize,
    /// Entries in [`ServiceState::Ready`].
    pub ready: usize,
    /// Entries in [`ServiceState::Error`].
    pub error: usize,
    /// Entries in [`ServiceState::ShuttingDown`].
    pub shutting_down: usize,
    /// Entries in [`ServiceState::Shutdown`].
    pub shutdown: usize,
}

/// Per-status module counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleStateCounts {
    /// Entries in [`ModuleState::Registered`].
    pub registered: usize,
    /// Entries in [`ModuleState::Initialized`].
    pub initialized: usize,
    /// Entries in [`ModuleState::Error`].
    pub error: usize,
    /// Entries in [`ModuleState::Shutdown`].
    pub shutdown: usize,
}

/// One component currently in an error state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthIssue {
    /// Component name (service implementation name or module UID).
    pub component: String,
    /// Whether the component is a service or a module.
    pub kind: ComponentKind,
    /// The recorded error message.
    pub message: String,
}

/// Point-in-time aggregate over all registry entries.
///
/// Score = 100 × healthy / total, where healthy means a service in
/// `Ready` or a module in `Initialized`. Inactive modules are excluded
/// from the score (they are deliberately not initialized) but still
/// appear in the per-status counts. An empty system scores 100.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthSnapshot {
    /// Service counts per status.
    pub services: ServiceStateCounts,
    /// Module counts per status.
    pub modules: ModuleStateCounts,
    /// Components considered by the score (inactive modules excluded).
    pub total_components: usize,
    /// Components currently healthy.
    pub healthy_components: usize,
    /// Sum of all measured service initialization durations.
    pub accumulated_init_ms: u64,
    /// Every component currently in an error state.
    pub errors: Vec<HealthIssue>,
    /// 0–100 health score.
    pub score: u8,
}

impl HealthSnapshot {
    /// Computes a snapshot from the registries' status reports.
    #[must_use]
    pub fn compute(services: &[ServiceReport], modules: &[ModuleReport]) -> Self {
        let mut service_counts = ServiceStateCounts::default();
        let mut module_counts = ModuleStateCounts::default();
        let mut errors = Vec::new();
        let mut accumulated_init_ms: u64 = 0;
        let mut total = 0usize;
        let mut healthy = 0usize;

        for report in services {
            match report.state {
                ServiceState::Registered => service_counts.registered += 1,
                ServiceState::Initializing => service_counts.initializing += 1,
                ServiceState::Ready => service_counts.ready += 1,
                ServiceState::Error => service_counts.error += 1,
                ServiceState::ShuttingDown => service_counts.shutting_down += 1,
                ServiceState::Shutdown => service_counts.shutdown += 1,
            }
            total += 1;
            if report.state.is_ready() {
                healthy += 1;
            }
            accumulated_init_ms = accumulated_init_ms.saturating_add(report.init_ms.unwrap_or(0));
            if report.state.is_failed() {
                errors.push(HealthIssue {
                    component: report.name.clone(),
                    kind: ComponentKind::Service,
                    message: report
                        .last_error
                        .clone()
                        .unwrap_or_else(|| "unknown error".into()),
                });
            }
        }

        for report in modules {
            match report.state {
                ModuleState::Registered => module_counts.registered += 1,
                ModuleState::Initialized => module_counts.initialized += 1,
                ModuleState::Error => module_counts.error += 1,
                ModuleState::Shutdown => module_counts.shutdown += 1,
            }
            if report.active {
                total += 1;
                if report.state.is_initialized() {
                    healthy += 1;
                }
            }
            if report.state.is_failed() {
                errors.push(HealthIssue {
                    component: report.uid.clone(),
                    kind: ComponentKind::Module,
                    message: report
                        .last_error
                        .clone()
                        .unwrap_or_else(|| "unknown error".into()),
                });
            }
        }

        let score = score_of(healthy, total);

        Self {
            services: service_counts,
            modules: module_counts,
            total_components: total,
            healthy_components: healthy,
            accumulated_init_ms,
            errors,
            score,
        }
    }

    /// A system is healthy iff the score is at least 90 and no entry is
    /// in an error state.
    #[must_use]
    pub fn is_healthy(&self) -> bool {
        self.score >= HEALTHY_SCORE_FLOOR && self.errors.is_empty()
    }
}

/// 100 × healthy / total, rounded; an empty system scores 100.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn score_of(healthy: usize, total: usize) -> u8 {
    if total == 0 {
        100
    } else {
        ((healthy as f64 / total as f64) * 100.0).round() as u8
    }
}
