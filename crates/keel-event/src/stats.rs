//! Publish statistics for profiling hot event types.

use serde::{Deserialize, Serialize};
use std::any::type_name;
use std::collections::{BTreeMap, HashMap};

/// Read-only snapshot of per-event-type publish counters.
///
/// Produced by [`EventBus::stats`](crate::EventBus::stats). Counters are
/// keyed by the event's Rust type name and count `publish` calls, not
/// handler invocations: a publish with zero subscribers still counts.
///
/// # Example
///
/// ```
/// use keel_event::EventBus;
///
/// struct Tick;
///
/// let bus = EventBus::new();
/// bus.publish(&Tick);
/// bus.publish(&Tick);
///
/// let stats = bus.stats();
/// assert_eq!(stats.count_for::<Tick>(), 2);
/// assert_eq!(stats.total(), 2);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DispatchStats {
    counts: BTreeMap<String, u64>,
}

impl DispatchStats {
    pub(crate) fn from_counts(counts: &HashMap<&'static str, u64>) -> Self {
        Self {
            counts: counts
                .iter()
                .map(|(name, count)| ((*name).to_string(), *count))
                .collect(),
        }
    }

    /// Returns the publish count for event type `E`.
    #[must_use]
    pub fn count_for<E: 'static>(&self) -> u64 {
        self.count_for_name(type_name::<E>())
    }

    /// Returns the publish count for a type name captured earlier.
    #[must_use]
    pub fn count_for_name(&self, name: &str) -> u64 {
        self.counts.get(name).copied().unwrap_or(0)
    }

    /// Total publishes across all event types.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    /// Iterates `(type name, publish count)` pairs, sorted by type name.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.counts.iter().map(|(name, count)| (name.as_str(), *count))
    }

    /// Returns `true` if nothing has been published yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}
