//! EventBus: type-indexed publish/subscribe dispatch.
//!
//! Handlers are keyed by the event's concrete Rust type and ordered by
//! ascending priority (lower runs first, insertion order breaks ties).
//! Publishing snapshots the handler list so subscribe/unsubscribe from
//! inside a handler never affects the in-flight dispatch.
//!
//! # Ownership
//!
//! The bus owns its handler records, never the subscribers behind them:
//! a subscription keeps no component alive, and dropping a component does
//! not remove its handlers. Unsubscription is the caller's responsibility
//! via the [`SubscriptionId`] returned by [`EventBus::subscribe`].

use crate::stats::DispatchStats;
use parking_lot::RwLock;
use std::any::{type_name, Any, TypeId};
use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use tracing::{debug, error};

/// Marker for values that can travel over the [`EventBus`].
///
/// Blanket-implemented: any `'static + Send + Sync` value is
/// event-shaped. Events carry their own meaning through their type;
/// the bus imposes no envelope.
pub trait Event: Any + Send + Sync {}

impl<T: Any + Send + Sync> Event for T {}

/// Opaque handle identifying one subscription.
///
/// Returned by [`EventBus::subscribe`], consumed by
/// [`EventBus::unsubscribe`]. Closures have no identity in Rust, so the
/// token stands in for the "same handler reference" that
/// unsubscription needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId {
    event: TypeId,
    seq: u64,
}

/// Result of one publish: how many handlers ran, how many failed.
///
/// `publish` itself never fails; handler panics are contained and
/// surface here as `failed` counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchOutcome {
    /// Handlers that completed normally.
    pub delivered: usize,
    /// Handlers that panicked (caught, logged, skipped).
    pub failed: usize,
}

struct HandlerEntry {
    seq: u64,
    priority: i32,
    callback: Arc<dyn Fn(&dyn Any) + Send + Sync>,
}

#[derive(Default)]
struct BusInner {
    handlers: HashMap<TypeId, Vec<HandlerEntry>>,
    publish_counts: HashMap<&'static str, u64>,
    next_seq: u64,
}

/// Type-indexed, priority-ordered publish/subscribe dispatcher.
///
/// One coarse lock guards the handler table, so publish-time snapshots
/// are atomic with respect to concurrent subscribe/unsubscribe. The lock
/// is **not** held while handlers run: dispatch happens on the snapshot,
/// which keeps reentrant subscribe/publish from a handler safe.
///
/// # Example
///
/// ```
/// use keel_event::EventBus;
///
/// struct SceneLoaded;
///
/// let bus = EventBus::new();
/// bus.subscribe::<SceneLoaded>(0, |_| {});
///
/// // Zero or many subscribers, publish always completes.
/// let outcome = bus.publish(&SceneLoaded);
/// assert_eq!(outcome.delivered, 1);
/// ```
#[derive(Default)]
pub struct EventBus {
    inner: RwLock<BusInner>,
}

impl EventBus {
    /// Creates an empty bus.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribes a handler to events of type `E`.
    ///
    /// Lower priority runs first; handlers with equal priority run in
    /// subscription order. There is no limit on handler count.
    ///
    /// The returned [`SubscriptionId`] is the only way to remove this
    /// handler again.
    pub fn subscribe<E: Event>(
        &self,
        priority: i32,
        handler: impl Fn(&E) + Send + Sync + 'static,
    ) -> SubscriptionId {
        let callback: Arc<dyn Fn(&dyn Any) + Send + Sync> = Arc::new(move |any| {
            if let Some(event) = any.downcast_ref::<E>() {
                handler(event);
            }
        });

        let mut inner = self.inner.write();
        let seq = inner.next_seq;
        inner.next_seq += 1;

        let bucket = inner.handlers.entry(TypeId::of::<E>()).or_default();
        bucket.push(HandlerEntry {
            seq,
            priority,
            callback,
        });
        // seq is unique and monotonic, so this full key keeps equal
        // priorities in subscription order.
        bucket.sort_unstable_by_key(|h| (h.priority, h.seq));

        debug!(
            event = type_name::<E>(),
            priority, "subscribed handler #{seq}"
        );

        SubscriptionId {
            event: TypeId::of::<E>(),
            seq,
        }
    }

    /// Removes the subscription identified by `sub`.
    ///
    /// Returns `true` if a handler was removed. Unsubscribing a handler
    /// that is already gone is a no-op, not an error.
    pub fn unsubscribe(&self, sub: SubscriptionId) -> bool {
        let mut inner = self.inner.write();
        let Some(bucket) = inner.handlers.get_mut(&sub.event) else {
            return false;
        };
        let before = bucket.len();
        bucket.retain(|h| h.seq != sub.seq);
        before != bucket.len()
    }

    /// Publishes an event to all current subscribers of its type.
    ///
    /// Takes a snapshot of the handler list, then invokes each handler in
    /// ascending-priority order. A panic inside one handler is caught,
    /// logged, and counted; subsequent handlers still run and the panic
    /// never reaches the publisher. Synchronous: returns only after every
    /// snapshotted handler ran or failed.
    ///
    /// Publishing with zero subscribers is a successful no-op (the
    /// per-type publish counter still advances).
    pub fn publish<E: Event>(&self, event: &E) -> DispatchOutcome {
        let snapshot: Vec<Arc<dyn Fn(&dyn Any) + Send + Sync>> = {
            let mut inner = self.inner.write();
            *inner.publish_counts.entry(type_name::<E>()).or_insert(0) += 1;
            inner
                .handlers
                .get(&TypeId::of::<E>())
                .map(|bucket| bucket.iter().map(|h| Arc::clone(&h.callback)).collect())
                .unwrap_or_default()
        };

        let mut outcome = DispatchOutcome::default();
        for callback in snapshot {
            match catch_unwind(AssertUnwindSafe(|| callback(event))) {
                Ok(()) => outcome.delivered += 1,
                Err(panic) => {
                    outcome.failed += 1;
                    error!(
                        event = type_name::<E>(),
                        "event handler panicked: {}",
                        panic_message(&panic)
                    );
                }
            }
        }
        outcome
    }

    /// Removes all handlers for events of type `E`.
    pub fn clear_handlers<E: Event>(&self) {
        let mut inner = self.inner.write();
        inner.handlers.remove(&TypeId::of::<E>());
    }

    /// Removes every handler for every event type.
    ///
    /// Used on top-level reset. Publish statistics survive the clear.
    pub fn clear_all(&self) {
        let mut inner = self.inner.write();
        inner.handlers.clear();
    }

    /// Returns the number of handlers subscribed to `E`.
    #[must_use]
    pub fn handler_count<E: Event>(&self) -> usize {
        self.inner
            .read()
            .handlers
            .get(&TypeId::of::<E>())
            .map_or(0, Vec::len)
    }

    /// Returns the total number of live subscriptions across all types.
    #[must_use]
    pub fn subscription_count(&self) -> usize {
        self.inner.read().handlers.values().map(Vec::len).sum()
    }

    /// Returns a read-only snapshot of the per-event-type publish
    /// counters, for profiling hot event types.
    #[must_use]
    pub fn stats(&self) -> DispatchStats {
        DispatchStats::from_counts(&self.inner.read().publish_counts)
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    if let Some(msg) = panic.downcast_ref::<&'static str>() {
        msg
    } else if let Some(msg) = panic.downcast_ref::<String>() {
        msg
    } else {
        "<non-string panic payload>"
    }
}
