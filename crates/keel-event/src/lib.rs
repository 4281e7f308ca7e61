//! Event system for the KEEL orchestration runtime.
//!
//! This crate provides the [`EventBus`]: a type-indexed, priority-ordered
//! publish/subscribe dispatcher with per-handler fault isolation. It is the
//! loose-coupling seam of the runtime: collaborators react to events
//! (system readiness, domain notifications) without holding references to
//! the publisher.
//!
//! # Crate Architecture
//!
//! Part of the **SDK layer**; depends on no other KEEL crate:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        SDK Layer                            │
//! ├─────────────────────────────────────────────────────────────┤
//! │  keel-types    : CapabilityId, ErrorCode                    │
//! │  keel-event    : EventBus, DispatchStats  ◄── HERE          │
//! │  keel-registry : Service/Module traits, registries          │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Dispatch Model
//!
//! | Guarantee | Mechanism |
//! |-----------|-----------|
//! | Deterministic order | ascending priority, stable for equal priority |
//! | Reentrancy safety | snapshot copy of the handler list per publish |
//! | Fault isolation | each handler wrapped in `catch_unwind` |
//! | Synchronous completion | `publish` returns after the last handler ran |
//!
//! A handler that subscribes or unsubscribes during its own notification
//! never corrupts iteration, and never changes which handlers see the
//! in-flight publish. A panicking handler is logged and counted; later
//! handlers still run and the publisher never observes the panic.
//!
//! # Example
//!
//! ```
//! use keel_event::EventBus;
//!
//! struct VolumeChanged {
//!     level: u8,
//! }
//!
//! let bus = EventBus::new();
//!
//! let sub = bus.subscribe::<VolumeChanged>(0, |ev| {
//!     assert!(ev.level <= 100);
//! });
//!
//! let outcome = bus.publish(&VolumeChanged { level: 40 });
//! assert_eq!(outcome.delivered, 1);
//! assert_eq!(outcome.failed, 0);
//!
//! bus.unsubscribe(sub);
//! ```

mod bus;
mod stats;

pub use bus::{DispatchOutcome, Event, EventBus, SubscriptionId};
pub use stats::DispatchStats;
