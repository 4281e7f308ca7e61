//! Core types for the KEEL orchestration runtime.
//!
//! This crate provides the identifier and error vocabulary shared by all
//! KEEL crates.
//!
//! # Crate Architecture
//!
//! This crate is the bottom of the **SDK layer**:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        SDK Layer                            │
//! │  (External, SemVer stable, safe to depend on)               │
//! ├─────────────────────────────────────────────────────────────┤
//! │  keel-types    : CapabilityId, ErrorCode  ◄── HERE          │
//! │  keel-event    : EventBus, SubscriptionId, DispatchStats    │
//! │  keel-registry : Service/Module traits, registries          │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Capability Keys
//!
//! Everything in KEEL is discovered by **capability type**: an abstract
//! identifier under which exactly one service, or zero-to-many modules, are
//! registered. [`CapabilityId`] derives that identifier from a Rust type
//! (usually a trait-object type like `dyn Audio`) so lookups are
//! type-indexed without any reflection or registration ceremony.
//!
//! # Unified Errors
//!
//! All KEEL error enums implement [`ErrorCode`], giving every error a
//! stable machine-readable code and a recoverability flag. The
//! [`assert_error_code`]/[`assert_error_codes`] helpers back the error
//! tests in every crate.

mod capability;
mod error;

pub use capability::{CapabilityId, ComponentKind};
pub use error::{assert_error_code, assert_error_codes, ErrorCode};
