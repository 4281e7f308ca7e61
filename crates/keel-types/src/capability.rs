//! Capability identifiers for type-indexed registries.
//!
//! A **capability type** is the abstract identifier under which components
//! are registered and discovered: exactly one service, or zero-to-many
//! modules, live under each capability. [`CapabilityId`] is the concrete
//! registry key derived from a Rust type.
//!
//! # Key Strategy
//!
//! The id wraps [`std::any::TypeId`] for equality and hashing, plus the
//! [`std::any::type_name`] for diagnostics. Trait-object types work as
//! capability types, so the usual pattern is to key a registry entry by
//! the *interface* rather than the implementation:
//!
//! ```
//! use keel_types::CapabilityId;
//!
//! trait Audio: Send + Sync {}
//!
//! let id = CapabilityId::of::<dyn Audio>();
//! assert_eq!(id, CapabilityId::of::<dyn Audio>());
//! assert_eq!(id.short_name(), "Audio");
//! ```

use serde::{Deserialize, Serialize};
use std::any::{type_name, TypeId};
use std::hash::{Hash, Hasher};

/// Identifier for a capability type.
///
/// Used as the primary lookup key in the service and module registries.
/// Two ids are equal iff they were derived from the same Rust type.
///
/// # Equality Semantics
///
/// `PartialEq`/`Hash` compare the underlying [`TypeId`] only; the captured
/// type name is carried purely for logging and diagnostics.
///
/// # Example
///
/// ```
/// use keel_types::CapabilityId;
///
/// trait Save: Send + Sync {}
/// trait Audio: Send + Sync {}
///
/// let save = CapabilityId::of::<dyn Save>();
/// let audio = CapabilityId::of::<dyn Audio>();
///
/// assert_ne!(save, audio);
/// assert_eq!(save, CapabilityId::of::<dyn Save>());
/// ```
#[derive(Debug, Clone, Copy, Eq)]
pub struct CapabilityId {
    type_id: TypeId,
    name: &'static str,
}

impl CapabilityId {
    /// Derives the capability id for a type.
    ///
    /// `C` is usually a trait-object type (`dyn Audio`) but any
    /// `'static` type works, including concrete structs for components
    /// that are their own capability.
    #[must_use]
    pub fn of<C: ?Sized + 'static>() -> Self {
        Self {
            type_id: TypeId::of::<C>(),
            name: type_name::<C>(),
        }
    }

    /// Returns the full type name, e.g. `"dyn myapp::audio::Audio"`.
    ///
    /// Intended for logs and diagnostics only; the name is not guaranteed
    /// stable across compiler versions.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Returns the last path segment of the type name, e.g. `"Audio"`.
    ///
    /// # Example
    ///
    /// ```
    /// use keel_types::CapabilityId;
    ///
    /// trait Analytics: Send + Sync {}
    ///
    /// let id = CapabilityId::of::<dyn Analytics>();
    /// assert_eq!(id.short_name(), "Analytics");
    /// ```
    #[must_use]
    pub fn short_name(&self) -> &'static str {
        self.name.rsplit("::").next().unwrap_or(self.name)
    }
}

impl PartialEq for CapabilityId {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl Hash for CapabilityId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.type_id.hash(state);
    }
}

impl std::fmt::Display for CapabilityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.short_name())
    }
}

/// Identity model of a registered component.
///
/// | Kind | Cardinality | Initialization |
/// |------|-------------|----------------|
/// | `Service` | singleton per capability | asynchronous, concurrent |
/// | `Module` | many per capability, keyed by UID | synchronous, sequential |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentKind {
    /// Singleton component with asynchronous initialization.
    Service,
    /// Optional multi-instance component with synchronous initialization.
    Module,
}

impl std::fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Service => write!(f, "service"),
            Self::Module => write!(f, "module"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    trait Alpha: Send + Sync {}
    trait Beta: Send + Sync {}

    #[test]
    fn same_type_same_id() {
        assert_eq!(CapabilityId::of::<dyn Alpha>(), CapabilityId::of::<dyn Alpha>());
    }

    #[test]
    fn distinct_types_distinct_ids() {
        assert_ne!(CapabilityId::of::<dyn Alpha>(), CapabilityId::of::<dyn Beta>());
    }

    #[test]
    fn usable_as_map_key() {
        let mut map = HashMap::new();
        map.insert(CapabilityId::of::<dyn Alpha>(), 1);
        map.insert(CapabilityId::of::<dyn Beta>(), 2);

        assert_eq!(map.get(&CapabilityId::of::<dyn Alpha>()), Some(&1));
        assert_eq!(map.get(&CapabilityId::of::<dyn Beta>()), Some(&2));
    }

    #[test]
    fn short_name_strips_path() {
        assert_eq!(CapabilityId::of::<dyn Alpha>().short_name(), "Alpha");
        // Concrete types work too.
        assert_eq!(CapabilityId::of::<String>().short_name(), "String");
    }

    #[test]
    fn display_uses_short_name() {
        let id = CapabilityId::of::<dyn Beta>();
        assert_eq!(format!("{}", id), "Beta");
    }

    #[test]
    fn component_kind_display() {
        assert_eq!(format!("{}", ComponentKind::Service), "service");
        assert_eq!(format!("{}", ComponentKind::Module), "module");
    }
}
