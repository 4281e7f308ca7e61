//! Registry layer errors.
//!
//! All registry errors are **configuration errors**: they indicate a
//! structural mistake at the registration or resolution call site and are
//! surfaced synchronously, never deferred. None of them are recoverable:
//! retrying the same call cannot fix a duplicate registration or a
//! missing service.
//!
//! # Error Codes
//!
//! | Variant | Code |
//! |---------|------|
//! | [`RegistryError::AlreadyRegistered`] | `REGISTRY_ALREADY_REGISTERED` |
//! | [`RegistryError::ServiceNotRegistered`] | `REGISTRY_SERVICE_NOT_REGISTERED` |
//! | [`RegistryError::EmptyUid`] | `REGISTRY_EMPTY_UID` |
//! | [`RegistryError::DuplicateUid`] | `REGISTRY_DUPLICATE_UID` |
//! | [`RegistryError::CapabilityMismatch`] | `REGISTRY_CAPABILITY_MISMATCH` |

use keel_types::{CapabilityId, ErrorCode};
use thiserror::Error;

/// Registry layer error.
///
/// # Example
///
/// ```
/// use keel_registry::RegistryError;
/// use keel_types::{CapabilityId, ErrorCode};
///
/// trait Audio: Send + Sync {}
///
/// let err = RegistryError::ServiceNotRegistered(CapabilityId::of::<dyn Audio>());
/// assert_eq!(err.code(), "REGISTRY_SERVICE_NOT_REGISTERED");
/// assert!(!err.is_recoverable());
/// ```
#[derive(Debug, Clone, Error)]
pub enum RegistryError {
    /// A service is already registered under this capability.
    ///
    /// At most one live entry per capability type; the existing
    /// registration is unaffected by the failed call.
    #[error("service already registered for capability {0}")]
    AlreadyRegistered(CapabilityId),

    /// No service is registered under the requested capability.
    ///
    /// Resolving a missing *service* is a fail-fast programmer-error
    /// surface: correct startup ordering guarantees existence. For
    /// genuinely optional capabilities use `try_resolve`.
    #[error("no service registered for capability {0}")]
    ServiceNotRegistered(CapabilityId),

    /// A module supplied an empty UID.
    ///
    /// Rejected before any registry mutation occurs.
    #[error("module UID must not be empty (capability {0})")]
    EmptyUid(CapabilityId),

    /// A module UID is already taken.
    ///
    /// UIDs are unique system-wide, not just within one capability
    /// bucket; `capability` names the bucket that already holds the UID.
    #[error("module UID '{uid}' already registered under capability {capability}")]
    DuplicateUid {
        /// Capability bucket that already contains the UID.
        capability: CapabilityId,
        /// The conflicting UID.
        uid: String,
    },

    /// One or more stored instances no longer satisfy their declared
    /// capability. Produced by the registry's validation walk; lists
    /// every offending entry, not just the first.
    #[error("capability validation failed for: {}", .mismatches.join(", "))]
    CapabilityMismatch {
        /// Implementation names of every mismatched entry.
        mismatches: Vec<String>,
    },
}

impl ErrorCode for RegistryError {
    fn code(&self) -> &'static str {
        match self {
            Self::AlreadyRegistered(_) => "REGISTRY_ALREADY_REGISTERED",
            Self::ServiceNotRegistered(_) => "REGISTRY_SERVICE_NOT_REGISTERED",
            Self::EmptyUid(_) => "REGISTRY_EMPTY_UID",
            Self::DuplicateUid { .. } => "REGISTRY_DUPLICATE_UID",
            Self::CapabilityMismatch { .. } => "REGISTRY_CAPABILITY_MISMATCH",
        }
    }

    fn is_recoverable(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use keel_types::assert_error_codes;

    trait Probe: Send + Sync {}

    fn all_variants() -> Vec<RegistryError> {
        let capability = CapabilityId::of::<dyn Probe>();
        vec![
            RegistryError::AlreadyRegistered(capability),
            RegistryError::ServiceNotRegistered(capability),
            RegistryError::EmptyUid(capability),
            RegistryError::DuplicateUid {
                capability,
                uid: "x".into(),
            },
            RegistryError::CapabilityMismatch {
                mismatches: vec!["x".into()],
            },
        ]
    }

    #[test]
    fn all_error_codes_valid() {
        assert_error_codes(&all_variants(), "REGISTRY_");
    }

    #[test]
    fn nothing_is_recoverable() {
        for err in all_variants() {
            assert!(!err.is_recoverable(), "{} should not be recoverable", err.code());
        }
    }

    #[test]
    fn mismatch_message_lists_all_entries() {
        let err = RegistryError::CapabilityMismatch {
            mismatches: vec!["NullAudio".into(), "JsonSave".into()],
        };
        let msg = err.to_string();
        assert!(msg.contains("NullAudio"));
        assert!(msg.contains("JsonSave"));
    }

    #[test]
    fn duplicate_uid_names_bucket_and_uid() {
        let err = RegistryError::DuplicateUid {
            capability: CapabilityId::of::<dyn Probe>(),
            uid: "minimap".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("minimap"));
        assert!(msg.contains("Probe"));
    }
}
