//! Unified error interface for KEEL.
//!
//! Every error enum in the workspace implements [`ErrorCode`] so that
//! hosts, the diagnostics ledger, and tests can treat errors uniformly:
//! a stable machine-readable code plus a recoverability flag.
//!
//! # Code Format
//!
//! - UPPER_SNAKE_CASE, prefixed with the owning layer:
//!   `REGISTRY_ALREADY_REGISTERED`, `RUNTIME_SERVICE_INIT_TIMEOUT`, ...
//! - Stable once published: changing a code is a breaking change.
//!
//! # Recoverability
//!
//! Recoverable means a retry or corrective host action may succeed
//! (timeouts, transient init failures). Structural mistakes (duplicate
//! registration, resolving a missing service) are not recoverable: they
//! indicate a startup-ordering or configuration bug that retrying cannot
//! fix.
//!
//! # Example
//!
//! ```
//! use keel_types::ErrorCode;
//!
//! #[derive(Debug)]
//! enum SaveError {
//!     SlotLocked,
//!     CorruptHeader,
//! }
//!
//! impl ErrorCode for SaveError {
//!     fn code(&self) -> &'static str {
//!         match self {
//!             Self::SlotLocked => "SAVE_SLOT_LOCKED",
//!             Self::CorruptHeader => "SAVE_CORRUPT_HEADER",
//!         }
//!     }
//!
//!     fn is_recoverable(&self) -> bool {
//!         matches!(self, Self::SlotLocked)
//!     }
//! }
//!
//! assert_eq!(SaveError::SlotLocked.code(), "SAVE_SLOT_LOCKED");
//! assert!(!SaveError::CorruptHeader.is_recoverable());
//! ```

/// Unified error code interface.
///
/// Implemented by every error type in the workspace.
pub trait ErrorCode {
    /// Returns the machine-readable error code.
    ///
    /// UPPER_SNAKE_CASE, prefixed with the owning layer
    /// (e.g. `"REGISTRY_"`, `"RUNTIME_"`), stable across versions.
    fn code(&self) -> &'static str;

    /// Returns whether retrying or corrective host action may succeed.
    fn is_recoverable(&self) -> bool;
}

/// Asserts that an error code follows KEEL conventions.
///
/// Checks that the code is non-empty, carries the expected prefix, and is
/// UPPER_SNAKE_CASE. Used by the error tests of every crate.
///
/// # Panics
///
/// Panics with a descriptive message on any violation.
///
/// # Example
///
/// ```
/// use keel_types::{assert_error_code, ErrorCode};
///
/// #[derive(Debug)]
/// struct Timeout;
///
/// impl ErrorCode for Timeout {
///     fn code(&self) -> &'static str { "RUNTIME_TIMEOUT" }
///     fn is_recoverable(&self) -> bool { true }
/// }
///
/// assert_error_code(&Timeout, "RUNTIME_");
/// ```
pub fn assert_error_code<E: ErrorCode>(err: &E, expected_prefix: &str) {
    let code = err.code();

    assert!(!code.is_empty(), "error code must not be empty");
    assert!(
        code.starts_with(expected_prefix),
        "error code '{}' must start with prefix '{}'",
        code,
        expected_prefix
    );
    assert!(
        is_upper_snake_case(code),
        "error code '{}' must be UPPER_SNAKE_CASE",
        code
    );
}

/// Asserts a whole slice of errors at once.
///
/// Use with an `all_variants()` helper to keep error-code tests exhaustive
/// when variants are added.
pub fn assert_error_codes<E: ErrorCode>(errors: &[E], expected_prefix: &str) {
    for err in errors {
        assert_error_code(err, expected_prefix);
    }
}

fn is_upper_snake_case(s: &str) -> bool {
    !s.is_empty()
        && !s.starts_with('_')
        && !s.ends_with('_')
        && !s.contains("__")
        && s.chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    enum ProbeError {
        Transient,
        Structural,
    }

    impl ErrorCode for ProbeError {
        fn code(&self) -> &'static str {
            match self {
                Self::Transient => "PROBE_TRANSIENT",
                Self::Structural => "PROBE_STRUCTURAL",
            }
        }

        fn is_recoverable(&self) -> bool {
            matches!(self, Self::Transient)
        }
    }

    #[test]
    fn codes_and_recoverability() {
        assert_eq!(ProbeError::Transient.code(), "PROBE_TRANSIENT");
        assert!(ProbeError::Transient.is_recoverable());
        assert!(!ProbeError::Structural.is_recoverable());
    }

    #[test]
    fn assert_helpers_accept_valid_codes() {
        assert_error_code(&ProbeError::Transient, "PROBE_");
        assert_error_codes(&[ProbeError::Transient, ProbeError::Structural], "PROBE_");
    }

    #[test]
    #[should_panic(expected = "must start with prefix")]
    fn wrong_prefix_panics() {
        assert_error_code(&ProbeError::Transient, "OTHER_");
    }

    #[test]
    fn snake_case_check() {
        assert!(is_upper_snake_case("REGISTRY_EMPTY_UID"));
        assert!(is_upper_snake_case("A_1"));
        assert!(!is_upper_snake_case(""));
        assert!(!is_upper_snake_case("_LEADING"));
        assert!(!is_upper_snake_case("TRAILING_"));
        assert!(!is_upper_snake_case("DOUBLE__SCORE"));
        assert!(!is_upper_snake_case("lower_case"));
    }
}
