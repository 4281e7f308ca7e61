//! Runtime configuration.
//!
//! All fields have compile-time fallback values via [`Default`], and the
//! whole structure round-trips through TOML for file storage. Fields are
//! individually optional in the file (`#[serde(default)]`).

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default bound on the concurrent service initialization phase.
const DEFAULT_SERVICE_INIT_TIMEOUT_MS: u64 = 30_000;

/// Default retention of the diagnostics ledger.
const DEFAULT_LEDGER_CAPACITY: usize = 256;

/// Configuration for a [`Runtime`](crate::Runtime).
///
/// # Example
///
/// ```
/// use keel_runtime::RuntimeConfig;
///
/// let config = RuntimeConfig::default();
/// assert_eq!(config.service_init_timeout_ms, 30_000);
///
/// let tuned = RuntimeConfig {
///     service_init_timeout_ms: 500,
///     ..RuntimeConfig::default()
/// };
/// assert_eq!(tuned.service_init_timeout().as_millis(), 500);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Upper bound, in milliseconds, on the concurrent service
    /// initialization phase. On expiry the startup transitions to the
    /// error state; in-flight initializers are not forcibly killed.
    pub service_init_timeout_ms: u64,

    /// Maximum number of records retained by the diagnostics ledger;
    /// the oldest records are evicted first.
    pub ledger_capacity: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            service_init_timeout_ms: DEFAULT_SERVICE_INIT_TIMEOUT_MS,
            ledger_capacity: DEFAULT_LEDGER_CAPACITY,
        }
    }
}

impl RuntimeConfig {
    /// Creates a config with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The service initialization timeout as a [`Duration`].
    #[must_use]
    pub fn service_init_timeout(&self) -> Duration {
        Duration::from_millis(self.service_init_timeout_ms)
    }

    /// Serializes to a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Deserializes from a TOML string; absent fields fall back to
    /// their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the document fails to parse.
    pub fn from_toml(toml_str: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(toml_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = RuntimeConfig::default();
        assert_eq!(config.service_init_timeout_ms, 30_000);
        assert_eq!(config.ledger_capacity, 256);
        assert_eq!(config.service_init_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn toml_round_trip() {
        let config = RuntimeConfig {
            service_init_timeout_ms: 1_500,
            ledger_capacity: 32,
        };

        let toml_str = config.to_toml().expect("config serializes");
        let parsed = RuntimeConfig::from_toml(&toml_str).expect("config parses");
        assert_eq!(parsed, config);
    }

    #[test]
    fn partial_toml_uses_defaults() {
        let parsed =
            RuntimeConfig::from_toml("service_init_timeout_ms = 250\n").expect("partial parses");
        assert_eq!(parsed.service_init_timeout_ms, 250);
        assert_eq!(parsed.ledger_capacity, 256);
    }

    #[test]
    fn empty_toml_is_all_defaults() {
        let parsed = RuntimeConfig::from_toml("").expect("empty parses");
        assert_eq!(parsed, RuntimeConfig::default());
    }
}
