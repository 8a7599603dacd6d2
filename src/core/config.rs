/*!
 * Lock Configuration
 *
 * Runtime configuration for the lock manager
 */

use std::time::Duration;

/// Environment variable holding the default acquisition timeout in milliseconds
pub const ENV_LOCK_TIMEOUT_MS: &str = "KEYED_GUARD_LOCK_TIMEOUT_MS";

/// Lock manager configuration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LockConfig {
    /// Timeout applied when a caller passes `TimeoutPolicy::Default`
    pub default_timeout: Option<Duration>,
}

impl LockConfig {
    /// Create config with defaults (no timeout)
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from the environment
    ///
    /// Environment variables:
    /// - KEYED_GUARD_LOCK_TIMEOUT_MS: default timeout, `0` or unset disables it
    ///
    /// Unparseable values are ignored with a warning.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(raw) = std::env::var(ENV_LOCK_TIMEOUT_MS) {
            match raw.trim().parse::<u64>() {
                Ok(0) => config.default_timeout = None,
                Ok(ms) => config.default_timeout = Some(Duration::from_millis(ms)),
                Err(e) => tracing::warn!(
                    var = ENV_LOCK_TIMEOUT_MS,
                    value = %raw,
                    error = %e,
                    "Ignoring invalid lock timeout"
                ),
            }
        }

        config
    }

    /// Set the default acquisition timeout
    pub fn with_default_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = Some(timeout);
        self
    }
}
