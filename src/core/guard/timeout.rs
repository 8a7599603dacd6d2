/*!
 * Acquisition Timeouts
 *
 * Timeout policy for blocking and async key-lock acquisition.
 *
 * ## Example
 *
 * ```ignore
 * // Wait forever
 * let guard = manager.acquire("db", TimeoutPolicy::None)?;
 *
 * // Give up after 50ms
 * let guard = manager.acquire("db", TimeoutPolicy::after_millis(50))?;
 *
 * // Use whatever the manager was configured with
 * let guard = manager.acquire("db", TimeoutPolicy::Default)?;
 * ```
 */

use std::time::Duration;

/// Timeout policy for a single acquisition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeoutPolicy {
    /// Fall back to the manager's configured default
    #[default]
    Default,

    /// No timeout (infinite wait)
    None,

    /// Give up after the given duration
    After(Duration),
}

impl TimeoutPolicy {
    /// Timeout after `ms` milliseconds
    pub const fn after_millis(ms: u64) -> Self {
        Self::After(Duration::from_millis(ms))
    }

    /// Timeout after `secs` seconds
    pub const fn after_secs(secs: u64) -> Self {
        Self::After(Duration::from_secs(secs))
    }

    /// Resolve `Default` against a configured fallback
    pub fn resolve(self, fallback: Option<Duration>) -> Option<Duration> {
        match self {
            Self::Default => fallback,
            Self::None => None,
            Self::After(d) => Some(d),
        }
    }
}

impl From<Duration> for TimeoutPolicy {
    fn from(d: Duration) -> Self {
        Self::After(d)
    }
}

impl From<Option<Duration>> for TimeoutPolicy {
    fn from(d: Option<Duration>) -> Self {
        match d {
            Some(d) => Self::After(d),
            None => Self::None,
        }
    }
}
