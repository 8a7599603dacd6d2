/*!
 * Lock Manager
 * Key-scoped mutual exclusion for threads and async tasks
 */

use super::decorate::{Decorated, DecoratedAsync};
use super::entry::LockEntry;
use super::guard::{AsyncKeyGuard, KeyGuard};
use crate::core::config::LockConfig;
use crate::core::errors::{LockError, LockResult};
use crate::core::guard::TimeoutPolicy;
use ahash::RandomState;
use dashmap::DashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, trace};

/// Key-scoped lock manager
///
/// Maps string keys to per-key lock entries. Distinct keys never contend;
/// the same key is serialized among blocking callers (reentrantly) and among
/// async callers. Cloning is cheap and every clone shares the same entries.
///
/// The manager is an ordinary value: the host application decides its
/// lifetime, and tests get a clean slate by constructing a new one.
#[derive(Clone)]
pub struct LockManager {
    locks: Arc<DashMap<String, Arc<LockEntry>, RandomState>>,
    config: Arc<LockConfig>,
}

impl LockManager {
    /// Create a new lock manager with default configuration
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(LockConfig::default())
    }

    /// Create a new lock manager with the given configuration
    #[must_use]
    pub fn with_config(config: LockConfig) -> Self {
        debug!(
            default_timeout_ms = config.default_timeout.map(|d| d.as_millis() as u64),
            "Lock manager initialized"
        );
        Self {
            locks: Arc::new(DashMap::with_hasher(RandomState::new())),
            config: Arc::new(config),
        }
    }

    /// Configuration this manager was built with
    #[inline]
    pub fn config(&self) -> &LockConfig {
        &self.config
    }

    /// Get the entry for `key`, creating it on first reference
    pub fn get_lock(&self, key: &str) -> Arc<LockEntry> {
        if let Some(entry) = self.locks.get(key) {
            return entry.clone();
        }

        self.locks
            .entry(key.to_string())
            .or_insert_with(|| {
                trace!(key, "Created lock entry");
                Arc::new(LockEntry::new(key))
            })
            .clone()
    }

    /// Block until the lock for `key` is held, with no timeout
    pub fn lock(&self, key: &str) -> KeyGuard {
        let entry = self.get_lock(key);
        let inner = entry.lock_blocking();
        trace!(key, "Acquired key lock");
        KeyGuard::new(inner, entry)
    }

    /// Block until the lock for `key` is held or the timeout elapses
    ///
    /// Reentrant: a thread already holding `key` acquires it again
    /// immediately.
    pub fn acquire(&self, key: &str, timeout: TimeoutPolicy) -> LockResult<KeyGuard> {
        let limit = match timeout.resolve(self.config.default_timeout) {
            Some(limit) => limit,
            None => return Ok(self.lock(key)),
        };

        let entry = self.get_lock(key);
        match entry.try_lock_blocking_for(limit) {
            Some(inner) => {
                trace!(key, "Acquired key lock");
                Ok(KeyGuard::new(inner, entry))
            }
            None => Err(self.timeout_error(key, limit)),
        }
    }

    /// Take the lock for `key` only if it is free right now
    pub fn try_acquire(&self, key: &str) -> Option<KeyGuard> {
        let entry = self.get_lock(key);
        let inner = entry.try_lock_blocking()?;
        Some(KeyGuard::new(inner, entry))
    }

    /// Wait for the async lock for `key`, suspending only the calling task
    ///
    /// A timed-out wait never holds the lock.
    pub async fn acquire_async(
        &self,
        key: &str,
        timeout: TimeoutPolicy,
    ) -> LockResult<AsyncKeyGuard> {
        let entry = self.get_lock(key);
        let mutex = entry.async_mutex();

        let inner = match timeout.resolve(self.config.default_timeout) {
            None => mutex.lock_owned().await,
            Some(limit) => tokio::time::timeout(limit, mutex.lock_owned())
                .await
                .map_err(|_| self.timeout_error(key, limit))?,
        };

        trace!(key, "Acquired async key lock");
        Ok(AsyncKeyGuard::new(inner, entry))
    }

    /// Run `operation` while holding the lock for `key`
    ///
    /// The lock is released even if `operation` panics. Whatever the
    /// operation returns, including its own `Result`, is passed through.
    pub fn run_with_lock<R, F>(&self, key: &str, timeout: TimeoutPolicy, operation: F) -> LockResult<R>
    where
        F: FnOnce() -> R,
    {
        let _guard = self.acquire(key, timeout)?;
        Ok(operation())
    }

    /// Await `operation` while holding the async lock for `key`
    pub async fn run_with_lock_async<F, Fut>(
        &self,
        key: &str,
        timeout: TimeoutPolicy,
        operation: F,
    ) -> LockResult<Fut::Output>
    where
        F: FnOnce() -> Fut,
        Fut: Future,
    {
        let _guard = self.acquire_async(key, timeout).await?;
        Ok(operation().await)
    }

    /// Wrap a blocking callable so every call runs under the lock for `key`
    pub fn decorate<F>(&self, key: impl Into<String>, timeout: TimeoutPolicy, f: F) -> Decorated<F> {
        Decorated::new(self.clone(), key.into(), timeout, f)
    }

    /// Wrap an async callable so every call runs under the async lock for `key`
    pub fn decorate_async<F>(
        &self,
        key: impl Into<String>,
        timeout: TimeoutPolicy,
        f: F,
    ) -> DecoratedAsync<F> {
        DecoratedAsync::new(self.clone(), key.into(), timeout, f)
    }

    /// Snapshot of all known keys
    pub fn list_keys(&self) -> Vec<String> {
        self.locks.iter().map(|entry| entry.key().clone()).collect()
    }

    /// Whether an entry exists for `key`
    #[inline]
    pub fn contains_key(&self, key: &str) -> bool {
        self.locks.contains_key(key)
    }

    /// Number of known keys
    #[inline]
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }

    /// Remove entries no guard or waiter references
    ///
    /// An entry is kept while anything other than the map holds it: a live
    /// guard, a pending acquisition, or a caller of [`get_lock`](Self::get_lock).
    /// Returns the number of removed entries.
    pub fn cleanup_unused(&self) -> usize {
        let mut removed = 0;
        self.locks.retain(|key, entry| {
            let in_use =
                Arc::strong_count(entry) > 1 || entry.is_locked() || entry.is_async_locked();
            if !in_use {
                trace!(key = key.as_str(), "Removing unused lock entry");
                removed += 1;
            }
            in_use
        });

        if removed > 0 {
            debug!(removed, remaining = self.locks.len(), "Cleaned up unused lock entries");
        }
        removed
    }

    fn timeout_error(&self, key: &str, timeout: Duration) -> LockError {
        debug!(key, timeout_ms = timeout.as_millis() as u64, "Lock acquisition timed out");
        LockError::Timeout {
            key: key.to_string(),
            timeout,
        }
    }
}

impl Default for LockManager {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for LockManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LockManager")
            .field("keys", &self.locks.len())
            .field("config", &self.config)
            .finish()
    }
}
