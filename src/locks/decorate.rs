/*!
 * Lock Decorators
 *
 * Adapters that run a wrapped callable under a key lock on every call.
 *
 * The lock controls (`key`, `timeout`) live in the adapter; the callable's
 * arguments travel as one opaque bundle passed to `call`. The two never share
 * a namespace, so a callable taking its own `key` or `timeout` argument gets
 * it unmodified.
 *
 * ## Example
 *
 * ```ignore
 * let store = manager.decorate("kv", TimeoutPolicy::None, |(key, value): (String, u64)| {
 *     write_entry(&key, value)
 * });
 * store.call(("user:1".to_string(), 42))?;
 *
 * let fetch = manager.decorate_async("http", TimeoutPolicy::after_secs(5), |url: String| async move {
 *     download(url).await
 * });
 * let body = fetch.call("https://example.com".to_string()).await?;
 * ```
 */

use super::manager::LockManager;
use crate::core::errors::LockResult;
use crate::core::guard::TimeoutPolicy;
use std::future::Future;

/// Blocking callable wrapped in a key lock
pub struct Decorated<F> {
    manager: LockManager,
    key: String,
    timeout: TimeoutPolicy,
    inner: F,
}

impl<F> Decorated<F> {
    pub(crate) fn new(manager: LockManager, key: String, timeout: TimeoutPolicy, inner: F) -> Self {
        Self {
            manager,
            key,
            timeout,
            inner,
        }
    }

    /// Call the wrapped function with `args` while holding the key lock
    pub fn call<A, R>(&self, args: A) -> LockResult<R>
    where
        F: Fn(A) -> R,
    {
        self.manager
            .run_with_lock(&self.key, self.timeout, || (self.inner)(args))
    }

    /// Lock key this adapter serializes on
    #[inline]
    pub fn key(&self) -> &str {
        &self.key
    }

    #[inline]
    pub fn timeout(&self) -> TimeoutPolicy {
        self.timeout
    }

    /// Unwrap the original callable
    pub fn into_inner(self) -> F {
        self.inner
    }
}

/// Async callable wrapped in a key lock
pub struct DecoratedAsync<F> {
    manager: LockManager,
    key: String,
    timeout: TimeoutPolicy,
    inner: F,
}

impl<F> DecoratedAsync<F> {
    pub(crate) fn new(manager: LockManager, key: String, timeout: TimeoutPolicy, inner: F) -> Self {
        Self {
            manager,
            key,
            timeout,
            inner,
        }
    }

    /// Call the wrapped function with `args` and await it under the async key lock
    ///
    /// The future is only created once the lock is held.
    pub async fn call<A, Fut>(&self, args: A) -> LockResult<Fut::Output>
    where
        F: Fn(A) -> Fut,
        Fut: Future,
    {
        self.manager
            .run_with_lock_async(&self.key, self.timeout, || (self.inner)(args))
            .await
    }

    /// Lock key this adapter serializes on
    #[inline]
    pub fn key(&self) -> &str {
        &self.key
    }

    #[inline]
    pub fn timeout(&self) -> TimeoutPolicy {
        self.timeout
    }

    /// Unwrap the original callable
    pub fn into_inner(self) -> F {
        self.inner
    }
}
