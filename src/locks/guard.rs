/*!
 * Key Lock Guards
 *
 * RAII guards for key-scoped locks with automatic release
 */

use super::entry::{AsyncGuard, LockEntry, SyncGuard};
use crate::core::guard::{Guard, GuardDrop, GuardError, GuardMetadata, GuardResult};
use std::sync::Arc;
use tracing::trace;

/// Blocking key lock guard
///
/// Holds the reentrant lock for one key. The lock is released when the guard
/// is dropped, including during a panic unwind. The guard is `!Send`: it must
/// be released on the thread that acquired it.
///
/// # Example
///
/// ```ignore
/// let guard = manager.acquire("index", TimeoutPolicy::None)?;
/// rebuild_index();
/// // Released on drop
/// ```
pub struct KeyGuard {
    inner: Option<SyncGuard>,
    entry: Arc<LockEntry>,
    metadata: GuardMetadata,
}

impl KeyGuard {
    pub(crate) fn new(inner: SyncGuard, entry: Arc<LockEntry>) -> Self {
        Self {
            inner: Some(inner),
            entry,
            metadata: GuardMetadata::new("key_lock"),
        }
    }

    /// Key this guard holds
    #[inline]
    pub fn key(&self) -> &str {
        self.entry.name()
    }

    /// Entry backing this guard
    #[inline]
    pub fn entry(&self) -> &Arc<LockEntry> {
        &self.entry
    }
}

impl std::fmt::Debug for KeyGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyGuard")
            .field("key", &self.key())
            .field("active", &self.is_active())
            .finish()
    }
}

impl Guard for KeyGuard {
    fn resource_type(&self) -> &'static str {
        "key_lock"
    }

    fn metadata(&self) -> &GuardMetadata {
        &self.metadata
    }

    fn is_active(&self) -> bool {
        self.inner.is_some()
    }

    fn release(&mut self) -> GuardResult<()> {
        match self.inner.take() {
            Some(inner) => {
                drop(inner);
                trace!(
                    key = self.entry.name(),
                    held_us = self.metadata.lifetime_micros(),
                    "Released key lock"
                );
                Ok(())
            }
            None => Err(GuardError::AlreadyReleased),
        }
    }
}

impl GuardDrop for KeyGuard {
    fn on_drop(&mut self) {
        if self.inner.is_some() {
            let _ = self.release();
        }
    }
}

impl Drop for KeyGuard {
    fn drop(&mut self) {
        self.on_drop();
    }
}

/// Async key lock guard
///
/// Holds the async lock for one key. Unlike [`KeyGuard`] it is `Send` and
/// may be held across `.await` points.
pub struct AsyncKeyGuard {
    inner: Option<AsyncGuard>,
    entry: Arc<LockEntry>,
    metadata: GuardMetadata,
}

impl AsyncKeyGuard {
    pub(crate) fn new(inner: AsyncGuard, entry: Arc<LockEntry>) -> Self {
        Self {
            inner: Some(inner),
            entry,
            metadata: GuardMetadata::new("async_key_lock"),
        }
    }

    /// Key this guard holds
    #[inline]
    pub fn key(&self) -> &str {
        self.entry.name()
    }

    /// Entry backing this guard
    #[inline]
    pub fn entry(&self) -> &Arc<LockEntry> {
        &self.entry
    }
}

impl std::fmt::Debug for AsyncKeyGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AsyncKeyGuard")
            .field("key", &self.key())
            .field("active", &self.is_active())
            .finish()
    }
}

impl Guard for AsyncKeyGuard {
    fn resource_type(&self) -> &'static str {
        "async_key_lock"
    }

    fn metadata(&self) -> &GuardMetadata {
        &self.metadata
    }

    fn is_active(&self) -> bool {
        self.inner.is_some()
    }

    fn release(&mut self) -> GuardResult<()> {
        match self.inner.take() {
            Some(inner) => {
                drop(inner);
                trace!(
                    key = self.entry.name(),
                    held_us = self.metadata.lifetime_micros(),
                    "Released async key lock"
                );
                Ok(())
            }
            None => Err(GuardError::AlreadyReleased),
        }
    }
}

impl GuardDrop for AsyncKeyGuard {
    fn on_drop(&mut self) {
        if self.inner.is_some() {
            let _ = self.release();
        }
    }
}

impl Drop for AsyncKeyGuard {
    fn drop(&mut self) {
        self.on_drop();
    }
}
