/*!
 * Lock Entries
 * Per-key pair of primitives: a reentrant mutex for threads and a lazily
 * created async mutex for tasks
 */

use lock_api::ArcReentrantMutexGuard;
use parking_lot::{RawMutex, RawThreadId, ReentrantMutex};
use std::sync::{Arc, OnceLock};
use std::time::{Duration, Instant};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// Owned guard over an entry's reentrant mutex
pub(crate) type SyncGuard = ArcReentrantMutexGuard<RawMutex, RawThreadId, ()>;

/// Owned guard over an entry's async mutex
pub(crate) type AsyncGuard = OwnedMutexGuard<()>;

/// Lock state for a single key
#[derive(Debug)]
pub struct LockEntry {
    name: String,
    sync_lock: Arc<ReentrantMutex<()>>,
    /// Created on first async acquisition
    async_lock: OnceLock<Arc<AsyncMutex<()>>>,
    created_at: Instant,
}

impl LockEntry {
    pub(crate) fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            sync_lock: Arc::new(ReentrantMutex::new(())),
            async_lock: OnceLock::new(),
            created_at: Instant::now(),
        }
    }

    /// Key this entry protects
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// When this entry was created
    #[inline]
    pub fn created_at(&self) -> Instant {
        self.created_at
    }

    /// Whether any thread currently holds the blocking lock
    #[inline]
    pub fn is_locked(&self) -> bool {
        self.sync_lock.is_locked()
    }

    /// Whether the calling thread holds the blocking lock
    #[inline]
    pub fn is_held_by_current_thread(&self) -> bool {
        self.sync_lock.is_owned_by_current_thread()
    }

    /// Whether the async lock exists and is currently held
    pub fn is_async_locked(&self) -> bool {
        self.async_lock
            .get()
            .map_or(false, |lock| lock.try_lock().is_err())
    }

    /// Whether the async lock has been created yet
    #[inline]
    pub fn has_async_lock(&self) -> bool {
        self.async_lock.get().is_some()
    }

    pub(crate) fn lock_blocking(&self) -> SyncGuard {
        self.sync_lock.lock_arc()
    }

    pub(crate) fn try_lock_blocking(&self) -> Option<SyncGuard> {
        self.sync_lock.try_lock_arc()
    }

    pub(crate) fn try_lock_blocking_for(&self, timeout: Duration) -> Option<SyncGuard> {
        self.sync_lock.try_lock_arc_for(timeout)
    }

    /// Get the async mutex, creating it on first use
    pub(crate) fn async_mutex(&self) -> Arc<AsyncMutex<()>> {
        self.async_lock
            .get_or_init(|| Arc::new(AsyncMutex::new(())))
            .clone()
    }
}
