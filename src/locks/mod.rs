/*!
 * Key-Scoped Locks
 *
 * Mutual exclusion keyed by arbitrary strings, so unrelated resources never
 * contend.
 *
 * # Architecture
 *
 * Each key maps to a [`LockEntry`] holding two primitives:
 * - a reentrant mutex for blocking callers, re-acquirable by its holder
 * - an async mutex for tasks, created on first async use
 *
 * The key map is a sharded `DashMap`; its shard locks are held only for the
 * lookup or insert, never while waiting on a key.
 *
 * # Entry Points
 *
 * - Scoped guards: [`LockManager::acquire`], [`LockManager::acquire_async`]
 * - Closures: [`LockManager::run_with_lock`], [`LockManager::run_with_lock_async`]
 * - Wrappers: [`LockManager::decorate`], [`LockManager::decorate_async`]
 */

mod decorate;
mod entry;
mod guard;
mod manager;

pub use decorate::{Decorated, DecoratedAsync};
pub use entry::LockEntry;
pub use guard::{AsyncKeyGuard, KeyGuard};
pub use manager::LockManager;
