/*!
 * keyed-guard
 * Key-scoped locks for threads and async tasks, plus nesting-aware
 * OS-level stdout/stderr suppression
 */

pub mod core;
#[cfg(unix)]
pub mod io;
pub mod locks;
pub mod monitoring;

// Re-exports
pub use crate::core::{
    Guard, GuardError, LockConfig, LockError, LockResult, SuppressError, TimeoutPolicy,
};
#[cfg(unix)]
pub use crate::io::{StreamSuppressor, SuppressFlags, SuppressGuard};
pub use crate::locks::{AsyncKeyGuard, Decorated, DecoratedAsync, KeyGuard, LockEntry, LockManager};
pub use crate::monitoring::init_tracing;
