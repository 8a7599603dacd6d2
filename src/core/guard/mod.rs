/*!
 * RAII Resource Guards
 *
 * Scoped guards with automatic cleanup. Every resource handed out by this
 * crate (key locks, redirected descriptors) is released when its guard is
 * dropped, whether the scope ends normally, through `?`, or by unwinding.
 *
 * ## Guard Types
 *
 * - **KeyGuard**: Blocking, reentrant key lock
 * - **AsyncKeyGuard**: Async key lock, holdable across `.await`
 * - **SuppressGuard**: Active stdout/stderr redirection
 */

mod timeout;
mod traits;

pub use timeout::TimeoutPolicy;
pub use traits::{Guard, GuardDrop};

/// Result type for guard operations
pub type GuardResult<T> = Result<T, GuardError>;

/// Errors that can occur during guard operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GuardError {
    #[error("Resource already released")]
    AlreadyReleased,
}

/// Guard metadata for observability
#[derive(Debug, Clone)]
pub struct GuardMetadata {
    pub resource_type: &'static str,
    pub creation_time: std::time::Instant,
}

impl GuardMetadata {
    #[inline]
    pub fn new(resource_type: &'static str) -> Self {
        Self {
            resource_type,
            creation_time: std::time::Instant::now(),
        }
    }

    #[inline]
    pub fn lifetime_micros(&self) -> u64 {
        self.creation_time.elapsed().as_micros() as u64
    }
}
