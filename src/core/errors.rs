/*!
 * Error Types
 * Centralized error handling with thiserror, miette, and serde support
 */

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Lock acquisition errors with serialization support
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum LockError {
    #[error("failed to acquire lock for key '{key}' within {timeout:?}")]
    #[diagnostic(
        code(locks::timeout),
        help("Another holder kept the key longer than the timeout. Increase the timeout or shorten the critical section.")
    )]
    Timeout { key: String, timeout: Duration },
}

impl LockError {
    /// Key the failed acquisition was for
    pub fn key(&self) -> &str {
        match self {
            LockError::Timeout { key, .. } => key,
        }
    }

    /// Whether this error is an acquisition timeout
    #[inline]
    pub fn is_timeout(&self) -> bool {
        matches!(self, LockError::Timeout { .. })
    }
}

/// Descriptor redirection errors
///
/// These never reach the caller of a suppression scope. They are logged so
/// they cannot mask an error raised inside the protected region.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum SuppressError {
    #[error("failed to open discard sink: {0}")]
    #[diagnostic(
        code(suppress::sink_unavailable),
        help("The null device could not be opened for writing. Streams are left untouched.")
    )]
    Sink(String),

    #[error("failed to redirect {stream} (fd {fd}): {reason}")]
    #[diagnostic(
        code(suppress::redirect_failed),
        help("The stream could not be duplicated or redirected and keeps its original target.")
    )]
    Redirect {
        stream: String,
        fd: i32,
        reason: String,
    },

    #[error("failed to restore {stream} (fd {fd}): {reason}")]
    #[diagnostic(
        code(suppress::restore_failed),
        help("The original descriptor could not be put back. Output on this stream may be lost.")
    )]
    Restore {
        stream: String,
        fd: i32,
        reason: String,
    },
}

/// Result type for lock operations
pub type LockResult<T> = Result<T, LockError>;

/// Result type for descriptor operations inside the suppressor
pub type SuppressResult<T> = Result<T, SuppressError>;
