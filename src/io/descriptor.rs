/*!
 * Descriptor Redirection
 *
 * RAII guard for a standard stream redirected onto another descriptor
 */

use crate::core::errors::{SuppressError, SuppressResult};
use nix::unistd::{close, dup, dup2};
use std::io::{stderr, stdout, Write};
use std::os::unix::io::{AsRawFd, RawFd};
use tracing::{trace, warn};

/// Standard output streams the suppressor can redirect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StdStream {
    Stdout,
    Stderr,
}

impl StdStream {
    /// OS descriptor of this stream
    pub fn raw_fd(self) -> RawFd {
        match self {
            StdStream::Stdout => stdout().as_raw_fd(),
            StdStream::Stderr => stderr().as_raw_fd(),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            StdStream::Stdout => "stdout",
            StdStream::Stderr => "stderr",
        }
    }
}

impl std::fmt::Display for StdStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Flush Rust-side buffers of both standard streams
///
/// Errors are ignored: a closed stream has nothing left to flush.
pub(crate) fn flush_std_streams() {
    let _ = stdout().flush();
    let _ = stderr().flush();
}

/// A standard stream pointed at another descriptor
///
/// Keeps a duplicate of the stream's original descriptor. Restoring puts the
/// duplicate back over the stream and closes it. Drop restores if that has
/// not happened yet, logging instead of panicking.
#[derive(Debug)]
pub struct RedirectedFd {
    stream: StdStream,
    target: RawFd,
    saved: RawFd,
    active: bool,
}

impl RedirectedFd {
    /// Point `stream` at `sink`, remembering where it pointed before
    ///
    /// On failure the stream keeps its original target and no descriptor
    /// is leaked.
    pub fn redirect(stream: StdStream, sink: RawFd) -> SuppressResult<Self> {
        let target = stream.raw_fd();
        let redirect_error = |reason: nix::Error| SuppressError::Redirect {
            stream: stream.to_string(),
            fd: target,
            reason: reason.to_string(),
        };

        let saved = dup(target).map_err(redirect_error)?;
        if let Err(e) = dup2(sink, target) {
            if let Err(close_err) = close(saved) {
                warn!(fd = saved, error = %close_err, "Failed to close duplicate after redirect failure");
            }
            return Err(redirect_error(e));
        }

        trace!(stream = stream.as_str(), fd = target, saved, "Redirected stream");
        Ok(Self {
            stream,
            target,
            saved,
            active: true,
        })
    }

    #[inline]
    pub fn stream(&self) -> StdStream {
        self.stream
    }

    /// Descriptor being redirected (1 or 2)
    #[inline]
    pub fn target(&self) -> RawFd {
        self.target
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Put the original descriptor back and close the duplicate
    ///
    /// Both steps are attempted even if the first fails; the first error is
    /// returned. Calling again after a restore is a no-op.
    pub fn restore(&mut self) -> SuppressResult<()> {
        if !self.active {
            return Ok(());
        }
        self.active = false;

        let restore_error = |reason: String| SuppressError::Restore {
            stream: self.stream.to_string(),
            fd: self.target,
            reason,
        };

        let restored = dup2(self.saved, self.target)
            .map(|_| ())
            .map_err(|e| restore_error(e.to_string()));
        let closed = close(self.saved)
            .map_err(|e| restore_error(format!("closing duplicate fd {}: {}", self.saved, e)));

        trace!(stream = self.stream.as_str(), fd = self.target, "Restored stream");
        restored.and(closed)
    }
}

impl Drop for RedirectedFd {
    fn drop(&mut self) {
        if let Err(e) = self.restore() {
            warn!(error = %e, "Descriptor restore failed on drop");
        }
    }
}
