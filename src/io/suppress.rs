/*!
 * Stream Suppressor
 *
 * Scoped redirection of OS-level stdout/stderr (descriptors 1 and 2) to the
 * null device.
 *
 * ## State Machine (per thread)
 *
 * ```text
 * IDLE(0) -> enter -> REDIRECTED(1) -> enter -> REDIRECTED(2) ... -> exits -> IDLE(0)
 * ```
 *
 * Only the first enter and the last exit touch descriptors. Descriptors are
 * process-global, so the per-thread nesting state and the coordination lock
 * are too: every `StreamSuppressor` goes through one process-wide
 * coordinator. The outermost scope holds the coordination key lock for its
 * whole lifetime; another thread's outermost scope waits until the
 * descriptors have been put back.
 *
 * ## Example
 *
 * ```ignore
 * let suppressor = StreamSuppressor::new();
 * {
 *     let _quiet = suppressor.suppress(SuppressFlags::both());
 *     noisy_native_call();
 * } // descriptors restored here, even on panic
 * ```
 */

use super::descriptor::{flush_std_streams, RedirectedFd, StdStream};
use super::state::StateRegistry;
use crate::core::errors::SuppressError;
use crate::core::guard::{Guard, GuardDrop, GuardError, GuardMetadata, GuardResult};
use crate::locks::{KeyGuard, LockManager};
use std::fs::{File, OpenOptions};
use std::os::unix::io::AsRawFd;
use std::sync::LazyLock;
use std::thread::ThreadId;
use tracing::{debug, trace, warn};

/// Discard sink path
const NULL_DEVICE: &str = "/dev/null";

/// Key descriptor swaps are serialized under
pub const SUPPRESSOR_KEY: &str = "stream_suppressor";

/// Process-wide suppression bookkeeping
struct Coordinator {
    locks: LockManager,
    states: StateRegistry,
}

static COORDINATOR: LazyLock<Coordinator> = LazyLock::new(|| Coordinator {
    locks: LockManager::new(),
    states: StateRegistry::new(),
});

/// Which streams to suppress
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SuppressFlags {
    pub stdout: bool,
    pub stderr: bool,
}

impl SuppressFlags {
    pub const fn new(stdout: bool, stderr: bool) -> Self {
        Self { stdout, stderr }
    }

    pub const fn stdout_only() -> Self {
        Self::new(true, false)
    }

    pub const fn stderr_only() -> Self {
        Self::new(false, true)
    }

    pub const fn both() -> Self {
        Self::new(true, true)
    }

    fn streams(self) -> impl Iterator<Item = StdStream> {
        [
            (self.stdout, StdStream::Stdout),
            (self.stderr, StdStream::Stderr),
        ]
        .into_iter()
        .filter_map(|(enabled, stream)| enabled.then_some(stream))
    }
}

impl Default for SuppressFlags {
    fn default() -> Self {
        Self::stdout_only()
    }
}

/// Nesting-aware stdout/stderr suppressor
///
/// A lightweight handle: all instances share the process-wide nesting state
/// and coordination lock, so scopes opened through different handles nest
/// and serialize exactly like scopes opened through one.
#[derive(Debug, Clone, Copy)]
pub struct StreamSuppressor {
    sink: &'static str,
}

impl StreamSuppressor {
    pub const fn new() -> Self {
        Self { sink: NULL_DEVICE }
    }

    #[cfg(test)]
    pub(crate) const fn with_sink(sink: &'static str) -> Self {
        Self { sink }
    }

    /// Coordination key descriptor swaps are serialized under
    #[inline]
    pub fn key(&self) -> &'static str {
        SUPPRESSOR_KEY
    }

    /// Nesting depth of suppression on the calling thread
    pub fn depth(&self) -> usize {
        COORDINATOR.states.depth(std::thread::current().id())
    }

    /// Number of threads currently inside a suppression scope
    pub fn active_threads(&self) -> usize {
        COORDINATOR.states.active_threads()
    }

    /// Suppress the selected streams until the returned guard is dropped
    ///
    /// Nested calls on the same thread only deepen the nesting; the
    /// outermost call's flags apply. Descriptor failures are logged and the
    /// affected stream is left alone.
    pub fn suppress(&self, flags: SuppressFlags) -> SuppressGuard {
        let coordinator = &*COORDINATOR;
        // Reentrant, so nested scopes on this thread pass straight through
        let serial = coordinator.locks.lock(SUPPRESSOR_KEY);
        let thread = std::thread::current().id();
        let depth = coordinator.states.enter(thread);

        if depth == 1 {
            flush_std_streams();
            let (redirected, sink) = redirect_streams(flags, self.sink);
            debug!(
                stdout = flags.stdout,
                stderr = flags.stderr,
                redirected = redirected.len(),
                "Suppressing standard streams"
            );
            coordinator.states.install(thread, redirected, sink);
        } else {
            trace!(depth, "Nested suppression, already redirected");
        }

        SuppressGuard {
            thread,
            depth,
            active: true,
            metadata: GuardMetadata::new("stream_suppression"),
            _serial: serial,
        }
    }

    /// Run `f` with the selected streams suppressed
    ///
    /// The streams are restored before returning, and also when `f` panics.
    pub fn run<R, F>(&self, flags: SuppressFlags, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        let _guard = self.suppress(flags);
        f()
    }
}

impl Default for StreamSuppressor {
    fn default() -> Self {
        Self::new()
    }
}

/// Open the discard sink and redirect each selected stream onto it
fn redirect_streams(flags: SuppressFlags, path: &str) -> (Vec<RedirectedFd>, Option<File>) {
    if !flags.stdout && !flags.stderr {
        return (Vec::new(), None);
    }

    let sink = match OpenOptions::new().write(true).open(path) {
        Ok(file) => file,
        Err(e) => {
            let err = SuppressError::Sink(format!("{path}: {e}"));
            warn!(error = %err, "Streams left unsuppressed");
            return (Vec::new(), None);
        }
    };

    let redirected = flags
        .streams()
        .filter_map(|stream| match RedirectedFd::redirect(stream, sink.as_raw_fd()) {
            Ok(fd) => Some(fd),
            Err(e) => {
                warn!(error = %e, "Stream left unsuppressed");
                None
            }
        })
        .collect();

    (redirected, Some(sink))
}

/// Active suppression scope
///
/// Dropping the outermost guard on a thread restores the original
/// descriptors (stderr before stdout), closes the duplicates and the sink,
/// then releases the coordination lock. `!Send`: it must be dropped on the
/// thread that created it.
pub struct SuppressGuard {
    thread: ThreadId,
    depth: usize,
    active: bool,
    metadata: GuardMetadata,
    // Dropped after `Drop::drop` has restored the descriptors
    _serial: KeyGuard,
}

impl SuppressGuard {
    /// Nesting depth this guard was created at (1 = outermost)
    #[inline]
    pub fn depth(&self) -> usize {
        self.depth
    }

    #[inline]
    pub fn is_outermost(&self) -> bool {
        self.depth == 1
    }
}

impl std::fmt::Debug for SuppressGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SuppressGuard")
            .field("depth", &self.depth)
            .field("active", &self.active)
            .finish()
    }
}

impl Guard for SuppressGuard {
    fn resource_type(&self) -> &'static str {
        "stream_suppression"
    }

    fn metadata(&self) -> &GuardMetadata {
        &self.metadata
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn release(&mut self) -> GuardResult<()> {
        if !self.active {
            return Err(GuardError::AlreadyReleased);
        }
        self.active = false;

        let Some(mut state) = COORDINATOR.states.exit(self.thread) else {
            return Ok(());
        };

        let mut failures = 0;
        while let Some(mut fd) = state.redirected.pop() {
            if let Err(e) = fd.restore() {
                failures += 1;
                warn!(error = %e, "Failed to restore standard stream");
            }
        }
        drop(state.sink.take());
        flush_std_streams();

        debug!(
            failures,
            held_us = self.metadata.lifetime_micros(),
            "Standard streams restored"
        );
        Ok(())
    }
}

impl GuardDrop for SuppressGuard {
    fn on_drop(&mut self) {
        if self.active {
            let _ = self.release();
        }
    }
}

impl Drop for SuppressGuard {
    fn drop(&mut self) {
        self.on_drop();
    }
}
