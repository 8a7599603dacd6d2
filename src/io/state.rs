/*!
 * Suppression State
 * Per-thread nesting depth and redirection record, keyed by thread id
 */

use super::descriptor::RedirectedFd;
use ahash::RandomState;
use dashmap::DashMap;
use std::fs::File;
use std::thread::ThreadId;

/// One thread's view of suppression
///
/// Only the thread owning the entry reads or writes it.
#[derive(Debug, Default)]
pub(crate) struct SuppressionState {
    pub(crate) depth: usize,
    /// Redirected streams, in redirection order
    pub(crate) redirected: Vec<RedirectedFd>,
    /// Discard sink the streams point at
    pub(crate) sink: Option<File>,
}

/// Registry of per-thread suppression state
#[derive(Debug)]
pub(crate) struct StateRegistry {
    states: DashMap<ThreadId, SuppressionState, RandomState>,
}

impl StateRegistry {
    pub(crate) fn new() -> Self {
        Self {
            states: DashMap::with_hasher(RandomState::new()),
        }
    }

    /// Increment the thread's depth, returning the new depth
    pub(crate) fn enter(&self, thread: ThreadId) -> usize {
        let mut state = self.states.entry(thread).or_default();
        state.depth += 1;
        state.depth
    }

    /// Record the redirection performed by the outermost scope
    pub(crate) fn install(&self, thread: ThreadId, redirected: Vec<RedirectedFd>, sink: Option<File>) {
        if let Some(mut state) = self.states.get_mut(&thread) {
            state.redirected = redirected;
            state.sink = sink;
        }
    }

    /// Decrement the thread's depth
    ///
    /// Returns the removed state once the depth reaches zero, so the caller
    /// can undo the redirection.
    pub(crate) fn exit(&self, thread: ThreadId) -> Option<SuppressionState> {
        let finished = match self.states.get_mut(&thread) {
            Some(mut state) => {
                state.depth = state.depth.saturating_sub(1);
                state.depth == 0
            }
            None => false,
        };

        if finished {
            self.states.remove(&thread).map(|(_, state)| state)
        } else {
            None
        }
    }

    /// Current depth for the thread (0 when idle)
    pub(crate) fn depth(&self, thread: ThreadId) -> usize {
        self.states.get(&thread).map_or(0, |state| state.depth)
    }

    /// Number of threads with an active suppression
    pub(crate) fn active_threads(&self) -> usize {
        self.states.len()
    }
}
