//! Deferred task queue.
//!
//! Buffers transport calls issued before the transport handle exists and
//! flushes them, in order, exactly once when it arrives. After the flush
//! every task runs immediately.
//!
//! # Lifecycle
//!
//! ```text
//!   enqueue ──► [buffer] ──on_handle_ready──► run all, FIFO
//!                                                  │
//!   enqueue ──────────────────────────────────────►└─► run now
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, info};

use crate::error::{Error, Result};

use super::TransportHandle;

// ============================================================================
// Types
// ============================================================================

/// A queued transport call. Receives the handle once it exists.
pub type TransportTask = Box<dyn FnOnce(&dyn TransportHandle) + Send + 'static>;

/// Queue state guarded by one lock.
#[derive(Default)]
struct QueueState {
    /// The transport handle, once installed.
    handle: Option<Arc<dyn TransportHandle>>,
    /// Set once the buffer has been fully flushed.
    ready: bool,
    /// Tasks waiting for the handle.
    buffered: VecDeque<TransportTask>,
}

// ============================================================================
// TaskQueue
// ============================================================================

/// FIFO buffer in front of the transport handle.
#[derive(Default)]
pub struct TaskQueue {
    state: Mutex<QueueState>,
}

impl TaskQueue {
    /// Creates an empty queue with no handle.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `task` now if the handle exists, otherwise buffers it.
    pub fn enqueue(&self, task: TransportTask) {
        let handle = {
            let mut state = self.state.lock();
            match state.handle {
                Some(ref handle) if state.ready => Arc::clone(handle),
                _ => {
                    state.buffered.push_back(task);
                    debug!(buffered = state.buffered.len(), "Task buffered until transport ready");
                    return;
                }
            }
        };

        task(handle.as_ref());
    }

    /// Installs the handle and flushes every buffered task in order.
    ///
    /// Runs `prepare` against the handle before the first buffered task.
    /// Tasks enqueued while the flush is running are buffered behind the
    /// ones already waiting; the queue only switches to immediate mode once
    /// the buffer is empty.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if a handle was already installed; the
    /// existing handle is kept.
    pub fn on_handle_ready<F>(&self, handle: Arc<dyn TransportHandle>, prepare: F) -> Result<usize>
    where
        F: FnOnce(&dyn TransportHandle),
    {
        let mut batch = {
            let mut state = self.state.lock();
            if state.handle.is_some() {
                return Err(Error::config("transport handle already installed"));
            }
            state.handle = Some(Arc::clone(&handle));
            std::mem::take(&mut state.buffered)
        };

        prepare(handle.as_ref());

        let mut count = 0;
        loop {
            count += batch.len();
            for task in batch {
                task(handle.as_ref());
            }

            let mut state = self.state.lock();
            if state.buffered.is_empty() {
                state.ready = true;
                break;
            }
            batch = std::mem::take(&mut state.buffered);
        }

        info!(flushed = count, "Transport ready, task queue flushed");
        Ok(count)
    }

    /// Returns the handle once the queue has been flushed.
    #[inline]
    #[must_use]
    pub fn handle(&self) -> Option<Arc<dyn TransportHandle>> {
        let state = self.state.lock();
        state.handle.clone().filter(|_| state.ready)
    }

    /// Returns `true` once the handle is installed and the queue flushed.
    #[inline]
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.state.lock().ready
    }

    /// Returns the number of buffered tasks.
    #[inline]
    #[must_use]
    pub fn buffered_count(&self) -> usize {
        self.state.lock().buffered.len()
    }
}

// ============================================================================
// Tests
// ============================================================================
