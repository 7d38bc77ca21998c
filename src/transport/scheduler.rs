//! Next-turn task scheduling.
//!
//! Work crossing the transport boundary never runs inline; it is submitted
//! to a [`Scheduler`] and runs on the host loop's next turn. Two
//! implementations are provided:
//!
//! | Type | Drives tasks via |
//! |------|------------------|
//! | [`ManualScheduler`] | explicit [`ManualScheduler::run_pending`] / [`ManualScheduler::drain`] calls |
//! | [`ChannelScheduler`] | a [`SchedulerLoop`] future on a tokio runtime |
//!
//! [`PendingTask`] is the cancellation handle for a scheduled task.

// ============================================================================
// Imports
// ============================================================================

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tracing::{debug, trace, warn};

// ============================================================================
// Types
// ============================================================================

/// A zero-argument unit of deferred work.
pub type Task = Box<dyn FnOnce() + Send + 'static>;

// ============================================================================
// Scheduler
// ============================================================================

/// Runs submitted tasks on a later turn, in submission order.
pub trait Scheduler: Send + Sync {
    /// Queues `task` for the next turn. Never runs it inline.
    fn submit(&self, task: Task);
}

// ============================================================================
// ManualScheduler
// ============================================================================

/// Scheduler whose turns are driven explicitly by the caller.
///
/// Used by tests to control exactly when deferred work runs, and by hosts
/// that already own an event loop.
#[derive(Default)]
pub struct ManualScheduler {
    queue: Mutex<VecDeque<Task>>,
}

impl ManualScheduler {
    /// Creates an empty scheduler.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs one turn: every task queued before this call, in order.
    ///
    /// Tasks submitted while the turn runs wait for the next turn.
    /// Returns the number of tasks run.
    pub fn run_pending(&self) -> usize {
        let batch: Vec<Task> = self.queue.lock().drain(..).collect();
        let count = batch.len();

        for task in batch {
            task();
        }

        if count > 0 {
            trace!(count, "Scheduler turn complete");
        }
        count
    }

    /// Runs turns until no task is left. Returns the total number run.
    pub fn drain(&self) -> usize {
        let mut total = 0;
        loop {
            let ran = self.run_pending();
            if ran == 0 {
                return total;
            }
            total += ran;
        }
    }

    /// Returns the number of tasks waiting for a turn.
    #[inline]
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.queue.lock().len()
    }
}

impl Scheduler for ManualScheduler {
    fn submit(&self, task: Task) {
        self.queue.lock().push_back(task);
    }
}

// ============================================================================
// ChannelScheduler
// ============================================================================

/// Scheduler backed by an unbounded tokio channel.
///
/// Tasks are run one at a time by the paired [`SchedulerLoop`].
#[derive(Clone)]
pub struct ChannelScheduler {
    task_tx: mpsc::UnboundedSender<Task>,
}

/// Event loop that runs tasks submitted to a [`ChannelScheduler`].
pub struct SchedulerLoop {
    task_rx: mpsc::UnboundedReceiver<Task>,
}

impl ChannelScheduler {
    /// Creates a scheduler and the loop that drives it.
    ///
    /// The loop must be spawned (or awaited) for any task to run.
    #[must_use]
    pub fn new() -> (Self, SchedulerLoop) {
        let (task_tx, task_rx) = mpsc::unbounded_channel();
        (Self { task_tx }, SchedulerLoop { task_rx })
    }
}

impl Scheduler for ChannelScheduler {
    fn submit(&self, task: Task) {
        if self.task_tx.send(task).is_err() {
            warn!("Scheduler loop stopped, task dropped");
        }
    }
}

impl SchedulerLoop {
    /// Runs tasks until every [`ChannelScheduler`] clone is dropped.
    pub async fn run(mut self) {
        while let Some(task) = self.task_rx.recv().await {
            task();
            tokio::task::yield_now().await;
        }
        debug!("Scheduler loop terminated");
    }
}

// ============================================================================
// PendingTask
// ============================================================================

const PENDING: u8 = 0;
const STARTED: u8 = 1;
const CANCELLED: u8 = 2;

/// Cancellation handle shared between a scheduled task and its owner.
///
/// Exactly one of [`PendingTask::try_begin`] and [`PendingTask::try_cancel`]
/// succeeds.
#[derive(Debug, Clone)]
pub struct PendingTask {
    state: Arc<AtomicU8>,
}

impl PendingTask {
    /// Creates a handle in the pending state.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Arc::new(AtomicU8::new(PENDING)),
        }
    }

    /// Marks the task as started. Returns `false` if it was cancelled.
    #[inline]
    pub fn try_begin(&self) -> bool {
        self.transition(STARTED)
    }

    /// Cancels the task. Returns `false` if it already started.
    #[inline]
    pub fn try_cancel(&self) -> bool {
        self.transition(CANCELLED)
    }

    /// Returns `true` if the task was cancelled.
    #[inline]
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.state.load(Ordering::Acquire) == CANCELLED
    }

    /// Returns `true` if neither started nor cancelled.
    #[inline]
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.state.load(Ordering::Acquire) == PENDING
    }

    fn transition(&self, to: u8) -> bool {
        self.state
            .compare_exchange(PENDING, to, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }
}

impl Default for PendingTask {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================
