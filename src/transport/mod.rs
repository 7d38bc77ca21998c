//! Transport boundary.
//!
//! This module holds everything between the bridge and the external
//! transport runtime: the handle contract, the queue that absorbs calls
//! made before the runtime has loaded, and the next-turn scheduler.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐                              ┌─────────────────┐
//! │  WebSocket      │   create / send / close      │  Transport      │
//! │  (facade)       │─────► TaskQueue ────────────►│  Handle         │
//! │                 │                              │  (plugin)       │
//! │  Bridge         │◄──── RawNotification batch ──│                 │
//! └─────────────────┘                              └─────────────────┘
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `handle` | Transport handle trait and create arguments |
//! | `queue` | Deferred task queue |
//! | `scheduler` | Next-turn scheduling and cancellation |

// ============================================================================
// Submodules
// ============================================================================

/// Transport handle contract.
pub mod handle;

/// Deferred task queue.
pub mod queue;

/// Next-turn scheduling.
pub mod scheduler;

// ============================================================================
// Re-exports
// ============================================================================

pub use handle::{CreateRequest, TransportHandle};
pub use queue::{TaskQueue, TransportTask};
pub use scheduler::{
    ChannelScheduler, ManualScheduler, PendingTask, Scheduler, SchedulerLoop, Task,
};
