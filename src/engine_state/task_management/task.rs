//! # Task System Core Traits
//!
//! This module defines the fundamental building blocks of the task system,
//! which moves generation, meshing and edit work off the driving thread.
//!
//! ## Core Components
//! - `Task`: A unit of work that owns its payload and runs on a worker
//! - `TaskResult`: The outcome of a task, applied to the chunk manager on the driving thread
//! - `TaskPriority`: Whether the task jumps ahead of queued meshing work
//!
//! ## Task Lifecycle
//! 1. A `Task` is created and handed to a [`TaskExecutor`](super::TaskExecutor)
//! 2. The task's `process()` method consumes it on a worker thread
//! 3. The task returns a boxed `TaskResult`
//! 4. The driving thread collects the result and calls `handle_result()` with
//!    exclusive access to the [`ChunkManager`]
//!
//! ## Thread Safety
//! - `Task` must be `Send` to be transferred to a worker
//! - `TaskResult` must be `Send` to be transferred back
//! - Voxel buffers are moved into the task, never shared

use crate::engine_state::voxels::world::ChunkManager;

/// Scheduling class of a task.
///
/// High-priority work (generation near the observer, crater edits) is handed
/// to workers before any queued normal-priority work (mesh extraction).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TaskPriority {
    /// Serviced ahead of everything queued at `Normal`
    High,
    /// Default class
    Normal,
}

/// A trait representing a unit of work that can be executed asynchronously.
///
/// Tasks own all the data they need. Large buffers are moved in on
/// construction and moved out again inside the result, so nothing is copied
/// across the thread boundary twice.
pub trait Task: Send {
    /// Short name used in trace logging.
    fn name(&self) -> &'static str;

    /// Scheduling class of this task.
    fn priority(&self) -> TaskPriority {
        TaskPriority::Normal
    }

    /// Consumes the task and produces its result.
    ///
    /// Runs on a worker thread (or inline, for the [`InlineExecutor`](super::InlineExecutor)).
    /// Must not touch driving-thread state; anything it needs is in `self`.
    ///
    /// # Returns
    /// A boxed `TaskResult` that will be applied on the driving thread.
    fn process(self: Box<Self>) -> Box<dyn TaskResult>;
}

/// A trait representing the result of processing a [`Task`].
///
/// Results are applied in arrival order. Each implementation is responsible
/// for its own staleness check: the region it refers to may have been unloaded,
/// reloaded or edited since the task was submitted.
pub trait TaskResult: Send {
    /// Applies the result to the chunk manager.
    ///
    /// # Arguments
    /// * `manager` - The chunk manager that submitted the task
    fn handle_result(self: Box<Self>, manager: &mut ChunkManager);
}
