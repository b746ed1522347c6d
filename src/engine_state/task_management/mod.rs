//! # Task Management System
//!
//! This module provides the task execution substrate the chunk manager offloads
//! terrain generation, mesh extraction and crater edits to.
//!
//! ## Architecture Overview
//!
//! - `TaskExecutor`: The narrow interface the chunk manager depends on
//! - `TaskManager`: A pool of OS worker threads, one channel pair per worker
//! - `InlineExecutor`: Runs each task on submission; used when no workers are
//!   configured and for deterministic tests
//! - `Task` / `TaskResult`: See [`task`]
//!
//! ## Task Lifecycle
//! 1. The chunk manager submits a task via `TaskExecutor::submit()`
//! 2. The executor hands it to an idle worker, or queues it by priority
//! 3. The worker consumes the task and sends back its result
//! 4. Once per frame the driving thread calls `collect_completed()` and applies
//!    each result in arrival order
//!
//! ## Scheduling
//! - Each worker holds at most [`MAX_TASKS_IN_FLIGHT`] tasks
//! - Workers are picked round-robin
//! - Overflow is split into a high and a normal queue; the high queue is always
//!   drained first
//!
//! ## Example Usage
//! ```
//! use voxel_stream::engine_state::task_management::{TaskExecutor, TaskManager};
//!
//! let mut executor = TaskManager::new(2).unwrap();
//! assert_eq!(executor.tasks_in_flight(), 0);
//! assert!(executor.collect_completed().is_empty());
//! ```

pub mod task;

use std::{
    collections::VecDeque,
    sync::mpsc::{channel, Receiver, Sender, TryRecvError},
    thread::{self, JoinHandle},
};

use log::{info, trace, warn};

pub use task::{Task, TaskPriority, TaskResult};

use crate::error::EngineError;

/// Anything that can run [`Task`]s off the driving thread and hand back
/// their results.
pub trait TaskExecutor {
    /// Schedules a task. Never blocks.
    fn submit(&mut self, task: Box<dyn Task>);

    /// Returns every result that has completed since the last call, in arrival
    /// order, and dispatches any queued work to workers that became free.
    fn collect_completed(&mut self) -> Vec<Box<dyn TaskResult>>;

    /// Tasks submitted but whose results have not been collected yet.
    fn tasks_in_flight(&self) -> usize;
}

/// A communication channel between the driving thread and one worker thread.
///
/// # Fields
/// - `task_sender`: Sends tasks to the worker
/// - `result_receiver`: Receives results from the worker
/// - `num_tasks_in_flight`: Tasks sent but not yet answered
/// - `_worker`: Handle keeping the worker thread associated with this channel
#[derive(Debug)]
pub struct TaskChannel {
    task_sender: Sender<Box<dyn Task>>,
    result_receiver: Receiver<Box<dyn TaskResult>>,
    num_tasks_in_flight: usize,
    _worker: JoinHandle<()>,
}

/// Maximum number of tasks that can be in flight per worker channel.
///
/// Kept at 1 so a busy worker never hides queued high-priority work behind
/// a normal-priority task sitting in its channel.
pub const MAX_TASKS_IN_FLIGHT: usize = 1;

/// Manages a pool of worker threads and coordinates task execution.
///
/// # Fields
/// - `channels`: Set of active worker channels
/// - `high_priority`: Queued tasks that go out before anything else
/// - `normal_priority`: Queued tasks that wait for the high queue to empty
/// - `current_channel`: Index for round-robin scheduling
///
/// Dropping the manager closes every task sender, which ends each worker's
/// receive loop.
pub struct TaskManager {
    channels: Vec<TaskChannel>,
    high_priority: VecDeque<Box<dyn Task>>,
    normal_priority: VecDeque<Box<dyn Task>>,
    current_channel: usize,
}

impl TaskManager {
    /// Creates a new `TaskManager` with the specified number of worker threads.
    ///
    /// # Arguments
    /// * `num_workers` - Number of worker threads to spawn. Zero yields a manager
    ///   that only queues; use [`InlineExecutor`] instead.
    ///
    /// # Errors
    /// Returns [`EngineError::Io`] if the OS refuses to spawn a worker thread.
    pub fn new(num_workers: usize) -> Result<Self, EngineError> {
        info!(
            "Starting {} task workers (available parallelism: {:?})",
            num_workers,
            thread::available_parallelism()
        );

        let mut channels = Vec::with_capacity(num_workers);

        for index in 0..num_workers {
            let (task_tx, task_rx) = channel::<Box<dyn Task>>();
            let (result_tx, result_rx) = channel::<Box<dyn TaskResult>>();

            let worker = thread::Builder::new()
                .name(format!("voxel-worker-{index}"))
                .spawn(move || {
                    while let Ok(task) = task_rx.recv() {
                        if result_tx.send(task.process()).is_err() {
                            break;
                        }
                    }
                })?;

            channels.push(TaskChannel {
                task_sender: task_tx,
                result_receiver: result_rx,
                num_tasks_in_flight: 0,
                _worker: worker,
            });
        }

        Ok(TaskManager {
            channels,
            high_priority: VecDeque::new(),
            normal_priority: VecDeque::new(),
            current_channel: 0,
        })
    }

    /// Number of worker threads in the pool.
    pub fn worker_count(&self) -> usize {
        self.channels.len()
    }

    /// Number of tasks waiting for a free worker.
    pub fn queued_count(&self) -> usize {
        self.high_priority.len() + self.normal_priority.len()
    }

    /// Attempts to send a task to a specific worker channel.
    ///
    /// # Returns
    /// - `Ok(())` if the task was handed to the worker
    /// - `Err(task)` if the worker has gone away
    fn try_send_task(&mut self, task: Box<dyn Task>, channel_idx: usize) -> Result<(), Box<dyn Task>> {
        match self.channels[channel_idx].task_sender.send(task) {
            Ok(_) => {
                self.channels[channel_idx].num_tasks_in_flight += 1;
                Ok(())
            }
            Err(task) => Err(task.0),
        }
    }

    /// Finds a worker channel below [`MAX_TASKS_IN_FLIGHT`], round-robin from the
    /// last used channel.
    fn find_available_channel(&self) -> Option<usize> {
        let count = self.channels.len();
        (0..count)
            .map(|offset| (self.current_channel + offset) % count)
            .find(|&idx| self.channels[idx].num_tasks_in_flight < MAX_TASKS_IN_FLIGHT)
    }

    fn enqueue(&mut self, task: Box<dyn Task>) {
        match task.priority() {
            TaskPriority::High => self.high_priority.push_back(task),
            TaskPriority::Normal => self.normal_priority.push_back(task),
        }
    }

    fn pop_queued(&mut self) -> Option<Box<dyn Task>> {
        self.high_priority
            .pop_front()
            .or_else(|| self.normal_priority.pop_front())
    }

    /// Hands queued tasks to idle workers, high priority first.
    pub fn process_queued_tasks(&mut self) {
        while let Some(channel_idx) = self.find_available_channel() {
            let Some(task) = self.pop_queued() else {
                break;
            };
            let name = task.name();
            match self.try_send_task(task, channel_idx) {
                Ok(()) => {
                    trace!("Dispatched queued {} to worker {}", name, channel_idx);
                    self.current_channel = (channel_idx + 1) % self.channels.len();
                }
                Err(task) => {
                    warn!("Worker {} disconnected, requeueing {}", channel_idx, name);
                    self.high_priority.push_front(task);
                    break;
                }
            }
        }
    }
}

impl TaskExecutor for TaskManager {
    fn submit(&mut self, task: Box<dyn Task>) {
        // Queued work goes out first so a new task can't overtake its own class.
        let has_backlog = match task.priority() {
            TaskPriority::High => !self.high_priority.is_empty(),
            TaskPriority::Normal => self.queued_count() > 0,
        };

        if has_backlog {
            self.enqueue(task);
            self.process_queued_tasks();
            return;
        }

        match self.find_available_channel() {
            Some(channel_idx) => {
                let name = task.name();
                match self.try_send_task(task, channel_idx) {
                    Ok(()) => {
                        trace!("Dispatched {} to worker {}", name, channel_idx);
                        self.current_channel = (channel_idx + 1) % self.channels.len();
                    }
                    Err(task) => self.enqueue(task),
                }
            }
            None => self.enqueue(task),
        }
    }

    fn collect_completed(&mut self) -> Vec<Box<dyn TaskResult>> {
        let mut results = Vec::new();
        for (index, channel) in self.channels.iter_mut().enumerate() {
            loop {
                match channel.result_receiver.try_recv() {
                    Ok(result) => {
                        channel.num_tasks_in_flight = channel.num_tasks_in_flight.saturating_sub(1);
                        results.push(result);
                    }
                    Err(TryRecvError::Empty) => break,
                    Err(TryRecvError::Disconnected) => {
                        if channel.num_tasks_in_flight > 0 {
                            warn!(
                                "Worker {} exited with {} task(s) in flight",
                                index, channel.num_tasks_in_flight
                            );
                        }
                        break;
                    }
                }
            }
        }

        self.process_queued_tasks();
        results
    }

    fn tasks_in_flight(&self) -> usize {
        self.channels
            .iter()
            .map(|channel| channel.num_tasks_in_flight)
            .sum::<usize>()
            + self.queued_count()
    }
}

/// Runs tasks synchronously on the driving thread.
///
/// The task is processed during `submit`, but its result is only handed out by
/// the next `collect_completed`, so result handling still happens at the same
/// point in the frame as with a real worker pool.
#[derive(Default)]
pub struct InlineExecutor {
    completed: VecDeque<Box<dyn TaskResult>>,
}

impl InlineExecutor {
    /// Creates an executor with no completed results.
    pub fn new() -> Self {
        Self::default()
    }
}

impl TaskExecutor for InlineExecutor {
    fn submit(&mut self, task: Box<dyn Task>) {
        trace!("Running {} inline", task.name());
        self.completed.push_back(task.process());
    }

    fn collect_completed(&mut self) -> Vec<Box<dyn TaskResult>> {
        self.completed.drain(..).collect()
    }

    fn tasks_in_flight(&self) -> usize {
        self.completed.len()
    }
}

/// Builds the executor matching the configured worker count.
pub fn executor_for(worker_threads: usize) -> Result<Box<dyn TaskExecutor>, EngineError> {
    if worker_threads == 0 {
        Ok(Box::new(InlineExecutor::new()))
    } else {
        Ok(Box::new(TaskManager::new(worker_threads)?))
    }
}
