//! # Task Management System
//!
//! Runs background work (chunk generation) on a pool of worker threads and applies the
//! results on the main thread.
//!
//! ## Architecture Overview
//! - `TaskManager`: distributes tasks to workers and collects results
//! - `Task`: a unit of work that can be executed off the main thread
//! - `TaskResult`: the outcome of a task, applied to the world on the main thread
//! - `TaskChannel`: the pair of channels connecting the main thread to one worker
//!
//! ## Frame Boundaries
//! Results are only applied inside `process_completed_tasks()`, which the session calls
//! at the start of each update. Nothing a worker does is visible mid-frame.
//!
//! ## Inline Mode
//! With zero workers nothing runs in the background: queued tasks are processed inside
//! `process_completed_tasks()` instead. Results still land one frame after publishing,
//! which keeps behaviour identical apart from timing and makes tests deterministic.
//!
//! ## Example Usage
//! ```rust,ignore
//! let mut task_manager = TaskManager::new(num_workers);
//!
//! task_manager.publish_task(Box::new(ChunkGenerationTask::new(generator.clone(), position, 16)));
//!
//! // In the game loop:
//! task_manager.process_completed_tasks(&mut world);
//! task_manager.process_queued_tasks();
//! ```

pub mod task;

use std::collections::VecDeque;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::thread::{self, JoinHandle};

use log::{info, warn};
use task::{Task, TaskResult};

use super::tiles::world::TileWorld;

/// A communication channel between the main thread and a worker thread.
///
/// # Fields
/// - `task_sender`: sends tasks from main thread to worker
/// - `result_receiver`: receives task results from worker
/// - `num_tasks_in_flight`: number of tasks sent but not yet collected
/// - `_worker`: handle to the worker thread
///
/// Dropping the channel closes `task_sender`, which ends the worker's loop.
#[derive(Debug)]
pub struct TaskChannel {
    task_sender: Sender<Box<dyn Task + Send>>,
    result_receiver: Receiver<Box<dyn TaskResult + Send>>,
    num_tasks_in_flight: usize,
    _worker: JoinHandle<()>,
}

/// Manages a pool of worker threads and coordinates task execution.
///
/// # Fields
/// - `channels`: set of active worker channels
/// - `queued_tasks`: tasks waiting for an available worker
/// - `current_channel`: index for round-robin scheduling
pub struct TaskManager {
    channels: Vec<TaskChannel>,
    queued_tasks: VecDeque<Box<dyn Task + Send>>,
    current_channel: usize,
}

/// Maximum number of tasks that can be in flight per worker channel.
///
/// Keeping this small leaves most work in `queued_tasks`, where `retain_queued` can
/// still drop it cheaply.
pub const MAX_TASKS_IN_FLIGHT: usize = 2;

impl TaskManager {
    /// Creates a new `TaskManager` with the specified number of worker threads.
    ///
    /// # Arguments
    /// * `num_workers` - Number of worker threads to create. Zero runs tasks inline.
    ///
    /// A worker thread that fails to start is logged and skipped.
    pub fn new(num_workers: usize) -> Self {
        let mut channels = Vec::with_capacity(num_workers);

        for index in 0..num_workers {
            let (task_tx, task_rx) = channel::<Box<dyn Task + Send>>();
            let (result_tx, result_rx) = channel::<Box<dyn TaskResult + Send>>();

            let task_closure = move || {
                while let Ok(task) = task_rx.recv() {
                    let result = task.process();
                    if result_tx.send(result).is_err() {
                        break;
                    }
                }
            };

            match thread::Builder::new()
                .name(format!("chunk-worker-{index}"))
                .spawn(task_closure)
            {
                Ok(worker) => channels.push(TaskChannel {
                    task_sender: task_tx,
                    result_receiver: result_rx,
                    num_tasks_in_flight: 0,
                    _worker: worker,
                }),
                Err(err) => warn!("Could not start chunk worker {}: {}", index, err),
            }
        }

        info!("Task manager started with {} workers", channels.len());

        TaskManager {
            channels,
            queued_tasks: VecDeque::new(),
            current_channel: 0,
        }
    }

    /// Number of worker threads actually running.
    pub fn worker_count(&self) -> usize {
        self.channels.len()
    }

    /// Tasks waiting for a worker plus tasks currently being processed.
    pub fn outstanding_tasks(&self) -> usize {
        self.queued_tasks.len()
            + self
                .channels
                .iter()
                .map(|channel| channel.num_tasks_in_flight)
                .sum::<usize>()
    }

    /// Attempts to send a task to a specific worker channel.
    ///
    /// # Returns
    /// - `Ok(())` if the task was handed to the worker
    /// - `Err(task)` if the worker has disconnected, returning the task for requeueing
    fn try_send_task(
        &mut self,
        task: Box<dyn Task + Send>,
        channel_idx: usize,
    ) -> Result<(), Box<dyn Task + Send>> {
        match self.channels[channel_idx].task_sender.send(task) {
            Ok(_) => {
                self.channels[channel_idx].num_tasks_in_flight += 1;
                Ok(())
            }
            Err(err) => Err(err.0),
        }
    }

    /// Finds a worker channel that can accept a new task, round-robin from the last one used.
    fn find_available_channel(&self) -> Option<usize> {
        if self.channels.is_empty() {
            return None;
        }

        let count = self.channels.len();
        (0..count)
            .map(|offset| (self.current_channel + offset) % count)
            .find(|&idx| self.channels[idx].num_tasks_in_flight < MAX_TASKS_IN_FLIGHT)
    }

    /// Drops queued tasks for which `keep` returns `false`.
    ///
    /// Tasks already handed to a worker are not affected; their results still arrive.
    ///
    /// # Returns
    /// The number of tasks dropped.
    pub fn retain_queued(&mut self, mut keep: impl FnMut(&(dyn Task + Send)) -> bool) -> usize {
        let before = self.queued_tasks.len();
        self.queued_tasks.retain(|task| keep(task.as_ref()));
        before - self.queued_tasks.len()
    }

    /// Publishes a new task for execution.
    ///
    /// # Returns
    /// - `true` if the task was immediately handed to a worker
    /// - `false` if it was queued
    pub fn publish_task(&mut self, task: Box<dyn Task + Send>) -> bool {
        let Some(channel_idx) = self.find_available_channel() else {
            self.queued_tasks.push_back(task);
            return false;
        };

        match self.try_send_task(task, channel_idx) {
            Ok(_) => {
                self.current_channel = (channel_idx + 1) % self.channels.len();
                true
            }
            Err(task) => {
                self.queued_tasks.push_back(task);
                false
            }
        }
    }

    /// Hands queued tasks to workers until the queue is empty or every worker is busy.
    ///
    /// Tasks are dispatched oldest first.
    pub fn process_queued_tasks(&mut self) {
        while let Some(channel_idx) = self.find_available_channel() {
            let Some(task) = self.queued_tasks.pop_front() else {
                return;
            };
            match self.try_send_task(task, channel_idx) {
                Ok(_) => self.current_channel = (channel_idx + 1) % self.channels.len(),
                Err(task) => {
                    // Worker disconnected; keep the task and stop for this frame.
                    self.queued_tasks.push_front(task);
                    return;
                }
            }
        }
    }

    /// Applies every finished task result to the world.
    ///
    /// Must be called on the main thread between frames. In inline mode the queued tasks
    /// are processed here first.
    ///
    /// # Returns
    /// The number of results applied.
    pub fn process_completed_tasks(&mut self, world: &mut TileWorld) -> usize {
        let mut results: Vec<Box<dyn TaskResult + Send>> = Vec::new();

        if self.channels.is_empty() {
            results.extend(self.queued_tasks.drain(..).map(|task| task.process()));
        }

        for channel in &mut self.channels {
            while let Ok(result) = channel.result_receiver.try_recv() {
                channel.num_tasks_in_flight = channel.num_tasks_in_flight.saturating_sub(1);
                results.push(result);
            }
        }

        let applied = results.len();
        let mut tasks_to_queue = Vec::new();
        for result in results {
            tasks_to_queue.extend(result.handle_result(world));
        }

        for task in tasks_to_queue {
            self.publish_task(task);
        }

        applied
    }
}
