//! # Task System Core Traits
//!
//! The building blocks of background work.
//!
//! ## Task Lifecycle
//! 1. A `Task` is published via `TaskManager::publish_task()`
//! 2. Its `process()` runs on a worker thread (or inline when there are no workers)
//! 3. It returns a boxed `TaskResult`
//! 4. The result's `handle_result()` runs on the main thread at the next frame boundary
//! 5. The result may hand back follow-up tasks
//!
//! ## Thread Safety
//! - `Task` and `TaskResult` must be `Send` to cross thread boundaries
//! - Tasks own their inputs; they never borrow the world
//! - Only `handle_result()` may mutate the world, and it runs on the main thread

use crate::engine_state::tiles::{coords::ChunkCoord, world::TileWorld};

/// A unit of work that can run off the main thread.
///
/// # Implementation Guidelines
/// - Own all the data needed to do the work
/// - Never block on main-thread state
/// - Report failures through the returned result instead of panicking
pub trait Task: Send {
    /// Does the work and packages the outcome for the main thread.
    fn process(&self) -> Box<dyn TaskResult + Send>;

    /// The chunk this task works on, if it works on one.
    ///
    /// Lets the manager drop queued work for chunks the world has stopped waiting for.
    fn chunk_position(&self) -> Option<ChunkCoord> {
        None
    }
}

/// The outcome of a `Task`, applied on the main thread.
pub trait TaskResult: Send {
    /// Applies the result to the world.
    ///
    /// Runs between frames, so every reader in the next frame sees the change in full.
    ///
    /// # Returns
    /// Follow-up tasks to schedule (can be empty)
    fn handle_result(self: Box<Self>, world: &mut TileWorld) -> Vec<Box<dyn Task + Send>>;
}
