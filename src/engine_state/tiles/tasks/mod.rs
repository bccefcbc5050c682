//! # Tile Tasks
//!
//! Background work on terrain. Tasks run on worker threads and hand their output back to
//! the main thread, which applies it to the world between frames.

pub mod chunk_generation_task;
