//! Rendering system for the tile engine.
//!
//! This module turns world state into draw commands. It does not own a graphics API: the
//! host passes a [`RenderTarget`] each frame and the engine issues canvas-style commands
//! against it.
//!
//! ## Key Components
//!
//! * `target` - the `RenderTarget` trait, draw primitives, colours and a recording target
//! * `scheduler` - the budgeted, distance-ordered chunk redraw pass
//! * `overlay` - grid, hover highlight, entities and the debug panel

pub mod overlay;
pub mod scheduler;
pub mod target;

// Re-export commonly used types
pub use scheduler::{RenderScheduler, RenderStats};
pub use target::{DrawCommand, RecordingTarget, Rect, RenderTarget, Rgba, TileQuad};
