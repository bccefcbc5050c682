//! # Physics
//!
//! Movement of entities through the tile world.
//!
//! * `collision` - axis-aligned boxes and per-axis displacement resolution
//! * `movement` - turning held direction keys into a frame displacement

pub mod collision;
pub mod movement;
