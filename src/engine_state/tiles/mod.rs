//! # Tile World Core
//!
//! Everything needed to represent, change and stream the terrain.
//!
//! ## Architecture
//!
//! * **Tile**: kinds, materials, resources and the out-of-range sentinel
//! * **Chunk**: fixed-size square grids of tiles with dirty and pending flags
//! * **Coords**: floored conversions between world, tile and chunk space
//! * **World**: the sparse chunk map with lookup, mine/place and chunk lifecycle
//! * **Generation**: terrain sources that fill requested chunks
//! * **Tasks**: background generation whose results are installed at frame boundaries
//!
//! ## Data Flow
//!
//! 1. A system asks the world for a chunk (directly or through an interest window)
//! 2. The world inserts a pending placeholder and queues a generation request
//! 3. The session turns requests into tasks for the worker pool
//! 4. Completed tiles are installed on the main thread, marking the chunk dirty
//! 5. The render scheduler redraws dirty chunks within its per-frame budget

pub mod chunk;
pub mod coords;
pub mod generation;
pub mod tasks;
pub mod tile;
pub mod world;
