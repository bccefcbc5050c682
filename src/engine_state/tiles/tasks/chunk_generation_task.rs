//! # Chunk Generation Task
//!
//! This module defines the `ChunkGenerationTask`, which produces the tiles of one chunk
//! off the main thread. It is scheduled for every coordinate the world queues as pending
//! while the player and camera move.

use std::sync::Arc;

use log::{debug, warn};

use crate::engine_state::{
    task_management::task::{Task, TaskResult},
    tiles::{
        chunk::Chunk,
        coords::ChunkCoord,
        generation::{ChunkGenerator, GenerationError},
        tile::Tile,
        world::TileWorld,
    },
};

/// A task that generates chunk data asynchronously.
///
/// This task is responsible for:
/// 1. Running the generator for the chunk at the specified position
/// 2. Handing the tiles (or the failure) back to the main thread
pub struct ChunkGenerationTask {
    /// Shared generator; never touches the world
    generator: Arc<dyn ChunkGenerator>,
    /// The position of the chunk to generate (in chunk coordinates)
    position: ChunkCoord,
    chunk_size: usize,
}

impl ChunkGenerationTask {
    /// Creates a new chunk generation task.
    ///
    /// # Arguments
    /// * `generator` - The generator shared by every task of the session
    /// * `position` - The chunk coordinates to generate
    /// * `chunk_size` - Tiles per chunk edge
    pub fn new(generator: Arc<dyn ChunkGenerator>, position: ChunkCoord, chunk_size: usize) -> Self {
        ChunkGenerationTask {
            generator,
            position,
            chunk_size,
        }
    }
}

impl Task for ChunkGenerationTask {
    fn process(&self) -> Box<dyn TaskResult + Send> {
        Box::new(ChunkGenerationTaskResult {
            position: self.position,
            chunk_size: self.chunk_size,
            tiles: self.generator.generate(self.position, self.chunk_size),
        })
    }

    fn chunk_position(&self) -> Option<ChunkCoord> {
        Some(self.position)
    }
}

/// The result of a chunk generation task.
pub struct ChunkGenerationTaskResult {
    position: ChunkCoord,
    chunk_size: usize,
    tiles: Result<Vec<Tile>, GenerationError>,
}

impl TaskResult for ChunkGenerationTaskResult {
    /// Installs the generated chunk.
    ///
    /// A failed generation is logged and the chunk is left pending; it is retried only if
    /// it is abandoned and requested again.
    fn handle_result(self: Box<Self>, world: &mut TileWorld) -> Vec<Box<dyn Task + Send>> {
        match self.tiles {
            Ok(tiles) => {
                let chunk = Chunk::from_tiles(self.position, self.chunk_size, tiles);
                if world.install_chunk(chunk) {
                    debug!("Installed chunk {:?}", self.position);
                }
            }
            Err(err) => warn!("Generation of chunk {:?} failed: {}", self.position, err),
        }
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::tiles::{
        generation::{FlatGenerator, TextChunkSource},
        tile::Ground,
        world::ChunkStatus,
    };

    #[test]
    fn successful_generation_installs_chunk() {
        let mut world = TileWorld::new(16.0, 4, None);
        let coord = ChunkCoord::new(-1, 3);
        world.ensure_loaded(coord);

        let task = ChunkGenerationTask::new(Arc::new(FlatGenerator::default()), coord, 4);
        let follow_up = task.process().handle_result(&mut world);

        assert!(follow_up.is_empty());
        assert_eq!(world.status(coord), Some(ChunkStatus::Loaded));
        assert!(world.chunk(coord).unwrap().dirty);
        assert_eq!(world.get_tile(coord.tile_at(0, 0, 4)), Tile::open(Ground::Dirt));
    }

    #[test]
    fn failed_generation_leaves_chunk_pending() {
        let mut world = TileWorld::new(16.0, 2, None);
        let coord = ChunkCoord::new(0, 0);
        world.ensure_loaded(coord);

        let source = TextChunkSource::new(|_| Ok("01".to_string()));
        let task = ChunkGenerationTask::new(Arc::new(source), coord, 2);
        task.process().handle_result(&mut world);

        assert_eq!(world.status(coord), Some(ChunkStatus::Pending));
    }
}
