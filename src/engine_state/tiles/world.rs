//! # Tile World
//!
//! This module provides the `TileWorld` struct, which owns every chunk of terrain and is
//! the only way to read or change tiles.
//!
//! ## Storage
//!
//! Chunks live in a sparse map keyed by [`ChunkCoord`]. Only chunks that have been
//! requested are present, so the world can be unbounded while memory stays proportional
//! to the area the player has seen.
//!
//! ## Loading
//!
//! A chunk that is asked for but not present is inserted as *pending* and its coordinate
//! is queued in `generation_requests`. The session drains that queue into generation
//! tasks, and the finished tiles come back through [`TileWorld::install_chunk`] at a frame
//! boundary. Until then every lookup in the chunk returns the empty sentinel, so pending
//! chunks never take part in collision or drawing.
//!
//! ## Errors
//!
//! Nothing here fails. Lookups outside any generated chunk return [`Tile::SENTINEL`],
//! mutations that do not apply return `None` / `false` and leave the world untouched.

use std::collections::HashMap;

use cgmath::Point2;
use log::{debug, warn};

use super::{
    chunk::Chunk,
    coords::{ChunkCoord, ChunkRect, TileCoord},
    generation::ChunkGenerator,
    tile::{Ground, ResourceDrop, Tile, TileKind},
};
use crate::config::EngineConfig;

/// Load state of a chunk coordinate.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ChunkStatus {
    Loaded,
    Pending,
    /// Outside the world bounds; never generated.
    OutOfBounds,
}

pub struct TileWorld {
    chunks: HashMap<ChunkCoord, Chunk>,
    tile_size: f32,
    chunk_size: usize,
    /// Chunks that may be generated, or `None` for an unbounded world.
    bounds: Option<ChunkRect>,
    generation_requests: Vec<ChunkCoord>,
}

impl TileWorld {
    /// Creates an empty world.
    ///
    /// # Arguments
    /// * `tile_size` - World units per tile edge
    /// * `chunk_size` - Tiles per chunk edge
    /// * `radius_chunks` - If set, only chunks in `[-radius, radius)` on both axes exist
    pub fn new(tile_size: f32, chunk_size: usize, radius_chunks: Option<i32>) -> Self {
        let bounds = radius_chunks.map(|radius| {
            ChunkRect::new(
                ChunkCoord::new(-radius, -radius),
                ChunkCoord::new(radius - 1, radius - 1),
            )
        });
        TileWorld {
            chunks: HashMap::new(),
            tile_size,
            chunk_size,
            bounds,
            generation_requests: Vec::new(),
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        TileWorld::new(config.tile_size, config.chunk_size, config.world_radius_chunks)
    }

    pub fn tile_size(&self) -> f32 {
        self.tile_size
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn bounds(&self) -> Option<ChunkRect> {
        self.bounds
    }

    pub fn in_bounds(&self, coord: ChunkCoord) -> bool {
        self.bounds.map_or(true, |bounds| bounds.contains(coord))
    }

    /// The tile containing a world-space point.
    pub fn tile_at_world(&self, world: Point2<f32>) -> TileCoord {
        TileCoord::from_world(world, self.tile_size)
    }

    pub fn status(&self, coord: ChunkCoord) -> Option<ChunkStatus> {
        if !self.in_bounds(coord) {
            return Some(ChunkStatus::OutOfBounds);
        }
        self.chunks.get(&coord).map(|chunk| {
            if chunk.pending {
                ChunkStatus::Pending
            } else {
                ChunkStatus::Loaded
            }
        })
    }

    pub fn is_loaded(&self, coord: ChunkCoord) -> bool {
        self.status(coord) == Some(ChunkStatus::Loaded)
    }

    /// Returns a generated chunk, or `None` if it is missing or still pending.
    pub fn chunk(&self, coord: ChunkCoord) -> Option<&Chunk> {
        self.chunks.get(&coord).filter(|chunk| !chunk.pending)
    }

    pub fn chunk_mut(&mut self, coord: ChunkCoord) -> Option<&mut Chunk> {
        self.chunks.get_mut(&coord).filter(|chunk| !chunk.pending)
    }

    /// Returns the tile at a tile coordinate, or [`Tile::SENTINEL`] when its chunk is out
    /// of bounds, missing or pending.
    pub fn get_tile(&self, tile: TileCoord) -> Tile {
        let (local_x, local_y) = tile.local(self.chunk_size);
        self.chunk(tile.chunk(self.chunk_size))
            .and_then(|chunk| chunk.get(local_x, local_y))
            .copied()
            .unwrap_or(Tile::SENTINEL)
    }

    /// Whether the tile blocks movement. Unloaded tiles never do.
    pub fn is_solid(&self, tile: TileCoord) -> bool {
        let (local_x, local_y) = tile.local(self.chunk_size);
        self.chunk(tile.chunk(self.chunk_size))
            .map_or(false, |chunk| chunk.is_solid(local_x, local_y))
    }

    /// Mines a resource tile.
    ///
    /// If the tile is a resource it becomes empty, its chunk is marked dirty and its stored
    /// drop is returned. Empty and solid tiles are left alone and yield `None`, so mining
    /// the same tile twice is a no-op the second time.
    ///
    /// Touching an unloaded chunk requests it; the call still returns `None`.
    pub fn mine_tile(&mut self, tile: TileCoord) -> Option<ResourceDrop> {
        let coord = tile.chunk(self.chunk_size);
        if self.ensure_loaded(coord) != ChunkStatus::Loaded {
            return None;
        }
        let (local_x, local_y) = tile.local(self.chunk_size);
        let chunk = self.chunk_mut(coord)?;
        let current = *chunk.get(local_x, local_y)?;

        let TileKind::Resource { drop, .. } = current.kind else {
            return None;
        };

        chunk.set(local_x, local_y, Tile::open(current.ground));
        debug!("Mined {:?} at {:?}", drop, tile);
        Some(drop)
    }

    /// Places `kind` on an empty tile.
    ///
    /// # Returns
    /// `true` if the tile was empty and is now `kind` (its chunk marked dirty). `false`,
    /// with nothing changed, if the tile is occupied, its chunk is not generated, it lies
    /// outside the world, or `kind` is itself empty.
    pub fn place_tile(&mut self, tile: TileCoord, kind: TileKind) -> bool {
        if kind.is_empty() {
            return false;
        }
        let coord = tile.chunk(self.chunk_size);
        if self.ensure_loaded(coord) != ChunkStatus::Loaded {
            return false;
        }
        let (local_x, local_y) = tile.local(self.chunk_size);
        let Some(chunk) = self.chunk_mut(coord) else {
            return false;
        };
        let Some(current) = chunk.get(local_x, local_y).copied() else {
            return false;
        };
        if !current.is_empty() {
            return false;
        }
        chunk.set(local_x, local_y, Tile::new(current.ground, kind))
    }

    /// Makes sure a chunk is loaded or on its way.
    ///
    /// A missing in-bounds chunk is inserted as pending and queued for generation.
    pub fn ensure_loaded(&mut self, coord: ChunkCoord) -> ChunkStatus {
        if let Some(status) = self.status(coord) {
            return status;
        }
        self.chunks
            .insert(coord, Chunk::pending(coord, self.chunk_size));
        self.generation_requests.push(coord);
        ChunkStatus::Pending
    }

    /// Ensures every chunk of `rect` is loaded or pending.
    pub fn request_window(&mut self, rect: ChunkRect) {
        for coord in rect.iter() {
            self.ensure_loaded(coord);
        }
    }

    /// Drains the coordinates queued for generation since the last call.
    pub fn take_generation_requests(&mut self) -> Vec<ChunkCoord> {
        std::mem::take(&mut self.generation_requests)
    }

    /// Forgets pending chunks that lie outside every rectangle in `keep`.
    ///
    /// Their generation may still complete; [`TileWorld::install_chunk`] accepts late
    /// results.
    ///
    /// # Returns
    /// The number of pending chunks dropped.
    pub fn abandon_outside(&mut self, keep: &[ChunkRect]) -> usize {
        let wanted = |coord: &ChunkCoord| keep.iter().any(|rect| rect.contains(*coord));
        let before = self.chunks.len();
        self.chunks
            .retain(|coord, chunk| !chunk.pending || wanted(coord));
        self.generation_requests.retain(|coord| wanted(coord));
        let dropped = before - self.chunks.len();
        if dropped > 0 {
            debug!("Abandoned {} pending chunks", dropped);
        }
        dropped
    }

    /// Installs a generated chunk, clearing its pending state.
    ///
    /// # Returns
    /// `false` if the chunk is out of bounds, has the wrong size, or a generated chunk is
    /// already present at its position (the existing chunk wins).
    pub fn install_chunk(&mut self, mut chunk: Chunk) -> bool {
        let coord = chunk.position;
        if !self.in_bounds(coord) || chunk.size() != self.chunk_size {
            warn!("Rejected generated chunk {:?}", coord);
            return false;
        }
        if self.is_loaded(coord) {
            debug!("Chunk {:?} already generated, dropping duplicate", coord);
            return false;
        }
        chunk.pending = false;
        chunk.dirty = true;
        self.chunks.insert(coord, chunk);
        true
    }

    /// Returns a walkable spawn point near `requested`.
    ///
    /// The world guarantees the result is finite, inside the world bounds, and at the
    /// centre of an empty tile. The chunk is generated synchronously if needed. If that
    /// chunk has no empty tile, the chosen tile is cleared.
    pub fn spawn_point(&mut self, requested: Point2<f32>, generator: &dyn ChunkGenerator) -> Point2<f32> {
        let mut near = if requested.x.is_finite() && requested.y.is_finite() {
            self.tile_at_world(requested)
        } else {
            warn!("Requested spawn {:?} is not finite, using the origin", requested);
            TileCoord::default()
        };
        if !self.in_bounds(near.chunk(self.chunk_size)) {
            warn!("Requested spawn tile {:?} is outside the world, using the origin", near);
            near = TileCoord::default();
        }

        let coord = near.chunk(self.chunk_size);
        if !self.is_loaded(coord) {
            let tiles = match generator.generate(coord, self.chunk_size) {
                Ok(tiles) => tiles,
                Err(err) => {
                    warn!("Spawn chunk {:?} failed to generate ({}), using flat ground", coord, err);
                    vec![Tile::open(Ground::Dirt); self.chunk_size * self.chunk_size]
                }
            };
            self.install_chunk(Chunk::from_tiles(coord, self.chunk_size, tiles));
            self.generation_requests.retain(|queued| *queued != coord);
        }

        let spawn_tile = self
            .chunk(coord)
            .and_then(|chunk| {
                chunk
                    .iter()
                    .filter(|(_, _, tile)| tile.is_empty())
                    .map(|(x, y, _)| coord.tile_at(x, y, self.chunk_size))
                    .min_by_key(|tile| {
                        let (dx, dy) = ((tile.x - near.x) as i64, (tile.y - near.y) as i64);
                        (dx * dx + dy * dy, tile.y, tile.x)
                    })
            })
            .unwrap_or_else(|| {
                warn!("Spawn chunk {:?} has no open tile, clearing {:?}", coord, near);
                let (local_x, local_y) = near.local(self.chunk_size);
                if let Some(chunk) = self.chunk_mut(coord) {
                    let ground = chunk.get(local_x, local_y).map_or(Ground::Dirt, |t| t.ground);
                    chunk.set(local_x, local_y, Tile::open(ground));
                }
                near
            });

        spawn_tile.world_centre(self.tile_size)
    }

    /// Number of generated chunks.
    pub fn loaded_count(&self) -> usize {
        self.chunks.values().filter(|chunk| !chunk.pending).count()
    }

    /// Number of chunks waiting for generation.
    pub fn pending_count(&self) -> usize {
        self.chunks.values().filter(|chunk| chunk.pending).count()
    }

    /// Number of generated chunks whose drawing is stale.
    pub fn dirty_count(&self) -> usize {
        self.chunks
            .values()
            .filter(|chunk| !chunk.pending && chunk.dirty)
            .count()
    }
}
