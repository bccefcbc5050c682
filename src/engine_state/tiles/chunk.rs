//! # Chunk Module
//!
//! A chunk is a square `chunk_size x chunk_size` grid of tiles and the unit of loading,
//! dirty tracking and drawing.
//!
//! ## Storage
//!
//! Tiles are stored row-major (`index = y * size + x`). Alongside them the chunk keeps a
//! `solid_array` bit vector, one bit per tile, so collision checks never need to inspect
//! the full tile value. Every write goes through [`Chunk::set`], which keeps the two in
//! step.
//!
//! ## Lifecycle
//!
//! * `pending` - requested but not generated yet; holds no tiles and reads as empty
//! * loaded - generated tiles installed, `pending == false`
//! * `dirty` - tile data changed since the chunk was last drawn

use bitvec::vec::BitVec;

use super::coords::ChunkCoord;
use super::tile::Tile;

pub struct Chunk {
    /// The position of this chunk in chunk coordinates.
    pub position: ChunkCoord,
    size: usize,
    tiles: Vec<Tile>,
    /// One bit per tile, set when the tile is solid.
    solid_array: BitVec,
    /// Drawn representation is stale.
    pub dirty: bool,
    /// Generation has not completed.
    pub pending: bool,
}

impl Chunk {
    /// Creates a placeholder for a chunk whose generation is in flight.
    pub fn pending(position: ChunkCoord, size: usize) -> Self {
        Chunk {
            position,
            size,
            tiles: Vec::new(),
            solid_array: BitVec::new(),
            dirty: false,
            pending: true,
        }
    }

    /// Builds a loaded chunk from generated tiles in row-major order.
    ///
    /// The chunk starts dirty so it is drawn once it becomes visible. Missing tiles are
    /// filled with the sentinel and extra tiles are dropped, so the grid is always exactly
    /// `size * size`.
    pub fn from_tiles(position: ChunkCoord, size: usize, mut tiles: Vec<Tile>) -> Self {
        let area = size * size;
        if tiles.len() != area {
            log::warn!(
                "Chunk {:?} built from {} tiles, expected {}",
                position,
                tiles.len(),
                area
            );
            tiles.resize(area, Tile::SENTINEL);
        }
        let solid_array = tiles.iter().map(Tile::is_solid).collect::<BitVec>();
        Chunk {
            position,
            size,
            tiles,
            solid_array,
            dirty: true,
            pending: false,
        }
    }

    /// Builds a loaded chunk where every tile is `tile`.
    pub fn filled(position: ChunkCoord, size: usize, tile: Tile) -> Self {
        Chunk::from_tiles(position, size, vec![tile; size * size])
    }

    /// Tiles per chunk edge.
    pub fn size(&self) -> usize {
        self.size
    }

    fn index(&self, local_x: usize, local_y: usize) -> Option<usize> {
        (local_x < self.size && local_y < self.size).then(|| local_y * self.size + local_x)
    }

    /// Returns the tile at a local index, or `None` while pending or out of range.
    pub fn get(&self, local_x: usize, local_y: usize) -> Option<&Tile> {
        if self.pending {
            return None;
        }
        self.index(local_x, local_y).and_then(|i| self.tiles.get(i))
    }

    /// Solidity of the tile at a local index. Pending chunks are never solid.
    pub fn is_solid(&self, local_x: usize, local_y: usize) -> bool {
        if self.pending {
            return false;
        }
        self.index(local_x, local_y)
            .and_then(|i| self.solid_array.get(i).map(|bit| *bit))
            .unwrap_or(false)
    }

    /// Overwrites a tile and marks the chunk dirty.
    ///
    /// # Returns
    /// `false` without touching anything if the chunk is pending or the index is out of range.
    pub fn set(&mut self, local_x: usize, local_y: usize, tile: Tile) -> bool {
        if self.pending {
            return false;
        }
        let Some(index) = self.index(local_x, local_y) else {
            return false;
        };
        self.tiles[index] = tile;
        self.solid_array.set(index, tile.is_solid());
        self.dirty = true;
        true
    }

    /// Iterates over `(local_x, local_y, tile)` in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, &Tile)> + '_ {
        let size = self.size;
        self.tiles
            .iter()
            .enumerate()
            .map(move |(i, tile)| (i % size, i / size, tile))
    }

    /// Number of solid tiles in the chunk.
    pub fn solid_count(&self) -> usize {
        self.solid_array.count_ones()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::tiles::tile::{Ground, TileKind};

    #[test]
    fn pending_chunk_reads_as_nothing() {
        let chunk = Chunk::pending(ChunkCoord::new(0, 0), 4);
        assert!(chunk.get(0, 0).is_none());
        assert!(!chunk.is_solid(0, 0));
    }

    #[test]
    fn set_keeps_solidity_bits_in_step() {
        let mut chunk = Chunk::filled(ChunkCoord::new(2, -1), 4, Tile::open(Ground::Dirt));
        chunk.dirty = false;
        assert_eq!(chunk.solid_count(), 0);

        assert!(chunk.set(3, 1, Tile::new(Ground::Dirt, TileKind::Solid)));
        assert!(chunk.is_solid(3, 1));
        assert!(!chunk.is_solid(1, 3));
        assert!(chunk.dirty);
        assert_eq!(chunk.solid_count(), 1);

        assert!(chunk.set(3, 1, Tile::open(Ground::Grass)));
        assert!(!chunk.is_solid(3, 1));
        assert_eq!(chunk.get(3, 1).map(|t| t.ground), Some(Ground::Grass));
    }

    #[test]
    fn out_of_range_indices_are_rejected() {
        let mut chunk = Chunk::filled(ChunkCoord::new(0, 0), 4, Tile::open(Ground::Dirt));
        assert!(chunk.get(4, 0).is_none());
        assert!(!chunk.set(0, 4, Tile::new(Ground::Dirt, TileKind::Solid)));
    }

    #[test]
    fn short_tile_list_is_padded() {
        let chunk = Chunk::from_tiles(ChunkCoord::new(0, 0), 2, vec![Tile::open(Ground::Dirt)]);
        assert_eq!(chunk.iter().count(), 4);
        assert_eq!(chunk.get(1, 1), Some(&Tile::SENTINEL));
        assert_eq!(chunk.iter().nth(2).map(|(x, y, _)| (x, y)), Some((0, 1)));
    }
}
