//! # Tile and Chunk Coordinates
//!
//! The world uses three coordinate spaces:
//!
//! * **World space** - continuous `f32` units, where entities live
//! * **Tile space** - integer tile indices, `tile = floor(world / tile_size)`
//! * **Chunk space** - integer chunk indices, `chunk = floor(tile / chunk_size)`
//!
//! All divisions are floored so negative coordinates map to the tile or chunk on their
//! left/top, and local indices inside a chunk are always in `[0, chunk_size)`.

use cgmath::Point2;

/// Integer position of a single tile.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileCoord {
    pub x: i32,
    pub y: i32,
}

/// Integer position of a chunk. Used directly as the world's map key.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChunkCoord {
    pub x: i32,
    pub y: i32,
}

impl TileCoord {
    pub const fn new(x: i32, y: i32) -> Self {
        TileCoord { x, y }
    }

    /// Returns the tile containing the world-space point.
    ///
    /// # Arguments
    /// * `world` - A point in world units
    /// * `tile_size` - World units per tile edge
    pub fn from_world(world: Point2<f32>, tile_size: f32) -> Self {
        TileCoord {
            x: (world.x / tile_size).floor() as i32,
            y: (world.y / tile_size).floor() as i32,
        }
    }

    /// Returns the chunk this tile belongs to.
    pub fn chunk(&self, chunk_size: usize) -> ChunkCoord {
        let size = chunk_size as i32;
        ChunkCoord {
            x: self.x.div_euclid(size),
            y: self.y.div_euclid(size),
        }
    }

    /// Returns the tile's position inside its chunk, each component in `[0, chunk_size)`.
    pub fn local(&self, chunk_size: usize) -> (usize, usize) {
        let size = chunk_size as i32;
        (
            self.x.rem_euclid(size) as usize,
            self.y.rem_euclid(size) as usize,
        )
    }

    /// World-space position of the tile's top-left corner.
    pub fn world_origin(&self, tile_size: f32) -> Point2<f32> {
        Point2::new(self.x as f32 * tile_size, self.y as f32 * tile_size)
    }

    /// World-space position of the tile's centre.
    pub fn world_centre(&self, tile_size: f32) -> Point2<f32> {
        Point2::new(
            (self.x as f32 + 0.5) * tile_size,
            (self.y as f32 + 0.5) * tile_size,
        )
    }
}

impl ChunkCoord {
    pub const fn new(x: i32, y: i32) -> Self {
        ChunkCoord { x, y }
    }

    /// The tile at local index `(0, 0)` of this chunk.
    pub fn origin_tile(&self, chunk_size: usize) -> TileCoord {
        let size = chunk_size as i32;
        TileCoord::new(self.x * size, self.y * size)
    }

    /// The tile at a local index of this chunk.
    pub fn tile_at(&self, local_x: usize, local_y: usize, chunk_size: usize) -> TileCoord {
        let origin = self.origin_tile(chunk_size);
        TileCoord::new(origin.x + local_x as i32, origin.y + local_y as i32)
    }

    /// World-space centre of the chunk.
    pub fn world_centre(&self, chunk_size: usize, tile_size: f32) -> Point2<f32> {
        let edge = chunk_size as f32 * tile_size;
        Point2::new((self.x as f32 + 0.5) * edge, (self.y as f32 + 0.5) * edge)
    }
}

/// An inclusive rectangle of chunk coordinates.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ChunkRect {
    pub min: ChunkCoord,
    pub max: ChunkCoord,
}

impl ChunkRect {
    pub fn new(min: ChunkCoord, max: ChunkCoord) -> Self {
        ChunkRect { min, max }
    }

    /// A square of chunks `radius` wide on each side of `centre`.
    pub fn around(centre: ChunkCoord, radius: i32) -> Self {
        ChunkRect::new(
            ChunkCoord::new(centre.x - radius, centre.y - radius),
            ChunkCoord::new(centre.x + radius, centre.y + radius),
        )
    }

    /// The chunks overlapped by a world-space rectangle. The max edge is exclusive, so a
    /// rectangle ending exactly on a chunk boundary does not include the next chunk.
    ///
    /// # Arguments
    /// * `min` - Top-left corner in world units
    /// * `max` - Bottom-right corner in world units
    /// * `tile_size` - World units per tile edge
    /// * `chunk_size` - Tiles per chunk edge
    pub fn covering(min: Point2<f32>, max: Point2<f32>, tile_size: f32, chunk_size: usize) -> Self {
        let edge = tile_size * chunk_size as f32;
        let min_x = (min.x / edge).floor() as i32;
        let min_y = (min.y / edge).floor() as i32;
        let max_x = ((max.x / edge).ceil() as i32 - 1).max(min_x);
        let max_y = ((max.y / edge).ceil() as i32 - 1).max(min_y);
        ChunkRect::new(ChunkCoord::new(min_x, min_y), ChunkCoord::new(max_x, max_y))
    }

    /// Grows the rectangle by `margin` chunks on every side.
    pub fn expand(&self, margin: i32) -> Self {
        ChunkRect::new(
            ChunkCoord::new(self.min.x - margin, self.min.y - margin),
            ChunkCoord::new(self.max.x + margin, self.max.y + margin),
        )
    }

    /// Intersection of two rectangles, or `None` when they do not overlap.
    pub fn intersect(&self, other: &ChunkRect) -> Option<Self> {
        let min = ChunkCoord::new(self.min.x.max(other.min.x), self.min.y.max(other.min.y));
        let max = ChunkCoord::new(self.max.x.min(other.max.x), self.max.y.min(other.max.y));
        (min.x <= max.x && min.y <= max.y).then(|| ChunkRect::new(min, max))
    }

    pub fn contains(&self, coord: ChunkCoord) -> bool {
        (self.min.x..=self.max.x).contains(&coord.x) && (self.min.y..=self.max.y).contains(&coord.y)
    }

    /// Number of chunks in the rectangle.
    pub fn len(&self) -> usize {
        let width = (self.max.x - self.min.x + 1).max(0) as usize;
        let height = (self.max.y - self.min.y + 1).max(0) as usize;
        width * height
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterates row by row over every chunk in the rectangle.
    pub fn iter(&self) -> impl Iterator<Item = ChunkCoord> {
        let ChunkRect { min, max } = *self;
        (min.y..=max.y).flat_map(move |y| (min.x..=max.x).map(move |x| ChunkCoord::new(x, y)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn world_to_tile_to_chunk_is_floored() {
        let tile_size = 16.0;
        let chunk_size = 16;
        for &x in &[-1000.5_f32, -257.0, -256.0, -16.0, -0.25, 0.0, 15.99, 16.0, 255.0, 256.0, 4097.3] {
            let tile = TileCoord::from_world(Point2::new(x, -x), tile_size);
            assert_eq!(tile.x, (x / tile_size).floor() as i32);
            assert_eq!(tile.y, (-x / tile_size).floor() as i32);

            let chunk = tile.chunk(chunk_size);
            assert_eq!(chunk.x, (tile.x as f32 / chunk_size as f32).floor() as i32);

            let (lx, ly) = tile.local(chunk_size);
            assert!(lx < chunk_size && ly < chunk_size);
            assert_eq!(tile.x - chunk.x * chunk_size as i32, lx as i32);
            assert_eq!(tile.y - chunk.y * chunk_size as i32, ly as i32);
            assert_eq!(chunk.tile_at(lx, ly, chunk_size), tile);
        }
    }

    #[test]
    fn negative_tiles_belong_to_negative_chunks() {
        let tile = TileCoord::new(-1, -17);
        assert_eq!(tile.chunk(16), ChunkCoord::new(-1, -2));
        assert_eq!(tile.local(16), (15, 15));
    }

    #[test]
    fn covering_excludes_chunk_on_exact_boundary() {
        let rect = ChunkRect::covering(Point2::new(0.0, 0.0), Point2::new(512.0, 256.0), 16.0, 16);
        assert_eq!(rect, ChunkRect::new(ChunkCoord::new(0, 0), ChunkCoord::new(1, 0)));
        assert_eq!(rect.len(), 2);

        let rect = ChunkRect::covering(Point2::new(-1.0, -1.0), Point2::new(1.0, 1.0), 16.0, 16);
        assert_eq!(rect.len(), 4);
    }

    #[test]
    fn rect_iteration_and_intersection() {
        let rect = ChunkRect::around(ChunkCoord::new(0, 0), 1);
        assert_eq!(rect.iter().count(), 9);
        assert!(rect.iter().all(|c| rect.contains(c)));

        let other = ChunkRect::new(ChunkCoord::new(1, 1), ChunkCoord::new(5, 5));
        assert_eq!(
            rect.intersect(&other),
            Some(ChunkRect::new(ChunkCoord::new(1, 1), ChunkCoord::new(1, 1)))
        );
        assert_eq!(rect.intersect(&other.expand(-1).expand(-1)), None);
    }
}
