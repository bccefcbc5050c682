//! # Chunk Generation
//!
//! Chunk contents come from a [`ChunkGenerator`]. Generators are shared with the worker
//! threads, so they must be `Send + Sync` and must not touch the world directly: they
//! return tiles, and the world installs them at the next frame boundary.
//!
//! Available generators:
//! - [`TerrainGenerator`]: sine-field ground with noise-placed trees, rocks and stone
//! - [`FlatGenerator`]: open ground everywhere, useful for tests and building
//! - [`TextChunkSource`]: decodes chunks served as digit strings by a chunk server

use std::f64::consts::PI;

use noise::{NoiseFn, Perlin};
use num_traits::FromPrimitive;
use thiserror::Error;

use super::coords::ChunkCoord;
use super::tile::{Ground, Material, ResourceDrop, ResourceType, Tile, TileKind};

/// Reasons a chunk payload could not be decoded.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PayloadError {
    #[error("payload has {actual} tiles, expected {expected}")]
    WrongLength { expected: usize, actual: usize },
    #[error("invalid tile digit {found:?} at index {index}")]
    InvalidDigit { index: usize, found: char },
}

/// Reasons a generator could not produce a chunk. The chunk stays pending.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error(transparent)]
    Payload(#[from] PayloadError),
    #[error("chunk fetch failed: {0}")]
    Fetch(String),
}

/// Produces the tiles of one chunk, row-major, `chunk_size * chunk_size` long.
pub trait ChunkGenerator: Send + Sync {
    fn generate(&self, position: ChunkCoord, chunk_size: usize) -> Result<Vec<Tile>, GenerationError>;
}

/// Open ground with nothing on it.
pub struct FlatGenerator {
    pub ground: Ground,
}

impl Default for FlatGenerator {
    fn default() -> Self {
        FlatGenerator {
            ground: Ground::Dirt,
        }
    }
}

impl ChunkGenerator for FlatGenerator {
    fn generate(&self, _position: ChunkCoord, chunk_size: usize) -> Result<Vec<Tile>, GenerationError> {
        Ok(vec![Tile::open(self.ground); chunk_size * chunk_size])
    }
}

/// Ground field threshold above which a tile is grass.
pub const GRASS_THRESHOLD: f64 = 0.2;
/// Scale applied to tile coordinates when sampling Perlin noise for obstacles.
pub const OBSTACLE_SCALE_FACTOR: f64 = 0.08;
/// Perlin value above which a tile is an unbreakable stone outcrop.
pub const STONE_THRESHOLD: f64 = 0.55;
/// Chance of a tree on an open grass tile.
pub const TREE_DENSITY: f32 = 0.06;
/// Chance of a rock on an open dirt tile.
pub const ROCK_DENSITY: f32 = 0.025;

/// Deterministic terrain: the same seed and position always produce the same chunk.
pub struct TerrainGenerator {
    seed: u32,
    perlin: Perlin,
}

impl TerrainGenerator {
    pub fn new(seed: u32) -> Self {
        TerrainGenerator {
            seed,
            perlin: Perlin::new(seed),
        }
    }

    /// Dirt/grass field shared with the chunk server.
    pub fn ground_at(tile_x: i32, tile_y: i32) -> Ground {
        let (x, y) = (tile_x as f64, tile_y as f64);
        let field = (x * 0.1).sin() * (y * 0.1).cos() + (x * 0.03 + y * 0.03).sin() * 0.5;
        if field > GRASS_THRESHOLD {
            Ground::Grass
        } else {
            Ground::Dirt
        }
    }

    fn chunk_rng(&self, position: ChunkCoord) -> fastrand::Rng {
        let x = (position.x as u32 as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15);
        let y = (position.y as u32 as u64).wrapping_mul(0xC2B2_AE3D_27D4_EB4F);
        fastrand::Rng::with_seed(((self.seed as u64) << 32) ^ x ^ y.rotate_left(17))
    }

    fn obstacle_sample(&self, tile_x: i32, tile_y: i32) -> f64 {
        // Offset by PI so integer tile coordinates never land on Perlin lattice points.
        self.perlin.get([
            tile_x as f64 * OBSTACLE_SCALE_FACTOR + PI,
            tile_y as f64 * OBSTACLE_SCALE_FACTOR + PI,
        ])
    }
}

impl ChunkGenerator for TerrainGenerator {
    fn generate(&self, position: ChunkCoord, chunk_size: usize) -> Result<Vec<Tile>, GenerationError> {
        let mut rng = self.chunk_rng(position);
        let mut tiles = Vec::with_capacity(chunk_size * chunk_size);

        for local_y in 0..chunk_size {
            for local_x in 0..chunk_size {
                let tile = position.tile_at(local_x, local_y, chunk_size);
                let ground = Self::ground_at(tile.x, tile.y);
                // Always draw, so one tile's outcome never shifts the rest of the chunk.
                let roll = rng.f32();

                let kind = if self.obstacle_sample(tile.x, tile.y) > STONE_THRESHOLD {
                    TileKind::Solid
                } else if ground == Ground::Grass && roll < TREE_DENSITY {
                    TileKind::Resource {
                        material: Material::Tree,
                        drop: ResourceDrop::new(ResourceType::Wood, rng.u32(1..=3)),
                    }
                } else if ground == Ground::Dirt && roll < ROCK_DENSITY {
                    TileKind::Resource {
                        material: Material::Rock,
                        drop: ResourceDrop::new(ResourceType::Stone, rng.u32(1..=2)),
                    }
                } else {
                    TileKind::Empty
                };

                tiles.push(Tile::new(ground, kind));
            }
        }

        Ok(tiles)
    }
}

/// Decodes a chunk served as text: one digit per tile, row-major, `0` dirt and `1` grass.
pub fn decode_ground_payload(payload: &str, chunk_size: usize) -> Result<Vec<Ground>, PayloadError> {
    let payload = payload.trim();
    let expected = chunk_size * chunk_size;
    let actual = payload.chars().count();
    if actual != expected {
        return Err(PayloadError::WrongLength { expected, actual });
    }

    payload
        .chars()
        .enumerate()
        .map(|(index, found)| {
            found
                .to_digit(10)
                .and_then(|digit| Ground::from_u32(digit))
                .filter(|ground| *ground != Ground::Void)
                .ok_or(PayloadError::InvalidDigit { index, found })
        })
        .collect()
}

/// Fetches the text payload of a chunk. Supplied by the host, which owns the transport.
pub type ChunkFetch = dyn Fn(ChunkCoord) -> Result<String, String> + Send + Sync;

/// Generator backed by a remote chunk server.
pub struct TextChunkSource {
    fetch: Box<ChunkFetch>,
}

impl TextChunkSource {
    pub fn new(fetch: impl Fn(ChunkCoord) -> Result<String, String> + Send + Sync + 'static) -> Self {
        TextChunkSource {
            fetch: Box::new(fetch),
        }
    }
}

impl ChunkGenerator for TextChunkSource {
    fn generate(&self, position: ChunkCoord, chunk_size: usize) -> Result<Vec<Tile>, GenerationError> {
        let payload = (self.fetch)(position).map_err(GenerationError::Fetch)?;
        let grounds = decode_ground_payload(&payload, chunk_size)?;
        Ok(grounds.into_iter().map(Tile::open).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terrain_is_deterministic_per_seed() {
        let a = TerrainGenerator::new(7);
        let b = TerrainGenerator::new(7);
        let position = ChunkCoord::new(-3, 12);
        assert_eq!(a.generate(position, 16).unwrap(), b.generate(position, 16).unwrap());
    }

    #[test]
    fn terrain_fills_the_whole_chunk() {
        let tiles = TerrainGenerator::new(1).generate(ChunkCoord::new(0, 0), 16).unwrap();
        assert_eq!(tiles.len(), 256);
        assert!(tiles.iter().all(|t| t.ground != Ground::Void));
        for tile in &tiles {
            if let TileKind::Resource { drop, .. } = tile.kind {
                assert!(drop.amount >= 1);
            }
        }
    }

    #[test]
    fn ground_field_matches_server_formula() {
        // sin(1.0) * cos(0.0) + 0.5 * sin(0.3) > 0.2
        assert_eq!(TerrainGenerator::ground_at(10, 0), Ground::Grass);
        // sin(0) * cos(0) + 0.5 * sin(0) = 0
        assert_eq!(TerrainGenerator::ground_at(0, 0), Ground::Dirt);
    }

    #[test]
    fn payload_decodes_digits() {
        let grounds = decode_ground_payload("0110", 2).unwrap();
        assert_eq!(grounds, vec![Ground::Dirt, Ground::Grass, Ground::Grass, Ground::Dirt]);
    }

    #[test]
    fn payload_errors_are_reported() {
        assert_eq!(
            decode_ground_payload("010", 2),
            Err(PayloadError::WrongLength { expected: 4, actual: 3 })
        );
        assert_eq!(
            decode_ground_payload("01x0", 2),
            Err(PayloadError::InvalidDigit { index: 2, found: 'x' })
        );
        assert_eq!(
            decode_ground_payload("0120", 2),
            Err(PayloadError::InvalidDigit { index: 2, found: '2' })
        );
    }

    #[test]
    fn text_source_surfaces_fetch_failures() {
        let source = TextChunkSource::new(|position| {
            if position.x == 0 {
                Ok("1111".to_string())
            } else {
                Err("connection refused".to_string())
            }
        });
        let tiles = source.generate(ChunkCoord::new(0, 0), 2).unwrap();
        assert!(tiles.iter().all(|t| *t == Tile::open(Ground::Grass)));
        assert!(matches!(
            source.generate(ChunkCoord::new(1, 0), 2),
            Err(GenerationError::Fetch(_))
        ));
    }
}
