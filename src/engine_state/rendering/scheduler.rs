//! # Render Scheduler
//!
//! Decides which chunks are redrawn each frame.
//!
//! ## Per-frame pass
//! 1. The interest window is every chunk overlapping the viewport, grown by the prefetch
//!    margin and clipped to the world bounds.
//! 2. Visible chunks are the generated chunks in that window. Pending and missing chunks
//!    are skipped.
//! 3. Candidates are visible chunks that are dirty or have no cached draw list. They are
//!    ranked by distance from the camera centre and at most `max_chunks_per_frame` are
//!    rebuilt. A rebuilt chunk has its `dirty` flag cleared; the rest keep theirs and are
//!    reconsidered next frame if still visible. Nothing else is carried over.
//! 4. Every visible chunk with a cached draw list is submitted to the target.
//!
//! ## Draw cache
//! Built draw lists live in an LRU cache keyed by chunk coordinate. The cache grows to
//! hold at least every visible chunk, so only chunks that left the view are evicted.
//! Losing an entry only makes the chunk a candidate again.

use std::num::NonZeroUsize;

use cgmath::MetricSpace;
use log::debug;
use lru::LruCache;

use super::target::{tile_color, RenderTarget, TileQuad};
use crate::engine_state::{
    camera_state::camera::Camera,
    tiles::{
        chunk::Chunk,
        coords::{ChunkCoord, ChunkRect},
        world::TileWorld,
    },
};

/// Counts from one `draw_chunks` pass.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct RenderStats {
    /// Generated chunks in the interest window
    pub visible: usize,
    /// Visible chunks that needed a rebuild
    pub candidates: usize,
    /// Candidates rebuilt this frame
    pub drawn: usize,
    /// Candidates left for a later frame
    pub deferred: usize,
}

pub struct RenderScheduler {
    max_chunks_per_frame: usize,
    prefetch_margin: i32,
    draw_cache: LruCache<ChunkCoord, Vec<TileQuad>>,
}

impl RenderScheduler {
    /// # Arguments
    /// * `max_chunks_per_frame` - Rebuild budget per frame
    /// * `prefetch_margin` - Chunks added around the viewport on every side
    /// * `cache_capacity` - Draw lists kept; zero is treated as one
    pub fn new(max_chunks_per_frame: usize, prefetch_margin: i32, cache_capacity: usize) -> Self {
        RenderScheduler {
            max_chunks_per_frame,
            prefetch_margin: prefetch_margin.max(0),
            draw_cache: LruCache::new(NonZeroUsize::new(cache_capacity).unwrap_or(NonZeroUsize::MIN)),
        }
    }

    pub fn max_chunks_per_frame(&self) -> usize {
        self.max_chunks_per_frame
    }

    /// Number of cached chunk draw lists.
    pub fn cached_chunks(&self) -> usize {
        self.draw_cache.len()
    }

    /// Number of draw lists the cache can hold before evicting.
    pub fn cache_capacity(&self) -> usize {
        self.draw_cache.cap().get()
    }

    /// Chunks overlapping the viewport plus the prefetch margin. Not clipped to the world.
    pub fn interest_window(&self, camera: &Camera, tile_size: f32, chunk_size: usize) -> ChunkRect {
        let (min, max) = camera.visible_world_rect();
        ChunkRect::covering(min, max, tile_size, chunk_size).expand(self.prefetch_margin)
    }

    /// Generated chunks in the interest window, in row order.
    pub fn visible_chunks(&self, world: &TileWorld, camera: &Camera) -> Vec<ChunkCoord> {
        let window = self.interest_window(camera, world.tile_size(), world.chunk_size());
        let window = match world.bounds() {
            Some(bounds) => match window.intersect(&bounds) {
                Some(clipped) => clipped,
                None => return Vec::new(),
            },
            None => window,
        };
        window
            .iter()
            .filter(|coord| world.chunk(*coord).is_some())
            .collect()
    }

    /// Runs one frame of chunk drawing. See the module docs for the steps.
    ///
    /// The target is expected to already carry the camera transform.
    pub fn draw_chunks(
        &mut self,
        world: &mut TileWorld,
        camera: &Camera,
        target: &mut dyn RenderTarget,
    ) -> RenderStats {
        let visible = self.visible_chunks(world, camera);
        if visible.len() > self.draw_cache.cap().get() {
            if let Some(capacity) = NonZeroUsize::new(visible.len()) {
                debug!("Growing draw cache to {} chunks", capacity);
                self.draw_cache.resize(capacity);
            }
        }
        let centre = camera.centre();
        let (tile_size, chunk_size) = (world.tile_size(), world.chunk_size());

        let mut candidates: Vec<(f32, ChunkCoord)> = visible
            .iter()
            .filter(|coord| {
                let dirty = world.chunk(**coord).map_or(false, |chunk| chunk.dirty);
                dirty || !self.draw_cache.contains(*coord)
            })
            .map(|coord| (coord.world_centre(chunk_size, tile_size).distance2(centre), *coord))
            .collect();
        candidates.sort_by(|(da, a), (db, b)| da.total_cmp(db).then(a.y.cmp(&b.y)).then(a.x.cmp(&b.x)));

        let budget = self.max_chunks_per_frame.min(candidates.len());
        for (_, coord) in &candidates[..budget] {
            if let Some(chunk) = world.chunk_mut(*coord) {
                let quads = build_quads(chunk, tile_size);
                self.draw_cache.put(*coord, quads);
                chunk.dirty = false;
            }
        }

        for coord in &visible {
            if let Some(quads) = self.draw_cache.get(coord) {
                target.draw_tile_quads(*coord, quads);
            }
        }

        let stats = RenderStats {
            visible: visible.len(),
            candidates: candidates.len(),
            drawn: budget,
            deferred: candidates.len() - budget,
        };
        if stats.deferred > 0 {
            debug!("Deferred {} chunk redraws", stats.deferred);
        }
        stats
    }

    /// Drops every cached draw list.
    pub fn clear_cache(&mut self) {
        self.draw_cache.clear();
    }
}

/// Builds the world-space draw list of a chunk, one quad per tile.
pub fn build_quads(chunk: &Chunk, tile_size: f32) -> Vec<TileQuad> {
    let size = chunk.size();
    chunk
        .iter()
        .map(|(local_x, local_y, tile)| {
            let origin = chunk
                .position
                .tile_at(local_x, local_y, size)
                .world_origin(tile_size);
            TileQuad {
                origin: [origin.x, origin.y],
                size: tile_size,
                color: tile_color(tile),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::engine_state::rendering::target::RecordingTarget;
    use crate::engine_state::tiles::{
        coords::TileCoord,
        tile::{Ground, Tile, TileKind},
    };

    /// A 6x5 block of generated chunks, all dirty, exactly filling the viewport.
    fn thirty_chunk_setup() -> (TileWorld, Camera) {
        let mut world = TileWorld::new(1.0, 2, None);
        for coord in ChunkRect::new(ChunkCoord::new(0, 0), ChunkCoord::new(5, 4)).iter() {
            world.install_chunk(Chunk::filled(coord, 2, Tile::open(Ground::Dirt)));
        }
        let config = EngineConfig {
            viewport_width: 12.0,
            viewport_height: 10.0,
            default_zoom: 1.0,
            min_zoom: 1.0,
            ..EngineConfig::default()
        };
        let camera = Camera::new(&config);
        (world, camera)
    }

    #[test]
    fn budget_limits_redraws_and_keeps_rest_dirty() {
        let (mut world, camera) = thirty_chunk_setup();
        let mut scheduler = RenderScheduler::new(10, 0, 64);
        let mut target = RecordingTarget::new();

        let stats = scheduler.draw_chunks(&mut world, &camera, &mut target);
        assert_eq!(
            stats,
            RenderStats {
                visible: 30,
                candidates: 30,
                drawn: 10,
                deferred: 20
            }
        );
        assert_eq!(world.dirty_count(), 20);
        assert_eq!(target.drawn_chunks().len(), 10);

        let stats = scheduler.draw_chunks(&mut world, &camera, &mut target);
        assert_eq!(stats.drawn, 10);
        assert_eq!(world.dirty_count(), 10);
        scheduler.draw_chunks(&mut world, &camera, &mut target);
        assert_eq!(world.dirty_count(), 0);

        target.reset();
        let stats = scheduler.draw_chunks(&mut world, &camera, &mut target);
        assert_eq!(stats.candidates, 0);
        assert_eq!(target.drawn_chunks().len(), 30);
    }

    #[test]
    fn nearest_chunks_are_drawn_first() {
        let (mut world, camera) = thirty_chunk_setup();
        let mut scheduler = RenderScheduler::new(2, 0, 64);
        let mut target = RecordingTarget::new();

        // Camera centre (6, 5) sits on the edge shared by chunks (2, 2) and (3, 2).
        scheduler.draw_chunks(&mut world, &camera, &mut target);
        assert_eq!(
            target.drawn_chunks(),
            vec![ChunkCoord::new(2, 2), ChunkCoord::new(3, 2)]
        );
    }

    #[test]
    fn pending_chunks_are_not_visible() {
        let (mut world, camera) = thirty_chunk_setup();
        world.ensure_loaded(ChunkCoord::new(0, 5));
        let mut scheduler = RenderScheduler::new(100, 1, 64);
        let stats = scheduler.draw_chunks(&mut world, &camera, &mut RecordingTarget::new());
        assert_eq!(stats.visible, 30);
    }

    #[test]
    fn edits_make_cached_chunks_candidates_again() {
        let (mut world, camera) = thirty_chunk_setup();
        let mut scheduler = RenderScheduler::new(100, 0, 64);
        scheduler.draw_chunks(&mut world, &camera, &mut RecordingTarget::new());
        assert_eq!(world.dirty_count(), 0);

        world.place_tile(TileCoord::new(0, 0), TileKind::Solid);
        let stats = scheduler.draw_chunks(&mut world, &camera, &mut RecordingTarget::new());
        assert_eq!(stats.candidates, 1);
        assert_eq!(stats.drawn, 1);
    }

    #[test]
    fn cache_grows_to_hold_the_visible_set() {
        let (mut world, camera) = thirty_chunk_setup();
        let mut scheduler = RenderScheduler::new(10, 0, 8);
        let mut target = RecordingTarget::new();

        for _ in 0..3 {
            let stats = scheduler.draw_chunks(&mut world, &camera, &mut target);
            assert_eq!(stats.drawn, 10);
        }
        assert_eq!(scheduler.cache_capacity(), 30);
        assert_eq!(world.dirty_count(), 0);

        target.reset();
        let stats = scheduler.draw_chunks(&mut world, &camera, &mut target);
        assert_eq!(stats.candidates, 0);
        assert_eq!(target.drawn_chunks().len(), 30);
    }

    #[test]
    fn chunks_that_left_the_view_are_evicted_and_rebuilt() {
        let (mut world, mut camera) = thirty_chunk_setup();
        for coord in ChunkRect::new(ChunkCoord::new(6, 0), ChunkCoord::new(11, 4)).iter() {
            world.install_chunk(Chunk::filled(coord, 2, Tile::open(Ground::Grass)));
        }
        let mut scheduler = RenderScheduler::new(100, 0, 30);
        scheduler.draw_chunks(&mut world, &camera, &mut RecordingTarget::new());

        camera.move_by(cgmath::Vector2::new(12.0, 0.0));
        let stats = scheduler.draw_chunks(&mut world, &camera, &mut RecordingTarget::new());
        assert_eq!(stats.drawn, 30);
        assert_eq!(scheduler.cached_chunks(), 30);

        camera.move_by(cgmath::Vector2::new(-12.0, 0.0));
        let stats = scheduler.draw_chunks(&mut world, &camera, &mut RecordingTarget::new());
        assert_eq!(stats.candidates, 30);
    }

    #[test]
    fn quads_cover_the_chunk_in_world_space() {
        let chunk = Chunk::filled(ChunkCoord::new(-1, 2), 2, Tile::open(Ground::Grass));
        let quads = build_quads(&chunk, 16.0);
        assert_eq!(quads.len(), 4);
        assert_eq!(quads[0].origin, [-32.0, 64.0]);
        assert_eq!(quads[3].origin, [-16.0, 80.0]);
    }
}
