//! # Collision Resolution
//!
//! Entities collide with the world as axis-aligned boxes. A proposed displacement is
//! resolved one axis at a time: the X move is tested with the box at `(x + dx, y)` and
//! kept only if the box overlaps no solid tile, then the Y move is tested from the
//! (possibly moved) X position. Blocked horizontal motion therefore never blocks vertical
//! motion, which gives wall sliding without a sweep solver.
//!
//! A box overlaps every tile its extent touches. The max edges are half-open, so a box
//! resting flush against a tile does not collide with it.
//!
//! Resolution only reads the world and uses no randomness, so the same box, displacement
//! and tiles always give the same answer.

use cgmath::{Point2, Vector2, Zero};

use crate::engine_state::tiles::{coords::TileCoord, world::TileWorld};

/// An axis-aligned bounding box in world units.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Aabb {
    pub centre: Point2<f32>,
    /// Half the width and half the height.
    pub half_extents: Vector2<f32>,
}

impl Aabb {
    pub fn new(centre: Point2<f32>, half_extents: Vector2<f32>) -> Self {
        Aabb {
            centre,
            half_extents,
        }
    }

    pub fn min(&self) -> Point2<f32> {
        self.centre - self.half_extents
    }

    pub fn max(&self) -> Point2<f32> {
        self.centre + self.half_extents
    }

    /// The same box moved by `offset`.
    pub fn translated(&self, offset: Vector2<f32>) -> Self {
        Aabb::new(self.centre + offset, self.half_extents)
    }

    /// The inclusive range of tiles the box overlaps, as `(min, max)`.
    pub fn tile_span(&self, tile_size: f32) -> (TileCoord, TileCoord) {
        let min = self.min();
        let max = self.max();
        let min_x = (min.x / tile_size).floor() as i32;
        let min_y = (min.y / tile_size).floor() as i32;
        let max_x = ((max.x / tile_size).ceil() as i32 - 1).max(min_x);
        let max_y = ((max.y / tile_size).ceil() as i32 - 1).max(min_y);
        (TileCoord::new(min_x, min_y), TileCoord::new(max_x, max_y))
    }
}

/// Whether any tile overlapped by `aabb` is solid.
pub fn overlaps_solid(aabb: &Aabb, world: &TileWorld) -> bool {
    let (min, max) = aabb.tile_span(world.tile_size());
    (min.y..=max.y).any(|y| (min.x..=max.x).any(|x| world.is_solid(TileCoord::new(x, y))))
}

/// Resolves a proposed displacement against the world, one axis at a time.
///
/// # Arguments
/// * `aabb` - The entity's box at its current position
/// * `proposed` - The displacement the entity wants to make this frame
/// * `world` - The world to collide against
///
/// # Returns
/// The accepted displacement. Each component is either the proposed one or zero.
/// Non-finite components are never accepted.
pub fn resolve(aabb: &Aabb, proposed: Vector2<f32>, world: &TileWorld) -> Vector2<f32> {
    let mut accepted = Vector2::zero();

    if proposed.x.is_finite() && proposed.x != 0.0 {
        let moved = aabb.translated(Vector2::new(proposed.x, 0.0));
        if !overlaps_solid(&moved, world) {
            accepted.x = proposed.x;
        }
    }

    if proposed.y.is_finite() && proposed.y != 0.0 {
        let moved = aabb.translated(Vector2::new(accepted.x, proposed.y));
        if !overlaps_solid(&moved, world) {
            accepted.y = proposed.y;
        }
    }

    accepted
}
