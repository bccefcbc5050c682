//! # Player
//!
//! The locally controlled entity. Its position is validated on entry: a non-finite
//! position is never stored, so nothing downstream has to patch NaNs.

use cgmath::{Point2, Vector2, Zero};
use log::warn;
use serde::Serialize;

use super::{
    physics::{
        collision::{self, Aabb},
        movement::MovementIntent,
    },
    tiles::world::TileWorld,
};
use crate::config::EngineConfig;

/// Network snapshot of the player, sent by the host's transport.
#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
pub struct PlayerSnapshot {
    pub x: f32,
    pub y: f32,
    pub health: f32,
}

#[derive(Debug, Clone)]
pub struct Player {
    position: Point2<f32>,
    half_extents: Vector2<f32>,
    /// Displacement accepted during the last step.
    velocity: Vector2<f32>,
    speed: f32,
    health: f32,
    max_health: f32,
}

impl Player {
    /// Creates a player at `position`, or at `fallback` if `position` is not finite.
    ///
    /// `fallback` is expected to come from [`TileWorld::spawn_point`] and is always finite.
    pub fn new(position: Point2<f32>, fallback: Point2<f32>, config: &EngineConfig) -> Self {
        let position = if is_finite(position) {
            position
        } else {
            warn!("Player position {:?} is not finite, spawning at {:?}", position, fallback);
            fallback
        };
        Player {
            position,
            half_extents: Vector2::new(config.player_width / 2.0, config.player_height / 2.0),
            velocity: Vector2::zero(),
            speed: config.player_speed,
            health: config.max_health,
            max_health: config.max_health,
        }
    }

    pub fn position(&self) -> Point2<f32> {
        self.position
    }

    pub fn half_extents(&self) -> Vector2<f32> {
        self.half_extents
    }

    pub fn velocity(&self) -> Vector2<f32> {
        self.velocity
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn health(&self) -> f32 {
        self.health
    }

    pub fn max_health(&self) -> f32 {
        self.max_health
    }

    pub fn aabb(&self) -> Aabb {
        Aabb::new(self.position, self.half_extents)
    }

    /// Teleports the player. Non-finite positions are rejected.
    ///
    /// # Returns
    /// `true` if the position was applied.
    pub fn set_position(&mut self, position: Point2<f32>) -> bool {
        if !is_finite(position) {
            warn!("Ignoring non-finite player position {:?}", position);
            return false;
        }
        self.position = position;
        true
    }

    /// Moves the player for one frame, sliding along solid tiles.
    ///
    /// # Arguments
    /// * `intent` - Direction keys held this frame
    /// * `dt` - Frame time in seconds
    /// * `world` - The world to collide against
    ///
    /// # Returns
    /// The displacement actually applied.
    pub fn step(&mut self, intent: MovementIntent, dt: f32, world: &TileWorld) -> Vector2<f32> {
        let proposed = intent.displacement(self.speed, dt);
        let accepted = collision::resolve(&self.aabb(), proposed, world);
        self.position += accepted;
        self.velocity = accepted;
        accepted
    }

    pub fn take_damage(&mut self, amount: f32) {
        if amount.is_finite() && amount > 0.0 {
            self.health = (self.health - amount).max(0.0);
        }
    }

    pub fn heal(&mut self, amount: f32) {
        if amount.is_finite() && amount > 0.0 {
            self.health = (self.health + amount).min(self.max_health);
        }
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0.0
    }

    pub fn snapshot(&self) -> PlayerSnapshot {
        PlayerSnapshot {
            x: self.position.x,
            y: self.position.y,
            health: self.health,
        }
    }
}

fn is_finite(point: Point2<f32>) -> bool {
    point.x.is_finite() && point.y.is_finite()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::tiles::{
        chunk::Chunk,
        coords::{ChunkCoord, ChunkRect, TileCoord},
        tile::{Ground, Tile, TileKind},
    };

    fn open_world() -> TileWorld {
        let mut world = TileWorld::new(16.0, 16, None);
        for coord in ChunkRect::around(ChunkCoord::new(0, 0), 1).iter() {
            world.install_chunk(Chunk::filled(coord, 16, Tile::open(Ground::Dirt)));
        }
        world
    }

    #[test]
    fn non_finite_spawn_uses_fallback() {
        let config = EngineConfig::default();
        let player = Player::new(Point2::new(f32::NAN, 1.0), Point2::new(40.0, 56.0), &config);
        assert_eq!(player.position(), Point2::new(40.0, 56.0));
        assert_eq!(player.health(), config.max_health);
    }

    #[test]
    fn set_position_rejects_infinity() {
        let mut player = Player::new(Point2::new(1.0, 2.0), Point2::new(0.0, 0.0), &EngineConfig::default());
        assert!(!player.set_position(Point2::new(f32::INFINITY, 0.0)));
        assert_eq!(player.position(), Point2::new(1.0, 2.0));
        assert!(player.set_position(Point2::new(-3.0, 4.0)));
        assert_eq!(player.position(), Point2::new(-3.0, 4.0));
    }

    #[test]
    fn health_is_clamped() {
        let mut player = Player::new(Point2::new(0.0, 0.0), Point2::new(0.0, 0.0), &EngineConfig::default());
        player.take_damage(30.0);
        assert_eq!(player.health(), 70.0);
        player.heal(500.0);
        assert_eq!(player.health(), 100.0);
        player.take_damage(1000.0);
        assert_eq!(player.health(), 0.0);
        assert!(!player.is_alive());
        player.take_damage(f32::NAN);
        assert_eq!(player.health(), 0.0);
    }

    #[test]
    fn step_moves_and_slides() {
        let mut world = open_world();
        world.place_tile(TileCoord::new(5, 5), TileKind::Solid);
        let mut player = Player::new(Point2::new(71.0, 88.0), Point2::new(0.0, 0.0), &EngineConfig::default());

        // Right and down for 0.02 s at 200 units/s: 2.83 units per axis.
        let moved = player.step(MovementIntent { x: 1, y: 1 }, 0.02, &world);
        assert_eq!(moved.x, 0.0);
        assert!(moved.y > 2.8);
        assert_eq!(player.position().x, 71.0);
        assert_eq!(player.velocity(), moved);

        let snapshot = player.snapshot();
        assert_eq!(snapshot.x, 71.0);
        assert_eq!(snapshot.health, 100.0);
    }
}
