//! # Camera State Management
//!
//! This module handles all camera-related functionality including:
//! - Camera position and zoom tracking
//! - Following the player, or free panning when freelook is on
//! - Player input processing for camera control
//! - Chunk visibility determination based on camera position
//!
//! ## Core Components
//! - `Camera`: the camera's position, zoom and the screen/world transform
//! - `CameraController`: collects pan and zoom input between updates
//! - `CameraState`: ties the two together and reports visibility changes

use camera::{Camera, CameraController};
use cgmath::Point2;

use super::{tiles::coords::ChunkRect, PlayerAction};
use crate::config::EngineConfig;

pub mod camera;

/// Manages the complete camera system.
///
/// # Fields
/// - `camera`: The current camera state (position, zoom)
/// - `camera_controller`: Handles player input and camera movement
/// - `visible_chunks`: The chunks covered by the viewport after the last update
pub struct CameraState {
    pub camera: Camera,
    pub camera_controller: CameraController,
    visible_chunks: ChunkRect,
    tile_size: f32,
    chunk_size: usize,
}

impl CameraState {
    /// Creates a new CameraState from the session configuration.
    pub fn new(config: &EngineConfig) -> Self {
        let camera = Camera::new(config);
        let (min, max) = camera.visible_world_rect();
        CameraState {
            visible_chunks: ChunkRect::covering(min, max, config.tile_size, config.chunk_size),
            camera,
            camera_controller: CameraController::new(config.camera_pan_speed, config.zoom_step),
            tile_size: config.tile_size,
            chunk_size: config.chunk_size,
        }
    }

    /// Processes player input actions and updates the camera controller state.
    pub fn intake_actions(&mut self, actions: &PlayerAction) {
        self.camera_controller.intake_actions(actions);
    }

    /// Chunks covered by the viewport, without any prefetch margin.
    pub fn visible_chunks(&self) -> ChunkRect {
        self.visible_chunks
    }

    /// Updates the camera for this frame.
    ///
    /// Applies pending zoom and pan input, then follows `follow_target` unless freelook
    /// is active.
    ///
    /// # Arguments
    /// * `dt` - Time elapsed since the last update
    /// * `follow_target` - World position the camera keeps centred in follow mode
    ///
    /// # Returns
    /// - `Some(CameraUpdates)` if the set of visible chunks changed
    /// - `None` otherwise
    pub fn update(
        &mut self,
        dt: web_time::Duration,
        follow_target: Point2<f32>,
    ) -> Option<CameraUpdates> {
        if self.camera_controller.has_updates() {
            self.camera_controller
                .apply_and_reset(&mut self.camera, dt.as_secs_f32());
        }
        self.camera.follow(follow_target);

        let (min, max) = self.camera.visible_world_rect();
        let visible = ChunkRect::covering(min, max, self.tile_size, self.chunk_size);
        if visible != self.visible_chunks {
            self.visible_chunks = visible;
            return Some(CameraUpdates {
                visible_chunks: visible,
            });
        }

        None
    }
}

/// Returned by `CameraState::update()` when the camera has moved onto a different set
/// of chunks.
pub struct CameraUpdates {
    /// The chunks now covered by the viewport
    pub visible_chunks: ChunkRect,
}
