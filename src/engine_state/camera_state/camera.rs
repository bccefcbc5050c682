//! # Camera Implementation
//!
//! A 2D camera over the tile world and the controller that feeds it input.
//!
//! ## Coordinate Transform
//! The camera position is the world point drawn at the top-left corner of the viewport:
//!
//! ```text
//! screen = (world - position) * zoom
//! world  = screen / zoom + position
//! ```
//!
//! ## Key Components
//! - `Camera`: position, zoom and the freelook flag
//! - `CameraController`: accumulates pan and zoom input between updates

use cgmath::{Point2, Vector2};
use log::debug;

use crate::config::EngineConfig;
use crate::engine_state::{physics::movement::MovementIntent, PlayerAction};

/// A top-down camera.
///
/// # Fields
/// - `position`: world point at the top-left of the viewport
/// - `zoom`: screen pixels per world unit, always within `[min_zoom, max_zoom]`
/// - `freelook`: when set, the camera ignores `follow` and is moved with `move_by`
/// - `viewport`: screen size in pixels
#[derive(Debug, Clone)]
pub struct Camera {
    pub position: Point2<f32>,
    zoom: f32,
    min_zoom: f32,
    max_zoom: f32,
    freelook: bool,
    viewport: Vector2<f32>,
}

impl Camera {
    /// Creates a camera at the world origin.
    ///
    /// # Arguments
    /// * `config` - Supplies the viewport size, the zoom range and the starting zoom
    pub fn new(config: &EngineConfig) -> Self {
        let mut camera = Self {
            position: Point2::new(0.0, 0.0),
            zoom: 1.0,
            min_zoom: config.min_zoom,
            max_zoom: config.max_zoom,
            freelook: false,
            viewport: Vector2::new(config.viewport_width, config.viewport_height),
        };
        camera.set_zoom(config.default_zoom);
        camera
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    pub fn zoom_range(&self) -> (f32, f32) {
        (self.min_zoom, self.max_zoom)
    }

    /// Sets the zoom, clamped to the allowed range. Non-finite values are ignored.
    pub fn set_zoom(&mut self, zoom: f32) {
        if !zoom.is_finite() {
            debug!("Ignoring non-finite zoom {}", zoom);
            return;
        }
        self.zoom = zoom.clamp(self.min_zoom, self.max_zoom);
    }

    /// Multiplies the zoom by `factor`, keeping the world point at the viewport centre fixed.
    pub fn zoom_by(&mut self, factor: f32) {
        let centre = self.centre();
        self.set_zoom(self.zoom * factor);
        self.position = centre - self.viewport_world() / 2.0;
    }

    pub fn is_freelook(&self) -> bool {
        self.freelook
    }

    pub fn set_freelook(&mut self, freelook: bool) {
        self.freelook = freelook;
    }

    /// Flips freelook and returns the new state.
    pub fn toggle_freelook(&mut self) -> bool {
        self.freelook = !self.freelook;
        self.freelook
    }

    /// Screen size in pixels.
    pub fn viewport(&self) -> Vector2<f32> {
        self.viewport
    }

    /// Size of the visible area in world units.
    pub fn viewport_world(&self) -> Vector2<f32> {
        self.viewport / self.zoom
    }

    /// Updates the screen size. Non-positive or non-finite sizes are ignored.
    pub fn resize(&mut self, width: f32, height: f32) {
        if width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0 {
            self.viewport = Vector2::new(width, height);
        }
    }

    /// Centres the view on `target` unless freelook is active.
    pub fn follow(&mut self, target: Point2<f32>) {
        if self.freelook {
            return;
        }
        if target.x.is_finite() && target.y.is_finite() {
            self.position = target - self.viewport_world() / 2.0;
        }
    }

    /// Pans the camera by a world-space offset.
    pub fn move_by(&mut self, delta: Vector2<f32>) {
        if delta.x.is_finite() && delta.y.is_finite() {
            self.position += delta;
        }
    }

    pub fn world_to_screen(&self, world: Point2<f32>) -> Point2<f32> {
        Point2::new(
            (world.x - self.position.x) * self.zoom,
            (world.y - self.position.y) * self.zoom,
        )
    }

    pub fn screen_to_world(&self, screen: Point2<f32>) -> Point2<f32> {
        Point2::new(
            screen.x / self.zoom + self.position.x,
            screen.y / self.zoom + self.position.y,
        )
    }

    /// World point at the centre of the viewport.
    pub fn centre(&self) -> Point2<f32> {
        self.position + self.viewport_world() / 2.0
    }

    /// Visible world rectangle as `(top_left, bottom_right)`.
    pub fn visible_world_rect(&self) -> (Point2<f32>, Point2<f32>) {
        (self.position, self.position + self.viewport_world())
    }
}

/// Handles camera panning and zooming based on player actions.
///
/// Input is accumulated by `intake_actions` and consumed by `take_updates`, so actions
/// gathered between two updates are never lost or applied twice.
#[derive(Debug)]
pub struct CameraController {
    /// Direction of freelook panning
    pan: MovementIntent,
    /// Scroll lines since the last update; positive zooms in
    scroll: f32,
    /// Pan speed in screen pixels per second
    speed: f32,
    /// Zoom multiplier per scroll line
    zoom_step: f32,
}

impl CameraController {
    /// Creates a new camera controller.
    ///
    /// # Arguments
    /// * `speed` - Freelook pan speed in screen pixels per second
    /// * `zoom_step` - Zoom multiplier applied per scroll line
    pub fn new(speed: f32, zoom_step: f32) -> Self {
        Self {
            pan: MovementIntent::default(),
            scroll: 0.0,
            speed,
            zoom_step,
        }
    }

    /// Records the player's actions for the next update.
    pub fn intake_actions(&mut self, actions: &PlayerAction) {
        self.pan = actions.movement;
        if actions.zoom_lines.is_finite() {
            self.scroll += actions.zoom_lines;
        }
    }

    /// Checks if there are any pending updates that would affect the camera.
    pub fn has_updates(&self) -> bool {
        !self.pan.is_idle() || self.scroll != 0.0
    }

    /// Applies the accumulated input to `camera` and resets the controller.
    ///
    /// Panning only moves the camera in freelook; in follow mode the movement keys drive
    /// the player instead.
    pub fn apply_and_reset(&mut self, camera: &mut Camera, dt: f32) {
        if self.scroll != 0.0 {
            camera.zoom_by(self.zoom_step.powf(self.scroll));
        }
        if camera.is_freelook() && dt.is_finite() && dt > 0.0 {
            let pixels = self.pan.direction() * self.speed * dt;
            camera.move_by(pixels / camera.zoom());
        }
        self.pan = MovementIntent::default();
        self.scroll = 0.0;
    }
}

impl Default for CameraController {
    fn default() -> Self {
        let config = EngineConfig::default();
        Self::new(config.camera_pan_speed, config.zoom_step)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera() -> Camera {
        Camera::new(&EngineConfig::default())
    }

    #[test]
    fn zoom_is_clamped_to_range() {
        let mut camera = camera();
        let (min, max) = camera.zoom_range();
        camera.set_zoom(min - 1.0);
        assert_eq!(camera.zoom(), min);
        camera.set_zoom(max + 1.0);
        assert_eq!(camera.zoom(), max);
        camera.set_zoom(f32::NAN);
        assert_eq!(camera.zoom(), max);
    }

    #[test]
    fn follow_centres_target_unless_freelook() {
        let mut camera = camera();
        camera.set_zoom(1.0);
        camera.follow(Point2::new(1000.0, 500.0));
        assert_eq!(camera.position, Point2::new(400.0, 150.0));
        assert_eq!(camera.centre(), Point2::new(1000.0, 500.0));

        camera.set_zoom(2.0);
        camera.follow(Point2::new(1000.0, 500.0));
        assert_eq!(camera.position, Point2::new(700.0, 325.0));

        assert!(camera.toggle_freelook());
        camera.follow(Point2::new(0.0, 0.0));
        assert_eq!(camera.position, Point2::new(700.0, 325.0));
        camera.move_by(Vector2::new(-10.0, 5.0));
        assert_eq!(camera.position, Point2::new(690.0, 330.0));
    }

    #[test]
    fn screen_and_world_transforms_are_inverse() {
        let mut camera = camera();
        camera.set_zoom(2.5);
        camera.position = Point2::new(-37.5, 120.25);

        let world = Point2::new(13.0, 200.0);
        let screen = camera.world_to_screen(world);
        assert_eq!(screen, Point2::new((13.0 + 37.5) * 2.5, (200.0 - 120.25) * 2.5));
        let back = camera.screen_to_world(screen);
        assert!((back.x - world.x).abs() < 1e-3 && (back.y - world.y).abs() < 1e-3);
    }

    #[test]
    fn wheel_zoom_keeps_centre() {
        let mut camera = camera();
        camera.follow(Point2::new(64.0, 64.0));
        camera.zoom_by(0.5);
        assert_eq!(camera.zoom(), 1.5);
        let centre = camera.centre();
        assert!((centre.x - 64.0).abs() < 1e-3 && (centre.y - 64.0).abs() < 1e-3);
    }

    #[test]
    fn controller_pans_only_in_freelook() {
        let mut camera = camera();
        camera.set_zoom(2.0);
        let mut controller = CameraController::new(600.0, 2.0);
        let actions = PlayerAction {
            movement: MovementIntent { x: 1, y: 0 },
            ..Default::default()
        };

        controller.intake_actions(&actions);
        assert!(controller.has_updates());
        controller.apply_and_reset(&mut camera, 0.5);
        assert_eq!(camera.position, Point2::new(0.0, 0.0));
        assert!(!controller.has_updates());

        camera.set_freelook(true);
        controller.intake_actions(&actions);
        controller.apply_and_reset(&mut camera, 0.5);
        // 600 px/s for half a second at zoom 2.
        assert_eq!(camera.position, Point2::new(150.0, 0.0));
    }

    #[test]
    fn controller_accumulates_scroll() {
        let mut camera = camera();
        camera.set_zoom(1.0);
        let mut controller = CameraController::new(600.0, 2.0);
        let scroll = PlayerAction {
            zoom_lines: 1.0,
            ..Default::default()
        };
        controller.intake_actions(&scroll);
        controller.intake_actions(&scroll);
        controller.apply_and_reset(&mut camera, 0.016);
        assert_eq!(camera.zoom(), 4.0);
    }
}
