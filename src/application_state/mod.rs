//! # Application State Management
//!
//! This module is the glue between a host window and the engine:
//! - Window event intake into the input manager
//! - Frame timing
//! - The per-frame update then render sequence
//!
//! The host owns the window and the drawing surface. It forwards winit `WindowEvent`s to
//! [`ApplicationState::window_event`] and calls [`ApplicationState::frame`] once per redraw
//! with a [`RenderTarget`] for its surface.

pub mod input_manager;
pub mod input_state;

use input_manager::InputManager;
use log::{debug, info};
use winit::event::WindowEvent;

use crate::{
    config::{ConfigError, EngineConfig},
    engine_state::{
        interaction::{InteractionOutcome, ItemCounts},
        rendering::{RenderStats, RenderTarget},
        EngineState,
    },
};

/// Longest frame step handed to the engine. Longer gaps (a suspended tab, a debugger
/// break) are treated as this long so the player cannot tunnel through walls.
const MAX_FRAME_STEP: web_time::Duration = web_time::Duration::from_millis(250);

/// The running application: the engine session plus the input and timing around it.
pub struct ApplicationState {
    /// The core engine state and logic
    pub engine_state: EngineState,

    /// Manages input state and event processing
    pub input_manager: InputManager,

    /// Resources held by the local player
    pub inventory: ItemCounts,

    /// Timestamp of the last frame for delta time calculations
    pub last_wait_time: web_time::Instant,
}

/// What one frame did.
#[derive(Debug)]
pub struct FrameReport {
    pub outcomes: Vec<InteractionOutcome>,
    pub render: RenderStats,
}

impl ApplicationState {
    /// Starts a session with an empty inventory.
    ///
    /// # Errors
    /// Returns a `ConfigError` if the configuration does not validate.
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        let engine_state = EngineState::new(config)?;
        Ok(Self {
            engine_state,
            input_manager: InputManager::new(),
            inventory: ItemCounts::new(),
            last_wait_time: web_time::Instant::now(),
        })
    }

    /// Handles a window event.
    ///
    /// # Arguments
    /// * `event` - The window event to process
    ///
    /// # Returns
    /// `true` if the window asked to close.
    pub fn window_event(&mut self, event: &WindowEvent) -> bool {
        self.input_manager.intake_input(event);

        match event {
            WindowEvent::Resized(size) => {
                self.engine_state
                    .resize(size.width as f32, size.height as f32);
            }
            WindowEvent::Focused(is_focused) => {
                if !is_focused {
                    self.input_manager.reset_inputs();
                }
            }
            WindowEvent::CloseRequested => {
                info!("Close requested");
                return true;
            }
            _ => {}
        }
        false
    }

    /// Runs one frame timed against the wall clock.
    pub fn frame(&mut self, target: &mut dyn RenderTarget) -> FrameReport {
        let now = web_time::Instant::now();
        let dt = now.duration_since(self.last_wait_time);
        self.last_wait_time = now;
        self.step(dt, target)
    }

    /// Runs one frame with an explicit time step.
    ///
    /// # Arguments
    /// * `dt` - Time to advance; clamped to a quarter second
    /// * `target` - Where the frame is drawn
    pub fn step(&mut self, dt: web_time::Duration, target: &mut dyn RenderTarget) -> FrameReport {
        let dt = dt.min(MAX_FRAME_STEP);
        let mut input = self.input_manager.take_frame();
        let outcomes = self
            .engine_state
            .update(dt, &mut input, &mut self.inventory);
        let render = self.engine_state.render(target);

        if !outcomes.is_empty() {
            debug!("Frame outcomes: {:?}", outcomes);
        }
        FrameReport { outcomes, render }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GenerationMethod;
    use crate::engine_state::rendering::RecordingTarget;
    use winit::keyboard::KeyCode;

    fn application() -> ApplicationState {
        ApplicationState::new(EngineConfig {
            generation: GenerationMethod::Flat,
            generation_workers: 0,
            world_radius_chunks: Some(4),
            ..EngineConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn long_frames_are_clamped() {
        let mut application = application();
        let start = application.engine_state.player.position();
        application.input_manager.set_key(KeyCode::KeyS, true);

        application.step(web_time::Duration::from_secs(5), &mut RecordingTarget::new());
        let moved = application.engine_state.player.position();
        // 200 units per second for a quarter second.
        assert!((moved.y - start.y - 50.0).abs() < 1e-3);
    }

    #[test]
    fn frames_render_to_the_target() {
        let mut application = application();
        let mut target = RecordingTarget::new();
        let report = application.step(web_time::Duration::from_millis(16), &mut target);
        assert!(report.outcomes.is_empty());
        assert!(report.render.visible > 0);
        assert!(target.is_balanced());
    }
}
