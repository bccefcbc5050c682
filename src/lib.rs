#![warn(rustdoc::missing_crate_level_docs)]
#![warn(rustdoc::invalid_rust_codeblocks)]

//! # Tyls Engine
//!
//! The core of a top-down, tile-based sandbox: an unbounded (or bounded) chunked tile
//! world, a player that walks through it with tile collision, a camera that follows or
//! pans freely, mining and placing with the pointer, and a frame-budgeted chunk redraw
//! scheduler.
//!
//! The engine owns no window and no graphics API. Hosts feed it winit window events and
//! draw through the [`RenderTarget`](engine_state::rendering::RenderTarget) trait, so the
//! same session runs behind a canvas, a GPU surface or a headless recorder.
//!
//! ## Key Modules
//!
//! * `application_state` - Input intake, frame timing and the update/render sequence
//! * `config` - Session tunables loaded from JSON
//! * `engine_state` - The world, the player, the camera, interaction, rendering and
//!   background chunk generation
//!
//! ## Architecture
//!
//! * All mutation happens on the thread that calls `update`
//! * Chunk generation runs on worker threads and only returns finished chunks, which are
//!   installed at the start of the next frame
//! * Reads of tiles that are not generated yet return an empty sentinel tile and never
//!   block
//! * Rendering redraws at most a fixed number of chunks per frame, nearest first
//!
//! ## Usage
//!
//! ```rust,no_run
//! fn main() {
//!     if let Err(err) = tyls_engine::run() {
//!         eprintln!("{}", err);
//!     }
//! }
//! ```

use web_time::Duration;

use application_state::{input_state::PointerAction, ApplicationState};
use cgmath::Point2;
use config::{ConfigError, EngineConfig};
use engine_state::rendering::RecordingTarget;
use log::info;
use winit::keyboard::KeyCode;

pub mod application_state;
pub mod config;
pub mod engine_state;

/// Config file read by [`run`] when no path is given on the command line.
pub const DEFAULT_CONFIG_PATH: &str = "config.json";

const DEMO_FRAME: Duration = Duration::from_millis(16);
const DEMO_FRAMES: usize = 120;

/// Sets up `env_logger` writing to stdout, filtered by `RUST_LOG`.
///
/// Safe to call more than once; later calls do nothing.
pub fn init_logging() {
    let mut log_builder = env_logger::Builder::new();
    let _ = log_builder
        .target(env_logger::Target::Stdout)
        .parse_env("RUST_LOG")
        .try_init();
}

/// Runs a scripted headless session and logs what it did.
///
/// The config path is the first command line argument, or [`DEFAULT_CONFIG_PATH`]. A
/// missing or unreadable file falls back to the defaults.
///
/// # Errors
/// Returns a `ConfigError` if the configuration does not validate.
pub fn run() -> Result<(), ConfigError> {
    init_logging();
    info!("Logger initialized");

    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let config = EngineConfig::load_or_default(&path);
    config.validate()?;

    let mut application = ApplicationState::new(config)?;
    let mut target = RecordingTarget::new();

    let viewport = application.engine_state.camera_state.camera.viewport();
    let aim = Point2::new(viewport.x / 2.0 + 48.0, viewport.y / 2.0);
    application.input_manager.set_pointer(Some(aim));

    for frame in 0..DEMO_FRAMES {
        let input = &mut application.input_manager;
        input.set_key(KeyCode::KeyD, frame < DEMO_FRAMES / 2);
        input.set_key(KeyCode::KeyS, frame >= DEMO_FRAMES / 2);
        match frame % 30 {
            10 => input.press_button(PointerAction::Primary),
            11 => input.release_button(PointerAction::Primary),
            20 => input.press_button(PointerAction::Secondary),
            21 => input.release_button(PointerAction::Secondary),
            _ => {}
        }

        target.reset();
        let report = application.step(DEMO_FRAME, &mut target);
        for outcome in &report.outcomes {
            info!("Frame {}: {:?}", frame, outcome);
        }
    }

    let engine_state = &application.engine_state;
    info!(
        "Finished at {:?}: {} chunks loaded, {} pending, {} draw lists cached",
        engine_state.player.position(),
        engine_state.world.loaded_count(),
        engine_state.world.pending_count(),
        engine_state.render_scheduler.cached_chunks(),
    );
    if let Ok(snapshot) = serde_json::to_string(&engine_state.player_state()) {
        info!("Player state: {}", snapshot);
    }
    Ok(())
}
