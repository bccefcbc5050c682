//! # Engine State Module
//!
//! The core engine module that owns one play session of the tile sandbox.
//!
//! ## Key Components
//!
//! * `EngineState` - The session object; every frame goes through it
//! * `tiles` - Tile world, chunks, coordinates and terrain generation
//! * `physics` - Bounding boxes, collision resolution and movement input
//! * `player` - The locally controlled entity
//! * `camera_state` - Camera following, freelook and zoom
//! * `interaction` - Mining and placing with the pointer
//! * `rendering` - The render target abstraction and the chunk redraw scheduler
//! * `remote` - Display-only state of other players
//! * `task_management` - Background chunk generation on worker threads
//!
//! ## Frame Order
//!
//! `update(dt)` runs, in order:
//! 1. Apply finished chunk generations (the only place background work touches the world)
//! 2. Translate input into player actions
//! 3. Dispatch pointer presses (mine / place)
//! 4. Move the player with collision, unless freelook is on
//! 5. Update the camera
//! 6. Request the chunks around the camera and the player, abandon stale requests and
//!    hand new ones to the workers
//!
//! `render(target)` then draws the frame from that state. Nothing in either call blocks
//! or fails; degraded situations are logged and skipped.

use std::sync::Arc;

use camera_state::{CameraState, CameraUpdates};
use cgmath::Point2;
use interaction::{Inventory, InteractionController, InteractionOutcome};
use log::{debug, info};
use physics::movement::MovementIntent;
use player::{Player, PlayerSnapshot};
use remote::{RemoteEntities, RemoteEntityState};
use rendering::{
    overlay::{self, DebugInfo},
    target::palette,
    RenderScheduler, RenderStats, RenderTarget,
};
use task_management::TaskManager;
use tiles::{
    coords::ChunkRect,
    generation::{ChunkGenerator, FlatGenerator, TerrainGenerator},
    tasks::chunk_generation_task::ChunkGenerationTask,
    world::{ChunkStatus, TileWorld},
};
use web_time::Duration;
use winit::keyboard::KeyCode;

use crate::{
    application_state::input_state::InputFrame,
    config::{ConfigError, EngineConfig, GenerationMethod},
};

pub mod camera_state;
pub mod interaction;
pub mod physics;
pub mod player;
pub mod remote;
pub mod rendering;
pub mod task_management;
pub mod tiles;

/// Chunks kept loaded around the player regardless of where the camera is looking.
const PLAYER_CHUNK_RADIUS: i32 = 1;

/// Flags controlling what gets drawn
pub struct EngineFlags {
    /// Whether tile outlines are drawn
    pub show_grid: bool,
    /// Whether the debug panel is drawn
    pub show_debug: bool,
}

impl Default for EngineFlags {
    fn default() -> Self {
        EngineFlags {
            show_grid: false,
            show_debug: true,
        }
    }
}

/// The session object for the tile engine
///
/// Owns the world, the player, the camera and every controller. Hosts create one per
/// session and drive it with `update` then `render` once per frame.
///
/// # Examples
///
/// ```rust,ignore
/// let mut engine_state = EngineState::new(EngineConfig::default())?;
/// let mut inventory = ItemCounts::new();
///
/// loop {
///     let mut input = input_manager.take_frame();
///     engine_state.update(dt, &mut input, &mut inventory);
///     engine_state.render(&mut target);
/// }
/// ```
pub struct EngineState {
    config: EngineConfig,
    /// The tile world containing all chunk data
    pub world: TileWorld,
    pub player: Player,
    /// Camera state managing position, zoom and movement
    pub camera_state: CameraState,
    pub interaction: InteractionController,
    pub render_scheduler: RenderScheduler,
    /// Task manager for background chunk generation
    pub task_manager: TaskManager,
    pub remote_entities: RemoteEntities,
    /// Current player actions derived from input
    pub player_actions: PlayerAction,
    pub flags: EngineFlags,
    generator: Arc<dyn ChunkGenerator>,
    last_render: RenderStats,
}

impl EngineState {
    /// Creates a session using the generator named by the configuration.
    ///
    /// # Errors
    /// Returns a `ConfigError` if the configuration does not validate.
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        let generator: Arc<dyn ChunkGenerator> = match config.generation {
            GenerationMethod::Terrain => Arc::new(TerrainGenerator::new(config.seed)),
            GenerationMethod::Flat => Arc::new(FlatGenerator::default()),
        };
        Self::with_generator(config, generator)
    }

    /// Creates a session that generates chunks with `generator`.
    ///
    /// The spawn chunk is generated synchronously so the player starts on solid ground
    /// information; every other chunk is generated in the background.
    ///
    /// # Errors
    /// Returns a `ConfigError` if the configuration does not validate.
    pub fn with_generator(
        config: EngineConfig,
        generator: Arc<dyn ChunkGenerator>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let place_material = config
            .place_material()
            .ok_or_else(|| ConfigError::Invalid {
                field: "placeMaterial",
                reason: format!("unknown material `{}`", config.place_material),
            })?;

        let mut world = TileWorld::from_config(&config);
        let spawn = world.spawn_point(config.spawn_point(), generator.as_ref());
        let player = Player::new(spawn, spawn, &config);

        let mut camera_state = CameraState::new(&config);
        camera_state.camera.follow(player.position());

        let mut engine_state = Self {
            world,
            player,
            camera_state,
            interaction: InteractionController::new(
                config.interaction_radius,
                place_material,
                config.tile_size,
            ),
            render_scheduler: RenderScheduler::new(
                config.max_chunks_per_frame,
                config.prefetch_margin_chunks,
                config.draw_cache_capacity,
            ),
            task_manager: TaskManager::new(config.generation_workers),
            remote_entities: RemoteEntities::new(),
            player_actions: PlayerAction::default(),
            flags: EngineFlags::default(),
            generator,
            last_render: RenderStats::default(),
            config,
        };
        engine_state.request_chunks();

        info!("Session started, player spawned at {:?}", spawn);
        Ok(engine_state)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Stats of the last `render` call.
    pub fn last_render(&self) -> RenderStats {
        self.last_render
    }

    /// Advances the session by one frame.
    ///
    /// # Arguments
    /// * `dt` - Time elapsed since the last update
    /// * `input` - This frame's input; its pointer events are drained
    /// * `inventory` - Credited by mining and charged by placing
    ///
    /// # Returns
    /// What happened to each pointer press this frame.
    pub fn update(
        &mut self,
        dt: Duration,
        input: &mut InputFrame,
        inventory: &mut dyn Inventory,
    ) -> Vec<InteractionOutcome> {
        let installed = self.task_manager.process_completed_tasks(&mut self.world);
        if installed > 0 {
            debug!("Applied {} chunk generation results", installed);
        }

        self.player_actions = self.translate_input(input);
        self.camera_state.intake_actions(&self.player_actions);

        let outcomes = self.interaction.dispatch(
            &mut input.pointer_events,
            &self.camera_state.camera,
            self.player.position(),
            &mut self.world,
            inventory,
        );

        if !self.camera_state.camera.is_freelook() {
            self.player
                .step(self.player_actions.movement, dt.as_secs_f32(), &self.world);
        }

        if let Some(CameraUpdates { visible_chunks }) =
            self.camera_state.update(dt, self.player.position())
        {
            debug!("Camera now covers chunks {:?}", visible_chunks);
        }
        self.interaction
            .update_hover(input.pointer, &self.camera_state.camera);

        self.request_chunks();
        outcomes
    }

    /// Requests the chunks the next frames need and schedules their generation.
    ///
    /// Pending chunks outside both windows are abandoned, and their generation tasks are
    /// dropped if no worker has picked them up yet.
    fn request_chunks(&mut self) {
        let camera_window = self.render_scheduler.interest_window(
            &self.camera_state.camera,
            self.world.tile_size(),
            self.world.chunk_size(),
        );
        let player_chunk = self
            .world
            .tile_at_world(self.player.position())
            .chunk(self.world.chunk_size());
        let player_window = ChunkRect::around(player_chunk, PLAYER_CHUNK_RADIUS);

        self.world.request_window(camera_window);
        self.world.request_window(player_window);
        if self.world.abandon_outside(&[camera_window, player_window]) > 0 {
            let world = &self.world;
            let dropped = self.task_manager.retain_queued(|task| {
                task.chunk_position()
                    .map_or(true, |position| world.status(position) == Some(ChunkStatus::Pending))
            });
            debug!("Dropped {} queued generation tasks", dropped);
        }

        let chunk_size = self.world.chunk_size();
        for position in self.world.take_generation_requests() {
            self.task_manager.publish_task(Box::new(ChunkGenerationTask::new(
                self.generator.clone(),
                position,
                chunk_size,
            )));
        }
        self.task_manager.process_queued_tasks();
    }

    /// Draws the current frame.
    ///
    /// World-space drawing happens between a `save` and a `restore` with the camera
    /// transform applied; the debug panel is drawn afterwards in screen space.
    pub fn render(&mut self, target: &mut dyn RenderTarget) -> RenderStats {
        let camera = &self.camera_state.camera;
        let tile_size = self.world.tile_size();

        target.clear(palette::BACKGROUND);
        target.save();
        target.scale(camera.zoom());
        target.translate(-cgmath::Vector2::new(camera.position.x, camera.position.y));

        let stats = self
            .render_scheduler
            .draw_chunks(&mut self.world, camera, target);
        if self.flags.show_grid {
            overlay::draw_grid(target, camera, tile_size);
        }
        if let Some(tile) = self.interaction.hovered() {
            overlay::draw_hover(target, tile, tile_size);
        }
        overlay::draw_remote_entities(target, &self.remote_entities);
        overlay::draw_player(target, &self.player);

        target.restore();

        if self.flags.show_debug {
            let info = DebugInfo {
                position: self.player.position(),
                players: self.remote_entities.len() + 1,
                loaded_chunks: self.world.loaded_count(),
                pending_chunks: self.world.pending_count(),
                drawn_chunks: stats.drawn,
                deferred_chunks: stats.deferred,
            };
            overlay::draw_debug_panel(target, camera, &info);
        }

        self.last_render = stats;
        stats
    }

    /// Network snapshot of the local player.
    pub fn player_state(&self) -> PlayerSnapshot {
        self.player.snapshot()
    }

    /// Moves the player to a position supplied by the host, for example a saved one.
    ///
    /// # Returns
    /// `false` if the position was not finite and was ignored.
    pub fn restore_player_position(&mut self, position: Point2<f32>) -> bool {
        self.player.set_position(position)
    }

    /// Stores the latest state of a remote player.
    pub fn update_other_entity(&mut self, id: &str, state: RemoteEntityState) {
        self.remote_entities.update(id, state);
    }

    pub fn remove_other_entity(&mut self, id: &str) {
        self.remote_entities.remove(id);
    }

    /// Resizes the viewport when the window size changes.
    pub fn resize(&mut self, width: f32, height: f32) {
        self.camera_state.camera.resize(width, height);
    }

    /// Translates the input snapshot into player actions and applies the toggles.
    ///
    /// # Arguments
    /// * `input` - The input snapshot to translate
    fn translate_input(&mut self, input: &InputFrame) -> PlayerAction {
        let active = |a: KeyCode, b: KeyCode| {
            input.get_key_state(a).is_active() || input.get_key_state(b).is_active()
        };

        let mut player_action = PlayerAction {
            movement: MovementIntent::from_keys(
                active(KeyCode::KeyA, KeyCode::ArrowLeft),
                active(KeyCode::KeyD, KeyCode::ArrowRight),
                active(KeyCode::KeyW, KeyCode::ArrowUp),
                active(KeyCode::KeyS, KeyCode::ArrowDown),
            ),
            zoom_lines: input.scroll_lines,
            ..Default::default()
        };

        // F key - only trigger on press, not hold
        if input.get_key_state(KeyCode::KeyF).is_just_pressed() {
            let freelook = self.camera_state.camera.toggle_freelook();
            info!("Freelook {}", if freelook { "on" } else { "off" });
            player_action.toggle_freelook = true;
        }

        // G key - only trigger on press, not hold
        if input.get_key_state(KeyCode::KeyG).is_just_pressed() {
            self.flags.show_grid = !self.flags.show_grid;
            player_action.toggle_grid = true;
        }

        player_action
    }
}

/// Represents player actions derived from input
#[derive(Debug, Clone, Copy, Default)]
pub struct PlayerAction {
    /// Movement direction - from keys that are pressed or held
    pub movement: MovementIntent,
    /// Scroll lines this frame; positive zooms in
    pub zoom_lines: f32,

    /// Actions that only trigger on key press, not hold
    pub toggle_freelook: bool,
    pub toggle_grid: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application_state::{input_manager::InputManager, input_state::PointerAction};
    use crate::engine_state::interaction::ItemCounts;
    use crate::engine_state::rendering::{DrawCommand, RecordingTarget};
    use crate::engine_state::tiles::{coords::ChunkCoord, tile::ResourceType};

    const FRAME: Duration = Duration::from_millis(16);

    fn flat_session() -> EngineState {
        let config = EngineConfig {
            generation: GenerationMethod::Flat,
            generation_workers: 0,
            world_radius_chunks: Some(8),
            ..EngineConfig::default()
        };
        EngineState::new(config).unwrap()
    }

    #[test]
    fn spawn_chunk_is_ready_before_first_frame() {
        let engine_state = flat_session();
        let spawn_chunk = engine_state
            .world
            .tile_at_world(engine_state.player.position())
            .chunk(engine_state.world.chunk_size());
        assert!(engine_state.world.is_loaded(spawn_chunk));
        assert_eq!(engine_state.player.position(), Point2::new(136.0, 136.0));
        assert!(engine_state.world.pending_count() > 0);
    }

    #[test]
    fn inline_generation_completes_on_next_update() {
        let mut engine_state = flat_session();
        let mut inventory = ItemCounts::new();
        let mut input = InputFrame::default();

        engine_state.update(FRAME, &mut input, &mut inventory);
        assert_eq!(engine_state.world.pending_count(), 0);
        assert!(engine_state.world.loaded_count() > 1);
    }

    #[test]
    fn invalid_place_material_is_rejected() {
        let config = EngineConfig {
            place_material: "glass".to_string(),
            ..EngineConfig::default()
        };
        assert!(matches!(
            EngineState::new(config),
            Err(ConfigError::Invalid { field: "placeMaterial", .. })
        ));
    }

    #[test]
    fn movement_keys_drive_player_and_camera_follows() {
        let mut engine_state = flat_session();
        let mut inventory = ItemCounts::new();
        let mut input_manager = InputManager::new();
        let start = engine_state.player.position();

        input_manager.set_key(KeyCode::KeyD, true);
        let mut input = input_manager.take_frame();
        engine_state.update(Duration::from_millis(100), &mut input, &mut inventory);

        let moved = engine_state.player.position();
        assert!((moved.x - (start.x + 20.0)).abs() < 1e-3);
        assert_eq!(moved.y, start.y);
        let centre = engine_state.camera_state.camera.centre();
        assert!((centre.x - moved.x).abs() < 1e-3 && (centre.y - moved.y).abs() < 1e-3);
    }

    #[test]
    fn freelook_pans_camera_instead_of_player() {
        let mut engine_state = flat_session();
        let mut inventory = ItemCounts::new();
        let mut input_manager = InputManager::new();
        let start = engine_state.player.position();

        input_manager.set_key(KeyCode::KeyF, true);
        let mut input = input_manager.take_frame();
        engine_state.update(FRAME, &mut input, &mut inventory);
        assert!(engine_state.camera_state.camera.is_freelook());
        assert!(engine_state.player_actions.toggle_freelook);

        // Held F does not toggle again.
        input_manager.set_key(KeyCode::ArrowRight, true);
        let camera_before = engine_state.camera_state.camera.position;
        let mut input = input_manager.take_frame();
        engine_state.update(Duration::from_millis(100), &mut input, &mut inventory);
        assert!(engine_state.camera_state.camera.is_freelook());
        assert_eq!(engine_state.player.position(), start);
        assert!(engine_state.camera_state.camera.position.x > camera_before.x);
    }

    #[test]
    fn grid_key_toggles_once_per_press() {
        let mut engine_state = flat_session();
        let mut inventory = ItemCounts::new();
        let mut input_manager = InputManager::new();
        assert!(!engine_state.flags.show_grid);

        input_manager.set_key(KeyCode::KeyG, true);
        let mut input = input_manager.take_frame();
        engine_state.update(FRAME, &mut input, &mut inventory);
        assert!(engine_state.player_actions.toggle_grid);
        assert!(engine_state.flags.show_grid);

        let mut input = input_manager.take_frame();
        engine_state.update(FRAME, &mut input, &mut inventory);
        assert!(!engine_state.player_actions.toggle_grid);
        assert!(engine_state.flags.show_grid);

        let mut target = RecordingTarget::new();
        engine_state.render(&mut target);
        assert!(target
            .commands
            .iter()
            .any(|command| matches!(command, DrawCommand::StrokeRect(_, color, _) if *color == palette::GRID)));
    }

    #[test]
    fn moving_away_drops_queued_generation_of_abandoned_chunks() {
        let mut engine_state = flat_session();
        let spawn_window = ChunkRect::around(ChunkCoord::new(0, 0), 1);
        let queued_at_spawn = engine_state.task_manager.outstanding_tasks();
        assert!(queued_at_spawn > 0);
        assert_eq!(queued_at_spawn, engine_state.world.pending_count());

        let far = Point2::new(1800.0, 1800.0);
        assert!(engine_state.restore_player_position(far));
        engine_state.camera_state.camera.follow(far);
        engine_state.request_chunks();

        assert!(spawn_window
            .iter()
            .all(|coord| engine_state.world.status(coord) != Some(ChunkStatus::Pending)));
        assert_eq!(
            engine_state.task_manager.outstanding_tasks(),
            engine_state.world.pending_count()
        );

        engine_state.update(FRAME, &mut InputFrame::default(), &mut ItemCounts::new());
        assert_eq!(engine_state.world.pending_count(), 0);
        let far_chunk = engine_state.world.tile_at_world(far).chunk(16);
        assert!(engine_state.world.is_loaded(far_chunk));
        assert!(!engine_state.world.is_loaded(ChunkCoord::new(1, 1)));
    }

    #[test]
    fn secondary_press_places_only_with_wood() {
        let mut engine_state = flat_session();
        engine_state.update(FRAME, &mut InputFrame::default(), &mut ItemCounts::new());

        let player = engine_state.player.position();
        let target = Point2::new(player.x + 32.0, player.y);
        let screen = engine_state.camera_state.camera.world_to_screen(target);

        let mut empty = ItemCounts::new();
        let mut input = InputFrame::default();
        input.push_pointer_event(PointerAction::Secondary, screen);
        let outcomes = engine_state.update(FRAME, &mut input, &mut empty);
        assert!(matches!(outcomes[..], [InteractionOutcome::Unaffordable { .. }]));

        let mut stocked = ItemCounts::new();
        stocked.add_item(ResourceType::Wood, 2);
        let mut input = InputFrame::default();
        input.push_pointer_event(PointerAction::Secondary, screen);
        let outcomes = engine_state.update(FRAME, &mut input, &mut stocked);
        assert!(matches!(outcomes[..], [InteractionOutcome::Placed { .. }]));
        assert_eq!(stocked.count(ResourceType::Wood), 0);
        assert!(engine_state.world.is_solid(engine_state.world.tile_at_world(target)));
        assert!(input.pointer_events.is_empty());
    }

    #[test]
    fn render_is_balanced_and_ends_with_debug_panel() {
        let mut engine_state = flat_session();
        engine_state.update(FRAME, &mut InputFrame::default(), &mut ItemCounts::new());

        let mut target = RecordingTarget::new();
        let stats = engine_state.render(&mut target);
        assert!(target.is_balanced());
        assert!(matches!(target.commands.first(), Some(DrawCommand::Clear(_))));
        assert!(stats.drawn <= engine_state.render_scheduler.max_chunks_per_frame());
        assert_eq!(engine_state.last_render(), stats);
        assert!(target.texts().contains(&"Players: 1"));
    }

    #[test]
    fn remote_entities_are_counted_and_drawn() {
        let mut engine_state = flat_session();
        engine_state.update_other_entity(
            "abc",
            RemoteEntityState {
                x: 140.0,
                y: 140.0,
                name: Some("Rin".to_string()),
            },
        );
        let mut target = RecordingTarget::new();
        engine_state.render(&mut target);
        let texts = target.texts();
        assert!(texts.contains(&"Rin"));
        assert!(texts.contains(&"Players: 2"));

        engine_state.remove_other_entity("abc");
        assert!(engine_state.remote_entities.is_empty());
    }

    #[test]
    fn restore_rejects_non_finite_positions() {
        let mut engine_state = flat_session();
        assert!(!engine_state.restore_player_position(Point2::new(f32::NAN, 0.0)));
        assert!(engine_state.restore_player_position(Point2::new(200.0, 200.0)));
        let snapshot = engine_state.player_state();
        assert_eq!((snapshot.x, snapshot.y), (200.0, 200.0));
    }
}
