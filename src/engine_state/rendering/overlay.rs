//! Everything drawn on top of the terrain: grid, hover highlight, entities and the debug
//! panel.

use cgmath::{Point2, Vector2};

use super::target::{palette, Rect, RenderTarget};
use crate::engine_state::{
    camera_state::camera::Camera, player::Player, remote::RemoteEntities, tiles::coords::TileCoord,
};

/// Player outline width in world units.
const OUTLINE_WIDTH: f32 = 2.0;
/// Grid line width in world units.
const GRID_WIDTH: f32 = 0.5;
/// Remote entities are drawn with a fixed box, they carry no size.
const REMOTE_HALF_EXTENT: f32 = 8.0;

/// Outlines every tile in the viewport. Drawn in world space.
pub fn draw_grid(target: &mut dyn RenderTarget, camera: &Camera, tile_size: f32) {
    let (min, max) = camera.visible_world_rect();
    let first = TileCoord::from_world(min, tile_size);
    let last = TileCoord::from_world(max, tile_size);
    for y in first.y..=last.y {
        for x in first.x..=last.x {
            let origin = TileCoord::new(x, y).world_origin(tile_size);
            target.stroke_rect(
                Rect::new(origin.x, origin.y, tile_size, tile_size),
                palette::GRID,
                GRID_WIDTH,
            );
        }
    }
}

/// Outlines the hovered tile. Drawn in world space.
pub fn draw_hover(target: &mut dyn RenderTarget, tile: TileCoord, tile_size: f32) {
    let origin = tile.world_origin(tile_size);
    target.stroke_rect(
        Rect::new(origin.x, origin.y, tile_size, tile_size),
        palette::HOVER,
        1.0,
    );
}

/// Draws remote entities with their names above them. Drawn in world space.
pub fn draw_remote_entities(target: &mut dyn RenderTarget, remotes: &RemoteEntities) {
    let half = Vector2::new(REMOTE_HALF_EXTENT, REMOTE_HALF_EXTENT);
    for (_, state) in remotes.iter() {
        let centre = Point2::new(state.x, state.y);
        target.fill_rect(Rect::centred(centre, half), palette::REMOTE_PLAYER);
        target.fill_text(
            state.display_name(),
            Point2::new(state.x, state.y - REMOTE_HALF_EXTENT - 9.0),
            palette::TEXT,
        );
    }
}

/// Draws the player body, outline and eyes. Drawn in world space.
pub fn draw_player(target: &mut dyn RenderTarget, player: &Player) {
    let body = Rect::centred(player.position(), player.half_extents());
    target.fill_rect(body, palette::PLAYER);
    target.stroke_rect(body, palette::PLAYER_OUTLINE, OUTLINE_WIDTH);

    let half = player.half_extents();
    let eye = half.x / 4.0;
    let top = player.position().y - half.y / 2.0;
    let left = player.position().x - half.x / 2.0;
    let right = player.position().x + half.x / 4.0;
    target.fill_rect(Rect::new(left, top, eye, eye), palette::TEXT);
    target.fill_rect(Rect::new(right, top, eye, eye), palette::TEXT);
}

/// Lines shown in the debug panel.
pub struct DebugInfo {
    pub position: Point2<f32>,
    pub players: usize,
    pub loaded_chunks: usize,
    pub pending_chunks: usize,
    pub drawn_chunks: usize,
    pub deferred_chunks: usize,
}

/// Draws the debug panel in the bottom-left corner. Drawn in screen space.
pub fn draw_debug_panel(target: &mut dyn RenderTarget, camera: &Camera, info: &DebugInfo) {
    let height = camera.viewport().y;
    target.fill_rect(Rect::new(10.0, height - 80.0, 220.0, 70.0), palette::PANEL);

    let lines = [
        format!(
            "Position: {}, {}",
            info.position.x.floor(),
            info.position.y.floor()
        ),
        format!("Players: {}", info.players),
        format!(
            "Chunks: {} loaded, {} pending",
            info.loaded_chunks, info.pending_chunks
        ),
        format!(
            "Redrawn: {} ({} deferred)",
            info.drawn_chunks, info.deferred_chunks
        ),
    ];
    for (row, line) in lines.iter().enumerate() {
        target.fill_text(
            line,
            Point2::new(15.0, height - 65.0 + row as f32 * 15.0),
            palette::TEXT,
        );
    }
}
