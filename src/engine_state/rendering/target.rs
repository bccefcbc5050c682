//! Draw primitives and the surface they are sent to.
//!
//! The engine never talks to a graphics API. It issues canvas-style commands against a
//! [`RenderTarget`] supplied by the host: a 2D canvas, a GPU batcher, or the
//! [`RecordingTarget`] used by tests and the headless binary.

use cgmath::{Point2, Vector2};

use crate::engine_state::tiles::{
    coords::ChunkCoord,
    tile::{Ground, Material, Tile, TileKind},
};

/// An RGBA colour, 8 bits per channel.
pub type Rgba = [u8; 4];

pub mod palette {
    use super::Rgba;

    pub const BACKGROUND: Rgba = [0x1a, 0x1f, 0x3a, 0xff];
    pub const DIRT: Rgba = [0x6b, 0x4f, 0x2a, 0xff];
    pub const GRASS: Rgba = [0x3f, 0x7d, 0x3a, 0xff];
    pub const VOID: Rgba = [0x00, 0x00, 0x00, 0x00];
    pub const STONE: Rgba = [0x4b, 0x55, 0x63, 0xff];
    pub const TREE: Rgba = [0x1f, 0x4d, 0x1c, 0xff];
    pub const ROCK: Rgba = [0x9c, 0xa3, 0xaf, 0xff];
    pub const WALL: Rgba = [0x92, 0x40, 0x0e, 0xff];
    pub const GRID: Rgba = [0xff, 0xff, 0xff, 0x1a];
    pub const HOVER: Rgba = [0xff, 0xff, 0xff, 0xcc];
    pub const PLAYER: Rgba = [0x8b, 0x5c, 0xf6, 0xff];
    pub const PLAYER_OUTLINE: Rgba = [0xc4, 0xb5, 0xfd, 0xff];
    pub const REMOTE_PLAYER: Rgba = [0xfb, 0xbf, 0x24, 0xff];
    pub const TEXT: Rgba = [0xff, 0xff, 0xff, 0xff];
    pub const PANEL: Rgba = [0x00, 0x00, 0x00, 0x80];
}

/// Colour a tile is drawn with.
pub fn tile_color(tile: &Tile) -> Rgba {
    match tile.kind {
        TileKind::Empty => match tile.ground {
            Ground::Dirt => palette::DIRT,
            Ground::Grass => palette::GRASS,
            Ground::Void => palette::VOID,
        },
        TileKind::Solid => palette::STONE,
        TileKind::Resource { material, .. } => match material {
            Material::Tree => palette::TREE,
            Material::Rock => palette::ROCK,
            Material::Wall => palette::WALL,
        },
    }
}

/// An axis-aligned rectangle, in whatever space the current transform maps from.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Rect {
    pub origin: Point2<f32>,
    pub size: Vector2<f32>,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Rect {
            origin: Point2::new(x, y),
            size: Vector2::new(width, height),
        }
    }

    /// A rectangle of `half_extents * 2` centred on `centre`.
    pub fn centred(centre: Point2<f32>, half_extents: Vector2<f32>) -> Self {
        Rect {
            origin: centre - half_extents,
            size: half_extents * 2.0,
        }
    }
}

/// One tile of a chunk's draw list, laid out for direct upload to a vertex buffer.
///
/// # Memory Layout
/// - Origin: [f32; 2] (8 bytes)
/// - Size: f32 (4 bytes)
/// - Colour: [u8; 4] (4 bytes)
///
/// Total size: 16 bytes
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct TileQuad {
    /// Top-left corner in world units
    pub origin: [f32; 2],
    /// Edge length in world units
    pub size: f32,
    pub color: Rgba,
}

/// Receives draw commands. Coordinates pass through the current transform, which starts
/// as the identity (screen pixels) and is changed with `save`, `translate`, `scale` and
/// `restore`.
pub trait RenderTarget {
    fn clear(&mut self, color: Rgba);
    fn save(&mut self);
    fn restore(&mut self);
    fn translate(&mut self, offset: Vector2<f32>);
    fn scale(&mut self, factor: f32);
    fn fill_rect(&mut self, rect: Rect, color: Rgba);
    fn stroke_rect(&mut self, rect: Rect, color: Rgba, line_width: f32);
    fn fill_text(&mut self, text: &str, position: Point2<f32>, color: Rgba);
    /// Draws the cached tile quads of one chunk.
    fn draw_tile_quads(&mut self, chunk: ChunkCoord, quads: &[TileQuad]);
}

/// A recorded draw command.
#[derive(Clone, Debug, PartialEq)]
pub enum DrawCommand {
    Clear(Rgba),
    Save,
    Restore,
    Translate(Vector2<f32>),
    Scale(f32),
    FillRect(Rect, Rgba),
    StrokeRect(Rect, Rgba, f32),
    FillText(String, Point2<f32>, Rgba),
    TileQuads { chunk: ChunkCoord, count: usize },
}

/// A target that only remembers what it was asked to draw.
#[derive(Debug, Default)]
pub struct RecordingTarget {
    pub commands: Vec<DrawCommand>,
}

impl RecordingTarget {
    pub fn new() -> Self {
        Self::default()
    }

    /// Chunks submitted since the last clear of the command list, in submission order.
    pub fn drawn_chunks(&self) -> Vec<ChunkCoord> {
        self.commands
            .iter()
            .filter_map(|command| match command {
                DrawCommand::TileQuads { chunk, .. } => Some(*chunk),
                _ => None,
            })
            .collect()
    }

    /// All text drawn, in order.
    pub fn texts(&self) -> Vec<&str> {
        self.commands
            .iter()
            .filter_map(|command| match command {
                DrawCommand::FillText(text, ..) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Whether every `save` was matched by a `restore`.
    pub fn is_balanced(&self) -> bool {
        let mut depth = 0i32;
        for command in &self.commands {
            match command {
                DrawCommand::Save => depth += 1,
                DrawCommand::Restore => {
                    depth -= 1;
                    if depth < 0 {
                        return false;
                    }
                }
                _ => {}
            }
        }
        depth == 0
    }

    pub fn reset(&mut self) {
        self.commands.clear();
    }
}

impl RenderTarget for RecordingTarget {
    fn clear(&mut self, color: Rgba) {
        self.commands.push(DrawCommand::Clear(color));
    }

    fn save(&mut self) {
        self.commands.push(DrawCommand::Save);
    }

    fn restore(&mut self) {
        self.commands.push(DrawCommand::Restore);
    }

    fn translate(&mut self, offset: Vector2<f32>) {
        self.commands.push(DrawCommand::Translate(offset));
    }

    fn scale(&mut self, factor: f32) {
        self.commands.push(DrawCommand::Scale(factor));
    }

    fn fill_rect(&mut self, rect: Rect, color: Rgba) {
        self.commands.push(DrawCommand::FillRect(rect, color));
    }

    fn stroke_rect(&mut self, rect: Rect, color: Rgba, line_width: f32) {
        self.commands
            .push(DrawCommand::StrokeRect(rect, color, line_width));
    }

    fn fill_text(&mut self, text: &str, position: Point2<f32>, color: Rgba) {
        self.commands
            .push(DrawCommand::FillText(text.to_string(), position, color));
    }

    fn draw_tile_quads(&mut self, chunk: ChunkCoord, quads: &[TileQuad]) {
        self.commands.push(DrawCommand::TileQuads {
            chunk,
            count: quads.len(),
        });
    }
}
