//! # Engine Configuration
//!
//! Tunables for a play session. Every field has a default, so a configuration file only
//! needs to name the values it overrides:
//!
//! ```json
//! { "maxChunksPerFrame": 4, "defaultZoom": 2.0 }
//! ```
//!
//! Values are checked once by [`EngineConfig::validate`] before a session is built, so the
//! frame loop never sees a zero tile size or an inverted zoom range.

use std::{fs, path::Path};

use cgmath::Point2;
use log::{info, warn};
use serde::Deserialize;
use thiserror::Error;

use crate::engine_state::tiles::tile::Material;

/// Errors raised while loading or validating an [`EngineConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("could not parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid config value `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Terrain source used for freshly requested chunks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerationMethod {
    /// Sine-field ground with noise-placed trees, rocks and stone.
    Terrain,
    /// Open dirt everywhere.
    Flat,
}

/// Session configuration, deserialized from camelCase JSON.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    /// World units per tile edge.
    pub tile_size: f32,
    /// Tiles per chunk edge.
    pub chunk_size: usize,
    /// Chunks generated on each side of the origin; `None` for an unbounded world.
    pub world_radius_chunks: Option<i32>,
    pub seed: u32,
    pub generation: GenerationMethod,
    /// Worker threads for chunk generation. Zero generates inline at the frame boundary.
    pub generation_workers: usize,

    pub viewport_width: f32,
    pub viewport_height: f32,
    pub default_zoom: f32,
    pub min_zoom: f32,
    pub max_zoom: f32,
    /// Multiplicative zoom change per scroll line.
    pub zoom_step: f32,
    /// Freelook pan speed in screen pixels per second.
    pub camera_pan_speed: f32,

    pub player_speed: f32,
    pub player_width: f32,
    pub player_height: f32,
    pub max_health: f32,
    pub spawn: [f32; 2],

    pub interaction_radius: f32,
    /// Material name placed by the secondary action.
    pub place_material: String,

    pub max_chunks_per_frame: usize,
    /// Extra ring of chunks around the viewport that is loaded and drawn ahead of time.
    pub prefetch_margin_chunks: i32,
    pub draw_cache_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tile_size: 16.0,
            chunk_size: 16,
            world_radius_chunks: Some(512),
            seed: 0,
            generation: GenerationMethod::Terrain,
            generation_workers: 2,
            viewport_width: 1200.0,
            viewport_height: 700.0,
            default_zoom: 3.0,
            min_zoom: 0.25,
            max_zoom: 10.0,
            zoom_step: 1.1,
            camera_pan_speed: 600.0,
            player_speed: 200.0,
            player_width: 16.0,
            player_height: 16.0,
            max_health: 100.0,
            spawn: [128.0, 128.0],
            interaction_radius: 100.0,
            place_material: "wall".to_string(),
            max_chunks_per_frame: 10,
            prefetch_margin_chunks: 1,
            draw_cache_capacity: 512,
        }
    }
}

impl EngineConfig {
    /// Parses and validates a JSON configuration.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates the configuration file at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path.as_ref())?;
        let config = Self::from_json_str(&json)?;
        info!("Loaded config from {}", path.as_ref().display());
        Ok(config)
    }

    /// Like [`EngineConfig::load`], but falls back to the defaults when the file is
    /// missing or unusable.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        match Self::load(path.as_ref()) {
            Ok(config) => config,
            Err(err) => {
                warn!(
                    "Using default config ({}): {}",
                    path.as_ref().display(),
                    err
                );
                Self::default()
            }
        }
    }

    /// Spawn position requested by the configuration, in world units.
    pub fn spawn_point(&self) -> Point2<f32> {
        Point2::new(self.spawn[0], self.spawn[1])
    }

    /// The material placed by the secondary action. Only meaningful after validation.
    pub fn place_material(&self) -> Option<Material> {
        Material::from_name(&self.place_material)
    }

    /// Rejects values the engine cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("tileSize", self.tile_size)?;
        positive("viewportWidth", self.viewport_width)?;
        positive("viewportHeight", self.viewport_height)?;
        positive("minZoom", self.min_zoom)?;
        positive("maxZoom", self.max_zoom)?;
        positive("zoomStep", self.zoom_step)?;
        positive("playerWidth", self.player_width)?;
        positive("playerHeight", self.player_height)?;
        positive("maxHealth", self.max_health)?;
        non_negative("playerSpeed", self.player_speed)?;
        non_negative("cameraPanSpeed", self.camera_pan_speed)?;
        non_negative("interactionRadius", self.interaction_radius)?;

        if self.chunk_size == 0 {
            return Err(invalid("chunkSize", "must be at least 1"));
        }
        if self.min_zoom > self.max_zoom {
            return Err(invalid(
                "minZoom",
                format!("{} is above maxZoom {}", self.min_zoom, self.max_zoom),
            ));
        }
        if !self.default_zoom.is_finite() {
            return Err(invalid("defaultZoom", "must be finite"));
        }
        if !self.spawn.iter().all(|v| v.is_finite()) {
            return Err(invalid("spawn", "must be a finite point"));
        }
        if let Some(radius) = self.world_radius_chunks {
            if radius < 1 {
                return Err(invalid("worldRadiusChunks", "must be at least 1"));
            }
        }
        if self.prefetch_margin_chunks < 0 {
            return Err(invalid("prefetchMarginChunks", "must not be negative"));
        }
        if self.draw_cache_capacity == 0 {
            return Err(invalid("drawCacheCapacity", "must be at least 1"));
        }
        match self.place_material() {
            Some(material) if material.placement_cost().is_some() => Ok(()),
            Some(_) => Err(invalid(
                "placeMaterial",
                format!("`{}` cannot be placed", self.place_material),
            )),
            None => Err(invalid(
                "placeMaterial",
                format!("unknown material `{}`", self.place_material),
            )),
        }
    }
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.into(),
    }
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(invalid(field, format!("{value} is not a positive number")))
    }
}

fn non_negative(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(invalid(field, format!("{value} is not a non-negative number")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_are_valid() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.place_material(), Some(Material::Wall));
    }

    #[test]
    fn partial_json_keeps_remaining_defaults() {
        let config =
            EngineConfig::from_json_str(r#"{ "maxChunksPerFrame": 4, "defaultZoom": 2.0 }"#)
                .unwrap();
        assert_eq!(config.max_chunks_per_frame, 4);
        assert_eq!(config.default_zoom, 2.0);
        assert_eq!(config.tile_size, 16.0);
        assert_eq!(config.generation, GenerationMethod::Terrain);
    }

    #[test]
    fn inverted_zoom_range_is_rejected() {
        let err = EngineConfig::from_json_str(r#"{ "minZoom": 4.0, "maxZoom": 2.0 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "minZoom", .. }));
    }

    #[test]
    fn unplaceable_material_is_rejected() {
        let err = EngineConfig::from_json_str(r#"{ "placeMaterial": "tree" }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "placeMaterial", .. }));

        let err = EngineConfig::from_json_str(r#"{ "placeMaterial": "lava" }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "placeMaterial", .. }));
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let err = EngineConfig::from_json_str("{ tileSize: ").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn load_reads_file_and_falls_back_when_missing() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "generation": "flat", "chunkSize": 8 }}"#).unwrap();

        let config = EngineConfig::load(file.path()).unwrap();
        assert_eq!(config.generation, GenerationMethod::Flat);
        assert_eq!(config.chunk_size, 8);

        let dir = tempfile::tempdir().unwrap();
        let fallback = EngineConfig::load_or_default(dir.path().join("missing.json"));
        assert_eq!(fallback.chunk_size, 16);
    }
}
