//! # Streaming Configuration
//!
//! Tunables for the chunk lifecycle: chunk edge length, residency radii and
//! hysteresis margins, per-frame budgets, which stages run on workers, and the
//! ray-cast step.
//!
//! Configuration is plain JSON. Every field is optional and falls back to the
//! defaults below, so an empty object `{}` is a valid configuration.
//!
//! ```
//! use voxel_stream::config::StreamingConfig;
//!
//! let config = StreamingConfig::from_json_str(r#"{ "render_distance": 4 }"#).unwrap();
//! assert_eq!(config.render_distance, 4);
//! assert_eq!(config.chunk_size, 32);
//! ```

use std::{fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Runtime configuration for a [`ChunkManager`](crate::engine_state::voxels::world::ChunkManager).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamingConfig {
    /// Edge length of a chunk in voxels. Fixed for the lifetime of a manager.
    pub chunk_size: usize,
    /// View distance in chunks.
    pub render_distance: u32,
    /// Chunks within `render_distance * load_margin` get loaded.
    pub load_margin: f32,
    /// Chunks beyond `render_distance * unload_margin` get unloaded.
    pub unload_margin: f32,
    /// Generation requests started per residency update.
    pub max_loads_per_frame: usize,
    /// Chunks evicted per residency update.
    pub max_unloads_per_frame: usize,
    /// Mesh builds started per rebuild pass.
    pub max_mesh_rebuilds_per_frame: usize,
    /// Generate terrain on the task executor instead of inline.
    pub async_generation: bool,
    /// Build meshes on the task executor instead of inline.
    pub async_meshing: bool,
    /// Apply sphere edits on the task executor instead of inline.
    pub async_editing: bool,
    /// Compute tight bounds from solid content for culling.
    pub compute_tight_bounds: bool,
    /// Sample spacing of the fixed-step ray cast.
    pub ray_step: f32,
    /// Worker threads for the task manager. Zero runs tasks inline.
    pub worker_threads: usize,
    /// Seed for the default terrain generator.
    pub seed: u32,
}

impl Default for StreamingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 32,
            render_distance: 8,
            load_margin: 1.1,
            unload_margin: 1.5,
            max_loads_per_frame: 4,
            max_unloads_per_frame: 1,
            max_mesh_rebuilds_per_frame: 2,
            async_generation: true,
            async_meshing: true,
            async_editing: true,
            compute_tight_bounds: true,
            ray_step: 0.1,
            worker_threads: 4,
            seed: 0,
        }
    }
}

impl StreamingConfig {
    /// A configuration with every stage running inline on the calling thread.
    pub fn synchronous() -> Self {
        Self {
            async_generation: false,
            async_meshing: false,
            async_editing: false,
            worker_threads: 0,
            ..Self::default()
        }
    }

    /// Parses and validates a JSON configuration.
    pub fn from_json_str(json: &str) -> Result<Self, EngineError> {
        let config: StreamingConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a JSON configuration file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, EngineError> {
        let contents = fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    /// Radius in chunks inside which chunks are requested.
    pub fn load_radius(&self) -> f32 {
        self.render_distance as f32 * self.load_margin
    }

    /// Radius in chunks beyond which resident chunks are evicted.
    pub fn unload_radius(&self) -> f32 {
        self.render_distance as f32 * self.unload_margin
    }

    /// Checks the invariants the lifecycle relies on.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.chunk_size == 0 {
            return Err(EngineError::InvalidConfig(
                "chunk_size must be at least 1".to_string(),
            ));
        }
        if !(self.load_margin > 0.0) {
            return Err(EngineError::InvalidConfig(format!(
                "load_margin must be positive, got {}",
                self.load_margin
            )));
        }
        if self.unload_margin < self.load_margin {
            return Err(EngineError::InvalidConfig(format!(
                "unload_margin ({}) must not be smaller than load_margin ({})",
                self.unload_margin, self.load_margin
            )));
        }
        if !(self.ray_step > 0.0) {
            return Err(EngineError::InvalidConfig(format!(
                "ray_step must be positive, got {}",
                self.ray_step
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = StreamingConfig::default();
        assert_eq!(config.chunk_size, 32);
        assert_eq!(config.max_loads_per_frame, 4);
        assert_eq!(config.max_unloads_per_frame, 1);
        assert_eq!(config.max_mesh_rebuilds_per_frame, 2);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn empty_object_is_valid() {
        let config = StreamingConfig::from_json_str("{}").unwrap();
        assert_eq!(config, StreamingConfig::default());
    }

    #[test]
    fn hysteresis_gap_between_radii() {
        let config = StreamingConfig {
            render_distance: 10,
            ..StreamingConfig::default()
        };
        assert!((config.load_radius() - 11.0).abs() < 1e-4);
        assert!((config.unload_radius() - 15.0).abs() < 1e-4);
    }

    #[test]
    fn rejects_inverted_margins() {
        let result = StreamingConfig::from_json_str(r#"{ "load_margin": 2.0, "unload_margin": 1.2 }"#);
        assert!(matches!(result, Err(EngineError::InvalidConfig(_))));
    }

    #[test]
    fn rejects_zero_chunk_size() {
        let config = StreamingConfig {
            chunk_size: 0,
            ..StreamingConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let result = StreamingConfig::from_json_str("{ render_distance: }");
        assert!(matches!(result, Err(EngineError::ConfigParse(_))));
    }
}
