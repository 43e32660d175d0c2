//! # Terrain Configuration
//!
//! Tunables for generation and streaming. Defaults live in the constants below;
//! a TOML file can override any subset of them.
//!
//! ```toml
//! chunk_size = 16
//! noise_scale = 1.5
//! window_size = 5
//! ```

use std::{path::Path, time::Duration};

use serde::{Deserialize, Serialize};

use super::error::{TerrainError, TerrainResult};

/// Side of a chunk in blocks.
pub const DEFAULT_CHUNK_SIZE: i32 = 16;
/// Noise-space distance covered by one chunk. Bigger is hillier.
pub const DEFAULT_NOISE_SCALE: f32 = 1.0;
/// Noise offset of the chunk at the world origin.
pub const DEFAULT_NOISE_START_OFFSET: [f32; 2] = [0.5, 0.5];
/// Number of chunks along each side of the active window.
pub const DEFAULT_WINDOW_SIZE: usize = 3;
/// Height of the tallest possible column.
pub const DEFAULT_MAX_CHUNK_HEIGHT: i32 = 16;
/// Sleep between two window-follow checks.
pub const DEFAULT_FOLLOW_INTERVAL_MS: u64 = 1000;
/// How long the window-follow process waits for the tracked entity.
pub const DEFAULT_ENTITY_WAIT_TIMEOUT_MS: u64 = 5000;

/// Engine configuration, deserializable from TOML.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainConfig {
    pub chunk_size: i32,
    pub noise_scale: f32,
    pub noise_start_offset: [f32; 2],
    pub noise_seed: u32,
    pub window_size: usize,
    pub max_chunk_height: i32,
    pub follow_interval_ms: u64,
    pub entity_wait_timeout_ms: u64,
    /// Pick a random start offset for new worlds instead of `noise_start_offset`.
    pub randomize_start_offset: bool,
    pub save_directory: String,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        TerrainConfig {
            chunk_size: DEFAULT_CHUNK_SIZE,
            noise_scale: DEFAULT_NOISE_SCALE,
            noise_start_offset: DEFAULT_NOISE_START_OFFSET,
            noise_seed: 0,
            window_size: DEFAULT_WINDOW_SIZE,
            max_chunk_height: DEFAULT_MAX_CHUNK_HEIGHT,
            follow_interval_ms: DEFAULT_FOLLOW_INTERVAL_MS,
            entity_wait_timeout_ms: DEFAULT_ENTITY_WAIT_TIMEOUT_MS,
            randomize_start_offset: false,
            save_directory: "saves".to_string(),
        }
    }
}

impl TerrainConfig {
    /// Parses a configuration from TOML text and validates it.
    pub fn from_toml_str(text: &str) -> TerrainResult<Self> {
        let config: TerrainConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads a configuration file. A missing file yields the defaults.
    pub fn load(path: impl AsRef<Path>) -> TerrainResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            log::info!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Rejects values the generator cannot work with.
    pub fn validate(&self) -> TerrainResult<()> {
        if self.chunk_size <= 0 {
            return Err(TerrainError::InvalidConfig(format!(
                "chunk_size must be positive, got {}",
                self.chunk_size
            )));
        }
        if self.window_size < 3 {
            return Err(TerrainError::InvalidConfig(format!(
                "window_size must be at least 3, got {}",
                self.window_size
            )));
        }
        if !self.noise_scale.is_finite() || self.noise_scale <= 0.0 {
            return Err(TerrainError::InvalidConfig(format!(
                "noise_scale must be positive and finite, got {}",
                self.noise_scale
            )));
        }
        if self.max_chunk_height <= 0 {
            return Err(TerrainError::InvalidConfig(format!(
                "max_chunk_height must be positive, got {}",
                self.max_chunk_height
            )));
        }
        Ok(())
    }

    /// Start offset for a brand-new world.
    pub fn start_offset(&self) -> [f32; 2] {
        if self.randomize_start_offset {
            [fastrand::f32() * 10_000.0, fastrand::f32() * 10_000.0]
        } else {
            self.noise_start_offset
        }
    }

    pub fn follow_interval(&self) -> Duration {
        Duration::from_millis(self.follow_interval_ms)
    }

    pub fn entity_wait_timeout(&self) -> Duration {
        Duration::from_millis(self.entity_wait_timeout_ms)
    }
}
