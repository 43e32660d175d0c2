//! # Terrain Errors
//!
//! Every fallible operation in the terrain engine returns a [`TerrainResult`].
//! The variants fall into four families:
//!
//! * **Configuration faults** - the block catalog or the engine configuration
//!   cannot produce a valid answer. Fatal to the call that hit them.
//! * **Programmer faults** - e.g. loading a chunk that never had a height field.
//! * **Lookup misses** - a position or key that is simply not loaded. Callers
//!   treat these as "not here" rather than crashing.
//! * **Persistence misses and I/O** - a save that does not exist signals
//!   "start fresh"; the remaining variants wrap the encoding collaborators.

use thiserror::Error;

use crate::engine_state::voxels::{block::block_type::BlockType, chunk::ChunkKey};

/// Result alias used across the crate.
pub type TerrainResult<T> = Result<T, TerrainError>;

/// Errors raised by terrain generation, streaming, editing and persistence.
#[derive(Debug, Error)]
pub enum TerrainError {
    /// No catalog band covers the requested normalized height ratio.
    #[error("no block type covers height ratio {ratio}")]
    ConfigurationFault { ratio: f32 },

    /// A configuration value was rejected by validation.
    #[error("invalid terrain configuration: {0}")]
    InvalidConfig(String),

    /// A chunk was asked to load from noise without ever owning a height field.
    #[error("chunk {key} has no height field to load from")]
    MissingHeightField { key: ChunkKey },

    /// The world position is outside the active window.
    #[error("no active chunk covers world position ({x}, {z})")]
    ChunkNotLoaded { x: f32, z: f32 },

    /// The key does not name any chunk that was ever generated.
    #[error("unknown chunk {key}")]
    UnknownChunk { key: ChunkKey },

    /// The pool was asked for, or handed back, a block bound to `BlockType::None`.
    #[error("block type {0:?} cannot be pooled")]
    InvalidBlockType(BlockType),

    /// A block already sits at the target position.
    #[error("position ({x}, {y}, {z}) is already occupied")]
    PositionOccupied { x: i32, y: i32, z: i32 },

    /// The requested save record does not exist.
    #[error("save data not found: {0}")]
    PersistenceMiss(String),

    /// The tracked entity never became available to the window-follow process.
    #[error("tracked entity did not become available in time")]
    EntityUnavailable,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("height map image error: {0}")]
    HeightMapImage(#[from] image::ImageError),

    /// A persisted height map image does not match the chunk it belongs to.
    #[error("height map is {width}x{height}, expected {expected}x{expected}")]
    CorruptHeightMap { expected: u32, width: u32, height: u32 },

    /// A persisted block record names an unknown or unplaceable type id.
    #[error("unknown block type id {0} in save data")]
    UnknownBlockTypeId(i32),

    #[error("config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),
}

impl TerrainError {
    /// Whether the error only means "not loaded / not saved" and the caller can fall back.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            TerrainError::ChunkNotLoaded { .. }
                | TerrainError::UnknownChunk { .. }
                | TerrainError::PersistenceMiss(_)
                | TerrainError::PositionOccupied { .. }
        )
    }
}
