//! # Block Module
//!
//! This module provides the core block-related functionality for the terrain engine.
//! It includes block type definitions, block faces, the static block catalog and
//! the placed block record handed out by the pool.

use cgmath::Point3;

use block_type::BlockType;

use super::chunk::ChunkKey;

pub mod block_side;
pub mod block_type;
pub mod catalog;

/// The underlying integer type used to represent block types in memory.
pub type BlockTypeSize = u8;

/// Handle to a block instance owned by the [`BlockPool`](super::pool::BlockPool) arena.
///
/// Handles are stable for the lifetime of the pool; a released handle is
/// reused by a later `acquire` of the same type.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockId(pub u32);

/// A placed unit of terrain.
///
/// The type is bound when the instance is first constructed and never changes;
/// position and owner change every time the instance is handed out again.
#[derive(Clone, Debug, PartialEq)]
pub struct Block {
    pub block_type: BlockType,
    pub position: Point3<i32>,
    /// Chunk whose active set holds this block, if any.
    pub owner: Option<ChunkKey>,
    /// Active blocks are placed in the world; inactive ones sit in the pool.
    pub active: bool,
}

impl Block {
    /// Creates a fresh, inactive block bound to `block_type`.
    pub fn new(block_type: BlockType) -> Self {
        Block {
            block_type,
            position: Point3::new(0, 0, 0),
            owner: None,
            active: false,
        }
    }
}
