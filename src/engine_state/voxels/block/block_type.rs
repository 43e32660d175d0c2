//! # Block Type Module
//!
//! This module defines the closed palette of block types in the terrain.
//! It provides conversion to and from the compact integer ids used by the save format.

use num_derive::FromPrimitive;

use super::BlockTypeSize;

/// Enumerates all possible block types in the terrain.
///
/// The discriminants are the persisted `blockTypeId`s, so the order is part of
/// the save format. The `FromPrimitive` derive allows conversion back from integers.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, FromPrimitive)]
pub enum BlockType {
    /// Plain dirt, found under grass.
    Dirt = 0,

    /// Dirt with a grass top, the common lowland surface.
    DirtGrass = 1,

    /// Bare rock of the upper slopes.
    Stone = 2,

    /// Snow-capped stone at the peaks.
    StoneSnow = 3,

    /// Sand in the lowest bands.
    Sand = 4,

    /// Ice, only ever placed by building.
    Ice = 5,

    /// Placeholder solid kept one unit under the visible skin.
    ///
    /// Never rendered; used to detect where a dig exposes empty space.
    Invisible = 6,

    /// Sentinel for "no matching rule". Never bound to a placed block.
    None = 7,
}

/// Number of block types that can exist in the pool (everything but `None`).
pub const REAL_BLOCK_TYPE_COUNT: usize = 7;

impl BlockType {
    /// Every real block type, in id order.
    pub const ALL: [BlockType; REAL_BLOCK_TYPE_COUNT] = [
        BlockType::Dirt,
        BlockType::DirtGrass,
        BlockType::Stone,
        BlockType::StoneSnow,
        BlockType::Sand,
        BlockType::Ice,
        BlockType::Invisible,
    ];

    /// Converts a persisted id to a `BlockType`.
    ///
    /// # Returns
    /// `None` if the id does not name a block type.
    pub fn from_id(id: i32) -> Option<Self> {
        num::FromPrimitive::from_i32(id)
    }

    /// Id used by the save format.
    pub fn id(self) -> i32 {
        self as i32
    }

    /// Compact storage form, used to index per-type tables.
    pub fn as_size(self) -> BlockTypeSize {
        self as BlockTypeSize
    }

    /// Whether this block is part of the visible terrain skin.
    pub fn is_visible(self) -> bool {
        !matches!(self, BlockType::Invisible | BlockType::None)
    }
}
