//! # Block Pool
//!
//! Reusable inventory of block instances, keyed by block type, so chunk
//! (re)generation never pays allocation cost after warm-up.
//!
//! ## Ownership
//!
//! Every instance lives in one arena owned by the pool. A handle is either in
//! exactly one per-type free set (inactive) or placed in the world and held by
//! exactly one chunk's active collection, never both. `acquire` always removes
//! the handle from its free set before activating it; `release` always
//! deactivates before inserting.
//!
//! ## Spatial index
//!
//! The pool also keeps the lattice position of every placed block in a hash
//! map. This is the "is there solid matter at P" oracle used by generation and
//! by hole-covering; it is updated synchronously on every place and release.
//!
//! The free lists are sets rather than queues: reuse order is irrelevant, and
//! set membership gives O(1) "is this exact handle free" checks.

use std::collections::{HashMap, HashSet};

use cgmath::Point3;
use log::{debug, error};

use crate::core::error::{TerrainError, TerrainResult};

use super::{
    block::{
        block_type::{BlockType, REAL_BLOCK_TYPE_COUNT},
        Block, BlockId,
    },
    chunk::ChunkKey,
};

/// Arena and free lists of block instances.
#[derive(Debug, Default)]
pub struct BlockPool {
    blocks: Vec<Block>,
    available: [HashSet<BlockId>; REAL_BLOCK_TYPE_COUNT],
    occupancy: HashMap<Point3<i32>, BlockId>,
}

impl BlockPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hands out an active block of `block_type`, reusing a free one when possible.
    ///
    /// The returned handle is active but not yet placed; see [`BlockPool::place`].
    ///
    /// # Errors
    /// `InvalidBlockType` when asked for the `None` sentinel.
    pub fn acquire(&mut self, block_type: BlockType) -> TerrainResult<BlockId> {
        if block_type == BlockType::None {
            return Err(TerrainError::InvalidBlockType(block_type));
        }

        let bucket = &mut self.available[block_type.as_size() as usize];
        let id = match bucket.iter().next().copied() {
            Some(id) => {
                bucket.remove(&id);
                id
            }
            None => {
                let id = BlockId(self.blocks.len() as u32);
                self.blocks.push(Block::new(block_type));
                id
            }
        };

        self.blocks[id.0 as usize].active = true;
        Ok(id)
    }

    /// Moves an active block to `position` and records its owning chunk.
    ///
    /// # Returns
    /// The handle previously indexed at `position`, if the caller overwrote one.
    pub fn place(
        &mut self,
        id: BlockId,
        position: Point3<i32>,
        owner: Option<ChunkKey>,
    ) -> Option<BlockId> {
        let block = &mut self.blocks[id.0 as usize];
        if block.active && self.occupancy.get(&block.position) == Some(&id) {
            self.occupancy.remove(&block.position);
        }
        block.position = position;
        block.owner = owner;

        let displaced = self.occupancy.insert(position, id);
        if let Some(other) = displaced.filter(|other| *other != id) {
            error!(
                "Block {:?} placed over {:?} at {:?}",
                id, other, position
            );
            return Some(other);
        }
        None
    }

    /// Acquires a block of `block_type` and places it in one step.
    ///
    /// # Errors
    /// `PositionOccupied` if any block already sits at `position`. Nothing is
    /// acquired in that case.
    pub fn acquire_at(
        &mut self,
        block_type: BlockType,
        position: Point3<i32>,
        owner: Option<ChunkKey>,
    ) -> TerrainResult<BlockId> {
        if self.occupancy.contains_key(&position) {
            return Err(TerrainError::PositionOccupied {
                x: position.x,
                y: position.y,
                z: position.z,
            });
        }
        let id = self.acquire(block_type)?;
        self.place(id, position, owner);
        Ok(id)
    }

    /// Returns a block to its type's free set.
    ///
    /// Releasing a handle that is already free, or one bound to `None`, is an
    /// internal-consistency fault: it is logged and refused.
    ///
    /// # Returns
    /// `true` if the handle was released.
    pub fn release(&mut self, id: BlockId) -> bool {
        let Some(block) = self.blocks.get_mut(id.0 as usize) else {
            error!("Release of unknown block handle {:?}", id);
            return false;
        };

        if block.block_type == BlockType::None {
            error!("Refusing to release {:?} bound to BlockType::None", id);
            return false;
        }

        let bucket = &mut self.available[block.block_type.as_size() as usize];
        if !block.active || bucket.contains(&id) {
            error!("Block {:?} released twice", id);
            return false;
        }

        if self.occupancy.get(&block.position) == Some(&id) {
            self.occupancy.remove(&block.position);
        }
        block.active = false;
        block.owner = None;
        bucket.insert(id);
        true
    }

    pub fn get(&self, id: BlockId) -> Option<&Block> {
        self.blocks.get(id.0 as usize)
    }

    pub fn block_type(&self, id: BlockId) -> Option<BlockType> {
        self.get(id).map(|block| block.block_type)
    }

    pub fn position(&self, id: BlockId) -> Option<Point3<i32>> {
        self.get(id).map(|block| block.position)
    }

    /// O(1) check whether this exact handle currently sits in a free set.
    pub fn is_free(&self, id: BlockId) -> bool {
        self.block_type(id)
            .filter(|block_type| *block_type != BlockType::None)
            .map(|block_type| self.available[block_type.as_size() as usize].contains(&id))
            .unwrap_or(false)
    }

    /// Handle of the block occupying `position`, visible or not.
    pub fn block_at(&self, position: Point3<i32>) -> Option<BlockId> {
        self.occupancy.get(&position).copied()
    }

    /// Type of the block occupying `position`.
    pub fn type_at(&self, position: Point3<i32>) -> Option<BlockType> {
        self.block_at(position).and_then(|id| self.block_type(id))
    }

    /// Whether any block, including `Invisible` ones, occupies `position`.
    pub fn is_solid_at(&self, position: Point3<i32>) -> bool {
        self.occupancy.contains_key(&position)
    }

    /// Whether a visible (non-`Invisible`) block occupies `position`.
    pub fn is_visible_solid_at(&self, position: Point3<i32>) -> bool {
        self.type_at(position)
            .map(|block_type| block_type.is_visible())
            .unwrap_or(false)
    }

    /// Number of free blocks of `block_type`.
    pub fn available_count(&self, block_type: BlockType) -> usize {
        if block_type == BlockType::None {
            return 0;
        }
        self.available[block_type.as_size() as usize].len()
    }

    /// Number of instances of `block_type` ever constructed.
    pub fn created_count(&self, block_type: BlockType) -> usize {
        self.blocks
            .iter()
            .filter(|block| block.block_type == block_type)
            .count()
    }

    /// Number of placed or handed-out blocks of `block_type`.
    pub fn active_count(&self, block_type: BlockType) -> usize {
        self.blocks
            .iter()
            .filter(|block| block.block_type == block_type && block.active)
            .count()
    }

    /// Number of indexed lattice positions.
    pub fn occupied_count(&self) -> usize {
        self.occupancy.len()
    }

    pub fn log_stats(&self) {
        for block_type in BlockType::ALL {
            debug!(
                "{:?}: {} created, {} free",
                block_type,
                self.created_count(block_type),
                self.available_count(block_type)
            );
        }
    }
}
