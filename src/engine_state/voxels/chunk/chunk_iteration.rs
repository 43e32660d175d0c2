//! # Chunk Iteration Module
//!
//! This module provides an iterator over the blocks a chunk currently holds.
//!
//! A chunk only stores handles; positions and types live in the
//! [`BlockPool`] arena. The `ChunkBlockIterator` resolves each handle against
//! the pool and yields a [`BlockSnapshot`], the same `(position, type)` pair
//! the chunk persists when it is disabled or saved.

use std::collections::hash_set;

use crate::engine_state::voxels::{block::BlockId, pool::BlockPool};

use super::{BlockSnapshot, TerrainChunk};

/// An iterator over a chunk's active ground blocks, then its invisible blocks.
///
/// Handles that the pool no longer considers active are skipped.
pub struct ChunkBlockIterator<'a> {
    /// Arena the chunk's handles resolve against
    pool: &'a BlockPool,
    /// Remaining visible handles, `None` once filtered out
    ground: Option<hash_set::Iter<'a, BlockId>>,
    /// Remaining invisible handles, `None` once filtered out
    invisible: Option<hash_set::Iter<'a, BlockId>>,
}

impl<'a> ChunkBlockIterator<'a> {
    /// Creates a new `ChunkBlockIterator` over every block of `chunk_ref`.
    ///
    /// # Arguments
    /// * `chunk_ref` - The chunk to iterate over
    /// * `pool` - The pool owning the chunk's block instances
    pub fn new(chunk_ref: &'a TerrainChunk, pool: &'a BlockPool) -> Self {
        ChunkBlockIterator {
            pool,
            ground: Some(chunk_ref.ground_blocks().iter()),
            invisible: Some(chunk_ref.invisible_blocks().iter()),
        }
    }

    /// Restricts the iteration to visible ground blocks.
    pub fn ground(mut self) -> Self {
        self.invisible = None;
        self
    }

    /// Restricts the iteration to invisible blocks.
    pub fn invisible(mut self) -> Self {
        self.ground = None;
        self
    }

    /// Gets the next active block of the chunk.
    ///
    /// # Returns
    /// - `Some(snapshot)` with the block's world position and type
    /// - `None` once both sets are exhausted
    pub fn get_next_block(&mut self) -> Option<BlockSnapshot> {
        loop {
            let id = if let Some(ground) = self.ground.as_mut() {
                match ground.next() {
                    Some(id) => *id,
                    None => {
                        self.ground = None;
                        continue;
                    }
                }
            } else {
                *self.invisible.as_mut()?.next()?
            };

            match self.pool.get(id) {
                Some(block) if block.active => {
                    return Some(BlockSnapshot {
                        position: block.position,
                        block_type: block.block_type,
                    })
                }
                _ => continue,
            }
        }
    }
}

impl Iterator for ChunkBlockIterator<'_> {
    type Item = BlockSnapshot;

    fn next(&mut self) -> Option<Self::Item> {
        self.get_next_block()
    }
}
