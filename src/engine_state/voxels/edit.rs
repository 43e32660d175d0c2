//! # Edit Module
//!
//! Player edits to the terrain: aiming, building and digging.
//!
//! ## Hole covering
//!
//! The terrain is a shell of visible blocks over an `Invisible` skirt. Digging
//! a block at `P` would open a hole into that skirt, so before the block is
//! removed every `Invisible` neighbour of `P` (a "face") is turned into the
//! material the dug block reveals. Around each face the skirt is first
//! extended into every empty cell, so the freshly revealed blocks have a
//! skirt of their own for the next dig.
//!
//! The dug block stays in place until the faces are converted, which keeps the
//! skirt walk from refilling `P` itself.

use std::collections::BTreeSet;

use cgmath::{InnerSpace, Point3, Vector3};
use log::{debug, warn};

use crate::core::error::{TerrainError, TerrainResult};

use super::{
    block::{block_side::BlockSide, block_type::BlockType, BlockId},
    chunk::ChunkKey,
    pool::BlockPool,
    world::ChunkGrid,
};

/// Reach used by [`EditEngine::target`].
pub const DEFAULT_REACH: f32 = 8.0;

/// Result of an aim ray against the visible terrain.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RayHit {
    pub block: BlockId,
    pub block_type: BlockType,
    pub position: Point3<i32>,
    /// Unit axis vector of the face the ray entered through.
    pub normal: Vector3<i32>,
}

impl RayHit {
    /// Cell a block built against the hit face would occupy.
    pub fn build_target(&self) -> Point3<i32> {
        self.position + self.normal
    }
}

/// Applies dig and build edits to the pool and the chunk grid.
#[derive(Clone, Debug)]
pub struct EditEngine {
    reach: f32,
}

impl Default for EditEngine {
    fn default() -> Self {
        EditEngine {
            reach: DEFAULT_REACH,
        }
    }
}

impl EditEngine {
    pub fn new(reach: f32) -> Self {
        EditEngine { reach }
    }

    pub fn reach(&self) -> f32 {
        self.reach
    }

    /// Aims from `origin` along `direction` within the engine's reach.
    pub fn target(
        &self,
        pool: &BlockPool,
        origin: Point3<f32>,
        direction: Vector3<f32>,
    ) -> Option<RayHit> {
        self.raycast(pool, origin, direction, self.reach)
    }

    /// Walks the lattice cells crossed by a ray and returns the first visible block.
    ///
    /// Blocks are unit cubes centred on their lattice point. `Invisible` blocks
    /// are transparent to the ray.
    pub fn raycast(
        &self,
        pool: &BlockPool,
        origin: Point3<f32>,
        direction: Vector3<f32>,
        max_distance: f32,
    ) -> Option<RayHit> {
        if direction.magnitude2() == 0.0 {
            return None;
        }
        let direction = direction.normalize();
        let origin = origin + Vector3::new(0.5, 0.5, 0.5);

        let mut cell = Point3::new(
            origin.x.floor() as i32,
            origin.y.floor() as i32,
            origin.z.floor() as i32,
        );
        let step = Vector3::new(
            if direction.x > 0.0 { 1 } else { -1 },
            if direction.y > 0.0 { 1 } else { -1 },
            if direction.z > 0.0 { 1 } else { -1 },
        );
        let inv = Vector3::new(
            if direction.x != 0.0 { 1.0 / direction.x.abs() } else { f32::INFINITY },
            if direction.y != 0.0 { 1.0 / direction.y.abs() } else { f32::INFINITY },
            if direction.z != 0.0 { 1.0 / direction.z.abs() } else { f32::INFINITY },
        );
        // Ray distance to the first cell boundary along one axis.
        let boundary = |start: f32, index: i32, delta: f32, inv: f32| {
            if delta == 0.0 {
                f32::INFINITY
            } else if delta > 0.0 {
                ((index as f32 + 1.0) - start) * inv
            } else {
                (start - index as f32) * inv
            }
        };
        let mut t_max = Vector3::new(
            boundary(origin.x, cell.x, direction.x, inv.x),
            boundary(origin.y, cell.y, direction.y, inv.y),
            boundary(origin.z, cell.z, direction.z, inv.z),
        );

        let mut previous = cell;
        let mut distance = 0.0;
        while distance <= max_distance {
            if let Some(id) = pool.block_at(cell) {
                if let Some(block_type) = pool.block_type(id).filter(|block_type| block_type.is_visible()) {
                    return Some(RayHit {
                        block: id,
                        block_type,
                        position: cell,
                        normal: previous - cell,
                    });
                }
            }

            previous = cell;
            if t_max.x < t_max.y && t_max.x < t_max.z {
                distance = t_max.x;
                cell.x += step.x;
                t_max.x += inv.x;
            } else if t_max.y < t_max.z {
                distance = t_max.y;
                cell.y += step.y;
                t_max.y += inv.y;
            } else {
                distance = t_max.z;
                cell.z += step.z;
                t_max.z += inv.z;
            }
        }
        None
    }

    /// Builds a block of `block_type` at `target`.
    ///
    /// An `Invisible` block at the target is replaced. The owning chunk is the
    /// active chunk covering the target column, and it is marked changed.
    ///
    /// # Errors
    /// - `PositionOccupied` if a visible block is already there
    /// - `ChunkNotLoaded` if the column is outside the active window
    pub fn place_block(
        &self,
        grid: &mut ChunkGrid,
        pool: &mut BlockPool,
        block_type: BlockType,
        target: Point3<i32>,
    ) -> TerrainResult<BlockId> {
        if pool.is_visible_solid_at(target) {
            return Err(TerrainError::PositionOccupied {
                x: target.x,
                y: target.y,
                z: target.z,
            });
        }
        let owner = grid.chunk_key_at(target.x as f32, target.z as f32)?;

        if let Some(marker) = pool.block_at(target) {
            remove_from_owner(grid, pool, marker);
            pool.release(marker);
        }

        let id = pool.acquire_at(block_type, target, Some(owner))?;
        let chunk = grid.get_chunk_mut(owner)?;
        chunk.insert_block(id, block_type);
        chunk.mark_changed();
        debug!("Built {:?} at {:?} in chunk {}", block_type, target, owner);
        Ok(id)
    }

    /// Removes the visible block at `target`, covering the hole it leaves.
    ///
    /// # Returns
    /// The type of the removed block, or `None` if no visible block was there.
    pub fn dig_block(
        &self,
        grid: &mut ChunkGrid,
        pool: &mut BlockPool,
        target: Point3<i32>,
    ) -> TerrainResult<Option<BlockType>> {
        let Some(id) = pool.block_at(target) else {
            return Ok(None);
        };
        let Some(block) = pool.get(id).filter(|block| block.block_type.is_visible()) else {
            return Ok(None);
        };
        let dug_type = block.block_type;
        let owner = match block.owner {
            Some(owner) => owner,
            None => grid.chunk_key_at(target.x as f32, target.z as f32)?,
        };

        let exposed = grid
            .catalog()
            .exposed_when_dug(dug_type)
            .unwrap_or(dug_type);
        let mut touched = self.cover_holes(grid, pool, target, exposed, owner)?;
        touched.insert(owner);

        remove_from_owner(grid, pool, id);
        pool.release(id);
        for key in touched {
            grid.get_chunk_mut(key)?.mark_changed();
        }

        debug!("Dug {:?} at {:?}, exposing {:?}", dug_type, target, exposed);
        Ok(Some(dug_type))
    }

    /// Turns the `Invisible` neighbours of `position` into `exposed` blocks and
    /// extends the skirt around each of them.
    ///
    /// New skirt blocks go to the active chunk covering their column and are
    /// skipped outside the window. `fallback_owner` receives replacements for
    /// markers that have no owner.
    ///
    /// # Returns
    /// The chunks that gained or lost blocks.
    pub fn cover_holes(
        &self,
        grid: &mut ChunkGrid,
        pool: &mut BlockPool,
        position: Point3<i32>,
        exposed: BlockType,
        fallback_owner: ChunkKey,
    ) -> TerrainResult<BTreeSet<ChunkKey>> {
        let faces: Vec<(Point3<i32>, BlockId)> = BlockSide::all()
            .iter()
            .map(|side| side.step(position))
            .filter_map(|face| {
                pool.block_at(face)
                    .filter(|id| pool.block_type(*id) == Some(BlockType::Invisible))
                    .map(|id| (face, id))
            })
            .collect();

        let mut touched = BTreeSet::new();
        for (face, _) in &faces {
            for side in BlockSide::all() {
                let cell = side.step(*face);
                if pool.is_solid_at(cell) {
                    continue;
                }
                // Columns outside the window get their skirt when their chunk generates.
                let Ok(owner) = grid.chunk_key_at(cell.x as f32, cell.z as f32) else {
                    debug!("Skirt at {:?} left to its unloaded chunk", cell);
                    continue;
                };
                let id = pool.acquire_at(BlockType::Invisible, cell, Some(owner))?;
                grid.get_chunk_mut(owner)?.insert_block(id, BlockType::Invisible);
                touched.insert(owner);
            }
        }

        for (face, marker) in faces {
            if pool.is_free(marker) || pool.block_at(face) != Some(marker) {
                warn!("Skirt block {:?} at {:?} was already replaced", marker, face);
                continue;
            }
            let owner = pool
                .get(marker)
                .and_then(|block| block.owner)
                .unwrap_or(fallback_owner);
            remove_from_owner(grid, pool, marker);
            pool.release(marker);

            let id = pool.acquire_at(exposed, face, Some(owner))?;
            grid.get_chunk_mut(owner)?.insert_block(id, exposed);
            touched.insert(owner);
        }

        Ok(touched)
    }
}

fn remove_from_owner(grid: &mut ChunkGrid, pool: &BlockPool, id: BlockId) {
    let owner = pool.get(id).and_then(|block| block.owner);
    if let Some(chunk) = owner.and_then(|key| grid.get_chunk_mut(key).ok()) {
        chunk.remove_block(id);
    }
}
