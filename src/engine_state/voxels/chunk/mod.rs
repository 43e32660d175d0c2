//! # Chunk Module
//!
//! This module provides the `TerrainChunk` struct: one square column of terrain
//! that owns its height field, the block handles it placed, and the snapshot
//! that replaces noise once the player has edited it.
//!
//! ## Lifecycle
//!
//! ```text
//! Empty --generate/load_from_data--> Populated --disable--> Disabled --load--> Populated ...
//! ```
//!
//! An unedited chunk reloads by regenerating its blocks from the height field.
//! The first dig or build inside it sets the changed flag for good, after
//! which it always reloads by replaying its saved block list.
//!
//! ## Neighbours
//!
//! Neighbour links are stored as [`ChunkKey`]s, never as references. The
//! [`ChunkGrid`](super::world::ChunkGrid) registry resolves them.

use std::{collections::HashSet, fmt};

use cgmath::Point3;
use log::{debug, warn};

use crate::core::error::{TerrainError, TerrainResult};

use super::{
    block::{block_type::BlockType, BlockId},
    pool::BlockPool,
    world::HeightClassifier,
};

pub mod chunk_creation;
pub mod chunk_iteration;
pub mod height_field;

use chunk_iteration::ChunkBlockIterator;
use height_field::HeightField;

/// Horizontal direction between chunks. `UP` is +Z, `RIGHT` is +X.
#[derive(PartialEq, Eq, Hash, Copy, Clone, Debug)]
pub enum Direction {
    UP = 0,
    RIGHT = 1,
    DOWN = 2,
    LEFT = 3,
}

impl Direction {
    pub fn all() -> [Direction; 4] {
        [Direction::UP, Direction::RIGHT, Direction::DOWN, Direction::LEFT]
    }

    /// Step in chunk units along (x, z).
    pub fn offset(self) -> (i32, i32) {
        match self {
            Direction::UP => (0, 1),
            Direction::RIGHT => (1, 0),
            Direction::DOWN => (0, -1),
            Direction::LEFT => (-1, 0),
        }
    }

    pub fn opposite(self) -> Direction {
        match self {
            Direction::UP => Direction::DOWN,
            Direction::RIGHT => Direction::LEFT,
            Direction::DOWN => Direction::UP,
            Direction::LEFT => Direction::RIGHT,
        }
    }
}

/// World-space origin of a chunk, used as its registry key.
///
/// Displays as `"x_z"`, the form used in save file names.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChunkKey {
    pub x: i32,
    pub z: i32,
}

impl ChunkKey {
    pub fn new(x: i32, z: i32) -> Self {
        ChunkKey { x, z }
    }

    /// Key of the chunk one step away in `direction`.
    pub fn neighbour(self, direction: Direction, chunk_size: i32) -> ChunkKey {
        let (dx, dz) = direction.offset();
        ChunkKey::new(self.x + dx * chunk_size, self.z + dz * chunk_size)
    }
}

impl fmt::Display for ChunkKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.x, self.z)
    }
}

/// Saved `(position, type)` pair of one block.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct BlockSnapshot {
    pub position: Point3<i32>,
    pub block_type: BlockType,
}

impl BlockSnapshot {
    fn sort_key(&self) -> (i32, i32, i32, BlockType) {
        (self.position.x, self.position.y, self.position.z, self.block_type)
    }
}

impl PartialOrd for BlockSnapshot {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for BlockSnapshot {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.sort_key().cmp(&other.sort_key())
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ChunkState {
    Empty,
    Populated,
    Disabled,
}

/// Mutable services a chunk needs while placing blocks.
pub struct GenerationContext<'a> {
    pub pool: &'a mut BlockPool,
    pub classifier: &'a mut HeightClassifier,
}

/// One square region of terrain.
#[derive(Debug)]
pub struct TerrainChunk {
    key: ChunkKey,
    chunk_size: i32,
    noise_scale: f32,
    noise_offset: [f32; 2],
    max_height: i32,
    height_field: Option<HeightField>,
    neighbours: [Option<ChunkKey>; 4],
    changed: bool,
    state: ChunkState,
    ground_blocks: HashSet<BlockId>,
    invisible_blocks: HashSet<BlockId>,
    ground_snapshot: Vec<BlockSnapshot>,
    invisible_snapshot: Vec<BlockSnapshot>,
}

impl TerrainChunk {
    /// Creates an empty chunk with its origin at `key`.
    pub fn new(key: ChunkKey, chunk_size: i32, noise_scale: f32, max_height: i32) -> Self {
        TerrainChunk {
            key,
            chunk_size,
            noise_scale,
            noise_offset: [0.0, 0.0],
            max_height,
            height_field: None,
            neighbours: [None; 4],
            changed: false,
            state: ChunkState::Empty,
            ground_blocks: HashSet::new(),
            invisible_blocks: HashSet::new(),
            ground_snapshot: Vec::new(),
            invisible_snapshot: Vec::new(),
        }
    }

    /// Samples the height field at `noise_offset` and places the chunk's blocks.
    pub fn generate(
        &mut self,
        noise_offset: [f32; 2],
        seed: u32,
        ctx: &mut GenerationContext,
    ) -> TerrainResult<()> {
        let height_field = HeightField::generate(self.chunk_size, self.noise_scale, noise_offset, seed);
        self.generate_from_height_field(height_field, ctx)
    }

    /// Places the chunk's blocks from an already built height field.
    pub fn generate_from_height_field(
        &mut self,
        height_field: HeightField,
        ctx: &mut GenerationContext,
    ) -> TerrainResult<()> {
        self.noise_offset = height_field.noise_offset();
        self.height_field = Some(height_field);
        self.populate_from_height_field(ctx)
    }

    /// Makes the chunk active again after `disable`, or after an import.
    ///
    /// Edited chunks replay their snapshot; the rest regenerate from the height field.
    ///
    /// # Errors
    /// `MissingHeightField` if the chunk is unedited and was never generated or imported.
    pub fn load(&mut self, ctx: &mut GenerationContext) -> TerrainResult<()> {
        if self.changed {
            debug!("Chunk {} loading from data", self.key);
            self.load_from_data(ctx.pool)
        } else {
            debug!("Chunk {} loading from height field", self.key);
            self.populate_from_height_field(ctx)
        }
    }

    fn populate_from_height_field(&mut self, ctx: &mut GenerationContext) -> TerrainResult<()> {
        let height_field = self
            .height_field
            .take()
            .ok_or(TerrainError::MissingHeightField { key: self.key })?;

        let result = chunk_creation::place_columns(self, &height_field, ctx)
            .and_then(|_| chunk_creation::extend_skirt(self, ctx.pool));
        self.height_field = Some(height_field);
        if let Err(err) = result {
            self.release_blocks(ctx.pool);
            return Err(err);
        }

        self.state = ChunkState::Populated;
        Ok(())
    }

    /// Replays the saved block lists, bypassing noise entirely.
    ///
    /// Entries whose cell is already held by another block are dropped with a warning.
    pub fn load_from_data(&mut self, pool: &mut BlockPool) -> TerrainResult<()> {
        let ground = self
            .ground_snapshot
            .iter()
            .map(|snapshot| (snapshot.block_type, snapshot.position));
        let invisible = self
            .invisible_snapshot
            .iter()
            .map(|snapshot| (BlockType::Invisible, snapshot.position));
        let entries: Vec<(BlockType, Point3<i32>)> = ground.chain(invisible).collect();

        for (block_type, position) in entries {
            match pool.acquire_at(block_type, position, Some(self.key)) {
                Ok(id) => self.insert_block(id, block_type),
                Err(TerrainError::PositionOccupied { .. }) => {
                    warn!(
                        "Chunk {} dropped saved {:?} at {:?}, cell already held",
                        self.key, block_type, position
                    );
                }
                Err(err) => {
                    self.release_blocks(pool);
                    return Err(err);
                }
            }
        }
        self.state = ChunkState::Populated;
        Ok(())
    }

    /// Returns every block to the pool, snapshotting them first if the chunk was edited.
    pub fn disable(&mut self, pool: &mut BlockPool) {
        if self.changed {
            self.ground_snapshot = self.blocks(pool).ground().collect();
            self.invisible_snapshot = self.blocks(pool).invisible().collect();
        }

        self.release_blocks(pool);
        self.state = ChunkState::Disabled;
    }

    fn release_blocks(&mut self, pool: &mut BlockPool) {
        for id in self.ground_blocks.drain().chain(self.invisible_blocks.drain()) {
            pool.release(id);
        }
    }

    /// Sets the changed flag. Once set it never clears.
    pub fn mark_changed(&mut self) {
        if !self.changed {
            debug!("Chunk {} switched to saved block lists", self.key);
        }
        self.changed = true;
    }

    pub fn key(&self) -> ChunkKey {
        self.key
    }

    /// Key of the neighbouring chunk in `direction`, whether or not it exists.
    pub fn neighbour_key(&self, direction: Direction) -> ChunkKey {
        self.key.neighbour(direction, self.chunk_size)
    }

    /// Linked neighbour in `direction`, if that chunk was ever generated.
    pub fn neighbour(&self, direction: Direction) -> Option<ChunkKey> {
        self.neighbours[direction as usize]
    }

    pub fn set_neighbour(&mut self, direction: Direction, neighbour: Option<ChunkKey>) {
        self.neighbours[direction as usize] = neighbour;
    }

    pub fn chunk_size(&self) -> i32 {
        self.chunk_size
    }

    pub fn noise_scale(&self) -> f32 {
        self.noise_scale
    }

    pub fn noise_offset(&self) -> [f32; 2] {
        self.noise_offset
    }

    pub fn max_height(&self) -> i32 {
        self.max_height
    }

    pub fn height_field(&self) -> Option<&HeightField> {
        self.height_field.as_ref()
    }

    pub fn is_changed(&self) -> bool {
        self.changed
    }

    pub fn state(&self) -> ChunkState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state == ChunkState::Populated
    }

    /// Whether the world column `(x, z)` lies inside this chunk.
    pub fn contains_column(&self, x: i32, z: i32) -> bool {
        x >= self.key.x
            && x < self.key.x + self.chunk_size
            && z >= self.key.z
            && z < self.key.z + self.chunk_size
    }

    pub fn ground_blocks(&self) -> &HashSet<BlockId> {
        &self.ground_blocks
    }

    pub fn invisible_blocks(&self) -> &HashSet<BlockId> {
        &self.invisible_blocks
    }

    pub fn ground_snapshot(&self) -> &[BlockSnapshot] {
        &self.ground_snapshot
    }

    pub fn invisible_snapshot(&self) -> &[BlockSnapshot] {
        &self.invisible_snapshot
    }

    /// Iterates the chunk's active blocks with their positions and types.
    pub fn blocks<'a>(&'a self, pool: &'a BlockPool) -> ChunkBlockIterator<'a> {
        ChunkBlockIterator::new(self, pool)
    }

    /// Adopts a placed block into the ground (visible) or invisible set.
    pub fn insert_block(&mut self, id: BlockId, block_type: BlockType) {
        if block_type == BlockType::Invisible {
            self.invisible_blocks.insert(id);
        } else {
            self.ground_blocks.insert(id);
        }
    }

    /// Drops a block from whichever active set holds it.
    ///
    /// # Returns
    /// `true` if the chunk owned the block.
    pub fn remove_block(&mut self, id: BlockId) -> bool {
        self.ground_blocks.remove(&id) || self.invisible_blocks.remove(&id)
    }

    pub(crate) fn set_height_field(&mut self, height_field: Option<HeightField>) {
        if let Some(field) = &height_field {
            self.noise_offset = field.noise_offset();
        }
        self.height_field = height_field;
    }

    pub(crate) fn restore_metadata(&mut self, noise_offset: [f32; 2], changed: bool) {
        self.noise_offset = noise_offset;
        self.changed = changed;
    }

    pub(crate) fn restore_snapshot(
        &mut self,
        ground: Vec<BlockSnapshot>,
        invisible: Vec<BlockSnapshot>,
    ) {
        self.ground_snapshot = ground;
        self.invisible_snapshot = invisible;
        self.state = ChunkState::Disabled;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::voxels::block::catalog::BlockCatalog;

    fn flat_chunk(pool: &mut BlockPool, sample: f32) -> TerrainChunk {
        let mut classifier = HeightClassifier::new(BlockCatalog::standard());
        let mut chunk = TerrainChunk::new(ChunkKey::new(0, 0), 4, 1.0, 10);
        let field = HeightField::flat(4, 1.0, [0.0, 0.0], sample);
        let mut ctx = GenerationContext {
            pool,
            classifier: &mut classifier,
        };
        chunk.generate_from_height_field(field, &mut ctx).unwrap();
        chunk
    }

    #[test]
    fn flat_field_places_one_ground_and_one_invisible_per_column() {
        let mut pool = BlockPool::new();
        let chunk = flat_chunk(&mut pool, 0.5);

        assert_eq!(chunk.ground_blocks().len(), 16);
        assert_eq!(chunk.invisible_blocks().len(), 16);
        for x in 0..4 {
            for z in 0..4 {
                assert_eq!(pool.type_at(Point3::new(x, 5, z)), Some(BlockType::DirtGrass));
                assert_eq!(pool.type_at(Point3::new(x, 4, z)), Some(BlockType::Invisible));
                assert!(!pool.is_solid_at(Point3::new(x, 3, z)));
                assert!(!pool.is_solid_at(Point3::new(x, 6, z)));
            }
        }
    }

    #[test]
    fn key_display_and_neighbour_keys() {
        let chunk = TerrainChunk::new(ChunkKey::new(16, -32), 16, 1.0, 16);
        assert_eq!(chunk.key().to_string(), "16_-32");
        assert_eq!(chunk.neighbour_key(Direction::UP), ChunkKey::new(16, -16));
        assert_eq!(chunk.neighbour_key(Direction::RIGHT), ChunkKey::new(32, -32));
        assert_eq!(chunk.neighbour_key(Direction::DOWN), ChunkKey::new(16, -48));
        assert_eq!(chunk.neighbour_key(Direction::LEFT), ChunkKey::new(0, -32));
    }

    #[test]
    fn neighbour_keys_are_direction_symmetric() {
        let size = 8;
        for x in -2..3 {
            for z in -2..3 {
                let a = TerrainChunk::new(ChunkKey::new(x * size, z * size), size, 1.0, 16);
                for direction in Direction::all() {
                    let b = TerrainChunk::new(a.neighbour_key(direction), size, 1.0, 16);
                    assert_eq!(b.neighbour_key(direction.opposite()), a.key());
                }
            }
        }
    }

    #[test]
    fn disable_then_load_reproduces_unedited_layout() {
        let mut pool = BlockPool::new();
        let mut classifier = HeightClassifier::new(BlockCatalog::standard());
        let mut chunk = TerrainChunk::new(ChunkKey::new(0, 0), 8, 1.0, 16);
        let mut ctx = GenerationContext {
            pool: &mut pool,
            classifier: &mut classifier,
        };
        chunk.generate([0.5, 0.5], 0, &mut ctx).unwrap();

        let mut before: Vec<_> = chunk.blocks(ctx.pool).collect();
        before.sort();

        chunk.disable(ctx.pool);
        assert_eq!(chunk.state(), ChunkState::Disabled);
        assert!(chunk.ground_blocks().is_empty());
        assert!(chunk.ground_snapshot().is_empty());
        assert_eq!(ctx.pool.occupied_count(), 0);

        chunk.load(&mut ctx).unwrap();
        let mut after: Vec<_> = chunk.blocks(ctx.pool).collect();
        after.sort();
        assert_eq!(before, after);
    }

    #[test]
    fn changed_chunk_replays_snapshot() {
        let mut pool = BlockPool::new();
        let mut chunk = flat_chunk(&mut pool, 0.5);

        let extra = pool
            .acquire_at(BlockType::Ice, Point3::new(1, 6, 1), Some(chunk.key()))
            .unwrap();
        chunk.insert_block(extra, BlockType::Ice);
        chunk.mark_changed();
        chunk.mark_changed();
        assert!(chunk.is_changed());

        chunk.disable(&mut pool);
        assert_eq!(chunk.ground_snapshot().len(), 17);
        assert_eq!(chunk.invisible_snapshot().len(), 16);
        assert_eq!(pool.occupied_count(), 0);

        chunk.load_from_data(&mut pool).unwrap();
        assert_eq!(pool.type_at(Point3::new(1, 6, 1)), Some(BlockType::Ice));
        assert_eq!(chunk.ground_blocks().len(), 17);
    }

    #[test]
    fn replay_drops_entries_over_held_cells() {
        let mut pool = BlockPool::new();
        let mut chunk = flat_chunk(&mut pool, 0.5);
        let extra = pool
            .acquire_at(BlockType::Ice, Point3::new(1, 6, 1), Some(chunk.key()))
            .unwrap();
        chunk.insert_block(extra, BlockType::Ice);
        chunk.mark_changed();
        chunk.disable(&mut pool);

        let squatter = pool
            .acquire_at(BlockType::Sand, Point3::new(1, 6, 1), Some(ChunkKey::new(4, 0)))
            .unwrap();
        chunk.load_from_data(&mut pool).unwrap();

        assert_eq!(pool.block_at(Point3::new(1, 6, 1)), Some(squatter));
        assert_eq!(chunk.ground_blocks().len(), 16);
        assert_eq!(chunk.invisible_blocks().len(), 16);
        assert_eq!(pool.active_count(BlockType::Ice), 0);
        assert_eq!(pool.occupied_count(), 33);
    }

    #[test]
    fn failed_generation_returns_every_block() {
        let standard = BlockCatalog::standard();
        let mut stone = *standard.get(BlockType::Stone).unwrap();
        stone.generation_range = Some((0.6, 0.8));
        let mut classifier = HeightClassifier::new(BlockCatalog::from_properties([stone]));

        // Heights 7 classify as Stone; the cliff down to the height-3 cell hits the gap below 0.6.
        let field = HeightField::from_samples(2, 1.0, [0.0, 0.0], &[0.7, 0.7, 0.7, 0.35]);
        let mut pool = BlockPool::new();
        let mut chunk = TerrainChunk::new(ChunkKey::new(0, 0), 2, 1.0, 10);
        let mut ctx = GenerationContext {
            pool: &mut pool,
            classifier: &mut classifier,
        };
        let err = chunk.generate_from_height_field(field, &mut ctx).unwrap_err();
        assert!(matches!(err, TerrainError::ConfigurationFault { .. }));

        assert!(pool.created_count(BlockType::Stone) > 0);
        assert_eq!(pool.occupied_count(), 0);
        for block_type in BlockType::ALL {
            assert_eq!(pool.active_count(block_type), 0);
        }
        assert!(chunk.ground_blocks().is_empty());
        assert!(chunk.invisible_blocks().is_empty());
        assert!(!chunk.is_active());
    }

    #[test]
    fn load_without_height_field_fails_loudly() {
        let mut pool = BlockPool::new();
        let mut classifier = HeightClassifier::new(BlockCatalog::standard());
        let mut chunk = TerrainChunk::new(ChunkKey::new(0, 0), 4, 1.0, 10);
        let mut ctx = GenerationContext {
            pool: &mut pool,
            classifier: &mut classifier,
        };
        let err = chunk.load(&mut ctx).unwrap_err();
        assert!(matches!(err, TerrainError::MissingHeightField { .. }));
    }

    #[test]
    fn contains_column_uses_half_open_bounds() {
        let chunk = TerrainChunk::new(ChunkKey::new(4, 4), 4, 1.0, 10);
        assert!(chunk.contains_column(4, 7));
        assert!(!chunk.contains_column(8, 4));
        assert!(!chunk.contains_column(3, 4));
    }
}
