//! # World Module
//!
//! This module provides the `ChunkGrid` struct which manages the chunks of the terrain.
//! It serves as the central coordinator for chunk generation, streaming and lookup.
//!
//! ## Architecture
//!
//! The grid keeps two views of the same chunks:
//! - a registry of every chunk ever generated, keyed by world origin, so edits
//!   survive the chunk leaving the window;
//! - a sliding N×N window of active chunks around the tracked entity.
//!
//! Neighbour links live on the chunks as keys and are recomputed from the
//! registry whenever a chunk is added, so a link exists exactly when the
//! adjacent chunk was generated at some point.
//!
//! ## Window Shifts
//!
//! When the tracked entity reaches a window edge the window slides one chunk
//! in that direction: the trailing lane is disabled, the remaining lanes move
//! one slot back, and the leading lane is either reloaded from the registry or
//! generated from noise.

use std::collections::HashMap;

use cgmath::Point3;
use log::{debug, error, info};

use crate::core::{
    config::TerrainConfig,
    error::{TerrainError, TerrainResult},
};

use super::{
    block::{block_type::BlockType, catalog::BlockCatalog},
    chunk::{ChunkKey, Direction, GenerationContext, TerrainChunk},
    pool::BlockPool,
};

/// Height above the tallest column from which `center_position` looks down.
const CENTER_SCAN_MARGIN: i32 = 16;

/// Maps column heights to block types through the catalog's height bands.
///
/// Adjacent columns usually fall in the same band, so the last matching type is
/// checked before scanning the catalog.
#[derive(Clone, Debug)]
pub struct HeightClassifier {
    catalog: BlockCatalog,
    last_band: Option<BlockType>,
}

impl HeightClassifier {
    pub fn new(catalog: BlockCatalog) -> Self {
        HeightClassifier {
            catalog,
            last_band: None,
        }
    }

    pub fn catalog(&self) -> &BlockCatalog {
        &self.catalog
    }

    /// Type whose band was matched most recently.
    pub fn last_band(&self) -> Option<BlockType> {
        self.last_band
    }

    /// Classifies a block at `height` in a chunk of `max_height`.
    ///
    /// Top blocks get the band's own type; blocks under the surface get the
    /// type the band exposes when dug.
    ///
    /// # Errors
    /// `ConfigurationFault` if no band covers `height / max_height`.
    pub fn block_type_on_height(
        &mut self,
        height: i32,
        max_height: i32,
        is_top_block: bool,
    ) -> TerrainResult<BlockType> {
        let ratio = height as f32 / max_height as f32;
        if !ratio.is_finite() {
            error!("Height ratio {}/{} is not a number", height, max_height);
            return Err(TerrainError::ConfigurationFault { ratio });
        }
        let ratio = ratio.clamp(0.0, 1.0);

        let cached = self
            .last_band
            .and_then(|block_type| self.catalog.get(block_type))
            .filter(|properties| properties.within_height_range(ratio));

        let properties = match cached {
            Some(properties) => properties,
            None => match self.catalog.iter().find(|properties| properties.within_height_range(ratio)) {
                Some(properties) => properties,
                None => {
                    error!("No block type covers height ratio {}", ratio);
                    return Err(TerrainError::ConfigurationFault { ratio });
                }
            },
        };

        self.last_band = Some(properties.block_type);
        Ok(if is_top_block {
            properties.block_type
        } else {
            properties.type_exposed_when_dug
        })
    }
}

/// The active window of chunks plus the registry of every chunk generated so far.
pub struct ChunkGrid {
    window_size: usize,
    /// Active chunk keys, indexed `x * window_size + y`. Slot `(0, 0)` is the
    /// window's lowest-x, lowest-z corner.
    window: Vec<ChunkKey>,
    chunks: HashMap<ChunkKey, TerrainChunk>,
    chunk_size: i32,
    noise_scale: f32,
    noise_start_offset: [f32; 2],
    noise_seed: u32,
    max_height: i32,
    classifier: HeightClassifier,
}

impl ChunkGrid {
    /// Creates an empty grid; call [`ChunkGrid::initialize`] or restore a save to fill it.
    pub fn new(config: &TerrainConfig, catalog: BlockCatalog) -> Self {
        ChunkGrid {
            window_size: config.window_size,
            window: Vec::new(),
            chunks: HashMap::new(),
            chunk_size: config.chunk_size,
            noise_scale: config.noise_scale,
            noise_start_offset: config.noise_start_offset,
            noise_seed: config.noise_seed,
            max_height: config.max_chunk_height,
            classifier: HeightClassifier::new(catalog),
        }
    }

    /// Generates a fresh N×N window with chunk `(0, 0)` at the world origin.
    ///
    /// Slot `(x, y)` sits at `(x, y) * chunk_size` in world space and at
    /// `start_offset + (x, y) * noise_scale` in noise space.
    pub fn initialize(&mut self, start_offset: [f32; 2], pool: &mut BlockPool) -> TerrainResult<()> {
        info!(
            "Generating {}x{} chunk window from noise offset {:?}",
            self.window_size, self.window_size, start_offset
        );
        self.noise_start_offset = start_offset;
        self.window.clear();

        for x in 0..self.window_size {
            for y in 0..self.window_size {
                let key = ChunkKey::new(x as i32 * self.chunk_size, y as i32 * self.chunk_size);
                let noise_offset = [
                    x as f32 * self.noise_scale + start_offset[0],
                    y as f32 * self.noise_scale + start_offset[1],
                ];
                self.generate_chunk(key, noise_offset, pool)?;
                self.window.push(key);
            }
        }

        self.relink();
        pool.log_stats();
        Ok(())
    }

    /// Slides the window one chunk towards `direction`.
    pub fn shift(&mut self, direction: Direction, pool: &mut BlockPool) -> TerrainResult<()> {
        info!("Shifting chunk window {:?}", direction);
        let n = self.window_size;
        let (dx, dz) = direction.offset();

        for lane in 0..n {
            // Slots of this lane, from the trailing edge to the leading edge.
            let slots: Vec<usize> = (0..n)
                .map(|step| match direction {
                    Direction::RIGHT => self.slot_index(step, lane),
                    Direction::LEFT => self.slot_index(n - 1 - step, lane),
                    Direction::UP => self.slot_index(lane, step),
                    Direction::DOWN => self.slot_index(lane, n - 1 - step),
                })
                .collect();

            let trailing = self.window[slots[0]];
            self.get_chunk_mut(trailing)?.disable(pool);
            for step in 0..n - 1 {
                self.window[slots[step]] = self.window[slots[step + 1]];
            }

            let edge = self.get_chunk(self.window[slots[n - 2]])?;
            let next_key = match edge.neighbour(direction) {
                Some(key) => {
                    debug!("Reloading chunk {}", key);
                    let chunk = self
                        .chunks
                        .get_mut(&key)
                        .ok_or(TerrainError::UnknownChunk { key })?;
                    chunk.load(&mut GenerationContext {
                        pool: &mut *pool,
                        classifier: &mut self.classifier,
                    })?;
                    key
                }
                None => {
                    let key = edge.neighbour_key(direction);
                    let edge_offset = edge.noise_offset();
                    let noise_offset = [
                        edge_offset[0] + dx as f32 * self.noise_scale,
                        edge_offset[1] + dz as f32 * self.noise_scale,
                    ];
                    self.generate_chunk(key, noise_offset, pool)?;
                    self.relink_chunk(key);
                    key
                }
            };
            self.window[slots[n - 1]] = next_key;
        }

        Ok(())
    }

    /// Window edges touched by `position`, in the order the shifts should run.
    ///
    /// A position on slot index `0` or `N - 1` along an axis touches that edge;
    /// positions outside the window count as touching the nearer edge.
    pub fn track_position(&self, position: Point3<f32>) -> Vec<Direction> {
        let Some(origin) = self.window.first() else {
            return Vec::new();
        };
        let last = self.window_size as i64 - 1;
        let x_index = ((position.x - origin.x as f32) / self.chunk_size as f32).floor() as i64;
        let z_index = ((position.z - origin.z as f32) / self.chunk_size as f32).floor() as i64;

        let mut directions = Vec::new();
        if x_index <= 0 {
            directions.push(Direction::LEFT);
        }
        if x_index >= last {
            directions.push(Direction::RIGHT);
        }
        if z_index <= 0 {
            directions.push(Direction::DOWN);
        }
        if z_index >= last {
            directions.push(Direction::UP);
        }
        directions
    }

    /// Key of the active chunk covering world position `(x, z)`.
    ///
    /// # Errors
    /// `ChunkNotLoaded` when the position falls outside the window.
    pub fn chunk_key_at(&self, x: f32, z: f32) -> TerrainResult<ChunkKey> {
        let origin = self
            .window
            .first()
            .ok_or(TerrainError::ChunkNotLoaded { x, z })?;
        let x_index = ((x - origin.x as f32) / self.chunk_size as f32).floor();
        let z_index = ((z - origin.z as f32) / self.chunk_size as f32).floor();

        let n = self.window_size as f32;
        if !(0.0..n).contains(&x_index) || !(0.0..n).contains(&z_index) {
            return Err(TerrainError::ChunkNotLoaded { x, z });
        }
        Ok(self.window[self.slot_index(x_index as usize, z_index as usize)])
    }

    /// The active chunk covering world position `(x, z)`.
    pub fn chunk_at(&self, x: f32, z: f32) -> TerrainResult<&TerrainChunk> {
        let key = self.chunk_key_at(x, z)?;
        self.get_chunk(key)
    }

    pub fn chunk_at_mut(&mut self, x: f32, z: f32) -> TerrainResult<&mut TerrainChunk> {
        let key = self.chunk_key_at(x, z)?;
        self.get_chunk_mut(key)
    }

    /// Any generated chunk, active or not.
    pub fn get_chunk(&self, key: ChunkKey) -> TerrainResult<&TerrainChunk> {
        self.chunks.get(&key).ok_or(TerrainError::UnknownChunk { key })
    }

    pub fn get_chunk_mut(&mut self, key: ChunkKey) -> TerrainResult<&mut TerrainChunk> {
        self.chunks
            .get_mut(&key)
            .ok_or(TerrainError::UnknownChunk { key })
    }

    /// See [`HeightClassifier::block_type_on_height`].
    pub fn classify_height(
        &mut self,
        height: i32,
        max_height: i32,
        is_top_block: bool,
    ) -> TerrainResult<BlockType> {
        self.classifier
            .block_type_on_height(height, max_height, is_top_block)
    }

    /// Centre of the window, standing on the first visible block found below a safe altitude.
    pub fn center_position(&self, pool: &BlockPool) -> Point3<f32> {
        let origin = self.window.first().copied().unwrap_or(ChunkKey::new(0, 0));
        let half_extent = (self.window_size as i32 * self.chunk_size) as f32 / 2.0;
        let x = origin.x as f32 + half_extent;
        let z = origin.z as f32 + half_extent;

        let top = self.max_height + CENTER_SCAN_MARGIN;
        let (column_x, column_z) = ((x + 0.5).floor() as i32, (z + 0.5).floor() as i32);
        let ground = (-self.max_height..=top)
            .rev()
            .find(|y| pool.is_visible_solid_at(Point3::new(column_x, *y, column_z)));

        match ground {
            Some(y) => Point3::new(x, (y + 1) as f32, z),
            None => Point3::new(x, top as f32, z),
        }
    }

    /// Recomputes every chunk's neighbour links from the registry.
    pub fn relink(&mut self) {
        let keys: Vec<ChunkKey> = self.chunks.keys().copied().collect();
        for key in keys {
            self.relink_chunk(key);
        }
    }

    /// Links `key` with whichever of its four neighbours are registered, both ways.
    pub fn relink_chunk(&mut self, key: ChunkKey) {
        for direction in Direction::all() {
            let neighbour = key.neighbour(direction, self.chunk_size);
            let exists = self.chunks.contains_key(&neighbour);
            if let Some(chunk) = self.chunks.get_mut(&key) {
                chunk.set_neighbour(direction, exists.then_some(neighbour));
            }
            if let Some(other) = self.chunks.get_mut(&neighbour) {
                other.set_neighbour(direction.opposite(), Some(key));
            }
        }
    }

    /// Creates a chunk at `key`, generates it and registers it.
    pub(crate) fn generate_chunk(
        &mut self,
        key: ChunkKey,
        noise_offset: [f32; 2],
        pool: &mut BlockPool,
    ) -> TerrainResult<()> {
        debug!("Generating chunk {} at noise offset {:?}", key, noise_offset);
        let mut chunk = TerrainChunk::new(key, self.chunk_size, self.noise_scale, self.max_height);
        chunk.generate(
            noise_offset,
            self.noise_seed,
            &mut GenerationContext {
                pool,
                classifier: &mut self.classifier,
            },
        )?;
        self.chunks.insert(key, chunk);
        Ok(())
    }

    /// Loads an already registered chunk back into the world.
    pub(crate) fn load_chunk(&mut self, key: ChunkKey, pool: &mut BlockPool) -> TerrainResult<()> {
        let chunk = self
            .chunks
            .get_mut(&key)
            .ok_or(TerrainError::UnknownChunk { key })?;
        chunk.load(&mut GenerationContext {
            pool,
            classifier: &mut self.classifier,
        })
    }

    pub(crate) fn insert_chunk(&mut self, chunk: TerrainChunk) {
        self.chunks.insert(chunk.key(), chunk);
    }

    pub(crate) fn set_window(&mut self, window: Vec<ChunkKey>) {
        self.window = window;
    }

    pub(crate) fn slot_index(&self, x: usize, y: usize) -> usize {
        x * self.window_size + y
    }

    /// Key of the active chunk at window slot `(x, y)`.
    pub fn window_slot(&self, x: usize, y: usize) -> Option<ChunkKey> {
        if x >= self.window_size || y >= self.window_size {
            return None;
        }
        self.window.get(self.slot_index(x, y)).copied()
    }

    pub fn window_keys(&self) -> &[ChunkKey] {
        &self.window
    }

    pub fn is_in_window(&self, key: ChunkKey) -> bool {
        self.window.contains(&key)
    }

    pub fn chunks(&self) -> impl Iterator<Item = &TerrainChunk> {
        self.chunks.values()
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    pub fn window_size(&self) -> usize {
        self.window_size
    }

    pub fn chunk_size(&self) -> i32 {
        self.chunk_size
    }

    pub fn noise_scale(&self) -> f32 {
        self.noise_scale
    }

    pub fn noise_start_offset(&self) -> [f32; 2] {
        self.noise_start_offset
    }

    pub fn max_height(&self) -> i32 {
        self.max_height
    }

    pub fn catalog(&self) -> &BlockCatalog {
        self.classifier.catalog()
    }

    pub fn noise_seed(&self) -> u32 {
        self.noise_seed
    }

    /// Drops every chunk and adopts a saved layout. Blocks must already be back in the pool.
    pub(crate) fn reset_layout(
        &mut self,
        window_size: usize,
        chunk_size: i32,
        noise_scale: f32,
        noise_start_offset: [f32; 2],
        noise_seed: u32,
    ) {
        self.window.clear();
        self.chunks.clear();
        self.window_size = window_size;
        self.chunk_size = chunk_size;
        self.noise_scale = noise_scale;
        self.noise_start_offset = noise_start_offset;
        self.noise_seed = noise_seed;
    }
}

#[cfg(test)]
impl ChunkGrid {
    /// A 3×3 window of 4-wide chunks (max height 10) whose height fields all hold `sample`.
    pub(crate) fn flat_for_tests(sample: f32, pool: &mut BlockPool) -> ChunkGrid {
        use super::chunk::height_field::HeightField;

        let config = TerrainConfig {
            chunk_size: 4,
            noise_scale: 1.0,
            window_size: 3,
            max_chunk_height: 10,
            ..TerrainConfig::default()
        };
        let mut grid = ChunkGrid::new(&config, BlockCatalog::standard());
        let mut window = Vec::new();
        for x in 0..3 {
            for y in 0..3 {
                let key = ChunkKey::new(x * 4, y * 4);
                let field = HeightField::flat(4, 1.0, [x as f32, y as f32], sample);
                let mut chunk = TerrainChunk::new(key, 4, 1.0, 10);
                chunk
                    .generate_from_height_field(
                        field,
                        &mut GenerationContext {
                            pool: &mut *pool,
                            classifier: &mut grid.classifier,
                        },
                    )
                    .unwrap();
                grid.insert_chunk(chunk);
                window.push(key);
            }
        }
        grid.set_window(window);
        grid.relink();
        grid
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::voxels::{block::catalog::BlockProperties, chunk::ChunkState};

    fn small_config() -> TerrainConfig {
        TerrainConfig {
            chunk_size: 4,
            noise_scale: 1.0,
            window_size: 3,
            max_chunk_height: 10,
            ..TerrainConfig::default()
        }
    }

    fn small_grid(pool: &mut BlockPool) -> ChunkGrid {
        let mut grid = ChunkGrid::new(&small_config(), BlockCatalog::standard());
        grid.initialize([0.5, 0.5], pool).unwrap();
        grid
    }

    #[test]
    fn initialize_lays_out_window_and_links() {
        let mut pool = BlockPool::new();
        let grid = small_grid(&mut pool);

        assert_eq!(grid.chunk_count(), 9);
        assert_eq!(grid.window_slot(0, 0), Some(ChunkKey::new(0, 0)));
        assert_eq!(grid.window_slot(2, 1), Some(ChunkKey::new(8, 4)));

        let corner = grid.get_chunk(ChunkKey::new(0, 0)).unwrap();
        assert_eq!(corner.neighbour(Direction::RIGHT), Some(ChunkKey::new(4, 0)));
        assert_eq!(corner.neighbour(Direction::UP), Some(ChunkKey::new(0, 4)));
        assert_eq!(corner.neighbour(Direction::LEFT), None);
        assert_eq!(corner.neighbour(Direction::DOWN), None);

        let centre = grid.get_chunk(ChunkKey::new(4, 4)).unwrap();
        for direction in Direction::all() {
            assert_eq!(centre.neighbour(direction), Some(centre.neighbour_key(direction)));
        }

        let far = grid.get_chunk(ChunkKey::new(8, 4)).unwrap();
        assert_eq!(far.noise_offset(), [2.5, 1.5]);
    }

    #[test]
    fn chunk_at_round_trips_world_positions() {
        let mut pool = BlockPool::new();
        let grid = small_grid(&mut pool);

        for x in 0..12 {
            for z in 0..12 {
                let chunk = grid.chunk_at(x as f32 + 0.25, z as f32 + 0.75).unwrap();
                assert!(chunk.contains_column(x, z));
            }
        }
    }

    #[test]
    fn chunk_at_outside_window_is_a_lookup_miss() {
        let mut pool = BlockPool::new();
        let grid = small_grid(&mut pool);

        let err = grid.chunk_at(-0.5, 2.0).unwrap_err();
        assert!(matches!(err, TerrainError::ChunkNotLoaded { .. }));
        assert!(err.is_recoverable());
        assert!(grid.chunk_at(12.0, 2.0).is_err());
        assert!(grid.get_chunk(ChunkKey::new(40, 40)).is_err());
    }

    #[test]
    fn shift_right_generates_then_reuses_chunks() {
        let mut pool = BlockPool::new();
        let mut grid = small_grid(&mut pool);

        grid.shift(Direction::RIGHT, &mut pool).unwrap();
        assert_eq!(grid.chunk_count(), 12);
        assert_eq!(grid.window_slot(0, 0), Some(ChunkKey::new(4, 0)));
        assert_eq!(grid.window_slot(2, 2), Some(ChunkKey::new(12, 8)));
        let fresh = grid.get_chunk(ChunkKey::new(12, 0)).unwrap();
        assert_eq!(fresh.noise_offset(), [3.5, 0.5]);
        let fresh_field = fresh.height_field().cloned();
        assert_eq!(
            grid.get_chunk(ChunkKey::new(0, 0)).unwrap().state(),
            ChunkState::Disabled
        );

        grid.shift(Direction::LEFT, &mut pool).unwrap();
        assert_eq!(grid.chunk_count(), 12);
        assert_eq!(grid.window_slot(0, 0), Some(ChunkKey::new(0, 0)));
        assert!(grid.get_chunk(ChunkKey::new(0, 0)).unwrap().is_active());
        assert!(!grid.get_chunk(ChunkKey::new(12, 4)).unwrap().is_active());

        grid.shift(Direction::RIGHT, &mut pool).unwrap();
        assert_eq!(grid.chunk_count(), 12);
        let reused = grid.get_chunk(ChunkKey::new(12, 0)).unwrap();
        assert!(reused.is_active());
        assert_eq!(reused.height_field().cloned(), fresh_field);
    }

    #[test]
    fn shift_keeps_window_contiguous_and_pool_balanced() {
        let mut pool = BlockPool::new();
        let mut grid = small_grid(&mut pool);

        for direction in [Direction::UP, Direction::UP, Direction::LEFT, Direction::DOWN] {
            grid.shift(direction, &mut pool).unwrap();
        }

        let origin = grid.window_slot(0, 0).unwrap();
        assert_eq!(origin, ChunkKey::new(-4, 4));
        for x in 0..3 {
            for y in 0..3 {
                let key = grid.window_slot(x, y).unwrap();
                assert_eq!(key, ChunkKey::new(origin.x + 4 * x as i32, origin.z + 4 * y as i32));
                assert!(grid.get_chunk(key).unwrap().is_active());
            }
        }

        let active: usize = grid
            .chunks()
            .filter(|chunk| chunk.is_active())
            .map(|chunk| chunk.ground_blocks().len() + chunk.invisible_blocks().len())
            .sum();
        assert_eq!(active, pool.occupied_count());
    }

    #[test]
    fn neighbour_links_match_registry_after_shifts() {
        let mut pool = BlockPool::new();
        let mut grid = small_grid(&mut pool);
        grid.shift(Direction::RIGHT, &mut pool).unwrap();
        grid.shift(Direction::UP, &mut pool).unwrap();

        for chunk in grid.chunks() {
            for direction in Direction::all() {
                let key = chunk.neighbour_key(direction);
                let registered = grid.get_chunk(key).is_ok();
                assert_eq!(chunk.neighbour(direction).is_some(), registered);
                if let Some(neighbour) = chunk.neighbour(direction) {
                    let other = grid.get_chunk(neighbour).unwrap();
                    assert_eq!(other.neighbour(direction.opposite()), Some(chunk.key()));
                }
            }
        }
    }

    #[test]
    fn track_position_reports_touched_edges() {
        let mut pool = BlockPool::new();
        let grid = small_grid(&mut pool);

        assert!(grid.track_position(Point3::new(6.0, 5.0, 6.0)).is_empty());
        assert_eq!(grid.track_position(Point3::new(1.0, 5.0, 6.0)), vec![Direction::LEFT]);
        assert_eq!(
            grid.track_position(Point3::new(10.0, 5.0, 11.0)),
            vec![Direction::RIGHT, Direction::UP]
        );
        assert_eq!(
            grid.track_position(Point3::new(-30.0, 5.0, 0.0)),
            vec![Direction::LEFT, Direction::DOWN]
        );
    }

    #[test]
    fn center_position_stands_on_the_surface() {
        let mut pool = BlockPool::new();
        let grid = small_grid(&mut pool);
        let centre = grid.center_position(&pool);

        assert_eq!((centre.x, centre.z), (6.0, 6.0));
        let below = Point3::new(6, centre.y as i32 - 1, 6);
        assert!(pool.is_visible_solid_at(below));
        assert!(!pool.is_solid_at(Point3::new(6, centre.y as i32, 6)));
    }

    #[test]
    fn classification_covers_the_unit_range() {
        let mut classifier = HeightClassifier::new(BlockCatalog::standard());
        for height in 0..=1000 {
            let block_type = classifier.block_type_on_height(height, 1000, true).unwrap();
            assert_ne!(block_type, BlockType::None);
        }
        assert_eq!(classifier.block_type_on_height(-3, 10, false).unwrap(), BlockType::Sand);
        assert_eq!(classifier.block_type_on_height(14, 10, true).unwrap(), BlockType::StoneSnow);
    }

    #[test]
    fn classification_caches_the_last_band() {
        let mut classifier = HeightClassifier::new(BlockCatalog::standard());
        assert_eq!(classifier.block_type_on_height(5, 10, true).unwrap(), BlockType::DirtGrass);
        assert_eq!(classifier.last_band(), Some(BlockType::DirtGrass));
        assert_eq!(classifier.block_type_on_height(4, 10, false).unwrap(), BlockType::Dirt);
        assert_eq!(classifier.block_type_on_height(7, 10, true).unwrap(), BlockType::Stone);
        assert_eq!(classifier.last_band(), Some(BlockType::Stone));
    }

    #[test]
    fn gap_in_catalog_is_a_configuration_fault() {
        let standard = BlockCatalog::standard();
        let mut stone: BlockProperties = *standard.get(BlockType::Stone).unwrap();
        stone.generation_range = Some((0.6, 0.8));
        let mut classifier = HeightClassifier::new(BlockCatalog::from_properties([stone]));

        let err = classifier.block_type_on_height(57, 100, true).unwrap_err();
        assert!(matches!(err, TerrainError::ConfigurationFault { .. }));
        assert!(classifier.block_type_on_height(0, 0, true).is_err());
    }
}
