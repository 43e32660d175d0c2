//! # Persistence Module
//!
//! Converts the chunk grid to and from the three saved records: the world
//! layout, one record per chunk, and the viewpoint.
//!
//! Unedited chunks are stored as a 16-bit height map image and regenerate
//! their blocks on load. Edited chunks drop the image and store both block
//! lists instead, which are replayed verbatim.
//!
//! The byte encoding and the storage medium live behind [`store::SaveStore`].

pub mod store;

use cgmath::Point3;
use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::core::{
    config::TerrainConfig,
    error::{TerrainError, TerrainResult},
};

use super::voxels::{
    block::block_type::BlockType,
    chunk::{height_field::HeightField, BlockSnapshot, ChunkKey, TerrainChunk},
    pool::BlockPool,
    world::ChunkGrid,
};

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Vec2Record {
    pub x: f32,
    pub y: f32,
}

impl Vec2Record {
    /// Chunk key of a saved world position.
    pub fn to_key(self) -> ChunkKey {
        ChunkKey::new(self.x.round() as i32, self.y.round() as i32)
    }
}

impl From<ChunkKey> for Vec2Record {
    fn from(key: ChunkKey) -> Self {
        Vec2Record {
            x: key.x as f32,
            y: key.z as f32,
        }
    }
}

impl From<[f32; 2]> for Vec2Record {
    fn from(value: [f32; 2]) -> Self {
        Vec2Record {
            x: value[0],
            y: value[1],
        }
    }
}

impl From<Vec2Record> for [f32; 2] {
    fn from(record: Vec2Record) -> Self {
        [record.x, record.y]
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Vec3Record {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl From<Point3<f32>> for Vec3Record {
    fn from(point: Point3<f32>) -> Self {
        Vec3Record {
            x: point.x,
            y: point.y,
            z: point.z,
        }
    }
}

impl From<Point3<i32>> for Vec3Record {
    fn from(point: Point3<i32>) -> Self {
        Vec3Record {
            x: point.x as f32,
            y: point.y as f32,
            z: point.z as f32,
        }
    }
}

impl From<Vec3Record> for Point3<f32> {
    fn from(record: Vec3Record) -> Self {
        Point3::new(record.x, record.y, record.z)
    }
}

impl Vec3Record {
    /// Nearest lattice point.
    pub fn to_lattice(self) -> Point3<i32> {
        Point3::new(
            self.x.round() as i32,
            self.y.round() as i32,
            self.z.round() as i32,
        )
    }
}

/// Layout of the whole world and the position of every chunk ever generated.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WorldRecord {
    pub chunk_size: i32,
    pub noise_scale: f32,
    pub start_noise_offset: Vec2Record,
    pub window_size: usize,
    #[serde(default)]
    pub noise_seed: u32,
    pub chunk_world_positions: Vec<Vec2Record>,
}

impl WorldRecord {
    /// Checks the saved layout against the same rules as a fresh configuration.
    ///
    /// # Errors
    /// `InvalidConfig` naming the first bad field.
    pub fn validate(&self) -> TerrainResult<()> {
        TerrainConfig {
            chunk_size: self.chunk_size,
            noise_scale: self.noise_scale,
            window_size: self.window_size,
            noise_seed: self.noise_seed,
            ..TerrainConfig::default()
        }
        .validate()?;

        let offset = self.start_noise_offset;
        if !offset.x.is_finite() || !offset.y.is_finite() {
            return Err(TerrainError::InvalidConfig(format!(
                "start_noise_offset must be finite, got ({}, {})",
                offset.x, offset.y
            )));
        }
        Ok(())
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BlockRecord {
    pub position: Vec3Record,
    pub block_type_id: i32,
}

impl From<&BlockSnapshot> for BlockRecord {
    fn from(snapshot: &BlockSnapshot) -> Self {
        BlockRecord {
            position: snapshot.position.into(),
            block_type_id: snapshot.block_type.id(),
        }
    }
}

impl BlockRecord {
    fn to_snapshot(self) -> TerrainResult<BlockSnapshot> {
        let block_type = BlockType::from_id(self.block_type_id)
            .filter(|block_type| *block_type != BlockType::None)
            .ok_or(TerrainError::UnknownBlockTypeId(self.block_type_id))?;
        Ok(BlockSnapshot {
            position: self.position.to_lattice(),
            block_type,
        })
    }
}

/// One chunk. Exactly one of the height map image and the block lists is authoritative.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChunkRecord {
    pub world_position: Vec2Record,
    pub max_height: i32,
    pub noise_offset: Vec2Record,
    pub changed: bool,
    #[serde(default)]
    pub height_map_image: Option<Vec<u8>>,
    #[serde(default)]
    pub ground_blocks: Vec<BlockRecord>,
    #[serde(default)]
    pub invisible_blocks: Vec<BlockRecord>,
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ViewpointRecord {
    pub position: Vec3Record,
}

impl Default for ViewpointRecord {
    fn default() -> Self {
        ViewpointRecord {
            position: Point3::new(0.0f32, 0.0, 0.0).into(),
        }
    }
}

/// Everything written by one save.
#[derive(Clone, Debug, PartialEq)]
pub struct SaveSnapshot {
    pub world: WorldRecord,
    pub chunks: Vec<ChunkRecord>,
    pub viewpoint: ViewpointRecord,
}

impl TerrainChunk {
    /// Builds the persisted record of this chunk.
    ///
    /// An active edited chunk records its live blocks; an inactive one records
    /// the snapshot it took when it was disabled.
    ///
    /// # Errors
    /// `MissingHeightField` if an unedited chunk has no height field to encode.
    pub fn export_snapshot(&self, pool: &BlockPool) -> TerrainResult<ChunkRecord> {
        let mut record = ChunkRecord {
            world_position: self.key().into(),
            max_height: self.max_height(),
            noise_offset: self.noise_offset().into(),
            changed: self.is_changed(),
            height_map_image: None,
            ground_blocks: Vec::new(),
            invisible_blocks: Vec::new(),
        };

        if !self.is_changed() {
            let height_field = self
                .height_field()
                .ok_or(TerrainError::MissingHeightField { key: self.key() })?;
            record.height_map_image = Some(height_field.encode_png()?);
            return Ok(record);
        }

        let (mut ground, mut invisible): (Vec<BlockSnapshot>, Vec<BlockSnapshot>) = if self.is_active() {
            (
                self.blocks(pool).ground().collect(),
                self.blocks(pool).invisible().collect(),
            )
        } else {
            (
                self.ground_snapshot().to_vec(),
                self.invisible_snapshot().to_vec(),
            )
        };
        ground.sort();
        invisible.sort();
        record.ground_blocks = ground.iter().map(BlockRecord::from).collect();
        record.invisible_blocks = invisible.iter().map(BlockRecord::from).collect();
        Ok(record)
    }

    /// Rebuilds an inactive chunk from its record; call `load` to place its blocks.
    ///
    /// The height field comes from the saved image when there is one, otherwise it
    /// is sampled again from noise at the saved offset.
    pub fn import_snapshot(
        record: &ChunkRecord,
        chunk_size: i32,
        noise_scale: f32,
        noise_seed: u32,
    ) -> TerrainResult<TerrainChunk> {
        let key = record.world_position.to_key();
        let noise_offset: [f32; 2] = record.noise_offset.into();
        let mut chunk = TerrainChunk::new(key, chunk_size, noise_scale, record.max_height);

        let height_field = match &record.height_map_image {
            Some(bytes) => HeightField::decode_png(bytes, chunk_size, noise_scale, noise_offset)?,
            None => HeightField::generate(chunk_size, noise_scale, noise_offset, noise_seed),
        };
        chunk.set_height_field(Some(height_field));
        chunk.restore_metadata(noise_offset, record.changed);

        let ground = record
            .ground_blocks
            .iter()
            .map(|block| block.to_snapshot())
            .collect::<TerrainResult<Vec<_>>>()?;
        let invisible = record
            .invisible_blocks
            .iter()
            .map(|block| {
                block.to_snapshot().map(|snapshot| BlockSnapshot {
                    block_type: BlockType::Invisible,
                    ..snapshot
                })
            })
            .collect::<TerrainResult<Vec<_>>>()?;
        chunk.restore_snapshot(ground, invisible);
        Ok(chunk)
    }
}

impl ChunkGrid {
    /// Captures the world layout, every registered chunk and the viewpoint.
    pub fn save_snapshot(&self, pool: &BlockPool, viewpoint: Point3<f32>) -> TerrainResult<SaveSnapshot> {
        let mut chunks: Vec<&TerrainChunk> = self.chunks().collect();
        chunks.sort_by_key(|chunk| chunk.key());

        let world = WorldRecord {
            chunk_size: self.chunk_size(),
            noise_scale: self.noise_scale(),
            start_noise_offset: self.noise_start_offset().into(),
            window_size: self.window_size(),
            noise_seed: self.noise_seed(),
            chunk_world_positions: chunks.iter().map(|chunk| chunk.key().into()).collect(),
        };
        let chunks = chunks
            .into_iter()
            .map(|chunk| chunk.export_snapshot(pool))
            .collect::<TerrainResult<Vec<_>>>()?;

        Ok(SaveSnapshot {
            world,
            chunks,
            viewpoint: ViewpointRecord {
                position: viewpoint.into(),
            },
        })
    }

    /// Replaces the grid's contents with a saved world.
    ///
    /// Every listed chunk is fetched through `lookup`; a chunk whose record is
    /// missing is skipped. The window is then centred on the chunk holding
    /// `viewpoint`, loading registered chunks and generating any slot the save
    /// did not cover.
    ///
    /// # Errors
    /// `InvalidConfig` if the world record is unusable. The grid is left
    /// untouched in that case.
    pub fn restore<F>(
        &mut self,
        world: &WorldRecord,
        mut lookup: F,
        viewpoint: Point3<f32>,
        pool: &mut BlockPool,
    ) -> TerrainResult<()>
    where
        F: FnMut(ChunkKey) -> TerrainResult<ChunkRecord>,
    {
        world.validate()?;

        for key in self.window_keys().to_vec() {
            if let Ok(chunk) = self.get_chunk_mut(key) {
                chunk.disable(pool);
            }
        }
        self.reset_layout(
            world.window_size,
            world.chunk_size,
            world.noise_scale,
            world.start_noise_offset.into(),
            world.noise_seed,
        );

        for position in &world.chunk_world_positions {
            let key = position.to_key();
            match lookup(key) {
                Ok(record) => {
                    let chunk = TerrainChunk::import_snapshot(
                        &record,
                        world.chunk_size,
                        world.noise_scale,
                        world.noise_seed,
                    )?;
                    self.insert_chunk(chunk);
                }
                Err(TerrainError::PersistenceMiss(what)) => {
                    warn!("Skipping chunk {}: {}", key, what);
                }
                Err(error) => return Err(error),
            }
        }
        self.relink();

        let size = world.chunk_size;
        let half = (world.window_size / 2) as i32;
        let origin_x = (viewpoint.x / size as f32).floor() as i32 * size;
        let origin_z = (viewpoint.z / size as f32).floor() as i32 * size;
        let start: [f32; 2] = world.start_noise_offset.into();

        let mut window = Vec::with_capacity(world.window_size * world.window_size);
        for x in 0..world.window_size as i32 {
            for y in 0..world.window_size as i32 {
                let key = ChunkKey::new(origin_x + (x - half) * size, origin_z + (y - half) * size);
                if self.get_chunk(key).is_ok() {
                    self.load_chunk(key, pool)?;
                } else {
                    warn!("Chunk {} missing from save, generating it", key);
                    let noise_offset = [
                        start[0] + (key.x / size) as f32 * world.noise_scale,
                        start[1] + (key.z / size) as f32 * world.noise_scale,
                    ];
                    self.generate_chunk(key, noise_offset, pool)?;
                    self.relink_chunk(key);
                }
                window.push(key);
            }
        }
        self.set_window(window);

        info!(
            "Restored {} chunks around viewpoint ({}, {}, {})",
            self.chunk_count(),
            viewpoint.x,
            viewpoint.y,
            viewpoint.z
        );
        pool.log_stats();
        Ok(())
    }
}
