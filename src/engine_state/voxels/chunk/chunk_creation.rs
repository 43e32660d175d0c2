//! # Chunk Creation Module
//!
//! Turns a chunk's height field into placed blocks. Generation runs in two passes.
//!
//! ## Column pass
//!
//! For every cell `(x, y)` of the height field:
//! 1. Place the surface block at `(origin.x + x, height, origin.z + y)`, typed by
//!    the band covering `height / max_height`.
//! 2. Fill the cliff under it down to one above the lowest of its four
//!    neighbours, each layer typed by what becomes exposed when that layer is dug.
//! 3. Seed an `Invisible` block under the last placed block.
//!
//! ## Skirt pass
//!
//! Each seed from the column pass sinks further while the cell below it is empty
//! and one of that cell's horizontal neighbours is a visible block. This leaves
//! an invisible shell behind every exposed wall so a later dig always has a
//! marker to convert.

use cgmath::{Point3, Vector3};
use log::debug;

use crate::{
    core::error::TerrainResult,
    engine_state::voxels::{
        block::{block_side::BlockSide, block_type::BlockType},
        pool::BlockPool,
    },
};

use super::{height_field::HeightField, GenerationContext, TerrainChunk};

/// Runs the column pass over the whole height field.
pub(super) fn place_columns(
    chunk: &mut TerrainChunk,
    height_field: &HeightField,
    ctx: &mut GenerationContext,
) -> TerrainResult<()> {
    let origin = chunk.key();
    let max_height = chunk.max_height();

    for x in 0..chunk.chunk_size() {
        for y in 0..chunk.chunk_size() {
            let height = height_field.block_height(x, y, max_height);
            let mut position = Point3::new(origin.x + x, height, origin.z + y);

            let top_type = ctx.classifier.block_type_on_height(height, max_height, true)?;
            place(chunk, ctx.pool, top_type, position)?;

            for _ in 0..blocks_under(chunk, height_field, x, y, height) {
                position.y -= 1;
                let fill_type = ctx.classifier.block_type_on_height(position.y, max_height, false)?;
                place(chunk, ctx.pool, fill_type, position)?;
            }

            let below = position - Vector3::unit_y();
            if !ctx.pool.is_solid_at(below) {
                place(chunk, ctx.pool, BlockType::Invisible, below)?;
            }
        }
    }
    Ok(())
}

/// Runs the skirt pass over the seeds left by [`place_columns`].
pub(super) fn extend_skirt(chunk: &mut TerrainChunk, pool: &mut BlockPool) -> TerrainResult<()> {
    let mut seeds: Vec<Point3<i32>> = chunk
        .invisible_blocks()
        .iter()
        .filter_map(|id| pool.position(*id))
        .collect();
    seeds.sort_by_key(|position| (position.x, position.z, position.y));

    for mut position in seeds {
        loop {
            let below = position - Vector3::unit_y();
            if pool.is_solid_at(below) || !has_visible_side_neighbour(pool, below) {
                break;
            }
            place(chunk, pool, BlockType::Invisible, below)?;
            position = below;
        }
    }
    Ok(())
}

/// Number of fill blocks needed under column `(x, y)` to close the cliff to its lowest neighbour.
///
/// Neighbours outside the chunk count as `floor(height - noise_scale)`.
pub fn blocks_under(chunk: &TerrainChunk, height_field: &HeightField, x: i32, y: i32, height: i32) -> i32 {
    let size = chunk.chunk_size();
    let fallback = (height as f32 - chunk.noise_scale()).floor() as i32;

    let lowest = [(-1, 0), (1, 0), (0, -1), (0, 1)]
        .iter()
        .map(|(dx, dy)| {
            let (nx, ny) = (x + dx, y + dy);
            if nx < 0 || ny < 0 || nx >= size || ny >= size {
                fallback
            } else {
                height_field.block_height(nx, ny, chunk.max_height())
            }
        })
        .min()
        .unwrap_or(height);

    (height - lowest - 1).max(0)
}

fn has_visible_side_neighbour(pool: &BlockPool, position: Point3<i32>) -> bool {
    BlockSide::horizontal()
        .iter()
        .any(|side| pool.is_visible_solid_at(side.step(position)))
}

fn place(
    chunk: &mut TerrainChunk,
    pool: &mut BlockPool,
    block_type: BlockType,
    position: Point3<i32>,
) -> TerrainResult<()> {
    if let Some(other) = pool.block_at(position) {
        debug!(
            "Chunk {} skipped {:?} at {:?}, already held by {:?}",
            chunk.key(),
            block_type,
            position,
            other
        );
        return Ok(());
    }
    let id = pool.acquire_at(block_type, position, Some(chunk.key()))?;
    chunk.insert_block(id, block_type);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::voxels::{
        block::catalog::BlockCatalog,
        chunk::ChunkKey,
        world::HeightClassifier,
    };

    fn generate(samples: &[f32], size: i32, max_height: i32) -> (TerrainChunk, BlockPool) {
        let mut pool = BlockPool::new();
        let mut classifier = HeightClassifier::new(BlockCatalog::standard());
        let mut chunk = TerrainChunk::new(ChunkKey::new(0, 0), size, 1.0, max_height);
        let field = HeightField::from_samples(size, 1.0, [0.0, 0.0], samples);
        let mut ctx = GenerationContext {
            pool: &mut pool,
            classifier: &mut classifier,
        };
        chunk.generate_from_height_field(field, &mut ctx).unwrap();
        (chunk, pool)
    }

    #[test]
    fn flat_columns_need_no_fill() {
        let field = HeightField::flat(4, 1.0, [0.0, 0.0], 0.5);
        let chunk = TerrainChunk::new(ChunkKey::new(0, 0), 4, 1.0, 10);
        // Interior neighbours are level, edge neighbours fall back to height - 1.
        assert_eq!(blocks_under(&chunk, &field, 1, 1, 5), 0);
        assert_eq!(blocks_under(&chunk, &field, 0, 0, 5), 0);
    }

    #[test]
    fn occupied_cells_are_left_to_their_holder() {
        let mut pool = BlockPool::new();
        let mut classifier = HeightClassifier::new(BlockCatalog::standard());
        let stranger = ChunkKey::new(4, 0);
        let ice = pool
            .acquire_at(BlockType::Ice, Point3::new(1, 5, 1), Some(stranger))
            .unwrap();

        let mut chunk = TerrainChunk::new(ChunkKey::new(0, 0), 4, 1.0, 10);
        let field = HeightField::flat(4, 1.0, [0.0, 0.0], 0.5);
        let mut ctx = GenerationContext {
            pool: &mut pool,
            classifier: &mut classifier,
        };
        chunk.generate_from_height_field(field, &mut ctx).unwrap();

        assert_eq!(pool.block_at(Point3::new(1, 5, 1)), Some(ice));
        assert!(!chunk.ground_blocks().contains(&ice));
        assert_eq!(chunk.ground_blocks().len(), 15);
        let held = chunk.ground_blocks().len() + chunk.invisible_blocks().len();
        assert_eq!(held + 1, pool.occupied_count());
        assert_eq!(pool.active_count(BlockType::DirtGrass), 15);
    }

    #[test]
    fn cliff_is_filled_down_to_lowest_neighbour() {
        // A single 0.95 spike in a 0.25 plain: height 9 against neighbours at 2.
        let mut samples = vec![0.25; 9];
        samples[4] = 0.95;
        let (chunk, pool) = generate(&samples, 3, 10);

        assert_eq!(pool.type_at(Point3::new(1, 9, 1)), Some(BlockType::StoneSnow));
        for y in 3..9 {
            assert!(pool.is_visible_solid_at(Point3::new(1, y, 1)), "missing fill at y={}", y);
        }
        // Fill layers use the type exposed when dug at their own height.
        assert_eq!(pool.type_at(Point3::new(1, 8, 1)), Some(BlockType::Stone));
        assert_eq!(pool.type_at(Point3::new(1, 4, 1)), Some(BlockType::Dirt));
        assert_eq!(pool.type_at(Point3::new(1, 2, 1)), Some(BlockType::Invisible));
        assert!(chunk.ground_blocks().len() > 9);
    }

    #[test]
    fn skirt_sinks_beside_exposed_walls() {
        // Middle row: a plain at 5, a ridge at 8 and a pit at 2. The ridge wall
        // is filled down to 3, one below the plain's invisible seed at 4.
        let samples = [
            0.55, 0.55, 0.55, //
            0.55, 0.85, 0.25, //
            0.55, 0.55, 0.55,
        ];
        let (_, pool) = generate(&samples, 3, 10);

        assert!(pool.is_visible_solid_at(Point3::new(1, 3, 1)));
        assert_eq!(pool.type_at(Point3::new(1, 2, 1)), Some(BlockType::Invisible));

        assert_eq!(pool.type_at(Point3::new(0, 4, 1)), Some(BlockType::Invisible));
        assert_eq!(pool.type_at(Point3::new(0, 3, 1)), Some(BlockType::Invisible));
        assert!(!pool.is_solid_at(Point3::new(0, 2, 1)));

        assert_eq!(pool.type_at(Point3::new(1, 3, 0)), Some(BlockType::Invisible));
        assert!(!pool.is_solid_at(Point3::new(1, 2, 0)));
    }

    #[test]
    fn every_generated_block_is_owned_by_the_chunk() {
        let (chunk, pool) = generate(&[0.1, 0.3, 0.6, 0.95], 2, 16);
        for id in chunk.ground_blocks().iter().chain(chunk.invisible_blocks()) {
            assert_eq!(pool.get(*id).and_then(|block| block.owner), Some(chunk.key()));
        }
    }
}
